/// eng
/// Balancing of chemical equations. The equation text is parsed into formulas, an element conservation
/// matrix is built and its one-dimensional null space is found by exact rational elimination or, as
/// fallback, by QR or SVD decomposition. The null vector is turned into the smallest positive integer
/// coefficients, verified exactly and rendered together with a step-by-step explanation.
#[allow(non_snake_case)]
pub mod Balancer;
pub mod cli;
pub mod settings;
