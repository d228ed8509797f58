/// error types of every stage, from formula parsing to verification
pub mod balancer_errors;
/// eng
/// Parsing of a single chemical formula such as "Fe2O3" or "KMnO4" into a map element -> atom count.
/// Only element symbols followed by optional counts are accepted; groups in parentheses, charges
/// and hydrates are rejected with an error instead of being silently ignored.
pub mod formula_parser;
/// eng
/// Parsing of an equation "reactants -> products". Accepted separators are "→", "->", "=>" and "=",
/// sides are split on '+'. An optional leading coefficient of a formula ("2H2O") is kept so that a
/// balanced equation can be checked as written.
pub mod equation_parser;
/// element conservation matrix: one row per element, one column per compound,
/// reactant counts positive and product counts negative
pub mod conservation_matrix;
/// eng
/// Null space strategies for the conservation matrix:
/// 1) exact Gauss-Jordan elimination over rationals
/// 2) QR decomposition with column pivoting (nalgebra)
/// 3) singular value decomposition (nalgebra)
/// All of them implement the NullSpaceSolver trait and are dispatched through SolverEnum
pub mod nullspace_solver;
/// conversion of a null space vector into the smallest positive integer coefficients
pub mod rationalizer;
/// exact verification of the balanced coefficients, rendering of the balanced equation and of the
/// step-by-step explanation
pub mod verifier;
/// eng
/// High level API: EquationBalancer tries the configured strategies in order and returns either the
/// balanced equation with coefficients, steps and explanation or an error record, both serializable to JSON
pub mod balance_api;
mod balance_tests;
