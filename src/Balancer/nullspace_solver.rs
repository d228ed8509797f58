//! # Null space solvers
//!
//! A coefficient vector x balances an equation iff A·x = 0 for the conservation matrix A,
//! so balancing means finding the (one-dimensional) null space of A and orienting it to be positive.
//!
//! Three interchangeable strategies behind the `NullSpaceSolver` trait:
//! - `RationalElimination`: Gauss-Jordan elimination over exact rationals (`Ratio<i128>`).
//!   No tolerance is involved, the result is exact; arithmetic overflow is reported as an error.
//! - `QrDecomposition`: column-pivoted Householder QR of Aᵀ. The numerical rank is the number of
//!   diagonal entries of R with |R_ii| > rank_tolerance · max|R_jj|; the null vector is the last column of Q.
//! - `SvdDecomposition`: singular value decomposition of A. Singular values with
//!   σ <= rank_tolerance · σ_max count as zero; the null vector is the matching right singular vector.
//!
//! The float strategies can disagree with the exact one on ill-conditioned input. The default chain
//! tries the exact strategy first.
//!
//! A null space of dimension > 1 (several independent balancings) is not supported by any strategy
//! and is reported as unbalanceable.
use crate::Balancer::balancer_errors::BalanceError;
use crate::Balancer::conservation_matrix::ConservationMatrix;
use enum_dispatch::enum_dispatch;
use log::debug;
use nalgebra::{DMatrix, DVector};
use num_rational::Ratio;
use num_traits::{CheckedDiv, CheckedMul, CheckedSub, Signed, Zero};
use serde::{Deserialize, Serialize};

/// exact rational used by the elimination
pub type Rational = Ratio<i128>;

/// entries of a unit float null vector below this (relative to the largest entry) count as zero
const ZERO_ENTRY_TOLERANCE: f64 = 1e-9;
/// iteration limit of the SVD
const SVD_MAX_ITERATIONS: usize = 10_000;

/// basis vector of the null space, oriented so that all entries are positive
#[derive(Debug, Clone, PartialEq)]
pub enum NullVector {
    Exact(Vec<Rational>),
    Approximate(DVector<f64>),
}

impl NullVector {
    pub fn len(&self) -> usize {
        match self {
            NullVector::Exact(v) => v.len(),
            NullVector::Approximate(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[enum_dispatch]
pub trait NullSpaceSolver {
    fn name(&self) -> &'static str;
    /// positive basis vector of the one-dimensional null space of the matrix
    fn null_vector(&self, matrix: &ConservationMatrix) -> Result<NullVector, BalanceError>;
}

/// names of the strategies, as they appear in settings files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SolverKind {
    Rational,
    Qr,
    Svd,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RationalElimination;

#[derive(Debug, Clone, Copy)]
pub struct QrDecomposition {
    pub rank_tolerance: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct SvdDecomposition {
    pub rank_tolerance: f64,
}

#[derive(Debug, Clone, Copy)]
#[enum_dispatch(NullSpaceSolver)]
pub enum SolverEnum {
    Rational(RationalElimination),
    Qr(QrDecomposition),
    Svd(SvdDecomposition),
}

pub fn create_solver(kind: SolverKind, rank_tolerance: f64) -> SolverEnum {
    match kind {
        SolverKind::Rational => SolverEnum::Rational(RationalElimination),
        SolverKind::Qr => SolverEnum::Qr(QrDecomposition { rank_tolerance }),
        SolverKind::Svd => SolverEnum::Svd(SvdDecomposition { rank_tolerance }),
    }
}

fn no_null_space() -> BalanceError {
    BalanceError::Unbalanceable(
        "the conservation matrix has full column rank, only the trivial solution exists".to_string(),
    )
}

fn multidimensional_null_space(dimension: usize) -> BalanceError {
    BalanceError::Unbalanceable(format!(
        "the null space has dimension {}; equations with more than one independent balancing are not supported",
        dimension
    ))
}

fn no_positive_solution() -> BalanceError {
    BalanceError::Unbalanceable(
        "the balancing vector has mixed signs or zero entries, no positive solution exists".to_string(),
    )
}

fn overflow() -> BalanceError {
    BalanceError::Normalization("arithmetic overflow in exact elimination".to_string())
}

/////////////////////////////////EXACT ELIMINATION///////////////////////////////////////////

/// reduced row echelon form over exact rationals, returns the reduced rows and the pivot columns
pub fn reduced_row_echelon(
    matrix: &DMatrix<i64>,
) -> Result<(Vec<Vec<Rational>>, Vec<usize>), BalanceError> {
    let (m, n) = matrix.shape();
    let mut rows: Vec<Vec<Rational>> = (0..m)
        .map(|i| {
            (0..n)
                .map(|j| Rational::from_integer(matrix[(i, j)] as i128))
                .collect()
        })
        .collect();
    let mut pivots = Vec::new();
    let mut row = 0;
    for col in 0..n {
        if row == m {
            break;
        }
        let Some(pivot_row) = (row..m).find(|&r| !rows[r][col].is_zero()) else {
            continue;
        };
        rows.swap(row, pivot_row);
        let pivot = rows[row][col];
        for k in col..n {
            rows[row][k] = rows[row][k].checked_div(&pivot).ok_or_else(overflow)?;
        }
        for r in 0..m {
            if r == row || rows[r][col].is_zero() {
                continue;
            }
            let factor = rows[r][col];
            for k in col..n {
                let delta = factor.checked_mul(&rows[row][k]).ok_or_else(overflow)?;
                rows[r][k] = rows[r][k].checked_sub(&delta).ok_or_else(overflow)?;
            }
        }
        pivots.push(col);
        row += 1;
    }
    Ok((rows, pivots))
}

/// negate an all-negative vector, reject vectors with mixed signs or zeros
fn orient_exact(vector: Vec<Rational>) -> Result<Vec<Rational>, BalanceError> {
    if vector.iter().all(|x| x.is_positive()) {
        Ok(vector)
    } else if vector.iter().all(|x| x.is_negative()) {
        Ok(vector.into_iter().map(|x| -x).collect())
    } else {
        Err(no_positive_solution())
    }
}

impl NullSpaceSolver for RationalElimination {
    fn name(&self) -> &'static str {
        "exact rational elimination"
    }

    fn null_vector(&self, matrix: &ConservationMatrix) -> Result<NullVector, BalanceError> {
        let n = matrix.ncols();
        let (rows, pivots) = reduced_row_echelon(&matrix.matrix)?;
        let free: Vec<usize> = (0..n).filter(|col| !pivots.contains(col)).collect();
        debug!("exact elimination: rank {}, free columns {:?}", pivots.len(), free);
        let free_col = match free.as_slice() {
            [] => return Err(no_null_space()),
            [col] => *col,
            _ => return Err(multidimensional_null_space(free.len())),
        };
        let mut vector = vec![Rational::zero(); n];
        vector[free_col] = Rational::from_integer(1);
        for (pivot_row, &pivot_col) in pivots.iter().enumerate() {
            vector[pivot_col] = -rows[pivot_row][free_col];
        }
        Ok(NullVector::Exact(orient_exact(vector)?))
    }
}

/////////////////////////////////FLOATING POINT DECOMPOSITIONS/////////////////////////////////

fn orient_float(vector: DVector<f64>) -> Result<DVector<f64>, BalanceError> {
    let largest = vector.amax();
    if !largest.is_finite() || largest == 0.0 {
        return Err(BalanceError::Normalization(
            "the null space vector is zero or not finite".to_string(),
        ));
    }
    let threshold = ZERO_ENTRY_TOLERANCE * largest;
    if vector.iter().all(|&x| x > threshold) {
        Ok(vector)
    } else if vector.iter().all(|&x| x < -threshold) {
        Ok(-vector)
    } else {
        Err(no_positive_solution())
    }
}

impl NullSpaceSolver for QrDecomposition {
    fn name(&self) -> &'static str {
        "column-pivoted QR decomposition"
    }

    fn null_vector(&self, matrix: &ConservationMatrix) -> Result<NullVector, BalanceError> {
        let n_compounds = matrix.ncols();
        let n_elements = matrix.nrows();
        // Aᵀ padded with zero columns to at least square, so that Q is the full orthogonal factor
        let transposed = matrix
            .to_f64()
            .transpose()
            .resize(n_compounds, n_compounds.max(n_elements), 0.0);
        let qr = transposed.col_piv_qr();
        let r = qr.r();
        let diagonal = r.diagonal();
        let largest = diagonal.amax();
        let rank = diagonal
            .iter()
            .filter(|d| d.abs() > self.rank_tolerance * largest)
            .count();
        let null_dim = n_compounds - rank;
        debug!("QR: numerical rank {}, null space dimension {}", rank, null_dim);
        match null_dim {
            0 => Err(no_null_space()),
            1 => {
                let q = qr.q();
                let vector = q.column(n_compounds - 1).into_owned();
                Ok(NullVector::Approximate(orient_float(vector)?))
            }
            k => Err(multidimensional_null_space(k)),
        }
    }
}

impl NullSpaceSolver for SvdDecomposition {
    fn name(&self) -> &'static str {
        "singular value decomposition"
    }

    fn null_vector(&self, matrix: &ConservationMatrix) -> Result<NullVector, BalanceError> {
        let n_compounds = matrix.ncols();
        let n_elements = matrix.nrows();
        // zero rows do not change the null space and make Vᵀ square
        let padded = matrix
            .to_f64()
            .resize(n_elements.max(n_compounds), n_compounds, 0.0);
        let svd = padded
            .try_svd(false, true, f64::EPSILON, SVD_MAX_ITERATIONS)
            .ok_or_else(|| BalanceError::Normalization("SVD did not converge".to_string()))?;
        let v_t = svd.v_t.ok_or_else(|| {
            BalanceError::Normalization("SVD did not return right singular vectors".to_string())
        })?;
        let sigma = &svd.singular_values;
        let largest = sigma.amax();
        let zero_sigmas: Vec<usize> = (0..sigma.len())
            .filter(|&i| sigma[i] <= self.rank_tolerance * largest)
            .collect();
        debug!("SVD: singular values {:?}", sigma.as_slice());
        match zero_sigmas.as_slice() {
            [] => Err(no_null_space()),
            [i] => {
                let vector = v_t.row(*i).transpose();
                Ok(NullVector::Approximate(orient_float(vector)?))
            }
            many => Err(multidimensional_null_space(many.len())),
        }
    }
}
