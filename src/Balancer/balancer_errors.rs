//! Error types of the balancer.
//!
//! `FormulaError` is raised while reading a single formula or splitting an equation,
//! `BalanceError` is the top-level error of a balance request. Every failure is returned
//! as data so the caller (CLI, web layer) can render it to the user.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// malformed equation syntax
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    #[error("empty formula")]
    EmptyFormula,
    #[error("no element symbol found in formula '{0}'")]
    NoElementToken(String),
    #[error("parenthesized groups are not supported: '{0}'")]
    UnsupportedGrouping(String),
    #[error("unexpected character '{character}' in formula '{formula}'")]
    UnexpectedCharacter { formula: String, character: char },
    #[error("zero atom count for element {element} in formula '{formula}'")]
    ZeroCount { formula: String, element: String },
    #[error("atom count too large in formula '{0}'")]
    CountOverflow(String),
    #[error("no separator")]
    NoSeparator,
    #[error("multiple sides")]
    MultipleSides,
    #[error("empty {0} side")]
    EmptySide(&'static str),
}

/// classification of a failed balance, serialized next to the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Parse,
    Unbalanceable,
    Normalization,
    Verification,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BalanceError {
    #[error("Invalid equation: {0}")]
    Parse(#[from] FormulaError),
    /// no positive integer solution, or a null space the solver does not support
    #[error("Could not balance the equation: {0}")]
    Unbalanceable(String),
    /// the numeric solution could not be turned into minimal positive integers
    #[error("Normalization failed: {0}")]
    Normalization(String),
    /// the final coefficients do not conserve an element
    #[error("Balancing failed. {element} atoms don't match: {reactants} ≠ {products}")]
    Verification {
        element: String,
        reactants: i64,
        products: i64,
    },
}

impl BalanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BalanceError::Parse(_) => ErrorKind::Parse,
            BalanceError::Unbalanceable(_) => ErrorKind::Unbalanceable,
            BalanceError::Normalization(_) => ErrorKind::Normalization,
            BalanceError::Verification { .. } => ErrorKind::Verification,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err: BalanceError = FormulaError::NoSeparator.into();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.to_string(), "Invalid equation: no separator");
        let err = BalanceError::Verification {
            element: "O".to_string(),
            reactants: 4,
            products: 3,
        };
        assert_eq!(err.kind(), ErrorKind::Verification);
        assert_eq!(
            err.to_string(),
            "Balancing failed. O atoms don't match: 4 ≠ 3"
        );
    }
}
