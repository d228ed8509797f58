use crate::Balancer::balancer_errors::{BalanceError, ErrorKind};
use crate::Balancer::conservation_matrix::ConservationMatrix;
use crate::Balancer::equation_parser::{Equation, parse_equation};
use crate::Balancer::nullspace_solver::{NullSpaceSolver, SolverEnum, create_solver};
use crate::Balancer::rationalizer::Rationalizer;
use crate::Balancer::verifier::{explanation, format_balanced_equation, generate_steps, verify};
use crate::settings::{BalancerSettings, SettingsError};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// coefficients keyed by formula, split into the two sides of the equation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CoefficientMap {
    pub reactants: BTreeMap<String, i64>,
    pub products: BTreeMap<String, i64>,
}

/// successful balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalancedEquation {
    #[serde(rename = "equation")]
    pub original_equation: String,
    pub balanced_equation: String,
    pub steps: Vec<String>,
    pub explanation: String,
    pub coefficients: CoefficientMap,
    /// coefficients in the order of the formulas in the equation, reactants first
    pub ordered_coefficients: Vec<i64>,
    /// strategy that produced the coefficients
    pub solver: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceFailure {
    pub error: String,
    pub error_kind: ErrorKind,
}

/// what a balance request returns to its caller, serialized untagged:
/// either the balanced equation fields or `{"error": ..., "error_kind": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BalanceResult {
    Balanced(BalancedEquation),
    Failed(BalanceFailure),
}

impl BalanceResult {
    pub fn is_balanced(&self) -> bool {
        matches!(self, BalanceResult::Balanced(_))
    }

    pub fn balanced(&self) -> Option<&BalancedEquation> {
        match self {
            BalanceResult::Balanced(b) => Some(b),
            BalanceResult::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&BalanceFailure> {
        match self {
            BalanceResult::Balanced(_) => None,
            BalanceResult::Failed(f) => Some(f),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl From<Result<BalancedEquation, BalanceError>> for BalanceResult {
    fn from(result: Result<BalancedEquation, BalanceError>) -> Self {
        match result {
            Ok(balanced) => BalanceResult::Balanced(balanced),
            Err(err) => BalanceResult::Failed(BalanceFailure {
                error: err.to_string(),
                error_kind: err.kind(),
            }),
        }
    }
}

/// Balancer configured once with an ordered chain of null space strategies.
/// It holds no per-request state, so one instance can serve concurrent callers.
#[derive(Debug, Clone)]
pub struct EquationBalancer {
    solvers: Vec<SolverEnum>,
    rationalizer: Rationalizer,
}

impl Default for EquationBalancer {
    fn default() -> Self {
        Self::from_settings(&BalancerSettings::default())
    }
}

impl EquationBalancer {
    pub fn new(settings: &BalancerSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self::from_settings(settings))
    }

    fn from_settings(settings: &BalancerSettings) -> Self {
        let solvers = settings
            .effective_chain()
            .into_iter()
            .map(|kind| create_solver(kind, settings.rank_tolerance))
            .collect();
        Self::with_solvers(
            solvers,
            Rationalizer::new(settings.max_denominator, settings.approximation_tolerance),
        )
    }

    pub fn with_solvers(solvers: Vec<SolverEnum>, rationalizer: Rationalizer) -> Self {
        Self {
            solvers,
            rationalizer,
        }
    }

    pub fn solver_names(&self) -> Vec<&'static str> {
        self.solvers.iter().map(|s| s.name()).collect()
    }

    /// balance and convert any error into the failure variant
    pub fn balance(&self, equation_text: &str) -> BalanceResult {
        self.try_balance(equation_text).into()
    }

    pub fn try_balance(&self, equation_text: &str) -> Result<BalancedEquation, BalanceError> {
        info!("balancing equation '{}'", equation_text);
        let equation = parse_equation(equation_text)?;
        check_elements_on_both_sides(&equation)?;
        let (coefficients, solver) = self.solve_coefficients(&equation)?;

        let n = equation.reactants().len();
        let mut map = CoefficientMap::default();
        for (i, (formula, &coeff)) in equation.compounds().zip(&coefficients).enumerate() {
            let side = if i < n {
                &mut map.reactants
            } else {
                &mut map.products
            };
            side.insert(formula.formula().to_string(), coeff);
        }
        let balanced_equation = format_balanced_equation(&equation, &coefficients);
        info!("balanced: {} ({})", balanced_equation, solver);
        Ok(BalancedEquation {
            original_equation: equation.original().to_string(),
            balanced_equation,
            steps: generate_steps(&equation, &coefficients)?,
            explanation: explanation(&equation),
            coefficients: map,
            ordered_coefficients: coefficients,
            solver: solver.to_string(),
        })
    }

    /// Tries the strategies in order. An attempt succeeds when its null vector rationalizes to
    /// integers that pass `verify`, so a returned vector already conserves every element.
    /// If every attempt fails the error of the first one is returned.
    pub fn solve_coefficients(
        &self,
        equation: &Equation,
    ) -> Result<(Vec<i64>, &'static str), BalanceError> {
        let matrix = ConservationMatrix::from_equation(equation);
        let mut first_error = None;
        for solver in &self.solvers {
            debug!("trying {}", solver.name());
            match self.attempt(solver, equation, &matrix) {
                Ok(coefficients) => return Ok((coefficients, solver.name())),
                Err(err) => {
                    warn!("{} failed: {}", solver.name(), err);
                    first_error.get_or_insert(err);
                }
            }
        }
        Err(first_error.unwrap_or_else(|| {
            BalanceError::Normalization("no solver configured".to_string())
        }))
    }

    fn attempt(
        &self,
        solver: &SolverEnum,
        equation: &Equation,
        matrix: &ConservationMatrix,
    ) -> Result<Vec<i64>, BalanceError> {
        let vector = solver.null_vector(matrix)?;
        let coefficients = self.rationalizer.integerize(&vector)?;
        verify(equation, &coefficients)?;
        Ok(coefficients)
    }
}

/// an element found on one side only can never be conserved
fn check_elements_on_both_sides(equation: &Equation) -> Result<(), BalanceError> {
    for element in equation.elements() {
        let in_reactants = equation.reactants().iter().any(|f| f.count(element) > 0);
        let in_products = equation.products().iter().any(|f| f.count(element) > 0);
        if !(in_reactants && in_products) {
            let side = if in_reactants { "reactants" } else { "products" };
            return Err(BalanceError::Unbalanceable(format!(
                "element {} appears only among the {}",
                element, side
            )));
        }
    }
    Ok(())
}

/// Balances an equation with the default settings
///
/// # Examples
/// ```
/// use ChemBalance::Balancer::balance_api::balance;
/// let result = balance("CH4 + O2 -> CO2 + H2O");
/// let balanced = result.balanced().unwrap();
/// assert_eq!(balanced.balanced_equation, "CH4 + 2O2 → CO2 + 2H2O");
/// assert_eq!(balanced.coefficients.reactants["O2"], 2);
/// ```
pub fn balance(equation_text: &str) -> BalanceResult {
    EquationBalancer::default().balance(equation_text)
}
