use crate::Balancer::balancer_errors::FormulaError;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

/// element symbol (uppercase letter and optional lowercase letter) followed by an optional atom count
static ELEMENT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z][a-z]?)(\d*)").expect("element token pattern is valid"));

const GROUPING_CHARS: [char; 6] = ['(', ')', '[', ']', '{', '}'];

/// A parsed chemical formula: the text it was read from and the number of atoms of each element.
/// Elements absent from the map have an implicit count of 0, present elements have count >= 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChemicalFormula {
    formula: String,
    elements: HashMap<String, usize>,
}

impl ChemicalFormula {
    pub fn parse(formula: &str) -> Result<Self, FormulaError> {
        let formula = formula.trim();
        let elements = parse_formula(formula)?;
        Ok(Self {
            formula: formula.to_string(),
            elements,
        })
    }

    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn elements(&self) -> &HashMap<String, usize> {
        &self.elements
    }

    /// number of atoms of the element in one formula unit
    pub fn count(&self, element: &str) -> usize {
        self.elements.get(element).copied().unwrap_or(0)
    }

    pub fn element_symbols(&self) -> BTreeSet<&str> {
        self.elements.keys().map(|el| el.as_str()).collect()
    }
}

/// Function to parse a chemical formula and return a HashMap of elements and their counts.
/// The whole formula must be a sequence of element tokens like "Fe2O3"; parenthesized groups,
/// hydrates and stray characters are rejected instead of being skipped.
pub fn parse_formula(formula: &str) -> Result<HashMap<String, usize>, FormulaError> {
    if formula.is_empty() {
        return Err(FormulaError::EmptyFormula);
    }
    if formula.contains(GROUPING_CHARS) {
        return Err(FormulaError::UnsupportedGrouping(formula.to_string()));
    }
    let mut counts: HashMap<String, usize> = HashMap::new();
    // position up to which the formula has been consumed by element tokens
    let mut consumed = 0;
    for captures in ELEMENT_TOKEN.captures_iter(formula) {
        let (Some(token), Some(symbol)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        if token.start() != consumed {
            return Err(unexpected_at(formula, consumed));
        }
        consumed = token.end();
        let digits = captures.get(2).map(|m| m.as_str()).unwrap_or("");
        let count: usize = if digits.is_empty() {
            1
        } else {
            digits
                .parse::<u32>()
                .map_err(|_| FormulaError::CountOverflow(formula.to_string()))? as usize
        };
        if count == 0 {
            return Err(FormulaError::ZeroCount {
                formula: formula.to_string(),
                element: symbol.as_str().to_string(),
            });
        }
        let total = counts.entry(symbol.as_str().to_string()).or_insert(0);
        *total = total
            .checked_add(count)
            .ok_or_else(|| FormulaError::CountOverflow(formula.to_string()))?;
    }
    if counts.is_empty() {
        return Err(FormulaError::NoElementToken(formula.to_string()));
    }
    if consumed != formula.len() {
        return Err(unexpected_at(formula, consumed));
    }
    Ok(counts)
}

fn unexpected_at(formula: &str, position: usize) -> FormulaError {
    let character = formula[position..].chars().next().unwrap_or(' ');
    FormulaError::UnexpectedCharacter {
        formula: formula.to_string(),
        character,
    }
}
