use crate::Balancer::balancer_errors::FormulaError;
use crate::Balancer::formula_parser::ChemicalFormula;
use log::debug;
use std::collections::BTreeSet;

/// Recognized arrow tokens in precedence order. The first token contained in the text is the separator.
pub const SEPARATORS: [&str; 4] = ["→", "->", "=>", "="];

/// Arrow used when rendering balanced equations
pub const CANONICAL_ARROW: &str = "→";

/// A chemical equation split into reactants and products
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equation {
    /// String from which the equation was parsed
    original: String,
    /// separator found in the original string
    separator: &'static str,
    reactants: Vec<ChemicalFormula>,
    products: Vec<ChemicalFormula>,
    /// coefficients written in front of the formulas (1 when absent), reactants first
    stated_coefficients: Vec<i64>,
    /// all element symbols, sorted lexicographically
    elements: Vec<String>,
}

impl Equation {
    pub fn parse(text: &str) -> Result<Self, FormulaError> {
        parse_equation(text)
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn separator(&self) -> &str {
        self.separator
    }

    pub fn reactants(&self) -> &[ChemicalFormula] {
        &self.reactants
    }

    pub fn products(&self) -> &[ChemicalFormula] {
        &self.products
    }

    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// reactants followed by products, the column order of the conservation matrix
    pub fn compounds(&self) -> impl Iterator<Item = &ChemicalFormula> {
        self.reactants.iter().chain(self.products.iter())
    }

    pub fn number_of_compounds(&self) -> usize {
        self.reactants.len() + self.products.len()
    }

    pub fn stated_coefficients(&self) -> &[i64] {
        &self.stated_coefficients
    }

    /// true if the coefficients written in the text already conserve every element
    pub fn is_balanced_as_written(&self) -> bool {
        self.elements.iter().all(|element| {
            matches!(
                self.side_totals(element, &self.stated_coefficients),
                Some((r, p)) if r == p
            )
        })
    }

    /// Weighted atom totals of one element on the reactant and the product side.
    /// None if a total does not fit in i64.
    pub fn side_totals(&self, element: &str, coefficients: &[i64]) -> Option<(i64, i64)> {
        let n = self.reactants.len();
        let weighted = |formulas: &[ChemicalFormula], coeffs: &[i64]| -> Option<i64> {
            formulas
                .iter()
                .zip(coeffs)
                .try_fold(0i64, |total, (formula, &coeff)| {
                    let count = i64::try_from(formula.count(element)).ok()?;
                    total.checked_add(coeff.checked_mul(count)?)
                })
        };
        let (reactant_coeffs, product_coeffs) = coefficients.split_at(n.min(coefficients.len()));
        Some((
            weighted(&self.reactants, reactant_coeffs)?,
            weighted(&self.products, product_coeffs)?,
        ))
    }
}

/// Find the separator, split both sides on '+' and parse every fragment
pub fn parse_equation(text: &str) -> Result<Equation, FormulaError> {
    let separator = SEPARATORS
        .iter()
        .copied()
        .find(|sep| text.contains(*sep))
        .ok_or(FormulaError::NoSeparator)?;
    let sides: Vec<&str> = text.split(separator).collect();
    if sides.len() != 2 {
        return Err(FormulaError::MultipleSides);
    }
    let (reactants, reactant_coeffs) = parse_side(sides[0], "reactant")?;
    let (products, product_coeffs) = parse_side(sides[1], "product")?;

    let elements: BTreeSet<String> = reactants
        .iter()
        .chain(products.iter())
        .flat_map(|formula| formula.elements().keys().cloned())
        .collect();
    let elements: Vec<String> = elements.into_iter().collect();
    debug!(
        "parsed equation '{}': {} reactants, {} products, elements {:?}",
        text,
        reactants.len(),
        products.len(),
        elements
    );
    Ok(Equation {
        original: text.to_string(),
        separator,
        reactants,
        products,
        stated_coefficients: reactant_coeffs.into_iter().chain(product_coeffs).collect(),
        elements,
    })
}

fn parse_side(
    side: &str,
    side_name: &'static str,
) -> Result<(Vec<ChemicalFormula>, Vec<i64>), FormulaError> {
    if side.trim().is_empty() {
        return Err(FormulaError::EmptySide(side_name));
    }
    let mut formulas = Vec::new();
    let mut coefficients = Vec::new();
    for fragment in side.split('+') {
        let (coefficient, formula) = split_leading_coefficient(fragment.trim())?;
        formulas.push(ChemicalFormula::parse(formula)?);
        coefficients.push(coefficient);
    }
    Ok((formulas, coefficients))
}

/// "2H2O" -> (2, "H2O"); "H2O" -> (1, "H2O")
fn split_leading_coefficient(fragment: &str) -> Result<(i64, &str), FormulaError> {
    let digits_end = fragment
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(fragment.len());
    if digits_end == 0 {
        return Ok((1, fragment));
    }
    let formula = fragment[digits_end..].trim_start();
    let coefficient: i64 = fragment[..digits_end]
        .parse()
        .map_err(|_| FormulaError::CountOverflow(fragment.to_string()))?;
    if coefficient == 0 {
        return Err(FormulaError::ZeroCount {
            formula: fragment.to_string(),
            element: formula.to_string(),
        });
    }
    Ok((coefficient, formula))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_equation() {
        let equation = parse_equation("CH4 + O2 -> CO2 + H2O").unwrap();
        assert_eq!(equation.original(), "CH4 + O2 -> CO2 + H2O");
        assert_eq!(equation.separator(), "->");
        let reactants: Vec<&str> = equation.reactants().iter().map(|f| f.formula()).collect();
        let products: Vec<&str> = equation.products().iter().map(|f| f.formula()).collect();
        assert_eq!(reactants, vec!["CH4", "O2"]);
        assert_eq!(products, vec!["CO2", "H2O"]);
        assert_eq!(equation.elements(), &["C", "H", "O"]);
        assert_eq!(equation.number_of_compounds(), 4);
        assert_eq!(equation.stated_coefficients(), &[1, 1, 1, 1]);
    }

    #[test]
    fn test_separator_precedence() {
        assert_eq!(parse_equation("H2 + O2 → H2O").unwrap().separator(), "→");
        assert_eq!(parse_equation("H2 + O2 => H2O").unwrap().separator(), "=>");
        assert_eq!(parse_equation("H2 + O2 = H2O").unwrap().separator(), "=");
    }

    #[test]
    fn test_elements_sorted_lexicographically() {
        let equation = parse_equation("NaOH + HCl = NaCl + H2O").unwrap();
        assert_eq!(equation.elements(), &["Cl", "H", "Na", "O"]);
    }

    #[test]
    fn test_separator_errors() {
        assert_eq!(parse_equation("H2 + O2 + H2O"), Err(FormulaError::NoSeparator));
        assert_eq!(parse_equation("A -> B -> C"), Err(FormulaError::MultipleSides));
        assert_eq!(parse_equation(" -> H2O"), Err(FormulaError::EmptySide("reactant")));
        assert_eq!(parse_equation("H2 + O2 ->  "), Err(FormulaError::EmptySide("product")));
        assert_eq!(parse_equation("H2 + -> H2O"), Err(FormulaError::EmptyFormula));
    }

    #[test]
    fn test_fragment_errors_propagate() {
        assert_eq!(
            parse_equation("Ca(OH)2 -> CaO + H2O"),
            Err(FormulaError::UnsupportedGrouping("Ca(OH)2".to_string()))
        );
    }

    #[test]
    fn test_stated_coefficients() {
        let equation = parse_equation("2H2 + O2 → 2H2O").unwrap();
        assert_eq!(equation.stated_coefficients(), &[2, 1, 2]);
        assert_eq!(equation.reactants()[0].formula(), "H2");
        assert!(equation.is_balanced_as_written());

        let equation = parse_equation("H2 + O2 → H2O").unwrap();
        assert!(!equation.is_balanced_as_written());
        assert_eq!(equation.side_totals("O", &[1, 1, 1]), Some((2, 1)));
        assert_eq!(equation.side_totals("H", &[2, 1, 2]), Some((4, 4)));
    }

    #[test]
    fn test_side_totals_overflow() {
        let equation = parse_equation("H4294967295 -> H4294967294").unwrap();
        assert_eq!(
            equation.side_totals("H", &[1, 1]),
            Some((4294967295, 4294967294))
        );
        assert_eq!(equation.side_totals("H", &[4294967294, 4294967295]), None);
        // the sum overflows even though every product fits
        let equation = parse_equation("H + H + H -> H2").unwrap();
        assert_eq!(equation.side_totals("H", &[i64::MAX / 2, i64::MAX / 2, 2, 1]), None);

        let equation = parse_equation("4294967295H4294967295 -> H2").unwrap();
        assert!(!equation.is_balanced_as_written());
    }
}
