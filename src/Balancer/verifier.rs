use crate::Balancer::balancer_errors::BalanceError;
use crate::Balancer::equation_parser::{CANONICAL_ARROW, Equation};
use crate::Balancer::formula_parser::ChemicalFormula;
use prettytable::{Cell, Row, Table};

/////////////////////////////////VERIFICATION///////////////////////////////////////////

/// Exact check of the conservation law for every element. A mismatch is reported with the
/// offending element and both totals and is never corrected.
pub fn verify(equation: &Equation, coefficients: &[i64]) -> Result<(), BalanceError> {
    if coefficients.len() != equation.number_of_compounds() {
        return Err(BalanceError::Normalization(format!(
            "expected {} coefficients, got {}",
            equation.number_of_compounds(),
            coefficients.len()
        )));
    }
    for element in equation.elements() {
        let (reactants, products) = totals(equation, element, coefficients)?;
        if reactants != products {
            return Err(BalanceError::Verification {
                element: element.clone(),
                reactants,
                products,
            });
        }
    }
    Ok(())
}

/// side totals of one element, overflow reported as a normalization failure
fn totals(
    equation: &Equation,
    element: &str,
    coefficients: &[i64],
) -> Result<(i64, i64), BalanceError> {
    equation.side_totals(element, coefficients).ok_or_else(|| {
        BalanceError::Normalization(format!(
            "number of {} atoms for coefficients {:?} does not fit in a 64-bit integer",
            element, coefficients
        ))
    })
}

/////////////////////////////////RENDERING///////////////////////////////////////////

fn format_side(formulas: &[ChemicalFormula], coefficients: &[i64]) -> String {
    formulas
        .iter()
        .zip(coefficients)
        .map(|(formula, &coeff)| {
            if coeff == 1 {
                formula.formula().to_string()
            } else {
                format!("{}{}", coeff, formula.formula())
            }
        })
        .collect::<Vec<_>>()
        .join(" + ")
}

/// "2H2 + O2 → 2H2O": coefficient 1 is omitted
pub fn format_balanced_equation(equation: &Equation, coefficients: &[i64]) -> String {
    let n = equation.reactants().len().min(coefficients.len());
    let (reactant_coeffs, product_coeffs) = coefficients.split_at(n);
    format!(
        "{} {} {}",
        format_side(equation.reactants(), reactant_coeffs),
        CANONICAL_ARROW,
        format_side(equation.products(), product_coeffs)
    )
}

/// step-by-step description of the balancing
pub fn generate_steps(
    equation: &Equation,
    coefficients: &[i64],
) -> Result<Vec<String>, BalanceError> {
    let unit = vec![1; equation.number_of_compounds()];
    let mut steps = Vec::new();
    steps.push(format!("Original equation: {}", equation.original()));
    steps.push("Step 1: Identify all elements in the equation".to_string());
    steps.push(format!("   Elements found: {}", equation.elements().join(", ")));

    steps.push("Step 2: Count atoms on each side before balancing".to_string());
    for element in equation.elements() {
        let (r, p) = totals(equation, element, &unit)?;
        steps.push(format!("   {}: Reactants = {}, Products = {}", element, r, p));
    }

    steps.push("Step 3: Apply coefficients to balance atoms".to_string());
    steps.push(format!("   Coefficients: {:?}", coefficients));
    for (formula, coeff) in equation.compounds().zip(coefficients) {
        steps.push(format!("   {} × {}", coeff, formula.formula()));
    }

    steps.push("Step 4: Verify the balanced equation".to_string());
    for element in equation.elements() {
        let (r, p) = totals(equation, element, coefficients)?;
        steps.push(format!("   {}: Reactants = {}, Products = {}", element, r, p));
    }
    steps.push(format!(
        "   Balanced equation: {}",
        format_balanced_equation(equation, coefficients)
    ));
    Ok(steps)
}

pub fn explanation(equation: &Equation) -> String {
    format!(
        "The equation has been balanced. All {} elements are now balanced on both sides.",
        equation.elements().len()
    )
}

/// atoms per element before and after balancing
pub fn atom_count_table(equation: &Equation, coefficients: &[i64]) -> Result<Table, BalanceError> {
    let unit = vec![1; equation.number_of_compounds()];
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("element"),
        Cell::new("reactants (unbalanced)"),
        Cell::new("products (unbalanced)"),
        Cell::new("reactants"),
        Cell::new("products"),
    ]));
    for element in equation.elements() {
        let (r0, p0) = totals(equation, element, &unit)?;
        let (r, p) = totals(equation, element, coefficients)?;
        table.add_row(Row::new(vec![
            Cell::new(element),
            Cell::new(&r0.to_string()),
            Cell::new(&p0.to_string()),
            Cell::new(&r.to_string()),
            Cell::new(&p.to_string()),
        ]));
    }
    Ok(table)
}
