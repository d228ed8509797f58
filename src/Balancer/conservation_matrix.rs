use crate::Balancer::equation_parser::Equation;
use log::debug;
use nalgebra::DMatrix;
use prettytable::{Cell, Row, Table};

/// Signed element-by-compound matrix of an equation.
/// Rows follow the sorted element list, columns are reactants followed by products.
/// Reactant entries are positive atom counts, product entries negative, so a coefficient
/// vector x balances the equation iff A·x = 0.
#[derive(Debug, Clone, PartialEq)]
pub struct ConservationMatrix {
    pub elements: Vec<String>,
    pub compounds: Vec<String>,
    pub matrix: DMatrix<i64>,
}

impl ConservationMatrix {
    pub fn from_equation(equation: &Equation) -> Self {
        let elements = equation.elements().to_vec();
        let compounds: Vec<String> = equation
            .compounds()
            .map(|formula| formula.formula().to_string())
            .collect();
        let n_reactants = equation.reactants().len();
        let mut matrix = DMatrix::<i64>::zeros(elements.len(), compounds.len());
        for (substance_i, formula) in equation.compounds().enumerate() {
            let sign = if substance_i < n_reactants { 1 } else { -1 };
            for (j, element_j) in elements.iter().enumerate() {
                matrix[(j, substance_i)] = sign * formula.count(element_j) as i64;
            }
        }
        debug!("conservation matrix {}x{}: {}", matrix.nrows(), matrix.ncols(), matrix);
        Self {
            elements,
            compounds,
            matrix,
        }
    }

    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn to_f64(&self) -> DMatrix<f64> {
        self.matrix.map(|x| x as f64)
    }

    /// A·x, zero vector for a balancing x. None on i64 overflow
    pub fn apply(&self, coefficients: &[i64]) -> Option<Vec<i64>> {
        (0..self.nrows())
            .map(|row| {
                self.matrix
                    .row(row)
                    .iter()
                    .zip(coefficients)
                    .try_fold(0i64, |acc, (a, x)| acc.checked_add(a.checked_mul(*x)?))
            })
            .collect()
    }

    pub fn pretty_print(&self) {
        let mut table = Table::new();
        let mut header = vec![Cell::new("element")];
        header.extend(self.compounds.iter().map(|c| Cell::new(c)));
        table.add_row(Row::new(header));
        for (j, element) in self.elements.iter().enumerate() {
            let mut row = vec![Cell::new(element)];
            row.extend(self.matrix.row(j).iter().map(|x| Cell::new(&x.to_string())));
            table.add_row(Row::new(row));
        }
        table.printstd();
    }
}
