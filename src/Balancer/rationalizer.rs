use crate::Balancer::balancer_errors::BalanceError;
use crate::Balancer::nullspace_solver::{NullVector, Rational};
use num_integer::Integer;
use num_rational::Ratio;
use num_traits::Signed;

/// limit on continued fraction expansion steps
const MAX_EXPANSION_STEPS: usize = 64;
/// remainder below which a continued fraction expansion is treated as terminated
const EXPANSION_EPS: f64 = 1e-12;

/// Turns a null space vector into the smallest positive integer coefficients
#[derive(Debug, Clone, Copy)]
pub struct Rationalizer {
    /// largest denominator accepted when approximating floats by rationals
    pub max_denominator: i64,
    /// accepted relative distance between a float and its rational approximation
    pub tolerance: f64,
}

impl Default for Rationalizer {
    fn default() -> Self {
        Self {
            max_denominator: 1000,
            tolerance: 1e-6,
        }
    }
}

impl Rationalizer {
    pub fn new(max_denominator: i64, tolerance: f64) -> Self {
        Self {
            max_denominator,
            tolerance,
        }
    }

    pub fn integerize(&self, vector: &NullVector) -> Result<Vec<i64>, BalanceError> {
        match vector {
            NullVector::Exact(v) => self.normalize_exact(v),
            NullVector::Approximate(v) => self.rationalize(v.as_slice()),
        }
    }

    /// Scale so that the smallest positive entry is 1, approximate every entry by a rational with
    /// denominator <= max_denominator, clear denominators with their LCM and divide by the GCD.
    pub fn rationalize(&self, values: &[f64]) -> Result<Vec<i64>, BalanceError> {
        let min_positive = values
            .iter()
            .copied()
            .filter(|&x| x > 0.0)
            .fold(f64::INFINITY, f64::min);
        if !min_positive.is_finite() {
            return Err(BalanceError::Normalization(
                "the vector has no positive entry".to_string(),
            ));
        }
        let mut rationals = Vec::with_capacity(values.len());
        for &value in values {
            let scaled = value / min_positive;
            if !(scaled > 0.0) {
                return Err(BalanceError::Normalization(format!(
                    "non-positive coefficient ratio {}",
                    scaled
                )));
            }
            let approx = limit_denominator(scaled, self.max_denominator).ok_or_else(|| {
                BalanceError::Normalization(format!("cannot approximate {} by a rational", scaled))
            })?;
            let approx_value = *approx.numer() as f64 / *approx.denom() as f64;
            let error = (approx_value - scaled).abs();
            if error > self.tolerance * scaled {
                return Err(BalanceError::Normalization(format!(
                    "{} is not close to a rational with denominator <= {} (best {}, error {:e})",
                    scaled, self.max_denominator, approx, error
                )));
            }
            rationals.push(Rational::new(*approx.numer() as i128, *approx.denom() as i128));
        }
        reduce_to_minimal_integers(&rationals)
    }

    /// exact rationals need no approximation, only the LCM/GCD reduction
    pub fn normalize_exact(&self, values: &[Rational]) -> Result<Vec<i64>, BalanceError> {
        if let Some(bad) = values.iter().find(|x| !x.is_positive()) {
            return Err(BalanceError::Normalization(format!(
                "non-positive coefficient ratio {}",
                bad
            )));
        }
        reduce_to_minimal_integers(values)
    }
}

/// Best rational approximation of a non-negative x with denominator <= max_denominator,
/// by continued fraction convergents and the final semiconvergent.
pub fn limit_denominator(x: f64, max_denominator: i64) -> Option<Ratio<i64>> {
    if !x.is_finite() || x < 0.0 || max_denominator < 1 || x >= i64::MAX as f64 {
        return None;
    }
    let (mut p0, mut q0, mut p1, mut q1) = (0i64, 1i64, 1i64, 0i64);
    let mut frac = x;
    for _ in 0..MAX_EXPANSION_STEPS {
        let a = frac.floor();
        let a_int = a as i64;
        let q2 = a_int.checked_mul(q1).and_then(|aq| aq.checked_add(q0));
        match q2 {
            Some(q2) if q2 <= max_denominator => {
                let p2 = a_int.checked_mul(p1)?.checked_add(p0)?;
                (p0, q0, p1, q1) = (p1, q1, p2, q2);
            }
            _ => {
                // semiconvergent between the last two convergents
                let k = (max_denominator - q0) / q1;
                let bound1 = Ratio::new(p0 + k * p1, q0 + k * q1);
                let bound2 = Ratio::new(p1, q1);
                let distance = |r: &Ratio<i64>| (*r.numer() as f64 / *r.denom() as f64 - x).abs();
                return if distance(&bound2) <= distance(&bound1) {
                    Some(bound2)
                } else {
                    Some(bound1)
                };
            }
        }
        let remainder = frac - a;
        if remainder < EXPANSION_EPS {
            break;
        }
        frac = 1.0 / remainder;
    }
    Some(Ratio::new(p1, q1))
}

/// multiply by the LCM of the denominators, divide by the GCD of the numerators
fn reduce_to_minimal_integers(values: &[Rational]) -> Result<Vec<i64>, BalanceError> {
    let lcm = values
        .iter()
        .fold(1i128, |acc, x| acc.lcm(x.denom()));
    let integers: Vec<i128> = values
        .iter()
        .map(|x| x.numer() * (lcm / x.denom()))
        .collect();
    let gcd = integers.iter().fold(0i128, |acc, x| acc.gcd(x));
    if gcd == 0 {
        return Err(BalanceError::Normalization(
            "all coefficients are zero".to_string(),
        ));
    }
    integers
        .into_iter()
        .map(|x| {
            let reduced = x / gcd;
            if reduced <= 0 {
                return Err(BalanceError::Normalization(format!(
                    "coefficient {} is not positive",
                    reduced
                )));
            }
            i64::try_from(reduced).map_err(|_| {
                BalanceError::Normalization(format!("coefficient {} is too large", reduced))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;

    #[test]
    fn test_limit_denominator() {
        assert_eq!(limit_denominator(0.5, 1000), Some(Ratio::new(1, 2)));
        assert_eq!(limit_denominator(0.333333333, 1000), Some(Ratio::new(1, 3)));
        assert_eq!(limit_denominator(1.5, 1000), Some(Ratio::new(3, 2)));
        assert_eq!(limit_denominator(3.0, 1000), Some(Ratio::new(3, 1)));
        assert_eq!(
            limit_denominator(std::f64::consts::PI, 10),
            Some(Ratio::new(22, 7))
        );
        assert_eq!(
            limit_denominator(std::f64::consts::PI, 1000),
            Some(Ratio::new(355, 113))
        );
        assert_eq!(limit_denominator(-1.0, 1000), None);
        assert_eq!(limit_denominator(f64::NAN, 1000), None);
    }

    #[test]
    fn test_rationalize_unit_vector() {
        // normalized (4, 3, 2), as a float solver would return it
        let norm = (16.0f64 + 9.0 + 4.0).sqrt();
        let values = [4.0 / norm, 3.0 / norm, 2.0 / norm];
        let rationalizer = Rationalizer::default();
        assert_eq!(rationalizer.rationalize(&values).unwrap(), vec![4, 3, 2]);
    }

    #[test]
    fn test_rationalize_reduces_common_factor() {
        let rationalizer = Rationalizer::default();
        assert_eq!(
            rationalizer.rationalize(&[2.0, 4.0, 2.0, 4.0]).unwrap(),
            vec![1, 2, 1, 2]
        );
    }

    #[test]
    fn test_rationalize_rejects_garbled_values() {
        let rationalizer = Rationalizer::new(10, 1e-6);
        let err = rationalizer.rationalize(&[1.0, 1.2345678]).unwrap_err();
        assert!(matches!(err, BalanceError::Normalization(_)));

        let rationalizer = Rationalizer::default();
        assert!(rationalizer.rationalize(&[1.0, -1.0]).is_err());
        assert!(rationalizer.rationalize(&[-1.0, -2.0]).is_err());
        assert!(rationalizer.rationalize(&[1.0, 0.0]).is_err());
    }

    #[test]
    fn test_normalize_exact() {
        let rationalizer = Rationalizer::default();
        let values = vec![Rational::new(1, 1), Rational::new(1, 2), Rational::new(1, 1)];
        assert_eq!(rationalizer.normalize_exact(&values).unwrap(), vec![2, 1, 2]);
        // exact values are not limited by the denominator cap
        let values = vec![Rational::new(1, 1009), Rational::new(1, 1)];
        assert_eq!(rationalizer.normalize_exact(&values).unwrap(), vec![1, 1009]);
        let values = vec![Rational::new(0, 1), Rational::new(1, 1)];
        assert!(rationalizer.normalize_exact(&values).is_err());
    }

    #[test]
    fn test_integerize_dispatch() {
        let rationalizer = Rationalizer::default();
        let approx = NullVector::Approximate(DVector::from_vec(vec![0.25, 0.5, 0.25, 0.5]));
        assert_eq!(rationalizer.integerize(&approx).unwrap(), vec![1, 2, 1, 2]);
        let exact = NullVector::Exact(vec![Rational::new(3, 2), Rational::new(1, 1)]);
        assert_eq!(rationalizer.integerize(&exact).unwrap(), vec![3, 2]);
    }
}
