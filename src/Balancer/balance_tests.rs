/////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// TESTS
//////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use crate::Balancer::balance_api::{BalanceResult, EquationBalancer, balance};
    use crate::Balancer::balancer_errors::ErrorKind;
    use crate::Balancer::equation_parser::parse_equation;
    use crate::Balancer::nullspace_solver::SolverKind;
    use crate::Balancer::verifier::verify;
    use crate::settings::BalancerSettings;
    use num_integer::Integer;
    use std::collections::BTreeMap;

    fn side(pairs: &[(&str, i64)]) -> BTreeMap<String, i64> {
        pairs.iter().map(|(f, c)| (f.to_string(), *c)).collect()
    }

    fn check_scenario(
        equation: &str,
        reactants: &[(&str, i64)],
        products: &[(&str, i64)],
        rendered: Option<&str>,
    ) {
        let result = balance(equation);
        let balanced = result
            .balanced()
            .unwrap_or_else(|| panic!("{} was not balanced: {:?}", equation, result.error()));
        assert_eq!(balanced.coefficients.reactants, side(reactants));
        assert_eq!(balanced.coefficients.products, side(products));
        if let Some(rendered) = rendered {
            assert_eq!(balanced.balanced_equation, rendered);
        }
    }

    #[test]
    fn test_water_synthesis() {
        check_scenario(
            "H2 + O2 -> H2O",
            &[("H2", 2), ("O2", 1)],
            &[("H2O", 2)],
            Some("2H2 + O2 → 2H2O"),
        );
    }

    #[test]
    fn test_methane_combustion() {
        check_scenario(
            "CH4 + O2 -> CO2 + H2O",
            &[("CH4", 1), ("O2", 2)],
            &[("CO2", 1), ("H2O", 2)],
            Some("CH4 + 2O2 → CO2 + 2H2O"),
        );
    }

    #[test]
    fn test_iron_oxidation() {
        check_scenario(
            "Fe + O2 -> Fe2O3",
            &[("Fe", 4), ("O2", 3)],
            &[("Fe2O3", 2)],
            Some("4Fe + 3O2 → 2Fe2O3"),
        );
    }

    #[test]
    fn test_already_balanced() {
        check_scenario(
            "CaCO3 -> CaO + CO2",
            &[("CaCO3", 1)],
            &[("CaO", 1), ("CO2", 1)],
            Some("CaCO3 → CaO + CO2"),
        );
    }

    #[test]
    fn test_ammonia_synthesis() {
        check_scenario(
            "N2 + H2 -> NH3",
            &[("N2", 1), ("H2", 3)],
            &[("NH3", 2)],
            Some("N2 + 3H2 → 2NH3"),
        );
    }

    #[test]
    fn test_element_absent_from_one_side() {
        let result = balance("Na -> Cl");
        let failure = result.error().expect("Na -> Cl must not balance");
        assert_eq!(failure.error_kind, ErrorKind::Unbalanceable);
    }

    #[test]
    fn test_more_equations() {
        check_scenario(
            "KMnO4 + HCl -> KCl + MnCl2 + H2O + Cl2",
            &[("KMnO4", 2), ("HCl", 16)],
            &[("KCl", 2), ("MnCl2", 2), ("H2O", 8), ("Cl2", 5)],
            None,
        );
        check_scenario(
            "C6H12O6 + O2 → CO2 + H2O",
            &[("C6H12O6", 1), ("O2", 6)],
            &[("CO2", 6), ("H2O", 6)],
            None,
        );
        check_scenario(
            "NH3 + O2 = NO + H2O",
            &[("NH3", 4), ("O2", 5)],
            &[("NO", 4), ("H2O", 6)],
            None,
        );
        check_scenario(
            "Fe2O3 + CO => Fe + CO2",
            &[("Fe2O3", 1), ("CO", 3)],
            &[("Fe", 2), ("CO2", 3)],
            None,
        );
    }

    #[test]
    fn test_parse_errors_are_data() {
        for text in ["", "H2 + O2", "A -> B -> C", "Ca(OH)2 -> CaO + H2O", "-> H2O"] {
            match balance(text) {
                BalanceResult::Failed(failure) => {
                    assert_eq!(failure.error_kind, ErrorKind::Parse, "{}", text)
                }
                BalanceResult::Balanced(b) => panic!("{} balanced to {}", text, b.balanced_equation),
            }
        }
    }

    #[test]
    fn test_atom_counts_near_integer_limits() {
        check_scenario(
            "H4294967295 -> H4294967295",
            &[("H4294967295", 1)],
            &[("H4294967295", 1)],
            Some("H4294967295 → H4294967295"),
        );
        check_scenario(
            "H4294967294 -> H2147483647",
            &[("H4294967294", 1)],
            &[("H2147483647", 2)],
            None,
        );
        // coefficients fit, the atom totals they produce do not
        for text in ["H4294967295 -> H4294967294", "O4294967295 + H2 -> H2O4294967294"] {
            let result = balance(text);
            let failure = result.error().unwrap_or_else(|| panic!("{} balanced", text));
            assert_eq!(failure.error_kind, ErrorKind::Normalization, "{}", text);
        }
    }

    const PROPERTY_EQUATIONS: [&str; 8] = [
        "H2 + O2 -> H2O",
        "CH4 + O2 -> CO2 + H2O",
        "Fe + O2 -> Fe2O3",
        "CaCO3 -> CaO + CO2",
        "N2 + H2 -> NH3",
        "C3H8 + O2 -> CO2 + H2O",
        "KMnO4 + HCl -> KCl + MnCl2 + H2O + Cl2",
        "Al + H2SO4 -> Al2S3O12 + H2",
    ];

    #[test]
    fn test_conservation_minimality_positivity() {
        for text in PROPERTY_EQUATIONS {
            let balanced = EquationBalancer::default().try_balance(text).unwrap();
            let coefficients = &balanced.ordered_coefficients;
            let equation = parse_equation(text).unwrap();
            for element in equation.elements() {
                let (r, p) = equation.side_totals(element, coefficients).unwrap();
                assert_eq!(r, p, "{} in {}", element, text);
            }
            assert!(coefficients.iter().all(|&c| c >= 1), "{}", text);
            let gcd = coefficients.iter().fold(0i64, |acc, c| acc.gcd(c));
            assert_eq!(gcd, 1, "{}", text);
        }
    }

    #[test]
    fn test_determinism() {
        let balancer = EquationBalancer::default();
        for text in PROPERTY_EQUATIONS {
            let first = balancer.balance(text);
            let second = balancer.balance(text);
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_round_trip_of_rendered_equation() {
        for text in PROPERTY_EQUATIONS {
            let balanced = EquationBalancer::default().try_balance(text).unwrap();
            let reparsed = parse_equation(&balanced.balanced_equation).unwrap();
            assert_eq!(reparsed.stated_coefficients(), balanced.ordered_coefficients.as_slice());
            assert!(reparsed.is_balanced_as_written(), "{}", balanced.balanced_equation);
            assert!(verify(&reparsed, reparsed.stated_coefficients()).is_ok());
            // balancing the rendered string again gives the same result
            let again = EquationBalancer::default()
                .try_balance(&balanced.balanced_equation)
                .unwrap();
            assert_eq!(again.balanced_equation, balanced.balanced_equation);
        }
    }

    #[test]
    fn test_float_strategies_agree_with_exact() {
        let exact = EquationBalancer::default();
        for kind in [SolverKind::Qr, SolverKind::Svd] {
            let settings = BalancerSettings {
                solver_chain: vec![kind],
                ..Default::default()
            };
            let float = EquationBalancer::new(&settings).unwrap();
            for text in PROPERTY_EQUATIONS {
                assert_eq!(
                    float.try_balance(text).unwrap().ordered_coefficients,
                    exact.try_balance(text).unwrap().ordered_coefficients,
                    "{:?} on {}",
                    kind,
                    text
                );
            }
        }
    }

    #[test]
    fn test_shared_balancer_across_threads() {
        let balancer = EquationBalancer::default();
        std::thread::scope(|scope| {
            let handles: Vec<_> = PROPERTY_EQUATIONS
                .iter()
                .map(|text| {
                    let balancer = &balancer;
                    scope.spawn(move || balancer.balance(text))
                })
                .collect();
            for (handle, text) in handles.into_iter().zip(PROPERTY_EQUATIONS) {
                let result = handle.join().unwrap();
                assert_eq!(result, EquationBalancer::default().balance(text));
            }
        });
    }
}
