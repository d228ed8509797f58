use super::cli_main::{get_user_input, print_result};
use crate::Balancer::balance_api::EquationBalancer;
use std::io::{self, BufRead, Write};

/// equations shown in the examples menu
pub const EXAMPLE_EQUATIONS: [(&str, &str); 6] = [
    ("Water synthesis", "H2 + O2 -> H2O"),
    ("Methane combustion", "CH4 + O2 -> CO2 + H2O"),
    ("Iron oxidation", "Fe + O2 -> Fe2O3"),
    ("Ammonia synthesis", "N2 + H2 = NH3"),
    ("Limestone decomposition", "CaCO3 → CaO + CO2"),
    ("Permanganate and hydrochloric acid", "KMnO4 + HCl -> KCl + MnCl2 + H2O + Cl2"),
];

pub fn examples_menu(input: &mut impl BufRead, balancer: &EquationBalancer) -> io::Result<()> {
    loop {
        println!("\n=== Examples ===");
        for (i, (name, equation)) in EXAMPLE_EQUATIONS.iter().enumerate() {
            println!("{}. {}: {}", i + 1, name, equation);
        }
        println!("0. Back to main menu");
        print!("Enter your choice: ");
        io::stdout().flush()?;

        let Some(choice) = get_user_input(input)? else {
            break;
        };
        match choice.trim() {
            "0" => break,
            other => match other.parse::<usize>() {
                Ok(n) if (1..=EXAMPLE_EQUATIONS.len()).contains(&n) => {
                    print_result(&balancer.balance(EXAMPLE_EQUATIONS[n - 1].1))
                }
                _ => println!("Invalid choice. Please try again."),
            },
        }
    }
    Ok(())
}
