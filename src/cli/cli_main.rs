use super::cli_examples::examples_menu;
use crate::Balancer::balance_api::{BalanceResult, BalancedEquation, EquationBalancer};
use crate::Balancer::conservation_matrix::ConservationMatrix;
use crate::Balancer::equation_parser::parse_equation;
use crate::Balancer::verifier::atom_count_table;
use crate::settings::BalancerSettings;
use prettytable::{Cell, Row, Table};
use std::io::{self, BufRead, Write};

pub fn run_interactive_menu(
    balancer: &EquationBalancer,
    settings: &BalancerSettings,
) -> io::Result<()> {
    run_menu_with_input(&mut io::stdin().lock(), balancer, settings)
}

/// main menu loop reading choices from `input`; returns at "0" or end of input
pub fn run_menu_with_input(
    input: &mut impl BufRead,
    balancer: &EquationBalancer,
    settings: &BalancerSettings,
) -> io::Result<()> {
    loop {
        show_main_menu()?;
        let Some(choice) = get_user_input(input)? else {
            println!();
            break;
        };

        match choice.trim() {
            "1" => balance_menu(input, balancer)?,
            "2" => examples_menu(input, balancer)?,
            "3" => show_settings(settings),
            "0" => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
    Ok(())
}
/* colors
Blue (\x1b[34m) - Welcome header text

Yellow (\x1b[33m) - Menu options

Cyan (\x1b[36m) - prompts

Red (\x1b[31m) - errors

Reset (\x1b[0m) - Returns to normal color after each colored section
*/
fn show_main_menu() -> io::Result<()> {
    println!("\x1b[34m\n Chemical equation balancer \n \x1b[0m");
    println!("\x1b[33m1. Balance an equation\x1b[0m");
    println!("\x1b[33m2. Examples\x1b[0m");
    println!("\x1b[33m3. Show settings\x1b[0m");
    println!("\x1b[33m0. Exit\x1b[0m");
    print!("\x1b[36mEnter your choice: \x1b[0m");
    io::stdout().flush()
}

fn balance_menu(input: &mut impl BufRead, balancer: &EquationBalancer) -> io::Result<()> {
    loop {
        print!("\x1b[36mEnter an equation (empty line to go back): \x1b[0m");
        io::stdout().flush()?;
        let Some(line) = get_user_input(input)? else {
            return Ok(());
        };
        let equation = line.trim();
        if equation.is_empty() {
            return Ok(());
        }
        print_result(&balancer.balance(equation));
    }
}

fn show_settings(settings: &BalancerSettings) {
    let mut table = Table::new();
    table.add_row(Row::new(vec![Cell::new("setting"), Cell::new("value")]));
    let chain = settings
        .effective_chain()
        .iter()
        .map(|kind| format!("{:?}", kind))
        .collect::<Vec<_>>()
        .join(" -> ");
    let rows = [
        ("exact_arithmetic", settings.exact_arithmetic.to_string()),
        ("solver_chain", chain),
        ("max_denominator", settings.max_denominator.to_string()),
        (
            "approximation_tolerance",
            format!("{:e}", settings.approximation_tolerance),
        ),
        ("rank_tolerance", format!("{:e}", settings.rank_tolerance)),
        ("log_level", settings.log_level.clone()),
    ];
    for (name, value) in rows {
        table.add_row(Row::new(vec![Cell::new(name), Cell::new(&value)]));
    }
    table.printstd();
}

/// coefficients of every formula, reactants first
pub fn coefficient_table(balanced: &BalancedEquation) -> Table {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("side"),
        Cell::new("formula"),
        Cell::new("coefficient"),
    ]));
    let sides = [
        ("reactant", &balanced.coefficients.reactants),
        ("product", &balanced.coefficients.products),
    ];
    for (side, coefficients) in sides {
        for (formula, coeff) in coefficients {
            table.add_row(Row::new(vec![
                Cell::new(side),
                Cell::new(formula),
                Cell::new(&coeff.to_string()),
            ]));
        }
    }
    table
}

pub fn print_result(result: &BalanceResult) {
    match result {
        BalanceResult::Balanced(balanced) => {
            println!("\n\x1b[34m{}\x1b[0m", balanced.balanced_equation);
            coefficient_table(balanced).printstd();
            if let Ok(equation) = parse_equation(&balanced.original_equation) {
                ConservationMatrix::from_equation(&equation).pretty_print();
                if let Ok(table) = atom_count_table(&equation, &balanced.ordered_coefficients) {
                    table.printstd();
                }
            }
            for step in &balanced.steps {
                println!("{}", step);
            }
            println!("{}", balanced.explanation);
        }
        BalanceResult::Failed(failure) => {
            println!("\x1b[31m{}\x1b[0m", failure.error);
        }
    }
}

/// one line of input, None once the input is exhausted
pub(crate) fn get_user_input(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}
