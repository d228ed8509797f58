#![allow(non_snake_case)]
use ChemBalance::Balancer::balance_api::{BalanceResult, EquationBalancer};
use ChemBalance::cli::cli_main::{print_result, run_interactive_menu};
use ChemBalance::settings::{BalancerSettings, DEFAULT_CONFIG_FILE};
use clap::Parser;
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::error::Error;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "chem_balance", about = "Balancing of chemical equations", version)]
struct Cli {
    /// Equations to balance, e.g. "CH4 + O2 -> CO2 + H2O". Interactive menu if omitted
    equations: Vec<String>,

    /// Print each result as JSON
    #[arg(long)]
    json: bool,

    /// Settings file
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn run(cli: Cli) -> Result<bool, Box<dyn Error>> {
    let settings = BalancerSettings::load(&cli.config)?;
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        settings.level_filter()?
    };
    TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto)?;
    let balancer = EquationBalancer::new(&settings)?;

    if cli.equations.is_empty() {
        run_interactive_menu(&balancer, &settings)?;
        return Ok(true);
    }
    let results: Vec<BalanceResult> = cli
        .equations
        .iter()
        .map(|equation| balancer.balance(equation))
        .collect();
    for result in &results {
        if cli.json {
            println!("{}", result.to_json()?);
        } else {
            print_result(result);
        }
    }
    Ok(results.iter().all(BalanceResult::is_balanced))
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
