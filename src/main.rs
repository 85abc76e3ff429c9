//! Retirement Projection CLI
//!
//! Projects a household snapshot year by year, prints the table and writes
//! the CSV export.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::{Datelike, Local};
use clap::Parser;
use log::info;

use retirement_projection::{
    household::load_calculator_data,
    projection::{export_file_name, write_projection_csv},
    Assumptions, CalculatorData, ProjectionEngine, ScenarioRunner,
};

#[derive(Debug, Parser)]
#[command(name = "retirement_projection")]
struct Args {
    /// Calculator data JSON file
    #[arg(long, conflicts_with = "default")]
    snapshot: Option<PathBuf>,

    /// Project the starter household instead of a file
    #[arg(long)]
    default: bool,

    /// RMD divisor table (`age,divisor` CSV)
    #[arg(long)]
    rmd_table: Option<PathBuf>,

    /// Replace the growth bands with a named scenario
    #[arg(long)]
    scenario: Option<String>,

    /// CSV output path (defaults to retirement-projections-<today>.csv)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Rows printed to the console
    #[arg(long, default_value_t = 15)]
    rows: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let today = Local::now().date_naive();

    println!("Retirement Projection v0.1.0");
    println!("============================\n");

    let data = match (&args.snapshot, args.default) {
        (Some(path), _) => load_calculator_data(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        (None, true) => CalculatorData::default_snapshot(today.year()),
        (None, false) => bail!("pass --snapshot <file> or --default"),
    };

    let assumptions = match &args.rmd_table {
        Some(path) => Assumptions::with_rmd_csv(path)
            .with_context(|| format!("failed to load RMD table {}", path.display()))?,
        None => Assumptions::default(),
    };

    let household = &data.household;
    println!("Household ({})", household.current_year);
    println!(
        "  {}: born {}, retires at {}, plan to age {}",
        household.user.name, household.user.birth_year, household.user.retirement_age, household.user.life_expectancy_age
    );
    if let Some(spouse) = household.active_spouse() {
        println!(
            "  {}: born {}, retires at {}, plan to age {}",
            spouse.name, spouse.birth_year, spouse.retirement_age, spouse.life_expectancy_age
        );
    }
    for account in &data.accounts {
        println!(
            "  {:<20} {:<16} {:?} ${:.2}",
            account.name,
            account.account_type.as_str(),
            account.owner,
            account.current_value
        );
    }
    println!("  Current value: ${:.2}", data.current_portfolio_value());
    println!();

    let runner = ScenarioRunner::with_engine(data, ProjectionEngine::new(assumptions));
    let summary = match &args.scenario {
        Some(name) => match runner.run_scenario(name) {
            Some(result) => result?,
            None => bail!(
                "unknown scenario '{}' (available: {})",
                name,
                runner.scenario_names().collect::<Vec<_>>().join(", ")
            ),
        },
        None => runner.run()?,
    };

    println!("Projection Results ({} years):", summary.projections.len());
    println!(
        "{:>5} {:>4} {:>4} {:>12} {:>14} {:>12} {:>12} {:>12} {:>14} {:>14} {:>14}",
        "Year", "Age", "Sp", "Status", "Income", "Contrib", "RMD", "Withdraw", "Portfolio", "Lower", "Upper"
    );
    println!("{}", "-".repeat(130));

    for row in summary.projections.iter().take(args.rows) {
        println!(
            "{:>5} {:>4} {:>4} {:>12} {:>14.2} {:>12.2} {:>12.2} {:>12.2} {:>14.2} {:>14.2} {:>14.2}",
            row.year,
            row.age.user,
            row.age.spouse.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string()),
            format!("{:?}", row.living_status),
            row.total_income,
            row.contributions,
            row.required_minimum_distribution,
            row.withdrawals,
            row.portfolio_value_after,
            row.portfolio_value_after_lower_limit,
            row.portfolio_value_after_upper_limit,
        );
    }

    if summary.projections.len() > args.rows {
        println!("... ({} more years)", summary.projections.len() - args.rows);
    }

    let csv_path = args.output.unwrap_or_else(|| PathBuf::from(export_file_name(today)));
    let file = File::create(&csv_path).with_context(|| format!("unable to create {}", csv_path.display()))?;
    write_projection_csv(BufWriter::new(file), &summary.projections)?;
    info!("Wrote {} rows to {}", summary.projections.len(), csv_path.display());
    println!("\nFull results written to: {}", csv_path.display());

    println!("\nSummary:");
    println!("  Final Portfolio: ${:.2}", summary.final_portfolio_value);
    println!("  Total Contributions: ${:.2}", summary.total_contributions);
    println!("  Total Withdrawals: ${:.2}", summary.total_withdrawals);
    match summary.goal_achieving_year {
        Some(year) => println!("  Goal reached in: {}", year),
        None => println!("  Goal not reached within the horizon"),
    }

    Ok(())
}
