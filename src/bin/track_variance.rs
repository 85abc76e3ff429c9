//! Compare recorded portfolio values against the projection
//!
//! Reads a calculator data JSON file and a `date,totalValue,notes` CSV of
//! recorded values, then reports how far the latest value is from plan.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Datelike;
use clap::Parser;
use log::info;

use retirement_projection::{
    household::{load_calculator_data, load_portfolio_snapshots},
    projection::{calculate_variance, sort_snapshots_chronologically, TrackingStats},
    ProjectionEngine,
};

#[derive(Debug, Parser)]
#[command(name = "track_variance")]
struct Args {
    /// Calculator data JSON file
    #[arg(long)]
    snapshot: PathBuf,

    /// Recorded portfolio values CSV; defaults to the snapshots in the JSON file
    #[arg(long)]
    history: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let data = load_calculator_data(&args.snapshot)
        .with_context(|| format!("failed to load {}", args.snapshot.display()))?;

    let mut snapshots = match &args.history {
        Some(path) => load_portfolio_snapshots(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => data.portfolio_snapshots.clone(),
    };
    sort_snapshots_chronologically(&mut snapshots);
    info!("Loaded {} recorded values", snapshots.len());

    let summary = ProjectionEngine::default().calculate(&data)?;
    let variance = calculate_variance(&snapshots, &summary.projections);

    println!("Portfolio Tracking");
    println!("==================\n");

    match TrackingStats::from_snapshots(&snapshots) {
        Some(stats) => {
            println!("  Snapshots: {}", stats.snapshot_count);
            println!("  Latest Value: ${:.2}", stats.latest_value);
            if let Some(growth) = stats.growth_since_first {
                print!("  Growth Since First: ${:.2}", growth);
                match stats.growth_pct_since_first {
                    Some(pct) => println!(" ({:+.1}%)", pct * 100.0),
                    None => println!(),
                }
            }
        }
        None => println!("  No recorded values"),
    }

    println!();
    println!("{:>10} {:>14} {:>14}", "Date", "Actual", "Projected");
    println!("{}", "-".repeat(40));
    for snapshot in &snapshots {
        let projected = summary
            .projections
            .iter()
            .find(|p| p.year == snapshot.date.year())
            .map(|p| format!("{:.2}", p.portfolio_value_after))
            .unwrap_or_else(|| "-".to_string());
        println!("{:>10} {:>14.2} {:>14}", snapshot.date.to_string(), snapshot.total_value, projected);
    }

    println!("\nVariance:");
    println!("  Last Actual: ${:.2}", variance.last_actual);
    println!("  Last Projected: ${:.2}", variance.last_projected);
    println!("  Variance: ${:+.2}", variance.variance);

    Ok(())
}
