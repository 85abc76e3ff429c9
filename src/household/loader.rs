//! Load household snapshots (JSON) and recorded portfolio values (CSV)

use super::{CalculatorData, PortfolioSnapshot};
use crate::error::LoadError;
use chrono::NaiveDate;
use csv::Reader;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Raw CSV row of a portfolio tracking export
#[derive(Debug, serde::Deserialize)]
struct SnapshotCsvRow {
    #[serde(rename = "date")]
    date: String,
    #[serde(rename = "totalValue")]
    total_value: f64,
    #[serde(rename = "notes", default)]
    notes: Option<String>,
}

impl SnapshotCsvRow {
    fn into_snapshot(self) -> Result<PortfolioSnapshot, LoadError> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|source| {
            LoadError::Date {
                value: self.date.clone(),
                source,
            }
        })?;

        let mut snapshot = PortfolioSnapshot::new(date, self.total_value);
        snapshot.notes = self.notes.filter(|n| !n.is_empty());
        Ok(snapshot)
    }
}

/// Load a complete calculator snapshot from a JSON file
pub fn load_calculator_data<P: AsRef<Path>>(path: P) -> Result<CalculatorData, LoadError> {
    let file = File::open(path)?;
    load_calculator_data_from_reader(BufReader::new(file))
}

/// Load a calculator snapshot from any reader (e.g., string buffer, request body)
pub fn load_calculator_data_from_reader<R: Read>(reader: R) -> Result<CalculatorData, LoadError> {
    let data = serde_json::from_reader(reader)?;
    Ok(data)
}

/// Load recorded portfolio values from a CSV file (`date,totalValue,notes`)
pub fn load_portfolio_snapshots<P: AsRef<Path>>(path: P) -> Result<Vec<PortfolioSnapshot>, LoadError> {
    let reader = Reader::from_path(path)?;
    collect_snapshots(reader)
}

/// Load recorded portfolio values from any reader
pub fn load_portfolio_snapshots_from_reader<R: Read>(reader: R) -> Result<Vec<PortfolioSnapshot>, LoadError> {
    collect_snapshots(Reader::from_reader(reader))
}

fn collect_snapshots<R: Read>(mut reader: Reader<R>) -> Result<Vec<PortfolioSnapshot>, LoadError> {
    let mut snapshots = Vec::new();

    for result in reader.deserialize() {
        let row: SnapshotCsvRow = result?;
        snapshots.push(row.into_snapshot()?);
    }

    Ok(snapshots)
}
