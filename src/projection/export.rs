//! Spreadsheet export of the yearly projection rows

use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;

use super::cashflows::AnnualProjection;

/// Exported subset of a projection row, in column order
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportRow {
    year: i32,
    portfolio_value_after: f64,
    portfolio_value_after_lower_limit: f64,
    portfolio_value_after_upper_limit: f64,
    contributions: f64,
    withdrawals: f64,
    expenses: f64,
    surplus: f64,
}

impl From<&AnnualProjection> for ExportRow {
    fn from(p: &AnnualProjection) -> Self {
        Self {
            year: p.year,
            portfolio_value_after: p.portfolio_value_after,
            portfolio_value_after_lower_limit: p.portfolio_value_after_lower_limit,
            portfolio_value_after_upper_limit: p.portfolio_value_after_upper_limit,
            contributions: p.contributions,
            withdrawals: p.withdrawals,
            expenses: p.expenses,
            surplus: p.surplus,
        }
    }
}

/// Write one CSV row per projection year, header first
pub fn write_projection_csv<W: Write>(writer: W, projections: &[AnnualProjection]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for projection in projections {
        wtr.serialize(ExportRow::from(projection))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Default export file name for a given day
pub fn export_file_name(date: NaiveDate) -> String {
    format!("retirement-projections-{}.csv", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::household::CalculatorData;
    use crate::projection::ProjectionEngine;

    #[test]
    fn test_csv_header_and_rows() {
        let data = CalculatorData::default_snapshot(2024);
        let summary = ProjectionEngine::default().calculate(&data).unwrap();

        let mut buf = Vec::new();
        write_projection_csv(&mut buf, &summary.projections).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some("year,portfolioValueAfter,portfolioValueAfterLowerLimit,portfolioValueAfterUpperLimit,contributions,withdrawals,expenses,surplus")
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("2024,"));
        assert_eq!(first.split(',').count(), 8);
        assert_eq!(text.lines().count(), summary.projections.len() + 1);
    }

    #[test]
    fn test_empty_projection_writes_nothing() {
        let mut buf = Vec::new();
        write_projection_csv(&mut buf, &[]).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(export_file_name(date), "retirement-projections-2025-03-07.csv");
    }
}
