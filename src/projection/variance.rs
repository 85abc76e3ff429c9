//! Comparison of recorded portfolio values against the projection

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::cashflows::AnnualProjection;
use crate::household::PortfolioSnapshot;

/// Difference between the latest actual value and the projected one
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variance {
    /// Actual minus projected; zero when nothing can be compared
    pub variance: f64,
    pub last_actual: f64,
    pub last_projected: f64,
}

/// Compare the most recent snapshot to the base case for its calendar year
///
/// `snapshots` must be in chronological order; the last element is taken
/// as the most recent.
pub fn calculate_variance(snapshots: &[PortfolioSnapshot], projections: &[AnnualProjection]) -> Variance {
    let Some(last) = snapshots.last() else {
        return Variance::default();
    };

    match projections.iter().find(|p| p.year == last.date.year()) {
        Some(projected) => Variance {
            variance: last.total_value - projected.portfolio_value_after,
            last_actual: last.total_value,
            last_projected: projected.portfolio_value_after,
        },
        None => Variance {
            variance: 0.0,
            last_actual: last.total_value,
            last_projected: 0.0,
        },
    }
}

/// Sort snapshots oldest first
pub fn sort_snapshots_chronologically(snapshots: &mut [PortfolioSnapshot]) {
    snapshots.sort_by_key(|s| s.date);
}

/// Headline numbers of the tracking history
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingStats {
    pub latest_value: f64,
    pub snapshot_count: usize,

    /// Latest minus earliest value (None with fewer than two snapshots)
    pub growth_since_first: Option<f64>,

    /// Growth relative to the earliest value
    pub growth_pct_since_first: Option<f64>,
}

impl TrackingStats {
    /// Summarize snapshots in any order; None when there are none
    pub fn from_snapshots(snapshots: &[PortfolioSnapshot]) -> Option<Self> {
        let latest = snapshots.iter().max_by_key(|s| s.date)?;
        let earliest = snapshots.iter().min_by_key(|s| s.date)?;

        let (growth, growth_pct) = if snapshots.len() > 1 {
            let growth = latest.total_value - earliest.total_value;
            let pct = if earliest.total_value != 0.0 {
                Some(growth / earliest.total_value)
            } else {
                None
            };
            (Some(growth), pct)
        } else {
            (None, None)
        };

        Some(Self {
            latest_value: latest.total_value,
            snapshot_count: snapshots.len(),
            growth_since_first: growth,
            growth_pct_since_first: growth_pct,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{Ages, LivingStatus};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn projection(year: i32, after: f64) -> AnnualProjection {
        AnnualProjection {
            year,
            age: Ages { user: 50, spouse: None },
            living_status: LivingStatus::UserOnly,
            income_user: 0.0,
            income_spouse: 0.0,
            total_income: 0.0,
            portfolio_value_before: 0.0,
            contributions: 0.0,
            investment_growth: 0.0,
            required_minimum_distribution: 0.0,
            withdrawals: 0.0,
            portfolio_value_after: after,
            portfolio_value_after_lower_limit: after,
            portfolio_value_after_upper_limit: after,
            expenses: 0.0,
            surplus: 0.0,
            account_balances: BTreeMap::new(),
        }
    }

    fn snapshot(y: i32, m: u32, d: u32, value: f64) -> PortfolioSnapshot {
        PortfolioSnapshot::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), value)
    }

    #[test]
    fn test_variance_against_matching_year() {
        let projections = vec![projection(2024, 291_000.0), projection(2025, 334_870.0)];
        let snapshots = vec![snapshot(2024, 6, 1, 280_000.0), snapshot(2025, 3, 31, 340_000.0)];

        let v = calculate_variance(&snapshots, &projections);
        assert_relative_eq!(v.variance, 5_130.0, max_relative = 1e-12);
        assert_eq!(v.last_actual, 340_000.0);
        assert_eq!(v.last_projected, 334_870.0);
    }

    #[test]
    fn test_variance_without_snapshots() {
        let v = calculate_variance(&[], &[projection(2024, 1.0)]);
        assert_eq!(v, Variance::default());
    }

    #[test]
    fn test_variance_without_matching_year() {
        let v = calculate_variance(&[snapshot(2030, 1, 1, 500.0)], &[projection(2024, 1.0)]);
        assert_eq!(v.variance, 0.0);
        assert_eq!(v.last_actual, 500.0);
        assert_eq!(v.last_projected, 0.0);
    }

    #[test]
    fn test_last_element_is_most_recent() {
        let mut snapshots = vec![snapshot(2025, 1, 1, 10.0), snapshot(2024, 1, 1, 5.0)];
        let projections = vec![projection(2024, 4.0), projection(2025, 8.0)];

        // Unsorted input compares the last element as given
        assert_eq!(calculate_variance(&snapshots, &projections).last_projected, 4.0);

        sort_snapshots_chronologically(&mut snapshots);
        assert_eq!(calculate_variance(&snapshots, &projections).variance, 2.0);
    }

    #[test]
    fn test_tracking_stats() {
        let snapshots = vec![snapshot(2025, 1, 1, 120.0), snapshot(2024, 1, 1, 100.0)];
        let stats = TrackingStats::from_snapshots(&snapshots).unwrap();

        assert_eq!(stats.latest_value, 120.0);
        assert_eq!(stats.snapshot_count, 2);
        assert_eq!(stats.growth_since_first, Some(20.0));
        assert_relative_eq!(stats.growth_pct_since_first.unwrap(), 0.2, max_relative = 1e-12);

        let single = TrackingStats::from_snapshots(&snapshots[..1]).unwrap();
        assert_eq!(single.growth_since_first, None);
        assert!(TrackingStats::from_snapshots(&[]).is_none());
    }
}
