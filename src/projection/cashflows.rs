//! Annual projection rows and whole-run summary

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which household members are alive in a projection year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LivingStatus {
    BothAlive,
    UserOnly,
    SpouseOnly,
    BothPassed,
}

impl LivingStatus {
    /// 2x2 classification of the two aliveness flags
    pub fn classify(user_alive: bool, spouse_alive: bool) -> Self {
        match (user_alive, spouse_alive) {
            (true, true) => LivingStatus::BothAlive,
            (true, false) => LivingStatus::UserOnly,
            (false, true) => LivingStatus::SpouseOnly,
            (false, false) => LivingStatus::BothPassed,
        }
    }

    pub fn user_alive(&self) -> bool {
        matches!(self, LivingStatus::BothAlive | LivingStatus::UserOnly)
    }

    pub fn spouse_alive(&self) -> bool {
        matches!(self, LivingStatus::BothAlive | LivingStatus::SpouseOnly)
    }
}

/// Ages reached during a projection year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ages {
    pub user: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spouse: Option<i32>,
}

/// A single row of projection output for one calendar year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualProjection {
    // Timing
    pub year: i32,
    pub age: Ages,
    pub living_status: LivingStatus,

    // Income
    pub income_user: f64,
    pub income_spouse: f64,
    pub total_income: f64,

    // Portfolio roll-forward (base case)
    pub portfolio_value_before: f64,
    pub contributions: f64,
    pub investment_growth: f64,
    pub required_minimum_distribution: f64,
    pub withdrawals: f64,
    pub portfolio_value_after: f64,

    // Scenario bands
    pub portfolio_value_after_lower_limit: f64,
    pub portfolio_value_after_upper_limit: f64,

    // Spending
    pub expenses: f64,
    pub surplus: f64,

    /// Per-account balances at the start of the year, keyed by account id
    pub account_balances: BTreeMap<String, f64>,
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    /// Yearly rows, current year through the horizon
    pub projections: Vec<AnnualProjection>,

    /// First year the base case meets the inflation-adjusted goal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_achieving_year: Option<i32>,

    /// 1.0 if the goal is reached in any year, else 0.0
    pub goal_achievement_probability: f64,

    pub final_portfolio_value: f64,
    pub total_contributions: f64,
    pub total_withdrawals: f64,
}

impl ProjectionSummary {
    /// Build the summary statistics around a finished sequence of rows
    pub fn from_projections(projections: Vec<AnnualProjection>, goal_achieving_year: Option<i32>) -> Self {
        let total_contributions = projections.iter().fold(0.0, |total, p| total + p.contributions);
        let total_withdrawals = projections.iter().fold(0.0, |total, p| total + p.withdrawals);
        let final_portfolio_value = projections.last().map(|p| p.portfolio_value_after).unwrap_or(0.0);

        Self {
            projections,
            goal_achieving_year,
            goal_achievement_probability: if goal_achieving_year.is_some() { 1.0 } else { 0.0 },
            final_portfolio_value,
            total_contributions,
            total_withdrawals,
        }
    }

    /// Row for a calendar year, if projected
    pub fn year(&self, year: i32) -> Option<&AnnualProjection> {
        self.projections.iter().find(|p| p.year == year)
    }

    pub fn first_year(&self) -> Option<i32> {
        self.projections.first().map(|p| p.year)
    }

    pub fn last_year(&self) -> Option<i32> {
        self.projections.last().map(|p| p.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(year: i32, contributions: f64, withdrawals: f64, after: f64) -> AnnualProjection {
        AnnualProjection {
            year,
            age: Ages { user: year - 1970, spouse: None },
            living_status: LivingStatus::UserOnly,
            income_user: 0.0,
            income_spouse: 0.0,
            total_income: 0.0,
            portfolio_value_before: 0.0,
            contributions,
            investment_growth: 0.0,
            required_minimum_distribution: 0.0,
            withdrawals,
            portfolio_value_after: after,
            portfolio_value_after_lower_limit: after,
            portfolio_value_after_upper_limit: after,
            expenses: 0.0,
            surplus: 0.0,
            account_balances: BTreeMap::new(),
        }
    }

    #[test]
    fn test_classify_living_status() {
        assert_eq!(LivingStatus::classify(true, true), LivingStatus::BothAlive);
        assert_eq!(LivingStatus::classify(true, false), LivingStatus::UserOnly);
        assert_eq!(LivingStatus::classify(false, true), LivingStatus::SpouseOnly);
        assert_eq!(LivingStatus::classify(false, false), LivingStatus::BothPassed);
        assert!(LivingStatus::SpouseOnly.spouse_alive());
        assert!(!LivingStatus::SpouseOnly.user_alive());
    }

    #[test]
    fn test_summary_totals() {
        let summary = ProjectionSummary::from_projections(
            vec![row(2024, 100.0, 0.0, 1_100.0), row(2025, 50.0, 300.0, 900.0)],
            Some(2024),
        );

        assert_eq!(summary.total_contributions, 150.0);
        assert_eq!(summary.total_withdrawals, 300.0);
        assert_eq!(summary.final_portfolio_value, 900.0);
        assert_eq!(summary.goal_achievement_probability, 1.0);
        assert_eq!(summary.first_year(), Some(2024));
        assert_eq!(summary.last_year(), Some(2025));
        assert_eq!(summary.year(2025).map(|p| p.withdrawals), Some(300.0));
    }

    #[test]
    fn test_empty_summary() {
        let summary = ProjectionSummary::from_projections(Vec::new(), None);
        assert_eq!(summary.final_portfolio_value, 0.0);
        assert!(summary.total_contributions.is_sign_positive());
        assert!(summary.total_withdrawals.is_sign_positive());
        assert_eq!(summary.goal_achievement_probability, 0.0);
    }

    #[test]
    fn test_living_status_serializes_camel_case() {
        let json = serde_json::to_string(&LivingStatus::BothPassed).unwrap();
        assert_eq!(json, "\"bothPassed\"");
    }
}
