//! Running portfolio state carried from one projection year to the next

use std::collections::BTreeMap;

use crate::household::CalculatorData;

/// Aggregate money movements decided for one year
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct YearFlows {
    pub contributions: f64,
    pub investment_growth: f64,
    pub growth_lower: f64,
    pub growth_upper: f64,
    pub withdrawals: f64,
}

/// Portfolio state at a point in time during projection
///
/// Owned exclusively by one calculation; nothing here survives the call.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionState {
    /// Base-case portfolio value
    pub portfolio_value: f64,

    /// Conservative band running total
    pub portfolio_value_lower: f64,

    /// Optimistic band running total
    pub portfolio_value_upper: f64,

    /// Per-account balances keyed by account id
    pub account_balances: BTreeMap<String, f64>,
}

impl ProjectionState {
    /// Initialize state from the snapshot's current account values
    pub fn from_data(data: &CalculatorData) -> Self {
        let portfolio_value = data.current_portfolio_value();
        let account_balances = data
            .accounts
            .iter()
            .map(|account| (account.id.clone(), account.current_value))
            .collect();

        Self {
            portfolio_value,
            portfolio_value_lower: portfolio_value,
            portfolio_value_upper: portfolio_value,
            account_balances,
        }
    }

    /// Roll the three tracks forward, each floored at zero
    ///
    /// The bands share contributions and withdrawals with the base case but
    /// grow by their own figures.
    pub fn apply_flows(&mut self, flows: &YearFlows) {
        self.portfolio_value = roll_forward(self.portfolio_value, flows.contributions, flows.investment_growth, flows.withdrawals);
        self.portfolio_value_lower = roll_forward(self.portfolio_value_lower, flows.contributions, flows.growth_lower, flows.withdrawals);
        self.portfolio_value_upper = roll_forward(self.portfolio_value_upper, flows.contributions, flows.growth_upper, flows.withdrawals);
    }

    /// Sum of the per-account balances
    pub fn total_account_value(&self) -> f64 {
        self.account_balances.values().fold(0.0, |total, b| total + *b)
    }

    /// Spread the year's aggregate flows across accounts by pre-update share
    ///
    /// Balances are left alone when the accounts hold nothing.
    pub fn reallocate_accounts(&mut self, flows: &YearFlows) {
        let total = self.total_account_value();
        if total <= 0.0 {
            return;
        }

        for balance in self.account_balances.values_mut() {
            let proportion = *balance / total;
            let contribution = flows.contributions * proportion;
            let growth = flows.investment_growth * proportion;
            let withdrawal = flows.withdrawals * proportion;
            *balance = (*balance + contribution + growth - withdrawal).max(0.0);
        }
    }
}

fn roll_forward(value: f64, contributions: f64, growth: f64, withdrawals: f64) -> f64 {
    (value + contributions + growth - withdrawals).max(0.0)
}
