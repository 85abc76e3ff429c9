//! Scenario runner for what-if projections
//!
//! Holds a base snapshot and an engine, then projects the snapshot as-is or
//! with a named scenario's growth band swapped in.

use log::debug;
use rayon::prelude::*;

use crate::error::CalculationError;
use crate::household::{CalculatorData, RetirementScenario};
use crate::projection::{ProjectionEngine, ProjectionSummary};

/// Pre-built scenario runner over one household snapshot
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(data);
/// for (name, result) in runner.run_all() {
///     println!("{name}: {:?}", result?.final_portfolio_value);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    base: CalculatorData,
    engine: ProjectionEngine,
}

impl ScenarioRunner {
    /// Create runner with the default RMD table
    pub fn new(base: CalculatorData) -> Self {
        Self {
            base,
            engine: ProjectionEngine::default(),
        }
    }

    /// Create runner with a pre-built engine
    pub fn with_engine(base: CalculatorData, engine: ProjectionEngine) -> Self {
        Self { base, engine }
    }

    /// Project the base snapshot unchanged
    pub fn run(&self) -> Result<ProjectionSummary, CalculationError> {
        self.engine.calculate(&self.base)
    }

    /// Project with a named scenario's band; None if the name is unknown
    pub fn run_scenario(&self, name: &str) -> Option<Result<ProjectionSummary, CalculationError>> {
        let scenario = self.base.scenarios.get(name)?;
        Some(self.project_with(name, scenario))
    }

    /// Project every named scenario in parallel, in name order
    pub fn run_all(&self) -> Vec<(String, Result<ProjectionSummary, CalculationError>)> {
        let scenarios: Vec<_> = self.base.scenarios.iter().collect();
        scenarios
            .par_iter()
            .map(|(name, scenario)| ((*name).clone(), self.project_with(name, scenario)))
            .collect()
    }

    /// Names of the scenarios in the snapshot
    pub fn scenario_names(&self) -> impl Iterator<Item = &str> {
        self.base.scenarios.keys().map(String::as_str)
    }

    pub fn base(&self) -> &CalculatorData {
        &self.base
    }

    pub fn engine(&self) -> &ProjectionEngine {
        &self.engine
    }

    fn project_with(&self, name: &str, scenario: &RetirementScenario) -> Result<ProjectionSummary, CalculationError> {
        debug!(
            "Running scenario '{}' (conservative {:.4}, optimistic {:.4})",
            name, scenario.conservative, scenario.optimistic
        );
        let data = apply_scenario(&self.base, scenario);
        self.engine.calculate(&data)
    }
}

/// Copy of `base` with the scenario's rates as the band growth rates
pub fn apply_scenario(base: &CalculatorData, scenario: &RetirementScenario) -> CalculatorData {
    let mut data = base.clone();
    data.financial_inputs.growth_rate_lower_limit = scenario.conservative;
    data.financial_inputs.growth_rate_upper_limit = scenario.optimistic;
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> ScenarioRunner {
        let mut data = CalculatorData::default_snapshot(2024);
        data.scenarios.insert(
            "wide".to_string(),
            RetirementScenario {
                optimistic: 0.12,
                conservative: 0.01,
            },
        );
        ScenarioRunner::new(data)
    }

    #[test]
    fn test_unknown_scenario() {
        assert!(runner().run_scenario("missing").is_none());
    }

    #[test]
    fn test_scenario_only_moves_the_bands() {
        let runner = runner();
        let base = runner.run().unwrap();
        let wide = runner.run_scenario("wide").unwrap().unwrap();

        assert_eq!(base.projections.len(), wide.projections.len());
        assert_eq!(base.final_portfolio_value, wide.final_portfolio_value);
        assert_eq!(base.goal_achieving_year, wide.goal_achieving_year);

        let (b, w) = (&base.projections[0], &wide.projections[0]);
        assert!(w.portfolio_value_after_upper_limit > b.portfolio_value_after_upper_limit);
        assert!(w.portfolio_value_after_lower_limit < b.portfolio_value_after_lower_limit);
    }

    #[test]
    fn test_run_all_in_name_order() {
        let results = runner().run_all();
        let names: Vec<_> = results.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["base", "wide"]);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
    }

    #[test]
    fn test_scenario_names_sorted() {
        let runner = runner();
        let names: Vec<_> = runner.scenario_names().collect();
        assert_eq!(names, vec!["base", "wide"]);
    }

    #[test]
    fn test_apply_scenario() {
        let base = CalculatorData::default_snapshot(2024);
        let scenario = base.scenarios["base"];
        let data = apply_scenario(&base, &scenario);
        assert_eq!(data.financial_inputs.growth_rate_lower_limit, 0.05);
        assert_eq!(data.financial_inputs.growth_rate_upper_limit, 0.09);
        assert_eq!(data.financial_inputs.investment_growth_pre_retirement, 0.07);
    }
}
