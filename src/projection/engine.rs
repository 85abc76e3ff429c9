//! Core projection engine for yearly household portfolio projections

use log::{debug, error};

use super::cashflows::{Ages, AnnualProjection, LivingStatus, ProjectionSummary};
use super::state::{ProjectionState, YearFlows};
use crate::assumptions::Assumptions;
use crate::error::CalculationError;
use crate::household::{CalculatorData, IncomeSource, Owner, PersonalInfo};

/// Inclusive bounds accepted for the user's life expectancy
pub const LIFE_EXPECTANCY_RANGE: (i32, i32) = (1, 150);

/// Inclusive bounds accepted for the first projection year
pub const CURRENT_YEAR_RANGE: (i32, i32) = (1900, 2100);

/// Household members as seen by one projection year
#[derive(Debug, Clone, Copy)]
struct YearContext<'a> {
    year: i32,
    user: &'a PersonalInfo,
    user_age: i32,
    spouse: Option<(&'a PersonalInfo, i32)>,
    status: LivingStatus,
}

impl YearContext<'_> {
    fn spouse_age(&self) -> Option<i32> {
        self.spouse.map(|(_, age)| age)
    }

    /// Either partner has reached their own retirement age
    fn is_retired(&self) -> bool {
        self.user_age >= self.user.retirement_age
            || self
                .spouse
                .map(|(spouse, age)| age >= spouse.retirement_age)
                .unwrap_or(false)
    }

    /// (age, retirement age) of an account owner; an absent spouse counts as (0, 0)
    fn owner_ages(&self, owner: Owner) -> (i32, i32) {
        match owner {
            Owner::User => (self.user_age, self.user.retirement_age),
            Owner::Spouse => self
                .spouse
                .map(|(spouse, age)| (age, spouse.retirement_age))
                .unwrap_or((0, 0)),
        }
    }
}

/// Main projection engine
///
/// Holds only assumptions; every call to [`ProjectionEngine::calculate`]
/// works on its own copy of the running state.
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    assumptions: Assumptions,
}

impl ProjectionEngine {
    /// Create a new projection engine with given assumptions
    pub fn new(assumptions: Assumptions) -> Self {
        Self { assumptions }
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    /// Project the snapshot year by year to the later life-expectancy year
    pub fn calculate(&self, data: &CalculatorData) -> Result<ProjectionSummary, CalculationError> {
        if let Err(err) = validate(data) {
            error!("Calculation failed: {err}");
            return Err(err);
        }

        let household = &data.household;
        let current_year = household.current_year;
        let horizon = horizon_year(data);
        debug!(
            "Projecting {} through {} ({} accounts)",
            current_year,
            horizon,
            data.accounts.len()
        );

        let mut state = ProjectionState::from_data(data);
        let mut projections = Vec::with_capacity(horizon.saturating_sub(current_year).saturating_add(1).max(0) as usize);

        for year in current_year..=horizon {
            let context = year_context(data, year);
            let row = self.calculate_year(data, &context, &mut state);
            projections.push(row);
        }

        let goal_year = goal_achieving_year(data, horizon, &projections);
        let summary = ProjectionSummary::from_projections(projections, goal_year);
        debug!(
            "Projection complete: {} years, final value {:.2}, goal year {:?}",
            summary.projections.len(),
            summary.final_portfolio_value,
            summary.goal_achieving_year
        );

        Ok(summary)
    }

    /// Evaluate one year's rules, advance the state, and record the row
    fn calculate_year(
        &self,
        data: &CalculatorData,
        context: &YearContext<'_>,
        state: &mut ProjectionState,
    ) -> AnnualProjection {
        let inputs = &data.financial_inputs;
        let current_year = data.household.current_year;

        let income_user = if context.status.user_alive() {
            annual_income(data.income_sources_for(Owner::User), context.user_age, context.user.retirement_age, context.year, current_year)
        } else {
            0.0
        };
        let income_spouse = match context.spouse {
            Some((spouse, age)) if context.status.spouse_alive() => {
                annual_income(data.income_sources_for(Owner::Spouse), age, spouse.retirement_age, context.year, current_year)
            }
            _ => 0.0,
        };
        let total_income = income_user + income_spouse;

        // Survivor adjustment: the two checks are independent, so a year with
        // both partners gone applies the percentage twice.
        let mut monthly_expense = inputs.monthly_retirement_budget;
        if context.spouse.is_some() && !context.status.spouse_alive() {
            monthly_expense *= inputs.survivor_expense_percentage;
        }
        if context.spouse.is_some() && !context.status.user_alive() {
            monthly_expense *= inputs.survivor_expense_percentage;
        }
        let expenses = monthly_expense * 12.0;

        let mut flows = YearFlows::default();
        let mut rmd = 0.0;

        if context.status != LivingStatus::BothPassed {
            flows.contributions = self.calculate_contributions(data, context);

            let growth_rate = if context.is_retired() {
                inputs.investment_growth_post_retirement
            } else {
                inputs.investment_growth_pre_retirement
            };
            flows.investment_growth = state.portfolio_value * growth_rate;
            flows.growth_lower = state.portfolio_value_lower * inputs.growth_rate_lower_limit;
            flows.growth_upper = state.portfolio_value_upper * inputs.growth_rate_upper_limit;

            rmd = self.calculate_rmd(state.portfolio_value, context.user_age, context.spouse_age());

            flows.withdrawals = (expenses - total_income).max(rmd).max(0.0);
        }

        // Balances recorded on the row are the pre-reallocation copy
        let account_balances = state.account_balances.clone();
        state.apply_flows(&flows);

        // Derived from the floored end value, not the tracked start value
        let portfolio_value_before =
            state.portfolio_value - flows.contributions - flows.investment_growth + flows.withdrawals;

        let row = AnnualProjection {
            year: context.year,
            age: Ages {
                user: context.user_age,
                spouse: context.spouse_age(),
            },
            living_status: context.status,
            income_user,
            income_spouse,
            total_income,
            portfolio_value_before,
            contributions: flows.contributions,
            investment_growth: flows.investment_growth,
            required_minimum_distribution: rmd,
            withdrawals: flows.withdrawals,
            portfolio_value_after: state.portfolio_value,
            portfolio_value_after_lower_limit: state.portfolio_value_lower,
            portfolio_value_after_upper_limit: state.portfolio_value_upper,
            expenses,
            surplus: total_income - expenses,
            account_balances,
        };

        state.reallocate_accounts(&flows);

        row
    }

    /// Flat contribution plus dollar-capped employer match for every
    /// account whose owner has not reached retirement age
    fn calculate_contributions(&self, data: &CalculatorData, context: &YearContext<'_>) -> f64 {
        data.accounts
            .iter()
            .filter(|account| {
                let (age, retirement_age) = context.owner_ages(account.owner);
                age < retirement_age
            })
            .map(|account| account.annual_contribution + account.employer_match_amount())
            .fold(0.0, |total, amount| total + amount)
    }

    /// Household RMD: each qualifying person draws on the whole portfolio
    fn calculate_rmd(&self, portfolio_value: f64, user_age: i32, spouse_age: Option<i32>) -> f64 {
        let table = &self.assumptions.rmd;
        let mut rmd = table.distribution(portfolio_value, user_age);
        if let Some(age) = spouse_age {
            rmd += table.distribution(portfolio_value, age);
        }
        rmd
    }
}

/// Check the required household fields before any year is projected
pub fn validate(data: &CalculatorData) -> Result<(), CalculationError> {
    let household = &data.household;
    let user = &household.user;

    if user.birth_year == 0 || household.current_year == 0 || user.life_expectancy_age == 0 {
        return Err(CalculationError::MissingRequiredField);
    }

    let (min_life, max_life) = LIFE_EXPECTANCY_RANGE;
    if user.life_expectancy_age < min_life || user.life_expectancy_age > max_life {
        return Err(CalculationError::LifeExpectancyOutOfRange(user.life_expectancy_age));
    }

    let (min_year, max_year) = CURRENT_YEAR_RANGE;
    if household.current_year < min_year || household.current_year > max_year {
        return Err(CalculationError::CurrentYearOutOfRange(household.current_year));
    }

    Ok(())
}

/// Last calendar year in which either partner could still be alive
///
/// Capped at the longest accepted life expectancy past the current year,
/// since the spouse record is not range-checked.
pub fn horizon_year(data: &CalculatorData) -> i32 {
    let household = &data.household;
    let user_end = household.user.terminal_year();
    let end = match household.active_spouse() {
        Some(spouse) => user_end.max(spouse.terminal_year()),
        None => user_end,
    };
    end.min(household.current_year.saturating_add(LIFE_EXPECTANCY_RANGE.1))
}

/// Savings goal inflated once over the full projection length
pub fn inflated_goal(data: &CalculatorData, horizon: i32) -> f64 {
    let inputs = &data.financial_inputs;
    let years = horizon - data.household.current_year;
    inputs.savings_goal * (1.0 + inputs.inflation_rate).powi(years)
}

fn goal_achieving_year(data: &CalculatorData, horizon: i32, projections: &[AnnualProjection]) -> Option<i32> {
    let target = inflated_goal(data, horizon);
    projections
        .iter()
        .find(|p| p.portfolio_value_after >= target)
        .map(|p| p.year)
}

fn year_context(data: &CalculatorData, year: i32) -> YearContext<'_> {
    let user = &data.household.user;
    let user_age = user.age_in(year);
    let spouse = data
        .household
        .active_spouse()
        .map(|spouse| (spouse, spouse.age_in(year)));

    let user_alive = user.is_alive_at(user_age);
    let spouse_alive = spouse.map(|(s, age)| s.is_alive_at(age)).unwrap_or(false);

    YearContext {
        year,
        user,
        user_age,
        spouse,
        status: LivingStatus::classify(user_alive, spouse_alive),
    }
}

/// Earned income for one person in one year
///
/// A source stops at its cessation age and, unconditionally, at the
/// owner's retirement age. Otherwise it compounds from the first
/// projection year.
pub fn annual_income(sources: &[IncomeSource], age: i32, retirement_age: i32, year: i32, first_year: i32) -> f64 {
    sources
        .iter()
        .filter(|source| !matches!(source.effective_cessation_age(), Some(cessation) if age >= cessation))
        .filter(|_| age < retirement_age)
        .map(|source| source.annual_amount * (1.0 + source.growth_rate).powi(year - first_year))
        .fold(0.0, |total, amount| total + amount)
}
