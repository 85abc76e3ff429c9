//! Household snapshot structures matching the calculator's input contract

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Owner of a retirement account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Owner {
    User,
    Spouse,
}

/// Who earns an income source (descriptive; the engine uses the per-person lists)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeOwner {
    User,
    Spouse,
    Both,
}

/// Tax wrapper of a retirement account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    Traditional401k,
    Roth401k,
    #[serde(rename = "TraditionalIRA")]
    TraditionalIra,
    #[serde(rename = "RothIRA")]
    RothIra,
    #[serde(rename = "HSA")]
    Hsa,
    #[serde(rename = "529")]
    Plan529,
    Taxable,
}

impl AccountType {
    /// Label used by the input forms
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Traditional401k => "Traditional401k",
            AccountType::Roth401k => "Roth401k",
            AccountType::TraditionalIra => "TraditionalIRA",
            AccountType::RothIra => "RothIRA",
            AccountType::Hsa => "HSA",
            AccountType::Plan529 => "529",
            AccountType::Taxable => "Taxable",
        }
    }
}

/// One member of the household
///
/// Zero values deserialize from missing fields so that the engine can
/// report them as missing rather than failing to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(default)]
    pub name: String,

    /// Calendar year of birth (0 = not provided)
    #[serde(default)]
    pub birth_year: i32,

    /// Age at which earned income and contributions stop
    #[serde(default)]
    pub retirement_age: i32,

    /// Last age at which the person is modeled as alive (0 = not provided)
    #[serde(default)]
    pub life_expectancy_age: i32,
}

impl PersonalInfo {
    pub fn new(name: &str, birth_year: i32, retirement_age: i32, life_expectancy_age: i32) -> Self {
        Self {
            name: name.to_string(),
            birth_year,
            retirement_age,
            life_expectancy_age,
        }
    }

    /// Age reached during a calendar year
    pub fn age_in(&self, year: i32) -> i32 {
        year.saturating_sub(self.birth_year)
    }

    /// Calendar year of the final modeled birthday
    pub fn terminal_year(&self) -> i32 {
        self.birth_year.saturating_add(self.life_expectancy_age)
    }

    pub fn is_alive_at(&self, age: i32) -> bool {
        age <= self.life_expectancy_age
    }
}

/// Household composition for one calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdInfo {
    /// First calendar year of the projection (0 = not provided)
    #[serde(default)]
    pub current_year: i32,

    pub user: PersonalInfo,

    #[serde(default)]
    pub spouse: Option<PersonalInfo>,
}

impl HouseholdInfo {
    pub fn single(current_year: i32, user: PersonalInfo) -> Self {
        Self {
            current_year,
            user,
            spouse: None,
        }
    }

    pub fn couple(current_year: i32, user: PersonalInfo, spouse: PersonalInfo) -> Self {
        Self {
            current_year,
            user,
            spouse: Some(spouse),
        }
    }

    /// Spouse record, if one is configured with a birth year
    pub fn active_spouse(&self) -> Option<&PersonalInfo> {
        self.spouse.as_ref().filter(|s| s.birth_year != 0)
    }
}

/// Recurring earned income that compounds annually until it stops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeSource {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Amount in the first projection year
    pub annual_amount: f64,

    /// Annual growth applied from the first projection year
    #[serde(default)]
    pub growth_rate: f64,

    pub owner: IncomeOwner,

    /// Age at which this income stops (0 or absent = no cessation age)
    #[serde(default)]
    pub cessation_age: Option<i32>,

    /// Calendar year the income stops, as displayed by the forms
    #[serde(default)]
    pub cessation_year: Option<i32>,
}

impl IncomeSource {
    pub fn new(id: &str, name: &str, owner: IncomeOwner, annual_amount: f64, growth_rate: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            annual_amount,
            growth_rate,
            owner,
            cessation_age: None,
            cessation_year: None,
        }
    }

    pub fn with_cessation_age(mut self, age: i32) -> Self {
        self.cessation_age = Some(age);
        self
    }

    /// Cessation age if one is set to a non-zero value
    pub fn effective_cessation_age(&self) -> Option<i32> {
        self.cessation_age.filter(|&age| age != 0)
    }
}

/// A retirement account in the household pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementAccount {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "type")]
    pub account_type: AccountType,

    pub current_value: f64,

    #[serde(default)]
    pub annual_contribution: f64,

    /// Employer match as a fraction of the contribution
    #[serde(default)]
    pub employer_match: f64,

    /// Ceiling on the match amount, in dollars
    #[serde(default)]
    pub employer_match_cap: f64,

    pub owner: Owner,

    /// Declared per-account growth; projection uses the household rate
    #[serde(default)]
    pub growth_rate: f64,
}

impl RetirementAccount {
    pub fn new(id: &str, name: &str, account_type: AccountType, owner: Owner, current_value: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            account_type,
            current_value,
            annual_contribution: 0.0,
            employer_match: 0.0,
            employer_match_cap: 0.0,
            owner,
            growth_rate: 0.0,
        }
    }

    pub fn with_contribution(mut self, annual_contribution: f64, employer_match: f64, employer_match_cap: f64) -> Self {
        self.annual_contribution = annual_contribution;
        self.employer_match = employer_match;
        self.employer_match_cap = employer_match_cap;
        self
    }

    pub fn with_growth_rate(mut self, growth_rate: f64) -> Self {
        self.growth_rate = growth_rate;
        self
    }

    /// Employer match for one year: MIN(match * contribution, cap)
    pub fn employer_match_amount(&self) -> f64 {
        (self.employer_match * self.annual_contribution).min(self.employer_match_cap)
    }
}

/// Household-wide economic assumptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialInputs {
    pub inflation_rate: f64,

    /// Carried for compatibility; not applied by the projection
    #[serde(default)]
    pub tax_rate: f64,

    pub monthly_retirement_budget: f64,

    /// Fraction of the budget retained after one partner dies (0.75 = 75%)
    pub survivor_expense_percentage: f64,

    pub savings_goal: f64,

    pub investment_growth_pre_retirement: f64,

    pub investment_growth_post_retirement: f64,

    /// Growth rate of the conservative band
    pub growth_rate_lower_limit: f64,

    /// Growth rate of the optimistic band
    pub growth_rate_upper_limit: f64,
}

impl Default for FinancialInputs {
    fn default() -> Self {
        Self {
            inflation_rate: 0.03,
            tax_rate: 0.25,
            monthly_retirement_budget: 8000.0,
            survivor_expense_percentage: 0.75,
            savings_goal: 1_000_000.0,
            investment_growth_pre_retirement: 0.07,
            investment_growth_post_retirement: 0.05,
            growth_rate_lower_limit: 0.03,
            growth_rate_upper_limit: 0.10,
        }
    }
}

/// Named growth band applied by the scenario runner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetirementScenario {
    pub optimistic: f64,
    pub conservative: f64,
}

/// Actual portfolio value recorded on a date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub date: NaiveDate,

    pub total_value: f64,

    #[serde(default)]
    pub account_values: BTreeMap<String, f64>,

    #[serde(default)]
    pub notes: Option<String>,
}

impl PortfolioSnapshot {
    pub fn new(date: NaiveDate, total_value: f64) -> Self {
        Self {
            date,
            total_value,
            account_values: BTreeMap::new(),
            notes: None,
        }
    }
}

/// Complete input snapshot for one calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorData {
    pub household: HouseholdInfo,

    #[serde(default)]
    pub income_sources_user: Vec<IncomeSource>,

    #[serde(default)]
    pub income_sources_spouse: Vec<IncomeSource>,

    #[serde(default)]
    pub accounts: Vec<RetirementAccount>,

    pub financial_inputs: FinancialInputs,

    #[serde(default)]
    pub portfolio_snapshots: Vec<PortfolioSnapshot>,

    #[serde(default)]
    pub scenarios: BTreeMap<String, RetirementScenario>,

    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl CalculatorData {
    pub fn new(household: HouseholdInfo, financial_inputs: FinancialInputs) -> Self {
        Self {
            household,
            income_sources_user: Vec::new(),
            income_sources_spouse: Vec::new(),
            accounts: Vec::new(),
            financial_inputs,
            portfolio_snapshots: Vec::new(),
            scenarios: BTreeMap::new(),
            last_updated: None,
        }
    }

    /// Starting data shown to a first-time user
    pub fn default_snapshot(current_year: i32) -> Self {
        let household = HouseholdInfo::single(current_year, PersonalInfo::new("You", 1970, 65, 90));
        let mut data = Self::new(household, FinancialInputs::default());

        data.income_sources_user.push(IncomeSource::new(
            "1",
            "Salary",
            IncomeOwner::User,
            100_000.0,
            0.03,
        ));
        data.accounts.push(
            RetirementAccount::new("1", "401(k)", AccountType::Traditional401k, Owner::User, 250_000.0)
                .with_contribution(23_500.0, 0.05, 0.05)
                .with_growth_rate(0.07),
        );
        data.scenarios.insert(
            "base".to_string(),
            RetirementScenario {
                optimistic: 0.09,
                conservative: 0.05,
            },
        );
        data
    }

    /// Income sources for one household member
    pub fn income_sources_for(&self, owner: Owner) -> &[IncomeSource] {
        match owner {
            Owner::User => &self.income_sources_user,
            Owner::Spouse => &self.income_sources_spouse,
        }
    }

    /// Sum of all account values at the start of the projection
    pub fn current_portfolio_value(&self) -> f64 {
        self.accounts.iter().fold(0.0, |total, a| total + a.current_value)
    }
}
