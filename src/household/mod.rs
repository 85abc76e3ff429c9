//! Household data structures and snapshot loading

mod data;
pub mod loader;

pub use data::{
    AccountType, CalculatorData, FinancialInputs, HouseholdInfo, IncomeOwner, IncomeSource,
    Owner, PersonalInfo, PortfolioSnapshot, RetirementAccount, RetirementScenario,
};
pub use loader::{
    load_calculator_data, load_calculator_data_from_reader, load_portfolio_snapshots,
    load_portfolio_snapshots_from_reader,
};
