//! Retirement Projection - Year-by-year portfolio projection for individuals and couples
//!
//! This library provides:
//! - Deterministic base-case projection with conservative and optimistic bands
//! - Income, contribution, survivor-expense and RMD rules per calendar year
//! - Goal-year detection against an inflation-adjusted savings target
//! - Variance tracking of recorded portfolio values against the projection
//! - Scenario runs, CSV export, and a debounced recalculation session

pub mod error;
pub mod household;
pub mod assumptions;
pub mod projection;
pub mod scenario;
pub mod storage;
pub mod session;

// Re-export commonly used types
pub use error::{CalculationError, LoadError, SessionError};
pub use household::{CalculatorData, HouseholdInfo, PersonalInfo, PortfolioSnapshot};
pub use assumptions::{Assumptions, RmdTable};
pub use projection::{calculate_variance, AnnualProjection, ProjectionEngine, ProjectionSummary};
pub use scenario::ScenarioRunner;
pub use storage::SnapshotStore;
pub use session::{CalculationObserver, CalculatorSession};
