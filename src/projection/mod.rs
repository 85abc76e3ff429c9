//! Year-by-year portfolio projection, variance tracking, and export

mod state;
mod engine;
mod cashflows;
mod variance;
mod export;

pub use state::{ProjectionState, YearFlows};
pub use engine::{annual_income, horizon_year, inflated_goal, validate, ProjectionEngine};
pub use cashflows::{Ages, AnnualProjection, LivingStatus, ProjectionSummary};
pub use variance::{calculate_variance, sort_snapshots_chronologically, TrackingStats, Variance};
pub use export::{export_file_name, write_projection_csv};
