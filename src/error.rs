//! Error types for projection, loading, and session control

use thiserror::Error;

/// Input validation failures raised before any year is projected
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalculationError {
    #[error("Invalid birth year, current year, or life expectancy")]
    MissingRequiredField,

    #[error("Life expectancy must be between 1 and 150")]
    LifeExpectancyOutOfRange(i32),

    #[error("Current year must be between 1900 and 2100")]
    CurrentYearOutOfRange(i32),
}

/// Failures while reading snapshots, tables, or stored data
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid date '{value}': {source}")]
    Date {
        value: String,
        source: chrono::ParseError,
    },

    #[error("Invalid RMD divisor {divisor} for age {age}")]
    InvalidDivisor { age: i32, divisor: f64 },
}

/// Reasons the recalculation session refuses to run
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("Recalculation is disabled after an error; call retry() first")]
    Blocked,

    #[error("No calculator data loaded")]
    NoData,

    #[error(transparent)]
    Calculation(#[from] CalculationError),
}
