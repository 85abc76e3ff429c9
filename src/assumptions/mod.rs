//! Projection assumptions that are not part of the household snapshot

mod rmd;
pub mod loader;

pub use rmd::{RmdTable, DIVISOR_BEYOND_TABLE, FALLBACK_DIVISOR, RMD_START_AGE};

use crate::error::LoadError;
use std::path::Path;

/// Container for engine-level assumptions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assumptions {
    pub rmd: RmdTable,
}

impl Assumptions {
    /// Load the RMD table from an `age,divisor` CSV file
    pub fn with_rmd_csv(path: &Path) -> Result<Self, LoadError> {
        let divisors = loader::load_rmd_divisors(path)?;
        Ok(Self {
            rmd: RmdTable::from_loaded(&divisors),
        })
    }
}
