//! CSV-based assumption loader

use crate::error::LoadError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Load RMD divisors from a CSV file with an `age,divisor` header
pub fn load_rmd_divisors(path: &Path) -> Result<Vec<(i32, f64)>, LoadError> {
    let file = File::open(path)?;
    load_rmd_divisors_from_reader(file)
}

/// Load RMD divisors from any reader
pub fn load_rmd_divisors_from_reader<R: Read>(reader: R) -> Result<Vec<(i32, f64)>, LoadError> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut divisors = Vec::new();

    for result in reader.deserialize() {
        let (age, divisor): (i32, f64) = result?;

        // Non-positive divisors would produce infinite or negative distributions
        if divisor <= 0.0 || !divisor.is_finite() {
            return Err(LoadError::InvalidDivisor { age, divisor });
        }
        divisors.push((age, divisor));
    }

    Ok(divisors)
}
