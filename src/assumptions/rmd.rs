//! Required minimum distribution (RMD) divisors
//!
//! A simplified, illustrative subset of the uniform lifetime table. It is
//! not an IRS-compliant schedule.

/// First age at which a distribution is required
pub const RMD_START_AGE: i32 = 72;

/// Divisor applied to every age beyond the last table entry
pub const DIVISOR_BEYOND_TABLE: f64 = 14.8;

/// Divisor used for any age inside the table range without an entry
pub const FALLBACK_DIVISOR: f64 = 27.4;

/// RMD divisor table by attained age
#[derive(Debug, Clone, PartialEq)]
pub struct RmdTable {
    /// (age, divisor) pairs, ascending by age
    divisors: Vec<(i32, f64)>,
}

impl Default for RmdTable {
    fn default() -> Self {
        Self {
            divisors: vec![
                (72, 27.4),
                (73, 26.5),
                (74, 25.5),
                (75, 24.6),
                (76, 23.7),
                (77, 22.9),
                (78, 22.0),
                (79, 21.1),
                (80, 20.2),
                (81, 19.4),
                (82, 18.5),
                (83, 17.7),
                (84, 16.8),
                (85, 16.0),
            ],
        }
    }
}

impl RmdTable {
    /// Create from loaded CSV data
    pub fn from_loaded(divisors: &[(i32, f64)]) -> Self {
        let mut divisors = divisors.to_vec();
        divisors.sort_by_key(|(age, _)| *age);
        Self { divisors }
    }

    /// Oldest age with an explicit divisor
    pub fn last_table_age(&self) -> i32 {
        self.divisors.last().map(|(age, _)| *age).unwrap_or(RMD_START_AGE)
    }

    /// Divisor for an attained age
    ///
    /// Exact table entry if present, 14.8 above the table, 27.4 otherwise.
    pub fn divisor(&self, age: i32) -> f64 {
        if let Some((_, divisor)) = self.divisors.iter().find(|(a, _)| *a == age) {
            return *divisor;
        }

        if age > self.last_table_age() {
            return DIVISOR_BEYOND_TABLE;
        }

        FALLBACK_DIVISOR
    }

    /// Distribution one person must take from `portfolio_value` at `age`
    ///
    /// Zero below the start age.
    pub fn distribution(&self, portfolio_value: f64, age: i32) -> f64 {
        if age < RMD_START_AGE {
            return 0.0;
        }
        portfolio_value / self.divisor(age)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_divisors() {
        let rmd = RmdTable::default();

        assert_eq!(rmd.divisor(72), 27.4);
        assert_eq!(rmd.divisor(80), 20.2);
        assert_eq!(rmd.divisor(85), 16.0);

        // Beyond table
        assert_eq!(rmd.divisor(86), 14.8);
        assert_eq!(rmd.divisor(110), 14.8);

        // Gap inside the table range
        let sparse = RmdTable::from_loaded(&[(72, 27.4), (80, 20.2)]);
        assert_eq!(sparse.divisor(75), FALLBACK_DIVISOR);
    }

    #[test]
    fn test_distribution() {
        let rmd = RmdTable::default();

        assert_eq!(rmd.distribution(1_000_000.0, 71), 0.0);
        assert_relative_eq!(rmd.distribution(1_000_000.0, 72), 1_000_000.0 / 27.4);
        assert_relative_eq!(rmd.distribution(500_000.0, 90), 500_000.0 / 14.8);
    }

    #[test]
    fn test_loaded_table_is_sorted() {
        let rmd = RmdTable::from_loaded(&[(80, 20.0), (72, 25.0)]);
        assert_eq!(rmd.last_table_age(), 80);
        assert_eq!(rmd.divisor(81), DIVISOR_BEYOND_TABLE);
    }
}
