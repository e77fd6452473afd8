//! Construction parameters for `ChainedHashTable`.

use crate::error::TableError;

/// Bucket count used by `ChainedHashTable::new`.
pub const DEFAULT_BUCKET_COUNT: usize = 32;

/// Growth threshold used when none is given.
pub const DEFAULT_MAX_LOAD_FACTOR: f32 = 0.75;

/// Initial shape of a table: how many buckets to allocate and how full they
/// may get (entries per bucket) before the table doubles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    pub initial_buckets: usize,
    pub max_load_factor: f32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_buckets: DEFAULT_BUCKET_COUNT,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_buckets(mut self, buckets: usize) -> Self {
        self.initial_buckets = buckets;
        self
    }

    pub fn with_max_load_factor(mut self, max_load_factor: f32) -> Self {
        self.max_load_factor = max_load_factor;
        self
    }

    /// Checks both parameters; tables are only ever built from a config that
    /// passed this.
    pub fn validate(&self) -> Result<(), TableError> {
        if self.initial_buckets == 0 {
            return Err(TableError::InvalidArgument {
                reason: "bucket count must be > 0",
            });
        }
        check_load_factor(self.max_load_factor)
    }
}

/// Rejects zero, negative and NaN thresholds.
pub(crate) fn check_load_factor(max_load_factor: f32) -> Result<(), TableError> {
    // Written as a negated comparison so NaN is rejected too.
    if !(max_load_factor > 0.0) {
        return Err(TableError::InvalidArgument {
            reason: "max load factor must be positive",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_named_constants() {
        let c = TableConfig::default();
        assert_eq!(c.initial_buckets, 32);
        assert_eq!(c.max_load_factor, 0.75);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_buckets_rejected() {
        let c = TableConfig::new().with_initial_buckets(0);
        assert!(matches!(
            c.validate(),
            Err(TableError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn non_positive_or_nan_load_factor_rejected() {
        for lf in [0.0, -1.0, f32::NAN] {
            let c = TableConfig::new().with_max_load_factor(lf);
            assert!(c.validate().is_err(), "load factor {lf} must be rejected");
        }
        assert!(TableConfig::new().with_max_load_factor(4.0).validate().is_ok());
    }
}
