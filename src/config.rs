//! Construction parameters of a [`PositionalList`](crate::PositionalList).

use crate::error::ConfigError;

/// Capacity parameters of the slot store.
///
/// The store starts with `initial_capacity` slots (one of which is the rear
/// sentinel), doubles whenever it runs out of free slots, and halves whenever
/// fewer than a quarter of its slots hold items, but never below
/// `min_capacity`.
///
/// # Examples
///
/// ```
/// use positional_list::StoreConfig;
///
/// let config = StoreConfig::default().with_initial_capacity(32);
/// assert!(config.validate().is_ok());
///
/// let config = StoreConfig::default().with_min_capacity(1);
/// assert!(config.validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    pub initial_capacity: usize,
    pub min_capacity: usize,
}

impl StoreConfig {
    pub const DEFAULT_INITIAL_CAPACITY: usize = 8;
    pub const DEFAULT_MIN_CAPACITY: usize = 8;

    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_min_capacity(mut self, min_capacity: usize) -> Self {
        self.min_capacity = min_capacity;
        self
    }

    /// Check that the capacities describe a usable store: the minimum must
    /// hold the sentinel plus one item, and the store must start at or
    /// above its minimum.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_capacity < 2 {
            return Err(ConfigError::MinimumTooSmall {
                min: self.min_capacity,
            });
        }
        if self.initial_capacity < self.min_capacity {
            return Err(ConfigError::InitialBelowMinimum {
                initial: self.initial_capacity,
                min: self.min_capacity,
            });
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
            min_capacity: Self::DEFAULT_MIN_CAPACITY,
        }
    }
}
