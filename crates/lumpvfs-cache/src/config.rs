//! Arena configuration

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for an [`EpochArena`](crate::EpochArena)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Byte budget for `Discardable` buffers, unlimited when `None`
    pub max_discardable_bytes: Option<usize>,
}

impl ArenaConfig {
    /// Unlimited configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the byte budget for discardable buffers
    #[must_use]
    pub const fn with_discardable_budget(mut self, bytes: usize) -> Self {
        self.max_discardable_bytes = Some(bytes);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_discardable_bytes == Some(0) {
            return Err(CacheError::InvalidConfiguration(
                "discardable budget must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
