//! Error types for arena operations

use crate::arena::BufferId;
use thiserror::Error;

/// Errors that can occur when using the buffer arena
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Handle refers to a buffer that was freed or reclaimed
    #[error("Stale buffer handle: {0}")]
    StaleBuffer(BufferId),

    /// Invalid arena configuration
    #[error("Invalid cache configuration: {0}")]
    InvalidConfiguration(String),
}

/// Type alias for arena operation results
pub type Result<T> = std::result::Result<T, CacheError>;
