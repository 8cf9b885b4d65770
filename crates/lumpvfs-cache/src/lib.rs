//! Epoch-tagged buffer arena for cached lump bytes
//!
//! Cached record bytes are grouped into a handful of coarse lifetimes
//! ([`Epoch`]) and released a whole group at a time. Callers hold
//! [`BufferId`] handles rather than references; a handle whose buffer has been
//! reclaimed resolves to [`CacheError::StaleBuffer`] instead of dangling.
//!
//! ```
//! use lumpvfs_cache::{Epoch, EpochArena};
//!
//! let mut arena = EpochArena::new();
//! let id = arena.insert(Epoch::Level, b"E1M1 things".to_vec());
//! assert_eq!(arena.get(id).unwrap(), b"E1M1 things");
//!
//! arena.reclaim(Epoch::Level);
//! assert!(arena.get(id).is_err());
//! ```

#![warn(missing_docs)]

pub mod arena;
pub mod config;
pub mod epoch;
pub mod error;
pub mod stats;

pub use arena::{BufferId, EpochArena};
pub use config::ArenaConfig;
pub use epoch::Epoch;
pub use error::{CacheError, Result};
pub use stats::ArenaStats;
