//! Unified resource directory for game content containers
//!
//! This crate merges any number of containers into one ordered list of named
//! binary records ("lumps"):
//!
//! - **WAD** archives (`IWAD`/`PWAD`), with `S_START`-style marker ranges
//! - **Zip** archives (`.zip`, `.pk3`, `.pke`), namespaced by path prefix
//! - **Loose directories**, laid out like a zip on disk
//! - **Memory buffers** holding any of the above, or a single blob
//!
//! Containers are merged strictly in the order they are added. When two
//! containers define the same name in the same namespace, the one added later
//! wins lookups; the earlier record stays in the list but is shadowed.
//!
//! Record bytes are read on demand through one of four backing kinds and can
//! be cached under an [`Epoch`], which controls when the cached copy is
//! released.
//!
//! # Example
//!
//! ```no_run
//! use lumpvfs_directory::{AddOptions, Epoch, Namespace, ResourceDirectory};
//!
//! let mut directory = ResourceDirectory::new();
//! directory.add_container("doom2.wad", &AddOptions::default())?;
//! directory.add_container("mymod.pk3", &AddOptions::default())?;
//!
//! if let Some(handle) = directory.lookup("PLAYPAL", None) {
//!     let palette = directory.cache(handle, Epoch::Permanent)?;
//!     println!("PLAYPAL is {} bytes", palette.len());
//! }
//!
//! for handle in directory.enumerate(Namespace::Sprites) {
//!     println!("sprite {}", directory.record(handle)?.name());
//! }
//! # Ok::<(), lumpvfs_directory::DirectoryError>(())
//! ```

#![warn(missing_docs)]

pub mod backing;
pub mod config;
pub mod container;
pub mod directory;
mod loader;
pub mod name;
pub mod namespace;
pub mod record;
pub mod stats;

pub use backing::{Backing, BackingKind};
pub use config::DirectoryConfig;
pub use container::{ContainerInfo, ContainerKind, SourceId};
pub use directory::{AddOptions, Diagnostics, ResourceDirectory};
pub use lumpvfs_cache::{BufferId, CacheError, Epoch};
pub use lumpvfs_formats::{ContainerFormat, ContainerRole};
pub use name::LumpName;
pub use namespace::Namespace;
pub use record::{Record, RecordHandle};
pub use stats::DirectoryStats;

use std::path::PathBuf;
use thiserror::Error;

/// Resource directory errors
///
/// `OpenFailed`, `FormatUnrecognized` and `ParseFailed` happen while adding a
/// container and leave the directory unchanged. `DecodeFailed` and
/// `ReadFailed` happen while reading a record that was parsed successfully.
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// Container path missing or unreadable
    #[error("Cannot open {path}: {source}")]
    OpenFailed {
        /// Path as requested
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Container format differs from the one the caller required
    #[error("{path} is a {found} container, expected {expected}")]
    FormatUnrecognized {
        /// Container path
        path: PathBuf,
        /// Format the caller required
        expected: ContainerFormat,
        /// Format the sniffer reported
        found: ContainerFormat,
    },

    /// Container structure is malformed; nothing from it was merged
    #[error("Failed to parse {container}: {reason}")]
    ParseFailed {
        /// Container name
        container: String,
        /// What went wrong
        reason: String,
    },

    /// Record payload could not be decoded
    #[error("Failed to decode {record}: {reason}")]
    DecodeFailed {
        /// Record name
        record: String,
        /// What went wrong
        reason: String,
    },

    /// I/O failure while reading a record
    #[error("Failed to read {record}: {source}")]
    ReadFailed {
        /// Record name
        record: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// No record with this name
    #[error("Record not found: {name}{}", in_namespace(.namespace))]
    NotFound {
        /// Name looked up
        name: String,
        /// Namespace filter, if any
        namespace: Option<Namespace>,
    },

    /// Handle refers to a record dropped by a reset, or was never issued
    #[error("Invalid record handle: {0}")]
    InvalidHandle(RecordHandle),

    /// Caller buffer does not match the record size
    #[error("Buffer size mismatch: record is {expected} bytes, buffer is {actual}")]
    BufferSize {
        /// Record size
        expected: usize,
        /// Buffer length
        actual: usize,
    },

    /// Cached buffer handle is stale
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Invalid directory configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn in_namespace(namespace: &Option<Namespace>) -> String {
    namespace.map(|ns| format!(" in {ns}")).unwrap_or_default()
}

impl DirectoryError {
    /// Whether this error came from adding a container
    pub const fn is_parse_time(&self) -> bool {
        matches!(
            self,
            Self::OpenFailed { .. } | Self::FormatUnrecognized { .. } | Self::ParseFailed { .. }
        )
    }

    /// Whether this error came from reading a parsed record
    pub const fn is_read_time(&self) -> bool {
        matches!(self, Self::DecodeFailed { .. } | Self::ReadFailed { .. })
    }
}

/// Result type for directory operations
pub type Result<T> = std::result::Result<T, DirectoryError>;
