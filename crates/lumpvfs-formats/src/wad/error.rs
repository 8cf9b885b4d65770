//! Error types for WAD parsing

use thiserror::Error;

/// Errors that can occur when parsing a WAD archive
#[derive(Error, Debug)]
pub enum WadError {
    /// Header tag is neither `IWAD` nor `PWAD`
    #[error("Invalid WAD tag: expected 'IWAD' or 'PWAD', got {0:?}")]
    InvalidTag([u8; 4]),

    /// Header declares a negative lump count
    #[error("Negative lump count: {0}")]
    NegativeLumpCount(i32),

    /// Directory table lies outside the container
    #[error("Directory at offset {offset} with {count} entries exceeds container size {len}")]
    DirectoryOutOfBounds {
        /// Declared directory offset
        offset: i64,
        /// Declared entry count
        count: i32,
        /// Container size in bytes
        len: u64,
    },

    /// A directory entry points outside the container
    #[error("Lump {index} ({name}) at offset {offset} size {size} exceeds container size {len}")]
    LumpOutOfBounds {
        /// Entry index in the directory
        index: usize,
        /// Entry name
        name: String,
        /// Declared lump offset
        offset: i32,
        /// Declared lump size
        size: i32,
        /// Container size in bytes
        len: u64,
    },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `BinRW` parsing error
    #[error("Binary format error: {0}")]
    BinRw(#[from] binrw::Error),
}

/// Type alias for WAD operation results
pub type Result<T> = std::result::Result<T, WadError>;
