//! Error types for zip parsing and entry decoding

use thiserror::Error;

/// Errors that can occur when reading a zip archive
#[derive(Error, Debug)]
pub enum ZipError {
    /// No end-of-central-directory record within the search window
    #[error("End of central directory not found")]
    MissingEndOfCentralDirectory,

    /// Archive spans more than one disk
    #[error("Multi-disk archives are not supported (disk {disk}, directory disk {directory_disk})")]
    MultiDisk {
        /// Number of this disk
        disk: u16,
        /// Disk holding the central directory
        directory_disk: u16,
    },

    /// Archive needs ZIP64 extensions
    #[error("ZIP64 archives are not supported")]
    Zip64Unsupported,

    /// Central directory lies outside the archive
    #[error("Central directory at offset {offset} size {size} exceeds end record at {limit}")]
    DirectoryOutOfBounds {
        /// Declared directory offset
        offset: u32,
        /// Declared directory size
        size: u32,
        /// Offset of the end record
        limit: u64,
    },

    /// Central directory ended before the declared entry count
    #[error("Central directory truncated: parsed {parsed} of {declared} entries")]
    TruncatedDirectory {
        /// Entries parsed before the failure
        parsed: usize,
        /// Entries declared by the end record
        declared: u16,
    },

    /// Entry payload extends past the start of the central directory
    #[error("Entry {name} ends at {end}, past the central directory at {limit}")]
    EntryOutOfBounds {
        /// Normalised entry name
        name: String,
        /// Offset one past the entry's compressed payload
        end: u64,
        /// Central directory offset
        limit: u64,
    },

    /// Declared uncompressed size cannot come from the stored payload
    #[error("Entry {name} declares {uncompressed} bytes from a {compressed}-byte payload")]
    ImplausibleSize {
        /// Normalised entry name
        name: String,
        /// Declared compressed size
        compressed: u32,
        /// Declared uncompressed size
        uncompressed: u32,
    },

    /// Local file header signature missing at the recorded offset
    #[error("Invalid local file header at offset {0}")]
    InvalidLocalHeader(u64),

    /// Compression method other than store or deflate
    #[error("Unsupported compression method: {0}")]
    UnsupportedMethod(u16),

    /// Decoded length differs from the declared size
    #[error("Size mismatch: expected {expected}, got {actual}")]
    SizeMismatch {
        /// Declared uncompressed size
        expected: usize,
        /// Bytes actually produced
        actual: usize,
    },

    /// CRC-32 of decoded bytes differs from the directory
    #[error("CRC mismatch: expected {expected:08x}, got {actual:08x}")]
    CrcMismatch {
        /// CRC-32 recorded in the central directory
        expected: u32,
        /// CRC-32 of the decoded bytes
        actual: u32,
    },

    /// Deflate stream is corrupt
    #[error("Decompression failed: {0}")]
    Decompression(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `BinRW` parsing error
    #[error("Binary format error: {0}")]
    BinRw(#[from] binrw::Error),
}

/// Type alias for zip operation results
pub type Result<T> = std::result::Result<T, ZipError>;
