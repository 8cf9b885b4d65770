//! Container format parsers for game resource archives
//!
//! This crate reads the on-disk containers a resource directory is built
//! from. It knows nothing about namespaces or override order; it turns bytes
//! into entry metadata and decodes entry payloads on request.
//!
//! # Supported Formats
//!
//! - **WAD**: `IWAD` (base) and `PWAD` (patch) archives with a flat 16-byte
//!   directory of named lumps
//! - **Zip**: PKWARE zip archives (`.zip`, `.pk3`, `.pke`), single disk,
//!   store and deflate methods
//! - **Bare file**: anything else, exposed as a single lump by callers
//!
//! Format detection lives in [`sniff`] and never fails: a stream that matches
//! no magic is a bare file.
#![allow(clippy::cast_possible_wrap)] // Intentional for binary format parsing
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![warn(missing_docs)]

pub mod sniff;
pub mod wad;
pub mod zip;

pub use sniff::ContainerFormat;
pub use wad::{ContainerRole, WadDirectory, WadEntry, WadError};
pub use zip::{CompressionMethod, ZipDirectory, ZipEntry, ZipError};
