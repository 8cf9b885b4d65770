//! Container format detection from magic bytes
//!
//! Probes run in a fixed order: WAD, then zip, then the bare-file fallback.
//! Every probe restores the stream position it started from, so callers can
//! hand the same reader straight to the matching parser.

use std::fmt;
use std::io::{Read, Seek, SeekFrom};

/// Bytes a WAD probe needs: the full 12-byte header
pub const WAD_PROBE_LEN: usize = 12;

/// Bytes a zip probe needs: the full 30-byte local file header
pub const ZIP_PROBE_LEN: usize = 30;

/// Classified container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerFormat {
    /// `IWAD`/`PWAD` archive
    Wad,
    /// PKWARE zip archive
    Zip,
    /// Anything else, a single opaque blob
    File,
}

impl ContainerFormat {
    /// Short lowercase name used in diagnostics
    pub const fn name(self) -> &'static str {
        match self {
            Self::Wad => "wad",
            Self::Zip => "zip",
            Self::File => "file",
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type Probe = (ContainerFormat, usize, fn(&[u8]) -> bool);

const PROBES: [Probe; 2] = [
    (ContainerFormat::Wad, WAD_PROBE_LEN, is_wad_header),
    (ContainerFormat::Zip, ZIP_PROBE_LEN, is_zip_header),
];

fn is_wad_header(header: &[u8]) -> bool {
    header.starts_with(b"IWAD") || header.starts_with(b"PWAD")
}

fn is_zip_header(header: &[u8]) -> bool {
    header.starts_with(b"PK\x03\x04")
}

/// Classify a seekable stream by its leading bytes
///
/// The stream position is the same on return as on entry. I/O errors while
/// probing count as "no match", so the result is always a format.
pub fn classify<R: Read + Seek>(reader: &mut R) -> ContainerFormat {
    let Ok(start) = reader.stream_position() else {
        return ContainerFormat::File;
    };

    for (format, len, predicate) in PROBES {
        let mut header = vec![0u8; len];
        let matched = reader.read_exact(&mut header).is_ok() && predicate(&header);
        let restored = reader.seek(SeekFrom::Start(start)).is_ok();
        if matched && restored {
            return format;
        }
    }

    ContainerFormat::File
}

/// Classify an in-memory image
pub fn classify_bytes(data: &[u8]) -> ContainerFormat {
    PROBES
        .iter()
        .find(|(_, len, predicate)| data.len() >= *len && predicate(data))
        .map_or(ContainerFormat::File, |(format, _, _)| *format)
}
