//! Test utilities for lumpvfs
//!
//! Builds small WAD and zip images in memory so tests never depend on real
//! game data. The builders write just enough of each format for the readers
//! to accept them, plus a few knobs for producing damaged archives.

use flate2::Compression;
use flate2::write::DeflateEncoder;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Builder for a WAD image
#[derive(Debug, Clone)]
pub struct WadBuilder {
    tag: [u8; 4],
    lumps: Vec<(String, Vec<u8>)>,
}

impl WadBuilder {
    /// Start an `IWAD`
    pub fn iwad() -> Self {
        Self {
            tag: *b"IWAD",
            lumps: Vec::new(),
        }
    }

    /// Start a `PWAD`
    pub fn pwad() -> Self {
        Self {
            tag: *b"PWAD",
            lumps: Vec::new(),
        }
    }

    /// Append a lump; names longer than 8 bytes are cut
    #[must_use]
    pub fn lump(mut self, name: &str, data: &[u8]) -> Self {
        self.lumps.push((name.to_string(), data.to_vec()));
        self
    }

    /// Append an empty marker lump
    #[must_use]
    pub fn marker(self, name: &str) -> Self {
        self.lump(name, &[])
    }

    /// Serialise: header, lump data in order, then the directory
    pub fn build(&self) -> Vec<u8> {
        let mut data = vec![0u8; 12];
        let mut directory = Vec::with_capacity(self.lumps.len() * 16);
        for (name, payload) in &self.lumps {
            directory.extend_from_slice(&(data.len() as i32).to_le_bytes());
            directory.extend_from_slice(&(payload.len() as i32).to_le_bytes());
            let mut raw = [0u8; 8];
            let bytes = name.as_bytes();
            let len = bytes.len().min(8);
            raw[..len].copy_from_slice(&bytes[..len]);
            directory.extend_from_slice(&raw);
            data.extend_from_slice(payload);
        }
        let directory_offset = data.len() as i32;
        data[..4].copy_from_slice(&self.tag);
        data[4..8].copy_from_slice(&(self.lumps.len() as i32).to_le_bytes());
        data[8..12].copy_from_slice(&directory_offset.to_le_bytes());
        data.extend_from_slice(&directory);
        data
    }
}

/// One zip entry as it will be written
#[derive(Debug, Clone)]
pub struct ZipFixtureEntry {
    /// Stored name, written verbatim
    pub name: String,
    /// Uncompressed content
    pub data: Vec<u8>,
    /// Method id written to both headers
    pub method: u16,
    /// General purpose flags
    pub flags: u16,
}

/// Builder for a single-disk zip image
#[derive(Debug, Clone, Default)]
pub struct ZipBuilder {
    entries: Vec<ZipFixtureEntry>,
    comment: Vec<u8>,
    declared_entries: Option<u16>,
}

impl ZipBuilder {
    /// Empty archive
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry stored without compression
    #[must_use]
    pub fn stored(self, name: &str, data: &[u8]) -> Self {
        self.with_entry(name, data, 0, 0)
    }

    /// Add a deflate-compressed entry
    #[must_use]
    pub fn deflated(self, name: &str, data: &[u8]) -> Self {
        self.with_entry(name, data, 8, 0)
    }

    /// Add an entry with an arbitrary method id and flags
    ///
    /// For methods other than 0 and 8 the payload is written verbatim.
    #[must_use]
    pub fn with_entry(mut self, name: &str, data: &[u8], method: u16, flags: u16) -> Self {
        self.entries.push(ZipFixtureEntry {
            name: name.to_string(),
            data: data.to_vec(),
            method,
            flags,
        });
        self
    }

    /// Add a directory placeholder entry
    #[must_use]
    pub fn directory(self, name: &str) -> Self {
        self.with_entry(name, &[], 0, 0)
    }

    /// Trailing archive comment
    #[must_use]
    pub fn comment(mut self, comment: &[u8]) -> Self {
        self.comment = comment.to_vec();
        self
    }

    /// Override the entry count written to the end record
    #[must_use]
    pub fn declare_entries(mut self, count: u16) -> Self {
        self.declared_entries = Some(count);
        self
    }

    fn payload(entry: &ZipFixtureEntry) -> Vec<u8> {
        match entry.method {
            8 => {
                let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
                encoder
                    .write_all(&entry.data)
                    .and_then(|()| encoder.finish())
                    .unwrap_or_default()
            }
            _ => entry.data.clone(),
        }
    }

    /// Serialise the archive and return it with the central directory offset
    pub fn build_with_layout(&self) -> (Vec<u8>, usize) {
        let mut out = Vec::new();
        let mut central = Vec::new();

        for entry in &self.entries {
            let payload = Self::payload(entry);
            let crc = crc32fast::hash(&entry.data);
            let local_offset = out.len() as u32;
            let name = entry.name.as_bytes();

            out.extend_from_slice(&0x04034b50u32.to_le_bytes());
            out.extend_from_slice(&20u16.to_le_bytes());
            out.extend_from_slice(&entry.flags.to_le_bytes());
            out.extend_from_slice(&entry.method.to_le_bytes());
            out.extend_from_slice(&[0, 0, 0, 0]);
            out.extend_from_slice(&crc.to_le_bytes());
            out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            out.extend_from_slice(&(entry.data.len() as u32).to_le_bytes());
            out.extend_from_slice(&(name.len() as u16).to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes());
            out.extend_from_slice(name);
            out.extend_from_slice(&payload);

            central.extend_from_slice(&0x02014b50u32.to_le_bytes());
            central.extend_from_slice(&20u16.to_le_bytes());
            central.extend_from_slice(&20u16.to_le_bytes());
            central.extend_from_slice(&entry.flags.to_le_bytes());
            central.extend_from_slice(&entry.method.to_le_bytes());
            central.extend_from_slice(&[0, 0, 0, 0]);
            central.extend_from_slice(&crc.to_le_bytes());
            central.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            central.extend_from_slice(&(entry.data.len() as u32).to_le_bytes());
            central.extend_from_slice(&(name.len() as u16).to_le_bytes());
            central.extend_from_slice(&[0; 8]);
            central.extend_from_slice(&[0; 4]);
            central.extend_from_slice(&local_offset.to_le_bytes());
            central.extend_from_slice(name);
        }

        let central_offset = out.len();
        out.extend_from_slice(&central);

        let count = self
            .declared_entries
            .unwrap_or(self.entries.len() as u16);
        out.extend_from_slice(&0x06054b50u32.to_le_bytes());
        out.extend_from_slice(&[0, 0, 0, 0]);
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&count.to_le_bytes());
        out.extend_from_slice(&(central.len() as u32).to_le_bytes());
        out.extend_from_slice(&(central_offset as u32).to_le_bytes());
        out.extend_from_slice(&(self.comment.len() as u16).to_le_bytes());
        out.extend_from_slice(&self.comment);

        (out, central_offset)
    }

    /// Serialise the archive
    pub fn build(&self) -> Vec<u8> {
        self.build_with_layout().0
    }
}

/// Write `data` to `name` inside `dir` and return the full path
pub fn write_fixture(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("create {parent:?}: {e}"));
    }
    std::fs::write(&path, data).unwrap_or_else(|e| panic!("write {path:?}: {e}"));
    path
}

/// Fresh temporary directory for a test
pub fn temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"))
}
