//! Zip central directory reading
//!
//! Parsing only touches the end record and the central directory. Entry
//! payloads are located through their local headers and decoded on demand.

pub mod compression;
pub mod error;
pub mod records;

pub use compression::{CompressionMethod, decode, decode_into, verify_crc32};
pub use error::{Result, ZipError};
pub use records::{
    CENTRAL_DIRECTORY_ENTRY_SIZE, CentralDirectoryEntry, EOCD_SIZE, EndOfCentralDirectory,
    LOCAL_HEADER_SIZE, LocalFileHeader,
};

use binrw::BinRead;
use std::io::{Read, Seek, SeekFrom};

/// Longest comment an end record can carry
pub const MAX_COMMENT_LEN: usize = u16::MAX as usize;

/// Bytes scanned backward from the end of the archive for the end record
pub const MAX_EOCD_SEARCH: usize = EOCD_SIZE + MAX_COMMENT_LEN;

/// Largest expansion a deflate stream can produce per input byte
pub const MAX_DEFLATE_RATIO: u64 = 1032;

/// General purpose flag bit marking an encrypted entry
pub const FLAG_ENCRYPTED: u16 = 0x0001;

/// Find the end record inside the trailing bytes of an archive
///
/// `tail` is the last `min(len, MAX_EOCD_SEARCH)` bytes. Returns the offset
/// of the signature within `tail`. A candidate whose declared comment would
/// run past the end is ignored, which skips signature bytes that happen to
/// appear inside a comment.
pub fn locate_end_record(tail: &[u8]) -> Option<usize> {
    if tail.len() < EOCD_SIZE {
        return None;
    }
    let signature = records::END_OF_CENTRAL_DIRECTORY_SIGNATURE.to_le_bytes();
    (0..=tail.len() - EOCD_SIZE).rev().find(|&pos| {
        if tail[pos..pos + 4] != signature {
            return false;
        }
        let comment_len = usize::from(u16::from_le_bytes([tail[pos + 20], tail[pos + 21]]));
        pos + EOCD_SIZE + comment_len <= tail.len()
    })
}

/// Absolute offset of the end of central directory record
pub fn find_end_of_central_directory<R: Read + Seek>(reader: &mut R) -> Result<u64> {
    let len = reader.seek(SeekFrom::End(0))?;
    let window = len.min(MAX_EOCD_SEARCH as u64);
    let start = len - window;

    reader.seek(SeekFrom::Start(start))?;
    let mut tail = vec![0u8; window as usize];
    reader.read_exact(&mut tail)?;

    locate_end_record(&tail)
        .map(|pos| start + pos as u64)
        .ok_or(ZipError::MissingEndOfCentralDirectory)
}

/// Why a central directory entry was left out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Entry has an empty name
    Unnamed,
    /// Entry is a directory placeholder
    Directory,
    /// Entry is encrypted
    Encrypted,
}

/// A file entry from the central directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipEntry {
    /// Lower-cased path with forward slashes
    pub name: String,
    /// General purpose bit flags
    pub flags: u16,
    /// Compression method
    pub method: CompressionMethod,
    /// CRC-32 of the uncompressed data
    pub crc32: u32,
    /// Compressed size
    pub compressed_size: u32,
    /// Uncompressed size
    pub uncompressed_size: u32,
    /// Offset of the local file header
    pub local_header_offset: u32,
}

impl ZipEntry {
    /// Whether the encryption flag is set
    pub const fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }

    /// Resolve the absolute offset of the entry data through its local header
    pub fn data_offset<R: Read + Seek>(&self, reader: &mut R) -> Result<u64> {
        let offset = u64::from(self.local_header_offset);
        reader.seek(SeekFrom::Start(offset))?;
        let header = LocalFileHeader::read(reader).map_err(|e| match e {
            binrw::Error::BadMagic { .. } => ZipError::InvalidLocalHeader(offset),
            other => ZipError::BinRw(other),
        })?;
        Ok(offset + header.total_len())
    }

    /// Read the raw compressed bytes starting at `data_offset`
    pub fn read_compressed<R: Read + Seek>(
        &self,
        reader: &mut R,
        data_offset: u64,
    ) -> Result<Vec<u8>> {
        reader.seek(SeekFrom::Start(data_offset))?;
        let mut compressed = vec![0u8; self.compressed_size as usize];
        reader.read_exact(&mut compressed)?;
        Ok(compressed)
    }
}

/// Normalise a stored entry name: lower-case, forward slashes
pub fn normalize_path(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).replace('\\', "/").to_lowercase()
}

/// Reject entries whose sizes cannot fit the archive
///
/// The payload plus its local header must end before the central directory.
/// A stored entry decodes to exactly its payload; anything else may expand by
/// at most [`MAX_DEFLATE_RATIO`].
fn check_entry_bounds(name: &str, raw: &CentralDirectoryEntry, limit: u64) -> Result<()> {
    let end = u64::from(raw.local_header_offset)
        + LOCAL_HEADER_SIZE as u64
        + u64::from(raw.compressed_size);
    if end > limit {
        return Err(ZipError::EntryOutOfBounds {
            name: name.to_string(),
            end,
            limit,
        });
    }

    let compressed = u64::from(raw.compressed_size);
    let uncompressed = u64::from(raw.uncompressed_size);
    let plausible = match CompressionMethod::from(raw.method) {
        CompressionMethod::Stored => uncompressed == compressed,
        _ => uncompressed <= compressed * MAX_DEFLATE_RATIO,
    };
    if !plausible {
        return Err(ZipError::ImplausibleSize {
            name: name.to_string(),
            compressed: raw.compressed_size,
            uncompressed: raw.uncompressed_size,
        });
    }
    Ok(())
}

/// Parsed central directory of one archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipDirectory {
    /// File entries, ordered by name
    pub entries: Vec<ZipEntry>,
    /// Entries left out and why
    pub skipped: Vec<(String, SkipReason)>,
}

impl ZipDirectory {
    /// Parse the central directory of a single-disk archive
    ///
    /// All-or-nothing: a truncated directory, a directory outside the archive
    /// or a malformed entry fails the whole archive.
    pub fn parse<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let eocd_offset = find_end_of_central_directory(reader)?;
        reader.seek(SeekFrom::Start(eocd_offset))?;
        let eocd = EndOfCentralDirectory::read(reader)?;

        if eocd.disk_number != 0
            || eocd.directory_disk != 0
            || eocd.entries_on_disk != eocd.total_entries
        {
            return Err(ZipError::MultiDisk {
                disk: eocd.disk_number,
                directory_disk: eocd.directory_disk,
            });
        }

        if eocd.total_entries == u16::MAX
            || eocd.directory_offset == u32::MAX
            || eocd.directory_size == u32::MAX
        {
            return Err(ZipError::Zip64Unsupported);
        }

        let directory_end = u64::from(eocd.directory_offset) + u64::from(eocd.directory_size);
        if directory_end > eocd_offset {
            return Err(ZipError::DirectoryOutOfBounds {
                offset: eocd.directory_offset,
                size: eocd.directory_size,
                limit: eocd_offset,
            });
        }

        reader.seek(SeekFrom::Start(u64::from(eocd.directory_offset)))?;
        let mut table = vec![0u8; eocd.directory_size as usize];
        reader.read_exact(&mut table)?;
        let mut cursor = binrw::io::Cursor::new(table.as_slice());

        let mut entries = Vec::with_capacity(usize::from(eocd.total_entries));
        let mut skipped = Vec::new();
        for parsed in 0..usize::from(eocd.total_entries) {
            let raw = CentralDirectoryEntry::read(&mut cursor).map_err(|_| {
                ZipError::TruncatedDirectory {
                    parsed,
                    declared: eocd.total_entries,
                }
            })?;

            let name = normalize_path(&raw.name);
            let reason = if name.is_empty() {
                Some(SkipReason::Unnamed)
            } else if name.ends_with('/') && raw.uncompressed_size == 0 {
                Some(SkipReason::Directory)
            } else if raw.flags & FLAG_ENCRYPTED != 0 {
                Some(SkipReason::Encrypted)
            } else {
                None
            };
            if let Some(reason) = reason {
                skipped.push((name, reason));
                continue;
            }

            check_entry_bounds(&name, &raw, u64::from(eocd.directory_offset))?;
            entries.push(ZipEntry {
                name,
                flags: raw.flags,
                method: CompressionMethod::from(raw.method),
                crc32: raw.crc32,
                compressed_size: raw.compressed_size,
                uncompressed_size: raw.uncompressed_size,
                local_header_offset: raw.local_header_offset,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self { entries, skipped })
    }

    /// Parse an archive held in memory
    pub fn parse_bytes(data: &[u8]) -> Result<Self> {
        Self::parse(&mut std::io::Cursor::new(data))
    }

    /// Look up an entry by its normalised path
    pub fn entry(&self, name: &str) -> Option<&ZipEntry> {
        self.entries
            .binary_search_by(|entry| entry.name.as_str().cmp(name))
            .ok()
            .map(|index| &self.entries[index])
    }
}

/// Read and decode one entry into a new buffer
pub fn read_entry<R: Read + Seek>(reader: &mut R, entry: &ZipEntry) -> Result<Vec<u8>> {
    let data_offset = entry.data_offset(reader)?;
    let compressed = entry.read_compressed(reader, data_offset)?;
    decode(entry.method, &compressed, entry.uncompressed_size as usize)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn end_record(comment: &[u8]) -> Vec<u8> {
        let mut bytes = records::END_OF_CENTRAL_DIRECTORY_SIGNATURE.to_le_bytes().to_vec();
        bytes.resize(20, 0);
        bytes.extend_from_slice(&(comment.len() as u16).to_le_bytes());
        bytes.extend_from_slice(comment);
        bytes
    }

    #[test]
    fn test_search_window() {
        assert_eq!(MAX_EOCD_SEARCH, 22 + 65535);
    }

    #[test]
    fn test_locate_without_comment() {
        let mut tail = vec![0xAAu8; 100];
        tail.extend(end_record(b""));
        assert_eq!(locate_end_record(&tail), Some(100));
    }

    #[test]
    fn test_locate_with_comment() {
        let mut tail = vec![0u8; 10];
        tail.extend(end_record(b"built by hand"));
        assert_eq!(locate_end_record(&tail), Some(10));
    }

    #[test]
    fn test_signature_inside_comment_ignored() {
        // The comment holds a fake end record whose own comment length overruns
        let mut fake = records::END_OF_CENTRAL_DIRECTORY_SIGNATURE.to_le_bytes().to_vec();
        fake.resize(20, 0);
        fake.extend_from_slice(&500u16.to_le_bytes());
        let tail = end_record(&fake);
        assert_eq!(locate_end_record(&tail), Some(0));
    }

    #[test]
    fn test_locate_missing() {
        assert_eq!(locate_end_record(&[0u8; 21]), None);
        assert_eq!(locate_end_record(&[0u8; 200]), None);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(b"Sprites\\TROOA1.png"), "sprites/trooa1.png");
        assert_eq!(normalize_path(b"MAPINFO"), "mapinfo");
    }
}
