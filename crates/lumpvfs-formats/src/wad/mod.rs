//! WAD archive directory parsing
//!
//! A WAD is a 12-byte header followed somewhere by a flat table of 16-byte
//! entries. Entries are returned in directory order with normalised names;
//! marker interpretation (`S_START` and friends) is left to the caller.

pub mod error;
pub mod header;

pub use error::{Result, WadError};
pub use header::{
    ContainerRole, DIRECTORY_ENTRY_SIZE, HEADER_SIZE, NAME_LEN, WadDirectoryEntry, WadHeader,
    normalize_name,
};

use binrw::BinRead;
use std::io::{Read, Seek, SeekFrom};

/// One lump described by a WAD directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadEntry {
    /// Upper-cased, zero-padded name
    pub name: [u8; NAME_LEN],
    /// Absolute offset of the lump data
    pub offset: u32,
    /// Lump size in bytes
    pub size: u32,
}

impl WadEntry {
    /// Name as a string, without padding
    pub fn name_str(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }
}

/// Parsed WAD directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WadDirectory {
    /// Role declared by the header tag
    pub role: ContainerRole,
    /// Entries in directory order
    pub entries: Vec<WadEntry>,
}

impl WadDirectory {
    /// Parse the header and directory of a WAD
    ///
    /// The reader may be positioned anywhere; the WAD is assumed to start at
    /// offset 0. Parsing is all-or-nothing: any entry that lies outside the
    /// container fails the whole directory.
    pub fn parse<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let header = WadHeader::read(reader)?;
        let role = header.role()?;

        if header.lump_count < 0 {
            return Err(WadError::NegativeLumpCount(header.lump_count));
        }

        let table_end = i64::from(header.directory_offset)
            + i64::from(header.lump_count) * DIRECTORY_ENTRY_SIZE as i64;
        if header.directory_offset < 0 || table_end as u64 > len {
            return Err(WadError::DirectoryOutOfBounds {
                offset: i64::from(header.directory_offset),
                count: header.lump_count,
                len,
            });
        }

        reader.seek(SeekFrom::Start(header.directory_offset as u64))?;
        let mut table = vec![0u8; header.lump_count as usize * DIRECTORY_ENTRY_SIZE];
        reader.read_exact(&mut table)?;

        let mut entries = Vec::with_capacity(header.lump_count as usize);
        for (index, raw) in table.chunks_exact(DIRECTORY_ENTRY_SIZE).enumerate() {
            let raw = WadDirectoryEntry::read(&mut binrw::io::Cursor::new(raw))?;
            let name = normalize_name(&raw.name);
            let end = i64::from(raw.offset) + i64::from(raw.size);
            if raw.offset < 0 || raw.size < 0 || end as u64 > len {
                let entry = WadEntry {
                    name,
                    offset: 0,
                    size: 0,
                };
                return Err(WadError::LumpOutOfBounds {
                    index,
                    name: entry.name_str(),
                    offset: raw.offset,
                    size: raw.size,
                    len,
                });
            }
            entries.push(WadEntry {
                name,
                offset: raw.offset as u32,
                size: raw.size as u32,
            });
        }

        Ok(Self { role, entries })
    }

    /// Parse a WAD held in memory
    pub fn parse_bytes(data: &[u8]) -> Result<Self> {
        Self::parse(&mut std::io::Cursor::new(data))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use binrw::BinWrite;
    use binrw::io::Cursor;
    use pretty_assertions::assert_eq;

    fn build_wad(role: ContainerRole, lumps: &[(&str, &[u8])]) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_SIZE];
        let mut directory = Vec::new();
        for (name, payload) in lumps {
            let mut raw = [0u8; NAME_LEN];
            raw[..name.len()].copy_from_slice(name.as_bytes());
            directory.push(WadDirectoryEntry {
                offset: data.len() as i32,
                size: payload.len() as i32,
                name: raw,
            });
            data.extend_from_slice(payload);
        }
        let directory_offset = data.len() as i32;
        let mut cursor = Cursor::new(&mut data);
        WadHeader::new(role, lumps.len() as i32, directory_offset)
            .write(&mut cursor)
            .unwrap();
        cursor.set_position(directory_offset as u64);
        for entry in directory {
            entry.write(&mut cursor).unwrap();
        }
        data
    }

    #[test]
    fn test_parse_directory() {
        let data = build_wad(
            ContainerRole::Base,
            &[("playpal", b"pal"), ("S_START", b""), ("trooa1", b"sprite!!!")],
        );
        let wad = WadDirectory::parse_bytes(&data).unwrap();
        assert_eq!(wad.role, ContainerRole::Base);
        let names: Vec<String> = wad.entries.iter().map(WadEntry::name_str).collect();
        assert_eq!(names, vec!["PLAYPAL", "S_START", "TROOA1"]);
        assert_eq!(wad.entries[0].offset, 12);
        assert_eq!(wad.entries[0].size, 3);
        assert_eq!(wad.entries[2].size, 9);
    }

    #[test]
    fn test_empty_wad() {
        let data = build_wad(ContainerRole::Patch, &[]);
        let wad = WadDirectory::parse_bytes(&data).unwrap();
        assert_eq!(wad.role, ContainerRole::Patch);
        assert!(wad.entries.is_empty());
    }

    #[test]
    fn test_negative_count_rejected() {
        let mut data = build_wad(ContainerRole::Patch, &[]);
        data[4..8].copy_from_slice(&(-1i32).to_le_bytes());
        assert!(matches!(
            WadDirectory::parse_bytes(&data),
            Err(WadError::NegativeLumpCount(-1))
        ));
    }

    #[test]
    fn test_directory_past_end_rejected() {
        let mut data = build_wad(ContainerRole::Patch, &[("a", b"x")]);
        data.truncate(data.len() - 4);
        assert!(matches!(
            WadDirectory::parse_bytes(&data),
            Err(WadError::DirectoryOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_lump_past_end_rejected() {
        let mut data = build_wad(ContainerRole::Patch, &[("a", b"x")]);
        let size_at = data.len() - DIRECTORY_ENTRY_SIZE + 4;
        data[size_at..size_at + 4].copy_from_slice(&1000i32.to_le_bytes());
        assert!(matches!(
            WadDirectory::parse_bytes(&data),
            Err(WadError::LumpOutOfBounds { index: 0, .. })
        ));
    }

    #[test]
    fn test_bad_tag_rejected() {
        let mut data = build_wad(ContainerRole::Patch, &[]);
        data[..4].copy_from_slice(b"JUNK");
        assert!(matches!(
            WadDirectory::parse_bytes(&data),
            Err(WadError::InvalidTag(_))
        ));
    }
}
