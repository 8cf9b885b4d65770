//! WAD header and directory entry layouts

use crate::wad::error::{Result, WadError};
use binrw::{BinRead, BinWrite};

/// Size of the WAD header in bytes
pub const HEADER_SIZE: usize = 12;

/// Size of one directory entry in bytes
pub const DIRECTORY_ENTRY_SIZE: usize = 16;

/// Width of a lump name field
pub const NAME_LEN: usize = 8;

/// Role a WAD declares through its header tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerRole {
    /// `IWAD`: a complete base game
    Base,
    /// `PWAD`: a patch layered on top of a base
    Patch,
}

/// WAD header
///
/// - Tag `IWAD` or `PWAD` (4 bytes)
/// - Lump count (4 bytes, little-endian, signed)
/// - Directory offset (4 bytes, little-endian, signed)
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct WadHeader {
    /// Tag, `IWAD` or `PWAD`
    pub tag: [u8; 4],

    /// Number of entries in the directory
    pub lump_count: i32,

    /// Absolute offset of the directory
    pub directory_offset: i32,
}

impl WadHeader {
    /// Create a header for the given role
    pub fn new(role: ContainerRole, lump_count: i32, directory_offset: i32) -> Self {
        let tag = match role {
            ContainerRole::Base => *b"IWAD",
            ContainerRole::Patch => *b"PWAD",
        };
        Self {
            tag,
            lump_count,
            directory_offset,
        }
    }

    /// Role declared by the tag
    pub fn role(&self) -> Result<ContainerRole> {
        match &self.tag {
            b"IWAD" => Ok(ContainerRole::Base),
            b"PWAD" => Ok(ContainerRole::Patch),
            _ => Err(WadError::InvalidTag(self.tag)),
        }
    }
}

/// Raw WAD directory entry
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct WadDirectoryEntry {
    /// Absolute offset of the lump data
    pub offset: i32,

    /// Lump size in bytes
    pub size: i32,

    /// NUL-padded name
    pub name: [u8; NAME_LEN],
}

/// Normalise an 8-byte name field
///
/// Bytes after the first NUL are cleared and ASCII letters are upper-cased,
/// so two names that compare equal case-insensitively have equal bytes.
pub fn normalize_name(raw: &[u8; NAME_LEN]) -> [u8; NAME_LEN] {
    let mut name = [0u8; NAME_LEN];
    for (dst, &src) in name.iter_mut().zip(raw.iter().take_while(|&&b| b != 0)) {
        *dst = src.to_ascii_uppercase();
    }
    name
}
