//! Per-record backing dispatch
//!
//! Every record is read through exactly one [`Backing`] variant. The set is
//! closed: adding a kind means touching every `match` below.

use crate::container::{Container, SourceId};
use binrw::BinRead;
use bytes::Bytes;
use lumpvfs_formats::zip::{self, CompressionMethod, LOCAL_HEADER_SIZE, LocalFileHeader, ZipError};
use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while reading through a backing
#[derive(Error, Debug)]
pub enum BackingError {
    /// I/O failure against the container or loose file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Payload could not be decoded to the declared size
    #[error("{0}")]
    Decode(#[from] ZipError),

    /// Source bytes differ in length from the record
    #[error("Size mismatch: expected {expected}, got {actual}")]
    SizeMismatch {
        /// Record size
        expected: usize,
        /// Bytes available
        actual: usize,
    },

    /// The container this record references is gone
    #[error("Container {0} is closed")]
    ContainerClosed(SourceId),
}

/// Zip entry location and decoding parameters
#[derive(Debug, Clone)]
pub struct ZipBacking {
    /// Container holding the archive
    pub container: SourceId,
    /// Stored payload size
    pub compressed_size: u32,
    /// Compression method
    pub method: CompressionMethod,
    /// Offset of the local file header
    pub local_header_offset: u32,
    /// General purpose flags
    pub flags: u16,
    /// CRC-32 of the decoded payload
    pub crc32: u32,
    data_offset: OnceCell<u64>,
}

impl ZipBacking {
    /// Describe a zip entry inside `container`
    pub fn new(container: SourceId, entry: &zip::ZipEntry) -> Self {
        Self {
            container,
            compressed_size: entry.compressed_size,
            method: entry.method,
            local_header_offset: entry.local_header_offset,
            flags: entry.flags,
            crc32: entry.crc32,
            data_offset: OnceCell::new(),
        }
    }

    /// Payload offset, resolved through the local header on first use
    fn data_offset(&self, container: &Container) -> Result<u64, BackingError> {
        if let Some(&offset) = self.data_offset.get() {
            return Ok(offset);
        }

        let header_offset = u64::from(self.local_header_offset);
        let mut raw = [0u8; LOCAL_HEADER_SIZE];
        container.data.read_at(header_offset, &mut raw)?;
        let header = LocalFileHeader::read(&mut io::Cursor::new(&raw[..]))
            .map_err(|_| ZipError::InvalidLocalHeader(header_offset))?;

        let offset = header_offset + header.total_len();
        let _ = self.data_offset.set(offset);
        Ok(offset)
    }
}

/// Where a record's bytes physically live
#[derive(Debug, Clone)]
pub enum Backing {
    /// Verbatim bytes at an offset inside a container file
    DirectArchive {
        /// Container holding the bytes
        container: SourceId,
        /// Absolute offset
        offset: u64,
    },
    /// Bytes already resident, shared with the container buffer
    Memory {
        /// The record bytes
        bytes: Bytes,
    },
    /// A whole file inside a loose directory
    LooseFile {
        /// Absolute path
        path: PathBuf,
    },
    /// A possibly compressed zip entry
    ZipEntry(ZipBacking),
}

/// Discriminant of [`Backing`] for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackingKind {
    /// [`Backing::DirectArchive`]
    DirectArchive,
    /// [`Backing::Memory`]
    Memory,
    /// [`Backing::LooseFile`]
    LooseFile,
    /// [`Backing::ZipEntry`]
    ZipEntry,
}

impl Backing {
    /// Which kind of backing this is
    pub const fn kind(&self) -> BackingKind {
        match self {
            Self::DirectArchive { .. } => BackingKind::DirectArchive,
            Self::Memory { .. } => BackingKind::Memory,
            Self::LooseFile { .. } => BackingKind::LooseFile,
            Self::ZipEntry(_) => BackingKind::ZipEntry,
        }
    }

    /// Container this backing reads from, if any
    pub const fn container(&self) -> Option<SourceId> {
        match self {
            Self::DirectArchive { container, .. } => Some(*container),
            Self::ZipEntry(zip) => Some(zip.container),
            Self::Memory { .. } | Self::LooseFile { .. } => None,
        }
    }

    /// Fill `dest` with the record bytes
    ///
    /// `dest.len()` must already equal the record size. With `verify_crc`
    /// set, decoded zip entries are checked against their recorded CRC-32.
    pub(crate) fn read_into(
        &self,
        containers: &BTreeMap<SourceId, Container>,
        verify_crc: bool,
        dest: &mut [u8],
    ) -> Result<(), BackingError> {
        let lookup = |id: SourceId| containers.get(&id).ok_or(BackingError::ContainerClosed(id));

        match self {
            Self::DirectArchive { container: id, offset } => {
                lookup(*id)?.data.read_at(*offset, dest)?;
            }
            Self::Memory { bytes } => {
                if bytes.len() != dest.len() {
                    return Err(BackingError::SizeMismatch {
                        expected: dest.len(),
                        actual: bytes.len(),
                    });
                }
                dest.copy_from_slice(bytes);
            }
            Self::LooseFile { path } => {
                let data = std::fs::read(path)?;
                if data.len() != dest.len() {
                    return Err(BackingError::SizeMismatch {
                        expected: dest.len(),
                        actual: data.len(),
                    });
                }
                dest.copy_from_slice(&data);
            }
            Self::ZipEntry(entry) => {
                let container = lookup(entry.container)?;
                let data_offset = entry.data_offset(container)?;
                let mut compressed = vec![0u8; entry.compressed_size as usize];
                container.data.read_at(data_offset, &mut compressed)?;
                zip::decode_into(entry.method, &compressed, dest)?;
                if verify_crc {
                    zip::verify_crc32(dest, entry.crc32)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::container::{ContainerData, ContainerInfo, ContainerKind};

    fn memory_container(source: SourceId, data: &'static [u8]) -> BTreeMap<SourceId, Container> {
        let container = Container {
            info: ContainerInfo {
                source,
                kind: ContainerKind::Memory,
                name: "test".to_string(),
                role: None,
                record_count: 1,
            },
            data: ContainerData::Memory(Bytes::from_static(data)),
        };
        BTreeMap::from([(source, container)])
    }

    #[test]
    fn test_direct_archive() {
        let containers = memory_container(SourceId(0), b"headerLUMPtrailer");
        let backing = Backing::DirectArchive {
            container: SourceId(0),
            offset: 6,
        };
        let mut dest = [0u8; 4];
        backing.read_into(&containers, false, &mut dest).unwrap();
        assert_eq!(&dest, b"LUMP");
        assert_eq!(backing.kind(), BackingKind::DirectArchive);
        assert_eq!(backing.container(), Some(SourceId(0)));
    }

    #[test]
    fn test_closed_container() {
        let backing = Backing::DirectArchive {
            container: SourceId(3),
            offset: 0,
        };
        let mut dest = [0u8; 1];
        assert!(matches!(
            backing.read_into(&BTreeMap::new(), false, &mut dest),
            Err(BackingError::ContainerClosed(SourceId(3)))
        ));
    }

    #[test]
    fn test_memory_size_mismatch() {
        let backing = Backing::Memory {
            bytes: Bytes::from_static(b"abc"),
        };
        let mut dest = [0u8; 4];
        assert!(matches!(
            backing.read_into(&BTreeMap::new(), false, &mut dest),
            Err(BackingError::SizeMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_loose_file_size_checked() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lump.txt");
        std::fs::write(&path, b"grown since scan").unwrap();

        let backing = Backing::LooseFile { path };
        let mut dest = [0u8; 5];
        assert!(matches!(
            backing.read_into(&BTreeMap::new(), false, &mut dest),
            Err(BackingError::SizeMismatch { .. })
        ));
    }
}
