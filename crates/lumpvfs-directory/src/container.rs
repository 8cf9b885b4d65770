//! Opened containers and their byte sources

use bytes::Bytes;
use lumpvfs_formats::ContainerRole;
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::PathBuf;

/// Identifies a container by the order it was added
///
/// Ids increase monotonically and are never reused, even after a reset drops
/// the container that held one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(pub u32);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source {}", self.0)
    }
}

/// Physical shape of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// WAD archive on disk
    Wad,
    /// Zip archive on disk
    Zip,
    /// Loose directory tree
    Directory,
    /// Buffer held in memory (WAD, zip or single blob)
    Memory,
    /// Single file on disk exposed as one record
    File,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Wad => "wad",
            Self::Zip => "zip",
            Self::Directory => "directory",
            Self::Memory => "memory",
            Self::File => "file",
        })
    }
}

/// Public description of an added container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    /// Precedence id
    pub source: SourceId,
    /// Physical shape
    pub kind: ContainerKind,
    /// Path or caller-supplied name
    pub name: String,
    /// Role declared by a WAD header
    pub role: Option<ContainerRole>,
    /// Records contributed
    pub record_count: usize,
}

/// Where a container's bytes come from
#[derive(Debug)]
pub(crate) enum ContainerData {
    File(File),
    Memory(Bytes),
    Directory(PathBuf),
}

impl ContainerData {
    /// Fill `dest` from `offset`
    pub(crate) fn read_at(&self, offset: u64, dest: &mut [u8]) -> io::Result<()> {
        match self {
            Self::File(file) => {
                let mut reader = file;
                reader.seek(SeekFrom::Start(offset))?;
                reader.read_exact(dest)
            }
            Self::Memory(bytes) => {
                let src = usize::try_from(offset)
                    .ok()
                    .and_then(|start| Some(start..start.checked_add(dest.len())?))
                    .and_then(|range| bytes.get(range))
                    .ok_or_else(|| {
                        io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            format!(
                                "range {offset}+{} outside {}-byte buffer",
                                dest.len(),
                                bytes.len()
                            ),
                        )
                    })?;
                dest.copy_from_slice(src);
                Ok(())
            }
            Self::Directory(path) => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("directory {} has no byte stream", path.display()),
            )),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Container {
    pub(crate) info: ContainerInfo,
    pub(crate) data: ContainerData,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_memory_read_at() {
        let data = ContainerData::Memory(Bytes::from_static(b"0123456789"));
        let mut dest = [0u8; 4];
        data.read_at(3, &mut dest).unwrap();
        assert_eq!(&dest, b"3456");

        let err = data.read_at(8, &mut dest).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_file_read_at() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"IWAD payload").unwrap();
        let data = ContainerData::File(file);

        let mut dest = [0u8; 7];
        data.read_at(5, &mut dest).unwrap();
        assert_eq!(&dest, b"payload");
        // Reads are positioned, not sequential
        data.read_at(0, &mut dest[..4]).unwrap();
        assert_eq!(&dest[..4], b"IWAD");
    }

    #[test]
    fn test_directory_has_no_stream() {
        let data = ContainerData::Directory(PathBuf::from("/tmp"));
        let mut dest = [0u8; 1];
        assert!(data.read_at(0, &mut dest).is_err());
    }
}
