//! Turning an opened container into record seeds
//!
//! Loaders never touch the directory. They return everything needed to merge
//! the container, or a reason string, so a failure leaves no trace.

use crate::backing::{Backing, ZipBacking};
use crate::config::DirectoryConfig;
use crate::container::{ContainerData, ContainerKind, SourceId};
use crate::name::LumpName;
use crate::namespace::{self, Namespace};
use bytes::Bytes;
use lumpvfs_formats::wad::WadDirectory;
use lumpvfs_formats::zip::{self, SkipReason, ZipDirectory, ZipEntry, ZipError};
use lumpvfs_formats::{ContainerRole, WadEntry};
use std::fs::File;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Smallest file that can hold a WAD header plus one directory entry
pub(crate) const MIN_WAD_SIZE: u64 = 28;

pub(crate) struct RecordSeed {
    pub(crate) name: LumpName,
    pub(crate) path: Option<String>,
    pub(crate) namespace: Namespace,
    pub(crate) size: usize,
    pub(crate) backing: Backing,
}

pub(crate) struct Loaded {
    pub(crate) kind: ContainerKind,
    pub(crate) role: Option<ContainerRole>,
    pub(crate) data: ContainerData,
    pub(crate) seeds: Vec<RecordSeed>,
    /// WAD images found inside a zip, named `container:path`
    pub(crate) embedded: Vec<(String, Bytes)>,
    /// WAD files found inside a loose directory
    pub(crate) nested: Vec<PathBuf>,
}

impl Loaded {
    fn new(kind: ContainerKind, data: ContainerData) -> Self {
        Self {
            kind,
            role: None,
            data,
            seeds: Vec::new(),
            embedded: Vec::new(),
            nested: Vec::new(),
        }
    }
}

fn wad_seeds(entries: &[WadEntry], backing: impl Fn(&WadEntry) -> Backing) -> Vec<RecordSeed> {
    namespace::classify_wad_entries(entries)
        .into_iter()
        .zip(entries)
        .map(|(namespace, entry)| RecordSeed {
            name: LumpName::from_raw(entry.name),
            path: None,
            namespace,
            size: entry.size as usize,
            backing: backing(entry),
        })
        .collect()
}

pub(crate) fn wad_file(source: SourceId, file: File) -> Result<Loaded, String> {
    let wad = WadDirectory::parse(&mut &file).map_err(|e| e.to_string())?;
    let mut loaded = Loaded::new(ContainerKind::Wad, ContainerData::File(file));
    loaded.role = Some(wad.role);
    loaded.seeds = wad_seeds(&wad.entries, |entry| Backing::DirectArchive {
        container: source,
        offset: u64::from(entry.offset),
    });
    Ok(loaded)
}

pub(crate) fn wad_memory(bytes: Bytes) -> Result<Loaded, String> {
    let wad = WadDirectory::parse_bytes(&bytes).map_err(|e| e.to_string())?;
    let mut loaded = Loaded::new(ContainerKind::Memory, ContainerData::Memory(bytes.clone()));
    loaded.role = Some(wad.role);
    loaded.seeds = wad_seeds(&wad.entries, |entry| {
        let start = entry.offset as usize;
        Backing::Memory {
            bytes: bytes.slice(start..start + entry.size as usize),
        }
    });
    Ok(loaded)
}

fn read_zip_entry(data: &ContainerData, entry: &ZipEntry) -> Result<Vec<u8>, ZipError> {
    match data {
        ContainerData::File(file) => zip::read_entry(&mut &*file, entry),
        ContainerData::Memory(bytes) => zip::read_entry(&mut Cursor::new(bytes.as_ref()), entry),
        ContainerData::Directory(path) => Err(ZipError::Io(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("{} is a directory", path.display()),
        ))),
    }
}

pub(crate) fn zip_archive(
    source: SourceId,
    name: &str,
    kind: ContainerKind,
    data: ContainerData,
    config: &DirectoryConfig,
) -> Result<Loaded, String> {
    let directory = match &data {
        ContainerData::File(file) => ZipDirectory::parse(&mut &*file),
        ContainerData::Memory(bytes) => ZipDirectory::parse_bytes(bytes),
        ContainerData::Directory(_) => return Err("not a zip archive".to_string()),
    }
    .map_err(|e| e.to_string())?;

    for (path, reason) in &directory.skipped {
        match reason {
            SkipReason::Encrypted => warn!("{}: skipping encrypted entry {}", name, path),
            SkipReason::Directory | SkipReason::Unnamed => {
                debug!("{}: skipping {:?} entry {:?}", name, reason, path);
            }
        }
    }

    let mut loaded = Loaded::new(kind, data);
    for entry in &directory.entries {
        let namespace = namespace::classify_path(&entry.name);
        let short = if namespace.is_indexed() {
            LumpName::from_path(&entry.name, namespace)
        } else {
            LumpName::default()
        };
        loaded.seeds.push(RecordSeed {
            name: short,
            path: Some(entry.name.clone()),
            namespace,
            size: entry.uncompressed_size as usize,
            backing: Backing::ZipEntry(ZipBacking::new(source, entry)),
        });
    }

    if config.load_embedded_archives {
        let candidates = directory.entries.iter().filter(|entry| {
            entry.name.ends_with(".wad")
                && !entry.name.starts_with("__macosx/")
                && u64::from(entry.uncompressed_size) >= MIN_WAD_SIZE
        });
        for entry in candidates {
            match read_zip_entry(&loaded.data, entry) {
                Ok(image) => loaded
                    .embedded
                    .push((format!("{name}:{}", entry.name), Bytes::from(image))),
                Err(e) => warn!("{}: cannot extract embedded {}: {}", name, entry.name, e),
            }
        }
    }

    Ok(loaded)
}

/// Lower-case file name used as the full path of a single-record container
fn file_key(name: &str) -> String {
    name.rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
        .to_lowercase()
}

pub(crate) fn bare_file(
    source: SourceId,
    path: &Path,
    file: File,
    namespace: Namespace,
) -> Result<Loaded, String> {
    let len = file.metadata().map_err(|e| e.to_string())?.len();
    let size = usize::try_from(len).map_err(|_| format!("{len} bytes is too large"))?;
    let key = file_key(&path.to_string_lossy());

    let mut loaded = Loaded::new(ContainerKind::File, ContainerData::File(file));
    loaded.seeds.push(RecordSeed {
        name: LumpName::from_path(&key, namespace),
        path: Some(key),
        namespace,
        size,
        backing: Backing::DirectArchive {
            container: source,
            offset: 0,
        },
    });
    Ok(loaded)
}

pub(crate) fn bare_memory(name: &str, bytes: Bytes, namespace: Namespace) -> Loaded {
    let key = file_key(name);
    let mut loaded = Loaded::new(ContainerKind::Memory, ContainerData::Memory(bytes.clone()));
    loaded.seeds.push(RecordSeed {
        name: LumpName::from_path(&key, namespace),
        path: Some(key),
        namespace,
        size: bytes.len(),
        backing: Backing::Memory { bytes },
    });
    loaded
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

pub(crate) fn loose_directory(root: &Path, config: &DirectoryConfig) -> Loaded {
    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(true)
        .max_depth(config.max_directory_depth)
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("{}: skipping entry: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let inner = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
            .to_lowercase();
        let size = match entry.metadata() {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                warn!("{}: cannot stat {}: {}", root.display(), inner, e);
                continue;
            }
        };
        files.push((inner, entry.into_path(), size));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));

    let mut loaded = Loaded::new(
        ContainerKind::Directory,
        ContainerData::Directory(root.to_path_buf()),
    );
    for (inner, path, size) in files {
        if inner.ends_with(".wad") && size >= MIN_WAD_SIZE {
            loaded.nested.push(path);
            continue;
        }
        let Ok(size) = usize::try_from(size) else {
            warn!("{}: {} is too large", root.display(), inner);
            continue;
        };
        let namespace = namespace::classify_path(&inner);
        let name = if namespace.is_indexed() {
            LumpName::from_path(&inner, namespace)
        } else {
            LumpName::default()
        };
        loaded.seeds.push(RecordSeed {
            name,
            path: Some(inner),
            namespace,
            size,
            backing: Backing::LooseFile { path },
        });
    }
    loaded
}
