//! The resource directory
//!
//! Records from every container live in one append-only list in load order.
//! Three structures sit on top of it:
//!
//! - per-namespace runs: record indices of each namespace, in load order
//! - the short-name index: `(namespace, name)` to the winning record
//! - the path index: full zip/loose path to the winning record
//!
//! Both indices are last-added-wins. A reset truncates the list to the
//! records of the kept containers and rebuilds the indices from scratch.

use crate::backing::BackingError;
use crate::config::DirectoryConfig;
use crate::container::{Container, ContainerData, ContainerInfo, ContainerKind, SourceId};
use crate::loader::{self, Loaded};
use crate::name::LumpName;
use crate::namespace::Namespace;
use crate::record::{Record, RecordHandle};
use crate::stats::DirectoryStats;
use crate::{DirectoryError, Result};
use bytes::Bytes;
use lumpvfs_cache::{BufferId, Epoch, EpochArena};
use lumpvfs_formats::{ContainerFormat, ContainerRole, sniff};
use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

/// Options for adding one container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddOptions {
    /// Namespace for a bare file; ignored for WAD, zip and directories
    pub namespace: Option<Namespace>,
    /// Fail with `FormatUnrecognized` unless the container sniffs as this
    pub required_format: Option<ContainerFormat>,
    /// Try default extensions and search paths when the path does not exist
    pub allow_inexact: bool,
}

impl AddOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a bare file in `namespace`
    #[must_use]
    pub const fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = Some(namespace);
        self
    }

    /// Require a specific container format
    #[must_use]
    pub const fn require_format(mut self, format: ContainerFormat) -> Self {
        self.required_format = Some(format);
        self
    }

    /// Allow extension and search-path resolution
    #[must_use]
    pub const fn inexact(mut self) -> Self {
        self.allow_inexact = true;
        self
    }
}

/// Container summary for diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostics {
    /// First container still open (the primary resource container)
    pub resource_source: Option<SourceId>,
    /// First container whose header declares the base role
    pub base_source: Option<SourceId>,
    /// Threshold remembered by [`ResourceDirectory::seal_base`]
    pub base_threshold: Option<SourceId>,
    /// Every open container in load order
    pub containers: Vec<ContainerInfo>,
}

/// Ordered, namespaced collection of records from many containers
///
/// Single-threaded: every operation runs to completion on the caller's
/// thread.
#[derive(Debug)]
pub struct ResourceDirectory {
    config: DirectoryConfig,
    containers: BTreeMap<SourceId, Container>,
    records: Vec<Record>,
    runs: [Vec<u32>; Namespace::COUNT],
    short_names: HashMap<(Namespace, LumpName), u32>,
    paths: HashMap<String, u32>,
    cached: HashMap<u32, BufferId>,
    arena: EpochArena,
    next_source: u32,
    base_threshold: Option<SourceId>,
    backing_reads: Cell<u64>,
    read_errors: Cell<u64>,
    cache_hits: u64,
    cache_misses: u64,
}

impl Default for ResourceDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceDirectory {
    /// Create an empty directory with the default configuration
    pub fn new() -> Self {
        Self::build(DirectoryConfig::default(), EpochArena::new())
    }

    /// Create an empty directory with `config`
    pub fn with_config(config: DirectoryConfig) -> Result<Self> {
        config.validate()?;
        let arena = EpochArena::with_config(config.arena_config())?;
        Ok(Self::build(config, arena))
    }

    fn build(config: DirectoryConfig, arena: EpochArena) -> Self {
        Self {
            config,
            containers: BTreeMap::new(),
            records: Vec::new(),
            runs: std::array::from_fn(|_| Vec::new()),
            short_names: HashMap::new(),
            paths: HashMap::new(),
            cached: HashMap::new(),
            arena,
            next_source: 0,
            base_threshold: None,
            backing_reads: Cell::new(0),
            read_errors: Cell::new(0),
            cache_hits: 0,
            cache_misses: 0,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    // ----- adding containers -----

    fn with_extensions<'a>(&'a self, base: &'a Path) -> impl Iterator<Item = PathBuf> + 'a {
        std::iter::once(base.to_path_buf()).chain(self.config.default_extensions.iter().map(
            move |ext| {
                let mut name = base.as_os_str().to_os_string();
                name.push(ext);
                PathBuf::from(name)
            },
        ))
    }

    /// Resolve a container path, trying extensions and search paths when
    /// `allow_inexact` is set
    fn resolve_path(&self, path: &Path, allow_inexact: bool) -> Option<PathBuf> {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        if !allow_inexact {
            return None;
        }

        let mut bases = vec![path.to_path_buf()];
        if path.is_relative() {
            bases.extend(self.config.search_paths.iter().map(|dir| dir.join(path)));
        }
        bases
            .iter()
            .find_map(|base| self.with_extensions(base).find(|candidate| candidate.exists()))
    }

    /// Open, classify, parse and merge a container from disk
    ///
    /// A directory is added as a loose-directory container. Anything else is
    /// sniffed: WAD and zip archives are parsed, other files become a single
    /// record named after the file. On error nothing is merged.
    ///
    /// WADs embedded in a zip and WADs inside a loose directory are added as
    /// their own containers right after this one. Only real WAD images are
    /// accepted there; anything else is logged and skipped without undoing
    /// the parent.
    pub fn add_container<P: AsRef<Path>>(
        &mut self,
        path: P,
        options: &AddOptions,
    ) -> Result<SourceId> {
        let requested = path.as_ref();
        let resolved = self
            .resolve_path(requested, options.allow_inexact)
            .ok_or_else(|| DirectoryError::OpenFailed {
                path: requested.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such file or directory"),
            })?;
        let label = resolved.display().to_string();
        let source = SourceId(self.next_source);

        if resolved.is_dir() {
            if let Some(expected) = options.required_format {
                return Err(DirectoryError::FormatUnrecognized {
                    path: resolved,
                    expected,
                    found: ContainerFormat::File,
                });
            }
            let loaded = loader::loose_directory(&resolved, &self.config);
            return Ok(self.commit(source, label, loaded));
        }

        let file = File::open(&resolved).map_err(|e| DirectoryError::OpenFailed {
            path: resolved.clone(),
            source: e,
        })?;
        let format = sniff::classify(&mut &file);
        if let Some(expected) = options.required_format
            && expected != format
        {
            return Err(DirectoryError::FormatUnrecognized {
                path: resolved,
                expected,
                found: format,
            });
        }
        debug!("{} sniffed as {}", label, format);

        let loaded = match format {
            ContainerFormat::Wad => loader::wad_file(source, file),
            ContainerFormat::Zip => loader::zip_archive(
                source,
                &label,
                ContainerKind::Zip,
                ContainerData::File(file),
                &self.config,
            ),
            ContainerFormat::File => loader::bare_file(
                source,
                &resolved,
                file,
                options.namespace.unwrap_or(Namespace::Global),
            ),
        }
        .map_err(|reason| DirectoryError::ParseFailed {
            container: label.clone(),
            reason,
        })?;

        Ok(self.commit(source, label, loaded))
    }

    /// Merge a container held in memory
    ///
    /// WAD and zip images are parsed; any other buffer becomes one record
    /// named after `name`.
    pub fn add_memory(
        &mut self,
        name: &str,
        data: impl Into<Bytes>,
        options: &AddOptions,
    ) -> Result<SourceId> {
        let bytes = data.into();
        let format = sniff::classify_bytes(&bytes);
        if let Some(expected) = options.required_format
            && expected != format
        {
            return Err(DirectoryError::FormatUnrecognized {
                path: PathBuf::from(name),
                expected,
                found: format,
            });
        }

        let source = SourceId(self.next_source);
        let loaded = match format {
            ContainerFormat::Wad => loader::wad_memory(bytes),
            ContainerFormat::Zip => loader::zip_archive(
                source,
                name,
                ContainerKind::Memory,
                ContainerData::Memory(bytes),
                &self.config,
            ),
            ContainerFormat::File => Ok(loader::bare_memory(
                name,
                bytes,
                options.namespace.unwrap_or(Namespace::Global),
            )),
        }
        .map_err(|reason| DirectoryError::ParseFailed {
            container: name.to_string(),
            reason,
        })?;

        Ok(self.commit(source, name.to_string(), loaded))
    }

    /// Append a parsed container's records and index them
    fn commit(&mut self, source: SourceId, name: String, mut loaded: Loaded) -> SourceId {
        let embedded = std::mem::take(&mut loaded.embedded);
        let nested = std::mem::take(&mut loaded.nested);

        let first = self.records.len();
        self.records
            .extend(loaded.seeds.into_iter().map(|seed| Record {
                name: seed.name,
                path: seed.path,
                size: seed.size,
                namespace: seed.namespace,
                source,
                backing: seed.backing,
            }));
        for index in first..self.records.len() {
            self.index_record(index as u32);
        }

        let record_count = self.records.len() - first;
        info!(
            "Added {} {} as {} with {} records",
            loaded.kind, name, source, record_count
        );
        self.containers.insert(
            source,
            Container {
                info: ContainerInfo {
                    source,
                    kind: loaded.kind,
                    name,
                    role: loaded.role,
                    record_count,
                },
                data: loaded.data,
            },
        );
        self.next_source += 1;

        let wad_only = AddOptions::new().require_format(ContainerFormat::Wad);
        for (name, image) in embedded {
            if let Err(e) = self.add_memory(&name, image, &wad_only) {
                warn!("Skipping embedded archive {}: {}", name, e);
            }
        }
        for path in nested {
            if let Err(e) = self.add_container(&path, &wad_only) {
                warn!("Skipping nested archive {}: {}", path.display(), e);
            }
        }

        source
    }

    fn index_record(&mut self, index: u32) {
        let record = &self.records[index as usize];
        self.runs[record.namespace.index()].push(index);
        if record.namespace.is_indexed() && !record.name.is_empty() {
            self.short_names
                .insert((record.namespace, record.name), index);
        }
        if let Some(path) = &record.path {
            self.paths.insert(path.clone(), index);
        }
        trace!(
            "Indexed {} in {} as #{}",
            record.display_name(),
            record.namespace,
            index
        );
    }

    fn rebuild_indices(&mut self) {
        for run in &mut self.runs {
            run.clear();
        }
        self.short_names.clear();
        self.paths.clear();
        for index in 0..self.records.len() {
            self.index_record(index as u32);
        }
    }

    // ----- lookup -----

    fn handle_at(&self, index: u32) -> RecordHandle {
        RecordHandle {
            index,
            source: self.records[index as usize].source,
        }
    }

    fn lookup_in(&self, name: LumpName, namespace: Namespace) -> Option<RecordHandle> {
        self.short_names
            .get(&(namespace, name))
            .map(|&index| self.handle_at(index))
    }

    /// Find the winning record for a short name
    ///
    /// With a namespace filter only that namespace is searched. Without one,
    /// specialised namespaces are searched first and global last, so a
    /// specialised record shadows a global one of the same name.
    pub fn lookup(&self, name: &str, namespace: Option<Namespace>) -> Option<RecordHandle> {
        let name = LumpName::new(name);
        match namespace {
            Some(ns) => self.lookup_in(name, ns),
            None => Namespace::LOOKUP_ORDER
                .iter()
                .find_map(|&ns| self.lookup_in(name, ns)),
        }
    }

    /// Search `namespace` and global together
    ///
    /// When both have a match the one from the later container wins; on a tie
    /// the namespaced record wins.
    pub fn lookup_ns_or_global(&self, name: &str, namespace: Namespace) -> Option<RecordHandle> {
        let name = LumpName::new(name);
        match (
            self.lookup_in(name, namespace),
            self.lookup_in(name, Namespace::Global),
        ) {
            (Some(local), Some(global)) => Some(if local.source >= global.source {
                local
            } else {
                global
            }),
            (local, global) => local.or(global),
        }
    }

    /// Find the winning record for a full container path
    pub fn lookup_path(&self, path: &str, namespace: Option<Namespace>) -> Option<RecordHandle> {
        let key = path.replace('\\', "/").to_lowercase();
        self.paths
            .get(&key)
            .map(|&index| self.handle_at(index))
            .filter(|handle| {
                namespace.is_none_or(|ns| self.records[handle.index()].namespace == ns)
            })
    }

    /// [`lookup`](Self::lookup) that treats a miss as an error
    pub fn get_num_for_name(
        &self,
        name: &str,
        namespace: Option<Namespace>,
    ) -> Result<RecordHandle> {
        self.lookup(name, namespace)
            .ok_or_else(|| DirectoryError::NotFound {
                name: name.to_string(),
                namespace,
            })
    }

    /// Record metadata for a handle
    pub fn record(&self, handle: RecordHandle) -> Result<&Record> {
        self.records
            .get(handle.index())
            .filter(|record| record.source == handle.source)
            .ok_or(DirectoryError::InvalidHandle(handle))
    }

    /// Logical size of a record
    pub fn length(&self, handle: RecordHandle) -> Result<usize> {
        self.record(handle).map(Record::size)
    }

    fn is_winner(&self, index: u32) -> bool {
        let record = &self.records[index as usize];
        if record.namespace.is_indexed() && !record.name.is_empty() {
            self.short_names.get(&(record.namespace, record.name)) == Some(&index)
        } else if let Some(path) = &record.path {
            self.paths.get(path) == Some(&index)
        } else {
            true
        }
    }

    /// Non-shadowed records of `namespace`, in load order
    ///
    /// Each call starts a fresh iteration.
    pub fn enumerate(&self, namespace: Namespace) -> impl Iterator<Item = RecordHandle> + '_ {
        self.runs[namespace.index()]
            .iter()
            .copied()
            .filter(|&index| self.is_winner(index))
            .map(|index| self.handle_at(index))
    }

    /// Every record, shadowed ones included, in load order
    pub fn iter(&self) -> impl Iterator<Item = (RecordHandle, &Record)> + '_ {
        self.records
            .iter()
            .enumerate()
            .map(|(index, record)| (self.handle_at(index as u32), record))
    }

    /// Whether a record currently wins lookups for its name or path
    pub fn is_shadowed(&self, handle: RecordHandle) -> Result<bool> {
        self.record(handle)?;
        Ok(!self.is_winner(handle.index))
    }

    /// Number of records, shadowed ones included
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the directory holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // ----- reading -----

    fn dispatch(&self, record: &Record, dest: &mut [u8]) -> Result<()> {
        self.backing_reads.set(self.backing_reads.get() + 1);
        record
            .backing
            .read_into(&self.containers, self.config.verify_zip_crc, dest)
            .map_err(|e| {
                self.read_errors.set(self.read_errors.get() + 1);
                let name = record.display_name();
                match e {
                    BackingError::Io(source) => DirectoryError::ReadFailed {
                        record: name,
                        source,
                    },
                    other @ BackingError::ContainerClosed(_) => DirectoryError::ReadFailed {
                        record: name,
                        source: io::Error::other(other.to_string()),
                    },
                    other => DirectoryError::DecodeFailed {
                        record: name,
                        reason: other.to_string(),
                    },
                }
            })
    }

    /// Read a record into `dest`, bypassing the cache
    ///
    /// `dest` must be exactly [`length`](Self::length) bytes.
    pub fn read_into(&self, handle: RecordHandle, dest: &mut [u8]) -> Result<()> {
        let record = self.record(handle)?;
        if dest.len() != record.size {
            return Err(DirectoryError::BufferSize {
                expected: record.size,
                actual: dest.len(),
            });
        }
        self.dispatch(record, dest)
    }

    /// Read a record into a new buffer, bypassing the cache
    pub fn read_vec(&self, handle: RecordHandle) -> Result<Vec<u8>> {
        let record = self.record(handle)?;
        let mut data = vec![0u8; record.size];
        self.dispatch(record, &mut data)?;
        Ok(data)
    }

    /// Cache a record under `epoch` and return the buffer handle
    ///
    /// A resident buffer is returned without I/O. If `epoch` outlives the
    /// buffer's current epoch the buffer is promoted; it is never demoted.
    pub fn cache_buffer(&mut self, handle: RecordHandle, epoch: Epoch) -> Result<BufferId> {
        self.record(handle)?;

        if let Some(&id) = self.cached.get(&handle.index) {
            if self.arena.contains(id) {
                self.arena.promote(id, epoch)?;
                self.cache_hits += 1;
                return Ok(id);
            }
            self.cached.remove(&handle.index);
        }

        let record = &self.records[handle.index()];
        let mut data = vec![0u8; record.size];
        self.dispatch(record, &mut data)?;
        debug!("Cached {} under {} epoch", record.display_name(), epoch);

        let id = self.arena.insert(epoch, data);
        self.cached.insert(handle.index, id);
        self.cache_misses += 1;
        Ok(id)
    }

    /// Cache a record under `epoch` and return its bytes
    pub fn cache(&mut self, handle: RecordHandle, epoch: Epoch) -> Result<&[u8]> {
        let id = self.cache_buffer(handle, epoch)?;
        Ok(self.arena.get(id)?)
    }

    /// Bytes of a cached buffer; fails once its epoch has been reclaimed
    pub fn buffer(&self, id: BufferId) -> Result<&[u8]> {
        Ok(self.arena.get(id)?)
    }

    /// Drop a record's cached buffer, returning whether one was resident
    pub fn evict(&mut self, handle: RecordHandle) -> Result<bool> {
        self.record(handle)?;
        Ok(self
            .cached
            .remove(&handle.index)
            .is_some_and(|id| self.arena.free(id).is_ok()))
    }

    /// Free every cached buffer tagged with `epoch`
    ///
    /// `Permanent` buffers are kept; they go away with [`clear`](Self::clear)
    /// or when the directory is dropped.
    pub fn reclaim(&mut self, epoch: Epoch) -> usize {
        let freed = self.arena.reclaim(epoch);
        let arena = &self.arena;
        self.cached.retain(|_, id| arena.contains(*id));
        freed
    }

    /// Free every cached buffer in every epoch
    pub fn reclaim_all(&mut self) -> usize {
        self.cached.clear();
        self.arena.reclaim_all()
    }

    /// CRC-32 of a record's bytes
    pub fn checksum(&self, handle: RecordHandle) -> Result<u32> {
        Ok(crc32fast::hash(&self.read_vec(handle)?))
    }

    /// Write a record's bytes to a file
    pub fn extract_to<P: AsRef<Path>>(&self, handle: RecordHandle, path: P) -> Result<()> {
        let data = self.read_vec(handle)?;
        std::fs::write(path.as_ref(), data)?;
        debug!(
            "Extracted {} to {}",
            self.record(handle)?.display_name(),
            path.as_ref().display()
        );
        Ok(())
    }

    // ----- lifecycle -----

    /// Close every container added after `drop_above` and rebuild
    ///
    /// Records from the closed containers are removed along with their cached
    /// buffers; their handles report `InvalidHandle` from now on. Handles of
    /// kept records stay valid.
    pub fn reset(&mut self, drop_above: SourceId) {
        let keep = self.records.partition_point(|r| r.source <= drop_above);
        let dropped = self.records.len() - keep;

        for index in keep..self.records.len() {
            if let Some(id) = self.cached.remove(&(index as u32)) {
                self.arena.free(id).ok();
            }
        }
        self.records.truncate(keep);

        let closed = drop_above
            .0
            .checked_add(1)
            .map(|first| self.containers.split_off(&SourceId(first)))
            .unwrap_or_default();

        if self.base_threshold.is_some_and(|base| base > drop_above) {
            self.base_threshold = None;
        }
        self.rebuild_indices();
        info!(
            "Reset above {}: closed {} containers, dropped {} records",
            drop_above,
            closed.len(),
            dropped
        );
    }

    /// Close every container and free every cached buffer
    pub fn clear(&mut self) {
        let closed = self.containers.len();
        self.containers.clear();
        self.records.clear();
        self.reclaim_all();
        self.base_threshold = None;
        self.rebuild_indices();
        info!("Cleared directory: closed {} containers", closed);
    }

    /// Remember the current containers as the base set
    pub fn seal_base(&mut self) -> Option<SourceId> {
        self.base_threshold = self.containers.keys().next_back().copied();
        self.base_threshold
    }

    /// Close everything added since [`seal_base`](Self::seal_base)
    ///
    /// Without a sealed base every container is closed.
    pub fn reset_to_base(&mut self) {
        match self.base_threshold {
            Some(base) => self.reset(base),
            None => self.clear(),
        }
    }

    // ----- diagnostics -----

    /// Open containers in load order
    pub fn containers(&self) -> impl Iterator<Item = &ContainerInfo> + '_ {
        self.containers.values().map(|c| &c.info)
    }

    /// Description of one container
    pub fn container_info(&self, source: SourceId) -> Option<&ContainerInfo> {
        self.containers.get(&source).map(|c| &c.info)
    }

    /// Container summary
    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            resource_source: self.containers.keys().next().copied(),
            base_source: self
                .containers()
                .find(|info| info.role == Some(ContainerRole::Base))
                .map(|info| info.source),
            base_threshold: self.base_threshold,
            containers: self.containers().cloned().collect(),
        }
    }

    /// Statistics snapshot
    pub fn stats(&self) -> DirectoryStats {
        DirectoryStats {
            container_count: self.containers.len(),
            record_count: self.records.len(),
            backing_reads: self.backing_reads.get(),
            cache_hits: self.cache_hits,
            cache_misses: self.cache_misses,
            read_errors: self.read_errors.get(),
            arena: self.arena.stats(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_add_options_builders() {
        let options = AddOptions::new()
            .with_namespace(Namespace::Sounds)
            .require_format(ContainerFormat::File)
            .inexact();
        assert_eq!(options.namespace, Some(Namespace::Sounds));
        assert_eq!(options.required_format, Some(ContainerFormat::File));
        assert!(options.allow_inexact);
        assert_eq!(AddOptions::default(), AddOptions::new());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = DirectoryConfig {
            max_discardable_bytes: Some(0),
            ..DirectoryConfig::default()
        };
        assert!(ResourceDirectory::with_config(config).is_err());
    }

    #[test]
    fn test_unknown_handle() {
        let mut directory = ResourceDirectory::new();
        let handle = RecordHandle {
            index: 3,
            source: SourceId(0),
        };
        assert!(matches!(
            directory.length(handle),
            Err(DirectoryError::InvalidHandle(_))
        ));
        assert!(directory.cache(handle, Epoch::Level).is_err());
        assert_eq!(directory.stats().backing_reads, 0);
    }

    #[test]
    fn test_memory_blob_is_single_record() {
        let mut directory = ResourceDirectory::new();
        let source = directory
            .add_memory("notes/DEHACKED.deh", &b"Patch File"[..], &AddOptions::default())
            .unwrap();
        assert_eq!(directory.len(), 1);
        let handle = directory.lookup("DEHACKED", None).unwrap();
        assert_eq!(handle.source(), source);
        assert_eq!(directory.read_vec(handle).unwrap(), b"Patch File");
    }

    #[test]
    fn test_reset_below_everything_keeps_first() {
        let mut directory = ResourceDirectory::new();
        for name in ["a", "b", "c"] {
            directory
                .add_memory(name, name.as_bytes().to_vec(), &AddOptions::default())
                .unwrap();
        }
        directory.reset(SourceId(0));
        assert_eq!(directory.len(), 1);
        assert!(directory.lookup("A", None).is_some());
        assert!(directory.lookup("B", None).is_none());
        assert_eq!(directory.stats().container_count, 1);
    }
}
