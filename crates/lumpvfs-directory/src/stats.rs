//! Directory statistics

#![allow(clippy::cast_precision_loss)]

use lumpvfs_cache::ArenaStats;

/// Point-in-time directory statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryStats {
    /// Containers currently open
    pub container_count: usize,
    /// Records in the master list, shadowed ones included
    pub record_count: usize,
    /// Reads dispatched to a backing store
    pub backing_reads: u64,
    /// Cache requests served from a resident buffer
    pub cache_hits: u64,
    /// Cache requests that had to read the backing store
    pub cache_misses: u64,
    /// Backing reads that failed
    pub read_errors: u64,
    /// Buffer arena statistics
    pub arena: ArenaStats,
}

impl DirectoryStats {
    /// Fraction of cache requests served without I/O
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}
