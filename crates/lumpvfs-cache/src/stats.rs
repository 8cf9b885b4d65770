//! Arena statistics

#![allow(clippy::cast_precision_loss)]

use crate::epoch::Epoch;

/// Point-in-time arena statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Buffers allocated
    pub allocation_count: u64,
    /// Buffers freed individually
    pub free_count: u64,
    /// Buffers freed by epoch reclaims
    pub reclaimed_count: u64,
    /// Discardable buffers evicted to meet the budget
    pub eviction_count: u64,
    /// Buffers moved to a longer-lived epoch
    pub promotion_count: u64,
    /// Resident buffers per epoch, indexed by [`Epoch::index`]
    pub resident_buffers: [usize; 4],
    /// Resident bytes per epoch, indexed by [`Epoch::index`]
    pub resident_bytes: [usize; 4],
}

impl ArenaStats {
    /// Resident buffers in one epoch
    pub fn buffers_in(&self, epoch: Epoch) -> usize {
        self.resident_buffers[epoch.index()]
    }

    /// Resident bytes in one epoch
    pub fn bytes_in(&self, epoch: Epoch) -> usize {
        self.resident_bytes[epoch.index()]
    }

    /// Resident buffers across all epochs
    pub fn total_buffers(&self) -> usize {
        self.resident_buffers.iter().sum()
    }

    /// Resident bytes across all epochs
    pub fn total_bytes(&self) -> usize {
        self.resident_bytes.iter().sum()
    }

    /// Fraction of allocations that were later evicted
    pub fn eviction_rate(&self) -> f64 {
        if self.allocation_count == 0 {
            0.0
        } else {
            self.eviction_count as f64 / self.allocation_count as f64
        }
    }

    pub(crate) fn add_resident(&mut self, epoch: Epoch, bytes: usize) {
        self.resident_buffers[epoch.index()] += 1;
        self.resident_bytes[epoch.index()] += bytes;
    }

    pub(crate) fn remove_resident(&mut self, epoch: Epoch, bytes: usize) {
        self.resident_buffers[epoch.index()] -= 1;
        self.resident_bytes[epoch.index()] -= bytes;
    }
}
