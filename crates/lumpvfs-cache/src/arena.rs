//! Generation-checked buffer arena
//!
//! Slots are reused after a buffer is freed, but each reuse bumps the slot
//! generation. A [`BufferId`] remembers the generation it was issued with, so
//! any lookup through an id whose buffer has since been freed fails with
//! [`CacheError::StaleBuffer`].

use crate::config::ArenaConfig;
use crate::epoch::Epoch;
use crate::error::{CacheError, Result};
use crate::stats::ArenaStats;
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, trace, warn};

/// Handle to a buffer in an [`EpochArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId {
    slot: u32,
    generation: u32,
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.slot, self.generation)
    }
}

#[derive(Debug)]
struct Resident {
    epoch: Epoch,
    data: Box<[u8]>,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    resident: Option<Resident>,
}

/// Arena of byte buffers grouped by [`Epoch`]
#[derive(Debug, Default)]
pub struct EpochArena {
    slots: Vec<Slot>,
    free_slots: Vec<u32>,
    discard_queue: VecDeque<BufferId>,
    config: ArenaConfig,
    stats: ArenaStats,
}

impl EpochArena {
    /// Create an arena with no discardable budget
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an arena with the given configuration
    pub fn with_config(config: ArenaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Allocate a zero-filled buffer of `size` bytes
    pub fn allocate(&mut self, epoch: Epoch, size: usize) -> BufferId {
        self.insert(epoch, vec![0u8; size])
    }

    /// Take ownership of `data` as a new buffer
    pub fn insert(&mut self, epoch: Epoch, data: Vec<u8>) -> BufferId {
        let len = data.len();
        let resident = Resident {
            epoch,
            data: data.into_boxed_slice(),
        };

        let id = if let Some(slot) = self.free_slots.pop() {
            let entry = &mut self.slots[slot as usize];
            entry.resident = Some(resident);
            BufferId {
                slot,
                generation: entry.generation,
            }
        } else {
            let slot = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                resident: Some(resident),
            });
            BufferId {
                slot,
                generation: 0,
            }
        };

        self.stats.allocation_count += 1;
        self.stats.add_resident(epoch, len);
        trace!("Allocated buffer {} ({} bytes, {})", id, len, epoch);

        if epoch == Epoch::Discardable && self.config.max_discardable_bytes.is_some() {
            self.discard_queue.push_back(id);
            self.enforce_budget(id);
        }
        id
    }

    /// Drop `id` from the eviction queue
    fn unqueue(&mut self, id: BufferId) {
        if let Some(position) = self.discard_queue.iter().position(|&queued| queued == id) {
            self.discard_queue.remove(position);
        }
    }

    fn resident(&self, id: BufferId) -> Result<&Resident> {
        self.slots
            .get(id.slot as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.resident.as_ref())
            .ok_or(CacheError::StaleBuffer(id))
    }

    fn resident_mut(&mut self, id: BufferId) -> Result<&mut Resident> {
        self.slots
            .get_mut(id.slot as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.resident.as_mut())
            .ok_or(CacheError::StaleBuffer(id))
    }

    /// Whether `id` still refers to a live buffer
    pub fn contains(&self, id: BufferId) -> bool {
        self.resident(id).is_ok()
    }

    /// Read access to a live buffer
    pub fn get(&self, id: BufferId) -> Result<&[u8]> {
        self.resident(id).map(|r| &*r.data)
    }

    /// Write access to a live buffer, used to fill it after allocation
    pub fn get_mut(&mut self, id: BufferId) -> Result<&mut [u8]> {
        self.resident_mut(id).map(|r| &mut *r.data)
    }

    /// Epoch a live buffer is tagged with
    pub fn epoch_of(&self, id: BufferId) -> Result<Epoch> {
        self.resident(id).map(|r| r.epoch)
    }

    /// Move a buffer to `epoch` if that outlives its current epoch
    ///
    /// Never shortens a lifetime. Returns the epoch the buffer ends up in.
    pub fn promote(&mut self, id: BufferId, epoch: Epoch) -> Result<Epoch> {
        let resident = self.resident_mut(id)?;
        let current = resident.epoch;
        if !epoch.outlives(current) {
            return Ok(current);
        }
        resident.epoch = epoch;
        let len = resident.data.len();
        if current == Epoch::Discardable {
            self.unqueue(id);
        }

        self.stats.remove_resident(current, len);
        self.stats.add_resident(epoch, len);
        self.stats.promotion_count += 1;
        debug!("Promoted buffer {} from {} to {}", id, current, epoch);
        Ok(epoch)
    }

    fn release(&mut self, slot: u32) -> Option<Resident> {
        let entry = &mut self.slots[slot as usize];
        let resident = entry.resident.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free_slots.push(slot);
        self.stats
            .remove_resident(resident.epoch, resident.data.len());
        Some(resident)
    }

    /// Free one buffer, returning its size
    pub fn free(&mut self, id: BufferId) -> Result<usize> {
        if self.resident(id)?.epoch == Epoch::Discardable {
            self.unqueue(id);
        }
        let len = self.release(id.slot).map_or(0, |r| r.data.len());
        self.stats.free_count += 1;
        Ok(len)
    }

    /// Free every buffer tagged with `epoch`, returning how many were freed
    ///
    /// `Permanent` buffers are never released here; use [`reclaim_all`](Self::reclaim_all).
    pub fn reclaim(&mut self, epoch: Epoch) -> usize {
        if epoch == Epoch::Permanent {
            warn!("Refusing to reclaim permanent buffers");
            return 0;
        }

        let slots: Vec<u32> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.resident.as_ref().is_some_and(|r| r.epoch == epoch))
            .map(|(index, _)| index as u32)
            .collect();

        for &slot in &slots {
            self.release(slot);
        }
        if epoch == Epoch::Discardable {
            self.discard_queue.clear();
        }

        self.stats.reclaimed_count += slots.len() as u64;
        debug!("Reclaimed {} {} buffers", slots.len(), epoch);
        slots.len()
    }

    /// Free every buffer in every epoch
    pub fn reclaim_all(&mut self) -> usize {
        let mut total = 0;
        for slot in 0..self.slots.len() as u32 {
            if self.release(slot).is_some() {
                total += 1;
            }
        }
        self.discard_queue.clear();
        self.stats.reclaimed_count += total as u64;
        debug!("Reclaimed all {} buffers", total);
        total
    }

    /// Evict the oldest discardable buffers until the budget holds
    ///
    /// `newest` is never evicted, so a single oversized buffer stays usable
    /// until the next allocation.
    fn enforce_budget(&mut self, newest: BufferId) {
        let Some(budget) = self.config.max_discardable_bytes else {
            return;
        };

        while self.stats.bytes_in(Epoch::Discardable) > budget {
            let Some(oldest) = self.discard_queue.pop_front() else {
                break;
            };
            if oldest == newest {
                self.discard_queue.push_front(oldest);
                break;
            }
            if self.epoch_of(oldest) == Ok(Epoch::Discardable) {
                self.release(oldest.slot);
                self.stats.eviction_count += 1;
                trace!("Evicted discardable buffer {}", oldest);
            }
        }
    }

    /// Number of live buffers
    pub fn len(&self) -> usize {
        self.stats.total_buffers()
    }

    /// Whether the arena holds no live buffers
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Statistics snapshot
    pub fn stats(&self) -> ArenaStats {
        self.stats.clone()
    }

    /// Active configuration
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }
}
