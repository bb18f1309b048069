//! A single fixed-size pool of one resource kind.

use simicu_core::{PatientId, ResourceId, ResourceKind};

use crate::error::PoolError;

/// Fixed-size pool of interchangeable resources of one kind.
///
/// Each slot is either free or held by exactly one patient. The free
/// count is cached and updated by `reserve` / `release`, the only
/// mutators, so it always equals the number of unheld slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourcePool {
    kind: ResourceKind,
    slots: Vec<Option<PatientId>>,
    free: u32,
}

impl ResourcePool {
    /// Create a pool of `capacity` free slots.
    pub fn new(kind: ResourceKind, capacity: u32) -> Self {
        Self {
            kind,
            slots: vec![None; capacity as usize],
            free: capacity,
        }
    }

    /// The kind of resource this pool holds.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Total number of slots.
    pub fn capacity(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Cached number of free slots.
    pub fn free(&self) -> u32 {
        self.free
    }

    /// Number of held slots.
    pub fn in_use(&self) -> u32 {
        self.capacity() - self.free
    }

    /// The patient holding slot `id`, or `None` if it is free or out of range.
    pub fn holder(&self, id: ResourceId) -> Option<PatientId> {
        self.slots.get(id.0 as usize).copied().flatten()
    }

    /// Whether slot `id` exists and is free.
    pub fn is_available(&self, id: ResourceId) -> bool {
        matches!(self.slots.get(id.0 as usize), Some(None))
    }

    /// Lowest-index free slot.
    ///
    /// Ties always resolve to the lowest index so that allocation order is
    /// reproducible.
    pub fn find_available(&self) -> Option<ResourceId> {
        if self.free == 0 {
            return None;
        }
        self.slots
            .iter()
            .position(Option::is_none)
            .map(|i| ResourceId(i as u32))
    }

    /// Mark slot `id` as held by `holder`.
    pub fn reserve(&mut self, id: ResourceId, holder: PatientId) -> Result<(), PoolError> {
        let kind = self.kind;
        let capacity = self.capacity();
        let slot = self
            .slots
            .get_mut(id.0 as usize)
            .ok_or(PoolError::OutOfRange { kind, id, capacity })?;
        if let Some(current) = *slot {
            return Err(PoolError::AlreadyReserved {
                kind,
                id,
                holder: current,
            });
        }
        *slot = Some(holder);
        self.free -= 1;
        Ok(())
    }

    /// Free slot `id`, returning its former holder.
    pub fn release(&mut self, id: ResourceId) -> Result<PatientId, PoolError> {
        let kind = self.kind;
        let capacity = self.capacity();
        let slot = self
            .slots
            .get_mut(id.0 as usize)
            .ok_or(PoolError::OutOfRange { kind, id, capacity })?;
        let holder = slot.take().ok_or(PoolError::NotReserved { kind, id })?;
        self.free += 1;
        Ok(holder)
    }

    /// Free every slot.
    pub fn reset(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.free = self.capacity();
    }

    /// Count free slots by scanning, ignoring the cache.
    pub fn recount(&self) -> u32 {
        self.slots.iter().filter(|s| s.is_none()).count() as u32
    }

    /// Iterate over `(slot, holder)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceId, Option<PatientId>)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, h)| (ResourceId(i as u32), *h))
    }
}
