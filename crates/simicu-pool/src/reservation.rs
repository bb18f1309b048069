//! All-or-nothing reservation guard.
//!
//! A [`Reservation`] reserves slots one kind at a time. If the guard is
//! dropped without [`Reservation::commit`], every slot it took is
//! released again, so a failed multi-resource admission never leaves a
//! partial reservation behind.

use smallvec::SmallVec;

use simicu_core::{PatientId, ResourceId, ResourceKind};

use crate::pools::ResourcePools;

/// Guard over an in-progress multi-resource reservation.
///
/// Created by [`ResourcePools::reservation`]. Holds the pools mutably, so
/// nothing else can observe the intermediate state.
#[must_use]
pub struct Reservation<'a> {
    pools: &'a mut ResourcePools,
    holder: PatientId,
    taken: SmallVec<[(ResourceKind, ResourceId); 3]>,
}

impl<'a> Reservation<'a> {
    pub(crate) fn new(pools: &'a mut ResourcePools, holder: PatientId) -> Self {
        Self {
            pools,
            holder,
            taken: SmallVec::new(),
        }
    }

    /// Reserve the lowest free slot of `kind`.
    ///
    /// Returns `None` if the pool is exhausted; earlier takes stay pending
    /// until the guard is committed or dropped.
    pub fn take(&mut self, kind: ResourceKind) -> Option<ResourceId> {
        let id = self.pools.pool(kind).find_available()?;
        self.pools.pool_mut(kind).reserve(id, self.holder).ok()?;
        self.taken.push((kind, id));
        Some(id)
    }

    /// Cached free count for `kind`, reflecting pending takes.
    pub fn free(&self, kind: ResourceKind) -> u32 {
        self.pools.free(kind)
    }

    /// Slots taken so far, in take order.
    pub fn taken(&self) -> &[(ResourceKind, ResourceId)] {
        &self.taken
    }

    /// Keep every slot taken and return them.
    pub fn commit(mut self) -> SmallVec<[(ResourceKind, ResourceId); 3]> {
        std::mem::take(&mut self.taken)
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        for (kind, id) in self.taken.drain(..).rev() {
            // Only slots this guard reserved are in `taken`.
            let _ = self.pools.pool_mut(kind).release(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_keeps_slots() {
        let mut pools = ResourcePools::new(1, 1, 0);
        let mut r = pools.reservation(PatientId(4));
        assert_eq!(r.take(ResourceKind::Bed), Some(ResourceId(0)));
        assert_eq!(r.take(ResourceKind::Nurse), Some(ResourceId(0)));
        let kept = r.commit();
        assert_eq!(kept.len(), 2);
        assert_eq!(pools.free(ResourceKind::Bed), 0);
        assert_eq!(
            pools.pool(ResourceKind::Nurse).holder(ResourceId(0)),
            Some(PatientId(4))
        );
    }

    #[test]
    fn drop_rolls_back_partial_reservation() {
        let mut pools = ResourcePools::new(0, 2, 1);
        {
            let mut r = pools.reservation(PatientId(1));
            assert!(r.take(ResourceKind::Bed).is_some());
            assert_eq!(r.free(ResourceKind::Bed), 1);
            assert!(r.take(ResourceKind::Nurse).is_none());
        }
        assert_eq!(pools.free(ResourceKind::Bed), 2);
        assert_eq!(pools.pool(ResourceKind::Bed).recount(), 2);
    }

    #[test]
    fn take_from_exhausted_pool_records_nothing() {
        let mut pools = ResourcePools::new(1, 1, 0);
        let mut r = pools.reservation(PatientId(0));
        assert!(r.take(ResourceKind::Ventilator).is_none());
        assert!(r.taken().is_empty());
    }

    #[test]
    fn consecutive_takes_use_distinct_slots() {
        let mut pools = ResourcePools::new(3, 0, 0);
        let mut r = pools.reservation(PatientId(0));
        let a = r.take(ResourceKind::Nurse);
        let b = r.take(ResourceKind::Nurse);
        assert_eq!(a, Some(ResourceId(0)));
        assert_eq!(b, Some(ResourceId(1)));
        drop(r);
        assert_eq!(pools.free(ResourceKind::Nurse), 3);
    }
}
