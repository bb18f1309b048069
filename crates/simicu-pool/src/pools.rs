//! The three pools of a ward, addressed by [`ResourceKind`].

use smallvec::SmallVec;

use simicu_core::{Patient, PatientId, ResourceId, ResourceKind};

use crate::error::PoolError;
use crate::pool::ResourcePool;
use crate::reservation::Reservation;

/// Nurse, bed, and ventilator pools of one ward.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourcePools {
    pools: [ResourcePool; 3],
}

impl ResourcePools {
    /// Create pools of the given sizes, all free.
    pub fn new(nurses: u32, beds: u32, ventilators: u32) -> Self {
        Self {
            pools: [
                ResourcePool::new(ResourceKind::Nurse, nurses),
                ResourcePool::new(ResourceKind::Bed, beds),
                ResourcePool::new(ResourceKind::Ventilator, ventilators),
            ],
        }
    }

    /// The pool for `kind`.
    pub fn pool(&self, kind: ResourceKind) -> &ResourcePool {
        &self.pools[kind.index()]
    }

    /// Mutable access to the pool for `kind`.
    pub fn pool_mut(&mut self, kind: ResourceKind) -> &mut ResourcePool {
        &mut self.pools[kind.index()]
    }

    /// Cached free count for `kind`.
    pub fn free(&self, kind: ResourceKind) -> u32 {
        self.pool(kind).free()
    }

    /// Size of the pool for `kind`.
    pub fn capacity(&self, kind: ResourceKind) -> u32 {
        self.pool(kind).capacity()
    }

    /// Begin an all-or-nothing reservation on behalf of `holder`.
    pub fn reservation(&mut self, holder: PatientId) -> Reservation<'_> {
        Reservation::new(self, holder)
    }

    /// Return every resource `patient` holds to its pool and clear the
    /// patient's back-references.
    ///
    /// Returns exactly the resources released, which is the subset the
    /// patient held.
    pub fn release_held(
        &mut self,
        patient: &mut Patient,
    ) -> Result<SmallVec<[(ResourceKind, ResourceId); 3]>, PoolError> {
        let held = patient.held();
        for &(kind, id) in &held {
            let holder = self.pool_mut(kind).release(id)?;
            if holder != patient.id {
                return Err(PoolError::Inconsistent {
                    kind,
                    reason: format!(
                        "slot {id} was held by patient {holder}, not patient {}",
                        patient.id
                    ),
                });
            }
            *patient.slot_mut(kind) = None;
        }
        Ok(held)
    }

    /// Free every slot in every pool.
    pub fn reset(&mut self) {
        self.pools.iter_mut().for_each(ResourcePool::reset);
    }

    /// Check that free counts match a scan and that pool holders and
    /// patient back-references agree in both directions.
    ///
    /// `patients` must be sorted by id.
    pub fn verify(&self, patients: &[Patient]) -> Result<(), PoolError> {
        for pool in &self.pools {
            let kind = pool.kind();
            let scanned = pool.recount();
            if scanned != pool.free() {
                return Err(PoolError::Inconsistent {
                    kind,
                    reason: format!("cached free {} != scanned free {scanned}", pool.free()),
                });
            }
            for (slot, holder) in pool.iter() {
                let Some(holder) = holder else { continue };
                let back_ref = patients
                    .binary_search_by_key(&holder, |p| p.id)
                    .ok()
                    .and_then(|i| patients[i].holds(kind));
                if back_ref != Some(slot) {
                    return Err(PoolError::Inconsistent {
                        kind,
                        reason: format!(
                            "slot {slot} held by patient {holder} without a matching back-reference"
                        ),
                    });
                }
            }
            for p in patients {
                if let Some(slot) = p.holds(kind) {
                    if pool.holder(slot) != Some(p.id) {
                        return Err(PoolError::Inconsistent {
                            kind,
                            reason: format!("patient {} references slot {slot} it does not hold", p.id),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simicu_core::PatientStatus;

    fn admitted(id: u64, pools: &mut ResourcePools) -> Patient {
        let mut p = Patient::new(PatientId(id), 50.0, None);
        let mut r = pools.reservation(p.id);
        p.nurse = r.take(ResourceKind::Nurse);
        p.bed = r.take(ResourceKind::Bed);
        r.commit();
        p.status = PatientStatus::InBed;
        p
    }

    #[test]
    fn release_held_frees_exactly_the_held_subset() {
        let mut pools = ResourcePools::new(2, 2, 1);
        let mut p = admitted(0, &mut pools);
        assert_eq!(pools.free(ResourceKind::Bed), 1);
        assert_eq!(pools.free(ResourceKind::Nurse), 1);

        let released = pools.release_held(&mut p).unwrap();
        assert_eq!(released.len(), 2);
        assert!(p.held().is_empty());
        assert_eq!(pools.free(ResourceKind::Bed), 2);
        assert_eq!(pools.free(ResourceKind::Nurse), 2);
        assert_eq!(pools.free(ResourceKind::Ventilator), 1);
    }

    #[test]
    fn release_held_on_empty_patient_is_noop() {
        let mut pools = ResourcePools::new(1, 1, 1);
        let mut p = Patient::new(PatientId(3), 10.0, None);
        assert!(pools.release_held(&mut p).unwrap().is_empty());
        assert_eq!(pools.free(ResourceKind::Nurse), 1);
    }

    #[test]
    fn verify_accepts_consistent_state() {
        let mut pools = ResourcePools::new(3, 3, 1);
        let a = admitted(0, &mut pools);
        let b = admitted(1, &mut pools);
        assert_eq!(pools.verify(&[a, b]), Ok(()));
    }

    #[test]
    fn verify_detects_dangling_back_reference() {
        let mut pools = ResourcePools::new(3, 3, 1);
        let mut a = admitted(0, &mut pools);
        a.ventilator = Some(ResourceId(0));
        assert!(matches!(
            pools.verify(&[a]),
            Err(PoolError::Inconsistent {
                kind: ResourceKind::Ventilator,
                ..
            })
        ));
    }

    #[test]
    fn verify_detects_orphaned_slot() {
        let mut pools = ResourcePools::new(3, 3, 1);
        pools
            .pool_mut(ResourceKind::Bed)
            .reserve(ResourceId(2), PatientId(8))
            .unwrap();
        assert!(pools.verify(&[]).is_err());
    }

    #[test]
    fn reset_frees_all_pools() {
        let mut pools = ResourcePools::new(2, 2, 2);
        let _ = admitted(0, &mut pools);
        pools.reset();
        for kind in ResourceKind::ALL {
            assert_eq!(pools.free(kind), pools.capacity(kind));
        }
    }
}
