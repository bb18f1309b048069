//! Read-only view of a ward, shared by encoders, renderers, and hashers.

use crate::id::{PatientId, ResourceId, ResourceKind, TickId};
use crate::patient::{Patient, PatientStatus};

/// Read-only access to the state of a ward.
///
/// Observers (observation encoders, reward models, renderers, replay
/// hashers) read through `&dyn WardSnapshot` and never mutate the
/// simulation. All mutation flows through the tick driver.
pub trait WardSnapshot {
    /// The current tick counter.
    fn tick_id(&self) -> TickId;

    /// Every patient that has ever arrived, in ascending id order.
    ///
    /// Cured and lost patients stay in the list for scoring.
    fn patients(&self) -> &[Patient];

    /// Fixed size of the pool for `kind`.
    fn capacity(&self, kind: ResourceKind) -> u32;

    /// Number of unreserved slots in the pool for `kind`.
    fn free(&self, kind: ResourceKind) -> u32;

    /// Cumulative count of cured patients.
    fn patients_saved(&self) -> u64;

    /// Cumulative count of lost patients.
    fn patients_lost(&self) -> u64;

    /// Number of reserved slots in the pool for `kind`.
    fn in_use(&self, kind: ResourceKind) -> u32 {
        self.capacity(kind).saturating_sub(self.free(kind))
    }

    /// Look up a patient by id.
    fn patient(&self, id: PatientId) -> Option<&Patient> {
        let patients = self.patients();
        patients
            .binary_search_by_key(&id, |p| p.id)
            .ok()
            .map(|i| &patients[i])
    }

    /// The patient holding slot `slot` of `kind`, if it is reserved.
    ///
    /// The default scans patient back-references; implementations that
    /// own the pools answer from the pool directly.
    fn holder(&self, kind: ResourceKind, slot: ResourceId) -> Option<PatientId> {
        self.patients()
            .iter()
            .find(|p| p.holds(kind) == Some(slot))
            .map(|p| p.id)
    }

    /// Number of patients currently waiting.
    fn waiting_count(&self) -> usize {
        self.patients()
            .iter()
            .filter(|p| p.status == PatientStatus::Waiting)
            .count()
    }

    /// Number of non-terminal patients.
    fn active_count(&self) -> usize {
        self.patients().iter().filter(|p| !p.is_terminal()).count()
    }
}
