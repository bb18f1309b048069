//! Test utilities and mock types for SimICU development.
//!
//! Provides [`MockWard`], a hand-built [`WardSnapshot`] whose counters
//! and pools can be set directly, and proptest strategies in
//! [`fixtures`] for driving engines with random decision sequences.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use simicu_core::{Patient, PatientId, PatientStatus, ResourceKind, TickId, WardSnapshot};

/// Mock implementation of [`WardSnapshot`].
///
/// Pool free counts are plain numbers, independent of which patients
/// claim to hold resources; tests set whatever combination they need.
pub struct MockWard {
    tick: TickId,
    patients: Vec<Patient>,
    capacity: [u32; 3],
    free: [u32; 3],
    saved: u64,
    lost: u64,
}

impl MockWard {
    /// An empty ward with all pools free.
    pub fn new(nurses: u32, beds: u32, ventilators: u32) -> Self {
        let capacity = [nurses, beds, ventilators];
        Self {
            tick: TickId(0),
            patients: Vec::new(),
            capacity,
            free: capacity,
            saved: 0,
            lost: 0,
        }
    }

    /// Append a patient with the next sequential id.
    pub fn add_patient(&mut self, condition: f64, status: PatientStatus) -> PatientId {
        let id = PatientId(self.patients.len() as u64);
        let mut p = Patient::new(id, condition, None);
        p.status = status;
        self.patients.push(p);
        id
    }

    /// Mutable access to a patient added with [`add_patient`](Self::add_patient).
    ///
    /// # Panics
    ///
    /// If `id` was not returned by this ward.
    pub fn patient_mut(&mut self, id: PatientId) -> &mut Patient {
        &mut self.patients[id.0 as usize]
    }

    pub fn set_free(&mut self, kind: ResourceKind, free: u32) {
        self.free[kind.index()] = free;
    }

    pub fn set_tick(&mut self, tick: TickId) {
        self.tick = tick;
    }

    pub fn set_counters(&mut self, saved: u64, lost: u64) {
        self.saved = saved;
        self.lost = lost;
    }
}

impl WardSnapshot for MockWard {
    fn tick_id(&self) -> TickId {
        self.tick
    }

    fn patients(&self) -> &[Patient] {
        &self.patients
    }

    fn capacity(&self, kind: ResourceKind) -> u32 {
        self.capacity[kind.index()]
    }

    fn free(&self, kind: ResourceKind) -> u32 {
        self.free[kind.index()]
    }

    fn patients_saved(&self) -> u64 {
        self.saved
    }

    fn patients_lost(&self) -> u64 {
        self.lost
    }
}
