//! Reusable proptest strategies and decision fixtures.
//!
//! - [`arb_action`] yields any of the three actions.
//! - [`arb_slot_action`] yields `(slot, action code)` pairs as an
//!   automated decision-maker would emit them, including out-of-range
//!   slots.
//! - [`arb_decision`] yields engine-level decisions against a bounded
//!   range of patient ids, including ids that never arrive.

use proptest::prelude::*;
use simicu_core::{Action, Decision, PatientId};

pub fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::AdmitBed),
        Just(Action::AdmitVentilator),
        Just(Action::NoOp),
    ]
}

/// Slots in `0..max_slots + 2` so that invalid slots are exercised.
pub fn arb_slot_action(max_slots: usize) -> impl Strategy<Value = (usize, u8)> {
    (0..max_slots + 2, 0u8..3)
}

pub fn arb_decision(max_patient_id: u64) -> impl Strategy<Value = Decision> {
    prop_oneof![
        1 => Just(Decision::idle()),
        4 => (0..=max_patient_id, arb_action()).prop_map(|(id, action)| Decision::new(PatientId(id), action)),
    ]
}

/// A fixed script alternating bed and ventilator admissions over the
/// first `n` patient ids, for deterministic replay tests.
pub fn admission_script(n: u64) -> Vec<Decision> {
    (0..n)
        .flat_map(|id| {
            [
                Decision::new(PatientId(id), Action::AdmitBed),
                Decision::new(PatientId(id), Action::AdmitVentilator),
                Decision::idle(),
            ]
        })
        .collect()
}
