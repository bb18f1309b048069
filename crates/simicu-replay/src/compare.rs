//! Ward comparison and replay verification.
//!
//! Hash-first comparison (fast path) with a field-by-field fallback on
//! mismatch, plus a streaming replay-and-compare driver.

use simicu_core::{Decision, Patient, PatientId, ResourceKind, WardSnapshot};

use crate::error::ReplayError;
use crate::hash::ward_hash;
use crate::reader::ReplayReader;

/// A single field that differs between recorded and replayed wards.
///
/// Numeric fields are widened to `f64`; status and archetype appear as
/// their numeric codes.
#[derive(Clone, Debug, PartialEq)]
pub struct WardDivergence {
    /// The patient the field belongs to, or `None` for ward-level fields.
    pub patient: Option<PatientId>,
    /// Name of the diverging field.
    pub field: &'static str,
    /// Value in the recorded run.
    pub recorded: f64,
    /// Value in the replayed run.
    pub replayed: f64,
}

/// Report of all divergences found at a single tick.
#[derive(Clone, Debug)]
pub struct DivergenceReport {
    /// The tick at which divergence was detected.
    pub tick_id: u64,
    /// Field-level detail; empty when only hashes were available.
    pub divergences: Vec<WardDivergence>,
}

/// Compare a replayed ward against a recorded hash.
///
/// Returns `None` when the hashes match. On mismatch, if the recorded
/// ward itself is available, every ward-level and per-patient field is
/// compared to say exactly what diverged.
pub fn compare_wards(
    replayed: &dyn WardSnapshot,
    recorded_hash: u64,
    tick_id: u64,
    recorded: Option<&dyn WardSnapshot>,
) -> Option<DivergenceReport> {
    if ward_hash(replayed) == recorded_hash {
        return None;
    }

    let mut divergences = Vec::new();
    if let Some(recorded) = recorded {
        diff_wards(recorded, replayed, &mut divergences);
    }
    Some(DivergenceReport {
        tick_id,
        divergences,
    })
}

fn push_if_ne(
    out: &mut Vec<WardDivergence>,
    patient: Option<PatientId>,
    field: &'static str,
    recorded: f64,
    replayed: f64,
) {
    if recorded.to_bits() != replayed.to_bits() {
        out.push(WardDivergence {
            patient,
            field,
            recorded,
            replayed,
        });
    }
}

fn slot_value(slot: Option<simicu_core::ResourceId>) -> f64 {
    slot.map_or(-1.0, |s| s.0 as f64)
}

fn diff_patient(rec: &Patient, rep: &Patient, out: &mut Vec<WardDivergence>) {
    let id = Some(rec.id);
    push_if_ne(out, id, "condition", rec.condition, rep.condition);
    push_if_ne(
        out,
        id,
        "status",
        rec.status.code() as f64,
        rep.status.code() as f64,
    );
    push_if_ne(
        out,
        id,
        "ticks_waited",
        rec.ticks_waited as f64,
        rep.ticks_waited as f64,
    );
    push_if_ne(
        out,
        id,
        "bed_setup_remaining",
        rec.bed_setup_remaining as f64,
        rep.bed_setup_remaining as f64,
    );
    push_if_ne(
        out,
        id,
        "ventilator_setup_remaining",
        rec.ventilator_setup_remaining as f64,
        rep.ventilator_setup_remaining as f64,
    );
    push_if_ne(
        out,
        id,
        "discharge_remaining",
        rec.discharge_remaining as f64,
        rep.discharge_remaining as f64,
    );
    push_if_ne(
        out,
        id,
        "archetype",
        rec.archetype.map_or(0.0, |a| a.code() as f64),
        rep.archetype.map_or(0.0, |a| a.code() as f64),
    );
    push_if_ne(out, id, "nurse", slot_value(rec.nurse), slot_value(rep.nurse));
    push_if_ne(out, id, "bed", slot_value(rec.bed), slot_value(rep.bed));
    push_if_ne(
        out,
        id,
        "ventilator",
        slot_value(rec.ventilator),
        slot_value(rep.ventilator),
    );
}

fn diff_wards(rec: &dyn WardSnapshot, rep: &dyn WardSnapshot, out: &mut Vec<WardDivergence>) {
    push_if_ne(out, None, "tick", rec.tick_id().0 as f64, rep.tick_id().0 as f64);
    push_if_ne(
        out,
        None,
        "patients_saved",
        rec.patients_saved() as f64,
        rep.patients_saved() as f64,
    );
    push_if_ne(
        out,
        None,
        "patients_lost",
        rec.patients_lost() as f64,
        rep.patients_lost() as f64,
    );
    for kind in ResourceKind::ALL {
        let field = match kind {
            ResourceKind::Nurse => "free_nurses",
            ResourceKind::Bed => "free_beds",
            ResourceKind::Ventilator => "free_ventilators",
        };
        push_if_ne(out, None, field, rec.free(kind) as f64, rep.free(kind) as f64);
    }

    let (rec_p, rep_p) = (rec.patients(), rep.patients());
    push_if_ne(
        out,
        None,
        "patient_count",
        rec_p.len() as f64,
        rep_p.len() as f64,
    );
    for (a, b) in rec_p.iter().zip(rep_p) {
        if a.id != b.id {
            push_if_ne(out, Some(a.id), "id", a.id.0 as f64, b.id.0 as f64);
            continue;
        }
        diff_patient(a, b, out);
    }
}

/// Replay a recording through a caller-provided step function and compare
/// ward hashes at every tick.
///
/// `step_fn` receives each recorded decision, steps the world, and returns
/// the [`ward_hash`] of the resulting state. Taking a closure leaves world
/// ownership with the caller.
///
/// Returns `Ok(None)` if every tick matches, or `Ok(Some(report))` at the
/// first divergence. The report carries no field detail since only a
/// hash crosses the closure boundary; use [`compare_wards`] for that.
pub fn replay_and_compare<R: std::io::Read>(
    mut reader: ReplayReader<R>,
    step_fn: &mut dyn FnMut(Decision) -> Result<u64, ReplayError>,
) -> Result<Option<DivergenceReport>, ReplayError> {
    while let Some(frame) = reader.next_frame()? {
        let replayed = step_fn(frame.decision)?;
        if replayed != frame.ward_hash {
            log::warn!(
                "replay diverged at tick {}: recorded={:#018x}, replayed={replayed:#018x}",
                frame.tick_id,
                frame.ward_hash
            );
            return Ok(Some(DivergenceReport {
                tick_id: frame.tick_id,
                divergences: vec![],
            }));
        }
    }
    Ok(None)
}
