//! Validation and atomic application of a single decision.
//!
//! Every multi-resource admission goes through a
//! [`Reservation`](simicu_pool::Reservation): either all resources the
//! action needs are reserved, or the guard rolls back and the patient is
//! left exactly as it was.

use simicu_core::{Action, ActionError, Decision, Patient, PatientStatus, Receipt, ResourceKind};
use simicu_pool::ResourcePools;

use crate::config::LifecycleParams;

/// Apply `decision` to the ward.
///
/// `patients` must be sorted by id. Rejections leave both the patient
/// list and the pools untouched.
pub fn apply_decision(
    patients: &mut [Patient],
    pools: &mut ResourcePools,
    decision: Decision,
    params: &LifecycleParams,
) -> Receipt {
    match try_apply(patients, pools, decision, params) {
        Ok(setup_delay) => Receipt {
            setup_delay_incurred: setup_delay,
            ..Receipt::applied(decision)
        },
        Err(reason) => Receipt::rejected(decision, reason),
    }
}

/// Returns whether an escalation restarted setup.
fn try_apply(
    patients: &mut [Patient],
    pools: &mut ResourcePools,
    decision: Decision,
    params: &LifecycleParams,
) -> Result<bool, ActionError> {
    if decision.action == Action::NoOp {
        return Ok(false);
    }
    let id = decision.patient.ok_or(ActionError::NoTarget)?;
    let idx = patients
        .binary_search_by_key(&id, |p| p.id)
        .map_err(|_| ActionError::UnknownPatient { id })?;
    let patient = &mut patients[idx];

    match patient.status {
        status @ (PatientStatus::Cured | PatientStatus::Lost) => {
            return Err(ActionError::TerminalPatient { id, status });
        }
        PatientStatus::PendingDischarge => return Err(ActionError::PendingDischarge { id }),
        _ => {}
    }

    match (decision.action, patient.status) {
        (Action::AdmitBed, PatientStatus::Waiting) => {
            admit_bed(patient, pools, params)?;
            Ok(false)
        }
        (Action::AdmitVentilator, PatientStatus::Waiting) => {
            admit_ventilator(patient, pools, params)?;
            Ok(false)
        }
        (Action::AdmitVentilator, PatientStatus::InBed) => {
            escalate(patient, pools, params)?;
            Ok(true)
        }
        (action, status) => Err(ActionError::NotEligible { id, status, action }),
    }
}

fn admit_bed(
    patient: &mut Patient,
    pools: &mut ResourcePools,
    params: &LifecycleParams,
) -> Result<(), ActionError> {
    let mut r = pools.reservation(patient.id);
    let bed = r.take(ResourceKind::Bed).ok_or(ActionError::NoBed)?;
    let nurse = r.take(ResourceKind::Nurse).ok_or(ActionError::NoNurse)?;
    r.commit();

    patient.bed = Some(bed);
    patient.nurse = Some(nurse);
    patient.status = PatientStatus::InBed;
    patient.bed_setup_remaining = params.bed_setup_ticks;
    Ok(())
}

/// Waiting straight to ventilator: the bed and nurse come with it.
fn admit_ventilator(
    patient: &mut Patient,
    pools: &mut ResourcePools,
    params: &LifecycleParams,
) -> Result<(), ActionError> {
    if pools.free(ResourceKind::Ventilator) == 0 {
        return Err(ActionError::NoVentilator);
    }
    let mut r = pools.reservation(patient.id);
    let bed = r.take(ResourceKind::Bed).ok_or(ActionError::NoBed)?;
    let nurse = r.take(ResourceKind::Nurse).ok_or(ActionError::NoNurse)?;
    let vent = r.take(ResourceKind::Ventilator).ok_or(ActionError::NoVentilator)?;
    r.commit();

    patient.bed = Some(bed);
    patient.nurse = Some(nurse);
    patient.ventilator = Some(vent);
    patient.status = PatientStatus::OnVentilator;
    patient.bed_setup_remaining = params.bed_setup_ticks;
    patient.ventilator_setup_remaining = params.vent_setup_ticks;
    Ok(())
}

/// In bed to ventilator. Only the ventilator is reserved; setup restarts.
fn escalate(
    patient: &mut Patient,
    pools: &mut ResourcePools,
    params: &LifecycleParams,
) -> Result<(), ActionError> {
    let mut r = pools.reservation(patient.id);
    let vent = r.take(ResourceKind::Ventilator).ok_or(ActionError::NoVentilator)?;
    r.commit();

    patient.ventilator = Some(vent);
    patient.status = PatientStatus::OnVentilator;
    patient.ventilator_setup_remaining = params.vent_setup_ticks;
    Ok(())
}
