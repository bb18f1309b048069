//! Patients, their status machine, and clinical archetypes.
//!
//! Condition uses life polarity: [`CONDITION_MIN`] is death and
//! [`CONDITION_MAX`] is full recovery. Waiting lowers it, completed care
//! raises it.

use smallvec::SmallVec;
use std::fmt;

use crate::id::{PatientId, ResourceId, ResourceKind};

/// Condition at which a patient is lost.
pub const CONDITION_MIN: f64 = 0.0;

/// Condition at which a patient is recovered.
pub const CONDITION_MAX: f64 = 100.0;

/// Where a patient currently is in the ward.
///
/// `Cured` and `Lost` are terminal. `PendingDischarge` only occurs when
/// the extended variant is enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PatientStatus {
    /// Arrived, holding nothing, deteriorating.
    Waiting,
    /// Holding a bed and a nurse.
    InBed,
    /// Holding a bed, a nurse, and a ventilator.
    OnVentilator,
    /// Recovered but still occupying resources until discharge completes.
    PendingDischarge,
    /// Recovered and discharged. Terminal.
    Cured,
    /// Died. Terminal.
    Lost,
}

impl PatientStatus {
    /// Largest code produced by [`PatientStatus::code`] in the base variant.
    pub const MAX_BASE_CODE: u8 = 4;

    /// Largest code produced by [`PatientStatus::code`] with discharge enabled.
    pub const MAX_EXTENDED_CODE: u8 = 5;

    /// Whether this status admits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cured | Self::Lost)
    }

    /// Stable numeric code used by the observation encoder and replay hash.
    ///
    /// Waiting 0, InBed 1, OnVentilator 2, Cured 3, Lost 4,
    /// PendingDischarge 5.
    pub fn code(self) -> u8 {
        match self {
            Self::Waiting => 0,
            Self::InBed => 1,
            Self::OnVentilator => 2,
            Self::Cured => 3,
            Self::Lost => 4,
            Self::PendingDischarge => 5,
        }
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Waiting => "waiting",
            Self::InBed => "in bed",
            Self::OnVentilator => "on ventilator",
            Self::PendingDischarge => "pending discharge",
            Self::Cured => "cured",
            Self::Lost => "lost",
        };
        f.write_str(s)
    }
}

/// Medical category of a patient, used to bias reward shaping toward
/// clinically appropriate care.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Archetype {
    /// Benefits most from a ventilator.
    Respiratory,
    /// Best served by bed care.
    Cardiac,
    /// Best served by bed care.
    Trauma,
}

impl Archetype {
    /// Every archetype, in code order.
    pub const ALL: [Archetype; 3] = [Self::Respiratory, Self::Cardiac, Self::Trauma];

    /// Largest code produced by [`Archetype::code`].
    pub const MAX_CODE: u8 = 3;

    /// Numeric code, starting at 1 so that 0 can mean "no archetype".
    pub fn code(self) -> u8 {
        match self {
            Self::Respiratory => 1,
            Self::Cardiac => 2,
            Self::Trauma => 3,
        }
    }

    /// Inverse of [`Archetype::code`].
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Respiratory),
            2 => Some(Self::Cardiac),
            3 => Some(Self::Trauma),
            _ => None,
        }
    }

    /// Whether a ventilator is the clinically preferred care type.
    pub fn prefers_ventilator(self) -> bool {
        matches!(self, Self::Respiratory)
    }
}

/// A single patient and the resources it currently holds.
///
/// Resource ownership lives in the pools; the patient only records which
/// slot of each kind it was granted.
#[derive(Clone, Debug, PartialEq)]
pub struct Patient {
    /// Unique, never reused.
    pub id: PatientId,
    /// Health on the `[0, 100]` life scale.
    pub condition: f64,
    /// Current position in the status machine.
    pub status: PatientStatus,
    /// Ticks spent in `Waiting`. Never reset.
    pub ticks_waited: u32,
    /// Ticks of bed setup left before bed care starts improving condition.
    pub bed_setup_remaining: u32,
    /// Ticks of ventilator setup left before ventilation improves condition.
    pub ventilator_setup_remaining: u32,
    /// Ticks left in `PendingDischarge` before the patient is cured.
    pub discharge_remaining: u32,
    /// Clinical archetype, present only in the extended variant.
    pub archetype: Option<Archetype>,
    /// Nurse slot held, if any.
    pub nurse: Option<ResourceId>,
    /// Bed slot held, if any.
    pub bed: Option<ResourceId>,
    /// Ventilator slot held, if any.
    pub ventilator: Option<ResourceId>,
}

impl Patient {
    /// A freshly arrived patient: waiting, holding nothing.
    pub fn new(id: PatientId, condition: f64, archetype: Option<Archetype>) -> Self {
        Self {
            id,
            condition: condition.clamp(CONDITION_MIN, CONDITION_MAX),
            status: PatientStatus::Waiting,
            ticks_waited: 0,
            bed_setup_remaining: 0,
            ventilator_setup_remaining: 0,
            discharge_remaining: 0,
            archetype,
            nurse: None,
            bed: None,
            ventilator: None,
        }
    }

    /// Whether the patient has reached a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// The slot of `kind` this patient holds, if any.
    pub fn holds(&self, kind: ResourceKind) -> Option<ResourceId> {
        match kind {
            ResourceKind::Nurse => self.nurse,
            ResourceKind::Bed => self.bed,
            ResourceKind::Ventilator => self.ventilator,
        }
    }

    /// Mutable access to the back-reference for `kind`.
    pub fn slot_mut(&mut self, kind: ResourceKind) -> &mut Option<ResourceId> {
        match kind {
            ResourceKind::Nurse => &mut self.nurse,
            ResourceKind::Bed => &mut self.bed,
            ResourceKind::Ventilator => &mut self.ventilator,
        }
    }

    /// Every resource currently held, in [`ResourceKind::ALL`] order.
    pub fn held(&self) -> SmallVec<[(ResourceKind, ResourceId); 3]> {
        ResourceKind::ALL
            .iter()
            .filter_map(|&kind| self.holds(kind).map(|id| (kind, id)))
            .collect()
    }

    /// Whether the patient is in care whose setup has finished.
    pub fn receiving_care(&self) -> bool {
        match self.status {
            PatientStatus::InBed => self.bed_setup_remaining == 0,
            PatientStatus::OnVentilator => self.ventilator_setup_remaining == 0,
            _ => false,
        }
    }
}
