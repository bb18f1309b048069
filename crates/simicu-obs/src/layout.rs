//! Observation vector layout and slot resolution.

use std::ops::Range;

use simicu_core::{Archetype, ObsError, Patient, PatientStatus, WardSnapshot};

/// How observation slots map onto the patient list.
///
/// The same ordering resolves a decision-maker's slot index back to a
/// patient, so slot `i` in the observation and slot `i` in a decision
/// always refer to the same patient.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SlotOrder {
    /// Slot `i` is the `i`-th patient ever to arrive, terminal or not.
    /// Terminal patients keep their slot until the episode ends.
    #[default]
    Arrival,
    /// Slot `i` is the `i`-th non-terminal patient by arrival. Slots are
    /// compacted as patients are cured or lost.
    Active,
}

impl SlotOrder {
    fn admits(self, patient: &Patient) -> bool {
        match self {
            Self::Arrival => true,
            Self::Active => !patient.is_terminal(),
        }
    }
}

/// Shape of the observation vector.
///
/// # Examples
///
/// ```
/// use simicu_obs::ObsLayout;
///
/// let layout = ObsLayout::new(10, 300);
/// assert_eq!(layout.slot_width(), 3);
/// assert_eq!(layout.len(), 10 * 3 + 4);
///
/// let extended = ObsLayout::extended(10, 300);
/// assert_eq!(extended.len(), 10 * 4 + 4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObsLayout {
    /// Number of patient slots.
    pub max_patients: usize,
    /// Episode length, the denominator for wait time and tick progress.
    pub max_ticks: u64,
    /// Whether each slot carries an archetype feature and the status
    /// scale includes pending discharge.
    pub include_archetype: bool,
    /// Slot-to-patient mapping.
    pub slot_order: SlotOrder,
}

impl ObsLayout {
    /// Number of trailing global features.
    pub const GLOBAL_FEATURES: usize = 4;

    /// Base layout: condition, wait, status per slot.
    pub fn new(max_patients: usize, max_ticks: u64) -> Self {
        Self {
            max_patients,
            max_ticks,
            include_archetype: false,
            slot_order: SlotOrder::default(),
        }
    }

    /// Extended layout: adds an archetype feature per slot and widens the
    /// status scale to cover pending discharge.
    pub fn extended(max_patients: usize, max_ticks: u64) -> Self {
        Self {
            include_archetype: true,
            ..Self::new(max_patients, max_ticks)
        }
    }

    /// Replace the slot ordering.
    pub fn with_slot_order(mut self, slot_order: SlotOrder) -> Self {
        self.slot_order = slot_order;
        self
    }

    /// Reject layouts that cannot be encoded.
    pub fn validate(&self) -> Result<(), ObsError> {
        if self.max_patients == 0 {
            return Err(ObsError::InvalidLayout {
                reason: "max_patients must be at least 1".into(),
            });
        }
        if self.max_ticks == 0 {
            return Err(ObsError::InvalidLayout {
                reason: "max_ticks must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Features per patient slot.
    pub fn slot_width(&self) -> usize {
        if self.include_archetype {
            4
        } else {
            3
        }
    }

    /// Total vector length.
    pub fn len(&self) -> usize {
        self.max_patients * self.slot_width() + Self::GLOBAL_FEATURES
    }

    /// Always false for a validated layout.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Denominator of the status feature.
    pub fn max_status_code(&self) -> u8 {
        if self.include_archetype {
            PatientStatus::MAX_EXTENDED_CODE
        } else {
            PatientStatus::MAX_BASE_CODE
        }
    }

    /// Status feature of an empty slot: the lost code on this layout's
    /// scale, so padding never collides with a live status.
    pub fn padding_status(&self) -> f32 {
        f32::from(PatientStatus::Lost.code()) / f32::from(self.max_status_code())
    }

    /// Index range of slot `slot` within the vector.
    pub fn slot_range(&self, slot: usize) -> Range<usize> {
        let start = slot * self.slot_width();
        start..start + self.slot_width()
    }

    /// Offset of the first global feature.
    pub fn globals_offset(&self) -> usize {
        self.max_patients * self.slot_width()
    }

    /// Patients occupying the observation slots, in slot order.
    pub fn slot_patients<'a>(
        &self,
        ward: &'a dyn WardSnapshot,
    ) -> impl Iterator<Item = &'a Patient> + 'a {
        let order = self.slot_order;
        ward.patients()
            .iter()
            .filter(move |p| order.admits(p))
            .take(self.max_patients)
    }

    /// The patient a decision on `slot` targets, if the slot is occupied.
    pub fn resolve_slot<'a>(&self, ward: &'a dyn WardSnapshot, slot: usize) -> Option<&'a Patient> {
        if slot >= self.max_patients {
            return None;
        }
        self.slot_patients(ward).nth(slot)
    }

    /// Decode the features of `slot` from an encoded vector.
    pub fn slot(&self, obs: &[f32], slot: usize) -> Option<SlotFeatures> {
        if slot >= self.max_patients {
            return None;
        }
        let f = obs.get(self.slot_range(slot))?;
        Some(SlotFeatures {
            condition: f[0],
            wait: f[1],
            status: f[2],
            archetype: f.get(3).copied(),
        })
    }

    /// Decode the global features from an encoded vector.
    pub fn globals(&self, obs: &[f32]) -> Option<GlobalFeatures> {
        let start = self.globals_offset();
        let g = obs.get(start..start + Self::GLOBAL_FEATURES)?;
        Some(GlobalFeatures {
            free_beds: g[0],
            free_nurses: g[1],
            free_ventilators: g[2],
            tick_progress: g[3],
        })
    }
}

/// Decoded per-slot features.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotFeatures {
    /// Condition / 100.
    pub condition: f32,
    /// Ticks waited / `max_ticks`, capped at 1.
    pub wait: f32,
    /// Status code / maximum status code.
    pub status: f32,
    /// Archetype code / 3, or 0 for none. Present only in the extended
    /// layout.
    pub archetype: Option<f32>,
}

impl SlotFeatures {
    /// Whether the slot holds a live waiting patient.
    ///
    /// Waiting encodes as status 0; a zero condition means the slot is a
    /// patient at the death threshold, which is never actionable.
    pub fn is_waiting(&self) -> bool {
        self.status == 0.0 && self.condition > 0.0
    }

    /// Decoded archetype, when present.
    pub fn archetype_kind(&self) -> Option<Archetype> {
        let code = (self.archetype? * f32::from(Archetype::MAX_CODE)).round() as u8;
        Archetype::from_code(code)
    }
}

/// Decoded global features.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlobalFeatures {
    /// Free beds / bed pool size.
    pub free_beds: f32,
    /// Free nurses / nurse pool size.
    pub free_nurses: f32,
    /// Free ventilators / ventilator pool size.
    pub free_ventilators: f32,
    /// Tick / `max_ticks`, capped at 1.
    pub tick_progress: f32,
}
