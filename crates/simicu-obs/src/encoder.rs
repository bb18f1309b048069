//! Fixed-length observation encoding.

use simicu_core::{ObsError, Patient, ResourceKind, WardSnapshot, CONDITION_MAX};

use crate::layout::ObsLayout;

/// Encodes ward state into the vector described by an [`ObsLayout`].
///
/// Every value is in `[0, 1]`. Empty slots are padded with condition 0,
/// wait 0, status [`ObsLayout::padding_status`], archetype 0.
#[derive(Clone, Debug)]
pub struct ObsEncoder {
    layout: ObsLayout,
}

impl ObsEncoder {
    /// Create an encoder, validating the layout.
    pub fn new(layout: ObsLayout) -> Result<Self, ObsError> {
        layout.validate()?;
        Ok(Self { layout })
    }

    /// The layout this encoder produces.
    pub fn layout(&self) -> &ObsLayout {
        &self.layout
    }

    /// Length of one encoded observation.
    pub fn output_len(&self) -> usize {
        self.layout.len()
    }

    /// Encode `ward` into a freshly allocated vector.
    pub fn encode(&self, ward: &dyn WardSnapshot) -> Vec<f32> {
        let mut out = vec![0.0; self.output_len()];
        self.fill(ward, &mut out);
        out
    }

    /// Encode `ward` into `output`, which must be exactly
    /// [`output_len`](Self::output_len) elements.
    pub fn encode_into(&self, ward: &dyn WardSnapshot, output: &mut [f32]) -> Result<(), ObsError> {
        if output.len() != self.output_len() {
            return Err(ObsError::BufferSizeMismatch {
                expected: self.output_len(),
                actual: output.len(),
            });
        }
        self.fill(ward, output);
        Ok(())
    }

    /// Encode several wards back to back.
    ///
    /// Ward `i` fills `output[i * output_len()..(i + 1) * output_len()]`.
    pub fn encode_batch(
        &self,
        wards: &[&dyn WardSnapshot],
        output: &mut [f32],
    ) -> Result<(), ObsError> {
        let len = self.output_len();
        let expected = wards.len() * len;
        if output.len() != expected {
            return Err(ObsError::BufferSizeMismatch {
                expected,
                actual: output.len(),
            });
        }
        for (ward, chunk) in wards.iter().zip(output.chunks_exact_mut(len)) {
            self.fill(*ward, chunk);
        }
        Ok(())
    }

    fn fill(&self, ward: &dyn WardSnapshot, out: &mut [f32]) {
        let layout = &self.layout;
        let mut filled = 0;
        for (slot, patient) in layout.slot_patients(ward).enumerate() {
            self.write_slot(&mut out[layout.slot_range(slot)], patient);
            filled = slot + 1;
        }
        for slot in filled..layout.max_patients {
            let s = &mut out[layout.slot_range(slot)];
            s.fill(0.0);
            s[2] = layout.padding_status();
        }

        let g = layout.globals_offset();
        out[g] = fraction(ward.free(ResourceKind::Bed), ward.capacity(ResourceKind::Bed));
        out[g + 1] = fraction(ward.free(ResourceKind::Nurse), ward.capacity(ResourceKind::Nurse));
        out[g + 2] = fraction(
            ward.free(ResourceKind::Ventilator),
            ward.capacity(ResourceKind::Ventilator),
        );
        out[g + 3] = unit(ward.tick_id().0 as f64 / layout.max_ticks as f64);
    }

    fn write_slot(&self, s: &mut [f32], p: &Patient) {
        let layout = &self.layout;
        s[0] = unit(p.condition / CONDITION_MAX);
        s[1] = unit(f64::from(p.ticks_waited) / layout.max_ticks as f64);
        s[2] = unit(f64::from(p.status.code()) / f64::from(layout.max_status_code()));
        if layout.include_archetype {
            s[3] = p
                .archetype
                .map(|a| f32::from(a.code()) / f32::from(simicu_core::Archetype::MAX_CODE))
                .unwrap_or(0.0);
        }
    }
}

fn fraction(free: u32, capacity: u32) -> f32 {
    if capacity == 0 {
        0.0
    } else {
        unit(f64::from(free) / f64::from(capacity))
    }
}

fn unit(v: f64) -> f32 {
    v.clamp(0.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use simicu_core::{Archetype, PatientStatus, TickId};
    use simicu_test_utils::MockWard;

    fn encoder(max_patients: usize) -> ObsEncoder {
        ObsEncoder::new(ObsLayout::new(max_patients, 300)).unwrap()
    }

    #[test]
    fn rejects_invalid_layout() {
        assert!(ObsEncoder::new(ObsLayout::new(0, 300)).is_err());
    }

    #[test]
    fn empty_ward_is_all_padding() {
        let ward = MockWard::new(6, 10, 4);
        let obs = encoder(3).encode(&ward);
        assert_eq!(obs.len(), 13);
        for slot in 0..3 {
            assert_eq!(&obs[slot * 3..slot * 3 + 3], &[0.0, 0.0, 1.0]);
        }
        assert_eq!(&obs[9..], &[1.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn patient_features_are_normalized() {
        let mut ward = MockWard::new(6, 10, 4);
        let id = ward.add_patient(50.0, PatientStatus::Waiting);
        ward.patient_mut(id).ticks_waited = 30;
        ward.add_patient(80.0, PatientStatus::OnVentilator);
        ward.set_free(ResourceKind::Bed, 5);
        ward.set_tick(TickId(150));

        let obs = encoder(2).encode(&ward);
        assert_eq!(&obs[0..3], &[0.5, 0.1, 0.0]);
        assert_eq!(obs[3], 0.8);
        assert_eq!(obs[5], 0.5);
        assert_eq!(obs[6], 0.5);
        assert_eq!(obs[9], 0.5);
    }

    #[test]
    fn lost_patient_status_is_one() {
        let mut ward = MockWard::new(1, 1, 1);
        ward.add_patient(0.0, PatientStatus::Lost);
        let obs = encoder(1).encode(&ward);
        assert_eq!(obs[2], 1.0);
    }

    #[test]
    fn extended_layout_carries_archetype() {
        let mut ward = MockWard::new(6, 10, 4);
        let id = ward.add_patient(40.0, PatientStatus::PendingDischarge);
        ward.patient_mut(id).archetype = Some(Archetype::Trauma);
        let enc = ObsEncoder::new(ObsLayout::extended(2, 300)).unwrap();
        let obs = enc.encode(&ward);
        assert_eq!(obs.len(), 12);
        assert_eq!(obs[2], 1.0);
        assert_eq!(obs[3], 1.0);
        assert_eq!(&obs[4..8], &[0.0, 0.0, 0.8, 0.0]);
    }

    #[test]
    fn pending_discharge_is_distinct_from_padding() {
        let mut ward = MockWard::new(6, 10, 4);
        ward.add_patient(60.0, PatientStatus::PendingDischarge);
        ward.add_patient(0.0, PatientStatus::Lost);
        let enc = ObsEncoder::new(ObsLayout::extended(3, 300)).unwrap();
        let obs = enc.encode(&ward);
        let (pending, lost, padding) = (obs[2], obs[6], obs[10]);
        assert_eq!(pending, 1.0);
        assert_ne!(pending, padding);
        assert_eq!(lost, padding);
    }

    #[test]
    fn wait_and_tick_saturate() {
        let mut ward = MockWard::new(1, 1, 1);
        let id = ward.add_patient(10.0, PatientStatus::Waiting);
        ward.patient_mut(id).ticks_waited = 10_000;
        ward.set_tick(TickId(10_000));
        let obs = encoder(1).encode(&ward);
        assert_eq!(obs[1], 1.0);
        assert_eq!(obs[6], 1.0);
    }

    #[test]
    fn empty_pool_encodes_zero_fraction() {
        let ward = MockWard::new(6, 10, 0);
        let obs = encoder(1).encode(&ward);
        assert_eq!(obs[5], 0.0);
    }

    #[test]
    fn encode_into_checks_length() {
        let ward = MockWard::new(1, 1, 1);
        let enc = encoder(2);
        let mut short = vec![0.0; 5];
        assert_eq!(
            enc.encode_into(&ward, &mut short),
            Err(ObsError::BufferSizeMismatch {
                expected: 10,
                actual: 5
            })
        );
        let mut exact = vec![9.0; 10];
        enc.encode_into(&ward, &mut exact).unwrap();
        assert_eq!(exact, enc.encode(&ward));
    }

    #[test]
    fn batch_writes_contiguous_chunks() {
        let a = MockWard::new(2, 2, 2);
        let mut b = MockWard::new(2, 2, 2);
        b.add_patient(60.0, PatientStatus::Waiting);
        let enc = encoder(1);
        let mut out = vec![0.0; 2 * enc.output_len()];
        enc.encode_batch(&[&a, &b], &mut out).unwrap();
        assert_eq!(&out[..7], enc.encode(&a).as_slice());
        assert_eq!(&out[7..], enc.encode(&b).as_slice());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn every_feature_in_unit_interval(
                conditions in prop::collection::vec(0.0f64..=100.0, 0..15),
                waited in 0u32..1000,
                tick in 0u64..1000,
                free_beds in 0u32..=10,
            ) {
                let mut ward = MockWard::new(6, 10, 4);
                for c in conditions {
                    let id = ward.add_patient(c, PatientStatus::Waiting);
                    ward.patient_mut(id).ticks_waited = waited;
                }
                ward.set_free(ResourceKind::Bed, free_beds);
                ward.set_tick(TickId(tick));
                let obs = encoder(10).encode(&ward);
                prop_assert_eq!(obs.len(), 34);
                for v in obs {
                    prop_assert!((0.0..=1.0).contains(&v));
                }
            }
        }
    }
}
