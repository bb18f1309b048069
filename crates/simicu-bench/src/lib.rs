//! Benchmark profiles and utilities for the SimICU ward simulation.
//!
//! Provides pre-built configurations for benchmarks, examples, and
//! determinism tests:
//!
//! - [`reference_config`]: the default ward under steady load
//! - [`stress_config`]: a ten-times larger ward with an arrival almost every tick
//! - [`scripted_decision`]: a deterministic decision rule that reads only the ward
//! - [`populated_world`]: a world advanced a fixed number of scripted ticks

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use simicu_core::{Action, Decision, PatientStatus, ResourceKind, WardSnapshot};
use simicu_engine::{ConfigError, EnvConfig, IcuConfig, IcuWorld, TickError};

/// The default ward (6 nurses, 10 beds, 4 ventilators) with one arrival
/// every four ticks on average.
pub fn reference_config(seed: u64) -> IcuConfig {
    IcuConfig {
        arrival_rate: 0.25,
        seed,
        ..IcuConfig::default()
    }
}

/// A 60-nurse, 100-bed, 40-ventilator ward with an arrival rate of 0.9.
///
/// At most one patient arrives per tick, so this is close to the
/// heaviest load the arrival process can produce.
pub fn stress_config(seed: u64) -> IcuConfig {
    IcuConfig {
        num_nurses: 60,
        num_beds: 100,
        num_ventilators: 40,
        arrival_rate: 0.9,
        seed,
        ..IcuConfig::default()
    }
}

/// Environment settings wrapping [`reference_config`].
pub fn reference_env_config(seed: u64) -> EnvConfig {
    EnvConfig {
        icu: reference_config(seed),
        ..EnvConfig::default()
    }
}

/// Condition below which [`scripted_decision`] asks for a ventilator.
pub const SCRIPTED_VENT_THRESHOLD: f64 = 30.0;

/// Pick a decision from the ward alone.
///
/// Targets the lowest-id waiting patient: a ventilator when its condition
/// is below [`SCRIPTED_VENT_THRESHOLD`] and one is free, otherwise a bed.
/// The request is issued even when the pools are exhausted, so rejection
/// paths are exercised too. Idles when nobody is waiting.
pub fn scripted_decision(ward: &dyn WardSnapshot) -> Decision {
    let Some(p) = ward
        .patients()
        .iter()
        .find(|p| p.status == PatientStatus::Waiting)
    else {
        return Decision::idle();
    };
    let action = if p.condition < SCRIPTED_VENT_THRESHOLD && ward.free(ResourceKind::Ventilator) > 0
    {
        Action::AdmitVentilator
    } else {
        Action::AdmitBed
    };
    Decision::new(p.id, action)
}

/// Build a world from `config` and advance it `ticks` scripted ticks.
pub fn populated_world(config: IcuConfig, ticks: u64) -> Result<IcuWorld, PopulateError> {
    let mut world = IcuWorld::new(config).map_err(PopulateError::Config)?;
    for _ in 0..ticks {
        let decision = scripted_decision(&world);
        world.step(decision).map_err(PopulateError::Tick)?;
    }
    Ok(world)
}

/// Failure while building a [`populated_world`].
#[derive(Debug)]
pub enum PopulateError {
    /// The configuration was rejected.
    Config(ConfigError),
    /// A tick failed.
    Tick(TickError),
}

impl std::fmt::Display for PopulateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Tick(e) => write!(f, "tick: {e}"),
        }
    }
}

impl std::error::Error for PopulateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Tick(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simicu_core::PatientId;
    use simicu_test_utils::MockWard;

    #[test]
    fn reference_config_validates() {
        reference_config(42).validate().unwrap();
        reference_env_config(42).validate().unwrap();
    }

    #[test]
    fn stress_config_validates() {
        stress_config(42).validate().unwrap();
    }

    #[test]
    fn scripted_decision_targets_first_waiting() {
        let mut ward = MockWard::new(6, 10, 4);
        ward.add_patient(50.0, PatientStatus::InBed);
        ward.add_patient(20.0, PatientStatus::Waiting);
        ward.add_patient(10.0, PatientStatus::Waiting);
        assert_eq!(
            scripted_decision(&ward),
            Decision::new(PatientId(1), Action::AdmitVentilator)
        );

        ward.set_free(ResourceKind::Ventilator, 0);
        assert_eq!(
            scripted_decision(&ward),
            Decision::new(PatientId(1), Action::AdmitBed)
        );
    }

    #[test]
    fn scripted_decision_idles_on_empty_queue() {
        let mut ward = MockWard::new(6, 10, 4);
        ward.add_patient(50.0, PatientStatus::Cured);
        assert_eq!(scripted_decision(&ward), Decision::idle());
    }

    #[test]
    fn populated_world_is_deterministic() {
        let a = populated_world(reference_config(7), 100).unwrap();
        let b = populated_world(reference_config(7), 100).unwrap();
        assert_eq!(a.patients(), b.patients());
        assert_eq!(a.check_invariants(), Ok(()));
        assert!(!a.patients().is_empty());
    }
}
