//! Decision sources that act on encoded observations.
//!
//! A [`DecisionSource`] sees exactly what a trained policy sees: the
//! observation vector. [`GreedyPolicy`] is the reference heuristic;
//! [`IdlePolicy`] is the do-nothing baseline.

use simicu_core::Action;
use simicu_obs::ObsLayout;

use crate::env::{EnvError, EpisodeInfo, IcuEnv};

/// Anything that can pick one `(slot, action)` per tick.
pub trait DecisionSource {
    /// Choose a decision from the current observation.
    fn decide(&mut self, observation: &[f32]) -> (usize, Action);
}

/// Always returns a no-op on slot 0.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdlePolicy;

impl DecisionSource for IdlePolicy {
    fn decide(&mut self, _observation: &[f32]) -> (usize, Action) {
        (0, Action::NoOp)
    }
}

/// Treat the sickest waiting patient first.
///
/// Among waiting slots, pick the lowest condition, breaking ties by the
/// longer wait. Ventilate when a ventilator and a nurse are free and the
/// patient is critical (or, in the extended layout, respiratory);
/// otherwise admit to a bed when a bed and a nurse are free; otherwise
/// idle on that patient's slot. Only an empty waiting list idles on
/// slot 0.
#[derive(Clone, Debug)]
pub struct GreedyPolicy {
    layout: ObsLayout,
    critical_threshold: f32,
}

impl GreedyPolicy {
    /// Normalized condition below which a patient is ventilated.
    pub const DEFAULT_CRITICAL_THRESHOLD: f32 = 0.3;

    /// A policy reading observations shaped by `layout`.
    pub fn new(layout: ObsLayout) -> Self {
        Self {
            layout,
            critical_threshold: Self::DEFAULT_CRITICAL_THRESHOLD,
        }
    }

    /// Replace the critical threshold.
    pub fn with_critical_threshold(mut self, threshold: f32) -> Self {
        self.critical_threshold = threshold;
        self
    }
}

impl DecisionSource for GreedyPolicy {
    fn decide(&mut self, observation: &[f32]) -> (usize, Action) {
        let Some(globals) = self.layout.globals(observation) else {
            return (0, Action::NoOp);
        };

        let target = (0..self.layout.max_patients)
            .filter_map(|slot| self.layout.slot(observation, slot).map(|f| (slot, f)))
            .filter(|(_, f)| f.is_waiting())
            .min_by(|(_, a), (_, b)| {
                a.condition
                    .total_cmp(&b.condition)
                    .then(b.wait.total_cmp(&a.wait))
            });
        let Some((slot, features)) = target else {
            return (0, Action::NoOp);
        };

        let nurse = globals.free_nurses > 0.0;
        let wants_ventilator = features.condition < self.critical_threshold
            || features
                .archetype_kind()
                .is_some_and(|a| a.prefers_ventilator());

        if wants_ventilator && nurse && globals.free_ventilators > 0.0 {
            (slot, Action::AdmitVentilator)
        } else if nurse && globals.free_beds > 0.0 {
            (slot, Action::AdmitBed)
        } else {
            (slot, Action::NoOp)
        }
    }
}

/// Run one full episode of `env` driven by `source`.
///
/// Resets with `seed`, steps until the episode terminates, and returns
/// the final counters.
pub fn run_episode(
    env: &mut IcuEnv,
    source: &mut dyn DecisionSource,
    seed: u64,
) -> Result<EpisodeInfo, EnvError> {
    let (mut observation, mut info) = env.reset(seed)?;
    while !env.is_done() {
        let (slot, action) = source.decide(&observation);
        let step = env.step(slot, action.code())?;
        observation = step.observation;
        info = step.info;
    }
    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EnvConfig, ExtendedParams};

    fn layout() -> ObsLayout {
        ObsLayout::new(3, 100)
    }

    /// Three slots then globals (beds, nurses, vents, progress).
    fn obs(slots: [[f32; 3]; 3], globals: [f32; 4]) -> Vec<f32> {
        slots.iter().flatten().chain(globals.iter()).copied().collect()
    }

    const PAD: [f32; 3] = [0.0, 0.0, 1.0];

    #[test]
    fn idle_policy_never_acts() {
        assert_eq!(IdlePolicy.decide(&[]), (0, Action::NoOp));
    }

    #[test]
    fn picks_sickest_waiting_patient() {
        let o = obs(
            [[0.5, 0.1, 0.0], [0.4, 0.0, 0.0], [0.2, 0.0, 0.25]],
            [1.0, 1.0, 0.0, 0.0],
        );
        // Slot 2 is in bed; slot 1 is the sickest waiting patient.
        assert_eq!(GreedyPolicy::new(layout()).decide(&o), (1, Action::AdmitBed));
    }

    #[test]
    fn ties_break_on_longer_wait() {
        let o = obs(
            [[0.4, 0.1, 0.0], [0.4, 0.3, 0.0], PAD],
            [1.0, 1.0, 1.0, 0.0],
        );
        assert_eq!(GreedyPolicy::new(layout()).decide(&o), (1, Action::AdmitBed));
    }

    #[test]
    fn critical_patient_ventilated_when_possible() {
        let o = obs([[0.25, 0.0, 0.0], PAD, PAD], [1.0, 0.5, 0.25, 0.0]);
        assert_eq!(
            GreedyPolicy::new(layout()).decide(&o),
            (0, Action::AdmitVentilator)
        );
        let no_vent = obs([[0.25, 0.0, 0.0], PAD, PAD], [1.0, 0.5, 0.0, 0.0]);
        assert_eq!(
            GreedyPolicy::new(layout()).decide(&no_vent),
            (0, Action::AdmitBed)
        );
    }

    #[test]
    fn idles_without_nurses_or_patients() {
        let no_nurse = obs([[0.5, 0.0, 0.0], PAD, PAD], [1.0, 0.0, 1.0, 0.0]);
        assert_eq!(GreedyPolicy::new(layout()).decide(&no_nurse), (0, Action::NoOp));
        let empty = obs([PAD, PAD, PAD], [1.0, 1.0, 1.0, 0.0]);
        assert_eq!(GreedyPolicy::new(layout()).decide(&empty), (0, Action::NoOp));
    }

    #[test]
    fn starved_idle_targets_the_waiting_slot() {
        let lost = [0.0, 0.2, 1.0];
        let o = obs([lost, [0.5, 0.1, 0.0], PAD], [1.0, 0.0, 1.0, 0.1]);
        assert_eq!(GreedyPolicy::new(layout()).decide(&o), (1, Action::NoOp));
    }

    #[test]
    fn starved_ward_never_charged_for_a_dead_slot() {
        // One nurse in arrival order: slot 0 soon holds a terminal
        // patient while later arrivals queue for the nurse.
        let mut cfg = EnvConfig::default();
        cfg.icu.num_nurses = 1;
        cfg.icu.arrival_rate = 0.5;
        let mut env = IcuEnv::new(cfg).unwrap();
        let layout = *env.encoder().layout();
        let mut greedy = GreedyPolicy::new(layout);
        let (mut observation, _) = env.reset(5).unwrap();
        let mut starved_ticks = 0;
        while !env.is_done() {
            let anyone_waiting = (0..layout.max_patients)
                .filter_map(|s| layout.slot(&observation, s))
                .any(|f| f.is_waiting());
            let (slot, action) = greedy.decide(&observation);
            let step = env.step(slot, action.code()).unwrap();
            if anyone_waiting {
                assert!(!step.components.invalid_target, "slot {slot} {action:?}");
                if action == Action::NoOp {
                    starved_ticks += 1;
                }
            }
            observation = step.observation;
        }
        assert!(starved_ticks > 0);
    }

    #[test]
    fn dead_slot_is_not_a_candidate() {
        // Condition 0 with status 0 never counts as waiting.
        let o = obs([[0.0, 0.5, 0.0], PAD, PAD], [1.0, 1.0, 1.0, 0.0]);
        assert_eq!(GreedyPolicy::new(layout()).decide(&o), (0, Action::NoOp));
    }

    #[test]
    fn respiratory_prefers_ventilator_in_extended_layout() {
        let layout = ObsLayout::extended(1, 100);
        let o = vec![0.6, 0.0, 0.0, 1.0 / 3.0, 1.0, 1.0, 1.0, 0.0];
        assert_eq!(
            GreedyPolicy::new(layout).decide(&o),
            (0, Action::AdmitVentilator)
        );
        let cardiac = vec![0.6, 0.0, 0.0, 2.0 / 3.0, 1.0, 1.0, 1.0, 0.0];
        assert_eq!(GreedyPolicy::new(layout).decide(&cardiac), (0, Action::AdmitBed));
    }

    #[test]
    fn short_observation_idles() {
        assert_eq!(GreedyPolicy::new(layout()).decide(&[0.5; 4]), (0, Action::NoOp));
    }

    #[test]
    fn greedy_beats_idle() {
        let cfg = EnvConfig {
            max_ticks: 300,
            ..EnvConfig::default()
        };
        let mut env = IcuEnv::new(cfg).unwrap();
        let mut greedy = GreedyPolicy::new(*env.encoder().layout());
        let g = run_episode(&mut env, &mut greedy, 3).unwrap();
        let i = run_episode(&mut env, &mut IdlePolicy, 3).unwrap();
        assert_eq!(i.patients_saved, 0);
        assert!(g.patients_saved > 0);
        assert!(g.patients_lost <= i.patients_lost);
        assert_eq!(g.score.tick.0, 300);
    }

    #[test]
    fn greedy_runs_extended_variant() {
        let mut cfg = EnvConfig::default();
        cfg.icu.extended = Some(ExtendedParams::default());
        let mut env = IcuEnv::new(cfg).unwrap();
        let mut greedy = GreedyPolicy::new(*env.encoder().layout());
        let info = run_episode(&mut env, &mut greedy, 11).unwrap();
        assert_eq!(env.world().check_invariants(), Ok(()));
        assert!(info.patients_saved + info.patients_lost > 0);
    }
}
