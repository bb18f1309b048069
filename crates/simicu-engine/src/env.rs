//! Gym-style environment around one ward.
//!
//! [`IcuEnv`] translates `(slot, action code)` pairs from an automated
//! decision-maker into engine decisions, advances one tick, and returns
//! the encoded observation with a shaped reward. Validation never
//! short-circuits the tick: a bad slot or an unavailable resource is
//! penalized, and time still moves.

use std::fmt;

use simicu_core::{Action, ActionError, Decision, ObsError, Receipt, WardSnapshot};
use simicu_obs::{DecisionContext, ObsEncoder, RewardComponents};

use crate::config::{ConfigError, EnvConfig};
use crate::lockstep::IcuWorld;
use crate::score::ScoreSummary;
use crate::tick::TickError;

// ── EnvError ────────────────────────────────────────────────────

/// Errors from [`IcuEnv`] calls.
#[derive(Debug, PartialEq)]
pub enum EnvError {
    /// The underlying tick faulted.
    Tick(TickError),
    /// A caller-provided observation buffer has the wrong length.
    Obs(ObsError),
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tick(e) => write!(f, "tick failed: {e}"),
            Self::Obs(e) => write!(f, "observation: {e}"),
        }
    }
}

impl std::error::Error for EnvError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Tick(e) => Some(e),
            Self::Obs(e) => Some(e),
        }
    }
}

impl From<TickError> for EnvError {
    fn from(e: TickError) -> Self {
        Self::Tick(e)
    }
}

impl From<ObsError> for EnvError {
    fn from(e: ObsError) -> Self {
        Self::Obs(e)
    }
}

// ── Step types ──────────────────────────────────────────────────

/// Cumulative episode counters reported with every step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EpisodeInfo {
    /// Patients cured so far this episode.
    pub patients_saved: u64,
    /// Patients lost so far this episode.
    pub patients_lost: u64,
    /// Full scoring summary.
    pub score: ScoreSummary,
}

impl EpisodeInfo {
    fn from_world(world: &IcuWorld) -> Self {
        Self {
            patients_saved: world.patients_saved(),
            patients_lost: world.patients_lost(),
            score: world.score(),
        }
    }
}

/// Everything a step reports besides the observation.
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    /// Shaped scalar reward.
    pub reward: f64,
    /// The episode reached `max_ticks`.
    pub terminated: bool,
    /// Always false: episodes end only by reaching `max_ticks`.
    pub truncated: bool,
    /// Cumulative counters.
    pub info: EpisodeInfo,
    /// Fate of the decision, with the slot or action-code rejection
    /// reported in place of the engine's.
    pub receipt: Receipt,
    /// Unweighted reward terms.
    pub components: RewardComponents,
}

/// Result of [`IcuEnv::step()`].
#[derive(Clone, Debug, PartialEq)]
pub struct EnvStep {
    /// Encoded observation after the tick.
    pub observation: Vec<f32>,
    /// Shaped scalar reward.
    pub reward: f64,
    /// The episode reached `max_ticks`.
    pub terminated: bool,
    /// Always false.
    pub truncated: bool,
    /// Cumulative counters.
    pub info: EpisodeInfo,
    /// Fate of the decision.
    pub receipt: Receipt,
    /// Unweighted reward terms.
    pub components: RewardComponents,
}

impl EnvStep {
    fn new(observation: Vec<f32>, report: StepReport) -> Self {
        Self {
            observation,
            reward: report.reward,
            terminated: report.terminated,
            truncated: report.truncated,
            info: report.info,
            receipt: report.receipt,
            components: report.components,
        }
    }
}

// ── IcuEnv ──────────────────────────────────────────────────────

/// A ward wrapped with an observation encoder and reward model.
pub struct IcuEnv {
    config: EnvConfig,
    world: IcuWorld,
    encoder: ObsEncoder,
    episode_return: f64,
}

impl IcuEnv {
    /// Validate `config` and build the environment.
    ///
    /// The world is at tick 0 with no patients until
    /// [`reset()`](IcuEnv::reset) runs the warmup.
    pub fn new(config: EnvConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let encoder = ObsEncoder::new(config.obs_layout())?;
        let world = IcuWorld::new(config.icu.clone())?;
        Ok(Self {
            config,
            world,
            encoder,
            episode_return: 0.0,
        })
    }

    /// Start a new episode with `seed`.
    ///
    /// Runs `warmup_ticks` no-op ticks so patients exist at the first
    /// observation.
    pub fn reset(&mut self, seed: u64) -> Result<(Vec<f32>, EpisodeInfo), EnvError> {
        self.warm_up(seed)?;
        Ok((self.observe(), EpisodeInfo::from_world(&self.world)))
    }

    /// [`reset()`](IcuEnv::reset) writing the observation into `obs`.
    pub fn reset_into(&mut self, seed: u64, obs: &mut [f32]) -> Result<EpisodeInfo, EnvError> {
        self.check_buffer(obs)?;
        self.warm_up(seed)?;
        self.encoder.encode_into(&self.world, obs)?;
        Ok(EpisodeInfo::from_world(&self.world))
    }

    /// Apply `action_code` to the patient in observation slot `slot` and
    /// advance one tick.
    pub fn step(&mut self, slot: usize, action_code: u8) -> Result<EnvStep, EnvError> {
        let report = self.advance(slot, action_code)?;
        Ok(EnvStep::new(self.observe(), report))
    }

    /// [`step()`](IcuEnv::step) writing the observation into `obs`.
    ///
    /// The buffer length is checked before the tick runs, so a mismatch
    /// leaves the ward untouched.
    pub fn step_into(
        &mut self,
        slot: usize,
        action_code: u8,
        obs: &mut [f32],
    ) -> Result<StepReport, EnvError> {
        self.check_buffer(obs)?;
        let report = self.advance(slot, action_code)?;
        self.encoder.encode_into(&self.world, obs)?;
        Ok(report)
    }

    /// Encode the current ward.
    pub fn observe(&self) -> Vec<f32> {
        self.encoder.encode(&self.world)
    }

    /// Length of one observation.
    pub fn observation_len(&self) -> usize {
        self.encoder.output_len()
    }

    /// The observation encoder.
    pub fn encoder(&self) -> &ObsEncoder {
        &self.encoder
    }

    /// Read-only access to the ward.
    pub fn world(&self) -> &IcuWorld {
        &self.world
    }

    /// Mutable access to the ward, for scripted scenarios.
    pub fn world_mut(&mut self) -> &mut IcuWorld {
        &mut self.world
    }

    /// The validated configuration.
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Sum of rewards since the last reset.
    pub fn episode_return(&self) -> f64 {
        self.episode_return
    }

    /// Whether the episode has reached `max_ticks`.
    pub fn is_done(&self) -> bool {
        self.world.current_tick().0 >= self.config.max_ticks
    }

    fn warm_up(&mut self, seed: u64) -> Result<(), EnvError> {
        self.world.reset(seed);
        self.episode_return = 0.0;
        for _ in 0..self.config.warmup_ticks {
            self.world.step(Decision::idle())?;
        }
        Ok(())
    }

    fn check_buffer(&self, obs: &[f32]) -> Result<(), ObsError> {
        let expected = self.observation_len();
        if obs.len() != expected {
            return Err(ObsError::BufferSizeMismatch {
                expected,
                actual: obs.len(),
            });
        }
        Ok(())
    }

    fn advance(&mut self, slot: usize, action_code: u8) -> Result<StepReport, EnvError> {
        let layout = *self.encoder.layout();

        // Resolve against the ward the decision-maker observed, before
        // this tick's arrival.
        let (action, bad_code) = match Action::try_from(action_code) {
            Ok(action) => (action, None),
            Err(e) => (Action::NoOp, Some(e)),
        };
        let target = layout
            .resolve_slot(&self.world, slot)
            .filter(|p| !p.is_terminal())
            .map(|p| p.id);
        let invalid_target = target.is_none() || bad_code.is_some();
        let ctx = DecisionContext::capture(&self.world, action, invalid_target);

        let decision = Decision {
            patient: target,
            action,
        };
        let mut outcome = self.world.step(decision)?.outcome;

        if let Some(e) = bad_code {
            outcome.receipt = Receipt::rejected(decision, e);
        } else if target.is_none() && action != Action::NoOp {
            outcome.receipt = Receipt::rejected(decision, ActionError::InvalidSlot { slot });
        }

        let components = RewardComponents::measure(&self.world, &outcome, &ctx);
        let reward = components.compute(&self.config.reward);
        self.episode_return += reward;

        let terminated = self.is_done();
        let info = EpisodeInfo::from_world(&self.world);
        if terminated && self.world.current_tick().0 == self.config.max_ticks {
            log::info!(
                "episode finished: {}, return {:.2}",
                info.score,
                self.episode_return
            );
        }

        Ok(StepReport {
            reward,
            terminated,
            truncated: false,
            info,
            receipt: outcome.receipt,
            components,
        })
    }
}

impl std::fmt::Debug for IcuEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IcuEnv")
            .field("world", &self.world)
            .field("max_patients", &self.config.max_patients)
            .field("max_ticks", &self.config.max_ticks)
            .field("episode_return", &self.episode_return)
            .finish()
    }
}
