//! Batched environments for vectorized training.
//!
//! [`BatchedEnv`] owns N fully independent [`IcuEnv`]s and steps them
//! all in one call, writing observations into a single contiguous
//! buffer. Each environment has its own pools and its own RNG stream.
//! Episodes are not auto-reset; callers reset individual environments
//! when they report `terminated`.

use simicu_core::{TickId, WardSnapshot};

use crate::config::{ConfigError, EnvConfig};
use crate::env::{EnvError, EpisodeInfo, IcuEnv, StepReport};

// ── Error type ──────────────────────────────────────────────────

/// Error from a batched operation, annotated with the failing index.
#[derive(Debug, PartialEq)]
pub enum BatchError {
    /// An environment's step or reset failed.
    Env {
        /// Index of the environment that failed (0-based).
        env_index: usize,
        /// The underlying error.
        error: EnvError,
    },
    /// Configuration error during construction.
    Config {
        /// Index of the offending config.
        env_index: usize,
        /// The underlying error.
        error: ConfigError,
    },
    /// Environment index out of bounds.
    InvalidIndex {
        /// The requested index.
        env_index: usize,
        /// Total number of environments.
        num_envs: usize,
    },
    /// Batch-level argument validation failed.
    InvalidArgument {
        /// Human-readable description of what's wrong.
        reason: String,
    },
}

impl std::fmt::Display for BatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchError::Env { env_index, error } => write!(f, "env {env_index}: {error}"),
            BatchError::Config { env_index, error } => {
                write!(f, "env {env_index}: config error: {error}")
            }
            BatchError::InvalidIndex {
                env_index,
                num_envs,
            } => write!(
                f,
                "env index {env_index} out of range (num_envs={num_envs})"
            ),
            BatchError::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
        }
    }
}

impl std::error::Error for BatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BatchError::Env { error, .. } => Some(error),
            BatchError::Config { error, .. } => Some(error),
            _ => None,
        }
    }
}

// ── BatchedEnv ──────────────────────────────────────────────────

/// N independent environments stepped together.
///
/// All environments must produce observations of the same length
/// (validated at construction).
pub struct BatchedEnv {
    envs: Vec<IcuEnv>,
    obs_len: usize,
}

impl BatchedEnv {
    /// Create one environment per config.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::Config`] if any config is invalid, or
    /// [`BatchError::InvalidArgument`] if `configs` is empty or the
    /// observation lengths differ.
    pub fn new(configs: Vec<EnvConfig>) -> Result<Self, BatchError> {
        if configs.is_empty() {
            return Err(BatchError::InvalidArgument {
                reason: "BatchedEnv requires at least one env config".into(),
            });
        }
        let envs = configs
            .into_iter()
            .enumerate()
            .map(|(env_index, cfg)| {
                IcuEnv::new(cfg).map_err(|error| BatchError::Config { env_index, error })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let obs_len = envs[0].observation_len();
        if let Some((i, env)) = envs
            .iter()
            .enumerate()
            .find(|(_, e)| e.observation_len() != obs_len)
        {
            return Err(BatchError::InvalidArgument {
                reason: format!(
                    "env {i} observation length {} differs from env 0 length {obs_len}",
                    env.observation_len()
                ),
            });
        }
        Ok(Self { envs, obs_len })
    }

    /// `n` copies of `config`, seeded `base_seed, base_seed + 1, ...`.
    pub fn replicated(config: &EnvConfig, n: usize, base_seed: u64) -> Result<Self, BatchError> {
        let configs = (0..n as u64)
            .map(|i| {
                let mut cfg = config.clone();
                cfg.icu.seed = base_seed.wrapping_add(i);
                cfg
            })
            .collect();
        Self::new(configs)
    }

    /// Step every environment and write observations into `output`.
    ///
    /// `actions` holds one `(slot, action code)` per environment.
    /// `output` must have exactly `num_envs() * obs_len()` elements.
    /// Both are checked before any environment is stepped.
    pub fn step(
        &mut self,
        actions: &[(usize, u8)],
        output: &mut [f32],
    ) -> Result<Vec<StepReport>, BatchError> {
        let n = self.envs.len();
        if actions.len() != n {
            return Err(BatchError::InvalidArgument {
                reason: format!("actions has {} entries, expected {n}", actions.len()),
            });
        }
        self.validate_output(output)?;

        let mut reports = Vec::with_capacity(n);
        for (env_index, ((env, &(slot, code)), obs)) in self
            .envs
            .iter_mut()
            .zip(actions)
            .zip(output.chunks_exact_mut(self.obs_len))
            .enumerate()
        {
            let report = env
                .step_into(slot, code, obs)
                .map_err(|error| BatchError::Env { env_index, error })?;
            reports.push(report);
        }
        Ok(reports)
    }

    /// Write every environment's current observation into `output`.
    pub fn observe_all(&self, output: &mut [f32]) -> Result<(), BatchError> {
        self.validate_output(output)?;
        for (env, obs) in self.envs.iter().zip(output.chunks_exact_mut(self.obs_len)) {
            obs.copy_from_slice(&env.observe());
        }
        Ok(())
    }

    /// Reset a single environment and return its first observation.
    pub fn reset_env(
        &mut self,
        idx: usize,
        seed: u64,
    ) -> Result<(Vec<f32>, EpisodeInfo), BatchError> {
        let num_envs = self.envs.len();
        let env = self.envs.get_mut(idx).ok_or(BatchError::InvalidIndex {
            env_index: idx,
            num_envs,
        })?;
        env.reset(seed).map_err(|error| BatchError::Env {
            env_index: idx,
            error,
        })
    }

    /// Reset every environment with per-environment seeds and write the
    /// first observations into `output`.
    pub fn reset_all(
        &mut self,
        seeds: &[u64],
        output: &mut [f32],
    ) -> Result<Vec<EpisodeInfo>, BatchError> {
        let n = self.envs.len();
        if seeds.len() != n {
            return Err(BatchError::InvalidArgument {
                reason: format!("seeds has {} entries, expected {n}", seeds.len()),
            });
        }
        self.validate_output(output)?;
        let mut infos = Vec::with_capacity(n);
        for (env_index, ((env, &seed), obs)) in self
            .envs
            .iter_mut()
            .zip(seeds)
            .zip(output.chunks_exact_mut(self.obs_len))
            .enumerate()
        {
            let info = env
                .reset_into(seed, obs)
                .map_err(|error| BatchError::Env { env_index, error })?;
            infos.push(info);
        }
        Ok(infos)
    }

    /// Number of environments in the batch.
    pub fn num_envs(&self) -> usize {
        self.envs.len()
    }

    /// Per-environment observation length.
    pub fn obs_len(&self) -> usize {
        self.obs_len
    }

    /// Current tick of a specific environment.
    pub fn env_tick(&self, idx: usize) -> Option<TickId> {
        self.envs.get(idx).map(|e| e.world().tick_id())
    }

    /// Read-only access to one environment.
    pub fn env(&self, idx: usize) -> Option<&IcuEnv> {
        self.envs.get(idx)
    }

    fn validate_output(&self, output: &[f32]) -> Result<(), BatchError> {
        let expected = self.envs.len() * self.obs_len;
        if output.len() != expected {
            return Err(BatchError::InvalidArgument {
                reason: format!("output buffer has {} elements, expected {expected}", output.len()),
            });
        }
        Ok(())
    }
}
