//! Data types for replay recording and playback.

use simicu_core::Decision;

/// Build environment metadata stored in the replay header.
///
/// Lets a reader notice recordings made by a different toolchain or
/// profile, which can change floating-point results.
///
/// # Examples
///
/// ```
/// use simicu_replay::BuildMetadata;
///
/// let meta = BuildMetadata {
///     toolchain: "1.87.0".into(),
///     target_triple: "x86_64-unknown-linux-gnu".into(),
///     simicu_version: "0.1.0".into(),
///     compile_flags: "release".into(),
/// };
///
/// assert_eq!(meta.simicu_version, "0.1.0");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildMetadata {
    /// Rust toolchain version (e.g. `"1.87.0"`).
    pub toolchain: String,
    /// Compilation target triple.
    pub target_triple: String,
    /// SimICU crate version.
    pub simicu_version: String,
    /// Compilation flags or profile (e.g. `"release"`).
    pub compile_flags: String,
}

/// Episode initialization parameters stored in the replay header.
///
/// Enough to rebuild an identical world: the seed, a hash of the full
/// configuration, and the pool sizes for a quick human-readable check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitDescriptor {
    /// Seed of the arrival process.
    pub seed: u64,
    /// Hash of the ward configuration (see [`config_hash`](crate::config_hash)).
    pub config_hash: u64,
    /// Pool capacities as `[nurses, beds, ventilators]`.
    pub pool_sizes: [u32; 3],
}

/// A single tick's worth of recorded data.
///
/// # Examples
///
/// ```
/// use simicu_core::Decision;
/// use simicu_replay::Frame;
///
/// let frame = Frame {
///     tick_id: 1,
///     decision: Decision::idle(),
///     ward_hash: 0,
/// };
///
/// assert_eq!(frame.tick_id, 1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    /// The tick counter after the step (1 for the first step).
    pub tick_id: u64,
    /// The decision applied during the step.
    pub decision: Decision,
    /// FNV-1a hash of the post-tick ward.
    pub ward_hash: u64,
}
