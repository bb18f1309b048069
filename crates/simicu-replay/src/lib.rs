//! Deterministic replay and decision logging for SimICU episodes.
//!
//! Records the decision applied at every tick together with a hash of the
//! resulting ward, so an episode can be re-driven through a fresh world
//! and checked tick by tick.
//!
//! # Architecture
//!
//! - [`ReplayWriter`] records frames to any `Write` sink
//! - [`ReplayReader`] plays back frames from any `Read` source
//! - [`compare_wards`] and [`replay_and_compare`] verify determinism
//!
//! # Format
//!
//! ```text
//! [MAGIC "SICU"] [VERSION u8] [BuildMetadata] [InitDescriptor]
//! [Frame 1] [Frame 2] ... [Frame N]
//! ```
//!
//! Each frame holds the tick, the decision applied during it, and an
//! FNV-1a hash of the post-tick ward.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod compare;
pub mod error;
pub mod hash;
pub mod reader;
pub mod types;
pub mod writer;

pub use compare::{compare_wards, replay_and_compare, DivergenceReport, WardDivergence};
pub use error::ReplayError;
pub use hash::{config_hash, ward_hash};
pub use reader::{FrameIter, ReplayReader};
pub use types::{BuildMetadata, Frame, InitDescriptor};
pub use writer::ReplayWriter;

/// Magic bytes at the start of every replay file.
pub const MAGIC: [u8; 4] = *b"SICU";

/// Current binary format version.
pub const FORMAT_VERSION: u8 = 1;
