//! Error types for the replay system.

use std::fmt;
use std::io;

/// Errors that can occur during replay recording, playback, or comparison.
#[derive(Debug)]
pub enum ReplayError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The stream does not start with the expected `b"SICU"` magic bytes.
    InvalidMagic,
    /// The format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the stream.
        found: u8,
    },
    /// A frame could not be decoded (truncated or corrupt data).
    MalformedFrame {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// A recorded action code is not a known action.
    UnknownAction {
        /// The unrecognized code.
        code: u8,
    },
    /// The replay was recorded with a different configuration hash.
    ConfigMismatch {
        /// Hash from the replay header.
        recorded: u64,
        /// Hash computed from the current configuration.
        current: u64,
    },
    /// The world being driven failed to step.
    Step {
        /// The tick at which stepping failed.
        tick_id: u64,
        /// Description of the underlying failure.
        detail: String,
    },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidMagic => write!(f, "invalid magic bytes (expected b\"SICU\")"),
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported format version {found}")
            }
            Self::MalformedFrame { detail } => write!(f, "malformed frame: {detail}"),
            Self::UnknownAction { code } => write!(f, "unknown action code {code}"),
            Self::ConfigMismatch { recorded, current } => {
                write!(
                    f,
                    "config hash mismatch: recorded={recorded:#018x}, current={current:#018x}"
                )
            }
            Self::Step { tick_id, detail } => {
                write!(f, "step failed at tick {tick_id}: {detail}")
            }
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ReplayError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
