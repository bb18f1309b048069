//! Replay recording writer.
//!
//! [`ReplayWriter`] streams frames to any `Write` sink. The header is
//! written immediately on construction.

use std::io::Write;

use simicu_core::{Decision, WardSnapshot};

use crate::codec::{encode_frame, encode_header};
use crate::error::ReplayError;
use crate::hash::ward_hash;
use crate::types::{BuildMetadata, Frame, InitDescriptor};

/// Writes replay data to a byte stream.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production
/// code can use `BufWriter<File>`.
///
/// # Examples
///
/// ```
/// use simicu_core::Decision;
/// use simicu_replay::{BuildMetadata, Frame, InitDescriptor, ReplayReader, ReplayWriter};
///
/// let meta = BuildMetadata {
///     toolchain: "test".into(),
///     target_triple: "test".into(),
///     simicu_version: "0.1.0".into(),
///     compile_flags: "test".into(),
/// };
/// let init = InitDescriptor { seed: 42, config_hash: 0, pool_sizes: [6, 10, 4] };
///
/// let mut buf = Vec::new();
/// let mut writer = ReplayWriter::new(&mut buf, &meta, &init).unwrap();
/// for tick in 1..=2u64 {
///     let frame = Frame { tick_id: tick, decision: Decision::idle(), ward_hash: tick };
///     writer.write_raw_frame(&frame).unwrap();
/// }
/// assert_eq!(writer.frames_written(), 2);
/// drop(writer);
///
/// let mut reader = ReplayReader::open(buf.as_slice()).unwrap();
/// assert_eq!(reader.init_descriptor(), &init);
/// assert_eq!(reader.next_frame().unwrap().unwrap().tick_id, 1);
/// assert_eq!(reader.next_frame().unwrap().unwrap().tick_id, 2);
/// assert!(reader.next_frame().unwrap().is_none());
/// ```
pub struct ReplayWriter<W: Write> {
    writer: W,
    frames_written: u64,
}

impl<W: Write> ReplayWriter<W> {
    /// Create a new replay writer, immediately writing the header.
    pub fn new(
        mut writer: W,
        metadata: &BuildMetadata,
        init: &InitDescriptor,
    ) -> Result<Self, ReplayError> {
        encode_header(&mut writer, metadata, init)?;
        Ok(Self {
            writer,
            frames_written: 0,
        })
    }

    /// Record a frame: hash the post-tick ward and write it with the
    /// decision that produced it.
    pub fn write_frame(
        &mut self,
        decision: Decision,
        ward: &dyn WardSnapshot,
    ) -> Result<(), ReplayError> {
        let frame = Frame {
            tick_id: ward.tick_id().0,
            decision,
            ward_hash: ward_hash(ward),
        };
        self.write_raw_frame(&frame)
    }

    /// Write a pre-built frame directly.
    pub fn write_raw_frame(&mut self, frame: &Frame) -> Result<(), ReplayError> {
        encode_frame(&mut self.writer, frame)?;
        self.frames_written += 1;
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), ReplayError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Consume the writer and return the underlying sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
