//! Binary encode/decode for the replay format.
//!
//! All integers are little-endian. Strings are length-prefixed with a
//! `u32` length of at most [`MAX_STRING_LEN`] bytes. Optional values
//! carry a one-byte presence flag.

use std::io::{Read, Write};

use simicu_core::{Action, Decision, PatientId};

use crate::error::ReplayError;
use crate::types::{BuildMetadata, Frame, InitDescriptor};
use crate::{FORMAT_VERSION, MAGIC};

/// Longest string the header may carry.
pub const MAX_STRING_LEN: usize = 64 * 1024;

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), ReplayError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), ReplayError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian u64.
pub fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), ReplayError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a length-prefixed UTF-8 string (u32 length + bytes).
pub fn write_length_prefixed_str(w: &mut dyn Write, s: &str) -> Result<(), ReplayError> {
    if s.len() > MAX_STRING_LEN {
        return Err(ReplayError::MalformedFrame {
            detail: format!("string of {} bytes exceeds {MAX_STRING_LEN}", s.len()),
        });
    }
    write_u32_le(w, s.len() as u32)?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> Result<u8, ReplayError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a little-endian u32.
pub fn read_u32_le(r: &mut dyn Read) -> Result<u32, ReplayError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a little-endian u64.
pub fn read_u64_le(r: &mut dyn Read) -> Result<u64, ReplayError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Read a length-prefixed UTF-8 string.
pub fn read_length_prefixed_str(r: &mut dyn Read) -> Result<String, ReplayError> {
    let len = read_u32_le(r)? as usize;
    if len > MAX_STRING_LEN {
        return Err(ReplayError::MalformedFrame {
            detail: format!("string length {len} exceeds {MAX_STRING_LEN}"),
        });
    }
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| ReplayError::MalformedFrame {
        detail: format!("invalid UTF-8 string: {e}"),
    })
}

// ── Header encode/decode ────────────────────────────────────────

/// Encode the replay header (magic, version, build metadata, init descriptor).
pub fn encode_header(
    w: &mut dyn Write,
    meta: &BuildMetadata,
    init: &InitDescriptor,
) -> Result<(), ReplayError> {
    w.write_all(&MAGIC)?;
    write_u8(w, FORMAT_VERSION)?;

    write_length_prefixed_str(w, &meta.toolchain)?;
    write_length_prefixed_str(w, &meta.target_triple)?;
    write_length_prefixed_str(w, &meta.simicu_version)?;
    write_length_prefixed_str(w, &meta.compile_flags)?;

    write_u64_le(w, init.seed)?;
    write_u64_le(w, init.config_hash)?;
    for size in init.pool_sizes {
        write_u32_le(w, size)?;
    }
    Ok(())
}

/// Decode and validate the replay header.
pub fn decode_header(r: &mut dyn Read) -> Result<(BuildMetadata, InitDescriptor), ReplayError> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(ReplayError::InvalidMagic);
    }

    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(ReplayError::UnsupportedVersion { found: version });
    }

    let meta = BuildMetadata {
        toolchain: read_length_prefixed_str(r)?,
        target_triple: read_length_prefixed_str(r)?,
        simicu_version: read_length_prefixed_str(r)?,
        compile_flags: read_length_prefixed_str(r)?,
    };

    let seed = read_u64_le(r)?;
    let config_hash = read_u64_le(r)?;
    let mut pool_sizes = [0u32; 3];
    for size in &mut pool_sizes {
        *size = read_u32_le(r)?;
    }

    Ok((
        meta,
        InitDescriptor {
            seed,
            config_hash,
            pool_sizes,
        },
    ))
}

// ── Decision encode/decode ──────────────────────────────────────

/// Encode a decision: action code, then presence flag and patient id.
pub fn encode_decision(w: &mut dyn Write, decision: &Decision) -> Result<(), ReplayError> {
    write_u8(w, decision.action.code())?;
    match decision.patient {
        Some(PatientId(id)) => {
            write_u8(w, 1)?;
            write_u64_le(w, id)?;
        }
        None => write_u8(w, 0)?,
    }
    Ok(())
}

/// Decode a decision written by [`encode_decision`].
pub fn decode_decision(r: &mut dyn Read) -> Result<Decision, ReplayError> {
    let code = read_u8(r)?;
    let action = Action::try_from(code).map_err(|_| ReplayError::UnknownAction { code })?;
    let patient = match read_u8(r)? {
        0 => None,
        1 => Some(PatientId(read_u64_le(r)?)),
        flag => {
            return Err(ReplayError::MalformedFrame {
                detail: format!("invalid patient presence flag {flag}"),
            })
        }
    };
    Ok(Decision { patient, action })
}

// ── Frame encode/decode ─────────────────────────────────────────

/// Encode a single replay frame.
pub fn encode_frame(w: &mut dyn Write, frame: &Frame) -> Result<(), ReplayError> {
    write_u64_le(w, frame.tick_id)?;
    encode_decision(w, &frame.decision)?;
    write_u64_le(w, frame.ward_hash)?;
    Ok(())
}

/// Decode a single replay frame.
///
/// Returns `Ok(None)` on clean EOF (no bytes available), `Ok(Some(frame))`
/// on success, or an error on truncated or corrupt data.
pub fn decode_frame(r: &mut dyn Read) -> Result<Option<Frame>, ReplayError> {
    // Clean EOF is zero bytes of tick header; anything in 1..8 is truncation.
    let mut tick_buf = [0u8; 8];
    let mut filled = 0;
    while filled < 8 {
        match r.read(&mut tick_buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => {
                return Err(ReplayError::MalformedFrame {
                    detail: format!("truncated frame header: got {filled} of 8 bytes for tick_id"),
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ReplayError::Io(e)),
        }
    }
    let tick_id = u64::from_le_bytes(tick_buf);

    match decode_frame_body(r, tick_id) {
        Ok(frame) => Ok(Some(frame)),
        Err(ReplayError::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Err(ReplayError::MalformedFrame {
                detail: format!("truncated frame body at tick {tick_id}"),
            })
        }
        Err(e) => Err(e),
    }
}

fn decode_frame_body(r: &mut dyn Read, tick_id: u64) -> Result<Frame, ReplayError> {
    let decision = decode_decision(r)?;
    let ward_hash = read_u64_le(r)?;
    Ok(Frame {
        tick_id,
        decision,
        ward_hash,
    })
}
