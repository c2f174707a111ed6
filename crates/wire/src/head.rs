//! Frame-head codec: the three VARLEN length modes plus the integer,
//! usertype, and boolean head layouts.
//!
//! A VARLEN head shares its first byte between the 3-bit type tag and the
//! length mode:
//!
//! - Mode 1 (`len < 16`): bit 3 clear, length in bits 4-7. One byte.
//! - Mode 2 (`len < 2048`): bits 3-4 = `01`, length bits 0-2 in bits 5-7,
//!   length bits 3-10 in the next byte. Two bytes.
//! - Mode 3: bits 3-4 = `11`, bits 5-7 = `num_bytes - 1`, then `num_bytes`
//!   little-endian length bytes.
//!
//! Readers treat bits 3-4 = `10` as Mode 1, since bit 4 is then just the
//! length's low bit. Writers pick the shortest mode except for streaming
//! container headers, which force Mode 3 with an 8-byte count so the head
//! width stays fixed and the count can be patched in place.

use crate::error::{DecodeError, DecodeResult};
use crate::input::Input;
use crate::output::Output;
use crate::tag;

/// Upper bound of any frame head: a Mode 3 head with an 8-byte length.
pub const MAX_HEAD: usize = 9;

/// Number of bytes needed to represent `x`, with zero taking one byte.
#[inline]
pub fn used_bytes(x: u64) -> usize {
    if x == 0 {
        1
    } else {
        8 - x.leading_zeros() as usize / 8
    }
}

/// Writes a VARLEN head in the shortest mode for `len`.
///
/// The caller must have reserved [`MAX_HEAD`] bytes on `out`.
pub fn write_varlen<O: Output + ?Sized>(out: &mut O, type_tag: u8, len: usize) {
    if len < 16 {
        out.put_u8(type_tag | ((len as u8) << 4));
    } else if len < 2048 {
        out.put_u8(type_tag | 0b0000_1000 | (((len & 0b111) as u8) << 5));
        out.put_u8((len >> 3) as u8);
    } else {
        write_varlen_mode3(out, type_tag, len, used_bytes(len as u64));
    }
}

/// Writes a Mode 3 VARLEN head with an explicit length-field width.
///
/// Streaming container headers use `num_bytes = 8` regardless of the
/// count's magnitude; everything else passes the minimal width.
pub fn write_varlen_mode3<O: Output + ?Sized>(
    out: &mut O,
    type_tag: u8,
    len: usize,
    num_bytes: usize,
) {
    out.put_u8(type_tag | 0b0001_1000 | (((num_bytes - 1) as u8) << 5));
    out.put(&(len as u64).to_le_bytes()[..num_bytes]);
}

/// Reads the length of a VARLEN frame whose head byte is already consumed.
pub fn read_varlen_len<I: Input + ?Sized>(input: &mut I, head: u8) -> DecodeResult<usize> {
    match (head >> 3) & 0b11 {
        // Mode 1; `10` is Mode 1 with the length's low bit set.
        0b00 | 0b10 => Ok((head >> 4) as usize),
        0b01 => {
            input.require(1)?;
            Ok(((head >> 5) as usize) | ((input.take_u8() as usize) << 3))
        }
        _ => {
            let num_bytes = ((head >> 5) as usize) + 1;
            input.require(num_bytes)?;
            let mut raw = [0u8; 8];
            raw[..num_bytes].copy_from_slice(input.take(num_bytes));
            Ok(u64::from_le_bytes(raw) as usize)
        }
    }
}

/// Writes an integer head for a payload of `nbytes` bytes, `1..=8`.
pub fn write_integer_head<O: Output + ?Sized>(out: &mut O, nbytes: usize) {
    out.put_u8(tag::INTGR | ((nbytes as u8) << 3));
}

/// Extracts the payload width from an integer head byte.
pub fn integer_width(head: u8) -> DecodeResult<usize> {
    let nbytes = head >> 3;
    if nbytes == 0 || nbytes > 8 {
        return Err(DecodeError::IntegerWidth(nbytes));
    }
    Ok(nbytes as usize)
}

/// Writes a usertype head: tag byte with the registry index in bits 3-7,
/// a length-field width byte, then the little-endian payload length.
///
/// A zero-length payload collapses to a single zero width byte.
pub fn write_utype_head<O: Output + ?Sized>(out: &mut O, idx: u8, len: usize) {
    out.put_u8(tag::UTYPE | (idx << 3));
    if len == 0 {
        out.put_u8(0);
    } else {
        let num_bytes = used_bytes(len as u64);
        out.put_u8(num_bytes as u8);
        out.put(&(len as u64).to_le_bytes()[..num_bytes]);
    }
}

/// Reads the payload length of a usertype frame whose head byte is already
/// consumed. The registry index is `head >> 3`.
pub fn read_utype_len<I: Input + ?Sized>(input: &mut I) -> DecodeResult<usize> {
    input.require(1)?;
    let num_bytes = input.take_u8();
    if num_bytes == 0 {
        return Ok(0);
    }
    if num_bytes > 8 {
        return Err(DecodeError::IntegerWidth(num_bytes));
    }
    let num_bytes = num_bytes as usize;
    input.require(num_bytes)?;
    let mut raw = [0u8; 8];
    raw[..num_bytes].copy_from_slice(input.take(num_bytes));
    Ok(u64::from_le_bytes(raw) as usize)
}

/// Writes a boolean head.
pub fn write_bool<O: Output + ?Sized>(out: &mut O, value: bool) {
    out.put_u8(tag::BOOLF | (u8::from(value) << 3));
}

/// Builds a streaming-compatible container header: the Mode-3/8 masked tag
/// byte followed by the 8-byte little-endian item count.
pub fn stream_head(container_tag: u8, count: u64) -> [u8; tag::STREAM_HEAD] {
    let mut head = [0u8; tag::STREAM_HEAD];
    head[0] = container_tag | tag::STREAM_MASK;
    head[1..].copy_from_slice(&count.to_le_bytes());
    head
}

#[cfg(test)]
mod tests;
