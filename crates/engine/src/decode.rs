//! The recursive value decoder.
//!
//! [`decode_value`] reads one complete frame from any `wire` source. The
//! head byte's low five bits pick the case, which lets every VARLEN tag
//! accept all three length-mode suffixes; the integer and usertype cases
//! then read their extra head bits from the full byte. Whether string and
//! byte payloads are copied or shared is the source's choice
//! ([`wire::Input::take_shared`]), so the referenced decode mode needs no
//! separate code path here.

use wire::head;
use wire::tag;
use wire::Input;

use crate::error::{DecodeError, DecodeResult};
use crate::usertypes::UserTypeDecoders;
use crate::value::{RawBytes, Utf8Bytes, Value};

/// Decodes one complete frame into a [`Value`].
///
/// Any overread, malformed length, unknown tag, or failing child surfaces
/// as an error; partially built containers are dropped.
pub fn decode_value<I: Input + ?Sized>(
    input: &mut I,
    utypes: Option<&UserTypeDecoders>,
) -> DecodeResult<Value> {
    input.require(1)?;
    let byte = input.take_u8();

    match tag::tag3(byte) {
        tag::ARRAY => {
            let num_items = head::read_varlen_len(input, byte)?;
            let mut items = Vec::new();
            for _ in 0..num_items {
                items.push(decode_value(input, utypes)?);
            }
            Ok(Value::List(items))
        }
        tag::DICTN => {
            let num_pairs = head::read_varlen_len(input, byte)?;
            let mut pairs = Vec::new();
            for _ in 0..num_pairs {
                let key = decode_value(input, utypes)?;
                let val = decode_value(input, utypes)?;
                pairs.push((key, val));
            }
            Ok(Value::Map(pairs))
        }
        tag::BYTES => {
            let len = head::read_varlen_len(input, byte)?;
            let payload = input.take_shared(len)?;
            Ok(Value::Bytes(RawBytes::from(payload)))
        }
        tag::STRNG => {
            let len = head::read_varlen_len(input, byte)?;
            let payload = input.take_shared(len)?;
            let text = Utf8Bytes::from_utf8(payload).map_err(DecodeError::InvalidUtf8)?;
            Ok(Value::Str(text))
        }
        tag::INTGR => {
            let nbytes = head::integer_width(byte)?;
            input.require(nbytes)?;
            let mut raw = [0u8; 8];
            raw[..nbytes].copy_from_slice(input.take(nbytes));
            let shift = (64 - 8 * nbytes) as u32;
            // Shift up then arithmetic-shift down to sign-extend.
            let value = (i64::from_le_bytes(raw) << shift) >> shift;
            Ok(Value::Int(value))
        }
        tag::UTYPE => {
            let idx = byte >> 3;
            let len = head::read_utype_len(input)?;
            let payload = input.take_shared(len)?;
            let decoded = utypes
                .and_then(|registry| registry.decode_at(idx, &payload))
                .ok_or(DecodeError::UnknownUserType(idx))?;
            decoded.map_err(|err| DecodeError::Custom(err.to_string()))
        }
        _ => match tag::tag5(byte) {
            tag::FLOAT => {
                input.require(8)?;
                let mut raw = [0u8; 8];
                raw.copy_from_slice(input.take(8));
                Ok(Value::Float(f64::from_le_bytes(raw)))
            }
            tag::BOOLT => Ok(Value::Bool(true)),
            tag::BOOLF => Ok(Value::Bool(false)),
            tag::NONTP => Ok(Value::Null),
            _ => Err(wire::DecodeError::UnknownTag(byte).into()),
        },
    }
}
