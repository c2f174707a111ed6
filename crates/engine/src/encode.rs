//! The recursive value encoder.
//!
//! [`encode_value`] writes one complete frame for any [`Value`] into any
//! `wire` sink, recursing through containers depth-first in order. The
//! one-shot driver and the streaming encoder both call it; only the
//! handling of the outermost container header differs between them.

use wire::head;
use wire::tag;
use wire::Output;

use crate::error::{EncodeError, EncodeResult};
use crate::usertypes::UserTypeEncoders;
use crate::value::Value;

/// Smallest signed byte width that round-trips `v`, in `1..=8`.
pub(crate) fn int_width(v: i64) -> usize {
    let mut nbytes = 1;
    while nbytes < 8 {
        let shift = (64 - 8 * nbytes) as u32;
        if (v << shift) >> shift == v {
            break;
        }
        nbytes += 1;
    }
    nbytes
}

/// Encodes one value as a complete frame.
///
/// Containers recurse; map pairs are written key-then-value in the map's
/// own order. Custom values are resolved through `utypes`; without a
/// matching encoder the value kind is unsupported.
pub fn encode_value<O: Output + ?Sized>(
    out: &mut O,
    value: &Value,
    utypes: Option<&UserTypeEncoders>,
) -> EncodeResult<()> {
    match value {
        Value::Null => {
            out.ensure(1)?;
            out.put_u8(tag::NONTP);
        }
        Value::Bool(v) => {
            out.ensure(1)?;
            head::write_bool(out, *v);
        }
        Value::Int(v) => {
            let nbytes = int_width(*v);
            out.ensure(1 + nbytes)?;
            head::write_integer_head(out, nbytes);
            out.put(&v.to_le_bytes()[..nbytes]);
        }
        Value::Float(v) => {
            out.ensure(9)?;
            out.put_u8(tag::FLOAT);
            out.put(&v.to_le_bytes());
        }
        Value::Str(v) => {
            let payload = v.as_bytes();
            out.ensure(head::MAX_HEAD + payload.len())?;
            head::write_varlen(out, tag::STRNG, payload.len());
            out.put(payload);
        }
        Value::Bytes(v) => {
            let payload = v.as_slice();
            out.ensure(head::MAX_HEAD + payload.len())?;
            head::write_varlen(out, tag::BYTES, payload.len());
            out.put(payload);
        }
        Value::List(items) => {
            out.ensure(head::MAX_HEAD)?;
            head::write_varlen(out, tag::ARRAY, items.len());
            for item in items {
                encode_value(out, item, utypes)?;
            }
        }
        Value::Map(pairs) => {
            out.ensure(head::MAX_HEAD)?;
            head::write_varlen(out, tag::DICTN, pairs.len());
            for (key, val) in pairs {
                encode_value(out, key, utypes)?;
                encode_value(out, val, utypes)?;
            }
        }
        Value::Custom(custom) => {
            let found = utypes.and_then(|registry| registry.encode_for(custom));
            let Some((idx, encoded)) = found else {
                return Err(EncodeError::UnsupportedType(custom.type_name()));
            };
            let payload = encoded.map_err(|err| EncodeError::Custom(err.to_string()))?;
            out.ensure(head::MAX_HEAD + payload.len())?;
            head::write_utype_head(out, idx, payload.len());
            out.put(&payload);
        }
    }
    Ok(())
}
