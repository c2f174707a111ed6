//! One-shot encode and decode entry points.
//!
//! These drive the recursive codec over in-memory buffers or whole files.
//! Top-level containers get their initial buffer sized by the allocation
//! governor and feed the outcome back to it on success; the
//! `stream_compatible` option forces the fixed-width Mode-3/8 outer header
//! so a streaming session can later append to the same file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;

use wire::head;
use wire::tag;
use wire::{GrowBuf, Output, SliceReader};

use crate::alloc;
use crate::decode::decode_value;
use crate::encode::encode_value;
use crate::error::{DecodeError, DecodeResult, EncodeResult};
use crate::usertypes::{UserTypeDecoders, UserTypeEncoders};
use crate::value::Value;

/// Options of the one-shot encoder.
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    /// Write the encoding to this path instead of returning bytes.
    pub file_name: Option<PathBuf>,
    /// Usertype encoders for [`Value::Custom`] values.
    pub custom_types: Option<Arc<UserTypeEncoders>>,
    /// Force the streaming-compatible outer header on a top-level
    /// container, so a streaming session can append to the output later.
    pub stream_compatible: bool,
}

/// Options of the one-shot decoder.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// Usertype decoders for usertype frames.
    pub custom_types: Option<Arc<UserTypeDecoders>>,
    /// Hand out zero-copy views of string and byte payloads that share
    /// the input buffer instead of copying them.
    pub referenced: bool,
}

/// The input of [`decode_with`].
#[derive(Debug, Clone)]
pub enum DecodeInput {
    /// Decode from in-memory bytes.
    Bytes(Bytes),
    /// Decode from a file's full contents.
    File(PathBuf),
}

/// Encodes a value into bytes.
pub fn encode(value: &Value) -> EncodeResult<Vec<u8>> {
    encode_root(value, None, false)
}

/// Encodes a value with explicit options.
///
/// Returns `None` when the encoding was written to `file_name`.
pub fn encode_with(value: &Value, opts: &EncodeOptions) -> EncodeResult<Option<Vec<u8>>> {
    let encoded = encode_root(value, opts.custom_types.as_deref(), opts.stream_compatible)?;

    match &opts.file_name {
        Some(path) => {
            let mut file = fs::File::create(path)?;
            file.write_all(&encoded)?;
            debug!(path = %path.display(), bytes = encoded.len(), "encoded value to file");
            Ok(None)
        }
        None => Ok(Some(encoded)),
    }
}

fn encode_root(
    value: &Value,
    utypes: Option<&UserTypeEncoders>,
    stream_compatible: bool,
) -> EncodeResult<Vec<u8>> {
    let governor = alloc::governor();
    let (avg_item, avg_realloc) = governor.estimates();

    let (container_tag, count, children) = match value {
        Value::List(items) => (tag::ARRAY, items.len(), items.len()),
        Value::Map(pairs) => (tag::DICTN, pairs.len(), pairs.len() * 2),
        other => {
            // Not a container: a single self-describing frame, sized on
            // demand. The governor only tracks container encodes.
            let mut out = GrowBuf::with_capacity(0, avg_realloc)?;
            encode_value(&mut out, other, utypes)?;
            return Ok(out.into_bytes());
        }
    };

    let initial = children * avg_item + avg_realloc;
    let mut out = GrowBuf::with_capacity(initial, avg_realloc)?;

    out.ensure(head::MAX_HEAD)?;
    if stream_compatible {
        head::write_varlen_mode3(&mut out, container_tag, count, 8);
    } else {
        head::write_varlen(&mut out, container_tag, count);
    }

    match value {
        Value::List(items) => {
            for item in items {
                encode_value(&mut out, item, utypes)?;
            }
        }
        Value::Map(pairs) => {
            for (key, val) in pairs {
                encode_value(&mut out, key, utypes)?;
                encode_value(&mut out, val, utypes)?;
            }
        }
        _ => {}
    }

    governor.update(out.reallocs(), out.len(), initial, children);
    Ok(out.into_bytes())
}

/// Decodes one value from bytes.
pub fn decode(encoded: impl Into<Bytes>) -> DecodeResult<Value> {
    decode_with(DecodeInput::Bytes(encoded.into()), &DecodeOptions::default())
}

/// Decodes one value from a file's contents.
pub fn decode_file(path: impl AsRef<Path>) -> DecodeResult<Value> {
    decode_with(
        DecodeInput::File(path.as_ref().to_path_buf()),
        &DecodeOptions::default(),
    )
}

/// Decodes one value with explicit options.
///
/// With `referenced` set, string and byte results are views sharing the
/// input buffer (the caller's bytes, or the one file-sized allocation in
/// file mode) and keep it alive until the last view drops.
pub fn decode_with(input: DecodeInput, opts: &DecodeOptions) -> DecodeResult<Value> {
    let data = match input {
        DecodeInput::Bytes(bytes) => bytes,
        DecodeInput::File(path) => {
            let contents = fs::read(&path)?;
            debug!(path = %path.display(), bytes = contents.len(), "read encoded file");
            Bytes::from(contents)
        }
    };

    if data.is_empty() {
        return Err(DecodeError::EmptyInput);
    }

    let mut reader = SliceReader::new(data, opts.referenced);
    decode_value(&mut reader, opts.custom_types.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::CustomValue;

    fn round_trip(value: &Value) -> Value {
        decode(encode(value).expect("encodes")).expect("decodes")
    }

    #[test]
    fn round_trips_cover_the_palette() {
        for value in [
            Value::Null,
            Value::Bool(true),
            Value::Int(-42),
            Value::Float(2.5),
            Value::from("snail mail"),
            Value::from(vec![0u8, 255, 3]),
            Value::List(vec![Value::Int(1), Value::from("two"), Value::Null]),
            Value::Map(vec![
                (Value::from("k"), Value::List(vec![Value::Bool(false)])),
                (Value::Int(9), Value::from(vec![1u8])),
            ]),
        ] {
            assert_eq!(round_trip(&value), value);
        }
    }

    #[test]
    fn extreme_integers_round_trip() {
        assert_eq!(round_trip(&Value::Int(i64::MIN)), Value::Int(i64::MIN));
        assert_eq!(round_trip(&Value::Int(i64::MAX)), Value::Int(i64::MAX));
    }

    #[test]
    fn empty_input_is_a_distinct_error() {
        assert!(matches!(
            decode(Bytes::new()),
            Err(DecodeError::EmptyInput)
        ));
    }

    #[test]
    fn stream_compatible_forces_the_wide_header() {
        let value = Value::List(vec![Value::Int(1)]);
        let opts = EncodeOptions {
            stream_compatible: true,
            ..EncodeOptions::default()
        };
        let bytes = encode_with(&value, &opts)
            .expect("encodes")
            .expect("no file output");

        assert_eq!(bytes[0], tag::ARRAY | tag::STREAM_MASK);
        assert_eq!(bytes.len(), 9 + 2);
        // Still a valid regular encoding.
        assert_eq!(decode(bytes).expect("decodes"), value);
    }

    #[test]
    fn stream_compatible_leaves_non_containers_alone() {
        let opts = EncodeOptions {
            stream_compatible: true,
            ..EncodeOptions::default()
        };
        let bytes = encode_with(&Value::Int(3), &opts)
            .expect("encodes")
            .expect("no file output");
        assert_eq!(bytes, vec![0x0C, 0x03]);
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join("value.cpqt");
        let value = Value::Map(vec![(Value::from("n"), Value::Int(7))]);

        let opts = EncodeOptions {
            file_name: Some(path.clone()),
            ..EncodeOptions::default()
        };
        assert!(encode_with(&value, &opts).expect("encodes").is_none());
        assert_eq!(decode_file(&path).expect("decodes"), value);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = decode_file("/nonexistent/compaqt.bin").expect_err("must fail");
        assert!(matches!(err, DecodeError::Io(_)));
    }

    #[test]
    fn referenced_views_share_the_input_buffer() {
        let bytes = Bytes::from(encode(&Value::from("borrowed text")).expect("encodes"));
        let opts = DecodeOptions {
            referenced: true,
            ..DecodeOptions::default()
        };
        let decoded = decode_with(DecodeInput::Bytes(bytes.clone()), &opts).expect("decodes");

        let Value::Str(view) = decoded else {
            panic!("expected a string");
        };
        // The view points into the encoded buffer (payload starts after
        // the one-byte Mode 1 head).
        let offset = view.as_bytes().as_ptr() as usize - bytes.as_ptr() as usize;
        assert_eq!(offset, 1);
    }

    #[test]
    fn referenced_views_outlive_the_input_handle() {
        let bytes = Bytes::from(encode(&Value::from(vec![9u8; 32])).expect("encodes"));
        let opts = DecodeOptions {
            referenced: true,
            ..DecodeOptions::default()
        };
        let decoded = decode_with(DecodeInput::Bytes(bytes), &opts).expect("decodes");
        // The caller's handle is gone; the view still reads its bytes.
        assert_eq!(decoded.as_bytes().expect("bytes value"), &[9u8; 32][..]);
    }

    #[test]
    fn usertype_round_trip_through_registries() {
        #[derive(Debug, PartialEq)]
        struct Celsius(f32);

        let mut encoders = UserTypeEncoders::new();
        encoders
            .register::<Celsius, _>(4, |c| Ok(c.0.to_le_bytes().to_vec()))
            .expect("registers encoder");

        let mut decoders = UserTypeDecoders::new();
        decoders
            .register(4, |bytes| {
                let raw: [u8; 4] = bytes.try_into()?;
                Ok(Value::Custom(CustomValue::new(Celsius(
                    f32::from_le_bytes(raw),
                ))))
            })
            .expect("registers decoder");

        let value = Value::Custom(CustomValue::new(Celsius(21.5)));
        let encode_opts = EncodeOptions {
            custom_types: Some(Arc::new(encoders)),
            ..EncodeOptions::default()
        };
        let bytes = encode_with(&value, &encode_opts)
            .expect("encodes")
            .expect("no file output");

        // Head byte carries the index, second byte the length width.
        assert_eq!(bytes[0], tag::UTYPE | (4 << 3));
        assert_eq!(bytes[1], 1);
        assert_eq!(bytes[2], 4);

        let decode_opts = DecodeOptions {
            custom_types: Some(Arc::new(decoders)),
            ..DecodeOptions::default()
        };
        let decoded =
            decode_with(DecodeInput::Bytes(bytes.into()), &decode_opts).expect("decodes");
        let Value::Custom(custom) = decoded else {
            panic!("expected a custom value");
        };
        assert_eq!(custom.downcast_ref::<Celsius>(), Some(&Celsius(21.5)));
    }
}
