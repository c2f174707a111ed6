//! Property tests over the full value palette.

use compaqt::{decode, encode, validate, Value};
use proptest::collection::vec;
use proptest::prelude::*;

/// Strategy over arbitrary values, a few levels deep.
fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        // Finite floats only; NaN never compares equal to itself.
        prop::num::f64::NORMAL.prop_map(Value::Float),
        ".{0,40}".prop_map(|s| Value::from(s.as_str())),
        vec(any::<u8>(), 0..64).prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 64, 8, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..8).prop_map(Value::List),
            vec((inner.clone(), inner), 0..6).prop_map(Value::Map),
        ]
    })
}

proptest! {
    #[test]
    fn prop_values_round_trip(value in value_strategy()) {
        let encoded = encode(&value).expect("encodes");
        let decoded = decode(encoded).expect("decodes");
        prop_assert_eq!(decoded, value);
    }

    #[test]
    fn prop_encodings_validate(value in value_strategy()) {
        let encoded = encode(&value).expect("encodes");
        prop_assert!(validate(&encoded));
    }

    #[test]
    fn prop_truncations_never_validate(value in value_strategy()) {
        let encoded = encode(&value).expect("encodes");
        prop_assume!(encoded.len() > 1);
        // Any strict prefix either fails validation or, for containers
        // of skippable frames, is caught by the decoder as well.
        let cut = encoded.len() - 1;
        prop_assert_eq!(validate(&encoded[..cut]), decode(encoded[..cut].to_vec()).is_ok());
    }

    #[test]
    fn prop_validator_agrees_with_decoder_on_noise(bytes in vec(any::<u8>(), 0..64)) {
        let decodes = decode(bytes.clone()).is_ok();
        let validates = validate(&bytes);
        // Structural agreement; the decoder is stricter only about UTF-8
        // payloads and usertype registration.
        if validates != decodes {
            let strictly_decoder_side = matches!(
                decode(bytes.clone()),
                Err(compaqt::DecodeError::InvalidUtf8(_))
                    | Err(compaqt::DecodeError::UnknownUserType(_))
            );
            prop_assert!(validates && strictly_decoder_side);
        }
    }

    #[test]
    fn prop_string_lengths_count_bytes(text in "[\\x00-\\x7F\u{80}-\u{10FF}]{0,30}") {
        let encoded = encode(&Value::from(text.as_str())).expect("encodes");
        let decoded = decode(encoded).expect("decodes");
        prop_assert_eq!(decoded.as_str().expect("string"), text.as_str());
    }
}
