use super::*;
use crate::input::SliceReader;
use crate::output::GrowBuf;
use bytes::Bytes;
use proptest::prelude::*;

fn encode_varlen(type_tag: u8, len: usize) -> Vec<u8> {
    let mut out = GrowBuf::new();
    out.ensure(MAX_HEAD).expect("head fits a fresh buffer");
    write_varlen(&mut out, type_tag, len);
    out.into_bytes()
}

fn decode_varlen(bytes: &[u8]) -> DecodeResult<usize> {
    let mut input = SliceReader::new(Bytes::copy_from_slice(bytes), false);
    input.require(1)?;
    let head = input.take_u8();
    read_varlen_len(&mut input, head)
}

#[test]
fn mode_one_packs_length_in_high_nibble() {
    assert_eq!(encode_varlen(tag::STRNG, 0), vec![0x03]);
    assert_eq!(encode_varlen(tag::STRNG, 1), vec![0x13]);
    assert_eq!(encode_varlen(tag::ARRAY, 15), vec![0xF0]);
}

#[test]
fn mode_two_splits_length_across_two_bytes() {
    // 16 = 0b10000: low three bits in bits 5-7, the rest in byte two.
    assert_eq!(encode_varlen(tag::BYTES, 16), vec![0x0A, 0x02]);
    assert_eq!(encode_varlen(tag::BYTES, 2047), vec![0xEA, 0xFF]);
}

#[test]
fn mode_three_starts_at_2048() {
    let bytes = encode_varlen(tag::DICTN, 2048);
    assert_eq!(bytes[0] & 0b0001_1000, 0b0001_1000);
    assert_eq!(bytes.len(), 3);
    assert_eq!(decode_varlen(&bytes).expect("valid head"), 2048);
}

#[test]
fn mode_boundaries_pick_the_shortest_head() {
    assert_eq!(encode_varlen(tag::STRNG, 15).len(), 1);
    assert_eq!(encode_varlen(tag::STRNG, 16).len(), 2);
    assert_eq!(encode_varlen(tag::STRNG, 2047).len(), 2);
    assert_eq!(encode_varlen(tag::STRNG, 2048).len(), 3);
    assert_eq!(encode_varlen(tag::STRNG, 65536).len(), 4);
}

#[test]
fn mode_one_accepts_the_high_length_bit_form() {
    // Bits 3-4 = `10` is Mode 1 with the length's low bit in bit 4.
    assert_eq!(decode_varlen(&[tag::STRNG | 0b1001_0000]).expect("valid"), 9);
    assert_eq!(decode_varlen(&[tag::STRNG | 0b0001_0000]).expect("valid"), 1);
}

#[test]
fn forced_mode_three_header_is_nine_bytes() {
    let mut out = GrowBuf::new();
    out.ensure(MAX_HEAD).expect("head fits");
    write_varlen_mode3(&mut out, tag::ARRAY, 3, 8);
    let bytes = out.into_bytes();

    assert_eq!(bytes.len(), 9);
    assert_eq!(bytes[0], tag::ARRAY | tag::STREAM_MASK);
    assert_eq!(decode_varlen(&bytes).expect("valid head"), 3);
}

#[test]
fn stream_head_matches_forced_mode_three() {
    let head = stream_head(tag::DICTN, 7);
    assert_eq!(head[0], 0xF9);
    assert_eq!(u64::from_le_bytes(head[1..].try_into().expect("8 bytes")), 7);

    let mut out = GrowBuf::new();
    out.ensure(MAX_HEAD).expect("head fits");
    write_varlen_mode3(&mut out, tag::DICTN, 7, 8);
    assert_eq!(out.into_bytes(), head);
}

#[test]
fn truncated_mode_three_head_is_rejected() {
    let full = encode_varlen(tag::BYTES, 1 << 20);
    let err = decode_varlen(&full[..2]).expect_err("short head must fail");
    assert!(matches!(err, DecodeError::Truncated { .. }));
}

#[test]
fn integer_head_round_trips_every_width() {
    for nbytes in 1..=8usize {
        let mut out = GrowBuf::new();
        out.ensure(1).expect("one byte");
        write_integer_head(&mut out, nbytes);
        let head = out.into_bytes()[0];
        assert_eq!(tag::tag3(head), tag::INTGR);
        assert_eq!(integer_width(head).expect("valid width"), nbytes);
    }
}

#[test]
fn integer_head_rejects_out_of_range_widths() {
    assert!(matches!(
        integer_width(tag::INTGR),
        Err(DecodeError::IntegerWidth(0))
    ));
    assert!(matches!(
        integer_width(tag::INTGR | (9 << 3)),
        Err(DecodeError::IntegerWidth(9))
    ));
}

#[test]
fn utype_head_round_trips() {
    let mut out = GrowBuf::new();
    out.ensure(MAX_HEAD).expect("head fits");
    write_utype_head(&mut out, 5, 300);
    let bytes = out.into_bytes();

    let mut input = SliceReader::new(Bytes::from(bytes), false);
    input.require(1).expect("head byte");
    let head = input.take_u8();
    assert_eq!(tag::tag3(head), tag::UTYPE);
    assert_eq!(head >> 3, 5);
    assert_eq!(read_utype_len(&mut input).expect("valid head"), 300);
}

#[test]
fn utype_zero_length_collapses_to_one_byte() {
    let mut out = GrowBuf::new();
    out.ensure(MAX_HEAD).expect("head fits");
    write_utype_head(&mut out, 31, 0);
    let bytes = out.into_bytes();
    assert_eq!(bytes, vec![tag::UTYPE | (31 << 3), 0x00]);

    let mut input = SliceReader::new(Bytes::from(bytes), false);
    input.require(1).expect("head byte");
    let _ = input.take_u8();
    assert_eq!(read_utype_len(&mut input).expect("valid head"), 0);
}

#[test]
fn utype_rejects_oversized_width_byte() {
    let mut input = SliceReader::new(Bytes::from_static(&[9, 0, 0]), false);
    assert!(matches!(
        read_utype_len(&mut input),
        Err(DecodeError::IntegerWidth(9))
    ));
}

#[test]
fn bool_heads_use_the_selector_bit() {
    let mut out = GrowBuf::new();
    out.ensure(2).expect("two bytes");
    write_bool(&mut out, false);
    write_bool(&mut out, true);
    assert_eq!(out.into_bytes(), vec![tag::BOOLF, tag::BOOLT]);
}

#[test]
fn used_bytes_counts_whole_bytes() {
    assert_eq!(used_bytes(0), 1);
    assert_eq!(used_bytes(0xFF), 1);
    assert_eq!(used_bytes(0x100), 2);
    assert_eq!(used_bytes(u64::MAX), 8);
}

proptest! {
    #[test]
    fn prop_varlen_round_trips_for_random_lengths(len in 0usize..1 << 40) {
        let bytes = encode_varlen(tag::STRNG, len);
        prop_assert_eq!(decode_varlen(&bytes).expect("valid head"), len);
    }

    #[test]
    fn prop_varlen_heads_are_minimal(len in 0usize..1 << 40) {
        let bytes = encode_varlen(tag::STRNG, len);
        let expected = if len < 16 {
            1
        } else if len < 2048 {
            2
        } else {
            1 + used_bytes(len as u64)
        };
        prop_assert_eq!(bytes.len(), expected);
    }

    #[test]
    fn prop_forced_mode_three_round_trips(count in 0u64..1 << 48) {
        let head = stream_head(tag::ARRAY, count);
        prop_assert_eq!(decode_varlen(&head).expect("valid head") as u64, count);
    }
}
