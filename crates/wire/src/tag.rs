//! Type tags and bit masks of the Compaqt wire format.
//!
//! A frame's first byte carries a 3-bit tag in its low three bits; the
//! types that carry no length use the low five bits instead. The remaining
//! bits hold the length mode (VARLEN types), the payload width (integers)
//! or the registry index (usertypes).

/// Ordered sequence. VARLEN head.
pub const ARRAY: u8 = 0x00;
/// Ordered key/value mapping. VARLEN head, length counts pairs.
pub const DICTN: u8 = 0x01;
/// Raw byte string. VARLEN head.
pub const BYTES: u8 = 0x02;
/// UTF-8 string. VARLEN head, length counts bytes.
pub const STRNG: u8 = 0x03;
/// Signed integer up to 8 payload bytes.
pub const INTGR: u8 = 0x04;
/// User-extended type; index in bits 3-7.
pub const UTYPE: u8 = 0x06;
/// Reserved 3-bit tag, rejected on read.
pub const NOUSE: u8 = 0x07;

/// Boolean `false`, 5-bit tag.
pub const BOOLF: u8 = 0x05;
/// Boolean `true`, 5-bit tag.
pub const BOOLT: u8 = 0x0D;
/// IEEE-754 double, 5-bit tag.
pub const FLOAT: u8 = 0x15;
/// Null, 5-bit tag.
pub const NONTP: u8 = 0x1D;

/// Mask selecting the 3-bit tag of a head byte.
pub const TAG_MASK: u8 = 0b0000_0111;
/// Mask selecting the 5-bit tag of a head byte.
pub const TAG5_MASK: u8 = 0b0001_1111;

/// Head-byte mask of a streaming-compatible container: length Mode 3 with
/// an 8-byte count field. ORed onto [`ARRAY`] or [`DICTN`].
pub const STREAM_MASK: u8 = 0b1111_1000;

/// Byte width of a streaming-compatible container header: the masked head
/// byte plus the 8-byte little-endian item count.
pub const STREAM_HEAD: usize = 9;

/// Returns the 3-bit tag of a head byte.
#[inline]
pub const fn tag3(head: u8) -> u8 {
    head & TAG_MASK
}

/// Returns the 5-bit tag of a head byte, the dispatch key of the decoder.
#[inline]
pub const fn tag5(head: u8) -> u8 {
    head & TAG5_MASK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_bit_tags_share_the_boolean_group() {
        // The no-length tags are the 3-bit pattern `101` plus a selector
        // in bits 3-4.
        for t in [BOOLF, BOOLT, FLOAT, NONTP] {
            assert_eq!(tag3(t), 0b101);
        }
    }

    #[test]
    fn stream_mask_preserves_container_tags() {
        assert_eq!(tag3(ARRAY | STREAM_MASK), ARRAY);
        assert_eq!(tag3(DICTN | STREAM_MASK), DICTN);
        assert_eq!(ARRAY | STREAM_MASK, 0xF8);
        assert_eq!(DICTN | STREAM_MASK, 0xF9);
    }

    #[test]
    fn tag5_folds_away_length_mode_bits() {
        assert_eq!(tag5(STRNG | 0b0001_0000), STRNG | 0b0001_0000);
        assert_eq!(tag5(0xF8), 0b0001_1000);
    }
}
