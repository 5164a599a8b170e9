//! Length prefix encodings.
//!
//! Two encodings are supported and they are not interoperable: a stream
//! written with one must be read with the same one.
//!
//! ```text
//! Fixed32:  ┌────────────────┬──────────────────┐
//!           │ Length (4B LE) │ Payload          │
//!           └────────────────┴──────────────────┘
//! Varint:   ┌────────────────┬──────────────────┐
//!           │ Length (1-5B)  │ Payload          │
//!           └────────────────┴──────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};

/// Size of the fixed little-endian `u32` prefix.
pub const FIXED_PREFIX_LEN: usize = 4;

/// Longest varint needed for a 32-bit length.
pub const MAX_VARINT_LEN: usize = 5;

/// Largest payload length either encoding can describe.
pub const MAX_PAYLOAD_LEN: usize = u32::MAX as usize;

const CONTINUATION: u8 = 0x80;
const DATA_BITS: u8 = 0x7f;

/// How the payload length is written in front of each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PrefixEncoding {
    /// 4-byte little-endian unsigned 32-bit length.
    #[default]
    Fixed32,
    /// Base-128 varint length, 1 to 5 bytes.
    Varint,
}

impl PrefixEncoding {
    /// Number of prefix bytes needed for a payload of `len` bytes.
    ///
    /// `len` is expected to fit in `u32`; larger values are clamped, since
    /// such a payload is rejected before it is ever written.
    pub fn encoded_len(self, len: usize) -> usize {
        match self {
            PrefixEncoding::Fixed32 => FIXED_PREFIX_LEN,
            PrefixEncoding::Varint => varint_len(u32::try_from(len).unwrap_or(u32::MAX)),
        }
    }

    /// Append the prefix for `len` to `dst`.
    pub fn put_prefix(self, len: u32, dst: &mut BytesMut) {
        match self {
            PrefixEncoding::Fixed32 => dst.put_u32_le(len),
            PrefixEncoding::Varint => encode_varint(len, dst),
        }
    }

    /// Short lowercase name, as accepted by `FromStr`.
    pub fn as_str(self) -> &'static str {
        match self {
            PrefixEncoding::Fixed32 => "fixed",
            PrefixEncoding::Varint => "varint",
        }
    }
}

impl fmt::Display for PrefixEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a prefix encoding name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown prefix encoding {0:?} (expected \"fixed\" or \"varint\")")]
pub struct ParsePrefixError(String);

impl FromStr for PrefixEncoding {
    type Err = ParsePrefixError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" | "fixed32" | "u32" => Ok(PrefixEncoding::Fixed32),
            "varint" | "uvarint" => Ok(PrefixEncoding::Varint),
            _ => Err(ParsePrefixError(s.to_string())),
        }
    }
}

/// Number of bytes `value` occupies as a varint.
pub fn varint_len(value: u32) -> usize {
    match value {
        0..=0x7f => 1,
        0x80..=0x3fff => 2,
        0x4000..=0x1f_ffff => 3,
        0x20_0000..=0x0fff_ffff => 4,
        _ => MAX_VARINT_LEN,
    }
}

/// Append `value` as a base-128 varint, least significant group first.
pub fn encode_varint(mut value: u32, dst: &mut BytesMut) {
    while value >= u32::from(CONTINUATION) {
        dst.put_u8((value as u8 & DATA_BITS) | CONTINUATION);
        value >>= 7;
    }
    dst.put_u8(value as u8);
}

/// Incremental varint decoder fed one byte at a time.
#[derive(Debug, Default, Clone)]
pub struct VarintDecoder {
    value: u64,
    consumed: usize,
}

impl VarintDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes fed so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Feed the next prefix byte.
    ///
    /// Returns `Ok(Some(len))` once the varint is complete, `Ok(None)` when
    /// more bytes are needed.
    pub fn push(&mut self, byte: u8) -> Result<Option<u32>> {
        if self.consumed >= MAX_VARINT_LEN {
            return Err(FrameError::InvalidVarint {
                consumed: self.consumed,
            });
        }

        self.value |= u64::from(byte & DATA_BITS) << (7 * self.consumed);
        self.consumed += 1;

        if byte & CONTINUATION == 0 {
            return u32::try_from(self.value)
                .map(Some)
                .map_err(|_| FrameError::InvalidVarint {
                    consumed: self.consumed,
                });
        }

        if self.consumed == MAX_VARINT_LEN {
            return Err(FrameError::InvalidVarint {
                consumed: self.consumed,
            });
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(bytes: &[u8]) -> Result<Option<u32>> {
        let mut decoder = VarintDecoder::new();
        for &b in bytes {
            if let Some(v) = decoder.push(b)? {
                return Ok(Some(v));
            }
        }
        Ok(None)
    }

    #[test]
    fn varint_known_encodings() {
        let cases: &[(u32, &[u8])] = &[
            (0, &[0x00]),
            (1, &[0x01]),
            (127, &[0x7f]),
            (128, &[0x80, 0x01]),
            (300, &[0xac, 0x02]),
            (16_384, &[0x80, 0x80, 0x01]),
            (u32::MAX, &[0xff, 0xff, 0xff, 0xff, 0x0f]),
        ];

        for &(value, expected) in cases {
            let mut buf = BytesMut::new();
            encode_varint(value, &mut buf);
            assert_eq!(buf.as_ref(), expected, "encoding {value}");
            assert_eq!(varint_len(value), expected.len(), "length of {value}");
            assert_eq!(decode_all(expected).unwrap(), Some(value));
        }
    }

    #[test]
    fn varint_len_boundaries() {
        assert_eq!(varint_len(0x7f), 1);
        assert_eq!(varint_len(0x80), 2);
        assert_eq!(varint_len(0x3fff), 2);
        assert_eq!(varint_len(0x4000), 3);
        assert_eq!(varint_len(0x0fff_ffff), 4);
        assert_eq!(varint_len(0x1000_0000), 5);
    }

    #[test]
    fn decoder_waits_for_continuation() {
        let mut decoder = VarintDecoder::new();
        assert_eq!(decoder.push(0x80).unwrap(), None);
        assert_eq!(decoder.consumed(), 1);
        assert_eq!(decoder.push(0x01).unwrap(), Some(128));
    }

    #[test]
    fn decoder_rejects_sixth_byte() {
        let err = decode_all(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x01]).unwrap_err();
        assert!(matches!(err, FrameError::InvalidVarint { consumed: 5 }));
    }

    #[test]
    fn decoder_rejects_overflow_past_u32() {
        let err = decode_all(&[0xff, 0xff, 0xff, 0xff, 0x1f]).unwrap_err();
        assert!(matches!(err, FrameError::InvalidVarint { consumed: 5 }));
    }

    #[test]
    fn prefix_lengths_per_encoding() {
        assert_eq!(PrefixEncoding::Fixed32.encoded_len(0), 4);
        assert_eq!(PrefixEncoding::Fixed32.encoded_len(1 << 20), 4);
        assert_eq!(PrefixEncoding::Varint.encoded_len(3), 1);
        assert_eq!(PrefixEncoding::Varint.encoded_len(200), 2);
    }

    #[test]
    fn fixed_prefix_is_little_endian() {
        let mut buf = BytesMut::new();
        PrefixEncoding::Fixed32.put_prefix(0x0102_0304, &mut buf);
        assert_eq!(buf.as_ref(), &[0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn parse_and_display() {
        assert_eq!("fixed".parse::<PrefixEncoding>().unwrap(), PrefixEncoding::Fixed32);
        assert_eq!("VARINT".parse::<PrefixEncoding>().unwrap(), PrefixEncoding::Varint);
        assert!("zigzag".parse::<PrefixEncoding>().is_err());
        assert_eq!(PrefixEncoding::Varint.to_string(), "varint");
        assert_eq!(PrefixEncoding::default(), PrefixEncoding::Fixed32);
    }
}
