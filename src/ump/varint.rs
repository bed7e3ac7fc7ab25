//! UMP variable-length integers
//!
//! The width of a UMP varint is chosen by its first byte, not by
//! continuation bits as in protobuf:
//!
//! ```text
//! 0xxxxxxx                      1 byte   value = b0
//! 10xxxxxx b1                   2 bytes  value = (b0 & 0x3F) + 64 * b1
//! 110xxxxx b1 b2                3 bytes  value = (b0 & 0x1F) + 32 * (b1 + 256 * b2)
//! 1110xxxx b1 b2 b3             4 bytes  value = (b0 & 0x0F) + 16 * (b1 + 256 * (b2 + 256 * b3))
//! 1111xxxx b1 b2 b3 b4          5 bytes  value = u32::from_le_bytes([b1, b2, b3, b4])
//! ```

use bytes::BufMut;
use std::io::{ErrorKind, Read};

use crate::error::FramingError;

/// Largest encoded width.
pub const MAX_VARINT_LEN: usize = 5;

/// Total encoded width announced by the first byte.
#[inline]
pub const fn varint_width(first: u8) -> usize {
    if first < 0x80 {
        1
    } else if first < 0xC0 {
        2
    } else if first < 0xE0 {
        3
    } else if first < 0xF0 {
        4
    } else {
        5
    }
}

/// Number of bytes `value` encodes to.
#[inline]
pub const fn encoded_len(value: u32) -> usize {
    if value < 1 << 7 {
        1
    } else if value < 1 << 14 {
        2
    } else if value < 1 << 21 {
        3
    } else if value < 1 << 28 {
        4
    } else {
        5
    }
}

fn value_from(bytes: &[u8]) -> u32 {
    let b = |i: usize| u32::from(bytes[i]);
    match bytes.len() {
        1 => b(0),
        2 => (b(0) & 0x3F) + 64 * b(1),
        3 => (b(0) & 0x1F) + 32 * (b(1) + 256 * b(2)),
        4 => (b(0) & 0x0F) + 16 * (b(1) + 256 * (b(2) + 256 * b(3))),
        _ => u32::from_le_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]),
    }
}

/// Decode a varint from the front of `buf`.
///
/// Returns the value and the number of bytes consumed, or `None` when `buf`
/// is shorter than the width the first byte announces.
pub fn decode_varint(buf: &[u8]) -> Option<(u32, usize)> {
    let width = varint_width(*buf.first()?);
    let bytes = buf.get(..width)?;
    Some((value_from(bytes), width))
}

/// Read one varint from `reader`.
///
/// `Ok(None)` means the source was already exhausted before the first byte.
/// Running out of bytes part-way through is a [`FramingError::TruncatedVarint`].
pub fn read_varint<R: Read>(
    reader: &mut R,
    field: &'static str,
) -> Result<Option<u32>, FramingError> {
    let mut buf = [0u8; MAX_VARINT_LEN];

    match reader.read_exact(&mut buf[..1]) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(FramingError::Io(e)),
    }

    let width = varint_width(buf[0]);
    if width > 1 {
        reader.read_exact(&mut buf[1..width]).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => FramingError::TruncatedVarint { field, width },
            _ => FramingError::Io(e),
        })?;
    }

    Ok(Some(value_from(&buf[..width])))
}

/// Append the UMP encoding of `value` to `buf`.
pub fn encode_varint(value: u32, buf: &mut impl BufMut) {
    match encoded_len(value) {
        1 => buf.put_u8(value as u8),
        2 => {
            buf.put_u8(0x80 | (value & 0x3F) as u8);
            buf.put_u8((value >> 6) as u8);
        }
        3 => {
            buf.put_u8(0xC0 | (value & 0x1F) as u8);
            buf.put_u8((value >> 5) as u8);
            buf.put_u8((value >> 13) as u8);
        }
        4 => {
            buf.put_u8(0xE0 | (value & 0x0F) as u8);
            buf.put_u8((value >> 4) as u8);
            buf.put_u8((value >> 12) as u8);
            buf.put_u8((value >> 20) as u8);
        }
        _ => {
            buf.put_u8(0xF0);
            buf.put_u32_le(value);
        }
    }
}
