//! ULEB128 variable-length integers.
//!
//! Seven payload bits per byte, least significant group first, with the high
//! bit set on every byte except the last. Used for lengths, element counts,
//! and nothing else on the wire.

use crate::error::{DecodeError, DecodeResult};

/// Maximum encoded width of a `u64` (ceil(64 / 7)).
pub const MAX_U64_LEN: usize = 10;

/// Maximum encoded width of a `u32` (ceil(32 / 7)).
pub const MAX_U32_LEN: usize = 5;

/// Append the ULEB128 encoding of `value` to `out`.
pub fn write_uleb128(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Encode `value` as ULEB128.
///
/// # Examples
///
/// ```
/// use sui_bcs::uleb128::encode_uleb128;
///
/// assert_eq!(encode_uleb128(0), vec![0x00]);
/// assert_eq!(encode_uleb128(128), vec![0x80, 0x01]);
/// ```
pub fn encode_uleb128(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_U64_LEN);
    write_uleb128(&mut out, value);
    out
}

/// Number of bytes `value` occupies once encoded.
pub fn encoded_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}

/// Decode a ULEB128 `u64` from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed.
pub fn decode_uleb128(bytes: &[u8]) -> DecodeResult<(u64, usize)> {
    decode_bounded(bytes, 0, 64)
}

/// Decode a ULEB128 value that must fit in `u32` (lengths and counts).
pub fn decode_uleb128_u32(bytes: &[u8]) -> DecodeResult<(u32, usize)> {
    let (value, consumed) = decode_bounded(bytes, 0, 32)?;
    Ok((value as u32, consumed))
}

/// Shared decoder. `base_offset` is only used to report error positions
/// relative to the enclosing buffer.
pub(crate) fn decode_bounded(
    bytes: &[u8],
    base_offset: usize,
    width_bits: u32,
) -> DecodeResult<(u64, usize)> {
    let max_len = (width_bits as usize).div_ceil(7);
    let mut value: u64 = 0;

    for (i, &byte) in bytes.iter().take(max_len).enumerate() {
        let shift = 7 * i as u32;
        let group = u64::from(byte & 0x7f);

        // The last permitted group may only carry the bits that are left.
        if shift + 7 > width_bits && group >> (width_bits - shift) != 0 {
            return Err(DecodeError::MalformedVarint {
                offset: base_offset,
                reason: "value overflows target width",
            });
        }
        value |= group << shift;

        if byte & 0x80 == 0 {
            if byte == 0 && i > 0 {
                return Err(DecodeError::MalformedVarint {
                    offset: base_offset,
                    reason: "non-canonical trailing zero group",
                });
            }
            return Ok((value, i + 1));
        }
    }

    let reason = if bytes.len() < max_len {
        "input ended before terminating byte"
    } else {
        "no terminating byte within maximum width"
    };
    Err(DecodeError::MalformedVarint {
        offset: base_offset,
        reason,
    })
}
