//! Fixed-width integers, booleans, byte arrays, `U256` and `Option`.

use std::fmt;

use crate::error::{DecodeError, DecodeResult};
use crate::serializer::{Deserializable, Deserializer, Serializable, Serializer};

macro_rules! impl_fixed_width {
    ($($ty:ty => $write:ident, $read:ident;)*) => {
        $(
            impl Serializable for $ty {
                fn serialize(&self, ser: &mut Serializer) {
                    ser.$write(*self);
                }
            }

            impl Deserializable for $ty {
                fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
                    de.$read()
                }
            }
        )*
    };
}

impl_fixed_width! {
    u8 => write_u8, read_u8;
    u16 => write_u16, read_u16;
    u32 => write_u32, read_u32;
    u64 => write_u64, read_u64;
    u128 => write_u128, read_u128;
    bool => write_bool, read_bool;
}

/// Fixed-size arrays are written raw; the width is part of the type.
impl<const N: usize> Serializable for [u8; N] {
    fn serialize(&self, ser: &mut Serializer) {
        ser.write_fixed_bytes(self);
    }
}

impl<const N: usize> Deserializable for [u8; N] {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        de.read_array()
    }
}

impl<T: Serializable> Serializable for Option<T> {
    fn serialize(&self, ser: &mut Serializer) {
        match self {
            None => ser.write_variant(0),
            Some(value) => {
                ser.write_variant(1);
                value.serialize(ser);
            }
        }
    }
}

impl<T: Deserializable> Deserializable for Option<T> {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        match de.read_variant()? {
            (0, _) => Ok(None),
            (1, _) => T::deserialize(de).map(Some),
            (tag, offset) => Err(DecodeError::UnknownVariant {
                type_name: "Option",
                tag,
                offset,
            }),
        }
    }
}

// =============================================================================
// U256
// =============================================================================

/// 256-bit unsigned integer, stored little-endian.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct U256([u8; 32]);

impl U256 {
    pub const ZERO: U256 = U256([0; 32]);
    pub const MAX: U256 = U256([0xff; 32]);

    pub fn from_le_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn to_le_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// The low 128 bits, if the high half is zero.
    pub fn to_u128(&self) -> Option<u128> {
        if self.0[16..].iter().any(|b| *b != 0) {
            return None;
        }
        let mut low = [0u8; 16];
        low.copy_from_slice(&self.0[..16]);
        Some(u128::from_le_bytes(low))
    }

    /// Parse a `0x`-prefixed hex literal of up to 64 digits.
    pub fn from_hex_literal(s: &str) -> Option<Self> {
        let digits = s.strip_prefix("0x")?;
        if digits.is_empty() || digits.len() > 64 {
            return None;
        }
        let padded = format!("{:0>64}", digits);
        let mut be = [0u8; 32];
        hex::decode_to_slice(padded, &mut be).ok()?;
        be.reverse();
        Some(Self(be))
    }
}

impl From<u128> for U256 {
    fn from(value: u128) -> Self {
        let mut bytes = [0u8; 32];
        bytes[..16].copy_from_slice(&value.to_le_bytes());
        Self(bytes)
    }
}

impl From<u64> for U256 {
    fn from(value: u64) -> Self {
        U256::from(u128::from(value))
    }
}

impl fmt::Debug for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U256({})", self)
    }
}

/// Rendered as a big-endian hex literal.
impl fmt::Display for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut be = self.0;
        be.reverse();
        let digits = hex::encode(be);
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() {
            write!(f, "0x0")
        } else {
            write!(f, "0x{}", trimmed)
        }
    }
}

impl Serializable for U256 {
    fn serialize(&self, ser: &mut Serializer) {
        ser.write_fixed_bytes(&self.0);
    }
}

impl Deserializable for U256 {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        de.read_array().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::{from_bytes, to_bytes};

    #[test]
    fn test_u256_from_u128() {
        let v = U256::from(1u128 << 100);
        assert_eq!(v.to_u128(), Some(1u128 << 100));
        assert_eq!(U256::MAX.to_u128(), None);
        assert_eq!(to_bytes(&U256::from(1u64))[0], 1);
    }

    #[test]
    fn test_u256_hex() {
        let v = U256::from_hex_literal("0x1ff").unwrap();
        assert_eq!(v, U256::from(0x1ffu64));
        assert_eq!(v.to_string(), "0x1ff");
        assert_eq!(U256::ZERO.to_string(), "0x0");
        assert!(U256::from_hex_literal("1ff").is_none());
    }

    #[test]
    fn test_option_tags() {
        assert_eq!(to_bytes(&None::<u8>), vec![0]);
        assert_eq!(to_bytes(&Some(7u8)), vec![1, 7]);
        assert_eq!(from_bytes::<Option<u8>>(&[1, 7]).unwrap(), Some(7));
        assert!(matches!(
            from_bytes::<Option<u8>>(&[2, 7]),
            Err(DecodeError::UnknownVariant { type_name: "Option", tag: 2, .. })
        ));
    }
}
