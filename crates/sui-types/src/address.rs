//! 32-byte account addresses and object IDs.
//!
//! Sui addresses are 32-byte values, but they're often written in different formats:
//! - Short form: "0x2"
//! - Full form: "0x0000000000000000000000000000000000000000000000000000000000000002"
//! - Without prefix: "2"
//!
//! [`SuiAddress`] accepts all three and always encodes as 32 raw bytes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer as SerdeDeserializer, Serialize, Serializer as SerdeSerializer};
use sui_bcs::{DecodeResult, Deserializable, Deserializer, Serializable, Serializer};

use crate::error::AddressParseError;

/// Byte width of an address.
pub const ADDRESS_LENGTH: usize = 32;

/// A 32-byte account address or object ID.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SuiAddress([u8; ADDRESS_LENGTH]);

/// Object IDs and package IDs share the address representation.
pub type ObjectID = SuiAddress;

impl SuiAddress {
    pub const ZERO: SuiAddress = SuiAddress([0; ADDRESS_LENGTH]);

    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Address whose last two bytes hold `value` (`0x2`, `0x6`, `0xdee9`).
    pub const fn from_u16(value: u16) -> Self {
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes[30] = (value >> 8) as u8;
        bytes[31] = value as u8;
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    pub fn into_bytes(self) -> [u8; ADDRESS_LENGTH] {
        self.0
    }

    /// Parse a hex address with or without `0x`, short or full width.
    ///
    /// # Examples
    ///
    /// ```
    /// use sui_ptb_types::SuiAddress;
    ///
    /// let a = SuiAddress::from_hex_literal("0x2").unwrap();
    /// let b = SuiAddress::from_hex_literal(
    ///     "0x0000000000000000000000000000000000000000000000000000000000000002",
    /// )
    /// .unwrap();
    /// assert_eq!(a, b);
    /// ```
    pub fn from_hex_literal(s: &str) -> Result<Self, AddressParseError> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.is_empty() {
            return Err(AddressParseError::Empty);
        }
        if digits.len() > ADDRESS_LENGTH * 2 {
            return Err(AddressParseError::TooLong {
                input: s.to_string(),
                digits: digits.len(),
            });
        }
        let padded = format!("{:0>64}", digits);
        let mut bytes = [0u8; ADDRESS_LENGTH];
        hex::decode_to_slice(&padded, &mut bytes).map_err(|e| AddressParseError::InvalidHex {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(bytes))
    }

    /// Build from a byte slice that must be exactly 32 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AddressParseError> {
        let array: [u8; ADDRESS_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| AddressParseError::WrongLength {
                    expected: ADDRESS_LENGTH,
                    actual: bytes.len(),
                })?;
        Ok(Self(array))
    }

    /// Full-width form: `0x` followed by 64 lowercase hex digits.
    pub fn to_canonical_string(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Short form with leading zeros stripped, e.g. `0x2`.
    pub fn to_short_string(&self) -> String {
        let full = hex::encode(self.0);
        let trimmed = full.trim_start_matches('0');
        if trimmed.is_empty() {
            "0x0".to_string()
        } else {
            format!("0x{}", trimmed)
        }
    }
}

impl fmt::Display for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl fmt::Debug for SuiAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SuiAddress({})", self.to_short_string())
    }
}

impl FromStr for SuiAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex_literal(s)
    }
}

impl From<[u8; ADDRESS_LENGTH]> for SuiAddress {
    fn from(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for SuiAddress {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serializable for SuiAddress {
    fn serialize(&self, ser: &mut Serializer) {
        ser.write_fixed_bytes(&self.0);
    }
}

impl Deserializable for SuiAddress {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        de.read_array().map(Self)
    }
}

/// JSON carries addresses as hex strings.
impl Serialize for SuiAddress {
    fn serialize<S: SerdeSerializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_canonical_string())
    }
}

impl<'de> Deserialize<'de> for SuiAddress {
    fn deserialize<D: SerdeDeserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        SuiAddress::from_hex_literal(&s).map_err(serde::de::Error::custom)
    }
}
