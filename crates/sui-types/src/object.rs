//! Object references and call arguments.
//!
//! | CallArg | byte | payload |
//! |---|---|---|
//! | Pure | 0 | `Bytes` (pre-encoded value) |
//! | Object | 1 | [`ObjectArg`] |
//!
//! | ObjectArg | byte | payload |
//! |---|---|---|
//! | ImmOrOwned | 0 | [`SuiObjectRef`] |
//! | Shared | 1 | [`SharedObjectRef`] |
//! | Receiving | 2 | [`SuiObjectRef`] |

use std::fmt;
use std::str::FromStr;

use sui_bcs::{DecodeError, DecodeResult, Deserializable, Deserializer, Serializable, Serializer};

use crate::address::{ObjectID, SuiAddress};
use crate::encoding::{base58_decode, base58_encode};
use crate::error::DigestParseError;

/// Byte width of an object digest.
pub const DIGEST_LENGTH: usize = 32;

// =============================================================================
// ObjectDigest
// =============================================================================

/// 32-byte content digest of an object version, shown in base58.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ObjectDigest([u8; DIGEST_LENGTH]);

impl ObjectDigest {
    pub const fn new(bytes: [u8; DIGEST_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LENGTH] {
        &self.0
    }

    pub fn to_base58(&self) -> String {
        base58_encode(&self.0)
    }
}

impl fmt::Display for ObjectDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl fmt::Debug for ObjectDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectDigest({})", self.to_base58())
    }
}

impl FromStr for ObjectDigest {
    type Err = DigestParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = base58_decode(s).map_err(|e| DigestParseError::InvalidBase58 {
            input: s.to_string(),
            reason: e.to_string(),
        })?;
        let array: [u8; DIGEST_LENGTH] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| DigestParseError::WrongLength {
                actual: bytes.len(),
            })?;
        Ok(Self(array))
    }
}

/// Digests are length-prefixed on the wire even though the width is fixed.
impl Serializable for ObjectDigest {
    fn serialize(&self, ser: &mut Serializer) {
        ser.write_bytes(&self.0);
    }
}

impl Deserializable for ObjectDigest {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        let bytes = de.read_bytes()?;
        let array: [u8; DIGEST_LENGTH] =
            bytes
                .try_into()
                .map_err(|_| DecodeError::LengthMismatch {
                    context: "ObjectDigest",
                    expected: DIGEST_LENGTH,
                    actual: bytes.len(),
                })?;
        Ok(Self(array))
    }
}

impl serde::Serialize for ObjectDigest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> serde::Deserialize<'de> for ObjectDigest {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// References
// =============================================================================

/// `(id, version, digest)` of an owned or immutable object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiObjectRef {
    pub object_id: ObjectID,
    pub version: u64,
    pub digest: ObjectDigest,
}

impl Serializable for SuiObjectRef {
    fn serialize(&self, ser: &mut Serializer) {
        self.object_id.serialize(ser);
        ser.write_u64(self.version);
        self.digest.serialize(ser);
    }
}

impl Deserializable for SuiObjectRef {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        Ok(Self {
            object_id: ObjectID::deserialize(de)?,
            version: de.read_u64()?,
            digest: ObjectDigest::deserialize(de)?,
        })
    }
}

/// A shared object as seen by a transaction input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedObjectRef {
    pub object_id: ObjectID,
    pub initial_shared_version: u64,
    pub mutable: bool,
}

impl Serializable for SharedObjectRef {
    fn serialize(&self, ser: &mut Serializer) {
        self.object_id.serialize(ser);
        ser.write_u64(self.initial_shared_version);
        ser.write_bool(self.mutable);
    }
}

impl Deserializable for SharedObjectRef {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        Ok(Self {
            object_id: ObjectID::deserialize(de)?,
            initial_shared_version: de.read_u64()?,
            mutable: de.read_bool()?,
        })
    }
}

/// Ownership of an object, as reported by an object provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ObjectOwner {
    #[serde(rename_all = "camelCase")]
    AddressOwner { address: SuiAddress },
    Parent { id: ObjectID },
    #[serde(rename_all = "camelCase")]
    Shared { initial_shared_version: u64 },
    Immutable,
}

// =============================================================================
// ObjectArg / CallArg
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectArg {
    ImmOrOwned(SuiObjectRef),
    Shared(SharedObjectRef),
    Receiving(SuiObjectRef),
}

impl ObjectArg {
    pub fn object_id(&self) -> ObjectID {
        match self {
            ObjectArg::ImmOrOwned(r) | ObjectArg::Receiving(r) => r.object_id,
            ObjectArg::Shared(s) => s.object_id,
        }
    }

    pub fn variant_index(&self) -> u8 {
        match self {
            ObjectArg::ImmOrOwned(_) => 0,
            ObjectArg::Shared(_) => 1,
            ObjectArg::Receiving(_) => 2,
        }
    }
}

impl Serializable for ObjectArg {
    fn serialize(&self, ser: &mut Serializer) {
        ser.write_variant(self.variant_index());
        match self {
            ObjectArg::ImmOrOwned(r) | ObjectArg::Receiving(r) => r.serialize(ser),
            ObjectArg::Shared(s) => s.serialize(ser),
        }
    }
}

impl Deserializable for ObjectArg {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        let (tag, offset) = de.read_variant()?;
        match tag {
            0 => Ok(ObjectArg::ImmOrOwned(SuiObjectRef::deserialize(de)?)),
            1 => Ok(ObjectArg::Shared(SharedObjectRef::deserialize(de)?)),
            2 => Ok(ObjectArg::Receiving(SuiObjectRef::deserialize(de)?)),
            _ => Err(DecodeError::UnknownVariant {
                type_name: "ObjectArg",
                tag,
                offset,
            }),
        }
    }
}

/// A fully encoded transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CallArg {
    /// Value already in its on-chain byte form.
    Pure(#[serde(with = "hex_bytes")] Vec<u8>),
    Object(ObjectArg),
}

impl CallArg {
    pub fn object_id(&self) -> Option<ObjectID> {
        match self {
            CallArg::Object(arg) => Some(arg.object_id()),
            CallArg::Pure(_) => None,
        }
    }
}

impl Serializable for CallArg {
    fn serialize(&self, ser: &mut Serializer) {
        match self {
            CallArg::Pure(bytes) => {
                ser.write_variant(0);
                ser.write_bytes(bytes);
            }
            CallArg::Object(arg) => {
                ser.write_variant(1);
                arg.serialize(ser);
            }
        }
    }
}

impl Deserializable for CallArg {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        let (tag, offset) = de.read_variant()?;
        match tag {
            0 => Ok(CallArg::Pure(de.read_bytes()?.to_vec())),
            1 => Ok(CallArg::Object(ObjectArg::deserialize(de)?)),
            _ => Err(DecodeError::UnknownVariant {
                type_name: "CallArg",
                tag,
                offset,
            }),
        }
    }
}

/// Pure bytes travel through JSON as `0x` hex.
mod hex_bytes {
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sui_bcs::{from_bytes, to_bytes};

    fn sample_ref() -> SuiObjectRef {
        SuiObjectRef {
            object_id: SuiAddress::from_u16(0x77),
            version: 9,
            digest: ObjectDigest::new([7; 32]),
        }
    }

    #[test]
    fn test_digest_base58() {
        let digest = ObjectDigest::new([1; 32]);
        let shown = digest.to_string();
        assert_eq!(shown.parse::<ObjectDigest>().unwrap(), digest);
        assert!(matches!(
            "3mJr7AoUXx2Wqd".parse::<ObjectDigest>(),
            Err(DigestParseError::WrongLength { .. })
        ));
        assert!(matches!(
            "not*base58".parse::<ObjectDigest>(),
            Err(DigestParseError::InvalidBase58 { .. })
        ));
    }

    #[test]
    fn test_digest_is_length_prefixed() {
        let bytes = to_bytes(&ObjectDigest::new([9; 32]));
        assert_eq!(bytes.len(), 33);
        assert_eq!(bytes[0], 32);
    }

    #[test]
    fn test_digest_wrong_length_on_wire() {
        let mut bytes = vec![31];
        bytes.extend([0u8; 31]);
        assert!(matches!(
            from_bytes::<ObjectDigest>(&bytes),
            Err(DecodeError::LengthMismatch { expected: 32, actual: 31, .. })
        ));
    }

    #[test]
    fn test_object_ref_layout() {
        let bytes = to_bytes(&sample_ref());
        assert_eq!(bytes.len(), 32 + 8 + 33);
        assert_eq!(&bytes[32..40], &9u64.to_le_bytes());
        assert_eq!(from_bytes::<SuiObjectRef>(&bytes).unwrap(), sample_ref());
    }

    #[test]
    fn test_call_arg_discriminants() {
        let pure = CallArg::Pure(vec![1, 2, 3]);
        assert_eq!(to_bytes(&pure), vec![0, 3, 1, 2, 3]);

        let shared = CallArg::Object(ObjectArg::Shared(SharedObjectRef {
            object_id: SuiAddress::from_u16(6),
            initial_shared_version: 1,
            mutable: false,
        }));
        let bytes = to_bytes(&shared);
        assert_eq!(&bytes[..2], &[1, 1]);
        assert_eq!(*bytes.last().unwrap(), 0);
        assert_eq!(from_bytes::<CallArg>(&bytes).unwrap(), shared);

        let receiving = CallArg::Object(ObjectArg::Receiving(sample_ref()));
        assert_eq!(to_bytes(&receiving)[1], 2);
    }

    #[test]
    fn test_unknown_call_arg() {
        assert_eq!(
            from_bytes::<CallArg>(&[2]),
            Err(DecodeError::UnknownVariant {
                type_name: "CallArg",
                tag: 2,
                offset: 0
            })
        );
        assert!(matches!(
            from_bytes::<ObjectArg>(&[3]),
            Err(DecodeError::UnknownVariant { type_name: "ObjectArg", tag: 3, .. })
        ));
    }

    #[test]
    fn test_owner_json() {
        let owner: ObjectOwner =
            serde_json::from_str(r#"{"kind":"shared","initialSharedVersion":42}"#).unwrap();
        assert_eq!(
            owner,
            ObjectOwner::Shared {
                initial_shared_version: 42
            }
        );
        let pure = serde_json::to_string(&CallArg::Pure(vec![0xab])).unwrap();
        assert_eq!(pure, r#"{"pure":"0xab"}"#);
    }
}
