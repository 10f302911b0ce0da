//! Binary Canonical Serialization for Sui transactions.
//!
//! The substrate every on-chain value is written with:
//!
//! - [`uleb128`]: variable-length integers for lengths and discriminants
//! - [`serializer`]: the [`Serializer`] byte sink, the [`Deserializer`]
//!   cursor, and the [`Serializable`] / [`Deserializable`] capability
//! - [`primitives`]: fixed-width little-endian integers, `bool`, byte arrays,
//!   [`U256`], `Option<T>`
//! - [`containers`]: [`Bytes`], [`ByteSequence`], [`Sequence`], [`BString`]
//! - [`map`]: [`BcsMap`], whose encoding does not depend on insertion order
//!
//! Decoding never returns a partial value: every failure is a [`DecodeError`]
//! carrying the offset it happened at.
//!
//! ```
//! use sui_bcs::{from_bytes, to_bytes, BString, Sequence};
//!
//! let names = Sequence::new(vec![BString::from("coin"), BString::from("sui")]);
//! let bytes = to_bytes(&names);
//! assert_eq!(from_bytes::<Sequence<BString>>(&bytes).unwrap(), names);
//! ```

pub mod containers;
pub mod error;
pub mod map;
pub mod primitives;
pub mod serializer;
pub mod uleb128;

pub use containers::{
    deserialize_sequence, serialize_sequence, BString, ByteSequence, Bytes, Sequence,
};
pub use error::{DecodeError, DecodeResult};
pub use map::BcsMap;
pub use primitives::U256;
pub use serializer::{
    from_bytes, to_bytes, Deserializable, Deserializer, Serializable, Serializer,
    MAX_NESTING_DEPTH,
};
pub use uleb128::{decode_uleb128, encode_uleb128};
