//! Length-prefixed containers: `Bytes`, `ByteSequence`, `Sequence`, `BString`.
//!
//! `Sequence` frames every element: the element is serialized into a scratch
//! buffer and written as `uleb128(len) ++ bytes`. Peers depend on this exact
//! layout, including for scalar elements, so it must not be flattened.

use std::fmt;
use std::ops::Deref;

use crate::error::DecodeResult;
use crate::serializer::{from_bytes, Deserializable, Deserializer, Serializable, Serializer};

// =============================================================================
// Bytes
// =============================================================================

/// Opaque blob written as `uleb128(len) ++ bytes`.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for Bytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Bytes {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes(0x{})", hex::encode(&self.0))
    }
}

impl Serializable for Bytes {
    fn serialize(&self, ser: &mut Serializer) {
        ser.write_bytes(&self.0);
    }
}

impl Deserializable for Bytes {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        de.read_bytes().map(|b| Self(b.to_vec()))
    }
}

// =============================================================================
// ByteSequence
// =============================================================================

/// A count followed by that many `Bytes` values (module bytecode lists).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteSequence(pub Vec<Vec<u8>>);

impl ByteSequence {
    pub fn new(items: Vec<Vec<u8>>) -> Self {
        Self(items)
    }

    pub fn into_inner(self) -> Vec<Vec<u8>> {
        self.0
    }
}

impl Deref for ByteSequence {
    type Target = [Vec<u8>];

    fn deref(&self) -> &[Vec<u8>] {
        &self.0
    }
}

impl Serializable for ByteSequence {
    fn serialize(&self, ser: &mut Serializer) {
        ser.write_uleb128(self.0.len() as u64);
        for item in &self.0 {
            ser.write_bytes(item);
        }
    }
}

impl Deserializable for ByteSequence {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        let count = de.read_length()?;
        // every item carries at least its one-byte length prefix
        de.check_count(count, 1)?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(de.read_bytes()?.to_vec());
        }
        Ok(Self(items))
    }
}

// =============================================================================
// Sequence
// =============================================================================

/// A count followed by that many framed elements.
///
/// Decoding as raw frames ([`Sequence::decode_frames`]) is valid for any
/// element type; decoding as `T` is a reinterpretation the caller chooses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sequence<T>(pub Vec<T>);

impl<T> Sequence<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self(items)
    }

    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> Deref for Sequence<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T> From<Vec<T>> for Sequence<T> {
    fn from(items: Vec<T>) -> Self {
        Self(items)
    }
}

impl<T> FromIterator<T> for Sequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Write a framed sequence from a slice without wrapping it first.
pub fn serialize_sequence<T: Serializable>(items: &[T], ser: &mut Serializer) {
    ser.write_uleb128(items.len() as u64);
    for item in items {
        ser.write_framed(item);
    }
}

/// Read a framed sequence into a `Vec`.
pub fn deserialize_sequence<T: Deserializable>(de: &mut Deserializer<'_>) -> DecodeResult<Vec<T>> {
    let count = de.read_length()?;
    de.check_count(count, 1)?;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(de.read_framed()?);
    }
    Ok(items)
}

impl<T: Serializable> Serializable for Sequence<T> {
    fn serialize(&self, ser: &mut Serializer) {
        serialize_sequence(&self.0, ser);
    }
}

impl<T: Deserializable> Deserializable for Sequence<T> {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        deserialize_sequence(de).map(Self)
    }
}

impl Sequence<Vec<u8>> {
    /// Read a sequence without knowing its element type, returning each
    /// element's raw frame.
    pub fn decode_frames(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        let count = de.read_length()?;
        de.check_count(count, 1)?;
        let mut frames = Vec::with_capacity(count);
        for _ in 0..count {
            frames.push(de.read_bytes()?.to_vec());
        }
        Ok(Self(frames))
    }

    /// Reinterpret raw frames as `T`; each frame must decode completely.
    pub fn from_frames<T: Deserializable>(&self) -> DecodeResult<Sequence<T>> {
        self.0
            .iter()
            .map(|frame| from_bytes::<T>(frame))
            .collect::<DecodeResult<Vec<_>>>()
            .map(Sequence)
    }
}

// =============================================================================
// BString
// =============================================================================

/// UTF-8 string written through the `Bytes` framing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BString(pub String);

impl BString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BString {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for BString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serializable for BString {
    fn serialize(&self, ser: &mut Serializer) {
        ser.write_str(&self.0);
    }
}

impl Deserializable for BString {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        de.read_string().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use crate::serializer::to_bytes;

    #[test]
    fn test_sequence_frames_scalars() {
        let seq = Sequence::new(vec![1u16, 2u16]);
        assert_eq!(to_bytes(&seq), vec![2, 2, 1, 0, 2, 2, 0]);
    }

    #[test]
    fn test_empty_sequence() {
        assert_eq!(to_bytes(&Sequence::<u64>::default()), vec![0]);
        assert_eq!(from_bytes::<Sequence<u64>>(&[0]).unwrap().len(), 0);
    }

    #[test]
    fn test_sequence_truncated() {
        // claims 2 elements, only one present
        let err = from_bytes::<Sequence<u8>>(&[2, 1, 9]).unwrap_err();
        assert!(matches!(err, DecodeError::TruncatedInput { .. }));
    }

    #[test]
    fn test_heterogeneous_sequence_decodes_as_frames() {
        let items: Vec<Box<dyn Serializable>> = vec![
            Box::new(7u8),
            Box::new(BString::from("hi")),
            Box::new(300u64),
        ];
        let bytes = to_bytes(&Sequence::new(items));

        let mut de = Deserializer::new(&bytes);
        let frames = Sequence::decode_frames(&mut de).unwrap();
        de.finish("test").unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0], vec![7]);
        assert_eq!(frames[1], vec![2, b'h', b'i']);
        assert_eq!(from_bytes::<u64>(&frames[2]).unwrap(), 300);
    }

    #[test]
    fn test_frames_reinterpret() {
        let seq = Sequence::new(vec![10u32, 20, 30]);
        let bytes = to_bytes(&seq);
        let frames = Sequence::decode_frames(&mut Deserializer::new(&bytes)).unwrap();
        assert_eq!(frames.from_frames::<u32>().unwrap(), seq);
        assert!(frames.from_frames::<u8>().is_err());
    }

    #[test]
    fn test_byte_sequence_layout() {
        let seq = ByteSequence::new(vec![vec![0xaa], vec![]]);
        assert_eq!(to_bytes(&seq), vec![2, 1, 0xaa, 0]);
        assert_eq!(from_bytes::<ByteSequence>(&[2, 1, 0xaa, 0]).unwrap(), seq);
    }

    #[test]
    fn test_bstring_roundtrip() {
        let s = BString::from("coin");
        assert_eq!(to_bytes(&s), b"\x04coin".to_vec());
        assert_eq!(from_bytes::<BString>(b"\x04coin").unwrap(), s);
    }

    #[test]
    fn test_huge_declared_count_rejected_before_allocation() {
        let mut bytes = crate::uleb128::encode_uleb128(u32::MAX as u64);
        bytes.push(0);
        assert!(matches!(
            from_bytes::<Sequence<u8>>(&bytes),
            Err(DecodeError::TruncatedInput { .. })
        ));
    }
}
