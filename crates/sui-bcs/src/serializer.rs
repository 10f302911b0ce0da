//! Byte sink, byte source, and the serializable capability.
//!
//! [`Serializer`] appends canonical bytes to an owned buffer. [`Deserializer`]
//! is a cursor over a borrowed slice that tracks its absolute offset, so
//! nested decoders (framed sequence elements) still report positions in the
//! original input.

use crate::error::{DecodeError, DecodeResult};
use crate::uleb128;

// =============================================================================
// Capability traits
// =============================================================================

/// A value that can write itself in canonical form.
///
/// Object safe, so heterogeneous values can be encoded through
/// `Box<dyn Serializable>`.
pub trait Serializable {
    fn serialize(&self, ser: &mut Serializer);
}

/// A value that can be read back from canonical bytes.
pub trait Deserializable: Sized {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self>;
}

impl<T: Serializable + ?Sized> Serializable for &T {
    fn serialize(&self, ser: &mut Serializer) {
        (**self).serialize(ser)
    }
}

impl<T: Serializable + ?Sized> Serializable for Box<T> {
    fn serialize(&self, ser: &mut Serializer) {
        (**self).serialize(ser)
    }
}

impl<T: Deserializable> Deserializable for Box<T> {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        T::deserialize(de).map(Box::new)
    }
}

/// Encode a value into a fresh buffer.
pub fn to_bytes<T: Serializable + ?Sized>(value: &T) -> Vec<u8> {
    let mut ser = Serializer::new();
    value.serialize(&mut ser);
    ser.into_bytes()
}

/// Decode a value that must span all of `bytes`.
pub fn from_bytes<T: Deserializable>(bytes: &[u8]) -> DecodeResult<T> {
    let mut de = Deserializer::new(bytes);
    let value = T::deserialize(&mut de)?;
    de.finish("top-level value")?;
    Ok(value)
}

// =============================================================================
// Serializer
// =============================================================================

/// Append-only canonical byte sink.
#[derive(Debug, Default, Clone)]
pub struct Serializer {
    output: Vec<u8>,
}

impl Serializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            output: Vec::with_capacity(capacity),
        }
    }

    pub fn write_u8(&mut self, value: u8) {
        self.output.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.output.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.output.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u64(&mut self, value: u64) {
        self.output.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_u128(&mut self, value: u128) {
        self.output.extend_from_slice(&value.to_le_bytes());
    }

    pub fn write_bool(&mut self, value: bool) {
        self.output.push(u8::from(value));
    }

    /// Write a length or count as ULEB128.
    pub fn write_uleb128(&mut self, value: u64) {
        uleb128::write_uleb128(&mut self.output, value);
    }

    /// Write a variant discriminant: exactly one byte.
    pub fn write_variant(&mut self, tag: u8) {
        self.output.push(tag);
    }

    /// Write bytes as-is, without a length prefix.
    pub fn write_fixed_bytes(&mut self, bytes: &[u8]) {
        self.output.extend_from_slice(bytes);
    }

    /// Write `uleb128(len) ++ bytes`.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.write_uleb128(bytes.len() as u64);
        self.output.extend_from_slice(bytes);
    }

    /// Write a UTF-8 string through the `Bytes` framing.
    pub fn write_str(&mut self, value: &str) {
        self.write_bytes(value.as_bytes());
    }

    /// Serialize `value` into a scratch buffer and write it as a framed blob.
    pub fn write_framed<T: Serializable + ?Sized>(&mut self, value: &T) {
        let scratch = to_bytes(value);
        self.write_bytes(&scratch);
    }

    pub fn len(&self) -> usize {
        self.output.len()
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.output
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.output
    }
}

// =============================================================================
// Deserializer
// =============================================================================

/// Deepest nesting a recursive value may reach while decoding.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Cursor over canonical bytes.
#[derive(Debug, Clone)]
pub struct Deserializer<'a> {
    input: &'a [u8],
    pos: usize,
    base: usize,
    depth: usize,
}

impl<'a> Deserializer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            base: 0,
            depth: 0,
        }
    }

    /// Child cursor over a frame of the current input; offsets and nesting
    /// depth carry over from the parent.
    fn nested(input: &'a [u8], base: usize, depth: usize) -> Self {
        Self {
            input,
            pos: 0,
            base,
            depth,
        }
    }

    /// Decode one level of a recursive value with `f`, failing with
    /// `DepthLimitExceeded` past [`MAX_NESTING_DEPTH`] levels.
    pub fn with_nesting<T>(
        &mut self,
        type_name: &'static str,
        f: impl FnOnce(&mut Self) -> DecodeResult<T>,
    ) -> DecodeResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(DecodeError::DepthLimitExceeded {
                type_name,
                limit: MAX_NESTING_DEPTH,
                offset: self.offset(),
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Absolute offset of the next unread byte.
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Fail with `LengthMismatch` if any bytes are left unread.
    pub fn finish(&self, context: &'static str) -> DecodeResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::LengthMismatch {
                context,
                expected: self.input.len(),
                actual: self.pos,
            })
        }
    }

    /// Take the next `n` bytes.
    pub fn read_fixed_bytes(&mut self, n: usize) -> DecodeResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(DecodeError::TruncatedInput {
                offset: self.offset(),
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.input[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_fixed_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        Ok(self.read_fixed_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> DecodeResult<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> DecodeResult<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    pub fn read_u64(&mut self) -> DecodeResult<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    pub fn read_u128(&mut self) -> DecodeResult<u128> {
        self.read_array().map(u128::from_le_bytes)
    }

    pub fn read_bool(&mut self) -> DecodeResult<bool> {
        let offset = self.offset();
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            tag => Err(DecodeError::UnknownVariant {
                type_name: "bool",
                tag: u64::from(tag),
                offset,
            }),
        }
    }

    fn ensure_available(&self) -> DecodeResult<()> {
        if self.is_empty() {
            return Err(DecodeError::TruncatedInput {
                offset: self.offset(),
                needed: 1,
                remaining: 0,
            });
        }
        Ok(())
    }

    /// Read a ULEB128 `u64`. An exhausted input is `TruncatedInput`; a varint
    /// that starts but never terminates is `MalformedVarint`.
    pub fn read_uleb128(&mut self) -> DecodeResult<u64> {
        self.ensure_available()?;
        let (value, consumed) =
            uleb128::decode_bounded(&self.input[self.pos..], self.offset(), 64)?;
        self.pos += consumed;
        Ok(value)
    }

    /// Read a ULEB128 length or count; must fit in `u32`.
    pub fn read_length(&mut self) -> DecodeResult<usize> {
        self.ensure_available()?;
        let (value, consumed) =
            uleb128::decode_bounded(&self.input[self.pos..], self.offset(), 32)?;
        self.pos += consumed;
        Ok(value as usize)
    }

    /// Read a one-byte variant discriminant, returning it with its offset for
    /// error reporting. Every byte value is a tag; the caller decides which
    /// ones are known.
    pub fn read_variant(&mut self) -> DecodeResult<(u64, usize)> {
        let offset = self.offset();
        let tag = self.read_u8()?;
        Ok((u64::from(tag), offset))
    }

    /// Read `uleb128(len) ++ bytes`.
    pub fn read_bytes(&mut self) -> DecodeResult<&'a [u8]> {
        let len = self.read_length()?;
        self.read_fixed_bytes(len)
    }

    pub fn read_string(&mut self) -> DecodeResult<String> {
        let offset = self.offset();
        let bytes = self.read_bytes()?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| DecodeError::InvalidUtf8 { offset })
    }

    /// Read a framed blob and decode it as `T`, requiring the frame to be
    /// consumed exactly.
    pub fn read_framed<T: Deserializable>(&mut self) -> DecodeResult<T> {
        let len = self.read_length()?;
        let base = self.offset();
        let frame = self.read_fixed_bytes(len)?;
        let mut inner = Deserializer::nested(frame, base, self.depth);
        let value = T::deserialize(&mut inner)?;
        inner.finish("framed element")?;
        Ok(value)
    }

    /// Guard against declared counts that cannot possibly fit in what is
    /// left, so a hostile length never drives a huge allocation.
    pub fn check_count(&self, count: usize, min_element_size: usize) -> DecodeResult<()> {
        let needed = count.saturating_mul(min_element_size);
        if needed > self.remaining() {
            return Err(DecodeError::TruncatedInput {
                offset: self.offset(),
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_tag_is_one_byte() {
        let mut ser = Serializer::new();
        ser.write_variant(0xc8);
        assert_eq!(ser.as_bytes(), &[0xc8]);

        // A high-bit tag is not the start of a varint.
        let mut de = Deserializer::new(&[0x81, 0x00]);
        assert_eq!(de.read_variant().unwrap(), (0x81, 0));
        assert_eq!(de.offset(), 1);
        assert_eq!(de.read_variant().unwrap(), (0, 1));

        for tag in [0x80u8, 0xc8, 0xff] {
            assert_eq!(
                from_bytes::<Option<u8>>(&[tag]),
                Err(DecodeError::UnknownVariant {
                    type_name: "Option",
                    tag: u64::from(tag),
                    offset: 0
                })
            );
        }
    }

    /// Tag 0 ends the chain, 1 nests inline, 2 nests inside a length frame.
    #[derive(Debug, PartialEq)]
    struct Chain(usize);

    impl Deserializable for Chain {
        fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
            let (tag, offset) = de.read_variant()?;
            match tag {
                0 => Ok(Chain(0)),
                1 => de.with_nesting("Chain", |de| Ok(Chain(Chain::deserialize(de)?.0 + 1))),
                2 => de.with_nesting("Chain", |de| Ok(Chain(de.read_framed::<Chain>()?.0 + 1))),
                _ => Err(DecodeError::UnknownVariant {
                    type_name: "Chain",
                    tag,
                    offset,
                }),
            }
        }
    }

    #[test]
    fn test_nesting_depth_is_bounded() {
        let mut at_limit = vec![1u8; MAX_NESTING_DEPTH];
        at_limit.push(0);
        assert_eq!(from_bytes::<Chain>(&at_limit), Ok(Chain(MAX_NESTING_DEPTH)));

        let mut over = vec![1u8; MAX_NESTING_DEPTH + 1];
        over.push(0);
        assert_eq!(
            from_bytes::<Chain>(&over),
            Err(DecodeError::DepthLimitExceeded {
                type_name: "Chain",
                limit: MAX_NESTING_DEPTH,
                offset: MAX_NESTING_DEPTH + 1,
            })
        );

        // A long run of nesting tags fails fast instead of recursing.
        let hostile = vec![1u8; 1_000_000];
        assert!(matches!(
            from_bytes::<Chain>(&hostile),
            Err(DecodeError::DepthLimitExceeded { .. })
        ));
    }

    #[test]
    fn test_nesting_depth_survives_frames() {
        // The framed level reaches the limit; the level inside the frame is
        // one too many.
        let mut bytes = vec![1u8; MAX_NESTING_DEPTH - 1];
        bytes.extend_from_slice(&[2, 2, 1, 0]);
        let err = from_bytes::<Chain>(&bytes).unwrap_err();
        assert!(matches!(err, DecodeError::DepthLimitExceeded { .. }));
        assert_eq!(err.offset(), Some(MAX_NESTING_DEPTH + 2));

        let mut ok = vec![1u8; MAX_NESTING_DEPTH - 1];
        ok.extend_from_slice(&[2, 1, 0]);
        assert_eq!(from_bytes::<Chain>(&ok), Ok(Chain(MAX_NESTING_DEPTH)));
    }

    #[test]
    fn test_fixed_width_little_endian() {
        let mut ser = Serializer::new();
        ser.write_u16(0x0102);
        ser.write_u32(0x01020304);
        ser.write_u64(1);
        assert_eq!(
            ser.as_bytes(),
            &[0x02, 0x01, 0x04, 0x03, 0x02, 0x01, 1, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_truncated_fixed_read() {
        let mut de = Deserializer::new(&[1, 2, 3]);
        let err = de.read_u64().unwrap_err();
        assert_eq!(
            err,
            DecodeError::TruncatedInput {
                offset: 0,
                needed: 8,
                remaining: 3
            }
        );
    }

    #[test]
    fn test_bool_rejects_other_bytes() {
        let mut de = Deserializer::new(&[2]);
        assert!(matches!(
            de.read_bool(),
            Err(DecodeError::UnknownVariant { type_name: "bool", tag: 2, .. })
        ));
    }

    #[test]
    fn test_framed_read_reports_absolute_offset() {
        // frame of 2 bytes containing a u16, preceded by one unrelated byte
        let bytes = [0xaa, 0x02, 0x05, 0x00];
        let mut de = Deserializer::new(&bytes);
        de.read_u8().unwrap();
        let v: u16 = de.read_framed().unwrap();
        assert_eq!(v, 5);

        // frame claims 3 bytes but a u16 only consumes 2
        let bytes = [0x03, 0x05, 0x00, 0x09];
        let mut de = Deserializer::new(&bytes);
        assert!(matches!(
            de.read_framed::<u16>(),
            Err(DecodeError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_from_bytes_rejects_trailing() {
        assert!(matches!(
            from_bytes::<u8>(&[1, 2]),
            Err(DecodeError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        let mut de = Deserializer::new(&[0x02, 0xff, 0xfe]);
        assert_eq!(de.read_string(), Err(DecodeError::InvalidUtf8 { offset: 0 }));
    }
}
