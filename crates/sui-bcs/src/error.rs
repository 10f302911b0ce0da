//! Decode error taxonomy.
//!
//! Every decode path returns one of these instead of a partially built
//! value. Offsets are byte positions in the outermost input buffer, so a
//! caller can point at the exact byte that broke a transaction.

use thiserror::Error;

/// Result alias for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Failure while decoding canonical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A ULEB128 varint never terminated, overflowed its target width, or was
    /// not minimally encoded.
    #[error("malformed ULEB128 varint at offset {offset}: {reason}")]
    MalformedVarint { offset: usize, reason: &'static str },

    /// The input ended before a value was complete.
    #[error("truncated input at offset {offset}: needed {needed} bytes, {remaining} remaining")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// A discriminant byte does not name any variant of the union being decoded.
    #[error("unknown {type_name} variant {tag} at offset {offset}")]
    UnknownVariant {
        type_name: &'static str,
        tag: u64,
        offset: usize,
    },

    /// A framed value did not consume exactly the bytes it declared, or
    /// trailing bytes were left after a top-level decode.
    #[error("length mismatch in {context}: expected {expected} bytes, consumed {actual}")]
    LengthMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A `BString` payload was not valid UTF-8.
    #[error("invalid UTF-8 string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// A recursive value nested deeper than the decoder allows.
    #[error("{type_name} nested deeper than {limit} levels at offset {offset}")]
    DepthLimitExceeded {
        type_name: &'static str,
        limit: usize,
        offset: usize,
    },
}

impl DecodeError {
    /// Byte offset the error refers to, when it has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            DecodeError::MalformedVarint { offset, .. }
            | DecodeError::TruncatedInput { offset, .. }
            | DecodeError::UnknownVariant { offset, .. }
            | DecodeError::InvalidUtf8 { offset }
            | DecodeError::DepthLimitExceeded { offset, .. } => Some(*offset),
            DecodeError::LengthMismatch { .. } => None,
        }
    }
}
