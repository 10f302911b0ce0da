//! Parse errors for addresses, digests and type strings.

use thiserror::Error;

/// Failure parsing an address or object ID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    #[error("empty address")]
    Empty,
    #[error("address '{input}' has {digits} hex digits, at most 64 allowed")]
    TooLong { input: String, digits: usize },
    #[error("invalid hex in address '{input}': {reason}")]
    InvalidHex { input: String, reason: String },
    #[error("address must be {expected} bytes, got {actual}")]
    WrongLength { expected: usize, actual: usize },
}

/// Failure parsing a base58 object digest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestParseError {
    #[error("invalid base58 digest '{input}': {reason}")]
    InvalidBase58 { input: String, reason: String },
    #[error("digest must be 32 bytes, got {actual}")]
    WrongLength { actual: usize },
}

/// Failure parsing a Move type string or call target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeParseError {
    #[error("empty type string")]
    Empty,
    #[error("invalid address in '{input}': {source}")]
    Address {
        input: String,
        #[source]
        source: AddressParseError,
    },
    #[error("invalid identifier '{0}'")]
    Identifier(String),
    #[error("expected 'address::module::name' but got '{0}'")]
    MalformedPath(String),
    #[error("unbalanced angle brackets in '{0}'")]
    UnbalancedBrackets(String),
    #[error("type nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}
