//! Encoding utilities for hex, base64 and base58.
//!
//! Encoded transactions leave this crate as base64 (what a transport hands to
//! a node) or hex (what humans paste into a terminal). Object digests are
//! base58.

use anyhow::{anyhow, Result};
use base64::Engine;

use crate::address::SuiAddress;

// =============================================================================
// Hex
// =============================================================================

/// Parse a hex string to a SuiAddress with context-aware error message.
///
/// # Arguments
/// * `hex_str` - Hex string (with or without 0x prefix)
/// * `context` - Description for error messages (e.g., "object ID", "package address")
pub fn parse_address(hex_str: &str, context: &str) -> Result<SuiAddress> {
    SuiAddress::from_hex_literal(hex_str)
        .map_err(|e| anyhow!("Invalid {} '{}': {}", context, hex_str, e))
}

/// Parse a hex string to raw bytes.
pub fn parse_hex_bytes(hex_str: &str, context: &str) -> Result<Vec<u8>> {
    let hex_str = hex_str.trim();
    let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    hex::decode(hex_str).map_err(|e| anyhow!("Invalid {} hex '{}': {}", context, hex_str, e))
}

/// `0x`-prefixed lowercase hex.
pub fn hex_encode(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

// =============================================================================
// Base64
// =============================================================================

/// Encode bytes to base64 string.
pub fn base64_encode(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Decode base64 string to bytes with context-aware error message.
///
/// # Arguments
/// * `b64` - Base64 encoded string
/// * `context` - Description for error messages (e.g., "module bytecode", "transaction bytes")
pub fn base64_decode(b64: &str, context: &str) -> Result<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|e| anyhow!("Failed to decode {} from base64: {}", context, e))
}

/// Accepts `0x`-prefixed hex or base64.
///
/// Bare strings are tried as base64 first; only an explicit `0x` selects hex.
pub fn decode_hex_or_base64(input: &str, context: &str) -> Result<Vec<u8>> {
    let input = input.trim();
    if input.starts_with("0x") {
        parse_hex_bytes(input, context)
    } else {
        base64_decode(input, context)
    }
}

// =============================================================================
// Base58
// =============================================================================

pub fn base58_encode(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

pub fn base58_decode(s: &str) -> std::result::Result<Vec<u8>, bs58::decode::Error> {
    bs58::decode(s.trim()).into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        let addr = parse_address("0x2", "test").unwrap();
        assert_eq!(addr, SuiAddress::from_u16(2));

        let result = parse_address("invalid", "package");
        assert!(result.unwrap_err().to_string().contains("Invalid package"));
    }

    #[test]
    fn test_base64_roundtrip() {
        let original = b"hello world";
        let encoded = base64_encode(original);
        let decoded = base64_decode(&encoded, "test").unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_base64_decode_error() {
        let result = base64_decode("not-valid-base64!!!", "test data");
        assert!(result.unwrap_err().to_string().contains("test data"));
    }

    #[test]
    fn test_hex_or_base64() {
        assert_eq!(decode_hex_or_base64("0x0102", "t").unwrap(), vec![1, 2]);
        assert_eq!(decode_hex_or_base64("AQI=", "t").unwrap(), vec![1, 2]);
        assert_eq!(hex_encode(&[0xab, 0x01]), "0xab01");
    }

    #[test]
    fn test_base58() {
        let encoded = base58_encode(&[0, 0, 1]);
        assert_eq!(encoded, "112");
        assert_eq!(base58_decode(&encoded).unwrap(), vec![0, 0, 1]);
        assert!(base58_decode("0OIl").is_err());
    }
}
