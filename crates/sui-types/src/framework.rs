//! Sui framework package addresses and well-known struct paths.
//!
//! The struct paths are the ones the resolver needs to recognise when it
//! frames pure values (`String`, `ID`, `Option`) or skips `TxContext`
//! parameters.
//!
//! # Example
//!
//! ```
//! use sui_ptb_types::framework::{is_struct, MOVE_STDLIB, STD_STRING, SUI_FRAMEWORK};
//!
//! assert!(is_struct(STD_STRING, &MOVE_STDLIB, "string", "String"));
//! assert_eq!(SUI_FRAMEWORK.to_short_string(), "0x2");
//! ```

use crate::address::SuiAddress;

// ============================================================================
// Framework Package Addresses
// ============================================================================

/// Move standard library address (0x1)
pub const MOVE_STDLIB: SuiAddress = SuiAddress::from_u16(1);

/// Sui framework address (0x2)
pub const SUI_FRAMEWORK: SuiAddress = SuiAddress::from_u16(2);

// ============================================================================
// Well-Known Struct Paths
// ============================================================================

/// `(address, module, name)` of a struct the resolver treats specially.
pub type StructPath = (SuiAddress, &'static str, &'static str);

/// `0x1::string::String` is framed as UTF-8 bytes.
pub const STD_STRING: StructPath = (MOVE_STDLIB, "string", "String");

/// `0x1::ascii::String` is framed as ASCII bytes.
pub const STD_ASCII_STRING: StructPath = (MOVE_STDLIB, "ascii", "String");

/// `0x1::option::Option<T>` is framed as a vector of zero or one `T`.
pub const STD_OPTION: StructPath = (MOVE_STDLIB, "option", "Option");

/// `0x2::object::ID` is framed as a raw address.
pub const OBJECT_ID: StructPath = (SUI_FRAMEWORK, "object", "ID");

/// `0x2::tx_context::TxContext` is injected by the runtime, never passed.
pub const TX_CONTEXT: StructPath = (SUI_FRAMEWORK, "tx_context", "TxContext");

/// `0x2::transfer::Receiving<T>` marks an object sent to the sender earlier.
pub const RECEIVING: StructPath = (SUI_FRAMEWORK, "transfer", "Receiving");

/// Does `(address, module, name)` name the struct at `path`?
pub fn is_struct(path: StructPath, address: &SuiAddress, module: &str, name: &str) -> bool {
    path.0 == *address && path.1 == module && path.2 == name
}
