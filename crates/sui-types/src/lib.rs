//! Core value types for Sui programmable transactions.
//!
//! Everything here has a canonical binary form (via `sui-bcs`) and, where a
//! human or a JSON file needs to see it, a string form:
//!
//! - [`SuiAddress`] / [`ObjectID`] - 32 raw bytes, hex on display
//! - [`ObjectDigest`] - 32 bytes, length-prefixed on the wire, base58 on display
//! - [`TypeTag`] / [`StructTag`] - Move types, parsed from `0x2::coin::Coin<0x2::sui::SUI>`
//! - [`CallArg`] / [`ObjectArg`] - encoded transaction inputs
//!
//! The [`framework`] module names the well-known packages and structs, and
//! [`env_utils`] reads configuration overrides from the environment.

pub mod address;
pub mod encoding;
pub mod env_utils;
pub mod error;
pub mod framework;
pub mod object;
pub mod type_parsing;
pub mod type_tag;

pub use address::{ObjectID, SuiAddress, ADDRESS_LENGTH};
pub use error::{AddressParseError, DigestParseError, TypeParseError};
pub use object::{
    CallArg, ObjectArg, ObjectDigest, ObjectOwner, SharedObjectRef, SuiObjectRef, DIGEST_LENGTH,
};
pub use type_parsing::{parse_function_target, parse_type_tag, split_type_params};
pub use type_tag::{StructTag, TypeTag};
