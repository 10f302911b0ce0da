//! Sui programmable transaction blocks, end to end.
//!
//! - [`bcs`]: the canonical binary codec
//! - [`types`]: addresses, type tags, object references and call arguments
//! - [`ptb`]: commands, the builder, input resolution and the signed envelope
//! - [`spec`]: JSON block descriptions used by the `sui-ptb` tool

pub mod spec;

pub use sui_bcs as bcs;
pub use sui_ptb as ptb;
pub use sui_ptb_types as types;

pub use spec::{parse_ptb_spec, read_ptb_spec, PtbSpec};
