//! Programmable transaction blocks for Sui.
//!
//! - [`argument`] / [`command`]: the tagged unions a block is made of
//! - [`result`]: handles to command outputs, with cached nested results
//! - [`builder`]: assembles inputs and commands
//! - [`resolver`]: turns raw inputs into [`CallArg`](sui_ptb_types::CallArg)s,
//!   consulting signature and object providers
//! - [`validation`]: static reference checks run before encoding
//! - [`transaction`]: the encoded block and its signing envelope

pub mod argument;
pub mod builder;
pub mod command;
pub mod error;
pub mod resolver;
pub mod result;
pub mod transaction;
pub mod validation;

pub use argument::Argument;
pub use builder::ProgrammableTransactionBuilder;
pub use command::{Command, ProgrammableMoveCall, ResultArity};
pub use error::{BuildError, ResolutionError};
pub use resolver::{
    needs_resolution, resolve_inputs, InputSlot, NormalizedFunction, NormalizedType,
    ObjectInfo, ObjectProvider, ParameterKind, PureType, RawValue, ResolvedBlock,
    SignatureProvider, StaticObjectProvider, StaticSignatureProvider,
};
pub use result::TransactionResult;
pub use transaction::{
    GasData, ProgrammableTransaction, TransactionData, TransactionExpiration, TransactionKind,
    INTENT_PREFIX,
};
pub use validation::{
    compute_dependency_graph, validate_ptb, ValidationError, ValidationErrorKind,
    ValidationResult,
};
