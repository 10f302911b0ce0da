//! Errors raised while resolving inputs and finishing a transaction block.
//!
//! Every variant names the input slot and command involved so a malformed
//! block can be diagnosed before anything is signed.

use thiserror::Error;

use sui_ptb_types::{ObjectID, TypeParseError};

use crate::validation::ValidationError;

/// Failure of the input resolution pass. The pass is abandoned and the
/// builder keeps its pre-resolution state.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("input {input_index} cannot be resolved{}: {reason}", at_command(.command_index))]
    UnresolvableInput {
        input_index: u16,
        command_index: Option<usize>,
        reason: String,
    },

    #[error("input {input_index} used by command {command_index} has no unambiguous pure encoding: {reason}")]
    AmbiguousPureEncoding {
        input_index: u16,
        command_index: usize,
        reason: String,
    },

    #[error("signature lookup for {function} (command {command_index}, input {input_index}) failed: {source}")]
    SignatureLookupFailed {
        input_index: u16,
        command_index: usize,
        function: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("object lookup for {object_id} (input {input_index}, command {command_index}) failed: {source}")]
    ObjectLookupFailed {
        input_index: u16,
        command_index: usize,
        object_id: ObjectID,
        #[source]
        source: anyhow::Error,
    },

    #[error("command {command_index} passes {actual} arguments to {function}, which takes {expected}")]
    ArityMismatch {
        command_index: usize,
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("input {input_index} cannot be passed as {expected} to command {command_index}: {reason}")]
    InvalidValueForParameter {
        input_index: u16,
        command_index: usize,
        expected: String,
        reason: String,
    },
}

impl ResolutionError {
    pub fn input_index(&self) -> Option<u16> {
        match self {
            ResolutionError::UnresolvableInput { input_index, .. }
            | ResolutionError::AmbiguousPureEncoding { input_index, .. }
            | ResolutionError::SignatureLookupFailed { input_index, .. }
            | ResolutionError::ObjectLookupFailed { input_index, .. }
            | ResolutionError::InvalidValueForParameter { input_index, .. } => Some(*input_index),
            ResolutionError::ArityMismatch { .. } => None,
        }
    }

    pub fn command_index(&self) -> Option<usize> {
        match self {
            ResolutionError::UnresolvableInput { command_index, .. } => *command_index,
            ResolutionError::AmbiguousPureEncoding { command_index, .. }
            | ResolutionError::SignatureLookupFailed { command_index, .. }
            | ResolutionError::ObjectLookupFailed { command_index, .. }
            | ResolutionError::ArityMismatch { command_index, .. }
            | ResolutionError::InvalidValueForParameter { command_index, .. } => {
                Some(*command_index)
            }
        }
    }
}

fn at_command(command_index: &Option<usize>) -> String {
    command_index
        .map(|idx| format!(" at command {}", idx))
        .unwrap_or_default()
}

/// Failure to produce an encodable transaction block.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("transaction block failed validation: {}", summarize(.0))]
    Invalid(Vec<ValidationError>),

    #[error("input {input_index} is still unresolved; run resolution before finishing")]
    Unresolved { input_index: u16 },

    #[error("too many {what}: at most 65535 can be addressed")]
    IndexOverflow { what: &'static str },

    #[error("invalid call target: {0}")]
    Target(#[from] TypeParseError),
}

fn summarize(errors: &[ValidationError]) -> String {
    match errors {
        [] => "no errors recorded".to_string(),
        [only] => only.message.clone(),
        [first, rest @ ..] => format!("{} (and {} more)", first.message, rest.len()),
    }
}
