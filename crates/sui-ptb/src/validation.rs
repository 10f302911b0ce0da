//! Static checks over a command list.
//!
//! Catches the mistakes that would otherwise only surface on chain:
//! - Forward references (referencing results that haven't been produced yet)
//! - Self-references (command using its own result)
//! - Out of bounds input references
//! - `NestedResult` into a command that yields no values or a single value
//!
//! Unused results are reported as warnings only.

use std::collections::{HashMap, HashSet};

use crate::argument::Argument;
use crate::command::{Command, ResultArity};

/// Result of PTB validation.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the PTB is valid.
    pub valid: bool,
    /// List of validation errors found.
    pub errors: Vec<ValidationError>,
    /// List of validation warnings (non-fatal issues).
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// A passing result with no errors and no warnings.
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// A failing result carrying `errors`. `valid` is false even when
    /// `errors` is empty.
    pub fn failed(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: false,
            errors,
            warnings: Vec::new(),
        }
    }

    /// Append a non-fatal warning; `valid` is left unchanged.
    pub fn with_warning(mut self, warning: String) -> Self {
        self.warnings.push(warning);
        self
    }
}

/// A specific validation error in a PTB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The command index where the error was found.
    pub command_index: usize,
    pub kind: ValidationErrorKind,
    /// Human-readable description of the error.
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Reference to a result that doesn't exist yet (forward reference).
    ForwardReference,
    /// Reference to an input index that's out of bounds.
    InputOutOfBounds,
    /// Self-reference (command references its own result).
    SelfReference,
    /// Reference to the output of a command that produces none.
    NoResult,
    /// `NestedResult` into a single-value command, or past the last value.
    InvalidNestedIndex,
}

/// Validate a PTB before encoding.
///
/// # Arguments
/// * `commands` - The commands to validate
/// * `num_inputs` - Number of transaction inputs available
pub fn validate_ptb(commands: &[Command], num_inputs: usize) -> ValidationResult {
    let mut errors = Vec::new();

    for (cmd_idx, cmd) in commands.iter().enumerate() {
        for arg in cmd.arguments() {
            if let Some(error) = check_argument(commands, cmd_idx, *arg, num_inputs) {
                errors.push(error);
            }
        }
    }

    if !errors.is_empty() {
        return ValidationResult::failed(errors);
    }

    let mut result_used = vec![false; commands.len()];
    for arg in commands.iter().flat_map(Command::arguments) {
        if let Some(idx) = arg.result_index() {
            if let Some(used) = result_used.get_mut(idx as usize) {
                *used = true;
            }
        }
    }

    let mut result = ValidationResult::ok();
    // The last command's result doesn't need to be used.
    let last = commands.len().saturating_sub(1);
    for (idx, used) in result_used.iter().enumerate() {
        if *used || idx == last {
            continue;
        }
        if matches!(commands[idx].result_arity(), ResultArity::None) {
            continue;
        }
        result = result.with_warning(format!(
            "Command {} result is never used (potential dead code)",
            idx
        ));
    }
    result
}

fn check_argument(
    commands: &[Command],
    cmd_idx: usize,
    arg: Argument,
    num_inputs: usize,
) -> Option<ValidationError> {
    let error = |kind, message| {
        Some(ValidationError {
            command_index: cmd_idx,
            kind,
            message,
        })
    };

    match arg {
        Argument::GasCoin => None,
        Argument::Input(idx) if (idx as usize) >= num_inputs => error(
            ValidationErrorKind::InputOutOfBounds,
            format!(
                "Command {} references Input({}) but only {} inputs available",
                cmd_idx, idx, num_inputs
            ),
        ),
        Argument::Input(_) => None,
        Argument::Result(result_idx) | Argument::NestedResult(result_idx, _) => {
            let result_idx = result_idx as usize;
            if result_idx == cmd_idx {
                return error(
                    ValidationErrorKind::SelfReference,
                    format!("Command {} references its own result {}", cmd_idx, arg),
                );
            }
            if result_idx > cmd_idx {
                return error(
                    ValidationErrorKind::ForwardReference,
                    format!(
                        "Command {} references {} which hasn't been produced yet",
                        cmd_idx, arg
                    ),
                );
            }
            let target = &commands[result_idx];
            match (target.result_arity(), arg) {
                (ResultArity::None, _) => error(
                    ValidationErrorKind::NoResult,
                    format!(
                        "Command {} references {} but {} produces no result",
                        cmd_idx,
                        arg,
                        target.name()
                    ),
                ),
                (ResultArity::Single, Argument::NestedResult(_, _)) => error(
                    ValidationErrorKind::InvalidNestedIndex,
                    format!(
                        "Command {} references {} but {} produces a single value; use Result({})",
                        cmd_idx,
                        arg,
                        target.name(),
                        result_idx
                    ),
                ),
                (ResultArity::Exactly(n), Argument::NestedResult(_, sub)) if sub as usize >= n => {
                    error(
                        ValidationErrorKind::InvalidNestedIndex,
                        format!(
                            "Command {} references {} but {} produces only {} values",
                            cmd_idx,
                            arg,
                            target.name(),
                            n
                        ),
                    )
                }
                _ => None,
            }
        }
    }
}

/// Compute the dependency graph of commands in a PTB.
///
/// Returns a map from command index to the set of command indices it depends on.
pub fn compute_dependency_graph(commands: &[Command]) -> HashMap<usize, HashSet<usize>> {
    commands
        .iter()
        .enumerate()
        .map(|(cmd_idx, cmd)| {
            let deps = cmd
                .arguments()
                .into_iter()
                .filter_map(|arg| arg.result_index().map(usize::from))
                .collect();
            (cmd_idx, deps)
        })
        .collect()
}
