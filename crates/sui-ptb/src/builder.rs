//! Builder for programmable transaction blocks.
//!
//! Inputs are registered either already encoded ([`pure`], [`obj`]) or as
//! [`RawValue`]s whose encoding is decided later by [`resolve`]. Commands are
//! appended in order and each returns a [`TransactionResult`] handle that
//! later commands use to reference its output.
//!
//! ```
//! use sui_ptb::{Argument, ProgrammableTransactionBuilder};
//! use sui_ptb_types::SuiAddress;
//!
//! let mut builder = ProgrammableTransactionBuilder::new();
//! let recipient = builder.pure(&SuiAddress::from_u16(0xa11c)).unwrap();
//! let amount = builder.pure(&100u64).unwrap();
//! let coin = builder.split_coins(Argument::GasCoin, vec![amount]).unwrap();
//! builder.transfer_objects(vec![coin.argument()], recipient).unwrap();
//!
//! let pt = builder.finish().unwrap();
//! assert_eq!(pt.commands.len(), 2);
//! ```
//!
//! [`pure`]: ProgrammableTransactionBuilder::pure
//! [`obj`]: ProgrammableTransactionBuilder::obj
//! [`resolve`]: ProgrammableTransactionBuilder::resolve

use std::collections::HashMap;

use sui_bcs::{to_bytes, Serializable};
use sui_ptb_types::{parse_function_target, CallArg, ObjectArg, ObjectID, TypeTag};
use tracing::{debug, trace, warn};

use crate::argument::Argument;
use crate::command::{Command, ProgrammableMoveCall};
use crate::error::BuildError;
use crate::resolver::{resolve_inputs, InputSlot, ObjectProvider, RawValue, SignatureProvider};
use crate::result::TransactionResult;
use crate::transaction::ProgrammableTransaction;
use crate::validation::validate_ptb;

#[derive(Debug, Clone, Default)]
pub struct ProgrammableTransactionBuilder {
    inputs: Vec<InputSlot>,
    commands: Vec<Command>,
    /// Slot of each object id registered so far.
    objects: HashMap<ObjectID, u16>,
    /// Slot of each distinct pre-encoded pure value.
    pures: HashMap<Vec<u8>, u16>,
}

impl ProgrammableTransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Inputs
    // =========================================================================

    fn push_input(&mut self, slot: InputSlot) -> Result<u16, BuildError> {
        let idx = u16::try_from(self.inputs.len())
            .map_err(|_| BuildError::IndexOverflow { what: "inputs" })?;
        self.inputs.push(slot);
        Ok(idx)
    }

    /// Add already-encoded pure bytes. Identical bytes share one slot.
    pub fn pure_bytes(&mut self, bytes: Vec<u8>) -> Result<Argument, BuildError> {
        if let Some(&idx) = self.pures.get(&bytes) {
            return Ok(Argument::Input(idx));
        }
        let idx = self.push_input(InputSlot::Resolved(CallArg::Pure(bytes.clone())))?;
        self.pures.insert(bytes, idx);
        Ok(Argument::Input(idx))
    }

    /// Add a pure value encoded with its own canonical form.
    pub fn pure<T: Serializable + ?Sized>(&mut self, value: &T) -> Result<Argument, BuildError> {
        self.pure_bytes(to_bytes(value))
    }

    /// Add a value whose encoding is decided during resolution.
    ///
    /// Raw values are not deduplicated here; equal values passed to Move
    /// calls are unified by [`resolve`](Self::resolve).
    pub fn raw(&mut self, value: impl Into<RawValue>) -> Result<Argument, BuildError> {
        match value.into() {
            RawValue::ObjectId(id) => self.object(id),
            value => Ok(Argument::Input(self.push_input(InputSlot::Raw(value))?)),
        }
    }

    /// Add an object by id only; its reference is fetched during resolution.
    pub fn object(&mut self, id: ObjectID) -> Result<Argument, BuildError> {
        if let Some(&idx) = self.objects.get(&id) {
            return Ok(Argument::Input(idx));
        }
        let idx = self.push_input(InputSlot::Raw(RawValue::ObjectId(id)))?;
        self.objects.insert(id, idx);
        Ok(Argument::Input(idx))
    }

    /// Add a fully specified object input.
    ///
    /// Registering an object that is already present reuses its slot. An
    /// id-only slot is upgraded to the given reference, and a shared object
    /// registered twice is mutable if either registration was.
    pub fn obj(&mut self, arg: ObjectArg) -> Result<Argument, BuildError> {
        let id = arg.object_id();
        let Some(&idx) = self.objects.get(&id) else {
            let idx = self.push_input(InputSlot::Resolved(CallArg::Object(arg)))?;
            self.objects.insert(id, idx);
            return Ok(Argument::Input(idx));
        };

        let slot = &mut self.inputs[idx as usize];
        match slot {
            InputSlot::Raw(_) => {
                trace!(input = idx, object = %id, "upgraded id-only object input");
                *slot = InputSlot::Resolved(CallArg::Object(arg));
            }
            InputSlot::Resolved(CallArg::Object(ObjectArg::Shared(existing))) => {
                if let ObjectArg::Shared(new) = arg {
                    existing.mutable |= new.mutable;
                }
            }
            InputSlot::Resolved(_) => {}
        }
        Ok(Argument::Input(idx))
    }

    pub fn input(&mut self, arg: CallArg) -> Result<Argument, BuildError> {
        match arg {
            CallArg::Pure(bytes) => self.pure_bytes(bytes),
            CallArg::Object(obj) => self.obj(obj),
        }
    }

    pub fn gas_coin(&self) -> Argument {
        Argument::GasCoin
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Append a command and return the handle to its output.
    pub fn append_command(&mut self, command: Command) -> Result<TransactionResult, BuildError> {
        let idx = u16::try_from(self.commands.len())
            .map_err(|_| BuildError::IndexOverflow { what: "commands" })?;
        trace!(command = idx, kind = command.name(), "appending command");
        self.commands.push(command);
        Ok(TransactionResult::new(idx))
    }

    pub fn move_call(
        &mut self,
        package: ObjectID,
        module: &str,
        function: &str,
        type_arguments: Vec<TypeTag>,
        arguments: Vec<Argument>,
    ) -> Result<TransactionResult, BuildError> {
        self.append_command(Command::MoveCall(Box::new(ProgrammableMoveCall {
            package,
            module: module.to_string(),
            function: function.to_string(),
            type_arguments,
            arguments,
        })))
    }

    /// `move_call` with a `0x2::coin::split` style target.
    pub fn move_call_target(
        &mut self,
        target: &str,
        type_arguments: Vec<TypeTag>,
        arguments: Vec<Argument>,
    ) -> Result<TransactionResult, BuildError> {
        let (package, module, function) = parse_function_target(target)?;
        self.move_call(package, &module, &function, type_arguments, arguments)
    }

    pub fn transfer_objects(
        &mut self,
        objects: Vec<Argument>,
        address: Argument,
    ) -> Result<(), BuildError> {
        self.append_command(Command::TransferObjects { objects, address })
            .map(drop)
    }

    /// One new coin per amount, addressed with [`TransactionResult::nested`].
    /// `Result(i)` only stands for the coin when there is a single amount.
    pub fn split_coins(
        &mut self,
        coin: Argument,
        amounts: Vec<Argument>,
    ) -> Result<TransactionResult, BuildError> {
        self.append_command(Command::SplitCoins { coin, amounts })
    }

    pub fn merge_coins(
        &mut self,
        destination: Argument,
        sources: Vec<Argument>,
    ) -> Result<(), BuildError> {
        self.append_command(Command::MergeCoins {
            destination,
            sources,
        })
        .map(drop)
    }

    pub fn make_move_vec(
        &mut self,
        type_tag: Option<TypeTag>,
        elements: Vec<Argument>,
    ) -> Result<TransactionResult, BuildError> {
        self.append_command(Command::MakeMoveVec { elements, type_tag })
    }

    /// Returns the new package's `UpgradeCap`.
    pub fn publish(
        &mut self,
        modules: Vec<Vec<u8>>,
        dependencies: Vec<ObjectID>,
    ) -> Result<TransactionResult, BuildError> {
        self.append_command(Command::Publish {
            modules,
            dependencies,
        })
    }

    /// Returns the `UpgradeReceipt`.
    pub fn upgrade(
        &mut self,
        modules: Vec<Vec<u8>>,
        dependencies: Vec<ObjectID>,
        package: ObjectID,
        ticket: Argument,
    ) -> Result<TransactionResult, BuildError> {
        self.append_command(Command::Upgrade {
            modules,
            dependencies,
            package,
            ticket,
        })
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn inputs(&self) -> &[InputSlot] {
        &self.inputs
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn is_resolved(&self) -> bool {
        self.inputs.iter().all(InputSlot::is_resolved)
    }

    // =========================================================================
    // Resolution and finishing
    // =========================================================================

    /// Resolve every raw input.
    ///
    /// Takes `&mut self` for the whole pass, so two passes can never run over
    /// the same builder at once. On error the builder is left exactly as it
    /// was.
    pub async fn resolve(
        &mut self,
        signatures: &dyn SignatureProvider,
        objects: &dyn ObjectProvider,
    ) -> Result<(), BuildError> {
        let block = resolve_inputs(&self.inputs, &self.commands, signatures, objects).await?;

        self.objects.clear();
        self.pures.clear();
        for (idx, arg) in block.inputs.iter().enumerate() {
            let idx = idx as u16;
            match arg {
                CallArg::Pure(bytes) => {
                    self.pures.entry(bytes.clone()).or_insert(idx);
                }
                CallArg::Object(obj) => {
                    self.objects.entry(obj.object_id()).or_insert(idx);
                }
            }
        }
        self.inputs = block.inputs.into_iter().map(InputSlot::Resolved).collect();
        self.commands = block.commands;
        debug!(inputs = self.inputs.len(), commands = self.commands.len(), "committed resolution");
        Ok(())
    }

    /// Validate and produce the encodable block. Every input must be resolved.
    pub fn finish(self) -> Result<ProgrammableTransaction, BuildError> {
        let inputs = self
            .inputs
            .into_iter()
            .enumerate()
            .map(|(idx, slot)| match slot {
                InputSlot::Resolved(arg) => Ok(arg),
                InputSlot::Raw(_) => Err(BuildError::Unresolved {
                    input_index: idx as u16,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let validation = validate_ptb(&self.commands, inputs.len());
        for warning in &validation.warnings {
            warn!("{}", warning);
        }
        if !validation.valid {
            return Err(BuildError::Invalid(validation.errors));
        }

        Ok(ProgrammableTransaction {
            inputs,
            commands: self.commands,
        })
    }

    /// Resolve if needed, then finish.
    pub async fn build(
        mut self,
        signatures: &dyn SignatureProvider,
        objects: &dyn ObjectProvider,
    ) -> Result<ProgrammableTransaction, BuildError> {
        if !self.is_resolved() {
            self.resolve(signatures, objects).await?;
        }
        self.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;
    use sui_bcs::BString;
    use sui_ptb_types::{ObjectDigest, SharedObjectRef, SuiAddress, SuiObjectRef};

    fn shared(id: u16, mutable: bool) -> ObjectArg {
        ObjectArg::Shared(SharedObjectRef {
            object_id: SuiAddress::from_u16(id),
            initial_shared_version: 1,
            mutable,
        })
    }

    #[test]
    fn test_pure_dedup() {
        let mut builder = ProgrammableTransactionBuilder::new();
        let a = builder.pure(&100u64).unwrap();
        let b = builder.pure(&BString::from("hello")).unwrap();
        let c = builder.pure(&100u64).unwrap();
        assert_eq!(a, Argument::Input(0));
        assert_eq!(b, Argument::Input(1));
        assert_eq!(c, a);
        assert_eq!(builder.inputs().len(), 2);
    }

    #[test]
    fn test_raw_values_keep_their_slots() {
        let mut builder = ProgrammableTransactionBuilder::new();
        let a = builder.raw(5u64).unwrap();
        let b = builder.raw(5u64).unwrap();
        assert_ne!(a, b);
        assert!(!builder.is_resolved());
    }

    #[test]
    fn test_object_dedup_and_upgrade() {
        let mut builder = ProgrammableTransactionBuilder::new();
        let id = SuiAddress::from_u16(0xc0);
        let by_id = builder.object(id).unwrap();
        assert_eq!(builder.raw(RawValue::ObjectId(id)).unwrap(), by_id);

        let reference = SuiObjectRef {
            object_id: id,
            version: 9,
            digest: ObjectDigest::new([1; 32]),
        };
        assert_eq!(builder.obj(ObjectArg::ImmOrOwned(reference)).unwrap(), by_id);
        assert!(builder.is_resolved());
        assert_eq!(
            builder.inputs()[0],
            InputSlot::Resolved(CallArg::Object(ObjectArg::ImmOrOwned(reference)))
        );
    }

    #[test]
    fn test_shared_mutability_is_joined() {
        let mut builder = ProgrammableTransactionBuilder::new();
        builder.obj(shared(6, false)).unwrap();
        builder.obj(shared(6, true)).unwrap();
        builder.obj(shared(6, false)).unwrap();
        assert_eq!(builder.inputs().len(), 1);
        assert_eq!(
            builder.inputs()[0],
            InputSlot::Resolved(CallArg::Object(shared(6, true)))
        );
    }

    #[test]
    fn test_append_command_indices() {
        let mut builder = ProgrammableTransactionBuilder::new();
        let amount = builder.pure(&1u64).unwrap();
        let first = builder
            .split_coins(builder.gas_coin(), vec![amount, amount])
            .unwrap();
        let second = builder
            .move_call_target("0x2::coin::join", vec![], vec![])
            .unwrap();
        assert_eq!(first.index(), 0);
        assert_eq!(second.index(), 1);
        assert_eq!(builder.commands()[1].name(), "MoveCall");
    }

    #[test]
    fn test_bad_call_target() {
        let mut builder = ProgrammableTransactionBuilder::new();
        let err = builder
            .move_call_target("0x2::coin", vec![], vec![])
            .unwrap_err();
        assert!(matches!(err, BuildError::Target(_)));
        assert!(builder.commands().is_empty());
    }

    #[test]
    fn test_finish_rejects_raw_inputs() {
        let mut builder = ProgrammableTransactionBuilder::new();
        builder.pure(&1u8).unwrap();
        builder.raw(true).unwrap();
        assert!(matches!(
            builder.finish(),
            Err(BuildError::Unresolved { input_index: 1 })
        ));
    }

    #[test]
    fn test_finish_runs_validation() {
        let mut builder = ProgrammableTransactionBuilder::new();
        let recipient = builder.pure(&SuiAddress::from_u16(1)).unwrap();
        builder
            .transfer_objects(vec![Argument::Result(3)], recipient)
            .unwrap();
        match builder.finish() {
            Err(BuildError::Invalid(errors)) => {
                assert_eq!(errors[0].kind, ValidationErrorKind::ForwardReference)
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }
}
