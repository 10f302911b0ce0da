//! Input resolution.
//!
//! Turns every [`InputSlot::Raw`] of a block into a [`CallArg`]:
//!
//! 1. Structurally equal raw values referenced by pending Move calls are
//!    unified into the earliest slot and the input list is compacted.
//! 2. One signature lookup per pending Move call, issued concurrently.
//! 3. Each raw slot is framed according to every position it is used in.
//!    Non-Move-call commands imply their own kinds (`SplitCoins` amounts are
//!    `u64`, `TransferObjects` recipients are addresses, ...).
//! 4. Object ids are completed through the object provider.
//!
//! The pass works on copies of the inputs and commands. Any error abandons
//! it and nothing the caller owns is touched.

mod objects;
mod signature;
mod values;

pub use objects::{ObjectInfo, ObjectProvider, StaticObjectProvider};
pub use signature::{
    NormalizedFunction, NormalizedType, ParameterKind, SignatureProvider,
    StaticSignatureProvider, TypeParameterAbilities,
};
pub use values::{default_pure_type, encode_pure, InputSlot, PureType, RawValue};

use std::collections::{BTreeMap, HashMap};

use futures::future::join_all;
use sui_ptb_types::{CallArg, ObjectArg, ObjectID, ObjectOwner, SharedObjectRef};
use tracing::{debug, trace};

use crate::argument::Argument;
use crate::command::{Command, ProgrammableMoveCall};
use crate::error::ResolutionError;

/// Inputs and commands after a successful pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBlock {
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

/// Does this call pass any input that is not a `CallArg` yet?
pub fn needs_resolution(call: &ProgrammableMoveCall, inputs: &[InputSlot]) -> bool {
    call.arguments.iter().any(|arg| {
        arg.input_index()
            .and_then(|idx| inputs.get(idx as usize))
            .is_some_and(|slot| !slot.is_resolved())
    })
}

/// Resolve every raw input of the block.
pub async fn resolve_inputs(
    inputs: &[InputSlot],
    commands: &[Command],
    signatures: &dyn SignatureProvider,
    objects: &dyn ObjectProvider,
) -> Result<ResolvedBlock, ResolutionError> {
    let mut inputs = inputs.to_vec();
    let mut commands = commands.to_vec();

    check_input_bounds(&inputs, &commands)?;

    let pending: Vec<usize> = commands
        .iter()
        .enumerate()
        .filter_map(|(idx, cmd)| {
            let call = cmd.as_move_call()?;
            needs_resolution(call, &inputs).then_some(idx)
        })
        .collect();
    debug!(
        inputs = inputs.len(),
        commands = commands.len(),
        pending = pending.len(),
        "resolving transaction inputs"
    );

    deduplicate(&mut inputs, &mut commands, &pending);

    let uses = collect_uses(&inputs, &commands, &pending, signatures).await?;

    let mut resolved: Vec<Option<CallArg>> = inputs
        .iter()
        .map(|slot| slot.as_call_arg().cloned())
        .collect();
    let mut lookups = Vec::new();
    for (idx, slot) in inputs.iter().enumerate() {
        let InputSlot::Raw(value) = slot else {
            continue;
        };
        let input_index = idx as u16;
        let slot_uses = uses.get(&input_index).map(Vec::as_slice).unwrap_or_default();
        match plan_slot(input_index, value, slot_uses)? {
            SlotPlan::Pure(bytes) => {
                trace!(input = input_index, len = bytes.len(), "encoded pure input");
                resolved[idx] = Some(CallArg::Pure(bytes));
            }
            SlotPlan::Object(lookup) => lookups.push(lookup),
        }
    }

    for (idx, arg) in fetch_objects(&lookups, objects).await? {
        resolved[idx as usize] = Some(arg);
    }

    let inputs = resolved
        .into_iter()
        .enumerate()
        .map(|(idx, arg)| {
            arg.ok_or_else(|| ResolutionError::UnresolvableInput {
                input_index: idx as u16,
                command_index: None,
                reason: "no resolution was produced for this slot".to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(inputs = inputs.len(), "input resolution complete");
    Ok(ResolvedBlock { inputs, commands })
}

fn check_input_bounds(inputs: &[InputSlot], commands: &[Command]) -> Result<(), ResolutionError> {
    for (cmd_idx, cmd) in commands.iter().enumerate() {
        for idx in cmd.arguments().into_iter().filter_map(Argument::input_index) {
            if idx as usize >= inputs.len() {
                return Err(ResolutionError::UnresolvableInput {
                    input_index: idx,
                    command_index: Some(cmd_idx),
                    reason: format!("no input registered at this index ({} inputs)", inputs.len()),
                });
            }
        }
    }
    Ok(())
}

// =============================================================================
// Deduplication
// =============================================================================

/// Point every pending-call reference to a repeated raw value at its first
/// slot, then drop the slots that became unused and renumber the rest.
fn deduplicate(inputs: &mut Vec<InputSlot>, commands: &mut [Command], pending: &[usize]) {
    let mut first_slot: HashMap<&RawValue, u16> = HashMap::new();
    for &cmd_idx in pending {
        for arg in commands[cmd_idx].arguments() {
            let Some(idx) = arg.input_index() else {
                continue;
            };
            if let InputSlot::Raw(value) = &inputs[idx as usize] {
                first_slot
                    .entry(value)
                    .and_modify(|slot| *slot = (*slot).min(idx))
                    .or_insert(idx);
            }
        }
    }

    let mut remap: HashMap<u16, u16> = HashMap::new();
    for &cmd_idx in pending {
        for arg in commands[cmd_idx].arguments() {
            let Some(idx) = arg.input_index() else {
                continue;
            };
            if let InputSlot::Raw(value) = &inputs[idx as usize] {
                let first = first_slot[value];
                if first != idx {
                    remap.insert(idx, first);
                }
            }
        }
    }
    if remap.is_empty() {
        return;
    }
    drop(first_slot);

    // Keep the surviving slots in order and number them densely.
    let mut renumber = vec![None; inputs.len()];
    let mut next = 0u16;
    for (old, slot) in renumber.iter_mut().enumerate() {
        if !remap.contains_key(&(old as u16)) {
            *slot = Some(next);
            next += 1;
        }
    }

    for cmd in commands.iter_mut() {
        for arg in cmd.arguments_mut() {
            if let Argument::Input(idx) = arg {
                let target = remap.get(&*idx).copied().unwrap_or(*idx);
                if let Some(new) = renumber[target as usize] {
                    *idx = new;
                }
            }
        }
    }

    let removed = remap.len();
    let mut old = 0usize;
    inputs.retain(|_| {
        let keep = renumber[old].is_some();
        old += 1;
        keep
    });
    for (from, to) in &remap {
        debug!(from = *from, to = *to, "unified duplicate input");
    }
    debug!(removed, remaining = inputs.len(), "deduplicated inputs");
}

// =============================================================================
// Slot uses
// =============================================================================

/// One position a raw slot is passed in. `kind` is `None` when the position
/// places no constraint on the value (an untyped `MakeMoveVec` element).
#[derive(Debug, Clone)]
struct SlotUse {
    command_index: usize,
    kind: Option<ParameterKind>,
}

async fn collect_uses(
    inputs: &[InputSlot],
    commands: &[Command],
    pending: &[usize],
    signatures: &dyn SignatureProvider,
) -> Result<BTreeMap<u16, Vec<SlotUse>>, ResolutionError> {
    let lookups = pending.iter().filter_map(|&cmd_idx| {
        let call = commands[cmd_idx].as_move_call()?;
        trace!(command = cmd_idx, function = %call.target(), "fetching signature");
        Some(signatures.normalized_function(&call.package, &call.module, &call.function))
    });
    let fetched = join_all(lookups).await;

    let mut uses: BTreeMap<u16, Vec<SlotUse>> = BTreeMap::new();
    let mut record = |input_index: u16, command_index: usize, kind: Option<ParameterKind>| {
        if !inputs[input_index as usize].is_resolved() {
            uses.entry(input_index).or_default().push(SlotUse {
                command_index,
                kind,
            });
        }
    };

    for (&cmd_idx, signature) in pending.iter().zip(fetched) {
        let Some(call) = commands[cmd_idx].as_move_call() else {
            continue;
        };
        let first_raw_input = call
            .arguments
            .iter()
            .filter_map(Argument::input_index)
            .find(|&idx| !inputs[idx as usize].is_resolved())
            .unwrap_or_default();
        let signature = signature.map_err(|source| ResolutionError::SignatureLookupFailed {
            input_index: first_raw_input,
            command_index: cmd_idx,
            function: call.target(),
            source,
        })?;

        let parameters = signature.user_parameters();
        if parameters.len() != call.arguments.len() {
            return Err(ResolutionError::ArityMismatch {
                command_index: cmd_idx,
                function: call.target(),
                expected: parameters.len(),
                actual: call.arguments.len(),
            });
        }
        for (arg, param) in call.arguments.iter().zip(parameters) {
            let Some(idx) = arg.input_index() else {
                continue;
            };
            if inputs[idx as usize].is_resolved() {
                continue;
            }
            let kind = param.classify(&call.type_arguments).map_err(|reason| {
                ResolutionError::InvalidValueForParameter {
                    input_index: idx,
                    command_index: cmd_idx,
                    expected: param.to_string(),
                    reason,
                }
            })?;
            record(idx, cmd_idx, Some(kind));
        }
    }

    let owned_object = ParameterKind::Object {
        mutable: true,
        by_value: true,
    };
    let coin_ref = ParameterKind::Object {
        mutable: true,
        by_value: false,
    };
    for (cmd_idx, cmd) in commands.iter().enumerate() {
        let mut implied = |arg: &Argument, kind: Option<ParameterKind>| {
            if let Some(idx) = arg.input_index() {
                record(idx, cmd_idx, kind);
            }
        };
        match cmd {
            Command::MoveCall(_) | Command::Publish { .. } => {}
            Command::TransferObjects { objects, address } => {
                for obj in objects {
                    implied(obj, Some(owned_object.clone()));
                }
                implied(address, Some(ParameterKind::Pure(PureType::Address)));
            }
            Command::SplitCoins { coin, amounts } => {
                implied(coin, Some(coin_ref.clone()));
                for amount in amounts {
                    implied(amount, Some(ParameterKind::Pure(PureType::U64)));
                }
            }
            Command::MergeCoins {
                destination,
                sources,
            } => {
                implied(destination, Some(coin_ref.clone()));
                for source in sources {
                    implied(source, Some(owned_object.clone()));
                }
            }
            Command::MakeMoveVec { elements, type_tag } => {
                let kind = type_tag.as_ref().map(|tag| {
                    PureType::from_type_tag(tag)
                        .map(ParameterKind::Pure)
                        .unwrap_or_else(|| owned_object.clone())
                });
                for element in elements {
                    implied(element, kind.clone());
                }
            }
            Command::Upgrade { ticket, .. } => implied(ticket, Some(owned_object.clone())),
        }
    }

    Ok(uses)
}

// =============================================================================
// Planning
// =============================================================================

#[derive(Debug)]
struct ObjectLookup {
    input_index: u16,
    command_index: usize,
    object_id: ObjectID,
    mutable: bool,
    receiving: bool,
}

#[derive(Debug)]
enum SlotPlan {
    Pure(Vec<u8>),
    Object(ObjectLookup),
}

fn plan_slot(
    input_index: u16,
    value: &RawValue,
    uses: &[SlotUse],
) -> Result<SlotPlan, ResolutionError> {
    let typed: Vec<(usize, &ParameterKind)> = uses
        .iter()
        .filter_map(|u| u.kind.as_ref().map(|k| (u.command_index, k)))
        .collect();

    let Some(&(first_cmd, first_kind)) = typed.first() else {
        return plan_unconstrained(input_index, value, uses.first().map(|u| u.command_index));
    };

    for &(cmd_idx, kind) in &typed[1..] {
        if kind.is_object() != first_kind.is_object() {
            return Err(ResolutionError::InvalidValueForParameter {
                input_index,
                command_index: cmd_idx,
                expected: kind.to_string(),
                reason: format!("the same input is passed as {} to command {}", first_kind, first_cmd),
            });
        }
    }

    if first_kind.is_object() {
        return plan_object(input_index, value, &typed).map(SlotPlan::Object);
    }

    let mut encoded: Option<(usize, &PureType, Vec<u8>)> = None;
    for &(cmd_idx, kind) in &typed {
        let ty = match kind {
            ParameterKind::Pure(ty) => ty,
            other => {
                return Err(ResolutionError::InvalidValueForParameter {
                    input_index,
                    command_index: cmd_idx,
                    expected: other.to_string(),
                    reason: "not a value a caller can supply".to_string(),
                })
            }
        };
        let bytes = encode_pure(value, ty).map_err(|reason| {
            ResolutionError::InvalidValueForParameter {
                input_index,
                command_index: cmd_idx,
                expected: ty.to_string(),
                reason,
            }
        })?;
        if let Some((prev_cmd, prev_ty, prev)) = &encoded {
            if *prev != bytes {
                return Err(ResolutionError::AmbiguousPureEncoding {
                    input_index,
                    command_index: cmd_idx,
                    reason: format!(
                        "encodes differently as {} (command {}) and {} (command {})",
                        prev_ty, prev_cmd, ty, cmd_idx
                    ),
                });
            }
            continue;
        }
        encoded = Some((cmd_idx, ty, bytes));
    }
    match encoded {
        Some((_, _, bytes)) => Ok(SlotPlan::Pure(bytes)),
        None => plan_unconstrained(input_index, value, Some(first_cmd)),
    }
}

fn plan_object(
    input_index: u16,
    value: &RawValue,
    typed: &[(usize, &ParameterKind)],
) -> Result<ObjectLookup, ResolutionError> {
    let command_index = typed[0].0;
    let object_id = value
        .as_object_id()
        .ok_or_else(|| ResolutionError::InvalidValueForParameter {
            input_index,
            command_index,
            expected: typed[0].1.to_string(),
            reason: format!("a {} value does not name an object", value.kind_name()),
        })?;

    let receiving = typed
        .iter()
        .all(|(_, kind)| matches!(kind, ParameterKind::Receiving));
    if !receiving {
        if let Some(&(cmd_idx, _)) = typed
            .iter()
            .find(|(_, kind)| matches!(kind, ParameterKind::Receiving))
        {
            return Err(ResolutionError::InvalidValueForParameter {
                input_index,
                command_index: cmd_idx,
                expected: ParameterKind::Receiving.to_string(),
                reason: "the object is also used directly by another command".to_string(),
            });
        }
    }
    let mutable = typed
        .iter()
        .any(|(_, kind)| matches!(kind, ParameterKind::Object { mutable: true, .. }));

    Ok(ObjectLookup {
        input_index,
        command_index,
        object_id,
        mutable,
        receiving,
    })
}

/// No position constrains the value: use its natural encoding if it has one.
fn plan_unconstrained(
    input_index: u16,
    value: &RawValue,
    command_index: Option<usize>,
) -> Result<SlotPlan, ResolutionError> {
    if let (RawValue::ObjectId(object_id), Some(command_index)) = (value, command_index) {
        return Ok(SlotPlan::Object(ObjectLookup {
            input_index,
            command_index,
            object_id: *object_id,
            mutable: true,
            receiving: false,
        }));
    }
    if let Some(ty) = default_pure_type(value) {
        let bytes = encode_pure(value, &ty).map_err(|reason| ResolutionError::UnresolvableInput {
            input_index,
            command_index,
            reason,
        })?;
        return Ok(SlotPlan::Pure(bytes));
    }
    let reason = format!(
        "a {} value has no default encoding; pre-encode it or pass it to a typed parameter",
        value.kind_name()
    );
    Err(match command_index {
        Some(command_index) => ResolutionError::AmbiguousPureEncoding {
            input_index,
            command_index,
            reason,
        },
        None => ResolutionError::UnresolvableInput {
            input_index,
            command_index: None,
            reason: format!("not referenced by any command and {}", reason),
        },
    })
}

// =============================================================================
// Object lookups
// =============================================================================

async fn fetch_objects(
    lookups: &[ObjectLookup],
    objects: &dyn ObjectProvider,
) -> Result<Vec<(u16, CallArg)>, ResolutionError> {
    let fetched = join_all(lookups.iter().map(|l| {
        trace!(input = l.input_index, object = %l.object_id, "fetching object");
        objects.object_ref(&l.object_id)
    }))
    .await;

    let mut resolved = Vec::with_capacity(lookups.len());
    for (lookup, info) in lookups.iter().zip(fetched) {
        let lookup_failed = |source| ResolutionError::ObjectLookupFailed {
            input_index: lookup.input_index,
            command_index: lookup.command_index,
            object_id: lookup.object_id,
            source,
        };
        let info = info.map_err(lookup_failed)?;
        if info.reference.object_id != lookup.object_id {
            return Err(lookup_failed(anyhow::anyhow!(
                "provider returned object {} instead",
                info.reference.object_id
            )));
        }

        let arg = match (info.owner, lookup.receiving) {
            (ObjectOwner::AddressOwner { .. }, true) => ObjectArg::Receiving(info.reference),
            (_, true) => {
                return Err(ResolutionError::InvalidValueForParameter {
                    input_index: lookup.input_index,
                    command_index: lookup.command_index,
                    expected: ParameterKind::Receiving.to_string(),
                    reason: "only address-owned objects can be received".to_string(),
                })
            }
            (ObjectOwner::Shared { initial_shared_version }, false) => {
                ObjectArg::Shared(SharedObjectRef {
                    object_id: lookup.object_id,
                    initial_shared_version,
                    mutable: lookup.mutable,
                })
            }
            (_, false) => ObjectArg::ImmOrOwned(info.reference),
        };
        debug!(
            input = lookup.input_index,
            object = %lookup.object_id,
            kind = match arg {
                ObjectArg::ImmOrOwned(_) => "owned",
                ObjectArg::Shared(_) => "shared",
                ObjectArg::Receiving(_) => "receiving",
            },
            "resolved object input"
        );
        resolved.push((lookup.input_index, CallArg::Object(arg)));
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sui_ptb_types::{ObjectDigest, SuiAddress, SuiObjectRef};

    fn call(function: &str, args: Vec<Argument>) -> Command {
        Command::MoveCall(Box::new(ProgrammableMoveCall {
            package: SuiAddress::from_u16(0x42),
            module: "m".into(),
            function: function.into(),
            type_arguments: vec![],
            arguments: args,
        }))
    }

    fn raw(n: u128) -> InputSlot {
        InputSlot::Raw(RawValue::Number(n))
    }

    #[test]
    fn test_needs_resolution() {
        let inputs = vec![InputSlot::Resolved(CallArg::Pure(vec![1])), raw(2)];
        let resolved_only = call("f", vec![Argument::Input(0), Argument::GasCoin]);
        let with_raw = call("f", vec![Argument::Input(0), Argument::Input(1)]);
        assert!(!needs_resolution(resolved_only.as_move_call().unwrap(), &inputs));
        assert!(needs_resolution(with_raw.as_move_call().unwrap(), &inputs));
    }

    #[test]
    fn test_deduplicate_compacts_indices() {
        let mut inputs = vec![raw(1), raw(5), raw(2), raw(5), InputSlot::Raw(true.into())];
        let mut commands = vec![
            call("a", vec![Argument::Input(1), Argument::Input(0)]),
            call("b", vec![Argument::Input(3), Argument::Input(4)]),
            Command::SplitCoins {
                coin: Argument::GasCoin,
                amounts: vec![Argument::Input(2), Argument::Input(3)],
            },
        ];
        deduplicate(&mut inputs, &mut commands, &[0, 1]);

        assert_eq!(inputs, vec![raw(1), raw(5), raw(2), InputSlot::Raw(true.into())]);
        assert_eq!(
            commands[1].arguments(),
            vec![&Argument::Input(1), &Argument::Input(3)]
        );
        assert_eq!(
            commands[2].arguments(),
            vec![&Argument::GasCoin, &Argument::Input(2), &Argument::Input(1)]
        );
    }

    #[test]
    fn test_deduplicate_ignores_non_pending_commands() {
        let mut inputs = vec![raw(5), raw(5)];
        let mut commands = vec![Command::SplitCoins {
            coin: Argument::GasCoin,
            amounts: vec![Argument::Input(0), Argument::Input(1)],
        }];
        deduplicate(&mut inputs, &mut commands, &[]);
        assert_eq!(inputs.len(), 2);
    }

    #[test]
    fn test_plan_conflicting_widths() {
        let uses = vec![
            SlotUse {
                command_index: 0,
                kind: Some(ParameterKind::Pure(PureType::U8)),
            },
            SlotUse {
                command_index: 1,
                kind: Some(ParameterKind::Pure(PureType::U64)),
            },
        ];
        let err = plan_slot(3, &RawValue::Number(7), &uses).unwrap_err();
        assert!(matches!(
            err,
            ResolutionError::AmbiguousPureEncoding {
                input_index: 3,
                command_index: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_plan_unreferenced() {
        assert!(matches!(
            plan_slot(0, &RawValue::Bool(true), &[]),
            Ok(SlotPlan::Pure(bytes)) if bytes == vec![1]
        ));
        assert!(matches!(
            plan_slot(2, &RawValue::Number(1), &[]),
            Err(ResolutionError::UnresolvableInput {
                input_index: 2,
                command_index: None,
                ..
            })
        ));
    }

    #[test]
    fn test_plan_object_mutability_is_joined() {
        let id = SuiAddress::from_u16(6);
        let uses = vec![
            SlotUse {
                command_index: 0,
                kind: Some(ParameterKind::Object {
                    mutable: false,
                    by_value: false,
                }),
            },
            SlotUse {
                command_index: 2,
                kind: Some(ParameterKind::Object {
                    mutable: true,
                    by_value: false,
                }),
            },
        ];
        match plan_slot(0, &RawValue::ObjectId(id), &uses).unwrap() {
            SlotPlan::Object(lookup) => {
                assert!(lookup.mutable);
                assert!(!lookup.receiving);
                assert_eq!(lookup.object_id, id);
            }
            other => panic!("expected object plan, got {:?}", other),
        }
    }

    #[test]
    fn test_plan_pure_value_in_object_position() {
        let uses = vec![SlotUse {
            command_index: 4,
            kind: Some(ParameterKind::Object {
                mutable: true,
                by_value: true,
            }),
        }];
        let err = plan_slot(1, &RawValue::Number(3), &uses).unwrap_err();
        assert_eq!(
            err.to_string(),
            "input 1 cannot be passed as object (by value) to command 4: a number value does not name an object"
        );
    }

    #[tokio::test]
    async fn test_object_provider_returning_wrong_id() {
        struct Liar;

        #[async_trait::async_trait]
        impl ObjectProvider for Liar {
            async fn object_ref(&self, _id: &ObjectID) -> anyhow::Result<ObjectInfo> {
                Ok(ObjectInfo {
                    reference: SuiObjectRef {
                        object_id: SuiAddress::from_u16(1),
                        version: 1,
                        digest: ObjectDigest::new([0; 32]),
                    },
                    owner: ObjectOwner::Immutable,
                })
            }
        }

        let lookups = vec![ObjectLookup {
            input_index: 0,
            command_index: 0,
            object_id: SuiAddress::from_u16(2),
            mutable: false,
            receiving: false,
        }];
        let err = fetch_objects(&lookups, &Liar).await.unwrap_err();
        assert!(matches!(err, ResolutionError::ObjectLookupFailed { .. }));
    }
}
