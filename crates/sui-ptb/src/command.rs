//! Commands of a programmable transaction block.
//!
//! Each command is one discriminant byte followed by its payload. Every
//! argument list is a framed [`Sequence`](sui_bcs::Sequence); module bytecode
//! is a [`ByteSequence`].
//!
//! | Command | byte | payload |
//! |---|---|---|
//! | MoveCall | 0 | package, module, function, type arguments, arguments |
//! | TransferObjects | 1 | objects, address |
//! | SplitCoins | 2 | coin, amounts |
//! | MergeCoins | 3 | destination, sources |
//! | Publish | 4 | modules, dependencies |
//! | MakeMoveVec | 5 | elements, optional type |
//! | Upgrade | 6 | modules, dependencies, package, ticket |
//!
//! ## Example
//!
//! ```
//! use sui_ptb::{Argument, Command, ProgrammableMoveCall};
//! use sui_ptb_types::SuiAddress;
//!
//! let commands = vec![
//!     Command::MoveCall(Box::new(ProgrammableMoveCall {
//!         package: SuiAddress::from_u16(2),
//!         module: "coin".into(),
//!         function: "zero".into(),
//!         type_arguments: vec!["0x2::sui::SUI".parse().unwrap()],
//!         arguments: vec![],
//!     })),
//!     Command::TransferObjects {
//!         objects: vec![Argument::Result(0)],
//!         address: Argument::Input(0),
//!     },
//! ];
//! assert_eq!(commands[1].name(), "TransferObjects");
//! ```

use std::fmt;

use sui_bcs::{
    deserialize_sequence, serialize_sequence, ByteSequence, DecodeError, DecodeResult,
    Deserializable, Deserializer, Serializable, Serializer,
};
use sui_ptb_types::{ObjectID, SuiAddress, TypeTag};

use crate::argument::Argument;

/// `package::module::function<type_arguments>(arguments)`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgrammableMoveCall {
    pub package: ObjectID,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<TypeTag>,
    pub arguments: Vec<Argument>,
}

impl ProgrammableMoveCall {
    /// `0x2::coin::split` style target, short address form.
    pub fn target(&self) -> String {
        format!(
            "{}::{}::{}",
            self.package.to_short_string(),
            self.module,
            self.function
        )
    }
}

impl fmt::Display for ProgrammableMoveCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.target())?;
        if !self.type_arguments.is_empty() {
            let tys: Vec<String> = self.type_arguments.iter().map(|t| t.to_string()).collect();
            write!(f, "<{}>", tys.join(", "))?;
        }
        let args: Vec<String> = self.arguments.iter().map(|a| a.to_string()).collect();
        write!(f, "({})", args.join(", "))
    }
}

impl Serializable for ProgrammableMoveCall {
    fn serialize(&self, ser: &mut Serializer) {
        self.package.serialize(ser);
        ser.write_str(&self.module);
        ser.write_str(&self.function);
        serialize_sequence(&self.type_arguments, ser);
        serialize_sequence(&self.arguments, ser);
    }
}

impl Deserializable for ProgrammableMoveCall {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        Ok(Self {
            package: ObjectID::deserialize(de)?,
            module: de.read_string()?,
            function: de.read_string()?,
            type_arguments: deserialize_sequence(de)?,
            arguments: deserialize_sequence(de)?,
        })
    }
}

/// A command in a Programmable Transaction Block.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    /// Call a Move function
    MoveCall(Box<ProgrammableMoveCall>),

    /// Transfer objects to an address.
    TransferObjects {
        objects: Vec<Argument>,
        address: Argument,
    },

    /// Split a coin into multiple coins with specified amounts.
    SplitCoins {
        coin: Argument,
        amounts: Vec<Argument>,
    },

    /// Merge multiple coins into a destination coin.
    /// The source coins are destroyed.
    MergeCoins {
        destination: Argument,
        sources: Vec<Argument>,
    },

    /// Publish new modules.
    Publish {
        modules: Vec<Vec<u8>>,
        dependencies: Vec<ObjectID>,
    },

    /// Create a vector from elements.
    /// If type_tag is None, it's inferred from elements.
    MakeMoveVec {
        elements: Vec<Argument>,
        type_tag: Option<TypeTag>,
    },

    /// Upgrade an existing package, authorized by `ticket`.
    Upgrade {
        modules: Vec<Vec<u8>>,
        dependencies: Vec<ObjectID>,
        package: ObjectID,
        ticket: Argument,
    },
}

/// How many values a command leaves behind for later commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultArity {
    /// Nothing to reference.
    None,
    /// Exactly one value; refer to it with `Result`.
    Single,
    /// `n` values; `NestedResult(_, i)` needs `i < n`.
    Exactly(usize),
    /// Depends on the called function's signature.
    Unknown,
}

impl Command {
    pub fn variant_index(&self) -> u8 {
        match self {
            Command::MoveCall(_) => 0,
            Command::TransferObjects { .. } => 1,
            Command::SplitCoins { .. } => 2,
            Command::MergeCoins { .. } => 3,
            Command::Publish { .. } => 4,
            Command::MakeMoveVec { .. } => 5,
            Command::Upgrade { .. } => 6,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::MoveCall(_) => "MoveCall",
            Command::TransferObjects { .. } => "TransferObjects",
            Command::SplitCoins { .. } => "SplitCoins",
            Command::MergeCoins { .. } => "MergeCoins",
            Command::Publish { .. } => "Publish",
            Command::MakeMoveVec { .. } => "MakeMoveVec",
            Command::Upgrade { .. } => "Upgrade",
        }
    }

    pub fn as_move_call(&self) -> Option<&ProgrammableMoveCall> {
        match self {
            Command::MoveCall(call) => Some(call),
            _ => None,
        }
    }

    /// Every operand, in wire order.
    pub fn arguments(&self) -> Vec<&Argument> {
        match self {
            Command::MoveCall(call) => call.arguments.iter().collect(),
            Command::TransferObjects { objects, address } => {
                objects.iter().chain(std::iter::once(address)).collect()
            }
            Command::SplitCoins { coin, amounts } => {
                std::iter::once(coin).chain(amounts.iter()).collect()
            }
            Command::MergeCoins {
                destination,
                sources,
            } => std::iter::once(destination).chain(sources.iter()).collect(),
            Command::Publish { .. } => Vec::new(),
            Command::MakeMoveVec { elements, .. } => elements.iter().collect(),
            Command::Upgrade { ticket, .. } => vec![ticket],
        }
    }

    /// Mutable view of every operand, in wire order.
    pub fn arguments_mut(&mut self) -> Vec<&mut Argument> {
        match self {
            Command::MoveCall(call) => call.arguments.iter_mut().collect(),
            Command::TransferObjects { objects, address } => {
                objects.iter_mut().chain(std::iter::once(address)).collect()
            }
            Command::SplitCoins { coin, amounts } => {
                std::iter::once(coin).chain(amounts.iter_mut()).collect()
            }
            Command::MergeCoins {
                destination,
                sources,
            } => std::iter::once(destination)
                .chain(sources.iter_mut())
                .collect(),
            Command::Publish { .. } => Vec::new(),
            Command::MakeMoveVec { elements, .. } => elements.iter_mut().collect(),
            Command::Upgrade { ticket, .. } => vec![ticket],
        }
    }

    pub fn result_arity(&self) -> ResultArity {
        match self {
            Command::MoveCall(_) => ResultArity::Unknown,
            Command::SplitCoins { amounts, .. } => ResultArity::Exactly(amounts.len()),
            Command::TransferObjects { .. } | Command::MergeCoins { .. } => ResultArity::None,
            Command::Publish { .. } | Command::MakeMoveVec { .. } | Command::Upgrade { .. } => {
                ResultArity::Single
            }
        }
    }
}

impl Serializable for Command {
    fn serialize(&self, ser: &mut Serializer) {
        ser.write_variant(self.variant_index());
        match self {
            Command::MoveCall(call) => call.serialize(ser),
            Command::TransferObjects { objects, address } => {
                serialize_sequence(objects, ser);
                address.serialize(ser);
            }
            Command::SplitCoins { coin, amounts } => {
                coin.serialize(ser);
                serialize_sequence(amounts, ser);
            }
            Command::MergeCoins {
                destination,
                sources,
            } => {
                destination.serialize(ser);
                serialize_sequence(sources, ser);
            }
            Command::Publish {
                modules,
                dependencies,
            } => {
                write_modules(modules, ser);
                serialize_sequence(dependencies, ser);
            }
            Command::MakeMoveVec { elements, type_tag } => {
                serialize_sequence(elements, ser);
                type_tag.serialize(ser);
            }
            Command::Upgrade {
                modules,
                dependencies,
                package,
                ticket,
            } => {
                write_modules(modules, ser);
                serialize_sequence(dependencies, ser);
                package.serialize(ser);
                ticket.serialize(ser);
            }
        }
    }
}

impl Deserializable for Command {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        let (tag, offset) = de.read_variant()?;
        Ok(match tag {
            0 => Command::MoveCall(Box::new(ProgrammableMoveCall::deserialize(de)?)),
            1 => Command::TransferObjects {
                objects: deserialize_sequence(de)?,
                address: Argument::deserialize(de)?,
            },
            2 => Command::SplitCoins {
                coin: Argument::deserialize(de)?,
                amounts: deserialize_sequence(de)?,
            },
            3 => Command::MergeCoins {
                destination: Argument::deserialize(de)?,
                sources: deserialize_sequence(de)?,
            },
            4 => Command::Publish {
                modules: ByteSequence::deserialize(de)?.into_inner(),
                dependencies: deserialize_sequence(de)?,
            },
            5 => Command::MakeMoveVec {
                elements: deserialize_sequence(de)?,
                type_tag: Option::<TypeTag>::deserialize(de)?,
            },
            6 => Command::Upgrade {
                modules: ByteSequence::deserialize(de)?.into_inner(),
                dependencies: deserialize_sequence(de)?,
                package: SuiAddress::deserialize(de)?,
                ticket: Argument::deserialize(de)?,
            },
            _ => {
                return Err(DecodeError::UnknownVariant {
                    type_name: "Command",
                    tag,
                    offset,
                })
            }
        })
    }
}

fn write_modules(modules: &[Vec<u8>], ser: &mut Serializer) {
    ser.write_uleb128(modules.len() as u64);
    for module in modules {
        ser.write_bytes(module);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sui_bcs::{from_bytes, to_bytes};
    use sui_ptb_types::StructTag;

    fn zero_call() -> Command {
        Command::MoveCall(Box::new(ProgrammableMoveCall {
            package: SuiAddress::from_u16(2),
            module: "coin".into(),
            function: "zero".into(),
            type_arguments: vec![StructTag::sui().into()],
            arguments: vec![Argument::Input(0), Argument::GasCoin],
        }))
    }

    #[test]
    fn test_move_call_layout() {
        let bytes = to_bytes(&zero_call());
        assert_eq!(bytes[0], 0);
        assert_eq!(&bytes[1..33], SuiAddress::from_u16(2).as_bytes());
        assert_eq!(&bytes[33..38], &[4, b'c', b'o', b'i', b'n']);
        assert_eq!(&bytes[38..43], &[4, b'z', b'e', b'r', b'o']);
        // one type argument, framed
        assert_eq!(bytes[43], 1);
        // arguments: count 2, Input(0) framed in 3 bytes, GasCoin framed in 1
        assert_eq!(&bytes[bytes.len() - 7..], &[2, 3, 1, 0, 0, 1, 0]);
        assert_eq!(from_bytes::<Command>(&bytes).unwrap(), zero_call());
    }

    #[test]
    fn test_split_and_transfer_layout() {
        let split = Command::SplitCoins {
            coin: Argument::GasCoin,
            amounts: vec![Argument::Input(1)],
        };
        assert_eq!(to_bytes(&split), vec![2, 0, 1, 3, 1, 1, 0]);

        let transfer = Command::TransferObjects {
            objects: vec![Argument::Result(0)],
            address: Argument::Input(0),
        };
        assert_eq!(to_bytes(&transfer), vec![1, 1, 3, 2, 0, 0, 1, 0, 0]);
    }

    #[test]
    fn test_publish_and_upgrade_roundtrip() {
        let publish = Command::Publish {
            modules: vec![vec![0xa1, 0x1c], vec![]],
            dependencies: vec![SuiAddress::from_u16(1), SuiAddress::from_u16(2)],
        };
        let bytes = to_bytes(&publish);
        assert_eq!(&bytes[..6], &[4, 2, 2, 0xa1, 0x1c, 0]);
        // each dependency is framed: length 32 then the address
        assert_eq!(&bytes[6..8], &[2, 32]);
        assert_eq!(from_bytes::<Command>(&bytes).unwrap(), publish);

        let upgrade = Command::Upgrade {
            modules: vec![vec![1, 2, 3]],
            dependencies: vec![SuiAddress::from_u16(1)],
            package: SuiAddress::from_u16(0xbeef),
            ticket: Argument::Result(0),
        };
        let bytes = to_bytes(&upgrade);
        assert_eq!(&bytes[bytes.len() - 3..], &[2, 0, 0]);
        assert_eq!(from_bytes::<Command>(&bytes).unwrap(), upgrade);
    }

    #[test]
    fn test_upgrade_wire_bytes() {
        let upgrade = Command::Upgrade {
            modules: vec![vec![0xa1, 0x1c]],
            dependencies: vec![SuiAddress::from_u16(2)],
            package: SuiAddress::from_u16(0xbeef),
            ticket: Argument::Result(3),
        };

        let mut expected = vec![6, 1, 2, 0xa1, 0x1c];
        // one framed dependency
        expected.extend_from_slice(&[1, 32]);
        expected.extend_from_slice(SuiAddress::from_u16(2).as_bytes());
        // package id: 32 raw bytes, no length prefix
        expected.extend_from_slice(SuiAddress::from_u16(0xbeef).as_bytes());
        expected.extend_from_slice(&[2, 3, 0]);

        assert_eq!(to_bytes(&upgrade), expected);
        assert_eq!(expected.len(), 5 + 2 + 32 + 32 + 3);
        assert_eq!(from_bytes::<Command>(&expected).unwrap(), upgrade);

        // A package id cut short is truncated input, not a shorter id.
        let cut = &expected[..expected.len() - 4];
        assert!(matches!(
            from_bytes::<Command>(cut),
            Err(DecodeError::TruncatedInput { .. })
        ));
    }

    #[test]
    fn test_make_move_vec_optional_type() {
        let untyped = Command::MakeMoveVec {
            elements: vec![Argument::Input(0)],
            type_tag: None,
        };
        assert_eq!(to_bytes(&untyped), vec![5, 1, 3, 1, 0, 0, 0]);

        let typed = Command::MakeMoveVec {
            elements: vec![],
            type_tag: Some(TypeTag::U64),
        };
        assert_eq!(to_bytes(&typed), vec![5, 0, 1, 2]);
        assert_eq!(from_bytes::<Command>(&to_bytes(&typed)).unwrap(), typed);
    }

    #[test]
    fn test_unknown_command_discriminants() {
        for tag in 7u8..=u8::MAX {
            match from_bytes::<Command>(&[tag]) {
                Err(DecodeError::UnknownVariant {
                    type_name,
                    tag: got,
                    offset,
                }) => {
                    assert_eq!(type_name, "Command");
                    assert_eq!(got, tag as u64);
                    assert_eq!(offset, 0);
                }
                other => panic!("expected UnknownVariant for {}, got {:?}", tag, other),
            }
        }
    }

    #[test]
    fn test_arguments_in_wire_order() {
        let merge = Command::MergeCoins {
            destination: Argument::Input(0),
            sources: vec![Argument::Result(1), Argument::NestedResult(2, 0)],
        };
        let args: Vec<Argument> = merge.arguments().into_iter().copied().collect();
        assert_eq!(
            args,
            vec![
                Argument::Input(0),
                Argument::Result(1),
                Argument::NestedResult(2, 0)
            ]
        );

        let mut transfer = Command::TransferObjects {
            objects: vec![Argument::Input(3)],
            address: Argument::Input(7),
        };
        for arg in transfer.arguments_mut() {
            if let Argument::Input(i) = arg {
                *i -= 1;
            }
        }
        assert_eq!(
            transfer,
            Command::TransferObjects {
                objects: vec![Argument::Input(2)],
                address: Argument::Input(6),
            }
        );
    }

    #[test]
    fn test_display_move_call() {
        let Command::MoveCall(call) = zero_call() else {
            unreachable!()
        };
        assert_eq!(
            call.to_string(),
            "0x2::coin::zero<0x2::sui::SUI>(Input(0), GasCoin)"
        );
    }
}
