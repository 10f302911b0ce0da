//! Command operands.

use std::fmt;

use sui_bcs::{DecodeError, DecodeResult, Deserializable, Deserializer, Serializable, Serializer};

/// Reference to a value in a programmable transaction block.
///
/// | variant | byte | payload |
/// |---|---|---|
/// | GasCoin | 0 | none |
/// | Input | 1 | u16 index |
/// | Result | 2 | u16 index |
/// | NestedResult | 3 | u16 index, u16 sub_index |
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub enum Argument {
    /// The transaction's gas coin.
    GasCoin,

    /// Reference to a transaction input (by index)
    Input(u16),

    /// The sole output of a previous command.
    Result(u16),

    /// One of several outputs of a previous command.
    /// (command_index, value_index)
    NestedResult(u16, u16),
}

impl Argument {
    pub fn variant_index(&self) -> u8 {
        match self {
            Argument::GasCoin => 0,
            Argument::Input(_) => 1,
            Argument::Result(_) => 2,
            Argument::NestedResult(_, _) => 3,
        }
    }

    pub fn input_index(&self) -> Option<u16> {
        match self {
            Argument::Input(idx) => Some(*idx),
            _ => None,
        }
    }

    /// Index of the command whose output this refers to.
    pub fn result_index(&self) -> Option<u16> {
        match self {
            Argument::Result(idx) | Argument::NestedResult(idx, _) => Some(*idx),
            _ => None,
        }
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::GasCoin => f.write_str("GasCoin"),
            Argument::Input(i) => write!(f, "Input({})", i),
            Argument::Result(i) => write!(f, "Result({})", i),
            Argument::NestedResult(i, j) => write!(f, "NestedResult({}, {})", i, j),
        }
    }
}

impl Serializable for Argument {
    fn serialize(&self, ser: &mut Serializer) {
        ser.write_variant(self.variant_index());
        match self {
            Argument::GasCoin => {}
            Argument::Input(i) | Argument::Result(i) => ser.write_u16(*i),
            Argument::NestedResult(i, j) => {
                ser.write_u16(*i);
                ser.write_u16(*j);
            }
        }
    }
}

impl Deserializable for Argument {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        let (tag, offset) = de.read_variant()?;
        match tag {
            0 => Ok(Argument::GasCoin),
            1 => Ok(Argument::Input(de.read_u16()?)),
            2 => Ok(Argument::Result(de.read_u16()?)),
            3 => Ok(Argument::NestedResult(de.read_u16()?, de.read_u16()?)),
            _ => Err(DecodeError::UnknownVariant {
                type_name: "Argument",
                tag,
                offset,
            }),
        }
    }
}
