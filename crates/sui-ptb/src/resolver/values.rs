//! Raw input values and their type-directed pure encoding.
//!
//! A [`RawValue`] is what a caller hands the builder before the parameter
//! types are known: `100` could be a `u8` or a `u64`, an address could be a
//! recipient or an object to look up. [`encode_pure`] frames a raw value for
//! one concrete [`PureType`].

use std::fmt;

use sui_bcs::{Serializable, Serializer, U256};
use sui_ptb_types::framework::{OBJECT_ID, STD_ASCII_STRING, STD_OPTION, STD_STRING};
use sui_ptb_types::{CallArg, ObjectID, SuiAddress, TypeTag};

/// A block input whose encoding is not decided yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RawValue {
    /// Unsigned integer of unknown width.
    Number(u128),
    U256(U256),
    Bool(bool),
    Address(SuiAddress),
    String(String),
    Bytes(Vec<u8>),
    Vector(Vec<RawValue>),
    Option(Option<Box<RawValue>>),
    /// Object whose version, digest and ownership still have to be fetched.
    ObjectId(ObjectID),
}

impl RawValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            RawValue::Number(_) => "number",
            RawValue::U256(_) => "u256",
            RawValue::Bool(_) => "bool",
            RawValue::Address(_) => "address",
            RawValue::String(_) => "string",
            RawValue::Bytes(_) => "bytes",
            RawValue::Vector(_) => "vector",
            RawValue::Option(_) => "option",
            RawValue::ObjectId(_) => "object id",
        }
    }

    /// The id this value names when used in an object position.
    pub fn as_object_id(&self) -> Option<ObjectID> {
        match self {
            RawValue::ObjectId(id) | RawValue::Address(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<u64> for RawValue {
    fn from(value: u64) -> Self {
        RawValue::Number(value.into())
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

impl From<SuiAddress> for RawValue {
    fn from(value: SuiAddress) -> Self {
        RawValue::Address(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::String(value.to_string())
    }
}

/// One slot of the block's input list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSlot {
    Raw(RawValue),
    Resolved(CallArg),
}

impl InputSlot {
    pub fn is_resolved(&self) -> bool {
        matches!(self, InputSlot::Resolved(_))
    }

    pub fn as_raw(&self) -> Option<&RawValue> {
        match self {
            InputSlot::Raw(value) => Some(value),
            InputSlot::Resolved(_) => None,
        }
    }

    pub fn as_call_arg(&self) -> Option<&CallArg> {
        match self {
            InputSlot::Resolved(arg) => Some(arg),
            InputSlot::Raw(_) => None,
        }
    }
}

// =============================================================================
// Pure types
// =============================================================================

/// Move types that can be supplied as pure bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PureType {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    Address,
    /// `0x1::string::String`
    String,
    /// `0x1::ascii::String`
    AsciiString,
    /// `0x2::object::ID`
    Id,
    Vector(Box<PureType>),
    /// `0x1::option::Option<T>`
    Option(Box<PureType>),
}

impl PureType {
    /// `None` for types that cannot travel as pure bytes (objects, signers).
    pub fn from_type_tag(tag: &TypeTag) -> Option<Self> {
        Some(match tag {
            TypeTag::Bool => PureType::Bool,
            TypeTag::U8 => PureType::U8,
            TypeTag::U16 => PureType::U16,
            TypeTag::U32 => PureType::U32,
            TypeTag::U64 => PureType::U64,
            TypeTag::U128 => PureType::U128,
            TypeTag::U256 => PureType::U256,
            TypeTag::Address => PureType::Address,
            TypeTag::Signer => return None,
            TypeTag::Vector(inner) => PureType::Vector(Box::new(Self::from_type_tag(inner)?)),
            TypeTag::Struct(s) if s.is(STD_STRING) => PureType::String,
            TypeTag::Struct(s) if s.is(STD_ASCII_STRING) => PureType::AsciiString,
            TypeTag::Struct(s) if s.is(OBJECT_ID) => PureType::Id,
            TypeTag::Struct(s) if s.is(STD_OPTION) => match s.type_params.as_slice() {
                [inner] => PureType::Option(Box::new(Self::from_type_tag(inner)?)),
                _ => return None,
            },
            TypeTag::Struct(_) => return None,
        })
    }

    fn is_integer(&self) -> bool {
        matches!(
            self,
            PureType::U8
                | PureType::U16
                | PureType::U32
                | PureType::U64
                | PureType::U128
                | PureType::U256
        )
    }
}

impl fmt::Display for PureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PureType::Bool => f.write_str("bool"),
            PureType::U8 => f.write_str("u8"),
            PureType::U16 => f.write_str("u16"),
            PureType::U32 => f.write_str("u32"),
            PureType::U64 => f.write_str("u64"),
            PureType::U128 => f.write_str("u128"),
            PureType::U256 => f.write_str("u256"),
            PureType::Address => f.write_str("address"),
            PureType::String => f.write_str("0x1::string::String"),
            PureType::AsciiString => f.write_str("0x1::ascii::String"),
            PureType::Id => f.write_str("0x2::object::ID"),
            PureType::Vector(inner) => write!(f, "vector<{}>", inner),
            PureType::Option(inner) => write!(f, "0x1::option::Option<{}>", inner),
        }
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Frame `value` as `ty`. The error is a human-readable reason.
pub fn encode_pure(value: &RawValue, ty: &PureType) -> Result<Vec<u8>, String> {
    let mut ser = Serializer::new();
    write_pure(value, ty, &mut ser)?;
    Ok(ser.into_bytes())
}

/// The single obvious type for values that don't need a hint.
///
/// Numbers have no default width and object ids may be objects, so both
/// return `None`, as do empty vectors and `none`.
pub fn default_pure_type(value: &RawValue) -> Option<PureType> {
    match value {
        RawValue::Bool(_) => Some(PureType::Bool),
        RawValue::Address(_) => Some(PureType::Address),
        RawValue::U256(_) => Some(PureType::U256),
        RawValue::String(_) => Some(PureType::String),
        RawValue::Bytes(_) => Some(PureType::Vector(Box::new(PureType::U8))),
        RawValue::Vector(items) => {
            let (first, rest) = items.split_first()?;
            let inner = default_pure_type(first)?;
            rest.iter()
                .all(|item| default_pure_type(item).as_ref() == Some(&inner))
                .then(|| PureType::Vector(Box::new(inner)))
        }
        RawValue::Option(Some(inner)) => {
            default_pure_type(inner).map(|t| PureType::Option(Box::new(t)))
        }
        RawValue::Option(None) | RawValue::Number(_) | RawValue::ObjectId(_) => None,
    }
}

fn mismatch(value: &RawValue, ty: &PureType) -> String {
    format!("a {} value cannot be encoded as {}", value.kind_name(), ty)
}

fn write_pure(value: &RawValue, ty: &PureType, ser: &mut Serializer) -> Result<(), String> {
    match (ty, value) {
        (PureType::Bool, RawValue::Bool(b)) => ser.write_bool(*b),

        (_, RawValue::Number(n)) if ty.is_integer() => write_integer(*n, ty, ser)?,
        (_, RawValue::String(s)) if ty.is_integer() => {
            let n = parse_integer_string(s, ty)?;
            match n {
                IntegerLiteral::Small(n) => write_integer(n, ty, ser)?,
                IntegerLiteral::Wide(u) => u.serialize(ser),
            }
        }
        (PureType::U256, RawValue::U256(u)) => u.serialize(ser),

        (PureType::Address | PureType::Id, RawValue::Address(a) | RawValue::ObjectId(a)) => {
            a.serialize(ser)
        }
        (PureType::Address | PureType::Id, RawValue::String(s)) => {
            let addr = SuiAddress::from_hex_literal(s).map_err(|e| e.to_string())?;
            addr.serialize(ser);
        }

        (PureType::String, RawValue::String(s)) => ser.write_str(s),
        (PureType::String, RawValue::Bytes(b)) => {
            std::str::from_utf8(b).map_err(|e| format!("bytes are not UTF-8: {}", e))?;
            ser.write_bytes(b);
        }
        (PureType::AsciiString, RawValue::String(s)) if s.is_ascii() => ser.write_str(s),
        (PureType::AsciiString, RawValue::Bytes(b)) if b.is_ascii() => ser.write_bytes(b),
        (PureType::AsciiString, RawValue::String(_) | RawValue::Bytes(_)) => {
            return Err("value contains non-ASCII characters".to_string())
        }

        (PureType::Vector(inner), RawValue::Bytes(b)) if **inner == PureType::U8 => {
            ser.write_bytes(b)
        }
        (PureType::Vector(inner), RawValue::String(s)) if **inner == PureType::U8 => {
            ser.write_str(s)
        }
        (PureType::Vector(inner), RawValue::Vector(items)) => {
            ser.write_uleb128(items.len() as u64);
            for item in items {
                write_pure(item, inner, ser)?;
            }
        }

        // Move's Option is a vector of zero or one element.
        (PureType::Option(_), RawValue::Option(None)) => ser.write_uleb128(0),
        (PureType::Option(inner), RawValue::Option(Some(v))) => {
            ser.write_uleb128(1);
            write_pure(v, inner, ser)?;
        }
        (PureType::Option(inner), other) => {
            ser.write_uleb128(1);
            write_pure(other, inner, ser)?;
        }

        _ => return Err(mismatch(value, ty)),
    }
    Ok(())
}

fn write_integer(n: u128, ty: &PureType, ser: &mut Serializer) -> Result<(), String> {
    let out_of_range = || format!("{} does not fit in {}", n, ty);
    match ty {
        PureType::U8 => ser.write_u8(u8::try_from(n).map_err(|_| out_of_range())?),
        PureType::U16 => ser.write_u16(u16::try_from(n).map_err(|_| out_of_range())?),
        PureType::U32 => ser.write_u32(u32::try_from(n).map_err(|_| out_of_range())?),
        PureType::U64 => ser.write_u64(u64::try_from(n).map_err(|_| out_of_range())?),
        PureType::U128 => ser.write_u128(n),
        PureType::U256 => U256::from(n).serialize(ser),
        other => return Err(format!("{} is not an integer type", other)),
    }
    Ok(())
}

enum IntegerLiteral {
    Small(u128),
    Wide(U256),
}

/// Decimal, or `0x` hex for `u256` literals wider than 128 bits.
fn parse_integer_string(s: &str, ty: &PureType) -> Result<IntegerLiteral, String> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u128>() {
        return Ok(IntegerLiteral::Small(n));
    }
    if *ty == PureType::U256 {
        if let Some(u) = U256::from_hex_literal(s) {
            return Ok(IntegerLiteral::Wide(u));
        }
    }
    Err(format!("'{}' is not a valid {} literal", s, ty))
}
