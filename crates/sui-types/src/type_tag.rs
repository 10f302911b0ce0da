//! Move type tags.
//!
//! A [`TypeTag`] is a tagged union with fixed discriminants; a [`StructTag`]
//! names an on-chain struct type by address, module, name and type arguments.
//!
//! | TypeTag | byte |
//! |---|---|
//! | Bool | 0 |
//! | U8 | 1 |
//! | U64 | 2 |
//! | U128 | 3 |
//! | Address | 4 |
//! | Signer | 5 |
//! | Vector | 6 |
//! | Struct | 7 |
//! | U16 | 8 |
//! | U32 | 9 |
//! | U256 | 10 |

use std::fmt;
use std::str::FromStr;

use sui_bcs::{
    deserialize_sequence, serialize_sequence, DecodeError, DecodeResult, Deserializable,
    Deserializer, Serializable, Serializer,
};

use crate::address::SuiAddress;
use crate::error::TypeParseError;
use crate::framework::{self, StructPath};
use crate::type_parsing::parse_type_tag;

/// Tag of a Move type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    Bool,
    U8,
    U64,
    U128,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(Box<StructTag>),
    U16,
    U32,
    U256,
}

impl TypeTag {
    pub fn vector(inner: TypeTag) -> Self {
        TypeTag::Vector(Box::new(inner))
    }

    pub fn as_struct(&self) -> Option<&StructTag> {
        match self {
            TypeTag::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Discriminant byte written before the payload.
    pub fn variant_index(&self) -> u8 {
        match self {
            TypeTag::Bool => 0,
            TypeTag::U8 => 1,
            TypeTag::U64 => 2,
            TypeTag::U128 => 3,
            TypeTag::Address => 4,
            TypeTag::Signer => 5,
            TypeTag::Vector(_) => 6,
            TypeTag::Struct(_) => 7,
            TypeTag::U16 => 8,
            TypeTag::U32 => 9,
            TypeTag::U256 => 10,
        }
    }

    /// Full-width addresses in every nested struct tag.
    pub fn to_canonical_string(&self) -> String {
        match self {
            TypeTag::Vector(inner) => format!("vector<{}>", inner.to_canonical_string()),
            TypeTag::Struct(s) => s.to_canonical_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Bool => f.write_str("bool"),
            TypeTag::U8 => f.write_str("u8"),
            TypeTag::U16 => f.write_str("u16"),
            TypeTag::U32 => f.write_str("u32"),
            TypeTag::U64 => f.write_str("u64"),
            TypeTag::U128 => f.write_str("u128"),
            TypeTag::U256 => f.write_str("u256"),
            TypeTag::Address => f.write_str("address"),
            TypeTag::Signer => f.write_str("signer"),
            TypeTag::Vector(inner) => write!(f, "vector<{}>", inner),
            TypeTag::Struct(s) => write!(f, "{}", s),
        }
    }
}

impl FromStr for TypeTag {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_type_tag(s)
    }
}

/// JSON carries type tags in their string form.
impl serde::Serialize for TypeTag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for TypeTag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        parse_type_tag(&s).map_err(serde::de::Error::custom)
    }
}

impl From<StructTag> for TypeTag {
    fn from(tag: StructTag) -> Self {
        TypeTag::Struct(Box::new(tag))
    }
}

impl Serializable for TypeTag {
    fn serialize(&self, ser: &mut Serializer) {
        ser.write_variant(self.variant_index());
        match self {
            TypeTag::Vector(inner) => inner.serialize(ser),
            TypeTag::Struct(s) => s.serialize(ser),
            _ => {}
        }
    }
}

impl Deserializable for TypeTag {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        let (tag, offset) = de.read_variant()?;
        Ok(match tag {
            0 => TypeTag::Bool,
            1 => TypeTag::U8,
            2 => TypeTag::U64,
            3 => TypeTag::U128,
            4 => TypeTag::Address,
            5 => TypeTag::Signer,
            6 => TypeTag::Vector(Box::new(
                de.with_nesting("TypeTag", TypeTag::deserialize)?,
            )),
            7 => TypeTag::Struct(Box::new(
                de.with_nesting("TypeTag", StructTag::deserialize)?,
            )),
            8 => TypeTag::U16,
            9 => TypeTag::U32,
            10 => TypeTag::U256,
            _ => {
                return Err(DecodeError::UnknownVariant {
                    type_name: "TypeTag",
                    tag,
                    offset,
                })
            }
        })
    }
}

// =============================================================================
// StructTag
// =============================================================================

/// `address::module::name<T0, T1, ...>`.
///
/// Equality is positional: address bytes, module, name and every type
/// argument must match in order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructTag {
    pub address: SuiAddress,
    pub module: String,
    pub name: String,
    pub type_params: Vec<TypeTag>,
}

impl StructTag {
    pub fn new(
        address: SuiAddress,
        module: impl Into<String>,
        name: impl Into<String>,
        type_params: Vec<TypeTag>,
    ) -> Self {
        Self {
            address,
            module: module.into(),
            name: name.into(),
            type_params,
        }
    }

    /// `0x2::sui::SUI`.
    pub fn sui() -> Self {
        Self::new(framework::SUI_FRAMEWORK, "sui", "SUI", vec![])
    }

    /// `0x2::coin::Coin<T>`.
    pub fn coin(inner: TypeTag) -> Self {
        Self::new(framework::SUI_FRAMEWORK, "coin", "Coin", vec![inner])
    }

    /// Does this tag name the struct at `path`, ignoring type arguments?
    pub fn is(&self, path: StructPath) -> bool {
        framework::is_struct(path, &self.address, &self.module, &self.name)
    }

    pub fn to_canonical_string(&self) -> String {
        let mut out = format!(
            "{}::{}::{}",
            self.address.to_canonical_string(),
            self.module,
            self.name
        );
        if !self.type_params.is_empty() {
            let params: Vec<String> = self
                .type_params
                .iter()
                .map(TypeTag::to_canonical_string)
                .collect();
            out.push('<');
            out.push_str(&params.join(", "));
            out.push('>');
        }
        out
    }
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}::{}",
            self.address.to_short_string(),
            self.module,
            self.name
        )?;
        if let Some((first, rest)) = self.type_params.split_first() {
            write!(f, "<{}", first)?;
            for param in rest {
                write!(f, ", {}", param)?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl FromStr for StructTag {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_type_tag(s)? {
            TypeTag::Struct(tag) => Ok(*tag),
            _ => Err(TypeParseError::MalformedPath(s.to_string())),
        }
    }
}

impl Serializable for StructTag {
    fn serialize(&self, ser: &mut Serializer) {
        self.address.serialize(ser);
        ser.write_str(&self.module);
        ser.write_str(&self.name);
        serialize_sequence(&self.type_params, ser);
    }
}

impl Deserializable for StructTag {
    fn deserialize(de: &mut Deserializer<'_>) -> DecodeResult<Self> {
        Ok(Self {
            address: SuiAddress::deserialize(de)?,
            module: de.read_string()?,
            name: de.read_string()?,
            type_params: deserialize_sequence(de)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sui_bcs::{from_bytes, to_bytes, MAX_NESTING_DEPTH};

    #[test]
    fn test_render_struct_tag() {
        let coin = StructTag::coin(StructTag::sui().into());
        assert_eq!(coin.to_string(), "0x2::coin::Coin<0x2::sui::SUI>");

        let pair = StructTag::new(
            SuiAddress::from_u16(0xabc),
            "pool",
            "Pool",
            vec![TypeTag::U64, TypeTag::vector(TypeTag::U8)],
        );
        assert_eq!(pair.to_string(), "0xabc::pool::Pool<u64, vector<u8>>");
        assert!(pair
            .to_canonical_string()
            .starts_with("0x0000000000000000000000000000000000000000000000000000000000000abc::pool"));
    }

    #[test]
    fn test_equality_is_positional() {
        let a = StructTag::new(SuiAddress::from_u16(1), "m", "S", vec![TypeTag::U8, TypeTag::U64]);
        let b = StructTag::new(SuiAddress::from_u16(1), "m", "S", vec![TypeTag::U64, TypeTag::U8]);
        assert_ne!(a, b);
        assert_eq!(a.clone(), a);
    }

    #[test]
    fn test_struct_tag_wire_layout() {
        let tag = StructTag::sui();
        let bytes = to_bytes(&tag);
        // 32 address bytes, "sui", "SUI", empty type-arg sequence
        assert_eq!(bytes.len(), 32 + 4 + 4 + 1);
        assert_eq!(&bytes[32..], &[3, b's', b'u', b'i', 3, b'S', b'U', b'I', 0]);
        assert_eq!(from_bytes::<StructTag>(&bytes).unwrap(), tag);
    }

    #[test]
    fn test_type_tag_discriminants() {
        assert_eq!(to_bytes(&TypeTag::U16), vec![8]);
        assert_eq!(to_bytes(&TypeTag::vector(TypeTag::U8)), vec![6, 1]);
        let coin: TypeTag = StructTag::coin(StructTag::sui().into()).into();
        assert_eq!(from_bytes::<TypeTag>(&to_bytes(&coin)).unwrap(), coin);
    }

    #[test]
    fn test_json_string_form() {
        let tag: TypeTag = serde_json::from_str("\"vector<0x2::sui::SUI>\"").unwrap();
        assert_eq!(tag, TypeTag::vector(StructTag::sui().into()));
        assert_eq!(serde_json::to_string(&tag).unwrap(), "\"vector<0x2::sui::SUI>\"");
    }

    #[test]
    fn test_unknown_type_tag() {
        assert_eq!(
            from_bytes::<TypeTag>(&[11]),
            Err(DecodeError::UnknownVariant {
                type_name: "TypeTag",
                tag: 11,
                offset: 0
            })
        );
    }

    #[test]
    fn test_nested_vector_depth_limit() {
        let mut deepest = vec![6u8; MAX_NESTING_DEPTH];
        deepest.push(1);
        let tag = from_bytes::<TypeTag>(&deepest).unwrap();
        assert_eq!(to_bytes(&tag), deepest);

        let mut hostile = vec![6u8; 1_000_000];
        hostile.push(1);
        assert_eq!(
            from_bytes::<TypeTag>(&hostile),
            Err(DecodeError::DepthLimitExceeded {
                type_name: "TypeTag",
                limit: MAX_NESTING_DEPTH,
                offset: MAX_NESTING_DEPTH + 1,
            })
        );
    }

    #[test]
    fn test_depth_limit_spans_struct_type_params() {
        let wrap = |mut tag: TypeTag| {
            for _ in 0..MAX_NESTING_DEPTH - 1 {
                tag = TypeTag::vector(tag);
            }
            tag
        };
        let holder = |param: TypeTag| -> TypeTag {
            StructTag::new(SuiAddress::from_u16(1), "m", "S", vec![param]).into()
        };

        let fits = wrap(holder(TypeTag::U8));
        assert_eq!(from_bytes::<TypeTag>(&to_bytes(&fits)).unwrap(), fits);

        let too_deep = wrap(holder(TypeTag::vector(TypeTag::U8)));
        assert!(matches!(
            from_bytes::<TypeTag>(&to_bytes(&too_deep)),
            Err(DecodeError::DepthLimitExceeded { type_name: "TypeTag", .. })
        ));
    }
}
