//! Normalized Move function signatures and the provider that supplies them.
//!
//! The JSON shape follows the fullnode's normalized-module responses, so a
//! signature captured from `sui_getNormalizedMoveFunction` can be loaded
//! directly into a [`StaticSignatureProvider`].

use std::collections::HashMap;
use std::fmt;

use anyhow::{anyhow, Context, Result};
use sui_ptb_types::framework::{is_struct, RECEIVING, TX_CONTEXT};
use sui_ptb_types::{parse_function_target, ObjectID, StructTag, SuiAddress, TypeTag};

use super::values::PureType;

/// A Move type as it appears in a normalized function signature.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum NormalizedType {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    Address,
    Signer,
    Struct {
        address: SuiAddress,
        module: String,
        name: String,
        #[serde(rename = "typeArguments", default)]
        type_arguments: Vec<NormalizedType>,
    },
    Vector(Box<NormalizedType>),
    TypeParameter(u16),
    Reference(Box<NormalizedType>),
    MutableReference(Box<NormalizedType>),
}

impl NormalizedType {
    /// Instantiate with the call's type arguments. References have no tag.
    pub fn to_type_tag(&self, type_args: &[TypeTag]) -> Result<TypeTag, String> {
        Ok(match self {
            NormalizedType::Bool => TypeTag::Bool,
            NormalizedType::U8 => TypeTag::U8,
            NormalizedType::U16 => TypeTag::U16,
            NormalizedType::U32 => TypeTag::U32,
            NormalizedType::U64 => TypeTag::U64,
            NormalizedType::U128 => TypeTag::U128,
            NormalizedType::U256 => TypeTag::U256,
            NormalizedType::Address => TypeTag::Address,
            NormalizedType::Signer => TypeTag::Signer,
            NormalizedType::Struct {
                address,
                module,
                name,
                type_arguments,
            } => {
                let type_params = type_arguments
                    .iter()
                    .map(|t| t.to_type_tag(type_args))
                    .collect::<Result<Vec<_>, _>>()?;
                TypeTag::Struct(Box::new(StructTag::new(
                    *address,
                    module.clone(),
                    name.clone(),
                    type_params,
                )))
            }
            NormalizedType::Vector(inner) => TypeTag::vector(inner.to_type_tag(type_args)?),
            NormalizedType::TypeParameter(idx) => {
                type_args.get(*idx as usize).cloned().ok_or_else(|| {
                    format!(
                        "type parameter T{} is not instantiated ({} type arguments given)",
                        idx,
                        type_args.len()
                    )
                })?
            }
            NormalizedType::Reference(_) | NormalizedType::MutableReference(_) => {
                return Err(format!("reference type {} has no type tag", self))
            }
        })
    }

    /// `&TxContext` / `&mut TxContext` parameters are supplied by the runtime.
    pub fn is_tx_context(&self) -> bool {
        match self {
            NormalizedType::Reference(inner) | NormalizedType::MutableReference(inner) => {
                matches!(
                    inner.as_ref(),
                    NormalizedType::Struct { address, module, name, .. }
                        if is_struct(TX_CONTEXT, address, module, name)
                )
            }
            _ => false,
        }
    }

    /// How a block input in this parameter position must be supplied.
    pub fn classify(&self, type_args: &[TypeTag]) -> Result<ParameterKind, String> {
        if self.is_tx_context() {
            return Ok(ParameterKind::TxContext);
        }
        let (inner, mutable, by_value) = match self {
            NormalizedType::Reference(inner) => (inner.as_ref(), false, false),
            NormalizedType::MutableReference(inner) => (inner.as_ref(), true, false),
            other => (other, true, true),
        };
        let tag = inner.to_type_tag(type_args)?;
        if by_value {
            if let Some(pure) = PureType::from_type_tag(&tag) {
                return Ok(ParameterKind::Pure(pure));
            }
        }
        match &tag {
            TypeTag::Struct(s) if s.is(RECEIVING) => Ok(ParameterKind::Receiving),
            TypeTag::Struct(_) => Ok(ParameterKind::Object { mutable, by_value }),
            _ if !by_value => Err(format!("{} cannot be passed by reference from an input", self)),
            other => Err(format!("{} cannot be supplied as a transaction input", other)),
        }
    }
}

impl fmt::Display for NormalizedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizedType::Bool => f.write_str("bool"),
            NormalizedType::U8 => f.write_str("u8"),
            NormalizedType::U16 => f.write_str("u16"),
            NormalizedType::U32 => f.write_str("u32"),
            NormalizedType::U64 => f.write_str("u64"),
            NormalizedType::U128 => f.write_str("u128"),
            NormalizedType::U256 => f.write_str("u256"),
            NormalizedType::Address => f.write_str("address"),
            NormalizedType::Signer => f.write_str("signer"),
            NormalizedType::Struct {
                address,
                module,
                name,
                type_arguments,
            } => {
                write!(f, "{}::{}::{}", address.to_short_string(), module, name)?;
                if !type_arguments.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in type_arguments.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            NormalizedType::Vector(inner) => write!(f, "vector<{}>", inner),
            NormalizedType::TypeParameter(idx) => write!(f, "T{}", idx),
            NormalizedType::Reference(inner) => write!(f, "&{}", inner),
            NormalizedType::MutableReference(inner) => write!(f, "&mut {}", inner),
        }
    }
}

/// What a parameter position demands of the input passed there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    Pure(PureType),
    Object { mutable: bool, by_value: bool },
    /// `0x2::transfer::Receiving<T>`: an object sent to the caller earlier.
    Receiving,
    TxContext,
}

impl ParameterKind {
    pub fn is_object(&self) -> bool {
        matches!(self, ParameterKind::Object { .. } | ParameterKind::Receiving)
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterKind::Pure(ty) => write!(f, "{}", ty),
            ParameterKind::Object { by_value: true, .. } => f.write_str("object (by value)"),
            ParameterKind::Object { mutable: true, .. } => f.write_str("object (&mut)"),
            ParameterKind::Object { .. } => f.write_str("object (&)"),
            ParameterKind::Receiving => f.write_str("Receiving<T>"),
            ParameterKind::TxContext => f.write_str("TxContext"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TypeParameterAbilities {
    #[serde(default)]
    pub abilities: Vec<String>,
}

/// Signature of one Move function.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedFunction {
    #[serde(default)]
    pub is_entry: bool,
    #[serde(default)]
    pub type_parameters: Vec<TypeParameterAbilities>,
    pub parameters: Vec<NormalizedType>,
    #[serde(rename = "return", default)]
    pub returns: Vec<NormalizedType>,
}

impl NormalizedFunction {
    /// Parameters a caller passes explicitly, i.e. without the trailing `TxContext`.
    pub fn user_parameters(&self) -> Vec<&NormalizedType> {
        self.parameters
            .iter()
            .filter(|p| !p.is_tx_context())
            .collect()
    }
}

/// Source of normalized signatures, usually a fullnode.
#[async_trait::async_trait]
pub trait SignatureProvider: Send + Sync {
    async fn normalized_function(
        &self,
        package: &ObjectID,
        module: &str,
        function: &str,
    ) -> Result<NormalizedFunction>;
}

/// Fixed set of signatures keyed by `package::module::function`.
#[derive(Debug, Clone, Default)]
pub struct StaticSignatureProvider {
    functions: HashMap<String, NormalizedFunction>,
}

impl StaticSignatureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(package: &ObjectID, module: &str, function: &str) -> String {
        format!("{}::{}::{}", package.to_canonical_string(), module, function)
    }

    pub fn insert(
        &mut self,
        package: ObjectID,
        module: &str,
        function: &str,
        signature: NormalizedFunction,
    ) {
        self.functions
            .insert(Self::key(&package, module, function), signature);
    }

    /// Load `{ "0x2::coin::split": { "parameters": [...], ... }, ... }`.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: HashMap<String, NormalizedFunction> =
            serde_json::from_str(json).context("Failed to parse signature file")?;
        let mut provider = Self::new();
        for (target, signature) in raw {
            let (package, module, function) = parse_function_target(&target)
                .with_context(|| format!("Invalid function key '{}'", target))?;
            provider.insert(package, &module, &function, signature);
        }
        Ok(provider)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[async_trait::async_trait]
impl SignatureProvider for StaticSignatureProvider {
    async fn normalized_function(
        &self,
        package: &ObjectID,
        module: &str,
        function: &str,
    ) -> Result<NormalizedFunction> {
        self.functions
            .get(&Self::key(package, module, function))
            .cloned()
            .ok_or_else(|| {
                anyhow!(
                    "no signature registered for {}::{}::{}",
                    package.to_short_string(),
                    module,
                    function
                )
            })
    }
}
