//! JSON transaction block specs.
//!
//! ```json
//! {
//!   "inputs": [{ "address": "0xa11ce" }, { "number": 100 }],
//!   "commands": [
//!     { "split_coins": { "coin": { "gas_coin": true }, "amounts": [{ "input": 1 }] } },
//!     { "transfer_objects": { "objects": [{ "result": 0 }], "address": { "input": 0 } } }
//!   ]
//! }
//! ```
//!
//! Typed inputs (`u64`, `bool`, `vector_u8_hex`, full object refs) are encoded
//! immediately. `number`, `address`, `string` and `object` inputs stay raw
//! until the block is resolved. Arguments may also be written inline, in
//! which case they are appended to the input list.

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

use sui_bcs::{to_bytes, BString};
use sui_ptb::{Argument, Command, ProgrammableTransactionBuilder, RawValue};
use sui_ptb_types::encoding::{decode_hex_or_base64, parse_address, parse_hex_bytes};
use sui_ptb_types::{
    parse_type_tag, ObjectArg, ObjectID, SharedObjectRef, SuiAddress, SuiObjectRef, TypeTag,
};

/// Read a spec from a file, or from stdin when `path` is `-` and allowed.
pub fn read_ptb_spec(path: &Path, allow_stdin: bool) -> Result<PtbSpec> {
    let json_str = if allow_stdin && path.as_os_str() == "-" {
        use std::io::Read;
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read PTB spec: {}", path.display()))?
    };
    parse_ptb_spec(&json_str)
}

pub fn parse_ptb_spec(json: &str) -> Result<PtbSpec> {
    serde_json::from_str(json).context("Failed to parse PTB spec JSON")
}

#[derive(Debug, Deserialize)]
pub struct PtbSpec {
    #[serde(default)]
    pub inputs: Vec<InputSpec>,
    pub commands: Vec<CommandSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSpec {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(NumberLiteral),
    Bool(bool),
    /// Integer whose width comes from the parameter it is passed to.
    Number(NumberLiteral),
    /// Recipient address, or an object id when passed in an object position.
    Address(String),
    String(String),
    #[serde(rename = "vector_u8_utf8")]
    VectorU8Utf8(String),
    #[serde(rename = "vector_u8_hex")]
    VectorU8Hex(String),
    VectorAddress(Vec<String>),
    VectorU64(Vec<u64>),
    /// Already-encoded pure bytes, `0x` hex or base64.
    Pure(String),
    /// Object by id; reference and ownership are looked up.
    Object(String),
    #[serde(rename = "imm_or_owned_object")]
    ImmOrOwned(SuiObjectRef),
    #[serde(rename = "shared_object")]
    Shared(SharedObjectRef),
    Receiving(SuiObjectRef),
}

/// JSON number, or a decimal string for values past `u64`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberLiteral {
    Int(u64),
    Text(String),
}

impl NumberLiteral {
    fn value(&self) -> Result<u128> {
        match self {
            NumberLiteral::Int(n) => Ok(u128::from(*n)),
            NumberLiteral::Text(s) => s
                .trim()
                .parse()
                .with_context(|| format!("Invalid integer '{}'", s)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandSpec {
    MoveCall {
        /// `0xADDR::module::function`
        target: String,
        #[serde(default, alias = "type_arguments")]
        type_args: Vec<String>,
        #[serde(default, alias = "arguments")]
        args: Vec<ArgSpec>,
    },
    TransferObjects {
        objects: Vec<ArgSpec>,
        address: ArgSpec,
    },
    SplitCoins {
        coin: ArgSpec,
        amounts: Vec<ArgSpec>,
    },
    MergeCoins {
        destination: ArgSpec,
        sources: Vec<ArgSpec>,
    },
    MakeMoveVec {
        #[serde(default, rename = "type")]
        type_tag: Option<String>,
        elements: Vec<ArgSpec>,
    },
    Publish {
        /// Module bytecode, `0x` hex or base64.
        modules: Vec<String>,
        #[serde(default)]
        dependencies: Vec<String>,
    },
    Upgrade {
        modules: Vec<String>,
        #[serde(default)]
        dependencies: Vec<String>,
        package: String,
        ticket: ArgSpec,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ArgSpec {
    Inline(InputSpec),
    Reference(ArgReference),
}

#[derive(Debug, Deserialize)]
pub struct ArgReference {
    #[serde(alias = "Input")]
    pub input: Option<u16>,
    #[serde(alias = "Result")]
    pub result: Option<u16>,
    /// `[command_index, value_index]`
    #[serde(alias = "NestedResult")]
    pub nested_result: Option<[u16; 2]>,
    #[serde(alias = "GasCoin")]
    pub gas_coin: Option<bool>,
}

impl PtbSpec {
    /// Register every input and append every command.
    pub fn into_builder(self) -> Result<ProgrammableTransactionBuilder> {
        let mut builder = ProgrammableTransactionBuilder::new();
        let mut declared = Vec::with_capacity(self.inputs.len());
        for (idx, input) in self.inputs.iter().enumerate() {
            let arg = add_input(&mut builder, input)
                .with_context(|| format!("Invalid input {}", idx))?;
            declared.push(arg);
        }

        let mut ctx = SpecContext {
            builder,
            declared,
        };
        for (idx, command) in self.commands.into_iter().enumerate() {
            let command = ctx
                .command(command)
                .with_context(|| format!("Invalid command {}", idx))?;
            ctx.builder.append_command(command)?;
        }
        Ok(ctx.builder)
    }
}

struct SpecContext {
    builder: ProgrammableTransactionBuilder,
    /// Builder argument for each declared input; registration dedups, so
    /// declared index and slot index can differ.
    declared: Vec<Argument>,
}

impl SpecContext {
    fn arg(&mut self, spec: &ArgSpec) -> Result<Argument> {
        match spec {
            ArgSpec::Inline(input) => add_input(&mut self.builder, input),
            ArgSpec::Reference(r) => match (r.input, r.result, r.nested_result, r.gas_coin) {
                (Some(idx), None, None, None) => {
                    self.declared.get(idx as usize).copied().ok_or_else(|| {
                        anyhow!(
                            "input {} is not declared ({} inputs)",
                            idx,
                            self.declared.len()
                        )
                    })
                }
                (None, Some(idx), None, None) => Ok(Argument::Result(idx)),
                (None, None, Some([idx, sub]), None) => Ok(Argument::NestedResult(idx, sub)),
                (None, None, None, Some(true)) => Ok(Argument::GasCoin),
                _ => bail!(
                    "argument must set exactly one of input, result, nested_result or gas_coin"
                ),
            },
        }
    }

    fn args(&mut self, specs: &[ArgSpec]) -> Result<Vec<Argument>> {
        specs.iter().map(|spec| self.arg(spec)).collect()
    }

    fn command(&mut self, spec: CommandSpec) -> Result<Command> {
        Ok(match spec {
            CommandSpec::MoveCall {
                target,
                type_args,
                args,
            } => {
                let (package, module, function) = sui_ptb_types::parse_function_target(&target)?;
                Command::MoveCall(Box::new(sui_ptb::ProgrammableMoveCall {
                    package,
                    module,
                    function,
                    type_arguments: parse_type_args(&type_args)?,
                    arguments: self.args(&args)?,
                }))
            }
            CommandSpec::TransferObjects { objects, address } => Command::TransferObjects {
                objects: self.args(&objects)?,
                address: self.arg(&address)?,
            },
            CommandSpec::SplitCoins { coin, amounts } => Command::SplitCoins {
                coin: self.arg(&coin)?,
                amounts: self.args(&amounts)?,
            },
            CommandSpec::MergeCoins {
                destination,
                sources,
            } => Command::MergeCoins {
                destination: self.arg(&destination)?,
                sources: self.args(&sources)?,
            },
            CommandSpec::MakeMoveVec { type_tag, elements } => Command::MakeMoveVec {
                elements: self.args(&elements)?,
                type_tag: type_tag.as_deref().map(parse_type_tag).transpose()?,
            },
            CommandSpec::Publish {
                modules,
                dependencies,
            } => Command::Publish {
                modules: decode_modules(&modules)?,
                dependencies: parse_ids(&dependencies, "dependency")?,
            },
            CommandSpec::Upgrade {
                modules,
                dependencies,
                package,
                ticket,
            } => Command::Upgrade {
                modules: decode_modules(&modules)?,
                dependencies: parse_ids(&dependencies, "dependency")?,
                package: parse_address(&package, "package id")?,
                ticket: self.arg(&ticket)?,
            },
        })
    }
}

fn add_input(builder: &mut ProgrammableTransactionBuilder, input: &InputSpec) -> Result<Argument> {
    let arg = match input {
        InputSpec::U8(v) => builder.pure(v)?,
        InputSpec::U16(v) => builder.pure(v)?,
        InputSpec::U32(v) => builder.pure(v)?,
        InputSpec::U64(v) => builder.pure(v)?,
        InputSpec::U128(v) => builder.pure(&v.value()?)?,
        InputSpec::Bool(v) => builder.pure(v)?,
        InputSpec::Number(v) => builder.raw(RawValue::Number(v.value()?))?,
        InputSpec::Address(s) => builder.raw(parse_address(s, "address")?)?,
        InputSpec::String(s) => builder.raw(RawValue::String(s.clone()))?,
        InputSpec::VectorU8Utf8(s) => builder.pure(&BString::from(s.as_str()))?,
        InputSpec::VectorU8Hex(s) => {
            let bytes = parse_hex_bytes(s, "vector<u8>")?;
            builder.pure_bytes(to_bytes(&sui_bcs::Bytes::new(bytes)))?
        }
        InputSpec::VectorAddress(addrs) => {
            let items = addrs
                .iter()
                .map(|a| parse_address(a, "address").map(RawValue::Address))
                .collect::<Result<Vec<_>>>()?;
            builder.raw(RawValue::Vector(items))?
        }
        InputSpec::VectorU64(values) => {
            let mut ser = sui_bcs::Serializer::new();
            ser.write_uleb128(values.len() as u64);
            for v in values {
                ser.write_u64(*v);
            }
            builder.pure_bytes(ser.into_bytes())?
        }
        InputSpec::Pure(encoded) => builder.pure_bytes(decode_hex_or_base64(encoded, "pure value")?)?,
        InputSpec::Object(id) => builder.object(parse_address(id, "object id")?)?,
        InputSpec::ImmOrOwned(r) => builder.obj(ObjectArg::ImmOrOwned(*r))?,
        InputSpec::Shared(s) => builder.obj(ObjectArg::Shared(*s))?,
        InputSpec::Receiving(r) => builder.obj(ObjectArg::Receiving(*r))?,
    };
    Ok(arg)
}

fn parse_type_args(type_args: &[String]) -> Result<Vec<TypeTag>> {
    type_args
        .iter()
        .map(|t| parse_type_tag(t).with_context(|| format!("Invalid type argument '{}'", t)))
        .collect()
}

fn parse_ids(ids: &[String], context: &str) -> Result<Vec<ObjectID>> {
    ids.iter().map(|id| parse_address(id, context)).collect()
}

fn decode_modules(modules: &[String]) -> Result<Vec<Vec<u8>>> {
    modules
        .iter()
        .map(|m| decode_hex_or_base64(m, "module bytecode"))
        .collect()
}

/// Sender address, which also owns the gas payment.
pub fn parse_sender(sender: &str) -> Result<SuiAddress> {
    parse_address(sender, "sender")
}
