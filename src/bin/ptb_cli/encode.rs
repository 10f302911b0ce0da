//! encode command - build, resolve and encode a block from a JSON spec

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use sui_ptb::{
    GasData, ObjectProvider, ProgrammableTransaction, StaticObjectProvider,
    StaticSignatureProvider, TransactionData, TransactionExpiration,
};
use sui_ptb_cli::spec::{parse_sender, read_ptb_spec};
use sui_ptb_types::encoding::{base64_encode, parse_address};
use sui_ptb_types::env_utils::env_var_or;

use super::output::{format_programmable, print_json};

pub const DEFAULT_GAS_BUDGET: u64 = 10_000_000;
pub const DEFAULT_GAS_PRICE: u64 = 1_000;

#[derive(Parser, Debug)]
pub struct EncodeCmd {
    /// JSON spec file (use '-' for stdin)
    #[arg(long)]
    pub spec: PathBuf,

    /// Normalized function signatures, keyed by `0xPKG::module::function`
    #[arg(long)]
    pub signatures: Option<PathBuf>,

    /// Object references and owners, as a JSON array
    #[arg(long)]
    pub objects: Option<PathBuf>,

    /// Sender address; with --gas, encodes the full transaction data
    #[arg(long)]
    pub sender: Option<String>,

    /// Gas coin object id (repeatable); looked up in --objects
    #[arg(long = "gas")]
    pub gas: Vec<String>,

    /// Gas budget [env: SUI_PTB_GAS_BUDGET, default: 10000000]
    #[arg(long)]
    pub gas_budget: Option<u64>,

    /// Gas price [env: SUI_PTB_GAS_PRICE, default: 1000]
    #[arg(long)]
    pub gas_price: Option<u64>,

    /// Reject the transaction once this epoch has ended
    #[arg(long)]
    pub expiration_epoch: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EncodeOutput {
    kind: &'static str,
    bytes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    signing_bytes: Option<String>,
    inputs: usize,
    commands: usize,
}

fn read_file(path: &Path, what: &str) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} file: {}", what, path.display()))
}

impl EncodeCmd {
    pub async fn execute(&self, json_output: bool, verbose: bool) -> Result<()> {
        let signatures = match &self.signatures {
            Some(path) => StaticSignatureProvider::from_json(&read_file(path, "signature")?)?,
            None => StaticSignatureProvider::new(),
        };
        let objects = match &self.objects {
            Some(path) => StaticObjectProvider::from_json(&read_file(path, "object")?)?,
            None => StaticObjectProvider::new(),
        };
        debug!(
            signatures = signatures.len(),
            objects = self.objects.is_some(),
            "loaded providers"
        );

        let builder = read_ptb_spec(&self.spec, true)?.into_builder()?;
        let pt = builder
            .build(&signatures, &objects)
            .await
            .context("Failed to build transaction block")?;

        if verbose && !json_output {
            eprint!("{}", format_programmable(&pt));
        }

        let output = match self.transaction_data(pt.clone(), &objects).await? {
            Some(data) => EncodeOutput {
                kind: "transaction_data",
                bytes: data.to_base64(),
                signing_bytes: Some(base64_encode(&data.signing_bytes())),
                inputs: pt.inputs.len(),
                commands: pt.commands.len(),
            },
            None => EncodeOutput {
                kind: "programmable_transaction",
                bytes: pt.to_base64(),
                signing_bytes: None,
                inputs: pt.inputs.len(),
                commands: pt.commands.len(),
            },
        };

        if json_output {
            print_json(&output)?;
        } else {
            println!("{}", output.bytes);
        }
        Ok(())
    }

    async fn transaction_data(
        &self,
        pt: ProgrammableTransaction,
        objects: &dyn ObjectProvider,
    ) -> Result<Option<TransactionData>> {
        let sender = match (&self.sender, self.gas.is_empty()) {
            (None, true) => return Ok(None),
            (Some(sender), false) => parse_sender(sender)?,
            (Some(_), true) => bail!("--sender requires at least one --gas coin"),
            (None, false) => bail!("--gas requires --sender"),
        };

        let mut payment = Vec::with_capacity(self.gas.len());
        for id in &self.gas {
            let id = parse_address(id, "gas coin id")?;
            let info = objects
                .object_ref(&id)
                .await
                .with_context(|| format!("Failed to look up gas coin {}", id))?;
            payment.push(info.reference);
        }

        let gas_data = GasData {
            payment,
            owner: sender,
            price: self
                .gas_price
                .unwrap_or_else(|| env_var_or("SUI_PTB_GAS_PRICE", DEFAULT_GAS_PRICE)),
            budget: self
                .gas_budget
                .unwrap_or_else(|| env_var_or("SUI_PTB_GAS_BUDGET", DEFAULT_GAS_BUDGET)),
        };
        let mut data = TransactionData::new_programmable(sender, pt, gas_data);
        if let Some(epoch) = self.expiration_epoch {
            let TransactionData::V1 { expiration, .. } = &mut data;
            *expiration = TransactionExpiration::Epoch(epoch);
        }
        Ok(Some(data))
    }
}
