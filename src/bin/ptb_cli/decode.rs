//! decode command - print an encoded block or transaction

use anyhow::{Context, Result};
use clap::Parser;

use sui_ptb::{ProgrammableTransaction, TransactionData};
use sui_ptb_types::encoding::decode_hex_or_base64;

use super::output::{format_programmable, format_transaction_data, print_json};

#[derive(Parser, Debug)]
pub struct DecodeCmd {
    /// Encoded bytes, base64 or `0x`-prefixed hex
    pub bytes: String,

    /// Decode full transaction data instead of a bare programmable transaction
    #[arg(long)]
    pub data: bool,
}

impl DecodeCmd {
    pub fn execute(&self, json_output: bool) -> Result<()> {
        let mut bytes = decode_hex_or_base64(&self.bytes, "transaction bytes")?;
        if self.data {
            // Signing bytes carry a three-byte intent ahead of the data.
            if bytes.starts_with(&sui_ptb::INTENT_PREFIX)
                && TransactionData::from_bytes(&bytes).is_err()
            {
                bytes.drain(..sui_ptb::INTENT_PREFIX.len());
            }
            let data = TransactionData::from_bytes(&bytes)
                .context("Failed to decode transaction data")?;
            if json_output {
                print_json(&data)?;
            } else {
                print!("{}", format_transaction_data(&data));
            }
        } else {
            let pt = ProgrammableTransaction::from_bytes(&bytes)
                .context("Failed to decode programmable transaction")?;
            if json_output {
                print_json(&pt)?;
            } else {
                print!("{}", format_programmable(&pt));
            }
        }
        Ok(())
    }
}
