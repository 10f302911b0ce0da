//! sui-ptb: build and inspect Sui programmable transaction blocks offline
//!
//! ## Example Usage
//!
//! ```bash
//! # Encode a block described in JSON
//! sui-ptb encode --spec tx.json --signatures sigs.json --objects objs.json
//!
//! # Encode full transaction data, ready to sign
//! sui-ptb encode --spec tx.json --objects objs.json --sender 0xa11ce --gas 0x99
//!
//! # Inspect encoded bytes
//! sui-ptb decode AgAIZAAAAAAAAAA...
//! sui-ptb decode --data 0x000002...
//!
//! # ULEB128 length prefix
//! sui-ptb uleb128 300
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod ptb_cli;

use ptb_cli::{decode::DecodeCmd, encode::EncodeCmd, output::format_error};
use sui_ptb_types::encoding::hex_encode;
use sui_ptb_types::env_utils::env_bool;

#[derive(Parser)]
#[command(
    name = "sui-ptb",
    author,
    version,
    about = "Build, resolve and encode Sui programmable transaction blocks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON instead of human-readable format [env: SUI_PTB_JSON]
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (debug logging, block summaries)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a block from a JSON spec and print its encoding
    Encode(EncodeCmd),

    /// Decode a programmable transaction or transaction data
    Decode(DecodeCmd),

    /// Print the ULEB128 encoding of a length
    Uleb128 {
        value: u64,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact()
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        command,
        json,
        verbose,
    } = Cli::parse();
    let json = json || env_bool("SUI_PTB_JSON");
    init_logging(verbose);

    let result = match command {
        Commands::Encode(cmd) => cmd.execute(json, verbose).await,
        Commands::Decode(cmd) => cmd.execute(json),
        Commands::Uleb128 { value } => {
            let encoded = sui_bcs::encode_uleb128(value);
            if json {
                ptb_cli::output::print_json(&serde_json::json!({
                    "value": value,
                    "hex": hex_encode(&encoded),
                    "length": encoded.len(),
                }))
            } else {
                println!("{}", hex_encode(&encoded));
                Ok(())
            }
        }
    };

    if let Err(err) = &result {
        eprint!("{}", format_error(err, json));
        if json {
            eprintln!();
        }
        std::process::exit(1);
    }
    Ok(())
}
