//! Human-readable and JSON rendering of blocks and errors.

use serde::Serialize;
use std::fmt::Write;

use sui_ptb::{Command, ProgrammableTransaction, TransactionData, TransactionExpiration};
use sui_ptb_types::encoding::hex_encode;
use sui_ptb_types::{CallArg, ObjectArg};

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn format_input(arg: &CallArg) -> String {
    match arg {
        CallArg::Pure(bytes) => format!("pure {}", hex_encode(bytes)),
        CallArg::Object(ObjectArg::ImmOrOwned(r)) => {
            format!("object {} v{} {}", r.object_id, r.version, r.digest)
        }
        CallArg::Object(ObjectArg::Shared(s)) => format!(
            "shared {} initial v{}{}",
            s.object_id,
            s.initial_shared_version,
            if s.mutable { " mut" } else { "" }
        ),
        CallArg::Object(ObjectArg::Receiving(r)) => {
            format!("receiving {} v{} {}", r.object_id, r.version, r.digest)
        }
    }
}

fn format_command(command: &Command) -> String {
    if let Some(call) = command.as_move_call() {
        return format!("MoveCall {}", call);
    }
    let args: Vec<String> = command.arguments().iter().map(|a| a.to_string()).collect();
    match command {
        Command::MakeMoveVec {
            type_tag: Some(ty), ..
        } => format!("MakeMoveVec<{}>({})", ty, args.join(", ")),
        Command::Publish {
            modules,
            dependencies,
        } => format!(
            "Publish({} modules, {} dependencies)",
            modules.len(),
            dependencies.len()
        ),
        Command::Upgrade {
            modules, package, ..
        } => format!(
            "Upgrade({} modules, package {}, ticket {})",
            modules.len(),
            package,
            args.join(", ")
        ),
        _ => format!("{}({})", command.name(), args.join(", ")),
    }
}

pub fn format_programmable(pt: &ProgrammableTransaction) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Inputs ({}):", pt.inputs.len());
    for (idx, input) in pt.inputs.iter().enumerate() {
        let _ = writeln!(out, "  [{}] {}", idx, format_input(input));
    }
    let _ = writeln!(out, "Commands ({}):", pt.commands.len());
    for (idx, command) in pt.commands.iter().enumerate() {
        let _ = writeln!(out, "  [{}] {}", idx, format_command(command));
    }
    out
}

pub fn format_transaction_data(data: &TransactionData) -> String {
    let TransactionData::V1 {
        sender,
        gas_data,
        expiration,
        ..
    } = data;
    let mut out = String::new();
    let _ = writeln!(out, "Sender: {}", sender);
    let _ = writeln!(
        out,
        "Gas: budget {} price {} owner {}",
        gas_data.budget, gas_data.price, gas_data.owner
    );
    for coin in &gas_data.payment {
        let _ = writeln!(out, "  payment {} v{}", coin.object_id, coin.version);
    }
    if let TransactionExpiration::Epoch(epoch) = expiration {
        let _ = writeln!(out, "Expires after epoch {}", epoch);
    }
    out.push_str(&format_programmable(data.programmable()));
    out
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error, json_output: bool) -> String {
    if json_output {
        #[derive(Serialize)]
        struct ErrorJson {
            error: String,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            causes: Vec<String>,
        }

        let err = ErrorJson {
            error: error.to_string(),
            causes: error.chain().skip(1).map(|e| e.to_string()).collect(),
        };
        serde_json::to_string_pretty(&err).unwrap_or_else(|_| "{}".to_string())
    } else {
        let mut out = format!("Error: {}\n", error);
        let mut causes = error.chain().skip(1).peekable();
        if causes.peek().is_some() {
            out.push_str("Caused by:\n");
            for (idx, cause) in causes.enumerate() {
                let _ = writeln!(out, "  {}: {}", idx + 1, cause);
            }
        }
        out
    }
}
