//! `decode` command implementation.

use std::io::Read;

use anyhow::{Context, Result};
use decoder::{decode_any, resolve, Payload, Resolved};
use tracing::info;

use crate::cli::DecodeArgs;
use crate::error::CliError;

/// Execute the `decode` command
pub fn run_decode(args: &DecodeArgs) -> Result<()> {
    let raw = match &args.input {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .map_err(CliError::from)?;
            buf
        }
    };

    let payload = decode_body(&args.watch_type, &raw)?;
    info!(kind = %payload.kind(), records = payload.len(), "Decoded notification");

    let json = if args.pretty {
        serde_json::to_string_pretty(&payload)
    } else {
        serde_json::to_string(&payload)
    }
    .context("Failed to serialize payload")?;
    println!("{}", json);
    Ok(())
}

fn decode_body(token: &str, raw: &[u8]) -> Result<Payload> {
    let kind = match resolve(token) {
        Resolved::Known(kind) => kind,
        Resolved::Unknown(token) => return Err(CliError::unknown_type(token).into()),
    };
    Ok(decode_any(kind, raw)?)
}
