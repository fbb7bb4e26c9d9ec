//! Convenience helpers shared across command handlers.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use cardsheet::RoutineInput;
use chrono::{DateTime, Utc};

/// Read the whole input document, from stdin when `path` is `-`.
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read from stdin")?;
        return Ok(buffer);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Read and validate a routine definition.
pub fn load_input(path: &Path) -> Result<RoutineInput> {
    let raw = read_input(path)?;
    let source = if path.as_os_str() == "-" {
        "stdin".to_string()
    } else {
        path.display().to_string()
    };
    RoutineInput::from_json(&raw).with_context(|| format!("invalid routine in {source}"))
}

/// Write raw bytes to stdout.
pub fn write_stdout(bytes: &[u8]) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(bytes)
        .and_then(|_| stdout.flush())
        .context("failed to write to stdout")
}

/// Creation timestamp for generated documents.
///
/// Honours `SOURCE_DATE_EPOCH` so builds can be reproduced byte for byte.
pub fn creation_date() -> Result<DateTime<Utc>> {
    match std::env::var("SOURCE_DATE_EPOCH") {
        Ok(raw) => parse_epoch(&raw),
        Err(_) => Ok(Utc::now()),
    }
}

fn parse_epoch(raw: &str) -> Result<DateTime<Utc>> {
    let seconds: i64 = raw
        .trim()
        .parse()
        .with_context(|| format!("SOURCE_DATE_EPOCH '{raw}' is not an integer"))?;
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| anyhow!("SOURCE_DATE_EPOCH {seconds} is out of range"))
}
