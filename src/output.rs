//! Output formatting and persistence for pipeline artifacts.
//!
//! Supports pretty-printing, JSON serialization, and writing the
//! generated schedule document for the simulator to pick up.

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Logs an artifact using Rust's debug pretty-print format.
pub fn print_pretty<T: std::fmt::Debug>(artifact: &T) {
    debug!("{:#?}", artifact);
}

/// Serializes an artifact as pretty-printed JSON.
pub fn to_json_pretty<T: Serialize>(artifact: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(artifact)?)
}

/// Writes an artifact as pretty-printed JSON, creating parent directories
/// as needed.
pub fn write_json<T: Serialize>(path: &str, artifact: &T) -> Result<()> {
    let json = to_json_pretty(artifact)?;
    write_text(path, &json)?;
    info!(path, bytes = json.len(), "Wrote JSON artifact");
    Ok(())
}

/// Writes a text document (e.g. the generated vehicle schedule) to disk.
pub fn write_text(path: &str, content: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    debug!(path, bytes = content.len(), "Writing file");
    fs::write(path, content)?;
    Ok(())
}
