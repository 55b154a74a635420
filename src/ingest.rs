use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{info, warn};

use crate::model::Exportable;

/// Parse a JSONL file into its lines, in order. Malformed lines are logged
/// with their line number and skipped; blank lines are ignored. A missing or
/// unreadable file is an error.
pub fn load_jsonl(path: &Path) -> Result<Vec<Value>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut lines = Vec::new();
    for (num, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(value) => lines.push(value),
            Err(e) => warn!("Skipping malformed JSON on line {}: {}", num + 1, e),
        }
    }
    info!("Loaded {} JSONL lines from {}", lines.len(), path.display());
    Ok(lines)
}

/// Write lines back out, one JSON object per line.
pub fn save_jsonl(lines: &[Value], path: &Path) -> Result<()> {
    let mut out = String::new();
    for line in lines {
        out.push_str(&line.to_string());
        out.push('\n');
    }
    fs::write(path, out).with_context(|| format!("Failed to write {}", path.display()))
}

/// Lines carrying the given `type` discriminator, in file order.
pub fn filter_records<'a>(lines: &'a [Value], kind: &str) -> Vec<&'a Value> {
    lines
        .iter()
        .filter(|v| v.get("type").and_then(Value::as_str) == Some(kind))
        .collect()
}

/// Typed records from JSONL lines. Lines that fail to deserialize are
/// logged and skipped, matching the malformed-line policy.
pub fn typed_records<T: Exportable>(lines: &[Value]) -> Vec<T> {
    filter_records(lines, T::KIND)
        .into_iter()
        .filter_map(|v| match serde_json::from_value::<T>(v.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping malformed {} record: {}", T::KIND, e);
                None
            }
        })
        .collect()
}

/// JSON-array form (the `.json` export) for round-trips.
pub fn load_json_records<T: Exportable>(path: &Path) -> Result<Vec<T>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

// ── Tests ──
