use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Value};

/// Hand-checked FAQ id → page-section mapping. The FAQ page groups entries
/// under section headings the keyword classifier cannot see, so this table
/// overrides the derived category after the fact.
const SECTION_MAP: &[(&str, &str)] = &[
    ("FQ_1", "About Us"),
    ("FQ_2", "About Us"),
    ("FQ_3", "About Us"),
    ("FQ_4", "Reservations"),
    ("FQ_5", "Reservations"),
    ("FQ_6", "Reservations"),
    ("FQ_7", "Reservations"),
    ("FQ_8", "Reservations"),
    ("FQ_9", "Reservations"),
    ("FQ_10", "Reservations"),
    ("FQ_11", "Reservations"),
    ("FQ_12", "Reservations"),
    ("FQ_13", "Payment"),
    ("FQ_14", "Payment"),
    ("FQ_15", "Payment"),
    ("FQ_16", "Payment"),
    ("FQ_17", "Guest Services"),
    ("FQ_18", "Guest Services"),
    ("FQ_19", "Guest Services"),
    ("FQ_20", "Guest Services"),
    ("FQ_21", "Guest Services"),
    ("FQ_22", "Guest Services"),
    ("FQ_23", "Guest Services"),
    ("FQ_24", "Guest Services"),
    ("FQ_25", "Guest Services"),
    ("FQ_26", "Guest Services"),
    ("FQ_27", "Guest Services"),
    ("FQ_28", "Rules and Regulations"),
    ("FQ_29", "Rules and Regulations"),
    ("FQ_30", "Rules and Regulations"),
];

/// The built-in table, or a `{ "FQ_1": "Section", ... }` JSON file.
pub fn load_mapping(path: Option<&Path>) -> Result<Vec<(String, String)>> {
    match path {
        Some(p) => {
            let raw = fs::read_to_string(p)
                .with_context(|| format!("Failed to read mapping {}", p.display()))?;
            let map: BTreeMap<String, String> = serde_json::from_str(&raw)
                .with_context(|| format!("Invalid mapping JSON in {}", p.display()))?;
            Ok(map.into_iter().collect())
        }
        None => Ok(SECTION_MAP
            .iter()
            .map(|(id, section)| (id.to_string(), section.to_string()))
            .collect()),
    }
}

/// Apply the mapping to loaded JSONL lines in place: override each mapped
/// record's category, patch the `Category:` segment of its text_chunk, and
/// refresh the summary line. Returns how many records changed.
pub fn apply(lines: &mut [Value], mapping: &[(String, String)]) -> usize {
    let lookup: HashMap<&str, &str> = mapping
        .iter()
        .map(|(id, section)| (id.as_str(), section.as_str()))
        .collect();

    let mut updated = 0;
    for line in lines.iter_mut() {
        let Some(map) = line.as_object_mut() else {
            continue;
        };
        if map.get("type").and_then(Value::as_str) != Some("faq") {
            continue;
        }
        let Some(id) = map.get("id").and_then(Value::as_str).map(str::to_string) else {
            continue;
        };
        let Some(section) = lookup.get(id.as_str()) else {
            continue;
        };

        map.insert("category".to_string(), json!(section));
        if let Some(chunk) = map.get("text_chunk").and_then(Value::as_str) {
            let patched = patch_chunk_category(chunk, section);
            map.insert("text_chunk".to_string(), json!(patched));
        }
        updated += 1;
    }

    // The summary reflects the mapped section set, sorted for stable output.
    let sections: BTreeSet<&str> = mapping.iter().map(|(_, s)| s.as_str()).collect();
    for line in lines.iter_mut() {
        let Some(map) = line.as_object_mut() else {
            continue;
        };
        if map.get("type").and_then(Value::as_str) == Some("summary") {
            map.insert("categories".to_string(), json!(sections));
            map.insert("categories_covered".to_string(), json!(sections.len()));
        }
    }

    updated
}

fn patch_chunk_category(chunk: &str, section: &str) -> String {
    let mut parts: Vec<String> = chunk.split(" | ").map(str::to_string).collect();
    for part in parts.iter_mut() {
        if part.starts_with("Category:") {
            *part = format!("Category: {}", section);
            break;
        }
    }
    parts.join(" | ")
}

// ── Tests ──
