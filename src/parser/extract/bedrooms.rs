use std::sync::LazyLock;

use regex::Regex;

// Ordered: specific phrasings before the bare "N bed" catch-all.
static BEDROOM_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)(\d+)\s*(?:bedroom|bed)\s*(?:suite|apartment|unit)",
        r"(?i)(?:suite|apartment|unit)\s*(?:with\s+)?(\d+)\s*(?:bedroom|bed)",
        r"(?i)(\d+)\s*(?:BR|BRs)",
        r"(?i)(\d+)\s*(?:bed)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Bedroom count from the first matching pattern, else None.
pub fn bedrooms(text: &str) -> Option<u32> {
    for re in BEDROOM_PATTERNS.iter() {
        if let Some(caps) = re.captures(text) {
            if let Ok(count) = caps[1].parse::<u32>() {
                return Some(count);
            }
        }
    }
    None
}

// ── Tests ──
