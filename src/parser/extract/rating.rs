use std::sync::LazyLock;

use regex::Regex;

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

// Ordered: bare decimal first, then the suffixed/prefixed variants. The
// bare pattern usually shadows the rest; the order is kept anyway so a page
// whose first decimal is out of range still gets a second look.
static RATING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(\d+\.\d+)",
        r"(\d+\.\d+)/5",
        r"(?i)Rating:\s*(\d+\.\d+)",
        r"(?i)(\d+\.\d+)\s*stars?",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static DECIMAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\.\d+").unwrap());

fn in_range(rating: f64) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}

/// First rating found in [1.0, 5.0]. Out-of-range values are discarded,
/// never clamped.
pub fn first(text: &str) -> Option<f64> {
    for re in RATING_PATTERNS.iter() {
        if let Some(caps) = re.captures(text) {
            if let Ok(rating) = caps[1].parse::<f64>() {
                if in_range(rating) {
                    return Some(rating);
                }
            }
        }
    }
    None
}

/// Every in-range decimal in document order. Page-level scan whose results
/// are paired with units positionally, so order matters.
pub fn all(text: &str) -> Vec<f64> {
    DECIMAL_RE
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .filter(|r| in_range(*r))
        .collect()
}

// ── Tests ──
