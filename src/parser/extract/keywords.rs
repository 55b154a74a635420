/// All vocabulary entries present in `text` as case-insensitive substrings,
/// returned with canonical casing in vocabulary order. Exact substring
/// match only, no stemming.
pub fn matching(vocab: &[&str], text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    vocab
        .iter()
        .filter(|kw| lower.contains(&kw.to_lowercase()))
        .map(|kw| kw.to_string())
        .collect()
}

/// True when any vocabulary entry appears as a case-insensitive substring.
pub fn contains_any(vocab: &[&str], text: &str) -> bool {
    let lower = text.to_lowercase();
    vocab.iter().any(|kw| lower.contains(&kw.to_lowercase()))
}

// ── Tests ──
