use super::Vocabulary;

/// First category rule with at least one keyword hit wins; the rule order in
/// the vocabulary decides ties. Falls back to the default category.
pub fn category(vocab: &Vocabulary, text: &str) -> String {
    let lower = text.to_lowercase();
    for rule in vocab.categories {
        if rule.keywords.iter().any(|kw| lower.contains(kw)) {
            return rule.label.to_string();
        }
    }
    vocab.default_category.to_string()
}

// ── Tests ──
