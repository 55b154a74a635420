use super::Vocabulary;

/// First matching room-type rule, else the default ("Suite").
pub fn room_type(vocab: &Vocabulary, text: &str) -> String {
    let lower = text.to_lowercase();
    for (keyword, label) in vocab.room_types {
        if lower.contains(keyword) {
            return label.to_string();
        }
    }
    vocab.default_room_type.to_string()
}

// ── Tests ──
