use serde_json::Value;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x100_0000_01b3;

/// Hash-derived ids live in [0, 2^63) so they fit any signed consumer.
const ID_SPACE: u64 = 1 << 63;

/// Source prefixes whose suffix is the numeric id.
const ID_PREFIXES: &[&str] = &["faq_", "FQ_", "prop_"];

/// FNV-1a over UTF-8 bytes. Pinned so fallback ids are reproducible across
/// runs and platforms.
pub fn fnv1a64(s: &str) -> u64 {
    let mut hash = FNV_OFFSET;
    for byte in s.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn hash_fallback(s: &str) -> u64 {
    fnv1a64(s) % ID_SPACE
}

/// Convert a heterogeneous source id into a stable non-negative integer.
/// Missing → fallback_index; prefixed or plain numeric strings parse
/// directly; everything else hashes its string form. Total, never panics.
pub fn normalize_id(raw: &Value, fallback_index: u64) -> u64 {
    match raw {
        Value::Null => fallback_index,
        Value::String(s) => parse_string_id(s).unwrap_or_else(|| hash_fallback(s)),
        Value::Number(n) => n
            .as_u64()
            .unwrap_or_else(|| hash_fallback(&raw.to_string())),
        other => hash_fallback(&other.to_string()),
    }
}

fn parse_string_id(s: &str) -> Option<u64> {
    for prefix in ID_PREFIXES {
        if let Some(rest) = s.strip_prefix(prefix) {
            return rest.parse().ok();
        }
    }
    s.parse().ok()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefixed_ids() {
        assert_eq!(normalize_id(&json!("faq_007"), 0), 7);
        assert_eq!(normalize_id(&json!("FQ_23"), 0), 23);
        assert_eq!(normalize_id(&json!("prop_4"), 0), 4);
    }

    #[test]
    fn missing_takes_fallback_index() {
        assert_eq!(normalize_id(&Value::Null, 5), 5);
    }

    #[test]
    fn plain_numeric_string() {
        assert_eq!(normalize_id(&json!("42"), 0), 42);
    }

    #[test]
    fn integer_passthrough() {
        assert_eq!(normalize_id(&json!(17), 0), 17);
    }

    #[test]
    fn unparseable_string_hashes_deterministically() {
        let a = normalize_id(&json!("not-a-number-xyz"), 0);
        let b = normalize_id(&json!("not-a-number-xyz"), 99);
        assert_eq!(a, b);
        assert!(a < 1 << 63);
    }

    #[test]
    fn prefix_with_garbage_suffix_hashes_whole_string() {
        let hashed = normalize_id(&json!("faq_xyz"), 0);
        assert_eq!(hashed, fnv1a64("faq_xyz") % (1 << 63));
    }

    #[test]
    fn non_scalar_values_hash_their_json_form() {
        let a = normalize_id(&json!(-3), 0);
        let b = normalize_id(&json!(-3), 0);
        assert_eq!(a, b);
        assert_ne!(normalize_id(&json!(3.5), 0), 0);
    }

    #[test]
    fn fnv1a64_known_vectors() {
        // Reference values for the 64-bit FNV-1a parameters.
        assert_eq!(fnv1a64(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a64("a"), 0xaf63_dc4c_8601_ec8c);
    }
}
