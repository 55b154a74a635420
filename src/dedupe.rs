use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::{FaqRecord, PropertyRecord};

static NON_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Dedup key for a question: lowercased, punctuation stripped, whitespace
/// collapsed. "How do I book?" and "How do I book???" share a key.
pub fn question_key(question: &str) -> String {
    let lower = question.to_lowercase();
    let stripped = NON_WORD_RE.replace_all(&lower, "");
    WHITESPACE_RE
        .replace_all(stripped.trim(), " ")
        .to_string()
}

/// Drop later records sharing an exact (name, city) pair. First occurrence
/// wins, order preserved; duplicates are dropped, never merged.
pub fn dedupe_properties(records: Vec<PropertyRecord>) -> Vec<PropertyRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|p| seen.insert((p.name.clone(), p.city.clone())))
        .collect()
}

/// Drop later records whose normalized question matches an earlier one;
/// records whose key normalizes to nothing are dropped outright. The result
/// is then sorted by id string — lexicographically, so "FQ_10" lands before
/// "FQ_2". That matches the source exports byte for byte and is asserted in
/// the tests below.
pub fn dedupe_faqs(records: Vec<FaqRecord>) -> Vec<FaqRecord> {
    let mut seen = HashSet::new();
    let mut unique: Vec<FaqRecord> = records
        .into_iter()
        .filter(|f| {
            let key = question_key(&f.question);
            !key.is_empty() && seen.insert(key)
        })
        .collect();
    unique.sort_by(|a, b| a.id.cmp(&b.id));
    unique
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(name: &str, city: &str, rating: Option<f64>) -> PropertyRecord {
        PropertyRecord {
            id: name.to_uppercase(),
            name: name.to_string(),
            city: city.to_string(),
            rating,
            room_type: "Suite".to_string(),
            amenities: Vec::new(),
            suite_features: Vec::new(),
            description: format!("{name} {city}"),
            url: format!("https://example.com/{name}"),
            image_url: None,
            pet_friendly: false,
            bedrooms: None,
            building_type: "Apartment Building".to_string(),
        }
    }

    fn faq(id: &str, question: &str) -> FaqRecord {
        FaqRecord {
            id: id.to_string(),
            question: question.to_string(),
            answer: "An answer long enough.".to_string(),
            category: "General".to_string(),
            tags: Vec::new(),
            source_url: "https://example.com/faq/".to_string(),
        }
    }

    #[test]
    fn question_key_strips_punctuation_and_case() {
        assert_eq!(
            question_key("How do I book a reservation???"),
            question_key("How do I book a reservation?")
        );
        assert_eq!(question_key("  What's   UP  "), "whats up");
    }

    #[test]
    fn first_property_occurrence_wins() {
        let records = vec![
            prop("The Met", "Toronto", Some(4.5)),
            prop("The Met", "Toronto", Some(1.1)),
            prop("The Met", "Halifax", None),
        ];
        let deduped = dedupe_properties(records);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].rating, Some(4.5));
        assert_eq!(deduped[1].city, "Halifax");
    }

    #[test]
    fn faq_dedup_by_normalized_question() {
        let records = vec![
            faq("FQ_4", "How do I book a reservation?"),
            faq("FQ_9", "How do I book a reservation???"),
        ];
        let deduped = dedupe_faqs(records);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].id, "FQ_4");
    }

    #[test]
    fn faq_sort_is_lexicographic_not_numeric() {
        let records = vec![
            faq("FQ_2", "Second question here?"),
            faq("FQ_10", "Tenth question here?"),
            faq("FQ_1", "First question here?"),
        ];
        let deduped = dedupe_faqs(records);
        let ids: Vec<&str> = deduped.iter().map(|f| f.id.as_str()).collect();
        // Deliberate: string ordering puts FQ_10 before FQ_2.
        assert_eq!(ids, vec!["FQ_1", "FQ_10", "FQ_2"]);
    }

    #[test]
    fn empty_key_records_dropped() {
        let records = vec![faq("FQ_1", "???!!")];
        assert!(dedupe_faqs(records).is_empty());
    }
}
