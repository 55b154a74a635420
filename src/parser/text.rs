use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static LOWER_UPPER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").unwrap());
static LETTER_DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([a-z])(\d)").unwrap());
static DIGIT_LETTER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d)([A-Za-z])").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Known mis-joined phrases left behind by markup extraction, applied in
/// order. Data, not logic — extend the table, not the code.
const PHRASE_FIXUPS: &[(&str, &str)] = &[
    ("Ourshort-term", "Our short-term"),
    ("Explore thebenefits", "Explore the benefits"),
    ("Explore oursearch", "Explore our search"),
    ("Learn more aboutPremiere", "Learn more about Premiere"),
    ("Visit ourContact", "Visit our Contact"),
    ("You cansearch", "You can search"),
    ("you cancontact", "you can contact"),
    ("Pleasecontact", "Please contact"),
    ("pleasecontact", "please contact"),
    ("pleaseget", "please get"),
    ("Click hereto", "Click here to"),
];

/// Clean raw markup text: strip tags, repair concatenated-word artifacts at
/// case/digit boundaries, apply the phrase fixup table, collapse whitespace.
/// Idempotent; always returns a string, possibly empty.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let text = TAG_RE.replace_all(raw, "");
    let text = LOWER_UPPER_RE.replace_all(&text, "$1 $2");
    let text = LETTER_DIGIT_RE.replace_all(&text, "$1 $2");
    let text = DIGIT_LETTER_RE.replace_all(&text, "$1 $2");

    let mut text = text.into_owned();
    for (find, replace) in PHRASE_FIXUPS {
        text = text.replace(find, replace);
    }

    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags() {
        assert_eq!(normalize("<p>Hello <b>world</b></p>"), "Hello world");
    }

    #[test]
    fn repairs_case_boundaries() {
        assert_eq!(normalize("checkOut"), "check Out");
        assert_eq!(normalize("suite2"), "suite 2");
        assert_eq!(normalize("2BR"), "2 BR");
    }

    #[test]
    fn applies_phrase_fixups() {
        assert_eq!(
            normalize("Ourshort-term rentals"),
            "Our short-term rentals"
        );
        assert_eq!(normalize("Click hereto learn"), "Click here to learn");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize("  a \t b\n\nc  "), "a b c");
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn idempotent() {
        let samples = [
            "<div>Ourshort-term 2BR suiteWith balcony</div>",
            "plain text already clean",
            "Rating:4.5 stars",
            "",
        ];
        for raw in samples {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {raw:?}");
        }
    }
}
