use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::model::PropertyRecord;
use crate::parser::extract::{bedrooms, keywords, rating, room_type, Vocabulary};
use crate::parser::text;

static PROPERTY_HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/furnished-apartments/[^/]+/[^/]+/").unwrap());
static DECIMAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\.\d+").unwrap());

const BASE_DOMAIN: &str = "https://premieresuites.com";
const BUILDING_TYPE: &str = "Apartment Building";
const CONTAINER_TAGS: &[&str] = &["div", "article", "section"];
const ID_MAX_LEN: usize = 10;

/// Parse every property unit on a listing page. Units whose identifying
/// fields cannot be read are skipped, not errors.
pub fn parse(html: &str, vocab: &Vocabulary) -> Vec<PropertyRecord> {
    let doc = Html::parse_document(html);
    let anchor_sel = Selector::parse("a[href]").unwrap();

    // Unique property URLs in first-occurrence document order. The
    // page-wide rating list is paired with units positionally, so this
    // iteration order decides which unit gets which rating.
    let mut seen = HashSet::new();
    let mut units: Vec<(String, ElementRef)> = Vec::new();
    for anchor in doc.select(&anchor_sel) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if PROPERTY_HREF_RE.is_match(href) && seen.insert(href.to_string()) {
            units.push((href.to_string(), anchor));
        }
    }
    debug!("Found {} unique property URLs", units.len());

    let page_text = text::normalize(&element_text(doc.root_element()));
    let page_ratings = rating::all(&page_text);
    debug!("Found {} ratings on the page", page_ratings.len());

    let mut records = Vec::new();
    for (index, (href, anchor)) in units.iter().enumerate() {
        let unit_rating = page_ratings.get(index).copied();
        match build_record(href, *anchor, &page_text, unit_rating, vocab) {
            Some(record) => records.push(record),
            None => debug!("Skipping unparseable property unit: {}", href),
        }
    }
    records
}

fn build_record(
    href: &str,
    anchor: ElementRef,
    page_text: &str,
    page_rating: Option<f64>,
    vocab: &Vocabulary,
) -> Option<PropertyRecord> {
    let (name, city) = name_city_from_href(href)?;

    let narrow = nearest_container(anchor);
    let container = widen_if_no_decimal(narrow);
    let container_text = text::normalize(&element_text(container));

    // Positional page assignment first; when the list runs out, fall back
    // to the unit's own (un-widened) card text.
    let rating = page_rating
        .or_else(|| rating::first(&text::normalize(&element_text(narrow))));

    // Set-valued fields take the union of container and page matches for
    // recall; single-valued fields prefer the container.
    let amenities = merge_unique(
        keywords::matching(vocab.amenities, &container_text),
        keywords::matching(vocab.amenities, page_text),
    );
    let suite_features = merge_unique(
        keywords::matching(vocab.suite_features, &container_text),
        keywords::matching(vocab.suite_features, page_text),
    );
    let bedrooms =
        bedrooms::bedrooms(&container_text).or_else(|| bedrooms::bedrooms(page_text));
    let pet_friendly = keywords::contains_any(vocab.pet_indicators, &container_text)
        || keywords::contains_any(vocab.pet_indicators, page_text);

    let mut description = format!("{} {}", name, city);
    if let Some(r) = rating {
        description.push_str(&format!(" {}", r));
    }

    Some(PropertyRecord {
        id: property_id(&name),
        room_type: room_type::room_type(vocab, &container_text),
        amenities,
        suite_features,
        description,
        url: absolute_url(href),
        image_url: image_url(container),
        pet_friendly,
        bedrooms,
        building_type: BUILDING_TYPE.to_string(),
        rating,
        name,
        city,
    })
}

/// City and name are the last two path segments of
/// `/furnished-apartments/<city>/<name>/`.
fn name_city_from_href(href: &str) -> Option<(String, String)> {
    let parts: Vec<&str> = href.split('/').filter(|p| !p.is_empty()).collect();
    if parts.len() < 3 {
        return None;
    }
    let city = title_case(&parts[parts.len() - 2].replace('-', " "));
    let name = title_case(&parts[parts.len() - 1].replace(['-', '_'], " "));
    Some((name, city))
}

/// Deterministic id from the name: alphanumerics only, uppercased, at most
/// ten characters. Not globally unique — collisions are left to the
/// downstream (name, city) dedup.
pub fn property_id(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .take(ID_MAX_LEN)
        .collect::<String>()
        .to_uppercase()
}

/// Nearest block ancestor of the unit's anchor.
fn nearest_container(anchor: ElementRef) -> ElementRef {
    anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| CONTAINER_TAGS.contains(&el.value().name()))
        .unwrap_or(anchor)
}

/// Widen one level when the container shows no decimal number (the rating
/// usually lives in the outer card markup).
fn widen_if_no_decimal(container: ElementRef) -> ElementRef {
    let container_text = element_text(container);
    if DECIMAL_RE.is_match(&container_text) {
        return container;
    }
    container
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| CONTAINER_TAGS.contains(&el.value().name()) || el.value().name() == "main")
        .unwrap_or(container)
}

fn element_text(el: ElementRef) -> String {
    el.text().collect::<Vec<_>>().join(" ")
}

fn image_url(container: ElementRef) -> Option<String> {
    let img_sel = Selector::parse("img").unwrap();
    container
        .select(&img_sel)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::to_string)
}

fn absolute_url(href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{}{}", BASE_DOMAIN, href)
    }
}

fn merge_unique(first: Vec<String>, second: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for item in first.into_iter().chain(second) {
        if seen.insert(item.clone()) {
            merged.push(item);
        }
    }
    merged
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> String {
        std::fs::read_to_string("tests/fixtures/find_your_match.html").unwrap()
    }

    #[test]
    fn name_city_from_listing_href() {
        let (name, city) =
            name_city_from_href("/furnished-apartments/quebec-city/le-grand/").unwrap();
        assert_eq!(name, "Le Grand");
        assert_eq!(city, "Quebec City");
    }

    #[test]
    fn underscores_become_spaces_in_name() {
        let (name, _) =
            name_city_from_href("/furnished-apartments/toronto/bay_street_suites/").unwrap();
        assert_eq!(name, "Bay Street Suites");
    }

    #[test]
    fn short_href_rejected() {
        assert!(name_city_from_href("/faq/").is_none());
    }

    #[test]
    fn property_id_rules() {
        assert_eq!(property_id("The Met"), "THEMET");
        assert_eq!(property_id("Bay & Wellington Tower"), "BAYWELLING");
        assert_eq!(property_id(""), "");
    }

    #[test]
    fn fixture_units_extracted() {
        let records = parse(&fixture(), &Vocabulary::default());
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["The Met", "Harbour View", "Le Grand"]);
        assert!(records.iter().all(|r| !r.id.is_empty()));
    }

    #[test]
    fn fixture_ratings_assigned_positionally() {
        let records = parse(&fixture(), &Vocabulary::default());
        assert_eq!(records[0].rating, Some(4.5));
        assert_eq!(records[1].rating, Some(4.8));
        // Only two in-range ratings on the page; the third unit gets none.
        assert_eq!(records[2].rating, None);
    }

    #[test]
    fn fixture_container_fields() {
        let records = parse(&fixture(), &Vocabulary::default());
        let met = &records[0];
        assert_eq!(met.bedrooms, Some(2));
        assert!(met.pet_friendly);
        assert!(met.amenities.contains(&"Gym".to_string()));
        assert!(met.amenities.contains(&"Pool".to_string()));
        assert_eq!(met.image_url.as_deref(), Some("/img/the-met.jpg"));
        assert_eq!(
            met.url,
            "https://premieresuites.com/furnished-apartments/toronto/the-met/"
        );
    }

    #[test]
    fn fixture_page_wide_merge() {
        let records = parse(&fixture(), &Vocabulary::default());
        // "Free WiFi" only appears in the page footer, far from any card;
        // the page-wide pass still picks it up for every unit.
        assert!(records
            .iter()
            .all(|r| r.amenities.contains(&"Free WiFi".to_string())));
    }

    #[test]
    fn duplicate_hrefs_collapse_to_one_unit() {
        let html = r#"
            <div>
              <a href="/furnished-apartments/toronto/the-met/"><img src="/a.jpg"></a>
              <a href="/furnished-apartments/toronto/the-met/">The Met</a>
            </div>"#;
        let records = parse(html, &Vocabulary::default());
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn page_without_units_yields_nothing() {
        let records = parse("<html><body><p>Nothing here</p></body></html>", &Vocabulary::default());
        assert!(records.is_empty());
    }
}
