use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::ids;
use crate::model::FaqRecord;
use crate::parser::extract::{category, keywords, Vocabulary};
use crate::parser::text;

const MIN_QUESTION_LEN: usize = 5;
const MIN_ANSWER_LEN: usize = 10;

/// Parse every FAQ unit on a page. Units failing the length checks are
/// skipped, not errors. Falls back to accordion markup when the page has no
/// `faq__each` units at all.
pub fn parse(html: &str, source_url: &str, vocab: &Vocabulary) -> Vec<FaqRecord> {
    let doc = Html::parse_document(html);
    let unit_sel = Selector::parse("div.faq__each").unwrap();
    let units: Vec<ElementRef> = doc.select(&unit_sel).collect();
    debug!("Found {} FAQ sections", units.len());

    let records: Vec<FaqRecord> = units
        .iter()
        .filter_map(|unit| parse_unit(*unit, source_url, vocab))
        .collect();

    if records.is_empty() {
        return parse_accordions(&doc, source_url, vocab);
    }
    records
}

fn parse_unit(unit: ElementRef, source_url: &str, vocab: &Vocabulary) -> Option<FaqRecord> {
    let question_sel = Selector::parse("h3.sub-title").unwrap();
    let question_el = unit.select(&question_sel).next()?;
    let question = text::normalize(&element_text(question_el));

    let unit_id = unit.value().attr("id").unwrap_or("");
    let panel = find_panel(unit, unit_id)?;
    let answer = text::normalize(&element_text(panel));

    if question.chars().count() < MIN_QUESTION_LEN || answer.chars().count() < MIN_ANSWER_LEN {
        debug!("Skipping short FAQ unit: {:?}", question);
        return None;
    }

    let id = if unit_id.is_empty() {
        fallback_id(&question)
    } else {
        unit_id.to_uppercase()
    };

    Some(build_record(id, question, answer, source_url, vocab))
}

/// Accordion markup variant: heading plus a following `psf_panel` sibling.
/// Ids are positional since accordion nodes carry none.
fn parse_accordions(doc: &Html, source_url: &str, vocab: &Vocabulary) -> Vec<FaqRecord> {
    let accordion_sel = Selector::parse("div.accordion").unwrap();
    let heading_sel = Selector::parse("h3, h4, h5").unwrap();

    let mut records = Vec::new();
    for (i, accordion) in doc.select(&accordion_sel).enumerate() {
        let Some(question_el) = accordion.select(&heading_sel).next() else {
            continue;
        };
        let question = text::normalize(&element_text(question_el));

        let Some(panel) = next_sibling_panel(accordion) else {
            continue;
        };
        let answer = text::normalize(&element_text(panel));

        if question.chars().count() < MIN_QUESTION_LEN || answer.chars().count() < MIN_ANSWER_LEN {
            continue;
        }

        records.push(build_record(
            format!("FAQ_{:03}", i + 1),
            question,
            answer,
            source_url,
            vocab,
        ));
    }
    records
}

fn build_record(
    id: String,
    question: String,
    answer: String,
    source_url: &str,
    vocab: &Vocabulary,
) -> FaqRecord {
    let combined = format!("{} {}", question, answer);
    FaqRecord {
        id,
        category: category::category(vocab, &combined),
        tags: keywords::matching(vocab.faq_tags, &combined),
        question,
        answer,
        source_url: source_url.to_string(),
    }
}

/// `fq_12` units publish their answer in a panel `fq_12_panel`; older markup
/// nests a bare `psf_panel` instead.
fn find_panel<'a>(unit: ElementRef<'a>, unit_id: &str) -> Option<ElementRef<'a>> {
    if !unit_id.is_empty() {
        if let Ok(panel_sel) = Selector::parse(&format!("div#{}_panel", unit_id)) {
            if let Some(panel) = unit.select(&panel_sel).next() {
                return Some(panel);
            }
        }
    }
    let fallback_sel = Selector::parse("div.psf_panel").unwrap();
    unit.select(&fallback_sel).next()
}

fn next_sibling_panel(el: ElementRef) -> Option<ElementRef> {
    el.next_siblings().filter_map(ElementRef::wrap).find(|sib| {
        sib.value().name() == "div" && sib.value().classes().any(|c| c == "psf_panel")
    })
}

fn fallback_id(question: &str) -> String {
    format!("FAQ_{:03}", ids::fnv1a64(question) % 1000)
}

fn element_text(el: ElementRef) -> String {
    el.text().collect::<Vec<_>>().join(" ")
}

// ── Tests ──
