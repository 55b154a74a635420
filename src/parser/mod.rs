pub mod extract;
pub mod faq;
pub mod property;
pub mod text;

use rayon::prelude::*;

use crate::dedupe;
use crate::model::{FaqRecord, PropertyRecord};
use extract::Vocabulary;

/// Property pipeline over one or more pages: units → records → dedup.
pub fn process_property_pages(pages: &[String], vocab: &Vocabulary) -> Vec<PropertyRecord> {
    let per_page: Vec<Vec<PropertyRecord>> = pages
        .par_iter()
        .map(|html| property::parse(html, vocab))
        .collect();
    dedupe::dedupe_properties(per_page.into_iter().flatten().collect())
}

/// FAQ pipeline over one or more pages: units → records → dedup → id-sorted.
pub fn process_faq_pages(
    pages: &[String],
    source_url: &str,
    vocab: &Vocabulary,
) -> Vec<FaqRecord> {
    let per_page: Vec<Vec<FaqRecord>> = pages
        .par_iter()
        .map(|html| faq::parse(html, source_url, vocab))
        .collect();
    dedupe::dedupe_faqs(per_page.into_iter().flatten().collect())
}

// ── Tests ──
