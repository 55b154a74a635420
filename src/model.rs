use std::collections::BTreeSet;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

/// One furnished-apartment listing. Created once per (name, city) pair per
/// scrape pass, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub id: String,
    pub name: String,
    pub city: String,
    pub rating: Option<f64>,
    pub room_type: String,
    pub amenities: Vec<String>,
    pub suite_features: Vec<String>,
    pub description: String,
    pub url: String,
    pub image_url: Option<String>,
    pub pet_friendly: bool,
    pub bedrooms: Option<u32>,
    pub building_type: String,
}

/// One FAQ entry. Question and answer are non-empty by construction (the
/// builder rejects short units).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqRecord {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub category: String,
    pub tags: Vec<String>,
    pub source_url: String,
}

/// Rendering capability shared by both record types so one exporter serves
/// both: CSV row, report fields, embedding text chunk, JSONL header lines.
pub trait Exportable: Serialize + DeserializeOwned {
    /// `"type"` discriminator written on JSONL record lines.
    const KIND: &'static str;
    /// Document title for the report formats.
    const TITLE: &'static str;
    /// Heading over the per-record detail section.
    const SECTION: &'static str;

    /// Embedding input: key fields joined with " | ". Non-empty for any
    /// record built by this crate.
    fn text_chunk(&self, index: usize) -> String;

    /// Substitute when externally-loaded data carries no usable text.
    fn chunk_fallback(&self) -> String;

    fn csv_header() -> &'static [&'static str];
    fn csv_row(&self) -> Vec<String>;

    /// Report heading for one record, e.g. "3. The Met - Toronto".
    fn report_title(&self, index: usize) -> String;

    /// Labeled report fields in display order; absent optional fields are
    /// omitted entirely.
    fn report_fields(&self) -> Vec<(&'static str, String)>;

    /// First JSONL line: generation info.
    fn metadata_line(count: usize, source_url: &str, generated_on: &str) -> Value;

    /// Second JSONL line: aggregate stats over the record set.
    fn summary_line(records: &[Self]) -> Value
    where
        Self: Sized;
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Exportable for PropertyRecord {
    const KIND: &'static str = "property";
    const TITLE: &'static str = "Premiere Suites Property Database";
    const SECTION: &'static str = "Property Details";

    fn text_chunk(&self, index: usize) -> String {
        let mut parts = vec![
            format!("Property {}: {}", index, self.name),
            format!("Location: {}", self.city),
        ];
        if let Some(rating) = self.rating {
            parts.push(format!("Rating: {}/5.0", rating));
        }
        if let Some(bedrooms) = self.bedrooms {
            parts.push(format!("Bedrooms: {}", bedrooms));
        }
        parts.push(format!("Room Type: {}", self.room_type));
        parts.push(format!("Pet Friendly: {}", yes_no(self.pet_friendly)));
        if !self.amenities.is_empty() {
            parts.push(format!("Amenities: {}", self.amenities.join(", ")));
        }
        if !self.description.is_empty() {
            parts.push(format!("Description: {}", self.description));
        }
        parts.push(format!("Building Type: {}", self.building_type));
        if !self.suite_features.is_empty() {
            parts.push(format!("Suite Features: {}", self.suite_features.join(", ")));
        }
        parts.join(" | ")
    }

    fn chunk_fallback(&self) -> String {
        format!("Property {}", self.id)
    }

    fn csv_header() -> &'static [&'static str] {
        &[
            "id",
            "name",
            "city",
            "rating",
            "room_type",
            "amenities",
            "suite_features",
            "description",
            "url",
            "image_url",
            "pet_friendly",
            "bedrooms",
            "building_type",
        ]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.city.clone(),
            self.rating.map(|r| r.to_string()).unwrap_or_default(),
            self.room_type.clone(),
            self.amenities.join(", "),
            self.suite_features.join(", "),
            self.description.clone(),
            self.url.clone(),
            self.image_url.clone().unwrap_or_default(),
            self.pet_friendly.to_string(),
            self.bedrooms.map(|b| b.to_string()).unwrap_or_default(),
            self.building_type.clone(),
        ]
    }

    fn report_title(&self, index: usize) -> String {
        format!("{}. {} - {}", index, self.name, self.city)
    }

    fn report_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("Property ID", self.id.clone()),
            ("Room Type", self.room_type.clone()),
        ];
        if let Some(rating) = self.rating {
            fields.push(("Rating", format!("{}/5.0", rating)));
        }
        if let Some(bedrooms) = self.bedrooms {
            fields.push(("Bedrooms", bedrooms.to_string()));
        }
        fields.push(("Pet Friendly", yes_no(self.pet_friendly).to_string()));
        if !self.amenities.is_empty() {
            fields.push(("Amenities", self.amenities.join(", ")));
        }
        fields.push(("Description", self.description.clone()));
        fields.push(("Building Type", self.building_type.clone()));
        if !self.suite_features.is_empty() {
            fields.push(("Suite Features", self.suite_features.join(", ")));
        }
        fields
    }

    fn metadata_line(count: usize, source_url: &str, generated_on: &str) -> Value {
        json!({
            "type": "metadata",
            "generated_on": generated_on,
            "total_properties": count,
            "source_url": source_url,
            "purpose": "vector_database_ingestion",
            "format": "jsonl",
        })
    }

    fn summary_line(records: &[Self]) -> Value {
        let cities: BTreeSet<&str> = records.iter().map(|p| p.city.as_str()).collect();
        let rated: Vec<f64> = records.iter().filter_map(|p| p.rating).collect();
        let average = if rated.is_empty() {
            0.0
        } else {
            rated.iter().sum::<f64>() / rated.len() as f64
        };
        json!({
            "type": "summary",
            "cities_covered": cities.len(),
            "average_rating": round2(average),
            "pet_friendly_count": records.iter().filter(|p| p.pet_friendly).count(),
            "cities": cities,
        })
    }
}

impl Exportable for FaqRecord {
    const KIND: &'static str = "faq";
    const TITLE: &'static str = "Premiere Suites FAQ Database";
    const SECTION: &'static str = "FAQ Details";

    fn text_chunk(&self, index: usize) -> String {
        let mut parts = vec![
            format!("FAQ {}: {}", index, self.question),
            format!("Category: {}", self.category),
            format!("Answer: {}", self.answer),
        ];
        if !self.tags.is_empty() {
            parts.push(format!("Tags: {}", self.tags.join(", ")));
        }
        parts.join(" | ")
    }

    fn chunk_fallback(&self) -> String {
        format!("FAQ ID: {}", self.id)
    }

    fn csv_header() -> &'static [&'static str] {
        &["id", "question", "answer", "category", "tags", "source_url"]
    }

    fn csv_row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.question.clone(),
            self.answer.clone(),
            self.category.clone(),
            self.tags.join(", "),
            self.source_url.clone(),
        ]
    }

    fn report_title(&self, index: usize) -> String {
        format!("{}. {}", index, self.question)
    }

    fn report_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("FAQ ID", self.id.clone()),
            ("Category", self.category.clone()),
            ("Answer", self.answer.clone()),
        ];
        if !self.tags.is_empty() {
            fields.push(("Tags", self.tags.join(", ")));
        }
        fields
    }

    fn metadata_line(count: usize, source_url: &str, generated_on: &str) -> Value {
        json!({
            "type": "metadata",
            "generated_on": generated_on,
            "total_faqs": count,
            "source_url": source_url,
            "purpose": "vector_database_ingestion",
            "format": "jsonl",
            "content_type": "faq",
        })
    }

    fn summary_line(records: &[Self]) -> Value {
        let categories: BTreeSet<&str> = records.iter().map(|f| f.category.as_str()).collect();
        let tags: BTreeSet<&str> = records
            .iter()
            .flat_map(|f| f.tags.iter().map(String::as_str))
            .collect();
        let top_tags: Vec<&str> = tags.iter().copied().take(20).collect();
        json!({
            "type": "summary",
            "categories_covered": categories.len(),
            "total_tags": tags.len(),
            "categories": categories,
            "top_tags": top_tags,
        })
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_property() -> PropertyRecord {
        PropertyRecord {
            id: "THEMET".to_string(),
            name: "The Met".to_string(),
            city: "Toronto".to_string(),
            rating: Some(4.5),
            room_type: "Suite".to_string(),
            amenities: vec!["Gym".to_string(), "Pool".to_string()],
            suite_features: vec!["Balcony".to_string()],
            description: "The Met Toronto 4.5".to_string(),
            url: "https://premieresuites.com/furnished-apartments/toronto/the-met/".to_string(),
            image_url: None,
            pet_friendly: true,
            bedrooms: Some(2),
            building_type: "Apartment Building".to_string(),
        }
    }

    #[test]
    fn property_text_chunk_layout() {
        let chunk = sample_property().text_chunk(1);
        assert!(chunk.starts_with("Property 1: The Met | Location: Toronto"));
        assert!(chunk.contains("Rating: 4.5/5.0"));
        assert!(chunk.contains("Amenities: Gym, Pool"));
        assert!(chunk.contains("Pet Friendly: Yes"));
    }

    #[test]
    fn property_chunk_skips_absent_fields() {
        let mut record = sample_property();
        record.rating = None;
        record.amenities.clear();
        let chunk = record.text_chunk(2);
        assert!(!chunk.contains("Rating:"));
        assert!(!chunk.contains("Amenities:"));
    }

    #[test]
    fn property_summary_stats() {
        let mut second = sample_property();
        second.name = "Harbour View".to_string();
        second.city = "Halifax".to_string();
        second.rating = Some(4.0);
        second.pet_friendly = false;
        let summary = PropertyRecord::summary_line(&[sample_property(), second]);
        assert_eq!(summary["cities_covered"], 2);
        assert_eq!(summary["average_rating"], 4.25);
        assert_eq!(summary["pet_friendly_count"], 1);
        assert_eq!(summary["cities"][0], "Halifax");
    }

    #[test]
    fn faq_text_chunk_layout() {
        let record = FaqRecord {
            id: "FQ_4".to_string(),
            question: "How do I book a reservation?".to_string(),
            answer: "Call us or book online.".to_string(),
            category: "Booking & Reservations".to_string(),
            tags: vec!["booking".to_string()],
            source_url: "https://premieresuites.com/faq/".to_string(),
        };
        assert_eq!(
            record.text_chunk(4),
            "FAQ 4: How do I book a reservation? | Category: Booking & Reservations | \
             Answer: Call us or book online. | Tags: booking"
        );
    }

    #[test]
    fn summary_with_no_rated_records() {
        let mut record = sample_property();
        record.rating = None;
        let summary = PropertyRecord::summary_line(&[record]);
        assert_eq!(summary["average_rating"], 0.0);
    }
}
