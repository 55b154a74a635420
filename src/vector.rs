use std::time::Duration;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::ids;

pub const DEFAULT_BATCH_SIZE: usize = 50;
const EMBED_BATCH: usize = 64;
const MAX_RETRIES: u32 = 3;
const BASE_BACKOFF_MS: u64 = 1000;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// One vector-store point: normalized integer id, embedding, payload.
#[derive(Debug, Clone, Serialize)]
pub struct Point {
    pub id: u64,
    pub vector: Vec<f32>,
    pub payload: Value,
}

/// A search hit with its similarity score.
#[derive(Debug, Deserialize)]
pub struct ScoredPoint {
    pub score: f32,
    #[serde(default)]
    pub payload: Value,
}

// ── Point preparation ──

/// Payload + normalized id for one loaded FAQ line. The payload always
/// carries non-empty `content`, a `metadata` object, and `id`; `content`
/// falls back from text_chunk to a question/answer join to the bare id.
pub fn prepare_faq_point(record: &Value, index: usize, ingested_at: &str) -> (u64, Value) {
    let id = ids::normalize_id(record.get("id").unwrap_or(&Value::Null), index as u64 + 1);
    let content = faq_content(record, id);
    let metadata = json!({
        "faq_id": id,
        "question": str_field(record, "question"),
        "answer": str_field(record, "answer"),
        "category": str_field(record, "category"),
        "tags": record.get("tags").cloned().unwrap_or_else(|| json!([])),
        "source_url": str_field(record, "source_url"),
        "ingested_at": ingested_at,
    });
    (id, assemble_payload(id, content, metadata))
}

/// Payload + normalized id for one loaded property line.
pub fn prepare_property_point(record: &Value, index: usize, ingested_at: &str) -> (u64, Value) {
    let id = ids::normalize_id(record.get("id").unwrap_or(&Value::Null), index as u64 + 1);
    let content = property_content(record, id);
    let metadata = json!({
        "property_id": id,
        "name": str_field(record, "name"),
        "city": str_field(record, "city"),
        "rating": record.get("rating").cloned().unwrap_or(Value::Null),
        "room_type": str_field(record, "room_type"),
        "amenities": record.get("amenities").cloned().unwrap_or_else(|| json!([])),
        "pet_friendly": record.get("pet_friendly").cloned().unwrap_or(json!(false)),
        "bedrooms": record.get("bedrooms").cloned().unwrap_or(Value::Null),
        "source_url": str_field(record, "url"),
        "ingested_at": ingested_at,
    });
    (id, assemble_payload(id, content, metadata))
}

/// The metadata fields also ride along flat, next to `content`/`metadata`/
/// `id`, for consumers that predate the nested shape.
fn assemble_payload(id: u64, content: String, metadata: Value) -> Value {
    let mut payload = metadata.clone();
    if let Some(map) = payload.as_object_mut() {
        map.insert("content".to_string(), json!(content));
        map.insert("metadata".to_string(), metadata);
        map.insert("id".to_string(), json!(id));
    }
    payload
}

fn str_field(record: &Value, key: &str) -> String {
    record
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

fn faq_content(record: &Value, id: u64) -> String {
    let content = str_field(record, "content");
    if !content.trim().is_empty() {
        return content;
    }
    let chunk = str_field(record, "text_chunk");
    if !chunk.trim().is_empty() {
        return chunk;
    }
    let question = str_field(record, "question");
    let answer = str_field(record, "answer");
    if !question.trim().is_empty() || !answer.trim().is_empty() {
        return format!("Q: {}\nA: {}", question, answer);
    }
    format!("FAQ ID: {}", id)
}

fn property_content(record: &Value, id: u64) -> String {
    let content = str_field(record, "content");
    if !content.trim().is_empty() {
        return content;
    }
    let chunk = str_field(record, "text_chunk");
    if !chunk.trim().is_empty() {
        return chunk;
    }
    format!("Property {}", id)
}

// ── Embeddings boundary ──

/// Thin client for an OpenAI-compatible embeddings endpoint. The model
/// itself stays external; this only ships text and collects vectors.
pub struct EmbeddingsClient {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Deserialize)]
struct EmbeddingRow {
    index: usize,
    embedding: Vec<f32>,
}

impl EmbeddingsClient {
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var("EMBEDDINGS_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1/embeddings".to_string());
        let api_key = std::env::var("EMBEDDINGS_API_KEY").ok();
        let model = std::env::var("EMBEDDINGS_MODEL")
            .unwrap_or_else(|_| "text-embedding-3-small".to_string());
        let http = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            endpoint,
            api_key,
            model,
        })
    }

    /// Embed texts in fixed-size sequential batches, preserving order.
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(EMBED_BATCH) {
            let mut request = self
                .http
                .post(&self.endpoint)
                .json(&json!({ "model": self.model, "input": batch }));
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }
            let response = request
                .send()
                .await
                .context("Embeddings request failed")?
                .error_for_status()
                .context("Embeddings request rejected")?;
            let mut body: EmbeddingsResponse = response
                .json()
                .await
                .context("Malformed embeddings response")?;
            body.data.sort_by_key(|row| row.index);
            if body.data.len() != batch.len() {
                bail!(
                    "Embeddings response returned {} vectors for {} inputs",
                    body.data.len(),
                    batch.len()
                );
            }
            vectors.extend(body.data.into_iter().map(|row| row.embedding));
        }
        Ok(vectors)
    }
}

// ── Vector-store boundary (Qdrant REST) ──

pub struct QdrantClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl QdrantClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_env() -> Result<Self> {
        let url =
            std::env::var("QDRANT_URL").unwrap_or_else(|_| "http://localhost:6333".to_string());
        let api_key = std::env::var("QDRANT_API_KEY").ok();
        Self::new(&url, api_key)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        if let Some(key) = &self.api_key {
            builder = builder.header("api-key", key);
        }
        builder
    }

    /// Create the collection unless it already exists; with `recreate`,
    /// drop and recreate it.
    pub async fn ensure_collection(
        &self,
        name: &str,
        vector_size: usize,
        recreate: bool,
    ) -> Result<()> {
        let path = format!("/collections/{}", name);
        if recreate {
            let _ = self.request(Method::DELETE, &path).send().await;
        } else {
            let exists = self
                .request(Method::GET, &path)
                .send()
                .await
                .map(|r| r.status().is_success())
                .unwrap_or(false);
            if exists {
                info!("Collection {} already exists", name);
                return Ok(());
            }
        }

        self.request(Method::PUT, &path)
            .json(&json!({ "vectors": { "size": vector_size, "distance": "Cosine" } }))
            .send()
            .await
            .context("Collection create request failed")?
            .error_for_status()
            .context("Collection create rejected")?;
        info!("Created collection {} (dim {})", name, vector_size);
        Ok(())
    }

    /// Insert points in sequential batches. Each batch retries a fixed
    /// number of times with linear backoff (wait = base × attempt); no
    /// parallel uploads.
    pub async fn upsert(
        &self,
        collection: &str,
        points: &[Point],
        batch_size: usize,
    ) -> Result<()> {
        let pb = ProgressBar::new(points.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec})")?
                .progress_chars("=> "),
        );

        for batch in points.chunks(batch_size) {
            self.upsert_batch(collection, batch).await?;
            pb.inc(batch.len() as u64);
        }
        pb.finish_and_clear();
        info!("Upserted {} points into {}", points.len(), collection);
        Ok(())
    }

    async fn upsert_batch(&self, collection: &str, batch: &[Point]) -> Result<()> {
        let path = format!("/collections/{}/points?wait=true", collection);
        let body = json!({ "points": batch });

        for attempt in 1..=MAX_RETRIES {
            match self
                .request(Method::PUT, &path)
                .json(&body)
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => warn!(
                    "Upsert batch failed (attempt {}/{}): HTTP {}",
                    attempt,
                    MAX_RETRIES,
                    response.status()
                ),
                Err(e) => warn!(
                    "Upsert batch failed (attempt {}/{}): {}",
                    attempt, MAX_RETRIES, e
                ),
            }
            if attempt < MAX_RETRIES {
                tokio::time::sleep(Duration::from_millis(BASE_BACKOFF_MS * u64::from(attempt)))
                    .await;
            }
        }
        bail!("Upsert batch failed after {} attempts", MAX_RETRIES)
    }

    /// Similarity search with an optional exact-match payload filter.
    pub async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        top_k: usize,
        filter: Option<(&str, &str)>,
    ) -> Result<Vec<ScoredPoint>> {
        let mut body = json!({
            "vector": vector,
            "limit": top_k,
            "with_payload": true,
        });
        if let Some((field, value)) = filter {
            body["filter"] = json!({ "must": [{ "key": field, "match": { "value": value } }] });
        }

        #[derive(Deserialize)]
        struct SearchResponse {
            result: Vec<ScoredPoint>,
        }

        let response = self
            .request(
                Method::POST,
                &format!("/collections/{}/points/search", collection),
            )
            .json(&body)
            .send()
            .await
            .context("Search request failed")?
            .error_for_status()
            .context("Search request rejected")?;
        let parsed: SearchResponse = response
            .json()
            .await
            .context("Malformed search response")?;
        Ok(parsed.result)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faq_point_uses_text_chunk_as_content() {
        let record = json!({
            "id": "FQ_4",
            "question": "How do I book?",
            "answer": "Online.",
            "category": "Booking & Reservations",
            "tags": ["booking"],
            "source_url": "u",
            "text_chunk": "FAQ 1: How do I book? | Answer: Online.",
        });
        let (id, payload) = prepare_faq_point(&record, 0, "2025-01-01T00:00:00");
        assert_eq!(id, 4);
        assert_eq!(payload["content"], "FAQ 1: How do I book? | Answer: Online.");
        assert_eq!(payload["faq_id"], 4);
        assert_eq!(payload["ingested_at"], "2025-01-01T00:00:00");
    }

    #[test]
    fn payload_carries_content_metadata_and_id() {
        let record = json!({ "id": "FQ_4", "question": "How do I book?", "answer": "Online." });
        let (id, payload) = prepare_faq_point(&record, 0, "t");
        assert_eq!(payload["id"], id);
        assert!(!payload["content"].as_str().unwrap().is_empty());
        let metadata = payload["metadata"].as_object().unwrap();
        assert!(!metadata.is_empty());
        assert_eq!(metadata["question"], "How do I book?");
        // Flat copies mirror the metadata fields.
        assert_eq!(payload["question"], "How do I book?");
    }

    #[test]
    fn faq_content_falls_back_to_question_answer() {
        let record = json!({ "id": "FQ_9", "question": "Q?", "answer": "A." });
        let (_, payload) = prepare_faq_point(&record, 0, "t");
        assert_eq!(payload["content"], "Q: Q?\nA: A.");
    }

    #[test]
    fn faq_content_last_resort_is_id() {
        let record = json!({ "id": "FQ_9" });
        let (_, payload) = prepare_faq_point(&record, 0, "t");
        assert_eq!(payload["content"], "FAQ ID: 9");
    }

    #[test]
    fn missing_id_takes_position() {
        let record = json!({ "question": "Q?", "answer": "A." });
        let (id, _) = prepare_faq_point(&record, 4, "t");
        assert_eq!(id, 5);
    }

    #[test]
    fn property_point_content_never_empty() {
        let record = json!({ "id": "THEMET" });
        let (id, payload) = prepare_property_point(&record, 0, "t");
        let content = payload["content"].as_str().unwrap();
        assert_eq!(content, format!("Property {}", id));
        assert!(!content.is_empty());
    }

    #[test]
    fn point_serializes_for_the_wire() {
        let point = Point {
            id: 7,
            vector: vec![0.5, 0.25],
            payload: json!({ "content": "x" }),
        };
        let wire = serde_json::to_value(&point).unwrap();
        assert_eq!(wire["id"], 7);
        assert_eq!(wire["vector"][1], 0.25);
    }
}
