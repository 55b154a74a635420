mod dedupe;
mod export;
mod fetch;
mod ids;
mod ingest;
mod model;
mod overrides;
mod parser;
mod vector;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;

use export::Format;
use model::{Exportable, FaqRecord, PropertyRecord};
use parser::extract::Vocabulary;

const PROPERTIES_URL: &str = "https://premieresuites.com/find-your-match/";
const FAQ_URL: &str = "https://premieresuites.com/faq/";

#[derive(Parser)]
#[command(
    name = "suites_scraper",
    about = "Premiere Suites property/FAQ scraper, normalizer and exporter"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape property listings and export every format
    Properties {
        #[arg(long, default_value = PROPERTIES_URL)]
        url: String,
        /// Parse saved HTML files instead of fetching
        #[arg(short, long)]
        input: Vec<PathBuf>,
        #[arg(short, long, default_value = "data")]
        out_dir: PathBuf,
    },
    /// Scrape FAQ entries and export JSONL
    Faqs {
        #[arg(long, default_value = FAQ_URL)]
        url: String,
        /// Parse saved HTML files instead of fetching
        #[arg(short, long)]
        input: Vec<PathBuf>,
        #[arg(short, long, default_value = "data")]
        out_dir: PathBuf,
    },
    /// Re-export a JSONL/JSON dataset into one format
    Export {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long, value_enum)]
        format: Format,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, value_enum, default_value = "faq")]
        kind: RecordKind,
        #[arg(long, default_value = FAQ_URL)]
        source_url: String,
        /// Character budget per chunk (chunked-text format only)
        #[arg(long, default_value_t = export::DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
    },
    /// Apply the hand-checked FAQ section mapping to a JSONL file
    FixCategories {
        #[arg(short, long)]
        input: PathBuf,
        /// JSON file of { "FQ_1": "Section", ... }; built-in table if absent
        #[arg(long)]
        mapping: Option<PathBuf>,
    },
    /// Embed a JSONL dataset and upsert it into the vector store
    Vectorize {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long, default_value = "premiere_suites_faqs")]
        collection: String,
        #[arg(long, value_enum, default_value = "faq")]
        kind: RecordKind,
        #[arg(long, default_value_t = vector::DEFAULT_BATCH_SIZE)]
        batch_size: usize,
        /// Drop and recreate the collection first
        #[arg(long)]
        recreate: bool,
    },
    /// Semantic search against a collection
    Search {
        query: String,
        #[arg(short, long, default_value = "premiere_suites_faqs")]
        collection: String,
        #[arg(short = 'n', long, default_value = "5")]
        top_k: usize,
        /// Exact-match payload filter on category
        #[arg(long)]
        category: Option<String>,
        /// Exact-match payload filter on city
        #[arg(long)]
        city: Option<String>,
    },
    /// Summarize a JSONL dataset
    Stats {
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RecordKind {
    Property,
    Faq,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Properties { url, input, out_dir } => {
            run_properties(&url, &input, &out_dir).await
        }
        Commands::Faqs { url, input, out_dir } => run_faqs(&url, &input, &out_dir).await,
        Commands::Export {
            input,
            format,
            output,
            kind,
            source_url,
            chunk_size,
        } => run_export(&input, format, &output, kind, &source_url, chunk_size),
        Commands::FixCategories { input, mapping } => {
            run_fix_categories(&input, mapping.as_deref())
        }
        Commands::Vectorize {
            input,
            collection,
            kind,
            batch_size,
            recreate,
        } => run_vectorize(&input, &collection, kind, batch_size, recreate).await,
        Commands::Search {
            query,
            collection,
            top_k,
            category,
            city,
        } => run_search(&query, &collection, top_k, category, city).await,
        Commands::Stats { input } => run_stats(&input),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

/// Read the given files, or fetch the URL when none are given.
async fn gather_pages(input: &[PathBuf], url: &str) -> Result<Vec<String>> {
    if input.is_empty() {
        return Ok(vec![fetch::fetch_page(url).await?]);
    }
    input
        .iter()
        .map(|path| {
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))
        })
        .collect()
}

async fn run_properties(url: &str, input: &[PathBuf], out_dir: &Path) -> Result<()> {
    let pages = gather_pages(input, url).await?;
    let vocab = Vocabulary::default();
    let records = parser::process_property_pages(&pages, &vocab);

    if records.is_empty() {
        println!("No properties found. Check the page structure.");
        return Ok(());
    }

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let outputs = [
        (Format::Json, "premiere_suites_data.json"),
        (Format::Csv, "premiere_suites_data.csv"),
        (Format::Jsonl, "premiere_suites_data.jsonl"),
        (Format::Markdown, "premiere_suites_data.md"),
        (Format::Text, "premiere_suites_data.txt"),
        (Format::ChunkedText, "premiere_suites_chunks.txt"),
        (Format::Pdf, "premiere_suites_data.pdf"),
    ];
    for (format, name) in outputs {
        export::export(&records, format, &out_dir.join(name), url)?;
    }

    let cities: std::collections::BTreeSet<&str> =
        records.iter().map(|p| p.city.as_str()).collect();
    let rated: Vec<f64> = records.iter().filter_map(|p| p.rating).collect();
    let average = if rated.is_empty() {
        0.0
    } else {
        rated.iter().sum::<f64>() / rated.len() as f64
    };

    println!("Scraping completed successfully!");
    println!("Total properties found: {}", records.len());
    println!("Cities covered: {}", cities.len());
    println!("Average rating: {:.2}", average);
    println!("\nFiles generated in {}:", out_dir.display());
    for (_, name) in outputs {
        println!("- {}", name);
    }
    Ok(())
}

async fn run_faqs(url: &str, input: &[PathBuf], out_dir: &Path) -> Result<()> {
    let pages = gather_pages(input, url).await?;
    let vocab = Vocabulary::default();
    let records = parser::process_faq_pages(&pages, url, &vocab);

    if records.is_empty() {
        println!("No FAQs found. Check the page structure.");
        return Ok(());
    }

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let path = out_dir.join("premiere_suites_faq_data.jsonl");
    export::export(&records, Format::Jsonl, &path, url)?;

    let categories: std::collections::BTreeSet<&str> =
        records.iter().map(|f| f.category.as_str()).collect();

    println!("FAQ scraping completed successfully!");
    println!("Total FAQs found: {}", records.len());
    println!("Categories covered: {}", categories.len());
    println!(
        "Categories: {}",
        categories.iter().copied().collect::<Vec<_>>().join(", ")
    );
    println!("\nSample FAQs:");
    for (i, faq) in records.iter().take(3).enumerate() {
        println!("{}. Q: {}", i + 1, truncate(&faq.question, 100));
        println!("   A: {}", truncate(&faq.answer, 100));
        println!("   Category: {}", faq.category);
    }
    println!("\nFile generated: {}", path.display());
    Ok(())
}

fn run_export(
    input: &Path,
    format: Format,
    output: &Path,
    kind: RecordKind,
    source_url: &str,
    chunk_size: usize,
) -> Result<()> {
    match kind {
        RecordKind::Property => {
            let records: Vec<PropertyRecord> = load_records(input)?;
            export_loaded(&records, format, output, source_url, chunk_size)
        }
        RecordKind::Faq => {
            let records: Vec<FaqRecord> = load_records(input)?;
            export_loaded(&records, format, output, source_url, chunk_size)
        }
    }
}

fn load_records<T: Exportable>(input: &Path) -> Result<Vec<T>> {
    let is_json_array = input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json_array {
        ingest::load_json_records(input)
    } else {
        let lines = ingest::load_jsonl(input)?;
        Ok(ingest::typed_records(&lines))
    }
}

fn export_loaded<T: Exportable>(
    records: &[T],
    format: Format,
    output: &Path,
    source_url: &str,
    chunk_size: usize,
) -> Result<()> {
    if records.is_empty() {
        bail!("No {} records found in the input", T::KIND);
    }
    export::export_sized(records, format, output, source_url, chunk_size)?;
    println!(
        "Exported {} {} records to {}",
        records.len(),
        T::KIND,
        output.display()
    );
    Ok(())
}

fn run_fix_categories(input: &Path, mapping_path: Option<&Path>) -> Result<()> {
    let mut lines = ingest::load_jsonl(input)?;
    let mapping = overrides::load_mapping(mapping_path)?;
    let updated = overrides::apply(&mut lines, &mapping);
    ingest::save_jsonl(&lines, input)?;
    println!("FAQ categories updated successfully ({} records).", updated);
    Ok(())
}

async fn run_vectorize(
    input: &Path,
    collection: &str,
    kind: RecordKind,
    batch_size: usize,
    recreate: bool,
) -> Result<()> {
    let lines = ingest::load_jsonl(input)?;
    let kind_name = match kind {
        RecordKind::Property => "property",
        RecordKind::Faq => "faq",
    };
    let records = ingest::filter_records(&lines, kind_name);
    if records.is_empty() {
        bail!("No {} records found in {}", kind_name, input.display());
    }

    let ingested_at = chrono::Local::now().to_rfc3339();
    let prepared: Vec<(u64, Value)> = records
        .iter()
        .enumerate()
        .map(|(i, record)| match kind {
            RecordKind::Property => vector::prepare_property_point(record, i, &ingested_at),
            RecordKind::Faq => vector::prepare_faq_point(record, i, &ingested_at),
        })
        .collect();

    let texts: Vec<String> = prepared
        .iter()
        .map(|(_, payload)| {
            payload
                .get("content")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        })
        .collect();

    println!("Generating embeddings for {} records...", texts.len());
    let embedder = vector::EmbeddingsClient::from_env()?;
    let vectors = embedder.embed(&texts).await?;
    let dim = vectors.first().map(Vec::len).unwrap_or(0);
    if dim == 0 {
        bail!("Embeddings endpoint returned empty vectors");
    }

    let points: Vec<vector::Point> = prepared
        .into_iter()
        .zip(vectors)
        .map(|((id, payload), vector)| vector::Point {
            id,
            vector,
            payload,
        })
        .collect();

    let client = vector::QdrantClient::from_env()?;
    client.ensure_collection(collection, dim, recreate).await?;
    client.upsert(collection, &points, batch_size).await?;

    println!("Vectorization completed successfully!");
    println!("Collection: {}", collection);
    println!("Total vectors: {}", points.len());
    println!("Vector size: {}", dim);
    Ok(())
}

async fn run_search(
    query: &str,
    collection: &str,
    top_k: usize,
    category: Option<String>,
    city: Option<String>,
) -> Result<()> {
    let embedder = vector::EmbeddingsClient::from_env()?;
    let vectors = embedder.embed(&[query.to_string()]).await?;
    let vector = vectors
        .into_iter()
        .next()
        .context("Embeddings endpoint returned nothing")?;

    let filter = category
        .as_deref()
        .map(|c| ("category", c))
        .or(city.as_deref().map(|c| ("city", c)));

    let client = vector::QdrantClient::from_env()?;
    let hits = client.search(collection, &vector, top_k, filter).await?;

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }
    for (i, hit) in hits.iter().enumerate() {
        let title = hit
            .payload
            .get("question")
            .or_else(|| hit.payload.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("(untitled)");
        let content = hit
            .payload
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or("");
        println!("{}. [{:.3}] {}", i + 1, hit.score, title);
        if !content.is_empty() {
            println!("   {}", truncate(content, 120));
        }
    }
    Ok(())
}

fn run_stats(input: &Path) -> Result<()> {
    let lines = ingest::load_jsonl(input)?;
    let count_of = |kind: &str| ingest::filter_records(&lines, kind).len();

    println!("Lines:      {}", lines.len());
    println!("Properties: {}", count_of("property"));
    println!("FAQs:       {}", count_of("faq"));

    if let Some(summary) = ingest::filter_records(&lines, "summary").first() {
        if let Some(categories) = summary.get("categories").and_then(Value::as_array) {
            let names: Vec<&str> = categories.iter().filter_map(Value::as_str).collect();
            println!("Categories: {}", names.join(", "));
        }
        if let Some(cities) = summary.get("cities").and_then(Value::as_array) {
            let names: Vec<&str> = cities.iter().filter_map(Value::as_str).collect();
            println!("Cities:     {}", names.join(", "));
        }
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn faq_fixture_records() -> Vec<FaqRecord> {
        let html = fs::read_to_string("tests/fixtures/faq.html").unwrap();
        parser::process_faq_pages(&[html], FAQ_URL, &Vocabulary::default())
    }

    #[test]
    fn faq_export_reload_round_trip() {
        let records = faq_fixture_records();
        assert!(!records.is_empty());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faqs.jsonl");
        export::export(&records, Format::Jsonl, &path, FAQ_URL).unwrap();

        let lines = ingest::load_jsonl(&path).unwrap();
        let loaded: Vec<FaqRecord> = ingest::typed_records(&lines);
        let before: Vec<(String, String)> = records
            .iter()
            .map(|f| (f.id.clone(), f.category.clone()))
            .collect();
        let after: Vec<(String, String)> = loaded
            .iter()
            .map(|f| (f.id.clone(), f.category.clone()))
            .collect();
        assert_eq!(before, after);

        // The duplicate question (fq_9) never reaches the export.
        assert!(loaded.iter().all(|f| f.id != "FQ_9"));
        for line in ingest::filter_records(&lines, "faq") {
            assert!(!line["text_chunk"].as_str().unwrap().is_empty());
        }
    }

    #[test]
    fn fix_categories_rewrites_exported_file() {
        let records = faq_fixture_records();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faqs.jsonl");
        export::export(&records, Format::Jsonl, &path, FAQ_URL).unwrap();

        run_fix_categories(&path, None).unwrap();

        let lines = ingest::load_jsonl(&path).unwrap();
        let booking = ingest::filter_records(&lines, "faq")
            .into_iter()
            .find(|f| f["id"] == "FQ_4")
            .unwrap();
        assert_eq!(booking["category"], "Reservations");
        assert!(booking["text_chunk"]
            .as_str()
            .unwrap()
            .contains("Category: Reservations"));
    }

    #[test]
    fn property_pipeline_writes_every_format() {
        let html = fs::read_to_string("tests/fixtures/find_your_match.html").unwrap();
        let records =
            parser::process_property_pages(&[html], &Vocabulary::default());
        assert_eq!(records.len(), 3);

        let dir = tempfile::tempdir().unwrap();
        let formats = [
            (Format::Json, "data.json"),
            (Format::Jsonl, "data.jsonl"),
            (Format::Csv, "data.csv"),
            (Format::Markdown, "data.md"),
            (Format::Text, "data.txt"),
            (Format::ChunkedText, "chunks.txt"),
            (Format::Pdf, "data.pdf"),
        ];
        for (format, name) in formats {
            let path = dir.path().join(name);
            export::export(&records, format, &path, PROPERTIES_URL).unwrap();
            assert!(fs::metadata(&path).unwrap().len() > 0, "{name} is empty");
        }
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer sentence", 8), "a longer...");
    }
}
