use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::ValueEnum;
use serde_json::{json, Value};
use tracing::info;

use crate::model::Exportable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Jsonl,
    Csv,
    Markdown,
    Text,
    ChunkedText,
    Pdf,
}

pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Serialize a record set into one output file. I/O failures propagate;
/// individual record problems render as empty text and never abort the
/// batch.
pub fn export<T: Exportable>(
    records: &[T],
    format: Format,
    path: &Path,
    source_url: &str,
) -> Result<()> {
    export_sized(records, format, path, source_url, DEFAULT_CHUNK_SIZE)
}

/// Like [`export`], with an explicit chunk budget for the chunked-text
/// format. The budget is ignored by every other format.
pub fn export_sized<T: Exportable>(
    records: &[T],
    format: Format,
    path: &Path,
    source_url: &str,
    chunk_size: usize,
) -> Result<()> {
    match format {
        Format::Json => write_json(records, path),
        Format::Jsonl => write_jsonl(records, path, source_url),
        Format::Csv => write_csv(records, path),
        Format::Markdown => write_markdown(records, path, source_url),
        Format::Text => write_text(records, path, source_url),
        Format::ChunkedText => write_chunked_text(records, path, chunk_size),
        Format::Pdf => write_pdf(records, path, source_url),
    }?;
    info!("Wrote {} ({} records)", path.display(), records.len());
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

// ── JSON / JSONL ──

fn write_json<T: Exportable>(records: &[T], path: &Path) -> Result<()> {
    let mut w = create(path)?;
    let body = serde_json::to_string_pretty(records)?;
    w.write_all(body.as_bytes())?;
    w.flush()?;
    Ok(())
}

fn write_jsonl<T: Exportable>(records: &[T], path: &Path, source_url: &str) -> Result<()> {
    let mut w = create(path)?;
    let generated_on = Local::now().to_rfc3339();
    writeln!(
        w,
        "{}",
        T::metadata_line(records.len(), source_url, &generated_on)
    )?;
    writeln!(w, "{}", T::summary_line(records))?;
    for (i, record) in records.iter().enumerate() {
        writeln!(w, "{}", record_line(record, i + 1))?;
    }
    w.flush()?;
    Ok(())
}

/// One JSONL record line: the serialized record plus the `type`
/// discriminator and a guaranteed non-empty `text_chunk`.
pub fn record_line<T: Exportable>(record: &T, index: usize) -> Value {
    let mut value = serde_json::to_value(record).unwrap_or_else(|_| json!({}));
    let chunk = record.text_chunk(index);
    let chunk = if chunk.trim().is_empty() {
        record.chunk_fallback()
    } else {
        chunk
    };
    if let Some(map) = value.as_object_mut() {
        map.insert("type".to_string(), json!(T::KIND));
        map.insert("text_chunk".to_string(), json!(chunk));
    }
    value
}

// ── CSV ──

fn write_csv<T: Exportable>(records: &[T], path: &Path) -> Result<()> {
    let mut w = create(path)?;
    writeln!(w, "{}", T::csv_header().join(","))?;
    for record in records {
        let row: Vec<String> = record.csv_row().iter().map(|f| csv_field(f)).collect();
        writeln!(w, "{}", row.join(","))?;
    }
    w.flush()?;
    Ok(())
}

/// Quote a field when it contains a comma, quote, or newline.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

// ── Reports (Markdown / plain text / PDF) ──

/// Summary stats rendered as labeled pairs, from the JSONL summary line.
fn summary_pairs<T: Exportable>(records: &[T]) -> Vec<(String, String)> {
    let Value::Object(map) = T::summary_line(records) else {
        return Vec::new();
    };
    map.iter()
        .filter(|(key, _)| key.as_str() != "type")
        .map(|(key, value)| (field_label(key), render_value(value)))
        .collect()
}

fn field_label(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn write_markdown<T: Exportable>(records: &[T], path: &Path, source_url: &str) -> Result<()> {
    let mut w = create(path)?;
    writeln!(w, "# {}\n", T::TITLE)?;
    writeln!(
        w,
        "Generated on: {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(w, "Total Records: {}\n", records.len())?;
    writeln!(w, "Source: {}\n", source_url)?;

    writeln!(w, "## Summary Statistics\n")?;
    for (label, value) in summary_pairs(records) {
        writeln!(w, "- **{}:** {}", label, value)?;
    }
    writeln!(w)?;

    writeln!(w, "## {}\n", T::SECTION)?;
    for (i, record) in records.iter().enumerate() {
        writeln!(w, "### {}\n", record.report_title(i + 1))?;
        for (label, value) in record.report_fields() {
            writeln!(w, "**{}:** {}\n", label, value)?;
        }
        writeln!(w, "---\n")?;
    }
    w.flush()?;
    Ok(())
}

fn write_text<T: Exportable>(records: &[T], path: &Path, source_url: &str) -> Result<()> {
    let mut w = create(path)?;
    writeln!(w, "{}", T::TITLE.to_uppercase())?;
    writeln!(w, "{}\n", "=".repeat(50))?;
    writeln!(
        w,
        "Generated on: {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(w, "Total Records: {}", records.len())?;
    writeln!(w, "Source: {}\n", source_url)?;

    writeln!(w, "SUMMARY STATISTICS:")?;
    for (label, value) in summary_pairs(records) {
        writeln!(w, "{}: {}", label, value)?;
    }
    writeln!(w)?;

    writeln!(w, "{}:", T::SECTION.to_uppercase())?;
    writeln!(w, "{}\n", "=".repeat(50))?;
    for (i, record) in records.iter().enumerate() {
        writeln!(w, "{}", record.report_title(i + 1))?;
        for (label, value) in record.report_fields() {
            writeln!(w, "   {}: {}", label, value)?;
        }
        writeln!(w, "\n{}\n", "-".repeat(30))?;
    }
    w.flush()?;
    Ok(())
}

// ── Chunked text ──

/// Greedy packing: a new chunk starts when the next block would overflow
/// the budget; a single block is never split, even when it alone exceeds
/// the budget.
pub fn pack_chunks(blocks: &[String], chunk_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    for block in blocks {
        if !current.is_empty() && current.len() + block.len() > chunk_size {
            chunks.push(std::mem::take(&mut current));
        }
        if current.is_empty() {
            current.clone_from(block);
        } else {
            current.push_str("\n\n");
            current.push_str(block);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn write_chunked_text<T: Exportable>(
    records: &[T],
    path: &Path,
    chunk_size: usize,
) -> Result<()> {
    let mut w = create(path)?;
    writeln!(w, "# {} - Chunked for Vector Embedding", T::TITLE)?;
    writeln!(w, "# Generated: {}", Local::now().to_rfc3339())?;
    writeln!(w, "# Total Records: {}", records.len())?;
    writeln!(w, "# Chunk Size: {} characters\n", chunk_size)?;

    let blocks: Vec<String> = records
        .iter()
        .enumerate()
        .map(|(i, r)| r.text_chunk(i + 1))
        .collect();
    for (n, chunk) in pack_chunks(&blocks, chunk_size).iter().enumerate() {
        writeln!(w, "--- CHUNK {} ---", n + 1)?;
        writeln!(w, "{}\n", chunk.trim())?;
    }
    w.flush()?;
    Ok(())
}

// ── PDF ──

fn write_pdf<T: Exportable>(records: &[T], path: &Path, source_url: &str) -> Result<()> {
    use printpdf::{BuiltinFont, Mm, PdfDocument};

    const PAGE_W: f32 = 210.0;
    const PAGE_H: f32 = 297.0;
    const MARGIN: f32 = 18.0;
    const LINE_H: f32 = 5.5;
    const WRAP_COLS: usize = 95;

    let (doc, first_page, first_layer) = PdfDocument::new(T::TITLE, Mm(PAGE_W), Mm(PAGE_H), "report");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .context("Failed to load built-in font")?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .context("Failed to load built-in font")?;

    // Flatten the report into (text, bold, size) lines, then paginate.
    let mut lines: Vec<(String, bool, f32)> = vec![
        (T::TITLE.to_string(), true, 16.0),
        (String::new(), false, 10.0),
        (
            format!("Generated on: {}", Local::now().format("%Y-%m-%d %H:%M:%S")),
            false,
            10.0,
        ),
        (format!("Total Records: {}", records.len()), false, 10.0),
        (format!("Source: {}", source_url), false, 10.0),
        (String::new(), false, 10.0),
        ("Summary Statistics".to_string(), true, 12.0),
    ];
    for (label, value) in summary_pairs(records) {
        for wrapped in wrap_line(&format!("{}: {}", label, value), WRAP_COLS) {
            lines.push((wrapped, false, 10.0));
        }
    }
    lines.push((String::new(), false, 10.0));

    for (i, record) in records.iter().enumerate() {
        lines.push((record.report_title(i + 1), true, 12.0));
        for (label, value) in record.report_fields() {
            for wrapped in wrap_line(&format!("{}: {}", label, value), WRAP_COLS) {
                lines.push((wrapped, false, 9.0));
            }
        }
        lines.push((String::new(), false, 9.0));
    }

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut y = PAGE_H - MARGIN;
    for (text, is_bold, size) in lines {
        if y < MARGIN {
            let (page, new_layer) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "report");
            layer = doc.get_page(page).get_layer(new_layer);
            y = PAGE_H - MARGIN;
        }
        if !text.is_empty() {
            let font = if is_bold { &bold } else { &regular };
            layer.use_text(text, size, Mm(MARGIN), Mm(y), font);
        }
        y -= LINE_H;
    }

    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    doc.save(&mut BufWriter::new(file))
        .context("Failed to write PDF")?;
    Ok(())
}

/// Word wrap by character count; good enough for a fixed-pitch report.
fn wrap_line(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + word.len() + 1 > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

// ── Tests ──
