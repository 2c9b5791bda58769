//! Tabular file provider (delimited text), local and remote variants.
//!
//! Occupies the second and third chain positions: a path on disk and an
//! absolute URL to the same kind of file. Rows are parsed with a
//! header-driven column mapping; header lookup happens later in the
//! normalizer, which is case- and whitespace-insensitive, so exports with
//! renamed or re-cased headers still load.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;

use crate::fetch;
use crate::models::RawRow;
use crate::resolver::Provider;

pub struct TableProvider {
    name: &'static str,
    location: String,
}

impl TableProvider {
    /// Tabular file on the local filesystem.
    pub fn local(path: PathBuf) -> Self {
        Self {
            name: "local_table",
            location: path.display().to_string(),
        }
    }

    /// Tabular file behind an absolute URL.
    pub fn remote(url: String) -> Self {
        Self {
            name: "remote_table",
            location: url,
        }
    }
}

#[async_trait]
impl Provider for TableProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn describe(&self) -> String {
        self.location.clone()
    }

    async fn fetch_rows(&self) -> Result<Vec<RawRow>> {
        let text = fetch::read_text(&self.location).await?;
        parse_rows(&text).with_context(|| format!("Failed to parse table at {}", self.location))
    }
}

/// Parse delimited text into raw rows keyed by the header line.
///
/// Empty lines are skipped; short rows are tolerated (missing cells simply
/// leave their columns unresolved).
fn parse_rows(text: &str) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), Value::String(v.to_string())))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}
