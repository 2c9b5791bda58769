//! Source resolution: the provider chain.
//!
//! Providers are tried strictly in priority order — structured-query
//! backend, local tabular file, remote tabular file — and each attempt runs
//! to completion before the next begins. A provider "succeeds" only if at
//! least one of its rows survives normalization and geo validation; an
//! empty or failing provider advances the chain with a warning at the
//! boundary. Only total exhaustion is fatal, and it is the single
//! ingestion error a caller ever sees.

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::models::{RawRow, Record};
use crate::provider_api::QueryApiProvider;
use crate::provider_csv::TableProvider;
use crate::schema;

/// A data source in the resolution chain.
///
/// Implementations fetch and parse rows from one source; they do not
/// normalize. Normalization and geo validation run uniformly in
/// [`attempt`], so every provider is held to the same acceptance gate.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Chain-position name (e.g. `"query_api"`, `"local_table"`).
    fn name(&self) -> &str;

    /// One-line description of where this provider reads from.
    fn describe(&self) -> String;

    /// Fetch all raw rows. One suspension point per attempt; the chain
    /// awaits providers in sequence, never concurrently.
    async fn fetch_rows(&self) -> Result<Vec<RawRow>>;
}

/// The record set a successful provider produced, with aggregate counts.
pub struct Resolution {
    /// Name of the provider that won the chain.
    pub provider: String,
    /// Normalized, geo-validated records.
    pub records: Vec<Record>,
    /// Raw rows the provider returned before validation.
    pub raw_rows: usize,
    /// Rows dropped by normalization or the geo gate.
    pub rejected: usize,
}

/// Outcome of one provider attempt.
pub enum FetchOutcome {
    /// At least one row survived validation.
    Loaded(Resolution),
    /// The provider answered, but nothing survived (or it had no rows).
    Empty { raw_rows: usize },
    /// The provider itself failed: network error, malformed payload,
    /// schema mismatch.
    Failed(anyhow::Error),
}

/// The single fatal ingestion error.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no data available: every provider in the chain failed or returned no usable rows")]
    Exhausted,
}

/// Run one provider and classify the result.
pub async fn attempt(provider: &dyn Provider) -> FetchOutcome {
    let rows = match provider.fetch_rows().await {
        Ok(rows) => rows,
        Err(e) => return FetchOutcome::Failed(e),
    };
    let raw_rows = rows.len();
    let records: Vec<Record> = rows.iter().filter_map(schema::normalize).collect();
    if records.is_empty() {
        return FetchOutcome::Empty { raw_rows };
    }
    let rejected = raw_rows - records.len();
    FetchOutcome::Loaded(Resolution {
        provider: provider.name().to_string(),
        records,
        raw_rows,
        rejected,
    })
}

/// Fold over the chain, short-circuiting on the first loaded outcome.
///
/// Per-provider failures are logged at this boundary and swallowed; no
/// merging happens across providers — whichever succeeds first supplies the
/// whole working set.
pub async fn resolve(chain: &[Box<dyn Provider>]) -> Result<Resolution, ResolveError> {
    for provider in chain {
        match attempt(provider.as_ref()).await {
            FetchOutcome::Loaded(resolution) => return Ok(resolution),
            FetchOutcome::Empty { raw_rows } => {
                eprintln!(
                    "Warning: provider {} returned no usable rows ({} raw), trying next",
                    provider.name(),
                    raw_rows
                );
            }
            FetchOutcome::Failed(e) => {
                eprintln!("Warning: provider {} failed: {:#}", provider.name(), e);
            }
        }
    }
    Err(ResolveError::Exhausted)
}

/// Build the provider chain from config, in fixed priority order,
/// skipping unconfigured entries.
pub fn build_chain(config: &Config) -> Vec<Box<dyn Provider>> {
    let mut chain: Vec<Box<dyn Provider>> = Vec::new();
    if let Some(cfg) = &config.providers.query_api {
        chain.push(Box::new(QueryApiProvider::new(cfg.clone())));
    }
    if let Some(cfg) = &config.providers.local_table {
        chain.push(Box::new(TableProvider::local(cfg.path.clone())));
    }
    if let Some(cfg) = &config.providers.remote_table {
        chain.push(Box::new(TableProvider::remote(cfg.url.clone())));
    }
    chain
}

/// Resolve the configured chain and print a load summary.
pub async fn run_load(config: &Config) -> Result<()> {
    let chain = build_chain(config);
    let resolution = resolve(&chain).await?;

    let provider = resolution.provider.clone();
    let (raw_rows, rejected) = (resolution.raw_rows, resolution.rejected);
    let catalog = Catalog::new(resolution.records);

    println!("load");
    println!("  provider: {}", provider);
    println!("  raw rows: {}", raw_rows);
    println!("  rejected: {}", rejected);
    println!("  records: {}", catalog.records().len());
    if let Some((lat, lng)) = catalog.center() {
        println!("  center: {:.4}, {:.4}", lat, lng);
    }
    println!("ok");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn valid_row(code: &str, lat: &str, lng: &str) -> RawRow {
        [
            ("COD_DISTRI", code),
            ("NOM_DISTRI", "TEST"),
            ("Latitud", lat),
            ("Longitud", lng),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
    }

    struct StaticProvider {
        name: &'static str,
        rows: Vec<RawRow>,
        calls: Arc<AtomicUsize>,
    }

    impl StaticProvider {
        fn new(name: &'static str, rows: Vec<RawRow>) -> Self {
            Self {
                name,
                rows,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl Provider for StaticProvider {
        fn name(&self) -> &str {
            self.name
        }
        fn describe(&self) -> String {
            format!("static provider '{}'", self.name)
        }
        async fn fetch_rows(&self) -> Result<Vec<RawRow>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl Provider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }
        fn describe(&self) -> String {
            "always fails".to_string()
        }
        async fn fetch_rows(&self) -> Result<Vec<RawRow>> {
            anyhow::bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn test_first_nonempty_provider_wins_and_later_ones_are_not_tried() {
        let empty = StaticProvider::new("a", vec![]);
        let good = StaticProvider::new("b", vec![valid_row("17D01", "-0.18", "-78.46")]);
        let untouched = StaticProvider::new("c", vec![valid_row("17D02", "-0.20", "-78.50")]);
        let untouched_calls = untouched.calls.clone();

        let chain: Vec<Box<dyn Provider>> =
            vec![Box::new(empty), Box::new(good), Box::new(untouched)];
        let resolution = resolve(&chain).await.expect("chain should resolve");

        assert_eq!(resolution.provider, "b");
        assert_eq!(resolution.records.len(), 1);
        assert_eq!(untouched_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failing_provider_advances_the_chain() {
        let good = StaticProvider::new("fallback", vec![valid_row("09D04", "-2.17", "-79.92")]);
        let chain: Vec<Box<dyn Provider>> = vec![Box::new(FailingProvider), Box::new(good)];

        let resolution = resolve(&chain).await.unwrap();
        assert_eq!(resolution.provider, "fallback");
    }

    #[tokio::test]
    async fn test_exhausted_chain_is_the_single_fatal_error() {
        let empty = StaticProvider::new("a", vec![]);
        let chain: Vec<Box<dyn Provider>> = vec![Box::new(FailingProvider), Box::new(empty)];

        let err = resolve(&chain).await.err().expect("chain must fail");
        assert!(matches!(err, ResolveError::Exhausted));
    }

    #[tokio::test]
    async fn test_rejected_rows_are_counted_not_fatal() {
        let mixed = StaticProvider::new(
            "mixed",
            vec![
                valid_row("17D01", "-0.18", "-78.46"),
                valid_row("bad-coords", "n/a", "-78.46"),
                valid_row("out-of-bounds", "10.0", "-78.46"),
            ],
        );
        let chain: Vec<Box<dyn Provider>> = vec![Box::new(mixed)];

        let resolution = resolve(&chain).await.unwrap();
        assert_eq!(resolution.raw_rows, 3);
        assert_eq!(resolution.rejected, 2);
        assert_eq!(resolution.records.len(), 1);
        assert!(resolution
            .records
            .iter()
            .all(|r| crate::geo::in_bounds(r.lat, r.lng)));
    }

    #[tokio::test]
    async fn test_provider_with_only_invalid_rows_counts_as_empty() {
        let invalid = StaticProvider::new("invalid", vec![valid_row("x", "99", "99")]);
        let good = StaticProvider::new("good", vec![valid_row("17D01", "-0.18", "-78.46")]);
        let chain: Vec<Box<dyn Provider>> = vec![Box::new(invalid), Box::new(good)];

        let resolution = resolve(&chain).await.unwrap();
        assert_eq!(resolution.provider, "good");
    }
}
