//! Structured-query backend provider.
//!
//! First in the resolution chain when configured. Speaks a PostgREST-style
//! API: one GET of a named table with an explicit column list, authenticated
//! by an API key sent as both `apikey` header and bearer token. The response
//! is a JSON array of row objects; values keep their wire types (numbers
//! stay numbers) and the normalizer sorts them out.
//!
//! # Configuration
//!
//! ```toml
//! [providers.query_api]
//! url = "https://project.example.co"
//! key = "anon-key"
//! table = "distritos"
//! # columns = ["COD_DISTRI", "NOM_DISTRI", ...]   # optional override
//! ```

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::config::QueryApiConfig;
use crate::models::RawRow;
use crate::resolver::Provider;

/// Columns requested when the config does not override them. The tabular
/// sources carry two extra projected-coordinate columns (X, Y) that this
/// backend does not expose.
const DEFAULT_COLUMNS: &[&str] = &[
    "COD_DISTRI",
    "NOM_DISTRI",
    "DIRECCION",
    "DPA_PARROQ",
    "DPA_DESPAR",
    "DPA_CANTON",
    "DPA_DESCAN",
    "DPA_PROVIN",
    "DPA_DESPRO",
    "ZONA",
    "NMT_25",
    "COMPLEMENT",
    "Capital_Pr",
    "Latitud",
    "Longitud",
];

pub struct QueryApiProvider {
    config: QueryApiConfig,
    client: reqwest::Client,
}

impl QueryApiProvider {
    pub fn new(config: QueryApiConfig) -> Self {
        // No request timeout on purpose: a resolution attempt runs to
        // completion or failure before the next provider is tried.
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn select_list(&self) -> String {
        if self.config.columns.is_empty() {
            DEFAULT_COLUMNS.join(",")
        } else {
            self.config.columns.join(",")
        }
    }
}

#[async_trait]
impl Provider for QueryApiProvider {
    fn name(&self) -> &str {
        "query_api"
    }

    fn describe(&self) -> String {
        format!("{} table {}", self.config.url, self.config.table)
    }

    async fn fetch_rows(&self) -> Result<Vec<RawRow>> {
        let url = format!(
            "{}/rest/v1/{}",
            self.config.url.trim_end_matches('/'),
            self.config.table
        );

        let resp = self
            .client
            .get(&url)
            .query(&[("select", self.select_list())])
            .header("apikey", &self.config.key)
            .header("Authorization", format!("Bearer {}", self.config.key))
            .send()
            .await
            .with_context(|| format!("Query API request to {} failed", url))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            bail!(
                "Query API select failed (HTTP {}): {}",
                status,
                body.chars().take(500).collect::<String>()
            );
        }

        let rows: Vec<Value> = resp
            .json()
            .await
            .context("Query API returned a malformed payload")?;

        rows.into_iter()
            .map(|row| match row {
                Value::Object(map) => Ok(map.into_iter().collect::<RawRow>()),
                other => bail!("Query API row is not an object: {}", other),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_select_list_has_no_projected_columns() {
        let provider = QueryApiProvider::new(QueryApiConfig {
            url: "https://project.example.co".to_string(),
            key: "k".to_string(),
            table: "distritos".to_string(),
            columns: vec![],
        });
        let select = provider.select_list();
        assert!(select.contains("COD_DISTRI"));
        assert!(select.contains("Latitud"));
        assert!(!select.contains(",X,"));
    }

    #[test]
    fn test_configured_columns_override_default() {
        let provider = QueryApiProvider::new(QueryApiConfig {
            url: "https://project.example.co".to_string(),
            key: "k".to_string(),
            table: "distritos".to_string(),
            columns: vec!["COD_DISTRI".to_string(), "Latitud".to_string()],
        });
        assert_eq!(provider.select_list(), "COD_DISTRI,Latitud");
    }
}
