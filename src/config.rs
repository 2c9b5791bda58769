use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub boundaries: BoundariesConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// The provider chain. Priority order is fixed: structured-query backend,
/// then local tabular file, then remote tabular file. Each section is
/// optional; unconfigured providers are skipped.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProvidersConfig {
    pub query_api: Option<QueryApiConfig>,
    pub local_table: Option<LocalTableConfig>,
    pub remote_table: Option<RemoteTableConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct QueryApiConfig {
    /// Base URL of the backend (e.g. `https://project.example.co`).
    pub url: String,
    /// API key, sent as both `apikey` and bearer token.
    pub key: String,
    /// Table to select from.
    pub table: String,
    /// Columns to request. Empty means the standard column set.
    #[serde(default)]
    pub columns: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LocalTableConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RemoteTableConfig {
    /// Absolute URL of the delimited-text file.
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BoundariesConfig {
    /// Primary overlay location (path or absolute URL). Either a topology
    /// payload needing a decode step or plain geometry used as-is.
    #[serde(default = "default_boundary_primary")]
    pub primary: String,
    /// Fallback location tried when the primary fails.
    #[serde(default = "default_boundary_fallback")]
    pub fallback: String,
}

impl Default for BoundariesConfig {
    fn default() -> Self {
        Self {
            primary: default_boundary_primary(),
            fallback: default_boundary_fallback(),
        }
    }
}

fn default_boundary_primary() -> String {
    "data/provincias.json".to_string()
}
fn default_boundary_fallback() -> String {
    "data/provincias.geojson".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Maximum ranked suggestions returned by default.
    #[serde(default = "default_suggest_limit")]
    pub suggest_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            suggest_limit: default_suggest_limit(),
        }
    }
}

fn default_suggest_limit() -> usize {
    8
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate providers
    let p = &config.providers;
    if p.query_api.is_none() && p.local_table.is_none() && p.remote_table.is_none() {
        anyhow::bail!(
            "No providers configured. Set at least one of [providers.query_api], \
             [providers.local_table], [providers.remote_table]."
        );
    }

    if let Some(api) = &p.query_api {
        if api.url.trim().is_empty() || api.key.trim().is_empty() || api.table.trim().is_empty() {
            anyhow::bail!("providers.query_api requires url, key and table");
        }
    }
    if let Some(remote) = &p.remote_table {
        if !remote.url.starts_with("http://") && !remote.url.starts_with("https://") {
            anyhow::bail!(
                "providers.remote_table.url must be an absolute http(s) URL, got '{}'",
                remote.url
            );
        }
    }

    // Validate search
    if config.search.suggest_limit < 1 {
        anyhow::bail!("search.suggest_limit must be >= 1");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_parses_with_defaults() {
        let config: Config = toml::from_str(
            r#"
            [providers.local_table]
            path = "data/distritos.csv"
            "#,
        )
        .unwrap();
        assert!(config.providers.query_api.is_none());
        assert_eq!(config.search.suggest_limit, 8);
        assert_eq!(config.boundaries.primary, "data/provincias.json");
        assert_eq!(config.boundaries.fallback, "data/provincias.geojson");
    }

    #[test]
    fn test_query_api_section_parses() {
        let config: Config = toml::from_str(
            r#"
            [providers.query_api]
            url = "https://project.example.co"
            key = "anon-key"
            table = "distritos"
            "#,
        )
        .unwrap();
        let api = config.providers.query_api.unwrap();
        assert_eq!(api.table, "distritos");
        assert!(api.columns.is_empty());
    }
}
