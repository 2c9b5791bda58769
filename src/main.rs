//! # District Catalog CLI (`dcat`)
//!
//! The `dcat` binary drives the catalog core from the command line: it
//! resolves the provider chain, searches and filters the loaded record set,
//! and inspects the boundary overlay.
//!
//! ## Usage
//!
//! ```bash
//! dcat --config ./config/distritos.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dcat load` | Resolve the provider chain and report the record set |
//! | `dcat sources` | List configured providers in priority order |
//! | `dcat search "<query>"` | Ranked suggestions over the loaded set |
//! | `dcat filter` | Apply a filter state and print matching records |
//! | `dcat summary` | Category/province/region breakdowns |
//! | `dcat boundaries` | Load the region-outline overlay (with fallback) |
//!
//! ## Examples
//!
//! ```bash
//! # Which provider actually supplied the data?
//! dcat load
//!
//! # Top suggestions, accent-insensitive
//! dcat search "santo domingo" --limit 5
//!
//! # Filters as flags...
//! dcat filter --province Pichincha --category MINEDUC
//!
//! # ...or replayed from a shared URL query string
//! dcat filter --state "q=santo%20domingo&cats=MINEDUC|SIN%20ETIQUETA"
//! ```

mod boundary;
mod catalog;
mod config;
mod fetch;
mod filter;
mod geo;
mod models;
mod numeric;
mod provider_api;
mod provider_csv;
mod resolver;
mod schema;
mod search;
mod sources;
mod summary;
mod text;

use clap::{Parser, Subcommand};
use filter::FilterState;
use std::path::PathBuf;

/// District catalog CLI — resolve, search and filter the district record
/// set from the command line.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/distritos.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "dcat",
    about = "District catalog — source resolution, search and filtering over district records",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/distritos.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Resolve the provider chain and report the loaded record set.
    ///
    /// Providers are tried strictly in order (query API, local table,
    /// remote table); the first that yields validated records wins. Exits
    /// non-zero only when every provider fails or comes back empty.
    Load,

    /// List providers in priority order and their configuration status.
    Sources,

    /// Ranked suggestions for a query.
    ///
    /// Matching is accent- and case-insensitive over district code, name,
    /// province and canton.
    Search {
        /// The query text.
        query: String,

        /// Maximum suggestions to print (defaults to `search.suggest_limit`).
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Apply a filter state and print the matching records.
    ///
    /// Constraints combine with AND. The resulting state is also printed in
    /// its query-string form, suitable for sharing.
    Filter {
        /// Free-text query (substring, accent-insensitive).
        #[arg(long)]
        query: Option<String>,

        /// Top-level region, exact match.
        #[arg(long)]
        province: Option<String>,

        /// Second-level region, exact match.
        #[arg(long)]
        canton: Option<String>,

        /// Category label; repeat to select several.
        #[arg(long = "category")]
        categories: Vec<String>,

        /// A serialized filter state (`q=..&prov=..&canton=..&cats=a|b`).
        /// Flags above override the corresponding fields.
        #[arg(long)]
        state: Option<String>,
    },

    /// Category, province and natural-region breakdowns of the loaded set.
    Summary,

    /// Load the region-outline overlay, decoding a topology payload if
    /// needed and falling back to the secondary location.
    Boundaries,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Load => {
            resolver::run_load(&cfg).await?;
        }
        Commands::Sources => {
            sources::list_providers(&cfg)?;
        }
        Commands::Search { query, limit } => {
            search::run_search(&cfg, &query, limit).await?;
        }
        Commands::Filter {
            query,
            province,
            canton,
            categories,
            state,
        } => {
            let mut filter_state = state
                .as_deref()
                .map(FilterState::from_query_string)
                .unwrap_or_default();
            if let Some(q) = query {
                filter_state.query = q;
            }
            if province.is_some() {
                filter_state.province = province;
            }
            if canton.is_some() {
                filter_state.canton = canton;
            }
            for label in &categories {
                filter_state.select_category(label);
            }
            filter::run_filter(&cfg, filter_state).await?;
        }
        Commands::Summary => {
            summary::run_summary(&cfg).await?;
        }
        Commands::Boundaries => {
            boundary::run_boundaries(&cfg.boundaries).await?;
        }
    }

    Ok(())
}
