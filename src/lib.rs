//! # Distrito
//!
//! Ingestion and query engine for a searchable, filterable catalog of
//! administrative districts.
//!
//! The hard part of the catalog is not drawing markers on a map — that is a
//! commodity rendering layer — but getting trustworthy data under them:
//! reconciling heterogeneous sources into one canonical record shape,
//! validating geographic plausibility, ranking free-text search, and keeping
//! the filter state consistent between a URL, the widgets and the rendered
//! results. This crate is that core; presentation consumes plain data from
//! it.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌─────────────┐   ┌───────────────┐
//! │ Provider chain   │──▶│  Normalize   │──▶│    Catalog     │
//! │ query API / CSV  │   │ + geo gate  │   │ records+index │
//! └──────────────────┘   └─────────────┘   └──────┬────────┘
//!                                                 │
//!                              ┌──────────────────┤
//!                              ▼                  ▼
//!                        ┌──────────┐       ┌──────────┐
//!                        │ filtered │       │ ranked   │
//!                        │   view   │       │ search   │
//!                        └──────────┘       └──────────┘
//! ```
//!
//! Providers are tried strictly in priority order; whichever yields a
//! non-empty validated record set supplies the whole working set. The set
//! and everything derived from it are replaced atomically and wholesale —
//! never patched in place.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`numeric`] | Locale-tolerant number parsing |
//! | [`geo`] | Bounding-box gate and natural regions |
//! | [`schema`] | Column aliasing and row normalization |
//! | [`resolver`] | Provider trait and the resolution chain |
//! | [`provider_api`] | Structured-query backend provider |
//! | [`provider_csv`] | Local/remote tabular file provider |
//! | [`search`] | Normalized index and additive ranking |
//! | [`filter`] | Filter state, derivation, serialization |
//! | [`catalog`] | Owner of records, index and filtered view |
//! | [`boundary`] | Region-outline overlay with topology decode |

pub mod boundary;
pub mod catalog;
pub mod config;
pub mod fetch;
pub mod filter;
pub mod geo;
pub mod models;
pub mod numeric;
pub mod provider_api;
pub mod provider_csv;
pub mod resolver;
pub mod schema;
pub mod search;
pub mod sources;
pub mod summary;
pub mod text;
