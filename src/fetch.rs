//! Shared text transport for file-or-URL locations.
//!
//! Tabular providers and the boundary overlay both accept either a local
//! path or an absolute http(s) URL; the one helper here keeps that
//! distinction out of their parsing code. No timeout is imposed on remote
//! fetches: a hung location stalls the caller, matching the load cycle's
//! run-to-completion contract.

use anyhow::{bail, Context, Result};

/// Whether a location string names a remote resource.
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Read a location (local path or absolute URL) to a string.
pub async fn read_text(location: &str) -> Result<String> {
    if is_remote(location) {
        let resp = reqwest::get(location)
            .await
            .with_context(|| format!("Failed to fetch {}", location))?;
        if !resp.status().is_success() {
            bail!("Fetch of {} failed (HTTP {})", location, resp.status());
        }
        Ok(resp.text().await?)
    } else {
        tokio::fs::read_to_string(location)
            .await
            .with_context(|| format!("Failed to read {}", location))
    }
}
