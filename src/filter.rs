//! Filter state: the active query/region/category selection.
//!
//! The state is mutated by user actions and re-serialized after every
//! mutation into a flat string-keyed form that can ride in a URL query
//! string or any other persisted-string carrier. Deriving the filtered view
//! is a total function: arbitrary query text never fails, it just matches
//! nothing.
//!
//! Recognized keys, absent key = unset:
//!
//! | Key | Meaning |
//! |-----|---------|
//! | `q` | free-text query |
//! | `prov` | selected top-level region |
//! | `canton` | selected second-level region |
//! | `cats` | `\|`-joined category labels, order preserved |

use anyhow::Result;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::models::Record;
use crate::resolver;
use crate::text::fold;

/// Delimiter joining the serialized category list.
pub const CATEGORY_DELIMITER: char = '|';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Free-text query; empty means unset.
    pub query: String,
    /// Selected top-level region, exact match.
    pub province: Option<String>,
    /// Selected second-level region, exact match. Meaningful in combination
    /// with a matching province; an unmatched selection is permitted and
    /// simply filters against an irrelevant set.
    pub canton: Option<String>,
    /// Selected category labels. Membership test for filtering; order kept
    /// for serialization. No duplicates.
    pub categories: Vec<String>,
}

impl FilterState {
    /// Whether every field is unset.
    pub fn is_default(&self) -> bool {
        self.query.is_empty()
            && self.province.is_none()
            && self.canton.is_none()
            && self.categories.is_empty()
    }

    /// Add a category unless already selected.
    pub fn select_category(&mut self, label: &str) {
        if !self.categories.iter().any(|c| c == label) {
            self.categories.push(label.to_string());
        }
    }

    /// Remove a category if selected.
    pub fn deselect_category(&mut self, label: &str) {
        self.categories.retain(|c| c != label);
    }

    /// AND of all active constraints against one record.
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(p) = &self.province {
            if record.province != *p {
                return false;
            }
        }
        if let Some(c) = &self.canton {
            if record.canton != *c {
                return false;
            }
        }
        if !self.categories.is_empty() && !self.categories.iter().any(|c| *c == record.category) {
            return false;
        }
        let q = fold(&self.query);
        if !q.is_empty() && !fold(&record.search_haystack()).contains(&q) {
            return false;
        }
        true
    }

    /// Flat key-value form. Only non-default fields are emitted.
    pub fn serialize(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if !self.query.is_empty() {
            pairs.push(("q".to_string(), self.query.clone()));
        }
        if let Some(p) = &self.province {
            pairs.push(("prov".to_string(), p.clone()));
        }
        if let Some(c) = &self.canton {
            pairs.push(("canton".to_string(), c.clone()));
        }
        if !self.categories.is_empty() {
            let joined = self.categories.join(&CATEGORY_DELIMITER.to_string());
            pairs.push(("cats".to_string(), joined));
        }
        pairs
    }

    /// Rebuild a state from its flat form. Unrecognized keys are ignored;
    /// empty category tokens are discarded.
    pub fn deserialize(pairs: &[(String, String)]) -> Self {
        let mut state = FilterState::default();
        for (key, value) in pairs {
            match key.as_str() {
                "q" => state.query = value.clone(),
                "prov" if !value.is_empty() => state.province = Some(value.clone()),
                "canton" if !value.is_empty() => state.canton = Some(value.clone()),
                "cats" => {
                    for token in value.split(CATEGORY_DELIMITER) {
                        if !token.is_empty() {
                            state.select_category(token);
                        }
                    }
                }
                _ => {}
            }
        }
        state
    }

    /// Percent-encoded query-string carrier of [`serialize`](Self::serialize).
    pub fn to_query_string(&self) -> String {
        self.serialize()
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Parse a query-string carrier back into a state.
    pub fn from_query_string(qs: &str) -> Self {
        let pairs: Vec<(String, String)> = qs
            .trim_start_matches('?')
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let (k, v) = part.split_once('=').unwrap_or((part, ""));
                (
                    urlencoding::decode(k).map(|s| s.into_owned()).unwrap_or_default(),
                    urlencoding::decode(v).map(|s| s.into_owned()).unwrap_or_default(),
                )
            })
            .collect();
        Self::deserialize(&pairs)
    }
}

/// The filtered view: records matching the state, in set order.
pub fn derive<'a>(records: &'a [Record], state: &FilterState) -> Vec<&'a Record> {
    records.iter().filter(|r| state.matches(r)).collect()
}

/// Run the filter command: resolve, apply the state, print matches and the
/// re-serialized state line.
pub async fn run_filter(config: &Config, state: FilterState) -> Result<()> {
    let chain = resolver::build_chain(config);
    let resolution = resolver::resolve(&chain).await?;
    let mut catalog = Catalog::new(resolution.records);
    catalog.set_filter(state);

    let filtered = catalog.filtered();
    println!("filter");
    println!("  state: {}", {
        let qs = catalog.filter().to_query_string();
        if qs.is_empty() {
            "(none)".to_string()
        } else {
            qs
        }
    });
    println!(
        "  matched: {} of {} records",
        filtered.len(),
        catalog.records().len()
    );
    for r in &filtered {
        println!(
            "  {} — {} ({}/{}) [{}]",
            r.code(),
            r.name(),
            r.province,
            r.canton,
            r.category
        );
    }
    println!("ok");
    Ok(())
}
