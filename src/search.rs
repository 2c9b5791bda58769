//! In-memory search index and ranker.
//!
//! One entry per record: the record's position in the working set plus a
//! precomputed fold of its searchable text. The index is rebuilt wholesale
//! whenever the record set is replaced — never patched — so build is O(n)
//! and a query is O(n·w) over hundreds to low thousands of records, which
//! is well inside budget for interactive use.

use anyhow::Result;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::models::Record;
use crate::resolver;
use crate::text::fold;

/// Score contributed by an exact match of the folded text.
const SCORE_EXACT: u32 = 200;
/// Score contributed by a prefix match.
const SCORE_PREFIX: u32 = 120;
/// Score contributed by substring containment.
const SCORE_CONTAINS: u32 = 60;
/// Score contributed per query word contained in the text.
const SCORE_PER_WORD: u32 = 10;

struct IndexEntry {
    /// Position of the record in the working set.
    record: usize,
    /// Folded concatenation of code, name, province, canton.
    text: String,
}

/// Normalized text index over a record set.
pub struct SearchIndex {
    entries: Vec<IndexEntry>,
}

impl SearchIndex {
    /// Build the index over a record set, in set order.
    pub fn build(records: &[Record]) -> Self {
        let entries = records
            .iter()
            .enumerate()
            .map(|(record, r)| IndexEntry {
                record,
                text: fold(&r.search_haystack()),
            })
            .collect();
        Self { entries }
    }

    /// Ranked top-`limit` record positions for a query, best first.
    ///
    /// The scoring tiers deliberately overlap and accumulate: an exact match
    /// also starts with and contains the query, so it collects all three
    /// tier bonuses plus the per-word bonuses. Collapsing the tiers into
    /// exclusive cases would change the ranking contract. Ties keep the
    /// record set's original order; an empty or score-zero candidate never
    /// appears.
    pub fn top(&self, query: &str, limit: usize) -> Vec<usize> {
        let q = fold(query);
        if q.is_empty() {
            return Vec::new();
        }
        let words: Vec<&str> = q.split_whitespace().collect();

        let mut hits: Vec<(u32, usize)> = Vec::new();
        for entry in &self.entries {
            let t = &entry.text;
            let mut score = 0u32;
            if *t == q {
                score += SCORE_EXACT;
            }
            if t.starts_with(&q) {
                score += SCORE_PREFIX;
            }
            if t.contains(&q) {
                score += SCORE_CONTAINS;
            }
            for w in &words {
                if t.contains(w) {
                    score += SCORE_PER_WORD;
                }
            }
            if score > 0 {
                hits.push((score, entry.record));
            }
        }

        // Score desc, then set order — deterministic.
        hits.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        hits.truncate(limit);
        hits.into_iter().map(|(_, record)| record).collect()
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Run the search command: resolve the chain, rank, print suggestions.
pub async fn run_search(config: &Config, query: &str, limit: Option<usize>) -> Result<()> {
    let chain = resolver::build_chain(config);
    let resolution = resolver::resolve(&chain).await?;
    let catalog = Catalog::new(resolution.records);

    let limit = limit.unwrap_or(config.search.suggest_limit);
    let hits = catalog.search_top(query, limit);

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, r) in hits.iter().enumerate() {
        println!(
            "{}. {} — {} ({}/{})",
            i + 1,
            r.code(),
            r.name(),
            r.province,
            r.canton
        );
    }
    Ok(())
}
