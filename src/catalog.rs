//! The catalog: one owner for the working record set and everything
//! derived from it.
//!
//! `records`, the search index, the filter state and the filtered view were
//! ambient globals in earlier renditions of this tool; here they live in a
//! single struct with a replace-on-write discipline. The record set and its
//! derivations are only ever swapped atomically and wholesale — a consumer
//! holding `&Catalog` can never observe a half-built index or a filtered
//! view computed against a previous set.

use std::collections::BTreeMap;

use crate::filter::{derive, FilterState};
use crate::geo::{natural_region, NaturalRegion};
use crate::models::Record;
use crate::search::SearchIndex;

pub struct Catalog {
    records: Vec<Record>,
    index: SearchIndex,
    filter: FilterState,
    filtered: Vec<usize>,
}

impl Catalog {
    /// Build a catalog over a validated record set with no active filter.
    pub fn new(records: Vec<Record>) -> Self {
        let index = SearchIndex::build(&records);
        let filtered = (0..records.len()).collect();
        Self {
            records,
            index,
            filter: FilterState::default(),
            filtered,
        }
    }

    /// Replace the record set wholesale. The index is rebuilt and the
    /// current filter re-derived against the new set in the same step.
    pub fn replace(&mut self, records: Vec<Record>) {
        self.index = SearchIndex::build(&records);
        self.records = records;
        self.rederive();
    }

    /// The full validated record set, in load order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// The active filter state.
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Install a new filter state and recompute the filtered view.
    pub fn set_filter(&mut self, state: FilterState) {
        self.filter = state;
        self.rederive();
    }

    fn rederive(&mut self) {
        self.filtered = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| self.filter.matches(r))
            .map(|(i, _)| i)
            .collect();
    }

    /// The filtered view, in set order.
    pub fn filtered(&self) -> Vec<&Record> {
        self.filtered.iter().map(|&i| &self.records[i]).collect()
    }

    /// Ranked suggestions for a query, best first.
    pub fn search_top(&self, query: &str, limit: usize) -> Vec<&Record> {
        self.index
            .top(query, limit)
            .into_iter()
            .map(|i| &self.records[i])
            .collect()
    }

    /// Categories with record counts, count-descending then label-ascending.
    pub fn category_counts(&self) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for r in &self.records {
            *counts.entry(r.category.as_str()).or_insert(0) += 1;
        }
        let mut out: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(label, n)| (label.to_string(), n))
            .collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        out
    }

    /// Distinct non-empty provinces, sorted.
    pub fn provinces(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .records
            .iter()
            .filter(|r| !r.province.is_empty())
            .map(|r| r.province.clone())
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Distinct non-empty cantons of one province, sorted.
    pub fn cantons_of(&self, province: &str) -> Vec<String> {
        let mut out: Vec<String> = self
            .records
            .iter()
            .filter(|r| r.province == province && !r.canton.is_empty())
            .map(|r| r.canton.clone())
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Mean position of the set, for centering a view. `None` when empty.
    pub fn center(&self) -> Option<(f64, f64)> {
        if self.records.is_empty() {
            return None;
        }
        let n = self.records.len() as f64;
        let lat = self.records.iter().map(|r| r.lat).sum::<f64>() / n;
        let lng = self.records.iter().map(|r| r.lng).sum::<f64>() / n;
        Some((lat, lng))
    }

    /// Record counts per natural region, count-descending.
    pub fn region_breakdown(&self) -> Vec<(NaturalRegion, usize)> {
        let mut counts: Vec<(NaturalRegion, usize)> = Vec::new();
        for r in &self.records {
            let region = natural_region(r.lat, r.lng);
            match counts.iter_mut().find(|(reg, _)| *reg == region) {
                Some((_, n)) => *n += 1,
                None => counts.push((region, 1)),
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }
}
