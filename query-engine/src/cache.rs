//! FILENAME: query-engine/src/cache.rs
//! PURPOSE: Per-dimension cache of known domain values.
//! CONTEXT: Domains are fetched lazily from the remote lookup service, at
//! most once per dimension per session (best effort: concurrent loads for the
//! same uncached dimension all run, and the last write wins). A second,
//! transient slot holds the candidate list offered while a picker is open.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::definition::Dimension;
use crate::value::DomainValue;

/// The value-domain cache backing dimension-filter pickers.
///
/// `domains` grows monotonically — entries are never invalidated once
/// fetched. `selection` is cleared whenever the picker for its dimension
/// closes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainCache {
    domains: FxHashMap<Dimension, Vec<DomainValue>>,
    selection: FxHashMap<Dimension, Vec<DomainValue>>,
}

impl DomainCache {
    pub fn new() -> Self {
        DomainCache::default()
    }

    /// Whether the full domain for `dim` has been fetched this session.
    pub fn is_loaded(&self, dim: &str) -> bool {
        self.domains.contains_key(dim)
    }

    /// Stores a fetched domain, sorted by the natural value order. A later
    /// write for the same dimension replaces the earlier one wholesale.
    pub fn store_domain(&mut self, dim: impl Into<Dimension>, mut values: Vec<DomainValue>) {
        values.sort();
        self.domains.insert(dim.into(), values);
    }

    /// The sorted known domain for `dim`, if fetched.
    pub fn domain(&self, dim: &str) -> Option<&[DomainValue]> {
        self.domains.get(dim).map(Vec::as_slice)
    }

    /// Stores picker candidates in the order the source returned them. The
    /// selection list keeps the source's schema ordering rather than the
    /// natural sort applied to cached domains.
    pub fn store_selection(&mut self, dim: impl Into<Dimension>, values: Vec<DomainValue>) {
        self.selection.insert(dim.into(), values);
    }

    /// The candidate list currently offered for `dim`, if a picker is open.
    pub fn selection(&self, dim: &str) -> Option<&[DomainValue]> {
        self.selection.get(dim).map(Vec::as_slice)
    }

    /// Drops the transient candidate slot when a picker closes.
    pub fn clear_selection(&mut self, dim: &str) {
        self.selection.remove(dim);
    }

    /// Dimensions from `active` with no cached domain yet, deduplicated, in
    /// iteration order. The orchestration layer issues one lookup per entry.
    pub fn missing_from<'a, I>(&self, active: I) -> Vec<Dimension>
    where
        I: IntoIterator<Item = &'a Dimension>,
    {
        let mut missing: Vec<Dimension> = Vec::new();
        for dim in active {
            if !self.domains.contains_key(dim) && !missing.iter().any(|d| d == dim) {
                missing.push(dim.clone());
            }
        }
        missing
    }
}
