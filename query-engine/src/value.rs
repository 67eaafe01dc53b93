//! FILENAME: query-engine/src/value.rs
//! PURPOSE: Normalized raw values for dimension domains and filters.
//! CONTEXT: Domain lookups return mixed raw values (a decade is a number, an
//! author is a string), and filter sets must support duplicate-free
//! membership. `DomainValue` gives them a single hashable, totally ordered
//! representation.

use serde::{Deserialize, Serialize};

/// A raw value drawn from a dimension's domain.
///
/// Serialized untagged so wire payloads stay plain JSON scalars
/// (`[1710, "Racine (Jean)"]` round-trips as-is).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomainValue {
    Number(OrderedFloat),
    Text(String),
    Boolean(bool),
}

impl DomainValue {
    pub fn number(n: f64) -> Self {
        DomainValue::Number(OrderedFloat(n))
    }

    pub fn text(s: impl Into<String>) -> Self {
        DomainValue::Text(s.into())
    }
}

impl Ord for DomainValue {
    /// Total order used for cached domains: numbers, then text, then
    /// booleans. Cross-type comparisons never panic.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (self, other) {
            (DomainValue::Number(na), DomainValue::Number(nb)) => na.cmp(nb),
            (DomainValue::Number(_), _) => Ordering::Less,
            (_, DomainValue::Number(_)) => Ordering::Greater,

            (DomainValue::Text(ta), DomainValue::Text(tb)) => ta.cmp(tb),
            (DomainValue::Text(_), _) => Ordering::Less,
            (_, DomainValue::Text(_)) => Ordering::Greater,

            (DomainValue::Boolean(ba), DomainValue::Boolean(bb)) => ba.cmp(bb),
        }
    }
}

impl PartialOrd for DomainValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Wrapper around f64 that implements Eq, Ord and Hash for use in filter sets
/// and as sort keys. NaN values are treated as equal to each other and sort
/// last among numbers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderedFloat(pub f64);

impl OrderedFloat {
    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        if self.0.is_nan() && other.0.is_nan() {
            true
        } else {
            self.0 == other.0
        }
    }
}

impl Eq for OrderedFloat {}

impl std::hash::Hash for OrderedFloat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        if self.0.is_nan() {
            // All NaN values hash to the same thing
            u64::MAX.hash(state);
        } else {
            self.0.to_bits().hash(state);
        }
    }
}

impl Ord for OrderedFloat {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (self.0.is_nan(), other.0.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal),
        }
    }
}

impl PartialOrd for OrderedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
