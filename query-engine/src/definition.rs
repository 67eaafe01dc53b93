//! FILENAME: query-engine/src/definition.rs
//! PURPOSE: Serializable configuration describing a pivot query.
//! CONTEXT: These types are the initial query description a session is seeded
//! from (and reset to). They carry no runtime state — caches and the picker
//! cursor live on `QueryState`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::value::DomainValue;

/// A categorical attribute that can sit on an axis and/or be filtered.
/// Opaque: nothing beyond equality is assumed.
pub type Dimension = String;

// ============================================================================
// AXIS & ORDER
// ============================================================================

/// One of the two roles a dimension may occupy in the pivot layout.
/// A dimension is a member of at most one axis at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisRole {
    Rows,
    Cols,
}

impl AxisRole {
    /// Parses the wire spelling used by host UIs. This is the single place an
    /// `InvalidAxis` can arise; once a role is typed, axis operations are
    /// total.
    pub fn parse(name: &str) -> Result<Self, QueryError> {
        match name {
            "rows" => Ok(AxisRole::Rows),
            "cols" => Ok(AxisRole::Cols),
            other => Err(QueryError::InvalidAxis(other.to_string())),
        }
    }
}

/// Per-dimension sort order. Cyclic: natural, ascending, descending, and back
/// to natural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Order {
    #[serde(rename = "nat")]
    Natural,
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl Default for Order {
    fn default() -> Self {
        Order::Natural
    }
}

impl Order {
    /// Advances one step along the fixed cycle, wrapping after Descending.
    pub fn next(self) -> Self {
        match self {
            Order::Natural => Order::Ascending,
            Order::Ascending => Order::Descending,
            Order::Descending => Order::Natural,
        }
    }
}

// ============================================================================
// SELECTION CURSOR
// ============================================================================

/// Identifies which dimension's filter-value picker is currently open, and on
/// which axis the dimension will land when the selection is committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedDimension {
    pub axis: AxisRole,
    pub dimension: Dimension,
}

// ============================================================================
// INITIAL QUERY DESCRIPTION
// ============================================================================

/// The stored query description used to seed a `QueryState` and to restore it
/// on `reset_search`. Shape mirrors the state's own fields minus the caches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryDefinition {
    /// Dimensions on the row axis, outer to inner.
    pub rows: Vec<Dimension>,

    /// Dimensions on the column axis, outer to inner.
    pub cols: Vec<Dimension>,

    /// The selected aggregate measure. Exactly one at a time; validity is the
    /// aggregate catalog's concern.
    pub agg: String,

    /// Initial per-dimension sort orders.
    #[serde(default)]
    pub order: FxHashMap<Dimension, Order>,

    /// Initial filter sets. An absent key means "no filter configured"; an
    /// explicit empty list means "include nothing".
    #[serde(default)]
    pub filter: FxHashMap<Dimension, Vec<DomainValue>>,

    /// The closed set of pre-scoped dimensions (time-like attributes whose
    /// range is fixed outside the builder). Selecting one bypasses the
    /// interactive picker and takes its whole fetched domain as the filter.
    #[serde(default)]
    pub scope_dimensions: Vec<Dimension>,
}

impl QueryDefinition {
    /// The canonical default query: receipts summed over five decades for the
    /// four headline playwrights. Also serves as the test fixture.
    pub fn sample() -> Self {
        let mut order = FxHashMap::default();
        order.insert("author_1".to_string(), Order::Descending);
        order.insert("decade".to_string(), Order::Natural);

        let mut filter = FxHashMap::default();
        filter.insert(
            "author_1".to_string(),
            vec![
                DomainValue::text("Corneille (Pierre)"),
                DomainValue::text("Molière (Jean-Baptiste Poquelin dit)"),
                DomainValue::text("Racine (Jean)"),
                DomainValue::text("Voltaire (François-Marie Arouet dit)"),
            ],
        );
        filter.insert(
            "decade".to_string(),
            [1710, 1720, 1730, 1740, 1750]
                .iter()
                .map(|d| DomainValue::number(*d as f64))
                .collect(),
        );

        QueryDefinition {
            rows: vec!["decade".to_string()],
            cols: vec!["author_1".to_string()],
            agg: "sum_receipts".to_string(),
            order,
            filter,
            scope_dimensions: vec![
                "decade".to_string(),
                "month".to_string(),
                "weekday".to_string(),
                "theater_period".to_string(),
            ],
        }
    }

    /// Whether `dim` belongs to the pre-scoped set.
    pub fn is_scope_dimension(&self, dim: &str) -> bool {
        self.scope_dimensions.iter().any(|d| d == dim)
    }
}
