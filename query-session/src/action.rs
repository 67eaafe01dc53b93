//! FILENAME: query-session/src/action.rs
//! PURPOSE: Action payloads — the single write path into a query session.
//! CONTEXT: Host UIs send these over a serde boundary. Axis roles arrive as
//! the wire strings ("rows"/"cols") and are validated at dispatch, before any
//! state is touched.

use query_engine::DomainValue;
use serde::{Deserialize, Serialize};

/// Inclusive endpoints of a contiguous slice of a candidate list. The range
/// is over list position, not value magnitude.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRange {
    pub from: DomainValue,
    pub to: DomainValue,
}

/// One user action on the query builder, mirroring the named transitions of
/// the state machine one-to-one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryAction {
    /// Restore the configured default query.
    ResetSearch,
    /// Open filter selection for a dimension (or apply the scope bypass).
    SetSelectedDimension { axis: String, dim: String },
    /// Add one value to a dimension's filter set.
    AddFilter { dim: String, value: DomainValue },
    /// Remove one value from a dimension's filter set.
    RemoveFilter { dim: String, value: DomainValue },
    /// Add a contiguous slice of the candidate list to the filter set.
    AddFilterRange {
        dim: String,
        values: Vec<DomainValue>,
        range: FilterRange,
    },
    /// Replace the aggregate measure.
    SetAggregate { agg: String },
    /// Set a dimension's filter to the explicit empty set.
    ClearFilter { dim: String },
    /// Commit a picker selection onto an axis.
    AddDimension {
        axis: String,
        dim: String,
        filters: Option<Vec<DomainValue>>,
    },
    /// Remove a dimension from an axis, emptying its filter.
    RemoveDimension { axis: String, dim: String },
    /// Swap the row and column axes wholesale.
    InterchangeAxis,
    /// Advance a dimension's sort order one step.
    ToggleDimensionOrder { dim: String },
    /// Swap the axes (distinct UI affordance, same end state).
    TogglePivot,
}
