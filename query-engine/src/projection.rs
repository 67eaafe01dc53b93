//! FILENAME: query-engine/src/projection.rs
//! PURPOSE: Transport-ready derivation of the current query.
//! CONTEXT: The external URL/query encoder consumes this shape; this crate
//! never performs the encoding itself.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::definition::Dimension;
use crate::state::QueryState;
use crate::value::DomainValue;

/// The downstream description of a query: every axis dimension in display
/// order, the aggregate, and the filter mapping. Filters use a `BTreeMap` so
/// the encoded output is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryProjection {
    /// Row dimensions first, then column dimensions.
    pub dimensions: Vec<Dimension>,
    pub aggregate: String,
    pub filters: BTreeMap<Dimension, Vec<DomainValue>>,
}

/// Derives the projection from the live state. Pure: recomputed on demand,
/// never stored.
pub fn project(state: &QueryState) -> QueryProjection {
    QueryProjection {
        dimensions: state.rows.iter().chain(state.cols.iter()).cloned().collect(),
        aggregate: state.aggregate.clone(),
        filters: state
            .filters
            .iter()
            .map(|(dim, values)| (dim.clone(), values.clone()))
            .collect(),
    }
}
