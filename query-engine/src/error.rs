//! FILENAME: query-engine/src/error.rs

use thiserror::Error;

/// Structural errors in the query state machine.
///
/// Only bad axis roles are fatal, and only before any mutation takes place.
/// Data-absence conditions (unknown dimension, missing filter value) are
/// deliberately *not* errors: the corresponding operations degrade to no-ops,
/// since UI actions can race with state changes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("unknown axis: {0}")]
    InvalidAxis(String),
}
