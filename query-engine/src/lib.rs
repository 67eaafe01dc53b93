//! FILENAME: query-engine/src/lib.rs
//! Pivot query state machine.
//!
//! This crate is the canonical in-memory representation of a multidimensional
//! query — two axes of dimensions, an aggregate measure, per-dimension sort
//! orders and value filters — together with the fixed set of named transitions
//! that are the only legal way to mutate it. It is pure: no I/O, no async, no
//! logging. The orchestration layer (`query-session`) drives it and feeds the
//! domain cache from the remote lookup service.
//!
//! Layers:
//! - `definition`: Serializable configuration (what the query IS)
//! - `value`: Normalized raw values for domains and filters
//! - `cache`: Per-dimension value-domain cache (what values EXIST)
//! - `state`: The live query state and its transitions (HOW it changes)
//! - `projection`: Transport-ready derivation (WHAT gets encoded downstream)

pub mod cache;
pub mod definition;
pub mod error;
pub mod projection;
pub mod state;
pub mod value;

pub use cache::DomainCache;
pub use definition::{AxisRole, Dimension, Order, QueryDefinition, SelectedDimension};
pub use error::QueryError;
pub use projection::{project, QueryProjection};
pub use state::{AxisDims, QueryState, SelectionMode};
pub use value::{DomainValue, OrderedFloat};
