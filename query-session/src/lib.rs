//! FILENAME: query-session/src/lib.rs
//! Orchestration layer for the pivot query builder.
//!
//! Owns the shared `QueryState`, exposes `QueryAction` dispatch as the single
//! write path, and plumbs asynchronous domain lookups into the value-domain
//! cache. Rendering, URL encoding and the lookup transport itself stay
//! outside; they meet this crate at `DomainSource` and the state snapshot.

pub mod action;
pub mod session;
pub mod source;

pub use action::{FilterRange, QueryAction};
pub use session::QuerySession;
pub use source::{DomainSource, StaticDomainSource};
