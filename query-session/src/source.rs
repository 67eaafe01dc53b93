//! FILENAME: query-session/src/source.rs
//! PURPOSE: Boundary trait for the external domain-lookup service.

use std::collections::HashMap;

use async_trait::async_trait;
use query_engine::DomainValue;

/// The domain-lookup collaborator: answers "what values exist for dimension
/// D?" against the remote data source.
///
/// Failures are not surfaced into the state machine. An implementation that
/// cannot resolve a dimension returns an empty list, which leaves the cache
/// slot empty-but-present rather than propagating an error.
#[async_trait]
pub trait DomainSource: Send + Sync {
    async fn lookup(&self, dimension: &str) -> Vec<DomainValue>;
}

/// In-memory source backed by a fixed table. Used by tests and by hosts that
/// already hold their domains locally.
#[derive(Debug, Clone, Default)]
pub struct StaticDomainSource {
    domains: HashMap<String, Vec<DomainValue>>,
}

impl StaticDomainSource {
    pub fn new() -> Self {
        StaticDomainSource::default()
    }

    pub fn with_domain(mut self, dimension: impl Into<String>, values: Vec<DomainValue>) -> Self {
        self.domains.insert(dimension.into(), values);
        self
    }
}

#[async_trait]
impl DomainSource for StaticDomainSource {
    async fn lookup(&self, dimension: &str) -> Vec<DomainValue> {
        self.domains.get(dimension).cloned().unwrap_or_default()
    }
}
