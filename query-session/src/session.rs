//! FILENAME: query-session/src/session.rs
//! PURPOSE: Owns the shared query state and dispatches actions one at a time.
//! CONTEXT: Transitions run to completion under the state mutex, so no two
//! mutations interleave. The only asynchronous work is domain lookups, which
//! are spawned fire-and-forget and resume solely by writing one cache slot.

use std::sync::{Arc, Mutex};

use log::{debug, info};
use query_engine::{
    project, AxisRole, Dimension, QueryDefinition, QueryError, QueryProjection, QueryState,
    SelectionMode,
};

use crate::action::QueryAction;
use crate::source::DomainSource;

/// One query-builder session: the canonical `QueryState` plus the
/// domain-lookup collaborator. Constructed once per session from a stored
/// query description and discarded when the builder closes.
pub struct QuerySession {
    state: Arc<Mutex<QueryState>>,
    source: Arc<dyn DomainSource>,
}

impl QuerySession {
    /// Builds a session and kicks off domain loads for every dimension
    /// already on an axis. Must run inside a tokio runtime.
    pub fn new(definition: QueryDefinition, source: Arc<dyn DomainSource>) -> Self {
        let session = QuerySession {
            state: Arc::new(Mutex::new(QueryState::new(definition))),
            source,
        };
        preload_missing(&session.state, &session.source);
        session
    }

    /// Applies one action. A bad axis role is rejected before any mutation;
    /// every other action is total. Transitions that change axis membership
    /// re-scan both axes and load any domain not yet cached.
    pub fn dispatch(&self, action: QueryAction) -> Result<(), QueryError> {
        debug!(target: "query", "dispatch {:?}", action);
        match action {
            QueryAction::ResetSearch => {
                self.state.lock().unwrap().reset_search();
                preload_missing(&self.state, &self.source);
            }
            QueryAction::SetSelectedDimension { axis, dim } => {
                let axis = AxisRole::parse(&axis)?;
                let mode = self.state.lock().unwrap().select_dimension(axis, &dim);
                self.spawn_selection_load(axis, dim, mode);
            }
            QueryAction::AddFilter { dim, value } => {
                self.state.lock().unwrap().add_filter(&dim, value);
            }
            QueryAction::RemoveFilter { dim, value } => {
                self.state.lock().unwrap().remove_filter(&dim, &value);
            }
            QueryAction::AddFilterRange { dim, values, range } => {
                self.state
                    .lock()
                    .unwrap()
                    .add_filter_range(&dim, &values, &range.from, &range.to);
            }
            QueryAction::SetAggregate { agg } => {
                self.state.lock().unwrap().set_aggregate(agg);
            }
            QueryAction::ClearFilter { dim } => {
                self.state.lock().unwrap().clear_filter(&dim);
            }
            QueryAction::AddDimension { axis, dim, filters } => {
                let axis = AxisRole::parse(&axis)?;
                self.state.lock().unwrap().add_dimension(axis, &dim, filters);
                preload_missing(&self.state, &self.source);
            }
            QueryAction::RemoveDimension { axis, dim } => {
                let axis = AxisRole::parse(&axis)?;
                self.state.lock().unwrap().remove_dimension(axis, &dim);
                preload_missing(&self.state, &self.source);
            }
            QueryAction::InterchangeAxis => {
                self.state.lock().unwrap().interchange_axis();
                preload_missing(&self.state, &self.source);
            }
            QueryAction::ToggleDimensionOrder { dim } => {
                self.state.lock().unwrap().toggle_dimension_order(&dim);
            }
            QueryAction::TogglePivot => {
                self.state.lock().unwrap().toggle_pivot();
                preload_missing(&self.state, &self.source);
            }
        }
        Ok(())
    }

    /// Read-only snapshot for render collaborators.
    pub fn snapshot(&self) -> QueryState {
        self.state.lock().unwrap().clone()
    }

    /// Derives the transport-ready query description on demand.
    pub fn projection(&self) -> QueryProjection {
        project(&self.state.lock().unwrap())
    }

    /// Fetches the domain for `dim` unless already cached. At most one fetch
    /// per dimension per session, best effort: calls made before the first
    /// lookup completes all issue lookups, and the last write wins.
    pub fn ensure_domain_loaded(&self, dim: &str) {
        if !self.state.lock().unwrap().domains.is_loaded(dim) {
            spawn_domain_load(&self.state, &self.source, dim.to_string());
        }
    }

    /// A picker open always fetches fresh candidates (the selection list may
    /// need schema ordering the cached domain doesn't have); a scope
    /// dimension's fetch lands through the bypass instead, which also changes
    /// axis membership and so triggers a preload scan of its own.
    fn spawn_selection_load(&self, axis: AxisRole, dim: String, mode: SelectionMode) {
        let state = Arc::clone(&self.state);
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            let values = source.lookup(&dim).await;
            match mode {
                SelectionMode::Picker => {
                    state.lock().unwrap().domains.store_selection(dim, values);
                }
                SelectionMode::Scope => {
                    state
                        .lock()
                        .unwrap()
                        .apply_scope_dimension(axis, &dim, values);
                    preload_missing(&state, &source);
                }
            }
        });
    }
}

/// Post-transition hook: fetch domains for axis members not yet cached.
/// Lookups are not deduplicated; two loads for the same uncached dimension
/// both run, and the later completion overwrites the same slot.
fn preload_missing(state: &Arc<Mutex<QueryState>>, source: &Arc<dyn DomainSource>) {
    let missing = state.lock().unwrap().missing_domains();
    for dim in missing {
        spawn_domain_load(state, source, dim);
    }
}

fn spawn_domain_load(
    state: &Arc<Mutex<QueryState>>,
    source: &Arc<dyn DomainSource>,
    dim: Dimension,
) {
    info!(target: "query", "loading domain for {}", dim);
    let state = Arc::clone(state);
    let source = Arc::clone(source);
    tokio::spawn(async move {
        let values = source.lookup(&dim).await;
        debug!(target: "query", "domain for {} arrived ({} values)", dim, values.len());
        state.lock().unwrap().domains.store_domain(dim, values);
    });
}
