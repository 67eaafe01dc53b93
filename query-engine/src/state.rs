//! FILENAME: query-engine/src/state.rs
//! PURPOSE: The live query state and its named transitions.
//! CONTEXT: `QueryState` aggregates the axis sequences, filter sets, sort
//! orders, the picker cursor and the domain cache. The methods here are the
//! only legal mutations. All of them are synchronous and total for typed
//! inputs: structural validation (axis roles) happens before a payload
//! reaches this layer, and data-absence conditions degrade to no-ops.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cache::DomainCache;
use crate::definition::{AxisRole, Dimension, Order, QueryDefinition, SelectedDimension};
use crate::value::DomainValue;

/// Ordered dimension sequence for one axis. Pivot layouts rarely nest more
/// than two dimensions per axis, so the common case stays inline.
pub type AxisDims = SmallVec<[Dimension; 2]>;

/// Outcome of `select_dimension`: either the host opens the interactive
/// picker, or the pre-scoped bypass applies once the domain lookup lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Picker,
    Scope,
}

// ============================================================================
// QUERY STATE
// ============================================================================

/// The canonical in-memory representation of one pivot query.
///
/// Invariant: `rows` and `cols` are disjoint at all times, and each sequence
/// is duplicate-free. The transition layer enforces this; no operation can
/// place a dimension on both axes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryState {
    /// The selected aggregate measure.
    pub aggregate: String,

    /// Row-axis dimensions, outer to inner. Order defines nesting.
    pub rows: AxisDims,

    /// Column-axis dimensions, outer to inner.
    pub cols: AxisDims,

    /// Per-dimension sort orders. Entries appear on first cycle and persist
    /// even after the dimension leaves both axes.
    pub sort_orders: FxHashMap<Dimension, Order>,

    /// Accepted values per dimension. An absent key means "no filter
    /// configured"; an empty list means "include nothing". Each list is
    /// duplicate-free and iterates in insertion order.
    pub filters: FxHashMap<Dimension, Vec<DomainValue>>,

    /// Which dimension's filter picker is open, if any.
    pub selected: Option<SelectedDimension>,

    /// Known value domains plus the transient picker candidates.
    pub domains: DomainCache,

    /// The configured default query restored by `reset_search`.
    defaults: QueryDefinition,
}

/// Seeds disjoint, duplicate-free axis sequences from a stored description.
/// First occurrence wins; a dimension listed on both axes stays on rows.
fn seed_axes(definition: &QueryDefinition) -> (AxisDims, AxisDims) {
    let mut rows = AxisDims::new();
    for dim in &definition.rows {
        if !rows.contains(dim) {
            rows.push(dim.clone());
        }
    }
    let mut cols = AxisDims::new();
    for dim in &definition.cols {
        if !cols.contains(dim) && !rows.contains(dim) {
            cols.push(dim.clone());
        }
    }
    (rows, cols)
}

impl QueryState {
    /// Constructs the state for one builder session from a stored query
    /// description.
    pub fn new(definition: QueryDefinition) -> Self {
        let (rows, cols) = seed_axes(&definition);
        QueryState {
            aggregate: definition.agg.clone(),
            rows,
            cols,
            sort_orders: definition.order.clone(),
            filters: definition.filter.clone(),
            selected: None,
            domains: DomainCache::new(),
            defaults: definition,
        }
    }

    /// The configured default query this state resets to.
    pub fn defaults(&self) -> &QueryDefinition {
        &self.defaults
    }

    // ========================================================================
    // AXIS / ORDER HELPERS
    // ========================================================================

    /// The live ordered sequence for the given axis role.
    pub fn axis(&self, role: AxisRole) -> &AxisDims {
        match role {
            AxisRole::Rows => &self.rows,
            AxisRole::Cols => &self.cols,
        }
    }

    fn axis_mut(&mut self, role: AxisRole) -> &mut AxisDims {
        match role {
            AxisRole::Rows => &mut self.rows,
            AxisRole::Cols => &mut self.cols,
        }
    }

    fn on_any_axis(&self, dim: &str) -> bool {
        self.rows.iter().any(|d| d == dim) || self.cols.iter().any(|d| d == dim)
    }

    /// Appends `dim` to the named axis. No-op when the dimension already sits
    /// on either axis: a dimension occupies at most one axis at a time.
    fn add_to_axis(&mut self, role: AxisRole, dim: &str) {
        if self.on_any_axis(dim) {
            return;
        }
        self.axis_mut(role).push(dim.to_string());
    }

    /// Removes `dim` from the named axis; no-op if absent.
    fn remove_from_axis(&mut self, role: AxisRole, dim: &str) {
        self.axis_mut(role).retain(|d| d.as_str() != dim);
    }

    /// The sort order for `dim`. Dimensions never cycled report Natural.
    pub fn order_of(&self, dim: &str) -> Order {
        self.sort_orders.get(dim).copied().unwrap_or_default()
    }

    /// Advances `dim`'s sort order one step along the fixed cycle. The entry
    /// is created on first access and persists even if the dimension later
    /// leaves both axes.
    pub fn cycle_order(&mut self, dim: &str) {
        let entry = self.sort_orders.entry(dim.to_string()).or_default();
        *entry = entry.next();
    }

    // ========================================================================
    // TRANSITIONS
    // ========================================================================

    /// Restores aggregate, axes and filters to the configured default query
    /// and closes any open picker. Sort orders and both domain caches are
    /// deliberately left alone.
    pub fn reset_search(&mut self) {
        let (rows, cols) = seed_axes(&self.defaults);
        self.aggregate = self.defaults.agg.clone();
        self.rows = rows;
        self.cols = cols;
        self.filters = self.defaults.filter.clone();
        self.selected = None;
    }

    /// Opens filter selection for `dim` on the named axis, or classifies it
    /// as a pre-scoped bypass.
    ///
    /// Picker path: the cursor is set and the candidate slot is seeded from
    /// the current filter so the picker opens pre-populated. The fresh
    /// lookup the caller issues replaces the seed when it resolves.
    ///
    /// Scope path: nothing is selected interactively; the caller routes the
    /// lookup result through `apply_scope_dimension` instead.
    pub fn select_dimension(&mut self, axis: AxisRole, dim: &str) -> SelectionMode {
        if self.defaults.is_scope_dimension(dim) {
            self.domains.clear_selection(dim);
            self.selected = None;
            return SelectionMode::Scope;
        }

        if let Some(current) = self.filters.get(dim) {
            self.domains.store_selection(dim, current.clone());
        }
        self.selected = Some(SelectedDimension {
            axis,
            dimension: dim.to_string(),
        });
        SelectionMode::Picker
    }

    /// Completes the scope bypass: the dimension joins the axis with its
    /// entire fetched domain selected, and the picker state is torn down.
    pub fn apply_scope_dimension(&mut self, axis: AxisRole, dim: &str, values: Vec<DomainValue>) {
        self.add_to_axis(axis, dim);
        self.filters.insert(dim.to_string(), values.clone());
        self.domains.store_domain(dim, values);
        self.domains.clear_selection(dim);
        self.selected = None;
    }

    /// Adds `value` to `dim`'s filter set, creating the set on first use.
    /// Idempotent per value.
    pub fn add_filter(&mut self, dim: &str, value: DomainValue) {
        let values = self.filters.entry(dim.to_string()).or_default();
        if !values.contains(&value) {
            values.push(value);
        }
    }

    /// Removes `value` from `dim`'s filter set; no-op when either the
    /// dimension or the value is absent.
    pub fn remove_filter(&mut self, dim: &str, value: &DomainValue) {
        if let Some(values) = self.filters.get_mut(dim) {
            values.retain(|v| v != value);
        }
    }

    /// Adds every candidate between `from` and `to`, inclusive, by position
    /// in `values` (the ordered candidate list, not value magnitude). No-op
    /// when either endpoint is missing or the range is inverted.
    pub fn add_filter_range(
        &mut self,
        dim: &str,
        values: &[DomainValue],
        from: &DomainValue,
        to: &DomainValue,
    ) {
        let start = values.iter().position(|v| v == from);
        let end = values.iter().position(|v| v == to);
        if let (Some(start), Some(end)) = (start, end) {
            if start <= end {
                for value in &values[start..=end] {
                    self.add_filter(dim, value.clone());
                }
            }
        }
    }

    /// Replaces the aggregate measure. Validity is the aggregate catalog's
    /// concern, not checked here.
    pub fn set_aggregate(&mut self, agg: impl Into<String>) {
        self.aggregate = agg.into();
    }

    /// Sets `dim`'s filter to the explicit empty set — "include nothing",
    /// distinct from having no filter configured at all.
    pub fn clear_filter(&mut self, dim: &str) {
        self.filters.insert(dim.to_string(), Vec::new());
    }

    /// Commits a picker selection: `dim` joins the named axis with the chosen
    /// values, and its candidate list becomes the cached domain. An
    /// explicitly empty selection is a real add with an empty filter; `None`
    /// means the add does not take effect. The picker state is torn down in
    /// every case.
    pub fn add_dimension(
        &mut self,
        axis: AxisRole,
        dim: &str,
        selected: Option<Vec<DomainValue>>,
    ) {
        if let Some(values) = selected {
            self.add_to_axis(axis, dim);
            if let Some(candidates) = self.domains.selection(dim) {
                let candidates = candidates.to_vec();
                self.domains.store_domain(dim, candidates);
            }
            self.filters.insert(dim.to_string(), values);
        }
        self.domains.clear_selection(dim);
        self.selected = None;
    }

    /// Removes `dim` from the named axis and empties its filter. The filter
    /// key is kept: downstream readers treat key presence as "previously
    /// configured".
    pub fn remove_dimension(&mut self, axis: AxisRole, dim: &str) {
        self.remove_from_axis(axis, dim);
        self.filters.insert(dim.to_string(), Vec::new());
    }

    /// Swaps the two axis sequences wholesale — an order-preserving transpose
    /// of the pivot.
    pub fn interchange_axis(&mut self) {
        std::mem::swap(&mut self.rows, &mut self.cols);
    }

    /// Advances the sort order of `dim`.
    pub fn toggle_dimension_order(&mut self, dim: &str) {
        self.cycle_order(dim);
    }

    /// Same end state as `interchange_axis`; retained as a named operation
    /// because a different UI affordance invokes it.
    pub fn toggle_pivot(&mut self) {
        self.interchange_axis();
    }

    // ========================================================================
    // DERIVED QUERIES
    // ========================================================================

    /// Dimensions on either axis whose domain has not been fetched yet. The
    /// orchestration layer calls this after every transition that touches
    /// axis membership and issues one lookup per entry.
    pub fn missing_domains(&self) -> Vec<Dimension> {
        self.domains
            .missing_from(self.rows.iter().chain(self.cols.iter()))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_state() -> QueryState {
        QueryState::new(QueryDefinition::sample())
    }

    fn text(s: &str) -> DomainValue {
        DomainValue::text(s)
    }

    fn num(n: f64) -> DomainValue {
        DomainValue::number(n)
    }

    fn assert_axes_disjoint(state: &QueryState) {
        for dim in &state.rows {
            assert!(
                !state.cols.contains(dim),
                "dimension {} on both axes",
                dim
            );
        }
    }

    #[test]
    fn test_new_seeds_from_definition() {
        let state = create_test_state();
        assert_eq!(state.aggregate, "sum_receipts");
        assert_eq!(state.rows.as_slice(), ["decade".to_string()]);
        assert_eq!(state.cols.as_slice(), ["author_1".to_string()]);
        assert_eq!(state.order_of("author_1"), Order::Descending);
        assert_eq!(state.filters["decade"].len(), 5);
        assert!(state.selected.is_none());
    }

    #[test]
    fn test_axis_exclusivity_under_transitions() {
        let mut state = create_test_state();

        // "decade" already sits on rows; adding it to cols must not take.
        state.domains.store_selection("decade", vec![num(1710.0)]);
        state.add_dimension(AxisRole::Cols, "decade", Some(vec![num(1710.0)]));
        assert_axes_disjoint(&state);
        assert_eq!(state.cols.as_slice(), ["author_1".to_string()]);

        state.apply_scope_dimension(AxisRole::Cols, "decade", vec![num(1710.0)]);
        assert_axes_disjoint(&state);

        state.interchange_axis();
        state.add_dimension(AxisRole::Rows, "author_1", Some(vec![]));
        assert_axes_disjoint(&state);
    }

    #[test]
    fn test_add_filter_idempotent() {
        // Scenario B: adding the same value twice leaves one entry.
        let mut state = create_test_state();
        state.filters.clear();

        state.add_filter("decade", num(1710.0));
        state.add_filter("decade", num(1710.0));
        assert_eq!(state.filters["decade"], vec![num(1710.0)]);
    }

    #[test]
    fn test_remove_filter_inverts_add() {
        let mut state = create_test_state();
        let before = state.filters["author_1"].clone();

        state.add_filter("author_1", text("Regnard (Jean-François)"));
        state.remove_filter("author_1", &text("Regnard (Jean-François)"));
        assert_eq!(state.filters["author_1"], before);
    }

    #[test]
    fn test_remove_filter_absent_is_noop() {
        let mut state = create_test_state();
        let before = state.filters["author_1"].clone();

        // Value not in the set: nothing may change (in particular the last
        // element of the list must survive).
        state.remove_filter("author_1", &text("Dancourt"));
        assert_eq!(state.filters["author_1"], before);

        // Unknown dimension: no entry springs into existence.
        state.remove_filter("genre", &text("comedy"));
        assert!(!state.filters.contains_key("genre"));
    }

    #[test]
    fn test_order_cycle_round_trips() {
        let mut state = create_test_state();

        assert_eq!(state.order_of("genre"), Order::Natural);
        state.cycle_order("genre");
        assert_eq!(state.order_of("genre"), Order::Ascending);
        state.cycle_order("genre");
        state.cycle_order("genre");
        assert_eq!(state.order_of("genre"), Order::Natural);

        // The entry persists even though "genre" is on neither axis.
        assert!(state.sort_orders.contains_key("genre"));
    }

    #[test]
    fn test_interchange_axis() {
        // Scenario A.
        let mut state = create_test_state();
        state.interchange_axis();
        assert_eq!(state.rows.as_slice(), ["author_1".to_string()]);
        assert_eq!(state.cols.as_slice(), ["decade".to_string()]);
    }

    #[test]
    fn test_pivot_involution() {
        let mut state = create_test_state();
        state.domains.store_selection("genre", vec![text("comedy")]);
        state.add_dimension(AxisRole::Rows, "genre", Some(vec![text("comedy")]));
        let rows = state.rows.clone();
        let cols = state.cols.clone();

        state.toggle_pivot();
        state.toggle_pivot();
        assert_eq!(state.rows, rows);
        assert_eq!(state.cols, cols);
    }

    #[test]
    fn test_add_filter_range() {
        let mut state = create_test_state();
        state.filters.clear();
        let values = vec![text("a"), text("b"), text("c"), text("d")];

        state.add_filter_range("letter", &values, &text("b"), &text("d"));
        assert_eq!(
            state.filters["letter"],
            vec![text("b"), text("c"), text("d")]
        );
    }

    #[test]
    fn test_add_filter_range_degenerate() {
        let mut state = create_test_state();
        state.filters.clear();
        let values = vec![text("a"), text("b"), text("c")];

        // Inverted range.
        state.add_filter_range("letter", &values, &text("c"), &text("a"));
        assert!(!state.filters.contains_key("letter"));

        // Missing endpoint.
        state.add_filter_range("letter", &values, &text("a"), &text("z"));
        assert!(!state.filters.contains_key("letter"));

        // Single-element range is inclusive.
        state.add_filter_range("letter", &values, &text("b"), &text("b"));
        assert_eq!(state.filters["letter"], vec![text("b")]);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut state = create_test_state();
        let defaults = state.defaults().clone();

        state.set_aggregate("avg_receipts");
        state.interchange_axis();
        state.domains.store_selection("genre", vec![text("comedy")]);
        state.add_dimension(AxisRole::Rows, "genre", Some(vec![text("comedy")]));
        state.clear_filter("author_1");
        state.cycle_order("genre");
        state.select_dimension(AxisRole::Cols, "genre");

        state.reset_search();
        assert_eq!(state.aggregate, defaults.agg);
        assert_eq!(state.rows.as_slice(), defaults.rows.as_slice());
        assert_eq!(state.cols.as_slice(), defaults.cols.as_slice());
        assert_eq!(state.filters, defaults.filter);
        assert!(state.selected.is_none());

        // Sort orders and cached domains survive a reset.
        assert_eq!(state.order_of("genre"), Order::Ascending);
        assert!(state.domains.is_loaded("genre"));
    }

    #[test]
    fn test_remove_dimension_keeps_filter_key() {
        // Scenario C.
        let mut state = create_test_state();
        state.remove_dimension(AxisRole::Rows, "decade");

        assert!(state.rows.is_empty());
        assert_eq!(state.filters["decade"], Vec::<DomainValue>::new());
    }

    #[test]
    fn test_clear_filter_is_explicit_empty() {
        let mut state = create_test_state();
        state.clear_filter("author_1");
        assert_eq!(state.filters["author_1"], Vec::<DomainValue>::new());

        // Clearing an unconfigured dimension creates the empty entry.
        state.clear_filter("genre");
        assert!(state.filters.contains_key("genre"));
    }

    #[test]
    fn test_select_dimension_picker_seeds_candidates() {
        let mut state = create_test_state();
        state.add_filter("genre", text("comedy"));

        let mode = state.select_dimension(AxisRole::Rows, "genre");
        assert_eq!(mode, SelectionMode::Picker);
        assert_eq!(
            state.selected,
            Some(SelectedDimension {
                axis: AxisRole::Rows,
                dimension: "genre".to_string()
            })
        );
        // Picker opens pre-populated with the current selections.
        assert_eq!(state.domains.selection("genre").unwrap(), [text("comedy")]);
    }

    #[test]
    fn test_select_dimension_scope_bypasses_picker() {
        let mut state = create_test_state();

        let mode = state.select_dimension(AxisRole::Cols, "month");
        assert_eq!(mode, SelectionMode::Scope);
        assert!(state.selected.is_none());

        let domain: Vec<DomainValue> = (1..=12).map(|m| num(m as f64)).collect();
        state.apply_scope_dimension(AxisRole::Cols, "month", domain.clone());
        assert_eq!(
            state.cols.as_slice(),
            ["author_1".to_string(), "month".to_string()]
        );
        assert_eq!(state.filters["month"], domain);
        assert_eq!(state.domains.domain("month").unwrap().len(), 12);
        assert!(state.domains.selection("month").is_none());
    }

    #[test]
    fn test_add_dimension_without_payload_only_closes_picker() {
        let mut state = create_test_state();
        state.select_dimension(AxisRole::Rows, "genre");
        state.domains.store_selection("genre", vec![text("comedy")]);

        state.add_dimension(AxisRole::Rows, "genre", None);
        assert!(!state.rows.contains(&"genre".to_string()));
        assert!(!state.filters.contains_key("genre"));
        assert!(state.selected.is_none());
        assert!(state.domains.selection("genre").is_none());
    }

    #[test]
    fn test_add_dimension_empty_payload_is_real_add() {
        let mut state = create_test_state();
        state.domains.store_selection("genre", vec![text("comedy")]);

        state.add_dimension(AxisRole::Rows, "genre", Some(Vec::new()));
        assert!(state.rows.contains(&"genre".to_string()));
        assert_eq!(state.filters["genre"], Vec::<DomainValue>::new());
        // The candidate list was promoted to the cached domain.
        assert_eq!(state.domains.domain("genre").unwrap(), [text("comedy")]);
    }

    #[test]
    fn test_missing_domains_scans_both_axes() {
        let mut state = create_test_state();
        assert_eq!(
            state.missing_domains(),
            vec!["decade".to_string(), "author_1".to_string()]
        );

        state.domains.store_domain("decade", vec![num(1710.0)]);
        assert_eq!(state.missing_domains(), vec!["author_1".to_string()]);

        state.domains.store_domain("author_1", Vec::new());
        assert!(state.missing_domains().is_empty());
    }
}
