//! Per-user session state: selection, suggestions and the interaction matrix.
//!
//! All mutation goes through `&mut Session` on one task. The only concurrency
//! is the fan-out of lookups, whose results come back over channels and are
//! merged here.

mod cache;
mod coordinator;
mod debounce;
mod pairs;
mod selection;

use std::sync::Arc;

use tracing::{debug, info, info_span, Instrument, Span};
use uuid::Uuid;

use crate::client::{InteractionLookup, SuggestionSource};
use crate::config::ClientConfig;
use crate::models::{CanonicalItem, PairKey};
use crate::view::{DetailView, MatrixView};

pub use cache::{CacheEntry, InteractionCache};
pub use coordinator::{LookupOutcome, RefreshCoordinator, RefreshState, DEFAULT_LOOKUP_TIMEOUT};
pub use debounce::{Debouncer, DEFAULT_QUIET_WINDOW};
pub use pairs::{build_pairs, display_order, pair_keys, ItemPair};
pub use selection::SelectionSet;

pub struct Session {
    id: Uuid,
    span: Span,
    selection: SelectionSet,
    pairs: Vec<ItemPair>,
    coordinator: RefreshCoordinator,
    normalizer: Arc<dyn SuggestionSource>,
    search: Debouncer<Vec<CanonicalItem>>,
    suggestions: Vec<CanonicalItem>,
}

impl Session {
    pub fn new(
        normalizer: Arc<dyn SuggestionSource>,
        lookup: Arc<dyn InteractionLookup>,
        config: &ClientConfig,
    ) -> Self {
        let id = Uuid::new_v4();
        let span = info_span!("session", session_id = %id);
        span.in_scope(|| info!(policy = %config.refresh_policy, "Session started"));

        let coordinator = RefreshCoordinator::new(lookup)
            .with_policy(config.refresh_policy)
            .with_timeout(config.request_timeout());

        Self {
            id,
            span,
            selection: SelectionSet::new(),
            pairs: Vec::new(),
            coordinator,
            normalizer,
            search: Debouncer::new(config.search_debounce()),
            suggestions: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Search box edited. The lookup only runs once typing pauses for the
    /// quiet window.
    pub fn search_query_changed(&mut self, text: &str) {
        let _span = self.span.clone().entered();
        let normalizer = Arc::clone(&self.normalizer);
        let query = text.to_string();
        let ticket = self
            .search
            .schedule(async move { normalizer.normalize(&query).await }.in_current_span());
        debug!(ticket, "Search scheduled");
    }

    /// A suggestion was picked. Returns `false` when it was already selected,
    /// in which case nothing is refreshed.
    pub fn item_chosen(&mut self, item: CanonicalItem) -> bool {
        let _span = self.span.clone().entered();
        let id = item.id.clone();
        if !self.selection.add(item) {
            debug!(item_id = %id, "Item already selected");
            return false;
        }
        info!(item_id = %id, selected = self.selection.len(), "Item added");
        self.suggestions.clear();
        self.recompute();
        true
    }

    /// A chip was removed. Returns `false` when the id was not selected.
    pub fn item_removed(&mut self, id: &str) -> bool {
        let _span = self.span.clone().entered();
        if !self.selection.remove(id) {
            return false;
        }
        info!(item_id = %id, selected = self.selection.len(), "Item removed");
        self.recompute();
        true
    }

    /// Detail view for a matrix cell; `None` for cells without a record or
    /// for pairs that are no longer selected.
    pub fn cell_clicked(&self, key: &PairKey) -> Option<DetailView> {
        let pair = self.pairs.iter().find(|pair| &pair.key == key)?;
        let record = self.coordinator.cache().get(key)?.record()?;
        Some(DetailView::new(
            &pair.first.display,
            &pair.second.display,
            record,
        ))
    }

    fn recompute(&mut self) {
        self.pairs = build_pairs(self.selection.items());
        self.coordinator.refresh(&self.pairs);
    }

    /// Merges whatever lookups and suggestions have arrived, without waiting.
    pub fn poll(&mut self) {
        let _span = self.span.clone().entered();
        self.coordinator.poll();
        if let Some(suggestions) = self.search.try_next() {
            self.suggestions = suggestions;
        }
    }

    /// Waits for the current search to finish and returns its suggestions.
    pub async fn await_suggestions(&mut self) -> &[CanonicalItem] {
        if let Some(suggestions) = self.search.next().await {
            self.suggestions = suggestions;
        }
        &self.suggestions
    }

    /// Waits until the current refresh generation has settled.
    pub async fn settle(&mut self) {
        let span = self.span.clone();
        self.coordinator.settle().instrument(span).await;
    }

    pub fn matrix(&self) -> MatrixView {
        MatrixView::build(&self.selection, &self.coordinator)
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn pairs(&self) -> &[ItemPair] {
        &self.pairs
    }

    pub fn suggestions(&self) -> &[CanonicalItem] {
        &self.suggestions
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    pub fn state(&self) -> RefreshState {
        self.coordinator.state()
    }
}
