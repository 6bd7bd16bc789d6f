use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn, Instrument};

use super::cache::{CacheEntry, InteractionCache};
use super::pairs::ItemPair;
use crate::client::InteractionLookup;
use crate::config::RefreshPolicy;
use crate::error::{Result, RxMatrixError};
use crate::models::{InteractionRecord, PairKey};

pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Refreshing,
}

/// Completion message sent by a lookup task back to its coordinator.
#[derive(Debug)]
pub struct LookupOutcome {
    pub generation: u64,
    pub key: PairKey,
    pub result: Result<Option<InteractionRecord>>,
}

/// Keeps the interaction cache in line with the current pair list.
///
/// Every call to [`refresh`](Self::refresh) mints a new generation. Lookups
/// run as independent tokio tasks and report back over a channel; the owner
/// merges them through [`poll`](Self::poll) or [`settle`](Self::settle), and
/// only outcomes carrying the current generation are merged. Late results
/// from an abandoned generation are dropped on arrival.
pub struct RefreshCoordinator {
    lookup: Arc<dyn InteractionLookup>,
    policy: RefreshPolicy,
    timeout: Duration,
    generation: u64,
    cache: InteractionCache,
    pending: HashSet<PairKey>,
    dispatched: u64,
    tx: mpsc::UnboundedSender<LookupOutcome>,
    rx: mpsc::UnboundedReceiver<LookupOutcome>,
}

impl RefreshCoordinator {
    pub fn new(lookup: Arc<dyn InteractionLookup>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            lookup,
            policy: RefreshPolicy::default(),
            timeout: DEFAULT_LOOKUP_TIMEOUT,
            generation: 0,
            cache: InteractionCache::new(),
            pending: HashSet::new(),
            dispatched: 0,
            tx,
            rx,
        }
    }

    pub fn with_policy(mut self, policy: RefreshPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Starts a new refresh cycle for `pairs` and returns its generation.
    ///
    /// An empty pair list clears the cache synchronously without touching the
    /// network. Must be called from within a tokio runtime.
    pub fn refresh(&mut self, pairs: &[ItemPair]) -> u64 {
        self.generation += 1;
        let generation = self.generation;

        if pairs.is_empty() {
            let dropped = self.pending.len();
            self.pending.clear();
            self.cache.clear();
            debug!(generation, dropped_pending = dropped, "Pair list empty, cache cleared");
            return generation;
        }

        let to_fetch: Vec<&ItemPair> = match self.policy {
            RefreshPolicy::Replace => {
                self.cache.clear();
                pairs.iter().collect()
            }
            RefreshPolicy::Diff => {
                let keep: HashSet<PairKey> = pairs.iter().map(|p| p.key.clone()).collect();
                let evicted = self.cache.retain_keys(&keep);
                if evicted > 0 {
                    debug!(generation, evicted, "Evicted cache entries for deselected pairs");
                }
                pairs
                    .iter()
                    .filter(|pair| !self.cache.contains(&pair.key))
                    .collect()
            }
        };

        self.pending = to_fetch.iter().map(|pair| pair.key.clone()).collect();

        info!(
            generation,
            pairs = pairs.len(),
            lookups = to_fetch.len(),
            policy = %self.policy,
            "Refreshing interaction matrix"
        );

        for pair in to_fetch {
            self.dispatch(generation, pair);
        }

        generation
    }

    fn dispatch(&mut self, generation: u64, pair: &ItemPair) {
        let lookup = Arc::clone(&self.lookup);
        let tx = self.tx.clone();
        let timeout = self.timeout;
        let key = pair.key.clone();
        let id_a = pair.first.id.clone();
        let id_b = pair.second.id.clone();

        self.dispatched += 1;

        let task = async move {
            let result =
                match tokio::time::timeout(timeout, lookup.fetch_interaction(&id_a, &id_b)).await {
                    Ok(result) => result,
                    Err(_) => Err(RxMatrixError::Timeout(timeout)),
                };

            if tx
                .send(LookupOutcome {
                    generation,
                    key,
                    result,
                })
                .is_err()
            {
                debug!(generation, "Coordinator dropped before lookup completed");
            }
        };
        tokio::spawn(task.in_current_span());
    }

    /// Merges one outcome. Returns `true` if it landed in the cache.
    pub fn apply(&mut self, outcome: LookupOutcome) -> bool {
        let LookupOutcome {
            generation,
            key,
            result,
        } = outcome;

        if generation != self.generation {
            debug!(
                pair_key = %key,
                generation,
                current = self.generation,
                "Discarding lookup from superseded generation"
            );
            return false;
        }

        if !self.pending.remove(&key) {
            debug!(pair_key = %key, generation, "Ignoring outcome for pair that is not pending");
            return false;
        }

        let entry = match result {
            Ok(Some(record)) => CacheEntry::Found(Arc::new(record)),
            Ok(None) => CacheEntry::NoInteraction,
            Err(e) => {
                warn!(pair_key = %key, generation, error = %e, "Interaction lookup failed");
                CacheEntry::LookupFailed(e.to_string())
            }
        };
        self.cache.insert(key, entry);

        if self.pending.is_empty() {
            info!(generation, cached = self.cache.len(), "Interaction refresh settled");
        }

        true
    }

    /// Merges every outcome that has already arrived, without waiting.
    /// Returns how many were merged.
    pub fn poll(&mut self) -> usize {
        let mut merged = 0;
        while let Ok(outcome) = self.rx.try_recv() {
            if self.apply(outcome) {
                merged += 1;
            }
        }
        merged
    }

    /// Waits for the next outcome from any generation and merges it if it is
    /// current. Returns whether it was merged.
    pub async fn next_outcome(&mut self) -> bool {
        match self.rx.recv().await {
            Some(outcome) => self.apply(outcome),
            None => false,
        }
    }

    /// Waits until every lookup of the current generation has settled.
    pub async fn settle(&mut self) {
        while !self.pending.is_empty() {
            match self.rx.recv().await {
                Some(outcome) => {
                    self.apply(outcome);
                }
                None => break,
            }
        }
    }

    pub fn state(&self) -> RefreshState {
        if self.pending.is_empty() {
            RefreshState::Idle
        } else {
            RefreshState::Refreshing
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True while `key` is absent from the cache and still awaited in the
    /// current generation.
    pub fn is_loading(&self, key: &PairKey) -> bool {
        self.pending.contains(key)
    }

    pub fn cache(&self) -> &InteractionCache {
        &self.cache
    }

    /// Total lookups issued over the coordinator's lifetime.
    pub fn dispatched_lookups(&self) -> u64 {
        self.dispatched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CanonicalItem, EvidenceGrade, ItemType, Severity};
    use crate::session::pairs::build_pairs;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    type Responder = oneshot::Sender<Result<Option<InteractionRecord>>>;

    /// Lookup whose calls stay open until the test answers them.
    #[derive(Default)]
    struct ManualLookup {
        waiting: Mutex<Vec<(PairKey, Responder)>>,
        calls: AtomicUsize,
    }

    impl ManualLookup {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        async fn wait_for_calls(&self, n: usize) {
            while self.waiting.lock().unwrap().len() < n {
                tokio::task::yield_now().await;
            }
        }

        /// Answers the oldest open call for `key`.
        fn resolve(&self, key: &PairKey, result: Result<Option<InteractionRecord>>) {
            let mut waiting = self.waiting.lock().unwrap();
            let index = waiting
                .iter()
                .position(|(k, _)| k == key)
                .expect("no open call for key");
            let (_, responder) = waiting.remove(index);
            let _ = responder.send(result);
        }
    }

    #[async_trait]
    impl InteractionLookup for ManualLookup {
        async fn fetch_interaction(
            &self,
            id_a: &str,
            id_b: &str,
        ) -> Result<Option<InteractionRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (tx, rx) = oneshot::channel();
            self.waiting
                .lock()
                .unwrap()
                .push((PairKey::new(id_a, id_b), tx));
            rx.await
                .unwrap_or_else(|_| Err(RxMatrixError::Internal("responder dropped".to_string())))
        }
    }

    /// Lookup answering immediately from a fixed table.
    struct TableLookup {
        records: HashMap<PairKey, Result<Option<InteractionRecord>>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl InteractionLookup for TableLookup {
        async fn fetch_interaction(
            &self,
            id_a: &str,
            id_b: &str,
        ) -> Result<Option<InteractionRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.records.get(&PairKey::new(id_a, id_b)) {
                Some(Ok(record)) => Ok(record.clone()),
                Some(Err(e)) => Err(RxMatrixError::Upstream(e.to_string())),
                None => Ok(None),
            }
        }
    }

    fn item(id: &str, display: &str) -> CanonicalItem {
        CanonicalItem::new(id, display, ItemType::Drug)
    }

    fn record(a: &str, b: &str, severity: Severity) -> InteractionRecord {
        InteractionRecord {
            item_a: a.to_string(),
            item_b: b.to_string(),
            severity,
            guidance: format!("{a} with {b}"),
            mechanism: None,
            evidence: EvidenceGrade::B,
            sources: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_empty_pair_list_clears_cache_synchronously() {
        let lookup = Arc::new(ManualLookup::default());
        let mut coordinator = RefreshCoordinator::new(lookup.clone());

        let pairs = build_pairs(&[item("w", "Warfarin"), item("a", "Aspirin")]);
        coordinator.refresh(&pairs);
        lookup.wait_for_calls(1).await;
        lookup.resolve(&PairKey::new("w", "a"), Ok(None));
        coordinator.settle().await;
        assert_eq!(coordinator.cache().len(), 1);

        coordinator.refresh(&[]);
        assert!(coordinator.cache().is_empty());
        assert_eq!(coordinator.state(), RefreshState::Idle);
        assert_eq!(lookup.calls(), 1);
    }

    #[tokio::test]
    async fn test_late_result_after_clear_is_ignored() {
        let lookup = Arc::new(ManualLookup::default());
        let mut coordinator = RefreshCoordinator::new(lookup.clone());

        coordinator.refresh(&build_pairs(&[item("w", "Warfarin"), item("a", "Aspirin")]));
        lookup.wait_for_calls(1).await;
        coordinator.refresh(&[]);

        lookup.resolve(
            &PairKey::new("w", "a"),
            Ok(Some(record("w", "a", Severity::Major))),
        );
        assert!(!coordinator.next_outcome().await);
        assert!(coordinator.cache().is_empty());
    }

    #[tokio::test]
    async fn test_superseded_generation_is_discarded() {
        let lookup = Arc::new(ManualLookup::default());
        let mut coordinator = RefreshCoordinator::new(lookup.clone());
        let ab = PairKey::new("a", "b");

        let first = coordinator.refresh(&build_pairs(&[item("a", "A"), item("b", "B")]));
        lookup.wait_for_calls(1).await;

        let second =
            coordinator.refresh(&build_pairs(&[item("a", "A"), item("b", "B"), item("c", "C")]));
        assert!(second > first);
        lookup.wait_for_calls(4).await;

        // Oldest open A-B call belongs to the first generation.
        lookup.resolve(&ab, Ok(Some(record("a", "b", Severity::Contraindicated))));
        assert!(!coordinator.next_outcome().await);
        assert!(coordinator.cache().get(&ab).is_none());
        assert!(coordinator.is_loading(&ab));
        assert_eq!(coordinator.state(), RefreshState::Refreshing);

        lookup.resolve(&ab, Ok(None));
        lookup.resolve(&PairKey::new("a", "c"), Ok(None));
        lookup.resolve(&PairKey::new("b", "c"), Ok(Some(record("b", "c", Severity::Minor))));
        coordinator.settle().await;

        assert_eq!(coordinator.state(), RefreshState::Idle);
        assert_eq!(coordinator.cache().get(&ab), Some(&CacheEntry::NoInteraction));
        assert_eq!(coordinator.cache().len(), 3);
    }

    #[tokio::test]
    async fn test_failure_is_isolated_to_its_pair() {
        let mut records = HashMap::new();
        records.insert(
            PairKey::new("w", "a"),
            Err(RxMatrixError::Upstream("503".to_string())),
        );
        records.insert(
            PairKey::new("w", "g"),
            Ok(Some(record("w", "g", Severity::Moderate))),
        );
        let lookup = Arc::new(TableLookup {
            records,
            calls: AtomicUsize::new(0),
        });
        let mut coordinator = RefreshCoordinator::new(lookup.clone());

        coordinator.refresh(&build_pairs(&[
            item("w", "Warfarin"),
            item("a", "Aspirin"),
            item("g", "Ginkgo"),
        ]));
        coordinator.settle().await;

        let cache = coordinator.cache();
        assert!(cache.get(&PairKey::new("w", "a")).unwrap().is_failure());
        assert_eq!(
            cache.get(&PairKey::new("w", "g")).unwrap().record().unwrap().severity,
            Severity::Moderate
        );
        assert_eq!(cache.get(&PairKey::new("a", "g")), Some(&CacheEntry::NoInteraction));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_lookup_times_out_as_failure() {
        let lookup = Arc::new(ManualLookup::default());
        let mut coordinator =
            RefreshCoordinator::new(lookup.clone()).with_timeout(Duration::from_secs(10));
        let key = PairKey::new("w", "a");

        coordinator.refresh(&build_pairs(&[item("w", "Warfarin"), item("a", "Aspirin")]));
        coordinator.settle().await;

        match coordinator.cache().get(&key) {
            Some(CacheEntry::LookupFailed(reason)) => assert!(reason.contains("timed out")),
            other => panic!("expected timeout failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_diff_policy_only_fetches_new_pairs() {
        let lookup = Arc::new(TableLookup {
            records: HashMap::new(),
            calls: AtomicUsize::new(0),
        });
        let mut coordinator =
            RefreshCoordinator::new(lookup.clone()).with_policy(RefreshPolicy::Diff);

        coordinator.refresh(&build_pairs(&[item("a", "A"), item("b", "B")]));
        coordinator.settle().await;
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);

        coordinator.refresh(&build_pairs(&[item("a", "A"), item("b", "B"), item("c", "C")]));
        coordinator.settle().await;
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 3);
        assert_eq!(coordinator.cache().len(), 3);

        coordinator.refresh(&build_pairs(&[item("a", "A"), item("c", "C")]));
        assert_eq!(coordinator.state(), RefreshState::Idle);
        assert_eq!(coordinator.cache().len(), 1);
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_replace_policy_refetches_everything() {
        let lookup = Arc::new(TableLookup {
            records: HashMap::new(),
            calls: AtomicUsize::new(0),
        });
        let mut coordinator = RefreshCoordinator::new(lookup.clone());

        coordinator.refresh(&build_pairs(&[item("a", "A"), item("b", "B")]));
        coordinator.settle().await;
        coordinator.refresh(&build_pairs(&[item("a", "A"), item("b", "B"), item("c", "C")]));
        coordinator.settle().await;

        assert_eq!(lookup.calls.load(Ordering::SeqCst), 4);
        assert_eq!(coordinator.dispatched_lookups(), 4);
    }
}
