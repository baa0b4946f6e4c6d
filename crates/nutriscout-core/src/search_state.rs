// Search state - the live result list plus the last batch that actually had something in it
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    debounce::{Debouncer, DEFAULT_DEBOUNCE},
    models::Product,
    repository::ProductRepository,
};

/// Queries shorter than this never hit the network
pub const MIN_QUERY_LEN: usize = 2;

/// What to do with a search that finishes after a newer one was issued
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionOrdering {
    /// Only the most recently issued search may touch the session
    #[default]
    Sequenced,
    /// Apply completions in arrival order, stale ones included
    Unfenced,
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub debounce: Duration,
    pub min_query_len: usize,
    pub ordering: CompletionOrdering,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            min_query_len: MIN_QUERY_LEN,
            ordering: CompletionOrdering::default(),
        }
    }
}

#[derive(Debug, Default)]
struct Slots {
    current: Vec<Product>,
    last_successful: Vec<Product>,
}

/// Shared handle on the two search slots
///
/// Cheap to clone; every clone sees the same slots. The search screen writes
/// through `SearchStore`, other screens (recommendations) only read.
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    slots: Arc<RwLock<Slots>>,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Results of the latest completed search for the active query
    pub fn current(&self) -> Vec<Product> {
        self.read().current.clone()
    }

    /// Most recent non-empty result set, kept across query changes
    pub fn last_successful(&self) -> Vec<Product> {
        self.read().last_successful.clone()
    }

    /// Forget everything, e.g. on sign-out
    pub fn reset(&self) {
        *self.write() = Slots::default();
    }

    /// Clear `current`; `invalidate` runs under the same write lock
    fn clear_current(&self, invalidate: impl FnOnce()) {
        let mut slots = self.write();
        invalidate();
        slots.current.clear();
    }

    /// An empty result replaces `current` but never erases `last_successful`
    fn apply(&self, results: Vec<Product>) {
        self.apply_if(results, || true);
    }

    /// Like `apply`, but only if `still_current` holds once the lock is taken
    fn apply_if(&self, results: Vec<Product>, still_current: impl FnOnce() -> bool) -> bool {
        let mut slots = self.write();
        if !still_current() {
            return false;
        }
        if !results.is_empty() {
            slots.last_successful = results.clone();
        }
        slots.current = results;
        true
    }

    fn read(&self) -> RwLockReadGuard<'_, Slots> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slots> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }
}

struct Inner {
    repository: Arc<ProductRepository>,
    session: SearchSession,
    settings: SearchSettings,
    /// Sequence number of the latest issued search (or clear)
    issued: AtomicU64,
}

impl Inner {
    async fn run(&self, query: String) -> Vec<Product> {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Issuing search #{} for '{}'", seq, query);

        let results = self.repository.search_products(&query).await;
        self.complete(seq, results.clone());
        results
    }

    fn complete(&self, seq: u64, results: Vec<Product>) {
        if self.settings.ordering == CompletionOrdering::Unfenced {
            self.session.apply(results);
            return;
        }
        // Checked under the session lock so a concurrent clear can't slip in between
        let applied = self
            .session
            .apply_if(results, || self.issued.load(Ordering::SeqCst) == seq);
        if !applied {
            debug!("Dropping stale search #{}", seq);
        }
    }

    fn is_too_short(&self, text: &str) -> bool {
        text.chars().count() < self.settings.min_query_len
    }
}

/// Gatekeeper between the search box and the repository
///
/// Short queries clear the live results on the spot. Anything else goes
/// through the debouncer and lands in the session when the search completes.
pub struct SearchStore {
    inner: Arc<Inner>,
    debouncer: Debouncer<String>,
}

impl SearchStore {
    pub fn new(
        repository: Arc<ProductRepository>,
        session: SearchSession,
        settings: SearchSettings,
    ) -> Self {
        let debounce = settings.debounce;
        let inner = Arc::new(Inner {
            repository,
            session,
            settings,
            issued: AtomicU64::new(0),
        });

        let worker = Arc::clone(&inner);
        let debouncer = Debouncer::new(debounce, move |query: String| {
            let inner = Arc::clone(&worker);
            async move {
                inner.run(query).await;
            }
        });

        Self { inner, debouncer }
    }

    /// Feed the latest search box text
    ///
    /// Must be called from inside a tokio runtime.
    pub fn set_query(&self, text: &str) {
        if self.inner.is_too_short(text) {
            self.clear();
            return;
        }
        self.debouncer.call(text.to_string());
    }

    /// Run a search right away, skipping the debounce window
    ///
    /// Same gate and same ordering rules as `set_query`. Returns what the
    /// repository answered, even if a newer search made it stale.
    pub async fn search_now(&self, text: &str) -> Vec<Product> {
        if self.inner.is_too_short(text) {
            self.clear();
            return Vec::new();
        }
        self.debouncer.cancel();
        self.inner.run(text.to_string()).await
    }

    /// Read handle for other screens
    pub fn session(&self) -> SearchSession {
        self.inner.session.clone()
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.inner.settings
    }

    fn clear(&self) {
        self.debouncer.cancel();
        // Searches already in flight are older than this clear
        self.inner.session.clear_current(|| {
            self.inner.issued.fetch_add(1, Ordering::SeqCst);
        });
    }
}
