//! Debounced product search.
//!
//! [`ProductSearch`] turns a stream of keystrokes into at most one request
//! per quiet period. Each request carries a sequence number; a response is
//! applied only if no newer request has been issued since, so results never
//! go backwards even when responses arrive out of order.

use log::{debug, warn};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Duration;

use crate::constants::ERROR_SEARCH_FAILED;
use crate::debounce::Debouncer;
use crate::entities::Product;
use crate::gateway::{self, CollectionQuery, Gateway, ResourceKind};
use crate::notifications::Notifier;

#[derive(Debug, Clone, PartialEq)]
pub enum SearchStatus {
    Idle,
    /// Waiting for the user to stop typing
    Pending,
    Loading,
    Ready,
    /// The last request failed; results are from an earlier one
    Failed(String),
}

/// What the results view renders
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSnapshot {
    /// Term the results belong to
    pub term: String,
    pub results: Vec<Product>,
    pub status: SearchStatus,
}

impl Default for SearchSnapshot {
    fn default() -> Self {
        Self {
            term: String::new(),
            results: Vec::new(),
            status: SearchStatus::Idle,
        }
    }
}

struct Shared {
    gateway: Arc<dyn Gateway>,
    view: watch::Sender<SearchSnapshot>,
    issued: AtomicU64,
    closed: AtomicBool,
    notifier: Notifier,
}

pub struct ProductSearch {
    shared: Arc<Shared>,
    debouncer: Debouncer,
    delay: Duration,
    term: String,
}

impl ProductSearch {
    pub fn new(gateway: Arc<dyn Gateway>, notifier: Notifier, delay: Duration) -> Self {
        let (view, _) = watch::channel(SearchSnapshot::default());
        Self {
            shared: Arc::new(Shared {
                gateway,
                view,
                issued: AtomicU64::new(0),
                closed: AtomicBool::new(false),
                notifier,
            }),
            debouncer: Debouncer::new(),
            delay,
            term: String::new(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.shared.view.subscribe()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.shared.view.borrow().clone()
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Record a keystroke. The request goes out once the term has been
    /// stable for the configured delay.
    pub fn set_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term == self.term || self.is_closed() {
            return;
        }
        self.term = term.clone();

        self.shared.view.send_modify(|view| view.status = SearchStatus::Pending);

        let shared = Arc::clone(&self.shared);
        self.debouncer.schedule(self.delay, async move {
            Self::run(shared, term).await;
        });
    }

    /// Issue the current term immediately, skipping the quiet period
    pub fn refresh_now(&mut self) {
        if self.is_closed() {
            return;
        }
        self.debouncer.cancel();
        let shared = Arc::clone(&self.shared);
        let term = self.term.clone();
        tokio::spawn(async move {
            Self::run(shared, term).await;
        });
    }

    /// A request is waiting for the quiet period to elapse
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Stop searching. In-flight responses are ignored from now on.
    pub fn shutdown(&mut self) {
        self.debouncer.cancel();
        self.shared.closed.store(true, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }

    async fn run(shared: Arc<Shared>, term: String) {
        let seq = shared.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let trimmed = term.trim();
        let query = if trimmed.is_empty() {
            CollectionQuery::all()
        } else {
            CollectionQuery::search(trimmed)
        };

        debug!("🔍 Search #{seq} for '{trimmed}'");
        shared.view.send_if_modified(|view| {
            if shared.closed.load(Ordering::SeqCst) {
                return false;
            }
            view.status = SearchStatus::Loading;
            true
        });

        let outcome = match shared.gateway.fetch_collection(ResourceKind::Products, &query, None).await {
            Ok(values) => gateway::decode_all::<Product>(values),
            Err(e) => Err(e),
        };

        // Checked inside the closure so a newer request cannot slip in between
        let applied = shared.view.send_if_modified(|view| {
            if shared.closed.load(Ordering::SeqCst) || seq != shared.issued.load(Ordering::SeqCst) {
                return false;
            }
            match &outcome {
                Ok(results) => {
                    view.term = term.clone();
                    view.results = results.clone();
                    view.status = SearchStatus::Ready;
                }
                Err(e) => view.status = SearchStatus::Failed(e.user_message()),
            }
            true
        });

        if !applied {
            debug!("Discarded stale search #{seq}");
            return;
        }
        if let Err(e) = outcome {
            warn!("⚠️  Search for '{trimmed}' failed: {e}");
            shared.notifier.error(format!("{}: {}", ERROR_SEARCH_FAILED, e.user_message()));
        }
    }
}

impl Drop for ProductSearch {
    fn drop(&mut self) {
        self.shutdown();
    }
}
