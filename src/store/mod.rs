//! The bill store - single owner of all persisted state.
//!
//! [`BillStore`] is constructed once at process start with its storage and
//! notification capabilities injected, and passed to consumers explicitly;
//! there is no ambient global. UI layers observe changes through
//! [`BillStore::subscribe`], a revision counter bumped after every committed
//! mutation.
//!
//! Every mutation follows the same shape: apply to the in-memory state under
//! the write lock (this always completes and is visible first), then
//! write-through persist the snapshot, then run notification side effects.
//! Persistence and notification failures are logged and swallowed; the
//! in-memory state stays authoritative for the rest of the process. Because
//! side effects are awaited in the caller's own task, operations against the
//! same bill apply in invocation order and a delete issued after an update
//! can never resurrect the bill.

use crate::models::{Bill, MonthlyStatus};
use crate::notify::{NotificationBackend, NotificationScheduler};
use crate::period::Period;
use crate::persist::{self, Snapshot};
use crate::storage::{SNAPSHOT_KEY, StorageBackend};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{RwLock, watch};
use tracing::{error, info};

/// Bill CRUD operations
mod bills;
/// Per-month paid/unpaid and amount overrides
mod status;
/// Derived views: effective bills, history, stats
mod projection;
/// Startup state restore and the hydration state machine
mod hydration;

pub use hydration::HydrationState;

/// The complete in-memory state owned by a [`BillStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoreState {
    /// Bill definitions keyed by id
    pub bills: BTreeMap<String, Bill>,
    /// Sparse per-period override tables keyed by period
    pub monthly_status: BTreeMap<Period, MonthlyStatus>,
    /// The period the UI is currently looking at
    pub current_period: Period,
    /// Process-lifetime hydration progress, never persisted
    pub hydration: HydrationState,
}

impl StoreState {
    /// Fresh empty state pointed at `current_period`.
    #[must_use]
    pub fn empty(current_period: Period) -> Self {
        Self {
            bills: BTreeMap::new(),
            monthly_status: BTreeMap::new(),
            current_period,
            hydration: HydrationState::Uninitialized,
        }
    }
}

impl Default for StoreState {
    fn default() -> Self {
        Self::empty(Period::current())
    }
}

/// The recurring-bill store: repository, status table, projection queries
/// and the hydration machine, over injected capabilities.
pub struct BillStore {
    state: RwLock<StoreState>,
    storage: Arc<dyn StorageBackend>,
    scheduler: NotificationScheduler,
    revision: watch::Sender<u64>,
}

impl BillStore {
    /// Builds a store with empty state for the current calendar month.
    /// Call [`BillStore::hydrate`] afterwards to restore persisted state.
    #[must_use]
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        notifier: Arc<dyn NotificationBackend>,
    ) -> Self {
        let scheduler = NotificationScheduler::new(notifier, Arc::clone(&storage));
        let (revision, _) = watch::channel(0);
        Self {
            state: RwLock::new(StoreState::default()),
            storage,
            scheduler,
            revision,
        }
    }

    /// A receiver that yields whenever committed state changes. The value is
    /// a monotonically increasing revision; UI layers re-query projections
    /// when it moves.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// The period the store currently points at.
    pub async fn current_period(&self) -> Period {
        self.state.read().await.current_period
    }

    /// Moves the current-period pointer (month selector).
    pub async fn set_current_period(&self, period: Period) {
        {
            let mut state = self.state.write().await;
            if state.current_period == period {
                return;
            }
            state.current_period = period;
        }
        info!(%period, "Current period changed");
        self.commit().await;
    }

    /// All bill definitions, unordered beyond id order.
    pub async fn bills(&self) -> Vec<Bill> {
        self.state.read().await.bills.values().cloned().collect()
    }

    /// Looks up a single bill by id.
    pub async fn bill(&self, bill_id: &str) -> Option<Bill> {
        self.state.read().await.bills.get(bill_id).cloned()
    }

    pub(crate) fn scheduler(&self) -> &NotificationScheduler {
        &self.scheduler
    }

    pub(crate) fn state(&self) -> &RwLock<StoreState> {
        &self.state
    }

    pub(crate) fn storage(&self) -> &Arc<dyn StorageBackend> {
        &self.storage
    }

    /// Bumps the revision and fires the write-through persist. Called after
    /// every committed mutation.
    pub(crate) async fn commit(&self) {
        self.revision.send_modify(|rev| *rev += 1);
        self.persist_snapshot().await;
    }

    /// Serializes the current state and writes it under [`SNAPSHOT_KEY`].
    /// Failures are logged; the in-memory state remains the source of truth.
    async fn persist_snapshot(&self) {
        let snapshot = {
            let state = self.state.read().await;
            Snapshot::from_state(&state)
        };
        let encoded = match persist::encode(&snapshot) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!("Error encoding state snapshot: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.set(SNAPSHOT_KEY, &encoded).await {
            error!("Error persisting state snapshot: {e}");
        }
    }
}
