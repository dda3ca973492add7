//! Startup hydration: restoring persisted state into the live store.
//!
//! Hydration is an explicit state machine owned by the store instance,
//! `Uninitialized -> Hydrating -> Hydrated`, with `Hydrated` terminal for
//! the process lifetime. The transition latches: a second hydration attempt
//! (or a storage layer that fires its completion path twice) cannot re-run
//! the merge or regress the state. Callers that must not block forever use
//! [`BillStore::wait_for_hydration`], which polls on a fixed interval and,
//! after a bounded number of attempts, forces the transition with whatever
//! state is present.

use crate::persist;
use crate::storage::SNAPSHOT_KEY;
use crate::store::BillStore;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};

/// Hydration progress of a store instance. Process-lifetime state, never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HydrationState {
    /// No restore attempted yet
    Uninitialized,
    /// Restore in flight
    Hydrating,
    /// Restore finished (normally or forced); terminal
    Hydrated,
}

impl BillStore {
    /// Current hydration progress.
    pub async fn hydration_state(&self) -> HydrationState {
        self.state().read().await.hydration
    }

    /// Whether the store has finished hydrating.
    pub async fn is_hydrated(&self) -> bool {
        self.hydration_state().await == HydrationState::Hydrated
    }

    /// Loads the persisted snapshot and merges it into the live state.
    ///
    /// Runs at most once per store instance: repeat calls return immediately.
    /// A missing, corrupt or version-mismatched snapshot leaves the live
    /// default in place; the store still transitions to `Hydrated` and is
    /// usable (degraded, possibly empty).
    pub async fn hydrate(&self) {
        {
            let mut state = self.state().write().await;
            if state.hydration != HydrationState::Uninitialized {
                info!("Ignoring duplicate hydration attempt");
                return;
            }
            state.hydration = HydrationState::Hydrating;
        }
        info!("Hydration starting");

        let snapshot = match self.storage().get(SNAPSHOT_KEY).await {
            Ok(Some(raw)) => persist::decode(&raw),
            Ok(None) => {
                info!("No persisted state found, starting fresh");
                None
            }
            Err(e) => {
                error!("Error reading persisted state: {e}");
                None
            }
        };
        let restored = snapshot.is_some();

        {
            let mut state = self.state().write().await;
            // A bounded wait may have forced the transition while the read
            // was in flight; the latch wins and the late result is dropped.
            if state.hydration == HydrationState::Hydrated {
                warn!("Hydration already forced, dropping late snapshot");
                return;
            }
            let live = std::mem::take(&mut *state);
            *state = persist::merge(snapshot, live);
            state.hydration = HydrationState::Hydrated;
        }

        if restored {
            info!("State rehydrated successfully");
        }
        self.commit().await;
    }

    /// Waits until the store is hydrated, polling every `interval` for at
    /// most `max_attempts` rounds. On timeout the transition is forced and
    /// the store proceeds with its current (possibly empty) state.
    ///
    /// Returns `true` when hydration completed normally, `false` when it was
    /// forced.
    pub async fn wait_for_hydration(&self, interval: Duration, max_attempts: u32) -> bool {
        for _ in 0..max_attempts {
            if self.is_hydrated().await {
                return true;
            }
            tokio::time::sleep(interval).await;
        }
        if self.is_hydrated().await {
            return true;
        }

        warn!("Hydration timed out, proceeding with best-effort state");
        self.force_hydrated().await;
        false
    }

    /// Marks the store hydrated with whatever state it currently holds.
    async fn force_hydrated(&self) {
        let mut state = self.state().write().await;
        if state.hydration != HydrationState::Hydrated {
            state.hydration = HydrationState::Hydrated;
        }
    }
}
