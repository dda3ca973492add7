//! Snapshot schema and hydration merge.
//!
//! The whole persisted state is one versioned JSON record: bills, the
//! monthly override tables and the current-period pointer. Behavior never
//! serializes; the hydration flag is process-lifetime state and is excluded
//! by construction. [`merge`] is the pure hydration-merge function: persisted
//! fields win over the live default, the hydration flag always comes from
//! the live side.

use crate::errors::Result;
use crate::models::{Bill, MonthlyStatus};
use crate::period::Period;
use crate::store::StoreState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Current snapshot schema version. Carried in every record so future
/// schema migrations are possible; no migration logic exists yet.
pub const SNAPSHOT_VERSION: u32 = 1;

/// The serialized form of the store state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Schema version, see [`SNAPSHOT_VERSION`]
    pub version: u32,
    /// Bill definitions keyed by id
    pub bills: BTreeMap<String, Bill>,
    /// Override tables keyed by canonical period string
    pub monthly_status: BTreeMap<Period, MonthlyStatus>,
    /// The period pointer at the time of the write
    pub current_period: Period,
}

impl Snapshot {
    /// Captures the persistable fields of `state`.
    #[must_use]
    pub fn from_state(state: &StoreState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            bills: state.bills.clone(),
            monthly_status: state.monthly_status.clone(),
            current_period: state.current_period,
        }
    }
}

/// Encodes a snapshot as JSON.
pub fn encode(snapshot: &Snapshot) -> Result<String> {
    serde_json::to_string(snapshot).map_err(Into::into)
}

/// Decodes a raw snapshot payload. Corrupt payloads and unknown schema
/// versions yield `None` (logged): hydration then proceeds with the live
/// default instead of failing the process.
#[must_use]
pub fn decode(raw: &str) -> Option<Snapshot> {
    let snapshot: Snapshot = match serde_json::from_str(raw) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!("Corrupt state snapshot, ignoring: {e}");
            return None;
        }
    };
    if snapshot.version != SNAPSHOT_VERSION {
        warn!(
            version = snapshot.version,
            expected = SNAPSHOT_VERSION,
            "Unknown snapshot version, ignoring"
        );
        return None;
    }
    Some(snapshot)
}

/// Overlays a persisted snapshot onto the live default state.
///
/// With no snapshot the live default passes through unchanged. With a
/// snapshot, every persisted field replaces its live counterpart; the
/// hydration flag is always taken from the live process state, never from
/// the snapshot.
#[must_use]
pub fn merge(persisted: Option<Snapshot>, live: StoreState) -> StoreState {
    match persisted {
        None => live,
        Some(snapshot) => StoreState {
            bills: snapshot.bills,
            monthly_status: snapshot.monthly_status,
            current_period: snapshot.current_period,
            hydration: live.hydration,
        },
    }
}
