//! Reminder scheduling against an opaque notification capability.
//!
//! Delivery itself is out of scope: the OS/notification subsystem is modeled
//! as a [`NotificationBackend`] that can schedule a payload for a future
//! instant and later cancel it by token. [`NotificationScheduler`] computes
//! reminder instants from bill due dates, persists the returned tokens per
//! bill (under their own storage key, separate from the state snapshot) and
//! cancels them when bills are paid, changed, or deleted.
//!
//! Every failure in this module is logged and swallowed: losing a reminder
//! is recoverable and must never make the owning CRUD operation fail.

use crate::errors::Result;
use crate::models::Bill;
use crate::period::Period;
use crate::storage::{NOTIFICATION_TOKEN_KEY, StorageBackend};
use async_trait::async_trait;
use chrono::{DateTime, Days, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Payload handed to the notification capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderContent {
    /// Notification title, e.g. `"Reminder: Rent due soon"`
    pub title: String,
    /// Notification body with amount and due date
    pub body: String,
    /// Id of the bill the reminder belongs to
    pub bill_id: String,
}

/// The external notification capability: schedule/cancel, both asynchronous
/// and independently fallible.
#[async_trait]
pub trait NotificationBackend: Send + Sync {
    /// Schedules `content` for delivery at `at` and returns an opaque
    /// cancellation token.
    async fn schedule(&self, content: ReminderContent, at: DateTime<Utc>) -> Result<String>;

    /// Cancels a previously scheduled notification.
    async fn cancel(&self, token: &str) -> Result<()>;
}

/// Map from bill id to outstanding scheduler tokens, persisted as JSON.
type TokenTable = BTreeMap<String, Vec<String>>;

/// Schedules and cancels bill reminders, tracking tokens per bill.
pub struct NotificationScheduler {
    backend: Arc<dyn NotificationBackend>,
    storage: Arc<dyn StorageBackend>,
}

impl NotificationScheduler {
    /// Builds a scheduler over the given capability and token storage.
    #[must_use]
    pub fn new(backend: Arc<dyn NotificationBackend>, storage: Arc<dyn StorageBackend>) -> Self {
        Self { backend, storage }
    }

    /// Schedules a reminder for `bill` in `period`: due date minus
    /// `reminder_days`. Silently does nothing when that instant is not
    /// strictly in the future.
    pub async fn schedule_reminder(&self, bill: &Bill, period: Period) {
        let due_date = period.due_date(bill.due_day);
        let Some(reminder_date) = due_date.checked_sub_days(Days::new(u64::from(bill.reminder_days)))
        else {
            warn!(bill_id = %bill.id, "Reminder date out of calendar range, skipping");
            return;
        };
        let reminder_at = reminder_date
            .and_hms_opt(0, 0, 0)
            .map_or_else(Utc::now, |naive| naive.and_utc());

        if reminder_at <= Utc::now() {
            debug!(
                bill_id = %bill.id,
                %period,
                "Reminder instant already passed, not scheduling"
            );
            return;
        }

        let content = ReminderContent {
            title: format!("Reminder: {} due soon", bill.name),
            body: format!(
                "{} for ${:.2} is due on {}",
                bill.name,
                bill.amount,
                due_date.format("%B %-d")
            ),
            bill_id: bill.id.clone(),
        };

        let token = match self.backend.schedule(content, reminder_at).await {
            Ok(token) => token,
            Err(e) => {
                error!(bill_id = %bill.id, "Error scheduling notification: {e}");
                return;
            }
        };

        let mut table = self.load_token_table().await;
        table.entry(bill.id.clone()).or_default().push(token);
        self.store_token_table(&table).await;
        info!(bill_id = %bill.id, %period, "Scheduled reminder");
    }

    /// Cancels every outstanding reminder for `bill_id`. Individual cancel
    /// failures are logged and skipped; the token list entry is removed
    /// regardless of individual outcomes.
    pub async fn cancel_reminders(&self, bill_id: &str) {
        let mut table = self.load_token_table().await;
        let Some(tokens) = table.remove(bill_id) else {
            return;
        };

        for token in &tokens {
            if let Err(e) = self.backend.cancel(token).await {
                error!(%bill_id, %token, "Error cancelling notification: {e}");
            }
        }

        self.store_token_table(&table).await;
        debug!(%bill_id, count = tokens.len(), "Cleared reminder tokens");
    }

    /// Bulk-schedules reminders for every bill, used by import paths.
    pub async fn reschedule_all<'a, I>(&self, bills: I, period: Period)
    where
        I: IntoIterator<Item = &'a Bill>,
    {
        for bill in bills {
            self.schedule_reminder(bill, period).await;
        }
    }

    /// Outstanding tokens for a bill. Empty when nothing is scheduled.
    pub async fn outstanding_tokens(&self, bill_id: &str) -> Vec<String> {
        self.load_token_table()
            .await
            .remove(bill_id)
            .unwrap_or_default()
    }

    // A corrupt or unreadable token table degrades to empty: the worst case
    // is a duplicate or orphaned reminder, never a failed mutation.
    async fn load_token_table(&self) -> TokenTable {
        let raw = match self.storage.get(NOTIFICATION_TOKEN_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return TokenTable::new(),
            Err(e) => {
                error!("Error reading notification token table: {e}");
                return TokenTable::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(table) => table,
            Err(e) => {
                warn!("Corrupt notification token table, resetting: {e}");
                TokenTable::new()
            }
        }
    }

    async fn store_token_table(&self, table: &TokenTable) {
        let encoded = match serde_json::to_string(table) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!("Error encoding notification token table: {e}");
                return;
            }
        };
        if let Err(e) = self.storage.set(NOTIFICATION_TOKEN_KEY, &encoded).await {
            error!("Error persisting notification token table: {e}");
        }
    }
}
