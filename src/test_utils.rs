//! Shared test utilities for `BillBuddy`.
//!
//! Provides a recording notification backend, draft/bill factories with
//! sensible defaults and the standard in-memory store setup used across the
//! unit tests.

use crate::errors::{Error, Result};
use crate::models::Bill;
use crate::notify::{NotificationBackend, ReminderContent};
use crate::period::Period;
use crate::storage::MemoryStorage;
use crate::store::BillStore;
use crate::validate::{BillDraft, DEFAULT_COLOR, DEFAULT_REMINDER_DAYS};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Initializes test tracing; safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// A notification backend that records calls and can be told to fail.
#[derive(Debug, Default)]
pub struct MockNotifier {
    scheduled: Mutex<Vec<(ReminderContent, DateTime<Utc>)>>,
    cancelled: Mutex<Vec<String>>,
    fail_schedule: AtomicBool,
    fail_cancel: AtomicBool,
    next_token: AtomicU64,
}

impl MockNotifier {
    /// A fresh recorder that succeeds on every call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything scheduled so far, in call order.
    #[must_use]
    pub fn scheduled(&self) -> Vec<(ReminderContent, DateTime<Utc>)> {
        self.scheduled.lock().expect("mock lock poisoned").clone()
    }

    /// Every token canceled so far, in call order.
    #[must_use]
    pub fn cancelled(&self) -> Vec<String> {
        self.cancelled.lock().expect("mock lock poisoned").clone()
    }

    /// Makes subsequent `schedule` calls fail.
    pub fn fail_schedules(&self, fail: bool) {
        self.fail_schedule.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent `cancel` calls fail.
    pub fn fail_cancels(&self, fail: bool) {
        self.fail_cancel.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl NotificationBackend for MockNotifier {
    async fn schedule(&self, content: ReminderContent, at: DateTime<Utc>) -> Result<String> {
        if self.fail_schedule.load(Ordering::SeqCst) {
            return Err(Error::Notification {
                message: "mock schedule failure".to_string(),
            });
        }
        self.scheduled
            .lock()
            .expect("mock lock poisoned")
            .push((content, at));
        let n = self.next_token.fetch_add(1, Ordering::SeqCst);
        Ok(format!("token_{n}"))
    }

    async fn cancel(&self, token: &str) -> Result<()> {
        if self.fail_cancel.load(Ordering::SeqCst) {
            return Err(Error::Notification {
                message: "mock cancel failure".to_string(),
            });
        }
        self.cancelled
            .lock()
            .expect("mock lock poisoned")
            .push(token.to_string());
        Ok(())
    }
}

/// Creates the standard test store: in-memory storage plus a recording
/// notifier. Returns the store and the notifier for assertions.
pub fn setup_test_store() -> (Arc<BillStore>, Arc<MockNotifier>) {
    init_test_tracing();
    let notifier = Arc::new(MockNotifier::new());
    let store = BillStore::new(
        Arc::new(MemoryStorage::new()),
        Arc::clone(&notifier) as Arc<dyn NotificationBackend>,
    );
    (Arc::new(store), notifier)
}

/// A validated draft with sensible defaults.
#[must_use]
pub fn bill_draft(name: &str, amount: f64, due_day: u8) -> BillDraft {
    BillDraft {
        name: name.to_string(),
        description: None,
        amount,
        due_day,
        reminder_days: DEFAULT_REMINDER_DAYS,
        category: None,
        color: DEFAULT_COLOR.to_string(),
    }
}

/// The scenario bill used throughout the tests: Rent, 1000, due on the 1st.
#[must_use]
pub fn rent_draft() -> BillDraft {
    bill_draft("Rent", 1000.0, 1)
}

/// A fully-built bill with the given id, for tests that bypass the store.
#[must_use]
pub fn sample_bill(id: &str, name: &str, amount: f64, due_day: u8) -> Bill {
    let now = Utc::now();
    Bill {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        amount,
        due_day,
        reminder_days: DEFAULT_REMINDER_DAYS,
        category: None,
        color: Some(DEFAULT_COLOR.to_string()),
        created_at: now,
        updated_at: now,
    }
}

/// A period safely in the future, so reminder instants always qualify.
#[must_use]
pub fn far_future_period() -> Period {
    Period::current().next().next()
}
