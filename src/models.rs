//! Data model for recurring bills and their per-month payment state.
//!
//! [`Bill`] and [`MonthlyStatus`] are the persisted entities, owned by the
//! store. [`BillWithStatus`], [`MonthlyStats`] and [`HistoryEntry`] are
//! derived views computed per query by the projection engine and never
//! persisted or cached.

use crate::period::Period;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A recurring monthly bill definition.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Bill {
    /// Opaque unique identifier, assigned at creation, immutable
    pub id: String,
    /// Display name, non-empty
    pub name: String,
    /// Optional free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Base monthly amount, non-negative
    pub amount: f64,
    /// Day of month the bill recurs on (1-31); short months clamp
    pub due_day: u8,
    /// Days before the due date to fire a reminder (0-30)
    pub reminder_days: u8,
    /// Optional category for grouping, display only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Optional display color, not used in projection logic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Set once at creation
    pub created_at: DateTime<Utc>,
    /// Bumped on every mutation
    pub updated_at: DateTime<Utc>,
}

impl Bill {
    /// Generates a fresh bill id: millisecond timestamp plus two independent
    /// random components, so rapid consecutive calls cannot collide.
    #[must_use]
    pub fn generate_id(now: DateTime<Utc>) -> String {
        let a = uuid::Uuid::new_v4().simple().to_string();
        let b = uuid::Uuid::new_v4().simple().to_string();
        format!("bill_{}_{}{}", now.timestamp_millis(), &a[..8], &b[..8])
    }
}

/// A per-period payment record superseding a bill's defaults.
///
/// An override exists only when the bill was explicitly marked paid/unpaid
/// or given a per-month amount; absence means unpaid at the base amount.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct PaymentOverride {
    /// Whether the bill is paid for this period
    pub paid: bool,
    /// When it was marked paid, `None` while unpaid
    pub paid_date: Option<DateTime<Utc>>,
    /// Per-month amount override, `None` means the base amount applies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

/// The sparse override table for a single period.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MonthlyStatus {
    /// The period this table belongs to
    pub period: Period,
    /// Overrides keyed by bill id
    #[serde(default)]
    pub overrides: BTreeMap<String, PaymentOverride>,
}

impl MonthlyStatus {
    /// An empty status table for `period`.
    #[must_use]
    pub fn empty(period: Period) -> Self {
        Self {
            period,
            overrides: BTreeMap::new(),
        }
    }
}

/// A bill merged with one period's override: the "effective" view shown to
/// users. Derived on every projection query, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct BillWithStatus {
    /// The underlying bill definition
    pub bill: Bill,
    /// Paid flag for the queried period
    pub paid: bool,
    /// When it was paid, if paid
    pub paid_date: Option<DateTime<Utc>>,
    /// Override amount for the period, or the bill's base amount
    pub actual_amount: f64,
}

/// Aggregate statistics for one period.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyStats {
    /// Sum of effective amounts across all bills
    pub total_amount: f64,
    /// Sum over the paid subset
    pub paid_amount: f64,
    /// `total_amount - paid_amount`, exact
    pub unpaid_amount: f64,
    /// Rounded 0-100; defined as 0 when there is nothing to pay
    pub paid_percentage: u8,
}

/// One entry of a bill's payment history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// The period the entry describes
    pub period: Period,
    /// Paid flag recorded for that period (false when no override exists)
    pub paid: bool,
    /// When it was paid, if paid
    pub paid_date: Option<DateTime<Utc>>,
}
