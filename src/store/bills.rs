//! Bill repository operations: create, update, delete.
//!
//! Mutations land in memory first, then write through to storage and drive
//! the reminder scheduler. An update always cancels the bill's previous
//! reminders before rescheduling from the new fields, so a stale schedule
//! referencing an old due day can never survive.

use crate::errors::{Error, Result};
use crate::models::Bill;
use crate::store::BillStore;
use crate::validate::{BillDraft, BillPatch, check_draft};
use chrono::Utc;
use tracing::{debug, info};

impl BillStore {
    /// Creates a bill from validated fields, assigns a fresh id and
    /// schedules a reminder for the store's current period.
    pub async fn create_bill(&self, draft: BillDraft) -> Result<Bill> {
        check_draft(&draft)?;

        let now = Utc::now();
        let bill = Bill {
            id: Bill::generate_id(now),
            name: draft.name,
            description: draft.description,
            amount: draft.amount,
            due_day: draft.due_day,
            reminder_days: draft.reminder_days,
            category: draft.category,
            color: Some(draft.color),
            created_at: now,
            updated_at: now,
        };

        let current_period = {
            let mut state = self.state().write().await;
            state.bills.insert(bill.id.clone(), bill.clone());
            state.current_period
        };
        info!(bill_id = %bill.id, name = %bill.name, "Bill created");
        self.commit().await;

        self.scheduler()
            .schedule_reminder(&bill, current_period)
            .await;

        Ok(bill)
    }

    /// Applies a partial update to an existing bill and bumps `updated_at`.
    /// Previously scheduled reminders are canceled and rescheduled from the
    /// updated fields for the current period.
    pub async fn update_bill(&self, bill_id: &str, patch: BillPatch) -> Result<Bill> {
        patch.validate()?;

        let (updated, current_period) = {
            let mut state = self.state().write().await;
            let current_period = state.current_period;
            let bill = state
                .bills
                .get_mut(bill_id)
                .ok_or_else(|| Error::NotFound {
                    bill_id: bill_id.to_string(),
                })?;

            if let Some(name) = patch.name {
                bill.name = name.trim().to_string();
            }
            if let Some(description) = patch.description {
                bill.description = description;
            }
            if let Some(amount) = patch.amount {
                bill.amount = amount;
            }
            if let Some(due_day) = patch.due_day {
                bill.due_day = due_day;
            }
            if let Some(reminder_days) = patch.reminder_days {
                bill.reminder_days = reminder_days;
            }
            if let Some(category) = patch.category {
                bill.category = category;
            }
            if let Some(color) = patch.color {
                bill.color = Some(color);
            }
            bill.updated_at = Utc::now();

            (bill.clone(), current_period)
        };
        info!(%bill_id, "Bill updated");
        self.commit().await;

        self.scheduler().cancel_reminders(bill_id).await;
        self.scheduler()
            .schedule_reminder(&updated, current_period)
            .await;

        Ok(updated)
    }

    /// Deletes a bill, purges its overrides from every period and clears its
    /// reminders. Deleting an unknown id is an idempotent no-op.
    pub async fn delete_bill(&self, bill_id: &str) {
        let removed = {
            let mut state = self.state().write().await;
            let removed = state.bills.remove(bill_id).is_some();
            if removed {
                for status in state.monthly_status.values_mut() {
                    status.overrides.remove(bill_id);
                }
            }
            removed
        };

        if removed {
            info!(%bill_id, "Bill deleted");
            self.commit().await;
        } else {
            debug!(%bill_id, "Delete of unknown bill ignored");
        }

        // Cancel regardless: a token table entry must not outlive the bill.
        self.scheduler().cancel_reminders(bill_id).await;
    }
}
