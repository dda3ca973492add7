//! Monthly status table operations.
//!
//! Overrides are sparse: a record exists only once a bill has been
//! explicitly marked paid/unpaid or given a per-month amount. Marking paid
//! cancels outstanding reminders; marking unpaid for the current or a future
//! period (compared by period ordering, not wall clock) reschedules one.

use crate::errors::{Error, Result};
use crate::models::{MonthlyStatus, PaymentOverride};
use crate::period::Period;
use crate::store::BillStore;
use chrono::Utc;
use tracing::info;

impl BillStore {
    /// Marks a bill paid or unpaid for `period`. `paid_date` is stamped with
    /// the current instant when paying and cleared when unpaying; an existing
    /// amount override is preserved either way.
    pub async fn set_paid(&self, bill_id: &str, period: Period, paid: bool) -> Result<()> {
        let (bill, current_period) = {
            let mut state = self.state().write().await;
            let Some(bill) = state.bills.get(bill_id).cloned() else {
                return Err(Error::NotFound {
                    bill_id: bill_id.to_string(),
                });
            };
            let current_period = state.current_period;

            let status = state
                .monthly_status
                .entry(period)
                .or_insert_with(|| MonthlyStatus::empty(period));
            let entry = status.overrides.entry(bill_id.to_string()).or_default();
            entry.paid = paid;
            entry.paid_date = if paid { Some(Utc::now()) } else { None };

            (bill, current_period)
        };
        info!(%bill_id, %period, paid, "Payment status changed");
        self.commit().await;

        if paid {
            self.scheduler().cancel_reminders(bill_id).await;
        } else if period >= current_period {
            // Coarse period-level comparison on purpose: the scheduler's own
            // future check filters out due days already passed this month.
            self.scheduler().schedule_reminder(&bill, period).await;
        }

        Ok(())
    }

    /// Sets a per-month amount override for a bill. The amount must be
    /// strictly positive; clearing an override is not supported by the data
    /// model (delete and re-mark instead).
    pub async fn set_amount_override(
        &self,
        bill_id: &str,
        period: Period,
        amount: f64,
    ) -> Result<()> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::Validation {
                field: "amount",
                message: "Amount must be greater than 0".to_string(),
            });
        }

        {
            let mut state = self.state().write().await;
            if !state.bills.contains_key(bill_id) {
                return Err(Error::NotFound {
                    bill_id: bill_id.to_string(),
                });
            }
            let status = state
                .monthly_status
                .entry(period)
                .or_insert_with(|| MonthlyStatus::empty(period));
            status
                .overrides
                .entry(bill_id.to_string())
                .or_default()
                .amount = Some(amount);
        }
        info!(%bill_id, %period, amount, "Amount override set");
        self.commit().await;

        Ok(())
    }

    /// The override recorded for `(bill_id, period)`, if any.
    pub async fn get_override(&self, bill_id: &str, period: Period) -> Option<PaymentOverride> {
        self.state()
            .read()
            .await
            .monthly_status
            .get(&period)
            .and_then(|status| status.overrides.get(bill_id))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{far_future_period, rent_draft, setup_test_store};

    #[tokio::test]
    async fn test_set_paid_records_override_with_date() -> Result<()> {
        let (store, _notifier) = setup_test_store();
        let bill = store.create_bill(rent_draft()).await?;
        let period: Period = "2024-05".parse().unwrap();

        store.set_paid(&bill.id, period, true).await?;
        let o = store.get_override(&bill.id, period).await.unwrap();
        assert!(o.paid);
        assert!(o.paid_date.is_some());

        store.set_paid(&bill.id, period, false).await?;
        let o = store.get_override(&bill.id, period).await.unwrap();
        assert!(!o.paid);
        assert!(o.paid_date.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_set_paid_is_idempotent() -> Result<()> {
        let (store, _notifier) = setup_test_store();
        let bill = store.create_bill(rent_draft()).await?;
        let period: Period = "2024-05".parse().unwrap();

        store.set_paid(&bill.id, period, true).await?;
        store.set_paid(&bill.id, period, true).await?;
        let o = store.get_override(&bill.id, period).await.unwrap();
        assert!(o.paid && o.paid_date.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_set_paid_unknown_bill_is_not_found() {
        let (store, _notifier) = setup_test_store();
        let period: Period = "2024-05".parse().unwrap();
        let err = store.set_paid("ghost", period, true).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_set_paid_preserves_amount_override() -> Result<()> {
        let (store, _notifier) = setup_test_store();
        let bill = store.create_bill(rent_draft()).await?;
        let period: Period = "2024-05".parse().unwrap();

        store.set_amount_override(&bill.id, period, 950.0).await?;
        store.set_paid(&bill.id, period, true).await?;

        let o = store.get_override(&bill.id, period).await.unwrap();
        assert!(o.paid);
        assert_eq!(o.amount, Some(950.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_paid_cancels_outstanding_reminders() -> Result<()> {
        let (store, notifier) = setup_test_store();
        store.set_current_period(far_future_period()).await;
        let bill = store.create_bill(rent_draft()).await?;
        assert_eq!(store.scheduler().outstanding_tokens(&bill.id).await.len(), 1);

        store.set_paid(&bill.id, far_future_period(), true).await?;

        assert_eq!(notifier.cancelled().len(), 1);
        assert!(store.scheduler().outstanding_tokens(&bill.id).await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_unpaid_reschedules_for_current_or_future_period() -> Result<()> {
        let (store, notifier) = setup_test_store();
        let future = far_future_period();
        store.set_current_period(future).await;
        let bill = store.create_bill(rent_draft()).await?;
        let scheduled_at_create = notifier.scheduled().len();

        store.set_paid(&bill.id, future, true).await?;
        store.set_paid(&bill.id, future, false).await?;

        assert_eq!(notifier.scheduled().len(), scheduled_at_create + 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_unpaid_past_period_does_not_reschedule() -> Result<()> {
        let (store, notifier) = setup_test_store();
        let future = far_future_period();
        store.set_current_period(future).await;
        let bill = store.create_bill(rent_draft()).await?;
        let scheduled_at_create = notifier.scheduled().len();

        let past = future.prev().prev();
        store.set_paid(&bill.id, past, true).await?;
        store.set_paid(&bill.id, past, false).await?;

        assert_eq!(notifier.scheduled().len(), scheduled_at_create);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_amount_override_validation() -> Result<()> {
        let (store, _notifier) = setup_test_store();
        let bill = store.create_bill(rent_draft()).await?;
        let period: Period = "2024-05".parse().unwrap();

        assert!(matches!(
            store
                .set_amount_override(&bill.id, period, 0.0)
                .await
                .unwrap_err(),
            Error::Validation { field: "amount", .. }
        ));
        assert!(matches!(
            store
                .set_amount_override("ghost", period, 10.0)
                .await
                .unwrap_err(),
            Error::NotFound { .. }
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_override_absent() -> Result<()> {
        let (store, _notifier) = setup_test_store();
        let bill = store.create_bill(rent_draft()).await?;
        let period: Period = "2024-05".parse().unwrap();
        assert!(store.get_override(&bill.id, period).await.is_none());
        Ok(())
    }
}
