//! Projection engine: derived, read-only views over the store.
//!
//! Nothing here mutates or caches. Every query merges bill definitions with
//! the queried period's overrides on the fly and hands back owned values.

use crate::models::{BillWithStatus, HistoryEntry, MonthlyStats, PaymentOverride};
use crate::period::Period;
use crate::store::BillStore;

impl BillStore {
    /// The effective view of every bill for `period`: definition merged with
    /// the period's override, defaulting to unpaid at the base amount.
    /// Sorted ascending by due day; ties break deterministically by creation
    /// time, then id.
    pub async fn effective_bills(&self, period: Period) -> Vec<BillWithStatus> {
        let state = self.state().read().await;
        let empty = PaymentOverride::default();

        let mut bills: Vec<BillWithStatus> = state
            .bills
            .values()
            .map(|bill| {
                let o = state
                    .monthly_status
                    .get(&period)
                    .and_then(|status| status.overrides.get(&bill.id))
                    .unwrap_or(&empty);
                BillWithStatus {
                    paid: o.paid,
                    paid_date: o.paid_date,
                    actual_amount: o.amount.unwrap_or(bill.amount),
                    bill: bill.clone(),
                }
            })
            .collect();

        bills.sort_by(|a, b| {
            a.bill
                .due_day
                .cmp(&b.bill.due_day)
                .then_with(|| a.bill.created_at.cmp(&b.bill.created_at))
                .then_with(|| a.bill.id.cmp(&b.bill.id))
        });
        bills
    }

    /// Payment history of one bill across the most recent `count` periods
    /// that have any status data at all. Periods without a status entry are
    /// excluded entirely, so the result may hold fewer than `count` entries
    /// and may include periods with no record for this particular bill
    /// (reported as unpaid).
    pub async fn history(&self, bill_id: &str, count: usize) -> Vec<HistoryEntry> {
        let state = self.state().read().await;

        state
            .monthly_status
            .iter()
            .rev() // most recent first
            .take(count)
            .map(|(period, status)| {
                status.overrides.get(bill_id).map_or(
                    HistoryEntry {
                        period: *period,
                        paid: false,
                        paid_date: None,
                    },
                    |o| HistoryEntry {
                        period: *period,
                        paid: o.paid,
                        paid_date: o.paid_date,
                    },
                )
            })
            .collect()
    }

    /// Aggregate statistics for `period` over the effective bills.
    pub async fn stats(&self, period: Period) -> MonthlyStats {
        let bills = self.effective_bills(period).await;

        let total_amount: f64 = bills.iter().map(|b| b.actual_amount).sum();
        let paid_amount: f64 = bills
            .iter()
            .filter(|b| b.paid)
            .map(|b| b.actual_amount)
            .sum();
        let unpaid_amount = total_amount - paid_amount;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let paid_percentage = if total_amount > 0.0 {
            (paid_amount / total_amount * 100.0).round() as u8
        } else {
            0
        };

        MonthlyStats {
            total_amount,
            paid_amount,
            unpaid_amount,
            paid_percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::errors::Result;
    use crate::test_utils::{bill_draft, rent_draft, setup_test_store};

    #[tokio::test]
    async fn test_effective_bills_defaults_to_unpaid_base_amount() -> Result<()> {
        let (store, _notifier) = setup_test_store();
        store.create_bill(rent_draft()).await?;
        let period: Period = "2024-05".parse().unwrap();

        let bills = store.effective_bills(period).await;
        assert_eq!(bills.len(), 1);
        assert!(!bills[0].paid);
        assert!(bills[0].paid_date.is_none());
        assert_eq!(bills[0].actual_amount, 1000.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_effective_bills_sorted_by_due_day() -> Result<()> {
        let (store, _notifier) = setup_test_store();
        store.create_bill(bill_draft("Internet", 60.0, 20)).await?;
        store.create_bill(bill_draft("Rent", 1000.0, 1)).await?;
        store.create_bill(bill_draft("Power", 80.0, 5)).await?;
        let period: Period = "2024-05".parse().unwrap();

        let bills = store.effective_bills(period).await;
        let names: Vec<&str> = bills.iter().map(|b| b.bill.name.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Power", "Internet"]);

        let due_days: Vec<u8> = bills.iter().map(|b| b.bill.due_day).collect();
        assert!(due_days.windows(2).all(|w| w[0] <= w[1]));
        Ok(())
    }

    #[tokio::test]
    async fn test_effective_bills_one_entry_per_bill() -> Result<()> {
        let (store, _notifier) = setup_test_store();
        let a = store.create_bill(bill_draft("A", 10.0, 5)).await?;
        let b = store.create_bill(bill_draft("B", 20.0, 5)).await?;
        let period: Period = "2024-05".parse().unwrap();
        store.set_paid(&a.id, period, true).await?;

        let bills = store.effective_bills(period).await;
        assert_eq!(bills.len(), 2);
        let mut ids: Vec<&str> = bills.iter().map(|e| e.bill.id.as_str()).collect();
        ids.sort_unstable();
        let mut expected = vec![a.id.as_str(), b.id.as_str()];
        expected.sort_unstable();
        assert_eq!(ids, expected);
        Ok(())
    }

    #[tokio::test]
    async fn test_effective_bills_reflects_paid_and_amount_override() -> Result<()> {
        let (store, _notifier) = setup_test_store();
        let bill = store.create_bill(rent_draft()).await?;
        let period: Period = "2024-05".parse().unwrap();

        store.set_amount_override(&bill.id, period, 950.0).await?;
        store.set_paid(&bill.id, period, true).await?;

        let bills = store.effective_bills(period).await;
        assert!(bills[0].paid);
        assert!(bills[0].paid_date.is_some());
        assert_eq!(bills[0].actual_amount, 950.0);

        // Other periods are untouched
        let other = store.effective_bills(period.next()).await;
        assert!(!other[0].paid);
        assert_eq!(other[0].actual_amount, 1000.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_stats_rent_scenario() -> Result<()> {
        let (store, _notifier) = setup_test_store();
        let bill = store.create_bill(rent_draft()).await?;
        let period: Period = "2024-05".parse().unwrap();

        let before = store.stats(period).await;
        assert_eq!(before.total_amount, 1000.0);
        assert_eq!(before.paid_amount, 0.0);
        assert_eq!(before.unpaid_amount, 1000.0);
        assert_eq!(before.paid_percentage, 0);

        store.set_paid(&bill.id, period, true).await?;
        let after = store.stats(period).await;
        assert_eq!(after.total_amount, 1000.0);
        assert_eq!(after.paid_amount, 1000.0);
        assert_eq!(after.unpaid_amount, 0.0);
        assert_eq!(after.paid_percentage, 100);
        Ok(())
    }

    #[tokio::test]
    async fn test_stats_amounts_always_balance() -> Result<()> {
        let (store, _notifier) = setup_test_store();
        let a = store.create_bill(bill_draft("A", 33.33, 3)).await?;
        store.create_bill(bill_draft("B", 66.67, 7)).await?;
        let period: Period = "2024-05".parse().unwrap();
        store.set_paid(&a.id, period, true).await?;

        let stats = store.stats(period).await;
        assert_eq!(stats.paid_amount + stats.unpaid_amount, stats.total_amount);
        Ok(())
    }

    #[tokio::test]
    async fn test_stats_empty_store_has_zero_percentage() {
        let (store, _notifier) = setup_test_store();
        let period: Period = "2024-05".parse().unwrap();
        let stats = store.stats(period).await;
        assert_eq!(stats.total_amount, 0.0);
        assert_eq!(stats.paid_percentage, 0);
    }

    #[tokio::test]
    async fn test_stats_zero_amount_bills_have_zero_percentage() -> Result<()> {
        // All-zero amounts must not divide by zero
        let (store, _notifier) = setup_test_store();
        let bill = store.create_bill(bill_draft("Freebie", 0.0, 1)).await?;
        let period: Period = "2024-05".parse().unwrap();
        store.set_paid(&bill.id, period, true).await?;

        let stats = store.stats(period).await;
        assert_eq!(stats.paid_percentage, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_history_descending_and_bounded_by_existing_periods() -> Result<()> {
        let (store, _notifier) = setup_test_store();
        let a = store.create_bill(bill_draft("A", 10.0, 5)).await?;
        store.create_bill(bill_draft("B", 20.0, 20)).await?;

        let march: Period = "2024-03".parse().unwrap();
        let april: Period = "2024-04".parse().unwrap();
        store.set_paid(&a.id, march, true).await?;
        store.set_paid(&a.id, april, false).await?;

        // Asking for three months yields only the two that have status data
        let history = store.history(&a.id, 3).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].period, april);
        assert!(!history[0].paid);
        assert_eq!(history[1].period, march);
        assert!(history[1].paid);
        assert!(history[1].paid_date.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_history_reports_unpaid_for_periods_without_record() -> Result<()> {
        // A period that has status data for another bill still shows up,
        // reported as unpaid for this one.
        let (store, _notifier) = setup_test_store();
        let a = store.create_bill(bill_draft("A", 10.0, 5)).await?;
        let b = store.create_bill(bill_draft("B", 20.0, 20)).await?;

        let march: Period = "2024-03".parse().unwrap();
        store.set_paid(&b.id, march, true).await?;

        let history = store.history(&a.id, 5).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].period, march);
        assert!(!history[0].paid);
        assert!(history[0].paid_date.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_history_takes_most_recent_first() -> Result<()> {
        let (store, _notifier) = setup_test_store();
        let a = store.create_bill(bill_draft("A", 10.0, 5)).await?;

        for raw in ["2024-01", "2024-02", "2024-03", "2024-04"] {
            let period: Period = raw.parse().unwrap();
            store.set_paid(&a.id, period, true).await?;
        }

        let history = store.history(&a.id, 2).await;
        let periods: Vec<String> =
            history.iter().map(|h| h.period.to_string()).collect();
        assert_eq!(periods, vec!["2024-04", "2024-03"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_deleted_bill_disappears_from_projections() -> Result<()> {
        let (store, _notifier) = setup_test_store();
        let bill = store.create_bill(rent_draft()).await?;
        let period: Period = "2024-05".parse().unwrap();
        store.set_paid(&bill.id, period, true).await?;

        store.delete_bill(&bill.id).await;

        assert!(store.effective_bills(period).await.is_empty());
        for entry in store.history(&bill.id, 12).await {
            assert!(!entry.paid);
            assert!(entry.paid_date.is_none());
        }
        let err = store.set_paid(&bill.id, period, true).await.unwrap_err();
        assert!(matches!(err, crate::errors::Error::NotFound { .. }));
        Ok(())
    }
}
