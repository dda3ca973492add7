//! Bill input validation.
//!
//! Form layers hand over loosely-typed input (numeric fields arrive as
//! strings, anything may be missing). [`validate_bill_input`] is the pure
//! boundary function turning that into a typed [`BillDraft`] or a
//! [`Error::Validation`] naming the offending field, independent of any UI
//! form library. Updates go through [`BillPatch::validate`] under the same
//! rules.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default reminder offset in days, matching the original form default.
pub const DEFAULT_REMINDER_DAYS: u8 = 3;
/// Default display color for new bills.
pub const DEFAULT_COLOR: &str = "#0f766e";

/// Raw, unvalidated bill fields as a form would produce them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillInput {
    /// Display name (required, non-empty after trimming)
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Base amount; empty or missing defaults to 0
    pub amount: Option<String>,
    /// Due day of month; empty or missing defaults to 1
    pub due_day: Option<String>,
    /// Reminder offset in days; empty or missing defaults to 3
    pub reminder_days: Option<String>,
    /// Optional category
    pub category: Option<String>,
    /// Optional color; missing defaults to [`DEFAULT_COLOR`]
    pub color: Option<String>,
}

/// Validated bill fields, ready for the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct BillDraft {
    /// Trimmed, non-empty name
    pub name: String,
    /// Description, `None` when absent or blank
    pub description: Option<String>,
    /// Non-negative base amount
    pub amount: f64,
    /// Due day in 1..=31
    pub due_day: u8,
    /// Reminder offset in 0..=30
    pub reminder_days: u8,
    /// Category, `None` when absent or blank
    pub category: Option<String>,
    /// Display color
    pub color: String,
}

/// A validated partial update: `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillPatch {
    /// New name
    pub name: Option<String>,
    /// New description (`Some(None)` clears it)
    pub description: Option<Option<String>>,
    /// New base amount
    pub amount: Option<f64>,
    /// New due day
    pub due_day: Option<u8>,
    /// New reminder offset
    pub reminder_days: Option<u8>,
    /// New category (`Some(None)` clears it)
    pub category: Option<Option<String>>,
    /// New color
    pub color: Option<String>,
}

impl BillPatch {
    /// Checks every present field against the bill invariants.
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            check_name(name)?;
        }
        if let Some(amount) = self.amount {
            check_amount(amount)?;
        }
        if let Some(due_day) = self.due_day {
            check_due_day(due_day)?;
        }
        if let Some(reminder_days) = self.reminder_days {
            check_reminder_days(reminder_days)?;
        }
        Ok(())
    }
}

/// Validates raw form input into a [`BillDraft`].
pub fn validate_bill_input(input: &BillInput) -> Result<BillDraft> {
    let name = input.name.trim();
    check_name(name)?;

    let amount = parse_numeric(input.amount.as_deref(), 0.0, "amount")?;
    check_amount(amount)?;

    let due_day = parse_integer(input.due_day.as_deref(), 1, "due_day")?;
    check_due_day(due_day)?;

    let reminder_days = parse_integer(
        input.reminder_days.as_deref(),
        DEFAULT_REMINDER_DAYS,
        "reminder_days",
    )?;
    check_reminder_days(reminder_days)?;

    Ok(BillDraft {
        name: name.to_string(),
        description: normalize_optional(input.description.as_deref()),
        amount,
        due_day,
        reminder_days,
        category: normalize_optional(input.category.as_deref()),
        color: input
            .color
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(DEFAULT_COLOR)
            .to_string(),
    })
}

/// Re-checks a draft against the bill invariants. Drafts produced by
/// [`validate_bill_input`] always pass; hand-built drafts go through the
/// same gate at the repository boundary.
pub fn check_draft(draft: &BillDraft) -> Result<()> {
    check_name(&draft.name)?;
    check_amount(draft.amount)?;
    check_due_day(draft.due_day)?;
    check_reminder_days(draft.reminder_days)?;
    Ok(())
}

fn check_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            field: "name",
            message: "Bill name is required".to_string(),
        });
    }
    Ok(())
}

fn check_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::Validation {
            field: "amount",
            message: "Amount must be a non-negative number".to_string(),
        });
    }
    Ok(())
}

fn check_due_day(due_day: u8) -> Result<()> {
    if !(1..=31).contains(&due_day) {
        return Err(Error::Validation {
            field: "due_day",
            message: "Day must be between 1 and 31".to_string(),
        });
    }
    Ok(())
}

fn check_reminder_days(reminder_days: u8) -> Result<()> {
    if reminder_days > 30 {
        return Err(Error::Validation {
            field: "reminder_days",
            message: "Reminder days cannot exceed 30".to_string(),
        });
    }
    Ok(())
}

// Blank strings count as absent, mirroring the original form preprocessing.
fn parse_numeric(raw: Option<&str>, default: f64, field: &'static str) -> Result<f64> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse().map_err(|_| Error::Validation {
            field,
            message: format!("'{value}' is not a number"),
        }),
    }
}

fn parse_integer(raw: Option<&str>, default: u8, field: &'static str) -> Result<u8> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse().map_err(|_| Error::Validation {
            field,
            message: format!("'{value}' is not a whole number"),
        }),
    }
}

fn normalize_optional(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
