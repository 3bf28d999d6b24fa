//! Timesheet request/view types, work-status classification, and daily
//! aggregation.
//!
//! Everything here is pure: callers pass in entries and the resolved
//! [`ReferenceSet`]; no store access happens in this module.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::{NewTimesheetEntry, TimesheetEntry};
use crate::references::ReferenceSet;
use crate::types::{DbId, Hours, WorkDate};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Daily total at or above which a day counts as fully worked (7.5h).
pub const SUFFICIENT_DAILY_HOURS: Decimal = dec!(7.5);

/// Largest value a single hours column can hold (`NUMERIC(5,2)`).
pub const MAX_ENTRY_HOURS: Decimal = dec!(999.99);

/// Decimal places an hours column keeps (`NUMERIC(5,2)`).
pub const HOURS_SCALE: u32 = 2;

/// Maximum description length in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 255;

// ---------------------------------------------------------------------------
// WorkStatus
// ---------------------------------------------------------------------------

/// Derived classification of one day's total hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkStatus {
    Sufficient,
    Insufficient,
    NotWorked,
}

impl WorkStatus {
    /// Classify a daily total. The 7.5h boundary is inclusive.
    pub fn from_total_hours(total: Hours) -> Self {
        if total >= SUFFICIENT_DAILY_HOURS {
            Self::Sufficient
        } else if total > Decimal::ZERO {
            Self::Insufficient
        } else {
            Self::NotWorked
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sufficient => "Sufficient",
            Self::Insufficient => "Insufficient",
            Self::NotWorked => "NotWorked",
        }
    }
}

impl std::fmt::Display for WorkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// One row of a batch-create request. User and date come from the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimesheetRequest {
    pub project_id: DbId,
    pub category_id: DbId,
    pub hours_worked: Hours,
    #[serde(default)]
    pub overtime: Hours,
    #[serde(default)]
    pub description: String,
}

impl TimesheetRequest {
    /// Bind this row to the batch's user and date.
    pub fn into_new_entry(self, user_id: DbId, work_date: WorkDate) -> NewTimesheetEntry {
        NewTimesheetEntry {
            user_id,
            project_id: self.project_id,
            category_id: self.category_id,
            work_date,
            hours_worked: self.hours_worked,
            overtime: self.overtime,
            description: self.description,
        }
    }
}

/// One row of a bulk-update request, matched to an existing entry by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimesheetUpdateRequest {
    pub id: DbId,
    pub project_id: DbId,
    pub category_id: DbId,
    pub hours_worked: Hours,
    #[serde(default)]
    pub overtime: Hours,
    #[serde(default)]
    pub description: String,
}

impl TimesheetUpdateRequest {
    /// Overwrite the revisable fields of `entry` in place.
    pub fn apply_to(&self, entry: &mut TimesheetEntry) {
        entry.project_id = self.project_id;
        entry.category_id = self.category_id;
        entry.hours_worked = self.hours_worked;
        entry.overtime = self.overtime;
        entry.description.clone_from(&self.description);
    }
}

/// Check the scalar fields of a request row.
pub fn validate_row(hours_worked: Hours, overtime: Hours, description: &str) -> Result<(), CoreError> {
    validate_hours("hours_worked", hours_worked)?;
    validate_hours("overtime", overtime)?;
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "description is {len} characters, maximum is {MAX_DESCRIPTION_LENGTH}"
        )));
    }
    Ok(())
}

fn validate_hours(field: &str, value: Hours) -> Result<(), CoreError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(CoreError::Validation(format!(
            "{field} must not be negative, got {value}"
        )));
    }
    if value > MAX_ENTRY_HOURS {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_ENTRY_HOURS}, got {value}"
        )));
    }
    // Trailing zeros are fine; 7.500 is stored as 7.50.
    if value.normalize().scale() > HOURS_SCALE {
        return Err(CoreError::Validation(format!(
            "{field} allows at most {HOURS_SCALE} decimal places, got {value}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// A created or revised entry as returned to callers, with its client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimesheetView {
    pub id: DbId,
    pub client_id: DbId,
    pub project_id: DbId,
    pub category_id: DbId,
    pub work_date: WorkDate,
    pub hours_worked: Hours,
    pub overtime: Hours,
    pub description: String,
}

impl TimesheetView {
    pub fn new(entry: &TimesheetEntry, client_id: DbId) -> Self {
        Self {
            id: entry.id,
            client_id,
            project_id: entry.project_id,
            category_id: entry.category_id,
            work_date: entry.work_date,
            hours_worked: entry.hours_worked,
            overtime: entry.overtime,
            description: entry.description.clone(),
        }
    }
}

/// Build views for `entries`, resolving each row's client from its own project.
pub fn views_for(entries: &[TimesheetEntry], refs: &ReferenceSet) -> Result<Vec<TimesheetView>, CoreError> {
    entries
        .iter()
        .map(|entry| Ok(TimesheetView::new(entry, refs.client_of(entry.project_id)?)))
        .collect()
}

/// One entry inside a [`DailySummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimesheetInfo {
    pub project_id: DbId,
    pub client_id: DbId,
    pub category_id: DbId,
    pub hours_worked: Hours,
    pub overtime: Hours,
    pub description: String,
}

/// All entries booked on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub date: WorkDate,
    pub timesheets: Vec<TimesheetInfo>,
    pub total_hours: Hours,
    pub status: WorkStatus,
}

/// Per-day summaries for a user over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimesheetSummary {
    /// Ascending by date.
    pub days: Vec<DailySummary>,
    pub total_hours: Hours,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Group entries by date and classify each day.
///
/// `refs` must contain the project of every entry; a missing project is
/// reported as `NotFound("project")`.
pub fn summarize(entries: &[TimesheetEntry], refs: &ReferenceSet) -> Result<TimesheetSummary, CoreError> {
    let mut by_date: BTreeMap<WorkDate, Vec<&TimesheetEntry>> = BTreeMap::new();
    for entry in entries {
        by_date.entry(entry.work_date).or_default().push(entry);
    }

    let mut days = Vec::with_capacity(by_date.len());
    for (date, mut group) in by_date {
        group.sort_by_key(|e| e.id);

        let timesheets = group
            .iter()
            .map(|e| {
                Ok(TimesheetInfo {
                    project_id: e.project_id,
                    client_id: refs.client_of(e.project_id)?,
                    category_id: e.category_id,
                    hours_worked: e.hours_worked,
                    overtime: e.overtime,
                    description: e.description.clone(),
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()?;

        let total_hours: Hours = group.iter().map(|e| e.total_hours()).sum();
        days.push(DailySummary {
            date,
            timesheets,
            total_hours,
            status: WorkStatus::from_total_hours(total_hours),
        });
    }

    let total_hours = days.iter().map(|d| d.total_hours).sum();
    Ok(TimesheetSummary { days, total_hours })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
