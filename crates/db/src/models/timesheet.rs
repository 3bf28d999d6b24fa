//! Timesheet row model.

use sqlx::FromRow;
use timekeep_core::models::TimesheetEntry;
use timekeep_core::types::{DbId, Hours, Timestamp, WorkDate};

/// A row from the `timesheets` table.
#[derive(Debug, Clone, FromRow)]
pub struct TimesheetRow {
    pub id: DbId,
    pub user_id: DbId,
    pub project_id: DbId,
    pub category_id: DbId,
    pub work_date: WorkDate,
    pub hours_worked: Hours,
    pub overtime: Hours,
    pub description: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<TimesheetRow> for TimesheetEntry {
    fn from(row: TimesheetRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            project_id: row.project_id,
            category_id: row.category_id,
            work_date: row.work_date,
            hours_worked: row.hours_worked,
            overtime: row.overtime,
            description: row.description,
        }
    }
}
