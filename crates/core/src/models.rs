//! Store-owned entities the timesheet engine reads and writes.
//!
//! These are plain domain values: relationships are id references only and
//! are resolved through explicit store lookups, never by object traversal.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Hours, WorkDate};

/// An employee account.
///
/// Holds the password hash, so it is deliberately not `Serialize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password_hash: String,
}

impl User {
    /// "First Last", as shown on reports.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A user not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: DbId,
    pub name: String,
}

/// A project always belongs to exactly one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub client_id: DbId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
}

/// One persisted timesheet record.
///
/// The client is not stored here; it is reached through `project_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimesheetEntry {
    pub id: DbId,
    pub user_id: DbId,
    pub project_id: DbId,
    pub category_id: DbId,
    pub work_date: WorkDate,
    pub hours_worked: Hours,
    pub overtime: Hours,
    pub description: String,
}

impl TimesheetEntry {
    /// Regular hours plus overtime.
    pub fn total_hours(&self) -> Hours {
        self.hours_worked + self.overtime
    }
}

/// A timesheet entry staged for insertion; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTimesheetEntry {
    pub user_id: DbId,
    pub project_id: DbId,
    pub category_id: DbId,
    pub work_date: WorkDate,
    pub hours_worked: Hours,
    pub overtime: Hours,
    pub description: String,
}

impl NewTimesheetEntry {
    /// Attach the store-assigned id.
    pub fn with_id(self, id: DbId) -> TimesheetEntry {
        TimesheetEntry {
            id,
            user_id: self.user_id,
            project_id: self.project_id,
            category_id: self.category_id,
            work_date: self.work_date,
            hours_worked: self.hours_worked,
            overtime: self.overtime,
            description: self.description,
        }
    }
}
