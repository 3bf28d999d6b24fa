//! Report rows over filtered timesheet records.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::{TimesheetEntry, User};
use crate::references::ReferenceSet;
use crate::types::{DbId, Hours, WorkDate};

/// Optional filters for a report query. `None` means "do not filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFilter {
    pub user_id: Option<DbId>,
    pub client_id: Option<DbId>,
    pub project_id: Option<DbId>,
    pub category_id: Option<DbId>,
    pub start_date: Option<WorkDate>,
    pub end_date: Option<WorkDate>,
}

impl ReportFilter {
    /// Whether `entry`, whose project belongs to `client_id`, passes the filter.
    pub fn matches(&self, entry: &TimesheetEntry, client_id: DbId) -> bool {
        self.user_id.map_or(true, |id| entry.user_id == id)
            && self.client_id.map_or(true, |id| client_id == id)
            && self.project_id.map_or(true, |id| entry.project_id == id)
            && self.category_id.map_or(true, |id| entry.category_id == id)
            && self.start_date.map_or(true, |d| entry.work_date >= d)
            && self.end_date.map_or(true, |d| entry.work_date <= d)
    }
}

/// One line of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub date: WorkDate,
    pub user_name: String,
    pub project_name: String,
    pub category_name: String,
    pub description: String,
    /// Hours worked plus overtime.
    pub time: Hours,
}

/// Turn raw records into report rows ordered by date, then entry id.
///
/// `users` and `refs` must cover every user, project, and category the
/// entries reference.
pub fn assemble(
    entries: &[TimesheetEntry],
    users: &HashMap<DbId, User>,
    refs: &ReferenceSet,
) -> Result<Vec<ReportRow>, CoreError> {
    let mut ordered: Vec<&TimesheetEntry> = entries.iter().collect();
    ordered.sort_by_key(|e| (e.work_date, e.id));

    ordered
        .into_iter()
        .map(|e| {
            let user = users
                .get(&e.user_id)
                .ok_or(CoreError::not_found("user", e.user_id))?;
            let project = refs
                .project(e.project_id)
                .ok_or(CoreError::not_found("project", e.project_id))?;
            let category = refs
                .category(e.category_id)
                .ok_or(CoreError::not_found("category", e.category_id))?;
            Ok(ReportRow {
                date: e.work_date,
                user_name: user.full_name(),
                project_name: project.name.clone(),
                category_name: category.name.clone(),
                description: e.description.clone(),
                time: e.total_hours(),
            })
        })
        .collect()
}

/// Sum of the `time` column.
pub fn total_time(rows: &[ReportRow]) -> Hours {
    rows.iter().map(|r| r.time).fold(Decimal::ZERO, |acc, t| acc + t)
}
