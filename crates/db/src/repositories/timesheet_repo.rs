//! Repository for the `timesheets` table.

use sqlx::PgPool;
use timekeep_core::models::{NewTimesheetEntry, TimesheetEntry};
use timekeep_core::report::ReportFilter;
use timekeep_core::types::{DbId, WorkDate};

use crate::models::timesheet::TimesheetRow;

/// Column list for timesheets queries.
const COLUMNS: &str = "id, user_id, project_id, category_id, work_date, hours_worked, \
                       overtime, description, created_at, updated_at";

/// Same columns qualified with the `t` alias, for joined queries.
const T_COLUMNS: &str = "t.id, t.user_id, t.project_id, t.category_id, t.work_date, \
                         t.hours_worked, t.overtime, t.description, t.created_at, t.updated_at";

/// Provides CRUD operations for timesheet entries.
pub struct TimesheetRepo;

impl TimesheetRepo {
    /// Entries for a user dated within `[start, end]` inclusive, oldest first.
    pub async fn list_in_range(
        pool: &PgPool,
        user_id: DbId,
        start: WorkDate,
        end: WorkDate,
    ) -> Result<Vec<TimesheetRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM timesheets
             WHERE user_id = $1 AND work_date BETWEEN $2 AND $3
             ORDER BY work_date ASC, id ASC"
        );
        sqlx::query_as::<_, TimesheetRow>(&query)
            .bind(user_id)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<TimesheetRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM timesheets WHERE id = $1");
        sqlx::query_as::<_, TimesheetRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Entries passing every set field of `filter`.
    ///
    /// The client filter is applied through the entry's project. Unset
    /// fields bind as NULL and disable their predicate.
    pub async fn list_matching(
        pool: &PgPool,
        filter: &ReportFilter,
    ) -> Result<Vec<TimesheetRow>, sqlx::Error> {
        let query = format!(
            "SELECT {T_COLUMNS} FROM timesheets t
             JOIN projects p ON p.id = t.project_id
             WHERE ($1::BIGINT IS NULL OR t.user_id = $1)
               AND ($2::BIGINT IS NULL OR p.client_id = $2)
               AND ($3::BIGINT IS NULL OR t.project_id = $3)
               AND ($4::BIGINT IS NULL OR t.category_id = $4)
               AND ($5::DATE IS NULL OR t.work_date >= $5)
               AND ($6::DATE IS NULL OR t.work_date <= $6)
             ORDER BY t.work_date ASC, t.id ASC"
        );
        sqlx::query_as::<_, TimesheetRow>(&query)
            .bind(filter.user_id)
            .bind(filter.client_id)
            .bind(filter.project_id)
            .bind(filter.category_id)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .fetch_all(pool)
            .await
    }

    /// Insert one entry within an existing transaction.
    pub async fn insert_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        input: &NewTimesheetEntry,
    ) -> Result<TimesheetRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO timesheets
                (user_id, project_id, category_id, work_date, hours_worked, overtime, description)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimesheetRow>(&query)
            .bind(input.user_id)
            .bind(input.project_id)
            .bind(input.category_id)
            .bind(input.work_date)
            .bind(input.hours_worked)
            .bind(input.overtime)
            .bind(&input.description)
            .fetch_one(&mut **tx)
            .await
    }

    /// Overwrite the mutable fields of an entry owned by `entry.user_id`.
    ///
    /// Returns `None` when no such row exists any more.
    pub async fn update_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        entry: &TimesheetEntry,
    ) -> Result<Option<TimesheetRow>, sqlx::Error> {
        let query = format!(
            "UPDATE timesheets SET
                project_id = $3,
                category_id = $4,
                hours_worked = $5,
                overtime = $6,
                description = $7,
                updated_at = NOW()
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimesheetRow>(&query)
            .bind(entry.id)
            .bind(entry.user_id)
            .bind(entry.project_id)
            .bind(entry.category_id)
            .bind(entry.hours_worked)
            .bind(entry.overtime)
            .bind(&entry.description)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Delete an entry within an existing transaction. Returns `true` if a
    /// row was deleted.
    pub async fn delete_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM timesheets WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
