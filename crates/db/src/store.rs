//! PostgreSQL implementation of [`EntityStore`].

use async_trait::async_trait;
use sqlx::PgPool;
use timekeep_core::error::StoreError;
use timekeep_core::models::{Category, NewTimesheetEntry, NewUser, Project, TimesheetEntry, User};
use timekeep_core::report::ReportFilter;
use timekeep_core::store::{CommitReceipt, EntityStore, StagedChange, Staging, StoreResult};
use timekeep_core::types::{DbId, WorkDate};

use crate::repositories::{CategoryRepo, ProjectRepo, TimesheetRepo, UserRepo};

/// PostgreSQL error code for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL error code for `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Classify a sqlx error for the core layer.
///
/// Constraint violations mean the staged data no longer fits the stored
/// state and surface as [`StoreError::Conflict`]; everything else is a
/// backend failure.
pub fn db_err(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        let code = db.code();
        if matches!(code.as_deref(), Some(UNIQUE_VIOLATION) | Some(FOREIGN_KEY_VIOLATION)) {
            let constraint = db.constraint().unwrap_or("unknown");
            return StoreError::Conflict(format!("constraint {constraint} violated"));
        }
    }
    StoreError::Backend(Box::new(err))
}

/// One unit of work against a shared pool.
///
/// Create one per request with [`PgEntityStore::new`]; the pool handle is
/// cheap to clone. Reads use the pool directly, staged writes are applied
/// in a single transaction by [`EntityStore::commit`].
pub struct PgEntityStore {
    pool: PgPool,
    staging: Staging,
}

impl PgEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            staging: Staging::default(),
        }
    }

    async fn apply(&self, changes: Vec<StagedChange>) -> Result<CommitReceipt, StoreError> {
        let mut receipt = CommitReceipt::default();
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        for change in changes {
            match change {
                StagedChange::InsertEntries(entries) => {
                    for new in &entries {
                        let row = TimesheetRepo::insert_in_tx(&mut tx, new)
                            .await
                            .map_err(db_err)?;
                        receipt.inserted.push(row.into());
                        receipt.affected += 1;
                    }
                }
                StagedChange::UpdateEntries(entries) => {
                    for entry in &entries {
                        TimesheetRepo::update_in_tx(&mut tx, entry)
                            .await
                            .map_err(db_err)?
                            .ok_or_else(|| {
                                StoreError::Conflict(format!(
                                    "timesheet entry {} no longer exists",
                                    entry.id
                                ))
                            })?;
                        receipt.affected += 1;
                    }
                }
                StagedChange::DeleteEntry(entry) => {
                    if !TimesheetRepo::delete_in_tx(&mut tx, entry.id)
                        .await
                        .map_err(db_err)?
                    {
                        return Err(StoreError::Conflict(format!(
                            "timesheet entry {} no longer exists",
                            entry.id
                        )));
                    }
                    receipt.affected += 1;
                }
                StagedChange::InsertUser(new) => {
                    let row = UserRepo::create_in_tx(&mut tx, &new).await.map_err(db_err)?;
                    receipt.users.push(row.into());
                    receipt.affected += 1;
                }
            }
        }

        tx.commit().await.map_err(db_err)?;
        Ok(receipt)
    }
}

#[async_trait]
impl EntityStore for PgEntityStore {
    async fn user_exists(&mut self, id: DbId) -> StoreResult<bool> {
        UserRepo::exists(&self.pool, id).await.map_err(db_err)
    }

    async fn users_by_ids(&mut self, ids: &[DbId]) -> StoreResult<Vec<User>> {
        let rows = UserRepo::find_by_ids(&self.pool, ids).await.map_err(db_err)?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn user_by_username(&mut self, username: &str) -> StoreResult<Option<User>> {
        let row = UserRepo::find_by_username(&self.pool, username)
            .await
            .map_err(db_err)?;
        Ok(row.map(User::from))
    }

    async fn projects_by_ids(&mut self, ids: &[DbId]) -> StoreResult<Vec<Project>> {
        let rows = ProjectRepo::find_by_ids(&self.pool, ids).await.map_err(db_err)?;
        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn categories_by_ids(&mut self, ids: &[DbId]) -> StoreResult<Vec<Category>> {
        let rows = CategoryRepo::find_by_ids(&self.pool, ids)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn entries_in_range(
        &mut self,
        user_id: DbId,
        start: WorkDate,
        end: WorkDate,
    ) -> StoreResult<Vec<TimesheetEntry>> {
        let rows = TimesheetRepo::list_in_range(&self.pool, user_id, start, end)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(TimesheetEntry::from).collect())
    }

    async fn entry_by_id(&mut self, id: DbId) -> StoreResult<Option<TimesheetEntry>> {
        let row = TimesheetRepo::find_by_id(&self.pool, id)
            .await
            .map_err(db_err)?;
        Ok(row.map(TimesheetEntry::from))
    }

    async fn entries_matching(&mut self, filter: &ReportFilter) -> StoreResult<Vec<TimesheetEntry>> {
        let rows = TimesheetRepo::list_matching(&self.pool, filter)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(TimesheetEntry::from).collect())
    }

    fn stage_insert(&mut self, entries: Vec<NewTimesheetEntry>) {
        self.staging.push(StagedChange::InsertEntries(entries));
    }

    fn stage_update(&mut self, entries: Vec<TimesheetEntry>) {
        self.staging.push(StagedChange::UpdateEntries(entries));
    }

    fn stage_delete(&mut self, entry: TimesheetEntry) {
        self.staging.push(StagedChange::DeleteEntry(entry));
    }

    fn stage_user(&mut self, user: NewUser) {
        self.staging.push(StagedChange::InsertUser(user));
    }

    fn has_staged(&self) -> bool {
        !self.staging.is_empty()
    }

    fn discard(&mut self) {
        self.staging.clear();
    }

    async fn commit(&mut self) -> StoreResult<CommitReceipt> {
        let changes = self.staging.take();
        if changes.is_empty() {
            return Ok(CommitReceipt::default());
        }
        let count = changes.len();
        let receipt = self.apply(changes).await?;
        tracing::debug!(changes = count, affected = receipt.affected, "Store commit applied");
        Ok(receipt)
    }
}
