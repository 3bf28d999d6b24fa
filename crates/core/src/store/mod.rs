//! The entity store contract the timesheet engine runs against.
//!
//! An [`EntityStore`] value is a per-request unit of work: reads hit the
//! backing store immediately, writes are staged with the `stage_*` methods
//! and become durable together on [`EntityStore::commit`]. Dropping a store
//! with staged changes (or calling [`EntityStore::discard`]) loses them.

pub mod memory;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{Category, NewTimesheetEntry, NewUser, Project, TimesheetEntry, User};
use crate::report::ReportFilter;
use crate::types::{DbId, WorkDate};

pub type StoreResult<T> = Result<T, StoreError>;

/// What a commit made durable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Rows inserted, updated, or deleted.
    pub affected: u64,
    /// Inserted timesheet entries with their assigned ids, in staging order.
    pub inserted: Vec<TimesheetEntry>,
    /// Inserted users with their assigned ids, in staging order.
    pub users: Vec<User>,
}

/// A write waiting for commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedChange {
    InsertEntries(Vec<NewTimesheetEntry>),
    UpdateEntries(Vec<TimesheetEntry>),
    DeleteEntry(TimesheetEntry),
    InsertUser(NewUser),
}

/// Ordered list of staged writes shared by store implementations.
#[derive(Debug, Clone, Default)]
pub struct Staging {
    changes: Vec<StagedChange>,
}

impl Staging {
    pub fn push(&mut self, change: StagedChange) {
        self.changes.push(change);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Take all staged changes, leaving the staging area empty.
    pub fn take(&mut self) -> Vec<StagedChange> {
        std::mem::take(&mut self.changes)
    }

    pub fn clear(&mut self) {
        self.changes.clear();
    }
}

#[async_trait]
pub trait EntityStore: Send {
    // -- Users --

    async fn user_exists(&mut self, id: DbId) -> StoreResult<bool>;

    async fn users_by_ids(&mut self, ids: &[DbId]) -> StoreResult<Vec<User>>;

    async fn user_by_username(&mut self, username: &str) -> StoreResult<Option<User>>;

    // -- Reference data --

    /// Projects whose id is in `ids`. Unknown ids are silently absent.
    async fn projects_by_ids(&mut self, ids: &[DbId]) -> StoreResult<Vec<Project>>;

    /// Categories whose id is in `ids`. Unknown ids are silently absent.
    async fn categories_by_ids(&mut self, ids: &[DbId]) -> StoreResult<Vec<Category>>;

    // -- Timesheet entries --

    /// Entries for `user_id` dated within `[start, end]` inclusive.
    async fn entries_in_range(
        &mut self,
        user_id: DbId,
        start: WorkDate,
        end: WorkDate,
    ) -> StoreResult<Vec<TimesheetEntry>>;

    async fn entry_by_id(&mut self, id: DbId) -> StoreResult<Option<TimesheetEntry>>;

    /// Entries passing every set field of `filter`; the client filter goes
    /// through each entry's project.
    async fn entries_matching(&mut self, filter: &ReportFilter) -> StoreResult<Vec<TimesheetEntry>>;

    // -- Staged writes --

    fn stage_insert(&mut self, entries: Vec<NewTimesheetEntry>);

    fn stage_update(&mut self, entries: Vec<TimesheetEntry>);

    fn stage_delete(&mut self, entry: TimesheetEntry);

    fn stage_user(&mut self, user: NewUser);

    fn has_staged(&self) -> bool;

    /// Drop all staged changes without applying them.
    fn discard(&mut self);

    /// Apply every staged change atomically. On error nothing is applied and
    /// the staging area is empty.
    async fn commit(&mut self) -> StoreResult<CommitReceipt>;
}
