//! Timesheet batch operations: create, revise, delete, summarize.
//!
//! Every mutating operation is validate-then-apply: all reads and checks
//! run first, then the changes are staged and committed once. The first
//! failing check aborts the call with nothing staged.
//!
//! The store passed in must have nothing staged yet: the commit result is
//! read back as this call's own changes.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use timekeep_core::error::CoreError;
use timekeep_core::models::TimesheetEntry;
use timekeep_core::references::ReferenceSet;
use timekeep_core::store::EntityStore;
use timekeep_core::timesheet::{
    self, validate_row, TimesheetRequest, TimesheetSummary, TimesheetUpdateRequest, TimesheetView,
};
use timekeep_core::types::{DbId, WorkDate};
use timekeep_events::{DomainEvent, EventBus};

use crate::validation::{
    complete_projects, ensure_nothing_staged, ensure_user_exists, load_references,
};

pub struct TimesheetService {
    events: Arc<EventBus>,
}

impl TimesheetService {
    pub fn new(events: Arc<EventBus>) -> Self {
        Self { events }
    }

    // -----------------------------------------------------------------------
    // Create
    // -----------------------------------------------------------------------

    /// Create one entry per row, all booked for `user_id` on `work_date`.
    ///
    /// Returns the created entries in input order, each with the client of
    /// its own project.
    pub async fn create_batch<S>(
        &self,
        store: &mut S,
        user_id: DbId,
        work_date: WorkDate,
        rows: Vec<TimesheetRequest>,
    ) -> Result<Vec<TimesheetView>, CoreError>
    where
        S: EntityStore + ?Sized,
    {
        ensure_nothing_staged(store)?;
        let checked = check_create(store, user_id, &rows).await;
        let client_ids = match checked {
            Ok(ids) => ids,
            Err(err) => return Err(rejected("create", user_id, err)),
        };

        let new_entries = rows
            .into_iter()
            .map(|row| row.into_new_entry(user_id, work_date))
            .collect();
        store.stage_insert(new_entries);
        let receipt = store.commit().await?;

        let views: Vec<TimesheetView> = receipt
            .inserted
            .iter()
            .zip(client_ids)
            .map(|(entry, client_id)| TimesheetView::new(entry, client_id))
            .collect();

        tracing::info!(user_id, %work_date, count = views.len(), "Timesheet batch created");
        self.events.publish(DomainEvent::TimesheetBatchCreated {
            user_id,
            work_date,
            timesheet_ids: views.iter().map(|v| v.id).collect(),
        });

        Ok(views)
    }

    // -----------------------------------------------------------------------
    // Update
    // -----------------------------------------------------------------------

    /// Revise existing entries of `user_id` dated within `[start, end]`.
    ///
    /// Each update targets a candidate by id. Never creates entries. Returns
    /// the whole candidate set ordered by date then id, revised or not.
    pub async fn update_batch<S>(
        &self,
        store: &mut S,
        user_id: DbId,
        start: WorkDate,
        end: WorkDate,
        updates: Vec<TimesheetUpdateRequest>,
    ) -> Result<Vec<TimesheetView>, CoreError>
    where
        S: EntityStore + ?Sized,
    {
        ensure_nothing_staged(store)?;
        let checked = check_update(store, user_id, start, end, &updates).await;
        let (candidate_count, revised, views) = match checked {
            Ok(checked) => checked,
            Err(err) => return Err(rejected("update", user_id, err)),
        };

        let timesheet_ids: Vec<DbId> = revised.iter().map(|e| e.id).collect();
        store.stage_update(revised);
        let receipt = store.commit().await?;

        tracing::info!(
            user_id,
            candidates = candidate_count,
            updated = receipt.affected,
            "Timesheet batch updated"
        );
        self.events.publish(DomainEvent::TimesheetBatchUpdated {
            user_id,
            start,
            end,
            timesheet_ids,
        });

        Ok(views)
    }

    // -----------------------------------------------------------------------
    // Delete
    // -----------------------------------------------------------------------

    pub async fn delete<S>(&self, store: &mut S, id: DbId) -> Result<(), CoreError>
    where
        S: EntityStore + ?Sized,
    {
        ensure_nothing_staged(store)?;
        let entry = store
            .entry_by_id(id)
            .await?
            .ok_or(CoreError::not_found("timesheet", id))?;
        let user_id = entry.user_id;

        store.stage_delete(entry);
        store.commit().await?;

        tracing::info!(timesheet_id = id, user_id, "Timesheet deleted");
        self.events.publish(DomainEvent::TimesheetDeleted {
            timesheet_id: id,
            user_id,
        });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Summary
    // -----------------------------------------------------------------------

    /// Per-day totals and status for `user_id` over `[start, end]`.
    ///
    /// A reversed range is not an error; it simply matches nothing.
    pub async fn summarize<S>(
        &self,
        store: &mut S,
        user_id: DbId,
        start: WorkDate,
        end: WorkDate,
    ) -> Result<TimesheetSummary, CoreError>
    where
        S: EntityStore + ?Sized,
    {
        ensure_user_exists(store, user_id).await?;

        let entries = store.entries_in_range(user_id, start, end).await?;
        tracing::debug!(user_id, %start, %end, entries = entries.len(), "Loaded entries for summary");

        let mut refs = ReferenceSet::default();
        complete_projects(store, &mut refs, entries.iter().map(|e| e.project_id)).await?;
        timesheet::summarize(&entries, &refs)
    }
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

/// Validate a create batch and return the client id of each row.
async fn check_create<S>(
    store: &mut S,
    user_id: DbId,
    rows: &[TimesheetRequest],
) -> Result<Vec<DbId>, CoreError>
where
    S: EntityStore + ?Sized,
{
    ensure_user_exists(store, user_id).await?;
    if rows.is_empty() {
        return Err(CoreError::Validation("Timesheet batch must not be empty".into()));
    }

    let refs = load_references(
        store,
        rows.iter().map(|r| r.project_id),
        rows.iter().map(|r| r.category_id),
    )
    .await?;

    rows.iter()
        .map(|row| {
            let resolved = refs.resolve(row.project_id, row.category_id)?;
            validate_row(row.hours_worked, row.overtime, &row.description)?;
            Ok(resolved.client_id)
        })
        .collect()
}

/// Validate an update batch against the candidate set.
///
/// Returns the candidate count, the revised entries to stage (candidate
/// order, each once), and views of every candidate after revision.
async fn check_update<S>(
    store: &mut S,
    user_id: DbId,
    start: WorkDate,
    end: WorkDate,
    updates: &[TimesheetUpdateRequest],
) -> Result<(usize, Vec<TimesheetEntry>, Vec<TimesheetView>), CoreError>
where
    S: EntityStore + ?Sized,
{
    ensure_user_exists(store, user_id).await?;
    if updates.is_empty() {
        return Err(CoreError::Validation("Timesheet batch must not be empty".into()));
    }

    let mut candidates = store.entries_in_range(user_id, start, end).await?;
    candidates.sort_by_key(|e| (e.work_date, e.id));
    tracing::debug!(user_id, %start, %end, candidates = candidates.len(), "Loaded update candidates");

    let mut refs = load_references(
        store,
        updates.iter().map(|u| u.project_id),
        updates.iter().map(|u| u.category_id),
    )
    .await?;

    let positions: HashMap<DbId, usize> = candidates
        .iter()
        .enumerate()
        .map(|(pos, e)| (e.id, pos))
        .collect();
    let mut touched = BTreeSet::new();

    for update in updates {
        refs.resolve(update.project_id, update.category_id)?;
        let pos = *positions
            .get(&update.id)
            .ok_or(CoreError::not_found("timesheet", update.id))?;
        validate_row(update.hours_worked, update.overtime, &update.description)?;
        update.apply_to(&mut candidates[pos]);
        touched.insert(pos);
    }

    // Untouched candidates may sit on projects the updates never named.
    complete_projects(store, &mut refs, candidates.iter().map(|e| e.project_id)).await?;
    let views = timesheet::views_for(&candidates, &refs)?;

    let count = candidates.len();
    let revised = touched.into_iter().map(|pos| candidates[pos].clone()).collect();
    Ok((count, revised, views))
}

/// Log why the batch was refused. Checks never stage, so there is
/// nothing to roll back.
fn rejected(operation: &'static str, user_id: DbId, err: CoreError) -> CoreError {
    tracing::warn!(operation, user_id, error = %err, "Timesheet batch rejected");
    err
}

