//! Reference checks that run before any timesheet mutation.
//!
//! Everything here only reads from the store. A failure leaves nothing
//! staged.

use timekeep_core::error::CoreError;
use timekeep_core::references::{distinct_ids, ReferenceSet};
use timekeep_core::store::EntityStore;
use timekeep_core::types::DbId;

/// Refuse to start a mutation on a store that already holds staged work.
///
/// Commit receipts cover everything staged, so another caller's pending
/// inserts would be mistaken for this call's.
pub fn ensure_nothing_staged<S>(store: &S) -> Result<(), CoreError>
where
    S: EntityStore + ?Sized,
{
    if store.has_staged() {
        return Err(CoreError::Internal(
            "Store session already has uncommitted changes".into(),
        ));
    }
    Ok(())
}

pub async fn ensure_user_exists<S>(store: &mut S, user_id: DbId) -> Result<(), CoreError>
where
    S: EntityStore + ?Sized,
{
    if store.user_exists(user_id).await? {
        Ok(())
    } else {
        Err(CoreError::not_found("user", user_id))
    }
}

/// Fetch the distinct projects and categories named by a batch, one
/// lookup each. Unknown ids are simply absent from the result.
pub async fn load_references<S, P, C>(
    store: &mut S,
    project_ids: P,
    category_ids: C,
) -> Result<ReferenceSet, CoreError>
where
    S: EntityStore + ?Sized,
    P: IntoIterator<Item = DbId>,
    C: IntoIterator<Item = DbId>,
{
    let project_ids = distinct_ids(project_ids);
    let category_ids = distinct_ids(category_ids);

    let projects = if project_ids.is_empty() {
        Vec::new()
    } else {
        store.projects_by_ids(&project_ids).await?
    };
    let categories = if category_ids.is_empty() {
        Vec::new()
    } else {
        store.categories_by_ids(&category_ids).await?
    };

    Ok(ReferenceSet::new(projects, categories))
}

/// Make sure `refs` knows the project of every id in `project_ids`,
/// fetching the missing ones in one lookup.
pub async fn complete_projects<S>(
    store: &mut S,
    refs: &mut ReferenceSet,
    project_ids: impl IntoIterator<Item = DbId>,
) -> Result<(), CoreError>
where
    S: EntityStore + ?Sized,
{
    let missing = refs.missing_projects(&distinct_ids(project_ids));
    if !missing.is_empty() {
        refs.extend_projects(store.projects_by_ids(&missing).await?);
    }
    Ok(())
}
