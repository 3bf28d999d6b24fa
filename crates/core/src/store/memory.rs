//! In-memory [`EntityStore`]: id-keyed tables behind a shared lock.
//!
//! Every [`MemoryStore::session`] shares the same tables but has its own
//! staging area, the same way each request gets its own unit of work over
//! one database. Commits are applied to a copy of the tables and swapped in
//! only if every staged change is valid, so a failed commit leaves the
//! tables untouched. Foreign keys and username uniqueness are enforced at
//! commit time like the database constraints would.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{CommitReceipt, EntityStore, StagedChange, Staging, StoreResult};
use crate::error::StoreError;
use crate::models::{Category, Client, NewTimesheetEntry, NewUser, Project, TimesheetEntry, User};
use crate::report::ReportFilter;
use crate::types::{DbId, WorkDate};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<DbId, User>,
    clients: BTreeMap<DbId, Client>,
    projects: BTreeMap<DbId, Project>,
    categories: BTreeMap<DbId, Category>,
    entries: BTreeMap<DbId, TimesheetEntry>,
    next_user_id: DbId,
    next_client_id: DbId,
    next_project_id: DbId,
    next_category_id: DbId,
    next_entry_id: DbId,
    commits: u64,
}

fn next(counter: &mut DbId) -> DbId {
    *counter += 1;
    *counter
}

impl Tables {
    fn insert_entry(&mut self, new: NewTimesheetEntry) -> StoreResult<TimesheetEntry> {
        self.check_entry_refs(new.user_id, new.project_id, new.category_id)?;
        let entry = new.with_id(next(&mut self.next_entry_id));
        self.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    fn update_entry(&mut self, entry: TimesheetEntry) -> StoreResult<()> {
        match self.entries.get(&entry.id) {
            Some(current) if current.user_id == entry.user_id => {}
            _ => {
                return Err(StoreError::Conflict(format!(
                    "timesheet entry {} no longer exists",
                    entry.id
                )))
            }
        }
        self.check_entry_refs(entry.user_id, entry.project_id, entry.category_id)?;
        self.entries.insert(entry.id, entry);
        Ok(())
    }

    fn insert_user(&mut self, new: NewUser) -> StoreResult<User> {
        if self.users.values().any(|u| u.username == new.username) {
            return Err(StoreError::Conflict(format!(
                "username '{}' is already taken",
                new.username
            )));
        }
        let user = User {
            id: next(&mut self.next_user_id),
            first_name: new.first_name,
            last_name: new.last_name,
            username: new.username,
            password_hash: new.password_hash,
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn check_entry_refs(&self, user_id: DbId, project_id: DbId, category_id: DbId) -> StoreResult<()> {
        if !self.users.contains_key(&user_id) {
            return Err(StoreError::Conflict(format!("user {user_id} does not exist")));
        }
        if !self.projects.contains_key(&project_id) {
            return Err(StoreError::Conflict(format!("project {project_id} does not exist")));
        }
        if !self.categories.contains_key(&category_id) {
            return Err(StoreError::Conflict(format!("category {category_id} does not exist")));
        }
        Ok(())
    }

    fn apply(&mut self, changes: Vec<StagedChange>) -> StoreResult<CommitReceipt> {
        let mut receipt = CommitReceipt::default();
        for change in changes {
            match change {
                StagedChange::InsertEntries(entries) => {
                    for new in entries {
                        receipt.inserted.push(self.insert_entry(new)?);
                        receipt.affected += 1;
                    }
                }
                StagedChange::UpdateEntries(entries) => {
                    for entry in entries {
                        self.update_entry(entry)?;
                        receipt.affected += 1;
                    }
                }
                StagedChange::DeleteEntry(entry) => {
                    if self.entries.remove(&entry.id).is_none() {
                        return Err(StoreError::Conflict(format!(
                            "timesheet entry {} no longer exists",
                            entry.id
                        )));
                    }
                    receipt.affected += 1;
                }
                StagedChange::InsertUser(new) => {
                    receipt.users.push(self.insert_user(new)?);
                    receipt.affected += 1;
                }
            }
        }
        Ok(receipt)
    }
}

/// Arena-backed entity store for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    staging: Staging,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new unit of work over the same tables, with nothing staged.
    pub fn session(&self) -> Self {
        Self {
            tables: Arc::clone(&self.tables),
            staging: Staging::default(),
        }
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // A panic while holding the lock cannot leave a half-applied commit
        // because commits swap in a fully built copy.
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // -- Seeding (reference data is owned by other services) --

    pub fn add_user(&self, first_name: &str, last_name: &str, username: &str) -> User {
        let mut tables = self.tables();
        let user = User {
            id: next(&mut tables.next_user_id),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            username: username.to_string(),
            password_hash: String::new(),
        };
        tables.users.insert(user.id, user.clone());
        user
    }

    pub fn add_client(&self, name: &str) -> Client {
        let mut tables = self.tables();
        let client = Client {
            id: next(&mut tables.next_client_id),
            name: name.to_string(),
        };
        tables.clients.insert(client.id, client.clone());
        client
    }

    pub fn add_project(&self, name: &str, client_id: DbId) -> Project {
        let mut tables = self.tables();
        let project = Project {
            id: next(&mut tables.next_project_id),
            name: name.to_string(),
            client_id,
        };
        tables.projects.insert(project.id, project.clone());
        project
    }

    pub fn add_category(&self, name: &str) -> Category {
        let mut tables = self.tables();
        let category = Category {
            id: next(&mut tables.next_category_id),
            name: name.to_string(),
        };
        tables.categories.insert(category.id, category.clone());
        category
    }

    /// Insert an entry directly, bypassing staging. Foreign keys are checked.
    pub fn add_entry(&self, new: NewTimesheetEntry) -> StoreResult<TimesheetEntry> {
        self.tables().insert_entry(new)
    }

    // -- Inspection --

    /// All entries ordered by id.
    pub fn entries(&self) -> Vec<TimesheetEntry> {
        self.tables().entries.values().cloned().collect()
    }

    pub fn user(&self, id: DbId) -> Option<User> {
        self.tables().users.get(&id).cloned()
    }

    /// Number of successful commits across all sessions.
    pub fn commit_count(&self) -> u64 {
        self.tables().commits
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn user_exists(&mut self, id: DbId) -> StoreResult<bool> {
        Ok(self.tables().users.contains_key(&id))
    }

    async fn users_by_ids(&mut self, ids: &[DbId]) -> StoreResult<Vec<User>> {
        let tables = self.tables();
        Ok(ids.iter().filter_map(|id| tables.users.get(id).cloned()).collect())
    }

    async fn user_by_username(&mut self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .tables()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn projects_by_ids(&mut self, ids: &[DbId]) -> StoreResult<Vec<Project>> {
        let tables = self.tables();
        Ok(ids.iter().filter_map(|id| tables.projects.get(id).cloned()).collect())
    }

    async fn categories_by_ids(&mut self, ids: &[DbId]) -> StoreResult<Vec<Category>> {
        let tables = self.tables();
        Ok(ids.iter().filter_map(|id| tables.categories.get(id).cloned()).collect())
    }

    async fn entries_in_range(
        &mut self,
        user_id: DbId,
        start: WorkDate,
        end: WorkDate,
    ) -> StoreResult<Vec<TimesheetEntry>> {
        Ok(self
            .tables()
            .entries
            .values()
            .filter(|e| e.user_id == user_id && e.work_date >= start && e.work_date <= end)
            .cloned()
            .collect())
    }

    async fn entry_by_id(&mut self, id: DbId) -> StoreResult<Option<TimesheetEntry>> {
        Ok(self.tables().entries.get(&id).cloned())
    }

    async fn entries_matching(&mut self, filter: &ReportFilter) -> StoreResult<Vec<TimesheetEntry>> {
        let tables = self.tables();
        Ok(tables
            .entries
            .values()
            .filter(|e| {
                tables
                    .projects
                    .get(&e.project_id)
                    .is_some_and(|p| filter.matches(e, p.client_id))
            })
            .cloned()
            .collect())
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
        let mut tables = self.tables();
        let mut draft = tables.clone();
        let receipt = draft.apply(changes)?;
        draft.commits += 1;
        *tables = draft;
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn seeded() -> (MemoryStore, User, Project, Category) {
        let store = MemoryStore::new();
        let user = store.add_user("Ada", "Lovelace", "ada");
        let client = store.add_client("Analytical Engines Ltd");
        let project = store.add_project("Engine", client.id);
        let category = store.add_category("Design");
        (store, user, project, category)
    }

    fn new_entry(user: &User, project: &Project, category: &Category, day: &str) -> NewTimesheetEntry {
        NewTimesheetEntry {
            user_id: user.id,
            project_id: project.id,
            category_id: category.id,
            work_date: day.parse().unwrap(),
            hours_worked: dec!(8),
            overtime: dec!(0),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn seeded_ids_start_at_one_per_table() {
        let (_, user, project, category) = seeded();
        assert_eq!(user.id, 1);
        assert_eq!(project.id, 1);
        assert_eq!(category.id, 1);
    }

    #[tokio::test]
    async fn staged_insert_is_invisible_until_commit() {
        let (store, user, project, category) = seeded();
        let mut session = store.session();
        session.stage_insert(vec![new_entry(&user, &project, &category, "2024-06-25")]);

        assert!(session.has_staged());
        assert!(store.entries().is_empty());

        let receipt = session.commit().await.unwrap();
        assert_eq!(receipt.affected, 1);
        assert_eq!(receipt.inserted[0].id, 1);
        assert_eq!(store.entries().len(), 1);
        assert!(!session.has_staged());
        assert_eq!(store.commit_count(), 1);
    }

    #[tokio::test]
    async fn failed_commit_applies_nothing() {
        let (store, user, project, category) = seeded();
        let mut bad = new_entry(&user, &project, &category, "2024-06-25");
        bad.project_id = 999;

        let mut session = store.session();
        session.stage_insert(vec![new_entry(&user, &project, &category, "2024-06-25"), bad]);
        let err = session.commit().await.unwrap_err();

        assert_matches!(err, StoreError::Conflict(msg) if msg.contains("project 999"));
        assert!(store.entries().is_empty());
        assert_eq!(store.commit_count(), 0);
        assert!(!session.has_staged());
    }

    #[tokio::test]
    async fn update_of_vanished_entry_conflicts() {
        let (store, user, project, category) = seeded();
        let entry = store.add_entry(new_entry(&user, &project, &category, "2024-06-25")).unwrap();

        let mut deleter = store.session();
        deleter.stage_delete(entry.clone());
        deleter.commit().await.unwrap();

        let mut updater = store.session();
        updater.stage_update(vec![entry]);
        assert_matches!(updater.commit().await, Err(StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn range_query_is_inclusive_and_scoped_to_user() {
        let (store, user, project, category) = seeded();
        let other = store.add_user("Charles", "Babbage", "charles");
        for day in ["2024-06-24", "2024-06-25", "2024-06-26", "2024-06-27"] {
            store.add_entry(new_entry(&user, &project, &category, day)).unwrap();
        }
        store.add_entry(new_entry(&other, &project, &category, "2024-06-25")).unwrap();

        let mut session = store.session();
        let found = session
            .entries_in_range(user.id, "2024-06-25".parse().unwrap(), "2024-06-26".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|e| e.user_id == user.id));
    }

    #[tokio::test]
    async fn duplicate_username_conflicts_at_commit() {
        let (store, ..) = seeded();
        let mut session = store.session();
        session.stage_user(NewUser {
            first_name: "Ada".into(),
            last_name: "Byron".into(),
            username: "ada".into(),
            password_hash: "x".into(),
        });
        assert_matches!(session.commit().await, Err(StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn discard_drops_staged_changes() {
        let (store, user, project, category) = seeded();
        let mut session = store.session();
        session.stage_insert(vec![new_entry(&user, &project, &category, "2024-06-25")]);
        session.discard();
        let receipt = session.commit().await.unwrap();
        assert_eq!(receipt.affected, 0);
        assert!(store.entries().is_empty());
    }
}
