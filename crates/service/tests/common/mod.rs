//! Shared fixtures for service integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal::Decimal;
use timekeep_core::models::{Category, NewTimesheetEntry, Project, TimesheetEntry, User};
use timekeep_core::store::memory::MemoryStore;
use timekeep_core::timesheet::{TimesheetRequest, TimesheetUpdateRequest};
use timekeep_core::types::{DbId, WorkDate};
use timekeep_events::EventBus;
use tracing_subscriber::EnvFilter;

/// A store seeded with two clients, one project each, two categories and
/// one user.
pub struct World {
    pub store: MemoryStore,
    pub events: Arc<EventBus>,
    pub user: User,
    /// Belongs to client `client_a`.
    pub rocket: Project,
    /// Belongs to client `client_b`.
    pub bridge: Project,
    pub client_a: DbId,
    pub client_b: DbId,
    pub design: Category,
    pub build: Category,
}

impl World {
    pub fn new() -> Self {
        init_tracing();
        let store = MemoryStore::new();
        let user = store.add_user("Ada", "Lovelace", "ada");
        let client_a = store.add_client("Acme").id;
        let client_b = store.add_client("Globex").id;
        let rocket = store.add_project("Rocket", client_a);
        let bridge = store.add_project("Bridge", client_b);
        let design = store.add_category("Design");
        let build = store.add_category("Build");
        Self {
            store,
            events: Arc::new(EventBus::default()),
            user,
            rocket,
            bridge,
            client_a,
            client_b,
            design,
            build,
        }
    }

    /// Insert an entry for the seeded user directly, bypassing services.
    pub fn seed_entry(
        &self,
        project: &Project,
        category: &Category,
        date: &str,
        hours: Decimal,
        overtime: Decimal,
    ) -> TimesheetEntry {
        self.store
            .add_entry(NewTimesheetEntry {
                user_id: self.user.id,
                project_id: project.id,
                category_id: category.id,
                work_date: day(date),
                hours_worked: hours,
                overtime,
                description: format!("{} work", project.name),
            })
            .unwrap()
    }
}

/// Route service logs to the test harness; `RUST_LOG=debug` shows them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn day(s: &str) -> WorkDate {
    s.parse().unwrap()
}

pub fn row(project_id: DbId, category_id: DbId, hours: Decimal) -> TimesheetRequest {
    TimesheetRequest {
        project_id,
        category_id,
        hours_worked: hours,
        overtime: Decimal::ZERO,
        description: String::new(),
    }
}

pub fn revision(
    id: DbId,
    project_id: DbId,
    category_id: DbId,
    hours: Decimal,
    description: &str,
) -> TimesheetUpdateRequest {
    TimesheetUpdateRequest {
        id,
        project_id,
        category_id,
        hours_worked: hours,
        overtime: Decimal::ZERO,
        description: description.to_string(),
    }
}
