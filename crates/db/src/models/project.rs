use serde::Deserialize;
use sqlx::FromRow;
use timekeep_core::models::Project;
use timekeep_core::types::{DbId, Timestamp};

/// A row from the `projects` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: DbId,
    pub name: String,
    pub client_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project under an existing client.
#[derive(Debug, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub client_id: DbId,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            client_id: row.client_id,
        }
    }
}
