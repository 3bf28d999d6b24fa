//! Repository for the `projects` table.

use sqlx::PgPool;
use timekeep_core::types::DbId;

use crate::models::project::{CreateProject, ProjectRow};

/// Column list for projects queries.
const COLUMNS: &str = "id, name, client_id, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Find projects by ID in one round trip. Unknown IDs are skipped.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<ProjectRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = ANY($1) ORDER BY id");
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Create a new project, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<ProjectRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (name, client_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectRow>(&query)
            .bind(&input.name)
            .bind(input.client_id)
            .fetch_one(pool)
            .await
    }
}
