//! Repository for the `clients` table.

use sqlx::PgPool;
use timekeep_core::types::DbId;

use crate::models::client::{ClientRow, CreateClient};

/// Column list for clients queries.
const COLUMNS: &str = "id, name, created_at, updated_at";

/// Provides CRUD operations for clients.
pub struct ClientRepo;

impl ClientRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ClientRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE id = $1");
        sqlx::query_as::<_, ClientRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Create a new client, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateClient) -> Result<ClientRow, sqlx::Error> {
        let query = format!("INSERT INTO clients (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, ClientRow>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }
}
