//! Repository for the `categories` table.

use sqlx::PgPool;
use timekeep_core::types::DbId;

use crate::models::category::{CategoryRow, CreateCategory};

/// Column list for categories queries.
const COLUMNS: &str = "id, name, created_at, updated_at";

/// Provides CRUD operations for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Find categories by ID in one round trip. Unknown IDs are skipped.
    pub async fn find_by_ids(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<CategoryRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = ANY($1) ORDER BY id");
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Create a new category, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCategory,
    ) -> Result<CategoryRow, sqlx::Error> {
        let query = format!("INSERT INTO categories (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }
}
