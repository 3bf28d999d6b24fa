//! Report generation over filtered timesheet records.

use std::collections::HashMap;

use timekeep_core::error::CoreError;
use timekeep_core::references::distinct_ids;
use timekeep_core::report::{self, ReportFilter, ReportRow};
use timekeep_core::store::EntityStore;

use crate::validation::load_references;

/// Builds report rows; stateless.
pub struct ReportService;

impl ReportService {
    /// Rows for every entry passing `filter`, ordered by date then entry id.
    pub async fn generate<S>(store: &mut S, filter: &ReportFilter) -> Result<Vec<ReportRow>, CoreError>
    where
        S: EntityStore + ?Sized,
    {
        let entries = store.entries_matching(filter).await?;
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let user_ids = distinct_ids(entries.iter().map(|e| e.user_id));
        let users: HashMap<_, _> = store
            .users_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        let refs = load_references(
            store,
            entries.iter().map(|e| e.project_id),
            entries.iter().map(|e| e.category_id),
        )
        .await?;

        let rows = report::assemble(&entries, &users, &refs)?;
        tracing::debug!(rows = rows.len(), ?filter, "Report generated");
        Ok(rows)
    }
}
