//! Batch reference resolution (project, category, client).
//!
//! A [`ReferenceSet`] is built from one batched project lookup and one
//! batched category lookup. Request items are then checked against it in
//! submission order; the first unresolved reference fails the whole batch.

use std::collections::{BTreeSet, HashMap};

use crate::error::CoreError;
use crate::models::{Category, Project};
use crate::types::DbId;

/// Distinct ids in ascending order, suitable for a single `IN`/`ANY` lookup.
pub fn distinct_ids<I>(ids: I) -> Vec<DbId>
where
    I: IntoIterator<Item = DbId>,
{
    ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

/// A project/category pair that passed resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub project_id: DbId,
    pub category_id: DbId,
    /// Client owning the project.
    pub client_id: DbId,
}

/// Projects and categories fetched for one batch, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    projects: HashMap<DbId, Project>,
    categories: HashMap<DbId, Category>,
}

impl ReferenceSet {
    pub fn new(projects: Vec<Project>, categories: Vec<Category>) -> Self {
        Self {
            projects: projects.into_iter().map(|p| (p.id, p)).collect(),
            categories: categories.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    /// Add projects fetched after construction. Existing ids are kept.
    pub fn extend_projects(&mut self, projects: Vec<Project>) {
        for project in projects {
            self.projects.entry(project.id).or_insert(project);
        }
    }

    pub fn project(&self, id: DbId) -> Option<&Project> {
        self.projects.get(&id)
    }

    pub fn category(&self, id: DbId) -> Option<&Category> {
        self.categories.get(&id)
    }

    /// Ids from `wanted` that are not loaded yet.
    pub fn missing_projects(&self, wanted: &[DbId]) -> Vec<DbId> {
        wanted
            .iter()
            .copied()
            .filter(|id| !self.projects.contains_key(id))
            .collect()
    }

    /// Client of the given project.
    pub fn client_of(&self, project_id: DbId) -> Result<DbId, CoreError> {
        self.project(project_id)
            .map(|p| p.client_id)
            .ok_or(CoreError::not_found("project", project_id))
    }

    /// Resolve one request item. The project is checked before the category.
    pub fn resolve(&self, project_id: DbId, category_id: DbId) -> Result<Resolved, CoreError> {
        let client_id = self.client_of(project_id)?;
        if !self.categories.contains_key(&category_id) {
            return Err(CoreError::not_found("category", category_id));
        }
        Ok(Resolved {
            project_id,
            category_id,
            client_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn project(id: DbId, client_id: DbId) -> Project {
        Project {
            id,
            name: format!("Project {id}"),
            client_id,
        }
    }

    fn category(id: DbId) -> Category {
        Category {
            id,
            name: format!("Category {id}"),
        }
    }

    fn refs() -> ReferenceSet {
        ReferenceSet::new(
            vec![project(1, 10), project(2, 20)],
            vec![category(1), category(2)],
        )
    }

    #[test]
    fn distinct_ids_sorts_and_dedups() {
        assert_eq!(distinct_ids([3, 1, 3, 2, 1]), vec![1, 2, 3]);
        assert!(distinct_ids(Vec::<DbId>::new()).is_empty());
    }

    #[test]
    fn resolve_returns_client_of_project() {
        let resolved = refs().resolve(2, 1).unwrap();
        assert_eq!(resolved.client_id, 20);
        assert_eq!(resolved.project_id, 2);
        assert_eq!(resolved.category_id, 1);
    }

    #[test]
    fn missing_project_reported_before_missing_category() {
        let err = refs().resolve(999, 999).unwrap_err();
        assert_matches!(err, CoreError::NotFound { entity: "project", id: 999 });
    }

    #[test]
    fn missing_category_reported_when_project_exists() {
        let err = refs().resolve(1, 42).unwrap_err();
        assert_matches!(err, CoreError::NotFound { entity: "category", id: 42 });
    }

    #[test]
    fn resolve_keeps_clients_per_row() {
        let refs = refs();
        let clients: Vec<_> = [(1, 1), (2, 2), (1, 2)]
            .into_iter()
            .map(|(p, c)| refs.resolve(p, c).unwrap().client_id)
            .collect();
        assert_eq!(clients, vec![10, 20, 10]);
    }

    #[test]
    fn extend_projects_fills_gaps_only() {
        let mut set = ReferenceSet::new(vec![project(1, 10)], Vec::new());
        assert_eq!(set.missing_projects(&[1, 2]), vec![2]);
        set.extend_projects(vec![project(1, 99), project(2, 20)]);
        assert_eq!(set.client_of(1).unwrap(), 10);
        assert_eq!(set.client_of(2).unwrap(), 20);
        assert!(set.missing_projects(&[1, 2]).is_empty());
    }
}
