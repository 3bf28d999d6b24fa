use crate::types::DbId;

/// Failure reported by an entity store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend (database driver, pool) failed.
    #[error("Storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A staged change no longer matches the stored state at commit time.
    #[error("Commit conflict: {0}")]
    Conflict(String),
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Store(StoreError),
}

/// Stable, matchable classification of a [`CoreError`].
///
/// The outer transport layer maps these to status codes; `NotFound` and
/// `Validation` are both client-input failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    Unauthorized,
    Internal,
    Store,
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: DbId) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Internal(_) => ErrorKind::Internal,
            Self::Store(StoreError::Conflict(_)) => ErrorKind::Conflict,
            Self::Store(StoreError::Backend(_)) => ErrorKind::Store,
        }
    }

    /// Entity kind named by a `NotFound` error (`"user"`, `"project"`, ...).
    pub fn missing_entity(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { entity, .. } => Some(entity),
            _ => None,
        }
    }

    /// Whether the caller supplied bad input (as opposed to a server fault).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NotFound | ErrorKind::Validation | ErrorKind::Conflict | ErrorKind::Unauthorized
        )
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}
