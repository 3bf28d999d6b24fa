//! User registration and authentication.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use timekeep_core::error::CoreError;
use timekeep_core::models::{NewUser, User};
use timekeep_core::store::EntityStore;
use timekeep_core::types::DbId;
use timekeep_events::{DomainEvent, EventBus};
use validator::Validate;

use crate::config::ServiceConfig;
use crate::password::{hash_password, validate_password_strength, verify_password};
use crate::validation::ensure_nothing_staged;

/// Same message for unknown user and wrong password.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Registration input.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(length(min = 1, max = 20))]
    pub first_name: String,
    #[validate(length(min = 1, max = 20))]
    pub last_name: String,
    #[validate(length(min = 1, max = 23))]
    pub username: String,
    pub password: String,
}

/// Public view of a user; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
        }
    }
}

pub struct UserService {
    events: Arc<EventBus>,
    config: ServiceConfig,
}

impl UserService {
    pub fn new(events: Arc<EventBus>, config: ServiceConfig) -> Self {
        Self { events, config }
    }

    /// Create an account and publish `user.created` once it is committed.
    pub async fn register<S>(&self, store: &mut S, input: RegisterUser) -> Result<UserView, CoreError>
    where
        S: EntityStore + ?Sized,
    {
        ensure_nothing_staged(store)?;
        input
            .validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        validate_password_strength(&input.password, self.config.password_min_length)?;

        if store.user_by_username(&input.username).await?.is_some() {
            tracing::warn!(username = %input.username, "Registration refused, username taken");
            return Err(CoreError::Conflict(format!(
                "Username '{}' is already taken",
                input.username
            )));
        }

        let password_hash = hash_password(&input.password)?;
        store.stage_user(NewUser {
            first_name: input.first_name,
            last_name: input.last_name,
            username: input.username,
            password_hash,
        });
        let receipt = store.commit().await?;
        let user = receipt
            .users
            .first()
            .ok_or_else(|| CoreError::Internal("Commit returned no user".into()))?;

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        self.events.publish(DomainEvent::UserCreated {
            user_id: user.id,
            username: user.username.clone(),
        });

        Ok(UserView::from(user))
    }

    /// Check a username/password pair.
    pub async fn authenticate<S>(
        &self,
        store: &mut S,
        username: &str,
        password: &str,
    ) -> Result<UserView, CoreError>
    where
        S: EntityStore + ?Sized,
    {
        let user = store
            .user_by_username(username)
            .await?
            .ok_or_else(|| CoreError::Unauthorized(INVALID_CREDENTIALS.into()))?;

        if !verify_password(password, &user.password_hash)? {
            tracing::warn!(username, "Authentication failed");
            return Err(CoreError::Unauthorized(INVALID_CREDENTIALS.into()));
        }
        Ok(UserView::from(&user))
    }
}
