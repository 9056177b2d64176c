use chrono::{Local, Utc};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::instrument;

use crate::date_window::month_bounds;
use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, User, UserChanges, UserFilter, UserProfile, UserResponse};
use crate::password::{Argon2Hasher, PasswordHasher};
use crate::repository::UserRepository;
use crate::validation::{UserDraft, decode_update};

/// Service layer for User business logic
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
    hasher: Arc<dyn PasswordHasher>,
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            hasher: Arc::clone(&self.hasher),
        }
    }
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self::with_hasher(repository, Arc::new(Argon2Hasher::new()))
    }

    pub fn with_hasher(repository: R, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            repository: Arc::new(repository),
            hasher,
        }
    }

    /// Validate, hash the password and insert.
    #[instrument(skip(self, input), fields(username = %input.username.trim()))]
    pub async fn create_user(&self, input: CreateUser) -> UserResult<UserResponse> {
        let draft = UserDraft::from_create(&input);
        draft.check()?;

        let (Some(birth_date), Some(password)) = (draft.birth_date, draft.password.as_deref())
        else {
            return Err(UserError::Internal("validated draft is incomplete".into()));
        };

        let password_hash = self.hasher.hash(password)?;
        let now = Utc::now();

        let user = User {
            first_name: draft.first_name,
            last_name: draft.last_name,
            birth_date,
            email: draft.email,
            password_hash,
            username: draft.username,
            created_at: now,
            updated_at: now,
        };

        let created = self.repository.insert(user).await?;
        Ok(UserResponse::from_user(created, now))
    }

    /// Profile with the birth date and monthly sign-up counts.
    #[instrument(skip(self))]
    pub async fn get_user(&self, username: &str) -> UserResult<UserProfile> {
        let user = self.find(username).await?;

        let same_birth_date_count = self
            .repository
            .count(UserFilter::born_on(user.birth_date))
            .await?
            .saturating_sub(1);

        let (month_start, next_month_start) = month_bounds(&Local::now());
        let new_monthly_users = self
            .repository
            .count(UserFilter::created_between(month_start, next_month_start))
            .await?;

        let now = Utc::now();
        Ok(UserProfile {
            age: user.age(now),
            full_name: user.full_name(),
            birth_date: user.birth_date,
            username: user.username,
            created_at: user.created_at,
            updated_at: user.updated_at,
            same_birth_date_count,
            new_monthly_users,
        })
    }

    /// Apply a raw JSON object of changes. Whole-or-nothing: any rejected key
    /// or invalid value leaves the record untouched.
    #[instrument(skip(self, body), fields(keys = ?body.keys().collect::<Vec<_>>()))]
    pub async fn update_user(
        &self,
        username: &str,
        body: Map<String, Value>,
    ) -> UserResult<UserResponse> {
        let existing = self.find(username).await?;

        let update = decode_update(&body)?;
        UserDraft::merged(&existing, &update).check()?;

        let password_hash = match update.password.as_deref() {
            Some(password) => Some(self.hasher.hash(password)?),
            None => None,
        };

        let now = Utc::now();
        let changes = UserChanges {
            first_name: update.first_name,
            last_name: update.last_name,
            birth_date: update.birth_date,
            email: update.email,
            password_hash,
            updated_at: now,
        };

        let updated = self
            .repository
            .update(username, changes)
            .await?
            .ok_or_else(|| UserError::NotFound(username.to_string()))?;

        Ok(UserResponse::from_user(updated, now))
    }

    /// Delete and return the removed user; `None` when there was nothing to delete.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, username: &str) -> UserResult<Option<UserResponse>> {
        let removed = self.repository.delete(username).await?;
        Ok(removed.map(UserResponse::from))
    }

    /// Check a plaintext password against the stored hash.
    #[instrument(skip(self, password))]
    pub async fn verify_password(&self, username: &str, password: &str) -> UserResult<bool> {
        let user = self.find(username).await?;
        self.hasher.verify(password.trim(), &user.password_hash)
    }

    async fn find(&self, username: &str) -> UserResult<User> {
        self.repository
            .find_by_username(username)
            .await?
            .ok_or_else(|| UserError::NotFound(username.to_string()))
    }
}
