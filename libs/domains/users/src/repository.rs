use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserChanges, UserFilter};

/// Repository trait for User persistence, keyed by username.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. `DuplicateKey` when the username or email is taken.
    async fn insert(&self, user: User) -> UserResult<User>;

    async fn find_by_username(&self, username: &str) -> UserResult<Option<User>>;

    /// Count users matching every set field of `filter`.
    async fn count(&self, filter: UserFilter) -> UserResult<u64>;

    /// Apply `changes` in one step and return the updated user, or `None`
    /// when no user has this username.
    async fn update(&self, username: &str, changes: UserChanges) -> UserResult<Option<User>>;

    /// Remove the user and return what was stored.
    async fn delete(&self, username: &str) -> UserResult<Option<User>>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if users.contains_key(&user.username) {
            return Err(UserError::duplicate("username"));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::duplicate("email"));
        }

        users.insert(user.username.clone(), user.clone());

        tracing::info!(username = %user.username, "Created user");
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(username).cloned())
    }

    async fn count(&self, filter: UserFilter) -> UserResult<u64> {
        let users = self.users.read().await;
        Ok(users.values().filter(|u| filter.matches(u)).count() as u64)
    }

    async fn update(&self, username: &str, changes: UserChanges) -> UserResult<Option<User>> {
        let mut users = self.users.write().await;

        if let Some(ref email) = changes.email {
            let taken = users
                .values()
                .any(|u| u.username != username && &u.email == email);
            if taken {
                return Err(UserError::duplicate("email"));
            }
        }

        let Some(user) = users.get_mut(username) else {
            return Ok(None);
        };
        user.apply_changes(&changes);

        tracing::info!(username = %username, "Updated user");
        Ok(Some(user.clone()))
    }

    async fn delete(&self, username: &str) -> UserResult<Option<User>> {
        let mut users = self.users.write().await;
        let removed = users.remove(username);

        if removed.is_some() {
            tracing::info!(username = %username, "Deleted user");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    fn user(username: &str, email: &str, birth: (i32, u32, u32), created: DateTime<Utc>) -> User {
        User {
            first_name: username.to_string(),
            last_name: String::new(),
            birth_date: NaiveDate::from_ymd_opt(birth.0, birth.1, birth.2).unwrap(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            username: username.to_string(),
            created_at: created,
            updated_at: created,
        }
    }

    fn jan(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = InMemoryUserRepository::new();
        repo.insert(user("amy", "amy@example.com", (1990, 5, 1), jan(1)))
            .await
            .unwrap();

        let found = repo.find_by_username("amy").await.unwrap();
        assert_eq!(found.map(|u| u.email), Some("amy@example.com".to_string()));
        assert!(repo.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_and_email() {
        let repo = InMemoryUserRepository::new();
        repo.insert(user("amy", "amy@example.com", (1990, 5, 1), jan(1)))
            .await
            .unwrap();

        let same_name = repo
            .insert(user("amy", "other@example.com", (1990, 5, 1), jan(1)))
            .await;
        assert!(matches!(same_name, Err(UserError::DuplicateKey { ref field }) if field == "username"));

        let same_email = repo
            .insert(user("bob", "amy@example.com", (1990, 5, 1), jan(1)))
            .await;
        assert!(matches!(same_email, Err(UserError::DuplicateKey { ref field }) if field == "email"));
    }

    #[tokio::test]
    async fn test_count_filters() {
        let repo = InMemoryUserRepository::new();
        repo.insert(user("amy", "a@example.com", (1990, 5, 1), jan(5))).await.unwrap();
        repo.insert(user("bob", "b@example.com", (1990, 5, 1), jan(20))).await.unwrap();
        repo.insert(user("cat", "c@example.com", (1985, 1, 1), jan(31))).await.unwrap();

        let born = NaiveDate::from_ymd_opt(1990, 5, 1).unwrap();
        assert_eq!(repo.count(UserFilter::born_on(born)).await.unwrap(), 2);
        assert_eq!(repo.count(UserFilter::default()).await.unwrap(), 3);
        assert_eq!(
            repo.count(UserFilter::created_between(jan(1), jan(20))).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_update_applies_changes() {
        let repo = InMemoryUserRepository::new();
        repo.insert(user("amy", "amy@example.com", (1990, 5, 1), jan(1)))
            .await
            .unwrap();

        let changes = UserChanges {
            first_name: Some("amelia".into()),
            last_name: None,
            birth_date: None,
            email: None,
            password_hash: None,
            updated_at: jan(2),
        };
        let updated = repo.update("amy", changes.clone()).await.unwrap().unwrap();
        assert_eq!(updated.first_name, "amelia");
        assert_eq!(updated.updated_at, jan(2));
        assert_eq!(updated.created_at, jan(1));

        assert!(repo.update("nobody", changes).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_rejects_taken_email() {
        let repo = InMemoryUserRepository::new();
        repo.insert(user("amy", "amy@example.com", (1990, 5, 1), jan(1))).await.unwrap();
        repo.insert(user("bob", "bob@example.com", (1990, 5, 1), jan(1))).await.unwrap();

        let changes = UserChanges {
            first_name: None,
            last_name: None,
            birth_date: None,
            email: Some("amy@example.com".into()),
            password_hash: None,
            updated_at: jan(2),
        };
        assert!(matches!(
            repo.update("bob", changes.clone()).await,
            Err(UserError::DuplicateKey { .. })
        ));
        // Keeping your own email is not a clash.
        assert!(repo.update("amy", changes).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let repo = InMemoryUserRepository::new();
        repo.insert(user("amy", "amy@example.com", (1990, 5, 1), jan(1)))
            .await
            .unwrap();

        assert!(repo.delete("amy").await.unwrap().is_some());
        assert!(repo.delete("amy").await.unwrap().is_none());
    }
}
