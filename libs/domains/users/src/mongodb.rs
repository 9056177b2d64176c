//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use mongodb::bson::{self, Document, doc, oid::ObjectId};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserChanges, UserFilter};
use crate::repository::UserRepository;

pub const COLLECTION: &str = "users";

/// Stored shape of a user. Dates are BSON dates; the password hash lives
/// under `password`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    first_name: String,
    #[serde(default)]
    last_name: String,
    birth_date: bson::DateTime,
    email: String,
    password: String,
    username: String,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

fn to_bson_datetime(dt: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(dt.timestamp_millis())
}

fn date_to_bson(date: NaiveDate) -> bson::DateTime {
    to_bson_datetime(date.and_time(NaiveTime::MIN).and_utc())
}

fn from_bson_datetime(dt: bson::DateTime) -> UserResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(dt.timestamp_millis())
        .ok_or_else(|| UserError::Internal(format!("stored date out of range: {}", dt)))
}

impl From<&User> for UserDocument {
    fn from(user: &User) -> Self {
        Self {
            id: None,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            birth_date: date_to_bson(user.birth_date),
            email: user.email.clone(),
            password: user.password_hash.clone(),
            username: user.username.clone(),
            created_at: to_bson_datetime(user.created_at),
            updated_at: to_bson_datetime(user.updated_at),
        }
    }
}

impl TryFrom<UserDocument> for User {
    type Error = UserError;

    fn try_from(doc: UserDocument) -> UserResult<Self> {
        Ok(Self {
            first_name: doc.first_name,
            last_name: doc.last_name,
            birth_date: from_bson_datetime(doc.birth_date)?.date_naive(),
            email: doc.email,
            password_hash: doc.password,
            username: doc.username,
            created_at: from_bson_datetime(doc.created_at)?,
            updated_at: from_bson_datetime(doc.updated_at)?,
        })
    }
}

/// MongoDB-based user repository
#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<UserDocument>,
}

impl MongoUserRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(COLLECTION),
        }
    }

    /// Unique indexes on `username` and `email`, plain ones on the fields
    /// the profile counts query.
    #[instrument(skip(self))]
    pub async fn init_indexes(&self) -> UserResult<()> {
        let unique = || IndexOptions::builder().unique(true).build();

        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "username": 1 })
                .options(unique())
                .build(),
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(unique())
                .build(),
            IndexModel::builder().keys(doc! { "birthDate": 1 }).build(),
            IndexModel::builder().keys(doc! { "createdAt": 1 }).build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!(collection = COLLECTION, "User indexes ready");
        Ok(())
    }

    fn build_filter(filter: &UserFilter) -> Document {
        let mut query = Document::new();

        if let Some(date) = filter.birth_date {
            query.insert("birthDate", date_to_bson(date));
        }

        let mut created = Document::new();
        if let Some(from) = filter.created_from {
            created.insert("$gte", to_bson_datetime(from));
        }
        if let Some(before) = filter.created_before {
            created.insert("$lt", to_bson_datetime(before));
        }
        if !created.is_empty() {
            query.insert("createdAt", created);
        }

        query
    }

    fn build_set(changes: &UserChanges) -> Document {
        let mut set = Document::new();

        if let Some(ref first_name) = changes.first_name {
            set.insert("firstName", first_name);
        }
        if let Some(ref last_name) = changes.last_name {
            set.insert("lastName", last_name);
        }
        if let Some(birth_date) = changes.birth_date {
            set.insert("birthDate", date_to_bson(birth_date));
        }
        if let Some(ref email) = changes.email {
            set.insert("email", email);
        }
        if let Some(ref hash) = changes.password_hash {
            set.insert("password", hash);
        }
        set.insert("updatedAt", to_bson_datetime(changes.updated_at));

        set
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(username = %user.username))]
    async fn insert(&self, user: User) -> UserResult<User> {
        self.collection.insert_one(UserDocument::from(&user)).await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> UserResult<Option<User>> {
        self.collection
            .find_one(doc! { "username": username })
            .await?
            .map(User::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn count(&self, filter: UserFilter) -> UserResult<u64> {
        let count = self
            .collection
            .count_documents(Self::build_filter(&filter))
            .await?;
        Ok(count)
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, username: &str, changes: UserChanges) -> UserResult<Option<User>> {
        self.collection
            .find_one_and_update(
                doc! { "username": username },
                doc! { "$set": Self::build_set(&changes) },
            )
            .return_document(ReturnDocument::After)
            .await?
            .map(User::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn delete(&self, username: &str) -> UserResult<Option<User>> {
        self.collection
            .find_one_and_delete(doc! { "username": username })
            .await?
            .map(User::try_from)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn user() -> User {
        let at = Utc.with_ymd_and_hms(2024, 3, 10, 8, 15, 30).unwrap();
        User {
            first_name: "amy".into(),
            last_name: "lee".into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 1).unwrap(),
            email: "amy@example.com".into(),
            password_hash: "$argon2id$hash".into(),
            username: "amy".into(),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_document_uses_wire_names() {
        let doc = bson::to_document(&UserDocument::from(&user())).unwrap();
        assert!(doc.get("_id").is_none());
        assert_eq!(doc.get_str("firstName").unwrap(), "amy");
        assert_eq!(doc.get_str("password").unwrap(), "$argon2id$hash");
        assert!(doc.get_datetime("birthDate").is_ok());
        assert!(doc.get_datetime("createdAt").is_ok());
    }

    #[test]
    fn test_document_converts_back() {
        let original = user();
        let back = User::try_from(UserDocument::from(&original)).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_filter_document() {
        let from = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let query = MongoUserRepository::build_filter(&UserFilter::created_between(from, before));

        let created = query.get_document("createdAt").unwrap();
        assert_eq!(created.get_datetime("$gte").unwrap(), &to_bson_datetime(from));
        assert_eq!(created.get_datetime("$lt").unwrap(), &to_bson_datetime(before));
        assert!(query.get("birthDate").is_none());

        assert!(MongoUserRepository::build_filter(&UserFilter::default()).is_empty());
    }

    #[test]
    fn test_set_document_only_has_changed_fields() {
        let at = Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap();
        let set = MongoUserRepository::build_set(&UserChanges {
            first_name: None,
            last_name: None,
            birth_date: None,
            email: Some("new@example.com".into()),
            password_hash: None,
            updated_at: at,
        });

        assert_eq!(set.len(), 2);
        assert_eq!(set.get_str("email").unwrap(), "new@example.com");
        assert!(set.get("password").is_none());
    }
}
