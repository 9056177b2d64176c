use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const MILLIS_PER_YEAR: i64 = 365 * 24 * 60 * 60 * 1000;

/// User entity as persisted.
///
/// `username` is the natural key and never changes after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Stored lowercase
    pub first_name: String,
    /// Stored lowercase, empty when not given
    pub last_name: String,
    pub birth_date: NaiveDate,
    /// Unique; never included in any response
    pub email: String,
    /// Argon2 PHC string; never included in any response
    pub password_hash: String,
    /// Unique, immutable
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whole years since `birth_date`, counting every year as 365 days.
    pub fn age(&self, now: DateTime<Utc>) -> i64 {
        let born = self.birth_date.and_time(chrono::NaiveTime::MIN).and_utc();
        (now - born).num_milliseconds().div_euclid(MILLIS_PER_YEAR)
    }

    /// Capitalized first and last name.
    ///
    /// Differs from the legacy output on an empty last name: this yields
    /// `"Amy"` where the legacy service returned `"Amy "`.
    pub fn full_name(&self) -> String {
        let first = capitalize(&self.first_name);
        let last = capitalize(&self.last_name);
        if last.is_empty() {
            first
        } else {
            format!("{} {}", first, last)
        }
    }

    /// Apply a validated change set in place.
    pub fn apply_changes(&mut self, changes: &UserChanges) {
        if let Some(ref first_name) = changes.first_name {
            self.first_name = first_name.clone();
        }
        if let Some(ref last_name) = changes.last_name {
            self.last_name = last_name.clone();
        }
        if let Some(birth_date) = changes.birth_date {
            self.birth_date = birth_date;
        }
        if let Some(ref email) = changes.email {
            self.email = email.clone();
        }
        if let Some(ref hash) = changes.password_hash {
            self.password_hash = hash.clone();
        }
        self.updated_at = changes.updated_at;
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Create request body.
///
/// Decoded from the raw JSON object by
/// [`decode_create`](crate::validation::decode_create) so that mistyped
/// fields surface as validation errors. Strings are trimmed, and names
/// lowercased, before validation.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateUser {
    #[schema(example = "amy")]
    pub first_name: String,
    #[schema(example = "lee")]
    pub last_name: Option<String>,
    /// `YYYY-MM-DD`, or an RFC 3339 timestamp whose UTC date is used
    #[schema(value_type = String, format = Date, example = "1990-05-01")]
    pub birth_date: Option<NaiveDate>,
    #[schema(example = "amy@example.com")]
    pub email: String,
    /// 8 to 20 characters
    #[schema(example = "secret123")]
    pub password: String,
    #[schema(example = "amy")]
    pub username: String,
}

/// Decoded update request. Only the mutable fields exist here; the raw JSON
/// object is checked against [`MUTABLE_FIELDS`] before it is decoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Wire names of the fields an update may touch.
pub const MUTABLE_FIELDS: [&str; 5] = ["firstName", "lastName", "birthDate", "email", "password"];

/// Update request body, for API documentation only. The handler accepts any
/// JSON object and rejects keys outside this set.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserBody {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[schema(value_type = Option<String>, format = Date)]
    pub birth_date: Option<NaiveDate>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Persisted change set produced by a validated update.
#[derive(Debug, Clone, PartialEq)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub email: Option<String>,
    /// Set only when the password changed
    pub password_hash: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Count filter; unset fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    pub birth_date: Option<NaiveDate>,
    /// Inclusive lower bound on `created_at`
    pub created_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `created_at`
    pub created_before: Option<DateTime<Utc>>,
}

impl UserFilter {
    pub fn born_on(date: NaiveDate) -> Self {
        Self {
            birth_date: Some(date),
            ..Self::default()
        }
    }

    pub fn created_between(from: DateTime<Utc>, before: DateTime<Utc>) -> Self {
        Self {
            created_from: Some(from),
            created_before: Some(before),
            ..Self::default()
        }
    }

    pub fn matches(&self, user: &User) -> bool {
        self.birth_date.is_none_or(|date| user.birth_date == date)
            && self.created_from.is_none_or(|from| user.created_at >= from)
            && self.created_before.is_none_or(|before| user.created_at < before)
    }
}

/// Standard projection: everything except email and password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub first_name: String,
    pub last_name: String,
    #[schema(value_type = String, format = Date)]
    pub birth_date: NaiveDate,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Whole years, 365-day approximation
    pub age: i64,
    pub full_name: String,
}

impl UserResponse {
    pub fn from_user(user: User, now: DateTime<Utc>) -> Self {
        Self {
            age: user.age(now),
            full_name: user.full_name(),
            first_name: user.first_name,
            last_name: user.last_name,
            birth_date: user.birth_date,
            username: user.username,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from_user(user, Utc::now())
    }
}

/// Read projection. Drops first and last name, adds the two counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[schema(value_type = String, format = Date)]
    pub birth_date: NaiveDate,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub age: i64,
    pub full_name: String,
    /// Other users sharing this birth date
    pub same_birth_date_count: u64,
    /// Users created this calendar month, store-wide
    pub new_monthly_users: u64,
}

/// Body of a password check.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct VerifyPasswordRequest {
    #[schema(example = "secret123")]
    pub password: String,
}

/// Returned when the password matches; a mismatch is a 401.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VerifyPasswordResponse {
    pub username: String,
    pub verified: bool,
}

/// Lenient birth date parsing shared by create and update.
pub(crate) mod birth_date {
    use chrono::{DateTime, NaiveDate};

    /// `YYYY-MM-DD`, or an RFC 3339 timestamp reduced to its UTC date.
    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.to_utc().date_naive())
        })
    }
}
