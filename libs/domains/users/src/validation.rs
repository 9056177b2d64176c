//! Normalization and validation of user input.
//!
//! Create and update share one rule set, expressed as a [`UserDraft`] that is
//! built from the incoming fields (plus the stored record for updates) and
//! validated with `validator`.

use std::borrow::Cow;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, MUTABLE_FIELDS, UpdateUser, User, birth_date};

/// Candidate record, checked before anything is hashed or stored.
///
/// `password` is `None` on updates that keep the stored hash.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct UserDraft {
    #[serde(rename = "firstName")]
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,

    #[serde(rename = "lastName")]
    pub last_name: String,

    #[serde(rename = "birthDate")]
    #[validate(required(message = "Birth date is required"))]
    pub birth_date: Option<NaiveDate>,

    #[validate(email(message = "Provided email is of incorrect format!"))]
    pub email: String,

    #[serde(skip_serializing)]
    #[validate(length(min = 8, max = 20, message = "Password must be 8 to 20 characters"))]
    pub password: Option<String>,

    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
}

impl UserDraft {
    pub fn from_create(input: &CreateUser) -> Self {
        Self {
            first_name: normalize_name(&input.first_name),
            last_name: input.last_name.as_deref().map(normalize_name).unwrap_or_default(),
            birth_date: input.birth_date,
            email: input.email.trim().to_string(),
            password: Some(input.password.trim().to_string()),
            username: input.username.trim().to_string(),
        }
    }

    /// The stored record with `update` laid over it. `update` must already be
    /// normalized.
    pub fn merged(existing: &User, update: &UpdateUser) -> Self {
        Self {
            first_name: update
                .first_name
                .clone()
                .unwrap_or_else(|| existing.first_name.clone()),
            last_name: update
                .last_name
                .clone()
                .unwrap_or_else(|| existing.last_name.clone()),
            birth_date: update.birth_date.or(Some(existing.birth_date)),
            email: update.email.clone().unwrap_or_else(|| existing.email.clone()),
            password: update.password.clone(),
            username: existing.username.clone(),
        }
    }

    /// Run the rule set, returning the field errors on failure.
    pub fn check(&self) -> UserResult<()> {
        self.validate().map_err(UserError::ValidationFailed)
    }
}

/// Trim and lowercase a name.
pub fn normalize_name(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Wire names read from a create object. Other keys are ignored.
const CREATE_FIELDS: [&str; 6] = [
    "firstName",
    "lastName",
    "birthDate",
    "email",
    "password",
    "username",
];

/// Decode a raw create object.
///
/// `null` counts as absent. A value of the wrong type is a field error, and
/// when there is one the rule failures of the rest of the record are reported
/// with it as a single `ValidationFailed`.
pub fn decode_create(body: &Map<String, Value>) -> UserResult<CreateUser> {
    let mut input = CreateUser::default();
    let mut errors = ValidationErrors::new();

    for field in CREATE_FIELDS {
        let Some(value) = body.get(field).filter(|v| !v.is_null()) else {
            continue;
        };

        let decoded = match field {
            "birthDate" => match value.as_str() {
                Some(raw) if raw.trim().is_empty() => Ok(()),
                _ => date_value(field, value).map(|v| input.birth_date = Some(v)),
            },
            _ => string_value(field, value).map(|v| match field {
                "firstName" => input.first_name = v,
                "lastName" => input.last_name = Some(v),
                "email" => input.email = v,
                "password" => input.password = v,
                _ => input.username = v,
            }),
        };
        if let Err(e) = decoded {
            errors.add(field, e);
        }
    }

    if errors.is_empty() {
        return Ok(input);
    }

    if let Err(rules) = UserDraft::from_create(&input).validate() {
        let rule_errors = rules.field_errors();
        for field in CREATE_FIELDS {
            if errors.field_errors().contains_key(field) {
                continue;
            }
            for error in rule_errors.get(field).into_iter().flat_map(|list| list.iter()) {
                errors.add(field, error.clone());
            }
        }
    }

    Err(UserError::ValidationFailed(errors))
}

/// Decode a raw update object.
///
/// Fails with `NoUpdatesProvided` for an empty object, with
/// `InvalidUpdateFields` (naming every rejected key) when any key is outside
/// [`MUTABLE_FIELDS`], and with `ValidationFailed` when a value has the wrong
/// type. Returned values are normalized.
pub fn decode_update(fields: &Map<String, Value>) -> UserResult<UpdateUser> {
    if fields.is_empty() {
        return Err(UserError::NoUpdatesProvided);
    }

    let rejected: Vec<String> = fields
        .keys()
        .filter(|key| !MUTABLE_FIELDS.contains(&key.as_str()))
        .cloned()
        .collect();
    if !rejected.is_empty() {
        return Err(UserError::InvalidUpdateFields(rejected));
    }

    let mut update = UpdateUser::default();
    let mut errors = ValidationErrors::new();

    for field in MUTABLE_FIELDS {
        let Some(value) = fields.get(field) else {
            continue;
        };

        match field {
            "firstName" => match string_value(field, value) {
                Ok(v) => update.first_name = Some(normalize_name(&v)),
                Err(e) => errors.add(field, e),
            },
            "lastName" => match string_value(field, value) {
                Ok(v) => update.last_name = Some(normalize_name(&v)),
                Err(e) => errors.add(field, e),
            },
            "birthDate" => match date_value(field, value) {
                Ok(v) => update.birth_date = Some(v),
                Err(e) => errors.add(field, e),
            },
            "email" => match string_value(field, value) {
                Ok(v) => update.email = Some(v.trim().to_string()),
                Err(e) => errors.add(field, e),
            },
            "password" => match string_value(field, value) {
                Ok(v) => update.password = Some(v.trim().to_string()),
                Err(e) => errors.add(field, e),
            },
            _ => {}
        }
    }

    if errors.is_empty() {
        Ok(update)
    } else {
        Err(UserError::ValidationFailed(errors))
    }
}

fn string_value(field: &str, value: &Value) -> Result<String, ValidationError> {
    serde_json::from_value::<String>(value.clone()).map_err(|_| {
        ValidationError::new("invalid_type")
            .with_message(Cow::Owned(format!("{} must be a string", field)))
    })
}

fn date_value(field: &str, value: &Value) -> Result<NaiveDate, ValidationError> {
    value.as_str().and_then(birth_date::parse).ok_or_else(|| {
        ValidationError::new("invalid_date")
            .with_message(Cow::Owned(format!("{} must be a YYYY-MM-DD date", field)))
    })
}
