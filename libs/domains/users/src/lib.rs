//! Users Domain
//!
//! Create, read, update and delete users keyed by username, with MongoDB
//! storage.
//!
//! # Features
//!
//! - Input normalization and validation shared by create and update
//! - Whitelisted partial updates (`firstName`, `lastName`, `birthDate`,
//!   `email`, `password`)
//! - Password hashing with Argon2, re-hashed only when the password changes
//! - Read profile with same-birth-date and new-this-month counts
//! - Calendar-month helpers in [`date_window`]
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, password hashing, derived counts
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + in-memory and MongoDB)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, request bodies, projections
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{handlers, InMemoryUserRepository, UserService};
//!
//! let service = UserService::new(InMemoryUserRepository::new());
//! let router: axum::Router = handlers::router(service);
//! ```

pub mod date_window;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod password;
pub mod repository;
pub mod service;
pub mod validation;

pub use date_window::DateWindow;
pub use error::{UserError, UserResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateUser, MUTABLE_FIELDS, User, UserChanges, UserFilter, UserProfile, UserResponse,
    VerifyPasswordRequest, VerifyPasswordResponse,
};
pub use mongodb::MongoUserRepository;
pub use password::{Argon2Hasher, PasswordHasher};
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
