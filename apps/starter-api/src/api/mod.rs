//! API routes module
//!
//! Everything here is nested under /api by axum_helpers::create_router.

pub mod health;
pub mod users;

use axum::{Router, extract::DefaultBodyLimit};

use crate::state::AppState;

/// JSON bodies larger than this are rejected with 413.
pub const BODY_LIMIT_BYTES: usize = 10 * 1024;

/// Create all API routes
pub fn routes(state: &AppState) -> eyre::Result<Router> {
    Ok(Router::new()
        .nest("/users", users::router(state)?)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, UserStoreKind};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn state_without_mongo(user_store: UserStoreKind) -> AppState {
        let mut config = temp_env::with_vars_unset(["MONGODB_URL", "MONGO_URL", "MONGO_HOST"], || {
            Config::from_env().unwrap()
        });
        config.user_store = user_store;
        AppState {
            config,
            mongo: None,
        }
    }

    fn memory_state() -> AppState {
        state_without_mongo(UserStoreKind::Memory)
    }

    fn post_users(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/users")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_oversized_body_is_rejected() {
        let padding = "x".repeat(BODY_LIMIT_BYTES);
        let body = format!(r#"{{"firstName":"{}"}}"#, padding);

        let response = routes(&memory_state())
            .unwrap()
            .oneshot(post_users(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_users_routes_are_mounted() {
        let body = r#"{"firstName":"amy","birthDate":"1990-05-01","email":"amy@example.com","password":"secret123","username":"amy"}"#;

        let response = routes(&memory_state())
            .unwrap()
            .oneshot(post_users(body.to_string()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn test_mongo_store_without_connection_is_an_error() {
        let Err(err) = routes(&state_without_mongo(UserStoreKind::Mongo)) else {
            panic!("expected an error without a MongoDB connection");
        };
        assert!(err.to_string().contains("USER_STORE=mongo"));
    }
}
