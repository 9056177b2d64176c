use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    JsonBody,
    errors::responses::{
        BadRequestValidationResponse, InternalServerErrorResponse, NotFoundResponse,
        UnauthorizedResponse,
    },
};
use serde_json::{Map, Value};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{UserError, UserResult};
use crate::models::{
    CreateUser, UpdateUserBody, UserProfile, UserResponse, VerifyPasswordRequest,
    VerifyPasswordResponse,
};
use crate::repository::UserRepository;
use crate::service::UserService;
use crate::validation::decode_create;

/// OpenAPI documentation for Users API
#[derive(OpenApi)]
#[openapi(
    paths(create_user, get_user, update_user, delete_user, verify_password),
    components(
        schemas(
            CreateUser,
            UpdateUserBody,
            UserResponse,
            UserProfile,
            VerifyPasswordRequest,
            VerifyPasswordResponse
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Users", description = "User management endpoints (MongoDB)")
    )
)]
pub struct ApiDoc;

/// Create the users router with all HTTP endpoints
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", post(create_user))
        .route(
            "/{username}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .route("/{username}/verify-password", post(verify_password))
        .with_state(shared_service)
}

/// Create a new user
#[utoipa::path(
    post,
    path = "",
    tag = "Users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> UserResult<impl IntoResponse> {
    let input = decode_create(&body)?;
    let user = service.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a user's profile by username
#[utoipa::path(
    get,
    path = "/{username}",
    tag = "Users",
    params(
        ("username" = String, Path, description = "Username")
    ),
    responses(
        (status = 200, description = "User found", body = UserProfile),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(username): Path<String>,
) -> UserResult<Json<UserProfile>> {
    let profile = service.get_user(&username).await?;
    Ok(Json(profile))
}

/// Update a user
///
/// Only `firstName`, `lastName`, `birthDate`, `email` and `password` may be
/// sent; any other key rejects the whole request.
#[utoipa::path(
    patch,
    path = "/{username}",
    tag = "Users",
    params(
        ("username" = String, Path, description = "Username")
    ),
    request_body = UpdateUserBody,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(username): Path<String>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> UserResult<Json<UserResponse>> {
    let user = service.update_user(&username, body).await?;
    Ok(Json(user))
}

/// Delete a user
///
/// Returns the deleted user, or `null` when it did not exist.
#[utoipa::path(
    delete,
    path = "/{username}",
    tag = "Users",
    params(
        ("username" = String, Path, description = "Username")
    ),
    responses(
        (status = 200, description = "Deleted user, or null", body = Option<UserResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(username): Path<String>,
) -> UserResult<Json<Option<UserResponse>>> {
    let removed = service.delete_user(&username).await?;
    Ok(Json(removed))
}

/// Check a user's password
#[utoipa::path(
    post,
    path = "/{username}/verify-password",
    tag = "Users",
    params(
        ("username" = String, Path, description = "Username")
    ),
    request_body = VerifyPasswordRequest,
    responses(
        (status = 200, description = "Password matches", body = VerifyPasswordResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn verify_password<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(username): Path<String>,
    JsonBody(input): JsonBody<VerifyPasswordRequest>,
) -> UserResult<Json<VerifyPasswordResponse>> {
    if !service.verify_password(&username, &input.password).await? {
        return Err(UserError::InvalidCredentials);
    }

    Ok(Json(VerifyPasswordResponse {
        username,
        verified: true,
    }))
}
