//! Reusable OpenAPI response types for consistent API documentation.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error",
    content_type = "application/json",
    example = json!({
        "status": 500,
        "code": 2003,
        "error": "DATABASE_ERROR",
        "message": "Database is unavailable"
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Validation Error",
    content_type = "application/json",
    example = json!({
        "status": 400,
        "code": 1001,
        "error": "VALIDATION_ERROR",
        "message": "Validation failed",
        "details": {
            "password": [{
                "code": "length",
                "message": null,
                "params": {"min": 8, "max": 20, "value": "short"}
            }]
        }
    })
)]
pub struct BadRequestValidationResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Not Found",
    content_type = "application/json",
    example = json!({
        "status": 404,
        "code": 1004,
        "error": "NOT_FOUND",
        "message": "User with username amy Not Found!"
    })
)]
pub struct NotFoundResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Unauthorized",
    content_type = "application/json",
    example = json!({
        "status": 401,
        "code": 1006,
        "error": "UNAUTHORIZED",
        "message": "Invalid credentials"
    })
)]
pub struct UnauthorizedResponse(pub ErrorResponse);
