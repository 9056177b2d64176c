//! HTTP middleware: CORS, security headers and request logging.
//!
//! ```ignore
//! use axum_helpers::http::{cors_layer_from_env, request_trace_layer, security_headers};
//!
//! let app = Router::new()
//!     .layer(request_trace_layer())
//!     .layer(axum::middleware::from_fn(security_headers))
//!     .layer(cors_layer_from_env()?);
//! ```

pub mod cors;
pub mod request_log;
pub mod security;

pub use cors::{cors_layer_from_env, create_cors_layer, create_permissive_cors_layer};
pub use request_log::{RequestTraceLayer, request_trace_layer};
pub use security::security_headers;
