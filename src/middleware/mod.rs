//! HTTP middleware: authentication and CORS

pub mod auth;
pub mod cors;

pub use auth::{require_auth, AuthenticatedUser};
pub use cors::cors_middleware_with_origins;
