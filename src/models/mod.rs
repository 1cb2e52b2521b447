//! Data models
//!
//! Row types for the PostgreSQL schema and the value types the services
//! pass around.

pub mod auth;
pub mod refresh_token;
pub mod trip;
pub mod user;
pub mod vehicle;
