//! Fleet management backend
//!
//! Accounts with JWT sessions, a vehicle directory with per-day status,
//! and trip reports exported as spreadsheets.

pub mod config;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use state::AppState;
