//! Shared utilities
//!
//! Error handling, request extractors, validation helpers and UTC
//! calendar-day arithmetic.

pub mod errors;
pub mod extract;
pub mod time;
pub mod validation;
