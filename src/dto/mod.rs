//! Request and response bodies of the HTTP API

pub mod auth_dto;
pub mod report_dto;
pub mod user_dto;
pub mod vehicle_dto;
