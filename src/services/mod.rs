//! Business services
//!
//! Each service owns the repository handles it needs and is shared through
//! `AppState` behind an `Arc`.

pub mod auth_service;
pub mod jwt_service;
pub mod password;
pub mod report_service;
pub mod user_service;
pub mod vehicle_service;

pub use auth_service::AuthService;
pub use jwt_service::JwtService;
pub use password::{BcryptHasher, PasswordHasher};
pub use report_service::{ReportService, SpreadsheetEncoder, XlsxEncoder};
pub use user_service::UserService;
pub use vehicle_service::VehicleService;
