//! Shared application state
//!
//! Cloned into every handler by axum. Everything inside is either immutable
//! configuration or an `Arc` to a service.

use std::sync::Arc;

use crate::config::EnvironmentConfig;
use crate::repositories::Repositories;
use crate::services::{
    AuthService, BcryptHasher, JwtService, PasswordHasher, ReportService, UserService,
    VehicleService, XlsxEncoder,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<EnvironmentConfig>,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub vehicles: Arc<VehicleService>,
    pub reports: Arc<ReportService>,
}

impl AppState {
    pub fn new(config: EnvironmentConfig, repos: Repositories) -> Self {
        let hasher: Arc<dyn PasswordHasher> = Arc::new(BcryptHasher::new(config.bcrypt_cost));
        let jwt = Arc::new(JwtService::new(&config));

        let auth = AuthService::new(
            repos.users.clone(),
            repos.refresh_tokens.clone(),
            hasher.clone(),
            jwt,
            config.rotate_refresh_tokens,
        );
        let users = UserService::new(repos.users.clone(), hasher);
        let vehicles = VehicleService::new(
            repos.vehicles.clone(),
            repos.vehicle_statuses.clone(),
            repos.trips.clone(),
        );
        let reports = ReportService::new(repos.trips, Arc::new(XlsxEncoder));

        Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            users: Arc::new(users),
            vehicles: Arc::new(vehicles),
            reports: Arc::new(reports),
        }
    }
}
