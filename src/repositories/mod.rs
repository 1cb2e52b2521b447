//! Persistence layer
//!
//! One trait per entity, a PostgreSQL implementation of each, and an
//! in-memory store implementing all of them. Services only see the traits.

pub mod memory;
pub mod refresh_token_repository;
pub mod trip_repository;
pub mod user_repository;
pub mod vehicle_repository;

use sqlx::PgPool;
use std::sync::Arc;

pub use memory::MemoryStore;
pub use refresh_token_repository::{PgRefreshTokenRepository, RefreshTokenRepository};
pub use trip_repository::{PgTripRepository, TripRepository};
pub use user_repository::{PgUserRepository, UserRepository};
pub use vehicle_repository::{
    PgVehicleRepository, PgVehicleStatusRepository, VehicleRepository, VehicleStatusRepository,
};

/// Repository handles shared by the services
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
    pub vehicles: Arc<dyn VehicleRepository>,
    pub vehicle_statuses: Arc<dyn VehicleStatusRepository>,
    pub trips: Arc<dyn TripRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            refresh_tokens: Arc::new(PgRefreshTokenRepository::new(pool.clone())),
            vehicles: Arc::new(PgVehicleRepository::new(pool.clone())),
            vehicle_statuses: Arc::new(PgVehicleStatusRepository::new(pool.clone())),
            trips: Arc::new(PgTripRepository::new(pool)),
        }
    }

    /// Every handle points at the same store, so cascades behave as in Postgres
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(MemoryStore::new()))
    }

    pub fn from_store(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            refresh_tokens: store.clone(),
            vehicles: store.clone(),
            vehicle_statuses: store.clone(),
            trips: store,
        }
    }
}
