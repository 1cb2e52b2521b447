//! In-memory repositories
//!
//! A single process-local store implementing every repository trait, with
//! the same uniqueness and cascade rules as the PostgreSQL schema. Used by
//! the test suites and for running the API without a database.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::refresh_token::{NewRefreshToken, RefreshToken};
use crate::models::trip::{NewTrip, Trip, TripWithRelations};
use crate::models::user::{NewUser, User, UserPatch};
use crate::models::vehicle::{NewVehicle, Page, Vehicle, VehicleQuery, VehicleStatusRecord};
use crate::repositories::{
    RefreshTokenRepository, TripRepository, UserRepository, VehicleRepository,
    VehicleStatusRepository,
};
use crate::utils::errors::{conflict_error, AppResult};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    refresh_tokens: HashMap<String, RefreshToken>,
    vehicles: HashMap<Uuid, Vehicle>,
    vehicle_statuses: HashMap<(Uuid, NaiveDate), VehicleStatusRecord>,
    trips: HashMap<Uuid, Trip>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn list(&self) -> AppResult<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(conflict_error("User", "email"));
        }

        let now = Utc::now();
        let row = User {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            password_hash: user.password_hash,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> AppResult<Option<User>> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &patch.email {
            if tables.users.values().any(|u| u.id != id && &u.email == email) {
                return Err(conflict_error("User", "email"));
            }
        }

        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply(user, Utc::now());
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        tables.refresh_tokens.retain(|_, t| t.user_id != id);
        tables.trips.retain(|_, t| t.user_id != id);
        Ok(true)
    }
}

#[async_trait]
impl RefreshTokenRepository for MemoryStore {
    async fn create(&self, token: NewRefreshToken) -> AppResult<RefreshToken> {
        let mut tables = self.tables.write().await;
        if tables.refresh_tokens.contains_key(&token.token) {
            return Err(conflict_error("Refresh token", "token"));
        }

        let row = RefreshToken {
            id: Uuid::new_v4(),
            token: token.token,
            user_id: token.user_id,
            expires_at: token.expires_at,
            revoked_at: None,
            created_at: Utc::now(),
        };
        tables.refresh_tokens.insert(row.token.clone(), row.clone());
        Ok(row)
    }

    async fn find_by_token(&self, token: &str) -> AppResult<Option<RefreshToken>> {
        Ok(self.tables.read().await.refresh_tokens.get(token).cloned())
    }

    async fn revoke(&self, token: &str, at: DateTime<Utc>) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.refresh_tokens.get_mut(token) {
            Some(row) => {
                row.revoked_at.get_or_insert(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl VehicleRepository for MemoryStore {
    async fn list(&self, query: &VehicleQuery) -> AppResult<Page<Vehicle>> {
        let tables = self.tables.read().await;
        let mut matching: Vec<Vehicle> = tables
            .vehicles
            .values()
            .filter(|v| query.matches(v))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.plate_number.cmp(&b.plate_number));

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.page_size as usize)
            .collect();

        Ok(Page { items, total })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        Ok(self.tables.read().await.vehicles.get(&id).cloned())
    }

    async fn upsert_by_plate(&self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables
            .vehicles
            .values_mut()
            .find(|v| v.plate_number == vehicle.plate_number)
        {
            existing.brand = vehicle.brand;
            existing.model = vehicle.model;
            existing.year = vehicle.year;
            return Ok(existing.clone());
        }

        let row = Vehicle {
            id: Uuid::new_v4(),
            plate_number: vehicle.plate_number,
            brand: vehicle.brand,
            model: vehicle.model,
            year: vehicle.year,
            created_at: Utc::now(),
        };
        tables.vehicles.insert(row.id, row.clone());
        Ok(row)
    }
}

#[async_trait]
impl VehicleStatusRepository for MemoryStore {
    async fn find(
        &self,
        vehicle_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Option<VehicleStatusRecord>> {
        let tables = self.tables.read().await;
        Ok(tables.vehicle_statuses.get(&(vehicle_id, date)).cloned())
    }

    async fn upsert(&self, record: VehicleStatusRecord) -> AppResult<VehicleStatusRecord> {
        let mut tables = self.tables.write().await;
        tables
            .vehicle_statuses
            .insert((record.vehicle_id, record.date), record.clone());
        Ok(record)
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let removed = tables.vehicle_statuses.len() as u64;
        tables.vehicle_statuses.clear();
        Ok(removed)
    }
}

#[async_trait]
impl TripRepository for MemoryStore {
    async fn create(&self, trip: NewTrip) -> AppResult<Trip> {
        let mut tables = self.tables.write().await;
        let row = Trip {
            id: Uuid::new_v4(),
            vehicle_id: trip.vehicle_id,
            user_id: trip.user_id,
            start_time: trip.start_time,
            end_time: trip.end_time,
            distance_km: trip.distance_km,
            start_place: trip.start_place,
            end_place: trip.end_place,
        };
        tables.trips.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_for_vehicle_started_between(
        &self,
        vehicle_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Trip>> {
        let tables = self.tables.read().await;
        let mut trips: Vec<Trip> = tables
            .trips
            .values()
            .filter(|t| t.vehicle_id == vehicle_id && t.start_time >= from && t.start_time < to)
            .cloned()
            .collect();
        trips.sort_by_key(|t| t.start_time);
        Ok(trips)
    }

    async fn find_started_between_with_relations(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<TripWithRelations>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<TripWithRelations> = tables
            .trips
            .values()
            .filter(|t| t.start_time >= from && t.start_time < to)
            .filter_map(|t| {
                // inner join on vehicles, left join on users
                let vehicle = tables.vehicles.get(&t.vehicle_id)?;
                Some(TripWithRelations {
                    id: t.id,
                    plate_number: vehicle.plate_number.clone(),
                    driver_email: tables.users.get(&t.user_id).map(|u| u.email.clone()),
                    start_time: t.start_time,
                    end_time: t.end_time,
                    distance_km: t.distance_km,
                    start_place: t.start_place.clone(),
                    end_place: t.end_place.clone(),
                })
            })
            .collect();
        rows.sort_by_key(|r| r.start_time);
        Ok(rows)
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let removed = tables.trips.len() as u64;
        tables.trips.clear();
        Ok(removed)
    }
}
