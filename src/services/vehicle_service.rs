//! Vehicle directory and per-day status resolution

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::vehicle::{
    NewVehicle, Page, ResolvedStatus, StatusSource, Vehicle, VehicleQuery, VehicleStatus,
    VehicleStatusRecord,
};
use crate::repositories::{TripRepository, VehicleRepository, VehicleStatusRepository};
use crate::utils::errors::{not_found_error, AppResult};
use crate::utils::time::day_window;

const DERIVED_NOTE: &str = "derived from trips";

pub struct VehicleService {
    vehicles: Arc<dyn VehicleRepository>,
    statuses: Arc<dyn VehicleStatusRepository>,
    trips: Arc<dyn TripRepository>,
}

impl VehicleService {
    pub fn new(
        vehicles: Arc<dyn VehicleRepository>,
        statuses: Arc<dyn VehicleStatusRepository>,
        trips: Arc<dyn TripRepository>,
    ) -> Self {
        Self {
            vehicles,
            statuses,
            trips,
        }
    }

    pub async fn list(&self, query: &VehicleQuery) -> AppResult<Page<Vehicle>> {
        self.vehicles.list(query).await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Vehicle> {
        self.vehicles
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))
    }

    pub async fn upsert_by_plate(&self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        self.vehicles.upsert_by_plate(vehicle).await
    }

    /// Stores the explicit status for `(vehicle_id, date)`, replacing any previous one
    pub async fn record_status(
        &self,
        vehicle_id: Uuid,
        date: NaiveDate,
        status: VehicleStatus,
        odometer: Option<i32>,
    ) -> AppResult<VehicleStatusRecord> {
        let record = self
            .statuses
            .upsert(VehicleStatusRecord {
                vehicle_id,
                date,
                status,
                odometer,
            })
            .await?;

        info!(%vehicle_id, %date, status = status.as_str(), "Vehicle status recorded");
        Ok(record)
    }

    /// Recorded status for the day if there is one, otherwise `in_use` when
    /// any trip started that day (UTC) and `available` when none did.
    /// Derived results are never persisted.
    pub async fn status_by_date(&self, vehicle_id: Uuid, date: NaiveDate) -> AppResult<ResolvedStatus> {
        if let Some(record) = self.statuses.find(vehicle_id, date).await? {
            return Ok(record.into());
        }

        let (start, end) = day_window(date);
        let trips = self
            .trips
            .find_for_vehicle_started_between(vehicle_id, start, end)
            .await?;
        debug!(%vehicle_id, %date, trips = trips.len(), "Deriving status from trips");

        let status = if trips.is_empty() {
            VehicleStatus::Available
        } else {
            VehicleStatus::InUse
        };

        Ok(ResolvedStatus {
            vehicle_id,
            date,
            status,
            odometer: None,
            source: StatusSource::Derived,
            note: Some(DERIVED_NOTE.to_string()),
        })
    }
}
