//! Vehicle model
//!
//! Vehicles, their per-day status records, and the listing query used by
//! the directory endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Vehicle status - maps the `vehicle_status` ENUM
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "vehicle_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Available,
    InUse,
    Maintenance,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "available",
            VehicleStatus::InUse => "in_use",
            VehicleStatus::Maintenance => "maintenance",
        }
    }
}

/// Row of the `vehicles` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,
    pub plate_number: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Upsert payload, keyed by `plate_number`
#[derive(Debug, Clone)]
pub struct NewVehicle {
    pub plate_number: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
}

/// Explicit status for one vehicle on one calendar day (UTC)
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleStatusRecord {
    pub vehicle_id: Uuid,
    pub date: NaiveDate,
    pub status: VehicleStatus,
    pub odometer: Option<i32>,
}

/// Where a resolved status came from
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusSource {
    Recorded,
    Derived,
}

/// Status of a vehicle on a day, either recorded or inferred from trips
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStatus {
    pub vehicle_id: Uuid,
    pub date: NaiveDate,
    pub status: VehicleStatus,
    pub odometer: Option<i32>,
    pub source: StatusSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl From<VehicleStatusRecord> for ResolvedStatus {
    fn from(record: VehicleStatusRecord) -> Self {
        Self {
            vehicle_id: record.vehicle_id,
            date: record.date,
            status: record.status,
            odometer: record.odometer,
            source: StatusSource::Recorded,
            note: None,
        }
    }
}

/// Filter and pagination for the vehicle listing
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleQuery {
    pub page: u32,
    pub page_size: u32,
    pub q: Option<String>,
}

impl Default for VehicleQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            q: None,
        }
    }
}

impl VehicleQuery {
    /// Normalizes the raw parameters: pages start at 1, page size is
    /// clamped to `1..=MAX_PAGE_SIZE`, blank search terms are dropped.
    pub fn new(page: Option<u32>, page_size: Option<u32>, q: Option<String>) -> Self {
        let q = q
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());
        Self {
            page: page.unwrap_or(DEFAULT_PAGE).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
            q,
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    /// Case-insensitive substring match over plate, brand and model
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        let Some(q) = &self.q else {
            return true;
        };
        let needle = q.to_lowercase();
        [
            Some(vehicle.plate_number.as_str()),
            vehicle.brand.as_deref(),
            vehicle.model.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// One page of results plus the total count before slicing
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle(plate: &str, brand: Option<&str>, model: Option<&str>) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            plate_number: plate.to_string(),
            brand: brand.map(str::to_string),
            model: model.map(str::to_string),
            year: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_query_defaults_and_clamping() {
        let query = VehicleQuery::new(None, None, None);
        assert_eq!(query, VehicleQuery::default());

        let query = VehicleQuery::new(Some(0), Some(500), Some("   ".into()));
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, MAX_PAGE_SIZE);
        assert_eq!(query.q, None);

        let query = VehicleQuery::new(Some(3), Some(0), None);
        assert_eq!(query.page_size, 1);
        assert_eq!(query.offset(), 2);
    }

    #[test]
    fn test_query_matches_any_field_case_insensitively() {
        let query = VehicleQuery::new(None, None, Some("toyota".into()));
        assert!(query.matches(&vehicle("B-1000-AA", Some("Toyota"), Some("Avanza"))));
        assert!(!query.matches(&vehicle("B-1001-BB", Some("Honda"), Some("Brio"))));

        let query = VehicleQuery::new(None, None, Some("1001".into()));
        assert!(query.matches(&vehicle("B-1001-BB", None, None)));

        let query = VehicleQuery::new(None, None, Some("XPAN".into()));
        assert!(query.matches(&vehicle("D-1003-DV", Some("Mitsubishi"), Some("Xpander"))));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&VehicleStatus::InUse).unwrap(),
            "\"in_use\""
        );
        assert_eq!(VehicleStatus::Maintenance.as_str(), "maintenance");
    }
}
