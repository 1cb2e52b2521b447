//! Trip model

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Row of the `trips` table
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub user_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub distance_km: Option<f64>,
    pub start_place: Option<String>,
    pub end_place: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTrip {
    pub vehicle_id: Uuid,
    pub user_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub distance_km: Option<f64>,
    pub start_place: Option<String>,
    pub end_place: Option<String>,
}

/// Trip joined with its vehicle plate and driver email
#[derive(Debug, Clone, FromRow)]
pub struct TripWithRelations {
    pub id: Uuid,
    pub plate_number: String,
    pub driver_email: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub distance_km: Option<f64>,
    pub start_place: Option<String>,
    pub end_place: Option<String>,
}
