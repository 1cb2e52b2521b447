use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::trip::{NewTrip, Trip, TripWithRelations};
use crate::utils::errors::AppResult;

#[async_trait]
pub trait TripRepository: Send + Sync {
    async fn create(&self, trip: NewTrip) -> AppResult<Trip>;
    /// Trips of one vehicle whose start lies in `[from, to)`
    async fn find_for_vehicle_started_between(
        &self,
        vehicle_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Trip>>;
    /// All trips whose start lies in `[from, to)`, joined with vehicle plate
    /// and driver email, ordered by start time
    async fn find_started_between_with_relations(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<TripWithRelations>>;
    async fn delete_all(&self) -> AppResult<u64>;
}

pub struct PgTripRepository {
    pool: PgPool,
}

impl PgTripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TripRepository for PgTripRepository {
    async fn create(&self, trip: NewTrip) -> AppResult<Trip> {
        let trip = sqlx::query_as::<_, Trip>(
            r#"
            INSERT INTO trips (id, vehicle_id, user_id, start_time, end_time, distance_km, start_place, end_place)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(trip.vehicle_id)
        .bind(trip.user_id)
        .bind(trip.start_time)
        .bind(trip.end_time)
        .bind(trip.distance_km)
        .bind(trip.start_place)
        .bind(trip.end_place)
        .fetch_one(&self.pool)
        .await?;

        Ok(trip)
    }

    async fn find_for_vehicle_started_between(
        &self,
        vehicle_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Trip>> {
        let trips = sqlx::query_as::<_, Trip>(
            r#"
            SELECT * FROM trips
            WHERE vehicle_id = $1 AND start_time >= $2 AND start_time < $3
            ORDER BY start_time
            "#,
        )
        .bind(vehicle_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(trips)
    }

    async fn find_started_between_with_relations(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<TripWithRelations>> {
        let rows = sqlx::query_as::<_, TripWithRelations>(
            r#"
            SELECT t.id, v.plate_number, u.email AS driver_email,
                   t.start_time, t.end_time, t.distance_km, t.start_place, t.end_place
            FROM trips t
            JOIN vehicles v ON v.id = t.vehicle_id
            LEFT JOIN users u ON u.id = t.user_id
            WHERE t.start_time >= $1 AND t.start_time < $2
            ORDER BY t.start_time
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM trips").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
