use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::vehicle::{NewVehicle, Page, Vehicle, VehicleQuery, VehicleStatusRecord};
use crate::utils::errors::{map_unique_violation, AppResult};

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// Filtered, paginated listing ordered by plate number
    async fn list(&self, query: &VehicleQuery) -> AppResult<Page<Vehicle>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>>;
    /// Create the vehicle with this plate, or overwrite its brand, model and
    /// year with the given values. `None` clears a stored value.
    async fn upsert_by_plate(&self, vehicle: NewVehicle) -> AppResult<Vehicle>;
}

#[async_trait]
pub trait VehicleStatusRepository: Send + Sync {
    async fn find(&self, vehicle_id: Uuid, date: NaiveDate)
        -> AppResult<Option<VehicleStatusRecord>>;
    /// Keeps at most one record per vehicle per day
    async fn upsert(&self, record: VehicleStatusRecord) -> AppResult<VehicleStatusRecord>;
    async fn delete_all(&self) -> AppResult<u64>;
}

pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `%term%` for ILIKE, with the wildcard characters escaped
fn like_pattern(q: &str) -> String {
    let escaped = q
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl VehicleRepository for PgVehicleRepository {
    async fn list(&self, query: &VehicleQuery) -> AppResult<Page<Vehicle>> {
        let pattern = query.q.as_deref().map(like_pattern);

        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM vehicles
            WHERE $1::text IS NULL
               OR plate_number ILIKE $1 OR brand ILIKE $1 OR model ILIKE $1
            "#,
        )
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT * FROM vehicles
            WHERE $1::text IS NULL
               OR plate_number ILIKE $1 OR brand ILIKE $1 OR model ILIKE $1
            ORDER BY plate_number
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(pattern.as_deref())
        .bind(i64::from(query.page_size))
        .bind(query.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(Page {
            items,
            total: total.max(0) as u64,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    async fn upsert_by_plate(&self, vehicle: NewVehicle) -> AppResult<Vehicle> {
        sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (id, plate_number, brand, model, year, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (plate_number) DO UPDATE
            SET brand = EXCLUDED.brand,
                model = EXCLUDED.model,
                year = EXCLUDED.year
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(vehicle.plate_number)
        .bind(vehicle.brand)
        .bind(vehicle.model)
        .bind(vehicle.year)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Vehicle", "plate_number"))
    }
}

pub struct PgVehicleStatusRepository {
    pool: PgPool,
}

impl PgVehicleStatusRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleStatusRepository for PgVehicleStatusRepository {
    async fn find(
        &self,
        vehicle_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Option<VehicleStatusRecord>> {
        let record = sqlx::query_as::<_, VehicleStatusRecord>(
            r#"
            SELECT vehicle_id, date, status, odometer
            FROM vehicle_statuses
            WHERE vehicle_id = $1 AND date = $2
            "#,
        )
        .bind(vehicle_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn upsert(&self, record: VehicleStatusRecord) -> AppResult<VehicleStatusRecord> {
        let record = sqlx::query_as::<_, VehicleStatusRecord>(
            r#"
            INSERT INTO vehicle_statuses (vehicle_id, date, status, odometer)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (vehicle_id, date) DO UPDATE
            SET status = EXCLUDED.status, odometer = EXCLUDED.odometer
            RETURNING vehicle_id, date, status, odometer
            "#,
        )
        .bind(record.vehicle_id)
        .bind(record.date)
        .bind(record.status)
        .bind(record.odometer)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM vehicle_statuses")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("toyota"), "%toyota%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
