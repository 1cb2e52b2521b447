//! Seeds a development database
//!
//! Idempotent: accounts and vehicles are upserted, trips and status records
//! are wiped and recreated.

use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveDate, Utc};
use dotenvy::dotenv;
use tracing::info;

use fleet_backend::config::EnvironmentConfig;
use fleet_backend::database;
use fleet_backend::models::trip::NewTrip;
use fleet_backend::models::user::{NewUser, User, ROLE_ADMIN, ROLE_USER};
use fleet_backend::models::vehicle::{NewVehicle, VehicleStatus};
use fleet_backend::repositories::Repositories;
use fleet_backend::services::{BcryptHasher, PasswordHasher, VehicleService};
use fleet_backend::utils::time::day_start;

const SEED_PASSWORD: &str = "password123";
const VEHICLE_COUNT: usize = 20;

const AREAS: [&str; 9] = ["B", "D", "E", "F", "H", "K", "L", "N", "W"];
const BRANDS: [(&str, &[&str]); 5] = [
    ("Toyota", &["Avanza", "Rush", "Innova"]),
    ("Honda", &["Brio", "BR-V", "HR-V"]),
    ("Suzuki", &["Ertiga", "XL7"]),
    ("Mitsubishi", &["Xpander", "Pajero Sport"]),
    ("Daihatsu", &["Xenia", "Terios"]),
];

/// `B-1000-AA`, `D-1001-BH`, ...
fn plate_number(i: usize) -> String {
    let area = AREAS[i % AREAS.len()];
    let l1 = char::from(b'A' + (i % 26) as u8);
    let l2 = char::from(b'A' + ((i * 7) % 26) as u8);
    format!("{}-{}-{}{}", area, 1000 + i, l1, l2)
}

fn seed_vehicle(i: usize) -> NewVehicle {
    let (brand, models) = BRANDS[i % BRANDS.len()];
    NewVehicle {
        plate_number: plate_number(i),
        brand: Some(brand.to_string()),
        model: Some(models[i % models.len()].to_string()),
        year: Some(2016 + (i % 10) as i32),
    }
}

async fn ensure_user(
    repos: &Repositories,
    hasher: &dyn PasswordHasher,
    email: &str,
    name: &str,
    role: &str,
) -> Result<User> {
    if let Some(existing) = repos.users.find_by_email(email).await? {
        info!(%email, "User already present");
        return Ok(existing);
    }

    let user = repos
        .users
        .create(NewUser {
            email: email.to_string(),
            name: Some(name.to_string()),
            password_hash: hasher.hash(SEED_PASSWORD).await?,
            role: role.to_string(),
        })
        .await?;
    info!(%email, %role, "User created");
    Ok(user)
}

async fn seed(repos: &Repositories, hasher: &dyn PasswordHasher, today: NaiveDate) -> Result<()> {
    let trips_removed = repos.trips.delete_all().await?;
    let statuses_removed = repos.vehicle_statuses.delete_all().await?;
    info!(trips_removed, statuses_removed, "Cleared trips and status records");

    ensure_user(repos, hasher, "admin@example.com", "Admin", ROLE_ADMIN).await?;
    let driver = ensure_user(repos, hasher, "user@example.com", "User", ROLE_USER).await?;

    let vehicles = VehicleService::new(
        repos.vehicles.clone(),
        repos.vehicle_statuses.clone(),
        repos.trips.clone(),
    );
    let mut seeded = Vec::with_capacity(VEHICLE_COUNT);
    for i in 0..VEHICLE_COUNT {
        seeded.push(vehicles.upsert_by_plate(seed_vehicle(i)).await?);
    }
    info!(count = seeded.len(), "Vehicles upserted");

    let (v1, v2) = match seeded.as_slice() {
        [first, second, ..] => (first.id, second.id),
        _ => return Err(anyhow!("expected at least two vehicles")),
    };

    let two_days_ago = day_start(today - Duration::days(2));
    let yesterday = day_start(today - Duration::days(1));
    let trips = [
        (two_days_ago + Duration::hours(8), 2, 42.1, "Indramayu", "Bandung"),
        (yesterday + Duration::hours(14), 2, 38.4, "Bandung", "Indramayu"),
    ];
    for (start, hours, km, from, to) in trips {
        repos
            .trips
            .create(NewTrip {
                vehicle_id: v1,
                user_id: driver.id,
                start_time: start,
                end_time: Some(start + Duration::hours(hours)),
                distance_km: Some(km),
                start_place: Some(from.to_string()),
                end_place: Some(to.to_string()),
            })
            .await?;
    }

    vehicles
        .record_status(v1, today, VehicleStatus::Available, Some(12345))
        .await?;
    vehicles
        .record_status(v1, today - Duration::days(1), VehicleStatus::InUse, Some(12300))
        .await?;
    vehicles
        .record_status(v2, today, VehicleStatus::Maintenance, Some(5800))
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = EnvironmentConfig::from_env()?;
    let pool = database::connect(config.require_database_url()?).await?;
    let repos = Repositories::postgres(pool.clone());
    let hasher = BcryptHasher::new(config.bcrypt_cost);

    seed(&repos, &hasher, Utc::now().date_naive()).await?;

    pool.close().await;
    info!("✅ Seed completed");
    Ok(())
}
