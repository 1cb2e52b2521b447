use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::dto::vehicle_dto::{ListVehiclesQuery, StatusQuery, VehicleListResponse};
use crate::models::vehicle::{ResolvedStatus, Vehicle, VehicleQuery};
use crate::state::AppState;
use crate::utils::errors::{field_validation_error, AppResult};
use crate::utils::extract::ValidatedQuery;
use crate::utils::validation::validate_date;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles))
        .route("/:id", get(get_vehicle))
        .route("/:id/status", get(get_vehicle_status))
}

async fn list_vehicles(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<ListVehiclesQuery>,
) -> AppResult<Json<VehicleListResponse>> {
    let query = VehicleQuery::from(params);
    let page = state.vehicles.list(&query).await?;
    Ok(Json(VehicleListResponse::new(page, &query)))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vehicle>> {
    Ok(Json(state.vehicles.get(id).await?))
}

async fn get_vehicle_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedQuery(params): ValidatedQuery<StatusQuery>,
) -> AppResult<Json<ResolvedStatus>> {
    let date = validate_date(&params.date).map_err(|e| field_validation_error("date", e))?;

    // 404 for unknown vehicles rather than a derived "available"
    state.vehicles.get(id).await?;

    Ok(Json(state.vehicles.status_by_date(id, date).await?))
}
