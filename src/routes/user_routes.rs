use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use tracing::info;
use uuid::Uuid;

use crate::dto::user_dto::{
    CreateUserRequest, CreatedUserResponse, UpdateUserRequest, UpdatedUserResponse,
};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::user::UserSummary;
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppResult};
use crate::utils::extract::ValidatedJson;

pub fn create_user_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).patch(update_user).delete(delete_user))
}

async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserSummary>>> {
    Ok(Json(state.users.list().await?))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserSummary>> {
    Ok(Json(state.users.get(id).await?))
}

async fn create_user(
    Extension(actor): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<CreatedUserResponse>)> {
    let user = state.users.create(request.into()).await?;
    info!(actor_id = %actor.user_id, user_id = %user.id, role = %user.role, "User created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

async fn update_user(
    Extension(actor): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> AppResult<Json<UpdatedUserResponse>> {
    let user = state.users.update(id, request.into()).await?;
    info!(actor_id = %actor.user_id, user_id = %user.id, "User updated");
    Ok(Json(user.into()))
}

async fn delete_user(
    Extension(actor): Extension<AuthenticatedUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if state.users.delete(id).await? {
        info!(actor_id = %actor.user_id, user_id = %id, "User deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found_error("User", &id.to_string()))
    }
}
