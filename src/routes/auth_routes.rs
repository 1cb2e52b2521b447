use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::warn;

use crate::config::EnvironmentConfig;
use crate::dto::auth_dto::{
    LoginRequest, LoginResponse, OkResponse, RefreshResponse, RegisterRequest, RegisterResponse,
};
use crate::middleware::auth::ACCESS_TOKEN_COOKIE;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::extract::ValidatedJson;

pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Public authentication routes, mounted under `/auth`
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}

/// Browsers drop `SameSite=None` cookies that are not `Secure`
fn same_site(config: &EnvironmentConfig) -> SameSite {
    if config.cookie_secure {
        SameSite::None
    } else {
        SameSite::Lax
    }
}

fn refresh_cookie(config: &EnvironmentConfig, token: String) -> Cookie<'static> {
    let max_age = time::Duration::seconds(config.refresh_token_ttl.as_secs() as i64);
    Cookie::build((REFRESH_TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(same_site(config))
        .max_age(max_age)
        .build()
}

/// Expired cookie, sent even when the client did not present the original
fn removal_cookie(config: &EnvironmentConfig, name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(same_site(config))
        .max_age(time::Duration::ZERO)
        .expires(time::OffsetDateTime::UNIX_EPOCH)
        .build()
}

async fn register(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let user = state
        .auth
        .register(&request.email, request.name, &request.password)
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    let outcome = state.auth.login(&request.email, &request.password).await?;
    let jar = jar.add(refresh_cookie(&state.config, outcome.refresh_token));

    Ok((
        jar,
        Json(LoginResponse {
            user: outcome.user.into(),
            access_token: outcome.access_token,
        }),
    ))
}

async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<RefreshResponse>)> {
    let token = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("No refresh token".to_string()))?;

    let outcome = state.auth.refresh(&token).await?;
    let jar = match outcome.refresh_token {
        Some(rotated) => jar.add(refresh_cookie(&state.config, rotated)),
        None => jar,
    };

    Ok((
        jar,
        Json(RefreshResponse {
            access_token: outcome.access_token,
        }),
    ))
}

async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<OkResponse>)> {
    // cookies are cleared even if revocation fails
    if let Some(cookie) = jar.get(REFRESH_TOKEN_COOKIE) {
        if let Err(e) = state.auth.logout(cookie.value()).await {
            warn!(error = %e, "Refresh token revocation failed during logout");
        }
    }

    let jar = jar
        .add(removal_cookie(&state.config, REFRESH_TOKEN_COOKIE))
        .add(removal_cookie(&state.config, ACCESS_TOKEN_COOKIE));

    Ok((jar, Json(OkResponse::ok())))
}
