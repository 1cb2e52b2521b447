use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use fleet_backend::config::EnvironmentConfig;
use fleet_backend::repositories::{MemoryStore, Repositories};
use fleet_backend::routes::create_router;
use fleet_backend::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

#[allow(dead_code)]
pub fn test_config() -> EnvironmentConfig {
    EnvironmentConfig {
        bcrypt_cost: 4,
        ..EnvironmentConfig::default()
    }
}

/// Router over a fresh in-memory store, plus the store for direct seeding
#[allow(dead_code)]
pub fn create_test_app_with(config: EnvironmentConfig) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(config, Repositories::from_store(store.clone()));
    (create_router(state), store)
}

#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<MemoryStore>) {
    create_test_app_with(test_config())
}

#[allow(dead_code)]
pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub fn authed_get(uri: &str, access_token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {access_token}"))
        .body(Body::empty())
        .unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// `name=value` of the first `Set-Cookie` header for `name`
#[allow(dead_code)]
pub fn set_cookie(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&format!("{name}=")))
        .map(str::to_string)
}

/// Registers and logs in, returning the access token and the refresh cookie pair
#[allow(dead_code)]
pub async fn register_and_login(app: &Router, email: &str) -> (String, String) {
    let response = send(
        app,
        json_request(
            "POST",
            "/auth/register",
            serde_json::json!({ "email": email, "name": "Tester", "password": "secret1" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        app,
        json_request(
            "POST",
            "/auth/login",
            serde_json::json!({ "email": email, "password": "secret1" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = set_cookie(&response, "refreshToken").unwrap();
    let cookie_pair = cookie.split(';').next().unwrap().to_string();
    let body = body_json(response).await;
    let access_token = body["accessToken"].as_str().unwrap().to_string();

    (access_token, cookie_pair)
}
