use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
};
use chrono::{TimeZone, Utc};
use fleet_backend::models::trip::NewTrip;
use fleet_backend::models::vehicle::NewVehicle;
use fleet_backend::repositories::{TripRepository, UserRepository, VehicleRepository};
use serde_json::json;

mod common;

use common::{
    authed_get, body_json, create_test_app, create_test_app_with, json_request,
    register_and_login, send, set_cookie, test_config,
};

fn cookie_post(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = create_test_app();
    let response = send(&app, Request::builder().uri("/health").body(Body::empty()).unwrap()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "ok": true }));
}

#[tokio::test]
async fn test_session_lifecycle() {
    let (app, _) = create_test_app();
    let (access_token, refresh_cookie) = register_and_login(&app, "driver@example.com").await;

    let response = send(&app, authed_get("/vehicles", &access_token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["page"], 1);
    assert_eq!(body["pageSize"], 10);

    // refresh works before logout
    let response = send(&app, cookie_post("/auth/refresh", &refresh_cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["accessToken"].is_string());

    let response = send(&app, cookie_post("/auth/logout", &refresh_cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = set_cookie(&response, "refreshToken").unwrap();
    assert!(cleared.contains("Max-Age=0"));
    assert!(set_cookie(&response, "accessToken").is_some());
    assert_eq!(body_json(response).await, json!({ "ok": true }));

    let response = send(&app, cookie_post("/auth/refresh", &refresh_cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_sets_http_only_refresh_cookie() {
    let (app, _) = create_test_app();
    send(
        &app,
        json_request(
            "POST",
            "/auth/register",
            json!({ "email": "a@b.com", "password": "secret1" }),
        ),
    )
    .await;

    let response = send(
        &app,
        json_request("POST", "/auth/login", json!({ "email": "a@b.com", "password": "secret1" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = set_cookie(&response, "refreshToken").unwrap();
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains(&format!("Max-Age={}", 7 * 24 * 3600)));

    let body = body_json(response).await;
    assert_eq!(body["user"]["email"], "a@b.com");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_login_failures_are_generic() {
    let (app, _) = create_test_app();
    register_and_login(&app, "a@b.com").await;

    let wrong_password = send(
        &app,
        json_request("POST", "/auth/login", json!({ "email": "a@b.com", "password": "nope" })),
    )
    .await;
    let unknown = send(
        &app,
        json_request("POST", "/auth/login", json!({ "email": "x@y.com", "password": "secret1" })),
    )
    .await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(wrong_password).await, body_json(unknown).await);
}

#[tokio::test]
async fn test_register_validation_and_conflict() {
    let (app, _) = create_test_app();

    let response = send(
        &app,
        json_request("POST", "/auth/register", json!({ "email": "bad", "password": "123" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json!({ "email": "a@b.com", "password": "secret1" });
    let response = send(&app, json_request("POST", "/auth/register", body.clone())).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["email"], "a@b.com");
    assert!(created["id"].is_string());

    let response = send(&app, json_request("POST", "/auth/register", body)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_malformed_body_is_a_validation_error() {
    let (app, _) = create_test_app();

    let response = send(
        &app,
        json_request("POST", "/auth/register", json!({ "email": "a@b.com" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["details"]["body"][0]["params"]["field"], "password");

    let response = send(
        &app,
        json_request("POST", "/auth/login", json!({ "email": 5, "password": "secret1" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["details"]["body"][0]["params"]["field"], "email");

    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_malformed_query_is_a_validation_error() {
    let (app, _) = create_test_app();
    let (access_token, _) = register_and_login(&app, "a@b.com").await;

    let response = send(&app, authed_get("/reports/trips.xlsx", &access_token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["details"]["query"][0]["params"]["field"], "from");

    let response = send(&app, authed_get("/vehicles?page=abc", &access_token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["details"]["query"][0]["message"].is_string());
}

#[tokio::test]
async fn test_refresh_without_cookie() {
    let (app, _) = create_test_app();
    let response = send(
        &app,
        Request::builder()
            .method("POST")
            .uri("/auth/refresh")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["message"], "No refresh token");
}

#[tokio::test]
async fn test_rotation_replaces_cookie() {
    let (app, _) = create_test_app_with(fleet_backend::config::EnvironmentConfig {
        rotate_refresh_tokens: true,
        ..test_config()
    });
    let (_, refresh_cookie) = register_and_login(&app, "a@b.com").await;

    let response = send(&app, cookie_post("/auth/refresh", &refresh_cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = set_cookie(&response, "refreshToken").unwrap();
    let rotated_pair = rotated.split(';').next().unwrap().to_string();
    assert_ne!(rotated_pair, refresh_cookie);

    let response = send(&app, cookie_post("/auth/refresh", &refresh_cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, cookie_post("/auth/refresh", &rotated_pair)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let (app, _) = create_test_app();

    for uri in ["/vehicles", "/users", "/reports/trips.xlsx?from=2025-08-01&to=2025-08-31"] {
        let response = send(&app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    let response = send(&app, authed_get("/vehicles", "not-a-token")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_access_token_cookie_is_accepted() {
    let (app, _) = create_test_app();
    let (access_token, _) = register_and_login(&app, "a@b.com").await;

    let response = send(
        &app,
        Request::builder()
            .uri("/vehicles")
            .header(header::COOKIE, format!("accessToken={access_token}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_user_management() {
    let (app, _) = create_test_app();
    let (access_token, _) = register_and_login(&app, "admin@example.com").await;
    let authed = |method: &str, uri: &str, body: serde_json::Value| {
        let mut request = json_request(method, uri, body);
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {access_token}").parse().unwrap(),
        );
        request
    };

    let response = send(
        &app,
        authed(
            "POST",
            "/users",
            json!({ "email": "new@example.com", "password": "secret1", "role": "admin" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["email"], "new@example.com");

    let response = send(
        &app,
        authed("PATCH", &format!("/users/{id}"), json!({ "name": "Renamed" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["name"], "Renamed");
    assert_eq!(updated["role"], "admin");

    let response = send(&app, authed_get("/users", &access_token)).await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

    let response = send(&app, authed("DELETE", &format!("/users/{id}"), json!({}))).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, authed("DELETE", &format!("/users/{id}"), json!({}))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, authed_get(&format!("/users/{id}"), &access_token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_vehicle_listing_and_status() {
    let (app, store) = create_test_app();
    let (access_token, _) = register_and_login(&app, "a@b.com").await;

    let mut first_id = None;
    for (i, brand) in ["Toyota", "Honda", "Toyota"].into_iter().enumerate() {
        let vehicle = store
            .upsert_by_plate(NewVehicle {
                plate_number: format!("B-{}-AA", 1000 + i),
                brand: Some(brand.to_string()),
                model: None,
                year: Some(2020),
            })
            .await
            .unwrap();
        first_id.get_or_insert(vehicle.id);
    }
    let vehicle_id = first_id.unwrap();

    let response = send(&app, authed_get("/vehicles?q=toyota&pageSize=1&page=2", &access_token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["items"][0]["plateNumber"], "B-1002-AA");

    let response = send(&app, authed_get(&format!("/vehicles/{vehicle_id}"), &access_token)).await;
    assert_eq!(body_json(response).await["plateNumber"], "B-1000-AA");

    let response = send(
        &app,
        authed_get(&format!("/vehicles/{vehicle_id}/status?date=2025-08-20"), &access_token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "available");
    assert_eq!(body["source"], "derived");

    let response = send(
        &app,
        authed_get(&format!("/vehicles/{vehicle_id}/status?date=20-08-2025"), &access_token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        authed_get(
            &format!("/vehicles/{}/status?date=2025-08-20", uuid::Uuid::new_v4()),
            &access_token,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trip_report_download() {
    let (app, store) = create_test_app();
    let (access_token, _) = register_and_login(&app, "a@b.com").await;

    let driver = store.find_by_email("a@b.com").await.unwrap().unwrap();
    let vehicle = store
        .upsert_by_plate(NewVehicle {
            plate_number: "B-1000-AA".to_string(),
            brand: None,
            model: None,
            year: None,
        })
        .await
        .unwrap();
    let start = Utc.with_ymd_and_hms(2025, 8, 10, 8, 0, 0).unwrap();
    TripRepository::create(
        store.as_ref(),
        NewTrip {
            vehicle_id: vehicle.id,
            user_id: driver.id,
            start_time: start,
            end_time: None,
            distance_km: None,
            start_place: Some("Indramayu".to_string()),
            end_place: None,
        },
    )
    .await
    .unwrap();

    let response = send(
        &app,
        authed_get("/reports/trips.xlsx?from=2025-08-01&to=2025-08-31", &access_token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(
        headers[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"trips_2025-08-01_2025-08-31.xlsx\""));
    assert_eq!(headers[header::CACHE_CONTROL], "no-store");

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[tokio::test]
async fn test_trip_report_rejects_bad_range() {
    let (app, _) = create_test_app();
    let (access_token, _) = register_and_login(&app, "a@b.com").await;

    for uri in [
        "/reports/trips.xlsx?from=2025-08-31&to=2025-08-01",
        "/reports/trips.xlsx?from=2025-08-01&to=tomorrow",
    ] {
        let response = send(&app, authed_get(uri, &access_token)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn test_deleting_user_revokes_sessions() {
    let (app, store) = create_test_app();
    let (_, refresh_cookie) = register_and_login(&app, "a@b.com").await;

    let user = store.find_by_email("a@b.com").await.unwrap().unwrap();
    assert!(UserRepository::delete(store.as_ref(), user.id).await.unwrap());

    let response = send(&app, cookie_post("/auth/refresh", &refresh_cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
