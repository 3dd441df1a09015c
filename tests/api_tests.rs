mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Weekday;
use common::{d, t, Fixture, JWT_SECRET};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use tour_scheduling::routes::create_router;
use tour_scheduling::utils::jwt::{generate_token, SUPER_ADMIN_ROLE};

fn admin_token() -> String {
    generate_token("admin", SUPER_ADMIN_ROLE, vec![], 3600, JWT_SECRET).unwrap()
}

fn site_token(site: Uuid) -> String {
    generate_token("agente", "SITE_MANAGER", vec![site], 3600, JWT_SECRET).unwrap()
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health_check_is_public() {
    let fx = Fixture::new(d(2024, 5, 1)).await;
    let app = create_router(fx.app_state());

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "tour-scheduling");
}

#[tokio::test]
async fn test_api_requires_token() {
    let fx = Fixture::new(d(2024, 5, 1)).await;
    let app = create_router(fx.app_state());

    let (status, body) = send(&app, Method::GET, "/api/templates", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = send(&app, Method::GET, "/api/templates", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_schedule_and_book_over_http() {
    let fx = Fixture::new(d(2024, 5, 1)).await;
    let vessel = fx.vessel(10).await;
    let app = create_router(fx.app_state());
    let token = admin_token();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/patterns",
        Some(&token),
        Some(json!({
            "tour_offering_id": fx.offering,
            "start_time": "09:00",
            "end_time": "12:00",
            "days": ["Mon", "Wed", "Fri"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let pattern_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/templates",
        Some(&token),
        Some(json!({
            "tour_offering_id": fx.offering,
            "vessel_id": vessel,
            "site_id": fx.site,
            "recurrence_pattern_id": pattern_id,
            "valid_from": "2024-06-01",
            "valid_until": "2024-06-30",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let template_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["status"], "PROGRAMADO");
    assert_eq!(body["data"]["nominal_date"], "2024-06-01");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/templates/{}/occurrences", template_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["created"], 12);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/occurrences/available?date=2024-06-10",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
    let occurrence_id = body["data"]["items"][0]["occurrence"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/occurrences/{}/bookings", occurrence_id),
        Some(&token),
        Some(json!({ "passengers": 7, "client_reference": "AG-001" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let reservation_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/occurrences/{}/bookings", occurrence_id),
        Some(&token),
        Some(json!({ "passengers": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CAPACITY_EXCEEDED");
    assert_eq!(body["details"]["remaining"], 3);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/bookings/{}", reservation_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/occurrences/{}/seats", occurrence_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["remaining"], 10);
}

#[tokio::test]
async fn test_invalid_requests_are_bad_requests() {
    let fx = Fixture::new(d(2024, 5, 1)).await;
    let app = create_router(fx.app_state());
    let token = admin_token();

    // Ambos dueños a la vez
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/patterns",
        Some(&token),
        Some(json!({
            "tour_offering_id": fx.offering,
            "driver_id": Uuid::new_v4(),
            "start_time": "09:00",
            "end_time": "12:00",
            "days": ["Mon"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/patterns",
        Some(&token),
        Some(json!({
            "tour_offering_id": fx.offering,
            "start_time": "12:00",
            "end_time": "09:00",
            "days": ["Mon"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/resources/submarine/{}/free?date=2024-06-10&start=09:00&end=10:00", Uuid::new_v4()),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_site_token_cannot_touch_other_sites() {
    let fx = Fixture::new(d(2024, 5, 1)).await;
    let template = fx.june_template(t(9, 0), t(12, 0), &[Weekday::Mon], fx.vessel(10).await).await;
    let app = create_router(fx.app_state());

    let outsider = site_token(Uuid::new_v4());
    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/templates/{}", template.id),
        Some(&outsider),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, body) = send(&app, Method::GET, "/api/templates", Some(&outsider), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 0);

    let local = site_token(fx.site);
    let (status, body) = send(&app, Method::GET, "/api/templates", Some(&local), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn test_resource_free_endpoint() {
    let fx = Fixture::new(d(2024, 5, 1)).await;
    let vessel = fx.vessel(10).await;
    fx.june_template(t(9, 0), t(12, 0), &[Weekday::Mon], vessel).await;
    let app = create_router(fx.app_state());
    let token = admin_token();

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/resources/vessel/{}/free?date=2024-06-10&start=11:00&end=13:00", vessel),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["free"], false);

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/resources/vessel/{}/free?date=2024-06-10&start=12:00&end=13:00", vessel),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["data"]["free"], true);
}
