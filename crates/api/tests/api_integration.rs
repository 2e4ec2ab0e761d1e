//! HTTP-level integration tests for the detection and reporting API.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{Duration, Utc};
use common::*;
use herdtrack_api::app::create_app;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Response body is not JSON")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn ping_body(animal_id: Uuid, device_id: Uuid, latitude: f64, longitude: f64, at_ms: i64) -> Value {
    json!({
        "animalId": animal_id,
        "deviceId": device_id,
        "latitude": latitude,
        "longitude": longitude,
        "recordedAt": at_ms,
        "batteryLevel": 76
    })
}

#[tokio::test]
async fn test_health_endpoints() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_app(test_config(), pool);

    let response = app.clone().oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");

    let response = app.clone().oneshot(get("/api/health/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/api/health/live")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_ingest_and_list_events_over_http() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_app(test_config(), pool.clone());

    let animal_id = seed_animal(&pool).await;
    let device_id = seed_device(&pool, 15).await;
    let zone_id = seed_zone(
        &pool,
        "River pen",
        "quarantine",
        square_boundary(36.0, -1.0),
        None,
    )
    .await;
    seed_assignment(&pool, animal_id, zone_id).await;

    let at = Utc::now() - Duration::minutes(30);

    // Enter the quarantine zone
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/pings",
            ping_body(animal_id, device_id, -0.95, 36.05, millis(at)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["withinBoundary"], true);
    assert_eq!(body["duplicate"], false);
    assert_eq!(body["events"][0]["transition"], "entry");
    assert_eq!(body["events"][0]["severity"], "medium");
    let event_id = body["events"][0]["eventId"].as_str().unwrap().to_string();

    // List events for the animal
    let response = app
        .clone()
        .oneshot(get(&format!(
            "/api/v1/geofence-events?animalId={}",
            animal_id
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["events"][0]["zoneName"], "River pen");

    // Fetch the single event
    let response = app
        .clone()
        .oneshot(get(&format!("/api/v1/geofence-events/{}", event_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["eventId"], event_id.as_str());

    // Unknown event id is a 404
    let response = app
        .oneshot(get(&format!("/api/v1/geofence-events/{}", Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_ingest_rejects_malformed_coordinate() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_app(test_config(), pool.clone());

    let animal_id = seed_animal(&pool).await;
    let device_id = seed_device(&pool, 15).await;

    let response = app
        .oneshot(post_json(
            "/api/v1/pings",
            ping_body(animal_id, device_id, 95.0, 36.05, millis(Utc::now())),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_ingest_rejects_unknown_device() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_app(test_config(), pool.clone());

    let animal_id = seed_animal(&pool).await;

    let response = app
        .oneshot(post_json(
            "/api/v1/pings",
            ping_body(animal_id, Uuid::new_v4(), -0.95, 36.05, millis(Utc::now())),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_ping_returns_ok_not_created() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_app(test_config(), pool.clone());

    let animal_id = seed_animal(&pool).await;
    let device_id = seed_device(&pool, 15).await;
    let body = ping_body(animal_id, device_id, -0.95, 36.05, millis(Utc::now()));

    let response = app
        .clone()
        .oneshot(post_json("/api/v1/pings", body.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(post_json("/api/v1/pings", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["duplicate"], true);
}

#[tokio::test]
async fn test_ping_history_pagination() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_app(test_config(), pool.clone());

    let animal_id = seed_animal(&pool).await;
    let device_id = seed_device(&pool, 15).await;

    let base = Utc::now() - Duration::hours(2);
    for i in 0..5i64 {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/pings",
                ping_body(
                    animal_id,
                    device_id,
                    -0.95,
                    36.05,
                    millis(base + Duration::minutes(i * 10)),
                ),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(get(&format!(
            "/api/v1/animals/{}/pings?limit=3",
            animal_id
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["pings"].as_array().unwrap().len(), 3);
    assert_eq!(body["pagination"]["hasMore"], true);
    let cursor = body["pagination"]["nextCursor"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(get(&format!(
            "/api/v1/animals/{}/pings?limit=3&cursor={}",
            animal_id, cursor
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["pings"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["hasMore"], false);

    // Unknown animal is a 404
    let response = app
        .oneshot(get(&format!("/api/v1/animals/{}/pings", Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_zone_occupancy() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_app(test_config(), pool.clone());

    let zone_id = seed_zone(
        &pool,
        "Holding pen",
        "shelter",
        square_boundary(36.0, -1.0),
        Some(10),
    )
    .await;
    let device_id = seed_device(&pool, 15).await;

    // Two animals currently inside, both assigned
    for _ in 0..2 {
        let animal_id = seed_animal(&pool).await;
        seed_assignment(&pool, animal_id, zone_id).await;
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/pings",
                ping_body(
                    animal_id,
                    device_id,
                    -0.95,
                    36.05,
                    millis(Utc::now() - Duration::minutes(10)),
                ),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .clone()
        .oneshot(get(&format!("/api/v1/zones/{}/occupancy", zone_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["currentOccupancy"], 2);
    assert_eq!(body["dailyUniqueVisitors"], 2);
    assert_eq!(body["assignedAnimals"], 2);
    assert_eq!(body["maxCapacity"], 10);
    assert_eq!(body["occupancyPercentage"], 20.0);
    assert_eq!(body["isOvercrowded"], false);

    // Unknown zone is a 404
    let response = app
        .oneshot(get(&format!("/api/v1/zones/{}/occupancy", Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_location_summary() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_app(test_config(), pool.clone());

    let animal_id = seed_animal(&pool).await;
    let device_id = seed_device(&pool, 15).await;
    let zone_id = seed_zone(
        &pool,
        "West range",
        "grazing",
        square_boundary(36.0, -1.0),
        None,
    )
    .await;
    seed_assignment(&pool, animal_id, zone_id).await;

    let base = Utc::now() - Duration::hours(3);
    for i in 0..3i64 {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/pings",
                ping_body(
                    animal_id,
                    device_id,
                    -0.95,
                    36.05 + 0.001 * i as f64,
                    millis(base + Duration::minutes(i * 15)),
                ),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let from = millis(base - Duration::minutes(5));
    let to = millis(Utc::now());
    let response = app
        .clone()
        .oneshot(get(&format!(
            "/api/v1/animals/{}/location-summary?from={}&to={}",
            animal_id, from, to
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["totalPings"], 3);
    assert_eq!(body["zonesVisited"][0], "West range");
    // Two hops of 0.001 degrees at the flat conversion factor
    let distance = body["totalDistanceM"].as_f64().unwrap();
    assert!((distance - 222.0).abs() < 0.5);
    assert_eq!(body["timeInZones"][0]["minutes"], 45);

    // A range with no pings reports no data
    let response = app
        .oneshot(get(&format!(
            "/api/v1/animals/{}/location-summary?from={}&to={}",
            animal_id,
            millis(base - Duration::days(3)),
            millis(base - Duration::days(2))
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_device_health() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_app(test_config(), pool.clone());

    let animal_id = seed_animal(&pool).await;
    let device_id = seed_device(&pool, 15).await;

    sqlx::query(
        "UPDATE tracking_devices SET last_battery_level = 12, last_signal_strength = 10 WHERE device_id = $1",
    )
    .bind(device_id)
    .execute(&pool)
    .await
    .unwrap();

    // Last ping two hours ago, far beyond twice the 15-minute interval
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/pings",
            json!({
                "animalId": animal_id,
                "deviceId": device_id,
                "latitude": -0.95,
                "longitude": 36.05,
                "recordedAt": millis(Utc::now() - Duration::hours(2))
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get(&format!("/api/v1/devices/{}/health", device_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["healthy"], false);
    let issues: Vec<String> = body["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    assert!(issues.contains(&"Low battery level".to_string()));
    assert!(issues.contains(&"Poor signal strength".to_string()));
    assert!(issues.contains(&"Delayed updates".to_string()));

    // Unknown device is a 404
    let response = app
        .oneshot(get(&format!("/api/v1/devices/{}/health", Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_overnight_access_window_over_http() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    let app = create_app(test_config(), pool.clone());

    let animal_id = seed_animal(&pool).await;
    let device_id = seed_device(&pool, 15).await;
    let zone_id = seed_zone(
        &pool,
        "Night shelter",
        "shelter",
        square_boundary(36.0, -1.0),
        None,
    )
    .await;
    seed_assignment(&pool, animal_id, zone_id).await;
    set_zone_access_window(
        &pool,
        zone_id,
        chrono::NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
        chrono::NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
    )
    .await;

    // A ping recorded at 23:00 UTC falls inside the overnight window; one
    // at 12:00 UTC does not. Use yesterday so both are in the past.
    let yesterday = (Utc::now() - Duration::days(1)).date_naive();
    let at_2300 = yesterday
        .and_hms_opt(23, 0, 0)
        .unwrap()
        .and_utc();
    let at_1200_next = (yesterday + Duration::days(1))
        .and_hms_opt(12, 0, 0)
        .unwrap()
        .and_utc();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/pings",
            ping_body(animal_id, device_id, -0.95, 36.05, millis(at_2300)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["withinBoundary"], true);

    if at_1200_next < Utc::now() {
        let response = app
            .oneshot(post_json(
                "/api/v1/pings",
                ping_body(animal_id, device_id, -0.95, 36.05, millis(at_1200_next)),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["withinBoundary"], false);
    }
}
