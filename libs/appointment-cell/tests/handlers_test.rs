mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use appointment_cell::router::appointment_routes;
use appointment_cell::SchedulingState;
use doctor_cell::models::Weekday;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

use common::*;

struct Harness {
    app: Router,
    store: Arc<InMemoryStore>,
    doctor_id: Uuid,
    clinic_id: Uuid,
    token: String,
    secret: String,
}

fn harness() -> Harness {
    let config = TestConfig::default();
    let store = Arc::new(InMemoryStore::default());

    let doctor = doctor(Some(80.0));
    let clinic = clinic(doctor.id, 1);
    let (doctor_id, clinic_id) = (doctor.id, clinic.id);
    store.add_doctor(doctor);
    store.add_clinic(clinic);

    let user = TestUser::patient("patient@example.com");
    store.add_patient(patient(Uuid::parse_str(&user.id).unwrap()));
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, None);

    let state = SchedulingState::new(config.to_arc(), store.clone());

    Harness {
        app: appointment_routes(state),
        store,
        doctor_id,
        clinic_id,
        token,
        secret: config.jwt_secret,
    }
}

fn authed(method: Method, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_book_appointment_returns_created() {
    let h = harness();

    let response = h.app
        .oneshot(authed(
            Method::POST,
            &format!("/doctors/{}", h.doctor_id),
            &h.token,
            Some(json!({
                "date": "2025-03-03",
                "start_time": "10:00:00",
                "end_time": "10:30:00",
                "reason_for_visit": "Follow-up"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["doctor_id"], json!(h.doctor_id));
    assert_eq!(body["clinic_id"], json!(h.clinic_id));
    assert_eq!(body["fees"], json!(80.0));
    assert_eq!(body["appointment_status"], json!("scheduled"));
    assert_eq!(h.store.appointment_count(), 1);
}

#[tokio::test]
async fn test_overlapping_booking_returns_conflict() {
    let h = harness();
    h.store.add_appointment(appointment(
        Uuid::new_v4(), h.doctor_id, h.clinic_id, date(2025, 3, 3), time(9, 0), time(9, 30),
    ));

    let response = h.app
        .oneshot(authed(
            Method::POST,
            &format!("/doctors/{}", h.doctor_id),
            &h.token,
            Some(json!({"date": "2025-03-03", "start_time": "09:15:00", "end_time": "09:45:00"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("overlaps"));
}

#[tokio::test]
async fn test_inverted_interval_is_bad_request() {
    let h = harness();

    let response = h.app
        .oneshot(authed(
            Method::POST,
            &format!("/doctors/{}", h.doctor_id),
            &h.token,
            Some(json!({"date": "2025-03-03", "start_time": "11:00:00", "end_time": "10:00:00"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(h.store.appointment_count(), 0);
}

#[tokio::test]
async fn test_doctor_role_cannot_book() {
    let h = harness();
    let doctor_token = JwtTestUtils::create_test_token(&TestUser::doctor("doc@example.com"), &h.secret, None);

    let response = h.app
        .oneshot(authed(
            Method::POST,
            &format!("/doctors/{}", h.doctor_id),
            &doctor_token,
            Some(json!({"date": "2025-03-03", "start_time": "10:00:00", "end_time": "10:30:00"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let h = harness();

    let response = h.app
        .oneshot(
            Request::builder()
                .uri(format!("/doctors/{}/slots", h.doctor_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_slots_for_doctor_without_rules_is_not_found() {
    let h = harness();

    let response = h.app
        .oneshot(authed(Method::GET, &format!("/doctors/{}/slots", h.doctor_id), &h.token, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_slots_listing_shape() {
    let h = harness();
    // Every weekday is open so the listing is never empty regardless of today's date
    for day in Weekday::ALL {
        h.store.add_rule(rule(h.doctor_id, h.clinic_id, day, time(0, 0), time(23, 0)));
    }

    let response = h.app
        .oneshot(authed(Method::GET, &format!("/doctors/{}/slots", h.doctor_id), &h.token, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let slots = body["slots"].as_array().unwrap();
    assert!(slots.len() >= 29);

    let entry = &slots[slots.len() - 1];
    assert_eq!(entry["doctor_id"], json!(h.doctor_id));
    assert_eq!(entry["clinic_id"], json!(h.clinic_id));
    assert!(entry["day"].is_string());
    assert_eq!(entry["time_slot"][0], json!("00:00-00:30"));
}

#[tokio::test]
async fn test_my_appointments() {
    let h = harness();

    let response = h.app.clone()
        .oneshot(authed(Method::GET, "/mine", &h.token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let booked = h.app.clone()
        .oneshot(authed(
            Method::POST,
            &format!("/doctors/{}", h.doctor_id),
            &h.token,
            Some(json!({"date": "2025-03-03", "start_time": "10:00:00", "end_time": "10:30:00"})),
        ))
        .await
        .unwrap();
    assert_eq!(booked.status(), StatusCode::CREATED);

    let response = h.app
        .oneshot(authed(Method::GET, "/mine", &h.token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["total"], json!(1));
}
