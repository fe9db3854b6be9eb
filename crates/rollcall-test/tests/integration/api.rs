#![allow(clippy::unwrap_used, clippy::expect_used)]
//! HTTP API against the full router and a real database.

use std::sync::Arc;

use salvo::http::StatusCode;
use salvo::prelude::*;
use salvo::test::{ResponseExt, TestClient};
use serde_json::{Value, json};

use rollcall_test::component::clock::FixedClock;

use super::helpers::*;

async fn json_of(resp: &mut salvo::Response) -> Value {
    resp.take_json::<Value>().await.unwrap()
}

async fn post(service: &Service, path: &str, body: &Value) -> (StatusCode, Value) {
    let mut resp = TestClient::post(format!("{BASE}{path}"))
        .json(body)
        .send(service)
        .await;
    let status = resp.status_code.unwrap_or(StatusCode::OK);
    (status, json_of(&mut resp).await)
}

async fn get(service: &Service, path: &str) -> (StatusCode, Value) {
    let mut resp = TestClient::get(format!("{BASE}{path}")).send(service).await;
    let status = resp.status_code.unwrap_or(StatusCode::OK);
    (status, json_of(&mut resp).await)
}

/// Creates a class with three enrolled students; returns the class ID.
async fn seed_over_http(service: &Service) -> i64 {
    let (status, body) = post(
        service,
        "/api/classes",
        &json!({"code": "CS101", "name": "Intro", "instructor": "Dr. Smith"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let class_id = body["class"]["id"].as_i64().unwrap();

    for code in ["STU001", "STU002", "STU003"] {
        let (status, body) = post(
            service,
            "/api/students",
            &json!({"student_id": code, "name": format!("Student {code}")}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let student_id = body["student"]["id"].as_i64().unwrap();

        let (status, _) = post(
            service,
            &format!("/api/classes/{class_id}/enroll"),
            &json!({"student_id": student_id}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    class_id
}

#[test_log::test(tokio::test)]
async fn record_by_code_then_finalize_fills_the_roster() {
    let db = require_db!();
    let clock = Arc::new(FixedClock::new(at(monday(), 10, 2)));
    let service = create_test_service(&db.pool, clock);
    let class_id = seed_over_http(&service).await;

    let (status, _) = post(
        &service,
        "/api/schedule",
        &json!({
            "class_id": class_id,
            "scheduled_date": "2026-10-12",
            "start_time": "09:00",
            "end_time": "10:00",
            "room_number": "A1"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post(
        &service,
        "/api/attendance/record",
        &json!({
            "class_id": class_id,
            "student_id": "STU001",
            "session_date": "2026-10-12",
            "method": "facial_recognition",
            "confidence": 0.93
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["attendance"]["present"], true);
    assert_eq!(body["attendance"]["method"], "face");

    let (status, report) = post(&service, "/api/schedule/finalize", &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["finalized"], 1);
    assert_eq!(report["absences_written"], 2);

    let (status, roster) = get(
        &service,
        &format!("/api/attendance/class/{class_id}/date/2026-10-12"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let roster = roster.as_array().unwrap();
    assert_eq!(roster.len(), 3);
    let present: Vec<&str> = roster
        .iter()
        .filter(|entry| entry["present"] == true)
        .filter_map(|entry| entry["student_id"].as_str())
        .collect();
    assert_eq!(present, vec!["STU001"]);
    assert!(
        roster
            .iter()
            .filter(|entry| entry["present"] == false)
            .all(|entry| entry["method"] == "auto" && entry["status"] == "absent")
    );

    let (_, schedules) = get(&service, &format!("/api/schedule/class/{class_id}")).await;
    assert_eq!(schedules[0]["finalized"], true);

    let (status, stats) = get(&service, &format!("/api/attendance/class/{class_id}/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats[0]["student_id"], "STU001");
    assert_eq!(stats[0]["attendance_percentage"], 100.0);

    let (_, above) = get(
        &service,
        &format!("/api/attendance/class/{class_id}/stats/above75"),
    )
    .await;
    assert_eq!(above.as_array().map(Vec::len), Some(1));

    let (_, dates) = get(&service, &format!("/api/attendance/class/{class_id}/dates")).await;
    assert_eq!(dates[0]["present_count"], 1);

    db.cleanup().await;
}

#[test_log::test(tokio::test)]
async fn recording_for_unenrolled_student_is_rejected() {
    let db = require_db!();
    let clock = Arc::new(FixedClock::new(at(monday(), 10, 2)));
    let service = create_test_service(&db.pool, clock);
    let class_id = seed_over_http(&service).await;

    let (status, _) = post(
        &service,
        "/api/students",
        &json!({"student_id": "STU999", "name": "Visitor"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = post(
        &service,
        "/api/attendance/record",
        &json!({
            "class_id": class_id,
            "student_id": "STU999",
            "session_date": "2026-10-12",
            "method": "qr"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("not enrolled"));

    let (status, _) = post(
        &service,
        "/api/attendance/record",
        &json!({
            "class_id": class_id,
            "student_id": "NOPE",
            "session_date": "2026-10-12"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    db.cleanup().await;
}

#[test_log::test(tokio::test)]
async fn duplicate_codes_and_missing_rows_map_to_client_errors() {
    let db = require_db!();
    let clock = Arc::new(FixedClock::new(at(monday(), 8, 0)));
    let service = create_test_service(&db.pool, clock);
    seed_over_http(&service).await;

    let (status, body) = post(&service, "/api/classes", &json!({"code": "CS101", "name": "Again"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("Class code already exists")
    );

    let (status, _) = get(&service, "/api/classes/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let mut resp = TestClient::delete(format!("{BASE}/api/holidays/2026-12-25"))
        .send(&service)
        .await;
    assert_eq!(resp.status_code, Some(StatusCode::NOT_FOUND));
    let body = json_of(&mut resp).await;
    assert!(body["error"].is_string());

    db.cleanup().await;
}

#[test_log::test(tokio::test)]
async fn finalized_dated_schedule_rejects_edits() {
    let db = require_db!();
    let clock = Arc::new(FixedClock::new(at(monday(), 11, 0)));
    let service = create_test_service(&db.pool, clock);
    let class_id = seed_over_http(&service).await;

    let (_, created) = post(
        &service,
        "/api/schedule",
        &json!({
            "class_id": class_id,
            "scheduled_date": "2026-10-12",
            "start_time": "09:00:00",
            "end_time": "10:00:00"
        }),
    )
    .await;
    let schedule_id = created["schedule"]["id"].as_i64().unwrap();

    let (status, _) = post(&service, "/api/schedule/finalize", &json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let mut resp = TestClient::put(format!("{BASE}/api/schedule/{schedule_id}"))
        .json(&json!({
            "scheduled_date": "2026-10-12",
            "start_time": "09:00",
            "end_time": "10:30"
        }))
        .send(&service)
        .await;
    assert_eq!(resp.status_code, Some(StatusCode::CONFLICT));
    let body = json_of(&mut resp).await;
    assert!(body["error"].as_str().unwrap().contains("already finalized"));

    let (status, today) = get(&service, "/api/schedule/today").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(today[0]["class_code"], "CS101");
    assert_eq!(today[0]["finalized"], true);

    db.cleanup().await;
}

#[test_log::test(tokio::test)]
async fn health_reports_connected_database() {
    let db = require_db!();
    let clock = Arc::new(FixedClock::new(at(monday(), 8, 0)));
    let service = create_test_service(&db.pool, clock);

    let (status, body) = get(&service, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "ok");
    assert_eq!(body["face_service"], "disabled");
    assert_eq!(body["sweep_running"], false);

    db.cleanup().await;
}
