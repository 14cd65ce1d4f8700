//! HTTP contract tests for the booking API.
//!
//! Every test drives the real router over in-memory stores.

#![allow(clippy::unwrap_used)] // Tests can unwrap

use axum::http::StatusCode;
use axum_test::TestServer;
use expert_booking_core::{Expert, SubscriptionRegistry};
use expert_booking_testing::{
    InMemoryBookingLedger, InMemoryExpertStore, fixtures, init_test_tracing, test_clock,
};
use expert_booking_web::{AppState, CORRELATION_ID_HEADER, RouterConfig, build_router};
use serde_json::{Value, json};
use std::sync::Arc;

struct Harness {
    server: TestServer,
    store: Arc<InMemoryExpertStore>,
    ledger: Arc<InMemoryBookingLedger>,
    registry: Arc<SubscriptionRegistry>,
    experts: Vec<Expert>,
}

fn harness() -> Harness {
    init_test_tracing();
    let experts = fixtures::catalogue();
    let store = Arc::new(InMemoryExpertStore::with_experts(experts.clone()));
    let ledger = Arc::new(InMemoryBookingLedger::new());
    let registry = Arc::new(SubscriptionRegistry::default());

    let state = AppState::new(
        Arc::clone(&store),
        Arc::clone(&ledger),
        Arc::clone(&registry),
        Arc::new(test_clock()),
    );
    let server = TestServer::new(build_router(state, &RouterConfig::default())).unwrap();

    Harness {
        server,
        store,
        ledger,
        registry,
        experts,
    }
}

fn booking_body(expert: &Expert, slot_index: usize) -> Value {
    serde_json::to_value(fixtures::reservation_for(expert, slot_index)).unwrap()
}

#[tokio::test]
async fn test_health_reports_ok_with_correlation_id() {
    let h = harness();

    let response = h.server.get("/api/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
    assert!(response.headers().get(CORRELATION_ID_HEADER).is_some());
}

#[tokio::test]
async fn test_list_experts_paginates_by_rating() {
    let h = harness();

    let response = h
        .server
        .get("/api/experts")
        .add_query_param("limit", "3")
        .add_query_param("page", "1")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"][0]["rating"], 4.9);
    assert_eq!(body["data"][0]["availableSlotsCount"], 8);
    assert!(body["data"][0].get("availableSlots").is_none());
    assert_eq!(body["pagination"]["currentPage"], 1);
    assert_eq!(body["pagination"]["totalExperts"], 8);
    assert_eq!(body["pagination"]["totalPages"], 3);
    assert_eq!(body["pagination"]["hasNextPage"], true);
    assert_eq!(body["pagination"]["hasPrevPage"], false);
}

#[tokio::test]
async fn test_list_experts_filters_and_tolerates_garbage_params() {
    let h = harness();

    let response = h
        .server
        .get("/api/experts")
        .add_query_param("category", "Design")
        .add_query_param("page", "banana")
        .await;
    let body: Value = response.json();
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alex Kim", "Tom Anderson"]);

    let response = h
        .server
        .get("/api/experts")
        .add_query_param("search", "  chen ")
        .await;
    let body: Value = response.json();
    assert_eq!(body["pagination"]["totalExperts"], 1);
    assert_eq!(body["data"][0]["name"], "Dr. Sarah Chen");

    let response = h
        .server
        .get("/api/experts")
        .add_query_param("category", "Astrology")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["pagination"]["totalExperts"], 0);
}

#[tokio::test]
async fn test_categories_list_distinct_sorted() {
    let h = harness();

    let body: Value = h.server.get("/api/experts/categories/list").await.json();

    assert_eq!(
        body["data"],
        json!(["Business", "Design", "Health", "Technology"])
    );
}

#[tokio::test]
async fn test_get_expert_by_id() {
    let h = harness();
    let expert = &h.experts[0];

    let response = h.server.get(&format!("/api/experts/{}", expert.id)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["name"], "Dr. Sarah Chen");
    assert_eq!(body["data"]["availableSlots"].as_array().unwrap().len(), 8);

    let response = h.server.get("/api/experts/not-a-uuid").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"][0]["field"], "expertId");

    let response = h
        .server
        .get("/api/experts/6f1c1f9e-0000-4000-8000-000000000000")
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["code"], "EXPERT_NOT_FOUND");
    assert_eq!(body["message"], "Expert not found");
}

#[tokio::test]
async fn test_create_booking_then_conflict() {
    let h = harness();
    let expert = h.experts[0].clone();
    let body = booking_body(&expert, 0);

    let response = h.server.post("/api/bookings").json(&body).await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["success"], true);
    assert_eq!(created["message"], "Booking created successfully!");
    assert_eq!(created["data"]["status"], "pending");
    assert_eq!(created["data"]["expertName"], "Dr. Sarah Chen");
    assert_eq!(created["data"]["email"], "ada@example.com");

    let response = h.server.post("/api/bookings").json(&body).await;
    response.assert_status(StatusCode::CONFLICT);
    let conflict: Value = response.json();
    assert_eq!(conflict["code"], "SLOT_CONFLICT");

    assert_eq!(h.ledger.len(), 1);
    assert_eq!(h.store.expert(expert.id).unwrap().free_slot_count(), 7);
}

#[tokio::test]
async fn test_create_booking_reports_every_invalid_field() {
    let h = harness();

    let response = h.server.post("/api/bookings").json(&json!({})).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(
        fields,
        vec!["expertId", "userName", "email", "phone", "date", "timeSlot"]
    );
    assert_eq!(h.store.reserve_calls(), 0);
}

#[tokio::test]
async fn test_create_booking_rejects_malformed_json() {
    let h = harness();

    let response = h
        .server
        .post("/api/bookings")
        .content_type("application/json")
        .text("{not json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_create_booking_for_unknown_expert_is_not_found() {
    let h = harness();
    let mut body = booking_body(&h.experts[0], 0);
    body["expertId"] = json!("6f1c1f9e-0000-4000-8000-000000000000");

    let response = h.server.post("/api/bookings").json(&body).await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert!(h.ledger.is_empty());
}

#[tokio::test]
async fn test_store_failure_is_opaque_500() {
    let h = harness();
    h.ledger.fail_writes(true);

    let response = h
        .server
        .post("/api/bookings")
        .json(&booking_body(&h.experts[1], 2))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["code"], "INTERNAL_ERROR");
    assert_eq!(body["message"], "Internal server error");
}

#[tokio::test]
async fn test_update_status_and_lookup_by_email() {
    let h = harness();
    let created: Value = h
        .server
        .post("/api/bookings")
        .json(&booking_body(&h.experts[0], 1))
        .await
        .json();
    let booking_id = created["data"]["id"].as_str().unwrap().to_string();

    let response = h
        .server
        .patch(&format!("/api/bookings/{booking_id}/status"))
        .json(&json!({"status": "confirmed"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Booking status updated to confirmed");
    assert_eq!(body["data"]["status"], "confirmed");

    let response = h
        .server
        .get("/api/bookings")
        .add_query_param("email", "  ADA@Example.com ")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["id"], booking_id.as_str());
    assert_eq!(body["data"][0]["status"], "confirmed");
}

#[tokio::test]
async fn test_update_status_errors() {
    let h = harness();

    let response = h
        .server
        .patch("/api/bookings/6f1c1f9e-0000-4000-8000-000000000000/status")
        .json(&json!({"status": "archived"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        body["message"],
        "Invalid status. Must be one of: pending, confirmed, completed"
    );

    let response = h
        .server
        .patch("/api/bookings/6f1c1f9e-0000-4000-8000-000000000000/status")
        .json(&json!({"status": "completed"}))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["message"], "Booking not found");

    let response = h
        .server
        .patch("/api/bookings/42/status")
        .json(&json!({"status": "completed"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["errors"][0]["field"], "id");
}

#[tokio::test]
async fn test_lookup_requires_email() {
    let h = harness();

    let response = h.server.get("/api/bookings").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "Email query parameter is required");

    let response = h
        .server
        .get("/api/bookings")
        .add_query_param("email", "   ")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = h
        .server
        .get("/api/bookings")
        .add_query_param("email", "nobody@example.com")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total"], 0);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_booking_fans_out_to_room_members() {
    let h = harness();
    let expert = h.experts[3].clone();
    let mut watcher = h.registry.connect();
    h.registry.subscribe(watcher.id(), expert.id).unwrap();

    h.server
        .post("/api/bookings")
        .json(&booking_body(&expert, 4))
        .await
        .assert_status(StatusCode::CREATED);

    let event = watcher.try_recv().unwrap();
    assert_eq!(event.expert_id, expert.id);
    assert_eq!(event.time_slot, expert.available_slots[4].time);
    assert_eq!(event.booking.user_name, "Ada Lovelace");
}
