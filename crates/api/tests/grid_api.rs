//! Daily grid endpoints: packing as seen over HTTP, activation routing and
//! the cache refresh after booking writes.

mod common;

use axum::http::StatusCode;
use chrono::NaiveDate;
use common::{body_json, booking_body, test_config, TestApp};
use serde_json::Value;
use tandem_core::availability::AvailabilityKey;
use tandem_core::packer::WidthPolicy;
use tandem_core::resource::{ColumnOrder, Resource};
use tandem_core::time_slot::TimeSlot;
use tandem_db::ScheduleStore;

const DATE: &str = "2025-01-06";

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
}

async fn mark(app: &TestApp, resource: &Resource, slot: TimeSlot) {
    app.store
        .add_availability(&AvailabilityKey {
            resource_id: resource.id,
            day: day(),
            time_slot: slot,
        })
        .await
        .unwrap();
}

async fn four_pilots(app: &TestApp) -> Vec<Resource> {
    let mut pilots = Vec::new();
    for name in ["A", "B", "C", "D"] {
        pilots.push(app.store.add_resource(name).await);
    }
    pilots
}

fn row<'a>(grid: &'a Value, slot: &str) -> &'a Value {
    grid["data"]["rows"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["time_slot"] == slot)
        .unwrap()
}

fn kinds(row: &Value) -> Vec<String> {
    row["cells"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["kind"].as_str().unwrap().to_string())
        .collect()
}

fn names(row: &Value) -> Vec<String> {
    row["cells"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["resource"]["display_name"].as_str().unwrap().to_string())
        .collect()
}

async fn grid(app: &TestApp) -> Value {
    let response = app.get(&format!("/api/v1/days/{DATE}/grid")).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

#[tokio::test]
async fn unavailable_columns_are_pulled_right() {
    let app = TestApp::new();
    let pilots = four_pilots(&app).await;
    for p in &pilots {
        mark(&app, p, TimeSlot::T0730).await;
    }
    mark(&app, &pilots[0], TimeSlot::T1100).await;
    mark(&app, &pilots[2], TimeSlot::T1100).await;

    let json = grid(&app).await;
    let r = row(&json, "11:00");
    assert_eq!(kinds(r), ["available", "available", "unavailable", "unavailable"]);
    assert_eq!(names(r), ["A", "C", "B", "D"]);
    assert_eq!(r["free_columns"], 2);

    let all = row(&json, "7:30");
    assert_eq!(names(all), ["A", "B", "C", "D"]);
}

#[tokio::test]
async fn bookings_pack_first_fit_and_overflow_is_reported() {
    let app = TestApp::new();
    for p in &four_pilots(&app).await {
        mark(&app, p, TimeSlot::T0945).await;
    }

    // Prime the cache so the writes below must invalidate it.
    grid(&app).await;

    let first = app.post("/api/v1/bookings", booking_body(DATE, "9:45", 2)).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let json = grid(&app).await;
    let r = row(&json, "9:45");
    assert_eq!(kinds(r), ["booking", "hidden", "available", "available"]);
    assert_eq!(r["cells"][0]["width"], 2);
    assert_eq!(r["cells"][0]["resource"]["display_name"], "A");
    assert_eq!(r["free_columns"], 2);

    let second = app.post("/api/v1/bookings", booking_body(DATE, "9:45", 3)).await;
    assert_eq!(second.status(), StatusCode::CREATED);

    let json = grid(&app).await;
    let r = row(&json, "9:45");
    assert_eq!(kinds(r), ["booking", "hidden", "available", "available"]);
    assert_eq!(r["overflow"].as_array().unwrap().len(), 1);
    assert_eq!(r["overflow"][0]["number_of_people"], 3);
}

#[tokio::test]
async fn grid_carries_navigation() {
    let app = TestApp::new();
    let json = grid(&app).await;

    assert_eq!(json["data"]["day"], DATE);
    assert_eq!(json["data"]["label"], "Monday, January 6th, 2025");
    assert_eq!(json["data"]["previous_day"], "2025-01-05");
    assert_eq!(json["data"]["next_day"], "2025-01-07");
    assert_eq!(json["data"]["rows"].as_array().unwrap().len(), TimeSlot::COUNT);
    assert!(json["data"]["columns"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn activation_routes_clicks() {
    let app = TestApp::new();
    let a = app.store.add_resource("A").await;
    let b = app.store.add_resource("B").await;
    mark(&app, &a, TimeSlot::T1400).await;
    mark(&app, &b, TimeSlot::T0730).await;

    let created = body_json(
        app.post("/api/v1/bookings", booking_body(DATE, "14:00", 1))
            .await,
    )
    .await;
    let booking_id = created["data"]["id"].clone();

    let uri = format!("/api/v1/days/{DATE}/grid/activate");

    let edit = body_json(app.post(&uri, serde_json::json!({"time_slot": "14:00", "column": 0})).await).await;
    assert_eq!(edit["data"]["action"], "edit_booking");
    assert_eq!(edit["data"]["booking_id"], booking_id);

    let create = body_json(app.post(&uri, serde_json::json!({"time_slot": "7:30", "column": 0})).await).await;
    assert_eq!(create["data"]["action"], "create_booking");
    assert_eq!(create["data"]["resource_id"], b.id.to_string());
    assert_eq!(create["data"]["max_people"], 1);

    let inert = body_json(app.post(&uri, serde_json::json!({"time_slot": "14:00", "column": 1})).await).await;
    assert!(inert["data"].is_null());
}

#[tokio::test]
async fn unknown_time_slot_in_activation_is_rejected() {
    let app = TestApp::new();
    let response = app
        .post(
            &format!("/api/v1/days/{DATE}/grid/activate"),
            serde_json::json!({"time_slot": "10:00", "column": 0}),
        )
        .await;
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn malformed_date_is_rejected() {
    let app = TestApp::new();
    let response = app.get("/api/v1/days/not-a-date/grid").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn fetch_failure_surfaces_as_503() {
    let app = TestApp::new();
    app.store.set_unreachable(true);

    let response = app.get(&format!("/api/v1/days/{DATE}/grid")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["code"], "STORE_UNAVAILABLE");
}

#[tokio::test]
async fn display_name_ordering_and_clamping_follow_config() {
    let mut config = test_config();
    config.grid.column_order = ColumnOrder::DisplayName;
    config.grid.width_policy = WidthPolicy::ClampTo(2);
    let app = TestApp::with_config(config);

    let zed = app.store.add_resource("Zed").await;
    let amy = app.store.add_resource("Amy").await;
    let kim = app.store.add_resource("Kim").await;
    for p in [&zed, &amy, &kim] {
        mark(&app, p, TimeSlot::T0830).await;
    }
    app.post("/api/v1/bookings", booking_body(DATE, "8:30", 3)).await;

    let json = grid(&app).await;
    let r = row(&json, "8:30");
    assert_eq!(names(r), ["Amy", "Kim", "Zed"]);
    assert_eq!(kinds(r), ["booking", "hidden", "available"]);
    assert_eq!(r["cells"][0]["width"], 2);
}
