mod common;

use axum::http::StatusCode;
use common::{body_json, booking_body, TestApp};
use tandem_core::availability::AvailabilityKey;
use tandem_core::time_slot::TimeSlot;
use tandem_db::ScheduleStore;
use tandem_events::{ChangeKind, ChangeTable};

#[tokio::test]
async fn create_get_update_delete() {
    let app = TestApp::new();
    let tag = app.store.add_tag("VIP", "#fde68a").await;

    let mut body = booking_body("2025-01-06", "9:45", 2);
    body["tag_id"] = serde_json::json!(tag.id);
    body["email"] = serde_json::json!("");
    let response = app.post("/api/v1/bookings", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["data"]["tag"]["name"], "VIP");
    assert!(created["data"]["email"].is_null());

    let fetched = body_json(app.get(&format!("/api/v1/bookings/{id}")).await).await;
    assert_eq!(fetched["data"]["time_slot"], "9:45");
    assert_eq!(fetched["data"]["number_of_people"], 2);

    let response = app
        .put(
            &format!("/api/v1/bookings/{id}"),
            booking_body("2025-01-06", "11:00", 3),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["data"]["time_slot"], "11:00");
    assert_eq!(updated["data"]["created_at"], created["data"]["created_at"]);

    let response = app.delete(&format!("/api/v1/bookings/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.get(&format!("/api/v1/bookings/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_form_is_rejected_before_the_store() {
    let app = TestApp::new();

    let mut blank_name = booking_body("2025-01-06", "9:45", 2);
    blank_name["name"] = serde_json::json!("   ");
    let response = app.post("/api/v1/bookings", blank_name).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = app
        .post("/api/v1/bookings", booking_body("2025-01-06", "9:45", 0))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut bad_email = booking_body("2025-01-06", "9:45", 1);
    bad_email["email"] = serde_json::json!("not-an-email");
    let response = app.post("/api/v1/bookings", bad_email).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let day = chrono::NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
    assert!(app.store.list_bookings(day).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_ids_are_404() {
    let app = TestApp::new();
    let id = uuid::Uuid::new_v4();

    let response = app
        .put(
            &format!("/api/v1/bookings/{id}"),
            booking_body("2025-01-06", "9:45", 1),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.delete(&format!("/api/v1/bookings/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let mut unknown_tag = booking_body("2025-01-06", "9:45", 1);
    unknown_tag["tag_id"] = serde_json::json!(uuid::Uuid::new_v4());
    let response = app.post("/api/v1/bookings", unknown_tag).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn store_failure_is_503_and_nothing_is_written() {
    let app = TestApp::new();
    app.store.fail_next_writes(1);

    let response = app
        .post("/api/v1/bookings", booking_body("2025-01-06", "9:45", 1))
        .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "STORE_UNAVAILABLE");

    let day = chrono::NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
    assert!(app.store.list_bookings(day).await.unwrap().is_empty());
}

#[tokio::test]
async fn moving_a_booking_refreshes_both_days() {
    let app = TestApp::new();
    let pilot = app.store.add_resource("A").await;
    let monday = chrono::NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
    let tuesday = monday.succ_opt().unwrap();
    for day in [monday, tuesday] {
        app.store
            .add_availability(&AvailabilityKey {
                resource_id: pilot.id,
                day,
                time_slot: TimeSlot::T0945,
            })
            .await
            .unwrap();
    }

    let created = body_json(
        app.post("/api/v1/bookings", booking_body("2025-01-06", "9:45", 1))
            .await,
    )
    .await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    // Warm both days.
    app.get("/api/v1/days/2025-01-06/grid").await;
    app.get("/api/v1/days/2025-01-07/grid").await;

    let mut events = app.state.event_bus.subscribe();
    app.put(
        &format!("/api/v1/bookings/{id}"),
        booking_body("2025-01-07", "9:45", 1),
    )
    .await;

    let event = events.recv().await.unwrap();
    assert_eq!(event.table, ChangeTable::Bookings);
    assert_eq!(event.kind, ChangeKind::Update);
    assert_eq!(event.dates, vec![monday, tuesday]);

    let old = body_json(app.get("/api/v1/days/2025-01-06/grid").await).await;
    assert_eq!(old["data"]["rows"][2]["cells"][0]["kind"], "available");
    let new = body_json(app.get("/api/v1/days/2025-01-07/grid").await).await;
    assert_eq!(new["data"]["rows"][2]["cells"][0]["kind"], "booking");
}

#[tokio::test]
async fn tags_are_listed() {
    let app = TestApp::new();
    app.store.add_tag("VIP", "#fde68a").await;
    app.store.add_tag("Hotel", "#bfdbfe").await;

    let json = body_json(app.get("/api/v1/tags").await).await;
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Hotel", "VIP"]);
}
