//! Cache invalidation driven by change events from outside this process.

mod common;

use std::time::Duration;

use chrono::NaiveDate;
use common::{body_json, TestApp};
use tandem_api::background::invalidator;
use tandem_core::availability::AvailabilityKey;
use tandem_core::time_slot::TimeSlot;
use tandem_db::ScheduleStore;
use tandem_events::{ChangeEvent, ChangeKind, ChangeTable};
use tokio_util::sync::CancellationToken;

const GRID: &str = "/api/v1/days/2025-01-06/grid";

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
}

async fn column_count(app: &TestApp) -> usize {
    body_json(app.get(GRID).await).await["data"]["columns"]
        .as_array()
        .unwrap()
        .len()
}

#[tokio::test]
async fn external_write_is_served_stale_until_its_event_arrives() {
    let app = TestApp::new();
    let pilot = app.store.add_resource("Alex").await;
    assert_eq!(column_count(&app).await, 0);

    // Another writer adds a mark behind the service's back.
    app.store
        .add_availability(&AvailabilityKey {
            resource_id: pilot.id,
            day: monday(),
            time_slot: TimeSlot::T0730,
        })
        .await
        .unwrap();
    assert_eq!(column_count(&app).await, 0);

    let cancel = CancellationToken::new();
    let task = tokio::spawn(invalidator::run(
        app.state.schedule.clone(),
        app.state.event_bus.subscribe(),
        cancel.clone(),
    ));

    app.state.event_bus.publish(ChangeEvent::new(
        ChangeTable::Availability,
        ChangeKind::Insert,
        [monday()],
    ));

    let mut columns = 0;
    for _ in 0..50 {
        columns = column_count(&app).await;
        if columns == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(columns, 1);

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test]
async fn events_for_other_days_leave_the_cache_alone() {
    let app = TestApp::new();
    let pilot = app.store.add_resource("Alex").await;
    assert_eq!(column_count(&app).await, 0);

    app.store
        .add_availability(&AvailabilityKey {
            resource_id: pilot.id,
            day: monday(),
            time_slot: TimeSlot::T0730,
        })
        .await
        .unwrap();

    let tuesday = monday().succ_opt().unwrap();
    let event = ChangeEvent::new(ChangeTable::Availability, ChangeKind::Insert, [tuesday]);
    app.state.schedule.invalidate(&event).await;
    assert_eq!(column_count(&app).await, 0);

    app.state.schedule.invalidate_all().await;
    assert_eq!(column_count(&app).await, 1);
}

#[tokio::test]
async fn resync_refreshes_every_cached_day() {
    let app = TestApp::new();
    let pilot = app.store.add_resource("Alex").await;
    assert_eq!(column_count(&app).await, 0);

    app.store
        .add_availability(&AvailabilityKey {
            resource_id: pilot.id,
            day: monday(),
            time_slot: TimeSlot::T0730,
        })
        .await
        .unwrap();
    assert_eq!(column_count(&app).await, 0);

    // A resync names no dates but still reaches the warmed day.
    app.state.schedule.invalidate(&ChangeEvent::resync()).await;
    assert_eq!(column_count(&app).await, 1);
}
