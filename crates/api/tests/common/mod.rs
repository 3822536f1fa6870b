#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use tandem_api::config::ServerConfig;
use tandem_api::router::build_app_router;
use tandem_api::schedule::ScheduleService;
use tandem_api::state::AppState;
use tandem_api::ws::WsManager;
use tandem_core::grid::GridOptions;
use tandem_db::{MemoryStore, ScheduleStore};
use tandem_events::EventBus;

/// Test `ServerConfig` with development defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: None,
        grid: GridOptions::default(),
    }
}

/// An app over an in-memory store, with handles for seeding and inspection.
pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        Self::build(config, false)
    }

    /// An app whose store publishes its own change events, as the
    /// PostgreSQL store does through its triggers.
    pub fn with_change_feed() -> Self {
        Self::build(test_config(), true)
    }

    fn build(config: ServerConfig, change_feed: bool) -> Self {
        let event_bus = Arc::new(EventBus::default());
        let store = if change_feed {
            MemoryStore::new().with_change_feed(Arc::clone(&event_bus))
        } else {
            MemoryStore::new()
        };
        let dyn_store: Arc<dyn ScheduleStore> = Arc::new(store.clone());
        let schedule = Arc::new(ScheduleService::new(
            dyn_store,
            Arc::clone(&event_bus),
            config.grid,
        ));

        let state = AppState {
            schedule,
            config: Arc::new(config.clone()),
            ws_manager: Arc::new(WsManager::new()),
            event_bus,
        };
        let router = build_app_router(state.clone(), &config);

        Self {
            router,
            store,
            state,
        }
    }

    pub async fn get(&self, uri: &str) -> Response {
        send(self.router.clone(), Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Response {
        send(self.router.clone(), Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> Response {
        send(self.router.clone(), Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> Response {
        send(self.router.clone(), Method::DELETE, uri, None).await
    }
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// A minimal valid booking payload.
pub fn booking_body(date: &str, time_slot: &str, people: i32) -> Value {
    serde_json::json!({
        "name": "Jane Doe",
        "pickup_location": "Hotel Alpina",
        "number_of_people": people,
        "booking_date": date,
        "time_slot": time_slot,
    })
}
