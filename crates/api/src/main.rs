use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tandem_api::config::ServerConfig;
use tandem_api::router::build_app_router;
use tandem_api::schedule::ScheduleService;
use tandem_api::state::AppState;
use tandem_api::{background, ws};
use tandem_db::{MemoryStore, PgStore, ScheduleStore};
use tandem_events::{EventBus, PgChangeListener};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tandem_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        column_order = ?config.grid.column_order,
        width_policy = ?config.grid.width_policy,
        "Loaded server configuration"
    );

    let cancel = CancellationToken::new();
    let event_bus = Arc::new(EventBus::default());

    // --- Store ---
    let (store, listener_handle) = match &config.database_url {
        Some(url) => {
            let pool = tandem_db::create_pool(url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            tandem_db::health_check(&pool)
                .await
                .expect("Database health check failed");

            tandem_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            // Store NOTIFY -> event bus.
            let listener = PgChangeListener::new(pool.clone(), Arc::clone(&event_bus));
            let listener_cancel = cancel.clone();
            let handle = tokio::spawn(async move {
                if let Err(e) = listener.run(listener_cancel).await {
                    tracing::error!(error = %e, "Change listener failed");
                }
            });

            let store: Arc<dyn ScheduleStore> = Arc::new(PgStore::new(pool));
            (store, Some(handle))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store with demo data");
            let store: Arc<dyn ScheduleStore> = Arc::new(MemoryStore::with_demo_data().await);
            (store, None)
        }
    };

    // --- Schedule service + cache invalidation ---
    let schedule = Arc::new(ScheduleService::new(
        store,
        Arc::clone(&event_bus),
        config.grid,
    ));
    let invalidator_handle = tokio::spawn(background::invalidator::run(
        Arc::clone(&schedule),
        event_bus.subscribe(),
        cancel.clone(),
    ));

    // --- WebSocket ---
    let ws_manager = Arc::new(ws::WsManager::new());
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager));
    let forwarder_handle = tokio::spawn(ws::forward_changes(
        Arc::clone(&ws_manager),
        event_bus.subscribe(),
    ));

    // --- App state + router ---
    let state = AppState {
        schedule,
        config: Arc::new(config.clone()),
        ws_manager: Arc::clone(&ws_manager),
        event_bus: Arc::clone(&event_bus),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let grace = Duration::from_secs(config.shutdown_timeout_secs);

    cancel.cancel();
    if let Some(handle) = listener_handle {
        let _ = tokio::time::timeout(grace, handle).await;
    }
    let _ = tokio::time::timeout(grace, invalidator_handle).await;
    tracing::info!("Background tasks stopped");

    ws_manager.shutdown_all().await;
    heartbeat_handle.abort();
    forwarder_handle.abort();

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or (on Unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
