use tandem_core::grid::GridOptions;
use tandem_core::packer::WidthPolicy;
use tandem_core::resource::ColumnOrder;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on post-shutdown cleanup, in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// PostgreSQL URL. Unset means the in-memory store.
    pub database_url: Option<String>,
    /// Column order, width policy and padding for the daily grid.
    pub grid: GridOptions,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `DATABASE_URL`         | unset (in-memory store)    |
    /// | `COLUMN_ORDER`         | `first_seen`               |
    /// | `MAX_BOOKING_WIDTH`    | unset (raw party size)     |
    /// | `GRID_MIN_COLUMNS`     | unset (no padding)         |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let column_order: ColumnOrder = std::env::var("COLUMN_ORDER")
            .unwrap_or_else(|_| "first_seen".into())
            .parse()
            .expect("COLUMN_ORDER must be first_seen or display_name");

        let width_policy: WidthPolicy = std::env::var("MAX_BOOKING_WIDTH")
            .unwrap_or_default()
            .parse()
            .expect("MAX_BOOKING_WIDTH must be a positive integer");

        let min_columns: Option<usize> = std::env::var("GRID_MIN_COLUMNS").ok().map(|v| {
            v.parse()
                .expect("GRID_MIN_COLUMNS must be a valid usize")
        });

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            database_url,
            grid: GridOptions {
                column_order,
                width_policy,
                min_columns,
            },
        }
    }
}
