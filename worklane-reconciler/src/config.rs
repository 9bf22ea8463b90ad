/// Configuration for the reconciler worker
///
/// Loaded from environment variables:
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS` / `DATABASE_MIN_CONNECTIONS`: pool overrides
/// - `SWEEP_INTERVAL_SECONDS`: seconds between reconciliation sweeps
///   (default: 300)
/// - `RUST_LOG`: log filter (default: info)

use worklane_shared::db::pool::DatabaseConfig;

/// Complete reconciler configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database pool configuration
    pub database: DatabaseConfig,

    /// Seconds between reconciliation sweeps
    pub sweep_interval_seconds: u64,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or an override fails to
    /// parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let database = DatabaseConfig::from_env()?;

        let sweep_interval_seconds = std::env::var("SWEEP_INTERVAL_SECONDS")
            .unwrap_or_else(|_| "300".to_string())
            .parse::<u64>()?;

        Ok(Self {
            database,
            sweep_interval_seconds,
        })
    }
}
