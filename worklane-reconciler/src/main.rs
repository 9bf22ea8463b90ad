//! # Worklane Reconciler Worker
//!
//! Periodically reconciles every active project's member set against the
//! reporting hierarchy. Membership is derived data; this worker is the
//! self-healing half of the design, repairing drift caused by reporting-line
//! changes that happen without any project being touched.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://... cargo run -p worklane-reconciler
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use worklane_reconciler::config::Config;
use worklane_reconciler::sweeper::{ReconcilerSweeper, SweeperConfig};
use worklane_shared::db::{create_pool, run_migrations};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "worklane_reconciler=info,worklane_engine=info,worklane_shared=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Worklane reconciler v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(config.database.clone()).await?;
    run_migrations(&pool).await?;

    let sweeper = ReconcilerSweeper::with_config(
        pool,
        SweeperConfig {
            interval_secs: config.sweep_interval_seconds,
        },
    );

    let shutdown_token = sweeper.shutdown_token();
    let handle = tokio::spawn(async move { sweeper.run().await });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    shutdown_token.cancel();

    handle.await?;
    tracing::info!("Reconciler stopped");

    Ok(())
}
