/// Reconciliation sweep loop
///
/// Runs `sync_all_project_teams` on a fixed interval until shutdown. Each
/// project syncs in its own transaction inside the synchronizer, so a sweep
/// iteration never aborts halfway: failures are counted, logged, and retried
/// on the next interval.
///
/// # Example
///
/// ```no_run
/// use worklane_reconciler::sweeper::{ReconcilerSweeper, SweeperConfig};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> anyhow::Result<()> {
/// let sweeper = ReconcilerSweeper::with_config(pool, SweeperConfig { interval_secs: 60 });
/// let shutdown = sweeper.shutdown_token();
///
/// tokio::spawn(async move {
///     tokio::signal::ctrl_c().await.ok();
///     shutdown.cancel();
/// });
///
/// sweeper.run().await;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use worklane_engine::sync::TeamSynchronizer;

/// Sweeper configuration
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Seconds between sweeps
    pub interval_secs: u64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        SweeperConfig { interval_secs: 300 }
    }
}

/// Periodic team-reconciliation worker
pub struct ReconcilerSweeper {
    /// The synchronizer doing the actual work
    synchronizer: TeamSynchronizer,

    /// Configuration
    config: SweeperConfig,

    /// Shutdown token
    shutdown_token: CancellationToken,
}

impl ReconcilerSweeper {
    /// Creates a sweeper with default configuration
    pub fn new(db: PgPool) -> Self {
        Self::with_config(db, SweeperConfig::default())
    }

    /// Creates a sweeper with custom configuration
    pub fn with_config(db: PgPool, config: SweeperConfig) -> Self {
        ReconcilerSweeper {
            synchronizer: TeamSynchronizer::new(db),
            config,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Gets the shutdown token
    ///
    /// Used to signal graceful shutdown from external handlers.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Runs the sweep loop until shutdown
    ///
    /// A sweep that cannot even list projects (database unreachable) is
    /// logged and retried on the next interval rather than terminating the
    /// worker.
    pub async fn run(&self) {
        info!(
            interval_secs = self.config.interval_secs,
            "Reconciler sweeper starting"
        );

        loop {
            match self.synchronizer.sync_all_project_teams().await {
                Ok(summary) => {
                    info!(
                        synced = summary.synced,
                        failed = summary.failed,
                        "Reconciliation sweep finished"
                    );
                }
                Err(e) => {
                    error!(error = %e, "Reconciliation sweep could not run");
                }
            }

            tokio::select! {
                _ = self.shutdown_token.cancelled() => {
                    info!("Shutdown requested, stopping sweeper");
                    break;
                }
                _ = sleep(Duration::from_secs(self.config.interval_secs)) => {}
            }
        }
    }
}
