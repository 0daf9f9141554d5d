use tokio_util::sync::CancellationToken;

use crate::config::CleanerConfig;
use crate::error::Result;
use crate::grpc::GrpcServer;
use crate::pool::TeamPool;
use crate::scheduler::{CleaningScheduler, CleaningTimer};

/// A running cleaner process: the team pool, the scheduler on top of it and
/// the gRPC server exposing both.
pub struct CleanerNode {
    pub config: CleanerConfig,
    pub scheduler: CleaningScheduler,
}

impl CleanerNode {
    /// Validate `config` and create the team pool. Team speeds and cleaning
    /// durations are drawn from entropy-seeded generators.
    pub fn new(config: CleanerConfig) -> Result<Self> {
        config.validate()?;

        let pool = TeamPool::new(config.teams_amount, &mut rand::thread_rng())?;
        let timer = CleaningTimer::new(config.base_duration());

        for stats in pool.stats() {
            tracing::debug!(team_id = stats.id, speed = %stats.speed, "Team initialized");
        }

        Ok(Self {
            scheduler: CleaningScheduler::new(pool, timer),
            config,
        })
    }

    /// Serve until `shutdown` is cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound or the server fails.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        tracing::info!(
            teams_amount = self.config.teams_amount,
            base_speed = self.config.base_speed,
            listen_addr = %self.config.grpc.listen_addr,
            "Starting cleaner"
        );

        GrpcServer::new(self.config.grpc.clone(), self.scheduler.clone())
            .run(shutdown)
            .await?;

        let busy = self.scheduler.busy_count().await;
        if busy > 0 {
            tracing::warn!(busy, "Stopped with cleanings still in progress");
        }
        Ok(())
    }
}
