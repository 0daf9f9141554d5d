use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};

use crate::error::{CleanerError, Result};
use crate::pool::{CleaningRequest, TeamPool, TeamStats};
use crate::scheduler::duration::{duration_ms, CleaningTimer};

/// Result of an accepted cleaning request.
#[derive(Debug, Clone)]
pub struct ProceedCleaningOut {
    pub team_id: u64,
    /// Scheduled cleaning time. The team becomes available again once it
    /// has elapsed.
    pub duration: Duration,
    pub request: CleaningRequest,
}

/// Entry point for the cleaning RPCs.
///
/// Owns shared handles to the team pool and the duration source. Cloning is
/// cheap and every clone operates on the same pool.
#[derive(Debug, Clone)]
pub struct CleaningScheduler {
    pool: Arc<RwLock<TeamPool>>,
    timer: Arc<Mutex<CleaningTimer>>,
}

impl CleaningScheduler {
    pub fn new(pool: TeamPool, timer: CleaningTimer) -> Self {
        Self {
            pool: Arc::new(RwLock::new(pool)),
            timer: Arc::new(Mutex::new(timer)),
        }
    }

    /// The request `team_id` is working on, if any.
    pub async fn current_request(&self, team_id: u64) -> Result<Option<CleaningRequest>> {
        let pool = self.pool.read().await;
        Ok(pool.team(team_id)?.current_request().cloned())
    }

    /// Number of teams with a cleaning in progress.
    pub async fn busy_count(&self) -> usize {
        self.pool.read().await.busy_count()
    }

    /// Assign `request` to `team_id` and schedule its completion.
    ///
    /// Returns as soon as the team is marked busy. Completion runs on a
    /// detached task that outlives the caller and cannot be cancelled.
    pub async fn proceed_cleaning(
        &self,
        team_id: u64,
        mut request: CleaningRequest,
    ) -> Result<ProceedCleaningOut> {
        let (duration, request) = {
            let mut pool = self.pool.write().await;
            let team = pool.team(team_id)?;
            if !team.is_available() {
                return Err(CleanerError::TeamBusy(team_id));
            }
            let speed = team.speed();

            let duration = self.timer.lock().await.sample(speed);
            request.add_time_in_cleaner(duration);
            let request = pool.assign(team_id, request)?;

            tracing::info!(
                team_id,
                request_id = request.id,
                client_id = request.client_id,
                %speed,
                duration_ms = duration_ms(duration),
                "Cleaning assigned"
            );
            (duration, request)
        };

        self.schedule_completion(team_id, duration);

        Ok(ProceedCleaningOut {
            team_id,
            duration,
            request,
        })
    }

    fn schedule_completion(&self, team_id: u64, duration: Duration) {
        let pool = self.pool.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;

            let result = pool.write().await.complete(team_id);
            match result {
                Ok(done) => {
                    tracing::info!(
                        team_id,
                        request_id = done.request.id,
                        elapsed_ms = duration_ms(done.elapsed),
                        "Team completed cleaning"
                    );
                }
                Err(e @ CleanerError::InvalidState(_)) => {
                    tracing::warn!(team_id, error = %e, "Completion for idle team ignored");
                }
                Err(e) => {
                    tracing::error!(team_id, error = %e, "Failed to complete cleaning");
                }
            }
        });
    }

    /// Ids of the teams that can take a request right now, ascending.
    pub async fn available_teams(&self) -> Result<Vec<u64>> {
        let pool = self.pool.read().await;
        if pool.is_empty() {
            tracing::error!("teams are not initialized");
            return Err(CleanerError::PoolUninitialized);
        }
        Ok(pool.available_teams())
    }

    /// Utilization counters of every team, ascending by id.
    pub async fn teams_stats(&self) -> Result<Vec<TeamStats>> {
        let pool = self.pool.read().await;
        if pool.is_empty() {
            tracing::error!("teams are not initialized");
            return Err(CleanerError::PoolUninitialized);
        }
        Ok(pool.stats())
    }
}
