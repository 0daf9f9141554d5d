use std::time::Duration;

use tonic::{Request, Response, Status};

use crate::pool::{CleaningRequest, SpeedClass, TeamStats};
use crate::proto::cleaner_service_server::CleanerService;
use crate::proto::{
    GetAvailableTeamsIn, GetAvailableTeamsOut, GetTeamsStatsIn, GetTeamsStatsOut,
    ProceedCleaningIn, ProceedCleaningOut, Request as ProtoRequest, Speed as ProtoSpeed,
    TeamStats as ProtoTeamStats,
};
use crate::scheduler::{duration_ms, CleaningScheduler};

impl From<SpeedClass> for ProtoSpeed {
    fn from(speed: SpeedClass) -> Self {
        match speed {
            SpeedClass::Fast => ProtoSpeed::Fast,
            SpeedClass::Mid => ProtoSpeed::Mid,
            SpeedClass::Slow => ProtoSpeed::Slow,
        }
    }
}

impl From<ProtoRequest> for CleaningRequest {
    fn from(req: ProtoRequest) -> Self {
        let mut request =
            CleaningRequest::new(req.id, req.client_id, req.cleaning_type, req.priority);
        // Time already spent elsewhere keeps accumulating.
        request.add_time_in_cleaner(Duration::from_millis(req.time_in_cleaner_ms));
        request
    }
}

impl From<&CleaningRequest> for ProtoRequest {
    fn from(req: &CleaningRequest) -> Self {
        ProtoRequest {
            id: req.id,
            client_id: req.client_id,
            team_id: req.assigned_team.unwrap_or_default(),
            cleaning_type: req.cleaning_type,
            priority: req.priority,
            time_in_cleaner_ms: duration_ms(req.time_in_cleaner),
        }
    }
}

impl From<&TeamStats> for ProtoTeamStats {
    fn from(stats: &TeamStats) -> Self {
        ProtoTeamStats {
            id: stats.id,
            speed: ProtoSpeed::from(stats.speed) as i32,
            processed_requests: stats.processed_requests,
            total_busy_time_ms: duration_ms(stats.total_busy_time),
        }
    }
}

/// gRPC front of the [`CleaningScheduler`].
pub struct CleanerServiceImpl {
    scheduler: CleaningScheduler,
}

impl CleanerServiceImpl {
    pub fn new(scheduler: CleaningScheduler) -> Self {
        Self { scheduler }
    }
}

#[tonic::async_trait]
impl CleanerService for CleanerServiceImpl {
    async fn proceed_cleaning(
        &self,
        request: Request<ProceedCleaningIn>,
    ) -> Result<Response<ProceedCleaningOut>, Status> {
        let input = request.into_inner();
        tracing::debug!(team_id = input.team_id, req = ?input.req, "ProceedCleaning");

        let req = input
            .req
            .ok_or_else(|| Status::invalid_argument("Request cannot be empty"))?;

        let out = self
            .scheduler
            .proceed_cleaning(input.team_id, req.into())
            .await?;

        Ok(Response::new(ProceedCleaningOut {
            team_id: out.team_id,
            duration_ms: duration_ms(out.duration),
            req: Some(ProtoRequest::from(&out.request)),
        }))
    }

    async fn get_available_teams(
        &self,
        _request: Request<GetAvailableTeamsIn>,
    ) -> Result<Response<GetAvailableTeamsOut>, Status> {
        tracing::debug!("GetAvailableTeams");

        let teams_ids = self.scheduler.available_teams().await?;
        Ok(Response::new(GetAvailableTeamsOut { teams_ids }))
    }

    async fn get_teams_stats(
        &self,
        _request: Request<GetTeamsStatsIn>,
    ) -> Result<Response<GetTeamsStatsOut>, Status> {
        tracing::debug!("GetTeamsStats");

        let stats = self.scheduler.teams_stats().await?;
        Ok(Response::new(GetTeamsStatsOut {
            stats: stats.iter().map(ProtoTeamStats::from).collect(),
        }))
    }
}
