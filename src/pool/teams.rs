use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;

use crate::error::{CleanerError, Result};
use crate::pool::request::CleaningRequest;
use crate::pool::team::{CleaningTeam, SpeedClass, TeamState, TeamStats};

/// Outcome of a finished cleaning.
#[derive(Debug, Clone)]
pub struct CompletedCleaning {
    pub team_id: u64,
    pub request: CleaningRequest,
    pub elapsed: Duration,
}

/// Fixed-size set of cleaning teams, indexed by id.
///
/// The pool does no locking of its own; callers share it behind a lock and
/// every transition takes `&mut self`.
#[derive(Debug, Default)]
pub struct TeamPool {
    teams: Vec<CleaningTeam>,
}

impl TeamPool {
    /// Create `size` available teams with speeds drawn from `rng`.
    pub fn new<R: Rng + ?Sized>(size: u64, rng: &mut R) -> Result<Self> {
        if size == 0 {
            return Err(CleanerError::Configuration(
                "team pool size must be positive".to_string(),
            ));
        }

        let teams = (0..size)
            .map(|id| CleaningTeam::new(id, rng.gen()))
            .collect();

        Ok(Self { teams })
    }

    /// Create one team per entry of `speeds`, in order.
    pub fn with_speeds(speeds: impl IntoIterator<Item = SpeedClass>) -> Result<Self> {
        let teams: Vec<CleaningTeam> = speeds
            .into_iter()
            .zip(0u64..)
            .map(|(speed, id)| CleaningTeam::new(id, speed))
            .collect();

        if teams.is_empty() {
            return Err(CleanerError::Configuration(
                "team pool size must be positive".to_string(),
            ));
        }

        Ok(Self { teams })
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn team(&self, team_id: u64) -> Result<&CleaningTeam> {
        usize::try_from(team_id)
            .ok()
            .and_then(|idx| self.teams.get(idx))
            .ok_or(CleanerError::TeamNotFound(team_id))
    }

    fn team_mut(&mut self, team_id: u64) -> Result<&mut CleaningTeam> {
        usize::try_from(team_id)
            .ok()
            .and_then(|idx| self.teams.get_mut(idx))
            .ok_or(CleanerError::TeamNotFound(team_id))
    }

    /// Bind `request` to an available team and mark it busy.
    ///
    /// Returns a copy of the stored request with `assigned_team` set. A busy
    /// team is left untouched.
    pub fn assign(
        &mut self,
        team_id: u64,
        mut request: CleaningRequest,
    ) -> Result<CleaningRequest> {
        let team = self.team_mut(team_id)?;
        if !team.is_available() {
            return Err(CleanerError::TeamBusy(team_id));
        }

        request.assigned_team = Some(team_id);
        let echo = request.clone();
        team.state = TeamState::Busy {
            request,
            assigned_at: Instant::now(),
        };

        Ok(echo)
    }

    /// Return a busy team to the available state and record its busy time,
    /// measured from the moment of assignment.
    pub fn complete(&mut self, team_id: u64) -> Result<CompletedCleaning> {
        let team = self.team_mut(team_id)?;

        match std::mem::replace(&mut team.state, TeamState::Available) {
            TeamState::Available => Err(CleanerError::InvalidState(team_id)),
            TeamState::Busy {
                request,
                assigned_at,
            } => {
                let elapsed = assigned_at.elapsed();
                team.processed_requests += 1;
                team.total_busy_time = team.total_busy_time.saturating_add(elapsed);

                Ok(CompletedCleaning {
                    team_id,
                    request,
                    elapsed,
                })
            }
        }
    }

    /// Ids of available teams, ascending.
    pub fn available_teams(&self) -> Vec<u64> {
        self.teams
            .iter()
            .filter(|t| t.is_available())
            .map(|t| t.id)
            .collect()
    }

    pub fn busy_count(&self) -> usize {
        self.teams.iter().filter(|t| !t.is_available()).count()
    }

    /// Counters for every team, ascending by id.
    pub fn stats(&self) -> Vec<TeamStats> {
        self.teams.iter().map(CleaningTeam::stats).collect()
    }
}
