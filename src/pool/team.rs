use std::time::Duration;

use rand::distributions::{Distribution, Standard};
use rand::Rng;
use tokio::time::Instant;

use crate::pool::request::CleaningRequest;

/// How quickly a team works. Fixed for the lifetime of the team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeedClass {
    Fast,
    Mid,
    Slow,
}

impl SpeedClass {
    pub const ALL: [SpeedClass; 3] = [SpeedClass::Fast, SpeedClass::Mid, SpeedClass::Slow];

    /// Fraction of the base (slow) cleaning time this class needs on average.
    pub fn divisor(self) -> u32 {
        match self {
            SpeedClass::Fast => 4,
            SpeedClass::Mid => 2,
            SpeedClass::Slow => 1,
        }
    }
}

impl std::fmt::Display for SpeedClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpeedClass::Fast => write!(f, "fast"),
            SpeedClass::Mid => write!(f, "mid"),
            SpeedClass::Slow => write!(f, "slow"),
        }
    }
}

/// Uniform draw over the three classes.
impl Distribution<SpeedClass> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SpeedClass {
        SpeedClass::ALL[rng.gen_range(0..SpeedClass::ALL.len())]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamStatus {
    Available,
    Busy,
}

/// The request only exists while the team is busy.
#[derive(Debug, Clone)]
pub enum TeamState {
    Available,
    Busy {
        request: CleaningRequest,
        assigned_at: Instant,
    },
}

#[derive(Debug, Clone)]
pub struct CleaningTeam {
    pub(crate) id: u64,
    pub(crate) speed: SpeedClass,
    pub(crate) state: TeamState,
    pub(crate) processed_requests: u64,
    pub(crate) total_busy_time: Duration,
}

impl CleaningTeam {
    pub fn new(id: u64, speed: SpeedClass) -> Self {
        Self {
            id,
            speed,
            state: TeamState::Available,
            processed_requests: 0,
            total_busy_time: Duration::ZERO,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn speed(&self) -> SpeedClass {
        self.speed
    }

    pub fn status(&self) -> TeamStatus {
        match self.state {
            TeamState::Available => TeamStatus::Available,
            TeamState::Busy { .. } => TeamStatus::Busy,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status() == TeamStatus::Available
    }

    pub fn current_request(&self) -> Option<&CleaningRequest> {
        match &self.state {
            TeamState::Available => None,
            TeamState::Busy { request, .. } => Some(request),
        }
    }

    pub fn processed_requests(&self) -> u64 {
        self.processed_requests
    }

    pub fn total_busy_time(&self) -> Duration {
        self.total_busy_time
    }

    pub fn stats(&self) -> TeamStats {
        TeamStats {
            id: self.id,
            speed: self.speed,
            processed_requests: self.processed_requests,
            total_busy_time: self.total_busy_time,
        }
    }
}

/// Point-in-time utilization counters of one team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamStats {
    pub id: u64,
    pub speed: SpeedClass,
    pub processed_requests: u64,
    pub total_busy_time: Duration,
}
