use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{CleanerError, Result};

pub const ENV_TEAMS_AMOUNT: &str = "TEAMS_AMOUNT";
pub const ENV_BASE_SPEED: &str = "BASE_SPEED";

const DEFAULT_MESSAGE_SIZE: usize = 4 * 1024 * 1024;

/// Transport settings for the gRPC listener.
#[derive(Debug, Clone)]
pub struct GrpcConfig {
    pub listen_addr: SocketAddr,
    /// Applied both as the per-request timeout and the HTTP/2 keepalive timeout.
    pub timeout: Duration,
    /// How often idle connections are pinged. A ping unanswered within
    /// `timeout` closes the connection.
    pub keepalive_interval: Duration,
    pub max_receive_size: usize,
    pub max_send_size: usize,
}

impl Default for GrpcConfig {
    fn default() -> Self {
        Self {
            // SAFETY: This is a hardcoded valid address that will always parse
            listen_addr: "0.0.0.0:50051"
                .parse()
                .expect("default listen address is valid"),
            timeout: Duration::from_secs(15),
            keepalive_interval: Duration::from_secs(2 * 60 * 60),
            max_receive_size: DEFAULT_MESSAGE_SIZE,
            max_send_size: DEFAULT_MESSAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CleanerConfig {
    /// Number of cleaning teams in the pool.
    pub teams_amount: u64,
    /// Mean cleaning time of a slow team, in seconds. Mid teams take half of
    /// it on average, fast teams a quarter.
    pub base_speed: u64,
    pub grpc: GrpcConfig,
}

impl CleanerConfig {
    pub fn new(teams_amount: u64, base_speed: u64) -> Self {
        Self {
            teams_amount,
            base_speed,
            grpc: GrpcConfig::default(),
        }
    }

    pub fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.grpc.listen_addr = addr;
        self
    }

    /// Reject values that would leave the service unable to schedule anything.
    /// All problems are reported together.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.teams_amount == 0 {
            problems.push(format!("{} must be a positive integer", ENV_TEAMS_AMOUNT));
        }
        if self.base_speed == 0 {
            problems.push(format!("{} must be a positive integer", ENV_BASE_SPEED));
        }
        if self.grpc.keepalive_interval.is_zero() {
            problems.push("gRPC keepalive interval must be positive".to_string());
        }
        if self.grpc.max_receive_size == 0 || self.grpc.max_send_size == 0 {
            problems.push("gRPC message size limits must be positive".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(CleanerError::Configuration(problems.join("; ")))
        }
    }

    pub fn base_duration(&self) -> Duration {
        Duration::from_secs(self.base_speed)
    }
}
