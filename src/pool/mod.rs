//! In-memory state of the cleaning teams.
//!
//! Each team moves through a two-state machine:
//!
//! ```text
//! Available --assign--> Busy --complete--> Available
//! ```
//!
//! - [`TeamPool`]: the fixed set of teams and the transitions between states
//! - [`CleaningTeam`]: one team with its speed class and counters
//! - [`CleaningRequest`]: the unit of work a team is bound to while busy
//!
//! Statistics (`processed_requests`, `total_busy_time`) change only inside
//! [`TeamPool::complete`].

pub mod request;
pub mod team;
pub mod teams;

pub use request::CleaningRequest;
pub use team::{CleaningTeam, SpeedClass, TeamState, TeamStats, TeamStatus};
pub use teams::{CompletedCleaning, TeamPool};
