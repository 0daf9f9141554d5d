use std::time::Duration;

/// A cleaning request as submitted by a client.
///
/// `cleaning_type` and `priority` are carried through unchanged; scheduling
/// does not look at them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CleaningRequest {
    pub id: u64,
    pub client_id: u64,
    pub cleaning_type: u32,
    pub priority: u32,
    pub assigned_team: Option<u64>,
    pub time_in_cleaner: Duration,
}

impl CleaningRequest {
    pub fn new(id: u64, client_id: u64, cleaning_type: u32, priority: u32) -> Self {
        Self {
            id,
            client_id,
            cleaning_type,
            priority,
            assigned_team: None,
            time_in_cleaner: Duration::ZERO,
        }
    }

    /// Account for a scheduled cleaning. Accumulates across assignments.
    pub fn add_time_in_cleaner(&mut self, duration: Duration) {
        self.time_in_cleaner = self.time_in_cleaner.saturating_add(duration);
    }
}
