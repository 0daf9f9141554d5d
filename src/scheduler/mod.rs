pub mod duration;
pub mod service;

pub use duration::{duration_ms, CleaningTimer};
pub use service::{CleaningScheduler, ProceedCleaningOut};
