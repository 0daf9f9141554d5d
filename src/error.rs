use thiserror::Error;
use tonic::Status;

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Team not found: {0}")]
    TeamNotFound(u64),

    #[error("Team {0} is busy")]
    TeamBusy(u64),

    #[error("Cleaning teams are not initialized")]
    PoolUninitialized,

    #[error("Team {0} has no cleaning in progress")]
    InvalidState(u64),

    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Reflection error: {0}")]
    Reflection(#[from] tonic_reflection::server::Error),
}

pub type Result<T> = std::result::Result<T, CleanerError>;

impl From<CleanerError> for Status {
    fn from(err: CleanerError) -> Self {
        let message = err.to_string();
        match err {
            CleanerError::TeamNotFound(_) => Status::not_found(message),
            CleanerError::TeamBusy(_) | CleanerError::InvalidState(_) => {
                Status::failed_precondition(message)
            }
            CleanerError::PoolUninitialized => Status::unavailable(message),
            CleanerError::Configuration(_)
            | CleanerError::Transport(_)
            | CleanerError::Io(_)
            | CleanerError::Reflection(_) => Status::internal(message),
        }
    }
}
