use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the alarm core. All of them are recoverable: they are
/// reported to the caller and never stop the scheduler loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlarmError {
    #[error("invalid time {hour:02}:{minute:02}: hour must be 0-23 and minute 0-59")]
    InvalidTime { hour: u32, minute: u32 },

    #[error("invalid position: {0}")]
    InvalidPosition(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("puzzle #{index} is unusable: {reason}")]
    InvalidPuzzle { index: usize, reason: String },

    #[error("alarm {0} is not pending")]
    AlarmNotFound(Uuid),

    #[error("puzzle repository is empty")]
    NoPuzzles,
}

pub type Result<T> = std::result::Result<T, AlarmError>;
