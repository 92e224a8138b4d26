//! Error taxonomy for the timer engine and its collaborators

use thiserror::Error;

use crate::state::EngineState;

/// Errors raised by timer operations
#[derive(Error, Debug)]
pub enum TimerError {
    #[error("Cannot start a timer with hours, minutes and seconds all at zero")]
    InvalidDuration,

    #[error("No need to pause a timer that is already at zero")]
    RedundantPause,

    #[error("{field} value {value} is out of range (maximum {max})")]
    OutOfRange {
        field: &'static str,
        value: u32,
        max: u8,
    },

    #[error("Cannot {action} while the timer is {from}")]
    InvalidTransition {
        from: EngineState,
        action: &'static str,
    },

    #[error("Playback handle has already been released")]
    StaleHandle,

    #[error("Notification permission was denied")]
    PermissionDenied,

    #[error("Failed to read preferences file: {0}")]
    PreferencesIo(#[from] std::io::Error),

    #[error("Failed to parse preferences file: {0}")]
    PreferencesParse(#[from] serde_json::Error),

    #[error("Unknown remote action: {0}")]
    UnknownAction(String),

    #[error("Control loop is no longer running")]
    ControlLoopClosed,
}

impl TimerError {
    /// Errors the user should see as a short message rather than a log line
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            TimerError::InvalidDuration | TimerError::RedundantPause | TimerError::PermissionDenied
        )
    }
}

pub type Result<T, E = TimerError> = std::result::Result<T, E>;
