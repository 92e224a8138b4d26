//! Result of applying one command

use crate::error::TimerError;

#[derive(Debug)]
pub enum ControlOutcome {
    Started,
    Stopped,
    Paused,
    Resumed,
    AlertStopped,
    RunFinished,
    InputsChanged,
    /// Command did not apply to the current state; nothing changed
    Ignored,
    Rejected(TimerError),
}

impl ControlOutcome {
    /// Whether the command changed anything
    pub fn is_applied(&self) -> bool {
        !matches!(self, ControlOutcome::Ignored | ControlOutcome::Rejected(_))
    }
}

impl From<TimerError> for ControlOutcome {
    fn from(error: TimerError) -> Self {
        ControlOutcome::Rejected(error)
    }
}
