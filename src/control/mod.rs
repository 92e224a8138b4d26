//! Control intake module
//!
//! Local control presses, remote notification actions and background task
//! events all arrive as [`Command`]s on one channel and are applied by the
//! [`Controller`], the only execution context allowed to touch the display.

pub mod handlers;
pub mod outcome;
pub mod panel;
pub mod router;

use tokio::sync::mpsc;
use tracing::warn;

use crate::state::TimerDuration;

pub use handlers::{Controller, DisplaySurface};
pub use outcome::ControlOutcome;
pub use panel::{ControlPanel, PrimaryControl, SecondaryControl};
pub use router::{RemoteAction, RemoteControlRouter};

/// On-screen controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Start, or Stop while a run is active
    StartStop,
    /// Pause, or Resume while paused
    PauseResume,
    /// Silence the ringtone or vibration after the countdown finished
    StopAlert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Press(Control),
    Remote(RemoteAction),
    /// Picker values changed
    SetInputs(TimerDuration),
    /// Posted by the finish watcher once the run is over
    RunFinished { run_id: u64, finished_naturally: bool },
    Shutdown,
}

pub type CommandSender = mpsc::UnboundedSender<Command>;
pub type CommandReceiver = mpsc::UnboundedReceiver<Command>;

/// Ask the control loop to shut down. Returns `false` if it already exited.
pub fn request_shutdown(commands: &CommandSender) -> bool {
    if commands.send(Command::Shutdown).is_err() {
        warn!("Control loop closed before shutdown was requested");
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shutdown() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        assert!(request_shutdown(&tx));
        assert_eq!(rx.try_recv().unwrap(), Command::Shutdown);

        drop(rx);
        assert!(!request_shutdown(&tx));
    }
}
