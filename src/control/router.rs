//! Remote action intake from notification buttons and other external senders

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{Command, CommandSender, Control, ControlPanel};
use crate::error::{Result, TimerError};

/// Actions delivered asynchronously by the notification channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemoteAction {
    StopTimer,
    PauseTimer,
    ResumeTimer,
    StopSound,
    StopVibration,
}

impl RemoteAction {
    pub const ALL: [RemoteAction; 5] = [
        RemoteAction::StopTimer,
        RemoteAction::PauseTimer,
        RemoteAction::ResumeTimer,
        RemoteAction::StopSound,
        RemoteAction::StopVibration,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RemoteAction::StopTimer => "stop-timer",
            RemoteAction::PauseTimer => "pause-timer",
            RemoteAction::ResumeTimer => "resume-timer",
            RemoteAction::StopSound => "stop-sound",
            RemoteAction::StopVibration => "stop-vibration",
        }
    }
}

impl fmt::Display for RemoteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RemoteAction {
    type Err = TimerError;

    fn from_str(s: &str) -> Result<Self> {
        RemoteAction::ALL
            .into_iter()
            .find(|action| action.name() == s)
            .ok_or_else(|| TimerError::UnknownAction(s.to_string()))
    }
}

/// Forwards remote actions into the control loop
#[derive(Debug, Clone)]
pub struct RemoteControlRouter {
    commands: CommandSender,
}

impl RemoteControlRouter {
    pub fn new(commands: CommandSender) -> Self {
        Self { commands }
    }

    /// Queue `action` for the control loop. Never blocks.
    pub fn dispatch(&self, action: RemoteAction) -> Result<()> {
        info!("Remote action received: {}", action);
        self.commands.send(Command::Remote(action)).map_err(|_| {
            warn!("Dropping remote action {}: control loop closed", action);
            TimerError::ControlLoopClosed
        })
    }
}

/// The local control a remote action stands for, or `None` when the action
/// no longer matches what the panel shows
pub fn control_for(action: RemoteAction, panel: &ControlPanel) -> Option<Control> {
    match action {
        RemoteAction::StopTimer => panel.run_active().then_some(Control::StartStop),
        RemoteAction::PauseTimer => {
            (panel.run_active() && !panel.is_paused()).then_some(Control::PauseResume)
        }
        RemoteAction::ResumeTimer => panel.is_paused().then_some(Control::PauseResume),
        RemoteAction::StopSound | RemoteAction::StopVibration => Some(Control::StopAlert),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{PrimaryControl, SecondaryControl};
    use tokio::sync::mpsc;

    #[test]
    fn test_parse_names() {
        for action in RemoteAction::ALL {
            assert_eq!(action.name().parse::<RemoteAction>().unwrap(), action);
        }
        assert!(matches!(
            "snooze".parse::<RemoteAction>(),
            Err(TimerError::UnknownAction(_))
        ));
    }

    #[test]
    fn test_stale_actions_map_to_nothing() {
        let idle = ControlPanel::new();
        assert_eq!(control_for(RemoteAction::StopTimer, &idle), None);
        assert_eq!(control_for(RemoteAction::PauseTimer, &idle), None);
        assert_eq!(control_for(RemoteAction::ResumeTimer, &idle), None);
        assert_eq!(control_for(RemoteAction::StopSound, &idle), Some(Control::StopAlert));

        let mut running = ControlPanel::new();
        running.primary = PrimaryControl::Stop;
        assert_eq!(control_for(RemoteAction::PauseTimer, &running), Some(Control::PauseResume));
        assert_eq!(control_for(RemoteAction::ResumeTimer, &running), None);

        running.secondary = SecondaryControl::Resume;
        assert_eq!(control_for(RemoteAction::PauseTimer, &running), None);
        assert_eq!(control_for(RemoteAction::ResumeTimer, &running), Some(Control::PauseResume));
        assert_eq!(control_for(RemoteAction::StopTimer, &running), Some(Control::StartStop));
    }

    #[test]
    fn test_dispatch_after_loop_closed() {
        let (tx, rx) = mpsc::unbounded_channel();
        let router = RemoteControlRouter::new(tx);
        router.dispatch(RemoteAction::PauseTimer).unwrap();
        drop(rx);
        assert!(matches!(
            router.dispatch(RemoteAction::StopTimer),
            Err(TimerError::ControlLoopClosed)
        ));
    }
}
