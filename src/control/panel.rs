//! Control panel model rendered by the display surface

use serde::Serialize;

use crate::{services::AlertKind, state::TimerDuration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrimaryControl {
    Start,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SecondaryControl {
    Pause,
    Resume,
}

/// Everything the display shows besides the remaining time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlPanel {
    /// Picker values used by the next start
    pub inputs: TimerDuration,
    pub inputs_enabled: bool,
    pub primary: PrimaryControl,
    pub secondary: SecondaryControl,
    /// Visible stop-alert control, if an alert is active
    pub stop_alert: Option<AlertKind>,
    pub running_for: Option<String>,
    pub status: Option<String>,
}

impl ControlPanel {
    pub fn new() -> Self {
        Self {
            inputs: TimerDuration::ZERO,
            inputs_enabled: true,
            primary: PrimaryControl::Start,
            secondary: SecondaryControl::Pause,
            stop_alert: None,
            running_for: None,
            status: None,
        }
    }

    /// A run is active (running or paused)
    pub fn run_active(&self) -> bool {
        self.primary == PrimaryControl::Stop
    }

    pub fn is_paused(&self) -> bool {
        self.run_active() && self.secondary == SecondaryControl::Resume
    }

    /// Switch to the running layout
    pub fn enter_run(&mut self, running_for: Option<String>, status: String) {
        if running_for.is_some() {
            self.running_for = running_for;
        }
        self.status = Some(status);
        self.primary = PrimaryControl::Stop;
        self.secondary = SecondaryControl::Pause;
        self.inputs_enabled = false;
        self.stop_alert = None;
    }

    /// Back to the idle layout with the pickers reset
    pub fn leave_run(&mut self) {
        self.inputs = TimerDuration::ZERO;
        self.inputs_enabled = true;
        self.primary = PrimaryControl::Start;
        self.secondary = SecondaryControl::Pause;
        self.running_for = None;
        self.status = None;
    }
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self::new()
    }
}
