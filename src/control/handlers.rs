//! Control handlers applied on the single display context

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{
    router, Command, CommandReceiver, Control, ControlOutcome, ControlPanel, PrimaryControl,
    SecondaryControl,
};
use crate::{
    error::{Result, TimerError},
    state::{AppState, TimerDuration, TimerSnapshot},
    utils::clock::ends_at_text,
};

/// The visible surface: pickers, buttons, labels and short messages
pub trait DisplaySurface: Send {
    fn show_message(&mut self, message: &str);
    fn render(&mut self, panel: &ControlPanel, snapshot: &TimerSnapshot);
}

/// Owns the control panel and applies every command in arrival order
pub struct Controller<S: DisplaySurface> {
    state: Arc<AppState>,
    panel: ControlPanel,
    surface: S,
}

impl<S: DisplaySurface> Controller<S> {
    pub fn new(state: Arc<AppState>, surface: S) -> Self {
        Self {
            state,
            panel: ControlPanel::new(),
            surface,
        }
    }

    pub fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Apply commands and render timer updates until shutdown
    pub async fn run(mut self, mut commands: CommandReceiver) {
        info!("Control loop started");
        let mut updates = self.state.subscribe();

        loop {
            tokio::select! {
                command = commands.recv() => {
                    match command {
                        Some(Command::Shutdown) | None => break,
                        Some(command) => {
                            self.handle(command);
                        }
                    }
                }
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = *updates.borrow_and_update();
                    self.surface.render(&self.panel, &snapshot);
                }
            }
        }

        self.shutdown();
    }

    /// Apply a single command and refresh the display
    pub fn handle(&mut self, command: Command) -> ControlOutcome {
        debug!("Handling command {:?}", command);

        let result = match command {
            Command::Press(control) => self.press(control),
            Command::Remote(action) => match router::control_for(action, &self.panel) {
                Some(control) => self.press(control),
                None => {
                    debug!("Ignoring remote action {} in current state", action);
                    Ok(ControlOutcome::Ignored)
                }
            },
            Command::SetInputs(duration) => Ok(self.set_inputs(duration)),
            Command::RunFinished {
                run_id,
                finished_naturally,
            } => Ok(self.run_finished(run_id, finished_naturally)),
            Command::Shutdown => {
                self.shutdown();
                Ok(ControlOutcome::Stopped)
            }
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                if e.is_user_visible() {
                    self.surface.show_message(&e.to_string());
                } else {
                    warn!("Command {:?} failed: {}", command, e);
                }
                ControlOutcome::Rejected(e)
            }
        };

        let snapshot = self.state.current_snapshot();
        self.surface.render(&self.panel, &snapshot);
        outcome
    }

    fn press(&mut self, control: Control) -> Result<ControlOutcome> {
        match control {
            Control::StartStop => self.start_stop(),
            Control::PauseResume => self.pause_resume(),
            Control::StopAlert => Ok(self.stop_alert()),
        }
    }

    fn set_inputs(&mut self, duration: TimerDuration) -> ControlOutcome {
        if !self.panel.inputs_enabled {
            debug!("Pickers are disabled while a run is active");
            return ControlOutcome::Ignored;
        }
        self.panel.inputs = duration;
        ControlOutcome::InputsChanged
    }

    fn start_stop(&mut self) -> Result<ControlOutcome> {
        if self.panel.primary == PrimaryControl::Stop {
            self.state.stop_run();
            self.state.alerts.stop_all();
            self.panel.leave_run();
            return Ok(ControlOutcome::Stopped);
        }

        let duration = self.panel.inputs;
        if duration.is_zero() {
            return Err(TimerError::InvalidDuration);
        }

        let ends_at = ends_at_text(duration);
        self.state.start_run(duration, ends_at.clone())?;
        self.panel
            .enter_run(Some(format!("Running for {}", duration.describe())), ends_at);
        Ok(ControlOutcome::Started)
    }

    fn pause_resume(&mut self) -> Result<ControlOutcome> {
        let remaining = if self.panel.run_active() {
            self.state.current_snapshot().remaining
        } else {
            self.panel.inputs
        };
        if remaining.is_zero() {
            return Err(TimerError::RedundantPause);
        }
        if !self.panel.run_active() {
            debug!("Nothing to pause, no run is active");
            return Ok(ControlOutcome::Ignored);
        }

        match self.panel.secondary {
            SecondaryControl::Pause => {
                if !self.state.pause_run()? {
                    return Ok(ControlOutcome::Ignored);
                }
                self.panel.secondary = SecondaryControl::Resume;
                self.surface.show_message("Timer paused");
                Ok(ControlOutcome::Paused)
            }
            SecondaryControl::Resume => {
                let ends_at = ends_at_text(remaining);
                self.state.resume_run(ends_at.clone())?;
                self.panel.enter_run(None, ends_at);
                self.surface.show_message("Timer resumed");
                Ok(ControlOutcome::Resumed)
            }
        }
    }

    fn stop_alert(&mut self) -> ControlOutcome {
        let was_alerting = self.panel.stop_alert.is_some() || self.state.alerts.active_alert().is_some();
        self.state.alerts.stop_all();
        self.panel.stop_alert = None;

        // The terminal notification is up as soon as the engine reaches zero,
        // before the panel has seen RunFinished
        if !self.panel.run_active() || self.state.current_snapshot().at_end() {
            self.state.presenter.clear();
        }

        if was_alerting {
            info!("Alert stopped");
            ControlOutcome::AlertStopped
        } else {
            ControlOutcome::Ignored
        }
    }

    fn run_finished(&mut self, run_id: u64, finished_naturally: bool) -> ControlOutcome {
        if run_id != self.state.current_run_id() {
            debug!("Ignoring end of superseded run {}", run_id);
            return ControlOutcome::Ignored;
        }

        self.panel.leave_run();
        if finished_naturally {
            self.panel.stop_alert = self.state.alerts.active_alert();
        }
        self.surface.show_message("Timer finished");
        ControlOutcome::RunFinished
    }

    fn shutdown(&mut self) {
        info!("Control loop shutting down");
        self.state.stop_run();
        self.state.alerts.stop_all();
        self.state.presenter.clear_all();
    }
}
