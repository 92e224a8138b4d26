//! End-of-run side effects: ringtone, vibration and the terminal notification

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::{
    notification::NotificationPresenter,
    preferences::{PreferenceStore, Preferences},
    ringtone::RingtonePlayer,
    vibration::{Haptics, VibrationScheduler},
};
use crate::{
    control::CommandSender,
    error::TimerError,
    state::{EndOfRunHook, TimerSnapshot},
    tasks::{ringtone_watchdog, vibration_watchdog},
};

/// Which side effect is currently alerting the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertKind {
    Ringtone,
    Vibration,
}

/// Owns the ringtone and vibration resources across runs. At most one
/// vibration scheduler is held at a time.
pub struct AlertDispatcher {
    /// Run whose end may still raise alerts; held for the whole dispatch
    current_run: Mutex<u64>,
    ringtone: Arc<RingtonePlayer>,
    haptics: Arc<dyn Haptics>,
    vibration: Mutex<Option<Arc<VibrationScheduler>>>,
    presenter: Arc<NotificationPresenter>,
    preferences: Arc<dyn PreferenceStore>,
    commands: CommandSender,
}

impl AlertDispatcher {
    pub fn new(
        ringtone: Arc<RingtonePlayer>,
        haptics: Arc<dyn Haptics>,
        presenter: Arc<NotificationPresenter>,
        preferences: Arc<dyn PreferenceStore>,
        commands: CommandSender,
    ) -> Self {
        Self {
            current_run: Mutex::new(0),
            ringtone,
            haptics,
            vibration: Mutex::new(None),
            presenter,
            preferences,
            commands,
        }
    }

    fn vibration(&self) -> MutexGuard<'_, Option<Arc<VibrationScheduler>>> {
        self.vibration.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn ringtone(&self) -> &RingtonePlayer {
        &self.ringtone
    }

    pub fn vibration_scheduler(&self) -> Option<Arc<VibrationScheduler>> {
        self.vibration().clone()
    }

    pub fn active_alert(&self) -> Option<AlertKind> {
        if self.ringtone.is_playing() {
            return Some(AlertKind::Ringtone);
        }
        match self.vibration().as_ref() {
            Some(scheduler) if !scheduler.is_finished() && !scheduler.is_cancelled() => {
                Some(AlertKind::Vibration)
            }
            _ => None,
        }
    }

    /// Hand alerting over to `run_id`, silencing whatever an earlier run
    /// started. A dispatch of an earlier run that has not begun yet does
    /// nothing once this returns.
    pub fn begin_run(&self, run_id: u64) {
        let mut current = self.current_run.lock().unwrap_or_else(PoisonError::into_inner);
        *current = run_id;
        self.stop_all();
    }

    /// Stop and release every alert resource. Safe to call at any time.
    pub fn stop_all(&self) {
        self.ringtone.stop();
        if let Some(scheduler) = self.vibration().take() {
            scheduler.cancel();
            debug!("Vibration scheduler cancelled");
        }
    }

    /// Run the one-shot side effect sequence for a naturally finished run
    pub fn dispatch(&self, snapshot: &TimerSnapshot) {
        let current = self.current_run.lock().unwrap_or_else(PoisonError::into_inner);
        if *current != snapshot.run_id {
            debug!("Run {} was superseded by run {}, skipping alerts", snapshot.run_id, *current);
            return;
        }

        let preferences = Preferences::load(&*self.preferences);
        info!("Dispatching end-of-run alerts for run {}", snapshot.run_id);

        let alert = if preferences.play_sound {
            self.start_ringtone(&preferences)
        } else if preferences.vibrate && preferences.vibrate_for_seconds != 0 {
            self.start_vibration(&preferences)
        } else {
            None
        };

        match self.presenter.render_terminal(alert) {
            Ok(()) => {}
            Err(TimerError::PermissionDenied) => debug!("Terminal notification suppressed, permission denied"),
            Err(e) => warn!("Failed to post terminal notification: {}", e),
        }
    }

    fn start_ringtone(&self, preferences: &Preferences) -> Option<AlertKind> {
        if let Err(e) = self.ringtone.play() {
            error!("Failed to start ringtone: {}", e);
            return None;
        }

        tokio::spawn(ringtone_watchdog(
            Arc::clone(&self.ringtone),
            preferences.play_sound_for_seconds(),
            self.commands.clone(),
        ));
        Some(AlertKind::Ringtone)
    }

    fn start_vibration(&self, preferences: &Preferences) -> Option<AlertKind> {
        let scheduler = VibrationScheduler::spawn(Arc::clone(&self.haptics), preferences.vibrate_for_seconds);
        if let Some(previous) = self.vibration().replace(Arc::clone(&scheduler)) {
            previous.cancel();
        }

        tokio::spawn(vibration_watchdog(scheduler, self.commands.clone()));
        Some(AlertKind::Vibration)
    }
}

impl EndOfRunHook for AlertDispatcher {
    fn on_finished(&self, snapshot: &TimerSnapshot) {
        self.dispatch(snapshot);
    }
}
