//! Foreground notification rendering for the active run

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{debug, info};

use super::{
    alerts::AlertKind,
    preferences::{PreferenceStore, PERMISSION_ALREADY_ASKED},
};
use crate::{
    control::RemoteAction,
    error::{Result, TimerError},
    state::TimerSnapshot,
};

/// The single notification slot used for both progress and terminal content
pub const TIMER_NOTIFICATION_ID: u32 = 0;

/// Button shown on the notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationAction {
    Stop,
    Pause,
    Resume,
    StopRingtone,
    StopVibration,
}

impl NotificationAction {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationAction::Stop => "Stop",
            NotificationAction::Pause => "Pause",
            NotificationAction::Resume => "Resume",
            NotificationAction::StopRingtone => "Stop ringtone",
            NotificationAction::StopVibration => "Stop vibration",
        }
    }

    /// Action delivered back through the remote channel when pressed
    pub fn remote_action(&self) -> RemoteAction {
        match self {
            NotificationAction::Stop => RemoteAction::StopTimer,
            NotificationAction::Pause => RemoteAction::PauseTimer,
            NotificationAction::Resume => RemoteAction::ResumeTimer,
            NotificationAction::StopRingtone => RemoteAction::StopSound,
            NotificationAction::StopVibration => RemoteAction::StopVibration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub expanded_body: String,
    /// Percentage shown in the progress bar, `None` for no bar
    pub progress: Option<u8>,
    pub actions: Vec<NotificationAction>,
    pub ongoing: bool,
    pub auto_cancel: bool,
}

/// System notification manager
pub trait NotificationSink: Send + Sync {
    fn post(&self, id: u32, content: &NotificationContent);
    fn cancel(&self, id: u32);
    fn cancel_all(&self);
}

/// Runtime permission for posting notifications
pub trait PermissionGate: Send + Sync {
    fn is_notification_permission_granted(&self) -> bool;
    /// Fire-and-forget; the answer is recorded by the settings surface
    fn request_notification_permission(&self);
}

#[derive(Debug, Default)]
struct PresenterInner {
    ends_at: String,
    terminal_shown: bool,
    permission_requested: bool,
    last: Option<NotificationContent>,
}

pub struct NotificationPresenter {
    app_name: String,
    sink: Arc<dyn NotificationSink>,
    gate: Arc<dyn PermissionGate>,
    preferences: Arc<dyn PreferenceStore>,
    inner: Mutex<PresenterInner>,
}

impl NotificationPresenter {
    pub fn new(
        app_name: String,
        sink: Arc<dyn NotificationSink>,
        gate: Arc<dyn PermissionGate>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self {
            app_name,
            sink,
            gate,
            preferences,
            inner: Mutex::new(PresenterInner::default()),
        }
    }

    fn inner(&self) -> MutexGuard<'_, PresenterInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reset per-run state when a new run starts
    pub fn begin_run(&self, ends_at: String) {
        let mut inner = self.inner();
        inner.ends_at = ends_at;
        inner.terminal_shown = false;
        inner.last = None;
    }

    pub fn set_ends_at(&self, ends_at: String) {
        self.inner().ends_at = ends_at;
    }

    /// Post the in-progress notification for `snapshot`.
    ///
    /// `is_last_tick` marks the single notification posted when the run
    /// pauses; it carries Resume instead of Pause.
    pub fn render(&self, snapshot: &TimerSnapshot, first_render: bool, is_last_tick: bool) -> Result<()> {
        let mut inner = self.inner();
        if inner.terminal_shown || snapshot.at_end() {
            debug!("Run {} is over, skipping progress notification", snapshot.run_id);
            return Ok(());
        }

        let body = snapshot.remaining.to_string();
        let content = NotificationContent {
            title: self.app_name.clone(),
            expanded_body: format!("{}\n{}", body, inner.ends_at),
            body,
            progress: Some(snapshot.progress),
            actions: vec![
                NotificationAction::Stop,
                if is_last_tick {
                    NotificationAction::Resume
                } else {
                    NotificationAction::Pause
                },
            ],
            ongoing: true,
            auto_cancel: false,
        };
        self.post(&mut inner, content, first_render)
    }

    /// Replace the progress notification with the one shown after the
    /// countdown reached zero
    pub fn render_terminal(&self, alert: Option<AlertKind>) -> Result<()> {
        let mut inner = self.inner();
        inner.terminal_shown = true;

        let actions = match alert {
            Some(AlertKind::Ringtone) => vec![NotificationAction::StopRingtone],
            Some(AlertKind::Vibration) => vec![NotificationAction::StopVibration],
            None => Vec::new(),
        };
        let content = NotificationContent {
            title: self.app_name.clone(),
            body: "Timer finished".to_string(),
            expanded_body: "Timer finished".to_string(),
            progress: None,
            actions,
            ongoing: true,
            auto_cancel: true,
        };
        self.post(&mut inner, content, false)
    }

    /// Remove the timer notification
    pub fn clear(&self) {
        let mut inner = self.inner();
        inner.last = None;
        self.sink.cancel(TIMER_NOTIFICATION_ID);
        debug!("Timer notification cleared");
    }

    pub fn clear_all(&self) {
        let mut inner = self.inner();
        inner.last = None;
        self.sink.cancel_all();
    }

    /// Whether the current run's terminal notification has been posted
    pub fn terminal_shown(&self) -> bool {
        self.inner().terminal_shown
    }

    pub fn last_content(&self) -> Option<NotificationContent> {
        self.inner().last.clone()
    }

    fn post(&self, inner: &mut PresenterInner, content: NotificationContent, first_render: bool) -> Result<()> {
        if !self.gate.is_notification_permission_granted() {
            let already_asked = inner.permission_requested
                || self.preferences.get_bool(PERMISSION_ALREADY_ASKED).unwrap_or(false);
            if first_render && !already_asked {
                info!("Requesting notification permission");
                inner.permission_requested = true;
                self.gate.request_notification_permission();
            }
            return Err(TimerError::PermissionDenied);
        }

        if inner.last.as_ref() == Some(&content) {
            return Ok(());
        }
        self.sink.post(TIMER_NOTIFICATION_ID, &content);
        inner.last = Some(content);
        Ok(())
    }
}
