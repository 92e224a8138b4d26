//! Terminal stand-ins for the platform collaborators

use std::{
    io::Write,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::{
    notification::{NotificationContent, NotificationSink, PermissionGate},
    ringtone::{AlarmSound, PlaybackHandle},
    vibration::Haptics,
};
use crate::{
    control::{ControlPanel, DisplaySurface, PrimaryControl, SecondaryControl},
    error::{Result, TimerError},
    state::TimerSnapshot,
};

const BELL_INTERVAL: Duration = Duration::from_secs(2);

/// Logs notifications instead of posting them
pub struct LogNotificationSink;

impl NotificationSink for LogNotificationSink {
    fn post(&self, id: u32, content: &NotificationContent) {
        match serde_json::to_string(content) {
            Ok(json) => info!("Notification {}: {}", id, json),
            Err(e) => warn!("Failed to encode notification {}: {}", id, e),
        }
    }

    fn cancel(&self, id: u32) {
        info!("Notification {} cancelled", id);
    }

    fn cancel_all(&self) {
        info!("All notifications cancelled");
    }
}

/// Terminals need no permission to show notifications
pub struct GrantedPermission;

impl PermissionGate for GrantedPermission {
    fn is_notification_permission_granted(&self) -> bool {
        true
    }

    fn request_notification_permission(&self) {}
}

/// Rings the terminal bell as the alarm sound
pub struct TerminalBell;

impl AlarmSound for TerminalBell {
    fn open(&self) -> Result<Box<dyn PlaybackHandle>> {
        Ok(Box::new(BellHandle {
            playing: Arc::new(AtomicBool::new(false)),
            looping: false,
            released: false,
        }))
    }
}

struct BellHandle {
    playing: Arc<AtomicBool>,
    looping: bool,
    released: bool,
}

impl PlaybackHandle for BellHandle {
    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn start(&mut self) -> Result<()> {
        if self.released {
            return Err(TimerError::StaleHandle);
        }
        if self.playing.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let playing = Arc::clone(&self.playing);
        let looping = self.looping;
        tokio::spawn(async move {
            while playing.load(Ordering::SeqCst) {
                let mut stdout = std::io::stdout();
                if let Err(e) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
                    debug!("Failed to ring terminal bell: {}", e);
                }
                if !looping {
                    playing.store(false, Ordering::SeqCst);
                    break;
                }
                sleep(BELL_INTERVAL).await;
            }
        });
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.released {
            return Err(TimerError::StaleHandle);
        }
        self.playing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_playing(&self) -> Result<bool> {
        if self.released {
            return Err(TimerError::StaleHandle);
        }
        Ok(self.playing.load(Ordering::SeqCst))
    }

    fn release(&mut self) {
        self.playing.store(false, Ordering::SeqCst);
        self.released = true;
    }
}

/// Logs vibration pulses
pub struct LogHaptics;

impl Haptics for LogHaptics {
    fn pulse(&self, length: Duration) {
        debug!("Vibration pulse for {}ms", length.as_millis());
    }
}

/// Prints the remaining time and the control panel to stdout
#[derive(Default)]
pub struct TerminalSurface {
    last_line: String,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplaySurface for TerminalSurface {
    fn show_message(&mut self, message: &str) {
        println!(">> {}", message);
    }

    fn render(&mut self, panel: &ControlPanel, snapshot: &TimerSnapshot) {
        let remaining = if panel.run_active() {
            snapshot.remaining
        } else {
            panel.inputs
        };

        let mut controls = vec![
            match panel.primary {
                PrimaryControl::Start => "[s] Start",
                PrimaryControl::Stop => "[s] Stop",
            },
            match panel.secondary {
                SecondaryControl::Pause => "[p] Pause",
                SecondaryControl::Resume => "[p] Resume",
            },
        ];
        if panel.stop_alert.is_some() {
            controls.push("[x] Stop alert");
        }

        let mut line = format!("{} {:>3}%  {}", remaining, snapshot.progress, controls.join("  "));
        if let Some(running_for) = &panel.running_for {
            line.push_str(&format!("  | {}", running_for));
        }
        if let Some(status) = &panel.status {
            line.push_str(&format!("  | {}", status));
        }

        if line != self.last_line {
            println!("{}", line);
            self.last_line = line;
        }
    }
}
