//! Bounded watchdogs for the end-of-run alerts

use std::sync::Arc;

use tokio::time::interval_at;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::POLL_INTERVAL;
use crate::{
    control::{Command, CommandSender, Control},
    services::{RingtonePlayer, VibrationScheduler},
};

/// Stop the ringtone once it has played for `stop_after_secs` seconds.
///
/// The stop goes through the stop-alert control so the panel and the
/// notification are cleaned up too. Exits quietly if playback stops first.
pub async fn ringtone_watchdog(ringtone: Arc<RingtonePlayer>, stop_after_secs: u64, commands: CommandSender) {
    info!("Ringtone will stop after {} seconds", stop_after_secs);

    let mut interval = interval_at(Instant::now() + POLL_INTERVAL, POLL_INTERVAL);
    let mut elapsed = 0;

    while ringtone.is_playing() {
        if elapsed >= stop_after_secs {
            info!("Ringtone played for {} seconds, stopping", elapsed);
            if commands.send(Command::Press(Control::StopAlert)).is_err() {
                warn!("Control loop closed, stopping ringtone directly");
                ringtone.stop();
            }
            return;
        }
        interval.tick().await;
        elapsed += 1;
    }

    debug!("Ringtone stopped before the watchdog bound");
}

/// Wait for the vibration scheduler to reach its ceiling and then clear the
/// stop-alert control. A cancelled scheduler needs no cleanup.
pub async fn vibration_watchdog(scheduler: Arc<VibrationScheduler>, commands: CommandSender) {
    let mut interval = interval_at(Instant::now() + POLL_INTERVAL, POLL_INTERVAL);

    while !scheduler.is_finished() {
        interval.tick().await;
    }

    if scheduler.is_cancelled() {
        debug!("Vibration was cancelled, watchdog exits");
        return;
    }

    info!("Vibration reached its ceiling of {} seconds", scheduler.ceiling());
    if commands.send(Command::Press(Control::StopAlert)).is_err() {
        warn!("Control loop closed before vibration cleanup");
    }
}
