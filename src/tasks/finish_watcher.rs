//! Watches the active run for completion and keeps its notification current

use std::sync::Arc;

use tokio::time::interval;
use tracing::{debug, info, warn};

use super::POLL_INTERVAL;
use crate::{
    control::Command,
    error::TimerError,
    state::AppState,
};

/// Poll the active engine of `run_id` once per second.
///
/// While the run is active the progress notification is refreshed every
/// second, and once more when it pauses. When the run ends the controller is
/// told through a [`Command::RunFinished`]. A watcher whose run has been
/// replaced by a newer one exits silently.
pub async fn finish_watcher_task(state: Arc<AppState>, run_id: u64) {
    debug!("Starting finish watcher for run {}", run_id);

    let mut interval = interval(POLL_INTERVAL);
    let mut first_render = true;
    let mut sent_last_notification = false;

    let finished_naturally = loop {
        interval.tick().await;

        let Some(engine) = state.active_engine() else {
            debug!("No active engine, finish watcher for run {} exits", run_id);
            return;
        };
        if engine.run_id() != run_id {
            debug!("Run {} was superseded, finish watcher exits", run_id);
            return;
        }

        let snapshot = engine.snapshot();
        if snapshot.at_end() {
            break snapshot.finished_naturally;
        }

        let running = snapshot.is_running();
        if running || !sent_last_notification {
            sent_last_notification = !running;
            match state.presenter.render(&snapshot, first_render, sent_last_notification) {
                Ok(()) => {}
                Err(TimerError::PermissionDenied) => debug!("Progress notification suppressed"),
                Err(e) => warn!("Failed to post progress notification: {}", e),
            }
        }
        first_render = false;
    };

    info!("Run {} ended (finished naturally: {})", run_id, finished_naturally);
    if !finished_naturally {
        state.presenter.clear();
    }

    if state
        .commands
        .send(Command::RunFinished {
            run_id,
            finished_naturally,
        })
        .is_err()
    {
        warn!("Control loop closed before run {} finished", run_id);
    }
}
