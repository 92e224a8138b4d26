//! Per-run ticking task

use std::sync::Arc;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::POLL_INTERVAL;
use crate::state::{AppState, CountdownEngine, TickOutcome};

/// Advance `engine` once per second until it stops running.
///
/// One task serves exactly one engine; a paused or stopped engine ends the
/// task and a resumed run gets a new engine and a new task.
pub async fn ticking_task(state: Arc<AppState>, engine: Arc<CountdownEngine>) {
    debug!("Starting ticking task for run {}", engine.run_id());

    let mut interval = interval_at(Instant::now() + POLL_INTERVAL, POLL_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        match engine.tick() {
            TickOutcome::Ticked(snapshot) => {
                state.publish(snapshot);
            }
            TickOutcome::Finished(snapshot) => {
                info!("Countdown of run {} finished", snapshot.run_id);
                state.publish(snapshot);
                break;
            }
            TickOutcome::Inactive => {
                debug!("Engine of run {} no longer running, ticking task exits", engine.run_id());
                break;
            }
        }
    }
}
