//! Background tasks module
//!
//! This module contains the background loops that run alongside the control
//! loop: the per-run ticking task, the finish watcher and the alert watchdogs.

pub mod alert_watchdog;
pub mod finish_watcher;
pub mod ticker;

use std::time::Duration;

// Re-export main functions
pub use alert_watchdog::{ringtone_watchdog, vibration_watchdog};
pub use finish_watcher::finish_watcher_task;
pub use ticker::ticking_task;

/// Granularity of every background loop
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);
