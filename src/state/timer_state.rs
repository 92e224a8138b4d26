//! Timer state structures shared with the display and notification surfaces

use std::fmt;

use serde::Serialize;

use super::TimerDuration;

/// Lifecycle of one countdown engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    Idle,
    Running,
    Paused,
    Finished,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::Idle => "idle",
            EngineState::Running => "running",
            EngineState::Paused => "paused",
            EngineState::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Point-in-time view of an engine, published once per tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerSnapshot {
    pub run_id: u64,
    pub state: EngineState,
    pub remaining: TimerDuration,
    pub total: TimerDuration,
    /// Elapsed share of `total`, 0..=100
    pub progress: u8,
    pub finished_naturally: bool,
}

impl TimerSnapshot {
    /// Snapshot shown before any run has been started
    pub fn idle() -> Self {
        Self {
            run_id: 0,
            state: EngineState::Idle,
            remaining: TimerDuration::ZERO,
            total: TimerDuration::ZERO,
            progress: 0,
            finished_naturally: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == EngineState::Running
    }

    pub fn at_end(&self) -> bool {
        self.state == EngineState::Finished
    }
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self::idle()
    }
}
