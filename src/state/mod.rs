//! State management module
//!
//! This module contains the countdown value, the engine state machine and the
//! shared application state.

pub mod app_state;
pub mod duration;
pub mod engine;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use duration::TimerDuration;
pub use engine::{CountdownEngine, EndOfRunHook, TickOutcome};
pub use timer_state::{EngineState, TimerSnapshot};
