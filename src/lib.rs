//! Pocket Timer - a countdown timer engine with alarm controls
//!
//! This library provides the countdown state machine, the end-of-run alerts
//! (ringtone, vibration, terminal notification) and the control intake that
//! applies local and remote actions to the running timer.

pub mod config;
pub mod control;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use control::{Command, Control, Controller, RemoteAction, RemoteControlRouter};
pub use error::{Result, TimerError};
pub use state::{AppState, CountdownEngine, TimerDuration};
pub use utils::signals::shutdown_signal;
