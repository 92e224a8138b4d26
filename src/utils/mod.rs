//! Utility functions module
//!
//! This module contains clock arithmetic and signal handling helpers.

pub mod clock;
pub mod signals;

// Re-export main functions
pub use clock::{ends_at, ends_at_text, EndsAt, Meridiem};
pub use signals::shutdown_signal;
