//! Hours/minutes/seconds countdown value

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TimerError};

pub const MAX_HOURS: u8 = 23;
pub const MAX_MINUTES: u8 = 59;
pub const MAX_SECONDS: u8 = 59;

/// Normalized countdown value as shown on the pickers.
///
/// Components always stay within `0..=23`, `0..=59`, `0..=59`. The all-zero
/// value means both "nothing configured" and "expired".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimerDuration {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl TimerDuration {
    pub const ZERO: TimerDuration = TimerDuration {
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Build a duration from picker values, rejecting out-of-range components
    pub fn new(hours: u32, minutes: u32, seconds: u32) -> Result<Self> {
        Ok(Self {
            hours: check("hours", hours, MAX_HOURS)?,
            minutes: check("minutes", minutes, MAX_MINUTES)?,
            seconds: check("seconds", seconds, MAX_SECONDS)?,
        })
    }

    pub fn is_zero(&self) -> bool {
        self.hours == 0 && self.minutes == 0 && self.seconds == 0
    }

    pub fn total_seconds(&self) -> u64 {
        u64::from(self.hours) * 3600 + u64::from(self.minutes) * 60 + u64::from(self.seconds)
    }

    pub fn total_millis(&self) -> u64 {
        self.total_seconds() * 1000
    }

    /// One second less, borrowing seconds from minutes and minutes from hours.
    ///
    /// Returns `None` for the all-zero value, which must never be decremented.
    pub fn decremented(self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }

        let mut next = self;
        if next.seconds == 0 {
            if next.minutes == 0 {
                next.hours -= 1;
                next.minutes = MAX_MINUTES;
            } else {
                next.minutes -= 1;
            }
            next.seconds = MAX_SECONDS;
        } else {
            next.seconds -= 1;
        }
        Some(next)
    }

    /// Human-readable form used by the "running for" label
    pub fn describe(&self) -> String {
        format!(
            "{} {}, {} {}, {} {}",
            self.hours,
            plural(self.hours, "hour", "hours"),
            self.minutes,
            plural(self.minutes, "minute", "minutes"),
            self.seconds,
            plural(self.seconds, "second", "seconds"),
        )
    }
}

fn check(field: &'static str, value: u32, max: u8) -> Result<u8> {
    if value > u32::from(max) {
        return Err(TimerError::OutOfRange { field, value, max });
    }
    Ok(value as u8)
}

fn plural(count: u8, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 { one } else { many }
}

impl fmt::Display for TimerDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}
