//! Wall-clock arithmetic for the "ends at" status text

use std::fmt;

use chrono::{Local, NaiveTime, Timelike};

use crate::state::TimerDuration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    fn flipped(self) -> Self {
        match self {
            Meridiem::Am => Meridiem::Pm,
            Meridiem::Pm => Meridiem::Am,
        }
    }
}

/// 12-hour wall-clock time at which a countdown will end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndsAt {
    /// 0..=11, displayed as 12 when zero
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub meridiem: Meridiem,
}

impl fmt::Display for EndsAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hour = if self.hour == 0 { 12 } else { self.hour };
        let meridiem = match self.meridiem {
            Meridiem::Am => "AM",
            Meridiem::Pm => "PM",
        };
        write!(f, "{}:{:02}:{:02} {}", hour, self.minute, self.second, meridiem)
    }
}

/// Add `remaining` to `now` component-wise and fold the result into 12-hour
/// form. Every 12-hour rollover flips AM/PM once.
pub fn ends_at(remaining: TimerDuration, now: NaiveTime) -> EndsAt {
    let mut meridiem = if now.hour() >= 12 { Meridiem::Pm } else { Meridiem::Am };
    let mut hour = u32::from(remaining.hours) + now.hour() % 12;
    let mut minute = u32::from(remaining.minutes) + now.minute();
    let mut second = u32::from(remaining.seconds) + now.second();

    while second >= 60 {
        second -= 60;
        minute += 1;
    }
    while minute >= 60 {
        minute -= 60;
        hour += 1;
    }
    while hour >= 12 {
        hour -= 12;
        meridiem = meridiem.flipped();
    }

    EndsAt {
        hour,
        minute,
        second,
        meridiem,
    }
}

/// Status line shown while a run is active
pub fn ends_at_text(remaining: TimerDuration) -> String {
    format!("Ends at {}", ends_at(remaining, Local::now().time()))
}
