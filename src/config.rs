//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

use crate::{error::Result, state::TimerDuration};

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "pocket-timer")]
#[command(about = "A countdown timer with alarm, vibration and notification controls")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Initial hours on the picker
    #[arg(long, default_value = "0", value_parser = clap::value_parser!(u32).range(0..=23))]
    pub hours: u32,

    /// Initial minutes on the picker
    #[arg(short, long, default_value = "0", value_parser = clap::value_parser!(u32).range(0..=59))]
    pub minutes: u32,

    /// Initial seconds on the picker
    #[arg(short, long, default_value = "0", value_parser = clap::value_parser!(u32).range(0..=59))]
    pub seconds: u32,

    /// JSON file holding the preference keys (playSound, vibrate, ...)
    #[arg(short, long)]
    pub preferences: Option<PathBuf>,

    /// Title used for notifications
    #[arg(long, default_value = "Timer")]
    pub app_name: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Picker values given on the command line
    pub fn duration(&self) -> Result<TimerDuration> {
        TimerDuration::new(self.hours, self.minutes, self.seconds)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments() {
        let config = Config::try_parse_from(["pocket-timer", "--hours", "1", "-m", "30", "-v"]).unwrap();
        assert_eq!(config.duration().unwrap(), TimerDuration::new(1, 30, 0).unwrap());
        assert_eq!(config.log_level(), "debug");
        assert_eq!(config.app_name, "Timer");
        assert!(config.preferences.is_none());
    }

    #[test]
    fn test_rejects_out_of_range_minutes() {
        assert!(Config::try_parse_from(["pocket-timer", "-m", "60"]).is_err());
    }
}
