//! Preference store access and the immutable snapshot read at finish time

use std::{
    collections::HashMap,
    path::Path,
    sync::RwLock,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;

pub const PLAY_SOUND: &str = "playSound";
pub const PLAY_SOUND_FOR_MINUTES: &str = "playSoundForMinutes";
pub const VIBRATE: &str = "vibrate";
pub const VIBRATE_FOR_SECONDS: &str = "vibrateForSeconds";
pub const PERMISSION_ALREADY_ASKED: &str = "permissionAlreadyAsked";

pub const DEFAULT_PLAY_SOUND_FOR_MINUTES: u32 = 5;

/// Key/value store owned by the settings surface. The timer only reads it.
pub trait PreferenceStore: Send + Sync {
    fn get_bool(&self, key: &str) -> Option<bool>;
    fn get_int(&self, key: &str) -> Option<i64>;
}

/// Preference values injected into the end-of-run components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub play_sound: bool,
    pub play_sound_for_minutes: u32,
    pub vibrate: bool,
    pub vibrate_for_seconds: u32,
    pub permission_already_asked: bool,
}

impl Preferences {
    /// Read every key once, falling back to defaults for missing keys
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let play_sound_for_minutes = store
            .get_int(PLAY_SOUND_FOR_MINUTES)
            .map(clamp_non_negative)
            .unwrap_or(DEFAULT_PLAY_SOUND_FOR_MINUTES);

        let vibrate_for_seconds = store
            .get_int(VIBRATE_FOR_SECONDS)
            .map(clamp_non_negative)
            .unwrap_or(play_sound_for_minutes.saturating_mul(60));

        let preferences = Self {
            play_sound: store.get_bool(PLAY_SOUND).unwrap_or(false),
            play_sound_for_minutes,
            vibrate: store.get_bool(VIBRATE).unwrap_or(false),
            vibrate_for_seconds,
            permission_already_asked: store.get_bool(PERMISSION_ALREADY_ASKED).unwrap_or(false),
        };
        debug!("Loaded preferences: {:?}", preferences);
        preferences
    }

    /// Seconds of ringtone playback before it is stopped automatically
    pub fn play_sound_for_seconds(&self) -> u64 {
        u64::from(self.play_sound_for_minutes) * 60
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            play_sound: false,
            play_sound_for_minutes: DEFAULT_PLAY_SOUND_FOR_MINUTES,
            vibrate: false,
            vibrate_for_seconds: DEFAULT_PLAY_SOUND_FOR_MINUTES * 60,
            permission_already_asked: false,
        }
    }
}

fn clamp_non_negative(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// In-process preference store backed by JSON values
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a flat JSON object such as `{"playSound": true, "playSoundForMinutes": 2}`
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let values: HashMap<String, Value> = serde_json::from_str(text)?;
        debug!("Loaded {} preference keys", values.len());
        Ok(Self {
            values: RwLock::new(values),
        })
    }

    pub fn set(&self, key: &str, value: impl Into<Value>) {
        match self.values.write() {
            Ok(mut values) => {
                values.insert(key.to_string(), value.into());
            }
            Err(e) => warn!("Failed to lock preference store: {}", e),
        }
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.values.read().ok().and_then(|values| values.get(key).cloned())
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|value| value.as_bool())
    }

    fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|value| value.as_i64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_empty_store() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(Preferences::load(&store), Preferences::default());
        assert_eq!(Preferences::default().play_sound_for_seconds(), 300);
    }

    #[test]
    fn test_vibrate_duration_follows_sound_duration() {
        let store = MemoryPreferenceStore::from_json_str(
            r#"{"playSound": true, "playSoundForMinutes": 2, "vibrate": true}"#,
        )
        .unwrap();
        let prefs = Preferences::load(&store);
        assert!(prefs.play_sound);
        assert!(prefs.vibrate);
        assert_eq!(prefs.play_sound_for_minutes, 2);
        assert_eq!(prefs.vibrate_for_seconds, 120);
    }

    #[test]
    fn test_negative_and_mistyped_values() {
        let store = MemoryPreferenceStore::new();
        store.set(PLAY_SOUND_FOR_MINUTES, -3);
        store.set(VIBRATE_FOR_SECONDS, 0);
        store.set(PLAY_SOUND, "yes");
        let prefs = Preferences::load(&store);
        assert_eq!(prefs.play_sound_for_minutes, 0);
        assert_eq!(prefs.vibrate_for_seconds, 0);
        assert!(!prefs.play_sound);
    }

    #[test]
    fn test_invalid_json_is_reported() {
        assert!(MemoryPreferenceStore::from_json_str("[1, 2").is_err());
    }
}
