//! External collaborators of the timer engine
//!
//! This module contains the alert players, the notification presenter, the
//! preference store and terminal implementations of the platform traits.

pub mod alerts;
pub mod notification;
pub mod preferences;
pub mod ringtone;
pub mod terminal;
pub mod vibration;

use std::sync::Arc;

// Re-export main types
pub use alerts::{AlertDispatcher, AlertKind};
pub use notification::{
    NotificationAction, NotificationContent, NotificationPresenter, NotificationSink, PermissionGate,
    TIMER_NOTIFICATION_ID,
};
pub use preferences::{MemoryPreferenceStore, PreferenceStore, Preferences};
pub use ringtone::{AlarmSound, PlaybackHandle, PlayerState, RingtonePlayer};
pub use vibration::{Haptics, VibrationScheduler};

/// Platform implementations handed to [`crate::state::AppState::new`]
pub struct Collaborators {
    pub app_name: String,
    pub preferences: Arc<dyn PreferenceStore>,
    pub notifications: Arc<dyn NotificationSink>,
    pub permissions: Arc<dyn PermissionGate>,
    pub sound: Arc<dyn AlarmSound>,
    pub haptics: Arc<dyn Haptics>,
}
