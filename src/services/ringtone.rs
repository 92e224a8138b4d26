//! Looped alarm ringtone playback

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::error::{Result, TimerError};

/// Source of the default alarm sound
pub trait AlarmSound: Send + Sync {
    fn open(&self) -> Result<Box<dyn PlaybackHandle>>;
}

/// An opened playback resource. Calls after `release` may fail with
/// [`TimerError::StaleHandle`].
pub trait PlaybackHandle: Send {
    fn set_looping(&mut self, looping: bool);
    fn start(&mut self) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
    fn is_playing(&self) -> Result<bool>;
    fn release(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Stopped,
    Playing,
}

pub struct RingtonePlayer {
    sound: Arc<dyn AlarmSound>,
    handle: Mutex<Option<Box<dyn PlaybackHandle>>>,
}

impl RingtonePlayer {
    pub fn new(sound: Arc<dyn AlarmSound>) -> Self {
        Self {
            sound,
            handle: Mutex::new(None),
        }
    }

    fn handle(&self) -> MutexGuard<'_, Option<Box<dyn PlaybackHandle>>> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start the looped ringtone. Playing an already playing ringtone does nothing.
    pub fn play(&self) -> Result<()> {
        let mut slot = self.handle();
        if let Some(handle) = slot.as_ref() {
            if handle.is_playing().unwrap_or(false) {
                debug!("Ringtone already playing");
                return Ok(());
            }
        }

        if slot.is_none() {
            let mut handle = self.sound.open()?;
            handle.set_looping(true);
            *slot = Some(handle);
        }
        if let Some(handle) = slot.as_mut() {
            handle.start()?;
            info!("Ringtone started");
        }
        Ok(())
    }

    /// Stop and release the playback handle. Safe to call repeatedly.
    pub fn stop(&self) {
        let Some(mut handle) = self.handle().take() else {
            debug!("Ringtone stop requested with no handle held");
            return;
        };

        match handle.stop() {
            Ok(()) => info!("Ringtone stopped"),
            Err(TimerError::StaleHandle) => debug!("Ringtone handle was already released"),
            Err(e) => warn!("Failed to stop ringtone: {}", e),
        }
        handle.release();
    }

    /// Never fails: a missing or released handle reports "not playing"
    pub fn is_playing(&self) -> bool {
        let slot = self.handle();
        let Some(handle) = slot.as_ref() else {
            return false;
        };

        match handle.is_playing() {
            Ok(playing) => playing,
            Err(TimerError::StaleHandle) => {
                debug!("Ringtone handle is stale, treating as not playing");
                false
            }
            Err(e) => {
                warn!("Failed to query ringtone state: {}", e);
                false
            }
        }
    }

    pub fn state(&self) -> PlayerState {
        if self.is_playing() {
            PlayerState::Playing
        } else {
            PlayerState::Stopped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct Shared {
        playing: AtomicBool,
        released: AtomicBool,
        opened: AtomicUsize,
        starts: AtomicUsize,
    }

    struct FakeSound(Arc<Shared>);

    struct FakeHandle(Arc<Shared>);

    impl AlarmSound for FakeSound {
        fn open(&self) -> Result<Box<dyn PlaybackHandle>> {
            self.0.opened.fetch_add(1, Ordering::SeqCst);
            self.0.released.store(false, Ordering::SeqCst);
            Ok(Box::new(FakeHandle(Arc::clone(&self.0))))
        }
    }

    impl PlaybackHandle for FakeHandle {
        fn set_looping(&mut self, _looping: bool) {}

        fn start(&mut self) -> Result<()> {
            self.0.starts.fetch_add(1, Ordering::SeqCst);
            self.0.playing.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn stop(&mut self) -> Result<()> {
            if self.0.released.load(Ordering::SeqCst) {
                return Err(TimerError::StaleHandle);
            }
            self.0.playing.store(false, Ordering::SeqCst);
            Ok(())
        }

        fn is_playing(&self) -> Result<bool> {
            if self.0.released.load(Ordering::SeqCst) {
                return Err(TimerError::StaleHandle);
            }
            Ok(self.0.playing.load(Ordering::SeqCst))
        }

        fn release(&mut self) {
            self.0.released.store(true, Ordering::SeqCst);
        }
    }

    fn player() -> (RingtonePlayer, Arc<Shared>) {
        let shared = Arc::new(Shared::default());
        (RingtonePlayer::new(Arc::new(FakeSound(Arc::clone(&shared)))), shared)
    }

    #[test]
    fn test_play_twice_has_no_extra_effect() {
        let (player, shared) = player();
        player.play().unwrap();
        player.play().unwrap();
        assert!(player.is_playing());
        assert_eq!(shared.opened.load(Ordering::SeqCst), 1);
        assert_eq!(shared.starts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (player, _) = player();
        player.stop();
        player.play().unwrap();
        player.stop();
        player.stop();
        assert!(!player.is_playing());
        assert_eq!(player.state(), PlayerState::Stopped);
    }

    #[test]
    fn test_stale_handle_reads_as_not_playing() {
        let (player, shared) = player();
        player.play().unwrap();
        shared.released.store(true, Ordering::SeqCst);
        assert!(!player.is_playing());
        player.stop();
    }

    #[test]
    fn test_never_created_is_not_playing() {
        let (player, shared) = player();
        assert!(!player.is_playing());
        assert_eq!(shared.opened.load(Ordering::SeqCst), 0);
    }
}
