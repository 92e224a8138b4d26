//! Recording fakes for every platform collaborator

#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use pocket_timer::{
    control::{Command, CommandReceiver, ControlOutcome, ControlPanel, Controller, DisplaySurface},
    services::{
        AlarmSound, Collaborators, Haptics, MemoryPreferenceStore, NotificationContent, NotificationSink,
        PermissionGate, PlaybackHandle,
    },
    state::{AppState, TimerDuration, TimerSnapshot},
    Control, Result, TimerError,
};

#[derive(Default)]
pub struct RecordingSink {
    pub posted: Mutex<Vec<NotificationContent>>,
    pub cancelled: AtomicUsize,
    pub cancelled_all: AtomicUsize,
}

impl RecordingSink {
    pub fn posts(&self) -> Vec<NotificationContent> {
        self.posted.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<NotificationContent> {
        self.posted.lock().unwrap().last().cloned()
    }
}

impl NotificationSink for RecordingSink {
    fn post(&self, _id: u32, content: &NotificationContent) {
        self.posted.lock().unwrap().push(content.clone());
    }

    fn cancel(&self, _id: u32) {
        self.cancelled.fetch_add(1, Ordering::SeqCst);
    }

    fn cancel_all(&self) {
        self.cancelled_all.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Gate {
    pub granted: AtomicBool,
    pub requests: AtomicUsize,
}

impl PermissionGate for Gate {
    fn is_notification_permission_granted(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }

    fn request_notification_permission(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct SoundProbe {
    pub playing: AtomicBool,
    pub released: AtomicBool,
    pub opened: AtomicUsize,
}

pub struct FakeSound(pub Arc<SoundProbe>);

struct FakeHandle(Arc<SoundProbe>);

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
        self.0.playing.store(false, Ordering::SeqCst);
        self.0.released.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct CountingHaptics {
    pub pulses: AtomicUsize,
}

impl Haptics for CountingHaptics {
    fn pulse(&self, _length: Duration) {
        self.pulses.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct RecordingSurface {
    pub messages: Vec<String>,
    pub renders: usize,
}

impl DisplaySurface for RecordingSurface {
    fn show_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn render(&mut self, _panel: &ControlPanel, _snapshot: &TimerSnapshot) {
        self.renders += 1;
    }
}

pub struct Harness {
    pub state: Arc<AppState>,
    pub commands: CommandReceiver,
    pub controller: Controller<RecordingSurface>,
    pub sink: Arc<RecordingSink>,
    pub gate: Arc<Gate>,
    pub sound: Arc<SoundProbe>,
    pub haptics: Arc<CountingHaptics>,
    pub prefs: Arc<MemoryPreferenceStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_preferences(MemoryPreferenceStore::new())
    }

    pub fn with_preferences(prefs: MemoryPreferenceStore) -> Self {
        let prefs = Arc::new(prefs);
        let sink = Arc::new(RecordingSink::default());
        let gate = Arc::new(Gate {
            granted: AtomicBool::new(true),
            requests: AtomicUsize::new(0),
        });
        let sound = Arc::new(SoundProbe::default());
        let haptics = Arc::new(CountingHaptics::default());

        let (state, commands) = AppState::new(Collaborators {
            app_name: "Timer".to_string(),
            preferences: prefs.clone(),
            notifications: sink.clone(),
            permissions: gate.clone(),
            sound: Arc::new(FakeSound(Arc::clone(&sound))),
            haptics: haptics.clone(),
        });
        let controller = Controller::new(Arc::clone(&state), RecordingSurface::default());

        Self {
            state,
            commands,
            controller,
            sink,
            gate,
            sound,
            haptics,
            prefs,
        }
    }

    pub fn start(&mut self, h: u32, m: u32, s: u32) -> ControlOutcome {
        let duration = TimerDuration::new(h, m, s).unwrap();
        self.controller.handle(Command::SetInputs(duration));
        self.press(Control::StartStop)
    }

    pub fn press(&mut self, control: Control) -> ControlOutcome {
        self.controller.handle(Command::Press(control))
    }

    /// Wait (on virtual time) for the next command a background task posts
    pub async fn next_command(&mut self) -> Command {
        tokio::time::timeout(Duration::from_secs(600), self.commands.recv())
            .await
            .expect("no command within the timeout")
            .expect("command channel closed")
    }

    /// Wait for the next command and apply it
    pub async fn apply_next(&mut self) -> (Command, ControlOutcome) {
        let command = self.next_command().await;
        let outcome = self.controller.handle(command);
        (command, outcome)
    }

    pub fn remaining(&self) -> TimerDuration {
        self.state.current_snapshot().remaining
    }
}
