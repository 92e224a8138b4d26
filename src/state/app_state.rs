//! Main application state shared by the control loop and background tasks

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard, PoisonError,
};

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::{CountdownEngine, EndOfRunHook, EngineState, TimerDuration, TimerSnapshot};
use crate::{
    control::{CommandReceiver, CommandSender},
    error::{Result, TimerError},
    services::{AlertDispatcher, Collaborators, NotificationPresenter, PreferenceStore, RingtonePlayer},
    tasks::{finish_watcher_task, ticking_task},
};

/// Registry of the active run and the collaborators every task needs
pub struct AppState {
    /// Engine of the current run; replaced on start and on resume
    active_engine: Mutex<Option<Arc<CountdownEngine>>>,
    last_run_id: AtomicU64,
    pub alerts: Arc<AlertDispatcher>,
    pub presenter: Arc<NotificationPresenter>,
    pub preferences: Arc<dyn PreferenceStore>,
    /// Intake of the control loop
    pub commands: CommandSender,
    /// Channel for per-tick timer updates
    pub timer_update_tx: watch::Sender<TimerSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    pub _timer_update_rx: watch::Receiver<TimerSnapshot>,
}

impl AppState {
    /// Build the state and the receiving end of its command channel
    pub fn new(collaborators: Collaborators) -> (Arc<Self>, CommandReceiver) {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (timer_update_tx, timer_update_rx) = watch::channel(TimerSnapshot::idle());

        let presenter = Arc::new(NotificationPresenter::new(
            collaborators.app_name,
            collaborators.notifications,
            collaborators.permissions,
            Arc::clone(&collaborators.preferences),
        ));
        let alerts = Arc::new(AlertDispatcher::new(
            Arc::new(RingtonePlayer::new(collaborators.sound)),
            collaborators.haptics,
            Arc::clone(&presenter),
            Arc::clone(&collaborators.preferences),
            commands.clone(),
        ));

        let state = Arc::new(Self {
            active_engine: Mutex::new(None),
            last_run_id: AtomicU64::new(0),
            alerts,
            presenter,
            preferences: collaborators.preferences,
            commands,
            timer_update_tx,
            _timer_update_rx: timer_update_rx,
        });
        (state, command_rx)
    }

    fn engine_slot(&self) -> MutexGuard<'_, Option<Arc<CountdownEngine>>> {
        self.active_engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn active_engine(&self) -> Option<Arc<CountdownEngine>> {
        self.engine_slot().clone()
    }

    /// Id of the most recently started run, 0 before the first run
    pub fn current_run_id(&self) -> u64 {
        self.last_run_id.load(Ordering::SeqCst)
    }

    /// Snapshot of the active engine, or the idle snapshot
    pub fn current_snapshot(&self) -> TimerSnapshot {
        self.active_engine()
            .map(|engine| engine.snapshot())
            .unwrap_or_else(TimerSnapshot::idle)
    }

    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.timer_update_tx.subscribe()
    }

    /// Hand a snapshot to the display; snapshots of superseded runs are dropped
    pub fn publish(&self, snapshot: TimerSnapshot) {
        if snapshot.run_id != self.current_run_id() {
            debug!("Dropping snapshot of superseded run {}", snapshot.run_id);
            return;
        }
        if let Err(e) = self.timer_update_tx.send(snapshot) {
            warn!("Failed to send timer update: {}", e);
        }
    }

    /// Open a new run for `duration`, discarding the previous engine and any
    /// alert still sounding from it
    pub fn start_run(self: &Arc<Self>, duration: TimerDuration, ends_at: String) -> Result<Arc<CountdownEngine>> {
        if duration.is_zero() {
            return Err(TimerError::InvalidDuration);
        }

        if let Some(previous) = self.active_engine() {
            previous.stop();
        }

        let run_id = self.last_run_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.alerts.begin_run(run_id);
        let hook: Arc<dyn EndOfRunHook> = self.alerts.clone();
        let engine = Arc::new(CountdownEngine::seeded(run_id, duration, hook));
        engine.start()?;

        self.presenter.begin_run(ends_at);
        *self.engine_slot() = Some(Arc::clone(&engine));
        self.publish(engine.snapshot());

        tokio::spawn(ticking_task(Arc::clone(self), Arc::clone(&engine)));
        tokio::spawn(finish_watcher_task(Arc::clone(self), run_id));

        info!("Run {} started for {}", run_id, duration);
        Ok(engine)
    }

    /// Pause the active run. Returns whether it was running.
    pub fn pause_run(&self) -> Result<bool> {
        let Some(engine) = self.active_engine() else {
            return Ok(false);
        };
        let paused = engine.pause()?;
        if paused {
            self.publish(engine.snapshot());
        }
        Ok(paused)
    }

    /// Continue the paused run on a fresh engine and ticking task
    pub fn resume_run(self: &Arc<Self>, ends_at: String) -> Result<Arc<CountdownEngine>> {
        let Some(paused) = self.active_engine() else {
            return Err(TimerError::InvalidTransition {
                from: EngineState::Idle,
                action: "resume",
            });
        };

        let engine = Arc::new(paused.resumed()?);
        self.presenter.set_ends_at(ends_at);
        *self.engine_slot() = Some(Arc::clone(&engine));
        self.publish(engine.snapshot());

        tokio::spawn(ticking_task(Arc::clone(self), Arc::clone(&engine)));

        info!("Run {} resumed with {} left", engine.run_id(), engine.remaining());
        Ok(engine)
    }

    /// Stop the active run. Returns `false` if there was nothing to stop.
    pub fn stop_run(&self) -> bool {
        let Some(engine) = self.active_engine() else {
            return false;
        };
        let stopped = engine.stop();
        if stopped {
            self.publish(engine.snapshot());
        }
        stopped
    }
}
