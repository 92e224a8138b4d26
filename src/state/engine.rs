//! Countdown engine state machine
//!
//! ```text
//!   start()          tick() reaches zero
//! Idle ───► Running ─────────────────────► Finished (naturally)
//!             │  ▲                              ▲
//!     pause() │  │ resumed() (new engine)       │ stop() from any state
//!             ▼  │                              │
//!           Paused ─────────────────────────────┘
//! ```
//!
//! An engine is single-use: once started it can never be started again, and
//! resuming a paused run builds a fresh engine seeded with the frozen
//! remaining time. The terminal-state decision (natural finish vs. user stop)
//! is taken under the engine lock, so whichever of `tick()` and `stop()`
//! commits first wins and end-of-run side effects fire at most once.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;
use tracing::{debug, info};

use super::{EngineState, TimerDuration, TimerSnapshot};
use crate::error::{Result, TimerError};

/// Receives the one-shot end-of-run signal of a naturally finished engine
pub trait EndOfRunHook: Send + Sync {
    fn on_finished(&self, snapshot: &TimerSnapshot);
}

/// Result of one tick of the ticking task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// One second elapsed, the run continues
    Ticked(TimerSnapshot),
    /// This tick brought the countdown to zero
    Finished(TimerSnapshot),
    /// Engine is not running; the ticking task should exit
    Inactive,
}

#[derive(Debug)]
struct EngineInner {
    state: EngineState,
    remaining: TimerDuration,
    total: TimerDuration,
    started_at: Option<Instant>,
    frozen_at: Option<Instant>,
    has_been_started: bool,
    finished_naturally: bool,
    end_side_effects_fired: bool,
}

pub struct CountdownEngine {
    run_id: u64,
    inner: Mutex<EngineInner>,
    hook: Arc<dyn EndOfRunHook>,
}

impl CountdownEngine {
    /// Create an idle engine with nothing configured
    pub fn new(run_id: u64, hook: Arc<dyn EndOfRunHook>) -> Self {
        Self::seeded(run_id, TimerDuration::ZERO, hook)
    }

    /// Create an idle engine carrying `duration` forward; its progress
    /// baseline is `duration` itself
    pub fn seeded(run_id: u64, duration: TimerDuration, hook: Arc<dyn EndOfRunHook>) -> Self {
        Self {
            run_id,
            inner: Mutex::new(EngineInner {
                state: EngineState::Idle,
                remaining: duration,
                total: duration,
                started_at: None,
                frozen_at: None,
                has_been_started: false,
                finished_naturally: false,
                end_side_effects_fired: false,
            }),
            hook,
        }
    }

    fn inner(&self) -> MutexGuard<'_, EngineInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// Set the duration of an idle engine
    pub fn configure(&self, hours: u32, minutes: u32, seconds: u32) -> Result<()> {
        let duration = TimerDuration::new(hours, minutes, seconds)?;
        if duration.is_zero() {
            return Err(TimerError::InvalidDuration);
        }

        let mut inner = self.inner();
        if inner.state != EngineState::Idle {
            return Err(TimerError::InvalidTransition {
                from: inner.state,
                action: "configure",
            });
        }
        inner.remaining = duration;
        inner.total = duration;
        debug!("Engine {} configured for {}", self.run_id, duration);
        Ok(())
    }

    /// Enter Running. Returns `Ok(false)` when this engine was already
    /// started once.
    pub fn start(&self) -> Result<bool> {
        let mut inner = self.inner();
        if inner.remaining.is_zero() {
            return Err(TimerError::InvalidDuration);
        }
        if inner.has_been_started {
            debug!("Engine {} already started, ignoring start", self.run_id);
            return Ok(false);
        }

        inner.has_been_started = true;
        inner.state = EngineState::Running;
        inner.started_at = Some(Instant::now());
        inner.frozen_at = None;
        info!("Engine {} running for {}", self.run_id, inner.remaining);
        Ok(true)
    }

    /// Advance the countdown by one second
    pub fn tick(&self) -> TickOutcome {
        let snapshot = {
            let mut inner = self.inner();
            if inner.state != EngineState::Running {
                return TickOutcome::Inactive;
            }

            inner.remaining = inner.remaining.decremented().unwrap_or(TimerDuration::ZERO);
            if !inner.remaining.is_zero() {
                return TickOutcome::Ticked(self.snapshot_of(&inner));
            }

            inner.state = EngineState::Finished;
            inner.finished_naturally = true;
            inner.frozen_at = Some(Instant::now());
            if inner.end_side_effects_fired {
                return TickOutcome::Finished(self.snapshot_of(&inner));
            }
            inner.end_side_effects_fired = true;
            self.snapshot_of(&inner)
        };

        info!("Engine {} reached zero", self.run_id);
        self.hook.on_finished(&snapshot);
        TickOutcome::Finished(snapshot)
    }

    /// Freeze a running countdown. Returns whether a transition happened.
    pub fn pause(&self) -> Result<bool> {
        let mut inner = self.inner();
        if inner.remaining.is_zero() {
            return Err(TimerError::RedundantPause);
        }
        if inner.state != EngineState::Running {
            return Ok(false);
        }

        inner.state = EngineState::Paused;
        inner.frozen_at = Some(Instant::now());
        info!("Engine {} paused at {}", self.run_id, inner.remaining);
        Ok(true)
    }

    /// Continue a paused run on a fresh, already started engine seeded with
    /// the frozen remaining time
    pub fn resumed(&self) -> Result<CountdownEngine> {
        let remaining = {
            let inner = self.inner();
            if inner.state != EngineState::Paused {
                return Err(TimerError::InvalidTransition {
                    from: inner.state,
                    action: "resume",
                });
            }
            inner.remaining
        };

        let next = CountdownEngine::seeded(self.run_id, remaining, Arc::clone(&self.hook));
        next.start()?;
        Ok(next)
    }

    /// Finish the run on user request, zeroing the remaining time.
    ///
    /// Returns `false` if the engine had already finished.
    pub fn stop(&self) -> bool {
        let mut inner = self.inner();
        if inner.state == EngineState::Finished {
            return false;
        }

        inner.state = EngineState::Finished;
        inner.finished_naturally = false;
        inner.remaining = TimerDuration::ZERO;
        if inner.frozen_at.is_none() {
            inner.frozen_at = Some(Instant::now());
        }
        info!("Engine {} stopped by user", self.run_id);
        true
    }

    pub fn is_running(&self) -> bool {
        self.inner().state == EngineState::Running
    }

    pub fn at_end(&self) -> bool {
        self.inner().state == EngineState::Finished
    }

    pub fn state(&self) -> EngineState {
        self.inner().state
    }

    pub fn remaining(&self) -> TimerDuration {
        self.inner().remaining
    }

    pub fn finished_naturally(&self) -> bool {
        self.inner().finished_naturally
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let inner = self.inner();
        self.snapshot_of(&inner)
    }

    fn snapshot_of(&self, inner: &EngineInner) -> TimerSnapshot {
        TimerSnapshot {
            run_id: self.run_id,
            state: inner.state,
            remaining: inner.remaining,
            total: inner.total,
            progress: progress_of(inner, Instant::now()),
            finished_naturally: inner.finished_naturally,
        }
    }
}

/// `elapsed * 100 / total`, floored and capped at 100; 0 when nothing is
/// configured or the run never started
fn progress_of(inner: &EngineInner, now: Instant) -> u8 {
    if inner.finished_naturally {
        return 100;
    }
    let total = inner.total.total_millis();
    if total == 0 {
        return 0;
    }
    let Some(started_at) = inner.started_at else {
        return 0;
    };

    let until = inner.frozen_at.unwrap_or(now);
    let elapsed = until.saturating_duration_since(started_at).as_millis() as u64;
    (elapsed * 100 / total).min(100) as u8
}

impl std::fmt::Debug for CountdownEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownEngine")
            .field("run_id", &self.run_id)
            .field("inner", &*self.inner())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingHook {
        fired: AtomicUsize,
    }

    impl EndOfRunHook for CountingHook {
        fn on_finished(&self, _snapshot: &TimerSnapshot) {
            self.fired.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn engine(h: u32, m: u32, s: u32) -> (CountdownEngine, Arc<CountingHook>) {
        let hook = Arc::new(CountingHook::default());
        let engine = CountdownEngine::new(1, hook.clone());
        engine.configure(h, m, s).unwrap();
        (engine, hook)
    }

    #[test]
    fn test_full_run_fires_side_effects_once() {
        for (h, m, s) in [(0, 0, 1), (0, 1, 0), (0, 2, 5), (1, 0, 1)] {
            let (engine, hook) = engine(h, m, s);
            assert!(engine.start().unwrap());

            let ticks = h * 3600 + m * 60 + s;
            for i in 1..=ticks {
                let outcome = engine.tick();
                if i < ticks {
                    assert!(matches!(outcome, TickOutcome::Ticked(_)));
                } else {
                    assert!(matches!(outcome, TickOutcome::Finished(_)));
                }
            }

            assert!(engine.remaining().is_zero());
            assert_eq!(engine.state(), EngineState::Finished);
            assert!(engine.finished_naturally());
            assert_eq!(engine.tick(), TickOutcome::Inactive);
            assert_eq!(hook.fired.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_stop_from_running_and_paused() {
        let (running, hook) = engine(0, 5, 0);
        running.start().unwrap();
        running.tick();
        assert!(running.stop());
        assert!(running.remaining().is_zero());
        assert!(running.at_end());
        assert!(!running.finished_naturally());

        let (paused, _) = engine(0, 5, 0);
        paused.start().unwrap();
        paused.pause().unwrap();
        assert!(paused.stop());
        assert!(paused.remaining().is_zero());
        assert!(!paused.finished_naturally());

        assert!(!running.stop());
        assert_eq!(hook.fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_stop_before_final_tick_suppresses_side_effects() {
        let (engine, hook) = engine(0, 0, 2);
        engine.start().unwrap();
        engine.tick();
        engine.stop();
        assert_eq!(engine.tick(), TickOutcome::Inactive);
        assert_eq!(hook.fired.load(Ordering::SeqCst), 0);
        assert!(!engine.finished_naturally());
    }

    #[test]
    fn test_pause_then_resume_preserves_remaining() {
        let (engine, hook) = engine(0, 1, 10);
        engine.start().unwrap();
        for _ in 0..15 {
            engine.tick();
        }
        assert!(engine.pause().unwrap());
        let frozen = engine.remaining();
        assert_eq!(engine.tick(), TickOutcome::Inactive);
        assert_eq!(engine.remaining(), frozen);

        let resumed = engine.resumed().unwrap();
        assert!(resumed.is_running());
        assert_eq!(resumed.remaining(), frozen);
        assert_eq!(resumed.snapshot().total, frozen);
        assert_eq!(resumed.run_id(), engine.run_id());

        for _ in 0..frozen.total_seconds() {
            resumed.tick();
        }
        assert!(resumed.finished_naturally());
        assert_eq!(hook.fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_start_is_one_shot() {
        let (engine, _) = engine(0, 0, 10);
        assert!(engine.start().unwrap());
        engine.pause().unwrap();
        assert!(!engine.start().unwrap());
        assert_eq!(engine.state(), EngineState::Paused);
    }

    #[test]
    fn test_zero_duration_never_starts() {
        let hook = Arc::new(CountingHook::default());
        let engine = CountdownEngine::new(1, hook.clone());
        assert!(matches!(engine.configure(0, 0, 0), Err(TimerError::InvalidDuration)));
        assert!(matches!(engine.start(), Err(TimerError::InvalidDuration)));

        let seeded = CountdownEngine::seeded(2, TimerDuration::ZERO, hook);
        assert!(matches!(seeded.start(), Err(TimerError::InvalidDuration)));
        assert_eq!(seeded.state(), EngineState::Idle);
    }

    #[test]
    fn test_configure_only_when_idle() {
        let (engine, _) = engine(0, 0, 3);
        engine.start().unwrap();
        assert!(matches!(
            engine.configure(0, 1, 0),
            Err(TimerError::InvalidTransition { from: EngineState::Running, .. })
        ));
    }

    #[test]
    fn test_pause_rules() {
        let (engine, _) = engine(0, 0, 1);
        assert!(!engine.pause().unwrap());
        engine.start().unwrap();
        engine.tick();
        assert!(matches!(engine.pause(), Err(TimerError::RedundantPause)));
        assert!(matches!(
            engine.resumed(),
            Err(TimerError::InvalidTransition { from: EngineState::Finished, .. })
        ));
    }

    #[test]
    fn test_progress_without_total_is_zero() {
        let hook = Arc::new(CountingHook::default());
        let engine = CountdownEngine::new(1, hook);
        assert_eq!(engine.snapshot().progress, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_is_monotonic_and_reaches_100() {
        let (engine, _) = engine(0, 0, 7);
        engine.start().unwrap();
        assert_eq!(engine.snapshot().progress, 0);

        let mut last = 0;
        for _ in 0..7 {
            tokio::time::advance(Duration::from_secs(1)).await;
            let progress = match engine.tick() {
                TickOutcome::Ticked(snapshot) | TickOutcome::Finished(snapshot) => snapshot.progress,
                TickOutcome::Inactive => panic!("engine stopped early"),
            };
            assert!(progress >= last);
            last = progress;
        }
        assert_eq!(last, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_freezes_while_paused() {
        let (engine, _) = engine(0, 0, 10);
        engine.start().unwrap();
        tokio::time::advance(Duration::from_secs(5)).await;
        engine.tick();
        engine.pause().unwrap();
        let frozen = engine.snapshot().progress;
        assert_eq!(frozen, 50);

        tokio::time::advance(Duration::from_secs(3)).await;
        assert_eq!(engine.snapshot().progress, frozen);
    }
}
