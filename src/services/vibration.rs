//! Repeating vibration bounded by a ceiling or an external cancel

use std::{
    sync::{
        atomic::{AtomicBool, AtomicU32, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::time::sleep;
use tracing::{debug, info};

/// Length of one haptic burst
pub const PULSE_LENGTH: Duration = Duration::from_millis(500);

const PULSE_INTERVAL: Duration = Duration::from_secs(1);

/// Device vibrator
pub trait Haptics: Send + Sync {
    fn pulse(&self, length: Duration);
}

/// One pulse per second until `ceiling` pulses were emitted or `cancel()`
/// is observed. Cancellation is checked between pulses, never mid-pulse.
#[derive(Debug)]
pub struct VibrationScheduler {
    ceiling: u32,
    pulses: AtomicU32,
    cancelled: AtomicBool,
    finished: AtomicBool,
}

impl VibrationScheduler {
    pub fn new(ceiling: u32) -> Self {
        Self {
            ceiling,
            pulses: AtomicU32::new(0),
            cancelled: AtomicBool::new(false),
            finished: AtomicBool::new(false),
        }
    }

    /// Start the pulse loop on the runtime
    pub fn spawn(haptics: Arc<dyn Haptics>, ceiling: u32) -> Arc<Self> {
        let scheduler = Arc::new(Self::new(ceiling));
        let runner = Arc::clone(&scheduler);
        tokio::spawn(async move {
            runner.run(haptics).await;
        });
        scheduler
    }

    pub async fn run(&self, haptics: Arc<dyn Haptics>) {
        info!("Vibrating for up to {} seconds", self.ceiling);

        while self.pulses.load(Ordering::SeqCst) < self.ceiling {
            if self.cancelled.load(Ordering::SeqCst) {
                debug!("Vibration cancelled");
                break;
            }
            haptics.pulse(PULSE_LENGTH);
            self.pulses.fetch_add(1, Ordering::SeqCst);
            sleep(PULSE_INTERVAL).await;
        }

        self.finished.store(true, Ordering::SeqCst);
        info!("Vibration finished after {} pulses", self.pulses());
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn pulses(&self) -> u32 {
        self.pulses.load(Ordering::SeqCst)
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }
}
