use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Fraction of the session elapsed, in [0, 1], non-decreasing.
pub trait ProgressClock: Send + Sync {
    fn progress(&self) -> f64;
}

impl<C: ProgressClock + ?Sized> ProgressClock for Arc<C> {
    fn progress(&self) -> f64 {
        (**self).progress()
    }
}

/// Wall-clock deadline measured from construction.
#[derive(Debug, Clone)]
pub struct DeadlineClock {
    start: Instant,
    deadline: Duration,
}

impl DeadlineClock {
    pub fn new(deadline: Duration) -> Self {
        Self {
            start: Instant::now(),
            deadline,
        }
    }
}

impl ProgressClock for DeadlineClock {
    fn progress(&self) -> f64 {
        if self.deadline.is_zero() {
            return 1.0;
        }
        (self.start.elapsed().as_secs_f64() / self.deadline.as_secs_f64()).clamp(0.0, 1.0)
    }
}

/// Deadline measured in rounds; the driver advances it once per round.
#[derive(Debug)]
pub struct RoundClock {
    round: AtomicU32,
    deadline_rounds: u32,
}

impl RoundClock {
    pub fn new(deadline_rounds: u32) -> Self {
        Self {
            round: AtomicU32::new(0),
            deadline_rounds,
        }
    }

    /// Move to the next round and return it.
    pub fn advance(&self) -> u32 {
        self.round.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn round(&self) -> u32 {
        self.round.load(Ordering::Relaxed)
    }
}

impl ProgressClock for RoundClock {
    fn progress(&self) -> f64 {
        if self.deadline_rounds == 0 {
            return 1.0;
        }
        (f64::from(self.round()) / f64::from(self.deadline_rounds)).clamp(0.0, 1.0)
    }
}
