use std::time::{Duration, Instant};

/// Elapsed-time source for the scheduler.
///
/// Timestamps are durations since the clock's own epoch.
pub trait Clock {
    /// Record the current time as the baseline for the next elapsed query.
    fn init(&mut self);

    /// Time since the previous call (or `init`), then move the baseline to now.
    ///
    /// Each call consumes the interval it reports.
    fn elapsed_since_last(&mut self) -> Duration;

    /// Current timestamp. Does not touch the baseline.
    fn now(&self) -> Duration;

    /// Timestamp recorded by the last `init` or `elapsed_since_last`.
    fn last_loop_time(&self) -> Duration;

    /// Block for roughly `duration`.
    fn sleep(&mut self, duration: Duration);
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct SystemClock {
    epoch: Instant,
    last_loop_time: Duration,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            last_loop_time: Duration::ZERO,
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn init(&mut self) {
        self.last_loop_time = self.now();
    }

    fn elapsed_since_last(&mut self) -> Duration {
        let now = self.now();
        let elapsed = now.saturating_sub(self.last_loop_time);
        self.last_loop_time = self.last_loop_time.max(now);
        elapsed
    }

    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn last_loop_time(&self) -> Duration {
        self.last_loop_time
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Clock that only moves when told to.
///
/// Sleeping advances it by the requested amount, so frame pacing terminates.
/// Used for deterministic runs and tests.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Duration,
    last_loop_time: Duration,
    /// Elapsed values handed out by successive `elapsed_since_last` calls.
    script: std::collections::VecDeque<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock whose successive elapsed queries each advance time by the next
    /// scripted sample. Once the script runs out, queries report whatever time
    /// has passed through `advance` or `sleep`.
    pub fn scripted(samples: impl IntoIterator<Item = Duration>) -> Self {
        Self {
            script: samples.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    pub fn remaining_samples(&self) -> usize {
        self.script.len()
    }
}

impl Clock for ManualClock {
    fn init(&mut self) {
        self.last_loop_time = self.now;
    }

    fn elapsed_since_last(&mut self) -> Duration {
        if let Some(sample) = self.script.pop_front() {
            self.now = self.last_loop_time.max(self.now) + sample;
        }
        let elapsed = self.now.saturating_sub(self.last_loop_time);
        self.last_loop_time = self.last_loop_time.max(self.now);
        elapsed
    }

    fn now(&self) -> Duration {
        self.now
    }

    fn last_loop_time(&self) -> Duration {
        self.last_loop_time
    }

    fn sleep(&mut self, duration: Duration) {
        self.now += duration;
    }
}
