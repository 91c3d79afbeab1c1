use std::time::Duration;

/// Accumulator that drains elapsed wall time in fixed-size update steps.
///
/// Time is tracked in whole nanoseconds so repeated subtraction never drifts.
/// After each drained frame the residual is in `[0, interval)`.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    interval: Duration,
    accumulator: Duration,
    /// Optional cap on steps per frame. `None` keeps every step.
    max_steps: Option<u32>,
    steps_this_frame: u32,
}

impl FixedTimestep {
    /// An interval of zero is bumped to one nanosecond.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_nanos(1)),
            accumulator: Duration::ZERO,
            max_steps: None,
            steps_this_frame: 0,
        }
    }

    /// Interval of `1 / updates_per_second`.
    pub fn from_rate(updates_per_second: u32) -> Self {
        Self::new(Duration::from_secs(1) / updates_per_second.max(1))
    }

    pub fn with_max_steps(mut self, max_steps: Option<u32>) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Unconsumed time.
    pub fn accumulator(&self) -> Duration {
        self.accumulator
    }

    /// Add elapsed time and start a new frame's step budget.
    pub fn accumulate(&mut self, elapsed: Duration) {
        self.accumulator = self.accumulator.saturating_add(elapsed);
        self.steps_this_frame = 0;
    }

    /// Take one interval out of the accumulator if a whole one is available.
    ///
    /// Returns `true` when the caller must run exactly one update.
    pub fn consume_step(&mut self) -> bool {
        if self.accumulator < self.interval {
            return false;
        }
        if let Some(max) = self.max_steps {
            if self.steps_this_frame >= max {
                let remainder = self.accumulator.as_nanos() % self.interval.as_nanos();
                let dropped = self.accumulator.saturating_sub(Duration::from_nanos(remainder as u64));
                tracing::warn!(
                    max_steps = max,
                    dropped_ms = dropped.as_secs_f64() * 1000.0,
                    "catch-up clamp reached, discarding backlog"
                );
                self.accumulator = Duration::from_nanos(remainder as u64);
                return false;
            }
        }
        self.accumulator -= self.interval;
        self.steps_this_frame += 1;
        true
    }

    /// Steps consumed since the last `accumulate`.
    pub fn steps_this_frame(&self) -> u32 {
        self.steps_this_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(ts: &mut FixedTimestep) -> u32 {
        let mut n = 0;
        while ts.consume_step() {
            n += 1;
        }
        n
    }

    #[test]
    fn tenth_of_a_second_at_thirty_hz_runs_three_updates() {
        let mut ts = FixedTimestep::from_rate(30);
        ts.accumulate(Duration::from_millis(100));
        assert_eq!(drain(&mut ts), 3);
        assert!(ts.accumulator() < Duration::from_micros(1));
    }

    #[test]
    fn short_frames_accumulate_until_an_interval_is_reached() {
        let mut ts = FixedTimestep::new(Duration::from_millis(10));
        ts.accumulate(Duration::from_millis(4));
        assert_eq!(drain(&mut ts), 0);
        ts.accumulate(Duration::from_millis(4));
        assert_eq!(drain(&mut ts), 0);
        ts.accumulate(Duration::from_millis(4));
        assert_eq!(drain(&mut ts), 1);
        assert_eq!(ts.accumulator(), Duration::from_millis(2));
    }

    #[test]
    fn zero_elapsed_runs_no_updates() {
        let mut ts = FixedTimestep::from_rate(60);
        ts.accumulate(Duration::ZERO);
        assert_eq!(drain(&mut ts), 0);
    }

    #[test]
    fn update_count_matches_total_time() {
        let interval = Duration::from_secs(1) / 30;
        let samples_ms = [3u64, 17, 250, 1, 0, 33, 34, 66, 400, 12, 9, 5, 120];
        let mut ts = FixedTimestep::new(interval);
        let mut total = Duration::ZERO;
        let mut updates = 0u128;
        for ms in samples_ms {
            let elapsed = Duration::from_millis(ms);
            total += elapsed;
            ts.accumulate(elapsed);
            updates += drain(&mut ts) as u128;
            assert!(ts.accumulator() < interval);
        }
        let expected = total.as_nanos() / interval.as_nanos();
        assert!(updates.abs_diff(expected) <= 1, "{updates} vs {expected}");
    }

    #[test]
    fn long_stall_is_caught_up_without_a_clamp() {
        let mut ts = FixedTimestep::from_rate(30);
        ts.accumulate(Duration::from_secs(10));
        assert_eq!(drain(&mut ts), 300);
    }

    #[test]
    fn clamp_discards_backlog_but_keeps_remainder() {
        let mut ts = FixedTimestep::new(Duration::from_millis(10)).with_max_steps(Some(5));
        ts.accumulate(Duration::from_millis(1003));
        assert_eq!(drain(&mut ts), 5);
        assert_eq!(ts.accumulator(), Duration::from_millis(3));

        // The budget resets on the next frame.
        ts.accumulate(Duration::from_millis(20));
        assert_eq!(drain(&mut ts), 2);
    }

    #[test]
    fn zero_interval_is_bumped() {
        let ts = FixedTimestep::new(Duration::ZERO);
        assert_eq!(ts.interval(), Duration::from_nanos(1));
    }
}
