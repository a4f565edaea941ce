use std::time::{Duration, Instant};
use std::thread;
use log::info;

/// Time source for every wait in the pipeline.
///
/// Production code uses [`SystemClock`]; tests swap in a manual clock so
/// throttling and pacing can be asserted without real sleeps.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Fixed pacing delay, logged before sleeping. Zero delays are skipped.
pub fn pause(clock: &dyn Clock, delay: Duration, label: &str) {
    if delay.is_zero() {
        return;
    }
    info!("Waiting for {:.1} seconds ({})...", delay.as_secs_f64(), label);
    clock.sleep(delay);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualClock;

    #[test]
    fn pause_sleeps_for_the_requested_delay() {
        let clock = ManualClock::new();
        pause(&clock, Duration::from_secs(2), "Entity Delay");
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(2)]);
        assert_eq!(clock.elapsed(), Duration::from_secs(2));
    }

    #[test]
    fn zero_pause_does_not_sleep() {
        let clock = ManualClock::new();
        pause(&clock, Duration::ZERO, "Record Delay");
        assert!(clock.sleeps().is_empty());
    }
}
