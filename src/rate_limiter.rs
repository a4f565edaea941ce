//! Cooperative throttle for outbound search calls.
//!
//! A [`RateWindow`] keeps a log of the instants at which recent calls were
//! admitted. A call that would push the log past the ceiling sleeps until the
//! oldest entry falls out of the rolling window; it is never rejected.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use log::{debug, info};

use crate::delay_manager::{Clock, SystemClock};

pub trait RateLimiter: Send + Sync {
    /// Blocks until one more call is permitted, then records it.
    fn acquire(&self);
}

/// At most `max_calls` admissions per rolling `period`.
pub struct RateWindow {
    max_calls: usize,
    period: Duration,
    calls: Mutex<VecDeque<Instant>>,
    clock: Arc<dyn Clock>,
}

impl RateWindow {
    pub fn new(max_calls: usize, period: Duration) -> Self {
        Self::with_clock(max_calls, period, Arc::new(SystemClock))
    }

    pub fn with_clock(max_calls: usize, period: Duration, clock: Arc<dyn Clock>) -> Self {
        // A zero ceiling would block forever.
        let max_calls = max_calls.max(1);
        RateWindow {
            max_calls,
            period,
            calls: Mutex::new(VecDeque::with_capacity(max_calls)),
            clock,
        }
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, VecDeque<Instant>> {
        // The log stays consistent even if a holder panicked mid-call.
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn evict_expired(calls: &mut VecDeque<Instant>, now: Instant, period: Duration) {
        while let Some(&oldest) = calls.front() {
            if now.duration_since(oldest) >= period {
                calls.pop_front();
            } else {
                break;
            }
        }
    }
}

impl RateLimiter for RateWindow {
    fn acquire(&self) {
        loop {
            let wait = {
                let mut calls = self.lock_calls();
                let now = self.clock.now();
                Self::evict_expired(&mut calls, now, self.period);

                if calls.len() < self.max_calls {
                    calls.push_back(now);
                    debug!("Rate window admitted call ({}/{})", calls.len(), self.max_calls);
                    return;
                }

                match calls.front() {
                    Some(&oldest) => self.period.saturating_sub(now.duration_since(oldest)),
                    None => Duration::ZERO,
                }
            };

            info!(
                "Rate limit of {} calls per {}s reached, waiting {:.1}s",
                self.max_calls,
                self.period.as_secs(),
                wait.as_secs_f64()
            );
            self.clock.sleep(wait);
        }
    }
}

/// Admits every call immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unlimited;

impl RateLimiter for Unlimited {
    fn acquire(&self) {}
}
