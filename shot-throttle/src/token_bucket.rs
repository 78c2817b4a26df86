use std::ops::ControlFlow;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;
use tracing::trace;

use crate::Clock;
use crate::MonotonicClock;
use crate::Quota;
use crate::Reason;

/// A snapshot of a bucket's mutable state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bucket {
    /// Tokens currently available, in `[0, capacity]`.
    pub tokens: i64,
    /// Clock reading (ns) at which `tokens` was last accurate. May be in the
    /// future while a wait is reserved.
    pub last_update: i64,
}

/// A token bucket with weighted costs and forward reservations.
///
/// The bucket starts full. Tokens arrive one per `interval` and are capped at
/// `capacity`. An element whose cost cannot be paid empties the bucket and
/// reserves it until the missing tokens have accrued; the caller is told how
/// long that is.
///
/// The two words of state are updated together under a short critical
/// section, so a bucket can be shared between producers through an `Arc`.
#[derive(Debug)]
pub struct TokenBucket<C = MonotonicClock> {
    capacity: i64,
    interval: i64,
    clock: C,
    state: Mutex<Bucket>,
}

impl TokenBucket {
    pub fn new(quota: Quota) -> Self {
        Self::with_clock(quota, MonotonicClock::new())
    }
}

impl<C: Clock> TokenBucket<C> {
    pub fn with_clock(quota: Quota, clock: C) -> Self {
        let capacity = quota.capacity();
        let interval = quota.interval();
        let now = clock.now();
        if interval == 0 {
            debug!(?quota, "interval rounds to zero, bucket is a passthrough");
        }

        Self {
            capacity,
            interval,
            clock,
            state: Mutex::new(Bucket {
                tokens: capacity,
                last_update: now,
            }),
        }
    }

    /// Attempts to pay `cost` tokens now.
    ///
    /// # Errors
    ///
    /// Returns `Reason` if the element has to wait for its tokens. The
    /// reservation is committed either way.
    #[inline]
    pub fn reserve(&self, cost: i64) -> ControlFlow<Reason> {
        self.reserve_at(cost, self.clock.now())
    }

    /// Attempts to pay `cost` tokens at clock reading `now`.
    ///
    /// Negative costs are treated as zero.
    pub fn reserve_at(&self, cost: i64, now: i64) -> ControlFlow<Reason> {
        if self.is_passthrough() {
            return ControlFlow::Continue(());
        }
        let cost = cost.max(0);
        let interval = self.interval;

        let mut state = self.state.lock();

        let elapsed = now.saturating_sub(state.last_update);
        let arrived = if elapsed >= interval {
            elapsed / interval
        } else {
            0
        };
        // Only whole tokens move the clock, partial progress is kept.
        let next_time = state.last_update + arrived * interval;
        let available = state.tokens.saturating_add(arrived).min(self.capacity);

        if cost <= available {
            state.tokens = available - cost;
            state.last_update = next_time;
            trace!(cost, tokens = state.tokens, "tokens paid");
            return ControlFlow::Continue(());
        }

        let time_passed = now.saturating_sub(next_time);
        let waiting_time = (cost - available).saturating_mul(interval);
        let delay = waiting_time.saturating_sub(time_passed);

        state.tokens = 0;
        state.last_update = now.saturating_add(delay);
        trace!(cost, available, delay, "bucket exhausted, reserved forward");

        ControlFlow::Break(Reason::Exhausted {
            delay: Duration::from_nanos(delay.max(0) as u64),
        })
    }

    /// Refill the bucket and restart its clock from now, as if it had just
    /// been created.
    pub fn restart(&self) {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.tokens = self.capacity;
        state.last_update = now;
        trace!(now, "bucket restarted");
    }

    /// True when the interval rounds to zero and no accounting takes place.
    pub fn is_passthrough(&self) -> bool {
        self.interval == 0
    }

    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    pub fn interval(&self) -> Duration {
        Duration::from_nanos(self.interval as u64)
    }

    pub fn snapshot(&self) -> Bucket {
        *self.state.lock()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
