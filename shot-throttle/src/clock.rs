use std::fmt::Debug;

use quanta::Instant;

/// A monotonic source of time for a [`TokenBucket`](crate::TokenBucket).
///
/// Readings are nanoseconds since an arbitrary, fixed origin. They must never
/// decrease.
pub trait Clock: Debug + Send + Sync {
    fn now(&self) -> i64;
}

/// The default clock, backed by [`quanta`].
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    clock: quanta::Clock,
    /// A fixed point in time (TSC tick) to calculate deltas from.
    anchor: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::with_clock(quanta::Clock::new())
    }

    /// Use a specific `quanta` clock, e.g. one created by `quanta::Clock::mock()`.
    pub fn with_clock(clock: quanta::Clock) -> Self {
        let anchor = clock.now();
        Self { clock, anchor }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> i64 {
        let elapsed = self.clock.now().duration_since(self.anchor).as_nanos();
        i64::try_from(elapsed).unwrap_or(i64::MAX)
    }
}
