use std::sync::Arc;
use std::time::Duration;

use shot_throttle::Error;
use shot_throttle::Mode;
use shot_throttle::Quota;
use shot_throttle::TokenBucket;

use crate::clock::TokioClock;

/// A token bucket on tokio time, shareable between producers.
pub type SharedBucket = Arc<TokenBucket<TokioClock>>;

/// Configuration for a throttling stage.
///
/// A `Throttle` is only a description. Every adapter built from it gets its
/// own, freshly filled bucket. Use [`Throttle::bucket`] together with
/// [`ThrottleStreamExt::throttle_shared`](crate::ThrottleStreamExt::throttle_shared)
/// to make several producers draw from one bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Throttle {
    quota: Quota,
    mode: Mode,
}

impl Throttle {
    /// Create a Throttle allowing `elements` per `duration`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRate`] if `elements` is not positive.
    pub fn new(elements: i64, duration: Duration, mode: Mode) -> Result<Self, Error> {
        Ok(Self {
            quota: Quota::new(elements, duration)?,
            mode,
        })
    }

    pub fn shaping(elements: i64, duration: Duration) -> Result<Self, Error> {
        Self::new(elements, duration, Mode::Shaping)
    }

    pub fn enforcing(elements: i64, duration: Duration) -> Result<Self, Error> {
        Self::new(elements, duration, Mode::Enforcing)
    }

    /// Create a Throttle from an existing quota.
    pub fn from_quota(quota: Quota, mode: Mode) -> Self {
        Self { quota, mode }
    }

    /// Allow `burst` elements above the steady-state rate.
    pub fn with_burst(mut self, burst: i64) -> Self {
        self.quota = self.quota.with_burst(burst);
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn quota(&self) -> Quota {
        self.quota
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// A new, full bucket for this configuration, starting now.
    pub fn bucket(&self) -> SharedBucket {
        Arc::new(TokenBucket::with_clock(self.quota, TokioClock::new()))
    }
}
