//! # shot-throttle
//!
//! `shot-throttle` provides the token bucket state machine behind the
//! `stream-shot` throttling adapters.
//!
//! ## Core Philosophy
//!
//! A throttle sits between a producer and a consumer and decides, for every
//! element, whether it may pass now, must wait, or (depending on the [`Mode`])
//! must be dropped. The bucket itself never sleeps: it only does the
//! bookkeeping and reports how long the caller would have to wait. Callers
//! decide how to honour that answer.
//!
//! ## Key Concepts
//!
//! * **Lazy Refill**: Tokens are recalculated at the moment of the request from
//!   the elapsed time, there are no background timers.
//! * **Reservations**: When an element cannot be paid for, the bucket is
//!   reserved forward to the instant at which its cost will have accrued.
//! * **Weighted Costs**: Every element may consume any number of tokens.
//! * **Pluggable Time**: A [`Clock`] supplies monotonic nanoseconds, so the same
//!   bucket can be driven by wall time, a mock clock or an async runtime's clock.
//!
//! ## Example
//!
//! ```rust
//! use shot_throttle::Quota;
//! use shot_throttle::TokenBucket;
//! use std::time::Duration;
//!
//! let quota = Quota::new(100, Duration::from_secs(60)).unwrap().with_burst(10);
//! let bucket = TokenBucket::new(quota);
//!
//! if bucket.reserve(1).is_continue() {
//!     // Element may pass immediately
//! }
//! ```

use std::fmt;
use std::time::Duration;

mod clock;
mod error;
mod quota;
mod token_bucket;

pub use clock::Clock;
pub use clock::MonotonicClock;
pub use error::Error;
pub use quota::Quota;
pub use token_bucket::Bucket;
pub use token_bucket::TokenBucket;

/// How a throttle treats elements which arrive faster than its rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Pause before emitting an element until its cost has accrued.
    #[default]
    Shaping,
    /// Drop elements which cannot be paid for immediately.
    Enforcing,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Shaping => "shaping",
            Mode::Enforcing => "enforcing",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons why an element could not be emitted immediately.
#[derive(Debug, PartialEq)]
pub enum Reason {
    /// The bucket did not hold enough tokens. The bucket has been reserved
    /// until `delay` from now, when the element's cost will have been paid.
    Exhausted { delay: Duration },
}
