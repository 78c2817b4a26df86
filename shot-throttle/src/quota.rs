use std::time::Duration;

use crate::Error;

/// The throughput a throttle allows: `elements` tokens per `duration`, plus
/// an optional `burst` of extra capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quota {
    elements: i64,
    duration: Duration,
    burst: i64,
}

impl Quota {
    /// Creates a new `Quota`.
    ///
    /// # Arguments
    ///
    /// * `elements` - The number of tokens replenished every `duration`.
    /// * `duration` - The window over which `elements` tokens are replenished.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRate`] if `elements` is not positive.
    pub fn new(elements: i64, duration: Duration) -> Result<Self, Error> {
        if elements <= 0 {
            return Err(Error::InvalidRate { elements });
        }
        Ok(Self {
            elements,
            duration,
            burst: 0,
        })
    }

    pub fn per_second(elements: i64) -> Result<Self, Error> {
        Self::new(elements, Duration::from_secs(1))
    }

    /// Allow `burst` additional tokens above `elements`.
    pub fn with_burst(mut self, burst: i64) -> Self {
        self.burst = burst;
        self
    }

    pub fn elements(&self) -> i64 {
        self.elements
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn burst(&self) -> i64 {
        self.burst
    }

    /// Maximum number of tokens the bucket can hold.
    ///
    /// `elements + burst`, saturated to `i64::MAX` (unbounded) when the sum
    /// overflows or is not positive.
    pub fn capacity(&self) -> i64 {
        match self.elements.checked_add(self.burst) {
            Some(capacity) if capacity > 0 => capacity,
            _ => i64::MAX,
        }
    }

    /// Nanoseconds needed to replenish a single token.
    ///
    /// Zero when `duration` is too short to be split across `elements`, in
    /// which case the throttle is a passthrough.
    pub fn interval(&self) -> i64 {
        let duration = i64::try_from(self.duration.as_nanos()).unwrap_or(i64::MAX);
        duration / self.elements
    }
}
