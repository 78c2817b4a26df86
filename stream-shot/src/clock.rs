use shot_throttle::Clock;
use tokio::time::Instant;

/// A [`Clock`] which reads the tokio runtime's notion of time.
///
/// Pausing or advancing tokio time (`tokio::time::pause`) moves this clock
/// too, which keeps bucket arithmetic and `tokio::time::sleep` in agreement.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    anchor: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            anchor: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    #[inline]
    fn now(&self) -> i64 {
        i64::try_from(self.anchor.elapsed().as_nanos()).unwrap_or(i64::MAX)
    }
}
