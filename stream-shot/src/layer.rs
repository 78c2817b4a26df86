use tower::Layer;

use crate::service::ThrottleService;
use crate::service::UnitWeight;
use crate::throttle::SharedBucket;
use crate::throttle::Throttle;

/// Applies a [`Throttle`] to requests.
///
/// The layer owns one bucket; every service it produces draws from it.
#[derive(Clone, Debug)]
pub struct ThrottleLayer<W = UnitWeight> {
    throttle: Throttle,
    bucket: SharedBucket,
    weigh: W,
}

impl ThrottleLayer {
    /// Create a ThrottleLayer with a fresh bucket.
    pub fn new(throttle: &Throttle) -> Self {
        ThrottleLayer {
            throttle: *throttle,
            bucket: throttle.bucket(),
            weigh: UnitWeight,
        }
    }
}

impl<W> ThrottleLayer<W> {
    /// Set how many tokens each request costs.
    ///
    /// See [`WeighFn`](crate::WeighFn) to use a closure.
    pub fn with_weigh<V>(self, weigh: V) -> ThrottleLayer<V> {
        ThrottleLayer {
            throttle: self.throttle,
            bucket: self.bucket,
            weigh,
        }
    }

    pub fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    pub fn bucket(&self) -> &SharedBucket {
        &self.bucket
    }
}

impl<S, W: Clone> Layer<S> for ThrottleLayer<W> {
    type Service = ThrottleService<S, W>;

    fn layer(&self, service: S) -> Self::Service {
        ThrottleService::new(service, self.bucket.clone(), self.throttle.mode())
            .with_weigh(self.weigh.clone())
    }
}
