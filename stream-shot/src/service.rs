use std::future::Future;
use std::ops::ControlFlow;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;

use tokio::time::sleep;
use tower::BoxError;
use tower::Service;
use tracing::debug;

use shot_throttle::Mode;
use shot_throttle::Reason;

use crate::error::ThrottleError;
use crate::metrics::ThrottleMetrics;
use crate::throttle::SharedBucket;

/// Computes the number of tokens a request costs.
pub trait Weigh<Req> {
    fn weigh(&self, req: &Req) -> i64;
}

/// Every request costs one token.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnitWeight;

impl<Req> Weigh<Req> for UnitWeight {
    fn weigh(&self, _req: &Req) -> i64 {
        1
    }
}

/// Weigh requests with a closure.
#[derive(Clone, Copy, Debug)]
pub struct WeighFn<F>(pub F);

impl<Req, F> Weigh<Req> for WeighFn<F>
where
    F: Fn(&Req) -> i64,
{
    fn weigh(&self, req: &Req) -> i64 {
        (self.0)(req)
    }
}

/// Throttles the requests passed to an inner service.
///
/// Clones share the bucket.
#[derive(Debug)]
pub struct ThrottleService<S, W = UnitWeight> {
    inner: S,
    bucket: SharedBucket,
    mode: Mode,
    weigh: W,
    metrics: ThrottleMetrics,
}

impl<S: Clone, W: Clone> Clone for ThrottleService<S, W> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            bucket: SharedBucket::clone(&self.bucket),
            mode: self.mode,
            weigh: self.weigh.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<S> ThrottleService<S> {
    pub fn new(inner: S, bucket: SharedBucket, mode: Mode) -> Self {
        Self {
            inner,
            bucket,
            mode,
            weigh: UnitWeight,
            metrics: ThrottleMetrics::new(mode),
        }
    }
}

impl<S, W> ThrottleService<S, W> {
    pub fn with_weigh<V>(self, weigh: V) -> ThrottleService<S, V> {
        ThrottleService {
            inner: self.inner,
            bucket: self.bucket,
            mode: self.mode,
            weigh,
            metrics: self.metrics,
        }
    }

    pub fn bucket(&self) -> &SharedBucket {
        &self.bucket
    }
}

impl<S, W, Req> Service<Req> for ThrottleService<S, W>
where
    S: Service<Req, Error = BoxError> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Response: Send + 'static,
    W: Weigh<Req>,
    Req: Send + 'static,
{
    type Response = S::Response;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<S::Response, BoxError>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        if self.bucket.is_passthrough() {
            self.metrics.emitted();
            return Box::pin(self.inner.call(req));
        }

        let cost = self.weigh.weigh(&req);
        match self.bucket.reserve(cost) {
            ControlFlow::Continue(()) => {
                self.metrics.emitted();
                Box::pin(self.inner.call(req))
            }
            ControlFlow::Break(Reason::Exhausted { delay }) => match self.mode {
                Mode::Shaping => {
                    self.metrics.delayed();
                    // The ready service goes with the request, its clone stays behind.
                    let clone = self.inner.clone();
                    let mut inner = std::mem::replace(&mut self.inner, clone);
                    Box::pin(async move {
                        sleep(delay).await;
                        inner.call(req).await
                    })
                }
                Mode::Enforcing => {
                    debug!(cost, ?delay, "request dropped");
                    self.metrics.dropped();
                    Box::pin(futures::future::ready(Err(BoxError::from(
                        ThrottleError::Dropped { retry_after: delay },
                    ))))
                }
            },
        }
    }
}
