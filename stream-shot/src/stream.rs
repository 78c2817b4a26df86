use std::fmt;
use std::future::Future;
use std::ops::ControlFlow;
use std::pin::Pin;
use std::task::Context;
use std::task::Poll;
use std::task::ready;

use futures::Stream;
use futures::TryStream;
use futures::future::Ready;
use futures::stream::FusedStream;
use pin_project_lite::pin_project;
use tokio::time::Sleep;
use tokio::time::sleep;
use tracing::debug;

use shot_throttle::Mode;
use shot_throttle::Reason;

use crate::metrics::ThrottleMetrics;
use crate::throttle::SharedBucket;
use crate::throttle::Throttle;

/// The default cost function: every element costs one token.
pub type UnitCost<T, E> = fn(&T) -> Ready<Result<i64, E>>;

/// Consecutive drops handled in one poll before yielding to the runtime.
pub(crate) const DROP_BUDGET: usize = 32;

fn unit_cost<T, E>(_item: &T) -> Ready<Result<i64, E>> {
    futures::future::ready(Ok(1))
}

pin_project! {
    /// Stream for the [`throttle`](ThrottleStreamExt::throttle) family of
    /// adapters.
    #[must_use = "streams do nothing unless polled"]
    pub struct Throttled<S, F, Fut>
    where
        S: TryStream,
    {
        #[pin]
        stream: S,
        cost_fn: F,
        // Cost evaluation in progress for `pending_item`.
        #[pin]
        pending_cost: Option<Fut>,
        pending_item: Option<S::Ok>,
        // Shaping pause in progress; the element is emitted when it fires.
        delayed: Option<(Pin<Box<Sleep>>, S::Ok)>,
        bucket: SharedBucket,
        // The bucket belongs to this stream alone and starts on first poll.
        start_on_poll: bool,
        mode: Mode,
        passthrough: bool,
        done: bool,
        metrics: ThrottleMetrics,
    }
}

impl<S, F, Fut> Throttled<S, F, Fut>
where
    S: TryStream,
    F: FnMut(&S::Ok) -> Fut,
    Fut: Future<Output = Result<i64, S::Error>>,
{
    pub(crate) fn new(
        stream: S,
        bucket: SharedBucket,
        owned: bool,
        mode: Mode,
        cost_fn: F,
    ) -> Self {
        let passthrough = bucket.is_passthrough();
        if passthrough {
            debug!(%mode, "throttle interval is zero, forwarding without accounting");
        }
        Self {
            stream,
            cost_fn,
            pending_cost: None,
            pending_item: None,
            delayed: None,
            bucket,
            start_on_poll: owned,
            mode,
            passthrough,
            done: false,
            metrics: ThrottleMetrics::new(mode),
        }
    }

    /// The bucket this stream draws from.
    pub fn bucket(&self) -> &SharedBucket {
        &self.bucket
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Acquires a reference to the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Consumes this adapter, returning the underlying stream.
    ///
    /// Any element waiting for its cost or its delay is discarded.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S, F, Fut> Stream for Throttled<S, F, Fut>
where
    S: TryStream,
    F: FnMut(&S::Ok) -> Fut,
    Fut: Future<Output = Result<i64, S::Error>>,
{
    type Item = Result<S::Ok, S::Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        if std::mem::take(this.start_on_poll) {
            this.bucket.restart();
        }
        let mut drops = 0;

        loop {
            if let Some((sleep, _)) = this.delayed.as_mut() {
                ready!(sleep.as_mut().poll(cx));
                if let Some((_, item)) = this.delayed.take() {
                    this.metrics.emitted();
                    return Poll::Ready(Some(Ok(item)));
                }
            }

            if let Some(fut) = this.pending_cost.as_mut().as_pin_mut() {
                let cost = ready!(fut.poll(cx));
                this.pending_cost.set(None);
                let Some(item) = this.pending_item.take() else {
                    continue;
                };

                let cost = match cost {
                    Ok(cost) => cost,
                    Err(e) => {
                        // The element is discarded and the bucket left as it was.
                        *this.done = true;
                        return Poll::Ready(Some(Err(e)));
                    }
                };

                match this.bucket.reserve(cost) {
                    ControlFlow::Continue(()) => {
                        this.metrics.emitted();
                        return Poll::Ready(Some(Ok(item)));
                    }
                    ControlFlow::Break(Reason::Exhausted { delay }) => match this.mode {
                        Mode::Shaping => {
                            this.metrics.delayed();
                            *this.delayed = Some((Box::pin(sleep(delay)), item));
                        }
                        Mode::Enforcing => {
                            // The reservation stands: dropped elements still pay.
                            debug!(cost, ?delay, "element dropped");
                            this.metrics.dropped();
                            drops += 1;
                            if drops >= DROP_BUDGET {
                                cx.waker().wake_by_ref();
                                return Poll::Pending;
                            }
                        }
                    },
                }
                continue;
            }

            if *this.done {
                return Poll::Ready(None);
            }

            match ready!(this.stream.as_mut().try_poll_next(cx)) {
                Some(Ok(item)) => {
                    if *this.passthrough {
                        this.metrics.emitted();
                        return Poll::Ready(Some(Ok(item)));
                    }
                    let fut = (this.cost_fn)(&item);
                    *this.pending_item = Some(item);
                    this.pending_cost.set(Some(fut));
                }
                Some(Err(e)) => {
                    *this.done = true;
                    return Poll::Ready(Some(Err(e)));
                }
                None => {
                    *this.done = true;
                    return Poll::Ready(None);
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let in_flight = usize::from(self.pending_item.is_some() || self.delayed.is_some());
        let (_, upper) = self.stream.size_hint();
        let upper = upper.and_then(|upper| upper.checked_add(in_flight));
        match self.mode {
            // Enforcing may drop any element.
            Mode::Enforcing if !self.passthrough => (0, upper),
            _ => (in_flight, upper),
        }
    }
}

impl<S, F, Fut> FusedStream for Throttled<S, F, Fut>
where
    S: TryStream,
    F: FnMut(&S::Ok) -> Fut,
    Fut: Future<Output = Result<i64, S::Error>>,
{
    fn is_terminated(&self) -> bool {
        self.done && self.pending_cost.is_none() && self.delayed.is_none()
    }
}

impl<S, F, Fut> fmt::Debug for Throttled<S, F, Fut>
where
    S: TryStream + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Throttled")
            .field("stream", &self.stream)
            .field("bucket", &self.bucket)
            .field("mode", &self.mode)
            .field("passthrough", &self.passthrough)
            .field("delayed", &self.delayed.is_some())
            .field("done", &self.done)
            .finish()
    }
}

/// Throttling adapters for every [`TryStream`].
pub trait ThrottleStreamExt: TryStream + Sized {
    /// Throttle this stream with a fresh bucket where every element costs one token.
    ///
    /// The bucket starts full when the stream is first polled.
    fn throttle(
        self,
        throttle: &Throttle,
    ) -> Throttled<Self, UnitCost<Self::Ok, Self::Error>, Ready<Result<i64, Self::Error>>> {
        let cost_fn: UnitCost<Self::Ok, Self::Error> = unit_cost::<Self::Ok, Self::Error>;
        Throttled::new(self, throttle.bucket(), true, throttle.mode(), cost_fn)
    }

    /// Throttle this stream with a fresh bucket, weighing each element with `cost_fn`.
    ///
    /// The cost may be computed asynchronously. A failed cost evaluation ends
    /// the stream with that error; the element is not emitted.
    fn throttle_with<F, Fut>(self, throttle: &Throttle, cost_fn: F) -> Throttled<Self, F, Fut>
    where
        F: FnMut(&Self::Ok) -> Fut,
        Fut: Future<Output = Result<i64, Self::Error>>,
    {
        Throttled::new(self, throttle.bucket(), true, throttle.mode(), cost_fn)
    }

    /// Throttle this stream against a bucket which may also be used by other
    /// producers.
    fn throttle_shared<F, Fut>(
        self,
        bucket: SharedBucket,
        mode: Mode,
        cost_fn: F,
    ) -> Throttled<Self, F, Fut>
    where
        F: FnMut(&Self::Ok) -> Fut,
        Fut: Future<Output = Result<i64, Self::Error>>,
    {
        Throttled::new(self, bucket, false, mode, cost_fn)
    }
}

impl<S: TryStream> ThrottleStreamExt for S {}
