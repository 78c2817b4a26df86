//! # Stream Shot
//!
//! `stream-shot` applies a [`shot_throttle::TokenBucket`] to async element
//! streams and to [Tower](https://github.com/tower-rs/tower) services.
//!
//! ## Streams
//!
//! [`ThrottleStreamExt`] adds `throttle*` adapters to every `TryStream`. Each
//! element is weighed by a (possibly asynchronous) cost function and then,
//! depending on the [`Mode`]:
//!
//! 1. **Shaping**: Pauses the stream until the element's cost has accrued and
//!    then emits it. Nothing is ever dropped.
//! 2. **Enforcing**: Drops elements which cannot be paid for immediately.
//!    The stream itself never pauses.
//!
//! Only one element is in flight at a time: the upstream is polled again only
//! once the current element has been emitted or dropped. Upstream errors pass
//! through unchanged and end the stream.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use futures::StreamExt;
//! use futures::TryStreamExt;
//! use stream_shot::Throttle;
//! use stream_shot::ThrottleStreamExt;
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let throttle = Throttle::shaping(1, Duration::from_millis(100)).unwrap();
//! let paced: Vec<u32> = futures::stream::iter(0..5)
//!     .map(Ok::<_, std::convert::Infallible>)
//!     .throttle(&throttle)
//!     .try_collect()
//!     .await
//!     .unwrap();
//! assert_eq!(paced, vec![0, 1, 2, 3, 4]);
//! # }
//! ```
//!
//! ## Services
//!
//! [`ThrottleLayer`] throttles the requests flowing into a Tower service.
//! Shaping delays the inner call, Enforcing rejects it with
//! [`ThrottleError::Dropped`].
//!
//! ## Feature Flags
//!
//! - `axum`: Enables `IntoResponse` for [`ThrottleError`], allowing automatic
//!   conversion to HTTP status codes (429, 500).

mod clock;
mod error;
mod layer;
mod metrics;
mod service;
mod stream;
mod throttle;


pub use clock::TokioClock;
pub use error::ThrottleError;
pub use layer::ThrottleLayer;
pub use service::ThrottleService;
pub use service::UnitWeight;
pub use service::Weigh;
pub use service::WeighFn;
pub use stream::ThrottleStreamExt;
pub use stream::Throttled;
pub use stream::UnitCost;
pub use throttle::SharedBucket;
pub use throttle::Throttle;

pub use shot_throttle::Mode;
pub use shot_throttle::Quota;
