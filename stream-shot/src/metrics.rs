use opentelemetry::KeyValue;
use opentelemetry::global;
use opentelemetry::metrics::Counter;

use shot_throttle::Mode;

/// Counters shared by the stream adapter and the service.
#[derive(Clone, Debug)]
pub(crate) struct ThrottleMetrics {
    emitted: Counter<u64>,
    delayed: Counter<u64>,
    dropped: Counter<u64>,
    attributes: [KeyValue; 1],
}

impl ThrottleMetrics {
    pub(crate) fn new(mode: Mode) -> Self {
        let meter = global::meter("stream_shot");
        Self {
            emitted: meter.u64_counter("throttle.emitted").build(),
            delayed: meter.u64_counter("throttle.delayed").build(),
            dropped: meter.u64_counter("throttle.dropped").build(),
            attributes: [KeyValue::new("mode", mode.as_str())],
        }
    }

    pub(crate) fn emitted(&self) {
        self.emitted.add(1, &self.attributes);
    }

    pub(crate) fn delayed(&self) {
        self.delayed.add(1, &self.attributes);
    }

    pub(crate) fn dropped(&self) {
        self.dropped.add(1, &self.attributes);
    }
}
