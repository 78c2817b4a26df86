/// Errors produced when configuring a throttle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The throughput quota must be positive.
    ///
    /// A non-positive number of elements per duration would make the
    /// per-token interval undefined.
    #[error("invalid rate: elements must be positive, got {elements}")]
    InvalidRate {
        /// The rejected number of elements.
        elements: i64,
    },
}
