/// Errors produced by the Stream Shot middleware.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ThrottleError {
    /// The request arrived faster than the throttle's rate and was dropped.
    ///
    /// Only produced in `Mode::Enforcing`. The duration is the wait the
    /// request would have needed.
    /// When the `axum` feature is enabled, this converts to `429 Too Many Requests`
    /// with a `Retry-After` header.
    #[error("Throttle rate exceeded; request dropped, retry after {retry_after:?}")]
    Dropped {
        /// The duration to wait before retrying.
        retry_after: std::time::Duration,
    },

    /// The throttle could not be configured.
    ///
    /// When the `axum` feature is enabled, this converts to `500 Internal Server Error`.
    #[error("Invalid throttle configuration: {0}")]
    Config(#[from] shot_throttle::Error),
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ThrottleError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let (status, msg, headers) = match self {
            Self::Dropped { retry_after } => {
                let secs = retry_after.as_secs().max(1);
                let val = axum::http::HeaderValue::from(secs);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    self.to_string(),
                    Some((axum::http::header::RETRY_AFTER, val)),
                )
            }
            Self::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string(), None),
        };

        let mut response = (status, msg).into_response();
        if let Some((name, value)) = headers {
            response.headers_mut().insert(name, value);
        }
        response
    }
}
