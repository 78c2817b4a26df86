use std::time::Duration;

use axum::{
    Router, error_handling::HandleErrorLayer, http::StatusCode, response::IntoResponse,
    routing::get,
};
use tower::BoxError;
use tower::ServiceBuilder;
use stream_shot::{Throttle, ThrottleError, ThrottleLayer};

#[tokio::main]
async fn main() {
    // 1. Setup Throttle: 10 requests per second, excess rejected
    let throttle = Throttle::enforcing(10, Duration::from_secs(1)).unwrap();

    // 2. Build the Router
    let app = Router::new()
        .route("/", get(|| async { "Hello, Shot!" }))
        .layer(
            ServiceBuilder::new()
                // 1. The outermost layer: catches BoxError and returns Response
                .layer(HandleErrorLayer::new(handle_throttle_error))
                // 2. The middle layer: introduces BoxError
                .layer(ThrottleLayer::new(&throttle))
                // 3. Converts the Route's Infallible to BoxError
                .map_err(BoxError::from),
        );

    // 3. Serve
    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000")
        .await
        .unwrap();
    println!("📡 Listening on http://127.0.0.1:3000");

    axum::serve(listener, app).await.unwrap();
}

/// The signature must match BoxError -> IntoResponse
async fn handle_throttle_error(err: BoxError) -> impl IntoResponse {
    if let Some(throttle_err) = err.downcast_ref::<ThrottleError>() {
        throttle_err.clone().into_response()
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Service Error").into_response()
    }
}
