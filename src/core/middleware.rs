//! Request logging middleware

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::{Duration, Instant};
use tracing::info;

/// Emit one console line per request with its status and latency
pub async fn request_logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;

    info!(
        method = %method,
        uri = %uri,
        status = response.status().as_u16(),
        elapsed_ms = elapsed_millis(start.elapsed()),
        "request completed"
    );

    response
}

/// Whole milliseconds, saturating at `u64::MAX`
fn elapsed_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
