use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use service::monitoring::record_request;
use std::time::Instant;

/// Records `http_requests_total` and `http_request_duration_seconds` for every
/// routed request, labelled by the route template rather than the raw path.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = match request.extensions().get::<MatchedPath>() {
        Some(matched_path) => matched_path.as_str().to_string(),
        None => request.uri().path().to_string(),
    };

    let response = next.run(request).await;

    record_request(&method, &path, response.status().as_u16(), start.elapsed());
    response
}
