use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use metrics::gauge;

use crate::AppState;

/// Prometheus scrape endpoint. Storage-derived gauges are refreshed on each scrape.
pub async fn render(State(state): State<AppState>) -> impl IntoResponse {
    match state.session_queue.list_active_queue().await {
        Ok(queue) => gauge!("session_queue_depth").set(queue.len() as f64),
        Err(e) => tracing::warn!(error = %e, "Failed to refresh session queue depth"),
    }

    let body = state.metrics_handle.render();
    ([(CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}
