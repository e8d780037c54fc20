use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::AppState;

/// Liveness plus database reachability and pool occupancy.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_ok = sqlx::query("SELECT 1").execute(&state.db).await.is_ok();
    let pool = json!({
        "size": state.db.size(),
        "idle": state.db.num_idle(),
    });

    if db_ok {
        (StatusCode::OK, Json(json!({ "status": "healthy", "pool": pool })))
    } else {
        tracing::warn!("Health check failed: database unreachable");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unhealthy", "db": "disconnected", "pool": pool })),
        )
    }
}
