use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;
use super::auth::require_auth;
use super::handlers;

pub fn create_router(state: AppState) -> Router {
    // Public routes — no authentication required
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render));

    // Admin API — requires Bearer token when API_TOKEN is set
    let protected = Router::new()
        // Contract positions
        .route("/api/contract-positions", get(handlers::positions::list))
        .route(
            "/api/contract-positions/session-control",
            get(handlers::session_control::list).post(handlers::session_control::push),
        )
        .route(
            "/api/contract-positions/:id",
            get(handlers::positions::detail).put(handlers::positions::settle),
        )
        // Wallets
        .route("/api/wallets", get(handlers::wallets::list))
        .route("/api/users/:id/adjust-balance", post(handlers::users::adjust_balance))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
