// ============================
// passport-lib/src/router.rs
// ============================
//! HTTP router for the passport service.
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{health, passport};
use crate::AppState;

/// Create the passport router
///
/// Routes live under `/api/v1.0`, matching the paths web clients already
/// call; `/health` sits outside the API prefix.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1.0/users", post(passport::register))
        .route(
            "/api/v1.0/session",
            post(passport::login)
                .get(passport::check_session)
                .delete(passport::logout),
        )
        .route("/health", get(health::live))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
