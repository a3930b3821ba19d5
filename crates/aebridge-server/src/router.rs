//! Router assembly for the bridge.
//!
//! [`build_router`] routes `/` and every other path to the same method
//! dispatch, caps request bodies, and adds request-level tracing.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, MethodRouter};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the axum router for the bridge.
///
/// Methods other than GET and POST get axum's default 405.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.max_body_bytes;
    Router::new()
        .route("/", bridge_methods())
        .route("/{*path}", bridge_methods())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn bridge_methods() -> MethodRouter<AppState> {
    get(handlers::liveness::liveness).post(handlers::eval::eval_script)
}
