//! # Ringline Server
//!
//! The deployable binary: axum application exposing the REST bootstrap
//! surface and the WebSocket signaling endpoint, wired over the session,
//! signaling and users crates.

pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod state;
pub mod ws;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/register", post(http::register))
        .route("/login", post(http::login))
        .route("/users", get(http::list_users))
        .route("/call/:callee_id", post(http::initiate_call))
        .route("/call-status/:session_id", get(http::call_status))
        .route("/answer-call/:session_id", post(http::answer_call))
        .route("/reject-call/:session_id", post(http::reject_call))
        .route("/ws", get(ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
