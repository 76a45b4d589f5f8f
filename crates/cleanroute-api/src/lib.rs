//! HTTP surface over the optimizer: `POST /v1/runs`, `GET /v1/runs/{id}`,
//! plus `/v1/health` and `/v1/ready` (ambient addition to spec.md, modeled on
//! the teacher's `build_router`/`AppState` split between `lib.rs` and
//! `main.rs`).

pub mod error;
pub mod handlers;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(handlers::health))
        .route("/v1/ready", get(handlers::ready))
        .route("/v1/runs", post(handlers::create_run))
        .route("/v1/runs/{run_id}", get(handlers::get_run))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
