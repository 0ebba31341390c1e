//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication middleware
//! - Validating request extractors
//! - Error rendering

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod validation;

use axum::Router;
use std::sync::Arc;
use tally_core::auth::SessionManager;
use tally_core::clock::Clock;
use tally_core::ledger::Ledger;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Session & token manager (also owns the identity service).
    pub sessions: Arc<SessionManager>,
    /// Ledger engine.
    pub ledger: Arc<Ledger>,
    /// Time source for the statistics' current year.
    pub clock: Arc<dyn Clock>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    routes::api_routes_with_state(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
