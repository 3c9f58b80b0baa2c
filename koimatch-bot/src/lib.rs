//! koimatch-bot library - registration and mutual-crush matching service
//!
//! Users register a name and birthday (over chat, step by step, or via
//! the structured registration endpoint), declare a crush target by
//! name and birthday, and both parties are notified when the interest
//! is mutual.

use std::sync::Arc;

use axum::Router;
use koimatch_common::notify::Notifier;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod matching;
pub mod registration;

use matching::MatchEngine;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Outbound notification dispatch (delivery is external)
    pub notifier: Arc<dyn Notifier>,
    /// Mutual-interest resolver
    pub matcher: Arc<MatchEngine>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, notifier: Arc<dyn Notifier>) -> Self {
        let matcher = Arc::new(MatchEngine::new(db.clone(), notifier.clone()));
        Self {
            db,
            notifier,
            matcher,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::post;

    Router::new()
        .route("/api/message", post(api::post_message))
        .route("/api/register", post(api::post_register))
        .route("/api/crush", post(api::post_crush))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
