use super::handlers;
use super::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Counter control
        .route("/counter", get(handlers::get_counter))
        .route("/counter/increment", post(handlers::increment))
        .route("/counter/decrement", post(handlers::decrement))
        .route("/counter/reset", post(handlers::reset))
        .route("/counter/save", post(handlers::save_session))
        // Session history
        .route("/sessions", get(handlers::list_sessions))
        .route("/sessions/:id", delete(handlers::delete_session))
        // Settings
        .route(
            "/settings",
            get(handlers::get_settings).put(handlers::update_settings),
        )
        // Voice counting
        .route("/voice/start", post(handlers::voice_start))
        .route("/voice/finish", post(handlers::voice_finish))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
