pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/stats", get(handlers::handle_stats))
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_end_session),
        )
        .route(
            "/api/v1/sessions/:id/profile",
            post(handlers::handle_submit_profile),
        )
        .route("/api/v1/sessions/:id/start", post(handlers::handle_start))
        .route(
            "/api/v1/sessions/:id/answers",
            post(handlers::handle_submit_answer),
        )
        .route(
            "/api/v1/sessions/:id/feedback",
            post(handlers::handle_submit_feedback),
        )
        .route(
            "/api/v1/sessions/:id/restart",
            post(handlers::handle_restart),
        )
        .with_state(state)
}
