use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers::events::handle_events;
use crate::handlers::health::health_check;
use crate::handlers::interaction::handle_interaction;
use crate::handlers::AppState;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Slack interactive components (menus and buttons)
        .route("/interaction", post(handle_interaction))
        // Slack Events API (mentions of the bot)
        .route("/events", post(handle_events))
        .with_state(app_state)
}
