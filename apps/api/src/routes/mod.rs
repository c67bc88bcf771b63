pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::assistant::handlers::handle_chat;
use crate::recommendation::handlers::handle_recommend;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/recommendations", post(handle_recommend))
        .route("/api/v1/assistant/chat", post(handle_chat))
        .with_state(state)
}
