use axum::Router;
use axum::response::IntoResponse;
use axum::routing::{get, post};

use crate::SharedDispatcher;

pub mod webhook;

pub fn router() -> Router<SharedDispatcher> {
    Router::new()
        .route("/", post(webhook::handler))
        .route("/health", get(health_handler))
}

pub async fn health_handler() -> impl IntoResponse {
    "OK"
}
