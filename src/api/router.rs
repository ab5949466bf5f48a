use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router<AppState> {
    // Device registration routes
    let device_routes = Router::new()
        .route("/", post(handlers::devices::register_device))
        .route("/", get(handlers::devices::get_devices))
        .route("/:device_uuid", delete(handlers::devices::remove_device));

    // News feed routes
    let news_routes = Router::new()
        .route("/", get(handlers::news::get_news_feed))
        .route("/:id", get(handlers::news::get_news_item));

    // Combine all routes
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health_check))
        .nest("/devices", device_routes)
        .nest("/news", news_routes)
        .with_state(state)
}
