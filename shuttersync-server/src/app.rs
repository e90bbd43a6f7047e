use std::sync::Arc;

use axum::Router;
use axum::routing::{get, put};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handles::*;
use crate::services::{Accessory, EventBus};

pub fn create_app(accessory: Arc<Accessory>, event_bus: EventBus) -> Router {
    let characteristics = Router::new()
        .route("/", get(get_accessory))
        .route("/current-position", get(get_current_position))
        .route(
            "/target-position",
            get(get_target_position).put(set_target_position),
        )
        .route("/position-state", get(get_position_state))
        .route("/obstruction-detected", get(get_obstruction_detected))
        .route("/hold-position", put(set_hold_position))
        .route("/on", get(get_on).put(set_on))
        .route("/events", get(characteristic_events))
        .with_state(AccessoryState {
            accessory,
            event_bus,
        });

    Router::new()
        .nest("/accessory", characteristics)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Listener for the device's push notifications.
pub fn create_notification_app(accessory: Arc<Accessory>) -> Router {
    Router::new()
        .fallback(handle_notification)
        .with_state(NotificationState { accessory })
        .layer(TraceLayer::new_for_http())
}
