use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use tracing::debug;

use crate::services::Accessory;

#[derive(Clone)]
pub struct NotificationState {
    pub accessory: Arc<Accessory>,
}

/// Any request below `/status` is a push from the device. The refresh runs
/// in the background so the device is answered right away.
pub async fn handle_notification(
    State(state): State<NotificationState>,
    uri: Uri,
) -> impl IntoResponse {
    debug!("Handling notification payload for {}", uri);

    if !uri.path().starts_with("/status") {
        return (StatusCode::NOT_FOUND, "Not Found");
    }

    let accessory = state.accessory.clone();
    tokio::spawn(async move { accessory.notify().await });

    (StatusCode::OK, "OK")
}
