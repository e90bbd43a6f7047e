pub mod api;
pub mod device;
pub mod setting;

pub use api::ApiError;
pub use device::DeviceError;
pub use setting::SettingError;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::DeviceError(e) => (e.status_code(), e.to_string()),
            ApiError::InvalidRequest(message) => (StatusCode::BAD_REQUEST, message),
        };

        let mut error_obj = json!({
            "code": status.as_u16(),
            "message": error_message
        });

        // Server side failures are logged under an id the client can quote
        if status.is_server_error() {
            let error_id = Uuid::new_v4();
            tracing::error!(error_id = ?error_id, "Request failed: {}", error_message);
            error_obj["error_id"] = json!(error_id.to_string());
        }

        let body = Json(json!({
            "error": error_obj
        }));

        (status, body).into_response()
    }
}
