use super::DeviceError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Device error: {0}")]
    DeviceError(#[from] DeviceError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}
