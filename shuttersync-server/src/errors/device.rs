use axum::http::StatusCode;

/// Failures talking to the roller.
///
/// `Clone` so a single failed fetch can be handed to every queued waiter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("Device unreachable: {0}")]
    Transport(String),

    #[error("Malformed device response: {0}")]
    Protocol(String),

    #[error("Device failed to apply command: {0}")]
    CommandFailure(String),

    #[error("Invalid position {0}, expected a value between 0 and 100")]
    InvalidPosition(u8),
}

impl DeviceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DeviceError::Transport(_) => StatusCode::BAD_GATEWAY,
            DeviceError::Protocol(_) => StatusCode::BAD_GATEWAY,
            DeviceError::CommandFailure(_) => StatusCode::BAD_GATEWAY,
            DeviceError::InvalidPosition(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn into_command_failure(self) -> Self {
        match self {
            DeviceError::Transport(message) | DeviceError::Protocol(message) => {
                DeviceError::CommandFailure(message)
            }
            other => other,
        }
    }
}

impl From<reqwest::Error> for DeviceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DeviceError::Protocol(err.to_string())
        } else if let Some(status) = err.status() {
            DeviceError::Protocol(format!("HTTP {status}"))
        } else {
            DeviceError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DeviceError {
    fn from(err: serde_json::Error) -> Self {
        DeviceError::Protocol(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failure_conversion() {
        let err = DeviceError::Transport("connection refused".to_string());
        assert_eq!(
            err.into_command_failure(),
            DeviceError::CommandFailure("connection refused".to_string())
        );

        let err = DeviceError::InvalidPosition(120);
        assert_eq!(err.clone().into_command_failure(), err);
    }

    #[test]
    fn test_json_error_is_protocol_error() {
        let err: DeviceError = serde_json::from_str::<serde_json::Value>("<html>")
            .unwrap_err()
            .into();
        assert!(matches!(err, DeviceError::Protocol(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }
}
