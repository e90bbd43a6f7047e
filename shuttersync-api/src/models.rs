use serde::{Deserialize, Serialize};

use crate::characteristic::PositionState;

const OBSTACLE_STOP_REASON: &str = "obstacle";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollerState {
    /// Roller is at rest
    Stop,
    /// Roller is travelling towards fully open
    Open,
    /// Roller is travelling towards fully closed
    Close,
    /// Any state string the firmware reports that is not understood
    #[serde(untagged)]
    Other(String),
}

impl RollerState {
    pub fn as_str(&self) -> &str {
        match self {
            RollerState::Stop => "stop",
            RollerState::Open => "open",
            RollerState::Close => "close",
            RollerState::Other(state) => state.as_str(),
        }
    }
}

impl std::fmt::Display for RollerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Open,
    Close,
    #[serde(other)]
    Unknown,
}

/// Snapshot of `GET /roller/0`.
///
/// Replaced wholesale on every fetch, never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub state: RollerState,
    /// Raw travel position reported by the device
    pub current_pos: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_direction: Option<Direction>,
}

impl DeviceStatus {
    pub fn new(state: RollerState, current_pos: u8) -> Self {
        Self {
            state,
            current_pos,
            stop_reason: None,
            last_direction: None,
        }
    }

    pub fn with_stop_reason(mut self, reason: impl Into<String>) -> Self {
        self.stop_reason = Some(reason.into());
        self
    }

    pub fn with_last_direction(mut self, direction: Direction) -> Self {
        self.last_direction = Some(direction);
        self
    }

    pub fn is_stopped(&self) -> bool {
        self.state == RollerState::Stop
    }

    pub fn is_obstructed(&self) -> bool {
        self.stop_reason.as_deref() == Some(OBSTACLE_STOP_REASON)
    }

    /// Motion state as the host framework sees it, `None` when the firmware
    /// reports a state this crate does not know.
    pub fn position_state(&self) -> Option<PositionState> {
        match self.state {
            RollerState::Stop => Some(PositionState::Stopped),
            RollerState::Open => Some(PositionState::Increasing),
            RollerState::Close => Some(PositionState::Decreasing),
            RollerState::Other(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_device_payload() {
        let payload = r#"{
            "state": "close",
            "power": 0.0,
            "is_valid": true,
            "safety_switch": false,
            "overtemperature": false,
            "stop_reason": "normal",
            "last_direction": "close",
            "current_pos": 63,
            "calibrating": false,
            "positioning": true
        }"#;

        let status: DeviceStatus = serde_json::from_str(payload).unwrap();

        assert_eq!(status.state, RollerState::Close);
        assert_eq!(status.current_pos, 63);
        assert_eq!(status.stop_reason.as_deref(), Some("normal"));
        assert_eq!(status.last_direction, Some(Direction::Close));
        assert_eq!(status.position_state(), Some(PositionState::Decreasing));
        assert!(!status.is_obstructed());
    }

    #[test]
    fn test_parse_minimal_payload() {
        let status: DeviceStatus =
            serde_json::from_str(r#"{"state": "stop", "current_pos": 40}"#).unwrap();

        assert!(status.is_stopped());
        assert_eq!(status.stop_reason, None);
        assert_eq!(status.last_direction, None);
    }

    #[test]
    fn test_unknown_state_is_preserved() {
        let status: DeviceStatus =
            serde_json::from_str(r#"{"state": "calibrate", "current_pos": 0}"#).unwrap();

        assert_eq!(status.state, RollerState::Other("calibrate".to_string()));
        assert_eq!(status.state.to_string(), "calibrate");
        assert_eq!(status.position_state(), None);
        assert!(!status.is_stopped());
    }

    #[test]
    fn test_unknown_direction() {
        let status: DeviceStatus = serde_json::from_str(
            r#"{"state": "stop", "current_pos": 5, "last_direction": "sideways"}"#,
        )
        .unwrap();

        assert_eq!(status.last_direction, Some(Direction::Unknown));
    }

    #[test]
    fn test_obstacle_stop_reason() {
        let status = DeviceStatus::new(RollerState::Stop, 12).with_stop_reason("obstacle");
        assert!(status.is_obstructed());

        let status = DeviceStatus::new(RollerState::Stop, 12).with_stop_reason("overpower");
        assert!(!status.is_obstructed());
    }

    #[test]
    fn test_negative_position_is_rejected() {
        let result = serde_json::from_str::<DeviceStatus>(r#"{"state": "stop", "current_pos": -1}"#);
        assert!(result.is_err());
    }
}
