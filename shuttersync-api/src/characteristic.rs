use serde::{Deserialize, Serialize};

/// Motion state of a window covering, numbered the way the host framework
/// numbers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionState {
    Decreasing = 0,
    Increasing = 1,
    Stopped = 2,
}

impl PositionState {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn is_moving(&self) -> bool {
        !matches!(self, PositionState::Stopped)
    }
}

impl std::fmt::Display for PositionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionState::Decreasing => write!(f, "DECREASING"),
            PositionState::Increasing => write!(f, "INCREASING"),
            PositionState::Stopped => write!(f, "STOPPED"),
        }
    }
}

/// A single value pushed to the host framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "characteristic", content = "value", rename_all = "kebab-case")]
pub enum Characteristic {
    CurrentPosition(u8),
    TargetPosition(u8),
    /// `None` while the motion state is indeterminate
    PositionState(Option<PositionState>),
    ObstructionDetected(bool),
    /// State of the companion toggle switch, on while the roller moves
    On(bool),
}

/// Every readable characteristic of the accessory at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessorySnapshot {
    pub current_position: u8,
    pub target_position: u8,
    pub position_state: Option<PositionState>,
    pub obstruction_detected: bool,
    pub on: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessoryInfo {
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub address: String,
}

impl AccessoryInfo {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: "Allterco Robotics Ltd.".to_string(),
            model: "Shelly 2.5".to_string(),
            address: address.into(),
        }
    }
}
