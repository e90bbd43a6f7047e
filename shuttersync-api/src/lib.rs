pub mod calibration;
pub mod characteristic;
pub mod models;

pub use calibration::Calibration;
pub use characteristic::{AccessoryInfo, AccessorySnapshot, Characteristic, PositionState};
pub use models::{DeviceStatus, Direction, RollerState};

/// Lowest logical position, fully closed.
pub const POSITION_CLOSED: u8 = 0;

/// Highest logical position, fully open.
pub const POSITION_OPEN: u8 = 100;
