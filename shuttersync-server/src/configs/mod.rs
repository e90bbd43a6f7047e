pub mod settings;

pub use settings::{Device, DeviceCalibration, Logger, Polling, Server, Settings};
