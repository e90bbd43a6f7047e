use std::env;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use shuttersync_api::Calibration;

use crate::errors::SettingError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceCalibration {
    pub touch_down_position: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub name: String,
    /// Host or `host:port` of the roller, without scheme
    pub address: String,
    /// `user:password` sent as basic auth
    pub authentication: Option<String>,
    /// Port of the push listener, polling is used when absent
    pub notification_port: Option<u16>,
    #[serde(default)]
    pub calibration: DeviceCalibration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Polling {
    pub moving_interval_ms: u64,
    pub idle_interval_ms: u64,
    pub command_grace_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub device: Device,
    #[serde(default)]
    pub polling: Polling,
}

impl Default for Polling {
    fn default() -> Self {
        Self {
            moving_interval_ms: 5000,
            idle_interval_ms: 10000,
            command_grace_ms: 3000,
        }
    }
}

impl Polling {
    pub fn moving_interval(&self) -> Duration {
        Duration::from_millis(self.moving_interval_ms)
    }

    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }

    pub fn command_grace(&self) -> Duration {
        Duration::from_millis(self.command_grace_ms)
    }
}

impl Device {
    pub fn validate(&self) -> Result<(), SettingError> {
        if self.address.trim().is_empty() {
            return Err(SettingError::MissingAddress);
        }

        Ok(())
    }

    /// Out of range touch-down positions fall back to the identity mapping.
    pub fn calibration(&self) -> Calibration {
        match self.calibration.touch_down_position {
            Some(touch_down) => Calibration::with_touch_down(touch_down).unwrap_or_else(|| {
                tracing::warn!(
                    "Ignoring touch down position {}, expected a value between 1 and 99",
                    touch_down
                );
                Calibration::identity()
            }),
            None => Calibration::identity(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, SettingError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let settings = Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Environment::with_prefix("SHUTTERSYNC").separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    pub fn from_toml(source: &str) -> Result<Self, SettingError> {
        let settings = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }
}
