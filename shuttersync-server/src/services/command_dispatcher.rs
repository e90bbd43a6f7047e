use std::sync::Arc;
use std::time::Duration;

use shuttersync_api::{DeviceStatus, Direction, POSITION_CLOSED, POSITION_OPEN};
use tracing::{debug, error, info};

use crate::errors::DeviceError;
use crate::services::{Reconciler, RollerDevice, StatusCache};

/// Translates host requests into roller commands.
///
/// Commands only ever change the remembered target. The motion state moves
/// once a refresh confirms it.
pub struct CommandDispatcher {
    device: Arc<dyn RollerDevice>,
    cache: Arc<StatusCache>,
    reconciler: Arc<Reconciler>,
    /// Wait before refreshing after a failed command
    grace: Duration,
}

impl CommandDispatcher {
    pub fn new(
        device: Arc<dyn RollerDevice>,
        cache: Arc<StatusCache>,
        reconciler: Arc<Reconciler>,
        grace: Duration,
    ) -> Self {
        Self {
            device,
            cache,
            reconciler,
            grace,
        }
    }

    pub async fn set_target(&self, position: u8) -> Result<(), DeviceError> {
        if position > POSITION_OPEN {
            return Err(DeviceError::InvalidPosition(position));
        }

        info!("Setting target position '{}'", position);
        self.reconciler.record_target(position).await;

        let raw_position = self.reconciler.calibration().to_raw(position);
        debug!("Raw target position {}", raw_position);

        let result = self.device.go_to_position(raw_position).await;
        self.settle(result, "change target position").await
    }

    pub async fn stop(&self) -> Result<(), DeviceError> {
        info!("Stopping roller");
        let result = self.device.stop().await;
        self.settle(result, "stop roller").await
    }

    /// Switching on resumes travel away from the last direction, switching
    /// off stops.
    pub async fn toggle(&self, turn_on: bool) -> Result<(), DeviceError> {
        let status = self.cache.get_status(false).await?;

        if !turn_on {
            return self.stop().await;
        }

        match status.last_direction {
            Some(Direction::Open) => self.set_target(POSITION_CLOSED).await,
            _ => self.set_target(POSITION_OPEN).await,
        }
    }

    pub async fn hold_position(&self, hold: bool) -> Result<(), DeviceError> {
        debug!("Setting hold position to '{}'", hold);
        if !hold {
            return Ok(());
        }

        self.stop().await
    }

    async fn settle(
        &self,
        result: Result<DeviceStatus, DeviceError>,
        action: &str,
    ) -> Result<(), DeviceError> {
        match result {
            Ok(_) => {
                self.cache.refresh(true).await;
                Ok(())
            }
            Err(e) => {
                error!("Failed to {}: {}", action, e);
                tokio::time::sleep(self.grace).await;
                self.cache.refresh(true).await;
                Err(e.into_command_failure())
            }
        }
    }
}
