use std::sync::Arc;

use shuttersync_api::{AccessoryInfo, AccessorySnapshot, DeviceStatus, PositionState};
use tracing::{debug, info};

use crate::configs::Settings;
use crate::errors::{DeviceError, SettingError};
use crate::services::{
    CachePolicy, CharacteristicSink, CommandDispatcher, Reconciler, RefreshStrategy,
    RollerDevice, StatusCache,
};

/// A roller exposed as a window covering plus a toggle switch.
///
/// Reads go through the status cache; writes go through the dispatcher.
pub struct Accessory {
    info: AccessoryInfo,
    cache: Arc<StatusCache>,
    reconciler: Arc<Reconciler>,
    dispatcher: CommandDispatcher,
}

impl Accessory {
    pub fn new(
        settings: &Settings,
        device: Arc<dyn RollerDevice>,
        sink: Arc<dyn CharacteristicSink>,
    ) -> Result<Self, SettingError> {
        settings.device.validate()?;

        let calibration = settings.device.calibration();
        if let Some(touch_down) = calibration.touch_down() {
            debug!("Setting up calibration, touch down at {}", touch_down);
        }

        let strategy = match settings.device.notification_port {
            Some(_) => RefreshStrategy::Push,
            None => RefreshStrategy::Poll,
        };

        let reconciler = Arc::new(Reconciler::new(calibration, sink));
        let cache = StatusCache::new(
            device.clone(),
            CachePolicy::from_settings(&settings.polling, strategy),
            Some(reconciler.clone()),
        );
        let dispatcher = CommandDispatcher::new(
            device,
            cache.clone(),
            reconciler.clone(),
            settings.polling.command_grace(),
        );

        Ok(Self {
            info: AccessoryInfo::new(&settings.device.name, &settings.device.address),
            cache,
            reconciler,
            dispatcher,
        })
    }

    pub fn info(&self) -> &AccessoryInfo {
        &self.info
    }

    pub fn cache(&self) -> &Arc<StatusCache> {
        &self.cache
    }

    /// Initial forced refresh, which also starts the polling timer.
    pub async fn start(&self) {
        info!(
            "Starting accessory '{}' at {} ({:?} refresh)",
            self.info.name,
            self.info.address,
            self.cache.policy().strategy
        );
        self.cache.refresh(true).await;
    }

    pub async fn shutdown(&self) {
        self.cache.shutdown().await;
    }

    pub async fn notify(&self) {
        self.cache.notify().await;
    }

    async fn status(&self) -> Result<DeviceStatus, DeviceError> {
        self.cache.get_status(false).await
    }

    pub async fn current_position(&self) -> Result<u8, DeviceError> {
        let status = self.status().await?;
        Ok(self.reconciler.current_position(&status))
    }

    pub async fn target_position(&self) -> Result<u8, DeviceError> {
        let status = self.status().await?;
        Ok(self.reconciler.target_position(&status).await)
    }

    pub async fn position_state(&self) -> Result<Option<PositionState>, DeviceError> {
        let status = self.status().await?;
        let position_state = status.position_state();
        debug!("Position state for {} is {:?}", status.state, position_state);
        Ok(position_state)
    }

    pub async fn obstruction_detected(&self) -> Result<bool, DeviceError> {
        Ok(self.status().await?.is_obstructed())
    }

    /// Reading of the toggle switch.
    pub async fn is_moving(&self) -> Result<bool, DeviceError> {
        Ok(!self.status().await?.is_stopped())
    }

    pub async fn snapshot(&self) -> Result<AccessorySnapshot, DeviceError> {
        let status = self.status().await?;

        Ok(AccessorySnapshot {
            current_position: self.reconciler.current_position(&status),
            target_position: self.reconciler.target_position(&status).await,
            position_state: status.position_state(),
            obstruction_detected: status.is_obstructed(),
            on: !status.is_stopped(),
        })
    }

    pub async fn set_target_position(&self, position: u8) -> Result<(), DeviceError> {
        self.dispatcher.set_target(position).await
    }

    pub async fn set_hold_position(&self, hold: bool) -> Result<(), DeviceError> {
        self.dispatcher.hold_position(hold).await
    }

    pub async fn set_on(&self, on: bool) -> Result<(), DeviceError> {
        self.dispatcher.toggle(on).await
    }
}
