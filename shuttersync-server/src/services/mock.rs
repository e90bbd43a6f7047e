//! In-memory stand-ins for the roller and the host framework.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use shuttersync_api::{Characteristic, DeviceStatus};

use crate::errors::DeviceError;
use crate::services::{CharacteristicSink, RollerDevice};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockCommand {
    GoToPosition(u8),
    Stop,
}

/// Scripted roller: answers every call with the status set by the test.
pub struct MockDevice {
    status: Mutex<DeviceStatus>,
    latency: Duration,
    fail_status: AtomicBool,
    fail_commands: AtomicBool,
    status_calls: AtomicUsize,
    commands: Mutex<Vec<MockCommand>>,
}

impl MockDevice {
    pub fn new(status: DeviceStatus) -> Self {
        Self {
            status: Mutex::new(status),
            latency: Duration::ZERO,
            fail_status: AtomicBool::new(false),
            fail_commands: AtomicBool::new(false),
            status_calls: AtomicUsize::new(0),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn set_status(&self, status: DeviceStatus) {
        *self.status.lock().unwrap() = status;
    }

    pub fn fail_status(&self, fail: bool) {
        self.fail_status.store(fail, Ordering::SeqCst);
    }

    pub fn fail_commands(&self, fail: bool) {
        self.fail_commands.store(fail, Ordering::SeqCst);
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn commands(&self) -> Vec<MockCommand> {
        self.commands.lock().unwrap().clone()
    }

    async fn respond(&self) -> Result<DeviceStatus, DeviceError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(self.status.lock().unwrap().clone())
    }

    async fn command(&self, command: MockCommand) -> Result<DeviceStatus, DeviceError> {
        self.commands.lock().unwrap().push(command);
        if self.fail_commands.load(Ordering::SeqCst) {
            return Err(DeviceError::Transport("connection reset by peer".to_string()));
        }
        self.respond().await
    }
}

#[async_trait]
impl RollerDevice for MockDevice {
    async fn status(&self) -> Result<DeviceStatus, DeviceError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_status.load(Ordering::SeqCst) {
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            return Err(DeviceError::Transport("connection refused".to_string()));
        }
        self.respond().await
    }

    async fn go_to_position(&self, raw_position: u8) -> Result<DeviceStatus, DeviceError> {
        self.command(MockCommand::GoToPosition(raw_position)).await
    }

    async fn stop(&self) -> Result<DeviceStatus, DeviceError> {
        self.command(MockCommand::Stop).await
    }
}

/// Records every characteristic update in order.
#[derive(Default)]
pub struct RecordingSink {
    updates: Mutex<Vec<Characteristic>>,
}

impl RecordingSink {
    pub fn updates(&self) -> Vec<Characteristic> {
        self.updates.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<Characteristic> {
        std::mem::take(&mut *self.updates.lock().unwrap())
    }
}

impl CharacteristicSink for RecordingSink {
    fn update(&self, characteristic: Characteristic) {
        self.updates.lock().unwrap().push(characteristic);
    }
}
