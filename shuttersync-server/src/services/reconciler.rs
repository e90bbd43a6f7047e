//! Turns raw roller status into the position triple the host expects.
//!
//! The device never reports where it is heading, only where it is and which
//! way it moves. The target is inferred: a motion that matches the target we
//! commanded ourselves is ours, anything else came from a wall switch and
//! is assumed to run to the end of travel.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use shuttersync_api::{
    Calibration, Characteristic, DeviceStatus, POSITION_CLOSED, POSITION_OPEN, PositionState,
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::services::{CharacteristicSink, StatusListener};

/// Largest difference between two logical positions still considered equal.
const POSITION_TOLERANCE: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionOrigin {
    /// Caused by a command of ours; `placeholder` is the position to show
    /// when no resting position is known.
    SelfInitiated { placeholder: u8 },
    /// Caused by something else; `endpoint` is where the roller will end up.
    ExternallyTriggered { endpoint: u8 },
}

/// Decides who started an observed movement.
pub fn classify_motion(
    observed: u8,
    remembered_target: Option<u8>,
    direction: PositionState,
) -> MotionOrigin {
    let (origin, endpoint) = match direction {
        PositionState::Increasing => (POSITION_CLOSED, POSITION_OPEN),
        PositionState::Decreasing => (POSITION_OPEN, POSITION_CLOSED),
        PositionState::Stopped => (observed, observed),
    };

    match remembered_target {
        Some(target) if target.abs_diff(observed) <= POSITION_TOLERANCE => {
            MotionOrigin::SelfInitiated {
                placeholder: origin,
            }
        }
        _ => MotionOrigin::ExternallyTriggered { endpoint },
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationState {
    /// Logical target, either commanded or inferred
    pub target_position: Option<u8>,
    /// Last logical position seen while stopped
    pub previous_position: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconciled {
    pub current_position: u8,
    pub target_position: u8,
    pub position_state: Option<PositionState>,
    pub obstructed: bool,
}

impl Reconciled {
    /// Anything but a confirmed stop counts as moving, matching
    /// `DeviceStatus::is_stopped`.
    pub fn is_moving(&self) -> bool {
        self.position_state != Some(PositionState::Stopped)
    }
}

/// One reconciliation pass, updating `state` in place.
pub fn reconcile(
    status: &DeviceStatus,
    calibration: &Calibration,
    state: &mut ReconciliationState,
) -> Reconciled {
    let obstructed = status.is_obstructed();
    let position_state = status.position_state();
    if position_state.is_none() {
        warn!("Unknown roller state '{}', motion is indeterminate", status.state);
    }

    let mut current_position = calibration.to_logical(status.current_pos);
    debug!("Reported current position {}", current_position);

    match position_state {
        Some(PositionState::Stopped) => {
            debug!(
                "Roller is stopped, so setting target position from {:?} to {}",
                state.target_position, current_position
            );
            state.target_position = Some(current_position);
            state.previous_position = Some(current_position);
        }
        Some(direction) => {
            debug!(
                "Remembered target {:?}, current {}",
                state.target_position, current_position
            );
            match classify_motion(current_position, state.target_position, direction) {
                MotionOrigin::SelfInitiated { placeholder } => {
                    debug!("Movement triggered by us");
                    // TODO: the placeholder makes the displayed position jump to an end
                    // of travel until the roller stops; interpolate from the travel time
                    current_position = state.previous_position.unwrap_or(placeholder);
                }
                MotionOrigin::ExternallyTriggered { endpoint } => {
                    debug!("Movement triggered by external switch");
                    state.target_position = Some(endpoint);
                }
            }
        }
        None => {}
    }

    let target_position = *state.target_position.get_or_insert(current_position);

    debug!(
        "Current is {}, target is {}, position state {:?}",
        current_position, target_position, position_state
    );

    Reconciled {
        current_position,
        target_position,
        position_state,
        obstructed,
    }
}

/// Owns the reconciliation state of one roller and publishes every pass.
pub struct Reconciler {
    calibration: Calibration,
    state: Mutex<ReconciliationState>,
    sink: Arc<dyn CharacteristicSink>,
}

impl Reconciler {
    pub fn new(calibration: Calibration, sink: Arc<dyn CharacteristicSink>) -> Self {
        Self {
            calibration,
            state: Mutex::new(ReconciliationState::default()),
            sink,
        }
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub async fn state(&self) -> ReconciliationState {
        self.state.lock().await.clone()
    }

    /// Optimistic target of a command that was just issued.
    pub async fn record_target(&self, target_position: u8) {
        self.state.lock().await.target_position = Some(target_position);
    }

    pub fn current_position(&self, status: &DeviceStatus) -> u8 {
        self.calibration.to_logical(status.current_pos)
    }

    /// Remembered target, falling back to (and remembering) the current
    /// position.
    pub async fn target_position(&self, status: &DeviceStatus) -> u8 {
        let current_position = self.current_position(status);
        *self
            .state
            .lock()
            .await
            .target_position
            .get_or_insert(current_position)
    }

    pub async fn apply(&self, status: &DeviceStatus) -> Reconciled {
        let reconciled = {
            let mut state = self.state.lock().await;
            reconcile(status, &self.calibration, &mut state)
        };

        debug!("Updating characteristics");
        self.sink
            .update(Characteristic::ObstructionDetected(reconciled.obstructed));
        self.sink
            .update(Characteristic::CurrentPosition(reconciled.current_position));
        self.sink
            .update(Characteristic::TargetPosition(reconciled.target_position));
        self.sink
            .update(Characteristic::PositionState(reconciled.position_state));
        self.sink.update(Characteristic::On(reconciled.is_moving()));

        reconciled
    }
}

#[async_trait]
impl StatusListener for Reconciler {
    async fn on_status(&self, status: &DeviceStatus) {
        self.apply(status).await;
    }
}
