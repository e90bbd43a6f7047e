//! Mapping between the raw travel reported by the device and the logical
//! position exposed to the host.
//!
//! Some rollers keep travelling after the device already reports them as
//! closed: the slats touch down at raw position `touch_down` and everything
//! below that is compression. The logical scale starts at the touch-down
//! point, so that logical 1 is "barely open" instead of "still closed".
//!
//! Position 0 is never calibrated, in either direction.

use crate::POSITION_OPEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Calibration {
    touch_down: Option<u8>,
}

impl Calibration {
    pub const fn identity() -> Self {
        Self { touch_down: None }
    }

    /// Returns `None` unless `0 < touch_down < 100`.
    pub fn with_touch_down(touch_down: u8) -> Option<Self> {
        if touch_down > 0 && touch_down < POSITION_OPEN {
            Some(Self {
                touch_down: Some(touch_down),
            })
        } else {
            None
        }
    }

    pub fn touch_down(&self) -> Option<u8> {
        self.touch_down
    }

    pub fn is_identity(&self) -> bool {
        self.touch_down.is_none()
    }

    /// Logical position to the raw position sent to the device.
    pub fn to_raw(&self, logical: u8) -> u8 {
        let logical = logical.min(POSITION_OPEN);
        let Some(touch_down) = self.touch_down else {
            return logical;
        };
        if logical == 0 {
            return 0;
        }

        let touch_down = f64::from(touch_down);
        let range = f64::from(POSITION_OPEN) - touch_down;
        let raw = touch_down + f64::from(logical) / f64::from(POSITION_OPEN) * range;

        raw.max(0.0).round() as u8
    }

    /// Raw device position to the logical position reported to the host.
    ///
    /// A nonzero raw position never maps to logical 0.
    pub fn to_logical(&self, raw: u8) -> u8 {
        let raw = raw.min(POSITION_OPEN);
        let Some(touch_down) = self.touch_down else {
            return raw;
        };
        if raw == 0 {
            return 0;
        }

        let touch_down = f64::from(touch_down);
        let range = f64::from(POSITION_OPEN) - touch_down;
        let logical = (f64::from(raw) - touch_down) / range * f64::from(POSITION_OPEN);

        logical.max(1.0).round() as u8
    }
}
