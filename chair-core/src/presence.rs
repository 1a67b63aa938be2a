//! Joystick presence detection from the reference pin.
//!
//! An attached joystick pulls its reference pin above `present_level`. The
//! threshold has no hysteresis and is re-evaluated every tick, so presence can
//! flicker while the level sits near the threshold.

use crate::config::{AnalogPin, JoystickConfig};
use crate::input::{AnalogInput, InputError};

/// Decides whether a joystick is attached.
#[derive(Clone, Copy, Debug)]
pub struct PresenceDetector {
    vref_pin: AnalogPin,
    present_level: u16,
}

impl PresenceDetector {
    #[must_use]
    pub const fn new(config: &JoystickConfig) -> Self {
        Self {
            vref_pin: config.vref_pin,
            present_level: config.present_level,
        }
    }

    /// Whether a raw reference level indicates an attached joystick.
    #[inline]
    #[must_use]
    pub const fn is_present_level(&self, raw: u16) -> bool {
        raw > self.present_level
    }

    /// Read the reference pin once.
    pub fn read<I: AnalogInput>(&self, input: &mut I) -> Result<bool, InputError> {
        input.read(self.vref_pin).map(|raw| self.is_present_level(raw))
    }

    /// Read the reference pin once; a failed read counts as absent.
    pub fn is_joystick_present<I: AnalogInput>(&self, input: &mut I) -> bool {
        self.read(input).unwrap_or(false)
    }
}
