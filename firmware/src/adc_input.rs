//! ADC-backed analog input.
//!
//! # Pins
//!
//! Analog pins A0-A4 map to the RP2350B ADC inputs:
//!
//! | Pin | GPIO | ADC  |
//! |-----|------|------|
//! | A0  | 40   | ADC0 |
//! | A1  | 41   | ADC1 |
//! | A2  | 42   | ADC2 |
//! | A3  | 43   | ADC3 |
//! | A4  | 44   | ADC4 |

use chair_core::{AnalogInput, AnalogPin, InputError};
use embassy_rp::adc::{Adc, Blocking, Channel};

/// Number of wired analog pins.
pub const ADC_PIN_COUNT: usize = 5;

/// The ADC samples 12 bits; levels are reported in the 10-bit range the
/// thresholds are calibrated for.
const SAMPLE_SHIFT: u32 = 2;

/// [`AnalogInput`] reading the RP2350B ADC in blocking mode.
pub struct AdcInput<'d> {
    adc: Adc<'d, Blocking>,
    channels: [Channel<'d>; ADC_PIN_COUNT],
}

impl<'d> AdcInput<'d> {
    /// `channels[i]` is read for analog pin `Ai`.
    #[must_use]
    pub fn new(adc: Adc<'d, Blocking>, channels: [Channel<'d>; ADC_PIN_COUNT]) -> Self {
        Self { adc, channels }
    }
}

impl AnalogInput for AdcInput<'_> {
    fn read(&mut self, pin: AnalogPin) -> Result<u16, InputError> {
        let channel = self
            .channels
            .get_mut(pin.index())
            .ok_or(InputError::UnknownPin)?;
        self.adc
            .blocking_read(channel)
            .map(|raw| raw >> SAMPLE_SHIFT)
            .map_err(|_| InputError::Adc)
    }
}
