//! Analog input trait and error types.

use crate::config::AnalogPin;

/// Error type for input reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputError {
    /// ADC conversion failed.
    Adc,
    /// No channel is wired to the requested pin.
    UnknownPin,
}

/// Source of raw analog pin levels.
///
/// Implementations return the level in the native range the configuration
/// expects (10-bit, `0..=1023`, for the built-in profiles). Reads must be
/// synchronous and bounded in time; they are made from the scheduler loop.
pub trait AnalogInput {
    /// Read the current raw level of `pin`.
    fn read(&mut self, pin: AnalogPin) -> Result<u16, InputError>;
}

impl<T: AnalogInput + ?Sized> AnalogInput for &mut T {
    fn read(&mut self, pin: AnalogPin) -> Result<u16, InputError> {
        (**self).read(pin)
    }
}
