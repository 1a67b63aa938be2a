//! Bridge configuration and the built-in profiles.
//!
//! Configuration is fixed at build time: pick a [`Profile`] (or write your own
//! `const` [`BridgeConfig`]), narrow it to the inputs the board actually has
//! with [`BridgeConfig::buttons_only`] or [`BridgeConfig::joystick_only`], and
//! pass it by reference to [`ChairBridge::start`](crate::ChairBridge::start),
//! which validates it once.

use crate::types::BUTTON_COUNT;
use heapless::Vec;
use j1939_proto::{Pgn, Priority, MAX_PAYLOAD_LEN};

/// Analog input pin index (A0 = 0, A1 = 1, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnalogPin(pub u8);

impl AnalogPin {
    pub const A0: Self = Self(0);
    pub const A1: Self = Self(1);
    pub const A2: Self = Self(2);
    pub const A3: Self = Self(3);
    pub const A4: Self = Self(4);
    pub const A5: Self = Self(5);

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// How a button changes its input level when pressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonWiring {
    /// Level drops below the trigger level when pressed.
    ActiveLow,
    /// Level rises above the trigger level when pressed.
    ActiveHigh,
}

/// Five-button array configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonArrayConfig {
    /// Input pin for each logical button.
    pub pins: [AnalogPin; BUTTON_COUNT],
    /// Character reported for each logical button.
    pub characters: [char; BUTTON_COUNT],
    /// Threshold between released and pressed levels.
    pub trigger_level: u16,
    pub wiring: ButtonWiring,
    /// Minimum time a level change must persist before it is reported.
    /// 0 reports every sample as read.
    pub debounce_ms: u32,
}

/// Two-axis joystick configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JoystickConfig {
    pub x_pin: AnalogPin,
    pub y_pin: AnalogPin,
    /// Reference pin pulled high by an attached joystick.
    pub vref_pin: AnalogPin,
    /// Native raw range of the axis inputs.
    pub raw_min: u16,
    pub raw_max: u16,
    /// Normalized axes span `[-axis_range, +axis_range]`.
    pub axis_range: i16,
    /// `|value| <= center_dead_spot` is reported as 0.
    pub center_dead_spot: i16,
    /// Reference readings above this level mean a joystick is attached.
    pub present_level: u16,
    pub invert_x: bool,
    pub invert_y: bool,
    /// Largest per-tick axis step when `ramp` is enabled.
    pub throttle_increment: i16,
    pub ramp: bool,
}

/// Byte positions of each field in the CAN payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PayloadLayout {
    /// Frame length in bytes (DLC).
    pub len: u8,
    pub buttons: u8,
    pub x_axis: u8,
    pub y_axis: u8,
    pub status: u8,
    pub character: u8,
    /// Value written to bytes not used by any field.
    pub fill: u8,
}

impl PayloadLayout {
    /// Bit in the status byte set when a joystick is attached.
    pub const STATUS_JOYSTICK_PRESENT: u8 = 1 << 0;

    /// Buttons, X, Y, status, character in bytes 0-4; bytes 5-7 are 0xFF.
    pub const DEFAULT: Self = Self {
        len: 8,
        buttons: 0,
        x_axis: 1,
        y_axis: 2,
        status: 3,
        character: 4,
        fill: 0xFF,
    };

    const fn field_positions(&self) -> [u8; 5] {
        [
            self.buttons,
            self.x_axis,
            self.y_axis,
            self.status,
            self.character,
        ]
    }

    /// Check that every field fits in the frame and no two fields share a byte.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.len as usize > MAX_PAYLOAD_LEN {
            return Err(ConfigError::LayoutOutOfFrame);
        }
        let positions = self.field_positions();
        for (i, &pos) in positions.iter().enumerate() {
            if pos >= self.len {
                return Err(ConfigError::LayoutOutOfFrame);
            }
            if positions[i + 1..].contains(&pos) {
                return Err(ConfigError::LayoutOverlap);
            }
        }
        Ok(())
    }
}

/// J1939 addressing and transmission cadence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CanConfig {
    /// Bus bit rate in bit/s.
    pub bus_speed: u32,
    /// Time between transmissions.
    pub message_interval_ms: u32,
    pub priority: Priority,
    pub pgn: Pgn,
    pub source_address: u8,
    pub layout: PayloadLayout,
}

/// Serial debug reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebugConfig {
    /// Report CAN events.
    pub can: bool,
    /// Report button events.
    pub buttons: bool,
    /// Report joystick values.
    pub joystick: bool,
    /// Time between debug reports.
    pub interval_ms: u32,
}

impl DebugConfig {
    #[inline]
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.can || self.buttons || self.joystick
    }
}

/// Complete bridge configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BridgeConfig {
    pub buttons: Option<ButtonArrayConfig>,
    pub joystick: Option<JoystickConfig>,
    pub can: CanConfig,
    pub debug: DebugConfig,
}

/// Characters used when no button array is configured.
pub const NO_CHARACTERS: [char; BUTTON_COUNT] = ['\0'; BUTTON_COUNT];

impl BridgeConfig {
    /// Drop the joystick section.
    #[must_use]
    pub const fn buttons_only(mut self) -> Self {
        self.joystick = None;
        self
    }

    /// Drop the button array section.
    #[must_use]
    pub const fn joystick_only(mut self) -> Self {
        self.buttons = None;
        self
    }

    /// Characters mapped to each button.
    #[must_use]
    pub fn button_characters(&self) -> [char; BUTTON_COUNT] {
        self.buttons.map_or(NO_CHARACTERS, |b| b.characters)
    }

    /// Check the configuration for conflicts before the bridge starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buttons.is_none() && self.joystick.is_none() {
            return Err(ConfigError::NoInputs);
        }
        if self.can.message_interval_ms == 0
            || (self.debug.enabled() && self.debug.interval_ms == 0)
        {
            return Err(ConfigError::ZeroInterval);
        }
        if let Some(joystick) = &self.joystick {
            if joystick.axis_range <= 0 {
                return Err(ConfigError::ZeroAxisRange);
            }
            if joystick.raw_max <= joystick.raw_min {
                return Err(ConfigError::EmptyRawRange);
            }
        }
        self.check_pins()?;
        self.can.layout.validate()
    }

    fn check_pins(&self) -> Result<(), ConfigError> {
        let mut used: Vec<AnalogPin, 8> = Vec::new();
        let button_pins = self.buttons.as_ref().map(|b| &b.pins[..]).unwrap_or(&[]);
        let joystick_pins = self
            .joystick
            .as_ref()
            .map(|j| [j.x_pin, j.y_pin, j.vref_pin]);
        let joystick_pins = joystick_pins.as_ref().map(|p| &p[..]).unwrap_or(&[]);

        for &pin in button_pins.iter().chain(joystick_pins) {
            if used.contains(&pin) {
                return Err(ConfigError::PinConflict(pin));
            }
            used.push(pin).map_err(|_| ConfigError::PinConflict(pin))?;
        }
        Ok(())
    }
}

/// Configuration errors detected by [`BridgeConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The same pin is assigned to more than one input.
    PinConflict(AnalogPin),
    /// A transmission or debug interval is zero.
    ZeroInterval,
    /// Joystick axis range is not positive.
    ZeroAxisRange,
    /// Joystick raw range is empty.
    EmptyRawRange,
    /// Two payload fields share a byte.
    LayoutOverlap,
    /// A payload field lies outside the frame.
    LayoutOutOfFrame,
    /// Neither buttons nor joystick configured.
    NoInputs,
}

/// Button box: pins A0-A4; inputs sit around 572 and drop to about 406 when pressed.
const BUTTON_BOX: ButtonArrayConfig = ButtonArrayConfig {
    pins: [
        AnalogPin::A0,
        AnalogPin::A1,
        AnalogPin::A2,
        AnalogPin::A3,
        AnalogPin::A4,
    ],
    characters: ['w', 'z', 't', 'u', 'v'],
    trigger_level: 500,
    wiring: ButtonWiring::ActiveLow,
    debounce_ms: 0,
};

/// Joystick: Y on A0, X on A1, reference on A2, 10-bit inputs.
const JOYSTICK: JoystickConfig = JoystickConfig {
    x_pin: AnalogPin::A1,
    y_pin: AnalogPin::A0,
    vref_pin: AnalogPin::A2,
    raw_min: 0,
    raw_max: 1023,
    axis_range: 75,
    center_dead_spot: 0,
    present_level: 700,
    invert_x: false,
    invert_y: false,
    throttle_increment: 20,
    ramp: false,
};

/// Production breakout board profile.
pub const CHAIR_BREAKOUT: BridgeConfig = BridgeConfig {
    buttons: Some(BUTTON_BOX),
    joystick: Some(JOYSTICK),
    can: CanConfig {
        bus_speed: 500_000,
        message_interval_ms: 50,
        priority: Priority::CONTROL,
        pgn: Pgn::PROPRIETARY_A,
        source_address: 0x80,
        layout: PayloadLayout::DEFAULT,
    },
    debug: DebugConfig {
        can: false,
        buttons: false,
        joystick: false,
        interval_ms: 500,
    },
};

/// Bench profile: slower reporting with CAN events echoed to the serial console.
pub const STRESS_TEST: BridgeConfig = BridgeConfig {
    joystick: Some(JoystickConfig {
        throttle_increment: 10,
        ..JOYSTICK
    }),
    can: CanConfig {
        message_interval_ms: 100,
        ..CHAIR_BREAKOUT.can
    },
    debug: DebugConfig {
        can: true,
        buttons: false,
        joystick: false,
        interval_ms: 1000,
    },
    ..CHAIR_BREAKOUT
};

/// Named configuration profiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Profile {
    /// 50 ms CAN interval, debug output off.
    ChairBreakout,
    /// 100 ms CAN interval, CAN debug output on.
    StressTest,
}

impl Profile {
    #[must_use]
    pub const fn config(self) -> BridgeConfig {
        match self {
            Profile::ChairBreakout => CHAIR_BREAKOUT,
            Profile::StressTest => STRESS_TEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_need_narrowing_to_one_input() {
        // Button box and joystick share A0-A2
        assert_eq!(
            CHAIR_BREAKOUT.validate(),
            Err(ConfigError::PinConflict(AnalogPin::A1))
        );
        assert_eq!(CHAIR_BREAKOUT.buttons_only().validate(), Ok(()));
        assert_eq!(CHAIR_BREAKOUT.joystick_only().validate(), Ok(()));
        assert_eq!(STRESS_TEST.buttons_only().validate(), Ok(()));
        assert_eq!(STRESS_TEST.joystick_only().validate(), Ok(()));
    }

    #[test]
    fn test_profile_differences() {
        let breakout = Profile::ChairBreakout.config();
        let stress = Profile::StressTest.config();
        assert_eq!(breakout.can.message_interval_ms, 50);
        assert_eq!(stress.can.message_interval_ms, 100);
        assert!(!breakout.debug.enabled());
        assert!(stress.debug.can);
        assert_eq!(breakout.joystick.map(|j| j.throttle_increment), Some(20));
        assert_eq!(stress.joystick.map(|j| j.throttle_increment), Some(10));
        assert_eq!(stress.can.bus_speed, 500_000);
    }

    #[test]
    fn test_validate_rejects_no_inputs() {
        let config = CHAIR_BREAKOUT.buttons_only().joystick_only();
        assert_eq!(config.validate(), Err(ConfigError::NoInputs));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = CHAIR_BREAKOUT.buttons_only();
        config.can.message_interval_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroInterval));

        let mut config = CHAIR_BREAKOUT.buttons_only();
        config.debug.buttons = true;
        config.debug.interval_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroInterval));
    }

    #[test]
    fn test_validate_rejects_bad_joystick_ranges() {
        let mut config = CHAIR_BREAKOUT.joystick_only();
        if let Some(j) = config.joystick.as_mut() {
            j.axis_range = 0;
        }
        assert_eq!(config.validate(), Err(ConfigError::ZeroAxisRange));

        let mut config = CHAIR_BREAKOUT.joystick_only();
        if let Some(j) = config.joystick.as_mut() {
            j.raw_max = j.raw_min;
        }
        assert_eq!(config.validate(), Err(ConfigError::EmptyRawRange));
    }

    #[test]
    fn test_layout_validation() {
        assert_eq!(PayloadLayout::DEFAULT.validate(), Ok(()));

        let overlap = PayloadLayout {
            y_axis: 1,
            ..PayloadLayout::DEFAULT
        };
        assert_eq!(overlap.validate(), Err(ConfigError::LayoutOverlap));

        let short = PayloadLayout {
            len: 4,
            ..PayloadLayout::DEFAULT
        };
        assert_eq!(short.validate(), Err(ConfigError::LayoutOutOfFrame));

        let long = PayloadLayout {
            len: 9,
            ..PayloadLayout::DEFAULT
        };
        assert_eq!(long.validate(), Err(ConfigError::LayoutOutOfFrame));
    }

    #[test]
    fn test_button_characters_without_buttons() {
        assert_eq!(
            CHAIR_BREAKOUT.button_characters(),
            ['w', 'z', 't', 'u', 'v']
        );
        assert_eq!(
            CHAIR_BREAKOUT.joystick_only().button_characters(),
            NO_CHARACTERS
        );
    }
}
