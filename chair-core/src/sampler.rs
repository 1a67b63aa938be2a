//! Input sampling: raw pin levels to a normalized [`ControlState`].
//!
//! Every call to [`InputSampler::sample`] reads each configured pin once and
//! produces a fresh snapshot. Nothing read here is fatal: out-of-range levels
//! are clamped, and a failed read leaves its button released, its axis
//! centred, or the joystick absent.

use crate::config::{AnalogPin, BridgeConfig, ButtonArrayConfig, ButtonWiring, JoystickConfig};
use crate::input::{AnalogInput, InputError};
use crate::presence::PresenceDetector;
use crate::types::{ButtonState, Buttons, ControlState, JoystickState, BUTTON_COUNT};

/// Whether a raw button level reads as pressed.
#[inline]
#[must_use]
pub fn button_pressed(raw: u16, config: &ButtonArrayConfig) -> bool {
    match config.wiring {
        ButtonWiring::ActiveLow => raw < config.trigger_level,
        ButtonWiring::ActiveHigh => raw > config.trigger_level,
    }
}

/// Map a raw axis level onto `[-axis_range, +axis_range]`.
///
/// The raw level is clamped to `[raw_min, raw_max]` and mapped linearly,
/// symmetric about the midpoint of the raw range, so the midpoint maps to 0.
/// The result is then inverted if requested and collapsed to 0 when its
/// magnitude is within `center_dead_spot`.
#[must_use]
pub fn normalize_axis(raw: u16, invert: bool, config: &JoystickConfig) -> i16 {
    let min = i32::from(config.raw_min);
    let max = i32::from(config.raw_max);
    let range = i32::from(config.axis_range);
    let span = max - min;
    if span <= 0 || range <= 0 {
        return 0;
    }

    // Doubled offset from the midpoint keeps odd spans exact
    let raw = i32::from(raw).clamp(min, max);
    let offset = 2 * (raw - min) - span;
    let mut value = (offset * range / span).clamp(-range, range);

    if invert {
        value = -value;
    }
    if value.abs() <= i32::from(config.center_dead_spot) {
        value = 0;
    }
    value as i16
}

/// Move `current` toward `target` by at most `step`.
///
/// A target of 0 is returned immediately so stopping is never delayed.
/// A non-positive step disables ramping.
#[inline]
#[must_use]
pub fn ramp_toward(current: i16, target: i16, step: i16) -> i16 {
    if target == 0 || step <= 0 {
        return target;
    }
    let delta = (i32::from(target) - i32::from(current)).clamp(-i32::from(step), i32::from(step));
    (i32::from(current) + delta) as i16
}

/// Minimum-hold-time filter for one button.
#[derive(Clone, Copy, Debug, Default)]
struct Debounce {
    stable: bool,
    candidate: bool,
    since_ms: u64,
}

impl Debounce {
    fn update(&mut self, raw: bool, now_ms: u64, hold_ms: u32) -> bool {
        if hold_ms == 0 {
            self.stable = raw;
            self.candidate = raw;
            return raw;
        }
        if raw != self.candidate {
            self.candidate = raw;
            self.since_ms = now_ms;
        }
        if self.candidate != self.stable
            && now_ms.saturating_sub(self.since_ms) >= u64::from(hold_ms)
        {
            self.stable = self.candidate;
        }
        self.stable
    }
}

/// Produces one [`ControlState`] per scheduler tick.
pub struct InputSampler<'a> {
    config: &'a BridgeConfig,
    presence: Option<PresenceDetector>,
    debounce: [Debounce; BUTTON_COUNT],
    /// Last reported axes (ramp memory).
    axes: (i16, i16),
    sensor_faults: u32,
}

impl<'a> InputSampler<'a> {
    #[must_use]
    pub fn new(config: &'a BridgeConfig) -> Self {
        Self {
            config,
            presence: config.joystick.as_ref().map(PresenceDetector::new),
            debounce: [Debounce::default(); BUTTON_COUNT],
            axes: (0, 0),
            sensor_faults: 0,
        }
    }

    /// Total failed pin reads since creation.
    #[inline]
    #[must_use]
    pub fn sensor_faults(&self) -> u32 {
        self.sensor_faults
    }

    /// Read all configured inputs once and build this tick's snapshot.
    pub fn sample<I: AnalogInput>(&mut self, input: &mut I, now_ms: u64) -> ControlState {
        let config = self.config;
        let pressed = match &config.buttons {
            Some(buttons) => self.sample_buttons(input, buttons, now_ms),
            None => Buttons::NONE,
        };
        let joystick = match &config.joystick {
            Some(joystick) => self.sample_joystick(input, joystick),
            None => JoystickState::ABSENT,
        };

        ControlState {
            buttons: ButtonState {
                pressed,
                characters: config.button_characters(),
            },
            joystick,
        }
    }

    fn sample_buttons<I: AnalogInput>(
        &mut self,
        input: &mut I,
        config: &ButtonArrayConfig,
        now_ms: u64,
    ) -> Buttons {
        let mut pressed = Buttons::NONE;
        for (i, &pin) in config.pins.iter().enumerate() {
            let raw_pressed = match input.read(pin) {
                Ok(raw) => button_pressed(raw, config),
                Err(e) => {
                    self.record_fault(e);
                    false
                }
            };
            let stable = self.debounce[i].update(raw_pressed, now_ms, config.debounce_ms);
            pressed.set(Buttons::from_index(i), stable);
        }
        pressed
    }

    fn sample_joystick<I: AnalogInput>(
        &mut self,
        input: &mut I,
        config: &JoystickConfig,
    ) -> JoystickState {
        let present = match self.presence.map(|p| p.read(input)) {
            Some(Ok(present)) => present,
            Some(Err(e)) => {
                self.record_fault(e);
                false
            }
            None => false,
        };

        // An unplugged joystick must not inject stray motion
        let (target_x, target_y) = if present {
            (
                self.read_axis(input, config, config.x_pin, config.invert_x),
                self.read_axis(input, config, config.y_pin, config.invert_y),
            )
        } else {
            (0, 0)
        };

        let (x, y) = if config.ramp {
            (
                ramp_toward(self.axes.0, target_x, config.throttle_increment),
                ramp_toward(self.axes.1, target_y, config.throttle_increment),
            )
        } else {
            (target_x, target_y)
        };
        self.axes = (x, y);

        JoystickState { x, y, present }
    }

    fn read_axis<I: AnalogInput>(
        &mut self,
        input: &mut I,
        config: &JoystickConfig,
        pin: AnalogPin,
        invert: bool,
    ) -> i16 {
        match input.read(pin) {
            Ok(raw) => normalize_axis(raw, invert, config),
            Err(e) => {
                self.record_fault(e);
                0
            }
        }
    }

    fn record_fault(&mut self, error: InputError) {
        self.sensor_faults = self.sensor_faults.saturating_add(1);
        warn!("Sensor read failed: {:?}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CHAIR_BREAKOUT;

    /// Fixed level per pin index.
    struct PinLevels([Result<u16, InputError>; 8]);

    impl PinLevels {
        fn all(level: u16) -> Self {
            Self([Ok(level); 8])
        }

        fn set(&mut self, pin: AnalogPin, level: u16) {
            self.0[pin.index()] = Ok(level);
        }

        fn fail(&mut self, pin: AnalogPin) {
            self.0[pin.index()] = Err(InputError::Adc);
        }
    }

    impl AnalogInput for PinLevels {
        fn read(&mut self, pin: AnalogPin) -> Result<u16, InputError> {
            self.0.get(pin.index()).copied().unwrap_or(Err(InputError::UnknownPin))
        }
    }

    fn joystick_config() -> JoystickConfig {
        CHAIR_BREAKOUT.joystick.unwrap()
    }

    #[test]
    fn test_button_pressed_below_trigger() {
        // Buttons idle around 572 and drop to about 406 when pressed
        let config = CHAIR_BREAKOUT.buttons_only();
        let mut sampler = InputSampler::new(&config);
        let mut input = PinLevels::all(572);
        input.set(AnalogPin::A0, 406);

        let state = sampler.sample(&mut input, 0);
        assert!(state.buttons.is_pressed(0));
        assert_eq!(state.buttons.pressed, Buttons::BUTTON_1);
        assert_eq!(state.buttons.first_pressed_character(), Some('w'));
    }

    #[test]
    fn test_button_active_high_wiring() {
        let mut config = CHAIR_BREAKOUT.buttons_only();
        if let Some(b) = config.buttons.as_mut() {
            b.wiring = ButtonWiring::ActiveHigh;
        }
        let mut sampler = InputSampler::new(&config);
        let mut input = PinLevels::all(406);
        input.set(AnalogPin::A3, 700);

        let state = sampler.sample(&mut input, 0);
        assert_eq!(state.buttons.pressed, Buttons::BUTTON_4);
        assert_eq!(state.buttons.first_pressed_character(), Some('u'));
    }

    #[test]
    fn test_normalize_midpoint_is_zero() {
        let config = joystick_config();
        assert_eq!(normalize_axis(512, false, &config), 0);
        assert_eq!(normalize_axis(511, false, &config), 0);
    }

    #[test]
    fn test_normalize_extremes() {
        let config = joystick_config();
        assert_eq!(normalize_axis(0, false, &config), -75);
        assert_eq!(normalize_axis(1023, false, &config), 75);
        assert_eq!(normalize_axis(1023, true, &config), -75);
    }

    #[test]
    fn test_normalize_clamps_out_of_range_raw() {
        let mut config = joystick_config();
        config.raw_min = 100;
        assert_eq!(normalize_axis(0, false, &config), -75);
        assert_eq!(normalize_axis(4095, false, &config), 75);
    }

    #[test]
    fn test_normalize_stays_within_axis_range() {
        for range in [1i16, 75, 127] {
            let mut config = joystick_config();
            config.axis_range = range;
            for raw in 0..=1100u16 {
                let value = normalize_axis(raw, false, &config);
                assert!((-range..=range).contains(&value), "raw {} -> {}", raw, value);
            }
        }
    }

    #[test]
    fn test_normalize_dead_spot_collapses_to_zero() {
        let mut config = joystick_config();
        config.center_dead_spot = 10;
        let mut saw_nonzero = false;
        for raw in 0..=1023u16 {
            let value = normalize_axis(raw, false, &config);
            assert!(value == 0 || value.abs() > 10, "raw {} -> {}", raw, value);
            saw_nonzero |= value != 0;
        }
        assert!(saw_nonzero);
        // 10 steps of 75 above centre is roughly 68 raw counts
        assert_eq!(normalize_axis(512 + 60, false, &config), 0);
    }

    #[test]
    fn test_joystick_present_and_centred() {
        let config = CHAIR_BREAKOUT.joystick_only();
        let mut sampler = InputSampler::new(&config);
        let mut input = PinLevels::all(512);
        input.set(AnalogPin::A2, 750);

        let state = sampler.sample(&mut input, 0);
        assert_eq!(state.joystick, JoystickState::new(0, 0));
    }

    #[test]
    fn test_joystick_axes_follow_pins() {
        let config = CHAIR_BREAKOUT.joystick_only();
        let mut sampler = InputSampler::new(&config);
        let mut input = PinLevels::all(512);
        input.set(AnalogPin::A2, 900);
        input.set(AnalogPin::A1, 1023); // X
        input.set(AnalogPin::A0, 0); // Y

        let state = sampler.sample(&mut input, 0);
        assert_eq!(state.joystick, JoystickState::new(75, -75));
    }

    #[test]
    fn test_absent_joystick_zeroes_axes() {
        let config = CHAIR_BREAKOUT.joystick_only();
        let mut sampler = InputSampler::new(&config);
        for vref in [0u16, 350, 700] {
            let mut input = PinLevels::all(1023);
            input.set(AnalogPin::A2, vref);
            input.set(AnalogPin::A0, 0);

            let state = sampler.sample(&mut input, 0);
            assert!(!state.joystick.present);
            assert_eq!((state.joystick.x, state.joystick.y), (0, 0));
        }
    }

    #[test]
    fn test_read_failures_are_absorbed() {
        let config = CHAIR_BREAKOUT.buttons_only();
        let mut sampler = InputSampler::new(&config);
        let mut input = PinLevels::all(406);
        input.fail(AnalogPin::A1);

        let state = sampler.sample(&mut input, 0);
        assert!(state.buttons.is_pressed(0));
        assert!(!state.buttons.is_pressed(1));
        assert_eq!(sampler.sensor_faults(), 1);

        let config = CHAIR_BREAKOUT.joystick_only();
        let mut sampler = InputSampler::new(&config);
        let mut input = PinLevels::all(1023);
        input.fail(AnalogPin::A1);

        let state = sampler.sample(&mut input, 0);
        assert_eq!(state.joystick, JoystickState::new(0, 75));
        assert_eq!(sampler.sensor_faults(), 1);

        input.fail(AnalogPin::A2);
        let state = sampler.sample(&mut input, 0);
        assert_eq!(state.joystick, JoystickState::ABSENT);
        assert_eq!(sampler.sensor_faults(), 2);
    }

    #[test]
    fn test_debounce_requires_hold_time() {
        let mut config = CHAIR_BREAKOUT.buttons_only();
        if let Some(b) = config.buttons.as_mut() {
            b.debounce_ms = 20;
        }
        let mut sampler = InputSampler::new(&config);
        let mut input = PinLevels::all(572);

        input.set(AnalogPin::A0, 406);
        assert!(!sampler.sample(&mut input, 100).buttons.is_pressed(0));
        assert!(!sampler.sample(&mut input, 110).buttons.is_pressed(0));
        assert!(sampler.sample(&mut input, 120).buttons.is_pressed(0));

        // A short bounce back to idle is ignored
        input.set(AnalogPin::A0, 572);
        assert!(sampler.sample(&mut input, 125).buttons.is_pressed(0));
        input.set(AnalogPin::A0, 406);
        assert!(sampler.sample(&mut input, 130).buttons.is_pressed(0));

        input.set(AnalogPin::A0, 572);
        assert!(sampler.sample(&mut input, 140).buttons.is_pressed(0));
        assert!(!sampler.sample(&mut input, 160).buttons.is_pressed(0));
    }

    #[test]
    fn test_ramp_limits_step_and_snaps_to_zero() {
        assert_eq!(ramp_toward(0, 75, 20), 20);
        assert_eq!(ramp_toward(60, 75, 20), 75);
        assert_eq!(ramp_toward(20, -75, 20), 0);
        assert_eq!(ramp_toward(60, 0, 20), 0);
        assert_eq!(ramp_toward(0, 75, 0), 75);
    }

    #[test]
    fn test_sampler_ramps_axes_when_enabled() {
        let mut config = CHAIR_BREAKOUT.joystick_only();
        if let Some(j) = config.joystick.as_mut() {
            j.ramp = true;
        }
        let mut sampler = InputSampler::new(&config);
        let mut input = PinLevels::all(512);
        input.set(AnalogPin::A2, 900);
        input.set(AnalogPin::A1, 1023);

        let xs: [i16; 5] = core::array::from_fn(|_| sampler.sample(&mut input, 0).joystick.x);
        assert_eq!(xs, [20, 40, 60, 75, 75]);

        // Unplugging stops immediately
        input.set(AnalogPin::A2, 0);
        assert_eq!(sampler.sample(&mut input, 0).joystick, JoystickState::ABSENT);
    }
}
