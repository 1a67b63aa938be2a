//! ControlState to J1939 frame encoding.
//!
//! Field positions come from the configured [`PayloadLayout`]; with
//! [`PayloadLayout::DEFAULT`] the 8-byte payload is:
//!
//! ```text
//! byte 0   pressed buttons, bit i = button i
//! byte 1   X axis, i8 (two's complement)
//! byte 2   Y axis, i8
//! byte 3   status, bit 0 = joystick present
//! byte 4   character of the lowest pressed button (ASCII), 0 if none
//! byte 5-7 0xFF
//! ```
//!
//! Receivers decode by byte position, so positions only change through the
//! layout, never per message.

use crate::config::{CanConfig, PayloadLayout};
use crate::types::{Buttons, ControlState};
use j1939_proto::{J1939Frame, Payload, MAX_PAYLOAD_LEN};

/// Saturate a normalized axis value into one signed byte.
#[inline]
#[must_use]
pub fn axis_byte(value: i16) -> u8 {
    value.clamp(i16::from(i8::MIN), i16::from(i8::MAX)) as i8 as u8
}

/// Single-byte code for a button character; 0 if it does not fit in ASCII.
#[inline]
#[must_use]
pub fn character_byte(c: Option<char>) -> u8 {
    match c {
        Some(c) if c.is_ascii() => c as u8,
        _ => 0,
    }
}

/// Fields recovered from a payload by [`MessageEncoder::decode`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodedControl {
    pub buttons: Buttons,
    pub x: i8,
    pub y: i8,
    pub joystick_present: bool,
    /// Character byte, `None` when 0.
    pub character: Option<u8>,
}

/// Builds the bridge's J1939 frame from a [`ControlState`].
#[derive(Clone, Copy, Debug)]
pub struct MessageEncoder<'a> {
    config: &'a CanConfig,
}

impl<'a> MessageEncoder<'a> {
    #[must_use]
    pub const fn new(config: &'a CanConfig) -> Self {
        Self { config }
    }

    #[inline]
    #[must_use]
    pub const fn layout(&self) -> &PayloadLayout {
        &self.config.layout
    }

    /// Encode one snapshot.
    ///
    /// Pure: the same state always yields the same frame.
    #[must_use]
    pub fn encode(&self, state: &ControlState) -> J1939Frame {
        let layout = &self.config.layout;
        let len = usize::from(layout.len).min(MAX_PAYLOAD_LEN);
        let mut bytes = [layout.fill; MAX_PAYLOAD_LEN];

        let status = if state.joystick.present {
            PayloadLayout::STATUS_JOYSTICK_PRESENT
        } else {
            0
        };
        let fields = [
            (layout.buttons, state.buttons.pressed.raw()),
            (layout.x_axis, axis_byte(state.joystick.x)),
            (layout.y_axis, axis_byte(state.joystick.y)),
            (layout.status, status),
            (
                layout.character,
                character_byte(state.buttons.first_pressed_character()),
            ),
        ];
        for (pos, value) in fields {
            if let Some(byte) = bytes[..len].get_mut(usize::from(pos)) {
                *byte = value;
            }
        }

        // len is capped at the payload capacity above
        let payload = Payload::from_slice(&bytes[..len]).unwrap_or_default();
        J1939Frame::from_parts(
            self.config.priority,
            self.config.pgn,
            self.config.source_address,
            payload,
        )
    }

    /// Read the fields back out of a payload laid out by this encoder.
    ///
    /// Returns `None` if the payload is shorter than the layout.
    #[must_use]
    pub fn decode(&self, payload: &[u8]) -> Option<DecodedControl> {
        let layout = &self.config.layout;
        if payload.len() < usize::from(layout.len) {
            return None;
        }
        let byte = |pos: u8| payload.get(usize::from(pos)).copied();
        let character = byte(layout.character)?;
        Some(DecodedControl {
            buttons: Buttons(byte(layout.buttons)? & Buttons::ALL.raw()),
            x: byte(layout.x_axis)? as i8,
            y: byte(layout.y_axis)? as i8,
            joystick_present: (byte(layout.status)? & PayloadLayout::STATUS_JOYSTICK_PRESENT) != 0,
            character: (character != 0).then_some(character),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CHAIR_BREAKOUT;
    use crate::types::{ButtonState, JoystickState};
    use j1939_proto::{Frame, Id};

    const CHARS: [char; 5] = ['w', 'z', 't', 'u', 'v'];

    fn state(pressed: Buttons, joystick: JoystickState) -> ControlState {
        ControlState {
            buttons: ButtonState {
                pressed,
                characters: CHARS,
            },
            joystick,
        }
    }

    #[test]
    fn test_encode_button_press() {
        let encoder = MessageEncoder::new(&CHAIR_BREAKOUT.can);
        let frame = encoder.encode(&state(Buttons::BUTTON_1, JoystickState::ABSENT));

        assert_eq!(frame.identifier().raw(), 0x0CEF_0080);
        assert_eq!(
            frame.payload(),
            &[0x01, 0x00, 0x00, 0x00, b'w', 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_encode_neutral_state() {
        let encoder = MessageEncoder::new(&CHAIR_BREAKOUT.can);
        let frame = encoder.encode(&ControlState::neutral(CHARS));
        assert_eq!(frame.payload(), &[0, 0, 0, 0, 0, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_encode_joystick_axes() {
        let encoder = MessageEncoder::new(&CHAIR_BREAKOUT.can);
        let frame = encoder.encode(&state(Buttons::NONE, JoystickState::new(75, -75)));
        let data = frame.payload();
        assert_eq!(data[1], 75);
        assert_eq!(data[2] as i8, -75);
        assert_eq!(data[3], PayloadLayout::STATUS_JOYSTICK_PRESENT);
        assert_eq!(data[4], 0);
    }

    #[test]
    fn test_axis_byte_saturates() {
        assert_eq!(axis_byte(500) as i8, i8::MAX);
        assert_eq!(axis_byte(-500) as i8, i8::MIN);
        assert_eq!(axis_byte(-1), 0xFF);
    }

    #[test]
    fn test_character_byte() {
        assert_eq!(character_byte(Some('w')), b'w');
        assert_eq!(character_byte(Some('é')), 0);
        assert_eq!(character_byte(None), 0);
    }

    #[test]
    fn test_lowest_pressed_button_wins_character() {
        let encoder = MessageEncoder::new(&CHAIR_BREAKOUT.can);
        let frame = encoder.encode(&state(
            Buttons::BUTTON_3 | Buttons::BUTTON_5,
            JoystickState::ABSENT,
        ));
        assert_eq!(frame.payload()[0], 0b1_0100);
        assert_eq!(frame.payload()[4], b't');
    }

    #[test]
    fn test_byte_positions_are_stable() {
        // Changing one field never moves another
        let encoder = MessageEncoder::new(&CHAIR_BREAKOUT.can);
        let base = encoder.encode(&state(Buttons::NONE, JoystickState::new(10, 20)));
        let moved = encoder.encode(&state(Buttons::NONE, JoystickState::new(-30, 20)));

        for (i, (a, b)) in base.payload().iter().zip(moved.payload()).enumerate() {
            if i == 1 {
                assert_ne!(a, b);
            } else {
                assert_eq!(a, b, "byte {} changed", i);
            }
        }
    }

    #[test]
    fn test_custom_layout() {
        let mut can = CHAIR_BREAKOUT.can;
        can.layout = PayloadLayout {
            len: 5,
            buttons: 4,
            x_axis: 0,
            y_axis: 1,
            status: 2,
            character: 3,
            fill: 0,
        };
        let encoder = MessageEncoder::new(&can);
        let frame = encoder.encode(&state(Buttons::BUTTON_2, JoystickState::new(1, 2)));
        assert_eq!(frame.payload(), &[1, 2, 1, b'z', 0b10]);
        assert_eq!(frame.dlc(), 5);
    }

    #[test]
    fn test_frame_is_extended() {
        let encoder = MessageEncoder::new(&CHAIR_BREAKOUT.can);
        let frame = encoder.encode(&ControlState::neutral(CHARS));
        assert!(frame.is_extended());
        assert!(matches!(frame.id(), Id::Extended(id) if id.as_raw() == 0x0CEF_0080));
    }

    #[test]
    fn test_decode_recovers_fields() {
        let encoder = MessageEncoder::new(&CHAIR_BREAKOUT.can);
        let frame = encoder.encode(&state(Buttons::BUTTON_4, JoystickState::new(-12, 40)));
        let decoded = encoder.decode(frame.payload());
        assert_eq!(
            decoded,
            Some(DecodedControl {
                buttons: Buttons::BUTTON_4,
                x: -12,
                y: 40,
                joystick_present: true,
                character: Some(b'u'),
            })
        );
        assert_eq!(encoder.decode(&frame.payload()[..4]), None);
    }
}
