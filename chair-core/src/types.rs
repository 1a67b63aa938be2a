//! Core control types: Buttons, ButtonState, JoystickState, ControlState.

use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

/// Number of logical buttons on the button box.
pub const BUTTON_COUNT: usize = 5;

/// Button state represented as a bitfield.
///
/// Bit `i` is set when logical button `i` (0-based) is pressed.
///
/// # Example
///
/// ```
/// use chair_core::Buttons;
///
/// let buttons = Buttons::BUTTON_1 | Buttons::BUTTON_3;
/// assert!(buttons.contains(Buttons::BUTTON_1));
/// assert!(!buttons.contains(Buttons::BUTTON_2));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Buttons(pub u8);

impl Buttons {
    pub const BUTTON_1: Self = Self(1 << 0);
    pub const BUTTON_2: Self = Self(1 << 1);
    pub const BUTTON_3: Self = Self(1 << 2);
    pub const BUTTON_4: Self = Self(1 << 3);
    pub const BUTTON_5: Self = Self(1 << 4);

    /// No buttons pressed.
    pub const NONE: Self = Self(0);

    /// All valid button bits.
    pub const ALL: Self = Self((1 << BUTTON_COUNT) - 1);

    /// The button at `index`, or [`Buttons::NONE`] if out of range.
    #[inline]
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        if index < BUTTON_COUNT {
            Self(1 << index)
        } else {
            Self::NONE
        }
    }

    /// Check if the given button(s) are pressed.
    #[inline]
    #[must_use]
    pub const fn contains(self, button: Buttons) -> bool {
        (self.0 & button.0) == button.0
    }

    /// Set or clear button(s).
    #[inline]
    pub fn set(&mut self, button: Buttons, pressed: bool) {
        if pressed {
            self.0 |= button.0;
        } else {
            self.0 &= !button.0;
        }
    }

    /// Get the raw u8 value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Check if no buttons are pressed.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Buttons {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Buttons {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Buttons {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for Buttons {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl Not for Buttons {
    type Output = Self;

    #[inline]
    fn not(self) -> Self::Output {
        Self(!self.0 & Self::ALL.0)
    }
}

/// Pressed buttons together with the character each button is mapped to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonState {
    pub pressed: Buttons,
    pub characters: [char; BUTTON_COUNT],
}

impl ButtonState {
    /// No buttons pressed, using the given character mapping.
    #[must_use]
    pub const fn released(characters: [char; BUTTON_COUNT]) -> Self {
        Self {
            pressed: Buttons::NONE,
            characters,
        }
    }

    /// Whether button `index` is pressed.
    #[inline]
    #[must_use]
    pub fn is_pressed(&self, index: usize) -> bool {
        index < BUTTON_COUNT && self.pressed.contains(Buttons::from_index(index))
    }

    /// Character mapped to button `index`.
    #[inline]
    #[must_use]
    pub fn character(&self, index: usize) -> Option<char> {
        self.characters.get(index).copied()
    }

    /// Characters of all pressed buttons, lowest index first.
    pub fn pressed_characters(&self) -> impl Iterator<Item = char> + '_ {
        self.characters
            .iter()
            .enumerate()
            .filter(|&(i, _)| self.is_pressed(i))
            .map(|(_, &c)| c)
    }

    /// Character of the lowest-numbered pressed button.
    #[inline]
    #[must_use]
    pub fn first_pressed_character(&self) -> Option<char> {
        self.pressed_characters().next()
    }
}

/// Normalized joystick reading.
///
/// `x` and `y` lie in `[-range, +range]` of the configured axis range and are
/// both 0 whenever `present` is false.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JoystickState {
    pub x: i16,
    pub y: i16,
    pub present: bool,
}

impl JoystickState {
    /// No joystick attached.
    pub const ABSENT: Self = Self {
        x: 0,
        y: 0,
        present: false,
    };

    /// A present joystick at the given position.
    #[must_use]
    pub const fn new(x: i16, y: i16) -> Self {
        Self {
            x,
            y,
            present: true,
        }
    }
}

/// Snapshot of all inputs for one scheduler tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlState {
    pub buttons: ButtonState,
    pub joystick: JoystickState,
}

impl ControlState {
    /// Create a neutral state (no buttons pressed, no joystick).
    #[must_use]
    pub const fn neutral(characters: [char; BUTTON_COUNT]) -> Self {
        Self {
            buttons: ButtonState::released(characters),
            joystick: JoystickState::ABSENT,
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::vec::Vec;

    const CHARS: [char; BUTTON_COUNT] = ['w', 'z', 't', 'u', 'v'];

    #[test]
    fn test_buttons_bitwise_or() {
        let buttons = Buttons::BUTTON_1 | Buttons::BUTTON_2;
        assert!(buttons.contains(Buttons::BUTTON_1));
        assert!(buttons.contains(Buttons::BUTTON_2));
        assert!(!buttons.contains(Buttons::BUTTON_3));
    }

    #[test]
    fn test_buttons_set_clear() {
        let mut buttons = Buttons::NONE;
        buttons.set(Buttons::BUTTON_5, true);
        assert!(buttons.contains(Buttons::BUTTON_5));
        buttons.set(Buttons::BUTTON_5, false);
        assert!(buttons.is_empty());
    }

    #[test]
    fn test_buttons_not_stays_within_button_bits() {
        assert_eq!(!Buttons::NONE, Buttons::ALL);
        assert_eq!((!Buttons::BUTTON_1).raw(), 0b1_1110);
    }

    #[test]
    fn test_buttons_from_index_out_of_range() {
        assert_eq!(Buttons::from_index(4), Buttons::BUTTON_5);
        assert_eq!(Buttons::from_index(5), Buttons::NONE);
    }

    #[test]
    fn test_pressed_characters_in_index_order() {
        let state = ButtonState {
            pressed: Buttons::BUTTON_4 | Buttons::BUTTON_2,
            characters: CHARS,
        };
        let chars: Vec<char> = state.pressed_characters().collect();
        assert_eq!(chars, ['z', 'u']);
        assert_eq!(state.first_pressed_character(), Some('z'));
    }

    #[test]
    fn test_neutral_control_state() {
        let state = ControlState::neutral(CHARS);
        assert!(state.buttons.pressed.is_empty());
        assert_eq!(state.buttons.first_pressed_character(), None);
        assert_eq!(state.joystick, JoystickState::ABSENT);
    }
}
