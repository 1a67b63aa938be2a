//! Serial debug reporting.
//!
//! Debug text goes to a [`DebugSink`] at the debug interval, one line per
//! enabled flag. Lines are formatted into fixed-capacity strings; text beyond
//! [`DEBUG_LINE_LEN`] is dropped.

use core::fmt::Write;

use crate::bridge::BridgeStats;
use crate::config::DebugConfig;
use crate::types::{ButtonState, ControlState, JoystickState};
use heapless::String;

/// Capacity of one debug line.
pub const DEBUG_LINE_LEN: usize = 64;

/// One formatted debug line.
pub type DebugLine = String<DEBUG_LINE_LEN>;

/// Line-oriented text output (serial console on hardware).
pub trait DebugSink {
    /// Write one line; the sink appends its own line terminator.
    fn write_line(&mut self, text: &str);
}

impl<T: DebugSink + ?Sized> DebugSink for &mut T {
    fn write_line(&mut self, text: &str) {
        (**self).write_line(text)
    }
}

/// Sink that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDebugSink;

impl DebugSink for NullDebugSink {
    fn write_line(&mut self, _text: &str) {}
}

/// CAN line: frame counters and the most recent error.
#[must_use]
pub fn can_line(stats: &BridgeStats) -> DebugLine {
    let mut line = DebugLine::new();
    let _ = write!(
        line,
        "can: sent={} failed={}",
        stats.frames_sent, stats.transmit_failures
    );
    if let Some(error) = stats.last_error {
        let _ = write!(line, " last={:?}", error);
    }
    line
}

/// Buttons line: characters of the pressed buttons, lowest first.
#[must_use]
pub fn buttons_line(buttons: &ButtonState) -> DebugLine {
    let mut line = DebugLine::new();
    let _ = line.push_str("buttons:");
    if buttons.pressed.is_empty() {
        let _ = line.push_str(" none");
    }
    for c in buttons.pressed_characters() {
        let _ = write!(line, " {}", c);
    }
    line
}

/// Joystick line: normalized axes, or `absent`.
#[must_use]
pub fn joystick_line(joystick: &JoystickState) -> DebugLine {
    let mut line = DebugLine::new();
    if joystick.present {
        let _ = write!(line, "joystick: x={} y={}", joystick.x, joystick.y);
    } else {
        let _ = line.push_str("joystick: absent");
    }
    line
}

/// Writes the lines selected by a [`DebugConfig`].
#[derive(Clone, Copy, Debug)]
pub struct DebugReporter<'a> {
    config: &'a DebugConfig,
}

impl<'a> DebugReporter<'a> {
    #[must_use]
    pub const fn new(config: &'a DebugConfig) -> Self {
        Self { config }
    }

    /// Write one report; returns the number of lines written.
    pub fn report<D: DebugSink>(
        &self,
        sink: &mut D,
        state: &ControlState,
        stats: &BridgeStats,
    ) -> usize {
        let mut lines = 0;
        if self.config.can {
            sink.write_line(&can_line(stats));
            lines += 1;
        }
        if self.config.buttons {
            sink.write_line(&buttons_line(&state.buttons));
            lines += 1;
        }
        if self.config.joystick {
            sink.write_line(&joystick_line(&state.joystick));
            lines += 1;
        }
        lines
    }
}
