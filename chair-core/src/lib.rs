//! Platform-agnostic input sampling, J1939 encoding and scheduling for the
//! chair CAN bridge.
//!
//! This crate holds everything between the analog pins and the CAN
//! controller without depending on any board. It is used by the firmware on
//! target and tested on the host.
//!
//! # Overview
//!
//! - [`types`]: Control snapshot types ([`ControlState`], [`Buttons`], [`JoystickState`])
//! - [`config`]: Configuration and the built-in [`Profile`]s
//! - [`input`]: Analog input trait ([`AnalogInput`])
//! - [`presence`]: Joystick presence detection ([`PresenceDetector`])
//! - [`sampler`]: Raw pin levels to [`ControlState`] ([`InputSampler`])
//! - [`encoder`]: [`ControlState`] to J1939 frame ([`MessageEncoder`])
//! - [`transport`]: CAN controller trait and J1939 transport ([`CanController`], [`J1939Transport`])
//! - [`debug`]: Serial debug reporting ([`DebugSink`])
//! - [`bridge`]: The scheduler loop ([`ChairBridge`])
//!
//! # Data Flow
//!
//! ```text
//! pins -> InputSampler -> ControlState -> MessageEncoder -> J1939Transport -> CanController
//! ```
//!
//! [`ChairBridge`] samples every tick, transmits every
//! `message_interval_ms`, and writes debug lines every debug interval when a
//! debug flag is set.
//!
//! # Example
//!
//! ```
//! use chair_core::{AnalogInput, AnalogPin, ChairBridge, InputError, NullDebugSink, Profile};
//! use chair_core::{CanController, CanError, ExtendedId};
//!
//! struct Pins;
//!
//! impl AnalogInput for Pins {
//!     fn read(&mut self, pin: AnalogPin) -> Result<u16, InputError> {
//!         // Button 1 held, the rest idle
//!         Ok(if pin == AnalogPin::A0 { 406 } else { 572 })
//!     }
//! }
//!
//! struct Bus;
//!
//! impl CanController for Bus {
//!     fn initialize(&mut self, _baud: u32) -> Result<(), CanError> {
//!         Ok(())
//!     }
//!
//!     fn send_frame(&mut self, id: ExtendedId, data: &[u8]) -> Result<(), CanError> {
//!         assert_eq!(id.as_raw(), 0x0CEF_0080);
//!         assert_eq!(data[4], b'w');
//!         Ok(())
//!     }
//! }
//!
//! let config = Profile::ChairBreakout.config().buttons_only();
//! let mut bridge = ChairBridge::start(&config, Pins, Bus, NullDebugSink, 0).unwrap();
//! assert_eq!(bridge.tick(50).transmitted, Some(Ok(())));
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt logging and formatting (for embedded targets)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// Must come first so the logging macros are visible to every module
#[macro_use]
mod fmt;

pub mod bridge;
pub mod config;
pub mod debug;
pub mod encoder;
pub mod input;
pub mod presence;
pub mod sampler;
pub mod transport;
pub mod types;

// Re-export main types at crate root
pub use bridge::{BridgeError, BridgeStats, ChairBridge, Clock, IntervalGate, TickReport};
pub use config::{
    AnalogPin, BridgeConfig, ButtonArrayConfig, ButtonWiring, CanConfig, ConfigError, DebugConfig,
    JoystickConfig, PayloadLayout, Profile, CHAIR_BREAKOUT, STRESS_TEST,
};
pub use debug::{DebugLine, DebugReporter, DebugSink, NullDebugSink};
pub use encoder::{DecodedControl, MessageEncoder};
pub use input::{AnalogInput, InputError};
pub use presence::PresenceDetector;
pub use sampler::InputSampler;
pub use transport::{CanController, CanError, J1939Transport};
pub use types::{ButtonState, Buttons, ControlState, JoystickState, BUTTON_COUNT};

// Protocol types drivers and receivers need alongside the bridge
pub use j1939_proto::{ExtendedId, J1939Frame, J1939Id, Pgn, Priority};
