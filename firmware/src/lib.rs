//! Chair button box / joystick to J1939 CAN bridge for RP2350B.
//!
//! This crate provides the board glue for [`chair_core`]: it samples the
//! analog inputs with the on-chip ADC, sends J1939 frames through an
//! SPI-attached MCP2515, and writes debug reports to a UART.
//!
//! # Hardware Configuration
//!
//! | Function     | GPIO  | Description |
//! |--------------|-------|-------------|
//! | UART0 TX     | 0     | Debug console (115200 8N1) |
//! | SPI0 MISO    | 16    | MCP2515 SO |
//! | SPI0 CS      | 17    | MCP2515 CS |
//! | SPI0 SCK     | 18    | MCP2515 SCK |
//! | SPI0 MOSI    | 19    | MCP2515 SI |
//! | LED          | 25    | Status (on = running, blinking = startup failed) |
//! | ADC0-ADC4    | 40-44 | Analog pins A0-A4 |
//!
//! The RP2350B package is required: it is the only RP2350 variant with more
//! than four ADC inputs.
//!
//! # Architecture
//!
//! A single task runs [`ChairBridge::run`], which samples every iteration and
//! yields to the executor in between. All peripheral access is blocking and
//! bounded.
//!
//! # Modules
//!
//! - [`adc_input`]: ADC-backed input ([`AdcInput`])
//! - [`mcp2515`]: SPI CAN controller ([`Mcp2515`])
//! - [`uart_debug`]: Serial debug sink ([`UartDebugSink`])
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)
//! - **`profile-breakout`** (default): 50 ms CAN interval, debug output off
//! - **`profile-stress-test`**: 100 ms CAN interval, CAN debug on the console
//! - **`input-buttons`** (default): five-button box on A0-A4
//! - **`input-joystick`**: joystick on A0 (Y), A1 (X) and A2 (reference)
//!
//! # Re-exports
//!
//! This crate re-exports the [`chair_core`] items the entry point needs, so
//! consumers only need to depend on this crate.

#![no_std]

// Ensure exactly one profile and one input half
#[cfg(all(feature = "profile-breakout", feature = "profile-stress-test"))]
compile_error!("Cannot enable both `profile-breakout` and `profile-stress-test` features");

#[cfg(not(any(feature = "profile-breakout", feature = "profile-stress-test")))]
compile_error!("Enable one of the `profile-breakout` or `profile-stress-test` features");

#[cfg(all(feature = "input-buttons", feature = "input-joystick"))]
compile_error!("Cannot enable both `input-buttons` and `input-joystick` features - the button box and joystick share A0-A2");

#[cfg(not(any(feature = "input-buttons", feature = "input-joystick")))]
compile_error!("Enable one of the `input-buttons` or `input-joystick` features");

// Re-export core types for convenience
pub use chair_core::{
    BridgeConfig, BridgeError, BridgeStats, CanController, CanError, ChairBridge, Clock,
    DebugSink, Profile,
};

pub mod adc_input;
pub mod mcp2515;
pub mod uart_debug;

pub use adc_input::{AdcInput, ADC_PIN_COUNT};
pub use mcp2515::Mcp2515;
pub use uart_debug::{UartDebugSink, DEBUG_BAUD};

/// Profile selected by the `profile-*` feature.
#[cfg(feature = "profile-stress-test")]
pub const PROFILE: Profile = Profile::StressTest;
#[cfg(not(feature = "profile-stress-test"))]
pub const PROFILE: Profile = Profile::ChairBreakout;

/// Configuration for this build, narrowed to the wired input half.
#[cfg(feature = "input-joystick")]
pub const CONFIG: BridgeConfig = PROFILE.config().joystick_only();
#[cfg(not(feature = "input-joystick"))]
pub const CONFIG: BridgeConfig = PROFILE.config().buttons_only();

/// Monotonic clock backed by the embassy time driver.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    #[inline]
    fn now_ms(&self) -> u64 {
        embassy_time::Instant::now().as_millis()
    }
}
