//! Serial console for debug reports.
//!
//! # Pins
//!
//! UART0 TX on GPIO 0, 115200 baud 8N1.

use chair_core::DebugSink;
use defmt::warn;
use embassy_rp::uart::{Blocking, UartTx};

/// Console baud rate.
pub const DEBUG_BAUD: u32 = 115_200;

/// [`DebugSink`] writing CRLF-terminated lines to a UART.
pub struct UartDebugSink<'d> {
    tx: UartTx<'d, Blocking>,
}

impl<'d> UartDebugSink<'d> {
    #[must_use]
    pub fn new(tx: UartTx<'d, Blocking>) -> Self {
        Self { tx }
    }
}

impl DebugSink for UartDebugSink<'_> {
    fn write_line(&mut self, text: &str) {
        let result = self
            .tx
            .blocking_write(text.as_bytes())
            .and_then(|()| self.tx.blocking_write(b"\r\n"));
        if let Err(e) = result {
            warn!("Debug UART write failed: {:?}", e);
        }
    }
}
