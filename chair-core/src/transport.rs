//! CAN controller trait and the J1939 transport built on it.

use j1939_proto::{ExtendedId, J1939Frame};

/// Error type for CAN operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CanError {
    /// Transmit attempted before a successful [`J1939Transport::initialize`].
    NotInitialized,
    /// No free transmit buffer.
    BusBusy,
    /// Lost arbitration or the controller flagged a bus error.
    ArbitrationLost,
    /// Communication with the controller failed.
    Io,
    /// The controller did not respond in time.
    Timeout,
}

/// Minimal CAN controller interface.
///
/// Implementations wrap a concrete controller (e.g. an SPI-attached MCP2515).
/// Both calls are synchronous and must return in bounded time.
pub trait CanController {
    /// Bring the controller up at `baud` bit/s.
    fn initialize(&mut self, baud: u32) -> Result<(), CanError>;

    /// Queue one extended-identifier data frame.
    fn send_frame(&mut self, id: ExtendedId, data: &[u8]) -> Result<(), CanError>;
}

impl<T: CanController + ?Sized> CanController for &mut T {
    fn initialize(&mut self, baud: u32) -> Result<(), CanError> {
        (**self).initialize(baud)
    }

    fn send_frame(&mut self, id: ExtendedId, data: &[u8]) -> Result<(), CanError> {
        (**self).send_frame(id, data)
    }
}

/// Sends [`J1939Frame`]s through a [`CanController`].
///
/// Transmission is single-shot: a failed frame is reported and dropped, and
/// the next interval carries fresh state instead.
pub struct J1939Transport<C> {
    can: C,
    initialized: bool,
}

impl<C: CanController> J1939Transport<C> {
    #[must_use]
    pub const fn new(can: C) -> Self {
        Self {
            can,
            initialized: false,
        }
    }

    /// Initialize the controller at `baud` bit/s.
    pub fn initialize(&mut self, baud: u32) -> Result<(), CanError> {
        let result = self.can.initialize(baud);
        self.initialized = result.is_ok();
        result
    }

    #[inline]
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Send one frame with its 29-bit J1939 identifier.
    pub fn transmit(&mut self, frame: &J1939Frame) -> Result<(), CanError> {
        if !self.initialized {
            return Err(CanError::NotInitialized);
        }
        self.can
            .send_frame(frame.identifier().to_extended_id(), frame.payload())
    }

    /// Get a reference to the controller.
    pub fn controller(&self) -> &C {
        &self.can
    }

    /// Get a mutable reference to the controller.
    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.can
    }

    pub fn into_inner(self) -> C {
        self.can
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use j1939_proto::{Pgn, Priority};
    use std::vec::Vec;

    #[derive(Default)]
    struct MockCan {
        init_result: Option<CanError>,
        send_result: Option<CanError>,
        bauds: Vec<u32>,
        sent: Vec<(u32, Vec<u8>)>,
    }

    impl CanController for MockCan {
        fn initialize(&mut self, baud: u32) -> Result<(), CanError> {
            self.bauds.push(baud);
            self.init_result.map_or(Ok(()), Err)
        }

        fn send_frame(&mut self, id: ExtendedId, data: &[u8]) -> Result<(), CanError> {
            self.sent.push((id.as_raw(), data.to_vec()));
            self.send_result.map_or(Ok(()), Err)
        }
    }

    fn frame() -> J1939Frame {
        J1939Frame::new(Priority::CONTROL, Pgn::PROPRIETARY_A, 0x80, &[1, 2, 3]).unwrap()
    }

    #[test]
    fn test_transmit_uses_j1939_identifier() {
        let mut transport = J1939Transport::new(MockCan::default());
        assert_eq!(transport.initialize(500_000), Ok(()));
        assert!(transport.is_initialized());
        assert_eq!(transport.transmit(&frame()), Ok(()));

        let can = transport.into_inner();
        assert_eq!(can.bauds, [500_000]);
        assert_eq!(can.sent, [(0x0CEF_0080, std::vec![1, 2, 3])]);
    }

    #[test]
    fn test_transmit_before_initialize_fails() {
        let mut transport = J1939Transport::new(MockCan::default());
        assert_eq!(transport.transmit(&frame()), Err(CanError::NotInitialized));
        assert!(transport.controller().sent.is_empty());
    }

    #[test]
    fn test_failed_initialize_blocks_transmit() {
        let mut transport = J1939Transport::new(MockCan {
            init_result: Some(CanError::Timeout),
            ..MockCan::default()
        });
        assert_eq!(transport.initialize(500_000), Err(CanError::Timeout));
        assert!(!transport.is_initialized());
        assert_eq!(transport.transmit(&frame()), Err(CanError::NotInitialized));
    }

    #[test]
    fn test_transmit_failure_is_not_retried() {
        let mut transport = J1939Transport::new(MockCan {
            send_result: Some(CanError::BusBusy),
            ..MockCan::default()
        });
        transport.initialize(500_000).unwrap();
        assert_eq!(transport.transmit(&frame()), Err(CanError::BusBusy));
        assert_eq!(transport.controller().sent.len(), 1);

        transport.controller_mut().send_result = None;
        assert_eq!(transport.transmit(&frame()), Ok(()));
        assert_eq!(transport.controller().sent.len(), 2);
    }
}
