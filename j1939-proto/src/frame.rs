//! J1939 frame: identifier fields plus a payload of at most 8 bytes.

use crate::id::{J1939Id, Pgn, Priority};
use crate::FrameError;
use embedded_can::{Frame, Id};
use heapless::Vec;

/// Maximum payload of a single classic CAN frame.
pub const MAX_PAYLOAD_LEN: usize = 8;

/// Payload storage; its capacity enforces the 8-byte limit.
pub type Payload = Vec<u8, MAX_PAYLOAD_LEN>;

/// A single J1939 frame.
///
/// The payload capacity is fixed at [`MAX_PAYLOAD_LEN`], so a frame with more
/// than 8 data bytes cannot be constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct J1939Frame {
    priority: Priority,
    pgn: Pgn,
    source_address: u8,
    payload: Payload,
}

impl J1939Frame {
    /// Create a frame from its identifier fields and payload.
    pub fn new(
        priority: Priority,
        pgn: Pgn,
        source_address: u8,
        payload: &[u8],
    ) -> Result<Self, FrameError> {
        let payload = Payload::from_slice(payload).map_err(|_| FrameError::PayloadTooLong)?;
        Ok(Self::from_parts(priority, pgn, source_address, payload))
    }

    /// Create a frame from an already bounded payload.
    #[must_use]
    pub const fn from_parts(priority: Priority, pgn: Pgn, source_address: u8, payload: Payload) -> Self {
        Self {
            priority,
            pgn,
            source_address,
            payload,
        }
    }

    /// Create a frame from a decoded identifier and payload.
    pub fn from_id(id: J1939Id, payload: &[u8]) -> Result<Self, FrameError> {
        Self::new(id.priority(), id.pgn(), id.source_address(), payload)
    }

    #[inline]
    #[must_use]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    #[inline]
    #[must_use]
    pub fn pgn(&self) -> Pgn {
        self.pgn
    }

    #[inline]
    #[must_use]
    pub fn source_address(&self) -> u8 {
        self.source_address
    }

    /// Payload bytes (0 to 8).
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The 29-bit identifier this frame is sent with.
    #[inline]
    #[must_use]
    pub fn identifier(&self) -> J1939Id {
        J1939Id::new(self.priority, self.pgn, self.source_address)
    }
}

/// Lets CAN drivers written against `embedded-can` send and receive J1939 frames.
///
/// Standard identifiers and remote frames have no J1939 meaning and are rejected.
impl Frame for J1939Frame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        let id = J1939Id::try_from(id.into()).ok()?;
        Self::from_id(id, data).ok()
    }

    fn new_remote(_id: impl Into<Id>, _dlc: usize) -> Option<Self> {
        None
    }

    fn is_extended(&self) -> bool {
        true
    }

    fn is_remote_frame(&self) -> bool {
        false
    }

    fn id(&self) -> Id {
        Id::Extended(self.identifier().to_extended_id())
    }

    fn dlc(&self) -> usize {
        self.payload.len()
    }

    fn data(&self) -> &[u8] {
        &self.payload
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for J1939Frame {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "J1939Frame {{ id: {=u32:#x}, data: {=[u8]:x} }}",
            self.identifier().raw(),
            self.payload()
        );
    }
}
