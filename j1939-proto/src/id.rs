//! J1939 identifier fields and the 29-bit extended identifier.

use crate::FrameError;
use embedded_can::{ExtendedId, Id};

/// Message priority (0 = highest, 7 = lowest).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Priority(u8);

impl Priority {
    /// Highest priority.
    pub const HIGHEST: Self = Self(0);
    /// Priority commonly used for control messages.
    pub const CONTROL: Self = Self(3);
    /// Default priority for informational messages.
    pub const DEFAULT: Self = Self(6);
    /// Lowest priority.
    pub const LOWEST: Self = Self(7);

    /// Create a priority, rejecting values above 7.
    #[inline]
    pub const fn new(value: u8) -> Result<Self, FrameError> {
        if value > 7 {
            Err(FrameError::PriorityOutOfRange)
        } else {
            Ok(Self(value))
        }
    }

    /// Get the raw 3-bit value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

/// Parameter Group Number (18 bits: EDP, DP, PDU format, PDU specific).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pgn(u32);

impl Pgn {
    /// Largest representable PGN.
    pub const MAX: Self = Self(0x3FFFF);

    /// Proprietary A (PDU1, destination-specific).
    pub const PROPRIETARY_A: Self = Self(0x0EF00);

    /// Proprietary B base (PDU2, broadcast; group extension in the low byte).
    pub const PROPRIETARY_B: Self = Self(0x0FF00);

    /// PDU format values below this carry a destination address.
    const PDU2_THRESHOLD: u8 = 240;

    /// Create a PGN, rejecting values wider than 18 bits.
    #[inline]
    pub const fn new(value: u32) -> Result<Self, FrameError> {
        if value > Self::MAX.0 {
            Err(FrameError::PgnOutOfRange)
        } else {
            Ok(Self(value))
        }
    }

    /// Get the raw 18-bit value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// PDU format (PF) byte.
    #[inline]
    #[must_use]
    pub const fn pdu_format(self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// PDU specific (PS) byte: destination address for PDU1, group extension for PDU2.
    #[inline]
    #[must_use]
    pub const fn pdu_specific(self) -> u8 {
        self.0 as u8
    }

    /// True if this PGN is destination-specific (PF < 240).
    #[inline]
    #[must_use]
    pub const fn is_pdu1(self) -> bool {
        self.pdu_format() < Self::PDU2_THRESHOLD
    }

    /// Destination address, for PDU1 PGNs.
    #[inline]
    #[must_use]
    pub const fn destination(self) -> Option<u8> {
        if self.is_pdu1() {
            Some(self.pdu_specific())
        } else {
            None
        }
    }

    /// Address a PDU1 PGN to `destination`. PDU2 PGNs are returned unchanged.
    #[inline]
    #[must_use]
    pub const fn with_destination(self, destination: u8) -> Self {
        if self.is_pdu1() {
            Self((self.0 & !0xFF) | destination as u32)
        } else {
            self
        }
    }
}

/// 29-bit J1939 extended CAN identifier.
///
/// Always built as `(priority << 26) | (pgn << 8) | source_address`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct J1939Id(u32);

impl J1939Id {
    const PRIORITY_SHIFT: u32 = 26;
    const PGN_SHIFT: u32 = 8;
    const MAX_RAW: u32 = 0x1FFF_FFFF;

    /// Build the identifier from its fields.
    #[inline]
    #[must_use]
    pub const fn new(priority: Priority, pgn: Pgn, source_address: u8) -> Self {
        Self(
            ((priority.0 as u32) << Self::PRIORITY_SHIFT)
                | (pgn.0 << Self::PGN_SHIFT)
                | source_address as u32,
        )
    }

    /// Wrap a raw identifier, rejecting values wider than 29 bits.
    #[inline]
    pub const fn from_raw(raw: u32) -> Result<Self, FrameError> {
        if raw > Self::MAX_RAW {
            Err(FrameError::IdOutOfRange)
        } else {
            Ok(Self(raw))
        }
    }

    /// Get the raw 29-bit value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Priority field (bits 26-28).
    #[inline]
    #[must_use]
    pub const fn priority(self) -> Priority {
        Priority((self.0 >> Self::PRIORITY_SHIFT) as u8 & 0x07)
    }

    /// PGN field (bits 8-25).
    #[inline]
    #[must_use]
    pub const fn pgn(self) -> Pgn {
        Pgn((self.0 >> Self::PGN_SHIFT) & Pgn::MAX.0)
    }

    /// Source address field (bits 0-7).
    #[inline]
    #[must_use]
    pub const fn source_address(self) -> u8 {
        self.0 as u8
    }

    /// Convert to an extended CAN identifier.
    #[inline]
    #[must_use]
    pub fn to_extended_id(self) -> ExtendedId {
        // raw never exceeds 29 bits
        ExtendedId::new(self.0).unwrap_or(ExtendedId::ZERO)
    }
}

impl From<J1939Id> for ExtendedId {
    fn from(id: J1939Id) -> Self {
        id.to_extended_id()
    }
}

impl From<ExtendedId> for J1939Id {
    fn from(id: ExtendedId) -> Self {
        Self(id.as_raw())
    }
}

impl TryFrom<Id> for J1939Id {
    type Error = FrameError;

    fn try_from(id: Id) -> Result<Self, Self::Error> {
        match id {
            Id::Extended(ext) => Ok(ext.into()),
            Id::Standard(_) => Err(FrameError::NotExtended),
        }
    }
}
