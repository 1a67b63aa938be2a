//! J1939 identifier construction and frame types for the chair CAN bridge.
//!
//! This crate provides the protocol layer of the bridge:
//!
//! - **Identifier fields**: [`Priority`] (3 bits), [`Pgn`] (18 bits) and the
//!   8-bit source address
//! - **Identifier**: [`J1939Id`] - the 29-bit extended CAN identifier built as
//!   `(priority << 26) | (pgn << 8) | source_address`, and decoded back into
//!   those fields
//! - **Frames**: [`J1939Frame`] - identifier fields plus up to 8 payload bytes,
//!   implementing [`embedded_can::Frame`] so it can be handed to any CAN driver
//!
//! # Identifier Layout
//!
//! ```text
//!  28  26 25 24 23      16 15       8 7        0
//! +------+--+--+----------+----------+----------+
//! | prio |ED|DP|    PF    |    PS    |    SA    |
//! +------+--+--+----------+----------+----------+
//!         \______________ PGN _______/
//! ```
//!
//! Downstream nodes decode these fields positionally, so the identifier is
//! only ever built through [`J1939Id::new`].
//!
//! # Example
//!
//! ```
//! use j1939_proto::{J1939Frame, Pgn, Priority};
//!
//! let frame = J1939Frame::new(Priority::CONTROL, Pgn::PROPRIETARY_A, 0x80, &[0x01, 0x02]).unwrap();
//! assert_eq!(frame.identifier().raw(), (3 << 26) | (0x0EF00 << 8) | 0x80);
//! assert_eq!(frame.payload(), &[0x01, 0x02]);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod frame;
pub mod id;

pub use frame::{J1939Frame, Payload, MAX_PAYLOAD_LEN};
pub use id::{J1939Id, Pgn, Priority};

// Re-export the embedded-can identifier types drivers are written against
pub use embedded_can::{ExtendedId, Frame, Id};

/// Error type for J1939 identifier and frame construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Priority above 7 (only 3 bits available).
    PriorityOutOfRange,
    /// PGN does not fit in 18 bits.
    PgnOutOfRange,
    /// Raw identifier does not fit in 29 bits.
    IdOutOfRange,
    /// Payload longer than 8 bytes.
    PayloadTooLong,
    /// Identifier uses standard (11-bit) framing.
    NotExtended,
}
