//! SysEx protocol and patch mirror for BOSS Katana amplifiers.
//!
//! Frames are parsed into [`Message`]s, commands are folded into a compact
//! [`Patch`] that keeps the amp's parameter memory in sync.

#![no_std]

extern crate alloc;
extern crate embedded_midi as midi;

#[macro_use]
extern crate log;

use core::fmt;

pub use address::{is_mutable, Address};
pub use devices::boss::katana::Region;
pub use midi::{MidiError, U14, U28, U7};
pub use patch::{Encoding, Patch, SparsePatch, WriteStat};
pub use sysex::{checksum, parse, ChecksumMismatch, Message, Op, Parsed};

pub mod address;
pub mod devices;
pub mod patch;
pub mod sysex;

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Integer codec failure, bounds or width
    Midi(MidiError),

    MissingStart,
    MissingEnd,
    /// Frame ends before the fields its dialect requires
    Truncated { len: usize, min: usize },

    UnknownVendor(u8),
    UnknownUniversalType(u8),
    IdentityMismatch,
    ModelMismatch,
    UnknownOperation(u8),
    /// Only produced by [`Parsed::strict`], parsing itself treats it as a warning
    ChecksumMismatch(ChecksumMismatch),

    Required(&'static str),

    OffsetOutOfRange(u16),
    DiscardedOffset(u16),
    UnknownEncoding(u16),
}

impl From<MidiError> for Error {
    fn from(err: MidiError) -> Self {
        Error::Midi(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Midi(err) => fmt::Display::fmt(err, f),
            Error::MissingStart => write!(f, "sysex message should start with 0x{:X}", midi::SYSEX_START),
            Error::MissingEnd => write!(f, "sysex message should end with 0x{:X}", midi::SYSEX_END),
            Error::Truncated { len, min } => write!(f, "sysex message of {} bytes is too short, expecting at least {}", len, min),
            Error::UnknownVendor(id) => write!(f, "unsupported sysex vendor 0x{:X}", id),
            Error::UnknownUniversalType(sub) => write!(f, "unsupported universal non-realtime subtype 0x{:X}", sub),
            Error::IdentityMismatch => f.write_str("identity reply is not from a Katana"),
            Error::ModelMismatch => f.write_str("roland message does not carry the Katana model id"),
            Error::UnknownOperation(op) => write!(f, "unknown sysex operation 0x{:X}", op),
            Error::ChecksumMismatch(m) => write!(f, "checksum 0x{:X} does not match expected 0x{:X}", m.found, m.expected),
            Error::Required(field) => write!(f, "{} is a required field", field),
            Error::OffsetOutOfRange(offset) => write!(f, "offset {} is out of bounds", offset),
            Error::DiscardedOffset(offset) => write!(f, "patch encoding discards offset {}", offset),
            Error::UnknownEncoding(id) => write!(f, "unknown patch encoding {}", id),
        }
    }
}
