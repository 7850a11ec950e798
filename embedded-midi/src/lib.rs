#![no_std]

use core::fmt;

pub use status::{is_data_byte, SYSEX_END, SYSEX_START};
pub use status::{UNIVERSAL_NON_REALTIME, UNIVERSAL_REALTIME, GENERAL_INFO, IDENTITY_REQUEST, IDENTITY_REPLY};
pub use u7::U7;
pub use u14::U14;
pub use u28::U28;

mod status;
mod u7;
mod u14;
mod u28;

/// Radix of multi-byte sysex integers, one data byte carries 7 bits.
pub(crate) const BYTE_FACTOR: u32 = 0x80;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MidiError {
    InvalidU7,
    InvalidU14,
    InvalidU28,
    /// Byte sequence does not have the width of the target integer
    InvalidLength { expected: usize },
}

impl fmt::Display for MidiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidiError::InvalidU7 => f.write_str("value is out of bounds for 7 bits"),
            MidiError::InvalidU14 => f.write_str("value is out of bounds for 14 bits"),
            MidiError::InvalidU28 => f.write_str("value is out of bounds for 28 bits"),
            MidiError::InvalidLength { expected } => write!(f, "invalid slice length, expecting {}", expected),
        }
    }
}

/// Just strip higher bits (meh)
pub trait Cull<T>: Sized {
    fn cull(_: T) -> Self;
}

/// Saturate to T::MAX
pub trait Saturate<T>: Sized {
    fn saturate(_: T) -> Self;
}

/// Checks slice width before decoding
pub(crate) fn expect_len(bytes: &[u8], expected: usize) -> Result<(), MidiError> {
    if bytes.len() != expected {
        return Err(MidiError::InvalidLength { expected });
    }
    Ok(())
}
