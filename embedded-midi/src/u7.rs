use core::convert::TryFrom;
use core::result::Result;

use crate::{expect_len, Cull, MidiError, Saturate};

/// A primitive value that can be from 0-0x7F
#[derive(Copy, Clone, Debug, Default, Eq, PartialOrd, PartialEq, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct U7(pub u8);

impl TryFrom<u8> for U7 {
    type Error = MidiError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > U7::MAX.0 {
            Err(MidiError::InvalidU7)
        } else {
            Ok(U7(value))
        }
    }
}

impl TryFrom<&[u8]> for U7 {
    type Error = MidiError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        U7::from_bytes(bytes)
    }
}

impl From<U7> for u8 {
    fn from(value: U7) -> u8 {
        value.0
    }
}

impl Cull<u8> for U7 {
    fn cull(value: u8) -> U7 {
        const MASK: u8 = 0b0111_1111;
        let value = MASK & value;
        U7(value)
    }
}

impl Saturate<u8> for U7 {
    fn saturate(value: u8) -> U7 {
        match U7::try_from(value) {
            Ok(x) => x,
            _ => U7::MAX,
        }
    }
}

impl U7 {
    pub const MAX: U7 = U7(0x7F);
    pub const MIN: U7 = U7(0);
    pub const WIDTH: usize = 1;

    /// Decodes a single sysex data byte
    pub fn from_bytes(bytes: &[u8]) -> Result<U7, MidiError> {
        expect_len(bytes, Self::WIDTH)?;
        U7::try_from(bytes[0])
    }

    /// Fails if the wrapped value was built out of range
    pub fn to_bytes(&self) -> Result<[u8; 1], MidiError> {
        Ok([U7::try_from(self.0)?.0])
    }
}
