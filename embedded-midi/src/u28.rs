use core::convert::TryFrom;

use crate::{expect_len, MidiError, U7, BYTE_FACTOR};

/// Size field value, sent as four data bytes MSB first.
/// Valid range stops at 0x1FFFFF, the upper byte is always zero on the wire.
#[derive(Copy, Clone, Debug, Default, Eq, PartialOrd, PartialEq, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct U28(pub u32);

impl TryFrom<u32> for U28 {
    type Error = MidiError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value > U28::MAX.0 {
            Err(MidiError::InvalidU28)
        } else {
            Ok(U28(value))
        }
    }
}

impl TryFrom<&[u8]> for U28 {
    type Error = MidiError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        U28::from_bytes(bytes)
    }
}

impl From<U28> for u32 {
    fn from(value: U28) -> u32 {
        value.0
    }
}

impl U28 {
    pub const MAX: U28 = U28(0x1F_FFFF);
    pub const MIN: U28 = U28(0);
    pub const WIDTH: usize = 4;

    pub fn from_bytes(bytes: &[u8]) -> Result<U28, MidiError> {
        expect_len(bytes, Self::WIDTH)?;
        let mut acc: u32 = 0;
        for byte in bytes {
            acc = acc * BYTE_FACTOR + U7::try_from(*byte)?.0 as u32;
        }
        U28::try_from(acc)
    }

    pub fn to_bytes(&self) -> Result<[u8; 4], MidiError> {
        let value = U28::try_from(self.0)?.0;
        let mut bytes = [0; 4];
        let mut rem = value;
        for byte in bytes.iter_mut().rev() {
            *byte = (rem % BYTE_FACTOR) as u8;
            rem /= BYTE_FACTOR;
        }
        Ok(bytes)
    }
}
