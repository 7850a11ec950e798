use core::convert::TryFrom;

use crate::{expect_len, Cull, MidiError, Saturate, U7, BYTE_FACTOR};

/// A primitive value that can be from 0-0x3FFF, sent as two data bytes MSB first
#[derive(Copy, Clone, Debug, Default, Eq, PartialOrd, PartialEq, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct U14(pub u16);

impl TryFrom<u16> for U14 {
    type Error = MidiError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if value > U14::MAX.0 {
            Err(MidiError::InvalidU14)
        } else {
            Ok(U14(value))
        }
    }
}

impl TryFrom<&[u8]> for U14 {
    type Error = MidiError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        U14::from_bytes(bytes)
    }
}

/// Takes (MSB, LSB)
impl From<(U7, U7)> for U14 {
    fn from(pair: (U7, U7)) -> Self {
        let (msb, lsb) = pair;
        U14(((msb.0 as u16) << 7) | (lsb.0 as u16))
    }
}

impl From<U7> for U14 {
    fn from(value: U7) -> Self {
        U14(value.0 as u16)
    }
}

impl From<U14> for u16 {
    fn from(value: U14) -> u16 {
        value.0
    }
}

impl Cull<u16> for U14 {
    fn cull(value: u16) -> U14 {
        U14(value & U14::MAX.0)
    }
}

impl Saturate<u16> for U14 {
    fn saturate(value: u16) -> U14 {
        U14(value.min(U14::MAX.0))
    }
}

impl U14 {
    pub const MAX: U14 = U14(0x3FFF);
    pub const MIN: U14 = U14(0);
    pub const WIDTH: usize = 2;

    pub fn from_bytes(bytes: &[u8]) -> Result<U14, MidiError> {
        expect_len(bytes, Self::WIDTH)?;
        let msb = U7::try_from(bytes[0])?;
        let lsb = U7::try_from(bytes[1])?;
        Ok(U14::from((msb, lsb)))
    }

    /// Returns [MSB, LSB]
    pub fn to_bytes(&self) -> Result<[u8; 2], MidiError> {
        let value = U14::try_from(self.0)?.0 as u32;
        Ok([
            ((value / BYTE_FACTOR) % BYTE_FACTOR) as u8,
            (value % BYTE_FACTOR) as u8,
        ])
    }
}
