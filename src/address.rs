
use midi::{MidiError, U14};

use crate::devices::boss::katana::Region;

/// Location in the amp's sysex memory
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Address {
    pub region: U14,
    pub offset: U14,
}

pub const ADDRESS_LEN: usize = 4;

impl Address {
    pub fn new(region: impl Into<u16>, offset: u16) -> Result<Self, MidiError> {
        Ok(Address {
            region: U14::try_from(region.into())?,
            offset: U14::try_from(offset)?,
        })
    }

    /// Takes [region MSB, region LSB, offset MSB, offset LSB]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MidiError> {
        if bytes.len() != ADDRESS_LEN {
            return Err(MidiError::InvalidLength { expected: ADDRESS_LEN });
        }
        Ok(Address {
            region: U14::from_bytes(&bytes[..2])?,
            offset: U14::from_bytes(&bytes[2..])?,
        })
    }

    pub fn to_bytes(&self) -> Result<[u8; ADDRESS_LEN], MidiError> {
        let region = self.region.to_bytes()?;
        let offset = self.offset.to_bytes()?;
        Ok([region[0], region[1], offset[0], offset[1]])
    }

    /// Named region, if the amp documents this one
    pub fn region_kind(&self) -> Option<Region> {
        Region::try_from(self.region.0).ok()
    }

    pub fn is_mutable(&self) -> bool {
        is_mutable(self.region)
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = MidiError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Address::from_bytes(bytes)
    }
}

/// True if commands targeting this region may change a patch
pub fn is_mutable(region: U14) -> bool {
    Region::try_from(region.0).map_or(false, |r| r.is_mutable())
}
