//! BOSS Katana amplifiers, spoken to through Roland's address-mapped sysex dialect.
//! Only the 100W head/combo family code is recognized.

use num_enum::{IntoPrimitive, TryFromPrimitive};

pub const ROLAND: u8 = 0x41;

pub const MODEL_ID: &[u8] = &[0x00, 0x00, 0x00, 0x33];
pub const FAMILY_CODE: &[u8] = &[0x33, 0x03, 0x00, 0x00];
/// Identity reply signature, manufacturer followed by family code
pub const ID_SIGNATURE: &[u8] = &[ROLAND, 0x33, 0x03, 0x00, 0x00];

pub const FIRMWARE_V1_02: [u8; 4] = [0x01, 0x00, 0x00, 0x00];

/// Roland "data request 1"
pub const QUERY: u8 = 0x11;
/// Roland "data set 1"
pub const COMMAND: u8 = 0x12;

pub const DEVICE_ID_DEFAULT: u8 = 0x00;
pub const DEVICE_ID_ANY: u8 = 0x7F;

/// Address regions known to the amp, as 14 bit values
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum Region {
    System = 0,            // 00 00
    Midi = 2,              // 00 02
    ZeroPatch = 2048,      // 10 00
    Ch1 = 2049,            // 10 01
    Ch2 = 2050,            // 10 02
    Ch3 = 2051,            // 10 03
    Ch4 = 2052,            // 10 04
    FactoryResetPanel = 4096,
    FactoryResetCh1 = 4097,
    FactoryResetCh2 = 4098,
    FactoryResetCh3 = 4099,
    FactoryResetCh4 = 4100,
    TemporaryPanel = 12288, // 60 00
    Command1 = 16256,       // 7F 00
    Command2 = 16257,       // 7F 01
}

/// Regions holding a patch that a command may overwrite
pub const MUTABLE_REGIONS: [Region; 5] = [
    Region::Ch1,
    Region::Ch2,
    Region::Ch3,
    Region::Ch4,
    Region::TemporaryPanel,
];

impl Region {
    pub fn is_mutable(&self) -> bool {
        MUTABLE_REGIONS.contains(self)
    }
}
