/// Sysex sequence initiator
pub const SYSEX_START: u8 = 0xF0;
/// Sysex sequence terminator, _not_ a status byte
pub const SYSEX_END: u8 = 0xF7;

/// Universal sysex "manufacturer" ids
pub const UNIVERSAL_NON_REALTIME: u8 = 0x7E;
pub const UNIVERSAL_REALTIME: u8 = 0x7F;

/// Universal non-realtime general information sub-id and its identity pair
pub const GENERAL_INFO: u8 = 0x06;
pub const IDENTITY_REQUEST: u8 = 0x01;
pub const IDENTITY_REPLY: u8 = 0x02;

/// Data bytes never have the high bit set
pub fn is_data_byte(byte: u8) -> bool {
    byte & 0x80 == 0
}
