//! In-memory mirror of a Katana patch.
//!
//! Storage encodings differ in how much of the amp's address space they keep,
//! callers only ever see the [`Patch`] capability.

use alloc::boxed::Box;
use core::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use midi::{U14, U7};

use crate::address::Address;
use crate::sysex::Message;
use crate::Error;

pub use sparse::SparsePatch;

mod sparse;

/// Device offset of the effects routing block (wire address `07 20`)
pub const FX_CHAIN_ADDRESS: u16 = 928;
pub const FX_CHAIN_LEN: usize = 20;

/// Value read back for offsets an encoding does not keep
pub const PADDING: u8 = 0x00;

pub type FxChain = heapless::Vec<U7, FX_CHAIN_LEN>;

#[derive(Copy, Clone, Debug, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum Encoding {
    Sparse = 0,
}

/// Outcome of a write, in bytes of input
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WriteStat {
    pub written: usize,
    pub discarded: usize,
}

impl fmt::Display for WriteStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "written: {}, discarded: {}", self.written, self.discarded)
    }
}

pub trait Patch: Send + Sync {
    /// Fails for offsets past the last known parameter or not kept by the encoding
    fn get_byte(&self, offset: U14) -> Result<U7, Error>;

    /// Reads `offset` and `offset + 1` as MSB, LSB
    fn get_short(&self, offset: U14) -> Result<U14, Error>;

    fn get_fx_chain(&self) -> FxChain;

    /// Places `data` starting at device offset `offset`, dropping bytes the encoding does not keep
    fn write_bytes(&mut self, offset: U14, data: &[u8]) -> WriteStat;

    /// Only commands to a patch region change anything, everything else is discarded
    fn apply(&mut self, message: &Message) -> WriteStat;

    /// Copies a device range into `buf`, padding unkept offsets.
    /// Returns how many bytes came from storage.
    fn read_bytes(&self, offset: U14, buf: &mut [u8]) -> Result<usize, Error>;

    /// Returns false if the encoding does not keep `offset`
    fn write_byte(&mut self, offset: U14, value: U7) -> Result<bool, Error>;

    fn write_short(&mut self, offset: U14, value: U14) -> Result<bool, Error>;

    /// Command carrying `len` stored bytes from `address`, to push the mirror back to the amp
    fn to_command(&self, address: Address, len: usize) -> Result<Message, Error> {
        let mut data = alloc::vec![PADDING; len];
        self.read_bytes(address.offset, &mut data)?;
        Ok(Message::command(address, &data))
    }
}

impl Encoding {
    pub fn create(self) -> Box<dyn Patch> {
        match self {
            Encoding::Sparse => Box::new(SparsePatch::new()),
        }
    }
}

/// Empty patch in the requested storage encoding
pub fn new(encoding: u16) -> Result<Box<dyn Patch>, Error> {
    match Encoding::try_from(encoding) {
        Ok(encoding) => Ok(encoding.create()),
        Err(_) => {
            debug!("unknown patch encoding {}", encoding);
            Err(Error::UnknownEncoding(encoding))
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use crate::devices::boss::katana::Region;
    use std::string::ToString;

    #[test]
    fn should_create_sparse_patch() {
        let mut patch = new(u16::from(Encoding::Sparse)).unwrap();
        let stat = patch.write_bytes(U14(0), &[0x42]);
        assert_eq!(stat, WriteStat { written: 1, discarded: 0 });
        assert_eq!(patch.get_byte(U14(0)).unwrap(), U7(0x42));
    }

    #[test]
    fn should_reject_unknown_encoding() {
        assert_eq!(new(1).err(), Some(Error::UnknownEncoding(1)));
        assert_eq!(new(0xFFFF).err(), Some(Error::UnknownEncoding(0xFFFF)));
    }

    #[test]
    fn should_export_range_as_command() {
        let mut patch = new(0).unwrap();
        patch.write_bytes(U14(100), &[1, 2, 3, 4, 5, 6, 7]);
        let address = Address::new(Region::Ch3, 104).unwrap();
        let message = patch.to_command(address, 5).unwrap();
        // 107 and 108 fall in the first gap
        assert_eq!(message, Message::command(address, &[5, 6, 7, 0, 0]));
    }

    #[test]
    fn should_render_write_stat() {
        assert_eq!(WriteStat { written: 7, discarded: 13 }.to_string(), "written: 7, discarded: 13");
    }
}
