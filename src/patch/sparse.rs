use midi::{Cull, U14, U7};

use crate::patch::{FxChain, Patch, WriteStat, FX_CHAIN_ADDRESS, FX_CHAIN_LEN, PADDING};
use crate::sysex::Message;
use crate::Error;

/// Bytes actually kept, the sum of all ranges below
pub const CAPACITY: usize = 1040;

/// Last device offset holding a known parameter
pub const MAX_OFFSET: u16 = 2326;

/// Half-open device range `begin..end`, stored at `begin - shift`
#[derive(Copy, Clone)]
struct Range {
    begin: usize,
    end: usize,
    shift: usize,
}

const RANGES: [Range; 4] = [
    Range { begin: 0, end: 107, shift: 0 },
    Range { begin: 192, end: 1059, shift: 85 },
    Range { begin: 2064, end: 2107, shift: 1090 },
    Range { begin: 2304, end: 2327, shift: 1287 },
];

const FX_CHAIN_STORED: usize = match storage_offset(FX_CHAIN_ADDRESS as usize) {
    Some(pos) => pos,
    None => panic!("fx chain must be kept by sparse storage"),
};

/// Storage slot of a device offset, `None` if it falls in a gap or past the last range
const fn storage_offset(offset: usize) -> Option<usize> {
    let mut i = 0;
    while i < RANGES.len() {
        let range = &RANGES[i];
        if offset < range.end {
            if offset < range.begin {
                return None;
            }
            return Some(offset - range.shift);
        }
        i += 1;
    }
    None
}

/// Keeps only the parameter ranges the amp documents, packed end to end.
pub struct SparsePatch {
    data: [u8; CAPACITY],
}

impl Default for SparsePatch {
    fn default() -> Self {
        Self::new()
    }
}

impl SparsePatch {
    pub fn new() -> Self {
        SparsePatch { data: [PADDING; CAPACITY] }
    }

    fn checked_slot(&self, offset: U14) -> Result<usize, Error> {
        if offset.0 > MAX_OFFSET {
            return Err(Error::OffsetOutOfRange(offset.0));
        }
        storage_offset(offset.0 as usize).ok_or(Error::DiscardedOffset(offset.0))
    }
}

impl Patch for SparsePatch {
    fn get_byte(&self, offset: U14) -> Result<U7, Error> {
        let pos = self.checked_slot(offset)?;
        Ok(U7::try_from(self.data[pos])?)
    }

    fn get_short(&self, offset: U14) -> Result<U14, Error> {
        let msb = self.checked_slot(offset)?;
        let lsb = self.checked_slot(U14(offset.0 + 1))?;
        Ok(U14::from_bytes(&[self.data[msb], self.data[lsb]])?)
    }

    fn get_fx_chain(&self) -> FxChain {
        self.data[FX_CHAIN_STORED..FX_CHAIN_STORED + FX_CHAIN_LEN]
            .iter()
            .map(|b| U7::cull(*b))
            .collect()
    }

    fn write_bytes(&mut self, offset: U14, data: &[u8]) -> WriteStat {
        let mut stat = WriteStat::default();
        let mut pos = 0;
        let mut range = 0;

        // ranges are sorted, a single forward pass places every byte
        while pos < data.len() {
            let address = offset.0 as usize + pos;
            while range < RANGES.len() && RANGES[range].end <= address {
                range += 1;
            }
            if range == RANGES.len() {
                stat.discarded += data.len() - pos;
                break;
            }
            let Range { begin, end, shift } = RANGES[range];
            if address < begin {
                let skip = (begin - address).min(data.len() - pos);
                stat.discarded += skip;
                pos += skip;
                continue;
            }
            let len = (end - address).min(data.len() - pos);
            let start = address - shift;
            self.data[start..start + len].copy_from_slice(&data[pos..pos + len]);
            stat.written += len;
            pos += len;
        }

        trace!("patch write at {}: {}", offset.0, stat);
        stat
    }

    fn apply(&mut self, message: &Message) -> WriteStat {
        match message {
            Message::Command { address, data, .. } if address.is_mutable() => self.write_bytes(address.offset, data),
            _ => {
                let stat = WriteStat { written: 0, discarded: message.data().len() };
                debug!("message not applied to patch, {}", stat);
                stat
            }
        }
    }

    fn read_bytes(&self, offset: U14, buf: &mut [u8]) -> Result<usize, Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        if offset.0 as usize + buf.len() - 1 > U14::MAX.0 as usize {
            return Err(Error::OffsetOutOfRange(offset.0));
        }
        let mut stored = 0;
        for (i, out) in buf.iter_mut().enumerate() {
            *out = match storage_offset(offset.0 as usize + i) {
                Some(pos) => {
                    stored += 1;
                    self.data[pos]
                }
                None => PADDING,
            };
        }
        Ok(stored)
    }

    fn write_byte(&mut self, offset: U14, value: U7) -> Result<bool, Error> {
        let [byte] = value.to_bytes()?;
        if offset.0 > U14::MAX.0 {
            return Err(Error::OffsetOutOfRange(offset.0));
        }
        match storage_offset(offset.0 as usize) {
            Some(pos) => {
                self.data[pos] = byte;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn write_short(&mut self, offset: U14, value: U14) -> Result<bool, Error> {
        let [msb, lsb] = value.to_bytes()?;
        if offset.0 >= U14::MAX.0 {
            return Err(Error::OffsetOutOfRange(offset.0));
        }
        let lsb_offset = offset.0 + 1;
        match (storage_offset(offset.0 as usize), storage_offset(lsb_offset as usize)) {
            (Some(hi), Some(lo)) => {
                self.data[hi] = msb;
                self.data[lo] = lsb;
                Ok(true)
            }
            (None, None) => Ok(false),
            // a short must never be half written
            (Some(_), None) => Err(Error::DiscardedOffset(lsb_offset)),
            (None, Some(_)) => Err(Error::DiscardedOffset(offset.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use crate::address::Address;
    use crate::devices::boss::katana::Region;
    use midi::{MidiError, U28};

    #[test]
    fn should_map_range_edges() {
        assert_eq!(storage_offset(0), Some(0));
        assert_eq!(storage_offset(106), Some(106));
        assert_eq!(storage_offset(107), None);
        assert_eq!(storage_offset(191), None);
        assert_eq!(storage_offset(192), Some(107));
        assert_eq!(storage_offset(1058), Some(973));
        assert_eq!(storage_offset(1059), None);
        assert_eq!(storage_offset(2064), Some(974));
        assert_eq!(storage_offset(2106), Some(1016));
        assert_eq!(storage_offset(2304), Some(1017));
        assert_eq!(storage_offset(2326), Some(CAPACITY - 1));
        assert_eq!(storage_offset(2327), None);
        assert_eq!(FX_CHAIN_STORED, 843);
    }

    #[test]
    fn should_discard_bytes_crossing_a_gap() {
        let mut patch = SparsePatch::new();
        let data: std::vec::Vec<u8> = (1..=20).collect();
        let stat = patch.write_bytes(U14(100), &data);
        assert_eq!(stat, WriteStat { written: 7, discarded: 13 });
        assert_eq!(patch.get_byte(U14(100)).unwrap(), U7(1));
        assert_eq!(patch.get_byte(U14(106)).unwrap(), U7(7));
    }

    #[test]
    fn should_resume_after_gap() {
        let mut patch = SparsePatch::new();
        let data = [0x11u8; 100];
        let stat = patch.write_bytes(U14(100), &data);
        // 100..107 kept, 107..192 dropped, 192..200 kept
        assert_eq!(stat, WriteStat { written: 15, discarded: 85 });
        assert_eq!(patch.get_byte(U14(199)).unwrap(), U7(0x11));
        assert_eq!(patch.get_byte(U14(200)).unwrap(), U7(0));
    }

    #[test]
    fn should_span_every_range() {
        let mut patch = SparsePatch::new();
        let data = [0x22u8; 1300];
        let stat = patch.write_bytes(U14(1050), &data);
        assert_eq!(stat, WriteStat { written: 75, discarded: 1225 });
        assert_eq!(patch.get_byte(U14(2326)).unwrap(), U7(0x22));
        assert_eq!(patch.get_byte(U14(2064)).unwrap(), U7(0x22));
    }

    #[test]
    fn should_discard_everything_past_last_range() {
        let mut patch = SparsePatch::new();
        let stat = patch.write_bytes(U14(3000), &[1, 2, 3]);
        assert_eq!(stat, WriteStat { written: 0, discarded: 3 });
    }

    #[test]
    fn should_reject_out_of_range_offset() {
        let patch = SparsePatch::new();
        assert_eq!(patch.get_byte(U14(2327)), Err(Error::OffsetOutOfRange(2327)));
        assert_eq!(patch.get_short(U14(2400)), Err(Error::OffsetOutOfRange(2400)));
    }

    #[test]
    fn should_reject_discarded_offset() {
        let patch = SparsePatch::new();
        assert_eq!(patch.get_byte(U14(150)), Err(Error::DiscardedOffset(150)));
        assert_eq!(patch.get_short(U14(106)), Err(Error::DiscardedOffset(107)));
        assert_eq!(patch.get_short(U14(2326)), Err(Error::OffsetOutOfRange(2327)));
    }

    #[test]
    fn should_read_short_msb_first() {
        let mut patch = SparsePatch::new();
        patch.write_bytes(U14(192), &[0x0A, 0x39]);
        assert_eq!(patch.get_short(U14(192)).unwrap(), U14(1337));
    }

    #[test]
    fn should_report_stored_high_bit() {
        let mut patch = SparsePatch::new();
        patch.write_bytes(U14(10), &[0x80]);
        assert_eq!(patch.get_byte(U14(10)), Err(Error::Midi(MidiError::InvalidU7)));
    }

    #[test]
    fn should_expose_fx_chain() {
        let mut patch = SparsePatch::new();
        let chain: std::vec::Vec<u8> = (0..FX_CHAIN_LEN as u8).map(|i| i + 1).collect();
        let address = Address::new(Region::Ch1, FX_CHAIN_ADDRESS).unwrap();
        let stat = patch.apply(&Message::command(address, &chain));
        assert_eq!(stat, WriteStat { written: FX_CHAIN_LEN, discarded: 0 });

        let fx = patch.get_fx_chain();
        assert_eq!(fx.len(), FX_CHAIN_LEN);
        assert_eq!(fx[0], U7(1));
        assert_eq!(fx[FX_CHAIN_LEN - 1], U7(FX_CHAIN_LEN as u8));
        assert_eq!(patch.get_byte(U14(FX_CHAIN_ADDRESS)).unwrap(), fx[0]);
    }

    #[test]
    fn should_cull_fx_chain_high_bits() {
        let mut patch = SparsePatch::new();
        patch.write_bytes(U14(FX_CHAIN_ADDRESS), &[0x81]);
        assert_eq!(patch.get_fx_chain()[0], U7(0x01));
    }

    #[test]
    fn should_ignore_command_to_fixed_region() {
        let mut patch = SparsePatch::new();
        let address = Address::new(Region::Midi, 0).unwrap();
        let stat = patch.apply(&Message::command(address, &[1, 2, 3, 4]));
        assert_eq!(stat, WriteStat { written: 0, discarded: 4 });
        assert_eq!(patch.get_byte(U14(0)).unwrap(), U7(0));

        let address = Address { region: U14(1), offset: U14(0) };
        let stat = patch.apply(&Message::command(address, &[9; 12]));
        assert_eq!(stat, WriteStat { written: 0, discarded: 12 });
        assert!(patch.data.iter().all(|b| *b == PADDING));
    }

    #[test]
    fn should_ignore_non_command_messages() {
        let mut patch = SparsePatch::new();
        let address = Address::new(Region::TemporaryPanel, 0).unwrap();
        assert_eq!(patch.apply(&Message::query(address, U28(16))), WriteStat::default());
        assert_eq!(patch.apply(&Message::id_request()), WriteStat::default());
    }

    #[test]
    fn should_apply_to_every_mutable_region() {
        for region in [Region::Ch1, Region::Ch2, Region::Ch3, Region::Ch4, Region::TemporaryPanel] {
            let mut patch = SparsePatch::new();
            let address = Address::new(region, 5).unwrap();
            let stat = patch.apply(&Message::command(address, &[0x33]));
            assert_eq!(stat.written, 1);
            assert_eq!(patch.get_byte(U14(5)).unwrap(), U7(0x33));
        }
    }

    #[test]
    fn should_read_with_padding() {
        let mut patch = SparsePatch::new();
        patch.write_bytes(U14(105), &[7, 8]);
        patch.write_bytes(U14(192), &[9]);
        let mut buf = [0xFFu8; 4];
        assert_eq!(patch.read_bytes(U14(105), &mut buf), Ok(2));
        assert_eq!(buf, [7, 8, 0, 0]);
        let mut buf = [0u8; 1];
        assert_eq!(patch.read_bytes(U14(192), &mut buf), Ok(1));
        assert_eq!(buf, [9]);
    }

    #[test]
    fn should_reject_read_past_address_space() {
        let patch = SparsePatch::new();
        let mut buf = [0u8; 2];
        assert_eq!(patch.read_bytes(U14(0x3FFF), &mut buf), Err(Error::OffsetOutOfRange(0x3FFF)));
        assert_eq!(patch.read_bytes(U14(0x3FFF), &mut []), Ok(0));
    }

    #[test]
    fn should_write_single_values() {
        let mut patch = SparsePatch::new();
        assert_eq!(patch.write_byte(U14(0), U7(0x7F)), Ok(true));
        assert_eq!(patch.write_byte(U14(150), U7(1)), Ok(false));
        assert_eq!(patch.write_byte(U14(0), U7(0x80)), Err(Error::Midi(MidiError::InvalidU7)));
        assert_eq!(patch.get_byte(U14(0)).unwrap(), U7(0x7F));

        assert_eq!(patch.write_short(U14(300), U14(0x1234)), Ok(true));
        assert_eq!(patch.get_short(U14(300)).unwrap(), U14(0x1234));
        assert_eq!(patch.write_short(U14(150), U14(1)), Ok(false));
        assert_eq!(patch.write_short(U14(106), U14(1)), Err(Error::DiscardedOffset(107)));
        assert_eq!(patch.write_short(U14(191), U14(1)), Err(Error::DiscardedOffset(191)));
        assert_eq!(patch.write_short(U14(0), U14(0x4000)), Err(Error::Midi(MidiError::InvalidU14)));
    }
}
