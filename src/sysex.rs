//! Katana sysex frames.
//!
//! Two dialects share the wire: universal non-realtime identity messages and
//! Roland address-mapped query/command messages carrying a trailing checksum.

use alloc::vec::Vec;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use midi::{GENERAL_INFO, IDENTITY_REPLY, IDENTITY_REQUEST, SYSEX_END, SYSEX_START, U28, UNIVERSAL_NON_REALTIME};

use crate::address::{Address, ADDRESS_LEN};
use crate::devices::boss::katana::{COMMAND, DEVICE_ID_ANY, DEVICE_ID_DEFAULT, FAMILY_CODE, ID_SIGNATURE, MODEL_ID, QUERY, ROLAND};
use crate::Error;

const ID_REQUEST_LEN: usize = 6;
const ID_REPLY_LEN: usize = 15;
const FIRMWARE_LEN: usize = 4;
/// Start, vendor, device, model, op, address, checksum, end
const ROLAND_MIN_LEN: usize = 14;
const ROLAND_HEADER_LEN: usize = 8;

#[derive(Copy, Clone, Debug, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Op {
    IdRequest = 1,
    IdResponse = 2,
    Query = 3,
    Command = 4,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Message {
    IdRequest {
        device_id: u8,
    },
    IdResponse {
        device_id: u8,
        /// Four bytes, copied verbatim from the amp
        firmware: Vec<u8>,
    },
    Query {
        device_id: u8,
        address: Address,
        size: U28,
    },
    Command {
        device_id: u8,
        address: Address,
        data: Vec<u8>,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChecksumMismatch {
    pub expected: u8,
    pub found: u8,
}

/// Outcome of a successful parse. A bad checksum does not prevent decoding,
/// it is reported alongside the message for the caller to judge.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Parsed {
    pub message: Message,
    pub mismatch: Option<ChecksumMismatch>,
}

impl Parsed {
    pub fn is_valid(&self) -> bool {
        self.mismatch.is_none()
    }

    /// Promotes a checksum mismatch to an error
    pub fn strict(self) -> Result<Message, Error> {
        match self.mismatch {
            Some(mismatch) => Err(Error::ChecksumMismatch(mismatch)),
            None => Ok(self.message),
        }
    }

    pub fn into_message(self) -> Message {
        self.message
    }
}

/// Roland checksum over any number of byte groups.
/// Only the sum matters, so group order and boundaries are irrelevant.
pub fn checksum(blobs: &[&[u8]]) -> u8 {
    let mut acc: u32 = 0;
    for blob in blobs {
        for b in blob.iter() {
            acc = (acc + *b as u32) & 0x7F;
        }
    }
    ((0x80 - acc) & 0x7F) as u8
}

fn expect_min(sysex: &[u8], min: usize) -> Result<(), Error> {
    if sysex.len() < min {
        debug!("sysex frame truncated at {} bytes", sysex.len());
        return Err(Error::Truncated { len: sysex.len(), min });
    }
    Ok(())
}

/// Decodes a complete frame, including the 0xF0 and 0xF7 markers.
/// Payload bytes are copied, the returned message does not borrow `sysex`.
pub fn parse(sysex: &[u8]) -> Result<Parsed, Error> {
    if sysex.first() != Some(&SYSEX_START) {
        return Err(Error::MissingStart);
    }
    if sysex.len() < 2 || sysex.last() != Some(&SYSEX_END) {
        return Err(Error::MissingEnd);
    }
    expect_min(sysex, 3)?;

    let device_id = sysex[2];
    match sysex[1] {
        UNIVERSAL_NON_REALTIME => parse_universal(sysex, device_id),
        ROLAND => parse_roland(sysex, device_id),
        vendor => {
            debug!("sysex from unknown vendor 0x{:X}", vendor);
            Err(Error::UnknownVendor(vendor))
        }
    }
}

fn parse_universal(sysex: &[u8], device_id: u8) -> Result<Parsed, Error> {
    expect_min(sysex, ID_REQUEST_LEN)?;
    if sysex[3] != GENERAL_INFO {
        return Err(Error::UnknownUniversalType(sysex[3]));
    }

    let message = match sysex[4] {
        IDENTITY_REQUEST => Message::IdRequest { device_id },
        IDENTITY_REPLY => {
            expect_min(sysex, ID_REPLY_LEN)?;
            if &sysex[5..10] != ID_SIGNATURE {
                return Err(Error::IdentityMismatch);
            }
            // firmware version is not validated
            Message::IdResponse { device_id, firmware: sysex[10..14].to_vec() }
        }
        sub => return Err(Error::UnknownUniversalType(sub)),
    };
    trace!("parsed identity message {:?}", message.op());
    Ok(Parsed { message, mismatch: None })
}

fn parse_roland(sysex: &[u8], device_id: u8) -> Result<Parsed, Error> {
    expect_min(sysex, ROLAND_MIN_LEN)?;
    if &sysex[3..7] != MODEL_ID {
        return Err(Error::ModelMismatch);
    }

    let op = sysex[7];
    if op != QUERY && op != COMMAND {
        return Err(Error::UnknownOperation(op));
    }

    let address_bytes = &sysex[ROLAND_HEADER_LEN..ROLAND_HEADER_LEN + ADDRESS_LEN];
    let address = Address::from_bytes(address_bytes)?;
    // last two bytes are checksum and footer
    let payload = &sysex[ROLAND_HEADER_LEN + ADDRESS_LEN..sysex.len() - 2];
    let found = sysex[sysex.len() - 2];
    let expected = checksum(&[address_bytes, payload]);

    let message = if op == QUERY {
        Message::Query { device_id, address, size: U28::from_bytes(payload)? }
    } else {
        Message::Command { device_id, address, data: payload.to_vec() }
    };

    let mismatch = if found != expected {
        warn!("sysex checksum 0x{:X} does not match expected 0x{:X}", found, expected);
        Some(ChecksumMismatch { expected, found })
    } else {
        None
    };
    trace!("parsed roland message {:?} at {:?}", message.op(), address);
    Ok(Parsed { message, mismatch })
}

impl Message {
    /// Identity request addressed to any device
    pub fn id_request() -> Self {
        Message::IdRequest { device_id: DEVICE_ID_ANY }
    }

    pub fn id_response(firmware: &[u8]) -> Self {
        Message::IdResponse { device_id: DEVICE_ID_DEFAULT, firmware: firmware.to_vec() }
    }

    pub fn query(address: Address, size: U28) -> Self {
        Message::Query { device_id: DEVICE_ID_DEFAULT, address, size }
    }

    /// Keeps its own copy of `data`
    pub fn command(address: Address, data: &[u8]) -> Self {
        Message::Command { device_id: DEVICE_ID_DEFAULT, address, data: data.to_vec() }
    }

    pub fn op(&self) -> Op {
        match self {
            Message::IdRequest { .. } => Op::IdRequest,
            Message::IdResponse { .. } => Op::IdResponse,
            Message::Query { .. } => Op::Query,
            Message::Command { .. } => Op::Command,
        }
    }

    pub fn device_id(&self) -> u8 {
        match self {
            Message::IdRequest { device_id }
            | Message::IdResponse { device_id, .. }
            | Message::Query { device_id, .. }
            | Message::Command { device_id, .. } => *device_id,
        }
    }

    pub fn address(&self) -> Option<Address> {
        match self {
            Message::Query { address, .. } | Message::Command { address, .. } => Some(*address),
            _ => None,
        }
    }

    /// Raw data bytes carried, only commands have any
    pub fn data(&self) -> &[u8] {
        match self {
            Message::Command { data, .. } => data,
            _ => &[],
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        match self {
            Message::IdRequest { device_id } => Ok(alloc::vec![
                SYSEX_START,
                UNIVERSAL_NON_REALTIME,
                *device_id,
                GENERAL_INFO,
                IDENTITY_REQUEST,
                SYSEX_END,
            ]),
            Message::IdResponse { device_id, firmware } => {
                if firmware.is_empty() {
                    return Err(Error::Required("firmware version"));
                }
                if firmware.len() != FIRMWARE_LEN {
                    return Err(midi::MidiError::InvalidLength { expected: FIRMWARE_LEN }.into());
                }
                let mut frame = Vec::with_capacity(ID_REPLY_LEN);
                frame.extend_from_slice(&[SYSEX_START, UNIVERSAL_NON_REALTIME, *device_id, GENERAL_INFO, IDENTITY_REPLY, ROLAND]);
                frame.extend_from_slice(FAMILY_CODE);
                frame.extend_from_slice(firmware);
                frame.push(SYSEX_END);
                Ok(frame)
            }
            Message::Query { device_id, address, size } => roland_frame(*device_id, QUERY, address, &size.to_bytes()?),
            Message::Command { device_id, address, data } => roland_frame(*device_id, COMMAND, address, data),
        }
    }
}

impl TryFrom<&[u8]> for Message {
    type Error = Error;

    /// Strict variant of [`parse`], bad checksums are errors
    fn try_from(sysex: &[u8]) -> Result<Self, Self::Error> {
        parse(sysex)?.strict()
    }
}

fn roland_frame(device_id: u8, op: u8, address: &Address, payload: &[u8]) -> Result<Vec<u8>, Error> {
    let address = address.to_bytes()?;
    let mut frame = Vec::with_capacity(ROLAND_MIN_LEN + payload.len());
    frame.extend_from_slice(&[SYSEX_START, ROLAND, device_id]);
    frame.extend_from_slice(MODEL_ID);
    frame.push(op);
    frame.extend_from_slice(&address);
    frame.extend_from_slice(payload);
    frame.push(checksum(&[&address, payload]));
    frame.push(SYSEX_END);
    Ok(frame)
}
