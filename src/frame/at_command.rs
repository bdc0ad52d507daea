//! Local and remote AT command frames (§3, §4.2).

use bytes::{BufMut, BytesMut};

use crate::error::XBeeError;
use crate::frame::address::{Address16, Address64};

/// Result code carried by `AT_COMMAND_RESPONSE` and
/// `REMOTE_AT_COMMAND_RESPONSE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtCommandStatus {
    Ok,
    Error,
    InvalidCommand,
    InvalidParameter,
    TxFailure,
    /// A status byte the catalog doesn't recognize. Frames decode rather
    /// than fail outright so an unexpected firmware revision doesn't take
    /// down the whole read loop (§7).
    Unknown(u8),
}

impl From<u8> for AtCommandStatus {
    fn from(byte: u8) -> Self {
        match byte {
            0x00 => AtCommandStatus::Ok,
            0x01 => AtCommandStatus::Error,
            0x02 => AtCommandStatus::InvalidCommand,
            0x03 => AtCommandStatus::InvalidParameter,
            0x04 => AtCommandStatus::TxFailure,
            other => AtCommandStatus::Unknown(other),
        }
    }
}

impl From<AtCommandStatus> for u8 {
    fn from(status: AtCommandStatus) -> u8 {
        match status {
            AtCommandStatus::Ok => 0x00,
            AtCommandStatus::Error => 0x01,
            AtCommandStatus::InvalidCommand => 0x02,
            AtCommandStatus::InvalidParameter => 0x03,
            AtCommandStatus::TxFailure => 0x04,
            AtCommandStatus::Unknown(byte) => byte,
        }
    }
}

/// `AT_COMMAND` (0x08) and `AT_COMMAND_QUEUE` (0x09): issue a local AT
/// command, optionally queued instead of applied immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtCommand {
    pub frame_id: u8,
    pub command: [u8; 2],
    pub parameter: Vec<u8>,
    pub queued: bool,
}

impl AtCommand {
    pub fn decode(queued: bool, body: &[u8]) -> Result<Self, XBeeError> {
        if body.len() < 3 {
            return Err(too_short("AT_COMMAND"));
        }
        Ok(Self {
            frame_id: body[0],
            command: [body[1], body[2]],
            parameter: body[3..].to_vec(),
            queued,
        })
    }

    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(3 + self.parameter.len());
        buf.put_u8(self.frame_id);
        buf.put_slice(&self.command);
        buf.put_slice(&self.parameter);
        buf
    }
}

/// `AT_COMMAND_RESPONSE` (0x88): the local modem's reply to an `AtCommand`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtCommandResponse {
    pub frame_id: u8,
    pub command: [u8; 2],
    pub status: AtCommandStatus,
    pub value: Vec<u8>,
}

impl AtCommandResponse {
    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        if body.len() < 4 {
            return Err(too_short("AT_COMMAND_RESPONSE"));
        }
        Ok(Self {
            frame_id: body[0],
            command: [body[1], body[2]],
            status: AtCommandStatus::from(body[3]),
            value: body[4..].to_vec(),
        })
    }

    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(4 + self.value.len());
        buf.put_u8(self.frame_id);
        buf.put_slice(&self.command);
        buf.put_u8(self.status.into());
        buf.put_slice(&self.value);
        buf
    }
}

/// `REMOTE_AT_COMMAND_REQUEST` (0x17): issue an AT command against a remote
/// node addressed by its 64-bit and/or 16-bit address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAtCommandRequest {
    pub frame_id: u8,
    pub destination: Address64,
    pub network_address: Address16,
    pub apply_changes: bool,
    pub command: [u8; 2],
    pub parameter: Vec<u8>,
}

impl RemoteAtCommandRequest {
    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        if body.len() < 14 {
            return Err(too_short("REMOTE_AT_COMMAND_REQUEST"));
        }
        Ok(Self {
            frame_id: body[0],
            destination: Address64::from_be_bytes(body[1..9].try_into().unwrap()),
            network_address: Address16::from_be_bytes(body[9..11].try_into().unwrap()),
            apply_changes: body[11] & 0x02 != 0,
            command: [body[12], body[13]],
            parameter: body[14..].to_vec(),
        })
    }

    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(14 + self.parameter.len());
        buf.put_u8(self.frame_id);
        buf.put_slice(&self.destination.to_be_bytes());
        buf.put_slice(&self.network_address.to_be_bytes());
        buf.put_u8(if self.apply_changes { 0x02 } else { 0x00 });
        buf.put_slice(&self.command);
        buf.put_slice(&self.parameter);
        buf
    }
}

/// `REMOTE_AT_COMMAND_RESPONSE` (0x97): a remote node's reply to a
/// `RemoteAtCommandRequest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAtCommandResponse {
    pub frame_id: u8,
    pub source: Address64,
    pub network_address: Address16,
    pub command: [u8; 2],
    pub status: AtCommandStatus,
    pub value: Vec<u8>,
}

impl RemoteAtCommandResponse {
    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        if body.len() < 14 {
            return Err(too_short("REMOTE_AT_COMMAND_RESPONSE"));
        }
        Ok(Self {
            frame_id: body[0],
            source: Address64::from_be_bytes(body[1..9].try_into().unwrap()),
            network_address: Address16::from_be_bytes(body[9..11].try_into().unwrap()),
            command: [body[11], body[12]],
            status: AtCommandStatus::from(body[13]),
            value: body[14..].to_vec(),
        })
    }

    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(14 + self.value.len());
        buf.put_u8(self.frame_id);
        buf.put_slice(&self.source.to_be_bytes());
        buf.put_slice(&self.network_address.to_be_bytes());
        buf.put_slice(&self.command);
        buf.put_u8(self.status.into());
        buf.put_slice(&self.value);
        buf
    }
}

fn too_short(frame: &'static str) -> XBeeError {
    XBeeError::Decode {
        frame_type: 0,
        reason: format!("{frame} body shorter than the minimum required fields"),
    }
}
