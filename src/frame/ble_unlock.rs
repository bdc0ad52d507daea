//! Bluetooth Unlock handshake frames: `BLE_UNLOCK` (0x2C) /
//! `BLE_UNLOCK_RESPONSE` (0xAC) (§3, §4.2, §4.5).
//!
//! These are the raw wire frames the SRP-6a client in [`crate::srp`] sends
//! and receives; this module only knows the envelope shape, not the
//! handshake semantics.

use bytes::{BufMut, BytesMut};

use crate::error::XBeeError;

/// `BLE_UNLOCK` (0x2C): a handshake message sent by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BleUnlock {
    pub phase: u8,
    pub data: Vec<u8>,
}

impl BleUnlock {
    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        if body.is_empty() {
            return Err(too_short("BLE_UNLOCK"));
        }
        Ok(Self {
            phase: body[0],
            data: body[1..].to_vec(),
        })
    }

    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(1 + self.data.len());
        buf.put_u8(self.phase);
        buf.put_slice(&self.data);
        buf
    }
}

/// `BLE_UNLOCK_RESPONSE` (0xAC): the modem's reply. A phase byte of 0 means
/// the handshake failed and the remaining byte is an error code instead of
/// phase payload (§4.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BleUnlockResponse {
    Phase { phase: u8, data: Vec<u8> },
    Error { code: u8 },
}

impl BleUnlockResponse {
    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        if body.is_empty() {
            return Err(too_short("BLE_UNLOCK_RESPONSE"));
        }
        if body[0] == 0 {
            let code = *body.get(1).ok_or_else(|| too_short("BLE_UNLOCK_RESPONSE error code"))?;
            return Ok(BleUnlockResponse::Error { code });
        }
        Ok(BleUnlockResponse::Phase {
            phase: body[0],
            data: body[1..].to_vec(),
        })
    }

    pub fn encode(&self) -> BytesMut {
        match self {
            BleUnlockResponse::Phase { phase, data } => {
                let mut buf = BytesMut::with_capacity(1 + data.len());
                buf.put_u8(*phase);
                buf.put_slice(data);
                buf
            }
            BleUnlockResponse::Error { code } => {
                let mut buf = BytesMut::with_capacity(2);
                buf.put_u8(0);
                buf.put_u8(*code);
                buf
            }
        }
    }
}

fn too_short(frame: &'static str) -> XBeeError {
    XBeeError::Decode {
        frame_type: 0,
        reason: format!("{frame} body shorter than the minimum required fields"),
    }
}
