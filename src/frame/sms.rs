//! Cellular SMS frames: `TX_SMS` (0x1F) / `RX_SMS` (0x9F) (§3, §4.2).
//!
//! Phone numbers are fixed-width 20-byte, space-padded ASCII fields per
//! spec.md §3's string-encoding note.

use bytes::{BufMut, BytesMut};

use crate::error::XBeeError;

const PHONE_NUMBER_LEN: usize = 20;

fn encode_phone_number(number: &str) -> [u8; PHONE_NUMBER_LEN] {
    let mut out = [b' '; PHONE_NUMBER_LEN];
    let bytes = number.as_bytes();
    let n = bytes.len().min(PHONE_NUMBER_LEN);
    out[..n].copy_from_slice(&bytes[..n]);
    out
}

fn decode_phone_number(field: &[u8]) -> String {
    String::from_utf8_lossy(field).trim_end().to_string()
}

/// `TX_SMS` (0x1F): send an SMS through a cellular-capable modem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxSms {
    pub frame_id: u8,
    pub phone_number: String,
    pub data: Vec<u8>,
}

impl TxSms {
    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        if body.len() < 1 + PHONE_NUMBER_LEN {
            return Err(too_short("TX_SMS"));
        }
        Ok(Self {
            frame_id: body[0],
            phone_number: decode_phone_number(&body[1..1 + PHONE_NUMBER_LEN]),
            data: body[1 + PHONE_NUMBER_LEN..].to_vec(),
        })
    }

    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(1 + PHONE_NUMBER_LEN + self.data.len());
        buf.put_u8(self.frame_id);
        buf.put_slice(&encode_phone_number(&self.phone_number));
        buf.put_slice(&self.data);
        buf
    }
}

/// `RX_SMS` (0x9F): an inbound SMS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RxSms {
    pub phone_number: String,
    pub data: Vec<u8>,
}

impl RxSms {
    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        if body.len() < PHONE_NUMBER_LEN {
            return Err(too_short("RX_SMS"));
        }
        Ok(Self {
            phone_number: decode_phone_number(&body[..PHONE_NUMBER_LEN]),
            data: body[PHONE_NUMBER_LEN..].to_vec(),
        })
    }

    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(PHONE_NUMBER_LEN + self.data.len());
        buf.put_slice(&encode_phone_number(&self.phone_number));
        buf.put_slice(&self.data);
        buf
    }
}

fn too_short(frame: &'static str) -> XBeeError {
    XBeeError::Decode {
        frame_type: 0,
        reason: format!("{frame} body shorter than the minimum required fields"),
    }
}
