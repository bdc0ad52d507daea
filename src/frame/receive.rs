//! Inbound data frames: `RECEIVE_PACKET`, `RX_64`, `RX_16` (§3, §4.2).

use bitflags::bitflags;
use bytes::{BufMut, BytesMut};

use crate::error::XBeeError;
use crate::frame::address::{Address16, Address64};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ReceiveOptions: u8 {
        const ACKNOWLEDGED = 0x01;
        const BROADCAST_PACKET = 0x02;
        const APS_ENCRYPTED = 0x20;
        const END_DEVICE_SENT = 0x40;
    }
}

impl ReceiveOptions {
    /// Whether the `BROADCAST_PACKET` bit is set.
    pub fn is_broadcast(self) -> bool {
        self.contains(ReceiveOptions::BROADCAST_PACKET)
    }
}

/// `RECEIVE_PACKET` (0x90): inbound data addressed by 64-bit address, current
/// ZigBee/DigiMesh firmware's default receive frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivePacket {
    pub source: Address64,
    pub network_address: Address16,
    pub options: ReceiveOptions,
    pub payload: Vec<u8>,
}

impl ReceivePacket {
    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        if body.len() < 11 {
            return Err(too_short("RECEIVE_PACKET"));
        }
        Ok(Self {
            source: Address64::from_be_bytes(body[0..8].try_into().unwrap()),
            network_address: Address16::from_be_bytes(body[8..10].try_into().unwrap()),
            options: ReceiveOptions::from_bits_truncate(body[10]),
            payload: body[11..].to_vec(),
        })
    }

    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(11 + self.payload.len());
        buf.put_slice(&self.source.to_be_bytes());
        buf.put_slice(&self.network_address.to_be_bytes());
        buf.put_u8(self.options.bits());
        buf.put_slice(&self.payload);
        buf
    }
}

/// Legacy 802.15.4 `RX_64` (0x80): inbound data addressed by 64-bit address,
/// with an RSSI byte instead of a network address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rx64 {
    pub source: Address64,
    pub rssi: u8,
    pub options: ReceiveOptions,
    pub payload: Vec<u8>,
}

impl Rx64 {
    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        if body.len() < 10 {
            return Err(too_short("RX_64"));
        }
        Ok(Self {
            source: Address64::from_be_bytes(body[0..8].try_into().unwrap()),
            rssi: body[8],
            options: ReceiveOptions::from_bits_truncate(body[9]),
            payload: body[10..].to_vec(),
        })
    }

    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(10 + self.payload.len());
        buf.put_slice(&self.source.to_be_bytes());
        buf.put_u8(self.rssi);
        buf.put_u8(self.options.bits());
        buf.put_slice(&self.payload);
        buf
    }
}

/// Legacy 802.15.4 `RX_16` (0x81): inbound data addressed by 16-bit address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rx16 {
    pub source: Address16,
    pub rssi: u8,
    pub options: ReceiveOptions,
    pub payload: Vec<u8>,
}

impl Rx16 {
    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        if body.len() < 4 {
            return Err(too_short("RX_16"));
        }
        Ok(Self {
            source: Address16::from_be_bytes(body[0..2].try_into().unwrap()),
            rssi: body[2],
            options: ReceiveOptions::from_bits_truncate(body[3]),
            payload: body[4..].to_vec(),
        })
    }

    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(4 + self.payload.len());
        buf.put_slice(&self.source.to_be_bytes());
        buf.put_u8(self.rssi);
        buf.put_u8(self.options.bits());
        buf.put_slice(&self.payload);
        buf
    }
}

fn too_short(frame: &'static str) -> XBeeError {
    XBeeError::Decode {
        frame_type: 0,
        reason: format!("{frame} body shorter than the minimum required fields"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receive_packet_round_trips() {
        let pkt = ReceivePacket {
            source: Address64::new(0x0013_A200_4059_8A7B),
            network_address: Address16::new(0x7D84),
            options: ReceiveOptions::BROADCAST_PACKET,
            payload: b"hello".to_vec(),
        };
        let bytes = pkt.encode();
        assert_eq!(ReceivePacket::decode(&bytes).unwrap(), pkt);
    }

    #[test]
    fn rx64_round_trips() {
        let pkt = Rx64 {
            source: Address64::BROADCAST,
            rssi: 0x28,
            options: ReceiveOptions::empty(),
            payload: vec![0x01, 0x02],
        };
        let bytes = pkt.encode();
        assert_eq!(Rx64::decode(&bytes).unwrap(), pkt);
    }

    #[test]
    fn rx16_round_trips_with_empty_payload() {
        let pkt = Rx16 {
            source: Address16::new(0xABCD),
            rssi: 0x10,
            options: ReceiveOptions::ACKNOWLEDGED,
            payload: vec![],
        };
        let bytes = pkt.encode();
        assert_eq!(Rx16::decode(&bytes).unwrap(), pkt);
    }

    #[test]
    fn is_broadcast_reflects_the_broadcast_bit() {
        assert!(ReceiveOptions::BROADCAST_PACKET.is_broadcast());
        assert!(!ReceiveOptions::ACKNOWLEDGED.is_broadcast());
        assert!(!ReceiveOptions::empty().is_broadcast());
    }

    #[test]
    fn too_short_bodies_are_rejected() {
        assert!(ReceivePacket::decode(&[0x00]).is_err());
        assert!(Rx64::decode(&[0x00]).is_err());
        assert!(Rx16::decode(&[0x00]).is_err());
    }
}
