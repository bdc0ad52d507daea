//! Explicit addressing frames: raw Zigbee cluster/endpoint access (§3, §4.2).

use bytes::{BufMut, BytesMut};

use crate::error::XBeeError;
use crate::frame::address::{Address16, Address64};
use crate::frame::receive::ReceiveOptions;
use crate::frame::transmit::TransmitOptions;

/// `EXPLICIT_ADDRESSING_COMMAND_FRAME` (0x11): like `TransmitRequest`, but
/// bypassing the data-sample abstraction to address a specific endpoint,
/// cluster and profile directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitAddressingCommand {
    pub frame_id: u8,
    pub destination: Address64,
    pub network_address: Address16,
    pub source_endpoint: u8,
    pub destination_endpoint: u8,
    pub cluster_id: u16,
    pub profile_id: u16,
    pub broadcast_radius: u8,
    pub options: TransmitOptions,
    pub payload: Vec<u8>,
}

impl ExplicitAddressingCommand {
    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        if body.len() < 19 {
            return Err(too_short("EXPLICIT_ADDRESSING_COMMAND_FRAME"));
        }
        Ok(Self {
            frame_id: body[0],
            destination: Address64::from_be_bytes(body[1..9].try_into().unwrap()),
            network_address: Address16::from_be_bytes(body[9..11].try_into().unwrap()),
            source_endpoint: body[11],
            destination_endpoint: body[12],
            cluster_id: u16::from_be_bytes([body[13], body[14]]),
            profile_id: u16::from_be_bytes([body[15], body[16]]),
            broadcast_radius: body[17],
            options: TransmitOptions::from_bits_truncate(body[18]),
            payload: body[19..].to_vec(),
        })
    }

    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(19 + self.payload.len());
        buf.put_u8(self.frame_id);
        buf.put_slice(&self.destination.to_be_bytes());
        buf.put_slice(&self.network_address.to_be_bytes());
        buf.put_u8(self.source_endpoint);
        buf.put_u8(self.destination_endpoint);
        buf.put_u16(self.cluster_id);
        buf.put_u16(self.profile_id);
        buf.put_u8(self.broadcast_radius);
        buf.put_u8(self.options.bits());
        buf.put_slice(&self.payload);
        buf
    }
}

/// `EXPLICIT_RX_INDICATOR` (0x91): the inbound counterpart of
/// `ExplicitAddressingCommand`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitRxIndicator {
    pub source: Address64,
    pub network_address: Address16,
    pub source_endpoint: u8,
    pub destination_endpoint: u8,
    pub cluster_id: u16,
    pub profile_id: u16,
    pub options: ReceiveOptions,
    pub payload: Vec<u8>,
}

impl ExplicitRxIndicator {
    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        if body.len() < 17 {
            return Err(too_short("EXPLICIT_RX_INDICATOR"));
        }
        Ok(Self {
            source: Address64::from_be_bytes(body[0..8].try_into().unwrap()),
            network_address: Address16::from_be_bytes(body[8..10].try_into().unwrap()),
            source_endpoint: body[10],
            destination_endpoint: body[11],
            cluster_id: u16::from_be_bytes([body[12], body[13]]),
            profile_id: u16::from_be_bytes([body[14], body[15]]),
            options: ReceiveOptions::from_bits_truncate(body[16]),
            payload: body[17..].to_vec(),
        })
    }

    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(17 + self.payload.len());
        buf.put_slice(&self.source.to_be_bytes());
        buf.put_slice(&self.network_address.to_be_bytes());
        buf.put_u8(self.source_endpoint);
        buf.put_u8(self.destination_endpoint);
        buf.put_u16(self.cluster_id);
        buf.put_u16(self.profile_id);
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
    fn explicit_command_round_trips() {
        let cmd = ExplicitAddressingCommand {
            frame_id: 0x01,
            destination: Address64::new(0x0013_A200_4059_8A7B),
            network_address: Address16::UNKNOWN,
            source_endpoint: 0xE8,
            destination_endpoint: 0xE8,
            cluster_id: 0x0011,
            profile_id: 0xC105,
            broadcast_radius: 0,
            options: TransmitOptions::empty(),
            payload: b"data".to_vec(),
        };
        let bytes = cmd.encode();
        assert_eq!(ExplicitAddressingCommand::decode(&bytes).unwrap(), cmd);
    }

    #[test]
    fn explicit_rx_indicator_round_trips() {
        let ind = ExplicitRxIndicator {
            source: Address64::new(0x0013_A200_4059_8A7B),
            network_address: Address16::new(0x7D84),
            source_endpoint: 0xE8,
            destination_endpoint: 0xE8,
            cluster_id: 0x0011,
            profile_id: 0xC105,
            options: ReceiveOptions::ACKNOWLEDGED,
            payload: b"data".to_vec(),
        };
        let bytes = ind.encode();
        assert_eq!(ExplicitRxIndicator::decode(&bytes).unwrap(), ind);
    }

    #[test]
    fn too_short_bodies_are_rejected() {
        assert!(ExplicitAddressingCommand::decode(&[0x00; 5]).is_err());
        assert!(ExplicitRxIndicator::decode(&[0x00; 5]).is_err());
    }
}
