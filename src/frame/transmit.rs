//! Transmit request/status frames (§3, §4.2).
//!
//! Field layout and the checksum-relevant byte order for `TRANSMIT_REQUEST`
//! are grounded in `other_examples/74ed9fc9_jgoerzen-xbnet__src-txpacket.rs.rs`
//! (64-bit destination address via `BytesMut`, then options, then payload).
//! The `TRANSMIT_STATUS` delivery/discovery status bytes are grounded in
//! `other_examples/9d291697_..._xbee-tx_status.rs.rs`.

use bitflags::bitflags;
use bytes::{BufMut, BytesMut};

use crate::error::XBeeError;
use crate::frame::address::{Address16, Address64};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TransmitOptions: u8 {
        const DISABLE_ACK = 0x01;
        const DISABLE_ROUTE_DISCOVERY = 0x02;
        const ENABLE_UNICAST_NACK = 0x04;
        const ENABLE_MULTICAST = 0x08;
    }
}

/// `TRANSMIT_REQUEST` (0x10): send a payload to a 64-bit addressed node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmitRequest {
    pub frame_id: u8,
    pub destination: Address64,
    pub network_address: Address16,
    pub broadcast_radius: u8,
    pub options: TransmitOptions,
    pub payload: Vec<u8>,
}

impl TransmitRequest {
    /// A frame_id of 0 tells the modem not to send a `TransmitStatus` reply.
    pub fn no_status_requested(&self) -> bool {
        self.frame_id == 0
    }

    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        if body.len() < 13 {
            return Err(too_short("TRANSMIT_REQUEST"));
        }
        Ok(Self {
            frame_id: body[0],
            destination: Address64::from_be_bytes(body[1..9].try_into().unwrap()),
            network_address: Address16::from_be_bytes(body[9..11].try_into().unwrap()),
            broadcast_radius: body[11],
            options: TransmitOptions::from_bits_truncate(body[12]),
            payload: body[13..].to_vec(),
        })
    }

    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(13 + self.payload.len());
        buf.put_u8(self.frame_id);
        buf.put_slice(&self.destination.to_be_bytes());
        buf.put_slice(&self.network_address.to_be_bytes());
        buf.put_u8(self.broadcast_radius);
        buf.put_u8(self.options.bits());
        buf.put_slice(&self.payload);
        buf
    }
}

/// Per-hop delivery outcome carried by `TRANSMIT_STATUS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Success,
    CcaFailure,
    InvalidDestinationEndpoint,
    NetworkAckFailure,
    NotJoinedToNetwork,
    SelfAddressed,
    AddressNotFound,
    RouteNotFound,
    PayloadTooLarge,
    Unknown(u8),
}

impl From<u8> for DeliveryStatus {
    fn from(byte: u8) -> Self {
        match byte {
            0x00 => DeliveryStatus::Success,
            0x02 => DeliveryStatus::CcaFailure,
            0x15 => DeliveryStatus::InvalidDestinationEndpoint,
            0x21 => DeliveryStatus::NetworkAckFailure,
            0x22 => DeliveryStatus::NotJoinedToNetwork,
            0x23 => DeliveryStatus::SelfAddressed,
            0x24 => DeliveryStatus::AddressNotFound,
            0x25 => DeliveryStatus::RouteNotFound,
            0x74 => DeliveryStatus::PayloadTooLarge,
            other => DeliveryStatus::Unknown(other),
        }
    }
}

impl DeliveryStatus {
    pub fn is_success(self) -> bool {
        matches!(self, DeliveryStatus::Success)
    }
}

/// Network discovery outcome carried alongside `DeliveryStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryStatus {
    NoDiscoveryOverhead,
    AddressDiscovery,
    RouteDiscovery,
    AddressAndRouteDiscovery,
    ExtendedTimeout,
    Unknown(u8),
}

impl From<u8> for DiscoveryStatus {
    fn from(byte: u8) -> Self {
        match byte {
            0x00 => DiscoveryStatus::NoDiscoveryOverhead,
            0x01 => DiscoveryStatus::AddressDiscovery,
            0x02 => DiscoveryStatus::RouteDiscovery,
            0x03 => DiscoveryStatus::AddressAndRouteDiscovery,
            0x40 => DiscoveryStatus::ExtendedTimeout,
            other => DiscoveryStatus::Unknown(other),
        }
    }
}

/// `TRANSMIT_STATUS` (0x8B): the modem's report on a prior `TransmitRequest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransmitStatus {
    pub frame_id: u8,
    pub network_address: Address16,
    pub transmit_retry_count: u8,
    pub delivery_status: DeliveryStatus,
    pub discovery_status: DiscoveryStatus,
}

impl TransmitStatus {
    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        if body.len() < 6 {
            return Err(too_short("TRANSMIT_STATUS"));
        }
        Ok(Self {
            frame_id: body[0],
            network_address: Address16::from_be_bytes(body[1..3].try_into().unwrap()),
            transmit_retry_count: body[3],
            delivery_status: DeliveryStatus::from(body[4]),
            discovery_status: DiscoveryStatus::from(body[5]),
        })
    }

    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(6);
        buf.put_u8(self.frame_id);
        buf.put_slice(&self.network_address.to_be_bytes());
        buf.put_u8(self.transmit_retry_count);
        buf.put_u8(delivery_status_to_byte(self.delivery_status));
        buf.put_u8(discovery_status_to_byte(self.discovery_status));
        buf
    }
}

fn delivery_status_to_byte(status: DeliveryStatus) -> u8 {
    match status {
        DeliveryStatus::Success => 0x00,
        DeliveryStatus::CcaFailure => 0x02,
        DeliveryStatus::InvalidDestinationEndpoint => 0x15,
        DeliveryStatus::NetworkAckFailure => 0x21,
        DeliveryStatus::NotJoinedToNetwork => 0x22,
        DeliveryStatus::SelfAddressed => 0x23,
        DeliveryStatus::AddressNotFound => 0x24,
        DeliveryStatus::RouteNotFound => 0x25,
        DeliveryStatus::PayloadTooLarge => 0x74,
        DeliveryStatus::Unknown(byte) => byte,
    }
}

fn discovery_status_to_byte(status: DiscoveryStatus) -> u8 {
    match status {
        DiscoveryStatus::NoDiscoveryOverhead => 0x00,
        DiscoveryStatus::AddressDiscovery => 0x01,
        DiscoveryStatus::RouteDiscovery => 0x02,
        DiscoveryStatus::AddressAndRouteDiscovery => 0x03,
        DiscoveryStatus::ExtendedTimeout => 0x40,
        DiscoveryStatus::Unknown(byte) => byte,
    }
}

/// Legacy 802.15.4 `TX_64` (0x00): send to a 64-bit addressed node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tx64 {
    pub frame_id: u8,
    pub destination: Address64,
    pub options: TransmitOptions,
    pub payload: Vec<u8>,
}

impl Tx64 {
    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        if body.len() < 10 {
            return Err(too_short("TX_64"));
        }
        Ok(Self {
            frame_id: body[0],
            destination: Address64::from_be_bytes(body[1..9].try_into().unwrap()),
            options: TransmitOptions::from_bits_truncate(body[9]),
            payload: body[10..].to_vec(),
        })
    }

    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(10 + self.payload.len());
        buf.put_u8(self.frame_id);
        buf.put_slice(&self.destination.to_be_bytes());
        buf.put_u8(self.options.bits());
        buf.put_slice(&self.payload);
        buf
    }
}

/// Legacy 802.15.4 `TX_16` (0x01): send to a 16-bit addressed node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tx16 {
    pub frame_id: u8,
    pub destination: Address16,
    pub options: TransmitOptions,
    pub payload: Vec<u8>,
}

impl Tx16 {
    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        if body.len() < 4 {
            return Err(too_short("TX_16"));
        }
        Ok(Self {
            frame_id: body[0],
            destination: Address16::from_be_bytes(body[1..3].try_into().unwrap()),
            options: TransmitOptions::from_bits_truncate(body[3]),
            payload: body[4..].to_vec(),
        })
    }

    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(4 + self.payload.len());
        buf.put_u8(self.frame_id);
        buf.put_slice(&self.destination.to_be_bytes());
        buf.put_u8(self.options.bits());
        buf.put_slice(&self.payload);
        buf
    }
}

/// Legacy 802.15.4 `TX_STATUS` (0x89): the legacy, address-less counterpart
/// of `TRANSMIT_STATUS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxStatus {
    pub frame_id: u8,
    pub delivery_status: DeliveryStatus,
}

impl TxStatus {
    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        if body.len() < 2 {
            return Err(too_short("TX_STATUS"));
        }
        Ok(Self {
            frame_id: body[0],
            delivery_status: DeliveryStatus::from(body[1]),
        })
    }

    pub fn encode(&self) -> [u8; 2] {
        [self.frame_id, delivery_status_to_byte(self.delivery_status)]
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
    fn transmit_request_round_trips_with_broadcast() {
        let req = TransmitRequest {
            frame_id: 0x01,
            destination: Address64::BROADCAST,
            network_address: Address16::UNKNOWN,
            broadcast_radius: 0,
            options: TransmitOptions::DISABLE_ACK,
            payload: b"ping".to_vec(),
        };
        let bytes = req.encode();
        let decoded = TransmitRequest::decode(&bytes).unwrap();
        assert_eq!(decoded, req);
        assert!(decoded.destination.is_broadcast());
    }

    #[test]
    fn transmit_request_with_frame_id_zero_requests_no_status() {
        let req = TransmitRequest {
            frame_id: 0,
            destination: Address64::new(1),
            network_address: Address16::UNKNOWN,
            broadcast_radius: 0,
            options: TransmitOptions::empty(),
            payload: vec![],
        };
        assert!(req.no_status_requested());
    }

    #[test]
    fn transmit_status_round_trips_and_reports_success() {
        let status = TransmitStatus {
            frame_id: 0x2A,
            network_address: Address16::new(0x1234),
            transmit_retry_count: 1,
            delivery_status: DeliveryStatus::Success,
            discovery_status: DiscoveryStatus::RouteDiscovery,
        };
        let bytes = status.encode();
        let decoded = TransmitStatus::decode(&bytes).unwrap();
        assert_eq!(decoded, status);
        assert!(decoded.delivery_status.is_success());
    }

    #[test]
    fn transmit_status_preserves_unknown_status_bytes() {
        let body = [0x01, 0x00, 0x00, 0x00, 0x99, 0x99];
        let status = TransmitStatus::decode(&body).unwrap();
        assert_eq!(status.delivery_status, DeliveryStatus::Unknown(0x99));
        assert_eq!(status.discovery_status, DiscoveryStatus::Unknown(0x99));
    }

    #[test]
    fn tx64_round_trips() {
        let tx = Tx64 {
            frame_id: 0x01,
            destination: Address64::BROADCAST,
            options: TransmitOptions::empty(),
            payload: b"hi".to_vec(),
        };
        let bytes = tx.encode();
        assert_eq!(Tx64::decode(&bytes).unwrap(), tx);
    }

    #[test]
    fn tx16_round_trips() {
        let tx = Tx16 {
            frame_id: 0x02,
            destination: Address16::new(0xABCD),
            options: TransmitOptions::DISABLE_ACK,
            payload: vec![],
        };
        let bytes = tx.encode();
        assert_eq!(Tx16::decode(&bytes).unwrap(), tx);
    }

    #[test]
    fn tx_status_round_trips() {
        let status = TxStatus {
            frame_id: 0x01,
            delivery_status: DeliveryStatus::Success,
        };
        assert_eq!(TxStatus::decode(&status.encode()).unwrap(), status);
    }

    #[test]
    fn legacy_frames_reject_short_bodies() {
        assert!(Tx64::decode(&[0x00]).is_err());
        assert!(Tx16::decode(&[0x00]).is_err());
        assert!(TxStatus::decode(&[0x00]).is_err());
    }
}
