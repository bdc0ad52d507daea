//! IPv4 socket frames: `TX_IPV4` (0x20) / `RX_IPV4` (0xB0) /
//! `TX_REQUEST_TLS_PROFILE` (0x23) (§3, §4.2).

use bytes::{Buf, BufMut, BytesMut};

use crate::error::XBeeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpProtocol {
    Udp,
    Tcp,
    Tls,
    Unknown(u8),
}

impl From<u8> for IpProtocol {
    fn from(byte: u8) -> Self {
        match byte {
            0 => IpProtocol::Udp,
            1 => IpProtocol::Tcp,
            4 => IpProtocol::Tls,
            other => IpProtocol::Unknown(other),
        }
    }
}

impl From<IpProtocol> for u8 {
    fn from(proto: IpProtocol) -> u8 {
        match proto {
            IpProtocol::Udp => 0,
            IpProtocol::Tcp => 1,
            IpProtocol::Tls => 4,
            IpProtocol::Unknown(byte) => byte,
        }
    }
}

/// `TX_IPV4` (0x20): send a payload to an IPv4 socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIpv4 {
    pub frame_id: u8,
    pub address: [u8; 4],
    pub dest_port: u16,
    pub src_port: u16,
    pub protocol: IpProtocol,
    pub options: u8,
    /// Present only when framed as `TX_REQUEST_TLS_PROFILE` (§4.2).
    pub tls_profile: Option<u8>,
    pub data: Vec<u8>,
}

impl TxIpv4 {
    pub fn decode(body: &[u8], with_tls_profile: bool) -> Result<Self, XBeeError> {
        let header_len = if with_tls_profile { 12 } else { 11 };
        if body.len() < header_len {
            return Err(too_short("TX_IPV4"));
        }
        let mut buf = body;
        let frame_id = buf.get_u8();
        let mut address = [0u8; 4];
        address.copy_from_slice(&buf[..4]);
        buf.advance(4);
        let dest_port = buf.get_u16();
        let src_port = buf.get_u16();
        let protocol = IpProtocol::from(buf.get_u8());
        let options = buf.get_u8();
        let tls_profile = if with_tls_profile {
            Some(buf.get_u8())
        } else {
            None
        };
        Ok(Self {
            frame_id,
            address,
            dest_port,
            src_port,
            protocol,
            options,
            tls_profile,
            data: buf.to_vec(),
        })
    }

    pub fn encode(&self) -> BytesMut {
        let mut out = BytesMut::with_capacity(12 + self.data.len());
        out.put_u8(self.frame_id);
        out.put_slice(&self.address);
        out.put_u16(self.dest_port);
        out.put_u16(self.src_port);
        out.put_u8(self.protocol.into());
        out.put_u8(self.options);
        if let Some(profile) = self.tls_profile {
            out.put_u8(profile);
        }
        out.put_slice(&self.data);
        out
    }
}

/// `RX_IPV4` (0xB0): an inbound IPv4 socket payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RxIpv4 {
    pub address: [u8; 4],
    pub dest_port: u16,
    pub src_port: u16,
    pub protocol: IpProtocol,
    pub options: u8,
    pub data: Vec<u8>,
}

impl RxIpv4 {
    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        if body.len() < 10 {
            return Err(too_short("RX_IPV4"));
        }
        let mut buf = body;
        let mut address = [0u8; 4];
        address.copy_from_slice(&buf[..4]);
        buf.advance(4);
        let dest_port = buf.get_u16();
        let src_port = buf.get_u16();
        let protocol = IpProtocol::from(buf.get_u8());
        let options = buf.get_u8();
        Ok(Self {
            address,
            dest_port,
            src_port,
            protocol,
            options,
            data: buf.to_vec(),
        })
    }

    pub fn encode(&self) -> BytesMut {
        let mut out = BytesMut::with_capacity(10 + self.data.len());
        out.put_slice(&self.address);
        out.put_u16(self.dest_port);
        out.put_u16(self.src_port);
        out.put_u8(self.protocol.into());
        out.put_u8(self.options);
        out.put_slice(&self.data);
        out
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
    fn tx_ipv4_round_trips_without_tls_profile() {
        let tx = TxIpv4 {
            frame_id: 0x01,
            address: [192, 168, 1, 10],
            dest_port: 1234,
            src_port: 5678,
            protocol: IpProtocol::Tcp,
            options: 0,
            tls_profile: None,
            data: b"payload".to_vec(),
        };
        let bytes = tx.encode();
        assert_eq!(TxIpv4::decode(&bytes, false).unwrap(), tx);
    }

    #[test]
    fn tx_request_tls_profile_carries_the_extra_byte() {
        let tx = TxIpv4 {
            frame_id: 0x02,
            address: [10, 0, 0, 1],
            dest_port: 443,
            src_port: 0,
            protocol: IpProtocol::Tls,
            options: 0,
            tls_profile: Some(3),
            data: vec![],
        };
        let bytes = tx.encode();
        let decoded = TxIpv4::decode(&bytes, true).unwrap();
        assert_eq!(decoded.tls_profile, Some(3));
        assert_eq!(decoded, tx);
    }

    #[test]
    fn rx_ipv4_round_trips() {
        let rx = RxIpv4 {
            address: [8, 8, 8, 8],
            dest_port: 53,
            src_port: 5353,
            protocol: IpProtocol::Udp,
            options: 0,
            data: b"dns".to_vec(),
        };
        let bytes = rx.encode();
        assert_eq!(RxIpv4::decode(&bytes).unwrap(), rx);
    }

    #[test]
    fn unknown_protocol_byte_is_preserved() {
        let rx = RxIpv4::decode(&[1, 1, 1, 1, 0, 80, 0, 80, 0x7F, 0]).unwrap();
        assert_eq!(rx.protocol, IpProtocol::Unknown(0x7F));
    }
}
