//! Local interface relay frames: `USER_DATA_RELAY` (0x2D) /
//! `USER_DATA_RELAY_OUTPUT` (0xAD) (§3, §4.2).

use bytes::{BufMut, BytesMut};

use crate::error::XBeeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayInterface {
    Serial,
    Ble,
    MicroPython,
    Unknown(u8),
}

impl From<u8> for RelayInterface {
    fn from(byte: u8) -> Self {
        match byte {
            0 => RelayInterface::Serial,
            1 => RelayInterface::Ble,
            2 => RelayInterface::MicroPython,
            other => RelayInterface::Unknown(other),
        }
    }
}

impl From<RelayInterface> for u8 {
    fn from(iface: RelayInterface) -> u8 {
        match iface {
            RelayInterface::Serial => 0,
            RelayInterface::Ble => 1,
            RelayInterface::MicroPython => 2,
            RelayInterface::Unknown(byte) => byte,
        }
    }
}

/// `USER_DATA_RELAY` (0x2D): relay a payload to another local interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDataRelay {
    pub frame_id: u8,
    pub destination_interface: RelayInterface,
    pub data: Vec<u8>,
}

impl UserDataRelay {
    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        if body.len() < 2 {
            return Err(too_short("USER_DATA_RELAY"));
        }
        Ok(Self {
            frame_id: body[0],
            destination_interface: RelayInterface::from(body[1]),
            data: body[2..].to_vec(),
        })
    }

    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(2 + self.data.len());
        buf.put_u8(self.frame_id);
        buf.put_u8(self.destination_interface.into());
        buf.put_slice(&self.data);
        buf
    }
}

/// `USER_DATA_RELAY_OUTPUT` (0xAD): a payload relayed in from another local
/// interface. Unlike `UserDataRelay`, this direction carries no frame ID —
/// it is unsolicited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDataRelayOutput {
    pub source_interface: RelayInterface,
    pub data: Vec<u8>,
}

impl UserDataRelayOutput {
    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        if body.is_empty() {
            return Err(too_short("USER_DATA_RELAY_OUTPUT"));
        }
        Ok(Self {
            source_interface: RelayInterface::from(body[0]),
            data: body[1..].to_vec(),
        })
    }

    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(1 + self.data.len());
        buf.put_u8(self.source_interface.into());
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_data_relay_round_trips() {
        let relay = UserDataRelay {
            frame_id: 0x01,
            destination_interface: RelayInterface::Ble,
            data: b"ping".to_vec(),
        };
        let bytes = relay.encode();
        assert_eq!(UserDataRelay::decode(&bytes).unwrap(), relay);
    }

    #[test]
    fn user_data_relay_output_round_trips() {
        let relay = UserDataRelayOutput {
            source_interface: RelayInterface::MicroPython,
            data: b"pong".to_vec(),
        };
        let bytes = relay.encode();
        assert_eq!(UserDataRelayOutput::decode(&bytes).unwrap(), relay);
    }

    #[test]
    fn unknown_interface_byte_is_preserved() {
        let relay = UserDataRelay::decode(&[0x01, 0x55, 0x01]).unwrap();
        assert_eq!(relay.destination_interface, RelayInterface::Unknown(0x55));
    }

    #[test]
    fn empty_output_body_is_rejected() {
        assert!(UserDataRelayOutput::decode(&[]).is_err());
    }
}
