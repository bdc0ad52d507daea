//! The frame catalog (§3, §4.2): one Rust type per recognized XBee API
//! frame, dispatched from the 8-bit type tag that leads every frame body.
//!
//! [`FrameType`] is the tag; [`Frame`] is the decoded payload. Both are
//! closed over the tags spec.md §3 names, with [`Frame::Unknown`] carrying
//! forward anything else so an unrecognized tag never aborts the reader
//! loop (§7).

pub mod address;
pub mod at_command;
pub mod ble_unlock;
pub mod explicit;
pub mod io_sample;
pub mod modem_status;
pub mod receive;
pub mod sms;
pub mod ip;
pub mod transmit;
pub mod unknown;
pub mod user_data_relay;

use crate::error::XBeeError;

use at_command::{AtCommand, AtCommandResponse, RemoteAtCommandRequest, RemoteAtCommandResponse};
use ble_unlock::{BleUnlock, BleUnlockResponse};
use explicit::{ExplicitAddressingCommand, ExplicitRxIndicator};
use io_sample::{IoDataSampleRxIndicator, RxIo16, RxIo64};
use ip::{RxIpv4, TxIpv4};
use modem_status::ModemStatusFrame;
use receive::{ReceivePacket, Rx16, Rx64};
use sms::{RxSms, TxSms};
use transmit::{Tx16, Tx64, TransmitRequest, TransmitStatus, TxStatus};
use unknown::UnknownFrame;
use user_data_relay::{UserDataRelay, UserDataRelayOutput};

/// The 8-bit tag leading every frame body, named per spec.md §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameType {
    Tx64 = 0x00,
    Tx16 = 0x01,
    AtCommand = 0x08,
    AtCommandQueue = 0x09,
    TransmitRequest = 0x10,
    ExplicitAddressingCommandFrame = 0x11,
    RemoteAtCommandRequest = 0x17,
    TxSms = 0x1F,
    TxIpv4 = 0x20,
    TxRequestTlsProfile = 0x23,
    BleUnlock = 0x2C,
    UserDataRelay = 0x2D,
    Rx64 = 0x80,
    Rx16 = 0x81,
    RxIo64 = 0x82,
    RxIo16 = 0x83,
    AtCommandResponse = 0x88,
    TxStatus = 0x89,
    ModemStatus = 0x8A,
    TransmitStatus = 0x8B,
    ReceivePacket = 0x90,
    ExplicitRxIndicator = 0x91,
    IoDataSampleRxIndicator = 0x92,
    RemoteAtCommandResponse = 0x97,
    RxSms = 0x9F,
    BleUnlockResponse = 0xAC,
    UserDataRelayOutput = 0xAD,
    RxIpv4 = 0xB0,
}

impl FrameType {
    fn from_byte(byte: u8) -> Option<Self> {
        use FrameType::*;
        Some(match byte {
            0x00 => Tx64,
            0x01 => Tx16,
            0x08 => AtCommand,
            0x09 => AtCommandQueue,
            0x10 => TransmitRequest,
            0x11 => ExplicitAddressingCommandFrame,
            0x17 => RemoteAtCommandRequest,
            0x1F => TxSms,
            0x20 => TxIpv4,
            0x23 => TxRequestTlsProfile,
            0x2C => BleUnlock,
            0x2D => UserDataRelay,
            0x80 => Rx64,
            0x81 => Rx16,
            0x82 => RxIo64,
            0x83 => RxIo16,
            0x88 => AtCommandResponse,
            0x89 => TxStatus,
            0x8A => ModemStatus,
            0x8B => TransmitStatus,
            0x90 => ReceivePacket,
            0x91 => ExplicitRxIndicator,
            0x92 => IoDataSampleRxIndicator,
            0x97 => RemoteAtCommandResponse,
            0x9F => RxSms,
            0xAC => BleUnlockResponse,
            0xAD => UserDataRelayOutput,
            0xB0 => RxIpv4,
            _ => return None,
        })
    }

    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// A decoded XBee API frame. Every non-`Unknown` variant round-trips through
/// `encode`/`decode` with no loss of information.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Tx64(Tx64),
    Tx16(Tx16),
    AtCommand(AtCommand),
    RemoteAtCommandRequest(RemoteAtCommandRequest),
    TransmitRequest(TransmitRequest),
    ExplicitAddressingCommand(ExplicitAddressingCommand),
    TxSms(TxSms),
    TxIpv4(TxIpv4),
    TxRequestTlsProfile(TxIpv4),
    BleUnlock(BleUnlock),
    UserDataRelay(UserDataRelay),
    Rx64(Rx64),
    Rx16(Rx16),
    RxIo64(RxIo64),
    RxIo16(RxIo16),
    AtCommandResponse(AtCommandResponse),
    TxStatus(TxStatus),
    ModemStatus(ModemStatusFrame),
    TransmitStatus(TransmitStatus),
    ReceivePacket(ReceivePacket),
    ExplicitRxIndicator(ExplicitRxIndicator),
    IoDataSampleRxIndicator(IoDataSampleRxIndicator),
    RemoteAtCommandResponse(RemoteAtCommandResponse),
    RxSms(RxSms),
    BleUnlockResponse(BleUnlockResponse),
    UserDataRelayOutput(UserDataRelayOutput),
    RxIpv4(RxIpv4),
    Unknown(UnknownFrame),
}

impl Frame {
    /// Decode a frame body given the type byte that preceded it in the
    /// envelope. An unrecognized type byte, or a body too short for the
    /// frame type it names, degrades to `Frame::Unknown` rather than
    /// failing the whole read (§7).
    pub fn decode(frame_type: u8, body: &[u8]) -> Self {
        match Self::try_decode(frame_type, body) {
            Ok(frame) => frame,
            Err(_) => Frame::Unknown(UnknownFrame::new(frame_type, body.to_vec())),
        }
    }

    fn try_decode(frame_type: u8, body: &[u8]) -> Result<Self, XBeeError> {
        let Some(ty) = FrameType::from_byte(frame_type) else {
            return Ok(Frame::Unknown(UnknownFrame::new(frame_type, body.to_vec())));
        };
        Ok(match ty {
            FrameType::Tx64 => Frame::Tx64(Tx64::decode(body)?),
            FrameType::Tx16 => Frame::Tx16(Tx16::decode(body)?),
            FrameType::AtCommand => Frame::AtCommand(AtCommand::decode(false, body)?),
            FrameType::AtCommandQueue => Frame::AtCommand(AtCommand::decode(true, body)?),
            FrameType::TransmitRequest => Frame::TransmitRequest(TransmitRequest::decode(body)?),
            FrameType::ExplicitAddressingCommandFrame => {
                Frame::ExplicitAddressingCommand(ExplicitAddressingCommand::decode(body)?)
            }
            FrameType::RemoteAtCommandRequest => {
                Frame::RemoteAtCommandRequest(RemoteAtCommandRequest::decode(body)?)
            }
            FrameType::TxSms => Frame::TxSms(TxSms::decode(body)?),
            FrameType::TxIpv4 => Frame::TxIpv4(TxIpv4::decode(body, false)?),
            FrameType::TxRequestTlsProfile => {
                Frame::TxRequestTlsProfile(TxIpv4::decode(body, true)?)
            }
            FrameType::BleUnlock => Frame::BleUnlock(ble_unlock::BleUnlock::decode(body)?),
            FrameType::UserDataRelay => Frame::UserDataRelay(UserDataRelay::decode(body)?),
            FrameType::Rx64 => Frame::Rx64(Rx64::decode(body)?),
            FrameType::Rx16 => Frame::Rx16(Rx16::decode(body)?),
            FrameType::RxIo64 => Frame::RxIo64(RxIo64::decode(body)?),
            FrameType::RxIo16 => Frame::RxIo16(RxIo16::decode(body)?),
            FrameType::AtCommandResponse => Frame::AtCommandResponse(AtCommandResponse::decode(body)?),
            FrameType::TxStatus => Frame::TxStatus(TxStatus::decode(body)?),
            FrameType::ModemStatus => Frame::ModemStatus(ModemStatusFrame::decode(body)?),
            FrameType::TransmitStatus => Frame::TransmitStatus(TransmitStatus::decode(body)?),
            FrameType::ReceivePacket => Frame::ReceivePacket(ReceivePacket::decode(body)?),
            FrameType::ExplicitRxIndicator => {
                Frame::ExplicitRxIndicator(ExplicitRxIndicator::decode(body)?)
            }
            FrameType::IoDataSampleRxIndicator => {
                Frame::IoDataSampleRxIndicator(IoDataSampleRxIndicator::decode(body)?)
            }
            FrameType::RemoteAtCommandResponse => {
                Frame::RemoteAtCommandResponse(RemoteAtCommandResponse::decode(body)?)
            }
            FrameType::RxSms => Frame::RxSms(RxSms::decode(body)?),
            FrameType::BleUnlockResponse => {
                Frame::BleUnlockResponse(BleUnlockResponse::decode(body)?)
            }
            FrameType::UserDataRelayOutput => {
                Frame::UserDataRelayOutput(UserDataRelayOutput::decode(body)?)
            }
            FrameType::RxIpv4 => Frame::RxIpv4(RxIpv4::decode(body)?),
        })
    }

    /// Encode this frame back into `(type byte, body)`, the shape the
    /// framer wraps in a start delimiter, length prefix, and checksum.
    pub fn encode(&self) -> (u8, Vec<u8>) {
        match self {
            Frame::Tx64(f) => (FrameType::Tx64.tag(), f.encode().to_vec()),
            Frame::Tx16(f) => (FrameType::Tx16.tag(), f.encode().to_vec()),
            Frame::AtCommand(f) => {
                let tag = if f.queued {
                    FrameType::AtCommandQueue
                } else {
                    FrameType::AtCommand
                };
                (tag.tag(), f.encode().to_vec())
            }
            Frame::RemoteAtCommandRequest(f) => {
                (FrameType::RemoteAtCommandRequest.tag(), f.encode().to_vec())
            }
            Frame::TransmitRequest(f) => (FrameType::TransmitRequest.tag(), f.encode().to_vec()),
            Frame::ExplicitAddressingCommand(f) => (
                FrameType::ExplicitAddressingCommandFrame.tag(),
                f.encode().to_vec(),
            ),
            Frame::TxSms(f) => (FrameType::TxSms.tag(), f.encode().to_vec()),
            Frame::TxIpv4(f) => (FrameType::TxIpv4.tag(), f.encode().to_vec()),
            Frame::TxRequestTlsProfile(f) => {
                (FrameType::TxRequestTlsProfile.tag(), f.encode().to_vec())
            }
            Frame::BleUnlock(f) => (FrameType::BleUnlock.tag(), f.encode().to_vec()),
            Frame::UserDataRelay(f) => (FrameType::UserDataRelay.tag(), f.encode().to_vec()),
            Frame::Rx64(f) => (FrameType::Rx64.tag(), f.encode().to_vec()),
            Frame::Rx16(f) => (FrameType::Rx16.tag(), f.encode().to_vec()),
            Frame::RxIo64(f) => (FrameType::RxIo64.tag(), f.encode().to_vec()),
            Frame::RxIo16(f) => (FrameType::RxIo16.tag(), f.encode().to_vec()),
            Frame::AtCommandResponse(f) => (FrameType::AtCommandResponse.tag(), f.encode().to_vec()),
            Frame::TxStatus(f) => (FrameType::TxStatus.tag(), f.encode().to_vec()),
            Frame::ModemStatus(f) => (FrameType::ModemStatus.tag(), f.encode().to_vec()),
            Frame::TransmitStatus(f) => (FrameType::TransmitStatus.tag(), f.encode().to_vec()),
            Frame::ReceivePacket(f) => (FrameType::ReceivePacket.tag(), f.encode().to_vec()),
            Frame::ExplicitRxIndicator(f) => {
                (FrameType::ExplicitRxIndicator.tag(), f.encode().to_vec())
            }
            Frame::IoDataSampleRxIndicator(f) => (
                FrameType::IoDataSampleRxIndicator.tag(),
                f.encode().to_vec(),
            ),
            Frame::RemoteAtCommandResponse(f) => {
                (FrameType::RemoteAtCommandResponse.tag(), f.encode().to_vec())
            }
            Frame::RxSms(f) => (FrameType::RxSms.tag(), f.encode().to_vec()),
            Frame::BleUnlockResponse(f) => (FrameType::BleUnlockResponse.tag(), f.encode().to_vec()),
            Frame::UserDataRelayOutput(f) => {
                (FrameType::UserDataRelayOutput.tag(), f.encode().to_vec())
            }
            Frame::RxIpv4(f) => (FrameType::RxIpv4.tag(), f.encode().to_vec()),
            Frame::Unknown(f) => (f.frame_type, f.encode()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use address::{Address16, Address64};

    #[test]
    fn transmit_request_round_trips_through_the_catalog() {
        let frame = Frame::TransmitRequest(TransmitRequest {
            frame_id: 0x01,
            destination: Address64::BROADCAST,
            network_address: Address16::UNKNOWN,
            broadcast_radius: 0,
            options: transmit::TransmitOptions::empty(),
            payload: b"hi".to_vec(),
        });
        let (tag, body) = frame.encode();
        assert_eq!(tag, 0x10);
        assert_eq!(Frame::decode(tag, &body), frame);
    }

    #[test]
    fn at_command_queue_round_trips_with_the_right_tag() {
        let frame = Frame::AtCommand(AtCommand {
            frame_id: 0x01,
            command: [b'N', b'I'],
            parameter: vec![],
            queued: true,
        });
        let (tag, _) = frame.encode();
        assert_eq!(tag, FrameType::AtCommandQueue.tag());
    }

    #[test]
    fn unrecognized_tag_decodes_as_unknown() {
        let frame = Frame::decode(0xF0, &[0x01, 0x02]);
        assert_eq!(
            frame,
            Frame::Unknown(UnknownFrame::new(0xF0, vec![0x01, 0x02]))
        );
    }

    #[test]
    fn recognized_tag_with_malformed_body_decodes_as_unknown() {
        // AT_COMMAND needs at least 3 bytes; one byte is not enough.
        let frame = Frame::decode(0x08, &[0x01]);
        assert_eq!(frame, Frame::Unknown(UnknownFrame::new(0x08, vec![0x01])));
    }
}
