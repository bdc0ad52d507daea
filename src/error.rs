//! # XBee Error Handling
//!
//! This module defines [`XBeeError`], the error taxonomy used throughout the
//! crate. Framing and decode errors are recovered locally by the reader loop
//! and never reach this type's callers directly (they surface instead as an
//! "unknown/malformed" observation on the all-frames listener); everything
//! else propagates to whichever caller initiated the operation.

use thiserror::Error;

use crate::frame::at_command::AtCommandStatus;
use crate::frame::transmit::DeliveryStatus;

/// Errors that can occur while framing, parsing, or exchanging XBee frames.
#[derive(Debug, Error)]
pub enum XBeeError {
    /// Bad delimiter, truncated length/payload, bad checksum, or an
    /// unescaped special byte seen in API2 mode.
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// A payload was too short for its declared frame type, or carried an
    /// out-of-range value in a constrained position.
    #[error("error decoding frame type 0x{frame_type:02X}: {reason}")]
    Decode { frame_type: u8, reason: String },

    /// The underlying transport (serial port or BLE characteristic) failed.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The framer was constructed with a mode other than API or API_ESCAPE.
    #[error("invalid operating mode")]
    InvalidMode,

    /// A synchronous request/response did not receive a matching frame ID
    /// within the caller's timeout.
    #[error("timed out waiting for a response")]
    Timeout,

    /// An `AT_COMMAND_RESPONSE` carried a non-OK status.
    #[error("AT command failed: {status:?}")]
    AtCommand { status: AtCommandStatus },

    /// A `TRANSMIT_STATUS` carried a non-SUCCESS delivery status.
    #[error("transmit failed: {delivery_status:?}")]
    TransmitFailed { delivery_status: DeliveryStatus },

    /// The SRP-6a handshake failed.
    #[error("bluetooth authentication error: {0}")]
    Authentication(#[from] crate::srp::AuthError),

    /// An operation was attempted while the transport was not open.
    #[error("interface is not open")]
    NotOpen,
}

/// Errors raised while reading or writing the wire envelope (C3).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FramingError {
    #[error("expected start delimiter 0x7E, got 0x{0:02X}")]
    BadDelimiter(u8),

    #[error("incomplete packet: timed out waiting for more bytes")]
    Incomplete,

    #[error("invalid checksum: expected 0x{expected:02X}, calculated 0x{calculated:02X}")]
    BadChecksum { expected: u8, calculated: u8 },

    #[error("unescaped special byte 0x{0:02X} in API2 frame body")]
    UnescapedSpecialByte(u8),

    #[error("length prefix {declared} does not match {actual} payload bytes read")]
    LengthMismatch { declared: u16, actual: usize },
}
