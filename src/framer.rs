//! The envelope framer (C3, §4.3): turns a byte source positioned just past
//! a start delimiter into a decoded `(frame_type, payload)` pair, and the
//! reverse for outbound frames.
//!
//! The framer never searches for the delimiter itself — per spec.md §4.3
//! step 1, that is the reader loop's job (`reader.rs`). The framer starts
//! reading immediately after one.

use bytes::{BufMut, BytesMut};

use crate::codec::{checksum_generate, checksum_validate, escape, escape_byte, is_special};
use crate::config::OperatingMode;
use crate::constants::{ESCAPE_BYTE, START_DELIMITER};
use crate::error::{FramingError, XBeeError};
use crate::transport::ByteTransport;

/// A decoded inbound packet before C2 dispatch: the frame type byte and its
/// payload, checksum already verified and stripped. `frame_type` is `None`
/// only for the boundary case of a declared length of zero, which has no
/// type byte at all (§8: "accepted and yields a zero-length payload...
/// visible as an 'unknown' frame").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPacket {
    pub frame_type: Option<u8>,
    pub payload: Vec<u8>,
}

pub struct Framer<T: ByteTransport> {
    transport: T,
    mode: OperatingMode,
}

impl<T: ByteTransport> Framer<T> {
    pub fn new(transport: T, mode: OperatingMode) -> Self {
        Self { transport, mode }
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Read one raw byte, applying the API2 escape transform transparently.
    /// An unescaped special byte where data is expected is a protocol
    /// violation (§4.3).
    async fn read_escaped_byte(&mut self) -> Result<u8, XBeeError> {
        let byte = self.read_raw_byte().await?;
        if self.mode.is_escaped() {
            if byte == ESCAPE_BYTE {
                let next = self.read_raw_byte().await?;
                return Ok(escape_byte(next));
            }
            if is_special(byte) {
                return Err(XBeeError::Framing(FramingError::UnescapedSpecialByte(byte)));
            }
        }
        Ok(byte)
    }

    async fn read_raw_byte(&mut self) -> Result<u8, XBeeError> {
        let mut buf = [0u8; 1];
        let n = self.transport.read(&mut buf).await?;
        if n == 0 {
            return Err(XBeeError::Framing(FramingError::Incomplete));
        }
        Ok(buf[0])
    }

    /// Read one frame's body, assuming the caller has already consumed the
    /// leading `0x7E` delimiter (§4.3 algorithm steps 2-6).
    pub async fn read_frame(&mut self) -> Result<RawPacket, XBeeError> {
        let len_hi = self.read_escaped_byte().await?;
        let len_lo = self.read_escaped_byte().await?;
        let length = u16::from_be_bytes([len_hi, len_lo]) as usize;

        let mut payload = Vec::with_capacity(length);
        for _ in 0..length {
            payload.push(self.read_escaped_byte().await?);
        }
        if payload.len() != length {
            return Err(XBeeError::Framing(FramingError::LengthMismatch {
                declared: length as u16,
                actual: payload.len(),
            }));
        }

        let checksum = self.read_escaped_byte().await?;
        if !checksum_validate(&payload, checksum) {
            return Err(XBeeError::Framing(FramingError::BadChecksum {
                expected: checksum,
                calculated: checksum_generate(&payload),
            }));
        }

        let frame_type = payload.first().copied();
        let body = if payload.is_empty() { Vec::new() } else { payload[1..].to_vec() };
        Ok(RawPacket {
            frame_type,
            payload: body,
        })
    }

    /// Write a complete frame: delimiter, length, payload, checksum, with
    /// escaping applied to everything after the delimiter when in API2
    /// mode (§4.3 Outbound).
    pub async fn write_frame(&mut self, frame_type: u8, body: &[u8]) -> Result<(), XBeeError> {
        let mut payload = Vec::with_capacity(1 + body.len());
        payload.push(frame_type);
        payload.extend_from_slice(body);

        let checksum = checksum_generate(&payload);

        let mut envelope = BytesMut::with_capacity(3 + payload.len() + 1);
        envelope.put_u16(payload.len() as u16);
        envelope.extend_from_slice(&payload);
        envelope.put_u8(checksum);

        let mut out = BytesMut::with_capacity(1 + envelope.len() * 2);
        out.put_u8(START_DELIMITER);
        if self.mode.is_escaped() {
            out.extend_from_slice(&escape(&envelope));
        } else {
            out.extend_from_slice(&envelope);
        }

        self.transport.write_all(&out).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OperatingMode;
    use async_trait::async_trait;
    use std::collections::VecDeque;

    struct VecTransport {
        rx: VecDeque<u8>,
        tx: Vec<u8>,
    }

    impl VecTransport {
        fn new(rx: Vec<u8>) -> Self {
            Self {
                rx: rx.into(),
                tx: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl ByteTransport for VecTransport {
        async fn open(&mut self) -> Result<(), XBeeError> {
            Ok(())
        }
        async fn close(&mut self) -> Result<(), XBeeError> {
            Ok(())
        }
        fn is_open(&self) -> bool {
            true
        }
        async fn read(&mut self, buf: &mut [u8]) -> Result<usize, XBeeError> {
            match self.rx.pop_front() {
                Some(b) => {
                    buf[0] = b;
                    Ok(1)
                }
                None => Ok(0),
            }
        }
        async fn write_all(&mut self, data: &[u8]) -> Result<(), XBeeError> {
            self.tx.extend_from_slice(data);
            Ok(())
        }
        async fn bytes_available(&mut self) -> Result<usize, XBeeError> {
            Ok(self.rx.len())
        }
    }

    /// E1 from spec.md §8, read back through the framer in API mode.
    #[tokio::test]
    async fn reads_an_at_command_frame_in_api_mode() {
        // length = 9, payload = [0x08, 0x01, 'N', 'I', "hello"], checksum 0x4B
        let bytes = vec![
            0x00, 0x09, 0x08, 0x01, 0x4E, 0x49, 0x68, 0x65, 0x6C, 0x6C, 0x6F, 0x4B,
        ];
        let transport = VecTransport::new(bytes);
        let mut framer = Framer::new(transport, OperatingMode::Api);
        let packet = framer.read_frame().await.unwrap();
        assert_eq!(packet.frame_type, Some(0x08));
        assert_eq!(packet.payload, vec![0x01, 0x4E, 0x49, 0x68, 0x65, 0x6C, 0x6C, 0x6F]);
    }

    #[tokio::test]
    async fn bad_checksum_is_rejected() {
        let bytes = vec![0x00, 0x02, 0x08, 0x01, 0x00];
        let transport = VecTransport::new(bytes);
        let mut framer = Framer::new(transport, OperatingMode::Api);
        let err = framer.read_frame().await.unwrap_err();
        assert!(matches!(err, XBeeError::Framing(FramingError::BadChecksum { .. })));
    }

    /// E3 from spec.md §8: a payload containing 0x7E round-trips through
    /// write_frame/read_frame in API2 mode.
    #[tokio::test]
    async fn write_then_read_round_trips_in_api2_mode() {
        let transport = VecTransport::new(vec![]);
        let mut writer = Framer::new(transport, OperatingMode::ApiEscaped);
        writer.write_frame(0x10, &[0x7E, 0x01]).await.unwrap();

        let written = writer.transport_mut().tx.clone();
        assert_eq!(written[0], START_DELIMITER);

        let reader_transport = VecTransport::new(written[1..].to_vec());
        let mut reader = Framer::new(reader_transport, OperatingMode::ApiEscaped);
        let packet = reader.read_frame().await.unwrap();
        assert_eq!(packet.frame_type, Some(0x10));
        assert_eq!(packet.payload, vec![0x7E, 0x01]);
    }

    /// §8: a declared length of zero has no type byte at all but is still
    /// accepted, not rejected as an incomplete frame.
    #[tokio::test]
    async fn zero_length_frame_is_accepted_with_no_type_byte() {
        // length = 0, checksum of an empty payload is 0xFF.
        let bytes = vec![0x00, 0x00, 0xFF];
        let transport = VecTransport::new(bytes);
        let mut framer = Framer::new(transport, OperatingMode::Api);
        let packet = framer.read_frame().await.unwrap();
        assert_eq!(packet.frame_type, None);
        assert!(packet.payload.is_empty());
    }

    #[tokio::test]
    async fn unescaped_special_byte_in_api2_payload_is_rejected() {
        // length=1, a bare 0x11 where escaped data was expected
        let bytes = vec![0x00, 0x01, 0x11, 0x00];
        let transport = VecTransport::new(bytes);
        let mut framer = Framer::new(transport, OperatingMode::ApiEscaped);
        let err = framer.read_frame().await.unwrap_err();
        assert!(matches!(
            err,
            XBeeError::Framing(FramingError::UnescapedSpecialByte(0x11))
        ));
    }

    #[tokio::test]
    async fn truncated_stream_is_incomplete() {
        let bytes = vec![0x00, 0x05, 0x08];
        let transport = VecTransport::new(bytes);
        let mut framer = Framer::new(transport, OperatingMode::Api);
        let err = framer.read_frame().await.unwrap_err();
        assert!(matches!(err, XBeeError::Framing(FramingError::Incomplete)));
    }
}
