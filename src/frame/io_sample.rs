//! IO sample decoding (§3, §9).
//!
//! `RX_IO_64`/`RX_IO_16`/`IO_DATA_SAMPLE_RX_INDICATOR` all carry the same
//! sample body after their own address/options header; this module decodes
//! just that body.
//!
//! Two incompatible layouts exist on the wire:
//!
//! - the legacy 802.15.4 "raw" layout packs digital and analog channel
//!   masks into one 16-bit field (bits 0-8 select D0-D8, bits 9-14 select
//!   A0-A5) and has no supply-voltage reading;
//! - the generic (ZigBee/DigiMesh) layout uses a 16-bit digital mask
//!   (bits 0-14, D0-D14) followed by a separate 8-bit analog mask whose bit
//!   7 is the supply-voltage indicator rather than a channel.
//!
//! The raw header is 2 bytes, the generic header is 3; since every other
//! field in the body (digital values, each analog reading) is 2 bytes, the
//! *parity* of the total body length is exactly the parity of the header,
//! which is what §9's "select the variant by payload length parity" rule
//! is doing: odd body length implies the 3-byte generic header, even
//! implies the 2-byte raw header.

use bytes::{BufMut, BytesMut};

use crate::error::XBeeError;
use crate::frame::address::{Address16, Address64};
use crate::frame::receive::ReceiveOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoSampleVariant {
    Raw802_15_4,
    Generic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoSample {
    pub variant: IoSampleVariant,
    /// Which digital lines are enabled (bit N = DN enabled).
    pub digital_mask: u16,
    /// Which analog lines are enabled (bit N = AN enabled). For the
    /// generic variant, bit 7 means "supply voltage reading present"
    /// rather than an analog channel.
    pub analog_mask: u16,
    /// Digital pin states, present iff `digital_mask != 0`.
    pub digital_values: Option<u16>,
    /// `(channel, value)` pairs in ascending channel order.
    pub analog_values: Vec<(u8, u16)>,
    /// Present iff the generic variant's analog mask bit 7 is set.
    pub supply_voltage: Option<u16>,
}

const RAW_ANALOG_CHANNELS: u8 = 6; // A0-A5
const GENERIC_ANALOG_CHANNELS: u8 = 7; // A0-A6 (bit 7 is supply voltage)

impl IoSample {
    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        if body.len() < 2 {
            return Err(XBeeError::Decode {
                frame_type: 0,
                reason: "IO sample body shorter than the minimum 2-byte mask header".into(),
            });
        }

        if body.len() % 2 == 0 {
            Self::decode_raw(body)
        } else {
            Self::decode_generic(body)
        }
    }

    fn decode_raw(body: &[u8]) -> Result<Self, XBeeError> {
        let combined = u16::from_be_bytes([body[0], body[1]]);
        let digital_mask = combined & 0x01FF;
        let analog_mask = (combined >> 9) & 0x003F;
        let mut cursor = 2;

        let digital_values = if digital_mask != 0 {
            let v = take_u16(body, &mut cursor)?;
            Some(v & 0x01FF)
        } else {
            None
        };

        let mut analog_values = Vec::new();
        for channel in 0..RAW_ANALOG_CHANNELS {
            if analog_mask & (1 << channel) != 0 {
                analog_values.push((channel, take_u16(body, &mut cursor)?));
            }
        }

        Ok(Self {
            variant: IoSampleVariant::Raw802_15_4,
            digital_mask,
            analog_mask,
            digital_values,
            analog_values,
            supply_voltage: None,
        })
    }

    fn decode_generic(body: &[u8]) -> Result<Self, XBeeError> {
        let digital_mask = u16::from_be_bytes([body[0], body[1]]) & 0x7FFF;
        let analog_mask = body[2] as u16;
        let mut cursor = 3;

        let digital_values = if digital_mask != 0 {
            Some(take_u16(body, &mut cursor)? & 0x7FFF)
        } else {
            None
        };

        let mut analog_values = Vec::new();
        for channel in 0..GENERIC_ANALOG_CHANNELS {
            if analog_mask & (1 << channel) != 0 {
                analog_values.push((channel, take_u16(body, &mut cursor)?));
            }
        }

        // A missing supply-voltage reading (malformed firmware clears bit 7
        // but still omits the field, or vice versa) is treated as absent,
        // never as zero (§9 open question).
        let supply_voltage = if analog_mask & 0x80 != 0 && cursor + 1 < body.len() {
            Some(take_u16(body, &mut cursor)?)
        } else {
            None
        };

        Ok(Self {
            variant: IoSampleVariant::Generic,
            digital_mask,
            analog_mask,
            digital_values,
            analog_values,
            supply_voltage,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self.variant {
            IoSampleVariant::Raw802_15_4 => {
                let combined = (self.digital_mask & 0x01FF) | ((self.analog_mask & 0x3F) << 9);
                out.extend_from_slice(&combined.to_be_bytes());
                if let Some(v) = self.digital_values {
                    out.extend_from_slice(&v.to_be_bytes());
                }
                for &(_, value) in &self.analog_values {
                    out.extend_from_slice(&value.to_be_bytes());
                }
            }
            IoSampleVariant::Generic => {
                out.extend_from_slice(&(self.digital_mask & 0x7FFF).to_be_bytes());
                out.push(self.analog_mask as u8);
                if let Some(v) = self.digital_values {
                    out.extend_from_slice(&v.to_be_bytes());
                }
                for &(_, value) in &self.analog_values {
                    out.extend_from_slice(&value.to_be_bytes());
                }
                if let Some(v) = self.supply_voltage {
                    out.extend_from_slice(&v.to_be_bytes());
                }
            }
        }
        out
    }
}

/// `RX_IO_64` (0x82): legacy 802.15.4 IO sample addressed by 64-bit address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RxIo64 {
    pub source: Address64,
    pub rssi: u8,
    pub options: ReceiveOptions,
    pub sample: IoSample,
}

impl RxIo64 {
    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        if body.len() < 10 {
            return Err(envelope_too_short("RX_IO_64"));
        }
        Ok(Self {
            source: Address64::from_be_bytes(body[0..8].try_into().unwrap()),
            rssi: body[8],
            options: ReceiveOptions::from_bits_truncate(body[9]),
            sample: IoSample::decode(&body[10..])?,
        })
    }

    pub fn encode(&self) -> BytesMut {
        let sample = self.sample.encode();
        let mut buf = BytesMut::with_capacity(10 + sample.len());
        buf.put_slice(&self.source.to_be_bytes());
        buf.put_u8(self.rssi);
        buf.put_u8(self.options.bits());
        buf.put_slice(&sample);
        buf
    }
}

/// `RX_IO_16` (0x83): legacy 802.15.4 IO sample addressed by 16-bit address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RxIo16 {
    pub source: Address16,
    pub rssi: u8,
    pub options: ReceiveOptions,
    pub sample: IoSample,
}

impl RxIo16 {
    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        if body.len() < 4 {
            return Err(envelope_too_short("RX_IO_16"));
        }
        Ok(Self {
            source: Address16::from_be_bytes(body[0..2].try_into().unwrap()),
            rssi: body[2],
            options: ReceiveOptions::from_bits_truncate(body[3]),
            sample: IoSample::decode(&body[4..])?,
        })
    }

    pub fn encode(&self) -> BytesMut {
        let sample = self.sample.encode();
        let mut buf = BytesMut::with_capacity(4 + sample.len());
        buf.put_slice(&self.source.to_be_bytes());
        buf.put_u8(self.rssi);
        buf.put_u8(self.options.bits());
        buf.put_slice(&sample);
        buf
    }
}

/// `IO_DATA_SAMPLE_RX_INDICATOR` (0x92): current ZigBee/DigiMesh IO sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoDataSampleRxIndicator {
    pub source: Address64,
    pub network_address: Address16,
    pub options: ReceiveOptions,
    pub sample: IoSample,
}

impl IoDataSampleRxIndicator {
    pub fn decode(body: &[u8]) -> Result<Self, XBeeError> {
        if body.len() < 11 {
            return Err(envelope_too_short("IO_DATA_SAMPLE_RX_INDICATOR"));
        }
        Ok(Self {
            source: Address64::from_be_bytes(body[0..8].try_into().unwrap()),
            network_address: Address16::from_be_bytes(body[8..10].try_into().unwrap()),
            options: ReceiveOptions::from_bits_truncate(body[10]),
            sample: IoSample::decode(&body[11..])?,
        })
    }

    pub fn encode(&self) -> BytesMut {
        let sample = self.sample.encode();
        let mut buf = BytesMut::with_capacity(11 + sample.len());
        buf.put_slice(&self.source.to_be_bytes());
        buf.put_slice(&self.network_address.to_be_bytes());
        buf.put_u8(self.options.bits());
        buf.put_slice(&sample);
        buf
    }
}

fn envelope_too_short(frame: &'static str) -> XBeeError {
    XBeeError::Decode {
        frame_type: 0,
        reason: format!("{frame} body shorter than the minimum required fields"),
    }
}

fn take_u16(body: &[u8], cursor: &mut usize) -> Result<u16, XBeeError> {
    if *cursor + 2 > body.len() {
        return Err(XBeeError::Decode {
            frame_type: 0,
            reason: "IO sample body truncated".into(),
        });
    }
    let v = u16::from_be_bytes([body[*cursor], body[*cursor + 1]]);
    *cursor += 2;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_variant_has_odd_body_length() {
        let sample = IoSample {
            variant: IoSampleVariant::Generic,
            digital_mask: 0b0000_0000_0000_0100, // D2
            analog_mask: 0b1000_0001,             // A0 + supply voltage
            digital_values: Some(0b0000_0000_0000_0100),
            analog_values: vec![(0, 0x02A1)],
            supply_voltage: Some(0x0241),
        };
        let bytes = sample.encode();
        assert_eq!(bytes.len() % 2, 1);
        assert_eq!(IoSample::decode(&bytes).unwrap(), sample);
    }

    #[test]
    fn raw_variant_has_even_body_length() {
        let sample = IoSample {
            variant: IoSampleVariant::Raw802_15_4,
            digital_mask: 0b1_0000_0001, // D0 + D8
            analog_mask: 0b0000_0101,    // A0 + A2
            digital_values: Some(0b1_0000_0001),
            analog_values: vec![(0, 0x0123), (2, 0x0456)],
            supply_voltage: None,
        };
        let bytes = sample.encode();
        assert_eq!(bytes.len() % 2, 0);
        assert_eq!(IoSample::decode(&bytes).unwrap(), sample);
    }

    #[test]
    fn no_digital_and_no_analog_channels_enabled() {
        let sample = IoSample {
            variant: IoSampleVariant::Raw802_15_4,
            digital_mask: 0,
            analog_mask: 0,
            digital_values: None,
            analog_values: vec![],
            supply_voltage: None,
        };
        let bytes = sample.encode();
        assert_eq!(bytes, vec![0x00, 0x00]);
        assert_eq!(IoSample::decode(&bytes).unwrap(), sample);
    }

    #[test]
    fn truncated_body_is_a_decode_error() {
        // Digital mask claims D0 is present but the value bytes are missing.
        assert!(IoSample::decode(&[0x00, 0x01]).is_err());
    }

    fn sample_fixture() -> IoSample {
        IoSample {
            variant: IoSampleVariant::Generic,
            digital_mask: 0,
            analog_mask: 0b1000_0000,
            digital_values: None,
            analog_values: vec![],
            supply_voltage: Some(0x0315),
        }
    }

    #[test]
    fn io_data_sample_rx_indicator_round_trips() {
        let frame = IoDataSampleRxIndicator {
            source: Address64::new(0x0013_A200_4059_8A7B),
            network_address: Address16::new(0x7D84),
            options: ReceiveOptions::empty(),
            sample: sample_fixture(),
        };
        let bytes = frame.encode();
        assert_eq!(IoDataSampleRxIndicator::decode(&bytes).unwrap(), frame);
    }

    #[test]
    fn rx_io_64_round_trips() {
        let frame = RxIo64 {
            source: Address64::BROADCAST,
            rssi: 0x20,
            options: ReceiveOptions::empty(),
            sample: sample_fixture(),
        };
        let bytes = frame.encode();
        assert_eq!(RxIo64::decode(&bytes).unwrap(), frame);
    }

    #[test]
    fn rx_io_16_round_trips() {
        let frame = RxIo16 {
            source: Address16::new(0x1234),
            rssi: 0x15,
            options: ReceiveOptions::empty(),
            sample: sample_fixture(),
        };
        let bytes = frame.encode();
        assert_eq!(RxIo16::decode(&bytes).unwrap(), frame);
    }
}
