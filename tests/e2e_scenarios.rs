//! End-to-end scenarios E2, E4, and E6 from spec.md §8, driven through the
//! public `XBeeInterface` rather than any one internal component — these
//! exercise the full path from raw bytes to a delivered `Frame`/`Event`.
//! E1, E3, and E5 are covered closer to the metal in `codec`/`framer`/`srp`'s
//! own unit tests and aren't repeated here.

mod common;

use std::time::Duration;

use common::MockTransport;
use xbee_rs::frame::at_command::AtCommandStatus;
use xbee_rs::{Event, Frame, OperatingMode, XBeeConfig, XBeeInterface};

fn config() -> XBeeConfig {
    XBeeConfig {
        mode: OperatingMode::Api,
        ..XBeeConfig::default()
    }
}

/// E2: AT_COMMAND_RESPONSE "OK" with value 01 02 03.
#[tokio::test]
async fn e2_parses_at_command_response() {
    let bytes = vec![
        0x7E, 0x00, 0x08, 0x88, 0x01, 0x4E, 0x49, 0x00, 0x01, 0x02, 0x03, 0xD9,
    ];
    let (transport, _tx) = MockTransport::new(bytes);
    let mut xbee = XBeeInterface::start(transport, config());

    let frame = tokio::time::timeout(Duration::from_secs(1), xbee.recv())
        .await
        .expect("frame should arrive");
    match frame {
        Frame::AtCommandResponse(resp) => {
            assert_eq!(resp.frame_id, 1);
            assert_eq!(resp.command, [b'N', b'I']);
            assert_eq!(resp.status, AtCommandStatus::Ok);
            assert_eq!(resp.value, vec![0x01, 0x02, 0x03]);
        }
        other => panic!("unexpected frame: {other:?}"),
    }

    xbee.close().await;
}

/// E4: RECEIVE_PACKET, broadcast bit set, payload "OK".
#[tokio::test]
async fn e4_receive_packet_reports_broadcast_data_event() {
    let payload = [
        0x90, 0x00, 0x13, 0xA2, 0x00, 0x40, 0x01, 0x02, 0x03, 0xFF, 0xFE, 0x02, 0x4F, 0x4B,
    ];
    let checksum = 0xFFu8.wrapping_sub(payload.iter().fold(0u8, |acc, &b| acc.wrapping_add(b)));
    let mut bytes = vec![0x7E, 0x00, payload.len() as u8];
    bytes.extend_from_slice(&payload);
    bytes.push(checksum);

    let (transport, _tx) = MockTransport::new(bytes);
    let mut xbee = XBeeInterface::start(transport, config());

    let (_id, mut events) = xbee.registries().add_data_listener().await;
    let event = tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .expect("event channel should not close")
        .expect("event should arrive");

    match event {
        Event::DataReceived {
            source64,
            payload,
            broadcast,
            ..
        } => {
            assert!(broadcast);
            assert_eq!(payload, b"OK".to_vec());
            assert_eq!(source64.unwrap().value(), 0x0013_A200_4001_0203);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    xbee.close().await;
}

/// E6: a reader must skip leading garbage, decode the frame, and resume
/// scanning for the next delimiter afterward.
#[tokio::test]
async fn e6_reader_resyncs_past_garbage_bytes() {
    let mut bytes = vec![0xFF, 0xFF];
    bytes.extend_from_slice(&[
        0x7E, 0x00, 0x05, 0x88, 0x01, 0x4E, 0x49, 0x00, 0xDF,
    ]);
    // A second, well-formed frame after the first to prove scanning resumed.
    bytes.extend_from_slice(&[0x7E, 0x00, 0x02, 0x8A, 0x06, 0x6F]);

    let (transport, _tx) = MockTransport::new(bytes);
    let mut xbee = XBeeInterface::start(transport, config());

    let first = tokio::time::timeout(Duration::from_secs(1), xbee.recv())
        .await
        .expect("first frame should arrive");
    assert!(matches!(first, Frame::AtCommandResponse(_)));

    let second = tokio::time::timeout(Duration::from_secs(1), xbee.recv())
        .await
        .expect("second frame should arrive after resync");
    match second {
        Frame::ModemStatus(f) => {
            assert_eq!(f.status, xbee_rs::frame::modem_status::ModemStatus::CoordinatorStarted)
        }
        other => panic!("unexpected frame: {other:?}"),
    }

    xbee.close().await;
}
