//! # xbee-rs
//!
//! A Rust crate for the XBee API-frame serial/BLE protocol: wire framing
//! (checksum + API2 escaping), a closed frame catalog, a reader loop with
//! listener registries, and an SRP-6a client for the BLE Bluetooth Unlock
//! handshake.
//!
//! ## Usage
//!
//! ```no_run
//! use std::time::Duration;
//! use xbee_rs::{XBeeConfig, XBeeInterface};
//!
//! # async fn example() -> Result<(), xbee_rs::XBeeError> {
//! let xbee = XBeeInterface::open_serial("/dev/ttyUSB0", 9600, XBeeConfig::default()).await?;
//! let response = xbee.send_at_command(*b"NI", vec![], Duration::from_secs(2)).await?;
//! println!("node identifier status: {:?}", response.status);
//! xbee.close().await;
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod framer;
pub mod logging;
pub mod reader;
pub mod srp;
pub mod transport;
pub mod util;

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub use config::{OperatingMode, XBeeConfig};
pub use dispatch::{Event, FrameStatistics, ListenerId, Registries};
pub use error::{FramingError, XBeeError};
pub use frame::{Frame, FrameType};
pub use logging::{init_logger, log_debug, log_error, log_info, log_warn};
pub use reader::{OutboundSender, PacketFifo, ReaderHandle};
pub use srp::{AuthError, FrameSink, SrpOutcome};
pub use transport::{ByteTransport, SerialTransport};

use frame::address::Address64;
use frame::at_command::{AtCommand, AtCommandResponse, AtCommandStatus};
use frame::transmit::{DeliveryStatus, TransmitOptions, TransmitRequest, TransmitStatus};

/// A single open XBee interface: the transport, its reader loop, and the
/// listener registries and FIFO it feeds (§4.4, §5, §6).
pub struct XBeeInterface {
    reader: Option<ReaderHandle>,
    outbound: OutboundSender,
    registries: Arc<Registries>,
    fifo: Arc<PacketFifo>,
    config: XBeeConfig,
    next_frame_id: AtomicU8,
}

impl XBeeInterface {
    /// Open a serial-backed interface and start its reader loop.
    pub async fn open_serial(
        port_name: impl Into<String>,
        baud_rate: u32,
        config: XBeeConfig,
    ) -> Result<Self, XBeeError> {
        let mut transport = SerialTransport::new(port_name, baud_rate, config.byte_read_timeout);
        transport.open().await?;
        Ok(Self::start(transport, config))
    }

    /// Start the reader loop over an already-open transport of any kind
    /// (serial, BLE, or a test double).
    pub fn start<T: ByteTransport + 'static>(transport: T, config: XBeeConfig) -> Self {
        let registries = Arc::new(Registries::default());
        let fifo = Arc::new(PacketFifo::new(config.fifo_capacity));
        let (reader, outbound) = reader::spawn(transport, config.mode, registries.clone(), fifo.clone());
        Self {
            reader: Some(reader),
            outbound,
            registries,
            fifo,
            config,
            next_frame_id: AtomicU8::new(1),
        }
    }

    /// Stop the reader loop and release the transport (§4.4 "Cancellation",
    /// §5 "`close()` is idempotent").
    pub async fn close(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.stop().await;
        }
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    /// Pop the oldest received packet, waiting if none is queued (§6's
    /// "packet-received" FIFO).
    pub async fn recv(&self) -> Frame {
        self.fifo.pop().await
    }

    /// Pop the oldest received packet without waiting.
    pub async fn try_recv(&self) -> Option<Frame> {
        self.fifo.try_pop().await
    }

    /// Enqueue a frame for the reader loop to write (§5: the only way
    /// application code touches the outbound wire).
    pub async fn send_frame(&self, frame: Frame) -> Result<(), XBeeError> {
        self.outbound.send_frame(frame).await
    }

    fn allocate_frame_id(&self) -> u8 {
        loop {
            let id = self.next_frame_id.fetch_add(1, Ordering::Relaxed);
            if id != 0 {
                return id;
            }
        }
    }

    /// Issue a local `AT_COMMAND` and await its `AT_COMMAND_RESPONSE`,
    /// failing with [`XBeeError::AtCommand`] on a non-OK status. `timeout`
    /// is the caller-provided ceiling on the whole request/response
    /// round-trip (§5: "every synchronous request/response... carries a
    /// caller-provided timeout").
    pub async fn send_at_command(
        &self,
        command: [u8; 2],
        parameter: Vec<u8>,
        timeout: Duration,
    ) -> Result<AtCommandResponse, XBeeError> {
        let frame_id = self.allocate_frame_id();
        let waiter = self.registries.wait_for_frame_id(frame_id).await;

        self.send_frame(Frame::AtCommand(AtCommand {
            frame_id,
            command,
            parameter,
            queued: false,
        }))
        .await?;

        let response = match tokio::time::timeout(timeout, waiter).await {
            Ok(Ok(Frame::AtCommandResponse(resp))) => resp,
            Ok(Ok(_other)) => return Err(XBeeError::Timeout),
            Ok(Err(_)) => {
                self.registries.remove_waiter(frame_id).await;
                return Err(XBeeError::NotOpen);
            }
            Err(_) => {
                self.registries.remove_waiter(frame_id).await;
                return Err(XBeeError::Timeout);
            }
        };

        if response.status != AtCommandStatus::Ok {
            return Err(XBeeError::AtCommand {
                status: response.status,
            });
        }
        Ok(response)
    }

    /// Send a `TRANSMIT_REQUEST` and await its `TRANSMIT_STATUS`, failing
    /// with [`XBeeError::TransmitFailed`] on a non-SUCCESS delivery status.
    /// `timeout` is the caller-provided ceiling on the whole round-trip
    /// (§5).
    pub async fn send_transmit_request(
        &self,
        destination: Address64,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> Result<TransmitStatus, XBeeError> {
        let frame_id = self.allocate_frame_id();
        let waiter = self.registries.wait_for_frame_id(frame_id).await;

        self.send_frame(Frame::TransmitRequest(TransmitRequest {
            frame_id,
            destination,
            network_address: frame::address::Address16::UNKNOWN,
            broadcast_radius: 0,
            options: TransmitOptions::empty(),
            payload,
        }))
        .await?;

        let status = match tokio::time::timeout(timeout, waiter).await {
            Ok(Ok(Frame::TransmitStatus(status))) => status,
            Ok(Ok(_other)) => return Err(XBeeError::Timeout),
            Ok(Err(_)) => {
                self.registries.remove_waiter(frame_id).await;
                return Err(XBeeError::NotOpen);
            }
            Err(_) => {
                self.registries.remove_waiter(frame_id).await;
                return Err(XBeeError::Timeout);
            }
        };

        if !status.delivery_status.is_success() {
            return Err(XBeeError::TransmitFailed {
                delivery_status: status.delivery_status,
            });
        }
        Ok(status)
    }

    /// Run the SRP-6a Bluetooth Unlock handshake over this interface (§4.5).
    pub async fn authenticate(&self, password: &[u8]) -> Result<SrpOutcome, AuthError> {
        let mut sink = self.outbound.clone();
        srp::authenticate(&mut sink, &self.registries, password, self.config.srp_timeout).await
    }
}

/// Keep `DeliveryStatus` reachable from the crate root for callers matching
/// on `send_transmit_request`'s failure without a deeper `use` path.
pub use frame::transmit::DeliveryStatus as TransmitDeliveryStatus;
