//! The reader loop worker (C4, §4.4, §5): a dedicated task that owns the
//! transport, scans for frame delimiters, decodes frames, and fans them
//! out to the received-packet FIFO and the listener registries.
//!
//! Grounded in the teacher's `src/wmbus/radio/lora/irq_queue.rs`
//! `irq_processor_task`: a `tokio::select!` between a shutdown `oneshot`
//! and the next unit of work, with a bounded mpsc-backed queue on the
//! consumer side.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, Mutex, Notify};

use crate::config::OperatingMode;
use crate::constants::START_DELIMITER;
use crate::dispatch::Registries;
use crate::error::{FramingError, XBeeError};
use crate::frame::Frame;
use crate::framer::Framer;
use crate::srp::FrameSink;
use crate::transport::ByteTransport;
use crate::util::LogThrottle;

const OUTBOUND_QUEUE_CAPACITY: usize = 16;

/// The bounded, drop-oldest FIFO of received packets for polling
/// consumers (§4.4 step 1, §5's "multi-producer/multi-consumer but
/// single-producer in practice" queue).
pub struct PacketFifo {
    queue: Mutex<VecDeque<Frame>>,
    capacity: usize,
    notify: Notify,
}

impl PacketFifo {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            notify: Notify::new(),
        }
    }

    async fn push(&self, frame: Frame) {
        let mut queue = self.queue.lock().await;
        if queue.len() >= self.capacity {
            queue.pop_front();
            log::warn!("received-packet FIFO at capacity {}, dropping oldest", self.capacity);
        }
        queue.push_back(frame);
        drop(queue);
        self.notify.notify_one();
    }

    /// Pop the oldest packet, waiting if the FIFO is currently empty.
    pub async fn pop(&self) -> Frame {
        loop {
            if let Some(frame) = self.queue.lock().await.pop_front() {
                return frame;
            }
            self.notify.notified().await;
        }
    }

    /// Pop the oldest packet without waiting.
    pub async fn try_pop(&self) -> Option<Frame> {
        self.queue.lock().await.pop_front()
    }

    pub async fn len(&self) -> usize {
        self.queue.lock().await.len()
    }
}

/// A handle to a spawned reader loop. Dropping this without calling
/// [`ReaderHandle::stop`] leaves the worker running; `stop()` is the
/// documented shutdown path (§4.4's "Cancellation").
pub struct ReaderHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<()>,
}

impl ReaderHandle {
    /// Signal the worker to stop after its current byte, then wait for it
    /// to exit. Idempotent: calling `stop()` twice is a no-op the second
    /// time (§5: "`close()` is idempotent and safe from any thread").
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.task).await;
    }
}

struct OutboundRequest {
    frame: Frame,
    ack: oneshot::Sender<Result<(), XBeeError>>,
}

/// The only way to write a frame once the reader loop owns the transport
/// (§5: "No other threads touch transport bytes... application threads
/// interact with the core only by... enqueueing outbound frames"). Cloning
/// this shares the same underlying queue to the worker.
#[derive(Clone)]
pub struct OutboundSender {
    tx: mpsc::Sender<OutboundRequest>,
}

impl OutboundSender {
    pub async fn send_frame(&self, frame: Frame) -> Result<(), XBeeError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(OutboundRequest { frame, ack: ack_tx })
            .await
            .map_err(|_| XBeeError::NotOpen)?;
        ack_rx.await.map_err(|_| XBeeError::NotOpen)?
    }
}

#[async_trait]
impl FrameSink for OutboundSender {
    async fn send(&mut self, frame: Frame) -> Result<(), XBeeError> {
        self.send_frame(frame).await
    }
}

/// Spawn the reader loop as a dedicated task over `transport`, decoding
/// frames with `mode` framing, pushing them onto `fifo`, notifying
/// `registries` (§4.4 step 1 onward), and serializing outbound writes
/// through the returned [`OutboundSender`].
pub fn spawn<T>(
    transport: T,
    mode: OperatingMode,
    registries: Arc<Registries>,
    fifo: Arc<PacketFifo>,
) -> (ReaderHandle, OutboundSender)
where
    T: ByteTransport + 'static,
{
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
    let task = tokio::spawn(run(
        transport,
        mode,
        registries,
        fifo,
        shutdown_rx,
        outbound_rx,
    ));
    (
        ReaderHandle {
            shutdown: Some(shutdown_tx),
            task,
        },
        OutboundSender { tx: outbound_tx },
    )
}

async fn run<T>(
    transport: T,
    mode: OperatingMode,
    registries: Arc<Registries>,
    fifo: Arc<PacketFifo>,
    mut shutdown_rx: oneshot::Receiver<()>,
    mut outbound_rx: mpsc::Receiver<OutboundRequest>,
) where
    T: ByteTransport + 'static,
{
    let mut framer = Framer::new(transport, mode);
    let mut framing_error_throttle = LogThrottle::new(1000, 5);

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                log::debug!("reader loop received stop signal");
                break;
            }
            result = read_one_frame(&mut framer) => {
                match result {
                    Ok(frame) => {
                        fifo.push(frame.clone()).await;
                        registries.dispatch(&frame).await;
                    }
                    Err(XBeeError::Framing(e)) => {
                        // Malformed frame: log and resume scanning (§4.4,
                        // "Failure semantics", §7's framing-error policy).
                        if framing_error_throttle.allow() {
                            log::warn!("dropping malformed frame and resyncing: {e}");
                        }
                    }
                    Err(e) => {
                        log::error!("reader loop transport error, stopping: {e}");
                        break;
                    }
                }
            }
            Some(request) = outbound_rx.recv() => {
                let (tag, body) = request.frame.encode();
                let result = framer.write_frame(tag, &body).await;
                let _ = request.ack.send(result);
            }
        }
    }

    registries.close_all_waiters().await;
    if let Err(e) = framer.transport_mut().close().await {
        log::warn!("error closing transport after reader loop exit: {e}");
    }
}

/// Scan for the next start delimiter, then decode one complete frame
/// (§4.3 step 1, delegated here rather than into the framer).
async fn read_one_frame<T: ByteTransport>(framer: &mut Framer<T>) -> Result<Frame, XBeeError> {
    scan_for_delimiter(framer.transport_mut()).await?;
    let raw = framer.read_frame().await?;
    Ok(match raw.frame_type {
        Some(frame_type) => Frame::decode(frame_type, &raw.payload),
        // §8: a declared length of zero has no type byte at all; still
        // accepted, surfaced as an unknown frame rather than a failure.
        None => Frame::Unknown(crate::frame::unknown::UnknownFrame::new(0, Vec::new())),
    })
}

async fn scan_for_delimiter<T: ByteTransport>(transport: &mut T) -> Result<(), XBeeError> {
    loop {
        let mut buf = [0u8; 1];
        let n = transport.read(&mut buf).await?;
        if n == 0 {
            return Err(XBeeError::Framing(FramingError::Incomplete));
        }
        if buf[0] == START_DELIMITER {
            return Ok(());
        }
        log::debug!("discarding byte 0x{:02X} while scanning for start delimiter", buf[0]);
    }
}
