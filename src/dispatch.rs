//! Listener registries and typed-event dispatch (C4, §4.4, §6, §9).
//!
//! Per §9's design note ("prefer a dedicated completion primitive... for
//! synchronous request/response, distinct from the long-lived listener
//! registry"), this splits the source protocol's one "frame ID → callback"
//! map into two Rust-native primitives:
//!
//! - long-lived listeners are bounded `mpsc` channels, registered/removed by
//!   an opaque [`ListenerId`] — delivery is `try_send`, so a slow or dead
//!   listener never blocks the dispatcher and never receives its own
//!   packets out of order (a channel is inherently single-consumer and
//!   ordered, which gives the "never invoked concurrently with itself"
//!   invariant for free, matching the teacher's `irq_queue.rs` bounded
//!   mpsc pattern for IRQ fan-out).
//! - one-shot request/response waiters are `tokio::sync::oneshot`,
//!   registered against a specific frame ID and fired (and removed) at
//!   most once.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{mpsc, oneshot, Mutex};

use crate::frame::ble_unlock::BleUnlockResponse;
use crate::frame::io_sample::IoSample;
use crate::frame::ip::IpProtocol;
use crate::frame::modem_status::ModemStatus;
use crate::frame::receive::ReceiveOptions;
use crate::frame::user_data_relay::RelayInterface;
use crate::frame::{address::Address16, address::Address64, Frame};

const LISTENER_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A decoded, application-facing observation derived from an inbound
/// frame (§4.4 step 4). Distinct from [`Frame`], which is the raw wire
/// shape — an `Event` is the thing a typed listener actually wants.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    DataReceived {
        source64: Option<Address64>,
        source16: Option<Address16>,
        payload: Vec<u8>,
        broadcast: bool,
    },
    ExplicitDataReceived {
        source64: Address64,
        source16: Address16,
        payload: Vec<u8>,
        source_endpoint: u8,
        destination_endpoint: u8,
        cluster_id: u16,
        profile_id: u16,
        broadcast: bool,
    },
    IoSampleReceived {
        source64: Option<Address64>,
        source16: Option<Address16>,
        sample: IoSample,
    },
    ModemStatusReceived(ModemStatus),
    SmsReceived {
        phone_number: String,
        data: Vec<u8>,
    },
    IpDataReceived {
        address: [u8; 4],
        dest_port: u16,
        src_port: u16,
        protocol: IpProtocol,
        data: Vec<u8>,
    },
    UserDataRelayReceived {
        source_interface: RelayInterface,
        data: Vec<u8>,
    },
}

impl Event {
    /// Builds the typed event a frame produces, if any (§4.4 step 4's
    /// frame-type → typed-listener mapping). Request/status frames and
    /// `Unknown` produce no typed event.
    pub fn from_frame(frame: &Frame) -> Option<Event> {
        match frame {
            Frame::ReceivePacket(p) => Some(Event::DataReceived {
                source64: Some(p.source),
                source16: Some(p.network_address),
                payload: p.payload.clone(),
                broadcast: p.options.is_broadcast(),
            }),
            Frame::Rx64(p) => Some(Event::DataReceived {
                source64: Some(p.source),
                source16: None,
                payload: p.payload.clone(),
                broadcast: p.options.is_broadcast(),
            }),
            Frame::Rx16(p) => Some(Event::DataReceived {
                source64: None,
                source16: Some(p.source),
                payload: p.payload.clone(),
                broadcast: p.options.is_broadcast(),
            }),
            Frame::ExplicitRxIndicator(p) => Some(Event::ExplicitDataReceived {
                source64: p.source,
                source16: p.network_address,
                payload: p.payload.clone(),
                source_endpoint: p.source_endpoint,
                destination_endpoint: p.destination_endpoint,
                cluster_id: p.cluster_id,
                profile_id: p.profile_id,
                broadcast: p.options.is_broadcast(),
            }),
            Frame::IoDataSampleRxIndicator(p) => Some(Event::IoSampleReceived {
                source64: Some(p.source),
                source16: Some(p.network_address),
                sample: p.sample.clone(),
            }),
            Frame::RxIo64(p) => Some(Event::IoSampleReceived {
                source64: Some(p.source),
                source16: None,
                sample: p.sample.clone(),
            }),
            Frame::RxIo16(p) => Some(Event::IoSampleReceived {
                source64: None,
                source16: Some(p.source),
                sample: p.sample.clone(),
            }),
            Frame::ModemStatus(f) => Some(Event::ModemStatusReceived(f.status)),
            Frame::RxSms(s) => Some(Event::SmsReceived {
                phone_number: s.phone_number.clone(),
                data: s.data.clone(),
            }),
            Frame::RxIpv4(ip) => Some(Event::IpDataReceived {
                address: ip.address,
                dest_port: ip.dest_port,
                src_port: ip.src_port,
                protocol: ip.protocol,
                data: ip.data.clone(),
            }),
            Frame::UserDataRelayOutput(r) => Some(Event::UserDataRelayReceived {
                source_interface: r.source_interface,
                data: r.data.clone(),
            }),
            Frame::Tx64(_)
            | Frame::Tx16(_)
            | Frame::AtCommand(_)
            | Frame::RemoteAtCommandRequest(_)
            | Frame::TransmitRequest(_)
            | Frame::ExplicitAddressingCommand(_)
            | Frame::TxSms(_)
            | Frame::TxIpv4(_)
            | Frame::TxRequestTlsProfile(_)
            | Frame::BleUnlock(_)
            | Frame::BleUnlockResponse(_)
            | Frame::UserDataRelay(_)
            | Frame::AtCommandResponse(_)
            | Frame::TxStatus(_)
            | Frame::TransmitStatus(_)
            | Frame::RemoteAtCommandResponse(_)
            | Frame::Unknown(_) => None,
        }
    }
}

/// The frame ID carried by a frame, for frames whose shape includes one
/// (§3's "needs frame ID" predicate).
fn frame_id_of(frame: &Frame) -> Option<u8> {
    match frame {
        Frame::Tx64(f) => Some(f.frame_id),
        Frame::Tx16(f) => Some(f.frame_id),
        Frame::AtCommand(f) => Some(f.frame_id),
        Frame::RemoteAtCommandRequest(f) => Some(f.frame_id),
        Frame::TransmitRequest(f) => Some(f.frame_id),
        Frame::ExplicitAddressingCommand(f) => Some(f.frame_id),
        Frame::TxSms(f) => Some(f.frame_id),
        Frame::TxIpv4(f) => Some(f.frame_id),
        Frame::TxRequestTlsProfile(f) => Some(f.frame_id),
        Frame::UserDataRelay(f) => Some(f.frame_id),
        Frame::AtCommandResponse(f) => Some(f.frame_id),
        Frame::RemoteAtCommandResponse(f) => Some(f.frame_id),
        Frame::TransmitStatus(f) => Some(f.frame_id),
        Frame::TxStatus(f) => Some(f.frame_id),
        _ => None,
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FrameStatistics {
    pub frames_dispatched: u64,
    pub frames_unknown: u64,
    pub listeners_dropped: u64,
}

struct Waiter {
    frame_id: u8,
    sender: oneshot::Sender<Frame>,
}

#[derive(Default)]
struct Inner {
    all_frames: Vec<(ListenerId, mpsc::Sender<Frame>)>,
    packet_by_id: Vec<(ListenerId, Option<u8>, mpsc::Sender<Frame>)>,
    waiters: Vec<Waiter>,
    data: Vec<(ListenerId, mpsc::Sender<Event>)>,
    explicit_data: Vec<(ListenerId, mpsc::Sender<Event>)>,
    io_sample: Vec<(ListenerId, mpsc::Sender<Event>)>,
    modem_status: Vec<(ListenerId, mpsc::Sender<Event>)>,
    sms: Vec<(ListenerId, mpsc::Sender<Event>)>,
    ip_data: Vec<(ListenerId, mpsc::Sender<Event>)>,
    user_data_relay: Vec<(ListenerId, mpsc::Sender<Event>)>,
    stats: FrameStatistics,
}

/// The three listener registries of §4.4, plus the one-shot waiter table
/// §9 asks to keep separate. Guarded by a single registry-wide mutex per
/// §5; callback delivery itself is a non-blocking `try_send`, so the lock
/// is held only for the bookkeeping, never across listener execution.
#[derive(Default)]
pub struct Registries {
    inner: Mutex<Inner>,
    next_id: AtomicU64,
}

macro_rules! add_remove {
    ($add_name:ident, $remove_name:ident, $field:ident, $item:ty) => {
        pub async fn $add_name(&self) -> (ListenerId, mpsc::Receiver<$item>) {
            let id = self.alloc_id();
            let (tx, rx) = mpsc::channel(LISTENER_CHANNEL_CAPACITY);
            self.inner.lock().await.$field.push((id, tx));
            (id, rx)
        }

        pub async fn $remove_name(&self, id: ListenerId) {
            self.inner.lock().await.$field.retain(|(i, _)| *i != id);
        }
    };
}

impl Registries {
    fn alloc_id(&self) -> ListenerId {
        ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Register an all-frames listener, or a packet-received listener
    /// filtered to one frame ID when `frame_id` is `Some` (§6).
    pub async fn add_packet_listener(&self, frame_id: Option<u8>) -> (ListenerId, mpsc::Receiver<Frame>) {
        let id = self.alloc_id();
        let (tx, rx) = mpsc::channel(LISTENER_CHANNEL_CAPACITY);
        let mut inner = self.inner.lock().await;
        match frame_id {
            None => inner.all_frames.push((id, tx)),
            Some(_) => inner.packet_by_id.push((id, frame_id, tx)),
        }
        (id, rx)
    }

    pub async fn remove_packet_listener(&self, id: ListenerId) {
        let mut inner = self.inner.lock().await;
        inner.all_frames.retain(|(i, _)| *i != id);
        inner.packet_by_id.retain(|(i, _, _)| *i != id);
    }

    add_remove!(add_data_listener, remove_data_listener, data, Event);
    add_remove!(
        add_explicit_data_listener,
        remove_explicit_data_listener,
        explicit_data,
        Event
    );
    add_remove!(
        add_io_sample_listener,
        remove_io_sample_listener,
        io_sample,
        Event
    );
    add_remove!(
        add_modem_status_listener,
        remove_modem_status_listener,
        modem_status,
        Event
    );
    add_remove!(add_sms_listener, remove_sms_listener, sms, Event);
    add_remove!(add_ip_data_listener, remove_ip_data_listener, ip_data, Event);
    add_remove!(
        add_user_data_relay_listener,
        remove_user_data_relay_listener,
        user_data_relay,
        Event
    );

    /// Register a one-shot waiter for the response to an outbound frame
    /// with the given frame ID (§9's dedicated completion primitive). The
    /// caller is responsible for applying its own timeout around the
    /// returned receiver (§5).
    pub async fn wait_for_frame_id(&self, frame_id: u8) -> oneshot::Receiver<Frame> {
        let (tx, rx) = oneshot::channel();
        self.inner.lock().await.waiters.push(Waiter {
            frame_id,
            sender: tx,
        });
        rx
    }

    /// Deregister the waiter for `frame_id` (§5: a timed-out request
    /// "deregisters the waiter"). A no-op if the matching frame already
    /// arrived and removed it during dispatch, or if none was registered.
    pub async fn remove_waiter(&self, frame_id: u8) {
        self.inner
            .lock()
            .await
            .waiters
            .retain(|w| w.frame_id != frame_id);
    }

    pub async fn statistics(&self) -> FrameStatistics {
        self.inner.lock().await.stats
    }

    /// Drop every outstanding one-shot waiter (§5's `close()` contract):
    /// dropping the sender fails the matching receiver with `RecvError`,
    /// which callers map to "interface closed".
    pub async fn close_all_waiters(&self) {
        self.inner.lock().await.waiters.clear();
    }

    /// Deliver one inbound frame to every matching listener and waiter
    /// (§4.4 steps 2, 4, 5). Never blocks: delivery is `try_send`, so a
    /// listener that isn't keeping up drops frames rather than stalling
    /// the reader loop.
    pub async fn dispatch(&self, frame: &Frame) {
        let mut inner = self.inner.lock().await;
        inner.stats.frames_dispatched += 1;
        if matches!(frame, Frame::Unknown(_)) {
            inner.stats.frames_unknown += 1;
        }

        let mut dropped = 0u64;
        inner.all_frames.retain(|(_, tx)| {
            let ok = tx.try_send(frame.clone()).is_ok();
            if !ok {
                dropped += 1;
            }
            ok
        });

        let frame_id = frame_id_of(frame);
        inner.packet_by_id.retain(|(_, filter, tx)| {
            let matches = match filter {
                None => true,
                Some(wanted) => frame_id == Some(*wanted),
            };
            if !matches {
                return true;
            }
            let ok = tx.try_send(frame.clone()).is_ok();
            if !ok {
                dropped += 1;
            }
            ok
        });

        if let Some(id) = frame_id {
            let mut remaining = Vec::with_capacity(inner.waiters.len());
            for waiter in inner.waiters.drain(..) {
                if waiter.frame_id == id {
                    let _ = waiter.sender.send(frame.clone());
                } else {
                    remaining.push(waiter);
                }
            }
            inner.waiters = remaining;
        }

        if let Some(event) = Event::from_frame(frame) {
            let targets = match &event {
                Event::DataReceived { .. } => &mut inner.data,
                Event::ExplicitDataReceived { .. } => &mut inner.explicit_data,
                Event::IoSampleReceived { .. } => &mut inner.io_sample,
                Event::ModemStatusReceived(_) => &mut inner.modem_status,
                Event::SmsReceived { .. } => &mut inner.sms,
                Event::IpDataReceived { .. } => &mut inner.ip_data,
                Event::UserDataRelayReceived { .. } => &mut inner.user_data_relay,
            };
            targets.retain(|(_, tx)| {
                let ok = tx.try_send(event.clone()).is_ok();
                if !ok {
                    dropped += 1;
                }
                ok
            });
        }

        inner.stats.listeners_dropped += dropped;
    }
}
