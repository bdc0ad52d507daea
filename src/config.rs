//! Runtime configuration recognized by the core (§6).

use std::time::Duration;

use crate::constants::{DEFAULT_BYTE_READ_TIMEOUT_MS, DEFAULT_FIFO_CAPACITY, DEFAULT_SRP_TIMEOUT_SECS};

/// Framing mode: unescaped API1 or byte-stuffed API2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatingMode {
    /// API mode: frames are sent/received without escaping.
    Api,
    /// API2 (API_ESCAPE) mode: `0x7E`/`0x7D`/`0x11`/`0x13` are byte-stuffed.
    ApiEscaped,
}

impl OperatingMode {
    pub fn is_escaped(&self) -> bool {
        matches!(self, OperatingMode::ApiEscaped)
    }
}

/// Configuration for an open XBee interface (serial or BLE-backed).
#[derive(Debug, Clone)]
pub struct XBeeConfig {
    /// API vs API_ESCAPE framing.
    pub mode: OperatingMode,
    /// Per-byte read timeout while assembling a frame.
    pub byte_read_timeout: Duration,
    /// Capacity of the received-packet FIFO. Overflow drops the oldest entry.
    pub fifo_capacity: usize,
    /// Per-phase timeout for the SRP-6a Bluetooth Unlock handshake.
    pub srp_timeout: Duration,
}

impl Default for XBeeConfig {
    fn default() -> Self {
        Self {
            mode: OperatingMode::Api,
            byte_read_timeout: Duration::from_millis(DEFAULT_BYTE_READ_TIMEOUT_MS),
            fifo_capacity: DEFAULT_FIFO_CAPACITY,
            srp_timeout: Duration::from_secs(DEFAULT_SRP_TIMEOUT_SECS),
        }
    }
}
