//! XBee API Frame Protocol Constants
//!
//! Wire-level constants from the XBee API frame specification: the framing
//! bytes, the escape set, and the fixed SRP-6a group parameters used by the
//! Bluetooth Unlock handshake.

/// Start-of-frame delimiter. Never escaped, even in API2 mode.
pub const START_DELIMITER: u8 = 0x7E;

/// Escape byte used in API2 (API_ESCAPE) mode.
pub const ESCAPE_BYTE: u8 = 0x7D;

/// XOR mask applied to an escaped byte's original value.
pub const ESCAPE_XOR: u8 = 0x20;

/// The four byte values that must be escaped in API2 mode.
pub const SPECIAL_BYTES: [u8; 4] = [START_DELIMITER, ESCAPE_BYTE, 0x11, 0x13];

/// 64-bit broadcast address.
pub const BROADCAST_ADDRESS_64: u64 = 0x0000_0000_0000_FFFF;

/// 16-bit "unknown"/"not yet discovered" address.
pub const UNKNOWN_ADDRESS_16: u16 = 0xFFFE;

/// Default per-byte read timeout (§6), in milliseconds.
pub const DEFAULT_BYTE_READ_TIMEOUT_MS: u64 = 300;

/// Default received-packet FIFO capacity (§6). Must be a power of two.
pub const DEFAULT_FIFO_CAPACITY: usize = 64;

/// Fixed SRP-6a username for the BLE Bluetooth Unlock handshake (§4.5).
pub const SRP_USERNAME: &str = "apiservice";

/// Default SRP-6a per-phase response timeout (§4.5), in seconds.
pub const DEFAULT_SRP_TIMEOUT_SECS: u64 = 20;

/// Length of the client/server SRP ephemeral values (1024-bit group), bytes.
pub const SRP_EPHEMERAL_LEN: usize = 128;

/// Length of the SRP salt carried in the phase-2 response, bytes.
pub const SRP_SALT_LEN: usize = 4;

/// Length of the client/server SRP proof values, bytes.
pub const SRP_PROOF_LEN: usize = 32;

/// Length of each of the TX/RX nonces derived on a successful handshake.
pub const SRP_NONCE_LEN: usize = 12;
