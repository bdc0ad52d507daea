//! # Utility Modules
//!
//! Common helpers used throughout the crate: hex formatting for log output
//! and a rate limiter for noisy log conditions.

pub mod hex;
pub mod throttle;

pub use hex::{decode_hex, encode_hex, format_hex_compact};
pub use throttle::LogThrottle;
