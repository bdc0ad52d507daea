//! # Byte Codec (C1)
//!
//! The arithmetic bottom layer the framer builds on: checksum accumulation
//! and the API2 escape transform. No I/O, no concurrency — every function
//! here is a pure function over byte slices.

pub mod checksum;
pub mod escape;

pub use checksum::{checksum_generate, checksum_validate, ChecksumAccumulator};
pub use escape::{escape, escape_byte, is_special, unescape};
