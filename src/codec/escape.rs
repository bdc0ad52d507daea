//! # API2 Escape Encoding (C1)
//!
//! In API2 (API_ESCAPE) mode every byte after the start delimiter whose
//! value is one of `0x7E`, `0x7D`, `0x11`, `0x13` is rewritten on the wire as
//! `0x7D` followed by the original value XORed with `0x20`. The delimiter
//! itself is never escaped — callers only ever pass this module bytes that
//! come *after* it.

use crate::constants::{ESCAPE_XOR, SPECIAL_BYTES};

/// `true` for `0x7E`, `0x7D`, `0x11`, `0x13`.
#[inline]
pub fn is_special(byte: u8) -> bool {
    SPECIAL_BYTES.contains(&byte)
}

/// XOR a byte with the API2 escape mask.
#[inline]
pub fn escape_byte(byte: u8) -> u8 {
    byte ^ ESCAPE_XOR
}

/// Escape a full buffer (payload + checksum, not the delimiter or length
/// prefix) for transmission in API2 mode.
pub fn escape(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for &b in data {
        if is_special(b) {
            out.push(crate::constants::ESCAPE_BYTE);
            out.push(escape_byte(b));
        } else {
            out.push(b);
        }
    }
    out
}

/// Unescape a full API2-encoded buffer back to its original bytes.
///
/// Returns `None` if an escape byte appears at the very end with nothing to
/// escape, or if an unescaped special byte is found where escaped data was
/// expected — both are protocol violations the caller should report as a
/// framing error rather than silently repair.
pub fn unescape(data: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len());
    let mut iter = data.iter().copied();
    while let Some(b) = iter.next() {
        if b == crate::constants::ESCAPE_BYTE {
            let next = iter.next()?;
            out.push(escape_byte(next));
        } else if is_special(b) {
            return None;
        } else {
            out.push(b);
        }
    }
    Some(out)
}
