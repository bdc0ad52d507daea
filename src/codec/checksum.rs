//! # Frame Checksum (C1)
//!
//! The XBee checksum is computed over the unescaped payload bytes only — it
//! never sees the delimiter, length prefix, or the escape encoding. Pure
//! arithmetic, no I/O.

/// Accumulates an 8-bit running sum over payload bytes and turns it into, or
/// validates it against, the frame's trailing checksum byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChecksumAccumulator {
    sum: u8,
}

impl ChecksumAccumulator {
    pub fn new() -> Self {
        Self { sum: 0 }
    }

    /// Fold one byte into the running sum.
    pub fn add(&mut self, byte: u8) -> &mut Self {
        self.sum = self.sum.wrapping_add(byte);
        self
    }

    /// Fold a slice of bytes into the running sum.
    pub fn add_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        for &b in bytes {
            self.add(b);
        }
        self
    }

    /// `0xFF - (sum mod 256)`, the byte to append to an outgoing frame.
    pub fn generate(&self) -> u8 {
        0xFF_u8.wrapping_sub(self.sum)
    }

    /// `true` iff `(sum + checksum) mod 256 == 0xFF`.
    pub fn validate(&self, checksum: u8) -> bool {
        self.sum.wrapping_add(checksum) == 0xFF
    }
}

/// Computes the checksum byte for a complete payload in one call.
pub fn checksum_generate(payload: &[u8]) -> u8 {
    ChecksumAccumulator::new().add_bytes(payload).generate()
}

/// Validates a payload against a received checksum byte.
pub fn checksum_validate(payload: &[u8], checksum: u8) -> bool {
    ChecksumAccumulator::new().add_bytes(payload).validate(checksum)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// E1 from spec.md §8: AT command "NI" with value "hello".
    #[test]
    fn e1_at_command_checksum() {
        let payload = [0x08, 0x01, 0x4E, 0x49, 0x68, 0x65, 0x6C, 0x6C, 0x6F];
        assert_eq!(checksum_generate(&payload), 0x4B);
        assert!(checksum_validate(&payload, 0x4B));
    }

    /// E2 from spec.md §8: AT_COMMAND_RESPONSE "OK" with value 01 02 03.
    #[test]
    fn e2_at_command_response_checksum() {
        let payload = [0x88, 0x01, 0x4E, 0x49, 0x00, 0x01, 0x02, 0x03];
        assert_eq!(checksum_generate(&payload), 0xD9);
    }

    #[test]
    fn wrong_checksum_fails_validation() {
        let payload = [0x08, 0x01, 0x4E, 0x49];
        let good = checksum_generate(&payload);
        assert!(!checksum_validate(&payload, good.wrapping_add(1)));
    }

    #[test]
    fn empty_payload_checksum_is_0xff() {
        assert_eq!(checksum_generate(&[]), 0xFF);
        assert!(checksum_validate(&[], 0xFF));
    }

    proptest::proptest! {
        #[test]
        fn checksum_always_validates_itself(payload: Vec<u8>) {
            let sum = checksum_generate(&payload);
            proptest::prop_assert!(checksum_validate(&payload, sum));
        }
    }
}
