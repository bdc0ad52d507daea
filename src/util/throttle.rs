//! # Rate-Limited Logging
//!
//! The reader loop can hit the same recoverable condition (a checksum
//! mismatch on a noisy link, a string of unknown frame types) many times in
//! a row. `LogThrottle` caps how often such a condition is actually logged
//! so it doesn't drown out everything else.

use std::time::Instant;

/// Throttling structure for rate-limiting log messages.
#[derive(Debug)]
pub struct LogThrottle {
    window_ms: u64,
    cap: u32,
    count: u32,
    t0: Instant,
}

impl LogThrottle {
    /// Create a new throttle: at most `cap` messages per `window_ms`.
    pub fn new(window_ms: u64, cap: u32) -> Self {
        Self {
            window_ms,
            cap,
            count: 0,
            t0: Instant::now(),
        }
    }

    /// Returns `true` if the caller should log, `false` if throttled.
    pub fn allow(&mut self) -> bool {
        let now = Instant::now();
        let elapsed_ms = now.duration_since(self.t0).as_millis() as u64;

        if elapsed_ms > self.window_ms {
            self.t0 = now;
            self.count = 0;
        }

        self.count += 1;
        self.count <= self.cap
    }

    /// Reset the throttle, starting a new window immediately.
    pub fn reset(&mut self) {
        self.t0 = Instant::now();
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_cap_then_throttles() {
        let mut throttle = LogThrottle::new(1000, 3);
        assert!(throttle.allow());
        assert!(throttle.allow());
        assert!(throttle.allow());
        assert!(!throttle.allow());
    }

    #[test]
    fn reset_starts_a_fresh_window() {
        let mut throttle = LogThrottle::new(1000, 2);
        assert!(throttle.allow());
        assert!(throttle.allow());
        assert!(!throttle.allow());

        throttle.reset();
        assert!(throttle.allow());
    }
}
