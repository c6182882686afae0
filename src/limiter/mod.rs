// src/limiter/mod.rs

use crate::config::RateWindowConfig;


/// Sliding-window rate limit check over a supplied timestamp history.
///
/// The function is pure: the caller supplies every relevant timestamp (in
/// milliseconds) and the newest one acts as "now", which keeps the check
/// deterministic and testable. A timestamp `t` counts toward the window when
/// `t > now - window_ms`; the limit is exceeded when that count is strictly
/// greater than `limit`. An empty history never exceeds.
pub fn is_window_exceeded(timestamps: &[u64], window_ms: u64, limit: usize) -> bool {
    let now = match timestamps.iter().max() {
        Some(&now) => now,
        None => return false,
    };

    // Signed arithmetic: the window may extend past timestamp zero
    let window_start = now as i128 - window_ms as i128;
    let in_window = timestamps
        .iter()
        .filter(|&&t| (t as i128) > window_start)
        .count();

    in_window > limit
}

impl RateWindowConfig {
    /// Convenience wrapper applying this window/limit pair to a history.
    pub fn is_exceeded(&self, timestamps: &[u64]) -> bool {
        is_window_exceeded(timestamps, self.window.as_millis() as u64, self.limit)
    }
}
