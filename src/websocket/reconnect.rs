//! Reconnect backoff policy.

use std::time::Duration;

use crate::traits::{JITTER_MAX, JITTER_MIN};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 8;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_MAX_DELAY_MS: u64 = 12_000;

/// Backoff settings captured when a channel is built. Immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
        }
    }
}

impl ReconnectPolicy {
    /// Exponential delay for 0-based attempt `n`, before jitter:
    /// `min(base * 2^n, max)`.
    pub fn base_delay_ms(&self, attempt: u32) -> u64 {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        self.base_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms)
    }

    /// Final delay for attempt `n` given a jitter factor.
    ///
    /// The jittered amount is added on top of the exponential delay, so the
    /// result lies in `[delay, 1.5 * delay)`. Out-of-range factors are clamped.
    pub fn delay_for(&self, attempt: u32, jitter_factor: f64) -> Duration {
        let delay_ns = self.base_delay_ms(attempt).saturating_mul(1_000_000);
        let factor = clamp_factor(jitter_factor);
        // Float rounding must never push the jitter up to half the delay.
        let max_jitter_ns = delay_ns.div_ceil(2).saturating_sub(1);
        let jitter_ns = ((delay_ns as f64 * factor).floor() as u64).min(max_jitter_ns);
        Duration::from_nanos(delay_ns.saturating_add(jitter_ns))
    }

    /// Whether another reconnect may be scheduled after `attempts` tries.
    pub fn allows(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }
}

fn clamp_factor(factor: f64) -> f64 {
    if !factor.is_finite() || factor < JITTER_MIN {
        JITTER_MIN
    } else {
        factor.min(JITTER_MAX)
    }
}
