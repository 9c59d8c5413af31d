//! Random source for reconnect jitter.

/// Lower bound (inclusive) of the jitter factor.
pub const JITTER_MIN: f64 = 0.2;
/// Upper bound (exclusive) of the jitter factor.
pub const JITTER_MAX: f64 = 0.5;

pub trait JitterSource: Send {
    /// Draw a factor in `[JITTER_MIN, JITTER_MAX)`.
    fn factor(&mut self) -> f64;
}
