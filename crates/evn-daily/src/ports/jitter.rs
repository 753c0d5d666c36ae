//! Jitter Source Port
//!
//! Randomness for the synthetic series is injected so golden-output
//! tests can pin it.

/// Lower bound of a jitter factor
pub const JITTER_MIN: f64 = 0.9;
/// Upper bound of a jitter factor
pub const JITTER_MAX: f64 = 1.1;

/// Produces multiplicative jitter factors in `[JITTER_MIN, JITTER_MAX]`
pub trait JitterSource: Send {
    fn next_factor(&mut self) -> f64;
}
