//! Retry Backoff Module
//!
//! Delay policy applied between failed upstream attempts.

use std::time::Duration;

use rand::Rng;

// == Backoff ==
/// Delay strategy between upstream attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backoff {
    /// Retry straight away
    #[default]
    Immediate,
    /// Exponential growth with full jitter, capped at `max`
    Exponential { initial: Duration, max: Duration },
}

impl Backoff {
    /// Upper bound of the delay before retry number `retry` (1-based).
    pub fn ceiling(&self, retry: u32) -> Duration {
        match *self {
            Backoff::Immediate => Duration::ZERO,
            Backoff::Exponential { initial, max } => {
                let factor = 2u64.saturating_pow(retry.saturating_sub(1));
                let ms = (initial.as_millis() as u64).saturating_mul(factor);
                Duration::from_millis(ms.min(max.as_millis() as u64))
            }
        }
    }

    /// Delay before retry number `retry`, drawn uniformly from `[0, ceiling]`.
    pub fn delay(&self, retry: u32) -> Duration {
        let ceiling = self.ceiling(retry);
        if ceiling.is_zero() {
            return Duration::ZERO;
        }
        let ms = rand::thread_rng().gen_range(0..=ceiling.as_millis() as u64);
        Duration::from_millis(ms)
    }
}
