//! A deterministic fake clock, since `Date.now()`-equivalents aren't available to
//! code under test and real wall-clock time makes timing-sensitive assertions flaky.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// A clock that only advances when told to, starting at a fixed instant.
#[derive(Clone)]
pub struct FakeClock {
    millis: Arc<AtomicI64>,
}

impl FakeClock {
    /// A clock starting at `start_millis`.
    pub fn new(start_millis: i64) -> Self {
        Self { millis: Arc::new(AtomicI64::new(start_millis)) }
    }

    /// The current reading, in Unix milliseconds.
    pub fn now_ms(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }

    /// Advances the clock by `delta_ms` and returns the new reading.
    pub fn advance(&self, delta_ms: i64) -> i64 {
        self.millis.fetch_add(delta_ms, Ordering::SeqCst) + delta_ms
    }

    /// A boxed closure suitable for APIs that accept an injectable `now_ms` function.
    pub fn as_fn(&self) -> Arc<dyn Fn() -> i64 + Send + Sync> {
        let millis = self.millis.clone();
        Arc::new(move || millis.load(Ordering::SeqCst))
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(1_700_000_000_000)
    }
}
