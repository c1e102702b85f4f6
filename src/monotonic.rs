//! Timestamp source that never repeats or goes backwards.

use chrono::{DateTime, TimeDelta, Utc};
use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};
use tracing::trace;

use crate::{SystemClock, TimestampSource};

/// The default spacing, chosen to exceed the ~3.33 ms resolution of
/// [`SqlDateStrategy`](crate::SqlDateStrategy).
const DEFAULT_INCREMENT_MS: i64 = 4;

/// A [`TimestampSource`] that returns strictly increasing timestamps spaced at least one
/// increment apart, even when called faster than the clock ticks.
///
/// Whenever the clock reading is less than one increment past the previously returned value, the
/// previous value plus the increment is returned instead. Timestamps therefore run ahead of the
/// clock under bursts and when the clock is set back, and catch up once the clock overtakes them.
///
/// Timestamps stop increasing once they reach `DateTime::<Utc>::MAX_UTC`, which is returned
/// from then on; that is far beyond the range of any [`DateStrategy`](crate::DateStrategy).
///
/// Clones share the same watermark, so one instance can feed several providers and threads:
///
/// ```rust
/// use uuid_comb::{MonotonicTimestampSource, SqlCombProvider, SqlDateStrategy};
///
/// let source = MonotonicTimestampSource::new();
/// let provider = SqlCombProvider::builder(SqlDateStrategy)
///     .timestamp_source(source.clone())
///     .build()?;
///
/// let mut prev = provider.extract_timestamp(provider.create()?)?;
/// for _ in 0..1_000 {
///     let curr = provider.extract_timestamp(provider.create()?)?;
///     assert!(prev < curr);
///     prev = curr;
/// }
/// # Ok::<(), uuid_comb::Error>(())
/// ```
///
/// The default increment of 4 ms suits [`SqlDateStrategy`](crate::SqlDateStrategy); with
/// [`UnixDateStrategy`](crate::UnixDateStrategy) it may be lowered to 1 ms.
#[derive(Clone)]
pub struct MonotonicTimestampSource {
    inner: Arc<Inner>,
}

struct Inner {
    last: Mutex<DateTime<Utc>>,
    increment: TimeDelta,
    clock: Box<dyn TimestampSource>,
}

impl MonotonicTimestampSource {
    /// Creates a source reading the system clock with a 4 ms increment.
    pub fn new() -> Self {
        Self::with_increment(TimeDelta::milliseconds(DEFAULT_INCREMENT_MS))
    }

    /// Creates a source reading the system clock with the given increment.
    ///
    /// # Panics
    ///
    /// Panics if `increment` is zero or negative.
    pub fn with_increment(increment: TimeDelta) -> Self {
        Self::with_clock(increment, SystemClock)
    }

    /// Creates a source reading `clock` with the given increment.
    ///
    /// # Panics
    ///
    /// Panics if `increment` is zero or negative.
    pub fn with_clock(increment: TimeDelta, clock: impl TimestampSource + 'static) -> Self {
        assert!(increment > TimeDelta::zero(), "`increment` must be positive");
        Self {
            inner: Arc::new(Inner {
                last: Mutex::new(DateTime::<Utc>::MIN_UTC),
                increment,
                clock: Box::new(clock),
            }),
        }
    }

    /// Returns the minimum spacing between two returned timestamps.
    pub fn increment(&self) -> TimeDelta {
        self.inner.increment
    }
}

impl Default for MonotonicTimestampSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimestampSource for MonotonicTimestampSource {
    fn timestamp(&self) -> DateTime<Utc> {
        let now = self.inner.clock.timestamp();
        let increment = self.inner.increment;

        // the watermark is a plain value, so a panic elsewhere cannot leave it half-written
        let mut last = self
            .inner
            .last
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if now - *last < increment {
            let bumped = last
                .checked_add_signed(increment)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            trace!(clock = %now, timestamp = %bumped, "advanced timestamp past clock reading");
            *last = bumped;
        } else {
            *last = now;
        }
        *last
    }
}

impl fmt::Debug for MonotonicTimestampSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonotonicTimestampSource")
            .field("increment", &self.inner.increment)
            .finish_non_exhaustive()
    }
}
