//! Date strategies: conversion of timestamps to and from the bytes embedded in a COMB.

use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;

use crate::{Error, Result};

mod sql;
pub use sql::SqlDateStrategy;

mod unix;
pub use unix::UnixDateStrategy;

/// A trait that converts timestamps back and forth to a fixed number of big-endian bytes.
///
/// Strategies differ in epoch, resolution, range and in how many bytes of the UUID they overwrite.
/// A [`CombProvider`](crate::CombProvider) accepts strategies that use 4 or 6 bytes.
///
/// Implementations are expected to be stateless so that a single instance can be shared by any
/// number of providers and threads.
///
/// # Examples
///
/// A strategy that stores whole seconds since the Unix epoch in 4 bytes:
///
/// ```rust
/// use chrono::{DateTime, TimeDelta, Utc};
/// use uuid_comb::{DateStrategy, PostgreSqlCombProvider, Result};
///
/// #[derive(Debug)]
/// struct UnixSeconds;
///
/// impl DateStrategy for UnixSeconds {
///     fn num_date_bytes(&self) -> usize {
///         4
///     }
///
///     fn min_timestamp(&self) -> DateTime<Utc> {
///         DateTime::<Utc>::UNIX_EPOCH
///     }
///
///     fn max_timestamp(&self) -> DateTime<Utc> {
///         DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(u32::MAX as i64)
///     }
///
///     fn write_timestamp(&self, dst: &mut [u8], timestamp: DateTime<Utc>) -> Result<()> {
///         self.check_range(timestamp)?;
///         dst.copy_from_slice(&(timestamp.timestamp() as u32).to_be_bytes());
///         Ok(())
///     }
///
///     fn read_timestamp(&self, src: &[u8]) -> Result<DateTime<Utc>> {
///         let secs = u32::from_be_bytes([src[0], src[1], src[2], src[3]]);
///         Ok(DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(secs as i64))
///     }
/// }
///
/// let provider = PostgreSqlCombProvider::new(UnixSeconds)?;
/// let ts = "2024-02-29T12:34:56Z".parse::<DateTime<Utc>>().unwrap();
/// let comb = provider.create_at(ts)?;
/// assert_eq!(provider.extract_timestamp(comb)?, ts);
/// # Ok::<(), uuid_comb::Error>(())
/// ```
pub trait DateStrategy: fmt::Debug + Send + Sync {
    /// Returns the number of bytes the strategy reads and writes.
    fn num_date_bytes(&self) -> usize;

    /// Returns the earliest timestamp the strategy can encode.
    fn min_timestamp(&self) -> DateTime<Utc>;

    /// Returns the latest timestamp the strategy can encode.
    fn max_timestamp(&self) -> DateTime<Utc>;

    /// Writes `timestamp` into `dst`, most significant byte first.
    ///
    /// `dst` is exactly [`num_date_bytes()`](DateStrategy::num_date_bytes) long. Fails with
    /// [`Error::OutOfRange`] without touching `dst` if the timestamp is not representable.
    fn write_timestamp(&self, dst: &mut [u8], timestamp: DateTime<Utc>) -> Result<()>;

    /// Reads back a timestamp written by [`write_timestamp()`](DateStrategy::write_timestamp).
    ///
    /// `src` is exactly [`num_date_bytes()`](DateStrategy::num_date_bytes) long.
    fn read_timestamp(&self, src: &[u8]) -> Result<DateTime<Utc>>;

    /// Like [`read_timestamp()`](DateStrategy::read_timestamp), but substitutes a best-effort value
    /// for malformed input where the strategy knows one.
    ///
    /// The default implementation substitutes nothing and forwards to `read_timestamp()`.
    fn read_timestamp_lossy(&self, src: &[u8]) -> Result<DateTime<Utc>> {
        self.read_timestamp(src)
    }

    /// Fails with [`Error::OutOfRange`] unless `timestamp` lies within
    /// [`min_timestamp()`](DateStrategy::min_timestamp) ..=
    /// [`max_timestamp()`](DateStrategy::max_timestamp).
    fn check_range(&self, timestamp: DateTime<Utc>) -> Result<()> {
        let (min, max) = (self.min_timestamp(), self.max_timestamp());
        if timestamp < min || timestamp > max {
            Err(Error::OutOfRange {
                timestamp,
                min,
                max,
            })
        } else {
            Ok(())
        }
    }
}

/// Returns the timestamp `ms` milliseconds away from the Unix epoch.
///
/// Only used with the constant bounds of the built-in strategies, which are well within the range
/// of [`DateTime`].
fn unix_epoch_plus_millis(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + TimeDelta::milliseconds(ms)
}
