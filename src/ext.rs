//! Shorthand conversions backed by [`providers::legacy()`].

use chrono::{DateTime, Utc};

use crate::{providers, Result, Uuid};

/// Turns a value into a COMB with the [legacy provider](providers::legacy).
///
/// A [`Uuid`] keeps its entropy bytes and gets the current time; a [`DateTime`] gets a new random
/// UUID.
///
/// # Examples
///
/// ```rust
/// use chrono::{DateTime, Utc};
/// use uuid_comb::{CombTimestamp, ToComb, Uuid};
///
/// let t = "2000-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
/// let comb = t.to_comb()?;
/// assert_eq!(comb.comb_timestamp()?, t);
///
/// let comb = Uuid::MAX.to_comb()?;
/// assert_eq!(comb.as_bytes()[..10], [0xff; 10]);
/// # Ok::<(), uuid_comb::Error>(())
/// ```
pub trait ToComb {
    /// Returns a new COMB made of `self`.
    fn to_comb(self) -> Result<Uuid>;
}

impl ToComb for Uuid {
    fn to_comb(self) -> Result<Uuid> {
        providers::legacy().create_from(self)
    }
}

impl ToComb for DateTime<Utc> {
    fn to_comb(self) -> Result<Uuid> {
        providers::legacy().create_at(self)
    }
}

/// Reads the timestamp of a COMB made by the [legacy provider](providers::legacy).
pub trait CombTimestamp {
    /// Returns the embedded timestamp, failing on a malformed time of day.
    fn comb_timestamp(&self) -> Result<DateTime<Utc>>;

    /// Returns the embedded timestamp, reading a malformed time of day as midnight.
    fn comb_timestamp_lossy(&self) -> Result<DateTime<Utc>>;
}

impl CombTimestamp for Uuid {
    fn comb_timestamp(&self) -> Result<DateTime<Utc>> {
        providers::legacy().extract_timestamp(*self)
    }

    fn comb_timestamp_lossy(&self) -> Result<DateTime<Utc>> {
        providers::legacy().extract_timestamp_lossy(*self)
    }
}
