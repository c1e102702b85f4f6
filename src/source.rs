//! Pluggable suppliers of base UUIDs and timestamps.

use chrono::{DateTime, Utc};

use crate::Uuid;

/// A trait for time sources that supply the timestamp of `create()` calls that don't take one.
///
/// Implemented by [`SystemClock`], [`MonotonicTimestampSource`](crate::MonotonicTimestampSource)
/// and by any `Fn() -> DateTime<Utc>` closure, which makes fixed clocks in tests a one-liner:
///
/// ```rust
/// use chrono::{DateTime, Utc};
/// use uuid_comb::{PostgreSqlCombProvider, UnixDateStrategy};
///
/// let fixed = "2020-02-02T20:20:20Z".parse::<DateTime<Utc>>().unwrap();
/// let provider = PostgreSqlCombProvider::builder(UnixDateStrategy)
///     .timestamp_source(move || fixed)
///     .build()?;
/// assert_eq!(provider.extract_timestamp(provider.create()?)?, fixed);
/// # Ok::<(), uuid_comb::Error>(())
/// ```
pub trait TimestampSource: Send + Sync {
    /// Returns the timestamp to embed.
    fn timestamp(&self) -> DateTime<Utc>;
}

impl<F: Fn() -> DateTime<Utc> + Send + Sync> TimestampSource for F {
    fn timestamp(&self) -> DateTime<Utc> {
        self()
    }
}

/// A trait for suppliers of the UUID whose entropy bytes a COMB keeps.
///
/// Implemented by [`RandomUuid`] and by any `Fn() -> Uuid` closure.
pub trait UuidSource: Send + Sync {
    /// Returns a new base UUID.
    fn new_uuid(&self) -> Uuid;
}

impl<F: Fn() -> Uuid + Send + Sync> UuidSource for F {
    fn new_uuid(&self) -> Uuid {
        self()
    }
}

/// The default time source: the current UTC wall-clock time.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct SystemClock;

impl TimestampSource for SystemClock {
    fn timestamp(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// The default UUID source: a fresh random UUIDv4 per call.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct RandomUuid;

impl UuidSource for RandomUuid {
    fn new_uuid(&self) -> Uuid {
        uuid4()
    }
}

/// Generates a random UUIDv4 object.
///
/// # Examples
///
/// ```rust
/// let uuid = uuid_comb::uuid4();
/// println!("{uuid}"); // e.g., "2ca4b2ce-6c13-40d4-bccf-37d222820f6f"
/// ```
pub fn uuid4() -> Uuid {
    let mut bytes: [u8; 16] = rand::random();
    bytes[6] = 0x40 | (bytes[6] >> 4);
    bytes[8] = 0x80 | (bytes[8] >> 2);
    Uuid::from(bytes)
}

#[cfg(test)]
mod tests {
    use super::{uuid4, RandomUuid, SystemClock, TimestampSource, UuidSource};
    use chrono::{TimeDelta, Utc};

    const N_SAMPLES: usize = 100_000;
    thread_local!(static SAMPLES: Vec<String> = (0..N_SAMPLES).map(|_| uuid4().into()).collect());

    /// Generates canonical UUIDv4 strings
    #[test]
    fn generates_canonical_uuidv4_strings() {
        let pattern = r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$";
        let re = regex::Regex::new(pattern).unwrap();
        SAMPLES.with(|samples| {
            for e in samples {
                assert!(re.is_match(e));
            }
        });
    }

    /// Generates 100k identifiers without collision
    #[test]
    fn generates_100k_identifiers_without_collision() {
        use std::collections::HashSet;
        SAMPLES.with(|samples| {
            let s: HashSet<&String> = samples.iter().collect();
            assert_eq!(s.len(), N_SAMPLES);
        });
    }

    /// Sets random bits at about even odds
    #[test]
    fn sets_random_bits_at_about_even_odds() {
        // count '1' of each bit
        let bins = SAMPLES.with(|samples| {
            let mut bins = [0u32; 128];
            for e in samples {
                let mut it = bins.iter_mut().rev();
                for c in e.chars().rev() {
                    if let Some(mut num) = c.to_digit(16) {
                        for _ in 0..4 {
                            *it.next().unwrap() += num & 1;
                            num >>= 1;
                        }
                    }
                }
            }
            bins
        });

        // set margin based on binom dist 99.999% confidence interval
        let margin = 4.417173 * (0.5 * 0.5 / N_SAMPLES as f64).sqrt();
        for i in (0..48).chain(52..64).chain(66..128) {
            let p = bins[i] as f64 / N_SAMPLES as f64;
            assert!((p - 0.5).abs() < margin, "random bit {i}: {p}");
        }
    }

    /// Supplies values through the default sources and closures
    #[test]
    fn supplies_values_through_the_default_sources_and_closures() {
        let before = Utc::now();
        let read = SystemClock.timestamp();
        assert!(before <= read && read - before < TimeDelta::seconds(1));

        assert_ne!(RandomUuid.new_uuid(), RandomUuid.new_uuid());

        let fixed: chrono::DateTime<Utc> = "2001-02-03T04:05:06Z".parse().unwrap();
        let clock = move || fixed;
        assert_eq!(clock.timestamp(), fixed);

        let nil = || crate::Uuid::NIL;
        assert_eq!(nil.new_uuid(), crate::Uuid::NIL);
    }
}
