//! Process-wide preconfigured providers.
//!
//! Each function lazily builds its provider on first use and returns the same instance
//! afterwards. The instances use the default sources: a random UUIDv4 base and the system clock.
//!
//! | Function         | Layout            | Strategy              | Sorted by            |
//! | ---------------- | ----------------- | --------------------- | -------------------- |
//! | [`legacy()`]     | [`HighOrder`]     | [`SqlDateStrategy`]   | SQL Server           |
//! | [`sql()`]        | [`HighOrder`]     | [`UnixDateStrategy`]  | SQL Server           |
//! | [`postgresql()`] | [`StringOrder`]   | [`UnixDateStrategy`]  | PostgreSQL, strings  |
//!
//! [`HighOrder`]: crate::HighOrder
//! [`StringOrder`]: crate::StringOrder
//! [`SqlDateStrategy`]: crate::SqlDateStrategy
//! [`UnixDateStrategy`]: crate::UnixDateStrategy

use std::sync::OnceLock;

use crate::{PostgreSqlCombProvider, SqlCombProvider, SqlDateStrategy, UnixDateStrategy};

/// Returns the provider compatible with COMBs created by earlier releases, which store
/// SQL Server `datetime` values (1900-01-01 through 2079-06-06, ~3.33 ms resolution).
///
/// # Examples
///
/// ```rust
/// let comb = uuid_comb::providers::legacy().create()?;
/// println!("{comb}"); // e.g., "2ca4b2ce-6c13-40d4-bccf-b1d30186a16e"
/// # Ok::<(), uuid_comb::Error>(())
/// ```
pub fn legacy() -> &'static SqlCombProvider {
    static P: OnceLock<SqlCombProvider> = OnceLock::new();
    P.get_or_init(|| SqlCombProvider::with_builtin(SqlDateStrategy))
}

/// Returns the provider for SQL Server `uniqueidentifier` keys, storing Unix milliseconds in the
/// trailing six bytes.
///
/// # Examples
///
/// ```rust
/// let comb = uuid_comb::providers::sql().create()?;
/// println!("{comb}"); // e.g., "2ca4b2ce-6c13-40d4-bccf-018f4c1d3a2b"
/// # Ok::<(), uuid_comb::Error>(())
/// ```
pub fn sql() -> &'static SqlCombProvider {
    static P: OnceLock<SqlCombProvider> = OnceLock::new();
    P.get_or_init(|| SqlCombProvider::with_builtin(UnixDateStrategy))
}

/// Returns the provider for PostgreSQL `uuid` keys and string sorting, storing Unix milliseconds
/// in the leading six bytes.
///
/// # Examples
///
/// ```rust
/// let comb = uuid_comb::providers::postgresql().create()?;
/// println!("{comb}"); // e.g., "018f4c1d-3a2b-40d4-bccf-37d222820f6f"
/// # Ok::<(), uuid_comb::Error>(())
/// ```
pub fn postgresql() -> &'static PostgreSqlCombProvider {
    static P: OnceLock<PostgreSqlCombProvider> = OnceLock::new();
    P.get_or_init(|| PostgreSqlCombProvider::with_builtin(UnixDateStrategy))
}

#[cfg(test)]
mod tests {
    use super::{legacy, postgresql, sql};
    use crate::{DateStrategy, SqlDateStrategy, UnixDateStrategy};
    use chrono::{DateTime, Utc};

    const N_SAMPLES: usize = 100_000;
    thread_local!(static SAMPLES: Vec<String> = (0..N_SAMPLES)
        .map(|_| postgresql().create().unwrap().into())
        .collect());

    /// Returns the same instance on every call
    #[test]
    fn returns_the_same_instance_on_every_call() {
        assert!(std::ptr::eq(legacy(), legacy()));
        assert!(std::ptr::eq(sql(), sql()));
        assert!(std::ptr::eq(postgresql(), postgresql()));
    }

    /// Pairs the layouts with the expected strategies
    #[test]
    fn pairs_the_layouts_with_the_expected_strategies() {
        assert_eq!(legacy().min_timestamp(), SqlDateStrategy.min_timestamp());
        assert_eq!(legacy().max_timestamp(), SqlDateStrategy.max_timestamp());
        assert_eq!(sql().min_timestamp(), DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(sql().max_timestamp(), UnixDateStrategy.max_timestamp());
        assert_eq!(postgresql().max_timestamp(), UnixDateStrategy.max_timestamp());
        for p in [legacy(), sql()] {
            assert_eq!(p.strategy().num_date_bytes(), 6);
        }
        assert_eq!(postgresql().strategy().num_date_bytes(), 6);
    }

    /// Generates canonical string
    #[test]
    fn generates_canonical_string() {
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

    /// Generates string representation sortable down to the millisecond
    #[test]
    fn generates_string_representation_sortable_down_to_the_millisecond() {
        SAMPLES.with(|samples| {
            for i in 1..N_SAMPLES {
                assert!(samples[i - 1][..13] <= samples[i][..13]);
            }
        });
    }

    /// Encodes up-to-date timestamp
    #[test]
    fn encodes_up_to_date_timestamp() {
        for _ in 0..10_000 {
            let now = Utc::now().timestamp_millis();
            let mut timestamp = 0i64;
            for e in postgresql().create().unwrap().as_bytes().iter().take(6) {
                timestamp = timestamp * 256 + *e as i64;
            }
            assert!((now - timestamp).abs() < 16);

            let mut timestamp = 0i64;
            for e in sql().create().unwrap().as_bytes()[10..].iter() {
                timestamp = timestamp * 256 + *e as i64;
            }
            assert!((now - timestamp).abs() < 16);
        }
    }
}
