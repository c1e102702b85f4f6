use chrono::{DateTime, TimeDelta, Timelike, Utc};
use tracing::debug;

use super::{unix_epoch_plus_millis, DateStrategy};
use crate::{Error, Result};

/// 1900-01-01T00:00:00Z, the SQL Server `datetime` epoch, in Unix milliseconds.
const EPOCH_MS: i64 = -2_208_988_800_000;

const MS_PER_DAY: i64 = 86_400_000;

const TICKS_PER_DAY: f64 = 86_400.0 * 300.0;

const TICKS_PER_MILLISECOND: f64 = 3.0 / 10.0;

/// The legacy strategy that mirrors the SQL Server `datetime` binary layout.
///
/// The six bytes hold a big-endian `u16` count of whole days since 1900-01-01 followed by a
/// big-endian `i32` time of day in 1/300 second ticks. The supported range is therefore
/// 1900-01-01 through 2079-06-06 at a resolution of roughly 3.33 milliseconds.
///
/// Ticks are computed in floating point exactly as SQL Server does, so `.006` becomes one tick
/// while `.007` becomes two, and two ticks decode back to `.007`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct SqlDateStrategy;

impl DateStrategy for SqlDateStrategy {
    fn num_date_bytes(&self) -> usize {
        6
    }

    fn min_timestamp(&self) -> DateTime<Utc> {
        unix_epoch_plus_millis(EPOCH_MS)
    }

    fn max_timestamp(&self) -> DateTime<Utc> {
        unix_epoch_plus_millis(EPOCH_MS + u16::MAX as i64 * MS_PER_DAY)
    }

    fn write_timestamp(&self, dst: &mut [u8], timestamp: DateTime<Utc>) -> Result<()> {
        self.check_range(timestamp)?;

        let days = (timestamp - self.min_timestamp()).num_days() as u16;
        let ticks = (time_of_day_millis(&timestamp) * TICKS_PER_MILLISECOND) as i32;
        dst[..2].copy_from_slice(&days.to_be_bytes());
        dst[2..6].copy_from_slice(&ticks.to_be_bytes());
        Ok(())
    }

    fn read_timestamp(&self, src: &[u8]) -> Result<DateTime<Utc>> {
        let (days, ticks) = split(src);
        let ticks = check_ticks(ticks)?;
        Ok(self.compose(days, ticks))
    }

    /// Decodes a time component outside a single day as midnight instead of failing.
    fn read_timestamp_lossy(&self, src: &[u8]) -> Result<DateTime<Utc>> {
        let (days, ticks) = split(src);
        Ok(self.compose(days, check_ticks(ticks).unwrap_or(0)))
    }
}

impl SqlDateStrategy {
    fn compose(&self, days: u16, ticks: i32) -> DateTime<Utc> {
        let millis = (ticks as f64 / TICKS_PER_MILLISECOND).round() as i64;
        self.min_timestamp() + TimeDelta::days(days as i64) + TimeDelta::milliseconds(millis)
    }
}

/// Splits the six bytes into the day count and the time of day in ticks.
fn split(src: &[u8]) -> (u16, i32) {
    (
        u16::from_be_bytes([src[0], src[1]]),
        i32::from_be_bytes([src[2], src[3], src[4], src[5]]),
    )
}

fn check_ticks(ticks: i32) -> Result<i32> {
    if ticks < 0 {
        debug!(ticks, "rejected COMB with negative time of day");
        Err(Error::MalformedComb("time component is negative"))
    } else if ticks as f64 > TICKS_PER_DAY {
        debug!(ticks, "rejected COMB with time of day past midnight");
        Err(Error::MalformedComb("time component exceeds 24 hours"))
    } else {
        Ok(ticks)
    }
}

/// Returns the time of day in milliseconds, keeping 100-nanosecond precision.
///
/// A leap second is read as the last instant of 23:59:59 so that the result stays below a full
/// day.
fn time_of_day_millis(timestamp: &DateTime<Utc>) -> f64 {
    let nanos = timestamp.nanosecond().min(999_999_999);
    let ticks_100ns =
        timestamp.num_seconds_from_midnight() as u64 * 10_000_000 + (nanos / 100) as u64;
    ticks_100ns as f64 / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::{SqlDateStrategy, EPOCH_MS};
    use crate::{DateStrategy, Error};
    use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
    use rand::Rng;

    fn ts(text: &str) -> DateTime<Utc> {
        text.parse().unwrap()
    }

    /// Encodes prepared cases correctly
    #[test]
    fn encodes_prepared_cases_correctly() {
        let cases = [
            ("1900-01-01T00:00:00Z", [0x00, 0x00, 0x00, 0x00, 0x00, 0x00]),
            ("1900-01-01T00:00:00.006Z", [0x00, 0x00, 0x00, 0x00, 0x00, 0x01]),
            ("1900-01-01T00:00:00.007Z", [0x00, 0x00, 0x00, 0x00, 0x00, 0x02]),
            ("1900-01-02T00:00:01Z", [0x00, 0x01, 0x00, 0x00, 0x01, 0x2c]),
            ("1900-01-01T23:59:59.999Z", [0x00, 0x00, 0x01, 0x8b, 0x81, 0xff]),
            ("2000-01-01T00:00:00Z", [0x8e, 0xac, 0x00, 0x00, 0x00, 0x00]),
            ("2079-06-06T00:00:00Z", [0xff, 0xff, 0x00, 0x00, 0x00, 0x00]),
        ];

        let s = SqlDateStrategy;
        for (text, bytes) in cases {
            let mut dst = [0u8; 6];
            s.write_timestamp(&mut dst, ts(text)).unwrap();
            assert_eq!(dst, bytes, "{text}");
        }
    }

    /// Decodes two ticks to seven milliseconds
    #[test]
    fn decodes_two_ticks_to_seven_milliseconds() {
        let s = SqlDateStrategy;
        assert_eq!(
            s.read_timestamp(&[0, 0, 0, 0, 0, 2]),
            Ok(ts("1900-01-01T00:00:00.007Z"))
        );
        assert_eq!(
            s.read_timestamp(&[0x8e, 0xac, 0, 0, 0x01, 0x2c]),
            Ok(ts("2000-01-01T00:00:01Z"))
        );
    }

    /// Reports SQL Server datetime bounds
    #[test]
    fn reports_sql_server_datetime_bounds() {
        let s = SqlDateStrategy;
        assert_eq!(s.num_date_bytes(), 6);
        assert_eq!(s.min_timestamp(), ts("1900-01-01T00:00:00Z"));
        assert_eq!(s.max_timestamp(), ts("2079-06-06T00:00:00Z"));
    }

    /// Restores timestamps within four milliseconds
    #[test]
    fn restores_timestamps_within_four_milliseconds() {
        let s = SqlDateStrategy;
        let max_ms = s.max_timestamp().timestamp_millis();
        let mut rng = rand::thread_rng();
        for _ in 0..10_000 {
            let t = DateTime::<Utc>::UNIX_EPOCH
                + TimeDelta::milliseconds(rng.gen_range(EPOCH_MS..max_ms))
                + TimeDelta::nanoseconds(rng.gen_range(0..1_000_000));
            let mut dst = [0u8; 6];
            s.write_timestamp(&mut dst, t).unwrap();
            let delta = s.read_timestamp(&dst).unwrap() - t;
            assert!(delta.abs() <= TimeDelta::milliseconds(4), "{t}: {delta}");
        }
    }

    /// Encodes leap seconds as the end of the same day
    #[test]
    fn encodes_leap_seconds_as_the_end_of_the_same_day() {
        let s = SqlDateStrategy;
        for milli in [1_000, 1_500, 1_999] {
            let leap = NaiveDate::from_ymd_opt(2016, 12, 31)
                .and_then(|d| d.and_hms_milli_opt(23, 59, 59, milli))
                .unwrap()
                .and_utc();
            let mut dst = [0u8; 6];
            s.write_timestamp(&mut dst, leap).unwrap();
            assert_eq!(dst[2..], [0x01, 0x8b, 0x81, 0xff]);
            assert_eq!(
                s.read_timestamp(&dst),
                Ok(ts("2016-12-31T23:59:59.997Z")),
                "{leap}"
            );
        }
    }

    /// Rejects out-of-range timestamps without writing
    #[test]
    fn rejects_out_of_range_timestamps_without_writing() {
        let s = SqlDateStrategy;
        for text in ["1899-12-31T23:59:59.999Z", "2079-06-06T00:00:00.001Z", "1753-01-01T00:00:00Z"] {
            let mut dst = [0xaa; 6];
            assert_eq!(
                s.write_timestamp(&mut dst, ts(text)),
                Err(Error::OutOfRange {
                    timestamp: ts(text),
                    min: s.min_timestamp(),
                    max: s.max_timestamp(),
                })
            );
            assert_eq!(dst, [0xaa; 6]);
        }
    }

    /// Reads time components outside a single day as midnight when lossy
    #[test]
    fn reads_time_components_outside_a_single_day_as_midnight_when_lossy() {
        let s = SqlDateStrategy;
        for src in [
            [0x8e, 0xac, 0xff, 0xff, 0xff, 0xff],
            [0x8e, 0xac, 0x01, 0x8b, 0x82, 0x01],
        ] {
            assert!(s.read_timestamp(&src).is_err());
            assert_eq!(s.read_timestamp_lossy(&src), Ok(ts("2000-01-01T00:00:00Z")));
        }

        let valid = [0x8e, 0xac, 0x00, 0x00, 0x01, 0x2c];
        assert_eq!(s.read_timestamp_lossy(&valid), s.read_timestamp(&valid));
    }

    /// Rejects time components outside a single day
    #[test]
    fn rejects_time_components_outside_a_single_day() {
        let s = SqlDateStrategy;
        for src in [
            [0x00, 0x00, 0xff, 0xff, 0xff, 0xff],
            [0x12, 0x34, 0x80, 0x00, 0x00, 0x00],
            [0x00, 0x00, 0x01, 0x8b, 0x82, 0x01],
            [0x00, 0x00, 0x7f, 0xff, 0xff, 0xff],
        ] {
            assert!(matches!(s.read_timestamp(&src), Err(Error::MalformedComb(_))));
        }

        // a full day of ticks is still accepted and rolls over to the next midnight
        assert_eq!(
            s.read_timestamp(&[0x00, 0x00, 0x01, 0x8b, 0x82, 0x00]),
            Ok(ts("1900-01-02T00:00:00Z"))
        );
    }
}
