use chrono::{DateTime, Utc};

use super::{unix_epoch_plus_millis, DateStrategy};
use crate::Result;

/// The largest number of milliseconds that fits in 48 bits.
const MAX_MILLIS: i64 = (1 << 48) - 1;

/// Stores the Unix timestamp in milliseconds as a 48-bit big-endian unsigned integer.
///
/// The supported range is 1970-01-01T00:00:00Z through 10889-08-02T05:31:50.655Z. Timestamps
/// outside it are rejected rather than truncated to their low 48 bits. Any six bytes decode to a
/// timestamp, so decoding never fails.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct UnixDateStrategy;

impl DateStrategy for UnixDateStrategy {
    fn num_date_bytes(&self) -> usize {
        6
    }

    fn min_timestamp(&self) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH
    }

    fn max_timestamp(&self) -> DateTime<Utc> {
        unix_epoch_plus_millis(MAX_MILLIS)
    }

    fn write_timestamp(&self, dst: &mut [u8], timestamp: DateTime<Utc>) -> Result<()> {
        self.check_range(timestamp)?;
        dst.copy_from_slice(&timestamp.timestamp_millis().to_be_bytes()[2..]);
        Ok(())
    }

    fn read_timestamp(&self, src: &[u8]) -> Result<DateTime<Utc>> {
        let mut buffer = [0u8; 8];
        buffer[2..].copy_from_slice(src);
        Ok(unix_epoch_plus_millis(i64::from_be_bytes(buffer)))
    }
}
