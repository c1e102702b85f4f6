use chrono::{DateTime, Utc};

/// A result type defaulting to this crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that COMB encoding and decoding can produce.
///
/// Every error is deterministic and input-dependent; retrying the same call yields the same
/// error.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The timestamp lies outside the window the date strategy can represent.
    ///
    /// Raised before any byte is written; values are never clamped.
    #[error("timestamp {timestamp} is outside the supported range {min} ..= {max}")]
    OutOfRange {
        /// The rejected timestamp.
        timestamp: DateTime<Utc>,
        /// The earliest timestamp the strategy accepts.
        min: DateTime<Utc>,
        /// The latest timestamp the strategy accepts.
        max: DateTime<Utc>,
    },

    /// The embedded bytes cannot have been produced by the date strategy.
    #[error("not a COMB: {0}")]
    MalformedComb(&'static str),

    /// A date strategy with a width other than 4 or 6 bytes was bound to a provider.
    #[error("date strategies must use either 4 or 6 bytes, not {0}")]
    UnsupportedStrategy(usize),
}
