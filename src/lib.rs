//! Time-ordered COMB UUIDs for SQL Server and PostgreSQL primary keys
//!
//! ```rust
//! use uuid_comb::providers;
//!
//! let comb = providers::postgresql().create()?;
//! println!("{}", comb); // e.g. "018f4c1d-3a2b-40d4-bccf-37d222820f6f"
//! println!("{}", providers::postgresql().extract_timestamp(comb)?);
//! # Ok::<(), uuid_comb::Error>(())
//! ```
//!
//! A COMB ("combined GUID/timestamp") is a random UUID with some of its bytes overwritten by an
//! encoded timestamp, so that keys created later sort after keys created earlier while the rest of
//! the identifier keeps its entropy. Where the timestamp goes depends on which database sorts the
//! keys; how it is encoded depends on the date strategy.
//!
//! # Layouts
//!
//! SQL Server compares `uniqueidentifier` values starting from the last six bytes, whereas
//! PostgreSQL and plain string or byte comparisons start from the first byte. The two
//! [`Layout`]s put the timestamp where the target compares first:
//!
//! ```text
//! HighOrder (SqlCombProvider)
//!     xxxxxxxx-xxxx-xxxx-xxxx-TTTTTTTTTTTT
//!
//! StringOrder (PostgreSqlCombProvider)
//!     TTTTTTTT-TTTT-xxxx-xxxx-xxxxxxxxxxxx
//! ```
//!
//! Where `T` marks the timestamp and `x` marks bytes kept from the base UUID, including its
//! version and variant bits.
//!
//! # Date strategies
//!
//! - [`UnixDateStrategy`] stores milliseconds since 1970-01-01 in 48 bits, covering dates up to
//!   the year 10889 at millisecond resolution.
//! - [`SqlDateStrategy`] stores a SQL Server `datetime` value (days since 1900-01-01 and 1/300
//!   second ticks), covering 1900-01-01 through 2079-06-06. It exists for compatibility with
//!   COMBs created by earlier releases.
//!
//! Other encodings can be plugged in by implementing [`DateStrategy`] with 4 or 6 bytes.
//!
//! # Monotonicity
//!
//! The system clock may return the same value for calls in quick succession or may be set back.
//! Providers built with a [`MonotonicTimestampSource`] always embed strictly increasing
//! timestamps:
//!
//! ```rust
//! use uuid_comb::{MonotonicTimestampSource, SqlCombProvider, UnixDateStrategy};
//! use chrono::TimeDelta;
//!
//! let provider = SqlCombProvider::builder(UnixDateStrategy)
//!     .timestamp_source(MonotonicTimestampSource::with_increment(TimeDelta::milliseconds(1)))
//!     .build()?;
//!
//! let mut prev = provider.create()?;
//! for _ in 0..1_000 {
//!     let curr = provider.create()?;
//!     assert!(prev.cmp_sql_server(&curr).is_lt());
//!     prev = curr;
//! }
//! # Ok::<(), uuid_comb::Error>(())
//! ```
//!
//! # Crate features
//!
//! - `serde`: serializes [`Uuid`] as a string in human-readable formats and as bytes otherwise.
//! - `uuid`: converts [`Uuid`] to and from `uuid::Uuid`.

#![cfg_attr(docsrs, feature(doc_cfg))]

mod id;
pub use id::{ParseError, SqlServerOrdered, Uuid};

mod error;
pub use error::{Error, Result};

pub mod strategy;
#[doc(inline)]
pub use strategy::{DateStrategy, SqlDateStrategy, UnixDateStrategy};

pub mod layout;
#[doc(inline)]
pub use layout::{HighOrder, Layout, StringOrder};

mod source;
pub use source::{uuid4, RandomUuid, SystemClock, TimestampSource, UuidSource};

mod monotonic;
pub use monotonic::MonotonicTimestampSource;

mod provider;
pub use provider::{
    Comb, CombProvider, CombProviderBuilder, Combs, PostgreSqlCombProvider, SqlCombProvider,
};

pub mod providers;

mod ext;
pub use ext::{CombTimestamp, ToComb};
