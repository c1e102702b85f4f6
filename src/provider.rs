//! COMB providers and related types.

use chrono::{DateTime, Utc};
use std::{fmt, iter::FusedIterator, marker::PhantomData, sync::Arc};
use tracing::debug;

use crate::{
    DateStrategy, Error, HighOrder, Layout, RandomUuid, Result, StringOrder, SystemClock,
    TimestampSource, Uuid, UuidSource,
};


/// The widest timestamp a provider embeds.
const MAX_DATE_BYTES: usize = 6;

/// A provider of COMBs sorted by SQL Server (timestamp in the trailing six bytes).
pub type SqlCombProvider = CombProvider<HighOrder>;

/// A provider of COMBs sorted by PostgreSQL and byte-wise comparison (timestamp in the leading
/// bytes of the string representation).
pub type PostgreSqlCombProvider = CombProvider<StringOrder>;

/// The operations shared by every provider, usable as `&dyn Comb` regardless of layout.
pub trait Comb: Send + Sync {
    /// Returns a new COMB made of a new base UUID and the current timestamp.
    fn create(&self) -> Result<Uuid>;

    /// Returns a new COMB made of `value` and the current timestamp.
    fn create_from(&self, value: Uuid) -> Result<Uuid>;

    /// Returns a new COMB made of a new base UUID and `timestamp`.
    fn create_at(&self, timestamp: DateTime<Utc>) -> Result<Uuid>;

    /// Returns a new COMB made of `value` and `timestamp`.
    fn create_core(&self, value: Uuid, timestamp: DateTime<Utc>) -> Result<Uuid>;

    /// Returns the timestamp embedded in `comb`.
    fn extract_timestamp(&self, comb: Uuid) -> Result<DateTime<Utc>>;

    /// Returns the timestamp embedded in `comb`, tolerating malformed bytes where the strategy can.
    fn extract_timestamp_lossy(&self, comb: Uuid) -> Result<DateTime<Utc>>;
}

/// Creates and decodes COMBs by pairing a [`DateStrategy`] with a [`Layout`].
///
/// The layout is part of the type ([`SqlCombProvider`] or [`PostgreSqlCombProvider`]) while the
/// strategy is chosen at construction. The base UUID and the current timestamp come from
/// replaceable sources, by default [`RandomUuid`] and [`SystemClock`].
///
/// A provider is immutable once built and can be shared freely across threads; the preconfigured
/// instances in [`providers`](crate::providers) are usually all an application needs.
///
/// # Examples
///
/// ```rust
/// use uuid_comb::{PostgreSqlCombProvider, UnixDateStrategy};
///
/// let provider = PostgreSqlCombProvider::new(UnixDateStrategy)?;
/// let comb = provider.create()?;
/// println!("{comb} was created at {}", provider.extract_timestamp(comb)?);
/// # Ok::<(), uuid_comb::Error>(())
/// ```
///
/// # Creator functions
///
/// | Flavor            | Base UUID | Timestamp |
/// | ----------------- | --------- | --------- |
/// | [`create`]        | Source    | Source    |
/// | [`create_from`]   | Argument  | Source    |
/// | [`create_at`]     | Source    | Argument  |
/// | [`create_core`]   | Argument  | Argument  |
///
/// All of them fail with [`Error::OutOfRange`] if the timestamp is outside the strategy's range.
///
/// [`create`]: CombProvider::create
/// [`create_from`]: CombProvider::create_from
/// [`create_at`]: CombProvider::create_at
/// [`create_core`]: CombProvider::create_core
pub struct CombProvider<L> {
    strategy: Arc<dyn DateStrategy>,
    num_date_bytes: usize,
    timestamp_source: Arc<dyn TimestampSource>,
    uuid_source: Arc<dyn UuidSource>,
    _layout: PhantomData<fn() -> L>,
}

impl<L: Layout> CombProvider<L> {
    /// Creates a provider with the default sources.
    ///
    /// Fails with [`Error::UnsupportedStrategy`] unless the strategy uses 4 or 6 bytes.
    pub fn new(strategy: impl DateStrategy + 'static) -> Result<Self> {
        Self::builder(strategy).build()
    }

    /// Creates a provider with the default sources around a shared strategy instance.
    ///
    /// Fails with [`Error::UnsupportedStrategy`] unless the strategy uses 4 or 6 bytes.
    pub fn from_shared(strategy: Arc<dyn DateStrategy>) -> Result<Self> {
        CombProviderBuilder::from_shared(strategy).build()
    }

    /// Returns a builder to configure the sources of a provider.
    pub fn builder(strategy: impl DateStrategy + 'static) -> CombProviderBuilder<L> {
        CombProviderBuilder::from_shared(Arc::new(strategy))
    }

    /// Creates a provider for one of the built-in six-byte strategies.
    pub(crate) fn with_builtin(strategy: impl DateStrategy + 'static) -> Self {
        debug_assert_eq!(strategy.num_date_bytes(), MAX_DATE_BYTES);
        Self {
            num_date_bytes: strategy.num_date_bytes(),
            strategy: Arc::new(strategy),
            timestamp_source: Arc::new(SystemClock),
            uuid_source: Arc::new(RandomUuid),
            _layout: PhantomData,
        }
    }

    /// Returns the date strategy in use.
    pub fn strategy(&self) -> &dyn DateStrategy {
        self.strategy.as_ref()
    }

    /// Returns the earliest timestamp this provider can embed.
    pub fn min_timestamp(&self) -> DateTime<Utc> {
        self.strategy.min_timestamp()
    }

    /// Returns the latest timestamp this provider can embed.
    pub fn max_timestamp(&self) -> DateTime<Utc> {
        self.strategy.max_timestamp()
    }

    /// Returns a new COMB made of a new base UUID and the current timestamp.
    pub fn create(&self) -> Result<Uuid> {
        self.create_core(self.uuid_source.new_uuid(), self.timestamp_source.timestamp())
    }

    /// Returns a new COMB made of `value` and the current timestamp.
    pub fn create_from(&self, value: Uuid) -> Result<Uuid> {
        self.create_core(value, self.timestamp_source.timestamp())
    }

    /// Returns a new COMB made of a new base UUID and `timestamp`.
    pub fn create_at(&self, timestamp: DateTime<Utc>) -> Result<Uuid> {
        self.create_core(self.uuid_source.new_uuid(), timestamp)
    }

    /// Returns a new COMB made of `value` with its timestamp bytes replaced by `timestamp`.
    ///
    /// `value` itself is left untouched, as are all bytes of the result outside the layout's
    /// timestamp range.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chrono::{DateTime, Utc};
    /// use uuid_comb::{providers, Uuid};
    ///
    /// let t = "2000-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
    ///
    /// let comb = providers::sql().create_core(Uuid::NIL, t)?;
    /// assert_eq!(comb.to_string(), "00000000-0000-0000-0000-00dc6acfac00");
    ///
    /// let comb = providers::postgresql().create_core(Uuid::NIL, t)?;
    /// assert_eq!(comb.to_string(), "00dc6acf-ac00-0000-0000-000000000000");
    /// # Ok::<(), uuid_comb::Error>(())
    /// ```
    pub fn create_core(&self, value: Uuid, timestamp: DateTime<Utc>) -> Result<Uuid> {
        let mut buffer = [0u8; MAX_DATE_BYTES];
        let date = &mut buffer[..self.num_date_bytes];
        self.strategy.write_timestamp(date, timestamp)?;
        Ok(L::embed(&value, date))
    }

    /// Returns the timestamp embedded in `comb`.
    ///
    /// Fails with [`Error::MalformedComb`] if the strategy recognizes that the bytes cannot have
    /// been produced by it.
    pub fn extract_timestamp(&self, comb: Uuid) -> Result<DateTime<Utc>> {
        let mut buffer = [0u8; MAX_DATE_BYTES];
        let date = &mut buffer[..self.num_date_bytes];
        L::extract(&comb, date);
        self.strategy.read_timestamp(date)
    }

    /// Returns the timestamp embedded in `comb`, letting the strategy replace malformed parts
    /// instead of failing.
    ///
    /// With [`SqlDateStrategy`](crate::SqlDateStrategy) a time of day outside a single day is read
    /// as midnight of the embedded date. Other built-in strategies never fail to decode, so this
    /// is the same as [`extract_timestamp()`](CombProvider::extract_timestamp) for them.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uuid_comb::{providers, Uuid};
    ///
    /// let comb = "00000000-0000-0000-0000-8eacffffffff".parse::<Uuid>()?;
    /// assert!(providers::legacy().extract_timestamp(comb).is_err());
    /// assert_eq!(
    ///     providers::legacy().extract_timestamp_lossy(comb)?.to_rfc3339(),
    ///     "2000-01-01T00:00:00+00:00"
    /// );
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn extract_timestamp_lossy(&self, comb: Uuid) -> Result<DateTime<Utc>> {
        let mut buffer = [0u8; MAX_DATE_BYTES];
        let date = &mut buffer[..self.num_date_bytes];
        L::extract(&comb, date);
        self.strategy.read_timestamp_lossy(date)
    }

    /// Returns an infinite iterator that calls [`create()`](CombProvider::create) for each item.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uuid_comb::providers;
    ///
    /// let batch = providers::postgresql().iter().take(8).collect::<Result<Vec<_>, _>>()?;
    /// assert_eq!(batch.len(), 8);
    /// # Ok::<(), uuid_comb::Error>(())
    /// ```
    pub fn iter(&self) -> Combs<'_, L> {
        Combs { provider: self }
    }
}

impl<L: Layout> Comb for CombProvider<L> {
    fn create(&self) -> Result<Uuid> {
        CombProvider::create(self)
    }

    fn create_from(&self, value: Uuid) -> Result<Uuid> {
        CombProvider::create_from(self, value)
    }

    fn create_at(&self, timestamp: DateTime<Utc>) -> Result<Uuid> {
        CombProvider::create_at(self, timestamp)
    }

    fn create_core(&self, value: Uuid, timestamp: DateTime<Utc>) -> Result<Uuid> {
        CombProvider::create_core(self, value, timestamp)
    }

    fn extract_timestamp(&self, comb: Uuid) -> Result<DateTime<Utc>> {
        CombProvider::extract_timestamp(self, comb)
    }

    fn extract_timestamp_lossy(&self, comb: Uuid) -> Result<DateTime<Utc>> {
        CombProvider::extract_timestamp_lossy(self, comb)
    }
}

impl<L> Clone for CombProvider<L> {
    fn clone(&self) -> Self {
        Self {
            strategy: Arc::clone(&self.strategy),
            num_date_bytes: self.num_date_bytes,
            timestamp_source: Arc::clone(&self.timestamp_source),
            uuid_source: Arc::clone(&self.uuid_source),
            _layout: PhantomData,
        }
    }
}

impl<L: Layout> fmt::Debug for CombProvider<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombProvider")
            .field("layout", &L::NAME)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

/// Configures the sources of a [`CombProvider`].
///
/// # Examples
///
/// ```rust
/// use uuid_comb::{MonotonicTimestampSource, SqlCombProvider, SqlDateStrategy, Uuid};
///
/// let provider = SqlCombProvider::builder(SqlDateStrategy)
///     .timestamp_source(MonotonicTimestampSource::new())
///     .uuid_source(|| Uuid::MAX)
///     .build()?;
/// assert_eq!(provider.create()?.as_bytes()[..10], [0xff; 10]);
/// # Ok::<(), uuid_comb::Error>(())
/// ```
pub struct CombProviderBuilder<L> {
    strategy: Arc<dyn DateStrategy>,
    timestamp_source: Option<Arc<dyn TimestampSource>>,
    uuid_source: Option<Arc<dyn UuidSource>>,
    _layout: PhantomData<fn() -> L>,
}

impl<L: Layout> CombProviderBuilder<L> {
    /// Creates a builder around a shared strategy instance.
    pub fn from_shared(strategy: Arc<dyn DateStrategy>) -> Self {
        Self {
            strategy,
            timestamp_source: None,
            uuid_source: None,
            _layout: PhantomData,
        }
    }

    /// Replaces the source of timestamps for `create()` and `create_from()`.
    pub fn timestamp_source(mut self, source: impl TimestampSource + 'static) -> Self {
        self.timestamp_source = Some(Arc::new(source));
        self
    }

    /// Replaces the source of base UUIDs for `create()` and `create_at()`.
    pub fn uuid_source(mut self, source: impl UuidSource + 'static) -> Self {
        self.uuid_source = Some(Arc::new(source));
        self
    }

    /// Builds the provider.
    ///
    /// Fails with [`Error::UnsupportedStrategy`] unless the strategy uses 4 or 6 bytes.
    pub fn build(self) -> Result<CombProvider<L>> {
        let num_date_bytes = self.strategy.num_date_bytes();
        if num_date_bytes != 4 && num_date_bytes != 6 {
            debug!(
                layout = L::NAME,
                num_date_bytes,
                strategy = ?self.strategy,
                "rejected date strategy"
            );
            return Err(Error::UnsupportedStrategy(num_date_bytes));
        }

        debug!(
            layout = L::NAME,
            num_date_bytes,
            strategy = ?self.strategy,
            "built COMB provider"
        );
        let timestamp_source: Arc<dyn TimestampSource> = match self.timestamp_source {
            Some(source) => source,
            None => Arc::new(SystemClock),
        };
        let uuid_source: Arc<dyn UuidSource> = match self.uuid_source {
            Some(source) => source,
            None => Arc::new(RandomUuid),
        };
        Ok(CombProvider {
            strategy: self.strategy,
            num_date_bytes,
            timestamp_source,
            uuid_source,
            _layout: PhantomData,
        })
    }
}

impl<L: Layout> fmt::Debug for CombProviderBuilder<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CombProviderBuilder")
            .field("layout", &L::NAME)
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

/// An infinite iterator of new COMBs, returned by [`CombProvider::iter()`].
pub struct Combs<'a, L> {
    provider: &'a CombProvider<L>,
}

impl<L: Layout> Iterator for Combs<'_, L> {
    type Item = Result<Uuid>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.provider.create())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl<L: Layout> FusedIterator for Combs<'_, L> {}

impl<L: Layout> fmt::Debug for Combs<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Combs").field(self.provider).finish()
    }
}
