use std::{cmp, fmt, ops, str};

/// Represents a Universally Unique IDentifier.
///
/// The bytes are held in the RFC 4122 order, i.e. the order of the canonical 8-4-4-4-12 string
/// representation and of the PostgreSQL `uuid` type. The derived [`Ord`] compares the bytes
/// lexicographically; use [`Uuid::cmp_sql_server()`] or [`SqlServerOrdered`] to compare values
/// the way SQL Server sorts `uniqueidentifier` columns.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Uuid([u8; 16]);

/// Positions of the GUID memory image bytes in the order SQL Server compares them.
const SQL_SERVER_ORDER: [usize; 16] = [10, 11, 12, 13, 14, 15, 8, 9, 6, 7, 4, 5, 0, 1, 2, 3];

impl Uuid {
    /// Nil UUID (00000000-0000-0000-0000-000000000000)
    pub const NIL: Self = Self([0x00; 16]);

    /// Max UUID (ffffffff-ffff-ffff-ffff-ffffffffffff)
    pub const MAX: Self = Self([0xff; 16]);

    /// Creates an object from a 16-byte array in the RFC 4122 (string) byte order.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Returns a reference to the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Returns the GUID memory image of this UUID.
    ///
    /// SQL Server and the .NET `Guid` type keep the first three fields (`time_low`, `time_mid`
    /// and `time_hi_and_version`) in little-endian byte order, so bytes `0..4`, `4..6` and `6..8`
    /// appear reversed compared to the string representation. The remaining eight bytes are
    /// identical in both orders.
    pub const fn to_guid_bytes(&self) -> [u8; 16] {
        swap_leading_fields(self.0)
    }

    /// Creates an object from a GUID memory image.
    ///
    /// This is the inverse of [`Uuid::to_guid_bytes()`].
    pub const fn from_guid_bytes(image: [u8; 16]) -> Self {
        Self(swap_leading_fields(image))
    }

    /// Compares two UUIDs the way SQL Server orders `uniqueidentifier` values.
    ///
    /// SQL Server starts with the last six bytes of the memory image, then moves leftwards group
    /// by group, so the trailing node bytes are the most significant.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::cmp::Ordering;
    /// use uuid_comb::Uuid;
    ///
    /// let x = "ffffffff-ffff-ffff-ffff-000000000000".parse::<Uuid>()?;
    /// let y = "00000000-0000-0000-0000-000000000001".parse::<Uuid>()?;
    /// assert_eq!(x.cmp(&y), Ordering::Greater);
    /// assert_eq!(x.cmp_sql_server(&y), Ordering::Less);
    /// # Ok::<(), uuid_comb::ParseError>(())
    /// ```
    pub fn cmp_sql_server(&self, other: &Self) -> cmp::Ordering {
        let (lhs, rhs) = (self.to_guid_bytes(), other.to_guid_bytes());
        SQL_SERVER_ORDER
            .iter()
            .map(|&i| lhs[i].cmp(&rhs[i]))
            .find(|o| o.is_ne())
            .unwrap_or(cmp::Ordering::Equal)
    }

    /// Returns the 8-4-4-4-12 hexadecimal string representation stored in a stack-allocated
    /// structure that can be dereferenced as `str` and [`Display`](fmt::Display)ed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use uuid_comb::Uuid;
    ///
    /// let x = "01809424-3e59-7c05-9219-566f82fff672".parse::<Uuid>()?;
    /// let y = x.encode();
    /// assert_eq!(&y as &str, "01809424-3e59-7c05-9219-566f82fff672");
    /// assert_eq!(format!("{}", y), "01809424-3e59-7c05-9219-566f82fff672");
    /// # Ok::<(), uuid_comb::ParseError>(())
    /// ```
    pub fn encode(&self) -> impl ops::Deref<Target = str> + fmt::Display {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";

        let mut buffer = [0u8; 36];
        let mut pos = 0;
        for (i, e) in self.0.iter().enumerate() {
            buffer[pos] = DIGITS[(e >> 4) as usize];
            buffer[pos + 1] = DIGITS[(e & 15) as usize];
            pos += 2;
            if i == 3 || i == 5 || i == 7 || i == 9 {
                buffer[pos] = b'-';
                pos += 1;
            }
        }
        debug_assert!(buffer.is_ascii());
        UuidStr(buffer)
    }
}

/// Reverses the `time_low`, `time_mid` and `time_hi_and_version` fields; self-inverse.
const fn swap_leading_fields(b: [u8; 16]) -> [u8; 16] {
    [
        b[3], b[2], b[1], b[0], b[5], b[4], b[7], b[6], b[8], b[9], b[10], b[11], b[12], b[13],
        b[14], b[15],
    ]
}

impl fmt::Display for Uuid {
    /// Returns the 8-4-4-4-12 canonical hexadecimal string representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl str::FromStr for Uuid {
    type Err = ParseError;

    /// Creates an object from the 8-4-4-4-12 hexadecimal string representation.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        const ERR: ParseError = ParseError {};
        let mut dst = [0u8; 16];
        let mut iter = src.chars();
        for (i, e) in dst.iter_mut().enumerate() {
            let hi = iter.next().ok_or(ERR)?.to_digit(16).ok_or(ERR)? as u8;
            let lo = iter.next().ok_or(ERR)?.to_digit(16).ok_or(ERR)? as u8;
            *e = (hi << 4) | lo;
            if (i == 3 || i == 5 || i == 7 || i == 9) && iter.next().ok_or(ERR)? != '-' {
                return Err(ERR);
            }
        }
        if iter.next().is_none() {
            Ok(Self(dst))
        } else {
            Err(ERR)
        }
    }
}

impl From<Uuid> for [u8; 16] {
    fn from(src: Uuid) -> Self {
        src.0
    }
}

impl From<[u8; 16]> for Uuid {
    fn from(src: [u8; 16]) -> Self {
        Self(src)
    }
}

impl AsRef<[u8]> for Uuid {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<Uuid> for u128 {
    fn from(src: Uuid) -> Self {
        Self::from_be_bytes(src.0)
    }
}

impl From<u128> for Uuid {
    fn from(src: u128) -> Self {
        Self(src.to_be_bytes())
    }
}

impl From<Uuid> for String {
    fn from(src: Uuid) -> Self {
        src.to_string()
    }
}

impl TryFrom<String> for Uuid {
    type Error = ParseError;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        src.parse()
    }
}

/// Concrete return type of [`Uuid::encode()`] containing the stack-allocated 8-4-4-4-12 string
/// representation.
struct UuidStr([u8; 36]);

impl ops::Deref for UuidStr {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        debug_assert!(self.0.is_ascii());
        unsafe { str::from_utf8_unchecked(&self.0) }
    }
}

impl fmt::Display for UuidStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }
}

/// Error parsing an invalid string representation of UUID.
#[derive(Clone, Eq, PartialEq, Hash, Debug, thiserror::Error)]
#[error("invalid string representation")]
pub struct ParseError {}

/// A [`Uuid`] wrapper whose [`Ord`] follows SQL Server's `uniqueidentifier` sort order.
///
/// Handy as a `BTreeMap` key or with `sort()` when checking how a high-order COMB will be laid out
/// in a SQL Server index.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct SqlServerOrdered(pub Uuid);

impl Ord for SqlServerOrdered {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.0.cmp_sql_server(&other.0)
    }
}

impl PartialOrd for SqlServerOrdered {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(feature = "uuid")]
#[cfg_attr(docsrs, doc(cfg(feature = "uuid")))]
mod uuid_support {
    use super::Uuid;

    impl From<Uuid> for uuid::Uuid {
        fn from(src: Uuid) -> Self {
            uuid::Uuid::from_bytes(src.0)
        }
    }

    impl From<uuid::Uuid> for Uuid {
        fn from(src: uuid::Uuid) -> Self {
            Self(src.into_bytes())
        }
    }
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
mod serde_support {
    use super::{fmt, Uuid};
    use serde::{de, Deserializer, Serializer};

    impl serde::Serialize for Uuid {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.serialize_str(&self.encode())
            } else {
                serializer.serialize_bytes(self.as_bytes())
            }
        }
    }

    impl<'de> serde::Deserialize<'de> for Uuid {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            if deserializer.is_human_readable() {
                deserializer.deserialize_str(VisitorImpl)
            } else {
                deserializer.deserialize_bytes(VisitorImpl)
            }
        }
    }

    struct VisitorImpl;

    impl de::Visitor<'_> for VisitorImpl {
        type Value = Uuid;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "a UUID representation")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            value.parse::<Self::Value>().map_err(de::Error::custom)
        }

        fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Self::Value, E> {
            <[u8; 16]>::try_from(value)
                .map(Self::Value::from)
                .map_err(de::Error::custom)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::Uuid;
        use serde_test::{assert_tokens, Configure, Token};

        /// Serializes and deserializes COMB values as strings or raw bytes
        #[test]
        fn serializes_and_deserializes_comb_values_as_strings_or_raw_bytes() {
            let cases = [
                ("00000000-0000-0000-0000-000000000000", &[0u8; 16]),
                (
                    "00dcb77e-ba00-4f3e-a2d1-6cbe0f5e1a77",
                    &[
                        0, 220, 183, 126, 186, 0, 79, 62, 162, 209, 108, 190, 15, 94, 26, 119,
                    ],
                ),
                (
                    "5b2a6f0c-93d4-4c1e-8f30-00dcb77eba00",
                    &[
                        91, 42, 111, 12, 147, 212, 76, 30, 143, 48, 0, 220, 183, 126, 186, 0,
                    ],
                ),
            ];

            for (text, bytes) in cases {
                let e = text.parse::<Uuid>().unwrap();
                assert_tokens(&e.readable(), &[Token::String(text)]);
                assert_tokens(&e.compact(), &[Token::Bytes(bytes)]);
            }
        }
    }
}
