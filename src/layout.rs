//! Variant layouts: where the timestamp bytes live inside the 16-byte identifier.
//!
//! Both layouts operate on the GUID memory image (see [`Uuid::to_guid_bytes()`]), which is how SQL
//! Server stores a `uniqueidentifier` and how most database drivers hand UUIDs to the server.
//!
//! | Layout          | Offset  | Transform                                             |
//! | --------------- | ------- | ----------------------------------------------------- |
//! | [`HighOrder`]   | byte 10 | none                                                  |
//! | [`StringOrder`] | byte 0  | reverse `0..4`, and `4..6` when six bytes are embedded |

use std::fmt;

use crate::Uuid;

/// A trait that splices timestamp bytes into a UUID and slices them back out.
///
/// Layouts are stateless; the functions never fail and never inspect the entropy bytes.
pub trait Layout: fmt::Debug + Send + Sync + 'static {
    /// Short name used in diagnostics.
    const NAME: &'static str;

    /// Returns a copy of `value` with `date` embedded at the layout's position.
    ///
    /// # Panics
    ///
    /// Panics if `date` is not 4 or 6 bytes long.
    fn embed(value: &Uuid, date: &[u8]) -> Uuid;

    /// Copies the embedded timestamp bytes of `comb` into `dst`.
    ///
    /// # Panics
    ///
    /// Panics if `dst` is not 4 or 6 bytes long.
    fn extract(comb: &Uuid, dst: &mut [u8]);
}

fn check_width(width: usize) {
    assert!(
        width == 4 || width == 6,
        "timestamp must be 4 or 6 bytes long, not {width}"
    );
}

/// Embeds the timestamp in the last six bytes, which SQL Server compares first.
///
/// Those bytes are stored identically in the memory image and the string form, so no reordering
/// is required and the timestamp is also visible at the end of the string representation.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct HighOrder;

impl HighOrder {
    const EMBED_AT: usize = 10;
}

impl Layout for HighOrder {
    const NAME: &'static str = "high-order";

    fn embed(value: &Uuid, date: &[u8]) -> Uuid {
        check_width(date.len());
        let mut image = value.to_guid_bytes();
        image[Self::EMBED_AT..Self::EMBED_AT + date.len()].copy_from_slice(date);
        Uuid::from_guid_bytes(image)
    }

    fn extract(comb: &Uuid, dst: &mut [u8]) {
        check_width(dst.len());
        let image = comb.to_guid_bytes();
        dst.copy_from_slice(&image[Self::EMBED_AT..Self::EMBED_AT + dst.len()]);
    }
}

/// Embeds the timestamp in the first bytes of the string representation, which PostgreSQL and
/// plain byte-wise comparison treat as most significant.
///
/// The first two fields are little-endian in the memory image, so they are reversed after the
/// bytes are copied in; the driver's own conversion back to network order then leaves the
/// timestamp in its written order.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct StringOrder;

impl StringOrder {
    /// Reverses the leading fields covered by a `width`-byte timestamp; self-inverse.
    fn swap_for_string_order(image: &mut [u8; 16], width: usize) {
        image[0..4].reverse();
        if width == 6 {
            image[4..6].reverse();
        }
    }
}

impl Layout for StringOrder {
    const NAME: &'static str = "string-order";

    fn embed(value: &Uuid, date: &[u8]) -> Uuid {
        check_width(date.len());
        let mut image = value.to_guid_bytes();
        image[..date.len()].copy_from_slice(date);
        Self::swap_for_string_order(&mut image, date.len());
        Uuid::from_guid_bytes(image)
    }

    fn extract(comb: &Uuid, dst: &mut [u8]) {
        check_width(dst.len());
        let mut image = comb.to_guid_bytes();
        Self::swap_for_string_order(&mut image, dst.len());
        dst.copy_from_slice(&image[..dst.len()]);
    }
}
