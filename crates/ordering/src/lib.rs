//! Order verification for catalog listings.
//!
//! Given the records returned by a sorted listing, [`assert_sorted_by_key`]
//! recomputes the order a conforming service must produce and reports the
//! first position where the actual listing diverges.
//!
//! The comparison rules are:
//!
//! - missing or `null` values compare as the empty string, which sorts first;
//! - strings compare case-insensitively;
//! - numbers and booleans compare numerically, and when a listing mixes them
//!   with strings the strings are coerced to numbers where they parse;
//! - records with equal values are ordered by `id` ascending, whatever the
//!   requested direction.

mod directive;
mod normalize;
mod verify;

pub use directive::{ParseSortOrderError, SortDirective, SortOrder};
pub use normalize::{normalize, Normalized};
pub use verify::{assert_sorted_by_key, expected_order, verify_order, OrderingViolation};
