//! # Engine Constants
//!
//! The few fixed parameters of the crowdsale model. Anything tunable per
//! deployment (prices, caps, identifiers) arrives through the public API
//! instead.

/// Minimum unit price a sale can be created with. Free sales are rejected
/// at construction.
pub const MIN_UNIT_PRICE: u64 = 1;

/// Minimum number of units a sale must offer.
pub const MIN_MAX_UNITS: u64 = 1;

/// The first token id a collection assigns. Ids are dense and sequential
/// from here; an id is never reused.
pub const FIRST_TOKEN_ID: u64 = 1;

/// Length of an address payload in bytes. Rendered as 40 hex characters
/// behind the `0x` prefix.
pub const ADDRESS_LENGTH: usize = 20;

/// Prefix for the textual address form.
pub const ADDRESS_PREFIX: &str = "0x";
