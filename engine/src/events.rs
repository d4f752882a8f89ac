//! # Observable Events
//!
//! The engine's side-channel for external indexers and tests. Events are
//! appended in commit order; a failed operation emits nothing.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::collection::TokenId;
use crate::custodian::ProjectId;

/// One observable state change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A sale was created and registered with the custodian.
    SaleCreated {
        /// Address of the new sale.
        sale: Address,
        /// Project identifier it was registered under.
        project_id: ProjectId,
        /// The sale's fixed unit cap.
        max_units: u64,
        /// The sale's fixed unit price.
        unit_price: u64,
    },

    /// A sale accepted a payment and minted an asset.
    Received {
        /// The identity that paid.
        purchaser: Address,
        /// Id of the freshly minted asset.
        token_id: TokenId,
        /// The full attached amount.
        amount: u64,
        /// Units sold before this purchase (counts from 0).
        units_sold_before: u64,
    },

    /// A sale forwarded a payment to the custodian.
    Sent {
        /// The custodian address the funds went to.
        treasury: Address,
        /// The forwarded amount.
        amount: u64,
    },
}
