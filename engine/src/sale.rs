//! # Crowdsale
//!
//! A single project's offer: a fixed number of units from one NFT
//! collection at a fixed unit price, with every accepted payment forwarded
//! to the custodian's treasury in the same call. The lifecycle is:
//!
//! 1. **Created** — the custodian instantiates the sale with validated
//!    parameters.
//! 2. **Active** — purchases are accepted while `units_sold < max_units`.
//! 3. **Exhausted** — terminal for purchases; administrative operations
//!    (ownership transfer) remain available.
//!
//! A purchase either fully commits (one asset minted, the counter bumped,
//! the full attached amount owed to the treasury) or leaves the sale
//! exactly as it was. The sale itself never touches account balances —
//! the engine moves money around the call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::Address;
use crate::collection::{CollectionError, MintAuthority, TokenId};
use crate::config::{MIN_MAX_UNITS, MIN_UNIT_PRICE};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during sale construction and purchases.
#[derive(Debug, Error)]
pub enum SaleError {
    /// Construction with a unit price below the minimum of 1.
    #[error("price too low: unit price is less than 1")]
    PriceTooLow,

    /// Construction with a unit cap below the minimum of 1.
    #[error("cap too low: max units is less than 1")]
    CapTooLow,

    /// Construction with the zero address as the treasury wallet.
    #[error("invalid wallet: treasury is the zero address")]
    InvalidWallet,

    /// The attached payment does not cover the unit price.
    #[error("insufficient payment: sent {sent}, unit price is {unit_price}")]
    InsufficientPayment {
        /// The attached amount.
        sent: u64,
        /// The sale's fixed unit price.
        unit_price: u64,
    },

    /// Every unit has been sold.
    #[error("cap reached: all {max_units} units sold")]
    CapReached {
        /// The sale's fixed cap.
        max_units: u64,
    },

    /// The collection refused to mint — typically the mint rights were
    /// never handed to this sale, or were revoked.
    #[error("mint rejected: {0}")]
    MintRejected(#[source] CollectionError),
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The outcome of one accepted purchase.
///
/// The engine turns this into the `Received`/`Sent` event pair and the
/// treasury forward.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    /// Id of the freshly minted asset.
    pub token_id: TokenId,
    /// The full attached amount, owed to the treasury.
    pub amount: u64,
    /// Units sold before this purchase (counts from 0).
    pub units_sold_before: u64,
}

/// A fixed-price, capped sale of units from one NFT collection.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Crowdsale {
    /// The sale's own address.
    address: Address,
    /// Price of one unit. Fixed at creation, at least 1.
    unit_price: u64,
    /// Maximum units this sale will ever sell. Fixed at creation, at least 1.
    max_units: u64,
    /// Units sold so far. Monotonically increasing, never exceeds
    /// `max_units`.
    units_sold: u64,
    /// Address of the collection this sale mints from. Immutable.
    collection: Address,
    /// Address of the custodian that receives proceeds. Immutable.
    treasury: Address,
    /// The sale's owner. Initially the custodian, transferable.
    owner: Address,
    /// Timestamp when the sale was created.
    created_at: DateTime<Utc>,
}

impl Crowdsale {
    /// Creates a new sale.
    ///
    /// Validation runs in order — price, cap, treasury — before any state
    /// is committed; a failing construction leaves no trace.
    ///
    /// # Errors
    ///
    /// Returns [`SaleError::PriceTooLow`] when `unit_price < 1`,
    /// [`SaleError::CapTooLow`] when `max_units < 1`, and
    /// [`SaleError::InvalidWallet`] when `treasury` is the zero address.
    pub fn new(
        address: Address,
        unit_price: u64,
        max_units: u64,
        collection: Address,
        treasury: Address,
        owner: Address,
    ) -> Result<Self, SaleError> {
        if unit_price < MIN_UNIT_PRICE {
            return Err(SaleError::PriceTooLow);
        }
        if max_units < MIN_MAX_UNITS {
            return Err(SaleError::CapTooLow);
        }
        if treasury.is_zero() {
            return Err(SaleError::InvalidWallet);
        }
        Ok(Self {
            address,
            unit_price,
            max_units,
            units_sold: 0,
            collection,
            treasury,
            owner,
            created_at: Utc::now(),
        })
    }

    /// Validates a purchase without committing anything.
    ///
    /// # Errors
    ///
    /// Returns [`SaleError::InsufficientPayment`] when `amount` is below
    /// the unit price, and [`SaleError::CapReached`] when the sale is
    /// exhausted. Overpayment is accepted; the full amount is forwarded.
    pub fn check_purchase(&self, amount: u64) -> Result<(), SaleError> {
        if amount < self.unit_price {
            return Err(SaleError::InsufficientPayment {
                sent: amount,
                unit_price: self.unit_price,
            });
        }
        if self.units_sold == self.max_units {
            return Err(SaleError::CapReached {
                max_units: self.max_units,
            });
        }
        Ok(())
    }

    /// Sells one unit: validates, mints to the purchaser, and bumps the
    /// counter.
    ///
    /// The mint is the only fallible step after validation; if the
    /// registry rejects it, the sale is untouched. Once the mint lands the
    /// remaining steps cannot fail, so the purchase as a whole is atomic.
    ///
    /// # Errors
    ///
    /// The [`check_purchase`](Self::check_purchase) errors, plus
    /// [`SaleError::MintRejected`] when the registry refuses — typically
    /// because the mint-rights handoff to this sale never happened.
    pub fn purchase(
        &mut self,
        purchaser: &Address,
        amount: u64,
        registry: &mut dyn MintAuthority,
    ) -> Result<PurchaseReceipt, SaleError> {
        self.check_purchase(amount)?;

        let token_id = registry
            .mint(&self.address, purchaser)
            .map_err(SaleError::MintRejected)?;

        let units_sold_before = self.units_sold;
        self.units_sold += 1;

        Ok(PurchaseReceipt {
            token_id,
            amount,
            units_sold_before,
        })
    }

    /// Reassigns the sale's owner. Does not otherwise affect sale state.
    pub fn set_owner(&mut self, new_owner: Address) {
        self.owner = new_owner;
    }

    /// `true` once every unit has been sold.
    pub fn is_exhausted(&self) -> bool {
        self.units_sold == self.max_units
    }

    /// The sale's own address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The fixed unit price.
    pub fn unit_price(&self) -> u64 {
        self.unit_price
    }

    /// The fixed unit cap.
    pub fn max_units(&self) -> u64 {
        self.max_units
    }

    /// Units sold so far.
    pub fn units_sold(&self) -> u64 {
        self.units_sold
    }

    /// Address of the collection this sale mints from.
    pub fn collection(&self) -> &Address {
        &self.collection
    }

    /// Address of the custodian receiving proceeds.
    pub fn treasury(&self) -> &Address {
        &self.treasury
    }

    /// The sale's current owner.
    pub fn owner(&self) -> &Address {
        &self.owner
    }
}
