//! # Engine
//!
//! The host environment tying the entities together. The engine owns the
//! account [`Ledger`], the [`Custodian`], and every deployed
//! [`Crowdsale`] and [`NftCollection`], keyed by address. All mutating
//! operations go through it, one at a time — the engine is the
//! serialization point the call-level atomicity model assumes.
//!
//! ## Atomicity
//!
//! Every operation validates before it mutates. Where a call spans
//! entities (a purchase touches the purchaser's account, the collection,
//! the sale, and the custodian's pooled balance), the fallible steps are
//! sequenced so that a failure at any point leaves every balance, counter,
//! and registry exactly as it was:
//!
//! - pure checks first (price, cap, treasury headroom);
//! - the purchaser's debit next — on failure nothing else has moved;
//! - the mint next — on failure the debit is explicitly refunded;
//! - everything after the mint cannot fail.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::Address;
use crate::collection::{CollectionError, MintAuthority, NftCollection, TokenId};
use crate::custodian::{Custodian, CustodianError};
use crate::events::Event;
use crate::ledger::{Ledger, LedgerError};
use crate::sale::{Crowdsale, SaleError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Any failure an engine operation can surface.
///
/// Entity errors pass through transparently so callers can match on the
/// distinguishing reason, whether by variant or by display text.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An account ledger operation failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A collection operation failed.
    #[error(transparent)]
    Collection(#[from] CollectionError),

    /// A sale operation failed.
    #[error(transparent)]
    Sale(#[from] SaleError),

    /// A custodian operation failed.
    #[error(transparent)]
    Custodian(#[from] CustodianError),

    /// No sale is deployed at the given address.
    #[error("unknown sale: nothing deployed at {0}")]
    UnknownSale(Address),

    /// No collection is deployed at the given address.
    #[error("unknown collection: nothing deployed at {0}")]
    UnknownCollection(Address),
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The complete platform state: accounts, custodian, deployed sales and
/// collections, and the event log.
///
/// Serializable as a single document — the CLI persists one engine per
/// state file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CrowdsaleEngine {
    ledger: Ledger,
    custodian: Custodian,
    sales: BTreeMap<Address, Crowdsale>,
    collections: BTreeMap<Address, NftCollection>,
    events: Vec<Event>,
    /// Address-derivation counter. Strictly increasing; gaps are fine.
    nonce: u64,
}

impl CrowdsaleEngine {
    /// Creates an engine with a fresh custodian owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`CustodianError::InvalidAddress`] if `owner` is the zero
    /// address.
    pub fn new(owner: Address) -> Result<Self, EngineError> {
        let mut nonce = 0;
        let custodian_address = Address::derive("custodian", nonce);
        nonce += 1;
        let custodian = Custodian::new(custodian_address, owner)?;
        Ok(Self {
            ledger: Ledger::new(),
            custodian,
            sales: BTreeMap::new(),
            collections: BTreeMap::new(),
            events: Vec::new(),
            nonce,
        })
    }

    fn next_address(&mut self, tag: &str) -> Address {
        let address = Address::derive(tag, self.nonce);
        self.nonce += 1;
        address
    }

    /// Faucet/genesis credit to an account.
    pub fn fund_account(&mut self, account: &Address, amount: u64) -> Result<u64, EngineError> {
        Ok(self.ledger.credit(account, amount)?)
    }

    /// Deploys a new NFT collection owned by `deployer`.
    pub fn deploy_collection(
        &mut self,
        deployer: &Address,
        name: &str,
        symbol: &str,
        base_uri: &str,
    ) -> Result<Address, EngineError> {
        let address = self.next_address("collection");
        let collection =
            NftCollection::new(address.clone(), deployer.clone(), name, symbol, base_uri)?;
        self.collections.insert(address.clone(), collection);
        Ok(address)
    }

    /// Creates a sale for `project_id`, bound to this engine's custodian
    /// as fund recipient, and registers it.
    ///
    /// The new sale is initially owned by the custodian;
    /// [`transfer_sale_ownership`](Self::transfer_sale_ownership) moves it
    /// later. Emits [`Event::SaleCreated`].
    ///
    /// # Errors
    ///
    /// Returns [`CustodianError::InvalidAddress`] for a zero collection
    /// address and [`CustodianError::DuplicateProject`] for an already
    /// registered project; sale parameter failures
    /// ([`SaleError::PriceTooLow`], [`SaleError::CapTooLow`]) propagate.
    pub fn create_sale(
        &mut self,
        project_id: &str,
        unit_price: u64,
        max_units: u64,
        collection: &Address,
    ) -> Result<Address, EngineError> {
        self.custodian.validate_new_sale(project_id, collection)?;

        let address = self.next_address("sale");
        let treasury = self.custodian.address().clone();
        let sale = Crowdsale::new(
            address.clone(),
            unit_price,
            max_units,
            collection.clone(),
            treasury.clone(),
            // The custodian creates the sale and starts out owning it.
            treasury,
        )?;

        self.custodian
            .register_sale(project_id.to_string(), address.clone());
        self.sales.insert(address.clone(), sale);
        self.events.push(Event::SaleCreated {
            sale: address.clone(),
            project_id: project_id.to_string(),
            max_units,
            unit_price,
        });
        Ok(address)
    }

    /// Hands a collection's mint rights to `new_owner` — the out-of-band
    /// authorization step that must run before a sale can sell from the
    /// collection.
    pub fn grant_mint_rights(
        &mut self,
        caller: &Address,
        collection: &Address,
        new_owner: &Address,
    ) -> Result<(), EngineError> {
        let target = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| EngineError::UnknownCollection(collection.clone()))?;
        target.transfer_ownership(caller, new_owner)?;
        Ok(())
    }

    /// Buys one unit from the sale at `sale_address`, paying `amount` out
    /// of the purchaser's account.
    ///
    /// On success the purchaser owns a freshly minted asset, the sale's
    /// counter has advanced by one, and the full amount sits in the
    /// custodian's pooled balance. Emits [`Event::Received`] then
    /// [`Event::Sent`]. On any failure, nothing changed.
    pub fn purchase(
        &mut self,
        purchaser: &Address,
        sale_address: &Address,
        amount: u64,
    ) -> Result<TokenId, EngineError> {
        let sale = self
            .sales
            .get_mut(sale_address)
            .ok_or_else(|| EngineError::UnknownSale(sale_address.clone()))?;
        let collection = self
            .collections
            .get_mut(sale.collection())
            .ok_or_else(|| EngineError::UnknownCollection(sale.collection().clone()))?;

        // Pure pre-flight: no state is written until every check passes.
        sale.check_purchase(amount)?;
        self.custodian.check_receive(amount)?;

        // Take the payment, then mint. A rejected mint unwinds the debit
        // before the error propagates.
        self.ledger.debit(purchaser, amount)?;
        let receipt = match sale.purchase(purchaser, amount, collection) {
            Ok(receipt) => receipt,
            Err(err) => {
                self.ledger.refund(purchaser, amount);
                return Err(err.into());
            }
        };

        // Forward to the treasury. Infallible after the pre-flight.
        self.custodian.receive(receipt.amount);

        let treasury = sale.treasury().clone();
        self.events.push(Event::Received {
            purchaser: purchaser.clone(),
            token_id: receipt.token_id,
            amount: receipt.amount,
            units_sold_before: receipt.units_sold_before,
        });
        self.events.push(Event::Sent {
            treasury,
            amount: receipt.amount,
        });
        Ok(receipt.token_id)
    }

    /// Routes a bare value transfer.
    ///
    /// A transfer to a sale address is exactly a
    /// [`purchase`](Self::purchase) with the transferred amount; a
    /// transfer to the custodian is a plain deposit into the pooled
    /// balance; anything else moves funds between accounts.
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<Option<TokenId>, EngineError> {
        if self.sales.contains_key(to) {
            return self.purchase(from, to, amount).map(Some);
        }
        if to == self.custodian.address() {
            self.custodian.check_receive(amount)?;
            self.ledger.debit(from, amount)?;
            self.custodian.receive(amount);
            return Ok(None);
        }
        self.ledger.transfer(from, to, amount)?;
        Ok(None)
    }

    /// Drains the custodian's entire balance to `recipient`'s account.
    ///
    /// Returns the withdrawn amount — zero included, which is a successful
    /// no-op.
    pub fn withdraw_to(
        &mut self,
        caller: &Address,
        recipient: &Address,
    ) -> Result<u64, EngineError> {
        let amount = self
            .custodian
            .authorize_withdrawal(caller, recipient, None)?;
        self.ledger.credit(recipient, amount)?;
        self.custodian.commit_withdrawal(amount);
        Ok(amount)
    }

    /// Moves exactly `amount` from the custodian's balance to
    /// `recipient`'s account.
    pub fn withdraw_amount_to(
        &mut self,
        caller: &Address,
        recipient: &Address,
        amount: u64,
    ) -> Result<(), EngineError> {
        let amount = self
            .custodian
            .authorize_withdrawal(caller, recipient, Some(amount))?;
        self.ledger.credit(recipient, amount)?;
        self.custodian.commit_withdrawal(amount);
        Ok(())
    }

    /// Reassigns the owner of the sale registered under `project_id`.
    pub fn transfer_sale_ownership(
        &mut self,
        caller: &Address,
        project_id: &str,
        new_owner: &Address,
    ) -> Result<(), EngineError> {
        let sale_address = self
            .custodian
            .sale_transfer_target(caller, project_id, new_owner)?;
        let sale = self
            .sales
            .get_mut(&sale_address)
            .ok_or(EngineError::UnknownSale(sale_address))?;
        sale.set_owner(new_owner.clone());
        Ok(())
    }

    /// The registered sale address for a project, or the zero address.
    pub fn lookup_sale(&self, project_id: &str) -> Address {
        self.custodian.lookup_sale(project_id)
    }

    /// The sale deployed at `address`, if any.
    pub fn sale(&self, address: &Address) -> Option<&Crowdsale> {
        self.sales.get(address)
    }

    /// The collection deployed at `address`, if any.
    pub fn collection(&self, address: &Address) -> Option<&NftCollection> {
        self.collections.get(address)
    }

    /// The custodian.
    pub fn custodian(&self) -> &Custodian {
        &self.custodian
    }

    /// An account's ledger balance; 0 for accounts never credited.
    pub fn balance_of(&self, account: &Address) -> u64 {
        self.ledger.balance_of(account)
    }

    /// Every event emitted so far, in commit order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Drains the event log, handing ownership to the caller (e.g. an
    /// indexer that persists them elsewhere).
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    /// Deployed sales in address order.
    pub fn sales(&self) -> impl Iterator<Item = &Crowdsale> {
        self.sales.values()
    }

    /// Deployed collections in address order.
    pub fn collections(&self) -> impl Iterator<Item = &NftCollection> {
        self.collections.values()
    }
}
