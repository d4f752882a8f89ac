//! # Custodian
//!
//! The factory and treasury for every sale on the platform. The custodian
//! registers one sale per project identifier, pools every forwarded payment
//! into a single balance, and exposes the owner-gated administrative
//! surface: full or partial withdrawal to arbitrary recipients, and
//! reassignment of a registered sale's ownership.
//!
//! Two invariants hold at all times:
//!
//! - `balance` equals everything ever forwarded minus everything ever
//!   withdrawn, and a withdrawal beyond the balance fails rather than
//!   underflows.
//! - A project identifier, once registered, maps to the same sale address
//!   forever — entries are never overwritten or removed.
//!
//! Withdrawals are two-phase (`authorize_withdrawal` is pure,
//! `commit_withdrawal` cannot fail) so the engine can sequence the fallible
//! ledger credit between the phases and keep both books consistent on any
//! failure.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::Address;

/// Human-readable key identifying one sale within the custodian's registry.
pub type ProjectId = String;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during custodian operations.
#[derive(Debug, Error)]
pub enum CustodianError {
    /// A required identity parameter is the zero address.
    #[error("invalid address: the zero address is not allowed")]
    InvalidAddress,

    /// The project identifier already has a registered sale.
    #[error("duplicate project: a sale is already registered for '{0}'")]
    DuplicateProject(ProjectId),

    /// The project identifier has no registered sale.
    #[error("project not found: no sale registered for '{0}'")]
    ProjectNotFound(ProjectId),

    /// The caller is not the custodian owner.
    #[error("not authorized: caller is not the custodian owner")]
    NotAuthorized,

    /// A withdrawal request exceeds the held balance.
    #[error("insufficient funds: requested {requested}, held {held}")]
    InsufficientFunds {
        /// The amount requested.
        requested: u64,
        /// The balance actually held.
        held: u64,
    },

    /// Receiving this amount would overflow the pooled balance.
    #[error("balance overflow: the treasury cannot receive this amount")]
    BalanceOverflow,
}

// ---------------------------------------------------------------------------
// Custodian
// ---------------------------------------------------------------------------

/// The sale factory and pooled treasury.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Custodian {
    /// The custodian's own address. Sales forward proceeds here.
    address: Address,
    /// The identity authorized to withdraw and to move sale ownership.
    owner: Address,
    /// Pooled funds from every sale.
    balance: u64,
    /// One entry per successfully created sale, keyed by project id.
    registry: BTreeMap<ProjectId, Address>,
    /// Timestamp when the custodian was created.
    created_at: DateTime<Utc>,
}

impl Custodian {
    /// Creates a custodian with an empty registry and zero balance.
    ///
    /// # Errors
    ///
    /// Returns [`CustodianError::InvalidAddress`] if `owner` is the zero
    /// address.
    pub fn new(address: Address, owner: Address) -> Result<Self, CustodianError> {
        if owner.is_zero() {
            return Err(CustodianError::InvalidAddress);
        }
        Ok(Self {
            address,
            owner,
            balance: 0,
            registry: BTreeMap::new(),
            created_at: Utc::now(),
        })
    }

    /// Validates the custodian-side preconditions for creating a sale,
    /// without mutating anything.
    ///
    /// # Errors
    ///
    /// Returns [`CustodianError::InvalidAddress`] if `collection` is the
    /// zero address, and [`CustodianError::DuplicateProject`] if
    /// `project_id` is already registered.
    pub fn validate_new_sale(
        &self,
        project_id: &str,
        collection: &Address,
    ) -> Result<(), CustodianError> {
        if collection.is_zero() {
            return Err(CustodianError::InvalidAddress);
        }
        if self.registry.contains_key(project_id) {
            return Err(CustodianError::DuplicateProject(project_id.to_string()));
        }
        Ok(())
    }

    /// Records a freshly created sale in the registry.
    ///
    /// Callers run [`validate_new_sale`](Self::validate_new_sale) first;
    /// the entry is permanent.
    pub(crate) fn register_sale(&mut self, project_id: ProjectId, sale: Address) {
        debug_assert!(!self.registry.contains_key(&project_id));
        self.registry.insert(project_id, sale);
    }

    /// The registered sale address for a project, or the zero address when
    /// absent. Pure read, never fails.
    pub fn lookup_sale(&self, project_id: &str) -> Address {
        self.registry
            .get(project_id)
            .cloned()
            .unwrap_or_else(Address::zero)
    }

    /// Checks that the pooled balance can absorb `amount`.
    ///
    /// The engine runs this in the pure phase of every fund-forwarding
    /// operation, so the [`receive`](Self::receive) commit itself never has
    /// a failure path.
    pub fn check_receive(&self, amount: u64) -> Result<(), CustodianError> {
        self.balance
            .checked_add(amount)
            .ok_or(CustodianError::BalanceOverflow)
            .map(|_| ())
    }

    /// Accepts a plain value transfer, increasing the pooled balance.
    ///
    /// Unconditional: a sale's forwarding step depends on this always
    /// succeeding. Callers pre-flight with
    /// [`check_receive`](Self::check_receive); saturation is unreachable
    /// after that.
    pub fn receive(&mut self, amount: u64) {
        self.balance = self.balance.saturating_add(amount);
    }

    /// Authorizes a withdrawal and resolves the amount to move, without
    /// mutating anything.
    ///
    /// `amount` of `None` means drain-all and resolves to the current
    /// balance — including zero, which is a successful no-op, not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`CustodianError::NotAuthorized`] unless `caller` is the
    /// owner, [`CustodianError::InvalidAddress`] for a zero `recipient`,
    /// and [`CustodianError::InsufficientFunds`] when a requested amount
    /// exceeds the balance.
    pub fn authorize_withdrawal(
        &self,
        caller: &Address,
        recipient: &Address,
        amount: Option<u64>,
    ) -> Result<u64, CustodianError> {
        if *caller != self.owner {
            return Err(CustodianError::NotAuthorized);
        }
        if recipient.is_zero() {
            return Err(CustodianError::InvalidAddress);
        }
        match amount {
            Some(requested) if requested > self.balance => Err(CustodianError::InsufficientFunds {
                requested,
                held: self.balance,
            }),
            Some(requested) => Ok(requested),
            None => Ok(self.balance),
        }
    }

    /// Removes an authorized amount from the pooled balance.
    ///
    /// Callers obtain `amount` from
    /// [`authorize_withdrawal`](Self::authorize_withdrawal) in the same
    /// call, so the subtraction cannot underflow.
    pub(crate) fn commit_withdrawal(&mut self, amount: u64) {
        debug_assert!(amount <= self.balance);
        self.balance = self.balance.saturating_sub(amount);
    }

    /// Resolves the sale a project's ownership transfer targets, checking
    /// every precondition. Pure; the engine applies the reassignment.
    ///
    /// # Errors
    ///
    /// Returns [`CustodianError::NotAuthorized`] unless `caller` is the
    /// owner, [`CustodianError::InvalidAddress`] for a zero `new_owner`,
    /// and [`CustodianError::ProjectNotFound`] for an unregistered project.
    pub fn sale_transfer_target(
        &self,
        caller: &Address,
        project_id: &str,
        new_owner: &Address,
    ) -> Result<Address, CustodianError> {
        if *caller != self.owner {
            return Err(CustodianError::NotAuthorized);
        }
        if new_owner.is_zero() {
            return Err(CustodianError::InvalidAddress);
        }
        self.registry
            .get(project_id)
            .cloned()
            .ok_or_else(|| CustodianError::ProjectNotFound(project_id.to_string()))
    }

    /// The custodian's own address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The identity authorized for the administrative surface.
    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// The pooled balance.
    pub fn balance(&self) -> u64 {
        self.balance
    }

    /// Registered projects in identifier order.
    pub fn projects(&self) -> impl Iterator<Item = (&str, &Address)> {
        self.registry.iter().map(|(id, addr)| (id.as_str(), addr))
    }

    /// Number of registered sales.
    pub fn project_count(&self) -> usize {
        self.registry.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custodian() -> Custodian {
        Custodian::new(Address::derive("custodian", 0), Address::new("deployer")).unwrap()
    }

    #[test]
    fn new_custodian_rejects_zero_owner() {
        let result = Custodian::new(Address::derive("custodian", 0), Address::zero());
        assert!(matches!(result.unwrap_err(), CustodianError::InvalidAddress));
    }

    #[test]
    fn validate_new_sale_rejects_zero_collection() {
        let custodian = custodian();
        let result = custodian.validate_new_sale("SHUB", &Address::zero());
        assert!(matches!(result.unwrap_err(), CustodianError::InvalidAddress));
    }

    #[test]
    fn validate_new_sale_rejects_duplicate_project() {
        let mut custodian = custodian();
        custodian.register_sale("SHUB".into(), Address::derive("sale", 1));

        let result = custodian.validate_new_sale("SHUB", &Address::derive("collection", 0));
        assert!(matches!(
            result.unwrap_err(),
            CustodianError::DuplicateProject(id) if id == "SHUB"
        ));
    }

    #[test]
    fn lookup_unknown_project_returns_zero_address() {
        let custodian = custodian();
        assert!(custodian.lookup_sale("SHUB").is_zero());
    }

    #[test]
    fn lookup_registered_project_returns_sale_address() {
        let mut custodian = custodian();
        let sale = Address::derive("sale", 1);
        custodian.register_sale("SHUB".into(), sale.clone());
        assert_eq!(custodian.lookup_sale("SHUB"), sale);
    }

    #[test]
    fn receive_accumulates_balance() {
        let mut custodian = custodian();
        custodian.receive(2137);
        custodian.receive(100);
        assert_eq!(custodian.balance(), 2237);
    }

    #[test]
    fn check_receive_flags_overflow() {
        let mut custodian = custodian();
        custodian.receive(u64::MAX);
        assert!(matches!(
            custodian.check_receive(1).unwrap_err(),
            CustodianError::BalanceOverflow
        ));
    }

    #[test]
    fn withdrawal_by_non_owner_rejected() {
        let custodian = custodian();
        let result =
            custodian.authorize_withdrawal(&Address::new("mallory"), &Address::new("r"), None);
        assert!(matches!(result.unwrap_err(), CustodianError::NotAuthorized));
    }

    #[test]
    fn withdrawal_to_zero_recipient_rejected() {
        let custodian = custodian();
        let result =
            custodian.authorize_withdrawal(&Address::new("deployer"), &Address::zero(), None);
        assert!(matches!(result.unwrap_err(), CustodianError::InvalidAddress));
    }

    #[test]
    fn withdrawal_beyond_balance_rejected() {
        let mut custodian = custodian();
        custodian.receive(100);
        let result = custodian.authorize_withdrawal(
            &Address::new("deployer"),
            &Address::new("r"),
            Some(101),
        );
        assert!(matches!(
            result.unwrap_err(),
            CustodianError::InsufficientFunds {
                requested: 101,
                held: 100,
            }
        ));
    }

    #[test]
    fn full_withdrawal_resolves_to_current_balance() {
        let mut custodian = custodian();
        custodian.receive(2137);
        let amount = custodian
            .authorize_withdrawal(&Address::new("deployer"), &Address::new("r"), None)
            .unwrap();
        assert_eq!(amount, 2137);
    }

    #[test]
    fn full_withdrawal_of_zero_balance_is_a_noop_success() {
        let custodian = custodian();
        let amount = custodian
            .authorize_withdrawal(&Address::new("deployer"), &Address::new("r"), None)
            .unwrap();
        assert_eq!(amount, 0);
    }

    #[test]
    fn commit_withdrawal_reduces_balance_exactly() {
        let mut custodian = custodian();
        custodian.receive(2137);
        custodian.commit_withdrawal(100);
        assert_eq!(custodian.balance(), 2037);
    }

    #[test]
    fn sale_transfer_target_checks_in_order() {
        let mut custodian = custodian();
        custodian.register_sale("SHUB".into(), Address::derive("sale", 1));
        let deployer = Address::new("deployer");

        assert!(matches!(
            custodian
                .sale_transfer_target(&Address::new("mallory"), "SHUB", &deployer)
                .unwrap_err(),
            CustodianError::NotAuthorized
        ));
        assert!(matches!(
            custodian
                .sale_transfer_target(&deployer, "SHUB", &Address::zero())
                .unwrap_err(),
            CustodianError::InvalidAddress
        ));
        assert!(matches!(
            custodian
                .sale_transfer_target(&deployer, "SHIB", &deployer)
                .unwrap_err(),
            CustodianError::ProjectNotFound(id) if id == "SHIB"
        ));
        assert_eq!(
            custodian
                .sale_transfer_target(&deployer, "SHUB", &deployer)
                .unwrap(),
            Address::derive("sale", 1)
        );
    }
}
