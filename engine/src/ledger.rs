//! # Account Ledger
//!
//! The engine's stand-in for the host environment's native balance map.
//! Purchasers pay out of their ledger account, and custodian withdrawals
//! land back in one. Entries are created lazily on first credit; an account
//! that was never credited simply has balance 0.
//!
//! The ledger enforces two invariants: a debit can never take an account
//! below zero, and a credit can never wrap. Value is otherwise conserved by
//! the callers — the ledger itself never creates or destroys funds except
//! through [`Ledger::credit`] and [`Ledger::debit`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::Address;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Attempted to debit more than the account holds.
    #[error("insufficient funds: account {account} holds {available}, requested {requested}")]
    InsufficientFunds {
        /// The account being debited.
        account: Address,
        /// The account's current balance.
        available: u64,
        /// The amount that was requested.
        requested: u64,
    },

    /// Arithmetic overflow during a credit operation.
    #[error("balance overflow: account {account} holds {current}, credit {credit}")]
    Overflow {
        /// The account being credited.
        account: Address,
        /// The balance before the failed credit.
        current: u64,
        /// The amount that caused the overflow.
        credit: u64,
    },
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Account balance map: `Address -> u64`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Ledger {
    accounts: BTreeMap<Address, u64>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self {
            accounts: BTreeMap::new(),
        }
    }

    /// Credits (adds) funds to an account, creating the entry if needed.
    ///
    /// Returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Overflow`] if the credit would exceed
    /// `u64::MAX`.
    pub fn credit(&mut self, account: &Address, amount: u64) -> Result<u64, LedgerError> {
        let balance = self.accounts.entry(account.clone()).or_insert(0);
        let new_balance = balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow {
                account: account.clone(),
                current: *balance,
                credit: amount,
            })?;
        *balance = new_balance;
        Ok(new_balance)
    }

    /// Debits (subtracts) funds from an account.
    ///
    /// Returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientFunds`] if the account cannot
    /// cover `amount`.
    pub fn debit(&mut self, account: &Address, amount: u64) -> Result<u64, LedgerError> {
        let balance = self.accounts.entry(account.clone()).or_insert(0);
        if *balance < amount {
            return Err(LedgerError::InsufficientFunds {
                account: account.clone(),
                available: *balance,
                requested: amount,
            });
        }
        *balance -= amount;
        Ok(*balance)
    }

    /// Restores an amount debited earlier in the same call.
    ///
    /// Rollback primitive: the account held `amount` at call entry, so
    /// adding it back cannot overflow. Saturates rather than returning a
    /// `Result` so rollback paths stay infallible.
    pub fn refund(&mut self, account: &Address, amount: u64) {
        let balance = self.accounts.entry(account.clone()).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Checks that a credit of `amount` to `account` would succeed,
    /// without mutating anything.
    pub fn check_credit(&self, account: &Address, amount: u64) -> Result<(), LedgerError> {
        let current = self.balance_of(account);
        current
            .checked_add(amount)
            .ok_or(LedgerError::Overflow {
                account: account.clone(),
                current,
                credit: amount,
            })
            .map(|_| ())
    }

    /// Moves `amount` from one account to another.
    ///
    /// Both sides are validated before either is touched, so a failed
    /// transfer changes nothing.
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), LedgerError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                account: from.clone(),
                available,
                requested: amount,
            });
        }
        self.check_credit(to, amount)?;
        self.debit(from, amount)?;
        self.credit(to, amount)?;
        Ok(())
    }

    /// The balance of an account; 0 for accounts never credited.
    pub fn balance_of(&self, account: &Address) -> u64 {
        self.accounts.get(account).copied().unwrap_or(0)
    }

    /// Number of accounts with a ledger entry (including zero balances).
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}
