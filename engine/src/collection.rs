//! # NFT Collection
//!
//! A collection of uniquely-identified assets with owner-gated minting.
//! Token ids are dense and sequential starting at 1 and are never reused;
//! once minted, an asset exists forever and its record tracks whoever
//! currently holds it.
//!
//! The collection as a whole has a single owner — only that identity may
//! mint. Handing a sale the mint rights is an explicit
//! [`transfer_ownership`](MintAuthority::transfer_ownership) step performed
//! by the collection's deployer before the sale opens; a sale that never
//! received the handoff fails cleanly at purchase time.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::address::Address;
use crate::config::FIRST_TOKEN_ID;

/// Sequential identifier of a minted asset.
pub type TokenId = u64;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during collection operations.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// The caller is not the collection owner.
    #[error("not authorized: caller is not the collection owner")]
    NotAuthorized,

    /// A required identity parameter is the zero address.
    #[error("invalid address: the zero address is not allowed")]
    InvalidAddress,

    /// Lookup of a token id that was never minted.
    #[error("unknown asset: token {0} has never been minted")]
    UnknownAsset(TokenId),
}

// ---------------------------------------------------------------------------
// Mint capability
// ---------------------------------------------------------------------------

/// The capability a sale needs from its asset registry.
///
/// [`NftCollection`] is the production implementation; tests substitute
/// doubles to exercise sale behavior against a registry that accepts or
/// rejects at will.
pub trait MintAuthority {
    /// Mints the next sequential asset to `to`, on behalf of `caller`.
    fn mint(&mut self, caller: &Address, to: &Address) -> Result<TokenId, CollectionError>;

    /// Reassigns the minting rights to `new_owner`.
    fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: &Address,
    ) -> Result<(), CollectionError>;
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single minted asset.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Current holder of the asset.
    pub owner: Address,
    /// Metadata URI for the asset.
    pub uri: String,
    /// Timestamp when the asset was minted.
    pub minted_at: DateTime<Utc>,
}

/// An NFT collection: metadata plus the minted-asset registry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NftCollection {
    /// The collection's own address.
    address: Address,
    /// Human-readable collection name (e.g., "NftToken").
    name: String,
    /// Ticker symbol (e.g., "NFTT").
    symbol: String,
    /// Base URI; the default token URI is `base_uri` + token id.
    base_uri: String,
    /// The identity allowed to mint. Transferable.
    owner: Address,
    /// Minted assets keyed by id.
    tokens: BTreeMap<TokenId, TokenRecord>,
    /// The id the next mint will assign. Strictly increasing.
    next_id: TokenId,
    /// Timestamp when the collection was created.
    created_at: DateTime<Utc>,
}

impl NftCollection {
    /// Creates an empty collection owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::InvalidAddress`] if `owner` is the zero
    /// address.
    pub fn new(
        address: Address,
        owner: Address,
        name: impl Into<String>,
        symbol: impl Into<String>,
        base_uri: impl Into<String>,
    ) -> Result<Self, CollectionError> {
        if owner.is_zero() {
            return Err(CollectionError::InvalidAddress);
        }
        Ok(Self {
            address,
            name: name.into(),
            symbol: symbol.into(),
            base_uri: base_uri.into(),
            owner,
            tokens: BTreeMap::new(),
            next_id: FIRST_TOKEN_ID,
            created_at: Utc::now(),
        })
    }

    /// Mints one asset to `to` and returns its id.
    ///
    /// `metadata`, when given, overrides the default token URI derived from
    /// the base URI.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::NotAuthorized`] if `caller` is not the
    /// collection owner, and [`CollectionError::InvalidAddress`] if `to` is
    /// the zero address. A failed mint assigns no id.
    pub fn mint_with_metadata(
        &mut self,
        caller: &Address,
        to: &Address,
        metadata: Option<&str>,
    ) -> Result<TokenId, CollectionError> {
        if *caller != self.owner {
            return Err(CollectionError::NotAuthorized);
        }
        if to.is_zero() {
            return Err(CollectionError::InvalidAddress);
        }

        let token_id = self.next_id;
        let uri = match metadata {
            Some(m) => m.to_string(),
            None => format!("{}{}", self.base_uri, token_id),
        };
        self.tokens.insert(
            token_id,
            TokenRecord {
                owner: to.clone(),
                uri,
                minted_at: Utc::now(),
            },
        );
        self.next_id += 1;
        Ok(token_id)
    }

    /// Returns the current holder of an asset.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::UnknownAsset`] if the id was never minted.
    pub fn owner_of(&self, token_id: TokenId) -> Result<&Address, CollectionError> {
        self.tokens
            .get(&token_id)
            .map(|record| &record.owner)
            .ok_or(CollectionError::UnknownAsset(token_id))
    }

    /// Returns the metadata URI of an asset.
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::UnknownAsset`] if the id was never minted.
    pub fn token_uri(&self, token_id: TokenId) -> Result<&str, CollectionError> {
        self.tokens
            .get(&token_id)
            .map(|record| record.uri.as_str())
            .ok_or(CollectionError::UnknownAsset(token_id))
    }

    /// Number of assets minted so far.
    pub fn total_minted(&self) -> u64 {
        self.next_id - FIRST_TOKEN_ID
    }

    /// The collection's own address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// The identity currently allowed to mint.
    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ticker symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

impl MintAuthority for NftCollection {
    fn mint(&mut self, caller: &Address, to: &Address) -> Result<TokenId, CollectionError> {
        self.mint_with_metadata(caller, to, None)
    }

    fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: &Address,
    ) -> Result<(), CollectionError> {
        if *caller != self.owner {
            return Err(CollectionError::NotAuthorized);
        }
        if new_owner.is_zero() {
            return Err(CollectionError::InvalidAddress);
        }
        self.owner = new_owner.clone();
        Ok(())
    }
}
