//! # Crowdsale Engine
//!
//! Core logic for a multi-project NFT crowdsale platform. A single
//! [`Custodian`](custodian::Custodian) creates and tracks per-project
//! [`Crowdsale`](sale::Crowdsale) instances, each selling capped units of an
//! [`NftCollection`](collection::NftCollection) at a fixed price. Every
//! accepted payment is forwarded to the custodian in the same call; the
//! custodian's owner withdraws pooled proceeds or hands a sale to a new
//! owner.
//!
//! ## Design Principles
//!
//! 1. All monetary operations check for overflow — `checked_add` and
//!    `checked_sub` everywhere, because wrapping arithmetic and money do not
//!    mix.
//! 2. Every operation either fully commits or fully rolls back. Validation
//!    runs before the first state write, and the one fallible mid-call
//!    mutation (the mint) is explicitly unwound on failure.
//! 3. Authorization gates every privileged operation: minting, withdrawal,
//!    and ownership transfer all verify the calling identity.
//! 4. Every public type is serializable (serde) so the whole engine persists
//!    as a single document and events can feed external indexers.

pub mod address;
pub mod collection;
pub mod config;
pub mod custodian;
pub mod engine;
pub mod events;
pub mod ledger;
pub mod sale;

pub use address::Address;
pub use engine::{CrowdsaleEngine, EngineError};
pub use events::Event;
