//! # Launch Configuration
//!
//! Project parameters arrive from the deployment process as a plain JSON
//! document. The `launch` subcommand reads one of these, creates the sale,
//! and hands it the collection's mint rights in a single step.
//!
//! ```json
//! {
//!   "project_id": "SHUB",
//!   "unit_price": 2137,
//!   "max_units": 100,
//!   "collection": "0x5f3a…"
//! }
//! ```

use std::path::Path;

use anyhow::Context;
use crowdsale_engine::Address;
use serde::{Deserialize, Serialize};

/// Parameters for launching one project's sale.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Project identifier the sale is registered under.
    pub project_id: String,
    /// Fixed price of one unit, in base units.
    pub unit_price: u64,
    /// Maximum units the sale will ever sell.
    pub max_units: u64,
    /// Address of the already-deployed collection to sell from.
    pub collection: Address,
}

impl LaunchConfig {
    /// Reads and parses a launch config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading launch config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing launch config {}", path.display()))
    }
}
