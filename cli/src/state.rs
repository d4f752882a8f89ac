//! # State Persistence
//!
//! The entire engine serializes as one JSON document, so platform state
//! round-trips through a single file: every command loads it, applies one
//! operation, and writes it back. Writes go through a sibling temp file
//! and an atomic rename so a crash mid-write never corrupts the state.

use std::path::Path;

use anyhow::Context;
use crowdsale_engine::CrowdsaleEngine;

/// Loads engine state from `path`.
pub fn load(path: &Path) -> anyhow::Result<CrowdsaleEngine> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading state file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing state file {}", path.display()))
}

/// Saves engine state to `path`.
pub fn save(path: &Path, engine: &CrowdsaleEngine) -> anyhow::Result<()> {
    let raw = serde_json::to_string_pretty(engine).context("serializing state")?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, raw)
        .with_context(|| format!("writing state file {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("replacing state file {}", path.display()))?;
    Ok(())
}
