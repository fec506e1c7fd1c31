//! Global config with atomic reload support.
//!
//! Uses `arc-swap` for lock-free reads and atomic config replacement.
//! This enables hot-reloading of `hotpatch.toml` while serving.

use crate::config::HotpatchConfig;
use crate::utils::hash;
use anyhow::Result;
use arc_swap::ArcSwap;
use std::fs;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

/// Global config storage.
pub static CONFIG: LazyLock<ArcSwap<HotpatchConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(HotpatchConfig::default()));

/// Global hash of the current config file content.
static CONFIG_HASH: AtomicU64 = AtomicU64::new(0);

#[inline]
pub fn cfg() -> Arc<HotpatchConfig> {
    CONFIG.load_full()
}

/// Reload config from disk if content changed.
///
/// Returns `Ok(true)` if config was updated, `Ok(false)` if unchanged or
/// there is no file backing the current config.
pub fn reload_config() -> Result<bool> {
    let c = cfg();
    let Some(cli) = c.cli else {
        return Ok(false);
    };
    if !c.config_path.exists() {
        return Ok(false);
    }

    let content = fs::read_to_string(&c.config_path)?;
    let new_hash = hash::compute(&content);
    if new_hash == CONFIG_HASH.load(Ordering::Relaxed) {
        return Ok(false);
    }

    let new_config = HotpatchConfig::load(cli)?;
    CONFIG.store(Arc::new(new_config));
    CONFIG_HASH.store(new_hash, Ordering::Relaxed);

    Ok(true)
}

#[inline]
pub fn init_config(config: HotpatchConfig) -> Arc<HotpatchConfig> {
    if let Ok(content) = fs::read_to_string(&config.config_path) {
        CONFIG_HASH.store(hash::compute(&content), Ordering::Relaxed);
    }

    let arc = Arc::new(config);
    CONFIG.store(Arc::clone(&arc));
    arc
}
