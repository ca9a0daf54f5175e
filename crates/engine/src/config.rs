//! Inventory configuration.
//!
//! Values come from [`InventoryConfig::default`], from environment variables
//! via [`InventoryConfig::from_env`], or from any serde source (missing fields
//! fall back to defaults).
//!
//! - `GRIDSTASH_MAX_OWNER_HOPS`: owner-chain bound of the self-containment guard (default 64)
//! - `GRIDSTASH_CELL_SIZE`: cell size stamped on lazily created containers (default 64)
//! - `GRIDSTASH_EXCHANGE_ROTATIONS`: allow rotating relocated items during quick exchange (default true)
//! - `GRIDSTASH_EXCHANGE_BIN_PACK`: allow the bin-pack fallback during quick exchange (default true)

use serde::Deserialize;

use crate::types::{DEFAULT_CELL_SIZE, DEFAULT_MAX_OWNER_HOPS};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub max_owner_hops: usize,
    pub default_cell_size: u32,
    pub exchange_rotations: bool,
    pub exchange_bin_pack: bool,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            max_owner_hops: DEFAULT_MAX_OWNER_HOPS,
            default_cell_size: DEFAULT_CELL_SIZE,
            exchange_rotations: true,
            exchange_bin_pack: true,
        }
    }
}

impl InventoryConfig {
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let max_owner_hops = env::var("GRIDSTASH_MAX_OWNER_HOPS")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .filter(|&hops: &usize| hops > 0)
            .unwrap_or(defaults.max_owner_hops);

        let default_cell_size = env::var("GRIDSTASH_CELL_SIZE")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.default_cell_size);

        let exchange_rotations = env::var("GRIDSTASH_EXCHANGE_ROTATIONS")
            .ok()
            .and_then(|s| parse_flag(&s))
            .unwrap_or(defaults.exchange_rotations);

        let exchange_bin_pack = env::var("GRIDSTASH_EXCHANGE_BIN_PACK")
            .ok()
            .and_then(|s| parse_flag(&s))
            .unwrap_or(defaults.exchange_bin_pack);

        Self {
            max_owner_hops,
            default_cell_size,
            exchange_rotations,
            exchange_bin_pack,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
