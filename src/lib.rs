//! Gridstash (workspace facade crate).
//!
//! This package exposes `gridstash::{core, engine, types}` while the
//! implementation lives in dedicated crates under `crates/`.

pub use gridstash_core as core;
pub use gridstash_engine as engine;
pub use gridstash_types as types;
