//! Core placement module - shapes, rotation, occupancy, containers, tree cache
//!
//! This crate holds the data structures of the inventory and the pure
//! geometry behind them. It has **no** knowledge of rendering, input or
//! persistence formats, which keeps it:
//!
//! - **Deterministic**: guids come from a seeded generator
//! - **Testable**: every structure is plain data with unit tests next to it
//! - **Portable**: usable headless, in a game client or on a server
//!
//! # Module Structure
//!
//! - [`shapes`]: shape definitions and the read-only shape library
//! - [`rotation`]: quarter-turn transforms and bounding-box offsets
//! - [`occupancy`]: per-container cell → item map
//! - [`container`]: grid and slot containers behind one capability trait
//! - [`item`]: item catalog (static metadata) and item instances
//! - [`tree_cache`]: flat container/item/owner registry for nested containers
//! - [`snapshot`]: persistable item snapshots and cache exports
//! - [`guid`]: deterministic guid generation
//! - [`error`]: placement reason codes
//!
//! # Example
//!
//! ```
//! use gridstash_core::{GridOccupancy, ShapeLibrary};
//! use gridstash_core::types::{Cell, ItemId, Orientation, ShapeId};
//!
//! let shapes = ShapeLibrary::with_builtin_shapes();
//! let square = shapes.get(&ShapeId::from("2x2")).unwrap();
//!
//! let mut grid = GridOccupancy::new(4, 4);
//! let item = ItemId::from("crate-1");
//! grid.place(&item, &square.footprint(Orientation::North, Cell::new(0, 0)));
//!
//! let other = square.footprint(Orientation::North, Cell::new(1, 1));
//! assert_eq!(grid.query_overlap(&other, None), Ok(vec![item]));
//! ```

pub mod container;
pub mod error;
pub mod guid;
pub mod item;
pub mod occupancy;
pub mod rotation;
pub mod shapes;
pub mod snapshot;
pub mod tree_cache;

pub use gridstash_types as types;

// Re-export commonly used types for convenience
pub use container::{Container, ContainerKind, GridContainer, ItemHolder, SlotContainer};
pub use error::{ExchangeBlocker, PlaceError};
pub use guid::GuidSource;
pub use item::{ItemCatalog, ItemDef, ItemInstance};
pub use occupancy::GridOccupancy;
pub use rotation::{rotate_cells, rotate_point, rotation_offset};
pub use shapes::{Shape, ShapeLibrary};
pub use snapshot::{CacheExport, ContainerExport, ItemSnapshot};
pub use tree_cache::{Ancestry, CachedContainer, ContainerTreeCache};
