//! Inventory engine - validation, stacking, quick exchange and the session facade
//!
//! Everything that reads or changes more than one container at a time lives
//! here. [`Inventory`] owns the state; the other modules are stateless
//! helpers over borrowed views of it.
//!
//! # Module Structure
//!
//! - [`validator`]: bounds, self-containment and overlap checks
//! - [`stack`]: stack merge arithmetic
//! - [`exchange`]: quick exchange planning (mapped, pattern match, bin pack)
//! - [`inventory`]: the session facade and its commit paths
//! - [`persist`]: snapshot export and restore
//! - [`config`]: tunables read from the environment
//!
//! # Example
//!
//! ```
//! use gridstash_engine::core::{ContainerKind, ItemCatalog, ItemDef, ShapeLibrary};
//! use gridstash_engine::types::{Cell, ContainerId, Orientation};
//! use gridstash_engine::{Inventory, PlaceOutcome};
//!
//! let mut catalog = ItemCatalog::new();
//! catalog.insert(ItemDef::new("medkit", "2x2"));
//!
//! let mut inv = Inventory::new(ShapeLibrary::with_builtin_shapes(), catalog);
//! inv.register_container("stash", ContainerKind::Grid { width: 6, height: 4 }).unwrap();
//!
//! let medkit = inv.spawn("medkit").unwrap();
//! let stash = ContainerId::from("stash");
//! let outcome = inv.try_place(&medkit, &stash, Cell::new(4, 2), Orientation::North);
//! assert_eq!(outcome, Ok(PlaceOutcome::Placed));
//!
//! // One column further would leave the grid.
//! let err = inv.try_place(&medkit, &stash, Cell::new(5, 2), Orientation::North).unwrap_err();
//! assert_eq!(err.code(), "out_of_bounds");
//! ```

pub mod config;
pub mod exchange;
pub mod inventory;
pub mod persist;
pub mod stack;
pub mod validator;

pub use gridstash_core as core;
pub use gridstash_types as types;

pub use config::InventoryConfig;
pub use exchange::{ExchangePlan, QuickExchangeEngine, Relocation, RelocationMethod};
pub use inventory::{Inventory, PlaceOutcome};
pub use persist::RestoreReport;
pub use stack::StackOutcome;
pub use validator::{PlaceCheck, PlacementValidator};
