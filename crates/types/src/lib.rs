//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the inventory.
//! All types are plain data with no behaviour beyond small conversions, so they
//! can be shared by the placement core, the engine and any UI or persistence
//! collaborator.
//!
//! # Coordinates
//!
//! Grid containers use integer cell coordinates:
//!
//! - **x**: column, growing to the right, `0..width`
//! - **y**: row, growing downwards, `0..height`
//!
//! Cells order by row first (`y`, then `x`). Every search that needs a
//! deterministic "first" cell uses that order.
//!
//! # Identifiers
//!
//! | Type | Example | Description |
//! |------|---------|-------------|
//! | `ItemId` | `"9f1c0e2a7b3d4c55"` | Unique item instance guid |
//! | `ContainerId` | `"stash"`, `"9f1c0e2a7b3d4c55:0"` | Container key; nested containers compose owner guid + slot index |
//! | `ShapeId` | `"2x2"` | Key into the shape library |
//! | `ItemTypeId` | `"ammo.9mm"` | Key into the item catalog |
//!
//! # Examples
//!
//! ```
//! use gridstash_types::{Cell, ContainerId, ItemId, Orientation};
//!
//! let rotated = Orientation::North.rotate_cw();
//! assert_eq!(rotated, Orientation::East);
//! assert_eq!(rotated.degrees(), 90);
//!
//! let owner = ItemId::from("backpack-1");
//! let pocket = ContainerId::nested(&owner, 0);
//! assert_eq!(pocket.as_str(), "backpack-1:0");
//! assert_eq!(pocket.split_nested(), Some((owner, 0)));
//!
//! assert!(Cell::new(5, 0) < Cell::new(0, 1));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Separator between the owner guid and the slot index of a nested container id
pub const NESTED_ID_SEPARATOR: char = ':';

/// Default bound on owner-chain hops walked by the self-containment guard
pub const DEFAULT_MAX_OWNER_HOPS: usize = 64;

/// Default cell size (pixels) stamped on lazily created containers
pub const DEFAULT_CELL_SIZE: u32 = 64;

/// Largest number of cells a grid container may span
pub const MAX_GRID_CELLS: usize = 1 << 20;

/// Stack size of items whose definition does not say otherwise
pub const DEFAULT_MAX_STACK: u32 = 1;

/// A cell coordinate (or a shape offset relative to an anchor)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const ORIGIN: Cell = Cell { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise addition; None if either axis overflows
    pub fn checked_add(self, rhs: Cell) -> Option<Cell> {
        Some(Cell::new(self.x.checked_add(rhs.x)?, self.y.checked_add(rhs.y)?))
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for Cell {
    type Output = Cell;

    fn add(self, rhs: Cell) -> Cell {
        Cell::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Cell {
    type Output = Cell;

    fn sub(self, rhs: Cell) -> Cell {
        Cell::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Cell::new(x, y)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Orientation states, clockwise from the shape's base orientation
///
/// - **North**: 0°
/// - **East**: 90°
/// - **South**: 180°
/// - **West**: 270°
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    North,
    East,
    South,
    West,
}

impl Orientation {
    /// All orientations in clockwise order starting from North
    pub const ALL: [Orientation; 4] = [
        Orientation::North,
        Orientation::East,
        Orientation::South,
        Orientation::West,
    ];

    /// Rotate clockwise
    pub fn rotate_cw(&self) -> Self {
        match self {
            Orientation::North => Orientation::East,
            Orientation::East => Orientation::South,
            Orientation::South => Orientation::West,
            Orientation::West => Orientation::North,
        }
    }

    /// Rotate counter-clockwise
    pub fn rotate_ccw(&self) -> Self {
        match self {
            Orientation::North => Orientation::West,
            Orientation::West => Orientation::South,
            Orientation::South => Orientation::East,
            Orientation::East => Orientation::North,
        }
    }

    /// Number of clockwise quarter turns from North (0..4)
    pub fn quarter_turns(&self) -> u8 {
        match self {
            Orientation::North => 0,
            Orientation::East => 1,
            Orientation::South => 2,
            Orientation::West => 3,
        }
    }

    /// Inverse of [`Orientation::quarter_turns`], wrapping modulo 4
    pub fn from_quarter_turns(turns: u8) -> Self {
        Orientation::ALL[(turns % 4) as usize]
    }

    /// Clockwise rotation in degrees
    pub fn degrees(&self) -> u16 {
        self.quarter_turns() as u16 * 90
    }

    /// True when width and height are swapped relative to the base shape
    pub fn is_sideways(&self) -> bool {
        matches!(self, Orientation::East | Orientation::West)
    }

    /// Parse from string (case-insensitive), accepting names or degrees
    ///
    /// ```
    /// use gridstash_types::Orientation;
    ///
    /// assert_eq!(Orientation::from_str("east"), Some(Orientation::East));
    /// assert_eq!(Orientation::from_str("180"), Some(Orientation::South));
    /// assert_eq!(Orientation::from_str("sideways"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "north" | "n" | "0" => Some(Orientation::North),
            "east" | "e" | "90" => Some(Orientation::East),
            "south" | "s" | "180" => Some(Orientation::South),
            "west" | "w" | "270" => Some(Orientation::West),
            _ => None,
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::North => "north",
            Orientation::East => "east",
            Orientation::South => "south",
            Orientation::West => "west",
        }
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Unique guid of an item instance
    ItemId
);

string_id!(
    /// Key of a container in the tree cache
    ContainerId
);

string_id!(
    /// Key into the shape library
    ShapeId
);

string_id!(
    /// Key into the item catalog (static item metadata)
    ItemTypeId
);

impl ContainerId {
    /// Id of the `index`-th sub-container owned by `owner`
    pub fn nested(owner: &ItemId, index: usize) -> Self {
        Self(format!("{}{}{}", owner.as_str(), NESTED_ID_SEPARATOR, index))
    }

    /// Split a nested id back into owner guid and slot index
    ///
    /// Returns None for top-level ids (no separator, or a non-numeric suffix).
    pub fn split_nested(&self) -> Option<(ItemId, usize)> {
        let (owner, index) = self.0.rsplit_once(NESTED_ID_SEPARATOR)?;
        if owner.is_empty() {
            return None;
        }
        let index = index.parse().ok()?;
        Some((ItemId::from(owner), index))
    }
}

/// Notification for the view layer, sent after a committed change
///
/// Delivery is fire-and-forget: the core never waits on or fails because of a
/// view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewEvent {
    /// Item became visible in a container
    Created { item: ItemId, container: ContainerId },
    /// Item's view should be removed from a container
    Removed { item: ItemId, container: ContainerId },
    /// Item changed in place (orientation, anchor or stack count)
    Updated { item: ItemId, container: ContainerId },
}
