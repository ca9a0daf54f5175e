//! Placement errors
//!
//! Every placement, stacking or exchange operation returns `Result<_, PlaceError>`.
//! Errors are recoverable reason codes: a failed operation leaves occupancy,
//! items and the tree cache exactly as they were.

use thiserror::Error;

use crate::types::{Cell, ContainerId, ItemId, ItemTypeId, ShapeId};

/// Why a quick exchange could not be carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeBlocker {
    /// The dragged item is not resting in a container, so nothing is vacated
    NotPlaced,
    /// The target footprint does not cover any other item
    NothingCovered,
    /// An item intersects the target footprint without being fully inside it
    PartialOverlap,
    /// A covered item fits nowhere in the vacated area
    NoRoom,
}

impl ExchangeBlocker {
    pub fn as_str(self) -> &'static str {
        match self {
            ExchangeBlocker::NotPlaced => "dragged item has no origin container",
            ExchangeBlocker::NothingCovered => "target footprint covers no item",
            ExchangeBlocker::PartialOverlap => "an item is only partially covered",
            ExchangeBlocker::NoRoom => "covered items do not fit in the vacated area",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceError {
    #[error("footprint leaves the container at {cell}")]
    OutOfBounds { cell: Cell },

    #[error("footprint overlaps {} item(s)", items.len())]
    Overlap { items: Vec<ItemId> },

    #[error("item {item} would end up inside itself")]
    SelfContainment { item: ItemId },

    #[error("items cannot be stacked")]
    IncompatibleStack,

    #[error("quick exchange not possible: {}", blocker.as_str())]
    ExchangeInfeasible { blocker: ExchangeBlocker },

    #[error("unknown item {0}")]
    UnknownItem(ItemId),

    #[error("unknown container {0}")]
    UnknownContainer(ContainerId),

    #[error("unknown shape {0}")]
    UnknownShape(ShapeId),

    #[error("unknown item type {0}")]
    UnknownItemType(ItemTypeId),

    #[error("invalid shape {id}: {reason}")]
    InvalidShape { id: ShapeId, reason: &'static str },

    #[error("invalid grid size {width}x{height}")]
    InvalidSize { width: i32, height: i32 },
}

impl PlaceError {
    /// Stable reason code for collaborators (UI, logs, persistence reports)
    pub fn code(&self) -> &'static str {
        match self {
            PlaceError::OutOfBounds { .. } => "out_of_bounds",
            PlaceError::Overlap { .. } => "overlap",
            PlaceError::SelfContainment { .. } => "self_containment",
            PlaceError::IncompatibleStack => "incompatible_stack",
            PlaceError::ExchangeInfeasible { .. } => "exchange_infeasible",
            PlaceError::UnknownItem(_)
            | PlaceError::UnknownContainer(_)
            | PlaceError::UnknownShape(_)
            | PlaceError::UnknownItemType(_) => "unknown_reference",
            PlaceError::InvalidShape { .. } => "invalid_shape",
            PlaceError::InvalidSize { .. } => "invalid_size",
        }
    }

    pub fn exchange(blocker: ExchangeBlocker) -> Self {
        PlaceError::ExchangeInfeasible { blocker }
    }
}
