//! Container module - grid and single-slot placement targets
//!
//! Both variants share one capability set ([`ItemHolder`]): check what a
//! footprint would collide with, place, remove, and membership. A grid is
//! position aware; a slot holds at most one item of any shape and ignores the
//! footprint.

use serde::{Deserialize, Serialize};

use crate::error::PlaceError;
use crate::occupancy::GridOccupancy;
use crate::types::{Cell, ContainerId, ItemId};

/// Static description of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContainerKind {
    Grid { width: i32, height: i32 },
    Slot,
}

impl ContainerKind {
    /// Reject grids with negative dimensions or too many cells
    pub fn validate(self) -> Result<Self, PlaceError> {
        match self {
            ContainerKind::Grid { width, height } if GridOccupancy::checked_area(width, height).is_none() => {
                Err(PlaceError::InvalidSize { width, height })
            }
            _ => Ok(self),
        }
    }
}

/// Placement capability shared by every container variant
pub trait ItemHolder {
    /// Items the footprint would collide with, excluding `item` itself
    ///
    /// Fails with [`PlaceError::OutOfBounds`] if the footprint leaves the container.
    fn overlaps(&self, item: &ItemId, footprint: &[Cell]) -> Result<Vec<ItemId>, PlaceError>;

    /// Write the item without checking
    fn place(&mut self, item: &ItemId, footprint: &[Cell]);

    /// Remove the item from the cells it was placed on
    fn remove(&mut self, item: &ItemId, footprint: &[Cell]);

    fn has_item(&self, item: &ItemId) -> bool;

    /// Check and place in one step
    fn try_place(&mut self, item: &ItemId, footprint: &[Cell]) -> Result<(), PlaceError> {
        let items = self.overlaps(item, footprint)?;
        if !items.is_empty() {
            return Err(PlaceError::Overlap { items });
        }
        self.place(item, footprint);
        Ok(())
    }
}

/// Position-aware grid container
#[derive(Debug, Clone, PartialEq)]
pub struct GridContainer {
    pub id: ContainerId,
    pub owner: Option<ItemId>,
    pub cell_size: u32,
    pub occupancy: GridOccupancy,
}

impl GridContainer {
    pub fn new(id: ContainerId, width: i32, height: i32, cell_size: u32) -> Self {
        Self {
            id,
            owner: None,
            cell_size,
            occupancy: GridOccupancy::new(width, height),
        }
    }
}

impl ItemHolder for GridContainer {
    fn overlaps(&self, item: &ItemId, footprint: &[Cell]) -> Result<Vec<ItemId>, PlaceError> {
        self.occupancy
            .query_overlap(footprint, Some(item))
            .map_err(|cell| PlaceError::OutOfBounds { cell })
    }

    fn place(&mut self, item: &ItemId, footprint: &[Cell]) {
        self.occupancy.place(item, footprint);
    }

    fn remove(&mut self, item: &ItemId, footprint: &[Cell]) {
        if self.occupancy.remove(item, footprint) < footprint.len() {
            // Footprint was stale; make sure nothing of the item survives.
            self.occupancy.remove_everywhere(item);
        }
    }

    fn has_item(&self, item: &ItemId) -> bool {
        self.occupancy.occupied().any(|(_, id)| id == item)
    }
}

/// Capacity-1 container (equipment slot, holster, ...)
#[derive(Debug, Clone, PartialEq)]
pub struct SlotContainer {
    pub id: ContainerId,
    pub owner: Option<ItemId>,
    pub cell_size: u32,
    pub item: Option<ItemId>,
}

impl SlotContainer {
    pub fn new(id: ContainerId, cell_size: u32) -> Self {
        Self {
            id,
            owner: None,
            cell_size,
            item: None,
        }
    }
}

impl ItemHolder for SlotContainer {
    fn overlaps(&self, item: &ItemId, _footprint: &[Cell]) -> Result<Vec<ItemId>, PlaceError> {
        Ok(self
            .item
            .iter()
            .filter(|id| *id != item)
            .cloned()
            .collect())
    }

    fn place(&mut self, item: &ItemId, _footprint: &[Cell]) {
        self.item = Some(item.clone());
    }

    fn remove(&mut self, item: &ItemId, _footprint: &[Cell]) {
        if self.item.as_ref() == Some(item) {
            self.item = None;
        }
    }

    fn has_item(&self, item: &ItemId) -> bool {
        self.item.as_ref() == Some(item)
    }
}

/// A placement target: grid or slot
#[derive(Debug, Clone, PartialEq)]
pub enum Container {
    Grid(GridContainer),
    Slot(SlotContainer),
}

impl Container {
    /// Build an empty container of the given kind
    pub fn from_kind(id: ContainerId, kind: ContainerKind, cell_size: u32) -> Self {
        match kind {
            ContainerKind::Grid { width, height } => {
                Container::Grid(GridContainer::new(id, width, height, cell_size))
            }
            ContainerKind::Slot => Container::Slot(SlotContainer::new(id, cell_size)),
        }
    }

    pub fn id(&self) -> &ContainerId {
        match self {
            Container::Grid(g) => &g.id,
            Container::Slot(s) => &s.id,
        }
    }

    /// Item whose sub-container this is (relation only, not ownership)
    pub fn owner(&self) -> Option<&ItemId> {
        match self {
            Container::Grid(g) => g.owner.as_ref(),
            Container::Slot(s) => s.owner.as_ref(),
        }
    }

    pub fn set_owner(&mut self, owner: Option<ItemId>) {
        match self {
            Container::Grid(g) => g.owner = owner,
            Container::Slot(s) => s.owner = owner,
        }
    }

    pub fn cell_size(&self) -> u32 {
        match self {
            Container::Grid(g) => g.cell_size,
            Container::Slot(s) => s.cell_size,
        }
    }

    pub fn kind(&self) -> ContainerKind {
        match self {
            Container::Grid(g) => ContainerKind::Grid {
                width: g.occupancy.width(),
                height: g.occupancy.height(),
            },
            Container::Slot(_) => ContainerKind::Slot,
        }
    }

    pub fn is_slot(&self) -> bool {
        matches!(self, Container::Slot(_))
    }

    pub fn as_grid(&self) -> Option<&GridContainer> {
        match self {
            Container::Grid(g) => Some(g),
            Container::Slot(_) => None,
        }
    }

    pub fn as_grid_mut(&mut self) -> Option<&mut GridContainer> {
        match self {
            Container::Grid(g) => Some(g),
            Container::Slot(_) => None,
        }
    }

    /// Distinct items currently held
    pub fn items(&self) -> Vec<ItemId> {
        match self {
            Container::Grid(g) => {
                let mut items: Vec<ItemId> = Vec::new();
                for (_, id) in g.occupancy.occupied() {
                    if !items.contains(id) {
                        items.push(id.clone());
                    }
                }
                items
            }
            Container::Slot(s) => s.item.iter().cloned().collect(),
        }
    }
}

impl ItemHolder for Container {
    fn overlaps(&self, item: &ItemId, footprint: &[Cell]) -> Result<Vec<ItemId>, PlaceError> {
        match self {
            Container::Grid(g) => g.overlaps(item, footprint),
            Container::Slot(s) => s.overlaps(item, footprint),
        }
    }

    fn place(&mut self, item: &ItemId, footprint: &[Cell]) {
        match self {
            Container::Grid(g) => g.place(item, footprint),
            Container::Slot(s) => s.place(item, footprint),
        }
    }

    fn remove(&mut self, item: &ItemId, footprint: &[Cell]) {
        match self {
            Container::Grid(g) => g.remove(item, footprint),
            Container::Slot(s) => s.remove(item, footprint),
        }
    }

    fn has_item(&self, item: &ItemId) -> bool {
        match self {
            Container::Grid(g) => g.has_item(item),
            Container::Slot(s) => s.has_item(item),
        }
    }
}
