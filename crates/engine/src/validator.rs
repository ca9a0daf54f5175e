//! Placement validation.
//!
//! Checks run in this order:
//!
//! 1. **Bounds**: every covered cell lies inside the target container
//! 2. **Self-containment**: the target is not (transitively) inside the item
//! 3. **Overlap**: no covered cell is held by a different item, except for a
//!    single stack-compatible item, which defers to stack merging

use std::collections::HashMap;

use crate::config::InventoryConfig;
use crate::core::{Ancestry, Container, ContainerTreeCache, ItemHolder, ItemInstance, PlaceError};
use crate::types::{Cell, ContainerId, ItemId, Orientation};

/// Outcome of a successful check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceCheck {
    /// Every covered cell is free
    Free,
    /// Exactly one item is in the way and it can absorb the dragged stack
    Stack { onto: ItemId },
}

/// Read-only view over inventory state used to validate placements
#[derive(Clone, Copy)]
pub struct PlacementValidator<'a> {
    containers: &'a HashMap<ContainerId, Container>,
    items: &'a HashMap<ItemId, ItemInstance>,
    cache: &'a ContainerTreeCache,
    config: &'a InventoryConfig,
}

impl<'a> PlacementValidator<'a> {
    pub fn new(
        containers: &'a HashMap<ContainerId, Container>,
        items: &'a HashMap<ItemId, ItemInstance>,
        cache: &'a ContainerTreeCache,
        config: &'a InventoryConfig,
    ) -> Self {
        Self {
            containers,
            items,
            cache,
            config,
        }
    }

    pub fn config(&self) -> &'a InventoryConfig {
        self.config
    }

    pub fn item(&self, id: &ItemId) -> Result<&'a ItemInstance, PlaceError> {
        self.items
            .get(id)
            .ok_or_else(|| PlaceError::UnknownItem(id.clone()))
    }

    pub fn container(&self, id: &ContainerId) -> Result<&'a Container, PlaceError> {
        self.containers
            .get(id)
            .ok_or_else(|| PlaceError::UnknownContainer(id.clone()))
    }

    /// Validate placing `item` into `container` at `anchor` / `orientation`
    pub fn can_place(
        &self,
        item: &ItemInstance,
        container: &ContainerId,
        anchor: Cell,
        orientation: Orientation,
    ) -> Result<PlaceCheck, PlaceError> {
        let target = self.container(container)?;
        let footprint = item.footprint_at(anchor, orientation)?;
        let overlaps = target.overlaps(&item.id, &footprint)?;
        self.check_containment(&item.id, container)?;

        match overlaps.as_slice() {
            [] => Ok(PlaceCheck::Free),
            [single] if self.stack_compatible(item, single) => Ok(PlaceCheck::Stack {
                onto: single.clone(),
            }),
            _ => Err(PlaceError::Overlap { items: overlaps }),
        }
    }

    /// Fail if `container` sits inside `item` (or the owner chain is too deep
    /// to tell)
    pub fn check_containment(&self, item: &ItemId, container: &ContainerId) -> Result<(), PlaceError> {
        match self
            .cache
            .ancestry(container, item, self.config.max_owner_hops)
        {
            Ancestry::Unrelated => Ok(()),
            Ancestry::Inside | Ancestry::TooDeep => Err(PlaceError::SelfContainment {
                item: item.clone(),
            }),
        }
    }

    /// Same item type and the destination stack is not full
    pub fn stack_compatible(&self, source: &ItemInstance, destination: &ItemId) -> bool {
        self.items
            .get(destination)
            .map(|dest| dest.accepts_stack_from(source))
            .unwrap_or(false)
    }
}
