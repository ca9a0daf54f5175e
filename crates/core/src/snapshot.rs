use serde::{Deserialize, Serialize};

use crate::container::ContainerKind;
use crate::item::ItemInstance;
use crate::types::{Cell, ContainerId, ItemId, ItemTypeId, Orientation};

/// Persistable view of one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSnapshot {
    pub id: ItemId,
    pub type_id: ItemTypeId,
    pub anchor: Cell,
    pub orientation: Orientation,
    pub stack_count: u32,
    pub container: Option<ContainerId>,
}

impl From<&ItemInstance> for ItemSnapshot {
    fn from(value: &ItemInstance) -> Self {
        Self {
            id: value.id.clone(),
            type_id: value.type_id.clone(),
            anchor: value.anchor,
            orientation: value.orientation,
            stack_count: value.stack_count,
            container: value.container.clone(),
        }
    }
}

/// Read-only export of one cached container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerExport {
    pub id: ContainerId,
    pub kind: Option<ContainerKind>,
    pub cell_size: u32,
    pub owner: Option<ItemId>,
    pub items: Vec<ItemSnapshot>,
}

/// Read-only export of the whole tree cache, containers sorted by id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheExport {
    pub containers: Vec<ContainerExport>,
}

impl CacheExport {
    pub fn item_count(&self) -> usize {
        self.containers.iter().map(|c| c.items.len()).sum()
    }

    pub fn container(&self, id: &ContainerId) -> Option<&ContainerExport> {
        self.containers.iter().find(|c| &c.id == id)
    }
}
