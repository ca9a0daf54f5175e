//! Item module - static item metadata and live item instances

use std::collections::HashMap;
use std::sync::Arc;

use crate::container::ContainerKind;
use crate::error::PlaceError;
use crate::shapes::Shape;
use crate::types::{Cell, ContainerId, ItemId, ItemTypeId, Orientation, ShapeId, DEFAULT_MAX_STACK};

/// Static metadata for an item type
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDef {
    pub type_id: ItemTypeId,
    pub shape: ShapeId,
    pub max_stack: u32,
    pub weight: f32,
    /// Sub-containers, addressed as `"<itemGuid>:<index>"`
    pub sub_containers: Vec<ContainerKind>,
}

impl ItemDef {
    pub fn new(type_id: impl Into<ItemTypeId>, shape: impl Into<ShapeId>) -> Self {
        Self {
            type_id: type_id.into(),
            shape: shape.into(),
            max_stack: DEFAULT_MAX_STACK,
            weight: 0.0,
            sub_containers: Vec::new(),
        }
    }

    pub fn with_max_stack(mut self, max_stack: u32) -> Self {
        self.max_stack = max_stack.max(1);
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_sub_container(mut self, kind: ContainerKind) -> Self {
        self.sub_containers.push(kind);
        self
    }
}

/// Item type id → static metadata
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    defs: HashMap<ItemTypeId, ItemDef>,
}

impl ItemCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, replacing an existing one with the same type id
    ///
    /// A `max_stack` of 0 is stored as 1.
    pub fn insert(&mut self, mut def: ItemDef) {
        def.max_stack = def.max_stack.max(1);
        self.defs.insert(def.type_id.clone(), def);
    }

    pub fn get(&self, type_id: &ItemTypeId) -> Result<&ItemDef, PlaceError> {
        self.defs
            .get(type_id)
            .ok_or_else(|| PlaceError::UnknownItemType(type_id.clone()))
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

/// A live item
#[derive(Debug, Clone, PartialEq)]
pub struct ItemInstance {
    pub id: ItemId,
    pub type_id: ItemTypeId,
    pub shape: Arc<Shape>,
    pub orientation: Orientation,
    /// Anchor within the current container (top-left of the displayed box)
    pub anchor: Cell,
    pub stack_count: u32,
    pub max_stack: u32,
    pub container: Option<ContainerId>,
}

impl ItemInstance {
    /// New unplaced item with a stack count of 1
    pub fn new(id: ItemId, def: &ItemDef, shape: Arc<Shape>) -> Self {
        Self {
            id,
            type_id: def.type_id.clone(),
            shape,
            orientation: Orientation::North,
            anchor: Cell::ORIGIN,
            stack_count: 1,
            max_stack: def.max_stack.max(1),
            container: None,
        }
    }

    /// Cells covered at the current anchor and orientation
    pub fn footprint(&self) -> Vec<Cell> {
        self.shape.footprint(self.orientation, self.anchor)
    }

    /// Cells that would be covered at another anchor/orientation
    pub fn footprint_at(&self, anchor: Cell, orientation: Orientation) -> Result<Vec<Cell>, PlaceError> {
        self.shape.try_footprint(orientation, anchor)
    }

    /// Displayed (width, height) at the current orientation
    pub fn size(&self) -> (i32, i32) {
        self.shape.size(self.orientation)
    }

    pub fn is_placed(&self) -> bool {
        self.container.is_some()
    }

    /// How many more units fit on this stack
    pub fn stack_room(&self) -> u32 {
        self.max_stack.saturating_sub(self.stack_count)
    }

    /// `other` could merge into this item: same type and room left
    pub fn accepts_stack_from(&self, other: &ItemInstance) -> bool {
        self.id != other.id && self.type_id == other.type_id && self.stack_room() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ammo(id: &str, count: u32) -> ItemInstance {
        let def = ItemDef::new("ammo", "1x1").with_max_stack(10);
        let shape = Arc::new(Shape::rect("1x1", 1, 1).unwrap());
        let mut item = ItemInstance::new(ItemId::from(id), &def, shape);
        item.stack_count = count;
        item
    }

    #[test]
    fn stack_acceptance() {
        let full = ammo("a", 10);
        let partial = ammo("b", 4);
        assert!(!full.accepts_stack_from(&partial));
        assert!(partial.accepts_stack_from(&full));
        assert!(!partial.accepts_stack_from(&partial));
        assert_eq!(partial.stack_room(), 6);
    }

    #[test]
    fn footprint_follows_orientation() {
        let def = ItemDef::new("bar", "2x1");
        let shape = Arc::new(Shape::rect("2x1", 2, 1).unwrap());
        let mut item = ItemInstance::new(ItemId::from("bar-1"), &def, shape);
        item.anchor = Cell::new(3, 1);
        assert_eq!(item.footprint(), vec![Cell::new(3, 1), Cell::new(4, 1)]);

        item.orientation = Orientation::East;
        assert_eq!(item.size(), (1, 2));
        assert_eq!(item.footprint(), vec![Cell::new(3, 1), Cell::new(3, 2)]);
    }

    #[test]
    fn max_stack_never_drops_below_one() {
        assert_eq!(ItemDef::new("x", "1x1").with_max_stack(0).max_stack, 1);

        let mut raw = ItemDef::new("x", "1x1");
        raw.max_stack = 0;
        let mut catalog = ItemCatalog::new();
        catalog.insert(raw.clone());
        assert_eq!(catalog.get(&ItemTypeId::from("x")).unwrap().max_stack, 1);

        let shape = Arc::new(Shape::rect("1x1", 1, 1).unwrap());
        let item = ItemInstance::new(ItemId::from("x-1"), &raw, shape);
        assert_eq!(item.max_stack, 1);
        assert_eq!(item.stack_room(), 0);
    }
}
