//! Inventory session - containers, items and the operations that move them.
//!
//! [`Inventory`] owns every container and item instance and keeps three
//! views of them in lock-step:
//!
//! - the occupancy of each container
//! - the item instances (anchor, orientation, container, stack count)
//! - the [`ContainerTreeCache`] (injected, cleared on session reset)
//!
//! Every public operation either commits completely or returns a
//! [`PlaceError`] with nothing changed. View notifications go out only after
//! a commit.

use std::collections::HashMap;
use std::sync::mpsc::Sender;

use log::{debug, warn};

use crate::config::InventoryConfig;
use crate::core::{
    Container, ContainerKind, ContainerTreeCache, GuidSource, ItemCatalog, ItemHolder,
    ItemInstance, ItemSnapshot, PlaceError, ShapeLibrary,
};
use crate::exchange::{ExchangePlan, QuickExchangeEngine};
use crate::stack::{plan_merge, StackOutcome};
use crate::types::{Cell, ContainerId, ItemId, ItemTypeId, Orientation, ViewEvent};
use crate::validator::{PlaceCheck, PlacementValidator};

/// What a successful drop did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceOutcome {
    /// Item moved to the requested spot
    Placed,
    /// Item merged into the stack it was dropped on
    Stacked(StackOutcome),
    /// Item swapped with the items it covered
    Exchanged(ExchangePlan),
}

pub struct Inventory {
    pub(crate) config: InventoryConfig,
    pub(crate) shapes: ShapeLibrary,
    pub(crate) catalog: ItemCatalog,
    guids: GuidSource,
    pub(crate) containers: HashMap<ContainerId, Container>,
    pub(crate) items: HashMap<ItemId, ItemInstance>,
    pub(crate) cache: ContainerTreeCache,
    view: Option<Sender<ViewEvent>>,
}

impl Inventory {
    /// Inventory with an empty tree cache and default configuration
    pub fn new(shapes: ShapeLibrary, catalog: ItemCatalog) -> Self {
        Self::with_parts(shapes, catalog, ContainerTreeCache::new(), InventoryConfig::default())
    }

    /// Inventory over an existing tree cache
    pub fn with_parts(
        shapes: ShapeLibrary,
        catalog: ItemCatalog,
        cache: ContainerTreeCache,
        config: InventoryConfig,
    ) -> Self {
        Self {
            config,
            shapes,
            catalog,
            guids: GuidSource::default(),
            containers: HashMap::new(),
            items: HashMap::new(),
            cache,
            view: None,
        }
    }

    /// Seed the guid generator
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.guids = GuidSource::new(seed);
        self
    }

    /// Send view notifications to `tx`
    pub fn with_view_channel(mut self, tx: Sender<ViewEvent>) -> Self {
        self.view = Some(tx);
        self
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    pub fn shapes(&self) -> &ShapeLibrary {
        &self.shapes
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn cache(&self) -> &ContainerTreeCache {
        &self.cache
    }

    pub fn item(&self, id: &ItemId) -> Option<&ItemInstance> {
        self.items.get(id)
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemInstance> + '_ {
        self.items.values()
    }

    pub fn container(&self, id: &ContainerId) -> Option<&Container> {
        self.containers.get(id)
    }

    pub fn containers(&self) -> impl Iterator<Item = &Container> + '_ {
        self.containers.values()
    }

    pub fn validator(&self) -> PlacementValidator<'_> {
        PlacementValidator::new(&self.containers, &self.items, &self.cache, &self.config)
    }

    // ============== Containers ==============

    /// Register a top-level container; an existing container is left as is
    ///
    /// Fails with [`PlaceError::InvalidSize`] for grids with negative
    /// dimensions or more than `MAX_GRID_CELLS` cells.
    pub fn register_container(
        &mut self,
        id: impl Into<ContainerId>,
        kind: ContainerKind,
    ) -> Result<&Container, PlaceError> {
        let id = id.into();
        let kind = kind.validate()?;
        let cell_size = self.config.default_cell_size;
        if !self.containers.contains_key(&id) {
            self.cache.describe(&id, kind, cell_size);
        }
        Ok(self
            .containers
            .entry(id.clone())
            .or_insert_with(|| Container::from_kind(id, kind, cell_size)))
    }

    /// Look up a container, creating nested ones (`"<itemGuid>:<index>"`) on
    /// first reference from the owner's item definition
    pub fn resolve_container(&mut self, id: &ContainerId) -> Result<&Container, PlaceError> {
        if !self.containers.contains_key(id) {
            let (owner, index) = id
                .split_nested()
                .ok_or_else(|| PlaceError::UnknownContainer(id.clone()))?;
            let owner_item = self
                .items
                .get(&owner)
                .ok_or_else(|| PlaceError::UnknownContainer(id.clone()))?;
            let kind = self
                .catalog
                .get(&owner_item.type_id)?
                .sub_containers
                .get(index)
                .ok_or_else(|| PlaceError::UnknownContainer(id.clone()))?
                .validate()?;

            let cell_size = self.config.default_cell_size;
            let mut container = Container::from_kind(id.clone(), kind, cell_size);
            container.set_owner(Some(owner.clone()));
            self.cache.describe(id, kind, cell_size);
            self.cache.set_owner(id, Some(owner));
            self.containers.insert(id.clone(), container);
            debug!("created nested container {}", id);
        }
        self.containers
            .get(id)
            .ok_or_else(|| PlaceError::UnknownContainer(id.clone()))
    }

    /// Remove a container; its items stay registered but become unplaced
    pub fn unregister_container(&mut self, id: &ContainerId) -> Result<Vec<ItemId>, PlaceError> {
        let container = self
            .containers
            .remove(id)
            .ok_or_else(|| PlaceError::UnknownContainer(id.clone()))?;
        let mut orphaned = container.items();
        orphaned.sort();
        for guid in &orphaned {
            if let Some(item) = self.items.get_mut(guid) {
                item.container = None;
            }
            self.notify(ViewEvent::Removed {
                item: guid.clone(),
                container: id.clone(),
            });
        }
        self.cache.unregister_container(id);
        Ok(orphaned)
    }

    /// Resize a grid; items that no longer fit are detached and returned
    pub fn resize_container(
        &mut self,
        id: &ContainerId,
        width: i32,
        height: i32,
    ) -> Result<Vec<ItemId>, PlaceError> {
        let kind = ContainerKind::Grid { width, height }.validate()?;
        match self.containers.get_mut(id) {
            Some(Container::Grid(grid)) => grid.occupancy.resize(width, height),
            Some(Container::Slot(_)) => return Ok(Vec::new()),
            None => return Err(PlaceError::UnknownContainer(id.clone())),
        }
        let cell_size = self.containers.get(id).map(|c| c.cell_size()).unwrap_or_default();
        self.cache.describe(id, kind, cell_size);
        warn!("container {} resized to {}x{}, rebuilding occupancy", id, width, height);
        self.rebuild(id)
    }

    /// Recompute a grid's occupancy from the item list
    ///
    /// Items that are out of range or collide are detached and returned.
    pub fn rebuild(&mut self, id: &ContainerId) -> Result<Vec<ItemId>, PlaceError> {
        let mut members: Vec<&ItemInstance> = self
            .items
            .values()
            .filter(|item| item.container.as_ref() == Some(id))
            .collect();
        members.sort_by(|a, b| a.id.cmp(&b.id));
        let footprints: Vec<(ItemId, Vec<Cell>)> = members
            .iter()
            .map(|item| (item.id.clone(), item.footprint()))
            .collect();

        let rejected = match self.containers.get_mut(id) {
            Some(Container::Grid(grid)) => grid
                .occupancy
                .rebuild(footprints.iter().map(|(guid, cells)| (guid, cells.clone()))),
            Some(Container::Slot(slot)) => {
                let mut extra: Vec<ItemId> = footprints.into_iter().map(|(guid, _)| guid).collect();
                slot.item = if extra.is_empty() {
                    None
                } else {
                    Some(extra.remove(0))
                };
                extra
            }
            None => return Err(PlaceError::UnknownContainer(id.clone())),
        };

        for guid in &rejected {
            warn!("item {} no longer fits in {}, detaching", guid, id);
            if let Some(item) = self.items.get_mut(guid) {
                item.container = None;
            }
            self.cache.remove(guid);
            self.notify(ViewEvent::Removed {
                item: guid.clone(),
                container: id.clone(),
            });
        }
        Ok(rejected)
    }

    /// Check the occupancy invariants of a container
    ///
    /// Every occupied cell belongs to an item of this container whose
    /// footprint covers it, and every such item's footprint is in bounds and
    /// held by that item.
    pub fn verify(&self, id: &ContainerId) -> Result<bool, PlaceError> {
        let container = self
            .containers
            .get(id)
            .ok_or_else(|| PlaceError::UnknownContainer(id.clone()))?;
        let members: Vec<&ItemInstance> = self
            .items
            .values()
            .filter(|item| item.container.as_ref() == Some(id))
            .collect();

        match container {
            Container::Grid(grid) => {
                let cells_ok = grid.occupancy.occupied().all(|(cell, guid)| {
                    self.items
                        .get(guid)
                        .map(|item| item.container.as_ref() == Some(id) && item.footprint().contains(&cell))
                        .unwrap_or(false)
                });
                let items_ok = members.iter().all(|item| {
                    item.footprint()
                        .iter()
                        .all(|&c| grid.occupancy.is_held_by(c, &item.id))
                });
                Ok(cells_ok && items_ok)
            }
            Container::Slot(slot) => Ok(match (&slot.item, members.as_slice()) {
                (None, []) => true,
                (Some(guid), [only]) => &only.id == guid,
                _ => false,
            }),
        }
    }

    // ============== Items ==============

    /// Create an unplaced item of the given type with a fresh guid
    pub fn spawn(&mut self, type_id: impl Into<ItemTypeId>) -> Result<ItemId, PlaceError> {
        let id = self.guids.next_guid();
        self.spawn_with_id(id, type_id)
    }

    /// Create an unplaced item with a caller-chosen guid
    ///
    /// An existing item with the same guid is destroyed first.
    pub fn spawn_with_id(
        &mut self,
        id: impl Into<ItemId>,
        type_id: impl Into<ItemTypeId>,
    ) -> Result<ItemId, PlaceError> {
        let id = id.into();
        let type_id = type_id.into();
        let def = self.catalog.get(&type_id)?;
        let shape = self.shapes.get(&def.shape)?;
        let instance = ItemInstance::new(id.clone(), def, shape.clone());

        if self.items.contains_key(&id) {
            self.destroy(&id)?;
        }
        self.items.insert(id.clone(), instance);
        Ok(id)
    }

    /// Validate a placement without changing anything
    pub fn can_place(
        &self,
        item: &ItemId,
        container: &ContainerId,
        anchor: Cell,
        orientation: Orientation,
    ) -> Result<PlaceCheck, PlaceError> {
        let validator = self.validator();
        let instance = validator.item(item)?;
        validator.can_place(instance, container, anchor, orientation)
    }

    /// Move an item to a spot, or merge it into the single compatible stack
    /// it lands on
    pub fn try_place(
        &mut self,
        item: &ItemId,
        container: &ContainerId,
        anchor: Cell,
        orientation: Orientation,
    ) -> Result<PlaceOutcome, PlaceError> {
        self.resolve_container(container)?;
        match self.can_place(item, container, anchor, orientation)? {
            PlaceCheck::Free => {
                self.commit_move(item, container, anchor, orientation);
                debug!("placed {} in {} at {}", item, container, anchor);
                Ok(PlaceOutcome::Placed)
            }
            PlaceCheck::Stack { onto } => self.try_stack(item, &onto).map(PlaceOutcome::Stacked),
        }
    }

    /// Full drag-and-drop policy: place, stack, or fall back to quick exchange
    /// when the drop overlaps other items
    pub fn drop_item(
        &mut self,
        item: &ItemId,
        container: &ContainerId,
        anchor: Cell,
        orientation: Orientation,
    ) -> Result<PlaceOutcome, PlaceError> {
        match self.try_place(item, container, anchor, orientation) {
            Err(PlaceError::Overlap { items }) => {
                debug!("drop of {} overlaps {} item(s), trying exchange", item, items.len());
                self.try_quick_exchange(item, container, anchor, orientation)
            }
            other => other,
        }
    }

    /// Rotate an item in place, keeping its anchor
    pub fn try_rotate(&mut self, item: &ItemId, orientation: Orientation) -> Result<(), PlaceError> {
        let instance = self
            .items
            .get(item)
            .ok_or_else(|| PlaceError::UnknownItem(item.clone()))?;
        let anchor = instance.anchor;
        let Some(container) = instance.container.clone() else {
            if let Some(instance) = self.items.get_mut(item) {
                instance.orientation = orientation;
            }
            return Ok(());
        };

        match self.can_place(item, &container, anchor, orientation)? {
            PlaceCheck::Free => {
                self.commit_move(item, &container, anchor, orientation);
                Ok(())
            }
            PlaceCheck::Stack { onto } => Err(PlaceError::Overlap { items: vec![onto] }),
        }
    }

    /// Take an item out of its container; it stays registered, unplaced
    pub fn remove(&mut self, item: &ItemId) -> Result<(), PlaceError> {
        if !self.items.contains_key(item) {
            return Err(PlaceError::UnknownItem(item.clone()));
        }
        if let Some(from) = self.detach(item) {
            self.cache.remove(item);
            self.notify(ViewEvent::Removed {
                item: item.clone(),
                container: from,
            });
        }
        Ok(())
    }

    /// Delete an item, its nested containers and everything inside them
    ///
    /// Returns the guids deleted, the item itself first.
    pub fn destroy(&mut self, item: &ItemId) -> Result<Vec<ItemId>, PlaceError> {
        if !self.items.contains_key(item) {
            return Err(PlaceError::UnknownItem(item.clone()));
        }
        let mut doomed = vec![item.clone()];
        doomed.extend(self.cache.descendants(item));

        for guid in &doomed {
            if let Some(from) = self.detach(guid) {
                self.notify(ViewEvent::Removed {
                    item: guid.clone(),
                    container: from,
                });
            }
            self.cache.remove(guid);
            let owned: Vec<ContainerId> = self.cache.containers_owned_by(guid).cloned().collect();
            for container in owned {
                self.containers.remove(&container);
                self.cache.unregister_container(&container);
            }
            // Sub-containers created but never cached.
            self.containers.retain(|_, c| c.owner() != Some(guid));
            self.items.remove(guid);
        }
        debug!("destroyed {} item(s) rooted at {}", doomed.len(), item);
        Ok(doomed)
    }

    /// Set a stack size, clamped to `1..=max_stack`; returns the stored count
    pub fn set_stack_count(&mut self, item: &ItemId, count: u32) -> Result<u32, PlaceError> {
        let instance = self
            .items
            .get_mut(item)
            .ok_or_else(|| PlaceError::UnknownItem(item.clone()))?;
        instance.stack_count = count.min(instance.max_stack).max(1);
        let stored = instance.stack_count;
        self.sync_snapshot(item);
        Ok(stored)
    }

    /// Merge `source` into `destination`
    ///
    /// An emptied source is deleted from its container and the registry.
    pub fn try_stack(&mut self, source: &ItemId, destination: &ItemId) -> Result<StackOutcome, PlaceError> {
        let src = self
            .items
            .get(source)
            .ok_or_else(|| PlaceError::UnknownItem(source.clone()))?;
        let dst = self
            .items
            .get(destination)
            .ok_or_else(|| PlaceError::UnknownItem(destination.clone()))?;
        let outcome = plan_merge(src, dst)?;

        if let Some(dst) = self.items.get_mut(destination) {
            dst.stack_count = outcome.destination_count;
        }
        self.sync_snapshot(destination);

        if outcome.source_consumed() {
            self.destroy(source)?;
        } else {
            if let Some(src) = self.items.get_mut(source) {
                src.stack_count = outcome.source_remaining;
            }
            self.sync_snapshot(source);
        }
        debug!(
            "stacked {} unit(s) from {} onto {}",
            outcome.transferred, source, destination
        );
        Ok(outcome)
    }

    /// Swap `item` with the items its drop spot fully covers
    ///
    /// A single stack-compatible item under the drop spot merges instead.
    pub fn try_quick_exchange(
        &mut self,
        item: &ItemId,
        container: &ContainerId,
        anchor: Cell,
        orientation: Orientation,
    ) -> Result<PlaceOutcome, PlaceError> {
        self.resolve_container(container)?;
        match self.can_place(item, container, anchor, orientation) {
            Ok(PlaceCheck::Stack { onto }) => {
                return self.try_stack(item, &onto).map(PlaceOutcome::Stacked);
            }
            Ok(PlaceCheck::Free) | Err(PlaceError::Overlap { .. }) => {}
            Err(err) => return Err(err),
        }

        let plan = match QuickExchangeEngine::new(self.validator()).plan(item, container, anchor, orientation) {
            Ok(plan) => plan,
            Err(err) => {
                debug!("exchange of {} into {} rejected: {}", item, container, err);
                return Err(err);
            }
        };
        self.commit_exchange(&plan);
        debug!(
            "exchanged {} with {} item(s) between {} and {}",
            plan.dragged,
            plan.relocations.len(),
            plan.origin,
            plan.target
        );
        Ok(PlaceOutcome::Exchanged(plan))
    }

    // ============== Nested contents ==============

    /// Every item nested anywhere inside `item`
    pub fn descendants(&self, item: &ItemId) -> Vec<ItemId> {
        self.cache.descendants(item)
    }

    /// Weight of an item stack plus everything nested inside it
    pub fn total_weight(&self, item: &ItemId) -> Result<f32, PlaceError> {
        let mut total = self.stack_weight(item)?;
        for guid in self.cache.descendants(item) {
            total += self.stack_weight(&guid)?;
        }
        Ok(total)
    }

    fn stack_weight(&self, item: &ItemId) -> Result<f32, PlaceError> {
        let instance = self
            .items
            .get(item)
            .ok_or_else(|| PlaceError::UnknownItem(item.clone()))?;
        let def = self.catalog.get(&instance.type_id)?;
        Ok(def.weight * instance.stack_count as f32)
    }

    // ============== Session ==============

    /// Drop every item and container and reset the tree cache
    pub fn clear(&mut self) {
        self.items.clear();
        self.containers.clear();
        self.cache.clear();
    }

    // ============== Commit helpers ==============

    /// Remove an item from its container's occupancy; returns that container
    pub(crate) fn detach(&mut self, item: &ItemId) -> Option<ContainerId> {
        let instance = self.items.get_mut(item)?;
        let from = instance.container.take()?;
        let footprint = instance.footprint();
        if let Some(container) = self.containers.get_mut(&from) {
            container.remove(item, &footprint);
        }
        Some(from)
    }

    /// Write an item into a container at a validated spot and sync the cache
    pub(crate) fn attach(&mut self, item: &ItemId, container: &ContainerId, anchor: Cell, orientation: Orientation) {
        let Some(instance) = self.items.get_mut(item) else {
            return;
        };
        instance.anchor = anchor;
        instance.orientation = orientation;
        instance.container = Some(container.clone());
        let footprint = instance.footprint();
        let snapshot = ItemSnapshot::from(&*instance);
        if let Some(target) = self.containers.get_mut(container) {
            target.place(item, &footprint);
        }
        self.cache.place(container, snapshot);
    }

    pub(crate) fn commit_move(&mut self, item: &ItemId, container: &ContainerId, anchor: Cell, orientation: Orientation) {
        let from = self.detach(item);
        self.attach(item, container, anchor, orientation);
        self.notify_moved(item, from, container);
    }

    fn commit_exchange(&mut self, plan: &ExchangePlan) {
        self.detach(&plan.dragged);
        for relocation in &plan.relocations {
            self.detach(&relocation.item);
        }
        for relocation in &plan.relocations {
            self.attach(&relocation.item, &plan.origin, relocation.anchor, relocation.orientation);
        }
        self.attach(&plan.dragged, &plan.target, plan.anchor, plan.orientation);

        self.notify_moved(&plan.dragged, Some(plan.origin.clone()), &plan.target);
        for relocation in &plan.relocations {
            self.notify_moved(&relocation.item, Some(plan.target.clone()), &plan.origin);
        }
    }

    fn sync_snapshot(&mut self, item: &ItemId) {
        let Some(instance) = self.items.get(item) else {
            return;
        };
        let Some(container) = instance.container.clone() else {
            return;
        };
        let snapshot = ItemSnapshot::from(instance);
        self.cache.place(&container, snapshot);
        self.notify(ViewEvent::Updated {
            item: item.clone(),
            container,
        });
    }

    fn notify_moved(&self, item: &ItemId, from: Option<ContainerId>, to: &ContainerId) {
        match from {
            Some(from) if &from == to => self.notify(ViewEvent::Updated {
                item: item.clone(),
                container: from,
            }),
            Some(from) => {
                self.notify(ViewEvent::Removed {
                    item: item.clone(),
                    container: from,
                });
                self.notify(ViewEvent::Created {
                    item: item.clone(),
                    container: to.clone(),
                });
            }
            None => self.notify(ViewEvent::Created {
                item: item.clone(),
                container: to.clone(),
            }),
        }
    }

    fn notify(&self, event: ViewEvent) {
        if let Some(tx) = &self.view {
            let _ = tx.send(event);
        }
    }
}
