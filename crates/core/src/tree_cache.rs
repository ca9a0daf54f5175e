//! Tree cache module - flat registry of containers, items and owners
//!
//! Nested containers are keyed by composing the owning item's guid with a
//! slot index (`"<itemGuid>:<index>"`), so every container, however deep, is
//! one hash lookup away. The cache keeps three flat maps:
//!
//! - container id → metadata, owner back-reference, item snapshots
//! - item guid → container id (reverse map)
//! - owner item guid → owned container ids
//!
//! Nothing here recurses. Walks over the hierarchy (owner chains, nested
//! contents) are iterative and bounded.
//!
//! Entries are only ever pruned by explicit calls ([`ContainerTreeCache::remove`],
//! [`ContainerTreeCache::unregister_container`], [`ContainerTreeCache::clear`]).

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use crate::container::ContainerKind;
use crate::snapshot::{CacheExport, ContainerExport, ItemSnapshot};
use crate::types::{ContainerId, ItemId, DEFAULT_CELL_SIZE};

/// Cached state of one container
#[derive(Debug, Clone, PartialEq)]
pub struct CachedContainer {
    /// None until the container has been described
    pub kind: Option<ContainerKind>,
    pub cell_size: u32,
    /// Back-reference to the item this container belongs to
    pub owner: Option<ItemId>,
    pub items: BTreeMap<ItemId, ItemSnapshot>,
}

impl Default for CachedContainer {
    fn default() -> Self {
        Self {
            kind: None,
            cell_size: DEFAULT_CELL_SIZE,
            owner: None,
            items: BTreeMap::new(),
        }
    }
}

/// Result of walking a container's owner chain looking for an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ancestry {
    /// The item is not among the container's owners
    Unrelated,
    /// The container sits (transitively) inside the item
    Inside,
    /// The walk hit the hop bound before reaching a top-level container
    TooDeep,
}

#[derive(Debug, Clone, Default)]
pub struct ContainerTreeCache {
    containers: HashMap<ContainerId, CachedContainer>,
    item_index: HashMap<ItemId, ContainerId>,
    owned: HashMap<ItemId, BTreeSet<ContainerId>>,
}

impl ContainerTreeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a container entry, creating an empty one on first reference
    pub fn get_or_create(&mut self, id: &ContainerId) -> &mut CachedContainer {
        self.containers.entry(id.clone()).or_default()
    }

    /// Record a container's kind and cell size
    pub fn describe(&mut self, id: &ContainerId, kind: ContainerKind, cell_size: u32) {
        let entry = self.get_or_create(id);
        entry.kind = Some(kind);
        entry.cell_size = cell_size;
    }

    /// Set (or clear) the owner back-reference of a container
    pub fn set_owner(&mut self, id: &ContainerId, owner: Option<ItemId>) {
        let previous = self.get_or_create(id).owner.take();
        if let Some(prev) = previous {
            if let Some(set) = self.owned.get_mut(&prev) {
                set.remove(id);
                if set.is_empty() {
                    self.owned.remove(&prev);
                }
            }
        }
        if let Some(owner) = &owner {
            self.owned
                .entry(owner.clone())
                .or_default()
                .insert(id.clone());
        }
        self.get_or_create(id).owner = owner;
    }

    /// Upsert an item into a container, updating the forward and reverse maps
    /// together
    ///
    /// If the item was recorded in another container it is detached from that
    /// container first.
    pub fn place(&mut self, container: &ContainerId, mut snapshot: ItemSnapshot) {
        snapshot.container = Some(container.clone());
        let id = snapshot.id.clone();

        if let Some(previous) = self.item_index.get(&id) {
            if previous != container {
                if let Some(entry) = self.containers.get_mut(previous) {
                    entry.items.remove(&id);
                }
            }
        }

        self.get_or_create(container).items.insert(id.clone(), snapshot);
        self.item_index.insert(id, container.clone());
    }

    /// Detach an item globally: reverse map and its container
    pub fn remove(&mut self, guid: &ItemId) -> Option<ItemSnapshot> {
        let container = self.item_index.remove(guid)?;
        self.containers
            .get_mut(&container)
            .and_then(|entry| entry.items.remove(guid))
    }

    /// Detach an item from one container only; the reverse map is untouched
    pub fn remove_from_container(
        &mut self,
        container: &ContainerId,
        guid: &ItemId,
    ) -> Option<ItemSnapshot> {
        self.containers
            .get_mut(container)
            .and_then(|entry| entry.items.remove(guid))
    }

    /// Drop a container entry and the reverse entries pointing at it
    pub fn unregister_container(&mut self, id: &ContainerId) -> Option<CachedContainer> {
        let entry = self.containers.remove(id)?;
        for guid in entry.items.keys() {
            if self.item_index.get(guid) == Some(id) {
                self.item_index.remove(guid);
            }
        }
        if let Some(owner) = &entry.owner {
            if let Some(set) = self.owned.get_mut(owner) {
                set.remove(id);
                if set.is_empty() {
                    self.owned.remove(owner);
                }
            }
        }
        Some(entry)
    }

    /// Forget everything (session reset)
    pub fn clear(&mut self) {
        self.containers.clear();
        self.item_index.clear();
        self.owned.clear();
    }

    pub fn get(&self, id: &ContainerId) -> Option<&CachedContainer> {
        self.containers.get(id)
    }

    pub fn contains_container(&self, id: &ContainerId) -> bool {
        self.containers.contains_key(id)
    }

    /// Snapshots of the items in a container, ordered by guid
    pub fn items_in(&self, id: &ContainerId) -> impl Iterator<Item = &ItemSnapshot> + '_ {
        self.containers
            .get(id)
            .into_iter()
            .flat_map(|entry| entry.items.values())
    }

    /// Container currently holding an item
    pub fn container_of(&self, guid: &ItemId) -> Option<&ContainerId> {
        self.item_index.get(guid)
    }

    /// Owner recorded with [`ContainerTreeCache::set_owner`]
    ///
    /// The id itself is never parsed: a top-level container may be named
    /// like a nested one.
    pub fn owner_of(&self, id: &ContainerId) -> Option<ItemId> {
        self.containers.get(id).and_then(|entry| entry.owner.clone())
    }

    /// Containers owned by an item
    pub fn containers_owned_by(&self, owner: &ItemId) -> impl Iterator<Item = &ContainerId> + '_ {
        self.owned.get(owner).into_iter().flat_map(|set| set.iter())
    }

    /// All cached containers (unordered)
    pub fn containers(&self) -> impl Iterator<Item = (&ContainerId, &CachedContainer)> + '_ {
        self.containers.iter()
    }

    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    pub fn item_count(&self) -> usize {
        self.item_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty() && self.item_index.is_empty()
    }

    /// Walk the owner chain of `container` looking for `item`
    ///
    /// Each hop goes container → owner item → container holding that item.
    /// The walk stops at a container without owner, at an unplaced owner, or
    /// after `max_hops` hops.
    pub fn ancestry(&self, container: &ContainerId, item: &ItemId, max_hops: usize) -> Ancestry {
        let mut current = container.clone();
        for _ in 0..max_hops {
            let Some(owner) = self.owner_of(&current) else {
                return Ancestry::Unrelated;
            };
            if &owner == item {
                return Ancestry::Inside;
            }
            let Some(next) = self.item_index.get(&owner) else {
                return Ancestry::Unrelated;
            };
            current = next.clone();
        }
        Ancestry::TooDeep
    }

    /// Every item nested anywhere below `item`, breadth first
    pub fn descendants(&self, item: &ItemId) -> Vec<ItemId> {
        let mut out = Vec::new();
        let mut visited: HashSet<ItemId> = HashSet::new();
        let mut queue: VecDeque<ItemId> = VecDeque::new();
        visited.insert(item.clone());
        queue.push_back(item.clone());

        while let Some(current) = queue.pop_front() {
            for container in self.containers_owned_by(&current) {
                for guid in self.items_in(container).map(|s| &s.id) {
                    if visited.insert(guid.clone()) {
                        out.push(guid.clone());
                        queue.push_back(guid.clone());
                    }
                }
            }
        }
        out
    }

    /// Read-only export for persistence and diagnostics
    pub fn export(&self) -> CacheExport {
        let mut containers: Vec<ContainerExport> = self
            .containers
            .iter()
            .map(|(id, entry)| ContainerExport {
                id: id.clone(),
                kind: entry.kind,
                cell_size: entry.cell_size,
                owner: entry.owner.clone(),
                items: entry.items.values().cloned().collect(),
            })
            .collect();
        containers.sort_by(|a, b| a.id.cmp(&b.id));
        CacheExport { containers }
    }
}
