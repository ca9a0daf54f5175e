//! Snapshot export and restore.

use log::{debug, warn};

use crate::core::{ItemSnapshot, PlaceError};
use crate::inventory::Inventory;
use crate::types::{ContainerId, ItemId};
use crate::validator::PlaceCheck;

/// Result of [`Inventory::restore`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoreReport {
    /// Items registered (placed or loose)
    pub restored: Vec<ItemId>,
    /// Snapshots that could not be placed; the item stays registered, unplaced
    pub rejected: Vec<(ItemId, PlaceError)>,
}

impl RestoreReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

impl Inventory {
    /// Snapshot of every item, sorted by guid
    pub fn export_snapshots(&self) -> Vec<ItemSnapshot> {
        let mut out: Vec<ItemSnapshot> = self.items().map(ItemSnapshot::from).collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    /// Rebuild items from snapshots
    ///
    /// Every item is registered before any is placed, so nested containers
    /// can resolve their owners regardless of snapshot order. Placement runs
    /// the usual validation; a snapshot landing on another item is rejected
    /// rather than merged.
    pub fn restore(&mut self, snapshots: &[ItemSnapshot]) -> RestoreReport {
        let mut report = RestoreReport::default();
        let mut registered: Vec<&ItemSnapshot> = Vec::with_capacity(snapshots.len());

        for snapshot in snapshots {
            match self.spawn_with_id(snapshot.id.clone(), snapshot.type_id.clone()) {
                Ok(id) => {
                    if let Some(item) = self.items.get_mut(&id) {
                        item.orientation = snapshot.orientation;
                        item.stack_count = snapshot.stack_count.min(item.max_stack).max(1);
                    }
                    registered.push(snapshot);
                }
                Err(err) => {
                    warn!("snapshot {} skipped: {}", snapshot.id, err);
                    report.rejected.push((snapshot.id.clone(), err));
                }
            }
        }

        for snapshot in registered {
            if let Some(container) = &snapshot.container {
                if let Err(err) = self.check_restore(snapshot, container) {
                    warn!("snapshot {} not placed in {}: {}", snapshot.id, container, err);
                    report.rejected.push((snapshot.id.clone(), err));
                    continue;
                }
                self.commit_move(&snapshot.id, container, snapshot.anchor, snapshot.orientation);
            }
            report.restored.push(snapshot.id.clone());
        }

        debug!(
            "restored {} item(s), rejected {}",
            report.restored.len(),
            report.rejected.len()
        );
        report
    }

    fn check_restore(&mut self, snapshot: &ItemSnapshot, container: &ContainerId) -> Result<(), PlaceError> {
        self.resolve_container(container)?;
        match self.can_place(&snapshot.id, container, snapshot.anchor, snapshot.orientation)? {
            PlaceCheck::Free => Ok(()),
            PlaceCheck::Stack { onto } => Err(PlaceError::Overlap { items: vec![onto] }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ContainerKind, ItemCatalog, ItemDef, ShapeLibrary};
    use crate::types::{Cell, Orientation};

    fn catalog() -> ItemCatalog {
        let mut catalog = ItemCatalog::new();
        catalog.insert(ItemDef::new("ammo", "1x1").with_max_stack(30));
        catalog.insert(
            ItemDef::new("rig", "2x2").with_sub_container(ContainerKind::Grid { width: 2, height: 1 }),
        );
        catalog
    }

    fn fresh() -> Inventory {
        let mut inv = Inventory::new(ShapeLibrary::with_builtin_shapes(), catalog());
        inv.register_container("stash", ContainerKind::Grid { width: 4, height: 4 }).unwrap();
        inv
    }

    #[test]
    fn export_then_restore_reproduces_layout() {
        let mut inv = fresh();
        let stash = ContainerId::from("stash");
        let rig = inv.spawn("rig").unwrap();
        inv.try_place(&rig, &stash, Cell::new(2, 2), Orientation::North).unwrap();
        let ammo = inv.spawn("ammo").unwrap();
        inv.try_place(&ammo, &ContainerId::nested(&rig, 0), Cell::new(1, 0), Orientation::North)
            .unwrap();

        let snapshots = inv.export_snapshots();

        // Nested item first: owners must still resolve.
        let mut nested_first = snapshots.clone();
        nested_first.sort_by(|a, b| a.container.cmp(&b.container));

        let mut copy = fresh();
        let report = copy.restore(&nested_first);
        assert!(report.is_clean());
        assert_eq!(copy.export_snapshots(), snapshots);
        assert_eq!(copy.descendants(&rig), vec![ammo]);
    }

    #[test]
    fn colliding_snapshot_is_reported() {
        let mut inv = fresh();
        let stash = ContainerId::from("stash");
        let a = inv.spawn("ammo").unwrap();
        inv.try_place(&a, &stash, Cell::ORIGIN, Orientation::North).unwrap();
        let mut snapshots = inv.export_snapshots();
        let mut twin = snapshots[0].clone();
        twin.id = ItemId::from("twin");
        snapshots.push(twin);

        let mut copy = fresh();
        let report = copy.restore(&snapshots);
        assert_eq!(report.restored, vec![a]);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0, ItemId::from("twin"));
        assert_eq!(report.rejected[0].1.code(), "overlap");
        assert!(!copy.item(&ItemId::from("twin")).unwrap().is_placed());
    }
}
