//! Quick exchange tests - swapping a dragged item with the items it covers

use std::sync::mpsc;

use gridstash::core::{
    ContainerKind, ContainerTreeCache, ExchangeBlocker, ItemCatalog, ItemDef, ItemSnapshot,
    PlaceError, ShapeLibrary,
};
use gridstash::engine::{Inventory, InventoryConfig, PlaceOutcome, RelocationMethod};
use gridstash::types::{Cell, ContainerId, ItemId, Orientation, ViewEvent};

fn catalog() -> ItemCatalog {
    let mut catalog = ItemCatalog::new();
    catalog.insert(ItemDef::new("coin", "1x1"));
    catalog.insert(ItemDef::new("ammo", "1x1").with_max_stack(20));
    catalog.insert(ItemDef::new("plank", "2x1"));
    catalog.insert(ItemDef::new("crate", "2x2"));
    catalog.insert(ItemDef::new("corner", "corner"));
    catalog
}

fn inventory_with(config: InventoryConfig) -> Inventory {
    let mut inv = Inventory::with_parts(
        ShapeLibrary::with_builtin_shapes(),
        catalog(),
        ContainerTreeCache::new(),
        config,
    );
    inv.register_container("a", ContainerKind::Grid { width: 4, height: 4 }).unwrap();
    inv.register_container("b", ContainerKind::Grid { width: 4, height: 4 }).unwrap();
    inv.register_container("slot", ContainerKind::Slot).unwrap();
    inv
}

fn inventory() -> Inventory {
    inventory_with(InventoryConfig::default())
}

fn put(inv: &mut Inventory, type_id: &str, container: &str, anchor: (i32, i32), o: Orientation) -> ItemId {
    let id = inv.spawn(type_id).unwrap();
    inv.try_place(&id, &ContainerId::from(container), Cell::from(anchor), o)
        .unwrap();
    id
}

/// Everything observable about the inventory, in a stable order
fn state(inv: &Inventory) -> (Vec<ItemSnapshot>, String) {
    let export = serde_json::to_string(&inv.cache().export()).unwrap();
    (inv.export_snapshots(), export)
}

fn assert_consistent(inv: &Inventory) {
    for id in ["a", "b", "slot"] {
        assert!(inv.verify(&ContainerId::from(id)).unwrap(), "container {} inconsistent", id);
    }
}

#[test]
fn test_single_cell_swap_between_grids() {
    let mut inv = inventory();
    let x = put(&mut inv, "coin", "a", (0, 0), Orientation::North);
    let y = put(&mut inv, "coin", "b", (2, 3), Orientation::North);

    let outcome = inv
        .try_quick_exchange(&y, &ContainerId::from("a"), Cell::new(0, 0), Orientation::North)
        .unwrap();
    let PlaceOutcome::Exchanged(plan) = outcome else {
        panic!("expected an exchange");
    };
    assert!(plan.crosses_containers());

    let y_item = inv.item(&y).unwrap();
    assert_eq!(y_item.container, Some(ContainerId::from("a")));
    assert_eq!(y_item.anchor, Cell::new(0, 0));
    let x_item = inv.item(&x).unwrap();
    assert_eq!(x_item.container, Some(ContainerId::from("b")));
    assert_eq!(x_item.anchor, Cell::new(2, 3));

    assert_eq!(inv.cache().container_of(&x), Some(&ContainerId::from("b")));
    assert_eq!(inv.cache().container_of(&y), Some(&ContainerId::from("a")));
    assert_consistent(&inv);
}

#[test]
fn test_unfittable_item_leaves_state_untouched() {
    let mut inv = inventory();
    // A crate sits in the slot; the coin's single vacated cell cannot hold it.
    let x = put(&mut inv, "crate", "slot", (0, 0), Orientation::North);
    let y = put(&mut inv, "coin", "b", (1, 1), Orientation::North);
    let before = state(&inv);

    let err = inv
        .try_quick_exchange(&y, &ContainerId::from("slot"), Cell::ORIGIN, Orientation::North)
        .unwrap_err();
    assert_eq!(err, PlaceError::exchange(ExchangeBlocker::NoRoom));

    assert_eq!(state(&inv), before);
    assert_eq!(inv.item(&x).unwrap().container, Some(ContainerId::from("slot")));
    assert_consistent(&inv);
}

#[test]
fn test_partial_overlap_aborts() {
    let mut inv = inventory();
    put(&mut inv, "plank", "a", (1, 0), Orientation::North);
    let crate_id = put(&mut inv, "crate", "b", (0, 0), Orientation::North);
    let before = state(&inv);

    let err = inv
        .try_quick_exchange(&crate_id, &ContainerId::from("a"), Cell::new(0, 0), Orientation::North)
        .unwrap_err();
    assert_eq!(err, PlaceError::exchange(ExchangeBlocker::PartialOverlap));
    assert_eq!(state(&inv), before);
}

#[test]
fn test_empty_target_is_not_an_exchange() {
    let mut inv = inventory();
    let coin = put(&mut inv, "coin", "b", (0, 0), Orientation::North);
    let err = inv
        .try_quick_exchange(&coin, &ContainerId::from("a"), Cell::new(3, 3), Orientation::North)
        .unwrap_err();
    assert_eq!(err, PlaceError::exchange(ExchangeBlocker::NothingCovered));
    assert_eq!(err.code(), "exchange_infeasible");
}

#[test]
fn test_out_of_bounds_drop_is_rejected_first() {
    let mut inv = inventory();
    let crate_id = put(&mut inv, "crate", "b", (0, 0), Orientation::North);
    put(&mut inv, "coin", "a", (3, 3), Orientation::North);
    let err = inv
        .try_quick_exchange(&crate_id, &ContainerId::from("a"), Cell::new(3, 3), Orientation::North)
        .unwrap_err();
    assert_eq!(err.code(), "out_of_bounds");
}

#[test]
fn test_compatible_stack_short_circuits_to_merge() {
    let mut inv = inventory();
    let dst = put(&mut inv, "ammo", "a", (0, 0), Orientation::North);
    let src = put(&mut inv, "ammo", "b", (0, 0), Orientation::North);

    let outcome = inv
        .try_quick_exchange(&src, &ContainerId::from("a"), Cell::new(0, 0), Orientation::North)
        .unwrap();
    assert!(matches!(outcome, PlaceOutcome::Stacked(_)));
    assert_eq!(inv.item(&dst).unwrap().stack_count, 2);
    assert!(inv.item(&src).is_none());
}

#[test]
fn test_crate_swaps_with_two_planks() {
    let mut inv = inventory();
    let crate_id = put(&mut inv, "crate", "b", (2, 2), Orientation::North);
    let top = put(&mut inv, "plank", "a", (0, 0), Orientation::North);
    let bottom = put(&mut inv, "plank", "a", (0, 1), Orientation::North);

    let outcome = inv
        .drop_item(&crate_id, &ContainerId::from("a"), Cell::new(0, 0), Orientation::North)
        .unwrap();
    let PlaceOutcome::Exchanged(plan) = outcome else {
        panic!("expected an exchange");
    };
    assert_eq!(plan.relocations.len(), 2);
    assert!(plan.relocations.iter().all(|r| r.method == RelocationMethod::Mapped));

    assert_eq!(inv.item(&top).unwrap().anchor, Cell::new(2, 2));
    assert_eq!(inv.item(&bottom).unwrap().anchor, Cell::new(2, 3));
    assert_eq!(inv.item(&crate_id).unwrap().container, Some(ContainerId::from("a")));
    assert_consistent(&inv);
}

#[test]
fn test_same_container_exchange_rotates_into_leftover_cells() {
    let mut inv = inventory();
    let a = ContainerId::from("a");
    let crate_id = put(&mut inv, "crate", "a", (0, 0), Orientation::North);
    // .X
    // XX  at (1,1), inside the crate's target but clear of its current cells
    let corner = put(&mut inv, "corner", "a", (1, 1), Orientation::West);

    inv.try_quick_exchange(&crate_id, &a, Cell::new(1, 1), Orientation::North)
        .unwrap();

    let moved = inv.item(&corner).unwrap();
    assert_eq!(moved.anchor, Cell::new(0, 0));
    assert_eq!(moved.orientation, Orientation::East);
    assert_eq!(inv.item(&crate_id).unwrap().anchor, Cell::new(1, 1));
    assert_consistent(&inv);
}

#[test]
fn test_same_container_exchange_without_rotations_fails() {
    let mut inv = inventory_with(InventoryConfig {
        exchange_rotations: false,
        ..InventoryConfig::default()
    });
    let a = ContainerId::from("a");
    let crate_id = put(&mut inv, "crate", "a", (0, 0), Orientation::North);
    put(&mut inv, "corner", "a", (1, 1), Orientation::West);
    let before = state(&inv);

    let err = inv
        .try_quick_exchange(&crate_id, &a, Cell::new(1, 1), Orientation::North)
        .unwrap_err();
    assert_eq!(err, PlaceError::exchange(ExchangeBlocker::NoRoom));
    assert_eq!(state(&inv), before);
    assert_consistent(&inv);
}

#[test]
fn test_slot_occupant_moves_to_grid() {
    let mut inv = inventory();
    let worn = put(&mut inv, "crate", "slot", (0, 0), Orientation::North);
    let other = put(&mut inv, "crate", "b", (1, 1), Orientation::North);

    let outcome = inv
        .drop_item(&other, &ContainerId::from("slot"), Cell::ORIGIN, Orientation::North)
        .unwrap();
    let PlaceOutcome::Exchanged(plan) = outcome else {
        panic!("expected an exchange");
    };
    assert_eq!(plan.relocations[0].method, RelocationMethod::PatternMatched);
    assert_eq!(inv.item(&worn).unwrap().container, Some(ContainerId::from("b")));
    assert_eq!(inv.item(&worn).unwrap().anchor, Cell::new(1, 1));
    assert_eq!(inv.item(&other).unwrap().container, Some(ContainerId::from("slot")));
    assert_consistent(&inv);
}

#[test]
fn test_grid_item_moves_into_vacated_slot() {
    let mut inv = inventory();
    let worn = put(&mut inv, "coin", "slot", (0, 0), Orientation::North);
    let plank = put(&mut inv, "plank", "a", (2, 0), Orientation::North);

    let err = inv
        .try_quick_exchange(&worn, &ContainerId::from("a"), Cell::new(2, 0), Orientation::North)
        .unwrap_err();
    // A coin cannot cover a plank.
    assert_eq!(err, PlaceError::exchange(ExchangeBlocker::PartialOverlap));

    let crate_id = put(&mut inv, "crate", "b", (0, 0), Orientation::North);
    inv.remove(&worn).unwrap();
    inv.try_place(&crate_id, &ContainerId::from("slot"), Cell::ORIGIN, Orientation::North)
        .unwrap();

    let PlaceOutcome::Exchanged(plan) = inv
        .try_quick_exchange(&crate_id, &ContainerId::from("a"), Cell::new(2, 0), Orientation::North)
        .unwrap()
    else {
        panic!("expected an exchange");
    };
    assert_eq!(plan.relocations[0].method, RelocationMethod::Slot);
    assert_eq!(inv.item(&plank).unwrap().container, Some(ContainerId::from("slot")));
    assert_consistent(&inv);
}

#[test]
fn test_slot_origin_refuses_two_items() {
    let mut inv = inventory();
    let crate_id = put(&mut inv, "crate", "slot", (0, 0), Orientation::North);
    put(&mut inv, "coin", "a", (0, 0), Orientation::North);
    put(&mut inv, "coin", "a", (1, 1), Orientation::North);
    let before = state(&inv);

    let err = inv
        .try_quick_exchange(&crate_id, &ContainerId::from("a"), Cell::new(0, 0), Orientation::North)
        .unwrap_err();
    assert_eq!(err, PlaceError::exchange(ExchangeBlocker::NoRoom));
    assert_eq!(state(&inv), before);
}

#[test]
fn test_unplaced_item_cannot_exchange() {
    let mut inv = inventory();
    put(&mut inv, "coin", "a", (0, 0), Orientation::North);
    let loose = inv.spawn("coin").unwrap();
    assert_eq!(
        inv.try_quick_exchange(&loose, &ContainerId::from("a"), Cell::new(0, 0), Orientation::North),
        Err(PlaceError::exchange(ExchangeBlocker::NotPlaced))
    );
}

#[test]
fn test_cross_container_exchange_notifies_view() {
    let (tx, rx) = mpsc::channel();
    let mut inv = inventory().with_view_channel(tx);
    let x = put(&mut inv, "coin", "a", (0, 0), Orientation::North);
    let y = put(&mut inv, "coin", "b", (0, 0), Orientation::North);
    rx.try_iter().for_each(drop);

    inv.try_quick_exchange(&y, &ContainerId::from("a"), Cell::new(0, 0), Orientation::North)
        .unwrap();
    let events: Vec<ViewEvent> = rx.try_iter().collect();
    let a = ContainerId::from("a");
    let b = ContainerId::from("b");
    assert_eq!(
        events,
        vec![
            ViewEvent::Removed { item: y.clone(), container: b.clone() },
            ViewEvent::Created { item: y, container: a.clone() },
            ViewEvent::Removed { item: x.clone(), container: a },
            ViewEvent::Created { item: x, container: b },
        ]
    );
}

#[test]
fn test_dropped_receiver_is_ignored() {
    let (tx, rx) = mpsc::channel();
    let mut inv = inventory().with_view_channel(tx);
    drop(rx);
    let coin = put(&mut inv, "coin", "a", (0, 0), Orientation::North);
    assert!(inv.item(&coin).unwrap().is_placed());
}
