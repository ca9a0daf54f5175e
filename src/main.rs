//! Scripted inventory session (default binary).
//!
//! Sets up a stash and a backpack, drags a few items around (placement,
//! stacking, quick exchange, nesting) and prints the resulting tree cache as
//! JSON. Set `RUST_LOG=debug` to follow each operation.

use std::sync::mpsc;

use anyhow::{anyhow, Result};
use log::info;

use gridstash::core::{ContainerKind, ItemCatalog, ItemDef, ShapeLibrary};
use gridstash::engine::{Inventory, InventoryConfig, PlaceOutcome};
use gridstash::types::{Cell, ContainerId, Orientation};

fn catalog() -> ItemCatalog {
    let mut catalog = ItemCatalog::new();
    catalog.insert(ItemDef::new("ammo.9mm", "1x1").with_max_stack(60).with_weight(0.01));
    catalog.insert(ItemDef::new("bandage", "1x1").with_max_stack(5).with_weight(0.05));
    catalog.insert(ItemDef::new("rifle", "3x1").with_weight(3.4));
    catalog.insert(ItemDef::new("plate", "2x1").with_weight(1.2));
    catalog.insert(ItemDef::new("medkit", "2x2").with_weight(0.6));
    catalog.insert(
        ItemDef::new("backpack", "2x3")
            .with_weight(1.0)
            .with_sub_container(ContainerKind::Grid { width: 4, height: 4 })
            .with_sub_container(ContainerKind::Slot),
    );
    catalog
}

fn main() -> Result<()> {
    env_logger::init();

    let config = InventoryConfig::from_env();
    let (tx, rx) = mpsc::channel();
    let mut inv = Inventory::with_parts(
        ShapeLibrary::with_builtin_shapes(),
        catalog(),
        Default::default(),
        config,
    )
    .with_seed(7)
    .with_view_channel(tx);

    let stash = ContainerId::from("stash");
    inv.register_container(stash.clone(), ContainerKind::Grid { width: 8, height: 6 })?;

    // Stacking: 40 + 35 rounds of a 60-round stack leave 15 behind.
    let ammo_a = inv.spawn("ammo.9mm")?;
    let ammo_b = inv.spawn("ammo.9mm")?;
    inv.try_place(&ammo_a, &stash, Cell::new(0, 0), Orientation::North)?;
    inv.try_place(&ammo_b, &stash, Cell::new(1, 0), Orientation::North)?;
    inv.set_stack_count(&ammo_a, 40)?;
    inv.set_stack_count(&ammo_b, 35)?;
    let stacked = inv.try_stack(&ammo_b, &ammo_a)?;
    info!("stacked {} rounds, {} left over", stacked.transferred, stacked.source_remaining);

    // Rotation: a rifle standing upright.
    let rifle = inv.spawn("rifle")?;
    inv.try_place(&rifle, &stash, Cell::new(7, 0), Orientation::East)?;

    // Nesting: a backpack with a medkit inside.
    let backpack = inv.spawn("backpack")?;
    inv.try_place(&backpack, &stash, Cell::new(3, 0), Orientation::North)?;
    let pack_grid = ContainerId::nested(&backpack, 0);
    let medkit = inv.spawn("medkit")?;
    inv.try_place(&medkit, &pack_grid, Cell::new(0, 0), Orientation::North)?;

    // Quick exchange: drag the medkit out of the backpack onto two plates.
    let plate_top = inv.spawn("plate")?;
    let plate_bottom = inv.spawn("plate")?;
    inv.try_place(&plate_top, &stash, Cell::new(0, 4), Orientation::North)?;
    inv.try_place(&plate_bottom, &stash, Cell::new(0, 5), Orientation::North)?;
    match inv.drop_item(&medkit, &stash, Cell::new(0, 4), Orientation::North)? {
        PlaceOutcome::Exchanged(plan) => {
            info!("medkit swapped with {} item(s)", plan.relocations.len())
        }
        other => return Err(anyhow!("expected an exchange, got {:?}", other)),
    }

    // A backpack cannot go inside itself.
    if let Err(err) = inv.try_place(&backpack, &pack_grid, Cell::ORIGIN, Orientation::North) {
        info!("refused: {} ({})", err, err.code());
    }

    info!(
        "backpack carries {:?}, total weight {:.2}",
        inv.descendants(&backpack),
        inv.total_weight(&backpack)?
    );

    let events: Vec<_> = rx.try_iter().collect();
    info!("{} view event(s) emitted", events.len());

    println!("{}", serde_json::to_string_pretty(&inv.cache().export())?);
    Ok(())
}
