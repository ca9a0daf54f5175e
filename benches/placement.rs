use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gridstash::core::{ContainerKind, GridOccupancy, ItemCatalog, ItemDef, ShapeLibrary};
use gridstash::engine::{Inventory, QuickExchangeEngine};
use gridstash::types::{Cell, ContainerId, ItemId, Orientation, ShapeId};

fn inventory() -> Inventory {
    let mut catalog = ItemCatalog::new();
    catalog.insert(ItemDef::new("coin", "1x1"));
    catalog.insert(ItemDef::new("crate", "3x2"));
    let mut inv = Inventory::new(ShapeLibrary::with_builtin_shapes(), catalog);
    inv.register_container("a", ContainerKind::Grid { width: 10, height: 10 }).unwrap();
    inv.register_container("b", ContainerKind::Grid { width: 10, height: 10 }).unwrap();
    inv
}

fn bench_can_place(c: &mut Criterion) {
    let mut inv = inventory();
    let a = ContainerId::from("a");
    let crate_id = inv.spawn("crate").unwrap();

    c.bench_function("can_place_3x2", |b| {
        b.iter(|| {
            let _ = inv.can_place(&crate_id, &a, black_box(Cell::new(4, 4)), Orientation::East);
        })
    });
}

fn bench_query_overlap(c: &mut Criterion) {
    let shapes = ShapeLibrary::with_builtin_shapes();
    let l = shapes.get(&ShapeId::from("l")).unwrap();
    let mut grid = GridOccupancy::new(10, 10);
    for i in 0..5 {
        let id = ItemId::new(format!("item-{}", i));
        grid.place(&id, &l.footprint(Orientation::North, Cell::new(i * 2, 0)));
    }
    let query = l.footprint(Orientation::South, Cell::new(1, 1));

    c.bench_function("query_overlap_l", |b| {
        b.iter(|| {
            let _ = grid.query_overlap(black_box(&query), None);
        })
    });
}

fn bench_place_remove(c: &mut Criterion) {
    let mut inv = inventory();
    let a = ContainerId::from("a");
    let coin = inv.spawn("coin").unwrap();

    c.bench_function("place_and_remove", |b| {
        b.iter(|| {
            let _ = inv.try_place(&coin, &a, black_box(Cell::new(5, 5)), Orientation::North);
            let _ = inv.remove(&coin);
        })
    });
}

fn bench_exchange_plan(c: &mut Criterion) {
    let mut inv = inventory();
    let a = ContainerId::from("a");
    let b_id = ContainerId::from("b");
    let crate_id = inv.spawn("crate").unwrap();
    let _ = inv.try_place(&crate_id, &b_id, Cell::new(0, 0), Orientation::North);
    for y in 0..2 {
        for x in 0..3 {
            let coin = inv.spawn("coin").unwrap();
            let _ = inv.try_place(&coin, &a, Cell::new(x, y), Orientation::North);
        }
    }

    c.bench_function("exchange_plan_6_items", |b| {
        b.iter(|| {
            let engine = QuickExchangeEngine::new(inv.validator());
            let _ = engine.plan(&crate_id, &a, black_box(Cell::ORIGIN), Orientation::North);
        })
    });
}

criterion_group!(
    benches,
    bench_can_place,
    bench_query_overlap,
    bench_place_remove,
    bench_exchange_plan
);
criterion_main!(benches);
