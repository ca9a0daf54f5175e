//! Quick exchange planning.
//!
//! Dropping an item onto a spot that fully covers one or more other items
//! swaps them: the dragged item takes the spot, the covered items move into
//! the cells the dragged item vacates in its origin container.
//!
//! Planning never mutates anything. It works on a scratch set of available
//! vacated cells and returns an [`ExchangePlan`] only when every covered item
//! has a home; otherwise it fails and the inventory is untouched. The commit
//! lives in `Inventory::try_quick_exchange`.
//!
//! Each covered item is relocated by the first strategy that works:
//!
//! 1. **Mapped**: carry its cells over through the index correspondence between
//!    the dragged item's target cells and origin cells
//! 2. **Pattern match**: try each orientation, anchoring the shape's first
//!    cell (row order) on each available cell in row order
//! 3. **Bin pack**: largest items first, scan orientation × position over the
//!    vacated bounding box; if the leftovers do not fit, repack every covered
//!    item from scratch the same way

use std::collections::{BTreeSet, HashMap, HashSet};

use arrayvec::ArrayVec;
use log::trace;

use crate::core::rotation::search_order;
use crate::core::{Container, ExchangeBlocker, GridContainer, ItemHolder, ItemInstance, PlaceError};
use crate::types::{Cell, ContainerId, ItemId, Orientation};
use crate::validator::PlacementValidator;

/// How a covered item found its new place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocationMethod {
    Mapped,
    PatternMatched,
    BinPacked,
    Slot,
}

/// New home of one covered item in the origin container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub item: ItemId,
    pub anchor: Cell,
    pub orientation: Orientation,
    pub method: RelocationMethod,
}

/// A fully validated exchange, ready to commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangePlan {
    pub dragged: ItemId,
    pub origin: ContainerId,
    pub target: ContainerId,
    pub anchor: Cell,
    pub orientation: Orientation,
    /// One entry per covered item, in order of first contact with the target footprint
    pub relocations: Vec<Relocation>,
}

impl ExchangePlan {
    pub fn crosses_containers(&self) -> bool {
        self.origin != self.target
    }
}

pub struct QuickExchangeEngine<'a> {
    validator: PlacementValidator<'a>,
}

impl<'a> QuickExchangeEngine<'a> {
    pub fn new(validator: PlacementValidator<'a>) -> Self {
        Self { validator }
    }

    /// Plan dropping `dragged` into `target` at `anchor` / `orientation`
    pub fn plan(
        &self,
        dragged: &ItemId,
        target: &ContainerId,
        anchor: Cell,
        orientation: Orientation,
    ) -> Result<ExchangePlan, PlaceError> {
        let v = &self.validator;
        let item = v.item(dragged)?;
        let origin_id = item
            .container
            .as_ref()
            .ok_or_else(|| PlaceError::exchange(ExchangeBlocker::NotPlaced))?;
        let origin = v.container(origin_id)?;
        let target_container = v.container(target)?;

        let target_cells = item.footprint_at(anchor, orientation)?;
        let covered_ids = target_container.overlaps(dragged, &target_cells)?;
        v.check_containment(dragged, target)?;
        if covered_ids.is_empty() {
            return Err(PlaceError::exchange(ExchangeBlocker::NothingCovered));
        }

        let target_set: HashSet<Cell> = target_cells.iter().copied().collect();
        let mut covered: Vec<&ItemInstance> = Vec::with_capacity(covered_ids.len());
        for id in &covered_ids {
            let other = v.item(id)?;
            let fully_covered = target_container.is_slot()
                || other.footprint().iter().all(|c| target_set.contains(c));
            if !fully_covered {
                trace!("exchange: {} only partially covered", id);
                return Err(PlaceError::exchange(ExchangeBlocker::PartialOverlap));
            }
            v.check_containment(id, origin_id)?;
            covered.push(other);
        }

        let relocations = match origin {
            Container::Slot(_) => relocate_into_slot(&covered)?,
            Container::Grid(grid) => {
                let same_container = origin_id == target;
                let vacated = vacated_area(item, grid, same_container, &target_set);
                self.relocate_into_grid(
                    item,
                    &target_cells,
                    target_container.is_slot(),
                    &covered,
                    &vacated,
                )?
            }
        };

        Ok(ExchangePlan {
            dragged: dragged.clone(),
            origin: origin_id.clone(),
            target: target.clone(),
            anchor,
            orientation,
            relocations,
        })
    }

    fn relocate_into_grid(
        &self,
        dragged: &ItemInstance,
        target_cells: &[Cell],
        target_is_slot: bool,
        covered: &[&ItemInstance],
        vacated: &BTreeSet<Cell>,
    ) -> Result<Vec<Relocation>, PlaceError> {
        let origin_cells = dragged.footprint();
        let index_of: HashMap<Cell, usize> = target_cells
            .iter()
            .enumerate()
            .map(|(i, &c)| (c, i))
            .collect();

        let mut available = vacated.clone();
        let mut placed: Vec<Option<Relocation>> = vec![None; covered.len()];

        for (i, item) in covered.iter().enumerate() {
            let mapped = if target_is_slot {
                None
            } else {
                mapped_placement(item, &index_of, &origin_cells, &available)
            };
            if let Some(found) = mapped.or_else(|| self.pattern_match(item, &available)) {
                claim(&mut available, item, &found);
                placed[i] = Some(found);
            }
        }

        if placed.iter().all(Option::is_some) {
            return Ok(placed.into_iter().flatten().collect());
        }
        if !self.validator.config().exchange_bin_pack {
            return Err(PlaceError::exchange(ExchangeBlocker::NoRoom));
        }

        let leftovers: Vec<usize> = (0..covered.len()).filter(|&i| placed[i].is_none()).collect();
        trace!("exchange: bin-packing {} leftover item(s)", leftovers.len());
        if self.bin_pack(covered, &leftovers, &mut available, &mut placed) {
            return Ok(placed.into_iter().flatten().collect());
        }

        trace!("exchange: repacking all {} item(s)", covered.len());
        let mut available = vacated.clone();
        let mut placed: Vec<Option<Relocation>> = vec![None; covered.len()];
        let everything: Vec<usize> = (0..covered.len()).collect();
        if self.bin_pack(covered, &everything, &mut available, &mut placed) {
            return Ok(placed.into_iter().flatten().collect());
        }

        Err(PlaceError::exchange(ExchangeBlocker::NoRoom))
    }

    /// Orientation search: anchor the first cell of the rotated shape on each
    /// available cell in row order
    fn pattern_match(&self, item: &ItemInstance, available: &BTreeSet<Cell>) -> Option<Relocation> {
        for orientation in self.orientations(item.orientation) {
            let first = item.shape.first_cell(orientation);
            for &cell in available {
                let anchor = cell - first;
                if fits(item, orientation, anchor, available) {
                    return Some(Relocation {
                        item: item.id.clone(),
                        anchor,
                        orientation,
                        method: RelocationMethod::PatternMatched,
                    });
                }
            }
        }
        None
    }

    /// Largest-first scan over orientation × position; false if any item
    /// stays homeless
    fn bin_pack(
        &self,
        covered: &[&ItemInstance],
        indices: &[usize],
        available: &mut BTreeSet<Cell>,
        placed: &mut [Option<Relocation>],
    ) -> bool {
        let mut order = indices.to_vec();
        order.sort_by(|&a, &b| covered[b].shape.cell_count().cmp(&covered[a].shape.cell_count()));

        let Some((min, max)) = cell_bounds(available) else {
            return order.is_empty();
        };

        'items: for i in order {
            let item = covered[i];
            for orientation in self.orientations(item.orientation) {
                for y in min.y..=max.y {
                    for x in min.x..=max.x {
                        let anchor = Cell::new(x, y);
                        if fits(item, orientation, anchor, available) {
                            let found = Relocation {
                                item: item.id.clone(),
                                anchor,
                                orientation,
                                method: RelocationMethod::BinPacked,
                            };
                            claim(available, item, &found);
                            placed[i] = Some(found);
                            continue 'items;
                        }
                    }
                }
            }
            return false;
        }
        true
    }

    fn orientations(&self, current: Orientation) -> ArrayVec<Orientation, 4> {
        if self.validator.config().exchange_rotations {
            search_order(current)
        } else {
            let mut only = ArrayVec::new();
            only.push(current);
            only
        }
    }
}

/// Cells the dragged item frees in a grid origin
///
/// In a same-container exchange the cells the dragged item is about to take
/// are excluded.
fn vacated_area(
    dragged: &ItemInstance,
    origin: &GridContainer,
    same_container: bool,
    target_set: &HashSet<Cell>,
) -> BTreeSet<Cell> {
    dragged
        .footprint()
        .into_iter()
        .filter(|c| !(same_container && target_set.contains(c)))
        .filter(|&c| origin.occupancy.is_held_by(c, &dragged.id))
        .collect()
}

/// Exactly one covered item can take the place of a dragged item in a slot
fn relocate_into_slot(covered: &[&ItemInstance]) -> Result<Vec<Relocation>, PlaceError> {
    match covered {
        [single] => Ok(vec![Relocation {
            item: single.id.clone(),
            anchor: Cell::ORIGIN,
            orientation: single.orientation,
            method: RelocationMethod::Slot,
        }]),
        _ => Err(PlaceError::exchange(ExchangeBlocker::NoRoom)),
    }
}

/// Carry a covered item's cells from the target footprint back to the origin
/// footprint by index, then find the orientation reproducing that cell set
fn mapped_placement(
    item: &ItemInstance,
    index_of: &HashMap<Cell, usize>,
    origin_cells: &[Cell],
    available: &BTreeSet<Cell>,
) -> Option<Relocation> {
    let mut mapped: BTreeSet<Cell> = BTreeSet::new();
    for cell in item.footprint() {
        let i = *index_of.get(&cell)?;
        mapped.insert(*origin_cells.get(i)?);
    }
    if !mapped.iter().all(|c| available.contains(c)) {
        return None;
    }

    let (anchor, _) = cell_bounds(&mapped)?;
    for orientation in search_order(item.orientation) {
        let candidate: BTreeSet<Cell> = item.shape.footprint(orientation, anchor).into_iter().collect();
        if candidate == mapped {
            return Some(Relocation {
                item: item.id.clone(),
                anchor,
                orientation,
                method: RelocationMethod::Mapped,
            });
        }
    }
    None
}

fn fits(item: &ItemInstance, orientation: Orientation, anchor: Cell, available: &BTreeSet<Cell>) -> bool {
    item.shape
        .cells(orientation)
        .iter()
        .all(|&c| available.contains(&(c + anchor)))
}

fn claim(available: &mut BTreeSet<Cell>, item: &ItemInstance, relocation: &Relocation) {
    for cell in item.shape.footprint(relocation.orientation, relocation.anchor) {
        available.remove(&cell);
    }
}

/// (min, max) corners of a cell set
fn cell_bounds(cells: &BTreeSet<Cell>) -> Option<(Cell, Cell)> {
    let mut iter = cells.iter();
    let first = *iter.next()?;
    let (mut min, mut max) = (first, first);
    for c in iter {
        min.x = min.x.min(c.x);
        min.y = min.y.min(c.y);
        max.x = max.x.max(c.x);
        max.y = max.y.max(c.y);
    }
    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ContainerKind, ItemCatalog, ItemDef, ShapeLibrary};
    use crate::Inventory;

    fn inventory() -> Inventory {
        let mut catalog = ItemCatalog::new();
        catalog.insert(ItemDef::new("pebble", "1x1"));
        catalog.insert(ItemDef::new("plank", "2x1"));
        catalog.insert(ItemDef::new("crate", "2x2"));
        let mut inv = Inventory::new(ShapeLibrary::with_builtin_shapes(), catalog);
        inv.register_container("a", ContainerKind::Grid { width: 4, height: 4 }).unwrap();
        inv.register_container("b", ContainerKind::Grid { width: 4, height: 4 }).unwrap();
        inv
    }

    fn put(inv: &mut Inventory, type_id: &str, container: &str, x: i32, y: i32) -> ItemId {
        let id = inv.spawn(type_id).unwrap();
        inv.try_place(&id, &ContainerId::from(container), Cell::new(x, y), Orientation::North)
            .unwrap();
        id
    }

    #[test]
    fn two_planks_map_back_under_a_crate() {
        let mut inv = inventory();
        let crate_id = put(&mut inv, "crate", "b", 1, 1);
        let top = put(&mut inv, "plank", "a", 0, 0);
        let bottom = put(&mut inv, "plank", "a", 0, 1);

        let plan = QuickExchangeEngine::new(inv.validator())
            .plan(&crate_id, &ContainerId::from("a"), Cell::new(0, 0), Orientation::North)
            .unwrap();

        assert_eq!(plan.relocations.len(), 2);
        assert_eq!(plan.relocations[0].item, top);
        assert_eq!(plan.relocations[0].anchor, Cell::new(1, 1));
        assert_eq!(plan.relocations[0].method, RelocationMethod::Mapped);
        assert_eq!(plan.relocations[1].item, bottom);
        assert_eq!(plan.relocations[1].anchor, Cell::new(1, 2));
    }

    #[test]
    fn rotated_drop_rotates_mapped_items() {
        let mut inv = inventory();
        // Vertical plank in b, dragged sideways onto two pebbles in a.
        let plank = inv.spawn("plank").unwrap();
        inv.try_place(&plank, &ContainerId::from("b"), Cell::new(0, 0), Orientation::East)
            .unwrap();
        put(&mut inv, "pebble", "a", 2, 3);
        put(&mut inv, "pebble", "a", 3, 3);

        let plan = QuickExchangeEngine::new(inv.validator())
            .plan(&plank, &ContainerId::from("a"), Cell::new(2, 3), Orientation::North)
            .unwrap();

        let anchors: Vec<Cell> = plan.relocations.iter().map(|r| r.anchor).collect();
        assert_eq!(anchors, vec![Cell::new(0, 0), Cell::new(0, 1)]);
        assert!(plan
            .relocations
            .iter()
            .all(|r| r.method == RelocationMethod::Mapped));
    }

    #[test]
    fn partial_cover_is_refused() {
        let mut inv = inventory();
        let crate_id = put(&mut inv, "crate", "b", 0, 0);
        put(&mut inv, "plank", "a", 1, 0);

        let err = QuickExchangeEngine::new(inv.validator())
            .plan(&crate_id, &ContainerId::from("a"), Cell::new(0, 0), Orientation::North)
            .unwrap_err();
        assert_eq!(err, PlaceError::exchange(ExchangeBlocker::PartialOverlap));
    }

    #[test]
    fn unplaced_item_cannot_exchange() {
        let mut inv = inventory();
        let loose = inv.spawn("pebble").unwrap();
        put(&mut inv, "pebble", "a", 0, 0);

        let err = QuickExchangeEngine::new(inv.validator())
            .plan(&loose, &ContainerId::from("a"), Cell::new(0, 0), Orientation::North)
            .unwrap_err();
        assert_eq!(err, PlaceError::exchange(ExchangeBlocker::NotPlaced));
    }

    #[test]
    fn repack_places_largest_item_first() {
        let inv = inventory();
        let shapes = ShapeLibrary::with_builtin_shapes();
        let instance = |id: &str, shape: &str| {
            let def = ItemDef::new(shape, shape);
            let shape = shapes.get(&def.shape).unwrap().clone();
            ItemInstance::new(ItemId::from(id), &def, shape)
        };
        let dragged = instance("dragged", "t");
        let pebble = instance("pebble", "1x1");
        let rod = instance("rod", "3x1");

        // XXX
        // .X.
        let vacated: BTreeSet<Cell> = [(0, 0), (1, 0), (2, 0), (1, 1)]
            .into_iter()
            .map(Cell::from)
            .collect();

        // Greedy placement puts the pebble at (0,0) and strands the rod.
        let engine = QuickExchangeEngine::new(inv.validator());
        let relocations = engine
            .relocate_into_grid(&dragged, &[], true, &[&pebble, &rod], &vacated)
            .unwrap();

        assert_eq!(relocations[0].item, pebble.id);
        assert_eq!(relocations[0].anchor, Cell::new(1, 1));
        assert_eq!(relocations[1].item, rod.id);
        assert_eq!(relocations[1].anchor, Cell::new(0, 0));
        assert_eq!(relocations[1].orientation, Orientation::North);
        assert!(relocations
            .iter()
            .all(|r| r.method == RelocationMethod::BinPacked));
    }

    #[test]
    fn cell_bounds_of_scattered_cells() {
        let cells: BTreeSet<Cell> = [Cell::new(3, 0), Cell::new(1, 2), Cell::new(2, 1)]
            .into_iter()
            .collect();
        assert_eq!(cell_bounds(&cells), Some((Cell::new(1, 0), Cell::new(3, 2))));
        assert_eq!(cell_bounds(&BTreeSet::new()), None);
    }
}
