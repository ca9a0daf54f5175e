//! Rotation module - quarter-turn transforms for item shapes
//!
//! Rotating clockwise by k·90° maps an offset (x, y) to:
//!
//! | Orientation | Point | Translation |
//! |-------------|-------|-------------|
//! | North (0°) | (x, y) | (0, 0) |
//! | East (90°) | (−y, x) | (w−1, 0) |
//! | South (180°) | (−x, −y) | (w−1, h−1) |
//! | West (270°) | (y, −x) | (0, h−1) |
//!
//! where `w`, `h` are the displayed width and height *after* rotation. The
//! translation brings every coordinate back to ≥ 0, so a rotated shape lies
//! exactly inside its displayed bounding box. Cell order is preserved: the
//! i-th output cell is the image of the i-th input cell.

use arrayvec::ArrayVec;

use crate::types::{Cell, Orientation};

/// Rotate a single offset around the origin (no translation)
#[inline]
pub fn rotate_point(cell: Cell, orientation: Orientation) -> Cell {
    match orientation {
        Orientation::North => cell,
        Orientation::East => Cell::new(-cell.y, cell.x),
        Orientation::South => Cell::new(-cell.x, -cell.y),
        Orientation::West => Cell::new(cell.y, -cell.x),
    }
}

/// Displayed (width, height) of a `width` × `height` shape after rotation
#[inline]
pub fn displayed_size(width: i32, height: i32, orientation: Orientation) -> (i32, i32) {
    if orientation.is_sideways() {
        (height, width)
    } else {
        (width, height)
    }
}

/// Translation that makes rotated coordinates non-negative
///
/// `width`/`height` are the displayed dimensions after rotation.
#[inline]
pub fn rotation_offset(orientation: Orientation, width: i32, height: i32) -> Cell {
    match orientation {
        Orientation::North => Cell::ORIGIN,
        Orientation::East => Cell::new(width - 1, 0),
        Orientation::South => Cell::new(width - 1, height - 1),
        Orientation::West => Cell::new(0, height - 1),
    }
}

/// Rotate a base cell set whose bounding box is `width` × `height`
///
/// The base cells are expected to be normalized (minimum x and y are 0).
pub fn rotate_cells(base: &[Cell], width: i32, height: i32, orientation: Orientation) -> Vec<Cell> {
    let (w, h) = displayed_size(width, height, orientation);
    let offset = rotation_offset(orientation, w, h);
    base.iter()
        .map(|&c| rotate_point(c, orientation) + offset)
        .collect()
}

/// Bounding (width, height) of a cell set, (0, 0) when empty
pub fn bounding_size(cells: &[Cell]) -> (i32, i32) {
    if cells.is_empty() {
        return (0, 0);
    }
    let (min, max) = bounds(cells);
    (max.x - min.x + 1, max.y - min.y + 1)
}

/// Translate a cell set so that its minimum x and y become 0
pub fn normalize(cells: &[Cell]) -> Vec<Cell> {
    if cells.is_empty() {
        return Vec::new();
    }
    let (min, _) = bounds(cells);
    cells.iter().map(|&c| c - min).collect()
}

fn bounds(cells: &[Cell]) -> (Cell, Cell) {
    let mut min = Cell::new(i32::MAX, i32::MAX);
    let mut max = Cell::new(i32::MIN, i32::MIN);
    for c in cells {
        min.x = min.x.min(c.x);
        min.y = min.y.min(c.y);
        max.x = max.x.max(c.x);
        max.y = max.y.max(c.y);
    }
    (min, max)
}

/// Orientations to try when searching for a fit, starting from `current`
/// and proceeding clockwise
pub fn search_order(current: Orientation) -> ArrayVec<Orientation, 4> {
    let mut order = ArrayVec::new();
    let mut o = current;
    for _ in 0..4 {
        order.push(o);
        o = o.rotate_cw();
    }
    order
}
