//! Shapes module - item shape definitions and the shape library
//!
//! A shape is an immutable set of cell offsets relative to an anchor. All four
//! orientations are computed once when the shape is built, so looking up the
//! rotated cells of a (shape, orientation) pair is a slice borrow.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::PlaceError;
use crate::rotation::{bounding_size, displayed_size, normalize, rotate_cells};
use crate::types::{Cell, Orientation, ShapeId};

/// Immutable item shape, shared across item instances
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    id: ShapeId,
    width: i32,
    height: i32,
    /// Cells per orientation, indexed by quarter turns
    rotations: [Vec<Cell>; 4],
}

impl Shape {
    /// Build a shape from base offsets
    ///
    /// Offsets are translated so that the minimum x and y become 0. Empty
    /// shapes and duplicated offsets are rejected.
    pub fn new(id: impl Into<ShapeId>, cells: &[Cell]) -> Result<Self, PlaceError> {
        let id = id.into();
        if cells.is_empty() {
            return Err(PlaceError::InvalidShape {
                id,
                reason: "shape has no cells",
            });
        }
        let unique: HashSet<Cell> = cells.iter().copied().collect();
        if unique.len() != cells.len() {
            return Err(PlaceError::InvalidShape {
                id,
                reason: "shape repeats a cell",
            });
        }

        let base = normalize(cells);
        let (width, height) = bounding_size(&base);
        let rotations = Orientation::ALL.map(|o| rotate_cells(&base, width, height, o));

        Ok(Self {
            id,
            width,
            height,
            rotations,
        })
    }

    /// Solid `width` × `height` rectangle, cells in row order
    pub fn rect(id: impl Into<ShapeId>, width: i32, height: i32) -> Result<Self, PlaceError> {
        let cells: Vec<Cell> = (0..height.max(0))
            .flat_map(|y| (0..width.max(0)).map(move |x| Cell::new(x, y)))
            .collect();
        Self::new(id, &cells)
    }

    pub fn id(&self) -> &ShapeId {
        &self.id
    }

    /// Base (unrotated) cells
    pub fn base_cells(&self) -> &[Cell] {
        &self.rotations[0]
    }

    /// Cells for an orientation, relative to the anchor
    pub fn cells(&self, orientation: Orientation) -> &[Cell] {
        &self.rotations[orientation.quarter_turns() as usize]
    }

    /// Number of cells covered by the shape
    pub fn cell_count(&self) -> usize {
        self.rotations[0].len()
    }

    /// Base bounding box width
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Base bounding box height
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Displayed (width, height) for an orientation
    pub fn size(&self, orientation: Orientation) -> (i32, i32) {
        displayed_size(self.width, self.height, orientation)
    }

    /// Absolute cells covered when anchored at `anchor`, in shape order
    ///
    /// For anchors that already passed placement; use
    /// [`Shape::try_footprint`] for caller-supplied ones.
    pub fn footprint(&self, orientation: Orientation, anchor: Cell) -> Vec<Cell> {
        self.cells(orientation).iter().map(|&c| c + anchor).collect()
    }

    /// Like [`Shape::footprint`], reporting `OutOfBounds` at the anchor when a
    /// cell falls outside the coordinate range
    pub fn try_footprint(&self, orientation: Orientation, anchor: Cell) -> Result<Vec<Cell>, PlaceError> {
        self.cells(orientation)
            .iter()
            .map(|&c| {
                c.checked_add(anchor)
                    .ok_or(PlaceError::OutOfBounds { cell: anchor })
            })
            .collect()
    }

    /// First cell of an orientation in row order (y, then x)
    pub fn first_cell(&self, orientation: Orientation) -> Cell {
        self.cells(orientation)
            .iter()
            .copied()
            .min()
            .unwrap_or(Cell::ORIGIN)
    }
}

/// Built-in shapes: (id, base offsets)
const BUILTIN_SHAPES: &[(&str, &[(i32, i32)])] = &[
    ("1x1", &[(0, 0)]),
    ("1x2", &[(0, 0), (0, 1)]),
    ("2x1", &[(0, 0), (1, 0)]),
    ("1x3", &[(0, 0), (0, 1), (0, 2)]),
    ("3x1", &[(0, 0), (1, 0), (2, 0)]),
    ("2x2", &[(0, 0), (1, 0), (0, 1), (1, 1)]),
    ("2x3", &[(0, 0), (1, 0), (0, 1), (1, 1), (0, 2), (1, 2)]),
    ("3x2", &[(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]),
    // X.
    // XX
    ("corner", &[(0, 0), (0, 1), (1, 1)]),
    // X.
    // X.
    // XX
    ("l", &[(0, 0), (0, 1), (0, 2), (1, 2)]),
    // XXX
    // .X.
    ("t", &[(0, 0), (1, 0), (2, 0), (1, 1)]),
];

/// Read-only lookup of shape id → shape
#[derive(Debug, Clone, Default)]
pub struct ShapeLibrary {
    shapes: HashMap<ShapeId, Arc<Shape>>,
}

impl ShapeLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Library pre-populated with the built-in rectangles and small polyominoes
    pub fn with_builtin_shapes() -> Self {
        let mut lib = Self::new();
        for (id, offsets) in BUILTIN_SHAPES {
            let cells: Vec<Cell> = offsets.iter().map(|&p| Cell::from(p)).collect();
            if let Ok(shape) = Shape::new(*id, &cells) {
                lib.insert(shape);
            }
        }
        lib
    }

    /// Register a shape, replacing any shape with the same id
    pub fn insert(&mut self, shape: Shape) -> Arc<Shape> {
        let shape = Arc::new(shape);
        self.shapes.insert(shape.id().clone(), Arc::clone(&shape));
        shape
    }

    pub fn get(&self, id: &ShapeId) -> Result<&Arc<Shape>, PlaceError> {
        self.shapes
            .get(id)
            .ok_or_else(|| PlaceError::UnknownShape(id.clone()))
    }

    pub fn contains(&self, id: &ShapeId) -> bool {
        self.shapes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}
