//! Occupancy module - per-container map of cell → occupying item
//!
//! The grid is a flat row-major vector (`y * width + x`) of optional item ids.
//! Coordinates: x ranges `0..width` (left to right), y ranges `0..height`
//! (top to bottom).
//!
//! Writes are not validated here: callers run the placement checks first and
//! then commit with [`GridOccupancy::place`]. Reads that can fail report the
//! first out-of-range cell.

use crate::types::{Cell, ItemId, MAX_GRID_CELLS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridOccupancy {
    width: i32,
    height: i32,
    /// Flat array of cells, row-major order (y * width + x)
    cells: Vec<Option<ItemId>>,
}

impl GridOccupancy {
    /// Create an empty `width` × `height` grid
    ///
    /// Negative sizes clamp to 0. Dimensions rejected by
    /// [`GridOccupancy::checked_area`] yield an empty 0 × 0 grid; callers
    /// validate first.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        match Self::checked_area(width, height) {
            Some(area) => Self {
                width,
                height,
                cells: vec![None; area],
            },
            None => Self {
                width: 0,
                height: 0,
                cells: Vec::new(),
            },
        }
    }

    /// Cell count of a `width` × `height` grid
    ///
    /// None for negative dimensions or more than [`MAX_GRID_CELLS`] cells.
    pub fn checked_area(width: i32, height: i32) -> Option<usize> {
        let width = usize::try_from(width).ok()?;
        let height = usize::try_from(height).ok()?;
        width
            .checked_mul(height)
            .filter(|&area| area <= MAX_GRID_CELLS)
    }

    /// Calculate flat index from a cell
    #[inline(always)]
    fn index(&self, cell: Cell) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }
        Some((cell.y as usize) * (self.width as usize) + (cell.x as usize))
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of cells in the grid
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    /// Check if a cell lies in `[0, width) × [0, height)`
    #[inline]
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }

    /// Occupant of a cell; None if out of bounds
    pub fn get(&self, cell: Cell) -> Option<Option<&ItemId>> {
        self.index(cell).map(|idx| self.cells[idx].as_ref())
    }

    /// Check if a cell is within bounds and empty
    pub fn is_free(&self, cell: Cell) -> bool {
        matches!(self.get(cell), Some(None))
    }

    /// Check if a cell is within bounds and held by `item`
    pub fn is_held_by(&self, cell: Cell, item: &ItemId) -> bool {
        matches!(self.get(cell), Some(Some(id)) if id == item)
    }

    /// Write `item` into every in-bounds cell of `footprint`
    ///
    /// Returns the number of cells written.
    pub fn place(&mut self, item: &ItemId, footprint: &[Cell]) -> usize {
        let mut written = 0;
        for &cell in footprint {
            if let Some(idx) = self.index(cell) {
                self.cells[idx] = Some(item.clone());
                written += 1;
            }
        }
        written
    }

    /// Clear the cells of `footprint` that are held by `item`
    ///
    /// Cells held by other items are left untouched.
    pub fn remove(&mut self, item: &ItemId, footprint: &[Cell]) -> usize {
        let mut cleared = 0;
        for &cell in footprint {
            if let Some(idx) = self.index(cell) {
                if self.cells[idx].as_ref() == Some(item) {
                    self.cells[idx] = None;
                    cleared += 1;
                }
            }
        }
        cleared
    }

    /// Clear every cell held by `item`, wherever it is
    pub fn remove_everywhere(&mut self, item: &ItemId) -> usize {
        let mut cleared = 0;
        for cell in &mut self.cells {
            if cell.as_ref() == Some(item) {
                *cell = None;
                cleared += 1;
            }
        }
        cleared
    }

    /// Distinct items intersecting `footprint`, in order of first contact
    ///
    /// `ignore` (usually the item being moved) is never reported. Returns
    /// `Err(cell)` with the first cell outside the grid.
    pub fn query_overlap(
        &self,
        footprint: &[Cell],
        ignore: Option<&ItemId>,
    ) -> Result<Vec<ItemId>, Cell> {
        let mut hits: Vec<ItemId> = Vec::new();
        for &cell in footprint {
            let occupant = self.get(cell).ok_or(cell)?;
            if let Some(id) = occupant {
                if Some(id) != ignore && !hits.contains(id) {
                    hits.push(id.clone());
                }
            }
        }
        Ok(hits)
    }

    /// Recompute the whole map from an authoritative item list
    ///
    /// Items are written in the given order. An item with any cell out of
    /// bounds or already taken is skipped entirely and returned.
    pub fn rebuild<'a, I>(&mut self, items: I) -> Vec<ItemId>
    where
        I: IntoIterator<Item = (&'a ItemId, Vec<Cell>)>,
    {
        self.clear();
        let mut rejected = Vec::new();
        for (item, footprint) in items {
            if footprint.iter().all(|&c| self.is_free(c)) {
                self.place(item, &footprint);
            } else {
                rejected.push(item.clone());
            }
        }
        rejected
    }

    /// Change dimensions, dropping all occupancy
    ///
    /// Callers follow up with [`GridOccupancy::rebuild`].
    pub fn resize(&mut self, width: i32, height: i32) {
        *self = Self::new(width, height);
    }

    /// Cells held by `item`, in row order
    pub fn cells_of(&self, item: &ItemId) -> Vec<Cell> {
        self.occupied()
            .filter(|(_, id)| *id == item)
            .map(|(cell, _)| cell)
            .collect()
    }

    /// All occupied cells with their occupant, in row order
    pub fn occupied(&self) -> impl Iterator<Item = (Cell, &ItemId)> + '_ {
        let width = self.width.max(1);
        self.cells.iter().enumerate().filter_map(move |(idx, cell)| {
            cell.as_ref().map(|id| {
                let idx = idx as i32;
                (Cell::new(idx % width, idx / width), id)
            })
        })
    }

    /// Number of empty cells
    pub fn free_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    /// Clear the entire grid
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = None;
        }
    }
}
