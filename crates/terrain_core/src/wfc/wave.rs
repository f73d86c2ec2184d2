//! Per-cell possibility state for one solver run.
//!
//! Cells are stored flat, `index = x + size_x * (y + size_y * z)`. Each cell
//! keeps a bitset of the variants still possible there plus the variant it
//! has been collapsed to, if any.

use crate::direction::Direction;
use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

/// Grid dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl GridSize {
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.x * self.y * self.z
    }

    /// True when every dimension is at least one.
    pub fn is_valid(&self) -> bool {
        self.x > 0 && self.y > 0 && self.z > 0
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.x * (y + self.y * z)
    }

    #[inline]
    pub fn coords(&self, index: usize) -> (usize, usize, usize) {
        let x = index % self.x;
        let y = (index / self.x) % self.y;
        let z = index / (self.x * self.y);
        (x, y, z)
    }

    /// Flat index of the neighbor of `index` in `dir`, if it is inside the grid.
    pub fn neighbor(&self, index: usize, dir: Direction) -> Option<usize> {
        let (x, y, z) = self.coords(index);
        let offset = dir.offset();
        let nx = x as i64 + offset.x as i64;
        let ny = y as i64 + offset.y as i64;
        let nz = z as i64 + offset.z as i64;
        if nx < 0
            || ny < 0
            || nz < 0
            || nx >= self.x as i64
            || ny >= self.y as i64
            || nz >= self.z as i64
        {
            return None;
        }
        Some(self.index(nx as usize, ny as usize, nz as usize))
    }
}

/// Observable state of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    /// More than one option left (or the only option has not been chosen yet).
    Unresolved,
    Collapsed(usize),
    /// No option left.
    Contradiction,
}

/// Possibility sets and collapse markers for every cell of a grid.
#[derive(Debug, Clone)]
pub struct Wave {
    size: GridSize,
    variant_count: usize,
    possibilities: Vec<BitVec>,
    collapsed: Vec<Option<usize>>,
}

impl Wave {
    /// A wave where every variant is possible in every cell.
    pub fn new(size: GridSize, variant_count: usize) -> Self {
        let cells = size.cell_count();
        Self {
            size,
            variant_count,
            possibilities: vec![BitVec::repeat(true, variant_count); cells],
            collapsed: vec![None; cells],
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn variant_count(&self) -> usize {
        self.variant_count
    }

    pub fn len(&self) -> usize {
        self.possibilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.possibilities.is_empty()
    }

    #[inline]
    pub fn possibilities(&self, cell: usize) -> &BitSlice {
        self.possibilities[cell].as_bitslice()
    }

    #[inline]
    pub fn remaining(&self, cell: usize) -> usize {
        self.possibilities[cell].count_ones()
    }

    #[inline]
    pub fn collapsed(&self, cell: usize) -> Option<usize> {
        self.collapsed[cell]
    }

    pub fn cell_state(&self, cell: usize) -> CellState {
        match self.collapsed[cell] {
            Some(v) => CellState::Collapsed(v),
            None if self.possibilities[cell].not_any() => CellState::Contradiction,
            None => CellState::Unresolved,
        }
    }

    /// Fix `cell` to `variant`: possibilities become `{variant}`.
    pub fn collapse(&mut self, cell: usize, variant: usize) {
        let bits = &mut self.possibilities[cell];
        bits.fill(false);
        bits.set(variant, true);
        self.collapsed[cell] = Some(variant);
    }

    /// Replace the possibility set of an unresolved cell. A single remaining
    /// option marks the cell collapsed.
    pub(crate) fn restrict(&mut self, cell: usize, bits: BitVec) {
        let only = if bits.count_ones() == 1 {
            bits.first_one()
        } else {
            None
        };
        self.possibilities[cell] = bits;
        if only.is_some() {
            self.collapsed[cell] = only;
        }
    }

    /// Mark an unresolved cell as having no options left.
    pub(crate) fn clear(&mut self, cell: usize) {
        if self.collapsed[cell].is_none() {
            self.possibilities[cell].fill(false);
        }
    }

    /// Flat indices of all collapsed cells, ascending.
    pub fn collapsed_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.collapsed
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.map(|_| i))
    }

    pub fn collapsed_count(&self) -> usize {
        self.collapsed.iter().filter(|c| c.is_some()).count()
    }

    /// Check the collapse marker agrees with the possibility set in every cell.
    ///
    /// An unresolved cell may hold a single option only when the tileset has
    /// exactly one variant; that cell has simply not been picked yet.
    pub fn is_consistent(&self) -> bool {
        self.possibilities
            .iter()
            .zip(&self.collapsed)
            .all(|(bits, collapsed)| match collapsed {
                Some(v) => bits.count_ones() == 1 && bits[*v],
                None => bits.count_ones() != 1 || self.variant_count == 1,
            })
    }
}
