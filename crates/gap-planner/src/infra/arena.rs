//! Growable Dense Tables
//!
//! Backing storage for the per-state tables. Both table kinds grow
//! geometrically and follow grow-then-commit: the replacement buffer is
//! fully reserved and populated before it is swapped in, so a failed
//! allocation leaves the old table untouched.

use gap_common::{GapError, Result};

/// Square table indexed by `(row, col)` where both are state ids
///
/// Every cell holds `depth` consecutive values (e.g. one counter per
/// action). Rows and columns share a single capacity.
#[derive(Debug, Clone)]
pub struct SquareTable<T> {
    cells: Vec<T>,
    capacity: usize,
    depth: usize,
    fill: T,
}

impl<T: Copy> SquareTable<T> {
    /// Create a table holding `capacity × capacity` cells of `depth` values
    pub fn new(capacity: usize, depth: usize, fill: T) -> Result<Self> {
        let len = cell_count(capacity, depth)?;
        let mut cells = Vec::new();
        cells.try_reserve_exact(len)?;
        cells.resize(len, fill);

        Ok(Self {
            cells,
            capacity,
            depth,
            fill,
        })
    }

    /// Number of rows (and columns) currently allocated
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.capacity && col < self.capacity);
        (row * self.capacity + col) * self.depth
    }

    /// All `depth` values stored at `(row, col)`
    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> &[T] {
        let start = self.offset(row, col);
        &self.cells[start..start + self.depth]
    }

    #[inline]
    pub fn cell_mut(&mut self, row: usize, col: usize) -> &mut [T] {
        let start = self.offset(row, col);
        let depth = self.depth;
        &mut self.cells[start..start + depth]
    }

    /// First value at `(row, col)`, for tables of depth one
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> &T {
        &self.cells[self.offset(row, col)]
    }

    #[inline]
    pub fn get_mut(&mut self, row: usize, col: usize) -> &mut T {
        let offset = self.offset(row, col);
        &mut self.cells[offset]
    }

    /// Make room for at least `rows` states
    ///
    /// Returns `true` when the table was reallocated.
    pub fn ensure(&mut self, rows: usize) -> Result<bool> {
        if rows <= self.capacity {
            return Ok(false);
        }

        let capacity = rows.max(self.capacity.saturating_mul(2)).max(1);
        let len = cell_count(capacity, self.depth)?;

        let mut cells = Vec::new();
        cells.try_reserve_exact(len)?;
        cells.resize(len, self.fill);

        let old_row = self.capacity * self.depth;
        let new_row = capacity * self.depth;
        for row in 0..self.capacity {
            cells[row * new_row..row * new_row + old_row]
                .copy_from_slice(&self.cells[row * old_row..(row + 1) * old_row]);
        }

        self.cells = cells;
        self.capacity = capacity;
        Ok(true)
    }
}

/// Table of `width` values per state row
#[derive(Debug, Clone)]
pub struct RowTable<T> {
    cells: Vec<T>,
    width: usize,
    fill: T,
}

impl<T: Copy> RowTable<T> {
    pub fn new(rows: usize, width: usize, fill: T) -> Result<Self> {
        let len = rows
            .checked_mul(width)
            .ok_or_else(|| GapError::Allocation("row table size overflow".to_string()))?;
        let mut cells = Vec::new();
        cells.try_reserve_exact(len)?;
        cells.resize(len, fill);

        Ok(Self { cells, width, fill })
    }

    /// Number of rows currently allocated
    pub fn rows(&self) -> usize {
        if self.width == 0 {
            0
        } else {
            self.cells.len() / self.width
        }
    }

    #[inline]
    pub fn row(&self, row: usize) -> &[T] {
        &self.cells[row * self.width..(row + 1) * self.width]
    }

    #[inline]
    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        let width = self.width;
        &mut self.cells[row * width..(row + 1) * width]
    }

    /// Make room for at least `rows` rows, doubling when growth is needed
    pub fn ensure(&mut self, rows: usize) -> Result<bool> {
        let current = self.rows();
        if rows <= current {
            return Ok(false);
        }

        let target = rows.max(current.saturating_mul(2));
        let len = target
            .checked_mul(self.width)
            .ok_or_else(|| GapError::Allocation("row table size overflow".to_string()))?;
        self.cells.try_reserve_exact(len - self.cells.len())?;
        self.cells.resize(len, self.fill);
        Ok(true)
    }
}

fn cell_count(capacity: usize, depth: usize) -> Result<usize> {
    capacity
        .checked_mul(capacity)
        .and_then(|n| n.checked_mul(depth))
        .ok_or_else(|| {
            GapError::Allocation(format!(
                "table of {capacity}x{capacity}x{depth} cells overflows"
            ))
        })
}
