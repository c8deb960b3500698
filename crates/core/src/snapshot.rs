//! Snapshots - serializable copies of grid and block state for observers
//!
//! Captured on demand; they hold no references back into the engine.

use serde::Serialize;

use crate::grid::{block_cells, Grid};
use crate::table::BlockTable;
use crate::types::{BlockId, Cell, Color, Point};

/// Animation counters of one row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowProgress {
    pub removed: u16,
    pub to_remove: u16,
}

/// Serializable copy of the grid and its clear animation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridSnapshot {
    pub width: usize,
    pub height: usize,
    /// Row-major owners
    pub cells: Vec<Cell>,
    pub animating: bool,
    pub rows: Vec<RowProgress>,
}

impl GridSnapshot {
    pub fn capture(grid: &Grid) -> Self {
        let rows = (0..grid.height())
            .map(|y| {
                let (removed, to_remove) = grid.row_progress(y);
                RowProgress { removed, to_remove }
            })
            .collect();
        Self {
            width: grid.width(),
            height: grid.height(),
            cells: grid.cells().to_vec(),
            animating: grid.is_animating(),
            rows,
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Cell {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[y * self.width + x]
    }
}

/// Serializable view of a block that is still floating
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSnapshot {
    pub id: BlockId,
    pub size: u8,
    pub contents: u64,
    pub position: Point,
    pub color: Color,
    /// Grid cells the mask covers at `position`
    pub cells: Vec<Point>,
}

impl BlockSnapshot {
    /// `None` if the id is not live
    pub fn capture(table: &BlockTable, id: BlockId) -> Option<Self> {
        let size = table.size(id)?;
        let contents = table.contents(id)?;
        let position = table.position(id)?;
        Some(Self {
            id,
            size,
            contents,
            position,
            color: table.color(id)?,
            cells: block_cells(size, contents, position).to_vec(),
        })
    }
}
