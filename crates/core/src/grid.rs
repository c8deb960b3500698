//! Grid module - the occupancy buffer blocks are tested against and baked into
//!
//! The grid is `width x height` cells in a flat row-major buffer, each cell
//! holding the id of the block that owns it or `None`.
//! Coordinates: (x, y) with (0, 0) at the top-left and y growing downward.
//!
//! Block masks are converted to grid cells with [`block_cells`]. Lattice
//! points have y pointing up, so the y component is negated first. For even
//! sized blocks the block position is a grid-line corner; positive offsets
//! are pulled in by one so the cells straddle that corner.

use arrayvec::ArrayVec;
use tracing::{debug, warn};

use crate::animation::{AnimationFrame, ClearAnimation};
use crate::geometry::{bit_to_point, popcount, set_bits};
use crate::scoring::calculate_line_score;
use crate::table::BlockTable;
use crate::types::{BlockId, Cell, EngineError, Point};

/// Grid-absolute cells of a block mask, at most one per lattice bit
pub type BlockCells = ArrayVec<Point, 64>;

/// Offset of lattice bit `bit` from the block position, in grid orientation
#[inline]
fn cell_offset(bit: u32, size: u8) -> Point {
    let lattice = bit_to_point(bit, size);
    let mut offset = Point::new(lattice.x, -lattice.y);
    if size % 2 == 0 {
        if offset.x > 0 {
            offset.x -= 1;
        }
        if offset.y > 0 {
            offset.y -= 1;
        }
    }
    offset
}

/// Absolute grid cells covered by `mask` placed at `position`
pub fn block_cells(size: u8, mask: u64, position: Point) -> BlockCells {
    set_bits(mask, size)
        .map(|bit| {
            let offset = cell_offset(bit, size);
            Point::new(position.x + offset.x, position.y + offset.y)
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    /// Flat array of owners, row-major order (y * width + x)
    cells: Box<[Cell]>,
    animation: ClearAnimation,
}

impl Grid {
    /// Create an empty grid
    pub fn new(width: u16, height: u16) -> Result<Self, EngineError> {
        if width == 0 {
            return Err(EngineError::InvalidConfig("grid_width"));
        }
        if height == 0 {
            return Err(EngineError::InvalidConfig("grid_height"));
        }
        let (width, height) = (width as usize, height as usize);
        Ok(Self {
            width,
            height,
            cells: vec![None; width * height].into_boxed_slice(),
            animation: ClearAnimation::new(height),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Calculate flat index from (x, y) coordinates
    #[inline(always)]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// Owner of cell (x, y); `None` when out of bounds
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Flat view of all cells
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    fn row(&self, y: usize) -> &[Cell] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    /// Check if a row is completely filled
    pub fn is_row_full(&self, y: usize) -> bool {
        y < self.height && self.row(y).iter().all(Option::is_some)
    }

    pub fn full_row_count(&self) -> usize {
        (0..self.height).filter(|&y| self.is_row_full(y)).count()
    }

    /// Whether `mask` of a `size` block at `position` lies inside the grid on empty cells
    pub fn can_place(&self, size: u8, mask: u64, position: Point) -> bool {
        set_bits(mask, size).all(|bit| {
            let offset = cell_offset(bit, size);
            matches!(
                self.index(position.x + offset.x, position.y + offset.y),
                Some(idx) if self.cells[idx].is_none()
            )
        })
    }

    /// [`Grid::can_place`] with the block's current size, mask and position
    pub fn can_place_block(&self, table: &BlockTable, id: BlockId) -> bool {
        match (table.size(id), table.contents(id), table.position(id)) {
            (Some(size), Some(mask), Some(position)) => self.can_place(size, mask, position),
            _ => false,
        }
    }

    /// Bake the block into the grid.
    ///
    /// Writes `id` into every covered cell and empties the block's mask; its
    /// cell count now tracks the grid cells it owns. Nothing changes on failure.
    pub fn commit(&mut self, table: &mut BlockTable, id: BlockId) -> Result<(), EngineError> {
        let (Some(size), Some(mask), Some(position)) =
            (table.size(id), table.contents(id), table.position(id))
        else {
            return Err(EngineError::NoSuchBlock(id));
        };
        if !self.can_place(size, mask, position) {
            return Err(EngineError::Blocked);
        }

        for cell in block_cells(size, mask, position) {
            if let Some(idx) = self.index(cell.x, cell.y) {
                self.cells[idx] = Some(id);
            }
        }
        table.set_contents(id, 0)?;

        debug!(%id, x = position.x, y = position.y, "block committed");
        Ok(())
    }

    /// Blank every cell and stop any clear animation. Block cell counts are
    /// not touched.
    pub fn clear(&mut self) {
        self.cells.fill(None);
        self.animation.cancel();
    }

    /// Blank every cell, releasing one cell count per owned cell, and stop
    /// any clear animation.
    ///
    /// Stops at the first failing decrement; cells visited before it stay blanked.
    pub fn reset(&mut self, table: &mut BlockTable) -> Result<(), EngineError> {
        self.animation.cancel();
        for cell in self.cells.iter_mut() {
            if let Some(owner) = *cell {
                table.decrement_cell_count(owner, 1).inspect_err(|err| {
                    warn!(%owner, %err, "grid reset found an inconsistent owner");
                })?;
                *cell = None;
            }
        }
        Ok(())
    }

    /// Rows the next [`Grid::resolve_rows`] pass discards, bottom-up.
    ///
    /// Rows under the read cursor are never overwritten before they are
    /// read, so walking the cursors over the untouched grid yields the same
    /// rows as the real pass.
    fn rows_to_discard(&self) -> Vec<usize> {
        let mut rows = Vec::new();
        let mut read = self.height as isize - 1;
        for _ in 0..self.height {
            if read >= 0 && self.is_row_full(read as usize) {
                rows.push(read as usize);
                read -= 1;
            }
            read -= 1;
        }
        rows
    }

    /// Check that every owner of `rows` can give up all its cells there
    fn check_release(&self, rows: &[usize], table: &BlockTable) -> Result<(), EngineError> {
        let mut owners: Vec<BlockId> = rows
            .iter()
            .flat_map(|&y| self.row(y).iter().flatten().copied())
            .collect();
        owners.sort_unstable_by_key(|id| id.get());

        for run in owners.chunk_by(|a, b| a == b) {
            let id = run[0];
            let requested = run.len() as u32;
            let current = table.cell_count(id);
            if current == 0 {
                return Err(EngineError::NoSuchBlock(id));
            }
            if requested > current {
                return Err(EngineError::CellCountUnderflow {
                    id,
                    current,
                    requested,
                });
            }
        }
        Ok(())
    }

    /// Release one cell count per cell of a full row
    fn release_row(&self, y: usize, table: &mut BlockTable) -> Result<(), EngineError> {
        for owner in self.row(y).iter().flatten() {
            table.decrement_cell_count(*owner, 1).inspect_err(|err| {
                warn!(%owner, row = y, %err, "row release found an inconsistent owner");
            })?;
        }
        Ok(())
    }

    /// Discard full rows and let the rest fall, returning how many were discarded.
    ///
    /// Two cursors walk up from the bottom. At each write row, a full row
    /// under the read cursor is released and skipped, then the read row is
    /// copied down (or blanked once the read cursor leaves the top). Only one
    /// full row is skipped per write row, so a full row stacked directly on
    /// another full row falls into place instead of vanishing in the same
    /// pass; callers loop until this returns 0 to clear everything.
    ///
    /// Owners of the discarded rows are checked against the table first; on
    /// an inconsistent owner the error is returned and nothing changes.
    pub fn resolve_rows(&mut self, table: &mut BlockTable) -> Result<usize, EngineError> {
        let discard = self.rows_to_discard();
        if discard.is_empty() {
            return Ok(0);
        }
        self.check_release(&discard, table).inspect_err(|err| {
            warn!(%err, "row resolution found an inconsistent owner");
        })?;

        let width = self.width;
        let mut full_rows = 0;
        let mut read = self.height as isize - 1;

        for write in (0..self.height).rev() {
            if read >= 0 && self.is_row_full(read as usize) {
                self.release_row(read as usize, table)?;
                full_rows += 1;
                read -= 1;
            }

            let dst = write * width;
            if read >= 0 {
                let src = read as usize * width;
                if src != dst {
                    self.cells.copy_within(src..src + width, dst);
                }
            } else {
                self.cells[dst..dst + width].fill(None);
            }
            read -= 1;
        }

        if full_rows > 0 {
            debug!(full_rows, "rows resolved");
        }
        Ok(full_rows)
    }

    /// Points for the rows currently full, at `level`
    pub fn assess_score(&self, level: u32) -> Result<u32, EngineError> {
        let full_rows = self.full_row_count();
        calculate_line_score(full_rows, level).ok_or(EngineError::ScoreOutOfRange(full_rows))
    }

    /// How many rows the block can fall before it would collide.
    ///
    /// 0 when it is already resting or cannot be placed where it is.
    pub fn drop_distance(&self, table: &BlockTable, id: BlockId) -> u32 {
        let (Some(size), Some(mask), Some(position)) =
            (table.size(id), table.contents(id), table.position(id))
        else {
            return 0;
        };
        // A baked block has no floating cells left to move.
        if popcount(mask, size) == 0 || !self.can_place(size, mask, position) {
            return 0;
        }

        let mut distance = 0;
        while distance < self.height as u32
            && self.can_place(size, mask, Point::new(position.x, position.y + distance as i32 + 1))
        {
            distance += 1;
        }
        distance
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_animating()
    }

    /// `(removed, to_remove)` animation counters of a row
    pub fn row_progress(&self, y: usize) -> (u16, u16) {
        self.animation.row_progress(y)
    }

    /// Start the clear animation over every full row.
    ///
    /// Returns whether any row qualified.
    pub fn prepare_animation(&mut self, framerate: u32) -> Result<bool, EngineError> {
        let width = self.width;
        let cells = &self.cells;
        self.animation.start(width as u16, framerate, |y| {
            cells[y * width..(y + 1) * width].iter().all(Option::is_some)
        })
    }

    /// Start the clear animation over every row, full or not
    pub fn prepare_animation_all_rows(&mut self, framerate: u32) -> Result<bool, EngineError> {
        self.animation.start(self.width as u16, framerate, |_| true)
    }

    /// Advance the clear animation by one frame
    pub fn run_animation_frame(&mut self) -> AnimationFrame {
        self.animation.tick()
    }
}

#[cfg(test)]
impl Grid {
    /// Fill cells from rows of text: `.` is empty, a digit is the owner id
    pub(crate) fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows[0].len();
        let mut grid = Grid::new(width as u16, height as u16).unwrap();
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                grid.cells[y * width + x] = ch.to_digit(10).map(BlockId::new);
            }
        }
        grid
    }

    pub(crate) fn to_rows(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| {
                self.row(y)
                    .iter()
                    .map(|cell| match cell {
                        Some(id) => char::from_digit(id.get(), 10).unwrap_or('#'),
                        None => '.',
                    })
                    .collect()
            })
            .collect()
    }
}
