//! Block table - fixed-capacity struct-of-arrays store of block entities
//!
//! Every column is allocated once at construction. Ids are slot indices;
//! a slot is free while its cell count is zero and is handed out again by a
//! rotating provisioning cursor, so creating and retiring blocks never
//! touches the allocator.
//!
//! The cell count is tracked independently of the mask: it starts as the
//! mask's popcount, survives the mask being baked into the grid, and is
//! drained cell by cell as grid rows are cleared.

use tracing::debug;

use crate::algebra;
use crate::geometry::{self, is_supported_size, lattice_bits};
use crate::types::{BlockId, Color, EngineError, Point};

#[derive(Debug, Clone)]
pub struct BlockTable {
    sizes: Box<[u8]>,
    contents: Box<[u64]>,
    positions: Box<[Point]>,
    colors: Box<[Color]>,
    cell_counts: Box<[u32]>,
    /// Next slot to probe when provisioning
    cursor: usize,
}

impl BlockTable {
    /// Create a table able to hold `max_ids` live blocks
    pub fn new(max_ids: usize) -> Self {
        Self {
            sizes: vec![0; max_ids].into_boxed_slice(),
            contents: vec![0; max_ids].into_boxed_slice(),
            positions: vec![Point::ORIGIN; max_ids].into_boxed_slice(),
            colors: vec![Color::default(); max_ids].into_boxed_slice(),
            cell_counts: vec![0; max_ids].into_boxed_slice(),
            cursor: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.cell_counts.len()
    }

    /// Number of ids currently live
    pub fn live_count(&self) -> usize {
        self.cell_counts.iter().filter(|&&count| count > 0).count()
    }

    /// Iterate over every live id in slot order
    pub fn live_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.cell_counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(slot, _)| BlockId::new(slot as u32))
    }

    /// Provision a new block
    ///
    /// Fails with `EmptyShape` if `contents` has no cell inside the lattice and
    /// with `TableFull` if one full scan from the cursor finds no free slot.
    pub fn create(
        &mut self,
        size: u8,
        contents: u64,
        position: Point,
        color: Color,
    ) -> Result<BlockId, EngineError> {
        if !is_supported_size(size) {
            return Err(EngineError::UnsupportedBlockSize(size));
        }
        let cell_count = geometry::popcount(contents, size);
        if cell_count == 0 {
            return Err(EngineError::EmptyShape);
        }

        let capacity = self.capacity();
        let slot = (0..capacity)
            .map(|probe| (self.cursor + probe) % capacity)
            .find(|&slot| self.cell_counts[slot] == 0)
            .ok_or(EngineError::TableFull)?;

        self.sizes[slot] = size;
        self.contents[slot] = contents;
        self.positions[slot] = position;
        self.colors[slot] = color;
        self.cell_counts[slot] = cell_count;
        self.cursor = (slot + 1) % capacity;

        let id = BlockId::new(slot as u32);
        debug!(%id, size, cell_count, x = position.x, y = position.y, "block created");
        Ok(id)
    }

    /// In range and holding at least one live cell
    #[inline]
    pub fn exists(&self, id: BlockId) -> bool {
        self.cell_counts
            .get(id.index())
            .is_some_and(|&count| count > 0)
    }

    #[inline]
    fn slot(&self, id: BlockId) -> Result<usize, EngineError> {
        if self.exists(id) {
            Ok(id.index())
        } else {
            Err(EngineError::NoSuchBlock(id))
        }
    }

    /// Rotate the block's mask in place. No collision checking.
    pub fn transform(&mut self, id: BlockId, rotation: Point) -> Result<(), EngineError> {
        let slot = self.slot(id)?;
        self.contents[slot] = geometry::transform_mask(self.contents[slot], self.sizes[slot], rotation);
        Ok(())
    }

    /// Move the block's position in place. No collision checking.
    pub fn translate(&mut self, id: BlockId, delta: Point) -> Result<(), EngineError> {
        let slot = self.slot(id)?;
        self.positions[slot] = algebra::translate(self.positions[slot], delta);
        Ok(())
    }

    /// Whether lattice bit `bit` of the block is set; false for missing ids
    pub fn is_bit_set(&self, id: BlockId, bit: u32) -> bool {
        match self.slot(id) {
            Ok(slot) => bit < lattice_bits(self.sizes[slot]) && (self.contents[slot] >> bit) & 1 == 1,
            Err(_) => false,
        }
    }

    pub fn size(&self, id: BlockId) -> Option<u8> {
        self.slot(id).ok().map(|slot| self.sizes[slot])
    }

    pub fn contents(&self, id: BlockId) -> Option<u64> {
        self.slot(id).ok().map(|slot| self.contents[slot])
    }

    pub fn position(&self, id: BlockId) -> Option<Point> {
        self.slot(id).ok().map(|slot| self.positions[slot])
    }

    pub fn color(&self, id: BlockId) -> Option<Color> {
        self.slot(id).ok().map(|slot| self.colors[slot])
    }

    /// Live cell count; 0 for missing ids
    pub fn cell_count(&self, id: BlockId) -> u32 {
        self.cell_counts.get(id.index()).copied().unwrap_or(0)
    }

    /// Change the lattice dimension of a live block.
    ///
    /// The mask is kept as-is, so its bits take on a different layout. Only
    /// meaningful when the caller rewrites `contents` right after.
    pub fn set_size(&mut self, id: BlockId, size: u8) -> Result<(), EngineError> {
        if !is_supported_size(size) {
            return Err(EngineError::UnsupportedBlockSize(size));
        }
        let slot = self.slot(id)?;
        self.sizes[slot] = size;
        Ok(())
    }

    /// Replace the mask. The cell count is left untouched.
    pub fn set_contents(&mut self, id: BlockId, contents: u64) -> Result<(), EngineError> {
        let slot = self.slot(id)?;
        self.contents[slot] = contents;
        Ok(())
    }

    pub fn set_position(&mut self, id: BlockId, position: Point) -> Result<(), EngineError> {
        let slot = self.slot(id)?;
        self.positions[slot] = position;
        Ok(())
    }

    pub fn set_color(&mut self, id: BlockId, color: Color) -> Result<(), EngineError> {
        let slot = self.slot(id)?;
        self.colors[slot] = color;
        Ok(())
    }

    pub fn increment_cell_count(&mut self, id: BlockId, by: u32) -> Result<(), EngineError> {
        let slot = self.slot(id)?;
        self.cell_counts[slot] = self.cell_counts[slot]
            .checked_add(by)
            .ok_or(EngineError::CellCountOverflow(id))?;
        Ok(())
    }

    /// Reduce the live cell count. Reaching zero retires the id.
    pub fn decrement_cell_count(&mut self, id: BlockId, by: u32) -> Result<(), EngineError> {
        let slot = self.slot(id)?;
        let current = self.cell_counts[slot];
        if by > current {
            return Err(EngineError::CellCountUnderflow {
                id,
                current,
                requested: by,
            });
        }
        self.cell_counts[slot] = current - by;
        if current == by {
            debug!(%id, "block retired");
        }
        Ok(())
    }

    /// Retire the id immediately
    pub fn remove(&mut self, id: BlockId) -> Result<(), EngineError> {
        let slot = self.slot(id)?;
        self.cell_counts[slot] = 0;
        debug!(%id, "block removed");
        Ok(())
    }
}
