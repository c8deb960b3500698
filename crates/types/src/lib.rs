//! Core types module - shared data structures and constants
//!
//! This crate defines the value types used by every layer of the engine.
//! They are plain data with no behavior beyond construction and formatting,
//! usable from the core logic, the session driver and any observer.
//!
//! # Coordinates
//!
//! Two coordinate systems meet in the engine:
//!
//! - **Lattice** coordinates are relative to a block's center, with `y`
//!   increasing upward (the mathematical convention used for rotation).
//! - **Grid** coordinates are absolute cells, `(0, 0)` at the top-left,
//!   with `y` increasing downward.
//!
//! # Defaults
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `DEFAULT_GRID_WIDTH` | 10 | Columns in the playfield |
//! | `DEFAULT_GRID_HEIGHT` | 20 | Rows in the playfield |
//! | `DEFAULT_MAX_BLOCKS` | 256 | Block table capacity |
//! | `DEFAULT_FRAMERATE` | 60 | Frames per second |
//!
//! # Examples
//!
//! ```
//! use blockfall_types::{BlockId, EngineError, Point, LINE_SCORES};
//!
//! let p = Point::new(2, -1);
//! assert_eq!((p.x, p.y), (2, -1));
//!
//! let id = BlockId::new(7);
//! assert_eq!(id.index(), 7);
//!
//! assert_eq!(EngineError::TableFull.code(), "table_full");
//! assert_eq!(LINE_SCORES[4], 1200);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default grid width in cells
pub const DEFAULT_GRID_WIDTH: u16 = 10;

/// Default grid height in cells
pub const DEFAULT_GRID_HEIGHT: u16 = 20;

/// Default number of block ids the table can hold at once
pub const DEFAULT_MAX_BLOCKS: usize = 256;

/// Default game loop rate (frames per second)
pub const DEFAULT_FRAMERATE: u32 = 60;

/// Smallest supported block lattice dimension
pub const MIN_BLOCK_SIZE: u8 = 1;

/// Largest supported block lattice dimension (8 * 8 = 64 bits)
pub const MAX_BLOCK_SIZE: u8 = 8;

/// Cells removed per second, per row, by the clear animation
pub const CLEAR_ANIMATION_CELLS_PER_SECOND: u32 = 30;

/// Lines needed to advance one level
pub const LINES_PER_LEVEL: u32 = 10;

/// Drop intervals by level (milliseconds per row)
///
/// Index 0 = Level 0, Index 8 = Level 8
pub const DROP_INTERVALS: [u32; 9] = [1000, 800, 650, 500, 400, 320, 250, 200, 160];

/// Drop interval used past the end of `DROP_INTERVALS`
pub const DROP_INTERVAL_FLOOR_MS: u32 = 120;

/// Line clear scoring table (Classic Nintendo scoring)
///
/// Base points for clearing N rows at level 0:
/// - 0 rows: 0 points
/// - 1 row: 40 points
/// - 2 rows: 100 points
/// - 3 rows: 300 points
/// - 4 rows: 1200 points
///
/// Points are multiplied by (level + 1).
pub const LINE_SCORES: [u32; 5] = [0, 40, 100, 300, 1200];

/// A signed 2D integer point.
///
/// Used both as a lattice-relative offset and as an absolute grid position;
/// rotations treat it as the complex number `x + yi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Handle to a row of the block table.
///
/// An id stays meaningful only while its block has a positive cell count;
/// afterwards the slot is recycled and the same index may name a new block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(u32);

impl BlockId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Slot index inside the table
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Display color of a block. Opaque to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A cell of the grid
///
/// - `None`: Empty cell
/// - `Some(BlockId)`: Cell owned by the given block
pub type Cell = Option<BlockId>;

/// Errors reported by the block table, the grid and the session.
///
/// None of these are fatal; the driver decides whether to retry or end the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// No free slot in the block table
    TableFull,
    /// Block creation with a mask that has no cell inside the lattice
    EmptyShape,
    /// Block lattice dimension outside `MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE`
    UnsupportedBlockSize(u8),
    /// Id out of range or its cell count is zero
    NoSuchBlock(BlockId),
    /// Decrement larger than the live cell count
    CellCountUnderflow {
        id: BlockId,
        current: u32,
        requested: u32,
    },
    /// Increment past `u32::MAX`
    CellCountOverflow(BlockId),
    /// Clear animation already running
    AnimationInProgress,
    /// Placement out of bounds or colliding with an occupied cell
    Blocked,
    /// More full rows than the score table covers
    ScoreOutOfRange(usize),
    /// Configuration value rejected
    InvalidConfig(&'static str),
}

impl EngineError {
    /// Stable machine-readable code
    pub fn code(self) -> &'static str {
        match self {
            EngineError::TableFull => "table_full",
            EngineError::EmptyShape => "empty_shape",
            EngineError::UnsupportedBlockSize(_) => "unsupported_block_size",
            EngineError::NoSuchBlock(_) => "no_such_block",
            EngineError::CellCountUnderflow { .. } => "cell_count_underflow",
            EngineError::CellCountOverflow(_) => "cell_count_overflow",
            EngineError::AnimationInProgress => "animation_in_progress",
            EngineError::Blocked => "blocked",
            EngineError::ScoreOutOfRange(_) => "score_out_of_range",
            EngineError::InvalidConfig(_) => "invalid_config",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            EngineError::TableFull => "block table has no free slot",
            EngineError::EmptyShape => "block mask has no cells",
            EngineError::UnsupportedBlockSize(_) => "block size must be between 1 and 8",
            EngineError::NoSuchBlock(_) => "block id does not exist",
            EngineError::CellCountUnderflow { .. } => "cell count decrement exceeds live cells",
            EngineError::CellCountOverflow(_) => "cell count increment overflows",
            EngineError::AnimationInProgress => "clear animation is already running",
            EngineError::Blocked => "placement is out of bounds or colliding",
            EngineError::ScoreOutOfRange(_) => "full row count outside the score table",
            EngineError::InvalidConfig(_) => "invalid engine configuration",
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            EngineError::UnsupportedBlockSize(size) => {
                write!(f, "{} (got {})", self.message(), size)
            }
            EngineError::NoSuchBlock(id) => write!(f, "{}: {}", self.message(), id),
            EngineError::CellCountUnderflow {
                id,
                current,
                requested,
            } => write!(
                f,
                "{}: {} has {} cells, requested {}",
                self.message(),
                id,
                current,
                requested
            ),
            EngineError::CellCountOverflow(id) => write!(f, "{}: {}", self.message(), id),
            EngineError::ScoreOutOfRange(count) => {
                write!(f, "{} ({} rows)", self.message(), count)
            }
            EngineError::InvalidConfig(field) => write!(f, "{}: {}", self.message(), field),
            _ => f.write_str(self.message()),
        }
    }
}

impl std::error::Error for EngineError {}
