//! Core engine module - pure, deterministic, and testable
//!
//! This crate holds the block mechanics of the game. It has **no
//! dependencies** on rendering, audio, input or I/O, so it can be driven by
//! a terminal front end, a GUI, a test or a headless simulation alike.
//!
//! # Module Structure
//!
//! - [`algebra`]: rotation and translation of integer points (Gaussian integers)
//! - [`geometry`]: bit index <-> lattice point mapping, mask rotation
//! - [`table`]: fixed-capacity struct-of-arrays block table with id recycling
//! - [`grid`]: occupancy grid, placement tests, commit, row resolution, scoring
//! - [`animation`]: frame-driven row clear animation
//! - [`scoring`]: classic line scores, levels and gravity intervals
//! - [`presets`]: tetromino masks
//! - [`rng`]: deterministic 7-bag preset randomizer
//! - [`config`]: serde-loadable engine configuration
//! - [`snapshot`]: serializable views for observers
//!
//! # Data flow
//!
//! The block table holds the falling piece's mask and position. The grid
//! queries the table to test and commit placements, owns its own occupancy
//! buffer, and on full rows hands cell counts back to the table.
//!
//! # Example
//!
//! ```
//! use blockfall_core::{BlockTable, Grid};
//! use blockfall_core::types::{Color, Point};
//!
//! let mut table = BlockTable::new(8);
//! let mut grid = Grid::new(4, 4).unwrap();
//!
//! // 2x2 square on a 4x4 lattice, centered on the corner at (2, 2).
//! let square = (1 << 5) | (1 << 6) | (1 << 9) | (1 << 10);
//! let id = table.create(4, square, Point::new(2, 2), Color::default()).unwrap();
//!
//! assert!(grid.can_place_block(&table, id));
//! grid.commit(&mut table, id).unwrap();
//! assert_eq!(grid.get(1, 1), Some(Some(id)));
//! assert_eq!(table.contents(id), Some(0));
//! ```

pub mod algebra;
pub mod animation;
pub mod config;
pub mod geometry;
pub mod grid;
pub mod presets;
pub mod rng;
pub mod scoring;
pub mod snapshot;
pub mod table;

pub use blockfall_types as types;

// Re-export commonly used types for convenience
pub use algebra::{rotate, translate, ROTATE_180, ROTATE_CCW, ROTATE_CW};
pub use animation::AnimationFrame;
pub use config::{ConfigError, EngineConfig};
pub use grid::{block_cells, Grid};
pub use presets::{PieceKind, Preset};
pub use rng::{PresetBag, SimpleRng};
pub use snapshot::{BlockSnapshot, GridSnapshot};
pub use table::BlockTable;
