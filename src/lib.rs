//! Blockfall (workspace facade crate).
//!
//! Re-exports the engine crates under one roof so drivers can depend on a
//! single package: `blockfall::{core, engine, types}`.

pub use blockfall_core as core;
pub use blockfall_engine as engine;
pub use blockfall_types as types;
