//! Scoring module - classic line clear points, levels and gravity
//!
//! Points for a clear come from `LINE_SCORES` multiplied by `(level + 1)`.
//! The level rises every `LINES_PER_LEVEL` lines and picks the gravity
//! interval from `DROP_INTERVALS`.

use crate::types::{DROP_INTERVALS, DROP_INTERVAL_FLOOR_MS, LINES_PER_LEVEL, LINE_SCORES};

/// Calculate line clear score (Classic rules)
///
/// `rows`: number of rows cleared at once (0-4)
/// `level`: current level (0-based)
///
/// Returns `None` when `rows` is past the end of the score table.
pub fn calculate_line_score(rows: usize, level: u32) -> Option<u32> {
    LINE_SCORES
        .get(rows)
        .map(|&base| base.saturating_mul(level.saturating_add(1)))
}

/// Level management
/// Level increases every 10 lines cleared
pub fn calculate_level(total_lines: u32) -> u32 {
    total_lines / LINES_PER_LEVEL
}

/// Get drop interval for a level (in milliseconds)
pub fn get_drop_interval_ms(level: u32) -> u32 {
    DROP_INTERVALS
        .get(level as usize)
        .copied()
        .unwrap_or(DROP_INTERVAL_FLOOR_MS)
}

/// Gravity interval for a level, in frames at `framerate` (at least 1)
pub fn get_drop_interval_frames(level: u32, framerate: u32) -> u32 {
    let frames = get_drop_interval_ms(level) as u64 * framerate as u64 / 1000;
    frames.clamp(1, u32::MAX as u64) as u32
}
