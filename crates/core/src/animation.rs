//! Row clear animation - frame-driven removal counters
//!
//! Each marked row carries a target (`to_remove`, normally the grid width) and
//! a progress counter (`removed`). Every `period` frames the progress of all
//! marked rows advances by one cell. The logical row clear is separate: the
//! driver resolves rows once the animation reports `Finished`.

use tracing::trace;

use crate::types::{EngineError, CLEAR_ANIMATION_CELLS_PER_SECOND};

/// Outcome of one animation tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationFrame {
    /// No animation running
    Idle,
    /// Cooldown still counting down
    Waiting,
    /// Rows advanced, more frames to go
    Advanced,
    /// Every marked row reached its target; the animation stopped
    Finished,
}

/// Frames between two removal steps at `framerate` frames per second
pub fn frame_period(framerate: u32) -> u32 {
    (framerate / CLEAR_ANIMATION_CELLS_PER_SECOND).max(1)
}

#[derive(Debug, Clone)]
pub struct ClearAnimation {
    to_remove: Box<[u16]>,
    removed: Box<[u16]>,
    animating: bool,
    cooldown: u32,
    period: u32,
}

impl ClearAnimation {
    pub fn new(rows: usize) -> Self {
        Self {
            to_remove: vec![0; rows].into_boxed_slice(),
            removed: vec![0; rows].into_boxed_slice(),
            animating: false,
            cooldown: 0,
            period: 1,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// `(removed, to_remove)` for a row; `(0, 0)` when the row is not marked
    pub fn row_progress(&self, row: usize) -> (u16, u16) {
        match (self.removed.get(row), self.to_remove.get(row)) {
            (Some(&removed), Some(&to_remove)) => (removed, to_remove),
            _ => (0, 0),
        }
    }

    /// Mark the rows for which `marked(row)` holds, each targeting `cells` removals.
    ///
    /// Returns whether any row was marked. Fails without touching state if an
    /// animation is already running.
    pub fn start(
        &mut self,
        cells: u16,
        framerate: u32,
        mut marked: impl FnMut(usize) -> bool,
    ) -> Result<bool, EngineError> {
        if self.animating {
            return Err(EngineError::AnimationInProgress);
        }

        let mut any = false;
        for row in 0..self.to_remove.len() {
            if marked(row) {
                self.to_remove[row] = cells;
                self.removed[row] = 0;
                any = true;
            }
        }

        if any {
            self.period = frame_period(framerate);
            self.cooldown = self.period;
            self.animating = true;
        }
        Ok(any)
    }

    /// Stop the animation and unmark every row
    pub fn cancel(&mut self) {
        self.to_remove.fill(0);
        self.removed.fill(0);
        self.animating = false;
        self.cooldown = 0;
    }

    /// Advance one frame
    pub fn tick(&mut self) -> AnimationFrame {
        if !self.animating {
            return AnimationFrame::Idle;
        }

        self.cooldown = self.cooldown.saturating_sub(1);
        if self.cooldown > 0 {
            return AnimationFrame::Waiting;
        }

        let mut pending = false;
        for (removed, to_remove) in self.removed.iter_mut().zip(self.to_remove.iter_mut()) {
            if *to_remove == 0 {
                continue;
            }
            *removed += 1;
            if *removed >= *to_remove {
                *removed = 0;
                *to_remove = 0;
            } else {
                pending = true;
            }
        }

        if pending {
            self.cooldown = self.period;
            trace!(period = self.period, "clear animation advanced");
            AnimationFrame::Advanced
        } else {
            self.animating = false;
            trace!("clear animation finished");
            AnimationFrame::Finished
        }
    }
}
