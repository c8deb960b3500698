//! RNG module - deterministic 7-bag preset randomizer
//!
//! Each bag holds every tetromino once, shuffled. Pieces are dealt from the
//! bag until it is empty, then a fresh bag is shuffled. The generator is a
//! plain LCG so a seed always replays the same sequence.

use crate::presets::{PieceKind, Preset};

const BAG_LEN: usize = PieceKind::ALL.len();

/// Seeded generator behind the bag shuffle.
///
/// A 32-bit LCG (multiplier 1664525, increment 1013904223). Sessions only
/// need a replayable order, not statistical quality.
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Seed 0 is treated as 1
    pub fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Value in `[0, bound)`
    pub fn next_below(&mut self, bound: u32) -> u32 {
        self.next_u32() % bound
    }

    /// Shuffle a bag in place, walking from the back
    pub fn shuffle<T>(&mut self, bag: &mut [T]) {
        for last in (1..bag.len()).rev() {
            let pick = self.next_below(last as u32 + 1) as usize;
            bag.swap(last, pick);
        }
    }
}

/// 7-bag queue of spawn presets
#[derive(Debug, Clone)]
pub struct PresetBag {
    bag: [PieceKind; BAG_LEN],
    /// Next undealt slot; `BAG_LEN` means the bag is spent
    next: usize,
    rng: SimpleRng,
}

impl PresetBag {
    pub fn new(seed: u32) -> Self {
        let mut bag = Self {
            bag: PieceKind::ALL,
            next: BAG_LEN,
            rng: SimpleRng::new(seed),
        };
        bag.refill();
        bag
    }

    fn refill(&mut self) {
        self.bag = PieceKind::ALL;
        self.rng.shuffle(&mut self.bag);
        self.next = 0;
    }

    /// Kind the next [`PresetBag::draw`] will return
    pub fn peek(&self) -> PieceKind {
        if self.next < BAG_LEN {
            return self.bag[self.next];
        }
        // Shuffle a copy with a cloned generator so the preview matches the next refill.
        let mut rng = self.rng.clone();
        let mut bag = PieceKind::ALL;
        rng.shuffle(&mut bag);
        bag[0]
    }

    pub fn draw(&mut self) -> Preset {
        if self.next >= BAG_LEN {
            self.refill();
        }
        let kind = self.bag[self.next];
        self.next += 1;
        kind.preset()
    }
}

impl Default for PresetBag {
    fn default() -> Self {
        Self::new(1)
    }
}
