//! Shape presets - the seven tetrominoes as raw lattice masks
//!
//! I and O live on a 4x4 lattice so they rotate about a grid corner; the
//! rest use a 3x3 lattice centered on a cell. Row 0 of each mask is the top.

use serde::{Deserialize, Serialize};

use crate::types::Color;

/// The seven tetromino piece kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    pub fn preset(self) -> Preset {
        match self {
            PieceKind::I => Preset::new(self, 4, 0x00F0, Color::rgb(0, 240, 240)),
            PieceKind::O => Preset::new(self, 4, 0x0660, Color::rgb(240, 240, 0)),
            PieceKind::T => Preset::new(self, 3, 0b000_111_010, Color::rgb(160, 0, 240)),
            PieceKind::S => Preset::new(self, 3, 0b000_011_110, Color::rgb(0, 240, 0)),
            PieceKind::Z => Preset::new(self, 3, 0b000_110_011, Color::rgb(240, 0, 0)),
            PieceKind::J => Preset::new(self, 3, 0b000_111_001, Color::rgb(0, 0, 240)),
            PieceKind::L => Preset::new(self, 3, 0b000_111_100, Color::rgb(240, 160, 0)),
        }
    }
}

/// A spawnable shape: lattice size, mask and display color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub kind: PieceKind,
    pub size: u8,
    pub mask: u64,
    pub color: Color,
}

impl Preset {
    const fn new(kind: PieceKind, size: u8, mask: u64, color: Color) -> Self {
        Self {
            kind,
            size,
            mask,
            color,
        }
    }
}
