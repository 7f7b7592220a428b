//! Tile arrangements: 4x4 minitile placements with collision
//!
//! Each placement is a packed 16-bit word:
//!
//! | bits  | meaning                          |
//! |-------|----------------------------------|
//! | 0-9   | minitile ID                      |
//! | 10-12 | subpalette + 2                   |
//! | 13    | priority, always written as 0    |
//! | 14    | horizontal flip                  |
//! | 15    | vertical flip                    |

use super::palette::PALETTE_SUBPALETTES;
use crate::error::CoreError;

/// Placements per tile (4x4 minitiles)
pub const TILE_PLACEMENTS: usize = 16;
/// Tile width and height in minitiles
pub const TILE_MINITILES_WIDE: usize = 4;

pub const MINITILE_MASK: u16 = 0x03FF;
pub const SUBPALETTE_MASK: u16 = 0x1C00;
pub const SUBPALETTE_SHIFT: u16 = 10;
pub const PRIORITY_BIT: u16 = 0x2000;
pub const HFLIP_BIT: u16 = 0x4000;
pub const VFLIP_BIT: u16 = 0x8000;

/// Offset between the stored subpalette field and the subpalette index
pub const SUBPALETTE_BIAS: i32 = 2;

/// Extract the minitile ID from a metadata word
#[inline]
pub fn metadata_minitile(word: u16) -> u16 {
    word & MINITILE_MASK
}

/// Extract the subpalette index. Negative results mean the word is invalid.
#[inline]
pub fn metadata_subpalette(word: u16) -> i32 {
    ((word & SUBPALETTE_MASK) >> SUBPALETTE_SHIFT) as i32 - SUBPALETTE_BIAS
}

#[inline]
pub fn metadata_hflip(word: u16) -> bool {
    word & HFLIP_BIT != 0
}

#[inline]
pub fn metadata_vflip(word: u16) -> bool {
    word & VFLIP_BIT != 0
}

/// Pack a metadata word from its raw fields. `subpalette_field` is the stored
/// value (subpalette + 2). The priority bit is always cleared.
#[inline]
pub fn pack_metadata(minitile: u16, subpalette_field: u16, hflip: bool, vflip: bool) -> u16 {
    let mut word = (minitile & MINITILE_MASK) | ((subpalette_field << SUBPALETTE_SHIFT) & SUBPALETTE_MASK);
    if hflip {
        word |= HFLIP_BIT;
    }
    if vflip {
        word |= VFLIP_BIT;
    }
    word
}

/// A tile arrangement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tile {
    pub metadata: [u16; TILE_PLACEMENTS],
    pub collision: [u8; TILE_PLACEMENTS],
}

impl Tile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn minitile(&self, index: usize) -> u16 {
        metadata_minitile(self.metadata[index])
    }

    pub fn set_minitile(&mut self, index: usize, minitile: u16) {
        let word = self.metadata[index];
        self.metadata[index] = ((word & !MINITILE_MASK) | (minitile & MINITILE_MASK)) & !PRIORITY_BIT;
    }

    /// Subpalette used by a placement; negative values are invalid
    pub fn minitile_subpalette(&self, index: usize) -> i32 {
        metadata_subpalette(self.metadata[index])
    }

    /// Store a subpalette index (0-5)
    pub fn set_minitile_subpalette(
        &mut self,
        index: usize,
        subpalette: i32,
    ) -> Result<(), CoreError> {
        if !(0..PALETTE_SUBPALETTES as i32).contains(&subpalette) {
            return Err(CoreError::out_of_range(
                "subpalette",
                subpalette,
                PALETTE_SUBPALETTES as i64 - 1,
            ));
        }
        let field = (subpalette + SUBPALETTE_BIAS) as u16;
        let word = self.metadata[index];
        self.metadata[index] =
            ((word & !SUBPALETTE_MASK) | (field << SUBPALETTE_SHIFT)) & !PRIORITY_BIT;
        Ok(())
    }

    pub fn minitile_hflip(&self, index: usize) -> bool {
        metadata_hflip(self.metadata[index])
    }

    pub fn set_minitile_hflip(&mut self, index: usize, flip: bool) {
        let word = self.metadata[index] & !PRIORITY_BIT;
        self.metadata[index] = if flip { word | HFLIP_BIT } else { word & !HFLIP_BIT };
    }

    pub fn minitile_vflip(&self, index: usize) -> bool {
        metadata_vflip(self.metadata[index])
    }

    pub fn set_minitile_vflip(&mut self, index: usize, flip: bool) {
        let word = self.metadata[index] & !PRIORITY_BIT;
        self.metadata[index] = if flip { word | VFLIP_BIT } else { word & !VFLIP_BIT };
    }

    pub fn minitile_collision(&self, index: usize) -> u8 {
        self.collision[index]
    }

    pub fn set_minitile_collision(&mut self, index: usize, collision: u8) {
        self.collision[index] = collision;
    }

    /// Replace the whole metadata word of a placement (priority bit cleared)
    pub fn set_metadata(&mut self, index: usize, word: u16) {
        self.metadata[index] = word & !PRIORITY_BIT;
    }

    /// Whether any placement refers to `minitile`
    pub fn uses_minitile(&self, minitile: u16) -> bool {
        self.metadata
            .iter()
            .any(|&word| metadata_minitile(word) == minitile)
    }
}
