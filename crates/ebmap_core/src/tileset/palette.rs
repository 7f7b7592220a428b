//! Subpalettes, palettes and palette groups
//!
//! Colours are held at 8 bits per channel but persisted with 5 bits per
//! channel (one base-32 digit each), so values that are not multiples of 8
//! lose their low 3 bits on save.

use super::digits::digit_char;
use crate::error::{CoreError, DigitBase, FormatError};
use image::Rgba;
use std::ops::Range;

/// Colours per subpalette
pub const SUBPALETTE_COLOURS: usize = 16;
/// Subpalettes per palette
pub const PALETTE_SUBPALETTES: usize = 6;
/// Base-32 characters in one persisted subpalette (16 colours x RGB)
pub const SUBPALETTE_CHARS: usize = SUBPALETTE_COLOURS * 3;
/// Base-32 characters in one persisted palette, without its ID prefix
pub const PALETTE_COLOUR_CHARS: usize = SUBPALETTE_CHARS * PALETTE_SUBPALETTES;

/// Largest group or palette ID a single base-32 digit can hold
pub const MAX_PALETTE_KEY: u8 = 31;

/// Drop a channel to 5-bit precision
#[inline]
pub fn channel_to_5bit(value: u8) -> u8 {
    value >> 3
}

/// Expand a 5-bit channel back to 8 bits
#[inline]
pub fn channel_from_5bit(value: u8) -> u8 {
    (value & 0x1F) << 3
}

/// 16 RGBA colours. Entry 0 is the transparent key and always has alpha 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subpalette {
    colours: [Rgba<u8>; SUBPALETTE_COLOURS],
}

impl Default for Subpalette {
    fn default() -> Self {
        let mut colours = [Rgba([0, 0, 0, 255]); SUBPALETTE_COLOURS];
        colours[0] = Rgba([0, 0, 0, 0]);
        Self { colours }
    }
}

impl Subpalette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn colour(&self, index: usize) -> Rgba<u8> {
        self.colours[index]
    }

    pub fn colours(&self) -> &[Rgba<u8>; SUBPALETTE_COLOURS] {
        &self.colours
    }

    /// Set an entry from RGB. Alpha is derived from the slot.
    pub fn set_colour(&mut self, index: usize, rgb: [u8; 3]) {
        let alpha = if index == 0 { 0 } else { 255 };
        self.colours[index] = Rgba([rgb[0], rgb[1], rgb[2], alpha]);
    }

    /// Entry as drawn on a backdrop, where the key colour is opaque
    pub fn backdrop_colour(&self, index: usize) -> Rgba<u8> {
        let Rgba([r, g, b, _]) = self.colours[index];
        Rgba([r, g, b, 255])
    }

    /// Build from 48 base-32 digit values (R, G, B per colour)
    pub fn from_digits(digits: &[u8]) -> Self {
        debug_assert_eq!(digits.len(), SUBPALETTE_CHARS);
        let mut subpalette = Subpalette::default();
        for (i, rgb) in digits.chunks_exact(3).enumerate() {
            subpalette.set_colour(
                i,
                [
                    channel_from_5bit(rgb[0]),
                    channel_from_5bit(rgb[1]),
                    channel_from_5bit(rgb[2]),
                ],
            );
        }
        subpalette
    }

    /// Append this subpalette as 48 base-32 characters
    pub fn write_digits(&self, out: &mut String) {
        for Rgba([r, g, b, _]) in &self.colours {
            for channel in [*r, *g, *b] {
                out.push(digit_char(channel_to_5bit(channel), DigitBase::Base32));
            }
        }
    }

    /// Encode as a standalone 48-character string
    pub fn to_digit_string(&self) -> String {
        let mut out = String::with_capacity(SUBPALETTE_CHARS);
        self.write_digits(&mut out);
        out
    }

    /// Decode a standalone 48-character string
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        let digits = super::digits::parse_line(text, 0, DigitBase::Base32, SUBPALETTE_CHARS)?;
        Ok(Self::from_digits(&digits))
    }
}

/// Six subpalettes identified by (group, palette)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub group: u8,
    pub id: u8,
    pub subpalettes: [Subpalette; PALETTE_SUBPALETTES],
}

impl Palette {
    pub fn new(group: u8, id: u8) -> Self {
        Self {
            group,
            id,
            subpalettes: [Subpalette::default(); PALETTE_SUBPALETTES],
        }
    }

    /// Group and palette IDs must each fit one base-32 digit
    pub fn check_key(&self) -> Result<(), CoreError> {
        if self.group > MAX_PALETTE_KEY {
            return Err(CoreError::out_of_range("palette group", self.group, MAX_PALETTE_KEY));
        }
        if self.id > MAX_PALETTE_KEY {
            return Err(CoreError::out_of_range("palette", self.id, MAX_PALETTE_KEY));
        }
        Ok(())
    }

    /// Build from 288 base-32 digit values
    pub fn from_digits(group: u8, id: u8, digits: &[u8]) -> Self {
        debug_assert_eq!(digits.len(), PALETTE_COLOUR_CHARS);
        let mut palette = Palette::new(group, id);
        for (slot, chunk) in palette
            .subpalettes
            .iter_mut()
            .zip(digits.chunks_exact(SUBPALETTE_CHARS))
        {
            *slot = Subpalette::from_digits(chunk);
        }
        palette
    }

    /// All 288 colour characters, without the ID prefix
    pub fn colour_digits(&self) -> String {
        let mut out = String::with_capacity(PALETTE_COLOUR_CHARS);
        for subpalette in &self.subpalettes {
            subpalette.write_digits(&mut out);
        }
        out
    }

    /// Subpalette by signed index, as produced by tile metadata
    pub fn subpalette(&self, index: i32) -> Option<&Subpalette> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.subpalettes.get(i))
    }

    /// Sort key used when persisting
    pub fn key(&self) -> (u8, u8) {
        (self.group, self.id)
    }
}

/// Parse one persisted subpalette block string per subpalette
pub fn palette_from_blocks(group: u8, id: u8, blocks: &[String]) -> Result<Palette, FormatError> {
    if blocks.len() != PALETTE_SUBPALETTES {
        return Err(FormatError::Invalid(format!(
            "palette {}/{} needs {} colour blocks, found {}",
            group,
            id,
            PALETTE_SUBPALETTES,
            blocks.len()
        )));
    }
    let mut palette = Palette::new(group, id);
    for (slot, block) in palette.subpalettes.iter_mut().zip(blocks) {
        *slot = Subpalette::parse(block)?;
    }
    Ok(palette)
}

/// One persisted colour block string per subpalette
pub fn palette_to_blocks(palette: &Palette) -> Vec<String> {
    palette
        .subpalettes
        .iter()
        .map(Subpalette::to_digit_string)
        .collect()
}

/// A run of palettes sharing a group ID, as a range into the tileset's list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteGroup {
    pub id: u8,
    pub range: Range<usize>,
}

/// Partition a palette list on contiguous runs of equal group ID.
///
/// The input must already be grouped; a group that appears in two separate
/// runs yields two `PaletteGroup`s.
pub fn partition_groups(palettes: &[Palette]) -> Vec<PaletteGroup> {
    let mut groups: Vec<PaletteGroup> = Vec::new();
    for (index, palette) in palettes.iter().enumerate() {
        match groups.last_mut() {
            Some(group) if group.id == palette.group => group.range.end = index + 1,
            _ => groups.push(PaletteGroup {
                id: palette.group,
                range: index..index + 1,
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_colour_is_transparent() {
        let mut subpalette = Subpalette::new();
        subpalette.set_colour(0, [8, 16, 24]);
        subpalette.set_colour(1, [8, 16, 24]);
        assert_eq!(subpalette.colour(0).0[3], 0);
        assert_eq!(subpalette.colour(1).0[3], 255);
        assert_eq!(subpalette.backdrop_colour(0).0[3], 255);
    }

    #[test]
    fn test_digits_round_trip_loses_low_bits() {
        let mut subpalette = Subpalette::new();
        subpalette.set_colour(3, [255, 9, 16]);
        let text = subpalette.to_digit_string();
        assert_eq!(text.len(), SUBPALETTE_CHARS);

        let decoded = Subpalette::parse(&text).unwrap();
        assert_eq!(decoded.colour(3), Rgba([248, 8, 16, 255]));
    }

    #[test]
    fn test_palette_blocks_round_trip() {
        let mut palette = Palette::new(4, 2);
        palette.subpalettes[5].set_colour(15, [64, 128, 192]);
        let blocks = palette_to_blocks(&palette);
        assert_eq!(blocks.len(), PALETTE_SUBPALETTES);
        assert_eq!(palette_from_blocks(4, 2, &blocks).unwrap(), palette);
        assert!(palette_from_blocks(4, 2, &blocks[..5]).is_err());
    }

    #[test]
    fn test_partition_groups_is_order_dependent() {
        let palettes = vec![
            Palette::new(1, 0),
            Palette::new(1, 1),
            Palette::new(2, 0),
            Palette::new(1, 2),
        ];
        let groups = partition_groups(&palettes);
        assert_eq!(
            groups,
            vec![
                PaletteGroup { id: 1, range: 0..2 },
                PaletteGroup { id: 2, range: 2..3 },
                PaletteGroup { id: 1, range: 3..4 },
            ]
        );
    }
}
