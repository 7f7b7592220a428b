//! `.fts` tileset text format
//!
//! Layout, by line:
//!
//! 1. 512 minitiles, three lines each: background row (64 hex digits),
//!    foreground row (64 hex digits), blank line.
//! 2. One blank line. Palettes therefore start at line 1537.
//! 3. Palette lines, 290 base-32 digits each: group ID, palette ID, then
//!    6 subpalettes x 16 colours x (R, G, B). Ends at the first blank line.
//! 4. A second blank line, then tile lines: 16 placements x (4 hex digits of
//!    metadata + 2 hex digits of collision) = 96 hex digits.
//!
//! The encoder always writes 1024 tile lines, padding with all-zero lines,
//! and sorts palettes by (group, palette) so they re-group on reload.

use super::digits::{combine, parse_line, push_number};
use super::{
    FullTileset, Minitile, Palette, Tile, MAX_TILES, MINITILE_COUNT, MINITILE_PIXELS,
    PALETTE_COLOUR_CHARS, TILE_LINES, TILE_PLACEMENTS,
};
use crate::error::{CoreError, DigitBase, FormatError};
use tracing::debug;

/// Hex digits per minitile layer line
pub const MINITILE_LINE_CHARS: usize = MINITILE_PIXELS;
/// First line of the palette section
pub const PALETTE_OFFSET: usize = MINITILE_COUNT * 3 + 1;
/// Base-32 digits per palette line
pub const PALETTE_LINE_CHARS: usize = 2 + PALETTE_COLOUR_CHARS;
/// Hex digits per tile line
pub const TILE_LINE_CHARS: usize = TILE_PLACEMENTS * 6;

/// Decode a `.fts` file
pub fn decode(text: &str, id: u8) -> Result<FullTileset, FormatError> {
    let lines: Vec<&str> = text.lines().collect();
    let line_at = |n: usize, what: &'static str| {
        lines
            .get(n)
            .copied()
            .ok_or(FormatError::UnexpectedEof { line: n, what })
    };
    // Separators may be cut off by the end of the file, never replaced
    let expect_blank = |n: usize| match lines.get(n) {
        Some(line) if !line.trim().is_empty() => Err(FormatError::ExpectedBlank { line: n }),
        _ => Ok(()),
    };

    let mut minitiles = Vec::with_capacity(MINITILE_COUNT);
    for i in 0..MINITILE_COUNT {
        let bg_line = i * 3;
        let fg_line = bg_line + 1;
        let background = parse_line(
            line_at(bg_line, "minitile background")?,
            bg_line,
            DigitBase::Hex,
            MINITILE_LINE_CHARS,
        )?;
        let foreground = parse_line(
            line_at(fg_line, "minitile foreground")?,
            fg_line,
            DigitBase::Hex,
            MINITILE_LINE_CHARS,
        )?;
        minitiles.push(Minitile::from_layers(&background, &foreground));
        expect_blank(bg_line + 2)?;
    }
    expect_blank(PALETTE_OFFSET - 1)?;

    if lines.len() < PALETTE_OFFSET {
        return Err(FormatError::UnexpectedEof {
            line: lines.len(),
            what: "palette section",
        });
    }

    let mut palettes = Vec::new();
    let mut n = PALETTE_OFFSET;
    while n < lines.len() && !lines[n].trim().is_empty() {
        let digits = parse_line(lines[n], n, DigitBase::Base32, PALETTE_LINE_CHARS)?;
        palettes.push(Palette::from_digits(digits[0], digits[1], &digits[2..]));
        n += 1;
    }

    // The blank line that closed the palettes is followed by one more.
    expect_blank(n + 1)?;
    let tile_offset = n + 2;
    let mut tiles = Vec::new();
    for k in 0..MAX_TILES {
        let ln = tile_offset + k;
        let Some(line) = lines.get(ln) else {
            break;
        };
        if line.trim().is_empty() {
            break;
        }
        let digits = parse_line(line, ln, DigitBase::Hex, TILE_LINE_CHARS)?;
        tiles.push(decode_tile(&digits));
    }

    let mut tileset = FullTileset::from_parts(id, minitiles, palettes, tiles)
        .map_err(|e| FormatError::Invalid(e.to_string()))?;
    tileset.tile_offset = Some(tile_offset);
    debug!(
        "decoded tileset {}: {} palettes in {} groups, tile data at line {}",
        id,
        tileset.palettes().len(),
        tileset.palette_groups().len(),
        tile_offset
    );
    Ok(tileset)
}

fn decode_tile(digits: &[u8]) -> Tile {
    let mut tile = Tile::new();
    for (i, chunk) in digits.chunks_exact(6).enumerate() {
        tile.metadata[i] = combine(&chunk[..4], DigitBase::Hex) as u16;
        tile.collision[i] = combine(&chunk[4..], DigitBase::Hex) as u8;
    }
    tile
}

/// Encode a tileset as `.fts` text. Fails when a palette key does not fit
/// its single digit.
pub fn encode(tileset: &FullTileset) -> Result<String, CoreError> {
    for palette in tileset.palettes() {
        palette.check_key()?;
    }
    let mut out = String::with_capacity(
        MINITILE_COUNT * (MINITILE_LINE_CHARS * 2 + 3)
            + tileset.palettes().len() * (PALETTE_LINE_CHARS + 1)
            + TILE_LINES * (TILE_LINE_CHARS + 1)
            + 4,
    );

    for minitile in &tileset.minitiles {
        write_minitile_row(&mut out, &minitile.background);
        write_minitile_row(&mut out, &minitile.foreground);
        out.push('\n');
    }
    out.push('\n');

    let mut palettes: Vec<&Palette> = tileset.palettes().iter().collect();
    palettes.sort_by_key(|p| p.key());
    for palette in palettes {
        push_number(&mut out, palette.group as u32, 1, DigitBase::Base32);
        push_number(&mut out, palette.id as u32, 1, DigitBase::Base32);
        out.push_str(&palette.colour_digits());
        out.push('\n');
    }
    out.push('\n');
    out.push('\n');

    let filler = "0".repeat(TILE_LINE_CHARS);
    for i in 0..TILE_LINES {
        match tileset.tiles.get(i).filter(|_| i < MAX_TILES) {
            Some(tile) => {
                for (word, collision) in tile.metadata.iter().zip(&tile.collision) {
                    push_number(&mut out, *word as u32, 4, DigitBase::Hex);
                    push_number(&mut out, *collision as u32, 2, DigitBase::Hex);
                }
            }
            None => out.push_str(&filler),
        }
        out.push('\n');
    }
    Ok(out)
}

fn write_minitile_row(out: &mut String, pixels: &[u8]) {
    for &p in pixels {
        push_number(out, p as u32, 1, DigitBase::Hex);
    }
    out.push('\n');
}
