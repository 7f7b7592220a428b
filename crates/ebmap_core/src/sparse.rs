//! Sparse per-bisector placement grids
//!
//! NPC and trigger placements are persisted as a two-level mapping:
//! bisector row (0-39) -> bisector column (0-31) -> list of records, or
//! `null` for an empty cell. Records carry offsets relative to the top-left
//! of their cell, in a per-table unit. Every row and column key is always
//! written.

use crate::coords::{Coord, Scale, MAP_HEIGHT, MAP_WIDTH};
use crate::error::{CoreError, FormatError};
use std::collections::BTreeMap;

/// Bisector columns in a grid
pub const BISECTOR_COLUMNS: usize = 32;
/// Bisector rows in a grid
pub const BISECTOR_ROWS: usize = 40;

/// Persisted placement grid
pub type SparseGrid<R> = BTreeMap<usize, BTreeMap<usize, Option<Vec<R>>>>;

/// A placement record with an offset inside its bisector cell
pub trait CellRecord {
    /// Offset in record units
    fn offset(&self) -> (i32, i32);
}

/// A grid with every cell present and empty
pub fn empty_grid<R>() -> SparseGrid<R> {
    (0..BISECTOR_ROWS)
        .map(|y| (y, (0..BISECTOR_COLUMNS).map(|x| (x, None)).collect()))
        .collect()
}

/// Absolute pixel coordinate of every record, in row, column, list order.
/// `unit` is the pixel size of one offset step.
pub fn decode<R: CellRecord>(
    grid: &SparseGrid<R>,
    unit: i32,
) -> Result<Vec<(Coord, &R)>, FormatError> {
    let mut placements = Vec::new();
    for (&y, row) in grid {
        if y >= BISECTOR_ROWS {
            return Err(FormatError::Invalid(format!("bisector row {} out of range", y)));
        }
        for (&x, cell) in row {
            if x >= BISECTOR_COLUMNS {
                return Err(FormatError::Invalid(format!(
                    "bisector column {} out of range",
                    x
                )));
            }
            let origin = Coord::from_bisector(x as i32, y as i32);
            for record in cell.iter().flatten() {
                let (dx, dy) = record.offset();
                let offset = Coord::new(dx.saturating_mul(unit), dy.saturating_mul(unit));
                if !(0..Scale::Bisector.x_factor()).contains(&offset.x)
                    || !(0..Scale::Bisector.y_factor()).contains(&offset.y)
                {
                    return Err(FormatError::Invalid(format!(
                        "offset ({}, {}) leaves bisector cell ({}, {})",
                        dx, dy, x, y
                    )));
                }
                placements.push((origin + offset, record));
            }
        }
    }
    Ok(placements)
}

/// Bisector cell and in-cell offset (in `unit`s) of a pixel coordinate
pub fn split(coord: Coord, unit: i32) -> Result<((usize, usize), (i32, i32)), CoreError> {
    let cell = coord.to_scale(Scale::Bisector);
    if coord.x < 0 || cell.x as usize >= BISECTOR_COLUMNS {
        return Err(CoreError::out_of_range("x", coord.x, MAP_WIDTH - 1));
    }
    if coord.y < 0 || cell.y as usize >= BISECTOR_ROWS {
        return Err(CoreError::out_of_range("y", coord.y, MAP_HEIGHT - 1));
    }
    let offset = coord - Coord::from_bisector(cell.x, cell.y);
    Ok((
        (cell.x as usize, cell.y as usize),
        (offset.x / unit, offset.y / unit),
    ))
}

/// Build a fully enumerated grid. `record` receives each item and its
/// in-cell offset in `unit`s.
pub fn encode<T, R>(
    items: &[T],
    unit: i32,
    coord_of: impl Fn(&T) -> Coord,
    record: impl Fn(&T, (i32, i32)) -> R,
) -> Result<SparseGrid<R>, CoreError> {
    let mut grid = empty_grid();
    for item in items {
        let ((x, y), offset) = split(coord_of(item), unit)?;
        let cell = grid
            .get_mut(&y)
            .and_then(|row| row.get_mut(&x))
            .ok_or_else(|| {
                CoreError::out_of_range(
                    "bisector",
                    (y * BISECTOR_COLUMNS + x) as i64,
                    (BISECTOR_ROWS * BISECTOR_COLUMNS) as i64 - 1,
                )
            })?;
        cell.get_or_insert_with(Vec::new).push(record(item, offset));
    }
    Ok(grid)
}
