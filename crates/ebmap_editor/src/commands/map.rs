//! Map tile placement

use super::{same_kind, Change, Command, CommandKind};
use crate::error::CommandError;
use crate::project::ProjectData;
use ebmap_core::{CoreError, MAP_TILES_HIGH, MAP_TILES_WIDE, MAX_TILES};
use std::any::Any;

/// Place tile arrangements on map cells, `((x, y), tile)` in tile units
#[derive(Debug)]
pub struct PlaceMapTiles {
    placements: Vec<((usize, usize), u16)>,
    before: Option<Vec<u16>>,
}

impl PlaceMapTiles {
    pub fn new(placements: Vec<((usize, usize), u16)>) -> Self {
        Self {
            placements,
            before: None,
        }
    }

    fn validate(&self) -> Result<(), CoreError> {
        for &((x, y), tile) in &self.placements {
            if x >= MAP_TILES_WIDE {
                let max = MAP_TILES_WIDE as i64 - 1;
                return Err(CoreError::out_of_range("tile column", x as i64, max));
            }
            if y >= MAP_TILES_HIGH {
                let max = MAP_TILES_HIGH as i64 - 1;
                return Err(CoreError::out_of_range("tile row", y as i64, max));
            }
            if tile as usize >= MAX_TILES {
                return Err(CoreError::out_of_range("tile", tile, MAX_TILES as i64 - 1));
            }
        }
        Ok(())
    }

    fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.placements.iter().map(|&(cell, _)| cell)
    }
}

impl Command for PlaceMapTiles {
    fn kind(&self) -> CommandKind {
        CommandKind::MapTiles
    }

    fn description(&self) -> String {
        match self.placements.len() {
            1 => "Place tile".to_string(),
            n => format!("Place {} tiles", n),
        }
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        self.validate()?;
        let mut before = Vec::with_capacity(self.placements.len());
        for &((x, y), tile) in &self.placements {
            before.push(project.map_tiles.set_tile(x, y, tile)?);
        }
        self.before.get_or_insert(before);
        project.mark_dirty();
        Ok(vec![Change::MapTiles])
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let before = self
            .before
            .as_ref()
            .ok_or_else(|| CommandError::unknown("map tile placement", "before apply"))?;
        // Reverse order so a cell listed twice ends on its first value
        for (&((x, y), _), &tile) in self.placements.iter().zip(before).rev() {
            project.map_tiles.set_tile(x, y, tile)?;
        }
        project.mark_dirty();
        Ok(vec![Change::MapTiles])
    }

    /// Re-placing the same cells merges, so cycling through tiles on one
    /// selection undoes in one step
    fn can_merge(&self, other: &dyn Command) -> bool {
        let Some(other) = same_kind(self, other) else {
            return false;
        };
        let after: Vec<u16> = self.placements.iter().map(|&(_, tile)| tile).collect();
        self.cells().eq(other.cells()) && other.before.as_ref() == Some(&after)
    }

    fn merge(&mut self, other: &dyn Command) {
        if let Some(other) = same_kind(self, other) {
            self.placements = other.placements.clone();
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;

    #[test]
    fn test_place_and_revert() {
        let mut project = test_support::project();
        project.map_tiles.set_tile(3, 3, 12).unwrap();
        let mut place = PlaceMapTiles::new(vec![((3, 3), 100), ((4, 3), 959)]);
        place.apply(&mut project).unwrap();
        assert_eq!(project.map_tiles.at(3, 3).tile, 100);
        assert_eq!(project.map_tiles.at(4, 3).tile, 959);
        place.revert(&mut project).unwrap();
        assert_eq!(project.map_tiles.at(3, 3).tile, 12);
        assert_eq!(project.map_tiles.at(4, 3).tile, 0);
    }

    #[test]
    fn test_invalid_placement_changes_nothing() {
        let mut project = test_support::project();
        let mut place = PlaceMapTiles::new(vec![((0, 0), 5), ((1, 0), 960)]);
        assert!(place.apply(&mut project).is_err());
        assert_eq!(project.map_tiles.at(0, 0).tile, 0);

        let mut off_map = PlaceMapTiles::new(vec![((0, MAP_TILES_HIGH), 5)]);
        assert!(off_map.apply(&mut project).is_err());
        assert!(!project.is_dirty());
    }

    #[test]
    fn test_repeated_cell_reverts_to_first_value() {
        let mut project = test_support::project();
        let mut place = PlaceMapTiles::new(vec![((2, 2), 7), ((2, 2), 8)]);
        place.apply(&mut project).unwrap();
        assert_eq!(project.map_tiles.at(2, 2).tile, 8);
        place.revert(&mut project).unwrap();
        assert_eq!(project.map_tiles.at(2, 2).tile, 0);
    }

    #[test]
    fn test_same_selection_merges() {
        let mut project = test_support::project();
        let mut first = PlaceMapTiles::new(vec![((1, 1), 1)]);
        first.apply(&mut project).unwrap();
        let mut second = PlaceMapTiles::new(vec![((1, 1), 2)]);
        second.apply(&mut project).unwrap();
        assert!(first.try_merge(&second));
        let mut other_cell = PlaceMapTiles::new(vec![((1, 2), 2)]);
        other_cell.apply(&mut project).unwrap();
        assert!(!first.try_merge(&other_cell));
        first.revert(&mut project).unwrap();
        assert_eq!(project.map_tiles.at(1, 1).tile, 0);
    }
}
