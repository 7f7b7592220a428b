//! Enemy placement painting

use super::{Change, Command, CommandKind};
use crate::error::CommandError;
use crate::project::ProjectData;
use ebmap_core::enemy::{ENEMY_TILES_HIGH, ENEMY_TILES_WIDE};
use ebmap_core::CoreError;
use std::any::Any;

/// Assign enemy map groups to enemy cells, `((x, y), group)` in 64 px units
#[derive(Debug)]
pub struct SetEnemyTiles {
    cells: Vec<((usize, usize), u16)>,
    before: Option<Vec<u16>>,
}

impl SetEnemyTiles {
    pub fn new(cells: Vec<((usize, usize), u16)>) -> Self {
        Self {
            cells,
            before: None,
        }
    }

    fn validate(&self, group_count: usize) -> Result<(), CommandError> {
        for &((x, y), group) in &self.cells {
            if x >= ENEMY_TILES_WIDE || y >= ENEMY_TILES_HIGH {
                let cell = (ENEMY_TILES_HIGH * ENEMY_TILES_WIDE) as i64 - 1;
                let index = (y * ENEMY_TILES_WIDE + x) as i64;
                return Err(CoreError::out_of_range("enemy tile", index, cell).into());
            }
            if group as usize >= group_count {
                return Err(CommandError::unknown("enemy map group", group));
            }
        }
        Ok(())
    }
}

impl Command for SetEnemyTiles {
    fn kind(&self) -> CommandKind {
        CommandKind::EnemyTiles
    }

    fn description(&self) -> String {
        "Paint enemy placement".to_string()
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        self.validate(project.enemy_map_groups.len())?;
        let before = self
            .cells
            .iter()
            .map(|&((x, y), group)| project.enemy_tiles.set(x, y, group))
            .collect();
        self.before.get_or_insert(before);
        project.mark_dirty();
        Ok(vec![Change::EnemyTiles])
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let before = self
            .before
            .as_ref()
            .ok_or_else(|| CommandError::unknown("enemy placement", "before apply"))?;
        for (&((x, y), _), &group) in self.cells.iter().zip(before).rev() {
            project.enemy_tiles.set(x, y, group);
        }
        project.mark_dirty();
        Ok(vec![Change::EnemyTiles])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
