//! Edits to the ID-indexed tables: warps, teleports, hotspots and enemy map
//! groups
//!
//! The tables have a fixed length once loaded, so the only edit is replacing
//! an entry.

use super::{same_kind, Change, Command, CommandKind};
use crate::error::CommandError;
use crate::project::ProjectData;
use ebmap_core::{EnemyMapGroup, Hotspot, Teleport, Warp};
use std::any::Any;
use std::fmt::Debug;

/// A record type stored in one of the dense project tables
pub trait TableEntry: Clone + PartialEq + Debug + Send + Sync + 'static {
    const KIND: CommandKind;
    /// Entity name for descriptions and errors
    const NAME: &'static str;

    fn table(project: &mut ProjectData) -> &mut Vec<Self>;

    fn change(id: usize) -> Change;
}

impl TableEntry for Warp {
    const KIND: CommandKind = CommandKind::EditWarp;
    const NAME: &'static str = "warp";

    fn table(project: &mut ProjectData) -> &mut Vec<Self> {
        &mut project.warps
    }

    fn change(id: usize) -> Change {
        Change::Warp(id)
    }
}

impl TableEntry for Teleport {
    const KIND: CommandKind = CommandKind::EditTeleport;
    const NAME: &'static str = "teleport";

    fn table(project: &mut ProjectData) -> &mut Vec<Self> {
        &mut project.teleports
    }

    fn change(id: usize) -> Change {
        Change::Teleport(id)
    }
}

impl TableEntry for Hotspot {
    const KIND: CommandKind = CommandKind::EditHotspot;
    const NAME: &'static str = "hotspot";

    fn table(project: &mut ProjectData) -> &mut Vec<Self> {
        &mut project.hotspots
    }

    fn change(id: usize) -> Change {
        Change::Hotspot(id)
    }
}

impl TableEntry for EnemyMapGroup {
    const KIND: CommandKind = CommandKind::EditEnemyMapGroup;
    const NAME: &'static str = "enemy map group";

    fn table(project: &mut ProjectData) -> &mut Vec<Self> {
        &mut project.enemy_map_groups
    }

    fn change(id: usize) -> Change {
        Change::EnemyMapGroup(id)
    }
}

/// Replace table entry `id`. Consecutive edits of the same entry merge.
#[derive(Debug)]
pub struct EditEntry<T: TableEntry> {
    id: usize,
    after: T,
    before: Option<T>,
}

pub type EditWarp = EditEntry<Warp>;
pub type EditTeleport = EditEntry<Teleport>;
pub type EditHotspot = EditEntry<Hotspot>;
pub type EditEnemyMapGroup = EditEntry<EnemyMapGroup>;

impl<T: TableEntry> EditEntry<T> {
    pub fn new(id: usize, entry: T) -> Self {
        Self {
            id,
            after: entry,
            before: None,
        }
    }

    fn swap_in(&self, project: &mut ProjectData, entry: T) -> Result<T, CommandError> {
        let slot = T::table(project)
            .get_mut(self.id)
            .ok_or_else(|| CommandError::unknown(T::NAME, self.id))?;
        let old = std::mem::replace(slot, entry);
        project.mark_dirty();
        Ok(old)
    }
}

impl<T: TableEntry> Command for EditEntry<T> {
    fn kind(&self) -> CommandKind {
        T::KIND
    }

    fn description(&self) -> String {
        format!("Edit {} {}", T::NAME, self.id)
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let old = self.swap_in(project, self.after.clone())?;
        self.before.get_or_insert(old);
        Ok(vec![T::change(self.id)])
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let before = self
            .before
            .clone()
            .ok_or_else(|| CommandError::unknown(T::NAME, self.id))?;
        self.swap_in(project, before)?;
        Ok(vec![T::change(self.id)])
    }

    fn can_merge(&self, other: &dyn Command) -> bool {
        same_kind(self, other)
            .is_some_and(|o| o.id == self.id && o.before.as_ref() == Some(&self.after))
    }

    fn merge(&mut self, other: &dyn Command) {
        if let Some(other) = same_kind(self, other) {
            self.after = other.after.clone();
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
    use ebmap_core::Coord;
    use image::Rgb;

    #[test]
    fn test_edit_warp_and_revert() {
        let mut project = test_support::project();
        let warp = Warp {
            dest: Coord::from_warp(120, 44),
            direction: 2,
            ..Default::default()
        };
        let mut edit = EditWarp::new(2, warp.clone());
        assert_eq!(edit.apply(&mut project).unwrap(), vec![Change::Warp(2)]);
        assert_eq!(project.warp(2), Some(&warp));
        edit.revert(&mut project).unwrap();
        assert_eq!(project.warp(2), Some(&Warp::default()));
    }

    #[test]
    fn test_out_of_range_id() {
        let mut project = test_support::project();
        let mut edit = EditTeleport::new(2, Teleport::default());
        assert_eq!(
            edit.apply(&mut project),
            Err(CommandError::unknown("teleport", 2))
        );
    }

    #[test]
    fn test_hotspot_edits_merge_per_entry() {
        let mut project = test_support::project();
        let original = project.hotspot(0).cloned().unwrap();
        let resized = |end: i32| Hotspot {
            start: Coord::new(8, 8),
            end: Coord::new(end, end),
            colour: Rgb([255, 0, 0]),
            comment: "shop".to_string(),
        };
        let mut first = EditHotspot::new(0, resized(64));
        first.apply(&mut project).unwrap();
        let mut second = EditHotspot::new(0, resized(128));
        second.apply(&mut project).unwrap();
        assert!(first.try_merge(&second));

        let mut other = EditHotspot::new(1, resized(128));
        other.apply(&mut project).unwrap();
        assert!(!first.try_merge(&other));

        // Different table, never merges
        let mut group = EditEnemyMapGroup::new(0, EnemyMapGroup::default());
        group.apply(&mut project).unwrap();
        assert!(!first.try_merge(&group));

        first.revert(&mut project).unwrap();
        assert_eq!(project.hotspot(0), Some(&original));
    }
}
