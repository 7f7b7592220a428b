//! Palette settings chain edits

use super::{same_kind, Change, Command, CommandKind};
use crate::error::CommandError;
use crate::project::ProjectData;
use ebmap_core::PaletteSettings;
use std::any::Any;
use tracing::warn;

/// Replace the whole settings chain of one (palette group, palette) pair.
/// `None` removes the chain.
///
/// Chains ending on a flagged node are accepted with a warning; the game
/// falls back to the tileset palette there.
#[derive(Debug)]
pub struct SetPaletteSettings {
    palette_group: u8,
    palette: u8,
    after: Option<PaletteSettings>,
    before: Option<Option<PaletteSettings>>,
}

impl SetPaletteSettings {
    pub fn new(palette_group: u8, palette: u8, settings: Option<PaletteSettings>) -> Self {
        Self {
            palette_group,
            palette,
            after: settings,
            before: None,
        }
    }

    fn store(
        &self,
        project: &mut ProjectData,
        settings: Option<PaletteSettings>,
    ) -> Option<PaletteSettings> {
        let (group, palette) = (self.palette_group, self.palette);
        project.mark_dirty();
        match settings {
            Some(settings) => project.palette_settings.insert(group, palette, settings),
            None => project.palette_settings.remove(group, palette),
        }
    }

    fn change(&self) -> Change {
        Change::PaletteSettings {
            group: self.palette_group,
            palette: self.palette,
        }
    }
}

impl Command for SetPaletteSettings {
    fn kind(&self) -> CommandKind {
        CommandKind::PaletteSettings
    }

    fn description(&self) -> String {
        format!(
            "Edit event palettes of {}/{}",
            self.palette_group, self.palette
        )
    }

    fn apply(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        if let Some(settings) = &self.after {
            for depth in settings.incomplete_nodes() {
                warn!(
                    "palette {}/{}: event palette at depth {} has a flag but no fallback",
                    self.palette_group, self.palette, depth
                );
            }
        }
        let old = self.store(project, self.after.clone());
        self.before.get_or_insert(old);
        Ok(vec![self.change()])
    }

    fn revert(&mut self, project: &mut ProjectData) -> Result<Vec<Change>, CommandError> {
        let before = self.before.clone().ok_or_else(|| {
            CommandError::unknown(
                "palette settings",
                format!("{}/{}", self.palette_group, self.palette),
            )
        })?;
        self.store(project, before);
        Ok(vec![self.change()])
    }

    fn can_merge(&self, other: &dyn Command) -> bool {
        same_kind(self, other).is_some_and(|o| {
            (o.palette_group, o.palette) == (self.palette_group, self.palette)
                && o.before.as_ref() == Some(&self.after)
        })
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
    use ebmap_core::Palette;

    fn chain(flag: u16) -> PaletteSettings {
        let mut root = PaletteSettings::new(flag, 0, 3);
        root.add_child(Palette::new(0, 0));
        root
    }

    #[test]
    fn test_set_and_remove_chain() {
        let mut project = test_support::project();
        let mut set = SetPaletteSettings::new(0, 1, Some(chain(0x10)));
        set.apply(&mut project).unwrap();
        assert_eq!(project.palette_settings.get(0, 1).unwrap().depth(), 2);

        let mut remove = SetPaletteSettings::new(0, 1, None);
        remove.apply(&mut project).unwrap();
        assert!(project.palette_settings.get(0, 1).is_none());
        remove.revert(&mut project).unwrap();
        assert_eq!(project.palette_settings.get(0, 1), Some(&chain(0x10)));

        set.revert(&mut project).unwrap();
        assert!(project.palette_settings.is_empty());
    }

    #[test]
    fn test_incomplete_chain_is_accepted() {
        let mut project = test_support::project();
        let mut root = PaletteSettings::new(0, 0, 0);
        root.add_child(Palette::new(0, 0)).flag = 0x20;
        assert!(!root.is_complete());
        let mut set = SetPaletteSettings::new(0, 0, Some(root));
        set.apply(&mut project).unwrap();
        assert_eq!(project.palette_settings.warnings().len(), 1);
    }

    #[test]
    fn test_consecutive_edits_merge() {
        let mut project = test_support::project();
        let mut first = SetPaletteSettings::new(0, 0, Some(chain(1)));
        first.apply(&mut project).unwrap();
        let mut second = SetPaletteSettings::new(0, 0, Some(chain(2)));
        second.apply(&mut project).unwrap();
        assert!(first.try_merge(&second));
        let mut other = SetPaletteSettings::new(0, 1, Some(chain(2)));
        other.apply(&mut project).unwrap();
        assert!(!first.try_merge(&other));
    }
}
