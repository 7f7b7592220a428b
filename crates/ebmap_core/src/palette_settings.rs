//! Palette settings chains ("event palettes")
//!
//! Every (palette group, palette) pair has a chain of conditional overrides.
//! A node is active when its flag is zero or set at runtime; otherwise the
//! lookup falls through to its child. Each child carries the palette shown
//! while it is active. The root uses the tileset's own palette.

use crate::error::FormatError;
use crate::tileset::{palette_from_blocks, palette_to_blocks, Palette};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One node of a palette settings chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteSettings {
    pub flag: u16,
    pub flash_effect: u8,
    pub sprite_palette: u8,
    /// Palette used while this node is active. `None` on the root.
    pub palette: Option<Palette>,
    child: Option<Box<PaletteSettings>>,
}

impl Default for PaletteSettings {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

impl PaletteSettings {
    pub fn new(flag: u16, flash_effect: u8, sprite_palette: u8) -> Self {
        Self {
            flag,
            flash_effect,
            sprite_palette,
            palette: None,
            child: None,
        }
    }

    pub fn child(&self) -> Option<&PaletteSettings> {
        self.child.as_deref()
    }

    pub fn child_mut(&mut self) -> Option<&mut PaletteSettings> {
        self.child.as_deref_mut()
    }

    /// Attach a new terminal child bound to `palette`, replacing any
    /// existing descendants. Returns the new child for further setup.
    pub fn add_child(&mut self, palette: Palette) -> &mut PaletteSettings {
        let mut child = PaletteSettings::new(0, 0, self.sprite_palette);
        child.palette = Some(palette);
        self.child.insert(Box::new(child))
    }

    /// Sever this node's child and every node below it
    pub fn remove_child(&mut self) -> Option<Box<PaletteSettings>> {
        self.child.take()
    }

    /// Nodes from this one down to the end of the chain
    pub fn iter(&self) -> ChainIter<'_> {
        ChainIter { next: Some(self) }
    }

    /// Number of nodes in the chain starting here, at least 1
    pub fn depth(&self) -> usize {
        self.iter().count()
    }

    /// Node the game would use given the runtime flag state
    pub fn active(&self, is_flag_set: impl Fn(u16) -> bool) -> &PaletteSettings {
        let mut node = self;
        loop {
            if node.flag == 0 || is_flag_set(node.flag) {
                return node;
            }
            match node.child() {
                Some(child) => node = child,
                None => return node,
            }
        }
    }

    /// Nodes with a non-zero flag but nothing to fall through to
    pub fn incomplete_nodes(&self) -> Vec<usize> {
        self.iter()
            .enumerate()
            .filter(|(_, node)| node.flag != 0 && node.child.is_none())
            .map(|(depth, _)| depth)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.incomplete_nodes().is_empty()
    }

    /// Build a chain from its persisted record. Nested records must carry colours.
    pub fn from_record(
        record: &PaletteSettingsRecord,
        group: u8,
        palette: u8,
    ) -> Result<Self, FormatError> {
        let mut root = PaletteSettings::new(record.flag, record.flash_effect, record.sprite_palette);
        let mut parent = &mut root;
        let mut source = record.child.as_deref();
        while let Some(rec) = source {
            let blocks = rec.colours.as_ref().ok_or_else(|| {
                FormatError::MissingKey(format!("Colors (event palette of {}/{})", group, palette))
            })?;
            let event_palette = palette_from_blocks(group, palette, blocks)?;
            let child = parent.add_child(event_palette);
            child.flag = rec.flag;
            child.flash_effect = rec.flash_effect;
            child.sprite_palette = rec.sprite_palette;
            parent = child;
            source = rec.child.as_deref();
        }
        Ok(root)
    }

    /// Persisted form, parent to child
    pub fn to_record(&self) -> PaletteSettingsRecord {
        PaletteSettingsRecord {
            flag: self.flag,
            flash_effect: self.flash_effect,
            sprite_palette: self.sprite_palette,
            colours: self.palette.as_ref().map(palette_to_blocks),
            child: self.child().map(|child| Box::new(child.to_record())),
        }
    }
}

pub struct ChainIter<'a> {
    next: Option<&'a PaletteSettings>,
}

impl<'a> Iterator for ChainIter<'a> {
    type Item = &'a PaletteSettings;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.child();
        Some(node)
    }
}

/// Persisted shape of a palette settings node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteSettingsRecord {
    #[serde(rename = "Event Flag", default)]
    pub flag: u16,
    #[serde(rename = "Flash Effect", default)]
    pub flash_effect: u8,
    #[serde(rename = "Sprite Palette", default)]
    pub sprite_palette: u8,
    #[serde(rename = "Colors", default, skip_serializing_if = "Option::is_none")]
    pub colours: Option<Vec<String>>,
    #[serde(
        rename = "Event Palette",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub child: Option<Box<PaletteSettingsRecord>>,
}

/// Persisted table: palette group -> palette -> chain
pub type PaletteSettingsRecords = BTreeMap<u8, BTreeMap<u8, PaletteSettingsRecord>>;

/// All palette settings chains in a project
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaletteSettingsTable {
    entries: BTreeMap<(u8, u8), PaletteSettings>,
}

impl PaletteSettingsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, group: u8, palette: u8) -> Option<&PaletteSettings> {
        self.entries.get(&(group, palette))
    }

    pub fn get_mut(&mut self, group: u8, palette: u8) -> Option<&mut PaletteSettings> {
        self.entries.get_mut(&(group, palette))
    }

    /// Insert or replace a chain, returning the previous one
    pub fn insert(
        &mut self,
        group: u8,
        palette: u8,
        settings: PaletteSettings,
    ) -> Option<PaletteSettings> {
        self.entries.insert((group, palette), settings)
    }

    pub fn remove(&mut self, group: u8, palette: u8) -> Option<PaletteSettings> {
        self.entries.remove(&(group, palette))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(u8, u8), &PaletteSettings)> {
        self.entries.iter()
    }

    /// Human-readable warnings for chains that end on a flagged node.
    /// These never block saving.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for ((group, palette), chain) in &self.entries {
            for depth in chain.incomplete_nodes() {
                warnings.push(format!(
                    "palette {}/{}: event palette at depth {} has a flag but no fallback",
                    group, palette, depth
                ));
            }
        }
        warnings
    }

    pub fn from_records(records: &PaletteSettingsRecords) -> Result<Self, FormatError> {
        let mut table = PaletteSettingsTable::new();
        for (&group, palettes) in records {
            for (&palette, record) in palettes {
                let chain = PaletteSettings::from_record(record, group, palette)?;
                table.insert(group, palette, chain);
            }
        }
        Ok(table)
    }

    pub fn to_records(&self) -> PaletteSettingsRecords {
        let mut records = PaletteSettingsRecords::new();
        for (&(group, palette), chain) in &self.entries {
            records
                .entry(group)
                .or_default()
                .insert(palette, chain.to_record());
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_level_chain() -> PaletteSettings {
        let mut root = PaletteSettings::new(0x10, 0, 4);
        let child = root.add_child(Palette::new(2, 1));
        child.flag = 0x20;
        let grandchild = child.add_child(Palette::new(2, 1));
        grandchild.flash_effect = 3;
        root
    }

    #[test]
    fn test_active_node_falls_through() {
        let chain = three_level_chain();
        assert_eq!(chain.depth(), 3);

        let active = chain.active(|flag| flag == 0x10);
        assert_eq!(active.flag, 0x10);
        assert!(active.palette.is_none());

        let active = chain.active(|flag| flag == 0x20);
        assert_eq!(active.flag, 0x20);

        let active = chain.active(|_| false);
        assert_eq!(active.flag, 0);
        assert_eq!(active.flash_effect, 3);
    }

    #[test]
    fn test_remove_child_collapses_chain() {
        let mut chain = three_level_chain();
        assert!(chain.is_complete());
        let removed = chain.remove_child().unwrap();
        assert_eq!(removed.depth(), 2);
        assert_eq!(chain.depth(), 1);
        // The root still has a flag, so the chain is now incomplete.
        assert_eq!(chain.incomplete_nodes(), vec![0]);
    }

    #[test]
    fn test_single_node_chain_has_depth_one() {
        let node = PaletteSettings::default();
        assert_eq!(node.depth(), 1);
        assert_eq!(node.iter().count(), 1);
        assert!(node.child().is_none());
    }

    #[test]
    fn test_add_child_replaces_descendants() {
        let mut chain = three_level_chain();
        chain.add_child(Palette::new(2, 1));
        assert_eq!(chain.depth(), 2);
    }

    #[test]
    fn test_record_round_trip() {
        let mut chain = three_level_chain();
        chain
            .child_mut()
            .and_then(|c| c.palette.as_mut())
            .unwrap()
            .subpalettes[1]
            .set_colour(2, [8, 16, 24]);

        let record = chain.to_record();
        assert!(record.colours.is_none());
        assert_eq!(record.child.as_ref().unwrap().colours.as_ref().unwrap().len(), 6);

        let rebuilt = PaletteSettings::from_record(&record, 2, 1).unwrap();
        assert_eq!(rebuilt, chain);
    }

    #[test]
    fn test_missing_event_palette_colours_is_format_error() {
        let record = PaletteSettingsRecord {
            flag: 5,
            flash_effect: 0,
            sprite_palette: 0,
            colours: None,
            child: Some(Box::new(PaletteSettingsRecord {
                flag: 0,
                flash_effect: 0,
                sprite_palette: 0,
                colours: None,
                child: None,
            })),
        };
        assert!(matches!(
            PaletteSettings::from_record(&record, 0, 0),
            Err(FormatError::MissingKey(_))
        ));
    }

    #[test]
    fn test_table_yaml_round_trip_and_warnings() {
        let mut table = PaletteSettingsTable::new();
        table.insert(0, 0, PaletteSettings::new(0, 0, 4));
        table.insert(0, 1, PaletteSettings::new(0x99, 0, 4));
        table.insert(3, 2, three_level_chain());

        let yaml = serde_yaml::to_string(&table.to_records()).unwrap();
        let records: PaletteSettingsRecords = serde_yaml::from_str(&yaml).unwrap();
        let reloaded = PaletteSettingsTable::from_records(&records).unwrap();

        // Event palettes take the key of the chain they belong to.
        let mut expected = table.clone();
        let chain = expected.get_mut(3, 2).unwrap();
        chain.child_mut().unwrap().palette = Some(Palette::new(3, 2));
        chain
            .child_mut()
            .unwrap()
            .child_mut()
            .unwrap()
            .palette = Some(Palette::new(3, 2));
        assert_eq!(reloaded, expected);

        let warnings = reloaded.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("0/1"));
    }
}
