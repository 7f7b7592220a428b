//! NPC templates and their placements on the map

use crate::coords::Coord;
use crate::error::{CoreError, FormatError};
use crate::sparse::{self, CellRecord, SparseGrid};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Maximum number of NPC templates
pub const NPC_TABLE_CAPACITY: usize = 1584;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Right,
    #[default]
    Down,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShowSprite {
    #[default]
    #[serde(rename = "always")]
    Always,
    #[serde(rename = "when event flag set")]
    WhenFlagSet,
    #[serde(rename = "when event flag unset")]
    WhenFlagUnset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NpcType {
    #[default]
    #[serde(rename = "person")]
    Person,
    #[serde(rename = "item box")]
    ItemBox,
    #[serde(rename = "object")]
    Object,
}

/// An NPC template: what to draw and how it behaves
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Npc {
    #[serde(rename = "Direction")]
    pub direction: Direction,
    #[serde(rename = "Event Flag")]
    pub event_flag: u16,
    #[serde(rename = "Movement")]
    pub movement: u16,
    #[serde(rename = "Show Sprite")]
    pub show_sprite: ShowSprite,
    #[serde(rename = "Sprite")]
    pub sprite: u16,
    #[serde(rename = "Text Pointer 1")]
    pub text_pointer_1: String,
    #[serde(rename = "Text Pointer 2")]
    pub text_pointer_2: String,
    #[serde(rename = "Type")]
    pub kind: NpcType,
}

/// Table of NPC templates, indexed by NPC ID
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NpcTable {
    npcs: Vec<Npc>,
}

impl NpcTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.npcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.npcs.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.npcs.len() >= NPC_TABLE_CAPACITY
    }

    pub fn get(&self, id: usize) -> Option<&Npc> {
        self.npcs.get(id)
    }

    pub fn get_mut(&mut self, id: usize) -> Option<&mut Npc> {
        self.npcs.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Npc> {
        self.npcs.iter()
    }

    /// Append a template, returning its ID. `None` when the table is full.
    pub fn push(&mut self, npc: Npc) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        self.npcs.push(npc);
        Some(self.npcs.len() - 1)
    }

    /// Remove the last template
    pub fn pop(&mut self) -> Option<Npc> {
        self.npcs.pop()
    }

    pub fn to_records(&self) -> BTreeMap<usize, Npc> {
        self.npcs.iter().cloned().enumerate().collect()
    }

    /// IDs must be contiguous from zero
    pub fn from_records(records: BTreeMap<usize, Npc>) -> Result<Self, FormatError> {
        if records.len() > NPC_TABLE_CAPACITY {
            return Err(FormatError::Invalid(format!(
                "{} NPCs exceed the table capacity of {}",
                records.len(),
                NPC_TABLE_CAPACITY
            )));
        }
        let mut npcs = Vec::with_capacity(records.len());
        for (expected, (id, npc)) in records.into_iter().enumerate() {
            if id != expected {
                return Err(FormatError::MissingKey(format!("NPC {}", expected)));
            }
            npcs.push(npc);
        }
        Ok(Self { npcs })
    }
}

/// A placed NPC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpcInstance {
    pub uuid: Uuid,
    pub npc_id: u16,
    pub coords: Coord,
}

impl NpcInstance {
    pub fn new(npc_id: u16, coords: Coord) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            npc_id,
            coords,
        }
    }
}

/// Persisted placement. Offsets are pixels inside the bisector cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcPlacementRecord {
    #[serde(rename = "NPC ID")]
    pub npc_id: u16,
    #[serde(rename = "X")]
    pub x: i32,
    #[serde(rename = "Y")]
    pub y: i32,
}

impl CellRecord for NpcPlacementRecord {
    fn offset(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

/// Pixel size of an NPC placement offset step
pub const NPC_OFFSET_UNIT: i32 = 1;

/// Placements from the persisted grid, each with a fresh UUID
pub fn decode_instances(
    grid: &SparseGrid<NpcPlacementRecord>,
) -> Result<Vec<NpcInstance>, FormatError> {
    Ok(sparse::decode(grid, NPC_OFFSET_UNIT)?
        .into_iter()
        .map(|(coords, record)| NpcInstance::new(record.npc_id, coords))
        .collect())
}

pub fn encode_instances(
    instances: &[NpcInstance],
) -> Result<SparseGrid<NpcPlacementRecord>, CoreError> {
    sparse::encode(
        instances,
        NPC_OFFSET_UNIT,
        |instance| instance.coords,
        |instance, (x, y)| NpcPlacementRecord {
            npc_id: instance.npc_id,
            x,
            y,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_capacity() {
        let mut table = NpcTable::new();
        for _ in 0..NPC_TABLE_CAPACITY {
            assert!(table.push(Npc::default()).is_some());
        }
        assert!(table.is_full());
        assert_eq!(table.push(Npc::default()), None);
        assert_eq!(table.len(), NPC_TABLE_CAPACITY);
    }

    #[test]
    fn test_template_yaml_keys() {
        let npc = Npc {
            direction: Direction::Left,
            event_flag: 0x2a,
            show_sprite: ShowSprite::WhenFlagUnset,
            sprite: 17,
            text_pointer_1: "$c5c2d4".to_string(),
            kind: NpcType::ItemBox,
            ..Default::default()
        };
        let mut table = NpcTable::new();
        table.push(Npc::default());
        table.push(npc.clone());

        let yaml = serde_yaml::to_string(&table.to_records()).unwrap();
        assert!(yaml.contains("Show Sprite: when event flag unset"));
        assert!(yaml.contains("Type: item box"));

        let records: BTreeMap<usize, Npc> = serde_yaml::from_str(&yaml).unwrap();
        let reloaded = NpcTable::from_records(records).unwrap();
        assert_eq!(reloaded.get(1), Some(&npc));
    }

    #[test]
    fn test_gap_in_ids_is_rejected() {
        let mut records = BTreeMap::new();
        records.insert(0, Npc::default());
        records.insert(2, Npc::default());
        assert!(NpcTable::from_records(records).is_err());
    }

    #[test]
    fn test_instances_round_trip_in_pixels() {
        let instances = vec![
            NpcInstance::new(4, Coord::new(256 * 5 + 13, 256 * 39 + 255)),
            NpcInstance::new(9, Coord::new(3, 4)),
        ];
        let grid = encode_instances(&instances).unwrap();
        let cell = grid[&39][&5].as_ref().unwrap();
        assert_eq!(
            cell[0],
            NpcPlacementRecord {
                npc_id: 4,
                x: 13,
                y: 255
            }
        );

        let decoded = decode_instances(&grid).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!((decoded[0].npc_id, decoded[0].coords), (9, Coord::new(3, 4)));
        assert_eq!(decoded[1].coords, instances[0].coords);
        assert_ne!(decoded[0].uuid, decoded[1].uuid);
    }

    #[test]
    fn test_decode_rejects_offset_outside_cell() {
        let mut grid = sparse::empty_grid();
        grid.get_mut(&0).unwrap().insert(
            0,
            Some(vec![NpcPlacementRecord {
                npc_id: 1,
                x: -5,
                y: 300,
            }]),
        );
        assert!(matches!(
            decode_instances(&grid),
            Err(FormatError::Invalid(_))
        ));
    }
}
