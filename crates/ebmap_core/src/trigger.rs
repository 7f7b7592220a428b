//! Map triggers: doors, stairways, ropes and the like
//!
//! A trigger is a coordinate plus one of eight payloads. Triggers are
//! identified by UUID so they keep their identity when moved between
//! bisector cells.

use crate::coords::{Coord, Scale};
use crate::error::{CoreError, FormatError};
use crate::sparse::{self, CellRecord, SparseGrid};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorDirection {
    Up,
    Right,
    #[default]
    Down,
    Left,
}

/// Direction of travel on escalators and stairways
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StairDirection {
    #[default]
    Nw,
    Ne,
    Sw,
    Se,
    Nowhere,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DoorTrigger {
    /// Destination in warp units
    #[serde(rename = "Destination X")]
    pub destination_x: i32,
    #[serde(rename = "Destination Y")]
    pub destination_y: i32,
    #[serde(rename = "Direction")]
    pub direction: DoorDirection,
    #[serde(rename = "Event Flag")]
    pub event_flag: u16,
    #[serde(rename = "Style")]
    pub style: u8,
    #[serde(rename = "Text Pointer")]
    pub text_pointer: String,
}

impl DoorTrigger {
    /// Destination as a pixel coordinate
    pub fn destination(&self) -> Coord {
        Coord::from_warp(self.destination_x, self.destination_y)
    }

    pub fn set_destination(&mut self, coord: Coord) {
        let warp = coord.to_scale(Scale::Warp);
        self.destination_x = warp.x;
        self.destination_y = warp.y;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StairTrigger {
    #[serde(rename = "Direction")]
    pub direction: StairDirection,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextTrigger {
    #[serde(rename = "Text Pointer")]
    pub text_pointer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SwitchTrigger {
    #[serde(rename = "Event Flag")]
    pub event_flag: u16,
    #[serde(rename = "Text Pointer")]
    pub text_pointer: String,
}

/// Trigger payload, tagged by `Type` on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "Type", rename_all = "lowercase")]
pub enum TriggerKind {
    Door(DoorTrigger),
    Escalator(StairTrigger),
    Ladder,
    Object(TextTrigger),
    Person(TextTrigger),
    Rope,
    Stairway(StairTrigger),
    Switch(SwitchTrigger),
}

/// Discriminant of [`TriggerKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerType {
    Door,
    Escalator,
    Ladder,
    Object,
    Person,
    Rope,
    Stairway,
    Switch,
}

impl TriggerType {
    pub fn all() -> &'static [TriggerType] {
        &[
            TriggerType::Door,
            TriggerType::Escalator,
            TriggerType::Ladder,
            TriggerType::Object,
            TriggerType::Person,
            TriggerType::Rope,
            TriggerType::Stairway,
            TriggerType::Switch,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TriggerType::Door => "Door",
            TriggerType::Escalator => "Escalator",
            TriggerType::Ladder => "Ladder",
            TriggerType::Object => "Object",
            TriggerType::Person => "Person",
            TriggerType::Rope => "Rope",
            TriggerType::Stairway => "Stairway",
            TriggerType::Switch => "Switch",
        }
    }
}

impl TriggerKind {
    pub fn trigger_type(&self) -> TriggerType {
        match self {
            TriggerKind::Door(_) => TriggerType::Door,
            TriggerKind::Escalator(_) => TriggerType::Escalator,
            TriggerKind::Ladder => TriggerType::Ladder,
            TriggerKind::Object(_) => TriggerType::Object,
            TriggerKind::Person(_) => TriggerType::Person,
            TriggerKind::Rope => TriggerType::Rope,
            TriggerKind::Stairway(_) => TriggerType::Stairway,
            TriggerKind::Switch(_) => TriggerType::Switch,
        }
    }

    /// Payload with default fields for a type
    pub fn default_for(trigger_type: TriggerType) -> Self {
        match trigger_type {
            TriggerType::Door => TriggerKind::Door(DoorTrigger::default()),
            TriggerType::Escalator => TriggerKind::Escalator(StairTrigger::default()),
            TriggerType::Ladder => TriggerKind::Ladder,
            TriggerType::Object => TriggerKind::Object(TextTrigger::default()),
            TriggerType::Person => TriggerKind::Person(TextTrigger::default()),
            TriggerType::Rope => TriggerKind::Rope,
            TriggerType::Stairway => TriggerKind::Stairway(StairTrigger::default()),
            TriggerType::Switch => TriggerKind::Switch(SwitchTrigger::default()),
        }
    }

    /// Text pointer shown when the trigger is activated, if the type has one
    pub fn text_pointer(&self) -> Option<&str> {
        match self {
            TriggerKind::Door(door) => Some(&door.text_pointer),
            TriggerKind::Object(t) | TriggerKind::Person(t) => Some(&t.text_pointer),
            TriggerKind::Switch(switch) => Some(&switch.text_pointer),
            TriggerKind::Escalator(_)
            | TriggerKind::Ladder
            | TriggerKind::Rope
            | TriggerKind::Stairway(_) => None,
        }
    }
}

/// A placed trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub uuid: Uuid,
    /// Pixel coordinate, a multiple of the warp unit
    pub coords: Coord,
    pub kind: TriggerKind,
}

impl Trigger {
    pub fn new(coords: Coord, kind: TriggerKind) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            coords: coords.round_to(Scale::Warp),
            kind,
        }
    }

    pub fn trigger_type(&self) -> TriggerType {
        self.kind.trigger_type()
    }
}

/// Persisted trigger. Offsets are warp units inside the bisector cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRecord {
    #[serde(flatten)]
    pub kind: TriggerKind,
    #[serde(rename = "X")]
    pub x: i32,
    #[serde(rename = "Y")]
    pub y: i32,
}

impl CellRecord for TriggerRecord {
    fn offset(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

/// Pixel size of a trigger offset step
pub const TRIGGER_OFFSET_UNIT: i32 = Scale::Warp.x_factor();

/// Triggers from the persisted grid, each with a fresh UUID
pub fn decode_triggers(grid: &SparseGrid<TriggerRecord>) -> Result<Vec<Trigger>, FormatError> {
    Ok(sparse::decode(grid, TRIGGER_OFFSET_UNIT)?
        .into_iter()
        .map(|(coords, record)| Trigger::new(coords, record.kind.clone()))
        .collect())
}

pub fn encode_triggers(triggers: &[Trigger]) -> Result<SparseGrid<TriggerRecord>, CoreError> {
    sparse::encode(
        triggers,
        TRIGGER_OFFSET_UNIT,
        |trigger| trigger.coords,
        |trigger, (x, y)| TriggerRecord {
            kind: trigger.kind.clone(),
            x,
            y,
        },
    )
}
