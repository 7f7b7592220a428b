//! Warp destinations and PSI teleport destinations

use crate::coords::{Coord, Scale};
use serde::{Deserialize, Serialize};

/// A door or hole destination, referenced by ID
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Warp {
    pub dest: Coord,
    pub direction: u8,
    pub style: u8,
    pub unknown: u8,
}

/// Persisted warp. Coordinates are warp units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarpRecord {
    #[serde(rename = "Direction")]
    pub direction: u8,
    #[serde(rename = "Style")]
    pub style: u8,
    #[serde(rename = "Unknown", default)]
    pub unknown: u8,
    #[serde(rename = "X")]
    pub x: i32,
    #[serde(rename = "Y")]
    pub y: i32,
}

impl From<&WarpRecord> for Warp {
    fn from(record: &WarpRecord) -> Self {
        Warp {
            dest: Coord::from_warp(record.x, record.y),
            direction: record.direction,
            style: record.style,
            unknown: record.unknown,
        }
    }
}

impl From<&Warp> for WarpRecord {
    fn from(warp: &Warp) -> Self {
        let dest = warp.dest.to_scale(Scale::Warp);
        WarpRecord {
            direction: warp.direction,
            style: warp.style,
            unknown: warp.unknown,
            x: dest.x,
            y: dest.y,
        }
    }
}

/// A PSI teleport destination
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Teleport {
    pub dest: Coord,
    pub flag: u16,
    pub name: String,
}

/// Persisted teleport. Coordinates are warp units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeleportRecord {
    #[serde(rename = "Event Flag")]
    pub flag: u16,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "X")]
    pub x: i32,
    #[serde(rename = "Y")]
    pub y: i32,
}

impl From<&TeleportRecord> for Teleport {
    fn from(record: &TeleportRecord) -> Self {
        Teleport {
            dest: Coord::from_warp(record.x, record.y),
            flag: record.flag,
            name: record.name.clone(),
        }
    }
}

impl From<&Teleport> for TeleportRecord {
    fn from(teleport: &Teleport) -> Self {
        let dest = teleport.dest.to_scale(Scale::Warp);
        TeleportRecord {
            flag: teleport.flag,
            name: teleport.name.clone(),
            x: dest.x,
            y: dest.y,
        }
    }
}
