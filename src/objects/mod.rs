//! Typed entities read from object layers.

mod classify;
mod parse;
mod text;

pub use parse::parse_object_layers;
pub use text::{parse_color, HAlign, TextLabel, VAlign};

use macroquad::prelude::*;

use crate::ir_map::Properties;

/// Portal to another map.
#[derive(Debug, Clone, PartialEq)]
pub struct EntranceTrigger {
    /// Object id
    pub id: u32,
    /// Trigger area
    pub rect: Rect,
    /// Object name, e.g. the building
    pub name: String,
    /// Destination map identifier
    pub target: Option<String>,
    /// Explicit arrival x in the destination, pixels
    pub target_x: Option<f32>,
    /// Explicit arrival y in the destination, pixels
    pub target_y: Option<f32>,
}

impl EntranceTrigger {
    /// Arrival point when both coordinates are given.
    pub fn target_position(&self) -> Option<Vec2> {
        Some(vec2(self.target_x?, self.target_y?))
    }
}

/// Area that starts a minigame.
#[derive(Debug, Clone, PartialEq)]
pub struct MinigameTrigger {
    /// Object id
    pub id: u32,
    /// Trigger area
    pub rect: Rect,
    /// Object name
    pub name: String,
    /// Which minigame; the object name when no `minigame`/`game` property
    pub game: String,
    /// Prompt shown before starting
    pub prompt: Option<String>,
}

/// Something the player can use, e.g. an ordering counter.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionPoint {
    /// Object id
    pub id: u32,
    /// Interaction area
    pub rect: Rect,
    /// Object name
    pub name: String,
    /// The object's `type`/`class`
    pub kind: String,
    /// Options offered, from a comma-separated `dishes`/`options` property
    pub options: Vec<String>,
    /// Prompt shown when interacting
    pub prompt: Option<String>,
}

/// Whether a seating object is a seat or a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatKind {
    /// Chair, bench, ...
    Seat,
    /// Table
    Table,
}

/// Seat or table.
#[derive(Debug, Clone, PartialEq)]
pub struct SeatObject {
    /// Object id
    pub id: u32,
    /// Occupied area
    pub rect: Rect,
    /// Object name
    pub name: String,
    /// Seat or table
    pub kind: SeatKind,
    /// `capacity` property, default 1
    pub capacity: u32,
    /// `facing` property (e.g. "up", "left")
    pub facing: Option<String>,
}

/// Decorative character or prop.
#[derive(Debug, Clone, PartialEq)]
pub struct DecorativeActor {
    /// Object id
    pub id: u32,
    /// Object position, world pixels. For tile objects this is the
    /// bottom-left corner, as Tiled stores it.
    pub position: Vec2,
    /// Object size
    pub size: Vec2,
    /// Object name
    pub name: String,
    /// Tile to draw, for tile objects (flip flags included)
    pub gid: Option<u32>,
    /// `sprite` property
    pub sprite: Option<String>,
    /// `dialogue`/`dialog` property
    pub dialogue: Option<String>,
    /// Object and layer visibility combined
    pub visible: bool,
    /// Remaining custom properties
    pub properties: Properties,
}

/// Split a comma-separated list, trimming and dropping empty entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
