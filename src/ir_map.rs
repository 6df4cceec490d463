// src/ir_map.rs
use macroquad::prelude::*;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// Typed value of a Tiled custom property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// `bool`
    Bool(bool),
    /// `int` and `object` (object references are ids)
    I64(i64),
    /// `float`
    F32(f32),
    /// `string`, `file`, `color`, `class`
    String(String),
}

/// Custom properties by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(HashMap<String, PropertyValue>);

impl Properties {
    /// Empty property set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a property
    pub fn insert(&mut self, name: String, value: PropertyValue) {
        self.0.insert(name, value);
    }

    /// Raw lookup
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.get(name)
    }

    /// Number of properties
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no properties are set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Boolean property
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer property
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            PropertyValue::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer property that fits in `i32`
    pub fn get_i32(&self, name: &str) -> Option<i32> {
        self.get_i64(name).and_then(|v| i32::try_from(v).ok())
    }

    /// Numeric property; integers are widened.
    pub fn get_f32(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            PropertyValue::F32(v) => Some(*v),
            PropertyValue::I64(v) => Some(*v as f32),
            _ => None,
        }
    }

    /// String-like property
    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            PropertyValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// First of `names` present as a string.
    pub(crate) fn first_string(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|n| self.get_string(n))
    }
}

/// Canonical, format-agnostic map.
#[derive(Debug)]
pub struct IrMap {
    pub width: u32,
    pub height: u32,
    pub tile_w: u32,
    pub tile_h: u32,
    pub properties: Properties,
    pub tilesets: Vec<IrTileset>, // declaration order, not sorted
    pub layers: Vec<IrLayer>,     // draw order: array order
}

/// One tileset as declared by the document (possibly after following an
/// external `source`).
#[derive(Debug, Clone)]
pub struct IrTileset {
    pub name: String,
    pub first_gid: u32,
    pub image: Option<String>, // relative to the map directory
    pub source: Option<String>, // external tileset reference, if any
    pub tile_w: u32,
    pub tile_h: u32,
    pub tilecount: Option<u32>,
    pub columns: Option<u32>,
    pub spacing: u32,
    pub margin: u32,
    pub properties: Properties,
}

#[derive(Debug)]
pub enum IrLayerKind {
    Tiles {
        width: usize,
        height: usize,
        data: Vec<u32>, // raw GIDs (including flip flags ok); len == width * height
    },
    Objects {
        objects: Vec<IrObject>,
    },
    Group {
        layers: Vec<IrLayer>,
    },
    Unsupported,
}

#[derive(Debug)]
pub struct IrLayer {
    pub name: String,
    pub class_name: String,
    pub visible: bool,
    pub opacity: f32,
    pub offset: Vec2, // world offset for this layer, relative to the parent
    pub properties: Properties,
    pub kind: IrLayerKind,
}

/// Geometry of a map object. Vertices are relative to the object position.
#[derive(Debug, Clone, PartialEq)]
pub enum IrObjectShape {
    Rectangle,
    Ellipse,
    Point,
    Polygon(Vec<Vec2>),
    Polyline(Vec<Vec2>),
    Tile { gid: u32 },
    Text,
}

/// Object as authored; `class_name` is `class` falling back to `type`.
#[derive(Debug, Clone)]
pub struct IrObject {
    pub id: u32,
    pub name: String,
    pub class_name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rotation: f32,
    pub visible: bool,
    pub shape: IrObjectShape,
    /// Raw `text` field: a structured text object or a legacy plain string.
    pub text: Option<JsonValue>,
    /// Top-level `target`/`targetX`/`targetY` some exporters emit.
    pub target: Option<String>,
    pub target_x: Option<f32>,
    pub target_y: Option<f32>,
    pub properties: Properties,
}

impl IrObject {
    /// Axis-aligned bounds, shifted by a layer offset.
    pub fn rect(&self, offset: Vec2) -> Rect {
        Rect::new(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }
}
