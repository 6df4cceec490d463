use macroquad::prelude::*;
use serde_json::Value as JsonValue;

use crate::error::{LoadReport, LoadWarning};
use crate::ir_map::IrObject;

/// Default label size in pixels.
pub const DEFAULT_TEXT_SIZE: f32 = 16.0;
/// Default label color.
pub const DEFAULT_TEXT_COLOR: Color = Color::new(0.0, 0.0, 0.0, 1.0);

/// Horizontal alignment inside the label's box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    /// Flush left
    #[default]
    Left,
    /// Centered
    Center,
    /// Flush right
    Right,
    /// Justified (drawn as left)
    Justify,
}

/// Vertical alignment inside the label's box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    /// Top edge
    #[default]
    Top,
    /// Centered
    Center,
    /// Bottom edge
    Bottom,
}

impl HAlign {
    fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "center" => Self::Center,
            "right" => Self::Right,
            "justify" => Self::Justify,
            _ => Self::Left,
        }
    }
}

impl VAlign {
    fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "center" => Self::Center,
            "bottom" => Self::Bottom,
            _ => Self::Top,
        }
    }
}

/// A piece of text placed on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    /// Object id
    pub id: u32,
    /// Top-left of the object, world pixels
    pub position: Vec2,
    /// Box the text aligns inside, when the object has a size
    pub bounds: Option<Rect>,
    /// The string itself
    pub text: String,
    /// Pixel size
    pub size: f32,
    /// Bold style
    pub bold: bool,
    /// Italic style
    pub italic: bool,
    /// Fill color
    pub color: Color,
    /// Horizontal alignment
    pub halign: HAlign,
    /// Vertical alignment
    pub valign: VAlign,
    /// Word wrap inside `bounds`
    pub wrap: bool,
    /// Requested font family, if any
    pub font_family: Option<String>,
    /// Object and layer visibility combined
    pub visible: bool,
}

impl TextLabel {
    /// Top-left corner of a line of text measuring `text_size`, aligned in
    /// the label's bounds (or at its position when it has none).
    pub fn aligned_origin(&self, text_size: Vec2) -> Vec2 {
        let Some(b) = self.bounds else {
            return self.position;
        };
        let x = match self.halign {
            HAlign::Left | HAlign::Justify => b.x,
            HAlign::Center => b.x + (b.w - text_size.x) / 2.0,
            HAlign::Right => b.x + b.w - text_size.x,
        };
        let y = match self.valign {
            VAlign::Top => b.y,
            VAlign::Center => b.y + (b.h - text_size.y) / 2.0,
            VAlign::Bottom => b.y + b.h - text_size.y,
        };
        vec2(x, y)
    }
}

/// Parse `#RRGGBB` or `#AARRGGBB` (leading `#` optional).
pub fn parse_color(s: &str) -> Option<Color> {
    let hex = s.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        6 => Some(Color::from_rgba(byte(0)?, byte(2)?, byte(4)?, 255)),
        8 => Some(Color::from_rgba(byte(2)?, byte(4)?, byte(6)?, byte(0)?)),
        _ => None,
    }
}

/// Build a label from a text-bearing object.
///
/// Accepts the structured `text` object, the legacy plain-string `text`
/// field, or a `text`/`label` custom property. Returns `None` when the object
/// carries no text at all.
pub fn label_from_object(
    obj: &IrObject,
    offset: Vec2,
    layer_visible: bool,
    report: &mut LoadReport,
) -> Option<TextLabel> {
    let rect = obj.rect(offset);
    let bounds = (obj.width > 0.0 && obj.height > 0.0).then_some(rect);
    let mut label = TextLabel {
        id: obj.id,
        position: rect.point(),
        bounds,
        text: String::new(),
        size: DEFAULT_TEXT_SIZE,
        bold: false,
        italic: false,
        color: DEFAULT_TEXT_COLOR,
        halign: HAlign::default(),
        valign: VAlign::default(),
        wrap: false,
        font_family: None,
        visible: obj.visible && layer_visible,
    };

    match &obj.text {
        Some(JsonValue::Object(t)) => {
            label.text = t.get("text").and_then(JsonValue::as_str)?.to_owned();
            if let Some(size) = t.get("pixelsize").and_then(JsonValue::as_f64) {
                label.size = size as f32;
            }
            label.bold = t.get("bold").and_then(JsonValue::as_bool).unwrap_or(false);
            label.italic = t.get("italic").and_then(JsonValue::as_bool).unwrap_or(false);
            label.wrap = t.get("wrap").and_then(JsonValue::as_bool).unwrap_or(false);
            label.font_family = t
                .get("fontfamily")
                .and_then(JsonValue::as_str)
                .map(str::to_owned);
            if let Some(h) = t.get("halign").and_then(JsonValue::as_str) {
                label.halign = HAlign::parse(h);
            }
            if let Some(v) = t.get("valign").and_then(JsonValue::as_str) {
                label.valign = VAlign::parse(v);
            }
            if let Some(c) = t.get("color").and_then(JsonValue::as_str) {
                label.color = color_or_default(obj.id, c, report);
            }
        }
        Some(JsonValue::String(s)) => label.text = s.clone(),
        _ => {
            label.text = obj.properties.first_string(&["text", "label"])?.to_owned();
            if let Some(size) = obj.properties.get_f32("size") {
                label.size = size;
            }
            if let Some(c) = obj.properties.get_string("color") {
                label.color = color_or_default(obj.id, c, report);
            }
        }
    }

    Some(label)
}

fn color_or_default(object_id: u32, raw: &str, report: &mut LoadReport) -> Color {
    parse_color(raw).unwrap_or_else(|| {
        report.warn(LoadWarning::InvalidColor {
            object_id,
            value: raw.to_owned(),
        });
        DEFAULT_TEXT_COLOR
    })
}
