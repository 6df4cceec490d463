use macroquad::prelude::*;

use super::classify::{classify, LayerHint, ObjectKind};
use super::text::{label_from_object, TextLabel};
use super::{
    split_list, DecorativeActor, EntranceTrigger, InteractionPoint, MinigameTrigger, SeatKind,
    SeatObject,
};
use crate::error::{LoadReport, LoadWarning};
use crate::ir_map::{IrLayer, IrLayerKind, IrObject, IrObjectShape};
use crate::spatial::{NonWalkableRegion, Polygon};

/// Everything read from the object layers of one map.
#[derive(Debug, Clone, Default)]
pub struct MapObjects {
    /// Player start, from the first spawn marker found
    pub spawn: Option<Vec2>,
    /// Text labels
    pub labels: Vec<TextLabel>,
    /// Portals to other maps
    pub entrances: Vec<EntranceTrigger>,
    /// Minigame triggers
    pub minigames: Vec<MinigameTrigger>,
    /// Counters and other interaction points
    pub interactions: Vec<InteractionPoint>,
    /// Seats and tables
    pub seats: Vec<SeatObject>,
    /// Decorative actors
    pub actors: Vec<DecorativeActor>,
    /// Regions that block movement
    pub non_walkable: Vec<NonWalkableRegion>,
    /// Objects that matched no kind
    pub unclassified: usize,
}

/// Walk every object layer (inside groups too, whatever their visibility)
/// in declaration order and sort each object into its collection.
pub fn parse_object_layers(
    layers: &[IrLayer],
    tile_size: Vec2,
    report: &mut LoadReport,
) -> MapObjects {
    let mut out = MapObjects::default();
    walk(layers, Vec2::ZERO, true, tile_size, &mut out, report);
    out
}

fn walk(
    layers: &[IrLayer],
    offset: Vec2,
    visible: bool,
    tile_size: Vec2,
    out: &mut MapObjects,
    report: &mut LoadReport,
) {
    for layer in layers {
        let offset = offset + layer.offset;
        let visible = visible && layer.visible;
        match &layer.kind {
            IrLayerKind::Group { layers } => walk(layers, offset, visible, tile_size, out, report),
            IrLayerKind::Objects { objects } => {
                let hint = LayerHint::new(&layer.name, &layer.class_name);
                let ctx = LayerCtx {
                    name: &layer.name,
                    offset,
                    visible,
                    tile_size,
                };
                for obj in objects {
                    ctx.add(classify(&hint, obj), obj, out, report);
                }
            }
            IrLayerKind::Tiles { .. } | IrLayerKind::Unsupported => {}
        }
    }
}

struct LayerCtx<'a> {
    name: &'a str,
    offset: Vec2,
    visible: bool,
    tile_size: Vec2,
}

/// Object bounds in world space. Tile objects are anchored bottom-left.
fn object_bounds(obj: &IrObject, offset: Vec2) -> Rect {
    let mut r = obj.rect(offset);
    if matches!(obj.shape, IrObjectShape::Tile { .. }) {
        r.y -= r.h;
    }
    r
}

/// Rotate clockwise (y down) by `degrees`, as Tiled stores object rotation.
fn rotate_deg(p: Vec2, degrees: f32) -> Vec2 {
    if degrees == 0.0 {
        return p;
    }
    let (sin, cos) = degrees.to_radians().sin_cos();
    vec2(p.x * cos - p.y * sin, p.x * sin + p.y * cos)
}

impl LayerCtx<'_> {
    fn add(&self, kind: ObjectKind, obj: &IrObject, out: &mut MapObjects, report: &mut LoadReport) {
        let props = &obj.properties;
        let rect = object_bounds(obj, self.offset);

        match kind {
            ObjectKind::Spawn => {
                if out.spawn.is_some() {
                    tracing::debug!("ignoring extra spawn marker {} in '{}'", obj.id, self.name);
                    return;
                }
                out.spawn = Some(self.spawn_position(obj, rect));
            }
            ObjectKind::TextLabel => match label_from_object(obj, self.offset, self.visible, report) {
                Some(label) => out.labels.push(label),
                None => out.unclassified += 1,
            },
            ObjectKind::Entrance => out.entrances.push(EntranceTrigger {
                id: obj.id,
                rect,
                name: obj.name.clone(),
                target: obj
                    .target
                    .clone()
                    .or_else(|| props.get_string("target").map(str::to_owned)),
                target_x: obj.target_x.or_else(|| props.get_f32("targetX")),
                target_y: obj.target_y.or_else(|| props.get_f32("targetY")),
            }),
            ObjectKind::Minigame => out.minigames.push(MinigameTrigger {
                id: obj.id,
                rect,
                name: obj.name.clone(),
                game: props
                    .first_string(&["minigame", "game"])
                    .unwrap_or(obj.name.as_str())
                    .to_owned(),
                prompt: props.get_string("prompt").map(str::to_owned),
            }),
            ObjectKind::Interaction => out.interactions.push(InteractionPoint {
                id: obj.id,
                rect,
                name: obj.name.clone(),
                kind: obj.class_name.clone(),
                options: props
                    .first_string(&["dishes", "options"])
                    .map(split_list)
                    .unwrap_or_default(),
                prompt: props.get_string("prompt").map(str::to_owned),
            }),
            ObjectKind::Seat => out.seats.push(SeatObject {
                id: obj.id,
                rect,
                name: obj.name.clone(),
                kind: if obj.class_name.to_lowercase().contains("table") {
                    SeatKind::Table
                } else {
                    SeatKind::Seat
                },
                capacity: props
                    .get_i64("capacity")
                    .and_then(|c| u32::try_from(c).ok())
                    .unwrap_or(1),
                facing: props.get_string("facing").map(str::to_owned),
            }),
            ObjectKind::Actor => out.actors.push(DecorativeActor {
                id: obj.id,
                position: vec2(obj.x, obj.y) + self.offset,
                size: vec2(obj.width, obj.height),
                name: obj.name.clone(),
                gid: match obj.shape {
                    IrObjectShape::Tile { gid } => Some(gid),
                    _ => None,
                },
                sprite: props.get_string("sprite").map(str::to_owned),
                dialogue: props.first_string(&["dialogue", "dialog"]).map(str::to_owned),
                visible: obj.visible && self.visible,
                properties: props.clone(),
            }),
            ObjectKind::NonWalkable => {
                if let Some(region) = self.non_walkable(obj, rect, report) {
                    out.non_walkable.push(region);
                }
            }
            ObjectKind::Unclassified => {
                tracing::debug!(
                    "unclassified object {} '{}' in layer '{}'",
                    obj.id,
                    obj.name,
                    self.name
                );
                out.unclassified += 1;
            }
        }
    }

    /// Rectangles resolve to their center, points to their position offset
    /// by half a tile.
    fn spawn_position(&self, obj: &IrObject, rect: Rect) -> Vec2 {
        let has_area = obj.width > 0.0 && obj.height > 0.0;
        if has_area && obj.shape != IrObjectShape::Point {
            rect.center()
        } else {
            rect.point() + self.tile_size / 2.0
        }
    }

    fn non_walkable(
        &self,
        obj: &IrObject,
        rect: Rect,
        report: &mut LoadReport,
    ) -> Option<NonWalkableRegion> {
        let origin = vec2(obj.x, obj.y) + self.offset;
        match &obj.shape {
            IrObjectShape::Polygon(points) => {
                let absolute = points
                    .iter()
                    .map(|p| origin + rotate_deg(*p, obj.rotation))
                    .collect();
                match Polygon::new(absolute) {
                    Some(poly) => Some(NonWalkableRegion::Polygon(poly)),
                    None => {
                        report.warn(LoadWarning::DegeneratePolygon {
                            layer: self.name.to_owned(),
                            object_id: obj.id,
                            points: points.len(),
                        });
                        None
                    }
                }
            }
            IrObjectShape::Rectangle
            | IrObjectShape::Ellipse
            | IrObjectShape::Tile { .. }
            | IrObjectShape::Text
                if rect.w > 0.0 && rect.h > 0.0 =>
            {
                if obj.rotation == 0.0 {
                    return Some(NonWalkableRegion::Rect(rect));
                }
                // rotation pivots on the object's own (x, y)
                let corners = [
                    rect.point(),
                    vec2(rect.right(), rect.top()),
                    vec2(rect.right(), rect.bottom()),
                    vec2(rect.left(), rect.bottom()),
                ];
                let rotated = corners
                    .iter()
                    .map(|&c| origin + rotate_deg(c - origin, obj.rotation))
                    .collect();
                Polygon::new(rotated).map(NonWalkableRegion::Polygon)
            }
            _ => {
                report.warn(LoadWarning::UnsupportedCollisionShape {
                    layer: self.name.to_owned(),
                    object_id: obj.id,
                });
                None
            }
        }
    }
}
