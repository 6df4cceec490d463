use std::f32::consts::FRAC_PI_2;

use macroquad::prelude::*;

use crate::compose::DrawInstance;
use crate::gid::TileId;
use crate::map::MapModel;
use crate::objects::TextLabel;

const COLLISION_COLOR: Color = Color::new(1.0, 0.2, 0.2, 0.8);
const ENTRANCE_COLOR: Color = Color::new(0.2, 0.6, 1.0, 0.8);
const TRIGGER_COLOR: Color = Color::new(1.0, 0.8, 0.1, 0.8);
const SPAWN_COLOR: Color = Color::new(0.2, 1.0, 0.3, 0.9);

/// Map Tiled's flip bits onto `(flip_x, flip_y, rotation)` for
/// [`DrawTextureParams`].
///
/// The diagonal bit is a transpose, which is a vertical flip followed by a
/// quarter turn clockwise; the horizontal and vertical bits apply after it.
pub fn flip_params(flip_h: bool, flip_v: bool, flip_d: bool) -> (bool, bool, f32) {
    if flip_d {
        (flip_v, !flip_h, FRAC_PI_2)
    } else {
        (flip_h, flip_v, 0.0)
    }
}

/// GPU side of a [`MapModel`]: one texture per tileset atlas.
pub struct MapRenderer {
    textures: Vec<Option<Texture2D>>,
}

impl MapRenderer {
    /// Upload every tileset atlas. Placeholder tilesets get no texture and
    /// their tiles are never drawn.
    pub fn new(map: &MapModel) -> Self {
        let textures = map
            .tilesets()
            .iter()
            .map(|ts| {
                if ts.is_placeholder() {
                    return None;
                }
                let atlas = ts.atlas();
                let (Ok(w), Ok(h)) = (u16::try_from(atlas.width()), u16::try_from(atlas.height()))
                else {
                    tracing::warn!(
                        "atlas of tileset {} is {}x{}, too large for a texture",
                        ts.name,
                        atlas.width(),
                        atlas.height()
                    );
                    return None;
                };
                let tex = Texture2D::from_rgba8(w, h, atlas.as_bytes());
                tex.set_filter(FilterMode::Nearest);
                Some(tex)
            })
            .collect();
        Self { textures }
    }

    fn texture(&self, tileset: usize) -> Option<&Texture2D> {
        self.textures.get(tileset).and_then(Option::as_ref)
    }

    fn draw_instance(&self, inst: &DrawInstance) {
        let Some(tex) = self.texture(inst.tileset) else {
            return;
        };
        let (flip_x, flip_y, rotation) = flip_params(inst.flip_h, inst.flip_v, inst.flip_d);
        draw_texture_ex(
            tex,
            inst.dest.x,
            inst.dest.y,
            inst.color(),
            DrawTextureParams {
                source: Some(inst.src),
                dest_size: Some(inst.size()),
                flip_x,
                flip_y,
                rotation,
                ..Default::default()
            },
        );
    }

    /// Draw the tiles near the view rectangle (world pixels), in paint order.
    pub fn draw(&self, map: &MapModel, view_min: Vec2, view_max: Vec2) {
        let instances = map.draw_instances();
        for i in map.visible_instances(view_min, view_max) {
            self.draw_instance(&instances[i]);
        }
    }

    /// Draw every tile regardless of the view.
    pub fn draw_all(&self, map: &MapModel) {
        for inst in map.draw_instances() {
            self.draw_instance(inst);
        }
    }

    /// Draw visible tile-object actors, scaled to their object size.
    pub fn draw_actors(&self, map: &MapModel) {
        for actor in map.actors().iter().filter(|a| a.visible) {
            let Some(raw) = actor.gid.map(TileId) else {
                continue;
            };
            let Some(resolved) = map.resolve_gid(raw.clean()) else {
                continue;
            };
            let (Some(tex), Some(ts)) = (
                self.texture(resolved.tileset),
                map.tilesets().get(resolved.tileset),
            ) else {
                continue;
            };
            let (flip_x, flip_y, rotation) = flip_params(raw.flip_h(), raw.flip_v(), raw.flip_d());
            // tile objects are anchored bottom-left
            draw_texture_ex(
                tex,
                actor.position.x,
                actor.position.y - actor.size.y,
                WHITE,
                DrawTextureParams {
                    source: Some(ts.tile_rect(resolved.local_id)),
                    dest_size: Some(actor.size),
                    flip_x,
                    flip_y,
                    rotation,
                    ..Default::default()
                },
            );
        }
    }

    /// Draw visible text labels with the default font.
    pub fn draw_labels(&self, map: &MapModel) {
        for label in map.labels().iter().filter(|l| l.visible) {
            draw_label(label);
        }
    }

    /// Outline collision shapes, triggers and the spawn point.
    pub fn draw_debug(&self, map: &MapModel) {
        let collision = map.collision();
        for r in collision.rects() {
            draw_rectangle_lines(r.x, r.y, r.w, r.h, 1.0, COLLISION_COLOR);
        }
        for poly in collision.polygons() {
            let pts = poly.points();
            for (a, b) in pts.iter().zip(pts.iter().cycle().skip(1)) {
                draw_line(a.x, a.y, b.x, b.y, 1.0, COLLISION_COLOR);
            }
        }
        for e in map.entrances() {
            draw_rectangle_lines(e.rect.x, e.rect.y, e.rect.w, e.rect.h, 1.0, ENTRANCE_COLOR);
        }
        let triggers = map
            .minigames()
            .iter()
            .map(|m| m.rect)
            .chain(map.interactions().iter().map(|i| i.rect))
            .chain(map.seats().iter().map(|s| s.rect));
        for r in triggers {
            draw_rectangle_lines(r.x, r.y, r.w, r.h, 1.0, TRIGGER_COLOR);
        }
        if let Some(p) = map.spawn_point() {
            draw_circle_lines(p.x, p.y, 4.0, 1.0, SPAWN_COLOR);
        }
    }
}

fn draw_label(label: &TextLabel) {
    let font_size = label.size.round().clamp(1.0, u16::MAX as f32) as u16;
    let dims = measure_text(&label.text, None, font_size, 1.0);
    let origin = label.aligned_origin(vec2(dims.width, dims.height));
    // draw_text takes the baseline
    draw_text(&label.text, origin.x, origin.y + dims.offset_y, font_size as f32, label.color);
}
