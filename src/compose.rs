use macroquad::prelude::*;

use crate::gid::TileId;
use crate::ir_map::{IrLayer, IrLayerKind};
use crate::tileset::TilesetRegistry;

/// One resolved tile, ready to draw. The list of instances is in paint
/// order: layer declaration order, then row-major inside a layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawInstance {
    /// Index into the map's tileset arena
    pub tileset: usize,
    /// Tileset-local tile id
    pub local_id: u32,
    /// Atlas sub-rectangle
    pub src: Rect,
    /// World position of the top-left corner, in pixels
    pub dest: Vec2,
    /// 0..=255, from the cumulative layer opacity
    pub alpha: u8,
    /// Horizontal flip flag from the GID
    pub flip_h: bool,
    /// Vertical flip flag from the GID
    pub flip_v: bool,
    /// Diagonal (anti-transpose) flip flag from the GID
    pub flip_d: bool,
    /// Ordinal of the tile layer this came from, counting nested layers
    pub layer: u16,
}

impl DrawInstance {
    /// White tint carrying the instance alpha.
    pub fn color(&self) -> Color {
        Color::from_rgba(255, 255, 255, self.alpha)
    }

    /// Destination size (the tile's own pixel size).
    pub fn size(&self) -> Vec2 {
        vec2(self.src.w, self.src.h)
    }
}

/// Convert a cumulative opacity to an 8-bit alpha.
pub fn opacity_to_alpha(opacity: f32) -> u8 {
    if opacity >= 1.0 {
        255
    } else {
        (255.0 * opacity.max(0.0)).round() as u8
    }
}

struct Compositor<'a> {
    registry: &'a TilesetRegistry,
    tile_size: Vec2,
    next_layer: u16,
    skipped: usize,
    out: Vec<DrawInstance>,
}

/// Flatten the layer tree into draw instances.
///
/// Groups only add their offset and multiply their opacity into the
/// children. Invisible tile layers and groups are skipped, as are cells whose
/// GID has no owner.
pub fn compose_layers(
    layers: &[IrLayer],
    tile_size: Vec2,
    registry: &TilesetRegistry,
) -> Vec<DrawInstance> {
    let mut c = Compositor {
        registry,
        tile_size,
        next_layer: 0,
        skipped: 0,
        out: Vec::new(),
    };
    c.walk(layers, Vec2::ZERO, 1.0);
    if c.skipped > 0 {
        tracing::debug!("{} tile cells had no resolvable tileset", c.skipped);
    }
    c.out
}

impl Compositor<'_> {
    fn walk(&mut self, layers: &[IrLayer], offset: Vec2, opacity: f32) {
        for layer in layers {
            let offset = offset + layer.offset;
            let opacity = opacity * layer.opacity;
            match &layer.kind {
                IrLayerKind::Group { layers } => {
                    if layer.visible {
                        self.walk(layers, offset, opacity);
                    }
                }
                IrLayerKind::Tiles { width, data, .. } => {
                    let ordinal = self.next_layer;
                    self.next_layer = self.next_layer.saturating_add(1);
                    if layer.visible {
                        self.emit_tiles(*width, data, offset, opacity, ordinal);
                    }
                }
                IrLayerKind::Objects { .. } | IrLayerKind::Unsupported => {}
            }
        }
    }

    fn emit_tiles(&mut self, width: usize, data: &[u32], offset: Vec2, opacity: f32, layer: u16) {
        if width == 0 {
            return;
        }
        let alpha = opacity_to_alpha(opacity);
        for (idx, raw) in data.iter().enumerate() {
            let id = TileId(*raw);
            if id.is_empty() {
                continue;
            }
            let Some(hit) = self.registry.resolve(id.clean()) else {
                self.skipped += 1;
                continue;
            };
            let Some(ts) = self.registry.get(hit.tileset) else {
                continue;
            };

            let col = idx % width;
            let row = idx / width;
            let dest = offset + vec2(col as f32 * self.tile_size.x, row as f32 * self.tile_size.y);

            self.out.push(DrawInstance {
                tileset: hit.tileset,
                local_id: hit.local_id,
                src: ts.tile_rect(hit.local_id),
                dest,
                alpha,
                flip_h: id.flip_h(),
                flip_v: id.flip_v(),
                flip_d: id.flip_d(),
                layer,
            });
        }
    }
}
