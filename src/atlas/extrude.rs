use thiserror::Error;

use super::pixels::PixelBuffer;

/// Pixel layout of a tile grid inside a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGeometry {
    /// Tile width in pixels
    pub tile_width: u32,
    /// Tile height in pixels
    pub tile_height: u32,
    /// Gap between neighbouring tiles
    pub spacing: u32,
    /// Border around the whole grid
    pub margin: u32,
}

impl TileGeometry {
    /// Layout of the atlas produced by [`extrude_tiles`]: cells grow by the
    /// border on both sides and are packed edge to edge.
    pub fn extruded(self, extrude: u32) -> Self {
        Self {
            tile_width: self.tile_width.saturating_add(extrude.saturating_mul(2)),
            tile_height: self.tile_height.saturating_add(extrude.saturating_mul(2)),
            spacing: 0,
            margin: 0,
        }
    }

    /// Tile columns that fit in an image of `image_width` pixels.
    pub fn columns_in(&self, image_width: u32) -> u32 {
        fit(image_width, self.tile_width, self.spacing, self.margin)
    }

    /// Tile rows that fit in an image of `image_height` pixels.
    pub fn rows_in(&self, image_height: u32) -> u32 {
        fit(image_height, self.tile_height, self.spacing, self.margin)
    }
}

// floor((usable + spacing) / (tile + spacing))
fn fit(extent: u32, tile: u32, spacing: u32, margin: u32) -> u32 {
    if tile == 0 {
        return 0;
    }
    let usable = u64::from(extent).saturating_sub(2 * u64::from(margin));
    let fits = (usable + u64::from(spacing)) / (u64::from(tile) + u64::from(spacing));
    u32::try_from(fits).unwrap_or(u32::MAX)
}

/// Largest atlas side the builder will allocate.
pub const MAX_ATLAS_SIDE: u32 = 16_384;

/// Why an atlas could not be built. The caller keeps the source image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AtlasError {
    /// Zero tile width or height
    #[error("tile size must be positive, got {width}x{height}")]
    InvalidTileSize {
        /// Tile width
        width: u32,
        /// Tile height
        height: u32,
    },
    /// Zero columns
    #[error("column count must be positive")]
    NoColumns,
    /// The image is shorter than one tile
    #[error("image of height {image_height} holds no rows of {tile_height}px tiles")]
    NoRows {
        /// Source image height
        image_height: u32,
        /// Tile height
        tile_height: u32,
    },
    /// The extruded atlas would exceed [`MAX_ATLAS_SIDE`] on a side
    #[error("atlas of {columns}x{rows} tiles at {cell_width}x{cell_height}px is too large")]
    TooLarge {
        /// Tile columns
        columns: u32,
        /// Tile rows
        rows: u32,
        /// Extruded cell width
        cell_width: u32,
        /// Extruded cell height
        cell_height: u32,
    },
}

/// Repack `src` into a gap-free atlas where every tile is surrounded by
/// `extrude` pixels copied from its own edges.
///
/// Output is `columns * (w + 2e)` by `rows * (h + 2e)`. Interior pixels are
/// copied verbatim, edge rows/columns are smeared outward and each corner
/// block repeats the tile's corner pixel. Source coordinates outside `src`
/// read as transparent.
pub fn extrude_tiles(
    src: &PixelBuffer,
    geometry: TileGeometry,
    columns: u32,
    extrude: u32,
) -> Result<PixelBuffer, AtlasError> {
    let TileGeometry {
        tile_width: tw,
        tile_height: th,
        spacing,
        margin,
    } = geometry;

    if tw == 0 || th == 0 {
        return Err(AtlasError::InvalidTileSize {
            width: tw,
            height: th,
        });
    }
    if columns == 0 {
        return Err(AtlasError::NoColumns);
    }
    let rows = geometry.rows_in(src.height());
    if rows == 0 {
        return Err(AtlasError::NoRows {
            image_height: src.height(),
            tile_height: th,
        });
    }

    let out_geom = geometry.extruded(extrude);
    let (ow, oh) = (out_geom.tile_width, out_geom.tile_height);
    let size = columns
        .checked_mul(ow)
        .zip(rows.checked_mul(oh))
        .filter(|&(w, h)| w <= MAX_ATLAS_SIDE && h <= MAX_ATLAS_SIDE);
    let Some((out_w, out_h)) = size else {
        return Err(AtlasError::TooLarge {
            columns,
            rows,
            cell_width: ow,
            cell_height: oh,
        });
    };
    let mut out = PixelBuffer::new(out_w, out_h);

    let e = extrude as i64;
    for row in 0..rows {
        for col in 0..columns {
            let sx = margin as i64 + col as i64 * (tw as i64 + spacing as i64);
            let sy = margin as i64 + row as i64 * (th as i64 + spacing as i64);
            let (dx, dy) = (col * ow, row * oh);

            for oy in 0..oh {
                // clamping into the tile reproduces the interior and smears
                // edges; corners land on the corner pixel
                let ly = (oy as i64 - e).clamp(0, th as i64 - 1);
                for ox in 0..ow {
                    let lx = (ox as i64 - e).clamp(0, tw as i64 - 1);
                    out.set(dx + ox, dy + oy, src.sample(sx + lx, sy + ly));
                }
            }
        }
    }

    Ok(out)
}
