use std::path::{Path, PathBuf};

use macroquad::prelude::Rect;

use crate::atlas::{extrude_tiles, PixelBuffer, TileGeometry};
use crate::error::{LoadReport, LoadWarning};
use crate::gid::{self, ResolvedTile};
use crate::ir_map::{IrTileset, Properties};

/// One tileset and the atlas it owns. Immutable once the map is built.
#[derive(Debug, Clone)]
pub struct Tileset {
    /// Display name (falls back to the external source or first GID)
    pub name: String,
    /// First GID of the tileset's range
    pub first_gid: u32,
    /// Tiles in the range `[first_gid, first_gid + tile_count)`
    pub tile_count: u32,
    /// Tiles per atlas row
    pub columns: u32,
    /// Layout of the authored sheet
    pub original: TileGeometry,
    /// Layout of [`Tileset::atlas`]; equals `original` when extrusion fell back
    pub effective: TileGeometry,
    /// Border pixels around each atlas cell
    pub extrude: u32,
    /// Resolved image path, if the tileset declared one
    pub image_path: Option<PathBuf>,
    /// Custom properties
    pub properties: Properties,
    atlas: PixelBuffer,
}

impl Tileset {
    fn placeholder(ir: &IrTileset, original: TileGeometry, image_path: Option<PathBuf>) -> Self {
        Self {
            name: ir.name.clone(),
            first_gid: ir.first_gid,
            tile_count: ir.tilecount.unwrap_or(0),
            columns: ir.columns.unwrap_or(1).max(1),
            original,
            effective: original,
            extrude: 0,
            image_path,
            properties: ir.properties.clone(),
            atlas: PixelBuffer::default(),
        }
    }

    /// Atlas pixels; empty for placeholders.
    pub fn atlas(&self) -> &PixelBuffer {
        &self.atlas
    }

    /// True when the tileset has no usable image.
    pub fn is_placeholder(&self) -> bool {
        self.atlas.is_empty()
    }

    /// Half-open range check on `[first_gid, first_gid + tile_count)`.
    pub fn contains_gid(&self, gid: u32) -> bool {
        gid >= self.first_gid && gid - self.first_gid < self.tile_count
    }

    /// Atlas sub-rectangle of a local tile id, excluding the extruded border.
    pub fn tile_rect(&self, local_id: u32) -> Rect {
        let col = local_id % self.columns;
        let row = local_id / self.columns;
        let eff = self.effective;
        let sx = eff.margin + col * (eff.tile_width + eff.spacing) + self.extrude;
        let sy = eff.margin + row * (eff.tile_height + eff.spacing) + self.extrude;
        Rect::new(
            sx as f32,
            sy as f32,
            self.original.tile_width as f32,
            self.original.tile_height as f32,
        )
    }
}

/// Arena of tilesets in declaration order. Draw instances refer to entries
/// by index.
#[derive(Debug, Clone, Default)]
pub struct TilesetRegistry {
    tilesets: Vec<Tileset>,
}

impl TilesetRegistry {
    /// Load every tileset image relative to `base_dir` and build its atlas.
    /// Never fails: unusable tilesets become placeholders.
    pub fn build(
        ir_tilesets: &[IrTileset],
        base_dir: &Path,
        extrude: u32,
        report: &mut LoadReport,
    ) -> Self {
        let tilesets = ir_tilesets
            .iter()
            .map(|ir| build_tileset(ir, base_dir, extrude, report))
            .collect();
        Self { tilesets }
    }

    #[cfg(test)]
    pub(crate) fn from_tilesets(tilesets: Vec<Tileset>) -> Self {
        Self { tilesets }
    }

    /// All tilesets, declaration order
    pub fn as_slice(&self) -> &[Tileset] {
        &self.tilesets
    }

    /// Tileset by arena index
    pub fn get(&self, index: usize) -> Option<&Tileset> {
        self.tilesets.get(index)
    }

    /// See [`gid::resolve`].
    pub fn resolve(&self, gid: u32) -> Option<ResolvedTile> {
        gid::resolve(&self.tilesets, gid)
    }
}

fn build_tileset(ir: &IrTileset, base_dir: &Path, extrude: u32, report: &mut LoadReport) -> Tileset {
    let original = TileGeometry {
        tile_width: ir.tile_w,
        tile_height: ir.tile_h,
        spacing: ir.spacing,
        margin: ir.margin,
    };

    let Some(image) = &ir.image else {
        if ir.source.is_some() {
            // an unresolved external reference was already reported by the loader
            tracing::debug!("tileset '{}' has no embedded image", ir.name);
        } else {
            report.warn(LoadWarning::TilesetImage {
                tileset: ir.name.clone(),
                reason: "no image declared".to_owned(),
            });
        }
        return Tileset::placeholder(ir, original, None);
    };

    let path = base_dir.join(image);
    let src = match PixelBuffer::load(&path) {
        Ok(src) if !src.is_empty() => src,
        Ok(_) => {
            report.warn(LoadWarning::TilesetImage {
                tileset: ir.name.clone(),
                reason: format!("{} is empty", path.display()),
            });
            return Tileset::placeholder(ir, original, Some(path));
        }
        Err(e) => {
            report.warn(LoadWarning::TilesetImage {
                tileset: ir.name.clone(),
                reason: format!("{e:#}"),
            });
            return Tileset::placeholder(ir, original, Some(path));
        }
    };

    let fit_columns = original.columns_in(src.width());
    let columns = match ir.columns {
        Some(c) if c > fit_columns && fit_columns > 0 => {
            report.warn(LoadWarning::TilesetGeometry {
                tileset: ir.name.clone(),
                what: "columns",
                declared: c,
                fits: fit_columns,
            });
            fit_columns
        }
        Some(c) if c > 0 => c,
        _ => fit_columns,
    };
    let fit_tiles = columns.saturating_mul(original.rows_in(src.height()));
    let tile_count = match ir.tilecount {
        Some(n) if n > fit_tiles && fit_tiles > 0 => {
            report.warn(LoadWarning::TilesetGeometry {
                tileset: ir.name.clone(),
                what: "tiles",
                declared: n,
                fits: fit_tiles,
            });
            fit_tiles
        }
        Some(n) => n,
        None => fit_tiles,
    };

    let (atlas, effective, extrude) = match extrude_tiles(&src, original, columns, extrude) {
        Ok(atlas) => (atlas, original.extruded(extrude), extrude),
        Err(e) => {
            report.warn(LoadWarning::AtlasFallback {
                tileset: ir.name.clone(),
                reason: e.to_string(),
            });
            (src, original, 0)
        }
    };

    tracing::debug!(
        "tileset '{}': gids {}..{}, {} columns, atlas {}x{}",
        ir.name,
        ir.first_gid,
        ir.first_gid.saturating_add(tile_count),
        columns,
        atlas.width(),
        atlas.height()
    );

    Tileset {
        name: ir.name.clone(),
        first_gid: ir.first_gid,
        tile_count,
        columns: columns.max(1),
        original,
        effective,
        extrude,
        image_path: Some(path),
        properties: ir.properties.clone(),
        atlas,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn ir(first_gid: u32, tilecount: Option<u32>, columns: Option<u32>) -> IrTileset {
        IrTileset {
            name: format!("ts{first_gid}"),
            first_gid,
            image: None,
            source: None,
            tile_w: 4,
            tile_h: 4,
            tilecount,
            columns,
            spacing: 0,
            margin: 0,
            properties: Properties::new(),
        }
    }

    /// Opaque 2-column tileset of 4x4 tiles with an unextruded atlas.
    pub(crate) fn solid_tileset(first_gid: u32, tile_count: u32) -> Tileset {
        let geom = TileGeometry {
            tile_width: 4,
            tile_height: 4,
            spacing: 0,
            margin: 0,
        };
        let rows = tile_count.div_ceil(2).max(1);
        let atlas = PixelBuffer::from_rgba8(8, rows * 4, vec![255; 8 * rows as usize * 4 * 4])
            .expect("sized buffer");
        Tileset {
            atlas,
            tile_count,
            columns: 2,
            ..Tileset::placeholder(&ir(first_gid, Some(tile_count), Some(2)), geom, None)
        }
    }

    pub(crate) fn placeholder_tileset(first_gid: u32, tile_count: u32) -> Tileset {
        let geom = TileGeometry {
            tile_width: 4,
            tile_height: 4,
            spacing: 0,
            margin: 0,
        };
        Tileset::placeholder(&ir(first_gid, Some(tile_count), Some(2)), geom, None)
    }

    fn write_sheet(dir: &Path, name: &str, w: u32, h: u32) {
        let img = image::RgbaImage::from_fn(w, h, |x, y| image::Rgba([x as u8, y as u8, 0, 255]));
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn tile_rect_skips_extruded_border() {
        let mut ts = solid_tileset(1, 4);
        ts.extrude = 1;
        ts.effective = ts.original.extruded(1);
        assert_eq!(ts.tile_rect(0), Rect::new(1.0, 1.0, 4.0, 4.0));
        assert_eq!(ts.tile_rect(3), Rect::new(7.0, 7.0, 4.0, 4.0));
    }

    #[test]
    fn tile_rect_honors_spacing_and_margin_without_extrusion() {
        let mut ts = solid_tileset(1, 4);
        ts.effective.spacing = 2;
        ts.effective.margin = 1;
        assert_eq!(ts.tile_rect(1), Rect::new(7.0, 1.0, 4.0, 4.0));
        assert_eq!(ts.tile_rect(2), Rect::new(1.0, 7.0, 4.0, 4.0));
    }

    #[test]
    fn builds_extruded_atlas_and_infers_counts() {
        let dir = tempfile::tempdir().unwrap();
        write_sheet(dir.path(), "sheet.png", 8, 12);
        let mut desc = ir(1, None, None);
        desc.image = Some("sheet.png".into());

        let mut report = LoadReport::new();
        let reg = TilesetRegistry::build(&[desc], dir.path(), 1, &mut report);
        let ts = reg.get(0).unwrap();

        assert!(report.warnings().is_empty());
        assert_eq!(ts.columns, 2);
        assert_eq!(ts.tile_count, 6);
        assert_eq!(ts.effective.tile_width, 6);
        assert_eq!(ts.effective.spacing, 0);
        assert_eq!((ts.atlas().width(), ts.atlas().height()), (12, 18));
        assert_eq!(reg.resolve(6), Some(ResolvedTile { tileset: 0, local_id: 5 }));
    }

    #[test]
    fn missing_image_becomes_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let mut desc = ir(1, Some(4), Some(2));
        desc.image = Some("missing.png".into());

        let mut report = LoadReport::new();
        let reg = TilesetRegistry::build(&[desc], dir.path(), 1, &mut report);

        assert!(reg.get(0).unwrap().is_placeholder());
        assert_eq!(reg.resolve(1), None);
        assert!(matches!(
            report.warnings(),
            [LoadWarning::TilesetImage { .. }]
        ));
    }

    #[test]
    fn failed_extrusion_keeps_original_image() {
        let dir = tempfile::tempdir().unwrap();
        // tiles taller than the sheet: no rows fit
        write_sheet(dir.path(), "short.png", 8, 2);
        let mut desc = ir(1, Some(2), Some(2));
        desc.image = Some("short.png".into());

        let mut report = LoadReport::new();
        let reg = TilesetRegistry::build(&[desc], dir.path(), 1, &mut report);
        let ts = reg.get(0).unwrap();

        assert!(!ts.is_placeholder());
        assert_eq!(ts.extrude, 0);
        assert_eq!(ts.effective, ts.original);
        assert_eq!((ts.atlas().width(), ts.atlas().height()), (8, 2));
        assert!(matches!(
            report.warnings(),
            [LoadWarning::AtlasFallback { .. }]
        ));
    }

    #[test]
    fn declared_layout_larger_than_the_image_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        write_sheet(dir.path(), "sheet.png", 8, 4);
        let mut desc = ir(1, Some(u32::MAX), Some(1_000_000_000));
        desc.image = Some("sheet.png".into());

        let mut report = LoadReport::new();
        let reg = TilesetRegistry::build(&[desc], dir.path(), 1, &mut report);
        let ts = reg.get(0).unwrap();

        assert_eq!((ts.columns, ts.tile_count), (2, 2));
        assert_eq!(ts.extrude, 1);
        assert_eq!((ts.atlas().width(), ts.atlas().height()), (12, 6));
        assert_eq!(reg.resolve(3), None);
        assert!(matches!(
            report.warnings(),
            [
                LoadWarning::TilesetGeometry { what: "columns", fits: 2, .. },
                LoadWarning::TilesetGeometry { what: "tiles", fits: 2, .. },
            ]
        ));
    }
}
