use macroquad::prelude::*;
use std::path::Path;

use crate::compose::{compose_layers, DrawInstance};
use crate::config::LoadOptions;
use crate::error::{LoadReport, LoadWarning, MapError};
use crate::gid::ResolvedTile;
use crate::ir_map::{IrMap, Properties};
use crate::loader::json_loader::{decode_map_str_to_ir, read_map_file};
use crate::loader::spawn_overrides::SpawnOverrides;
use crate::objects::{
    parse_object_layers, DecorativeActor, EntranceTrigger, InteractionPoint, MinigameTrigger,
    SeatObject, TextLabel,
};
use crate::render::cull::query_visible_rect;
use crate::spatial::{rect_contains, ChunkIndex, CollisionIndex};
use crate::tileset::{Tileset, TilesetRegistry};

/// A fully loaded map: tileset atlases, draw instances, typed objects and
/// collision. Read-only after construction; load a new one to switch maps.
#[derive(Debug)]
pub struct MapModel {
    width: u32,
    height: u32,
    tile_w: u32,
    tile_h: u32,
    properties: Properties,
    tilesets: TilesetRegistry,
    instances: Vec<DrawInstance>,
    chunks: ChunkIndex,
    labels: Vec<TextLabel>,
    entrances: Vec<EntranceTrigger>,
    minigames: Vec<MinigameTrigger>,
    interactions: Vec<InteractionPoint>,
    seats: Vec<SeatObject>,
    actors: Vec<DecorativeActor>,
    spawn: Option<Vec2>,
    collision: CollisionIndex,
    warnings: Vec<LoadWarning>,
}

impl MapModel {
    /// Load a `.tmj`/`.json` map. Image paths resolve against the map's
    /// directory; the spawn override sidecar is looked up next to it.
    pub fn load(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self, MapError> {
        let path = path.as_ref();
        let (txt, base) = read_map_file(path)?;
        Self::load_from_str(&txt, &base, path, options)
    }

    /// Build a map from document text. `base_dir` resolves relative paths;
    /// `map_key` names the map for errors and spawn override lookup.
    pub fn load_from_str(
        json: &str,
        base_dir: &Path,
        map_key: &Path,
        options: &LoadOptions,
    ) -> Result<Self, MapError> {
        let mut report = LoadReport::new();
        let ir = decode_map_str_to_ir(json, map_key, base_dir, options, &mut report)?;

        let overrides = match &options.spawn_overrides_file {
            Some(name) => SpawnOverrides::load(&base_dir.join(name), &mut report),
            None => SpawnOverrides::default(),
        };
        let spawn_override = overrides.lookup(map_key);

        let mut map = Self::from_ir(ir, base_dir, options, report);
        if let Some(o) = spawn_override {
            map.spawn = Some(o.to_pixels(map.tile_size()));
        }

        tracing::info!(
            "loaded map {}: {}x{} tiles, {} tilesets, {} tiles, {} regions, {} warnings",
            map_key.display(),
            map.width,
            map.height,
            map.tilesets.as_slice().len(),
            map.instances.len(),
            map.collision.len(),
            map.warnings.len()
        );
        Ok(map)
    }

    fn from_ir(ir: IrMap, base_dir: &Path, options: &LoadOptions, mut report: LoadReport) -> Self {
        let tile_size = vec2(ir.tile_w as f32, ir.tile_h as f32);
        let tilesets = TilesetRegistry::build(&ir.tilesets, base_dir, options.extrude, &mut report);
        let instances = compose_layers(&ir.layers, tile_size, &tilesets);
        let chunks = ChunkIndex::build(&instances);
        let objects = parse_object_layers(&ir.layers, tile_size, &mut report);
        let collision = objects.non_walkable.into_iter().collect();

        Self {
            width: ir.width,
            height: ir.height,
            tile_w: ir.tile_w,
            tile_h: ir.tile_h,
            properties: ir.properties,
            tilesets,
            instances,
            chunks,
            labels: objects.labels,
            entrances: objects.entrances,
            minigames: objects.minigames,
            interactions: objects.interactions,
            seats: objects.seats,
            actors: objects.actors,
            spawn: objects.spawn,
            collision,
            warnings: report.into_warnings(),
        }
    }

    /// Width in tiles
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in tiles
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Tile width in pixels
    pub fn tile_width(&self) -> u32 {
        self.tile_w
    }

    /// Tile height in pixels
    pub fn tile_height(&self) -> u32 {
        self.tile_h
    }

    /// Tile size in pixels
    pub fn tile_size(&self) -> Vec2 {
        vec2(self.tile_w as f32, self.tile_h as f32)
    }

    /// Map width in pixels
    pub fn pixel_width(&self) -> u32 {
        self.width * self.tile_w
    }

    /// Map height in pixels
    pub fn pixel_height(&self) -> u32 {
        self.height * self.tile_h
    }

    /// Map-level custom properties
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Tilesets in declaration order; [`DrawInstance::tileset`] indexes this.
    pub fn tilesets(&self) -> &[Tileset] {
        self.tilesets.as_slice()
    }

    /// Owner of a GID (flip flags must already be masked off).
    pub fn resolve_gid(&self, gid: u32) -> Option<ResolvedTile> {
        self.tilesets.resolve(gid)
    }

    /// Every tile to draw, in paint order
    pub fn draw_instances(&self) -> &[DrawInstance] {
        &self.instances
    }

    /// Indices into [`MapModel::draw_instances`] near the view, in paint order.
    pub fn visible_instances(&self, view_min: Vec2, view_max: Vec2) -> Vec<usize> {
        query_visible_rect(&self.chunks, view_min, view_max)
    }

    /// Text labels
    pub fn labels(&self) -> &[TextLabel] {
        &self.labels
    }

    /// Entrances to other maps
    pub fn entrances(&self) -> &[EntranceTrigger] {
        &self.entrances
    }

    /// Minigame triggers
    pub fn minigames(&self) -> &[MinigameTrigger] {
        &self.minigames
    }

    /// Counters and other interaction points
    pub fn interactions(&self) -> &[InteractionPoint] {
        &self.interactions
    }

    /// Seats and tables
    pub fn seats(&self) -> &[SeatObject] {
        &self.seats
    }

    /// Decorative actors
    pub fn actors(&self) -> &[DecorativeActor] {
        &self.actors
    }

    /// Player start, if the map (or the override sidecar) defines one
    pub fn spawn_point(&self) -> Option<Vec2> {
        self.spawn
    }

    /// Non-walkable regions
    pub fn collision(&self) -> &CollisionIndex {
        &self.collision
    }

    /// True when `point` (world pixels) is inside a non-walkable region.
    pub fn is_blocked(&self, point: Vec2) -> bool {
        self.collision.is_blocked(point)
    }

    /// First entrance whose area contains `point`.
    pub fn entrance_at(&self, point: Vec2) -> Option<&EntranceTrigger> {
        self.entrances.iter().find(|e| rect_contains(&e.rect, point))
    }

    /// First interaction point whose area contains `point`.
    pub fn interaction_at(&self, point: Vec2) -> Option<&InteractionPoint> {
        self.interactions.iter().find(|i| rect_contains(&i.rect, point))
    }

    /// First minigame trigger whose area contains `point`.
    pub fn minigame_at(&self, point: Vec2) -> Option<&MinigameTrigger> {
        self.minigames.iter().find(|m| rect_contains(&m.rect, point))
    }

    /// Recoverable problems met while loading
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::CHUNK_SIZE;
    use image::{Rgba, RgbaImage};
    use std::path::PathBuf;

    // Two 4x4 tiles side by side: red, then blue.
    fn write_sheet(dir: &Path) {
        RgbaImage::from_fn(8, 4, |x, _| {
            if x < 4 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        })
        .save(dir.join("sheet.png"))
        .unwrap();
    }

    fn map_json(width: u32, height: u32, data: &[u32], objects: &str) -> String {
        format!(
            r#"{{
              "width": {width}, "height": {height}, "tilewidth": 4, "tileheight": 4,
              "properties": [{{"name": "music", "type": "string", "value": "campus"}}],
              "tilesets": [{{
                "firstgid": 1, "name": "sheet", "image": "sheet.png",
                "imagewidth": 8, "imageheight": 4, "tilewidth": 4, "tileheight": 4,
                "columns": 2, "tilecount": 2
              }}],
              "layers": [
                {{"type": "tilelayer", "name": "ground", "width": {width}, "height": {height},
                  "data": {data:?}}},
                {{"type": "objectgroup", "name": "objects", "objects": [{objects}]}}
              ]
            }}"#
        )
    }

    fn load(dir: &Path, json: &str) -> MapModel {
        MapModel::load_from_str(json, dir, &dir.join("m.tmj"), &LoadOptions::default()).unwrap()
    }

    #[test]
    fn builds_instances_objects_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        write_sheet(dir.path());
        let objects = r#"
            {"id": 1, "name": "Protagonist", "x": 4, "y": 0, "width": 4, "height": 4},
            {"id": 2, "name": "shop", "type": "OrderCounter", "x": 0, "y": 4, "width": 4, "height": 4,
             "properties": [{"name": "dishes", "type": "string", "value": "Ramen, Curry"}]}
        "#;
        let map = load(dir.path(), &map_json(2, 2, &[1, 0, 2, 0], objects));

        assert_eq!((map.width(), map.height()), (2, 2));
        assert_eq!((map.pixel_width(), map.pixel_height()), (8, 8));
        assert_eq!(map.properties().get_string("music"), Some("campus"));
        assert_eq!(map.tilesets().len(), 1);

        let inst = map.draw_instances();
        assert_eq!(inst.len(), 2);
        assert_eq!(inst[0].dest, vec2(0.0, 0.0));
        assert_eq!(inst[0].local_id, 0);
        assert_eq!(inst[1].dest, vec2(0.0, 4.0));
        assert_eq!(inst[1].local_id, 1);

        assert_eq!(map.spawn_point(), Some(vec2(6.0, 2.0)));
        let counter = map.interaction_at(vec2(1.0, 5.0)).unwrap();
        assert_eq!(counter.options, vec!["Ramen", "Curry"]);
        assert!(map.interaction_at(vec2(4.0, 5.0)).is_none());
        assert!(map.warnings().is_empty());
    }

    #[test]
    fn visible_instances_follow_the_view() {
        let dir = tempfile::tempdir().unwrap();
        write_sheet(dir.path());
        let width = (CHUNK_SIZE as u32 / 4) * 4;
        let mut data = vec![0; width as usize];
        data[0] = 1;
        data[width as usize - 1] = 2;
        let map = load(dir.path(), &map_json(width, 1, &data, ""));

        assert_eq!(map.visible_instances(Vec2::ZERO, vec2(8.0, 8.0)), vec![0]);
        let far = map.pixel_width() as f32;
        assert_eq!(map.visible_instances(vec2(far - 8.0, 0.0), vec2(far, 4.0)), vec![1]);
        assert_eq!(map.visible_instances(Vec2::ZERO, vec2(far, 4.0)), vec![0, 1]);
    }

    #[test]
    fn spawn_override_replaces_object_spawn() {
        let dir = tempfile::tempdir().unwrap();
        write_sheet(dir.path());
        std::fs::write(
            dir.path().join("spawn_overrides.json"),
            r#"{"m.tmj": {"mode": "tile", "x": 1, "y": 0}}"#,
        )
        .unwrap();
        let objects = r#"{"id": 1, "name": "protagonist", "point": true, "x": 0, "y": 0}"#;
        let map = load(dir.path(), &map_json(2, 2, &[0, 0, 0, 0], objects));
        assert_eq!(map.spawn_point(), Some(vec2(6.0, 2.0)));

        let opts = LoadOptions {
            spawn_overrides_file: None,
            ..LoadOptions::default()
        };
        let key = PathBuf::from("m.tmj");
        let json = map_json(2, 2, &[0, 0, 0, 0], objects);
        let map = MapModel::load_from_str(&json, dir.path(), &key, &opts).unwrap();
        assert_eq!(map.spawn_point(), Some(vec2(2.0, 2.0)));
    }
}
