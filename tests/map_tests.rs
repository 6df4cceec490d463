// tests/map_tests.rs

use std::path::Path;

use campus_tiled::{LoadOptions, LoadWarning, MapModel};
use image::{Rgba, RgbaImage};
use macroquad::prelude::{vec2, Rect};
use tempfile::TempDir;

/// 8x8 sheet of four 4x4 tiles, each a different color.
fn fixture_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let colors = [[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255], [255, 255, 0, 255]];
    RgbaImage::from_fn(8, 8, |x, y| Rgba(colors[(y / 4 * 2 + x / 4) as usize]))
        .save(dir.path().join("tiles.png"))
        .unwrap();
    dir
}

const TILESET: &str = r#"{"firstgid": 1, "name": "tiles", "image": "tiles.png",
    "tilewidth": 4, "tileheight": 4, "tilecount": 4, "columns": 2}"#;

fn document(tilesets: &str, layers: &str) -> String {
    format!(
        r#"{{"width": 2, "height": 2, "tilewidth": 4, "tileheight": 4,
            "tilesets": [{tilesets}], "layers": [{layers}]}}"#
    )
}

fn load(dir: &Path, json: &str) -> MapModel {
    MapModel::load_from_str(json, dir, &dir.join("campus.tmj"), &LoadOptions::default())
        .expect("map should load")
}

#[test]
fn two_by_two_layer_emits_instances_in_row_major_order() {
    let dir = fixture_dir();
    let layers = r#"{"type": "tilelayer", "name": "ground", "width": 2, "height": 2,
                     "data": [1, 0, 2, 0]}"#;
    let map = load(dir.path(), &document(TILESET, layers));

    let inst = map.draw_instances();
    assert_eq!(inst.len(), 2);
    // cell 0 is column 0 row 0, cell 2 is column 0 row 1
    assert_eq!(inst[0].dest, vec2(0.0, 0.0));
    assert_eq!(inst[1].dest, vec2(0.0, 4.0));
    assert_eq!((inst[0].local_id, inst[1].local_id), (0, 1));
    assert!(inst.iter().all(|i| i.alpha == 255));

    // extruded by one pixel: each cell is 6x6 and the tile sits at +1,+1
    let ts = &map.tilesets()[0];
    assert_eq!((ts.atlas().width(), ts.atlas().height()), (12, 12));
    assert_eq!(inst[1].src, Rect::new(7.0, 1.0, 4.0, 4.0));
}

#[test]
fn entrance_layer_produces_trigger() {
    let dir = fixture_dir();
    let layers = r#"{"type": "objectgroup", "name": "entrance", "objects": [
        {"id": 3, "name": "Library", "x": 0, "y": 0, "width": 8, "height": 4,
         "properties": [{"name": "target", "type": "string", "value": "library.map"}]}
    ]}"#;
    let map = load(dir.path(), &document(TILESET, layers));

    assert_eq!(map.entrances().len(), 1);
    let e = &map.entrances()[0];
    assert_eq!(e.name, "Library");
    assert_eq!(e.target.as_deref(), Some("library.map"));
    assert_eq!(map.entrance_at(vec2(7.5, 3.5)).map(|e| e.id), Some(3));
    assert!(map.entrance_at(vec2(8.0, 0.0)).is_none());
}

#[test]
fn degenerate_polygon_is_skipped_with_one_warning() {
    let dir = fixture_dir();
    let layers = r#"{"type": "objectgroup", "name": "NotWalkable", "objects": [
        {"id": 7, "x": 0, "y": 0, "polygon": [{"x": 0, "y": 0}, {"x": 4, "y": 4}]}
    ]}"#;
    let map = load(dir.path(), &document(TILESET, layers));

    assert!(map.collision().polygons().is_empty());
    assert_eq!(map.warnings().len(), 1);
    assert!(matches!(
        map.warnings()[0],
        LoadWarning::DegeneratePolygon { object_id: 7, points: 2, .. }
    ));
}

#[test]
fn missing_tileset_image_degrades_to_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let layers = r#"{"type": "tilelayer", "name": "ground", "width": 2, "height": 2,
                     "data": [1, 2, 3, 4]}"#;
    let map = load(dir.path(), &document(TILESET, layers));

    assert!(map.tilesets()[0].is_placeholder());
    assert_eq!(map.resolve_gid(1), None);
    assert!(map.draw_instances().is_empty());
    assert!(map
        .warnings()
        .iter()
        .any(|w| matches!(w, LoadWarning::TilesetImage { .. })));
}

#[test]
fn overlapping_ranges_go_to_the_highest_first_gid() {
    let dir = fixture_dir();
    let second = r#"{"firstgid": 3, "name": "overlay", "image": "tiles.png",
        "tilewidth": 4, "tileheight": 4, "tilecount": 4, "columns": 2}"#;
    let tilesets = format!("{TILESET}, {second}");
    let map = load(dir.path(), &document(&tilesets, ""));

    let owner = map.resolve_gid(3).unwrap();
    assert_eq!((owner.tileset, owner.local_id), (1, 0));
    let owner = map.resolve_gid(2).unwrap();
    assert_eq!((owner.tileset, owner.local_id), (0, 1));
    assert_eq!(map.resolve_gid(7), None);
}

#[test]
fn rectangle_collision_is_half_open() {
    let dir = fixture_dir();
    let layers = r#"{"type": "objectgroup", "name": "NotWalkable", "objects": [
        {"id": 1, "x": 0, "y": 0, "width": 8, "height": 8}
    ]}"#;
    let map = load(dir.path(), &document(TILESET, layers));

    assert!(map.is_blocked(vec2(0.0, 0.0)));
    assert!(map.is_blocked(vec2(7.99, 7.99)));
    assert!(!map.is_blocked(vec2(8.0, 0.0)));
    assert!(!map.is_blocked(vec2(0.0, 8.0)));
    assert!(!map.is_blocked(vec2(-0.01, 4.0)));
}

#[test]
fn group_offset_and_opacity_accumulate() {
    let dir = fixture_dir();
    let layers = r#"{"type": "group", "name": "upper", "offsetx": 10, "offsety": 2,
        "opacity": 0.5, "layers": [
            {"type": "tilelayer", "name": "roof", "width": 2, "height": 2,
             "opacity": 0.5, "offsetx": 1, "data": [0, 0, 0, 4]}
        ]}"#;
    let map = load(dir.path(), &document(TILESET, layers));

    let inst = map.draw_instances();
    assert_eq!(inst.len(), 1);
    assert_eq!(inst[0].dest, vec2(15.0, 6.0));
    assert_eq!(inst[0].alpha, 64);
}

#[test]
fn loading_twice_gives_the_same_model() {
    let dir = fixture_dir();
    let layers = r#"
        {"type": "tilelayer", "name": "ground", "width": 2, "height": 2, "data": [1, 2, 3, 4]},
        {"type": "objectgroup", "name": "objects", "objects": [
            {"id": 1, "name": "protagonist", "x": 2, "y": 2, "width": 4, "height": 4},
            {"id": 2, "name": "bench", "type": "seat", "x": 0, "y": 0, "width": 4, "height": 4}
        ]}"#;
    let json = document(TILESET, layers);
    let a = load(dir.path(), &json);
    let b = load(dir.path(), &json);

    assert_eq!(a.draw_instances().len(), b.draw_instances().len());
    assert_eq!(a.draw_instances(), b.draw_instances());
    assert_eq!(a.seats().len(), b.seats().len());
    assert_eq!(a.spawn_point(), b.spawn_point());
    assert_eq!(a.spawn_point(), Some(vec2(4.0, 4.0)));
}

#[test]
fn spawn_override_sidecar_from_disk() {
    let dir = fixture_dir();
    let map_path = dir.path().join("campus.tmj");
    std::fs::write(&map_path, document(TILESET, "")).unwrap();
    std::fs::write(
        dir.path().join("spawn_overrides.json"),
        r#"{"campus.tmj": {"mode": "pixel", "x": 12.5, "y": 3}}"#,
    )
    .unwrap();

    let map = MapModel::load(&map_path, &LoadOptions::default()).unwrap();
    assert_eq!(map.spawn_point(), Some(vec2(12.5, 3.0)));
}

#[test]
fn composed_instances_line_up_with_atlas_and_culling() {
    let dir = fixture_dir();
    // bit 31 = horizontal flip
    let layers = r#"{"type": "tilelayer", "name": "ground", "width": 2, "height": 2,
                     "data": [4, 2147483651, 0, 1]}"#;
    let map = load(dir.path(), &document(TILESET, layers));

    let inst = map.draw_instances();
    assert_eq!(inst.len(), 3);
    assert_eq!(inst[1].dest, vec2(4.0, 0.0));
    assert!(inst[1].flip_h && !inst[1].flip_v && !inst[1].flip_d);
    assert_eq!(inst[1].local_id, 2);

    for i in inst {
        let ts = &map.tilesets()[i.tileset];
        assert_eq!(i.src, ts.tile_rect(i.local_id));
        assert!(i.src.right() <= ts.atlas().width() as f32);
        assert!(i.src.bottom() <= ts.atlas().height() as f32);
        assert_eq!(i.size(), vec2(4.0, 4.0));
    }
    assert_eq!(map.visible_instances(vec2(0.0, 0.0), vec2(8.0, 8.0)), vec![0, 1, 2]);
    assert!(map.visible_instances(vec2(2000.0, 2000.0), vec2(2100.0, 2100.0)).is_empty());
}

#[test]
fn external_tileset_in_subdirectory_finds_its_image() {
    let dir = tempfile::tempdir().unwrap();
    let sets = dir.path().join("tilesets");
    std::fs::create_dir(&sets).unwrap();
    RgbaImage::from_pixel(8, 4, Rgba([9, 9, 9, 255]))
        .save(sets.join("sheet.png"))
        .unwrap();
    std::fs::write(
        sets.join("ext.tsj"),
        r#"{"name": "ext", "image": "sheet.png", "tilewidth": 4, "tileheight": 4,
            "tilecount": 2, "columns": 2}"#,
    )
    .unwrap();
    let layers = r#"{"type": "tilelayer", "name": "ground", "width": 2, "height": 2,
                     "data": [1, 2, 0, 0]}"#;
    let map = load(
        dir.path(),
        &document(r#"{"firstgid": 1, "source": "tilesets/ext.tsj"}"#, layers),
    );

    assert!(!map.tilesets()[0].is_placeholder());
    assert_eq!(map.draw_instances().len(), 2);
    assert!(map.warnings().is_empty());
}

#[test]
fn oversized_tileset_geometry_does_not_abort_the_load() {
    let dir = fixture_dir();
    let huge = r#"{"firstgid": 1, "name": "tiles", "image": "tiles.png",
        "tilewidth": 4, "tileheight": 4, "tilecount": 4000000000, "columns": 1000000000}"#;
    let layers = r#"{"type": "tilelayer", "name": "ground", "width": 2, "height": 2,
                     "data": [1, 4, 5, 0]}"#;
    let map = load(dir.path(), &document(huge, layers));

    let ts = &map.tilesets()[0];
    assert_eq!((ts.columns, ts.tile_count), (2, 4));
    // gid 5 is past the clamped range
    assert_eq!(map.draw_instances().len(), 2);
    assert!(map
        .warnings()
        .iter()
        .all(|w| matches!(w, LoadWarning::TilesetGeometry { .. })));
}

#[test]
fn tileset_without_firstgid_is_dropped() {
    let dir = fixture_dir();
    let anon = r#"{"name": "anon", "image": "tiles.png", "tilewidth": 4, "tileheight": 4}"#;
    let tilesets = format!("{anon}, {TILESET}");
    let layers = r#"{"type": "tilelayer", "name": "ground", "width": 2, "height": 2,
                     "data": [1, 0, 0, 0]}"#;
    let map = load(dir.path(), &document(&tilesets, layers));

    assert_eq!(map.tilesets().len(), 1);
    assert_eq!(map.tilesets()[0].name, "tiles");
    assert_eq!(map.draw_instances()[0].tileset, 0);
    assert!(matches!(
        map.warnings(),
        [LoadWarning::MalformedTileset { index: 0, .. }]
    ));
}

#[test]
fn rotated_wall_blocks_along_its_rotated_extent() {
    let dir = fixture_dir();
    let layers = r#"{"type": "objectgroup", "name": "NotWalkable", "objects": [
        {"id": 1, "x": 0, "y": 0, "width": 10, "height": 2, "rotation": 90}
    ]}"#;
    let map = load(dir.path(), &document(TILESET, layers));

    assert!(map.is_blocked(vec2(-1.0, 5.0)));
    assert!(!map.is_blocked(vec2(5.0, 1.0)));
}
