// src/loader/json_loader.rs
use crate::config::LoadOptions;
use crate::error::{LoadReport, LoadWarning, MapError};
use crate::ir_map::*;
use anyhow::Context;
use macroquad::prelude::*;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
struct JsonLayer {
    #[serde(default)]
    data: Option<Vec<u32>>,
    #[serde(default)]
    width: Option<usize>,
    #[serde(default)]
    height: Option<usize>,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default = "one")]
    opacity: f32,
    #[serde(default)]
    offsetx: f32,
    #[serde(default)]
    offsety: f32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    class: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    properties: Vec<JsonValue>,
    #[serde(default)]
    objects: Vec<JsonValue>,
    #[serde(default)]
    layers: Vec<JsonValue>,
}

fn default_true() -> bool {
    true
}
fn one() -> f32 {
    1.0
}

#[derive(Deserialize)]
struct JsonMap {
    width: u32,
    height: u32,
    tilewidth: u32,
    tileheight: u32,
    layers: Vec<JsonValue>,
    tilesets: Vec<JsonValue>,
    #[serde(default)]
    properties: Vec<JsonValue>,
}

/// Tileset entry: either embedded (has `image`) or a `source` reference.
#[derive(Deserialize)]
struct JsonTileset {
    #[serde(default)]
    firstgid: Option<u32>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    tilewidth: Option<u32>,
    #[serde(default)]
    tileheight: Option<u32>,
    #[serde(default)]
    tilecount: Option<u32>,
    #[serde(default)]
    columns: Option<u32>,
    #[serde(default)]
    spacing: u32,
    #[serde(default)]
    margin: u32,
    #[serde(default)]
    properties: Vec<JsonValue>,
}

#[derive(Deserialize)]
struct JsonProperty {
    name: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    value: JsonValue,
}

#[derive(Deserialize)]
struct JsonObject {
    #[serde(default)]
    id: u32,
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    class: String,
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
    #[serde(default)]
    width: f32,
    #[serde(default)]
    height: f32,
    #[serde(default)]
    rotation: f32,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default)]
    point: bool,
    #[serde(default)]
    ellipse: bool,
    #[serde(default)]
    polygon: Option<Vec<JsonObjectPoint>>,
    #[serde(default)]
    polyline: Option<Vec<JsonObjectPoint>>,
    #[serde(default)]
    gid: Option<u32>,
    #[serde(default)]
    text: Option<JsonValue>,
    #[serde(default)]
    target: Option<String>,
    #[serde(default, rename = "targetX")]
    target_x: Option<f32>,
    #[serde(default, rename = "targetY")]
    target_y: Option<f32>,
    #[serde(default)]
    properties: Vec<JsonValue>,
}

#[derive(Deserialize)]
struct JsonObjectPoint {
    x: f32,
    y: f32,
}

fn json_property_to_ir(
    prop: JsonProperty,
    report: &mut LoadReport,
) -> Option<(String, PropertyValue)> {
    let JsonProperty { name, kind, value } = prop;

    let parsed = match kind.as_deref() {
        Some("bool") => value.as_bool().map(PropertyValue::Bool),
        Some("int") | Some("object") => value.as_i64().map(PropertyValue::I64),
        Some("float") => value.as_f64().map(|n| PropertyValue::F32(n as f32)),
        Some("string") | Some("file") | Some("color") | Some("class") => {
            value.as_str().map(|s| PropertyValue::String(s.to_owned()))
        }
        Some(other) => {
            report.warn(LoadWarning::UnsupportedPropertyType {
                name,
                kind: other.to_owned(),
            });
            return None;
        }
        None => {
            if let Some(v) = value.as_bool() {
                Some(PropertyValue::Bool(v))
            } else if let Some(v) = value.as_i64() {
                Some(PropertyValue::I64(v))
            } else if let Some(v) = value.as_f64() {
                Some(PropertyValue::F32(v as f32))
            } else {
                value.as_str().map(|s| PropertyValue::String(s.to_owned()))
            }
        }
    };

    parsed.map(|value| (name, value))
}

fn properties_from_json(props: Vec<JsonValue>, report: &mut LoadReport) -> Properties {
    let mut out = Properties::new();
    for p in props {
        let Ok(p) = serde_json::from_value::<JsonProperty>(p) else {
            tracing::debug!("skipping property entry without name/value");
            continue;
        };
        if let Some((name, value)) = json_property_to_ir(p, report) {
            out.insert(name, value);
        }
    }
    out
}

fn points(pts: Vec<JsonObjectPoint>) -> Vec<Vec2> {
    pts.into_iter().map(|p| vec2(p.x, p.y)).collect()
}

fn object_to_ir(obj: JsonObject, report: &mut LoadReport) -> IrObject {
    let shape = if let Some(gid) = obj.gid {
        IrObjectShape::Tile { gid }
    } else if obj.point {
        IrObjectShape::Point
    } else if obj.ellipse {
        IrObjectShape::Ellipse
    } else if let Some(polygon) = obj.polygon {
        IrObjectShape::Polygon(points(polygon))
    } else if let Some(polyline) = obj.polyline {
        IrObjectShape::Polyline(points(polyline))
    } else if obj.text.as_ref().is_some_and(JsonValue::is_object) {
        IrObjectShape::Text
    } else {
        IrObjectShape::Rectangle
    };

    let class_name = if !obj.class.is_empty() {
        obj.class
    } else {
        obj.kind
    };

    IrObject {
        id: obj.id,
        name: obj.name,
        class_name,
        x: obj.x,
        y: obj.y,
        width: obj.width,
        height: obj.height,
        rotation: obj.rotation,
        visible: obj.visible,
        shape,
        text: obj.text,
        target: obj.target,
        target_x: obj.target_x,
        target_y: obj.target_y,
        properties: properties_from_json(obj.properties, report),
    }
}

/// Check the extension and read the document. Returns the text and the
/// directory relative paths inside it resolve against.
pub fn read_map_file(path: &Path) -> Result<(String, PathBuf), MapError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") | Some("tmj") => {}
        _ => return Err(MapError::UnsupportedFormat(path.display().to_string())),
    }

    let txt = std::fs::read_to_string(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let map_dir = path
        .parent()
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./"));

    Ok((txt, map_dir))
}

/// Decode a map document into the IR.
///
/// Only a missing/zero map dimension or a missing `tilesets`/`layers` array
/// fails the decode; everything below that level is skipped with a warning.
pub fn decode_map_str_to_ir(
    txt: &str,
    origin: &Path,
    map_dir: &Path,
    options: &LoadOptions,
    report: &mut LoadReport,
) -> Result<IrMap, MapError> {
    let j: JsonMap = serde_json::from_str(txt).map_err(|source| MapError::Json {
        path: origin.to_path_buf(),
        source,
    })?;

    if j.width == 0 || j.height == 0 || j.tilewidth == 0 || j.tileheight == 0 {
        return Err(MapError::InvalidMap(format!(
            "map dimensions must be positive, got {}x{} tiles of {}x{} px",
            j.width, j.height, j.tilewidth, j.tileheight
        )));
    }

    let default_tile = (j.tilewidth, j.tileheight);
    let mut ir_tilesets = Vec::with_capacity(j.tilesets.len());
    for (index, raw) in j.tilesets.into_iter().enumerate() {
        let ts = match serde_json::from_value::<JsonTileset>(raw) {
            Ok(ts) => ts,
            Err(e) => {
                report.warn(LoadWarning::MalformedTileset {
                    index,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let Some(first_gid) = ts.firstgid.filter(|&g| g > 0) else {
            report.warn(LoadWarning::MalformedTileset {
                index,
                reason: "missing or zero firstgid".to_owned(),
            });
            continue;
        };
        ir_tilesets.push(tileset_to_ir(ts, first_gid, default_tile, map_dir, options, report));
    }

    let layers = decode_layers(j.layers, j.width as usize, j.height as usize, report);

    Ok(IrMap {
        width: j.width,
        height: j.height,
        tile_w: j.tilewidth,
        tile_h: j.tileheight,
        properties: properties_from_json(j.properties, report),
        tilesets: ir_tilesets,
        layers,
    })
}

fn tileset_to_ir(
    mut ts: JsonTileset,
    first_gid: u32,
    (map_tile_w, map_tile_h): (u32, u32),
    map_dir: &Path,
    options: &LoadOptions,
    report: &mut LoadReport,
) -> IrTileset {
    if ts.image.is_none() {
        if let Some(source) = ts.source.clone() {
            if options.resolve_external_tilesets {
                match load_external_tileset(map_dir, &source) {
                    Ok(ext) => {
                        // the external file's image is relative to the file itself
                        let image = ext
                            .image
                            .as_deref()
                            .map(|img| relative_to_source(&source, img));
                        ts = JsonTileset {
                            firstgid: Some(first_gid),
                            source: Some(source),
                            image,
                            ..ext
                        };
                    }
                    Err(e) => report.warn(LoadWarning::TilesetImage {
                        tileset: source,
                        reason: format!("{e:#}"),
                    }),
                }
            } else {
                tracing::debug!("leaving external tileset {source} unresolved");
            }
        }
    }

    let name = if !ts.name.is_empty() {
        ts.name
    } else if let Some(source) = &ts.source {
        source.clone()
    } else {
        format!("firstgid {first_gid}")
    };

    IrTileset {
        name,
        first_gid,
        image: ts.image,
        source: ts.source,
        tile_w: ts.tilewidth.unwrap_or(map_tile_w),
        tile_h: ts.tileheight.unwrap_or(map_tile_h),
        tilecount: ts.tilecount,
        columns: ts.columns,
        spacing: ts.spacing,
        margin: ts.margin,
        properties: properties_from_json(ts.properties, report),
    }
}

fn relative_to_source(source: &str, image: &str) -> String {
    match Path::new(source).parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            dir.join(image).to_string_lossy().into_owned()
        }
        _ => image.to_owned(),
    }
}

fn load_external_tileset(map_dir: &Path, source: &str) -> anyhow::Result<JsonTileset> {
    if !(source.ends_with(".json") || source.ends_with(".tsj")) {
        anyhow::bail!("External tileset must be JSON: {source}");
    }
    let ts_path = map_dir.join(source);
    let txt = std::fs::read_to_string(&ts_path)
        .with_context(|| format!("Reading tileset {}", ts_path.display()))?;
    let ext: JsonTileset = serde_json::from_str(&txt)
        .with_context(|| format!("Parsing tileset {}", ts_path.display()))?;
    Ok(ext)
}

fn decode_layers(
    raw_layers: Vec<JsonValue>,
    map_w: usize,
    map_h: usize,
    report: &mut LoadReport,
) -> Vec<IrLayer> {
    let mut ir_layers = Vec::with_capacity(raw_layers.len());
    for (index, raw) in raw_layers.into_iter().enumerate() {
        let l = match serde_json::from_value::<JsonLayer>(raw) {
            Ok(l) => l,
            Err(e) => {
                report.warn(LoadWarning::MalformedLayer {
                    index,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let layer_name = l.name;
        let kind = match l.kind.as_deref().unwrap_or("tilelayer") {
            "tilelayer" => {
                let width = l.width.unwrap_or(map_w);
                let height = l.height.unwrap_or(map_h);
                let Some(data) = l.data else {
                    report.warn(LoadWarning::MalformedLayer {
                        index,
                        reason: format!("tile layer '{layer_name}' has no data array"),
                    });
                    continue;
                };
                if data.len() != width * height {
                    report.warn(LoadWarning::LayerSizeMismatch {
                        layer: layer_name,
                        len: data.len(),
                        width,
                        height,
                    });
                    continue;
                }
                IrLayerKind::Tiles {
                    width,
                    height,
                    data,
                }
            }
            "objectgroup" => {
                let mut objects = Vec::with_capacity(l.objects.len());
                for (oi, raw_obj) in l.objects.into_iter().enumerate() {
                    match serde_json::from_value::<JsonObject>(raw_obj) {
                        Ok(obj) => objects.push(object_to_ir(obj, report)),
                        Err(e) => report.warn(LoadWarning::MalformedObject {
                            layer: layer_name.clone(),
                            index: oi,
                            reason: e.to_string(),
                        }),
                    }
                }
                IrLayerKind::Objects { objects }
            }
            "group" => IrLayerKind::Group {
                layers: decode_layers(l.layers, map_w, map_h, report),
            },
            other => {
                tracing::debug!("layer '{layer_name}' has unsupported type '{other}'");
                IrLayerKind::Unsupported
            }
        };

        ir_layers.push(IrLayer {
            name: layer_name,
            class_name: l.class,
            visible: l.visible,
            opacity: l.opacity,
            offset: vec2(l.offsetx, l.offsety),
            properties: properties_from_json(l.properties, report),
            kind,
        });
    }
    ir_layers
}
