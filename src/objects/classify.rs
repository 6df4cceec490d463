use crate::ir_map::IrObject;

/// What an object on an object layer stands for. Every object gets exactly
/// one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Player start marker
    Spawn,
    /// Text drawn on the map
    TextLabel,
    /// Portal to another map
    Entrance,
    /// Launches a minigame
    Minigame,
    /// Counter or other interaction point
    Interaction,
    /// Chair, bench or table
    Seat,
    /// Decorative NPC / prop
    Actor,
    /// Blocks movement
    NonWalkable,
    /// Nothing this crate models
    Unclassified,
}

const SPAWN_MARKER: &str = "protagonist";

/// Lower-cased layer facts the heuristics look at.
#[derive(Debug, Clone)]
pub struct LayerHint {
    name: String,
    class_name: String,
}

impl LayerHint {
    pub fn new(name: &str, class_name: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            class_name: class_name.to_lowercase(),
        }
    }

    fn is_text_layer(&self) -> bool {
        let named = |s: &str| s == "building_names" || s.contains("text") || s.contains("name");
        named(&self.name) || named(&self.class_name) || self.class_name.contains("label")
    }

    fn is_non_walkable(&self) -> bool {
        self.name.contains("notwalkable") || self.class_name.contains("notwalkable")
    }

    fn is_entrance(&self) -> bool {
        self.name == "entrance" || self.class_name == "entrance"
    }
}

fn has_text(obj: &IrObject) -> bool {
    obj.text.is_some()
        || obj.properties.get_string("text").is_some()
        || obj.properties.get_string("label").is_some()
}

/// Classification by the object's own `type`/`class` field.
fn kind_from_class(class: &str, obj: &IrObject) -> Option<ObjectKind> {
    let kind = match class {
        c if c.contains(SPAWN_MARKER) => ObjectKind::Spawn,
        "entrance" => ObjectKind::Entrance,
        c if c.contains("minigame") => ObjectKind::Minigame,
        c if c.contains("counter") || c == "interaction" => ObjectKind::Interaction,
        c if c.contains("seat") || c.contains("chair") || c.contains("table") => ObjectKind::Seat,
        c if c.contains("actor") || c.contains("npc") || c.contains("decor") => ObjectKind::Actor,
        "notwalkable" | "collision" => ObjectKind::NonWalkable,
        "text" | "label" if has_text(obj) => ObjectKind::TextLabel,
        _ => return None,
    };
    Some(kind)
}

/// Decide what `obj` is.
///
/// Precedence: the object's `type`/`class`, then a spawn marker in its name,
/// then the layer-name heuristics (non-walkable, entrance, text).
pub fn classify(layer: &LayerHint, obj: &IrObject) -> ObjectKind {
    let class = obj.class_name.to_lowercase();
    if let Some(kind) = kind_from_class(&class, obj) {
        return kind;
    }
    if obj.name.to_lowercase().contains(SPAWN_MARKER) {
        return ObjectKind::Spawn;
    }
    if layer.is_non_walkable() {
        return ObjectKind::NonWalkable;
    }
    if layer.is_entrance() {
        return ObjectKind::Entrance;
    }
    if layer.is_text_layer() && has_text(obj) {
        return ObjectKind::TextLabel;
    }
    ObjectKind::Unclassified
}
