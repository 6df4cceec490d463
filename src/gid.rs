use crate::tileset::Tileset;

pub const FLIP_H: u32 = 0x8000_0000; // bit 31
pub const FLIP_V: u32 = 0x4000_0000; // bit 30
pub const FLIP_D: u32 = 0x2000_0000; // bit 29
pub const GID_MASK: u32 = 0x1FFF_FFFF; // keep lower 29 bits (bit 28 is free)

/// Raw GID as stored in layer data, flip flags included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId(pub u32);

impl TileId {
    /// GID with flip flags
    #[inline] pub fn raw(self) -> u32 { self.0 }
    /// GID without flip flags
    #[inline] pub fn clean(self) -> u32 { self.0 & GID_MASK }
    /// Mirrored horizontally
    #[inline] pub fn flip_h(self) -> bool { (self.0 & FLIP_H) != 0 }
    /// Mirrored vertically
    #[inline] pub fn flip_v(self) -> bool { (self.0 & FLIP_V) != 0 }
    /// Transposed (anti-diagonal flip)
    #[inline] pub fn flip_d(self) -> bool { (self.0 & FLIP_D) != 0 }
    /// Empty cell
    #[inline] pub fn is_empty(self) -> bool { self.clean() == 0 }
}

/// Owner of a GID: index into the tileset arena plus tileset-local id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTile {
    /// Index into [`MapModel::tilesets`](crate::MapModel::tilesets)
    pub tileset: usize,
    /// Tile id inside that tileset
    pub local_id: u32,
}

/// Find the tileset owning `gid` (flags already masked off).
///
/// When several ranges contain the GID the highest `first_gid` wins; on an
/// exact tie the later declaration wins. Placeholders (no texture) and
/// out-of-range local ids yield `None`.
pub fn resolve(tilesets: &[Tileset], gid: u32) -> Option<ResolvedTile> {
    if gid == 0 {
        return None;
    }

    let mut best: Option<(usize, &Tileset)> = None;
    for (i, ts) in tilesets.iter().enumerate() {
        if !ts.contains_gid(gid) {
            continue;
        }
        match best {
            Some((_, b)) if b.first_gid > ts.first_gid => {}
            _ => best = Some((i, ts)),
        }
    }

    let (index, ts) = best?;
    if ts.is_placeholder() {
        return None;
    }
    let local_id = gid - ts.first_gid;
    if local_id >= ts.tile_count {
        return None;
    }
    Some(ResolvedTile {
        tileset: index,
        local_id,
    })
}
