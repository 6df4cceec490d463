use macroquad::prelude::*;

/// Smallest edge height used in the crossing test; keeps horizontal edges
/// from dividing by zero.
const EDGE_EPSILON: f32 = 1e-6;

/// Half-open containment: `x <= p.x < x + w` and `y <= p.y < y + h`.
#[inline]
pub fn rect_contains(r: &Rect, p: Vec2) -> bool {
    p.x >= r.x && p.x < r.x + r.w && p.y >= r.y && p.y < r.y + r.h
}

/// Closed polygon in absolute world coordinates with cached bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    points: Vec<Vec2>,
    bounds: Rect,
}

impl Polygon {
    /// Build from absolute vertices. `None` for fewer than three.
    pub fn new(points: Vec<Vec2>) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        let mut min = points[0];
        let mut max = points[0];
        for p in &points[1..] {
            min = min.min(*p);
            max = max.max(*p);
        }
        Some(Self {
            bounds: Rect::new(min.x, min.y, max.x - min.x, max.y - min.y),
            points,
        })
    }

    /// Vertices in authored order
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Axis-aligned bounding box
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Bounding-box rejection, then the crossing test.
    pub fn contains(&self, p: Vec2) -> bool {
        let b = &self.bounds;
        if p.x < b.x || p.x > b.x + b.w || p.y < b.y || p.y > b.y + b.h {
            return false;
        }
        point_in_polygon(&self.points, p)
    }
}

/// Even-odd ray casting towards +x.
pub fn point_in_polygon(points: &[Vec2], p: Vec2) -> bool {
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let mut dy = b.y - a.y;
            if dy.abs() < EDGE_EPSILON {
                dy = EDGE_EPSILON.copysign(dy);
            }
            let cross_x = a.x + (p.y - a.y) * (b.x - a.x) / dy;
            if p.x < cross_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// A region the player cannot enter.
#[derive(Debug, Clone, PartialEq)]
pub enum NonWalkableRegion {
    /// Axis-aligned rectangle
    Rect(Rect),
    /// Arbitrary simple polygon
    Polygon(Polygon),
}

/// Every non-walkable region of a map. Queries are a linear scan:
/// rectangles first, then polygons behind their bounding boxes.
#[derive(Debug, Clone, Default)]
pub struct CollisionIndex {
    rects: Vec<Rect>,
    polygons: Vec<Polygon>,
}

impl CollisionIndex {
    /// Empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a region
    pub fn insert(&mut self, region: NonWalkableRegion) {
        match region {
            NonWalkableRegion::Rect(r) => self.rects.push(r),
            NonWalkableRegion::Polygon(p) => self.polygons.push(p),
        }
    }

    /// Rectangles in insertion order
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Polygons in insertion order
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Total region count
    pub fn len(&self) -> usize {
        self.rects.len() + self.polygons.len()
    }

    /// True when nothing blocks movement
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when `point` lies inside any region.
    pub fn is_blocked(&self, point: Vec2) -> bool {
        self.rects.iter().any(|r| rect_contains(r, point))
            || self.polygons.iter().any(|poly| poly.contains(point))
    }
}

impl FromIterator<NonWalkableRegion> for CollisionIndex {
    fn from_iter<I: IntoIterator<Item = NonWalkableRegion>>(iter: I) -> Self {
        let mut index = Self::new();
        for region in iter {
            index.insert(region);
        }
        index
    }
}
