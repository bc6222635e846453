//! Ear-clipping triangulation of a simple polygon
//!
//! Works on normalized points and returns index triples into the input
//! slice. Each pass scans the still-active vertices from the start and clips
//! the first convex vertex whose triangle holds no other active vertex. If a
//! pass finds no ear the polygon is degenerate or self-intersecting and the
//! triangles found so far are returned as they are.
//!
//! Worst case is O(n^3), fine for hand-drawn polygons of a few dozen points.

use geo::{Area, LineString, Polygon};
use tracing::warn;

use crate::geometry::NormalizedPoint;

/// Index triple into the polygon's point list
pub type TriangleIndices = [usize; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    CounterClockwise,
    Clockwise,
    /// Zero signed area: collinear points or a balanced self-intersection
    Degenerate,
}

/// Signed shoelace area, positive for counter-clockwise rings
pub fn signed_area(points: &[NormalizedPoint]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let ring: LineString<f64> = points
        .iter()
        .map(|p| geo::coord! { x: p.x, y: p.y })
        .collect();
    Polygon::new(ring, vec![]).signed_area()
}

pub fn winding(points: &[NormalizedPoint]) -> Winding {
    let area = signed_area(points);
    if area > 0.0 {
        Winding::CounterClockwise
    } else if area < 0.0 {
        Winding::Clockwise
    } else {
        Winding::Degenerate
    }
}

/// Triangulate a polygon by ear clipping
///
/// Clockwise input is walked in reverse so every emitted triangle is
/// counter-clockwise; indices always refer to the input order. Returns
/// n - 2 triangles for a simple polygon, fewer when clipping gets stuck,
/// and nothing for fewer than 3 points.
pub fn triangulate_polygon(points: &[NormalizedPoint]) -> Vec<TriangleIndices> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }

    let mut remaining: Vec<usize> = (0..n).collect();
    if winding(points) == Winding::Clockwise {
        remaining.reverse();
    }

    let mut triangles = Vec::with_capacity(n - 2);

    while remaining.len() > 3 {
        let Some(i) = find_ear(points, &remaining) else {
            warn!(
                vertices = n,
                clipped = triangles.len(),
                "could not triangulate polygon completely"
            );
            break;
        };

        let len = remaining.len();
        triangles.push([
            remaining[(i + len - 1) % len],
            remaining[i],
            remaining[(i + 1) % len],
        ]);
        remaining.remove(i);
    }

    if remaining.len() == 3 {
        triangles.push([remaining[0], remaining[1], remaining[2]]);
    }

    triangles
}

/// Position in `remaining` of the first valid ear
fn find_ear(points: &[NormalizedPoint], remaining: &[usize]) -> Option<usize> {
    let len = remaining.len();
    (0..len).find(|&i| {
        let prev = remaining[(i + len - 1) % len];
        let curr = remaining[i];
        let next = remaining[(i + 1) % len];
        is_ear(points, remaining, prev, curr, next)
    })
}

/// An ear turns strictly convex and contains no other active vertex
fn is_ear(
    points: &[NormalizedPoint],
    remaining: &[usize],
    prev: usize,
    curr: usize,
    next: usize,
) -> bool {
    let (a, b, c) = (points[prev], points[curr], points[next]);

    let cross = (c.x - b.x) * (a.y - b.y) - (c.y - b.y) * (a.x - b.x);
    if cross <= 0.0 {
        return false;
    }

    !remaining
        .iter()
        .filter(|&&idx| idx != prev && idx != curr && idx != next)
        .any(|&idx| point_in_triangle(points[idx], a, b, c))
}

/// Half-plane sign test; points on an edge or corner count as inside
pub fn point_in_triangle(
    p: NormalizedPoint,
    v1: NormalizedPoint,
    v2: NormalizedPoint,
    v3: NormalizedPoint,
) -> bool {
    fn sign(p1: NormalizedPoint, p2: NormalizedPoint, p3: NormalizedPoint) -> f64 {
        (p1.x - p3.x) * (p2.y - p3.y) - (p2.x - p3.x) * (p1.y - p3.y)
    }

    let d1 = sign(p, v1, v2);
    let d2 = sign(p, v2, v3);
    let d3 = sign(p, v3, v1);

    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;

    !(has_neg && has_pos)
}
