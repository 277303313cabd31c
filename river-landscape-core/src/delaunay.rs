use crate::{
    coord::Coord,
    triangle::{Edge, Triangle},
};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Relative tolerance below which triangle determinant is considered zero.
const DEGENERACY_EPSILON: f64 = 1.0e-12;
/// Size of super triangle relative to the bounding box of input points.
const SUPER_TRIANGLE_SCALE: f64 = 1.0e4;

/// Error thrown during Delaunay triangulation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TriangulationError {
    /// There are no points to triangulate.
    #[error("cannot triangulate empty points set")]
    NoPoints,
    /// Point has NaN or infinite coordinates.
    /// (point index)
    #[error("point {0} has non-finite coordinates")]
    InvalidPoint(usize),
    /// Two input points share the same position.
    /// (first point index, second point index)
    #[error("points {0} and {1} are duplicates")]
    DuplicatePoint(usize, usize),
    /// Triangle with (nearly) collinear vertices has no circumcircle.
    /// (first, second, third point index)
    #[error("triangle ({0}, {1}, {2}) is degenerate")]
    DegenerateTriangle(usize, usize, usize),
}

#[derive(Debug, Copy, Clone)]
struct Circumcircle {
    x: f64,
    y: f64,
    sqr_radius: f64,
}

impl Circumcircle {
    #[inline]
    fn strictly_contains(&self, x: f64, y: f64) -> bool {
        let dx = self.x - x;
        let dy = self.y - y;
        dx * dx + dy * dy < self.sqr_radius
    }
}

/// Triangulate points and return the set of Delaunay edges between them.
///
/// # Arguments
/// * `points` - Input points.
///
/// # Returns
/// Set of canonical edges or triangulation error.
///
/// # Examples
/// ```
/// use river_landscape_core::prelude::*;
///
/// let points = vec![
///     Coord::new(0.0, 0.0),
///     Coord::new(1.0, 0.0),
///     Coord::new(0.0, 1.0),
/// ];
/// let edges = triangulate(&points).unwrap();
/// assert_eq!(edges.len(), 3);
/// assert!(edges.contains(&Edge::new(2, 1)));
/// ```
pub fn triangulate(points: &[Coord]) -> Result<BTreeSet<Edge>, TriangulationError> {
    Ok(triangulate_triangles(points)?
        .into_iter()
        .flat_map(|t| t.edges())
        .collect::<BTreeSet<_>>())
}

/// Triangulate points and return Delaunay triangles between them.
///
/// Triangles touching helper super triangle are discarded, so only triangles made of input
/// points are returned, in canonical order.
///
/// # Arguments
/// * `points` - Input points.
///
/// # Returns
/// List of triangles or triangulation error.
pub fn triangulate_triangles(points: &[Coord]) -> Result<Vec<Triangle>, TriangulationError> {
    validate_points(points)?;
    let count = points.len();
    let mut vertices = points
        .iter()
        .map(|p| (p.x as f64, p.y as f64))
        .collect::<Vec<_>>();
    vertices.extend(super_triangle(&vertices));
    let mut triangles = BTreeSet::new();
    triangles.insert(Triangle::new(count, count + 1, count + 2));

    for index in 0..count {
        let (x, y) = vertices[index];
        let mut bad = Vec::new();
        for triangle in &triangles {
            if circumcircle(&vertices, triangle)?.strictly_contains(x, y) {
                bad.push(*triangle);
            }
        }
        let mut edges_count = BTreeMap::<Edge, usize>::new();
        for triangle in &bad {
            for edge in triangle.edges() {
                *edges_count.entry(edge).or_default() += 1;
            }
            triangles.remove(triangle);
        }
        for (edge, _) in edges_count.into_iter().filter(|(_, c)| *c == 1) {
            triangles.insert(Triangle::new(index, edge.from, edge.to));
        }
    }

    let result = triangles
        .into_iter()
        .filter(|t| !t.references_from(count))
        .collect::<Vec<_>>();
    log::debug!(
        "Triangulated {} points into {} triangles",
        count,
        result.len()
    );
    Ok(result)
}

fn validate_points(points: &[Coord]) -> Result<(), TriangulationError> {
    if points.is_empty() {
        return Err(TriangulationError::NoPoints);
    }
    if let Some(index) = points.iter().position(|p| !p.is_finite()) {
        return Err(TriangulationError::InvalidPoint(index));
    }
    let mut order = (0..points.len()).collect::<Vec<_>>();
    order.sort_by(|a, b| {
        let a = points[*a];
        let b = points[*b];
        a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
    });
    for pair in order.windows(2) {
        if points[pair[0]] == points[pair[1]] {
            return Err(TriangulationError::DuplicatePoint(
                pair[0].min(pair[1]),
                pair[0].max(pair[1]),
            ));
        }
    }
    Ok(())
}

fn super_triangle(vertices: &[(f64, f64)]) -> [(f64, f64); 3] {
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for (x, y) in vertices {
        min_x = min_x.min(*x);
        min_y = min_y.min(*y);
        max_x = max_x.max(*x);
        max_y = max_y.max(*y);
    }
    let cx = (min_x + max_x) * 0.5;
    let cy = (min_y + max_y) * 0.5;
    let mut extent = (max_x - min_x).max(max_y - min_y);
    if extent <= 0.0 {
        extent = 1.0;
    }
    let size = extent * SUPER_TRIANGLE_SCALE;
    [
        (cx - size, cy - size),
        (cx + size, cy - size),
        (cx, cy + size),
    ]
}

fn circumcircle(
    vertices: &[(f64, f64)],
    triangle: &Triangle,
) -> Result<Circumcircle, TriangulationError> {
    let (ax, ay) = vertices[triangle.a];
    let (bx, by) = (vertices[triangle.b].0 - ax, vertices[triangle.b].1 - ay);
    let (cx, cy) = (vertices[triangle.c].0 - ax, vertices[triangle.c].1 - ay);
    let b2 = bx * bx + by * by;
    let c2 = cx * cx + cy * cy;
    let d = 2.0 * (bx * cy - cx * by);
    if d.abs() <= DEGENERACY_EPSILON * (b2 + c2) {
        return Err(TriangulationError::DegenerateTriangle(
            triangle.a, triangle.b, triangle.c,
        ));
    }
    let ux = (b2 * cy - c2 * by) / d;
    let uy = (c2 * bx - b2 * cx) / d;
    Ok(Circumcircle {
        x: ax + ux,
        y: ay + uy,
        sqr_radius: ux * ux + uy * uy,
    })
}
