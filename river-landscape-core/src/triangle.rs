use serde::{Deserialize, Serialize};

/// Triangle of point indices.
///
/// Vertices are kept in canonical order (smallest index first, remaining two ascending), so two
/// triangles built from the same three indices in any order are equal and hash the same.
///
/// # Examples
/// ```
/// use river_landscape_core::prelude::*;
///
/// assert_eq!(Triangle::new(7, 2, 5), Triangle::new(5, 7, 2));
/// assert_eq!(Triangle::new(7, 2, 5).indices(), [2, 5, 7]);
/// ```
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Triangle {
    /// First point.
    pub a: usize,
    /// Second point.
    pub b: usize,
    /// Third point.
    pub c: usize,
}

impl Triangle {
    /// Create canonical triangle.
    pub fn new(i: usize, j: usize, k: usize) -> Self {
        let mut indices = [i, j, k];
        indices.sort_unstable();
        let [a, b, c] = indices;
        Self { a, b, c }
    }

    /// Returns vertex indices.
    #[inline]
    pub fn indices(&self) -> [usize; 3] {
        [self.a, self.b, self.c]
    }

    /// Returns three canonical edges of this triangle.
    #[inline]
    pub fn edges(&self) -> [Edge; 3] {
        [
            Edge::new(self.a, self.b),
            Edge::new(self.b, self.c),
            Edge::new(self.a, self.c),
        ]
    }

    /// Tells if any of the vertices is equal or greater than `limit`.
    #[inline]
    pub fn references_from(&self, limit: usize) -> bool {
        self.c >= limit
    }
}

impl From<[usize; 3]> for Triangle {
    fn from([a, b, c]: [usize; 3]) -> Self {
        Self::new(a, b, c)
    }
}

/// Undirected edge between two point indices, stored as `(smaller, greater)`.
///
/// # Examples
/// ```
/// use river_landscape_core::prelude::*;
///
/// assert_eq!(Edge::new(4, 1), Edge::new(1, 4));
/// assert_eq!(Edge::new(4, 1).from, 1);
/// ```
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Edge {
    /// Smaller point index.
    pub from: usize,
    /// Greater point index.
    pub to: usize,
}

impl Edge {
    /// Create canonical edge.
    #[inline]
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            from: a.min(b),
            to: a.max(b),
        }
    }

    /// Tells if edge connects point with itself.
    #[inline]
    pub fn is_loop(&self) -> bool {
        self.from == self.to
    }
}

impl From<(usize, usize)> for Edge {
    fn from((a, b): (usize, usize)) -> Self {
        Self::new(a, b)
    }
}
