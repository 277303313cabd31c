use crate::{height_field::HeightField, Scalar};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error thrown during plane triangulation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlaneError {
    /// Grid needs at least one vertex along each axis.
    /// (width, height)
    #[error("invalid plane resolution {0}x{1}")]
    InvalidResolution(usize, usize),
}

/// Regular grid mesh over unit square, with heights taken from height field.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneMesh {
    /// Grid columns.
    pub width: usize,
    /// Grid rows.
    pub height: usize,
    /// Flat list of vertices: `u, v, height` per vertex.
    pub vertices: Vec<Scalar>,
    /// Flat list of triangles: three vertex indices per triangle.
    pub triangles: Vec<usize>,
}

impl PlaneMesh {
    /// Returns number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Returns number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Returns `[u, v, height]` of vertex.
    pub fn vertex(&self, index: usize) -> Option<[Scalar; 3]> {
        let slice = self.vertices.get((index * 3)..(index * 3 + 3))?;
        Some([slice[0], slice[1], slice[2]])
    }

    /// Returns vertex indices of triangle.
    pub fn triangle(&self, index: usize) -> Option<[usize; 3]> {
        let slice = self.triangles.get((index * 3)..(index * 3 + 3))?;
        Some([slice[0], slice[1], slice[2]])
    }

    /// Multiply heights by factor.
    pub fn scale_heights(&mut self, factor: Scalar) {
        for height in self.vertices.iter_mut().skip(2).step_by(3) {
            *height *= factor;
        }
    }
}

fn sample_bilinear(field: &HeightField, x: Scalar, y: Scalar) -> Scalar {
    let values = field.values();
    let width = field.width();
    let last_col = width - 1;
    let last_row = field.height() - 1;
    let col0 = (x.floor().max(0.0) as usize).min(last_col);
    let row0 = (y.floor().max(0.0) as usize).min(last_row);
    let col1 = (x.ceil().max(0.0) as usize).min(last_col);
    let row1 = (y.ceil().max(0.0) as usize).min(last_row);
    let fx = x - col0 as Scalar;
    let fy = y - row0 as Scalar;
    let z00 = values[row0 * width + col0];
    let z10 = values[row0 * width + col1];
    let z01 = values[row1 * width + col0];
    let z11 = values[row1 * width + col1];
    let top = z00 + (z10 - z00) * fx;
    let bottom = z01 + (z11 - z01) * fx;
    top + (bottom - top) * fy
}

/// Position of grid line in `[0, 1]`; single line lies at `0`.
fn grid_coordinate(index: usize, count: usize) -> Scalar {
    if count > 1 {
        index as Scalar / (count - 1) as Scalar
    } else {
        0.0
    }
}

/// Triangulate height field as regular grid of `width * height` vertices.
///
/// # Arguments
/// * `field` - Height field.
/// * `width` - Grid columns.
/// * `height` - Grid rows.
///
/// # Returns
/// Plane mesh or error.
///
/// # Examples
/// ```
/// use river_landscape_core::prelude::*;
///
/// let field = HeightField::from_data(2, 2, vec![0.0, 1.0, 2.0, 3.0]).unwrap();
/// let mesh = triangulate_plane(&field, 3, 3).unwrap();
/// assert_eq!(mesh.num_vertices(), 9);
/// assert_eq!(mesh.num_triangles(), 8);
/// assert_eq!(mesh.vertex(4), Some([0.5, 0.5, 1.5]));
/// assert_eq!(mesh.triangle(0), Some([0, 3, 4]));
/// assert_eq!(mesh.triangle(1), Some([0, 4, 1]));
/// ```
pub fn triangulate_plane(
    field: &HeightField,
    width: usize,
    height: usize,
) -> Result<PlaneMesh, PlaneError> {
    if width == 0 || height == 0 {
        return Err(PlaneError::InvalidResolution(width, height));
    }
    let scale_x = (field.width() - 1) as Scalar;
    let scale_y = (field.height() - 1) as Scalar;
    let mut vertices = Vec::with_capacity(width * height * 3);
    for row in 0..height {
        let v = grid_coordinate(row, height);
        for col in 0..width {
            let u = grid_coordinate(col, width);
            vertices.push(u);
            vertices.push(v);
            vertices.push(sample_bilinear(field, u * scale_x, v * scale_y));
        }
    }
    let quads = width.saturating_sub(1) * height.saturating_sub(1);
    let mut triangles = Vec::with_capacity(quads * 6);
    for row in 0..height.saturating_sub(1) {
        for col in 0..width.saturating_sub(1) {
            let k00 = row * width + col;
            let k01 = k00 + 1;
            let k10 = k00 + width;
            let k11 = k10 + 1;
            triangles.extend_from_slice(&[k00, k10, k11, k00, k11, k01]);
        }
    }
    log::debug!(
        "Triangulated {}x{} plane into {} triangles",
        width,
        height,
        triangles.len() / 3
    );
    Ok(PlaneMesh {
        width,
        height,
        vertices,
        triangles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_indices() {
        let field = HeightField::new(16, 9).unwrap();
        let mesh = triangulate_plane(&field, 7, 5).unwrap();
        assert_eq!(mesh.num_vertices(), 35);
        assert_eq!(mesh.num_triangles(), 2 * 6 * 4);
        assert!(mesh.triangles.iter().all(|i| *i < 35));
        assert_eq!(mesh.vertex(34), Some([1.0, 1.0, 0.0]));
        assert_eq!(mesh.vertex(35), None);
        assert_eq!(mesh.triangle(48), None);
    }

    #[test]
    fn test_heights_follow_field() {
        let data = (0..12).map(|v| v as Scalar).collect::<Vec<_>>();
        let field = HeightField::from_data(4, 3, data).unwrap();
        let mesh = triangulate_plane(&field, 4, 3).unwrap();
        for i in 0..12 {
            let [_, _, z] = mesh.vertex(i).unwrap();
            assert!((z - i as Scalar).abs() < 1.0e-5);
        }
    }

    #[test]
    fn test_single_cell_field() {
        let field = HeightField::from_data(1, 1, vec![0.25]).unwrap();
        let mesh = triangulate_plane(&field, 2, 2).unwrap();
        for i in 0..4 {
            assert_eq!(mesh.vertex(i).unwrap()[2], 0.25);
        }
    }

    #[test]
    fn test_scale_heights() {
        let field = HeightField::from_data(2, 1, vec![1.0, 2.0]).unwrap();
        let mut mesh = triangulate_plane(&field, 2, 2).unwrap();
        mesh.scale_heights(0.5);
        assert_eq!(mesh.vertex(1), Some([1.0, 0.0, 1.0]));
        assert_eq!(mesh.vertex(2), Some([0.0, 1.0, 0.5]));
    }

    #[test]
    fn test_single_column_plane() {
        let data = (0..12).map(|v| v as Scalar).collect::<Vec<_>>();
        let field = HeightField::from_data(4, 3, data).unwrap();
        let mesh = triangulate_plane(&field, 1, 3).unwrap();
        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_triangles(), 0);
        assert_eq!(mesh.vertex(0), Some([0.0, 0.0, 0.0]));
        assert_eq!(mesh.vertex(1), Some([0.0, 0.5, 4.0]));
        assert_eq!(mesh.vertex(2), Some([0.0, 1.0, 8.0]));
        let point = triangulate_plane(&field, 1, 1).unwrap();
        assert_eq!((point.num_vertices(), point.num_triangles()), (1, 0));
    }

    #[test]
    fn test_invalid_resolution() {
        let field = HeightField::new(4, 4).unwrap();
        assert_eq!(
            triangulate_plane(&field, 0, 4),
            Err(PlaneError::InvalidResolution(0, 4))
        );
    }
}
