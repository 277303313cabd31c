use crate::{coord::Coord, Scalar};
use serde::{Deserialize, Serialize};

/// Single channel 8-bit raster, row-major.
///
/// # Examples
/// ```
/// use river_landscape_core::prelude::*;
///
/// let mut raster = Raster::new(4, 2);
/// raster.put(3, 1, 200);
/// assert_eq!(raster.value(3, 1), Some(200));
/// assert_eq!(raster.value(4, 1), None);
/// assert_eq!(raster.data()[7], 200);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Raster {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Raster {
    /// Create new black raster.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    /// Returns width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns pixels buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns mutable pixels buffer.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume raster and returns pixels buffer.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Returns pixel value or `None` when out of bounds.
    pub fn value(&self, col: usize, row: usize) -> Option<u8> {
        if col < self.width && row < self.height {
            Some(self.data[row * self.width + col])
        } else {
            None
        }
    }

    /// Write pixel keeping the brighter of old and new value.
    /// Out of bounds writes are ignored.
    pub fn put(&mut self, col: usize, row: usize, value: u8) {
        if col < self.width && row < self.height {
            let pixel = &mut self.data[row * self.width + col];
            *pixel = (*pixel).max(value);
        }
    }
}

/// Intensity falloff across the stroke, from the centre line to the rim.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    /// Intensity at the centre line.
    pub inner: u8,
    /// Intensity at the rim.
    pub outer: u8,
}

/// Thick segment with round caps (capsule), in pixel space.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    /// Start point.
    pub from: Coord,
    /// End point.
    pub to: Coord,
    /// Stroke width (diameter of the caps).
    pub thickness: Scalar,
    /// Optional falloff; solid white when `None`.
    #[serde(default)]
    pub gradient: Option<Gradient>,
}

impl Stroke {
    /// Create new solid stroke.
    pub fn new(from: Coord, to: Coord, thickness: Scalar) -> Self {
        Self {
            from,
            to,
            thickness,
            gradient: None,
        }
    }

    /// Returns this stroke with given gradient.
    pub fn with_gradient(mut self, inner: u8, outer: u8) -> Self {
        self.gradient = Some(Gradient { inner, outer });
        self
    }

    /// Distance from point to the stroke centre line.
    pub fn distance(&self, point: Coord) -> Scalar {
        let segment = self.to - self.from;
        let sqr_length = segment.sqr_magnitude();
        let factor = if sqr_length > 0.0 {
            ((point - self.from).dot(segment) / sqr_length).max(0.0).min(1.0)
        } else {
            0.0
        };
        point.distance(self.from + segment * factor)
    }

    /// Paint stroke into raster; pixel is covered when its centre lies inside the capsule.
    pub fn paint(&self, raster: &mut Raster) {
        let radius = self.thickness * 0.5;
        if radius.is_nan() || radius <= 0.0 || raster.width() == 0 || raster.height() == 0 {
            return;
        }
        let clamp_col = |v: Scalar| (v.floor().max(0.0) as usize).min(raster.width() - 1);
        let clamp_row = |v: Scalar| (v.floor().max(0.0) as usize).min(raster.height() - 1);
        let left = self.from.x.min(self.to.x) - radius;
        let right = self.from.x.max(self.to.x) + radius;
        let top = self.from.y.min(self.to.y) - radius;
        let bottom = self.from.y.max(self.to.y) + radius;
        if right < 0.0
            || bottom < 0.0
            || left >= raster.width() as Scalar
            || top >= raster.height() as Scalar
        {
            return;
        }
        let (col_from, col_to) = (clamp_col(left), clamp_col(right));
        let (row_from, row_to) = (clamp_row(top), clamp_row(bottom));
        for row in row_from..=row_to {
            for col in col_from..=col_to {
                let center = Coord::new(col as Scalar + 0.5, row as Scalar + 0.5);
                let distance = self.distance(center);
                if distance > radius {
                    continue;
                }
                let value = match self.gradient {
                    Some(Gradient { inner, outer }) => {
                        let factor = distance / radius;
                        (inner as Scalar + (outer as Scalar - inner as Scalar) * factor).round()
                            as u8
                    }
                    None => 255,
                };
                raster.put(col, row, value);
            }
        }
    }
}

/// Rasterize strokes in order, keeping the brightest value per pixel.
///
/// # Arguments
/// * `strokes` - Strokes in pixel space.
/// * `width` - Raster width.
/// * `height` - Raster height.
///
/// # Returns
/// Painted raster.
///
/// # Examples
/// ```
/// use river_landscape_core::prelude::*;
///
/// let stroke = Stroke::new(Coord::new(0.0, 2.5), Coord::new(8.0, 2.5), 2.0);
/// let raster = rasterize(&[stroke], 8, 5);
/// assert_eq!(raster.value(4, 2), Some(255));
/// assert_eq!(raster.value(4, 0), Some(0));
/// assert_eq!(raster.value(4, 4), Some(0));
/// ```
pub fn rasterize(strokes: &[Stroke], width: usize, height: usize) -> Raster {
    let mut raster = Raster::new(width, height);
    for stroke in strokes {
        stroke.paint(&mut raster);
    }
    raster
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capsule_caps() {
        let stroke = Stroke::new(Coord::new(5.0, 5.0), Coord::new(5.0, 5.0), 4.0);
        let raster = rasterize(&[stroke], 10, 10);
        assert_eq!(raster.value(4, 4), Some(255));
        assert_eq!(raster.value(5, 5), Some(255));
        assert_eq!(raster.value(3, 4), Some(255));
        // pixel centre (3.5, 3.5) lies outside the disc of radius 2.
        assert_eq!(raster.value(3, 3), Some(0));
        assert_eq!(raster.value(9, 9), Some(0));
    }

    #[test]
    fn test_gradient_and_max_combine() {
        let solid = Stroke::new(Coord::new(0.0, 0.5), Coord::new(10.0, 0.5), 1.0);
        let faded =
            Stroke::new(Coord::new(0.0, 2.5), Coord::new(10.0, 2.5), 4.0).with_gradient(200, 0);
        let raster = rasterize(&[solid, faded], 10, 5);
        assert_eq!(raster.value(5, 0), Some(255));
        assert_eq!(raster.value(5, 2), Some(200));
        assert_eq!(raster.value(5, 1), Some(100));
        assert_eq!(raster.value(5, 3), Some(100));
    }

    #[test]
    fn test_outside_raster() {
        let stroke = Stroke::new(Coord::new(-20.0, -20.0), Coord::new(-10.0, -5.0), 3.0);
        let raster = rasterize(&[stroke], 4, 4);
        assert!(raster.data().iter().all(|v| *v == 0));
        let stroke = Stroke::new(Coord::new(-2.0, 1.5), Coord::new(10.0, 1.5), 1.0);
        let raster = rasterize(&[stroke], 4, 4);
        assert_eq!(raster.data()[4..8], [255, 255, 255, 255]);
        assert!(rasterize(&[stroke], 0, 0).data().is_empty());
    }

    #[test]
    fn test_distance() {
        let stroke = Stroke::new(Coord::new(0.0, 0.0), Coord::new(4.0, 0.0), 1.0);
        assert_eq!(stroke.distance(Coord::new(2.0, 3.0)), 3.0);
        assert_eq!(stroke.distance(Coord::new(7.0, 4.0)), 5.0);
        assert_eq!(stroke.distance(Coord::new(-3.0, 0.0)), 3.0);
    }
}
