use crate::{stroke::Raster, Scalar};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error thrown by height field operations.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum HeightFieldError {
    /// Height field must have at least one column and one row.
    /// (width, height)
    #[error("invalid height field size {0}x{1}")]
    InvalidSize(usize, usize),
    /// Wrong data length.
    /// (provided, expected)
    #[error("wrong data length: provided {0}, expected {1}")]
    WrongDataLength(usize, usize),
    /// Cell coordinates outside of the grid.
    #[error("cell ({col}, {row}) is out of bounds of {width}x{height} height field")]
    OutOfBounds {
        col: usize,
        row: usize,
        width: usize,
        height: usize,
    },
}

/// Height field that contains height per cell, its running range and quantized 8-bit cache.
///
/// Range is tracked on every write (it is never recomputed by scanning the data), so after
/// blending passes it can be wider than the actual values.
///
/// # Examples
/// ```
/// use river_landscape_core::prelude::*;
///
/// let mut field = HeightField::new(2, 2).unwrap();
/// field.set(1, 0, 4.0).unwrap();
/// field.set(0, 1, -4.0).unwrap();
/// assert_eq!(field.get(1, 0), Ok(4.0));
/// assert_eq!((field.min(), field.max()), (-4.0, 4.0));
/// assert!(field.is_dirty());
/// field.quantize();
/// assert_eq!(field.quantized(), &[127, 255, 0, 127]);
/// assert!(!field.is_dirty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightField {
    width: usize,
    height: usize,
    min: Scalar,
    max: Scalar,
    dirty: bool,
    data: Vec<Scalar>,
    quantized: Vec<u8>,
}

impl HeightField {
    /// Create new zero filled height field.
    ///
    /// # Arguments
    /// * `width` - Columns.
    /// * `height` - Rows.
    ///
    /// # Returns
    /// Height field or error.
    pub fn new(width: usize, height: usize) -> Result<Self, HeightFieldError> {
        Self::from_data(width, height, vec![0.0; width * height])
    }

    /// Create new height field from raw row-major data; range is taken from the data.
    ///
    /// # Arguments
    /// * `width` - Columns.
    /// * `height` - Rows.
    /// * `data` - Raw height data.
    ///
    /// # Returns
    /// Height field or error.
    ///
    /// # Examples
    /// ```
    /// use river_landscape_core::prelude::*;
    ///
    /// assert!(HeightField::from_data(2, 2, vec![0.0, 1.0, 2.0, 3.0]).is_ok());
    /// assert_eq!(
    ///     HeightField::from_data(1, 2, vec![0.0, 1.0, 2.0, 3.0]),
    ///     Err(HeightFieldError::WrongDataLength(4, 2)),
    /// );
    /// assert_eq!(
    ///     HeightField::from_data(0, 2, vec![]),
    ///     Err(HeightFieldError::InvalidSize(0, 2)),
    /// );
    /// ```
    pub fn from_data(
        width: usize,
        height: usize,
        data: Vec<Scalar>,
    ) -> Result<Self, HeightFieldError> {
        if width == 0 || height == 0 {
            return Err(HeightFieldError::InvalidSize(width, height));
        }
        if data.len() != width * height {
            return Err(HeightFieldError::WrongDataLength(data.len(), width * height));
        }
        let (min, max) = data
            .iter()
            .fold((Scalar::INFINITY, Scalar::NEG_INFINITY), |(min, max), v| {
                (min.min(*v), max.max(*v))
            });
        let mut result = Self {
            width,
            height,
            min,
            max,
            dirty: true,
            quantized: vec![0; data.len()],
            data,
        };
        result.quantize();
        Ok(result)
    }

    /// Create height field from 8-bit raster, mapping `[0, 255]` into `[0, 1]`.
    ///
    /// # Examples
    /// ```
    /// use river_landscape_core::prelude::*;
    ///
    /// let mut raster = Raster::new(2, 1);
    /// raster.put(1, 0, 255);
    /// let field = HeightField::from_raster(&raster).unwrap();
    /// assert_eq!(field.values(), &[0.0, 1.0]);
    /// ```
    pub fn from_raster(raster: &Raster) -> Result<Self, HeightFieldError> {
        let data = raster
            .data()
            .iter()
            .map(|v| *v as Scalar / 255.0)
            .collect();
        Self::from_data(raster.width(), raster.height(), data)
    }

    /// Returns width (columns).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns height (rows).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns lowest height written so far.
    pub fn min(&self) -> Scalar {
        self.min
    }

    /// Returns highest height written so far.
    pub fn max(&self) -> Scalar {
        self.max
    }

    /// Returns values buffer.
    pub fn values(&self) -> &[Scalar] {
        &self.data
    }

    /// Mutable values buffer for in-range rewrites (range is not updated).
    pub(crate) fn values_mut(&mut self) -> &mut [Scalar] {
        self.dirty = true;
        &mut self.data
    }

    /// Tells if quantized cache is stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns quantized cache (valid after last `quantize` when not dirty).
    pub fn quantized(&self) -> &[u8] {
        &self.quantized
    }

    /// Returns height at given cell.
    ///
    /// # Arguments
    /// * `col` - Column.
    /// * `row` - Row.
    pub fn get(&self, col: usize, row: usize) -> Result<Scalar, HeightFieldError> {
        Ok(self.data[self.index(col, row)?])
    }

    /// Write height at given cell and update running range.
    ///
    /// # Arguments
    /// * `col` - Column.
    /// * `row` - Row.
    /// * `value` - New height.
    pub fn set(&mut self, col: usize, row: usize, value: Scalar) -> Result<(), HeightFieldError> {
        let index = self.index(col, row)?;
        self.data[index] = value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.dirty = true;
        Ok(())
    }

    /// Add weighted sample to every cell, updating running range like `set` does.
    ///
    /// # Arguments
    /// * `alpha` - Sample weight.
    /// * `sample` - Function of `(col, row)` returning value to blend in.
    ///
    /// # Examples
    /// ```
    /// use river_landscape_core::prelude::*;
    ///
    /// let mut field = HeightField::new(2, 1).unwrap();
    /// field.blend(0.5, |col, _| col as f32);
    /// assert_eq!(field.values(), &[0.0, 0.5]);
    /// assert_eq!(field.max(), 0.5);
    /// ```
    pub fn blend<F>(&mut self, alpha: Scalar, mut sample: F)
    where
        F: FnMut(usize, usize) -> Scalar,
    {
        for (index, v) in self.data.iter_mut().enumerate() {
            *v += alpha * sample(index % self.width, index / self.width);
            self.min = self.min.min(*v);
            self.max = self.max.max(*v);
        }
        self.dirty = true;
    }

    /// Clamp heights into range; range becomes exactly `[min, max]`.
    pub fn clamp(&mut self, min: Scalar, max: Scalar) {
        for v in &mut self.data {
            *v = v.max(min).min(max);
        }
        self.min = min;
        self.max = max;
        self.dirty = true;
    }

    /// Returns quantized copy with clamped heights.
    pub fn clamped(&self, min: Scalar, max: Scalar) -> Self {
        let mut result = self.clone();
        result.clamp(min, max);
        result.quantize();
        result
    }

    /// Linearly remap current range into `[min, max]`.
    /// Flat height field maps to `min`.
    ///
    /// # Examples
    /// ```
    /// use river_landscape_core::prelude::*;
    ///
    /// let mut field = HeightField::from_data(3, 1, vec![-1.0, 0.0, 3.0]).unwrap();
    /// field.normalize(0.0, 1.0);
    /// assert_eq!(field.values(), &[0.0, 0.25, 1.0]);
    /// assert_eq!((field.min(), field.max()), (0.0, 1.0));
    /// ```
    pub fn normalize(&mut self, min: Scalar, max: Scalar) {
        let range = self.max - self.min;
        let target = max - min;
        for v in &mut self.data {
            *v = if range > 0.0 {
                ((*v - self.min) / range) * target + min
            } else {
                min
            };
        }
        self.min = min;
        self.max = max;
        self.dirty = true;
    }

    /// Returns quantized copy with normalized heights.
    pub fn normalized(&self, min: Scalar, max: Scalar) -> Self {
        let mut result = self.clone();
        result.normalize(min, max);
        result.quantize();
        result
    }

    /// Mirror heights inside current range: `value -> max - value + min`.
    ///
    /// # Examples
    /// ```
    /// use river_landscape_core::prelude::*;
    ///
    /// let mut field = HeightField::from_data(3, 1, vec![0.0, 0.25, 1.0]).unwrap();
    /// field.invert();
    /// assert_eq!(field.values(), &[1.0, 0.75, 0.0]);
    /// ```
    pub fn invert(&mut self) {
        for v in &mut self.data {
            *v = self.max - *v + self.min;
        }
        self.dirty = true;
    }

    /// Returns quantized copy with inverted heights.
    pub fn inverted(&self) -> Self {
        let mut result = self.clone();
        result.invert();
        result.quantize();
        result
    }

    /// Add constant to every height; range moves along.
    pub fn offset(&mut self, delta: Scalar) {
        for v in &mut self.data {
            *v += delta;
        }
        self.min += delta;
        self.max += delta;
        self.dirty = true;
    }

    /// Multiply every height by factor; range is scaled along.
    pub fn scale(&mut self, factor: Scalar) {
        for v in &mut self.data {
            *v *= factor;
        }
        let (a, b) = (self.min * factor, self.max * factor);
        self.min = a.min(b);
        self.max = a.max(b);
        self.dirty = true;
    }

    /// Recompute quantized cache by mapping current range into `[0, 255]`.
    /// Flat height field quantizes to zeros.
    pub fn quantize(&mut self) {
        let range = self.max - self.min;
        for (q, v) in self.quantized.iter_mut().zip(self.data.iter()) {
            *q = if range > 0.0 {
                (((*v - self.min) / range) * 255.0) as u8
            } else {
                0
            };
        }
        self.dirty = false;
    }

    /// Iterate over `(col, row, height)` cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Scalar)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(move |(i, v)| (i % self.width, i / self.width, *v))
    }

    #[inline]
    fn index(&self, col: usize, row: usize) -> Result<usize, HeightFieldError> {
        if col < self.width && row < self.height {
            Ok(row * self.width + col)
        } else {
            Err(HeightFieldError::OutOfBounds {
                col,
                row,
                width: self.width,
                height: self.height,
            })
        }
    }
}
