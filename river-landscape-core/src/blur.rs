use crate::{height_field::HeightField, stroke::Raster, Scalar};
use thiserror::Error;

/// Error thrown by Gaussian blur.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BlurError {
    /// Standard deviation must be positive and finite.
    #[error("invalid gaussian sigma: {0}")]
    InvalidSigma(Scalar),
    /// Scratch buffer could not be allocated.
    /// (requested elements)
    #[error("cannot allocate {0} elements of blur scratch memory")]
    OutOfMemory(usize),
}

/// Normalized one dimensional Gaussian kernel of `2 * half_width + 1` weights.
///
/// # Examples
/// ```
/// use river_landscape_core::prelude::*;
///
/// let kernel = GaussianKernel::new(2, 1.0).unwrap();
/// assert_eq!(kernel.weights().len(), 5);
/// assert!((kernel.weights().iter().sum::<f32>() - 1.0).abs() < 1.0e-6);
/// assert_eq!(kernel.weights()[0], kernel.weights()[4]);
/// assert!(GaussianKernel::new(2, 0.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianKernel {
    half_width: usize,
    weights: Vec<Scalar>,
}

impl GaussianKernel {
    /// Create new kernel.
    ///
    /// # Arguments
    /// * `half_width` - Number of taps on each side of the centre.
    /// * `sigma` - Standard deviation in cells.
    ///
    /// # Returns
    /// Kernel or error.
    pub fn new(half_width: usize, sigma: Scalar) -> Result<Self, BlurError> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(BlurError::InvalidSigma(sigma));
        }
        let size = 2 * half_width + 1;
        let mut weights = Vec::new();
        weights
            .try_reserve_exact(size)
            .map_err(|_| BlurError::OutOfMemory(size))?;
        let denominator = 2.0 * sigma * sigma;
        weights.extend((0..size).map(|i| {
            let d = i as Scalar - half_width as Scalar;
            (-d * d / denominator).exp()
        }));
        let sum = weights.iter().sum::<Scalar>();
        for weight in &mut weights {
            *weight /= sum;
        }
        Ok(Self {
            half_width,
            weights,
        })
    }

    /// Returns number of taps on each side of the centre.
    pub fn half_width(&self) -> usize {
        self.half_width
    }

    /// Returns weights.
    pub fn weights(&self) -> &[Scalar] {
        &self.weights
    }

    /// Convolve line; taps falling outside are skipped and the result is divided by the weights
    /// actually used.
    fn convolve(&self, input: &[Scalar], index: usize) -> Scalar {
        let from = index.saturating_sub(self.half_width);
        let to = (index + self.half_width).min(input.len() - 1);
        let mut sum = 0.0;
        let mut total = 0.0;
        for (position, value) in input.iter().enumerate().take(to + 1).skip(from) {
            let weight = self.weights[position + self.half_width - index];
            sum += weight * value;
            total += weight;
        }
        sum / total
    }
}

/// Blur height field in place, rows first then columns.
///
/// # Arguments
/// * `field` - Height field.
/// * `ksx` - Horizontal kernel half width.
/// * `ksy` - Vertical kernel half width.
/// * `sigma` - Standard deviation.
///
/// # Examples
/// ```
/// use river_landscape_core::prelude::*;
///
/// let mut field = HeightField::new(5, 1).unwrap();
/// field.set(2, 0, 1.0).unwrap();
/// gauss_blur(&mut field, 1, 0, 1.0).unwrap();
/// assert!(field.get(2, 0).unwrap() < 1.0);
/// assert!(field.get(1, 0).unwrap() > 0.0);
/// assert_eq!(field.get(0, 0), Ok(0.0));
/// ```
pub fn gauss_blur(
    field: &mut HeightField,
    ksx: usize,
    ksy: usize,
    sigma: Scalar,
) -> Result<(), BlurError> {
    let (width, height) = (field.width(), field.height());
    blur_buffer(field.values_mut(), width, height, ksx, ksy, sigma)?;
    log::debug!(
        "Blurred {}x{} height field with kernel {}x{} (sigma {})",
        width,
        height,
        ksx,
        ksy,
        sigma
    );
    Ok(())
}

/// Blur 8-bit raster in place, rows first then columns.
///
/// # Arguments
/// * `raster` - Raster.
/// * `ksx` - Horizontal kernel half width.
/// * `ksy` - Vertical kernel half width.
/// * `sigma` - Standard deviation.
pub fn gauss_blur_raster(
    raster: &mut Raster,
    ksx: usize,
    ksy: usize,
    sigma: Scalar,
) -> Result<(), BlurError> {
    let (width, height) = (raster.width(), raster.height());
    blur_buffer(raster.data_mut(), width, height, ksx, ksy, sigma)?;
    log::debug!(
        "Blurred {}x{} raster with kernel {}x{} (sigma {})",
        width,
        height,
        ksx,
        ksy,
        sigma
    );
    Ok(())
}

/// Cell type that can be blurred through a scalar line buffer.
trait BlurCell: Copy {
    fn to_scalar(self) -> Scalar;
    fn from_scalar(value: Scalar) -> Self;
}

impl BlurCell for Scalar {
    #[inline]
    fn to_scalar(self) -> Scalar {
        self
    }

    #[inline]
    fn from_scalar(value: Scalar) -> Self {
        value
    }
}

impl BlurCell for u8 {
    #[inline]
    fn to_scalar(self) -> Scalar {
        self as Scalar
    }

    #[inline]
    fn from_scalar(value: Scalar) -> Self {
        value.round().max(0.0).min(255.0) as u8
    }
}

/// Separable blur using single line buffer of `max(width, height)` scalars as scratch memory.
fn blur_buffer<T>(
    data: &mut [T],
    width: usize,
    height: usize,
    ksx: usize,
    ksy: usize,
    sigma: Scalar,
) -> Result<(), BlurError>
where
    T: BlurCell,
{
    let horizontal = GaussianKernel::new(ksx, sigma)?;
    let vertical = GaussianKernel::new(ksy, sigma)?;
    if data.is_empty() {
        return Ok(());
    }
    let size = width.max(height);
    let mut line = Vec::<Scalar>::new();
    line.try_reserve_exact(size)
        .map_err(|_| BlurError::OutOfMemory(size))?;

    for row in data.chunks_exact_mut(width) {
        line.clear();
        line.extend(row.iter().map(|v| v.to_scalar()));
        for (col, value) in row.iter_mut().enumerate() {
            *value = T::from_scalar(horizontal.convolve(&line, col));
        }
    }
    for col in 0..width {
        line.clear();
        line.extend((0..height).map(|row| data[row * width + col].to_scalar()));
        for row in 0..height {
            data[row * width + col] = T::from_scalar(vertical.convolve(&line, row));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_shape() {
        let kernel = GaussianKernel::new(3, 1.5).unwrap();
        let weights = kernel.weights();
        assert_eq!(kernel.half_width(), 3);
        for i in 0..3 {
            assert_eq!(weights[i], weights[6 - i]);
            assert!(weights[i] < weights[i + 1]);
        }
        let identity = GaussianKernel::new(0, 1.0).unwrap();
        assert_eq!(identity.weights(), &[1.0]);
        assert!(GaussianKernel::new(1, Scalar::NAN).is_err());
        assert_eq!(
            GaussianKernel::new(1, -1.0),
            Err(BlurError::InvalidSigma(-1.0))
        );
    }

    #[test]
    fn test_constant_field_unchanged() {
        let mut field = HeightField::from_data(7, 5, vec![0.6; 35]).unwrap();
        gauss_blur(&mut field, 3, 2, 2.0).unwrap();
        for value in field.values() {
            assert!((value - 0.6).abs() < 1.0e-6);
        }
        assert!(field.is_dirty());
    }

    #[test]
    fn test_blur_preserves_symmetry_and_range() {
        let mut field = HeightField::new(9, 9).unwrap();
        field.set(4, 4, 1.0).unwrap();
        gauss_blur(&mut field, 2, 2, 1.0).unwrap();
        let center = field.get(4, 4).unwrap();
        assert!(center < 1.0);
        assert!((field.get(3, 4).unwrap() - field.get(5, 4).unwrap()).abs() < 1.0e-6);
        assert!((field.get(4, 3).unwrap() - field.get(4, 5).unwrap()).abs() < 1.0e-6);
        assert!((field.get(3, 4).unwrap() - field.get(4, 3).unwrap()).abs() < 1.0e-6);
        assert_eq!(field.get(0, 0), Ok(0.0));
        for value in field.values() {
            assert!(*value >= 0.0 && *value <= center);
        }
        let total = field.values().iter().sum::<Scalar>();
        assert!((total - 1.0).abs() < 1.0e-5);
    }

    #[test]
    fn test_raster_blur() {
        let mut raster = Raster::new(6, 3);
        raster.data_mut().iter_mut().for_each(|v| *v = 128);
        gauss_blur_raster(&mut raster, 2, 1, 1.0).unwrap();
        assert!(raster.data().iter().all(|v| *v == 128));
        let mut raster = Raster::new(5, 1);
        raster.put(2, 0, 255);
        gauss_blur_raster(&mut raster, 1, 0, 0.5).unwrap();
        assert!(raster.value(2, 0).unwrap() < 255);
        assert_eq!(raster.value(1, 0), raster.value(3, 0));
        assert_eq!(raster.value(0, 0), Some(0));
    }

    #[test]
    fn test_raster_blur_matches_field_blur() {
        let mut raster = Raster::new(9, 7);
        raster.put(4, 3, 255);
        raster.put(5, 3, 200);
        raster.put(4, 4, 100);
        let mut field = HeightField::new(9, 7).unwrap();
        for (index, value) in raster.data().iter().enumerate() {
            field.set(index % 9, index / 9, *value as Scalar).unwrap();
        }
        gauss_blur_raster(&mut raster, 2, 2, 1.0).unwrap();
        gauss_blur(&mut field, 2, 2, 1.0).unwrap();
        // raster is rounded after each pass.
        for (pixel, value) in raster.data().iter().zip(field.values()) {
            assert!((*pixel as Scalar - value).abs() <= 1.0 + 1.0e-3);
        }
    }
}
