pub mod settings;

use crate::settings::{HeightImageSettings, ImageHeightSource};
use image::{
    codecs::hdr::HdrEncoder, imageops::FilterType, DynamicImage, GrayImage, ImageError,
    ImageFormat, Rgb,
};
use river_landscape_core::{
    height_field::{HeightField, HeightFieldError},
    Scalar,
};
use std::{fs::File, io::BufWriter, path::Path};
use thiserror::Error;

/// Error thrown by height field image conversions.
#[derive(Debug, Error)]
pub enum HeightImageError {
    /// Image encoding or decoding failed.
    #[error("image error: {0}")]
    Image(#[from] ImageError),
    /// File could not be created.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Height field could not be created from image.
    #[error("height field error: {0}")]
    HeightField(#[from] HeightFieldError),
    /// Image buffer does not match height field size.
    /// (width, height)
    #[error("cannot build {0}x{1} image buffer")]
    InvalidBuffer(usize, usize),
}

/// Select image format from file extension, falling back to PNG for unknown ones.
///
/// # Examples
/// ```
/// use image::ImageFormat;
/// use river_landscape_image::image_format;
///
/// assert_eq!(image_format("river.JPG"), ImageFormat::Jpeg);
/// assert_eq!(image_format("river.hdr"), ImageFormat::Hdr);
/// assert_eq!(image_format("river.xyz"), ImageFormat::Png);
/// ```
pub fn image_format<P: AsRef<Path>>(path: P) -> ImageFormat {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    match extension.as_deref() {
        Some("png") => ImageFormat::Png,
        Some("jpg") | Some("jpeg") => ImageFormat::Jpeg,
        Some("bmp") => ImageFormat::Bmp,
        Some("hdr") => ImageFormat::Hdr,
        _ => {
            log::warn!(
                "Unsupported image extension of {:?}, writing PNG data",
                path.display()
            );
            ImageFormat::Png
        }
    }
}

/// Build grayscale image out of height field quantized values.
/// Dirty height field is quantized on a copy first.
///
/// # Arguments
/// * `field` - Height field.
///
/// # Returns
/// Grayscale image or error.
///
/// # Examples
/// ```
/// use river_landscape_core::prelude::*;
/// use river_landscape_image::height_field_image;
///
/// let field = HeightField::from_data(2, 1, vec![0.0, 1.0]).unwrap();
/// let image = height_field_image(&field).unwrap();
/// assert_eq!(image.dimensions(), (2, 1));
/// assert_eq!(image.into_raw(), vec![0, 255]);
/// ```
pub fn height_field_image(field: &HeightField) -> Result<GrayImage, HeightImageError> {
    let data = if field.is_dirty() {
        let mut field = field.clone();
        field.quantize();
        field.quantized().to_vec()
    } else {
        field.quantized().to_vec()
    };
    GrayImage::from_raw(field.width() as _, field.height() as _, data)
        .ok_or(HeightImageError::InvalidBuffer(field.width(), field.height()))
}

/// Save height field as single channel image; format is selected by file extension.
///
/// # Arguments
/// * `field` - Height field.
/// * `path` - Output file path.
///
/// # Returns
/// Ok or error.
pub fn save_height_field<P: AsRef<Path>>(
    field: &HeightField,
    path: P,
) -> Result<(), HeightImageError> {
    let path = path.as_ref();
    let format = image_format(path);
    if format == ImageFormat::Hdr {
        let range = field.max() - field.min();
        let pixels = field
            .values()
            .iter()
            .map(|v| {
                let v = if range > 0.0 {
                    (v - field.min()) / range
                } else {
                    0.0
                };
                Rgb([v, v, v])
            })
            .collect::<Vec<_>>();
        let file = BufWriter::new(File::create(path)?);
        HdrEncoder::new(file).encode(&pixels, field.width(), field.height())?;
    } else {
        DynamicImage::ImageLuma8(height_field_image(field)?).save_with_format(path, format)?;
    }
    log::debug!(
        "Saved {}x{} height field to {:?} as {:?}",
        field.width(),
        field.height(),
        path.display(),
        format
    );
    Ok(())
}

/// Create height field from image, mapping channel `[0, 255]` into `[0, 1]`.
///
/// # Arguments
/// * `image` - Input image to process.
/// * `settings` - Image processing settings.
///
/// # Returns
/// Height field or error.
///
/// # Examples
/// ```
/// use image::{DynamicImage, RgbaImage};
/// use river_landscape_image::{height_field_from_image, settings::*};
///
/// let image = RgbaImage::from_raw(2, 1, vec![255, 0, 0, 255, 0, 51, 0, 255]).unwrap();
/// let settings = HeightImageSettings {
///     height_source: ImageHeightSource::Green,
///     ..Default::default()
/// };
/// let field = height_field_from_image(DynamicImage::ImageRgba8(image), &settings).unwrap();
/// assert_eq!(field.values(), &[0.0, 0.2]);
/// ```
pub fn height_field_from_image(
    image: DynamicImage,
    settings: &HeightImageSettings,
) -> Result<HeightField, HeightImageError> {
    let scale = settings.scale.max(1);
    let image = if scale > 1 {
        image.resize_exact(
            image.width() / scale as u32,
            image.height() / scale as u32,
            FilterType::Lanczos3,
        )
    } else {
        image
    };
    let (width, height) = (image.width() as usize, image.height() as usize);
    let data = match settings.height_source {
        ImageHeightSource::Luma => image.to_luma8().into_raw(),
        ImageHeightSource::LumaAlpha => image
            .to_luma_alpha8()
            .into_raw()
            .chunks(2)
            .map(|c| ((c[0] as Scalar / 255.0) * (c[1] as Scalar / 255.0) * 255.0) as u8)
            .collect(),
        ImageHeightSource::Red => channel(&image, 0),
        ImageHeightSource::Green => channel(&image, 1),
        ImageHeightSource::Blue => channel(&image, 2),
        ImageHeightSource::Alpha => channel(&image, 3),
    };
    let values = data.into_iter().map(|v| v as Scalar / 255.0).collect();
    Ok(HeightField::from_data(width, height, values)?)
}

/// Load height field from image file.
///
/// # Arguments
/// * `path` - Input image path.
/// * `settings` - Image processing settings.
///
/// # Returns
/// Height field or error.
pub fn load_height_field<P: AsRef<Path>>(
    path: P,
    settings: &HeightImageSettings,
) -> Result<HeightField, HeightImageError> {
    height_field_from_image(image::open(path)?, settings)
}

fn channel(image: &DynamicImage, index: usize) -> Vec<u8> {
    image
        .to_rgba8()
        .into_raw()
        .chunks(4)
        .map(|c| c[index])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, LumaA};

    #[test]
    fn test_image_format() {
        assert_eq!(image_format("a/b/out.png"), ImageFormat::Png);
        assert_eq!(image_format("out.jpeg"), ImageFormat::Jpeg);
        assert_eq!(image_format("out.Bmp"), ImageFormat::Bmp);
        assert_eq!(image_format("out"), ImageFormat::Png);
    }

    #[test]
    fn test_dirty_field_is_quantized_on_copy() {
        let mut field = HeightField::new(2, 2).unwrap();
        field.set(0, 0, 2.0).unwrap();
        assert!(field.is_dirty());
        let image = height_field_image(&field).unwrap();
        assert_eq!(image.into_raw(), vec![255, 0, 0, 0]);
        assert!(field.is_dirty());
    }

    #[test]
    fn test_luma_alpha_source() {
        let mut image = image::GrayAlphaImage::new(1, 1);
        image.put_pixel(0, 0, LumaA([255, 51]));
        let settings = HeightImageSettings {
            height_source: ImageHeightSource::LumaAlpha,
            ..Default::default()
        };
        let field =
            height_field_from_image(DynamicImage::ImageLumaA8(image), &settings).unwrap();
        assert_eq!(field.values(), &[0.2]);
    }

    #[test]
    fn test_scaled_source() {
        let image = GrayImage::from_pixel(8, 4, image::Luma([255]));
        let settings = HeightImageSettings {
            scale: 2,
            ..Default::default()
        };
        let field = height_field_from_image(DynamicImage::ImageLuma8(image), &settings).unwrap();
        assert_eq!((field.width(), field.height()), (4, 2));
    }

    #[test]
    fn test_save_and_load_png() {
        let path = std::env::temp_dir().join("river-landscape-image-test.png");
        let field = HeightField::from_data(3, 2, vec![0.0, 0.5, 1.0, 1.0, 0.5, 0.0]).unwrap();
        save_height_field(&field, &path).unwrap();
        let image = image::open(&path).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        let loaded = load_height_field(&path, &Default::default()).unwrap();
        let expected = height_field_image(&field).unwrap().into_raw();
        for (value, pixel) in loaded.values().iter().zip(expected) {
            assert!((value * 255.0 - pixel as Scalar).abs() < 1.0e-3);
        }
        let _ = std::fs::remove_file(path);
    }
}
