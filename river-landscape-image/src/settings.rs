use serde::{Deserialize, Serialize};

/// Source image channel used as height (at the end you get grayscale image representing height
/// map).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageHeightSource {
    /// Luminosity.
    #[default]
    Luma,
    /// Luminosity * Alpha.
    LumaAlpha,
    /// Red channel.
    Red,
    /// Green channel.
    Green,
    /// Blue channel.
    Blue,
    /// Alpha channel.
    Alpha,
}

/// Settings of height field loading from image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightImageSettings {
    /// Image height source.
    #[serde(default)]
    pub height_source: ImageHeightSource,
    /// Scale of the image (image is rescaled to: original size / scale).
    #[serde(default = "HeightImageSettings::default_scale")]
    pub scale: usize,
}

impl Default for HeightImageSettings {
    fn default() -> Self {
        Self {
            height_source: ImageHeightSource::default(),
            scale: Self::default_scale(),
        }
    }
}

impl HeightImageSettings {
    fn default_scale() -> usize {
        1
    }
}
