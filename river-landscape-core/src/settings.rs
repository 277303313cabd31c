use crate::Scalar;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Error thrown by settings validation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SettingsError {
    /// Landscape must be at least one pixel wide and tall.
    /// (width, height)
    #[error("invalid landscape size {0}x{1}")]
    InvalidSize(usize, usize),
    /// Neither `size` nor both `width` and `height` were given.
    #[error("either `size` or both `width` and `height` must be given")]
    IncompleteSize,
    /// River needs at least one random node.
    #[error("river needs at least one node")]
    NoNodes,
    /// River spline needs at least one sample.
    #[error("river needs at least one sample")]
    NoSamples,
    /// River thickness must be positive.
    #[error("invalid river thickness: {0}")]
    InvalidThickness(Scalar),
    /// Gaussian sigma must be positive.
    #[error("invalid gaussian sigma: {0}")]
    InvalidSigma(Scalar),
    /// Plane needs at least one vertex along each axis.
    /// (width, height)
    #[error("invalid plane resolution {0}x{1}")]
    InvalidPlaneResolution(usize, usize),
    /// Output file path is empty.
    #[error("output file is not specified")]
    MissingOutputFile,
}

/// Landscape size: single number for square or `[width, height]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LandscapeSize {
    /// Square landscape.
    Square(usize),
    /// Rectangular landscape: `[width, height]`.
    Rectangle([usize; 2]),
}

impl LandscapeSize {
    /// Returns `(width, height)`.
    pub fn dimensions(self) -> (usize, usize) {
        match self {
            Self::Square(size) => (size, size),
            Self::Rectangle([width, height]) => (width, height),
        }
    }
}

/// Fractal noise layer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PerlinSettings {
    /// Layer weight.
    pub weight: Scalar,
    /// Noise scale over whole landscape.
    pub scale: Scalar,
    /// Number of octaves.
    pub octaves: usize,
}

impl Default for PerlinSettings {
    fn default() -> Self {
        Self {
            weight: Self::default_weight(),
            scale: Self::default_scale(),
            octaves: Self::default_octaves(),
        }
    }
}

impl PerlinSettings {
    fn default_weight() -> Scalar {
        0.5
    }

    fn default_scale() -> Scalar {
        5.0
    }

    fn default_octaves() -> usize {
        6
    }
}

/// Cellular noise layer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoronoiSettings {
    /// Layer weight.
    pub weight: Scalar,
    /// Number of cells across landscape.
    pub scale: Scalar,
}

impl Default for VoronoiSettings {
    fn default() -> Self {
        Self {
            weight: Self::default_weight(),
            scale: Self::default_scale(),
        }
    }
}

impl VoronoiSettings {
    fn default_weight() -> Scalar {
        0.25
    }

    fn default_scale() -> Scalar {
        5.0
    }
}

/// River path settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiverSettings {
    /// Number of random nodes the river may pass through.
    pub nodes: usize,
    /// Number of spline samples turned into strokes.
    pub samples: usize,
    /// River width in pixels.
    pub thickness: Scalar,
    /// Random generator seed.
    pub seed: u64,
}

impl Default for RiverSettings {
    fn default() -> Self {
        Self {
            nodes: Self::default_nodes(),
            samples: Self::default_samples(),
            thickness: Self::default_thickness(),
            seed: 0,
        }
    }
}

impl RiverSettings {
    fn default_nodes() -> usize {
        10
    }

    fn default_samples() -> usize {
        30
    }

    fn default_thickness() -> Scalar {
        100.0
    }
}

/// Gaussian blur settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GaussSettings {
    /// Horizontal kernel half width.
    pub ksx: usize,
    /// Vertical kernel half width.
    pub ksy: usize,
    /// Standard deviation.
    pub sigma: Scalar,
}

impl Default for GaussSettings {
    fn default() -> Self {
        Self {
            ksx: Self::default_kernel_size(),
            ksy: Self::default_kernel_size(),
            sigma: Self::default_sigma(),
        }
    }
}

impl GaussSettings {
    fn default_kernel_size() -> usize {
        10
    }

    fn default_sigma() -> Scalar {
        5.0
    }
}

/// Output mesh settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlaneSettings {
    /// Height multiplier applied to mesh vertices.
    pub delta: Scalar,
    /// Grid columns.
    pub width: usize,
    /// Grid rows.
    pub height: usize,
}

impl Default for PlaneSettings {
    fn default() -> Self {
        Self {
            delta: Self::default_delta(),
            width: Self::default_resolution(),
            height: Self::default_resolution(),
        }
    }
}

impl PlaneSettings {
    fn default_delta() -> Scalar {
        0.1
    }

    fn default_resolution() -> usize {
        256
    }
}

/// Settings of river landscape generation.
///
/// # Examples
/// ```
/// use river_landscape_core::prelude::*;
///
/// let settings = LandscapeSettings {
///     size: Some(LandscapeSize::Rectangle([320, 200])),
///     ..Default::default()
/// };
/// assert_eq!(settings.dimensions(), Ok((320, 200)));
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LandscapeSettings {
    /// Landscape size in pixels; takes precedence over `width` and `height`.
    #[serde(default)]
    pub size: Option<LandscapeSize>,
    /// Landscape width in pixels.
    #[serde(default)]
    pub width: Option<usize>,
    /// Landscape height in pixels.
    #[serde(default)]
    pub height: Option<usize>,
    pub perlin: PerlinSettings,
    pub voronoi: VoronoiSettings,
    pub river: RiverSettings,
    pub gauss: GaussSettings,
    pub plane: PlaneSettings,
    /// Height map image path.
    pub output_file: String,
    /// Mesh path; derived from `output_file` when missing.
    #[serde(default)]
    pub mesh_file: Option<String>,
}

impl Default for LandscapeSettings {
    fn default() -> Self {
        Self {
            size: Some(LandscapeSize::Square(Self::default_size())),
            width: None,
            height: None,
            perlin: Default::default(),
            voronoi: Default::default(),
            river: Default::default(),
            gauss: Default::default(),
            plane: Default::default(),
            output_file: Self::default_output_file(),
            mesh_file: None,
        }
    }
}

impl LandscapeSettings {
    fn default_size() -> usize {
        1024
    }

    fn default_output_file() -> String {
        "landscape.png".to_owned()
    }

    /// Resolve landscape dimensions from `size` or `width` and `height`.
    ///
    /// # Returns
    /// `(width, height)` or error when neither `size` nor both `width` and `height` are given.
    pub fn dimensions(&self) -> Result<(usize, usize), SettingsError> {
        match (self.size, self.width, self.height) {
            (Some(size), _, _) => Ok(size.dimensions()),
            (None, Some(width), Some(height)) => Ok((width, height)),
            _ => Err(SettingsError::IncompleteSize),
        }
    }

    /// Returns height map image path (lower-cased).
    pub fn image_path(&self) -> PathBuf {
        PathBuf::from(self.output_file.to_lowercase())
    }

    /// Returns mesh path: `mesh_file` or image path with `obj` extension.
    ///
    /// # Examples
    /// ```
    /// use river_landscape_core::prelude::*;
    ///
    /// let settings = LandscapeSettings {
    ///     output_file: "Out/River.PNG".to_owned(),
    ///     ..Default::default()
    /// };
    /// assert_eq!(settings.image_path().to_str(), Some("out/river.png"));
    /// assert_eq!(settings.mesh_path().to_str(), Some("out/river.obj"));
    /// ```
    pub fn mesh_path(&self) -> PathBuf {
        match &self.mesh_file {
            Some(path) => PathBuf::from(path),
            None => self.image_path().with_extension("obj"),
        }
    }

    /// Check settings before running generation.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let (width, height) = self.dimensions()?;
        if width == 0 || height == 0 {
            return Err(SettingsError::InvalidSize(width, height));
        }
        if self.river.nodes == 0 {
            return Err(SettingsError::NoNodes);
        }
        if self.river.samples == 0 {
            return Err(SettingsError::NoSamples);
        }
        if !(self.river.thickness.is_finite() && self.river.thickness > 0.0) {
            return Err(SettingsError::InvalidThickness(self.river.thickness));
        }
        if !(self.gauss.sigma.is_finite() && self.gauss.sigma > 0.0) {
            return Err(SettingsError::InvalidSigma(self.gauss.sigma));
        }
        if self.plane.width == 0 || self.plane.height == 0 {
            return Err(SettingsError::InvalidPlaneResolution(
                self.plane.width,
                self.plane.height,
            ));
        }
        if self.output_file.trim().is_empty() {
            return Err(SettingsError::MissingOutputFile);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = LandscapeSettings::default();
        assert_eq!(settings.dimensions(), Ok((1024, 1024)));
        assert_eq!(settings.river.nodes, 10);
        assert_eq!(settings.river.samples, 30);
        assert_eq!(settings.gauss.sigma, 5.0);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_dimensions() {
        let mut settings = LandscapeSettings {
            size: Some(LandscapeSize::Square(64)),
            width: Some(10),
            ..Default::default()
        };
        assert_eq!(settings.dimensions(), Ok((64, 64)));
        settings.size = None;
        assert_eq!(settings.dimensions(), Err(SettingsError::IncompleteSize));
        settings.width = None;
        assert_eq!(settings.dimensions(), Err(SettingsError::IncompleteSize));
        settings.width = Some(10);
        settings.height = Some(20);
        assert_eq!(settings.dimensions(), Ok((10, 20)));
    }

    #[test]
    fn test_validate() {
        let mut settings = LandscapeSettings {
            size: Some(LandscapeSize::Rectangle([0, 10])),
            ..Default::default()
        };
        assert_eq!(settings.validate(), Err(SettingsError::InvalidSize(0, 10)));
        settings.size = None;
        assert_eq!(settings.validate(), Err(SettingsError::IncompleteSize));
        settings.size = Some(LandscapeSize::Square(16));
        settings.river.nodes = 0;
        assert_eq!(settings.validate(), Err(SettingsError::NoNodes));
        settings.river.nodes = 3;
        settings.river.thickness = -1.0;
        assert_eq!(
            settings.validate(),
            Err(SettingsError::InvalidThickness(-1.0))
        );
        settings.river.thickness = 1.0;
        settings.plane.height = 0;
        assert_eq!(
            settings.validate(),
            Err(SettingsError::InvalidPlaneResolution(256, 0))
        );
        settings.plane.height = 1;
        assert!(settings.validate().is_ok());
        settings.output_file = " ".to_owned();
        assert_eq!(settings.validate(), Err(SettingsError::MissingOutputFile));
    }

    #[test]
    fn test_explicit_mesh_path() {
        let settings = LandscapeSettings {
            mesh_file: Some("Mesh.OBJ".to_owned()),
            ..Default::default()
        };
        assert_eq!(settings.mesh_path(), PathBuf::from("Mesh.OBJ"));
        assert_eq!(settings.image_path(), PathBuf::from("landscape.png"));
    }
}
