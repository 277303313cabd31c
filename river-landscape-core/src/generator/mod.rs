pub mod process_status;
mod processing_stage;

use crate::{
    blur::BlurError,
    delaunay::{triangulate, TriangulationError},
    generator::{process_status::ProcessStatus, processing_stage::ProcessingStage},
    graph::GraphError,
    height_field::{HeightField, HeightFieldError},
    noises::{add_perlin, add_voronoi},
    plane::PlaneError,
    river::{river_course, river_field, river_raster, sample_nodes},
    settings::{LandscapeSettings, PerlinSettings, SettingsError, VoronoiSettings},
    spline::{Spline, SplineError},
    Scalar,
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Error thrown during landscape generation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerateLandscapeError {
    /// Invalid settings.
    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),
    /// Height field error.
    #[error("height field error: {0}")]
    HeightField(#[from] HeightFieldError),
    /// River nodes triangulation failed.
    #[error("triangulation failed: {0}")]
    Triangulation(#[from] TriangulationError),
    /// River course search failed.
    #[error("river course error: {0}")]
    Graph(#[from] GraphError),
    /// River spline fitting failed.
    #[error("river spline error: {0}")]
    Spline(#[from] SplineError),
    /// Blur failed.
    #[error("blur failed: {0}")]
    Blur(#[from] BlurError),
    /// Plane triangulation failed.
    #[error("plane triangulation failed: {0}")]
    Plane(#[from] PlaneError),
    /// There is no landscape created.
    #[error("there is no landscape created")]
    NothingCreated,
}

/// River landscape generator state object.
/// It allows you to process landscape generation in stages and track progress or cancel
/// generation in the middle of the process.
///
/// # Examples
/// ```
/// use river_landscape_core::prelude::*;
///
/// let settings = LandscapeSettings {
///     size: Some(LandscapeSize::Square(32)),
///     river: RiverSettings {
///         thickness: 4.0,
///         ..Default::default()
///     },
///     ..Default::default()
/// };
/// let mut generator = LandscapeGenerator::new(settings).unwrap();
/// assert_eq!(generator.progress(), (0, 7, 0.0));
/// assert_eq!(generator.process(), Ok(ProcessStatus::InProgress));
/// assert_eq!(generator.stage(), Some("triangulating"));
/// generator.process_wait().unwrap();
/// let landscape = generator.into_landscape().unwrap();
/// assert_eq!((landscape.min(), landscape.max()), (0.0, 1.0));
/// assert!(!landscape.is_dirty());
/// ```
#[derive(Debug, Clone)]
pub struct LandscapeGenerator {
    settings: LandscapeSettings,
    width: usize,
    height: usize,
    rng: Pcg64Mcg,
    landscape: Option<HeightField>,
    current: Option<ProcessingStage>,
}

impl LandscapeGenerator {
    /// Create new generator.
    ///
    /// # Arguments
    /// * `settings` - Settings.
    ///
    /// # Returns
    /// New generator instance or settings error.
    pub fn new(settings: LandscapeSettings) -> Result<Self, GenerateLandscapeError> {
        settings.validate()?;
        let (width, height) = settings.dimensions()?;
        let rng = Pcg64Mcg::seed_from_u64(settings.river.seed);
        Ok(Self {
            settings,
            width,
            height,
            rng,
            landscape: None,
            current: Some(ProcessingStage::SamplingNodes),
        })
    }

    /// Get settings.
    pub fn settings(&self) -> &LandscapeSettings {
        &self.settings
    }

    /// Get landscape if one is already generated.
    pub fn landscape(&self) -> Option<&HeightField> {
        self.landscape.as_ref()
    }

    pub fn into_landscape(self) -> Result<HeightField, GenerateLandscapeError> {
        self.landscape.ok_or(GenerateLandscapeError::NothingCreated)
    }

    /// Tells if there are stages left to process.
    pub fn in_progress(&self) -> bool {
        self.current.is_some()
    }

    /// Get name of the stage that will be processed next.
    pub fn stage(&self) -> Option<&'static str> {
        self.current.as_ref().map(|stage| stage.name())
    }

    /// Get processing progress.
    ///
    /// # Returns
    /// `(current, limit, percentage)`
    pub fn progress(&self) -> (usize, usize, Scalar) {
        let limit = ProcessingStage::COUNT;
        let current = match &self.current {
            Some(stage) => stage.index(),
            None if self.landscape.is_some() => limit,
            None => 0,
        };
        (current, limit, current as Scalar / limit as Scalar)
    }

    /// Process pending stage.
    ///
    /// # Returns
    /// Result with process status when ok, otherwise error.
    pub fn process(&mut self) -> Result<ProcessStatus, GenerateLandscapeError> {
        let current = match self.current.take() {
            Some(current) => current,
            None => return Ok(ProcessStatus::Idle),
        };
        let name = current.name();
        let timer = Instant::now();
        let next = match current {
            ProcessingStage::SamplingNodes => {
                let points = sample_nodes(self.settings.river.nodes, &mut self.rng);
                let perlin_seed = self.rng.gen::<u32>();
                ProcessingStage::Triangulating {
                    points,
                    perlin_seed,
                }
            }
            ProcessingStage::Triangulating {
                points,
                perlin_seed,
            } => {
                let edges = triangulate(&points)?;
                ProcessingStage::FindingPath {
                    points,
                    edges,
                    perlin_seed,
                }
            }
            ProcessingStage::FindingPath {
                points,
                edges,
                perlin_seed,
            } => ProcessingStage::FittingSpline {
                course: river_course(&points, &edges)?,
                perlin_seed,
            },
            ProcessingStage::FittingSpline {
                course,
                perlin_seed,
            } => ProcessingStage::Rasterizing {
                spline: Spline::new(&course)?,
                perlin_seed,
            },
            ProcessingStage::Rasterizing {
                spline,
                perlin_seed,
            } => ProcessingStage::Blurring {
                raster: river_raster(&spline, &self.settings)?,
                perlin_seed,
            },
            ProcessingStage::Blurring {
                raster,
                perlin_seed,
            } => ProcessingStage::AddingNoise {
                field: river_field(&raster, &self.settings)?,
                perlin_seed,
            },
            ProcessingStage::AddingNoise {
                mut field,
                perlin_seed,
            } => {
                compose_landscape(
                    &mut field,
                    &self.settings.perlin,
                    &self.settings.voronoi,
                    perlin_seed,
                );
                log::debug!(
                    "Stage `{}` finished in {:?}: {}x{} landscape completed",
                    name,
                    timer.elapsed(),
                    self.width,
                    self.height
                );
                self.landscape = Some(field);
                return Ok(ProcessStatus::LandscapeCompleted);
            }
        };
        log::debug!("Stage `{}` finished in {:?}", name, timer.elapsed());
        self.current = Some(next);
        Ok(ProcessStatus::InProgress)
    }

    /// Process stages until none is left to do.
    ///
    /// # Returns
    /// Ok or generation error.
    pub fn process_wait(&mut self) -> Result<(), GenerateLandscapeError> {
        while self.process()? == ProcessStatus::InProgress {}
        Ok(())
    }

    /// Process stages until none is left to do or time runs out.
    ///
    /// # Arguments
    /// * `timeout` - Duration of time that processing can take.
    ///
    /// # Returns
    /// Process status or generation error.
    pub fn process_wait_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<ProcessStatus, GenerateLandscapeError> {
        let timer = Instant::now();
        loop {
            let status = self.process()?;
            if status != ProcessStatus::InProgress || timer.elapsed() > timeout {
                return Ok(status);
            }
        }
    }

    /// Process stages until none is left to do.
    ///
    /// # Arguments
    /// * `f` - Callback triggered on every processing step. Signature: `fn(progress, limit, factor)`.
    ///
    /// # Returns
    /// Ok or generation error.
    pub fn process_wait_tracked<F>(&mut self, mut f: F) -> Result<(), GenerateLandscapeError>
    where
        F: FnMut(usize, usize, Scalar),
    {
        let (c, l, p) = self.progress();
        f(c, l, p);
        loop {
            let status = self.process()?;
            let (c, l, p) = self.progress();
            f(c, l, p);
            if status != ProcessStatus::InProgress {
                return Ok(());
            }
        }
    }
}

/// Turn blurred river field into final landscape.
/// Noise layers are added on top of the river first, then the result is inverted so the river
/// becomes a valley, shifted to start at zero, normalized into `[0, 1]` and quantized.
///
/// # Arguments
/// * `field` - Blurred river height field.
/// * `perlin` - Fractal noise layer settings.
/// * `voronoi` - Cellular noise layer settings.
/// * `perlin_seed` - Fractal noise seed.
pub fn compose_landscape(
    field: &mut HeightField,
    perlin: &PerlinSettings,
    voronoi: &VoronoiSettings,
    perlin_seed: u32,
) {
    add_perlin(
        field,
        perlin.weight,
        perlin.scale,
        perlin.octaves,
        perlin_seed,
    );
    add_voronoi(field, voronoi.weight, voronoi.scale);
    field.invert();
    field.offset(-field.min());
    field.normalize(0.0, 1.0);
    field.quantize();
}

/// Generate river landscape height field.
///
/// # Arguments
/// * `settings` - Landscape settings.
///
/// # Returns
/// Normalized and quantized landscape or generation error.
pub fn generate_landscape(
    settings: LandscapeSettings,
) -> Result<HeightField, GenerateLandscapeError> {
    let mut generator = LandscapeGenerator::new(settings)?;
    generator.process_wait()?;
    generator.into_landscape()
}

/// Generate river landscape height field and report progress.
///
/// # Arguments
/// * `settings` - Landscape settings.
/// * `f` - Callback triggered on every processing step. Signature: `fn(progress, limit, factor)`.
///
/// # Returns
/// Normalized and quantized landscape or generation error.
pub fn generate_landscape_tracked<F>(
    settings: LandscapeSettings,
    f: F,
) -> Result<HeightField, GenerateLandscapeError>
where
    F: FnMut(usize, usize, Scalar),
{
    let mut generator = LandscapeGenerator::new(settings)?;
    generator.process_wait_tracked(f)?;
    generator.into_landscape()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        noises::voronoi,
        settings::{GaussSettings, LandscapeSize, RiverSettings},
    };

    fn settings() -> LandscapeSettings {
        LandscapeSettings {
            size: Some(LandscapeSize::Square(256)),
            river: RiverSettings {
                nodes: 10,
                samples: 30,
                thickness: 100.0,
                seed: 0,
            },
            gauss: GaussSettings {
                ksx: 10,
                ksy: 10,
                sigma: 5.0,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_end_to_end_determinism() {
        let a = generate_landscape(settings()).unwrap();
        let b = generate_landscape(settings()).unwrap();
        assert_eq!(a.quantized(), b.quantized());
        assert_eq!(a.quantized().len(), 256 * 256);
        assert_eq!((a.min(), a.max()), (0.0, 1.0));
        assert!(a.values().iter().all(|v| *v >= 0.0 && *v <= 1.0));
    }

    #[test]
    fn test_noise_is_inverted_with_river() {
        let (size, river_cell) = (16, 5 * 16 + 7);
        let cells = voronoi(size, size, 4.0).unwrap();
        let mut field = HeightField::new(size, size).unwrap();
        field.set(7, 5, 10.0).unwrap();
        let perlin = PerlinSettings {
            weight: 0.0,
            ..Default::default()
        };
        let cellular = VoronoiSettings {
            weight: 1.0,
            scale: 4.0,
        };
        compose_landscape(&mut field, &perlin, &cellular, 0);
        assert!(!field.is_dirty());
        assert!(field.values()[river_cell].abs() < 1.0e-5);
        assert_eq!(field.quantized()[river_cell], 0);
        // noise peaks end up as the lowest land once inverted.
        let land = (0..size * size)
            .filter(|index| *index != river_cell)
            .collect::<Vec<_>>();
        for a in &land {
            for b in &land {
                if cells.values()[*a] > cells.values()[*b] {
                    assert!(field.values()[*a] <= field.values()[*b] + 1.0e-5);
                }
            }
        }
        let peak = land
            .iter()
            .copied()
            .max_by(|a, b| cells.values()[*a].total_cmp(&cells.values()[*b]))
            .unwrap();
        let pit = land
            .iter()
            .copied()
            .min_by(|a, b| cells.values()[*a].total_cmp(&cells.values()[*b]))
            .unwrap();
        assert!(field.values()[peak] < field.values()[pit]);
        assert!(field.values()[pit] > field.values()[river_cell]);
    }

    #[test]
    fn test_seed_changes_landscape() {
        let mut other = settings();
        other.size = Some(LandscapeSize::Square(64));
        other.river.thickness = 10.0;
        let a = generate_landscape(other.clone()).unwrap();
        other.river.seed = 1;
        let b = generate_landscape(other).unwrap();
        assert_ne!(a.quantized(), b.quantized());
    }

    #[test]
    fn test_tracked_progress() {
        let mut other = settings();
        other.size = Some(LandscapeSize::Rectangle([48, 32]));
        other.river.thickness = 6.0;
        let mut reports = vec![];
        let landscape =
            generate_landscape_tracked(other, |c, l, _| reports.push((c, l))).unwrap();
        assert_eq!((landscape.width(), landscape.height()), (48, 32));
        assert_eq!(reports.first(), Some(&(0, 7)));
        assert_eq!(reports.last(), Some(&(7, 7)));
        assert_eq!(reports.len(), 8);
        for pair in reports.windows(2) {
            assert_eq!(pair[0].0 + 1, pair[1].0);
        }
    }

    #[test]
    fn test_stages() {
        let mut generator = LandscapeGenerator::new(settings()).unwrap();
        let mut stages = vec![];
        while let Some(stage) = generator.stage() {
            stages.push(stage);
            generator.process().unwrap();
        }
        assert_eq!(
            stages,
            vec![
                "sampling nodes",
                "triangulating",
                "finding path",
                "fitting spline",
                "rasterizing",
                "blurring",
                "adding noise",
            ]
        );
        assert!(generator.landscape().is_some());
        assert_eq!(generator.process(), Ok(ProcessStatus::Idle));
        assert!(!generator.in_progress());
    }

    #[test]
    fn test_invalid_settings() {
        let mut invalid = settings();
        invalid.gauss.sigma = 0.0;
        assert_eq!(
            LandscapeGenerator::new(invalid).err(),
            Some(GenerateLandscapeError::Settings(SettingsError::InvalidSigma(
                0.0
            )))
        );
        let generator = LandscapeGenerator::new(settings()).unwrap();
        assert_eq!(
            generator.into_landscape(),
            Err(GenerateLandscapeError::NothingCreated)
        );
    }
}
