use crate::{
    blur::gauss_blur,
    coord::Coord,
    delaunay::triangulate,
    generator::GenerateLandscapeError,
    graph::{Graph, GraphError},
    height_field::HeightField,
    settings::LandscapeSettings,
    spline::{Spline, SplineError},
    stroke::{rasterize, Raster, Stroke},
    triangle::Edge,
    Scalar,
};
use rand::Rng;
use std::collections::BTreeSet;

/// Vertical position of the river source, above the landscape.
pub const RIVER_SOURCE_Y: Scalar = -0.1;
/// Vertical position of the river target, below the landscape.
pub const RIVER_TARGET_Y: Scalar = 1.1;

/// Sample river nodes in unit square, followed by source and target points.
///
/// # Arguments
/// * `nodes` - Number of nodes inside unit square.
/// * `rng` - Random number generator.
///
/// # Returns
/// `nodes + 2` points; source is at `nodes` index and target at `nodes + 1` index.
///
/// # Examples
/// ```
/// use river_landscape_core::prelude::*;
/// use rand::SeedableRng;
///
/// let mut rng = rand_pcg::Pcg64Mcg::seed_from_u64(0);
/// let points = sample_nodes(5, &mut rng);
/// assert_eq!(points.len(), 7);
/// assert_eq!(points[5].y, RIVER_SOURCE_Y);
/// assert_eq!(points[6].y, RIVER_TARGET_Y);
/// ```
pub fn sample_nodes<R>(nodes: usize, rng: &mut R) -> Vec<Coord>
where
    R: Rng + ?Sized,
{
    let mut points = Vec::with_capacity(nodes + 2);
    for _ in 0..nodes {
        let x = rng.gen::<Scalar>();
        let y = rng.gen::<Scalar>();
        points.push(Coord::new(x, y));
    }
    points.push(Coord::new(rng.gen::<Scalar>(), RIVER_SOURCE_Y));
    points.push(Coord::new(rng.gen::<Scalar>(), RIVER_TARGET_Y));
    points
}

/// Find river course between source and target (two last points) over triangulation edges.
///
/// # Arguments
/// * `points` - Points produced by `sample_nodes`.
/// * `edges` - Triangulation edges of these points.
///
/// # Returns
/// Positions of path nodes from source to target.
pub fn river_course(points: &[Coord], edges: &BTreeSet<Edge>) -> Result<Vec<Coord>, GraphError> {
    let count = points.len();
    if count < 2 {
        return Err(GraphError::InvalidVertex(1, count));
    }
    let graph = Graph::new(points, edges.iter().copied())?;
    let path = graph.shortest_path(count - 2, count - 1)?;
    log::debug!(
        "River course goes through {} nodes (length: {})",
        path.nodes.len(),
        path.length
    );
    Ok(path.nodes.into_iter().map(|i| points[i]).collect())
}

/// Turn river spline into strokes in pixel space.
///
/// # Arguments
/// * `spline` - River spline in unit square space.
/// * `samples` - Number of spline samples.
/// * `thickness` - River width in pixels.
/// * `width` - Image width.
/// * `height` - Image height.
///
/// # Returns
/// One stroke per consecutive pair of samples or error if spline sampling fails.
pub fn river_strokes(
    spline: &Spline,
    samples: usize,
    thickness: Scalar,
    width: usize,
    height: usize,
) -> Result<Vec<Stroke>, SplineError> {
    let size = Coord::new(width as Scalar, height as Scalar);
    let points = spline
        .sample(samples)?
        .into_iter()
        .map(|p| Coord::new(p.x * size.x, p.y * size.y))
        .collect::<Vec<_>>();
    Ok(points
        .windows(2)
        .map(|pair| Stroke::new(pair[0], pair[1], thickness))
        .collect())
}

/// Rasterize river spline.
pub fn river_raster(
    spline: &Spline,
    settings: &LandscapeSettings,
) -> Result<Raster, GenerateLandscapeError> {
    let (width, height) = settings.dimensions()?;
    let strokes = river_strokes(
        spline,
        settings.river.samples,
        settings.river.thickness,
        width,
        height,
    )?;
    Ok(rasterize(&strokes, width, height))
}

/// Turn river raster into blurred height field.
pub fn river_field(
    raster: &Raster,
    settings: &LandscapeSettings,
) -> Result<HeightField, GenerateLandscapeError> {
    let mut field = HeightField::from_raster(raster)?;
    gauss_blur(
        &mut field,
        settings.gauss.ksx,
        settings.gauss.ksy,
        settings.gauss.sigma,
    )?;
    Ok(field)
}

/// Generate blurred river height field: river is bright (`1`) over dark (`0`) background.
///
/// # Arguments
/// * `settings` - Landscape settings.
/// * `rng` - Random number generator.
///
/// # Returns
/// River height field or generation error.
///
/// # Examples
/// ```
/// use river_landscape_core::prelude::*;
/// use rand::SeedableRng;
///
/// let settings = LandscapeSettings {
///     size: Some(LandscapeSize::Square(64)),
///     river: RiverSettings {
///         thickness: 8.0,
///         ..Default::default()
///     },
///     gauss: GaussSettings {
///         ksx: 2,
///         ksy: 2,
///         sigma: 1.0,
///     },
///     ..Default::default()
/// };
/// let mut rng = rand_pcg::Pcg64Mcg::seed_from_u64(1);
/// let field = river(&settings, &mut rng).unwrap();
/// assert_eq!((field.width(), field.height()), (64, 64));
/// assert!(field.values().iter().any(|v| *v > 0.5));
/// ```
pub fn river<R>(
    settings: &LandscapeSettings,
    rng: &mut R,
) -> Result<HeightField, GenerateLandscapeError>
where
    R: Rng + ?Sized,
{
    settings.validate()?;
    let points = sample_nodes(settings.river.nodes, rng);
    let edges = triangulate(&points)?;
    let course = river_course(&points, &edges)?;
    let spline = Spline::new(&course)?;
    let raster = river_raster(&spline, settings)?;
    river_field(&raster, settings)
}
