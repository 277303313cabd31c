use crate::{
    coord::Coord, height_field::HeightField, spline::Spline, stroke::Raster, triangle::Edge,
};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ProcessingStage {
    SamplingNodes,
    Triangulating {
        points: Vec<Coord>,
        perlin_seed: u32,
    },
    FindingPath {
        points: Vec<Coord>,
        edges: BTreeSet<Edge>,
        perlin_seed: u32,
    },
    FittingSpline {
        course: Vec<Coord>,
        perlin_seed: u32,
    },
    Rasterizing {
        spline: Spline,
        perlin_seed: u32,
    },
    Blurring {
        raster: Raster,
        perlin_seed: u32,
    },
    AddingNoise {
        field: HeightField,
        perlin_seed: u32,
    },
}

impl ProcessingStage {
    pub const COUNT: usize = 7;

    pub fn index(&self) -> usize {
        match self {
            Self::SamplingNodes => 0,
            Self::Triangulating { .. } => 1,
            Self::FindingPath { .. } => 2,
            Self::FittingSpline { .. } => 3,
            Self::Rasterizing { .. } => 4,
            Self::Blurring { .. } => 5,
            Self::AddingNoise { .. } => 6,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SamplingNodes => "sampling nodes",
            Self::Triangulating { .. } => "triangulating",
            Self::FindingPath { .. } => "finding path",
            Self::FittingSpline { .. } => "fitting spline",
            Self::Rasterizing { .. } => "rasterizing",
            Self::Blurring { .. } => "blurring",
            Self::AddingNoise { .. } => "adding noise",
        }
    }
}
