pub mod blur;
pub mod coord;
pub mod delaunay;
pub mod generator;
pub mod graph;
pub mod height_field;
pub mod noises;
pub mod plane;
pub mod river;
pub mod settings;
pub mod spline;
pub mod stroke;
pub mod triangle;

/// Scalar type.
pub type Scalar = f32;

pub mod prelude {
    pub use crate::{
        blur::*, coord::*, delaunay::*, generator::process_status::*, generator::*, graph::*,
        height_field::*, noises::*, plane::*, river::*, settings::*, spline::*, stroke::*,
        triangle::*, Scalar,
    };
}
