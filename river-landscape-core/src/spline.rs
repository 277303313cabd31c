use crate::{coord::Coord, Scalar};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error thrown by spline fitting and evaluation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SplineError {
    /// Spline needs at least two points.
    /// (provided points count)
    #[error("spline requires at least 2 points, got {0}")]
    NotEnoughPoints(usize),
    /// Tangents linear system has no unique solution.
    #[error("spline tangents system is singular")]
    SingularSystem,
    /// Evaluation parameter is outside of `[0, 1)` range.
    #[error("spline parameter {0} is outside of [0, 1) range")]
    OutOfRange(Scalar),
}

/// Cubic spline passing through ordered points, parameterized uniformly over `[0, 1]`.
///
/// Tangents at knots are solved so the curve is C1 continuous, with one-sided conditions at both
/// ends.
///
/// # Examples
/// ```
/// use river_landscape_core::prelude::*;
///
/// let spline = Spline::new(&[
///     Coord::new(0.0, 0.0),
///     Coord::new(1.0, 1.0),
///     Coord::new(2.0, 0.0),
/// ])
/// .unwrap();
/// let middle = spline.evaluate(0.5).unwrap();
/// assert!((middle.x - 1.0).abs() < 1.0e-5);
/// assert!((middle.y - 1.0).abs() < 1.0e-5);
/// assert!(spline.evaluate(1.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spline {
    t: Vec<Scalar>,
    x: Vec<Scalar>,
    y: Vec<Scalar>,
    kx: Vec<Scalar>,
    ky: Vec<Scalar>,
}

impl Spline {
    /// Fit spline through points.
    ///
    /// # Arguments
    /// * `points` - Ordered points (at least two).
    ///
    /// # Returns
    /// Spline or error.
    pub fn new(points: &[Coord]) -> Result<Self, SplineError> {
        let count = points.len();
        if count < 2 {
            return Err(SplineError::NotEnoughPoints(count));
        }
        let last = (count - 1) as f64;
        let t = (0..count).map(|i| i as f64 / last).collect::<Vec<_>>();
        let x = points.iter().map(|p| p.x as f64).collect::<Vec<_>>();
        let y = points.iter().map(|p| p.y as f64).collect::<Vec<_>>();

        // Systems are as small as river paths, so dense LU is enough.
        let mut system = DMatrix::<f64>::zeros(count, count);
        for i in 1..(count - 1) {
            let left = 1.0 / (t[i] - t[i - 1]);
            let right = 1.0 / (t[i + 1] - t[i]);
            system[(i, i - 1)] = left;
            system[(i, i + 1)] = right;
            system[(i, i)] = 2.0 * (left + right);
        }
        let first = 1.0 / (t[1] - t[0]);
        let end = 1.0 / (t[count - 1] - t[count - 2]);
        system[(0, 0)] = 2.0 * first;
        system[(0, 1)] = first;
        system[(count - 1, count - 1)] = 2.0 * end;
        system[(count - 1, count - 2)] = end;
        let lu = system.clone().lu();

        let solve = |values: &[f64]| -> Result<Vec<Scalar>, SplineError> {
            let mut rhs = DVector::<f64>::zeros(count);
            for i in 1..(count - 1) {
                let left = system[(i, i - 1)];
                let right = system[(i, i + 1)];
                rhs[i] = 3.0
                    * ((values[i] - values[i - 1]) * left * left
                        + (values[i + 1] - values[i]) * right * right);
            }
            rhs[0] = 3.0 * (values[1] - values[0]) * first * first;
            rhs[count - 1] = 3.0 * (values[count - 1] - values[count - 2]) * end * end;
            let solution = lu.solve(&rhs).ok_or(SplineError::SingularSystem)?;
            if solution.iter().any(|v| !v.is_finite()) {
                return Err(SplineError::SingularSystem);
            }
            Ok(solution.iter().map(|v| *v as Scalar).collect())
        };
        let kx = solve(&x)?;
        let ky = solve(&y)?;

        Ok(Self {
            t: t.into_iter().map(|v| v as Scalar).collect(),
            x: x.into_iter().map(|v| v as Scalar).collect(),
            y: y.into_iter().map(|v| v as Scalar).collect(),
            kx,
            ky,
        })
    }

    /// Returns number of knots.
    pub fn len(&self) -> usize {
        self.t.len()
    }

    /// Always false, spline has at least two knots.
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Returns knot parameters.
    pub fn knots(&self) -> &[Scalar] {
        &self.t
    }

    /// Returns knot point.
    ///
    /// # Arguments
    /// * `index` - Knot index.
    pub fn point(&self, index: usize) -> Option<Coord> {
        Some(Coord::new(*self.x.get(index)?, *self.y.get(index)?))
    }

    /// Returns first knot point.
    pub fn first(&self) -> Coord {
        Coord::new(self.x[0], self.y[0])
    }

    /// Returns last knot point (spline value at `t = 1`).
    pub fn last(&self) -> Coord {
        let i = self.len() - 1;
        Coord::new(self.x[i], self.y[i])
    }

    /// Evaluate spline.
    ///
    /// # Arguments
    /// * `t` - Parameter in `[0, 1)` range.
    ///
    /// # Returns
    /// Point on curve or error if parameter is out of range.
    pub fn evaluate(&self, t: Scalar) -> Result<Coord, SplineError> {
        if !(0.0..1.0).contains(&t) {
            return Err(SplineError::OutOfRange(t));
        }
        let mut i = 0;
        while i + 2 < self.t.len() && t >= self.t[i + 1] {
            i += 1;
        }
        let h = self.t[i + 1] - self.t[i];
        let s = (t - self.t[i]) / h;
        Ok(Coord::new(
            Self::hermite(s, h, self.x[i], self.x[i + 1], self.kx[i], self.kx[i + 1]),
            Self::hermite(s, h, self.y[i], self.y[i + 1], self.ky[i], self.ky[i + 1]),
        ))
    }

    /// Sample `count` evenly spaced points in `[0, 1)` followed by the last knot.
    ///
    /// # Arguments
    /// * `count` - Number of samples taken inside parameter range.
    ///
    /// # Returns
    /// `count + 1` points or error if any sample falls outside parameter range.
    pub fn sample(&self, count: usize) -> Result<Vec<Coord>, SplineError> {
        let mut points = Vec::with_capacity(count + 1);
        for i in 0..count {
            points.push(self.evaluate(i as Scalar / count as Scalar)?);
        }
        points.push(self.last());
        Ok(points)
    }

    #[inline]
    fn hermite(s: Scalar, h: Scalar, from: Scalar, to: Scalar, k0: Scalar, k1: Scalar) -> Scalar {
        let delta = to - from;
        let a = k0 * h - delta;
        let b = -k1 * h + delta;
        (1.0 - s) * from + s * to + s * (1.0 - s) * ((1.0 - s) * a + s * b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zigzag() -> Vec<Coord> {
        vec![
            Coord::new(0.1, 0.0),
            Coord::new(0.4, 0.2),
            Coord::new(0.2, 0.5),
            Coord::new(0.7, 0.6),
            Coord::new(0.6, 1.0),
        ]
    }

    #[test]
    fn test_interpolates_knots() {
        let points = zigzag();
        let spline = Spline::new(&points).unwrap();
        assert_eq!(spline.len(), points.len());
        for (i, t) in spline.knots().iter().enumerate() {
            if *t >= 1.0 {
                continue;
            }
            let p = spline.evaluate(*t).unwrap();
            assert!((p.x - points[i].x).abs() < 1.0e-5);
            assert!((p.y - points[i].y).abs() < 1.0e-5);
        }
        assert_eq!(spline.first(), points[0]);
        assert_eq!(spline.last(), points[4]);
        assert_eq!(spline.point(2), Some(points[2]));
        assert_eq!(spline.point(5), None);
    }

    #[test]
    fn test_knots_are_uniform() {
        let spline = Spline::new(&zigzag()).unwrap();
        assert_eq!(spline.knots(), &[0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_two_points_is_straight_line() {
        let spline = Spline::new(&[Coord::new(0.0, 0.0), Coord::new(2.0, 4.0)]).unwrap();
        for i in 0..10 {
            let t = i as Scalar / 10.0;
            let p = spline.evaluate(t).unwrap();
            assert!((p.x - 2.0 * t).abs() < 1.0e-5);
            assert!((p.y - 4.0 * t).abs() < 1.0e-5);
        }
    }

    #[test]
    fn test_collinear_points_stay_on_line() {
        let points = (0..6)
            .map(|i| Coord::new(i as Scalar, 3.0 * i as Scalar))
            .collect::<Vec<_>>();
        let spline = Spline::new(&points).unwrap();
        for i in 0..50 {
            let p = spline.evaluate(i as Scalar / 50.0).unwrap();
            assert!((p.y - 3.0 * p.x).abs() < 1.0e-3);
        }
    }

    #[test]
    fn test_continuity_between_segments() {
        let spline = Spline::new(&zigzag()).unwrap();
        let epsilon = 1.0e-4;
        for t in &spline.knots()[1..(spline.len() - 1)] {
            let before = spline.evaluate(t - epsilon).unwrap();
            let after = spline.evaluate(t + epsilon).unwrap();
            assert!(before.distance(after) < 1.0e-2);
        }
    }

    #[test]
    fn test_sample() {
        let spline = Spline::new(&zigzag()).unwrap();
        let samples = spline.sample(8).unwrap();
        assert_eq!(samples.len(), 9);
        assert!(samples[0].distance(spline.first()) < 1.0e-5);
        assert_eq!(samples[8], spline.last());
        for (i, point) in samples[..8].iter().enumerate() {
            assert_eq!(*point, spline.evaluate(i as Scalar / 8.0).unwrap());
        }
        assert_eq!(spline.sample(0).unwrap(), vec![spline.last()]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            Spline::new(&[Coord::new(0.0, 0.0)]),
            Err(SplineError::NotEnoughPoints(1))
        );
        let spline = Spline::new(&zigzag()).unwrap();
        assert_eq!(spline.evaluate(1.0), Err(SplineError::OutOfRange(1.0)));
        assert_eq!(spline.evaluate(-0.1), Err(SplineError::OutOfRange(-0.1)));
        assert!(spline.evaluate(Scalar::NAN).is_err());
    }
}
