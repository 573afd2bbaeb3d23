//! Common traits defining interfaces for curve fitting

use crate::common::error::SplineError;
use crate::common::types::*;

/// Trait for curve fitting algorithms that turn control points into a dense path
pub trait CurveFitter {
    /// Fit a curve through `points` and return its samples
    fn fit(&self, points: &[ControlPoint]) -> Result<Vec<SplinePoint>, SplineError>;
}

/// Trait for producers of ordered lane-side control points
pub trait LaneSampler {
    /// Ordered `(x, y, z, width)` samples for one side of the road
    fn sample_side(&self, side: crate::opendrive::LaneSide) -> Vec<ControlPoint>;
}

/// Trait for visualizable algorithms
pub trait Visualizable {
    /// Draw current state to visualizer
    fn visualize(&self, vis: &mut crate::utils::Visualizer);
}
