//! Common types used throughout opendrive_spline

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Elevation assumed when upstream data carries none [m]
pub const DEFAULT_Z: f64 = 0.0;
/// Lane width assumed when upstream data carries none [m]
pub const DEFAULT_WIDTH: f64 = 8.0;

/// Per-point tangent vector
pub type Tangent = Vector2<f64>;

/// Plain 2D position, used for plotted polylines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Sample on a lane boundary or centerline, fed into the spline engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct ControlPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub width: f64,
}

impl ControlPoint {
    pub fn new(x: f64, y: f64, z: f64, width: f64) -> Self {
        Self { x, y, z, width }
    }

    /// Point with default elevation and width
    pub fn planar(x: f64, y: f64) -> Self {
        Self::new(x, y, DEFAULT_Z, DEFAULT_WIDTH)
    }

    /// Fill in missing elevation/width with the defaults
    pub fn with_defaults(x: f64, y: f64, z: Option<f64>, width: Option<f64>) -> Self {
        Self::new(
            x,
            y,
            z.unwrap_or(DEFAULT_Z),
            width.unwrap_or(DEFAULT_WIDTH),
        )
    }

    pub fn xy(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.width.is_finite()
    }

    /// Field-wise midpoint of two points
    pub fn midpoint(&self, other: &ControlPoint) -> Self {
        Self::new(
            (self.x + other.x) / 2.0,
            (self.y + other.y) / 2.0,
            (self.z + other.z) / 2.0,
            (self.width + other.width) / 2.0,
        )
    }
}

impl From<(f64, f64, f64, f64)> for ControlPoint {
    fn from(t: (f64, f64, f64, f64)) -> Self {
        Self::new(t.0, t.1, t.2, t.3)
    }
}

impl From<[f64; 4]> for ControlPoint {
    fn from(a: [f64; 4]) -> Self {
        Self::new(a[0], a[1], a[2], a[3])
    }
}

impl From<ControlPoint> for [f64; 4] {
    fn from(p: ControlPoint) -> Self {
        [p.x, p.y, p.z, p.width]
    }
}

/// Input point whose elevation and width may be missing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartialPoint {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
    pub width: Option<f64>,
}

impl PartialPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None, width: None }
    }

    pub fn with_z(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    pub fn complete(&self) -> ControlPoint {
        ControlPoint::with_defaults(self.x, self.y, self.z, self.width)
    }
}

impl From<(f64, f64)> for PartialPoint {
    fn from(t: (f64, f64)) -> Self {
        Self::new(t.0, t.1)
    }
}

impl From<(f64, f64, f64)> for PartialPoint {
    fn from(t: (f64, f64, f64)) -> Self {
        Self::new(t.0, t.1).with_z(t.2)
    }
}

impl From<(f64, f64, f64, f64)> for PartialPoint {
    fn from(t: (f64, f64, f64, f64)) -> Self {
        Self::new(t.0, t.1).with_z(t.2).with_width(t.3)
    }
}

/// Densely sampled point on a fitted curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct SplinePoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub width: f64,
}

impl SplinePoint {
    pub fn new(x: f64, y: f64, z: f64, width: f64) -> Self {
        Self { x, y, z, width }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.width.is_finite()
    }
}

impl From<[f64; 4]> for SplinePoint {
    fn from(a: [f64; 4]) -> Self {
        Self::new(a[0], a[1], a[2], a[3])
    }
}

impl From<SplinePoint> for [f64; 4] {
    fn from(p: SplinePoint) -> Self {
        [p.x, p.y, p.z, p.width]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_point_defaults() {
        let p = PartialPoint::from((1.0, 2.0)).complete();
        assert_eq!(p, ControlPoint::new(1.0, 2.0, 0.0, 8.0));

        let p = PartialPoint::from((1.0, 2.0, 3.0)).complete();
        assert_eq!(p.z, 3.0);
        assert_eq!(p.width, DEFAULT_WIDTH);
    }

    #[test]
    fn test_spline_point_serializes_as_array() {
        let p = SplinePoint::new(1.0, 2.5, 0.0, 8.0);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "[1.0,2.5,0.0,8.0]");

        let back: SplinePoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_midpoint() {
        let a = ControlPoint::new(0.0, 0.0, 0.0, 4.0);
        let b = ControlPoint::new(2.0, 4.0, 2.0, 8.0);
        assert_eq!(a.midpoint(&b), ControlPoint::new(1.0, 2.0, 1.0, 6.0));
    }
}
