//! Centripetal Catmull-Rom spline
//!
//! Fits a piecewise cubic through ordered `(x, y, z, width)` control points.
//! Knots are spaced by chord length raised to `alpha` (0.5 = centripetal),
//! which keeps the curve free of cusps and self-intersections on unevenly
//! spaced input. Every window of four consecutive points yields one segment
//! between its two middle points; the outer two only bend the tangents.
//!
//! Elevation and width are not part of the geometric blend: they are
//! interpolated linearly between the two middle points of each window.
//!
//! # References
//!
//! - "On the Parameterization of Catmull-Rom Curves", Yuksel, Schaefer, Keyser
//! - <https://en.wikipedia.org/wiki/Centripetal_Catmull%E2%80%93Rom_spline>

use crate::common::{
    ControlPoint, CurveFitter, PartialPoint, SplineError, SplinePoint, SplineResult, Tangent,
    MIN_CONTROL_POINTS,
};
use nalgebra::Vector2;

/// Centripetal parameterization
pub const DEFAULT_ALPHA: f64 = 0.5;
/// Samples generated per segment
pub const DEFAULT_NUM_SPLINE_POINTS: usize = 1;
/// Minimum separation between consecutive knots
pub const KNOT_EPSILON: f64 = 1e-6;
/// Stand-in for a tangent of zero length
const ZERO_TANGENT_SUBSTITUTE: (f64, f64) = (1e-6, 1e-6);

/// Counts of epsilon substitutions made while fitting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DegeneracyReport {
    /// Interior tangents that came out with zero length
    pub zero_tangents: usize,
    /// Knots pushed apart to keep a minimum separation
    pub clamped_knots: usize,
}

impl DegeneracyReport {
    pub fn is_clean(&self) -> bool {
        self.zero_tangents == 0 && self.clamped_knots == 0
    }
}

/// Catmull-Rom spline over a fixed control point sequence
#[derive(Debug, Clone)]
pub struct CatmullRomSpline {
    points: Vec<ControlPoint>,
    alpha: f64,
    num_spline_points: usize,
    tangents: Vec<Tangent>,
    zero_tangents: usize,
}

impl CatmullRomSpline {
    /// Build a spline through `points`.
    ///
    /// Fails with [`SplineError::InsufficientPoints`] for fewer than four points
    /// and with [`SplineError::InvalidParameter`] for a non-finite `alpha` or a
    /// zero sample count.
    pub fn new(points: &[ControlPoint], alpha: f64, num_spline_points: usize) -> SplineResult<Self> {
        if points.len() < MIN_CONTROL_POINTS {
            return Err(SplineError::insufficient_points(points.len()));
        }
        if !alpha.is_finite() {
            return Err(SplineError::InvalidParameter(format!(
                "alpha must be finite, got {}",
                alpha
            )));
        }
        if num_spline_points == 0 {
            return Err(SplineError::InvalidParameter(
                "num_spline_points must be at least 1".to_string(),
            ));
        }

        let (tangents, zero_tangents) = Self::calc_tangents(points, alpha);

        Ok(CatmullRomSpline {
            points: points.to_vec(),
            alpha,
            num_spline_points,
            tangents,
            zero_tangents,
        })
    }

    pub fn with_defaults(points: &[ControlPoint]) -> SplineResult<Self> {
        Self::new(points, DEFAULT_ALPHA, DEFAULT_NUM_SPLINE_POINTS)
    }

    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn num_spline_points(&self) -> usize {
        self.num_spline_points
    }

    /// One tangent per control point. The edge entries repeat their
    /// nearest interior neighbour.
    pub fn tangents(&self) -> &[Tangent] {
        &self.tangents
    }

    /// Number of samples [`generate_spline`](Self::generate_spline) returns
    pub fn output_len(&self) -> usize {
        (self.points.len() - 3) * self.num_spline_points
    }

    /// Knot increment from `p_i` to `p_j`
    fn tj(alpha: f64, ti: f64, p_i: &ControlPoint, p_j: &ControlPoint) -> f64 {
        (p_j.xy() - p_i.xy()).norm().powf(alpha) + ti
    }

    fn calc_tangents(points: &[ControlPoint], alpha: f64) -> (Vec<Tangent>, usize) {
        let n = points.len();
        let mut tangents: Vec<Tangent> = Vec::with_capacity(n);
        let mut zero_tangents = 0;

        for i in 1..n - 1 {
            let t0 = 0.0;
            let t1 = Self::tj(alpha, t0, &points[i - 1], &points[i]);
            let t2 = Self::tj(alpha, t1, &points[i], &points[i + 1]);
            let mut tangent = (t2 - t0) * (points[i + 1].xy() - points[i - 1].xy());
            if tangent.norm() == 0.0 {
                log::debug!("zero-length tangent at control point {}, substituting epsilon", i);
                tangent = Vector2::new(ZERO_TANGENT_SUBSTITUTE.0, ZERO_TANGENT_SUBSTITUTE.1);
                zero_tangents += 1;
            }
            tangents.push(tangent);
        }

        let first = tangents[0];
        let last = tangents[tangents.len() - 1];
        tangents.insert(0, first);
        tangents.push(last);

        (tangents, zero_tangents)
    }

    /// Sample every segment and concatenate the results
    pub fn generate_spline(&self) -> Vec<SplinePoint> {
        self.generate_spline_with_report().0
    }

    /// Like [`generate_spline`](Self::generate_spline), also reporting every
    /// epsilon substitution made on the way
    pub fn generate_spline_with_report(&self) -> (Vec<SplinePoint>, DegeneracyReport) {
        let mut spline = Vec::with_capacity(self.output_len());
        let mut report = DegeneracyReport {
            zero_tangents: self.zero_tangents,
            clamped_knots: 0,
        };

        for (i, window) in self.points.windows(4).enumerate() {
            report.clamped_knots += self.sample_segment(i, window, &mut spline);
        }

        if !report.is_clean() {
            log::debug!(
                "degenerate geometry in {} control points: {} zero tangents, {} clamped knots",
                self.points.len(),
                report.zero_tangents,
                report.clamped_knots
            );
        }

        (spline, report)
    }

    // Returns how many knots had to be pushed apart.
    fn sample_segment(&self, index: usize, window: &[ControlPoint], out: &mut Vec<SplinePoint>) -> usize {
        let (p0, p1, p2, p3) = (&window[0], &window[1], &window[2], &window[3]);

        let t0 = 0.0;
        let t1 = Self::tj(self.alpha, t0, p0, p1);
        let t2 = Self::tj(self.alpha, t1, p1, p2);
        let t3 = Self::tj(self.alpha, t2, p2, p3);

        // Sample parameters come from the knots before separation is enforced.
        let ts: Vec<f64> = linspace(t1, t2, self.num_spline_points).collect();

        let mut clamped = 0;
        let t1 = enforce_separation(t1, t0, &mut clamped);
        let t2 = enforce_separation(t2, t1, &mut clamped);
        let t3 = enforce_separation(t3, t2, &mut clamped);
        if clamped > 0 {
            log::debug!("segment {}: {} knots closer than {}, clamped", index, clamped, KNOT_EPSILON);
        }

        let (q0, q1, q2, q3) = (p0.xy(), p1.xy(), p2.xy(), p3.xy());
        let zs = linspace(p1.z, p2.z, self.num_spline_points);
        let widths = linspace(p1.width, p2.width, self.num_spline_points);

        for ((t, z), width) in ts.into_iter().zip(zs).zip(widths) {
            let a1 = lerp_by_t(&q0, &q1, t0, t1, t);
            let a2 = lerp_by_t(&q1, &q2, t1, t2, t);
            let a3 = lerp_by_t(&q2, &q3, t2, t3, t);

            let b1 = lerp_by_t(&a1, &a2, t0, t2, t);
            let b2 = lerp_by_t(&a2, &a3, t1, t3, t);

            let c = lerp_by_t(&b1, &b2, t1, t2, t);
            out.push(SplinePoint::new(c.x, c.y, z, width));
        }

        clamped
    }
}

/// Blend `u` toward `v` as `t` moves from `lo` to `hi`
fn lerp_by_t(u: &Vector2<f64>, v: &Vector2<f64>, lo: f64, hi: f64, t: f64) -> Vector2<f64> {
    (hi - t) / (hi - lo) * u + (t - lo) / (hi - lo) * v
}

// NaN knots fall through unchanged.
fn enforce_separation(t: f64, prev: f64, clamped: &mut usize) -> f64 {
    let min = prev + KNOT_EPSILON;
    if min > t {
        *clamped += 1;
        min
    } else {
        t
    }
}

/// `n` evenly spaced values from `start` to `end` inclusive; a single value is `start`
pub fn linspace(start: f64, end: f64, n: usize) -> impl Iterator<Item = f64> {
    let step = if n > 1 { (end - start) / (n - 1) as f64 } else { 0.0 };
    (0..n).map(move |i| if n > 1 && i == n - 1 { end } else { start + step * i as f64 })
}

/// Reject control points carrying NaN or infinity
pub fn validate_finite(points: &[ControlPoint]) -> SplineResult<()> {
    match points.iter().position(|p| !p.is_finite()) {
        Some(index) => Err(SplineError::NonFiniteInput { index }),
        None => Ok(()),
    }
}

/// Fit a chain through complete control points with the default alpha
pub fn catmull_rom_chain(points: &[ControlPoint], num_spline_points: usize) -> SplineResult<Vec<SplinePoint>> {
    if points.len() < MIN_CONTROL_POINTS {
        return Err(SplineError::insufficient_points(points.len()));
    }
    let spline = CatmullRomSpline::new(points, DEFAULT_ALPHA, num_spline_points)?;
    Ok(spline.generate_spline())
}

/// Fit a chain through points whose elevation or width may be missing.
///
/// Missing elevation becomes `0.0` and missing width `8.0`.
pub fn catmull_rom<P>(points: &[P], num_spline_points: usize) -> SplineResult<Vec<SplinePoint>>
where
    P: Into<PartialPoint> + Copy,
{
    if points.len() < MIN_CONTROL_POINTS {
        return Err(SplineError::insufficient_points(points.len()));
    }
    let complete: Vec<ControlPoint> = points.iter().map(|&p| p.into().complete()).collect();
    catmull_rom_chain(&complete, num_spline_points)
}

/// [`CurveFitter`] backed by [`CatmullRomSpline`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatmullRomFitter {
    pub alpha: f64,
    pub num_spline_points: usize,
}

impl CatmullRomFitter {
    pub fn new(alpha: f64, num_spline_points: usize) -> Self {
        Self { alpha, num_spline_points }
    }
}

impl Default for CatmullRomFitter {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA, DEFAULT_NUM_SPLINE_POINTS)
    }
}

impl CurveFitter for CatmullRomFitter {
    fn fit(&self, points: &[ControlPoint]) -> Result<Vec<SplinePoint>, SplineError> {
        let spline = CatmullRomSpline::new(points, self.alpha, self.num_spline_points)?;
        Ok(spline.generate_spline())
    }
}
