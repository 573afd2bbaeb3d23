//! Road geometry evaluation
//!
//! Turns an OpenDRIVE [`Road`] into ordered `(x, y, z, width)` samples along
//! the outer boundary of its left or right lanes, and pairs both sides into
//! a centerline.

use super::model::*;
use crate::common::{ControlPoint, LaneSampler, DEFAULT_WIDTH};
use crate::spline::KNOT_EPSILON;
use std::f64::consts::FRAC_PI_2;

/// Below this curvature an arc is evaluated as a line
const STRAIGHT_CURVATURE: f64 = 1e-12;
/// Integration step for spirals [m]
const SPIRAL_STEP: f64 = 0.1;
/// Upper bound on integration and sampling steps per geometry
const MAX_STEPS: usize = 1 << 20;

/// Position and heading on the reference line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefPose {
    pub x: f64,
    pub y: f64,
    pub hdg: f64,
}

impl RefPose {
    pub fn new(x: f64, y: f64, hdg: f64) -> Self {
        Self { x, y, hdg }
    }

    /// Move `offset` along the left-pointing normal
    pub fn offset(&self, offset: f64) -> (f64, f64) {
        let normal = self.hdg + FRAC_PI_2;
        (self.x + offset * normal.cos(), self.y + offset * normal.sin())
    }
}

impl Geometry {
    /// Reference-line pose `ds` metres into this geometry
    pub fn eval(&self, ds: f64) -> RefPose {
        let (sin_h, cos_h) = self.hdg.sin_cos();
        match self.kind {
            GeometryKind::Line => self.line(ds),
            GeometryKind::Arc { curvature } => {
                if curvature.abs() < STRAIGHT_CURVATURE {
                    return self.line(ds);
                }
                let hdg = self.hdg + curvature * ds;
                RefPose::new(
                    self.x + (hdg.sin() - sin_h) / curvature,
                    self.y + (cos_h - hdg.cos()) / curvature,
                    hdg,
                )
            }
            GeometryKind::Spiral { curv_start, curv_end } => {
                let rate = if self.length > 0.0 {
                    (curv_end - curv_start) / self.length
                } else {
                    0.0
                };
                let heading = |s: f64| self.hdg + curv_start * s + 0.5 * rate * s * s;
                let (dx, dy) = integrate_heading(&heading, ds);
                RefPose::new(self.x + dx, self.y + dy, heading(ds))
            }
            GeometryKind::Poly3 { a, b, c, d } => {
                let u = ds;
                let v = eval_cubic(a, b, c, d, u);
                let dv = b + 2.0 * c * u + 3.0 * d * u * u;
                RefPose::new(
                    self.x + u * cos_h - v * sin_h,
                    self.y + u * sin_h + v * cos_h,
                    self.hdg + dv.atan(),
                )
            }
            GeometryKind::ParamPoly3 {
                au,
                bu,
                cu,
                du,
                av,
                bv,
                cv,
                dv,
                p_range,
            } => {
                let p = match p_range {
                    ParamRange::ArcLength => ds,
                    ParamRange::Normalized if self.length > 0.0 => ds / self.length,
                    ParamRange::Normalized => 0.0,
                };
                let u = eval_cubic(au, bu, cu, du, p);
                let v = eval_cubic(av, bv, cv, dv, p);
                let du_dp = bu + 2.0 * cu * p + 3.0 * du * p * p;
                let dv_dp = bv + 2.0 * cv * p + 3.0 * dv * p * p;
                RefPose::new(
                    self.x + u * cos_h - v * sin_h,
                    self.y + u * sin_h + v * cos_h,
                    self.hdg + dv_dp.atan2(du_dp),
                )
            }
        }
    }

    fn line(&self, ds: f64) -> RefPose {
        RefPose::new(
            self.x + ds * self.hdg.cos(),
            self.y + ds * self.hdg.sin(),
            self.hdg,
        )
    }
}

// Composite Simpson over [0, ds] of (cos, sin) of the heading.
fn integrate_heading<F: Fn(f64) -> f64>(heading: &F, ds: f64) -> (f64, f64) {
    if ds <= 0.0 {
        return (0.0, 0.0);
    }
    let mut n = ((ds / SPIRAL_STEP).ceil().min(MAX_STEPS as f64) as usize).max(2);
    if n % 2 == 1 {
        n += 1;
    }
    let h = ds / n as f64;
    let (mut sx, mut sy) = (0.0, 0.0);
    for i in 0..=n {
        let w = if i == 0 || i == n {
            1.0
        } else if i % 2 == 1 {
            4.0
        } else {
            2.0
        };
        let theta = heading(i as f64 * h);
        sx += w * theta.cos();
        sy += w * theta.sin();
    }
    (sx * h / 3.0, sy * h / 3.0)
}

impl Road {
    /// Elevation at `s`: the last record starting at or before `s`
    pub fn elevation_at(&self, s: f64) -> f64 {
        active_record(&self.elevation_profile, s)
            .map(|r| r.eval(s - r.s))
            .unwrap_or(0.0)
    }

    /// Lateral shift of the lane reference from `<laneOffset>`
    pub fn lane_offset_at(&self, s: f64) -> f64 {
        active_record(&self.lane_offsets, s)
            .map(|r| r.eval(s - r.s))
            .unwrap_or(0.0)
    }

    /// Lane section in effect at `s`
    pub fn lane_section_at(&self, s: f64) -> Option<&LaneSection> {
        self.lane_sections.iter().filter(|sec| sec.s <= s).last()
    }

    /// Summed width of all lanes on one side at `s`, or `None` when that
    /// side has no lanes
    pub fn side_width_at(&self, s: f64, side: LaneSide) -> Option<f64> {
        let section = self.lane_section_at(s)?;
        let lanes = section.lanes(side);
        if lanes.iter().all(|lane| lane.id == 0) {
            return None;
        }
        let ds = s - section.s;
        Some(
            lanes
                .iter()
                .filter(|lane| lane.id != 0)
                .map(|lane| lane.width_at(ds))
                .sum(),
        )
    }

    /// Lateral offset from the reference line to the outer edge of `side`
    pub fn boundary_offset_at(&self, s: f64, side: LaneSide) -> f64 {
        let width = self.side_width_at(s, side).unwrap_or(0.0);
        self.lane_offset_at(s) + side.sign() * width
    }

    /// Sample on the outer boundary of `side` at `ds` into `geometry`.
    ///
    /// The width channel carries the right-side carriageway width, falling
    /// back to the default when the road has no right lanes.
    pub fn boundary_point(&self, geometry: &Geometry, ds: f64, side: LaneSide) -> ControlPoint {
        let s = geometry.s + ds;
        let pose = geometry.eval(ds);
        let (x, y) = pose.offset(self.boundary_offset_at(s, side));
        let width = self
            .side_width_at(s, LaneSide::Right)
            .unwrap_or(DEFAULT_WIDTH);
        ControlPoint::new(x, y, self.elevation_at(s), width)
    }
}

impl Lane {
    /// Width at `ds` metres past the start of the lane section
    pub fn width_at(&self, ds: f64) -> f64 {
        self.widths
            .iter()
            .filter(|w| w.s_offset <= ds && w.length.map_or(true, |len| ds < w.s_offset + len))
            .last()
            .map(|w| w.eval(ds - w.s_offset))
            .unwrap_or(0.0)
    }
}

fn active_record(records: &[Poly3Record], s: f64) -> Option<&Poly3Record> {
    records
        .iter()
        .filter(|r| r.s <= s && r.length.map_or(true, |len| s < r.s + len))
        .last()
}

/// Samples lane boundaries of one road
#[derive(Debug, Clone, Copy)]
pub struct RoadSampler<'a> {
    road: &'a Road,
    step: Option<f64>,
}

impl<'a> RoadSampler<'a> {
    /// One sample per plan-view geometry start
    pub fn new(road: &'a Road) -> Self {
        Self { road, step: None }
    }

    /// Densify every geometry at `step` metres and close with the road end.
    /// Non-positive steps fall back to geometry starts only.
    pub fn with_step(road: &'a Road, step: Option<f64>) -> Self {
        let step = step.filter(|h| h.is_finite() && *h > 0.0);
        Self { road, step }
    }

    // Offsets are `i * step`; one landing on the geometry end would nearly
    // coincide with the next geometry's start and is dropped.
    fn offsets(&self, geometry: &Geometry) -> Vec<f64> {
        match self.step {
            Some(h) if geometry.length.is_finite() && geometry.length > 0.0 => {
                let count = (geometry.length / h).ceil().min(MAX_STEPS as f64) as usize;
                (0..count.max(1))
                    .map(|i| i as f64 * h)
                    .filter(|&d| d == 0.0 || geometry.length - d > KNOT_EPSILON)
                    .collect()
            }
            _ => vec![0.0],
        }
    }
}

impl<'a> LaneSampler for RoadSampler<'a> {
    fn sample_side(&self, side: LaneSide) -> Vec<ControlPoint> {
        let mut points = Vec::new();
        for geometry in &self.road.plan_view {
            for ds in self.offsets(geometry) {
                points.push(self.road.boundary_point(geometry, ds, side));
            }
        }
        if self.step.is_some() {
            if let Some(last) = self.road.plan_view.last() {
                points.push(self.road.boundary_point(last, last.length, side));
            }
        }
        points
    }
}

/// Boundary samples of one side, concatenated over every road in the file
pub fn road_geometry(document: &OpenDrive, side: LaneSide, step: Option<f64>) -> Vec<ControlPoint> {
    document
        .roads
        .iter()
        .flat_map(|road| RoadSampler::with_step(road, step).sample_side(side))
        .collect()
}

/// Index-wise midpoint of right and left boundary samples.
///
/// Surplus samples on the longer side are dropped.
pub fn compute_centerline(right: &[ControlPoint], left: &[ControlPoint]) -> Vec<ControlPoint> {
    if right.len() != left.len() {
        log::debug!(
            "lane sides differ in length ({} right, {} left), truncating",
            right.len(),
            left.len()
        );
    }
    right.iter().zip(left).map(|(r, l)| r.midpoint(l)).collect()
}
