//! In-memory OpenDRIVE road network
//!
//! Only the parts needed to trace lane boundaries are kept: the plan view,
//! the elevation profile, lane offsets and lane widths per lane section.

use serde::{Deserialize, Serialize};

/// Side of the road relative to the reference line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneSide {
    Left,
    Right,
}

impl LaneSide {
    /// Sign of the lateral offset along the left-pointing normal
    pub fn sign(&self) -> f64 {
        match self {
            LaneSide::Left => 1.0,
            LaneSide::Right => -1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LaneSide::Left => "left",
            LaneSide::Right => "right",
        }
    }
}

/// `<header>`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub rev_major: Option<u32>,
    pub rev_minor: Option<u32>,
    pub name: Option<String>,
}

/// `<OpenDRIVE>` root
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenDrive {
    pub header: Option<Header>,
    pub roads: Vec<Road>,
}

/// `<road>`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Road {
    pub id: String,
    pub name: Option<String>,
    pub length: f64,
    pub junction: Option<String>,
    pub plan_view: Vec<Geometry>,
    pub elevation_profile: Vec<Poly3Record>,
    pub lane_offsets: Vec<Poly3Record>,
    pub lane_sections: Vec<LaneSection>,
}

/// Reference-line primitive from `<planView>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub s: f64,
    pub x: f64,
    pub y: f64,
    pub hdg: f64,
    pub length: f64,
    pub kind: GeometryKind,
}

/// Parameter range of a `<paramPoly3>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamRange {
    ArcLength,
    Normalized,
}

impl ParamRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamRange::ArcLength => "arcLength",
            ParamRange::Normalized => "normalized",
        }
    }
}

/// Shape of a plan-view geometry record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GeometryKind {
    Line,
    Arc {
        curvature: f64,
    },
    Spiral {
        curv_start: f64,
        curv_end: f64,
    },
    Poly3 {
        a: f64,
        b: f64,
        c: f64,
        d: f64,
    },
    ParamPoly3 {
        au: f64,
        bu: f64,
        cu: f64,
        du: f64,
        av: f64,
        bv: f64,
        cv: f64,
        dv: f64,
        p_range: ParamRange,
    },
}

/// Cubic `a + b*ds + c*ds^2 + d*ds^3` starting at `s`.
///
/// Used for `<elevation>` and `<laneOffset>`. `length` is an optional
/// extension some generators emit to bound the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poly3Record {
    pub s: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub length: Option<f64>,
}

impl Poly3Record {
    pub fn eval(&self, ds: f64) -> f64 {
        eval_cubic(self.a, self.b, self.c, self.d, ds)
    }
}

/// `<laneSection>`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaneSection {
    pub s: f64,
    pub left: Vec<Lane>,
    pub center: Vec<Lane>,
    pub right: Vec<Lane>,
}

impl LaneSection {
    pub fn lanes(&self, side: LaneSide) -> &[Lane] {
        match side {
            LaneSide::Left => &self.left,
            LaneSide::Right => &self.right,
        }
    }
}

/// `<lane>`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub id: i32,
    pub lane_type: String,
    pub level: bool,
    pub widths: Vec<LaneWidth>,
    pub road_marks: Vec<RoadMark>,
}

/// `<width>` of a lane, relative to its lane section start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneWidth {
    pub s_offset: f64,
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub length: Option<f64>,
}

impl LaneWidth {
    pub fn eval(&self, ds: f64) -> f64 {
        eval_cubic(self.a, self.b, self.c, self.d, ds)
    }
}

/// `<roadMark>`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadMark {
    pub s_offset: f64,
    pub mark_type: String,
    pub width: Option<f64>,
}

/// `a + b*ds + c*ds^2 + d*ds^3`
pub fn eval_cubic(a: f64, b: f64, c: f64, d: f64, ds: f64) -> f64 {
    a + b * ds + c * ds.powi(2) + d * ds.powi(3)
}
