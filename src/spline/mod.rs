//! Spline Module
//!
//! Curve fitting through ordered control points. The only fitter is the
//! centripetal Catmull-Rom chain used for road reference paths.
//!
//! # Example
//!
//! ```
//! use opendrive_spline::spline::catmull_rom;
//!
//! let points = [(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, 1.0)];
//! let path = catmull_rom(&points, 3).unwrap();
//! assert_eq!(path.len(), 3);
//! ```

pub mod catmull_rom;

// Re-exports
pub use catmull_rom::{
    catmull_rom, catmull_rom_chain, linspace, validate_finite, CatmullRomFitter,
    CatmullRomSpline, DegeneracyReport, DEFAULT_ALPHA, DEFAULT_NUM_SPLINE_POINTS, KNOT_EPSILON,
};
