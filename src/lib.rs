//! opendrive_spline - smooth reference paths from OpenDRIVE road networks
//!
//! This crate reads OpenDRIVE (`.xodr`) roads, samples their lane
//! boundaries, averages them into a centerline and fits a centripetal
//! Catmull-Rom spline through it, carrying elevation and lane width along
//! with the 2D path. It also converts campaign JSON road dumps back into
//! OpenDRIVE files.

// Core modules
pub mod common;
pub mod utils;

// Conversion modules
pub mod spline;
pub mod opendrive;
pub mod pipeline;

// Re-export common types for convenience
pub use common::{ControlPoint, PartialPoint, Point2D, SplinePoint};
pub use common::{CurveFitter, LaneSampler, Visualizable};
pub use common::{SplineError, SplineResult};
pub use pipeline::{process_directory, BatchSummary, ConverterConfig};
pub use spline::{catmull_rom, catmull_rom_chain, CatmullRomSpline};
