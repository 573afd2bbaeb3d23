//! OpenDRIVE import/export.
//!
//! Reads `.xodr` road networks into a small model, evaluates lane boundaries
//! along the reference line and converts campaign JSON dumps back into
//! OpenDRIVE files.

pub mod geometry;
pub mod json;
pub mod model;
pub mod parser;
pub mod writer;

pub use geometry::{compute_centerline, road_geometry, RefPose, RoadSampler};
pub use json::{convert_json_to_opendrive, parse_campaign_json};
pub use model::*;
pub use parser::{parse_opendrive, parse_opendrive_file};
pub use writer::{write_opendrive, write_single_road};
