//! Utility modules for opendrive_spline

pub mod visualization;

pub use visualization::{
    colors, lane_edges, plot_spline_with_lanes, PathStyle, PointStyle, SplinePlotStyle,
    Visualizer,
};
