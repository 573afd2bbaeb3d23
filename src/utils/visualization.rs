//! Visualization utilities for opendrive_spline
//!
//! Provides a unified interface for plotting using gnuplot.

use crate::common::{ControlPoint, Point2D, SplineError, SplineResult, SplinePoint, Visualizable};
use crate::spline::CatmullRomSpline;
use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};
use itertools::Itertools;
use std::path::Path;

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const GREEN: &str = "#00FF00";
    pub const BLUE: &str = "#0000FF";
    pub const YELLOW: &str = "#FFFF00";
    pub const SKY_BLUE: &str = "#87CEEB";
    pub const GRAY: &str = "#808080";

    // Semantic colors
    pub const SPLINE: &str = SKY_BLUE;
    pub const CONTROL_POINTS: &str = GREEN;
    pub const LEFT_EDGE: &str = RED;
    pub const RIGHT_EDGE: &str = BLUE;
}

/// Style for path rendering
#[derive(Debug, Clone)]
pub struct PathStyle {
    pub color: String,
    pub line_width: f64,
    pub caption: String,
}

impl PathStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            line_width: 2.0,
            caption: caption.to_string(),
        }
    }

    pub fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::new(colors::SPLINE, "Spline")
    }
}

/// Style for point rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = symbol;
        self
    }
}

/// Options for [`plot_spline_with_lanes`]
#[derive(Debug, Clone)]
pub struct SplinePlotStyle {
    pub spline: PathStyle,
    pub points: PointStyle,
    /// Draw lane edges derived from the width channel
    pub lane_edges: bool,
}

impl Default for SplinePlotStyle {
    fn default() -> Self {
        Self {
            spline: PathStyle::default(),
            points: PointStyle::new(colors::CONTROL_POINTS, "Original Points"),
            lane_edges: false,
        }
    }
}

#[derive(Debug, Clone)]
enum Layer {
    Lines { x: Vec<f64>, y: Vec<f64>, style: PathStyle },
    Points { x: Vec<f64>, y: Vec<f64>, style: PointStyle },
}

/// Main visualizer struct
#[derive(Debug, Clone)]
pub struct Visualizer {
    layers: Vec<Layer>,
    title: String,
    x_label: String,
    y_label: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
    aspect_ratio: Option<f64>,
}

impl Visualizer {
    /// Create a new visualizer
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            title: String::new(),
            x_label: "X".to_string(),
            y_label: "Y".to_string(),
            x_range: None,
            y_range: None,
            aspect_ratio: Some(1.0),
        }
    }

    /// Set the plot title
    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    /// Set X axis label
    pub fn set_x_label(&mut self, label: &str) -> &mut Self {
        self.x_label = label.to_string();
        self
    }

    /// Set Y axis label
    pub fn set_y_label(&mut self, label: &str) -> &mut Self {
        self.y_label = label.to_string();
        self
    }

    /// Set X axis range
    pub fn set_x_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.x_range = Some((min, max));
        self
    }

    /// Set Y axis range
    pub fn set_y_range(&mut self, min: f64, max: f64) -> &mut Self {
        self.y_range = Some((min, max));
        self
    }

    /// Set aspect ratio (None for auto)
    pub fn set_aspect_ratio(&mut self, ratio: Option<f64>) -> &mut Self {
        self.aspect_ratio = ratio;
        self
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Plot a path from x,y vectors
    pub fn plot_path_xy(&mut self, x: &[f64], y: &[f64], style: &PathStyle) -> &mut Self {
        self.layers.push(Layer::Lines {
            x: x.to_vec(),
            y: y.to_vec(),
            style: style.clone(),
        });
        self
    }

    /// Plot points from x,y vectors
    pub fn plot_points_xy(&mut self, x: &[f64], y: &[f64], style: &PointStyle) -> &mut Self {
        self.layers.push(Layer::Points {
            x: x.to_vec(),
            y: y.to_vec(),
            style: style.clone(),
        });
        self
    }

    /// Plot a polyline through 2D points
    pub fn plot_polyline(&mut self, points: &[Point2D], style: &PathStyle) -> &mut Self {
        let x: Vec<f64> = points.iter().map(|p| p.x).collect();
        let y: Vec<f64> = points.iter().map(|p| p.y).collect();
        self.plot_path_xy(&x, &y, style)
    }

    /// Plot the xy trace of fitted spline samples
    pub fn plot_spline(&mut self, spline: &[SplinePoint], style: &PathStyle) -> &mut Self {
        let x: Vec<f64> = spline.iter().map(|p| p.x).collect();
        let y: Vec<f64> = spline.iter().map(|p| p.y).collect();
        self.plot_path_xy(&x, &y, style)
    }

    /// Scatter control points
    pub fn plot_control_points(&mut self, points: &[ControlPoint], style: &PointStyle) -> &mut Self {
        let x: Vec<f64> = points.iter().map(|p| p.x).collect();
        let y: Vec<f64> = points.iter().map(|p| p.y).collect();
        self.plot_points_xy(&x, &y, style)
    }

    /// Build the gnuplot figure from the recorded layers
    pub fn render(&self) -> Figure {
        let mut figure = Figure::new();
        let axes = figure.axes2d();

        for layer in &self.layers {
            match layer {
                Layer::Lines { x, y, style } => {
                    axes.lines(x, y, &[
                        Caption(&style.caption),
                        Color(&style.color),
                        LineWidth(style.line_width),
                    ]);
                }
                Layer::Points { x, y, style } => {
                    axes.points(x, y, &[
                        Caption(&style.caption),
                        Color(&style.color),
                        PointSymbol(style.symbol),
                        PointSize(style.size),
                    ]);
                }
            }
        }

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label(&self.x_label, &[]);
        axes.set_y_label(&self.y_label, &[]);

        if let Some((min, max)) = self.x_range {
            axes.set_x_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some((min, max)) = self.y_range {
            axes.set_y_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some(ratio) = self.aspect_ratio {
            axes.set_aspect_ratio(AutoOption::Fix(ratio));
        }

        figure
    }

    /// Finalize and show the plot
    pub fn show(&self) -> SplineResult<()> {
        self.render()
            .show()
            .map_err(|e| SplineError::VisualizationError(e.to_string()))
            .map(|_| ())
    }

    /// Save plot to PNG file
    pub fn save_png(&self, path: &Path, width: u32, height: u32) -> SplineResult<()> {
        self.render()
            .save_to_png(path, width, height)
            .map_err(|e| SplineError::VisualizationError(e.to_string()))
    }

    /// Save plot to SVG file
    pub fn save_svg(&self, path: &Path) -> SplineResult<()> {
        self.render()
            .save_to_svg(path, 800, 600)
            .map_err(|e| SplineError::VisualizationError(e.to_string()))
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Left and right lane edges, half the width channel away from the spline
/// on either side of its local direction. The last sample has no successor
/// and is skipped.
pub fn lane_edges(spline: &[SplinePoint]) -> (Vec<Point2D>, Vec<Point2D>) {
    spline
        .iter()
        .tuple_windows()
        .map(|(a, b)| {
            let angle = (b.y - a.y).atan2(b.x - a.x);
            let half = a.width / 2.0;
            let (sin, cos) = angle.sin_cos();
            (
                Point2D::new(a.x - half * sin, a.y + half * cos),
                Point2D::new(a.x + half * sin, a.y - half * cos),
            )
        })
        .unzip()
}

/// Spline over its control points, optionally with lane edges
pub fn plot_spline_with_lanes(
    spline: &[SplinePoint],
    points: Option<&[ControlPoint]>,
    style: &SplinePlotStyle,
) -> Visualizer {
    let mut vis = Visualizer::new();

    if let Some(points) = points {
        vis.plot_control_points(points, &style.points);
    }
    vis.plot_spline(spline, &style.spline);

    if style.lane_edges {
        let (left, right) = lane_edges(spline);
        vis.plot_polyline(&left, &PathStyle::new(colors::LEFT_EDGE, "Left Edge").with_line_width(1.0));
        vis.plot_polyline(&right, &PathStyle::new(colors::RIGHT_EDGE, "Right Edge").with_line_width(1.0));
    }

    vis
}

impl Visualizable for CatmullRomSpline {
    fn visualize(&self, vis: &mut Visualizer) {
        vis.plot_control_points(
            self.points(),
            &PointStyle::new(colors::CONTROL_POINTS, "Control Points"),
        );
        vis.plot_spline(&self.generate_spline(), &PathStyle::default());
    }
}
