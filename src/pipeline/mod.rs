//! OpenDRIVE to spline conversion pipeline.
//!
//! For every road: sample both lane boundaries, average them into a
//! centerline, fit the Catmull-Rom chain and write the samples as JSON
//! (`[[x, y, z, width], ...]`). Roads with too few control points are logged
//! and skipped; the batch carries on.

pub mod config;

pub use config::{ConverterConfig, DEFAULT_CONFIG_FILE};

use crate::common::{ControlPoint, LaneSampler, SplineError, SplinePoint, SplineResult, MIN_CONTROL_POINTS};
use crate::opendrive::{compute_centerline, parse_opendrive_file, LaneSide, Road, RoadSampler};
use crate::spline::{CatmullRomSpline, DegeneracyReport};
use crate::utils::{plot_spline_with_lanes, SplinePlotStyle};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Fitted reference path of one road
#[derive(Debug, Clone)]
pub struct RoadSpline {
    pub road_id: String,
    pub control_points: Vec<ControlPoint>,
    pub spline: Vec<SplinePoint>,
    pub report: DegeneracyReport,
}

/// Fitted roads of one file, plus the ids of roads that were skipped
#[derive(Debug, Clone, Default)]
pub struct FileSplines {
    pub roads: Vec<RoadSpline>,
    pub skipped: Vec<String>,
}

/// Totals over a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub files: usize,
    pub roads_written: usize,
    pub roads_skipped: usize,
    pub failed_files: usize,
}

/// Centerline control points and spline samples for a single road
pub fn road_spline(road: &Road, config: &ConverterConfig) -> SplineResult<RoadSpline> {
    let sampler = RoadSampler::with_step(road, config.sample_step);
    let right = sampler.sample_side(LaneSide::Right);
    let left = sampler.sample_side(LaneSide::Left);

    let available = right.len().min(left.len());
    if available < MIN_CONTROL_POINTS {
        return Err(SplineError::insufficient_points(available));
    }

    let control_points = compute_centerline(&right, &left);
    let spline = CatmullRomSpline::new(&control_points, config.alpha, config.samples_per_segment)?;
    let (spline, report) = spline.generate_spline_with_report();

    Ok(RoadSpline {
        road_id: road.id.clone(),
        control_points,
        spline,
        report,
    })
}

/// Fits every road in an OpenDRIVE file
pub fn generate_spline(opendrive_file: &Path, config: &ConverterConfig) -> Result<FileSplines> {
    let document = parse_opendrive_file(opendrive_file)?;
    let mut result = FileSplines::default();

    for road in &document.roads {
        match road_spline(road, config) {
            Ok(fitted) => {
                if !fitted.report.is_clean() {
                    log::debug!(
                        "road {} in {}: {:?}",
                        road.id,
                        opendrive_file.display(),
                        fitted.report
                    );
                }
                result.roads.push(fitted);
            }
            Err(SplineError::InsufficientPoints { required, found }) => {
                log::warn!(
                    "Not enough points for Catmull-Rom spline in road {} of {}: {} required, {} found",
                    road.id,
                    opendrive_file.display(),
                    required,
                    found
                );
                result.skipped.push(road.id.clone());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to fit road {} in {}", road.id, opendrive_file.display())
                })
            }
        }
    }

    Ok(result)
}

/// Writes spline samples as a JSON array of `[x, y, z, width]`
pub fn save_road_data(spline: &[SplinePoint], output_file: &Path) -> Result<()> {
    if let Some(dir) = output_file.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let json = serde_json::to_string(spline)?;
    std::fs::write(output_file, json)
        .with_context(|| format!("Failed to write {}", output_file.display()))?;
    log::info!("Saved road data to {}", output_file.display());
    Ok(())
}

/// Reads spline samples written by [`save_road_data`]
pub fn load_road_data(path: &Path) -> Result<Vec<SplinePoint>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Malformed road data in {}", path.display()))
}

/// Output file stem: the input stem, suffixed with the road id when the
/// file holds more than one road
pub fn output_stem(input: &Path, road_id: &str, roads_in_file: usize) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "road".to_string());
    if roads_in_file > 1 {
        format!("{}_{}", stem, road_id)
    } else {
        stem
    }
}

/// `.xodr` files of a directory in name order
pub fn list_opendrive_files(dir: &Path, max_files: Option<usize>) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().map_or(false, |ext| ext == "xodr"))
        .collect();
    files.sort();
    if let Some(max) = max_files {
        files.truncate(max);
    }
    Ok(files)
}

/// Converts one file and writes its outputs. Returns the JSON paths written
/// and the number of skipped roads.
pub fn process_file(opendrive_file: &Path, config: &ConverterConfig) -> Result<(Vec<PathBuf>, usize)> {
    log::debug!("Processing file: {}", opendrive_file.display());
    let splines = generate_spline(opendrive_file, config)?;
    let total = splines.roads.len() + splines.skipped.len();

    let mut written = Vec::with_capacity(splines.roads.len());
    for road in &splines.roads {
        let stem = output_stem(opendrive_file, &road.road_id, total);
        let output_file = config.output_dir.join(format!("{}.json", stem));
        save_road_data(&road.spline, &output_file)?;
        written.push(output_file);

        if let Some(ref plot_dir) = config.plot_dir {
            plot_road(road, &plot_dir.join(format!("{}.png", stem)), config)?;
        }
    }

    Ok((written, splines.skipped.len()))
}

fn plot_road(road: &RoadSpline, path: &Path, config: &ConverterConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let style = SplinePlotStyle {
        lane_edges: config.lane_edges,
        ..SplinePlotStyle::default()
    };
    let mut vis = plot_spline_with_lanes(&road.spline, Some(&road.control_points), &style);
    vis.set_title(&format!("Road {}", road.road_id));

    // Plotting needs a gnuplot binary; a missing one should not fail the batch.
    if let Err(e) = vis.save_png(path, 800, 600) {
        log::warn!("Could not plot road {}: {}", road.road_id, e);
    }
    Ok(())
}

/// Converts every `.xodr` file under `config.input_dir`. Failing files are
/// logged and counted; the batch continues.
pub fn process_directory(config: &ConverterConfig) -> Result<BatchSummary> {
    config.validate()?;
    let files = list_opendrive_files(&config.input_dir, config.max_files)?;
    log::debug!("Found {} .xodr files in {}", files.len(), config.input_dir.display());

    let mut summary = BatchSummary {
        files: files.len(),
        ..BatchSummary::default()
    };
    for file in &files {
        match process_file(file, config) {
            Ok((written, skipped)) => {
                summary.roads_written += written.len();
                summary.roads_skipped += skipped;
            }
            Err(e) => {
                log::error!("{:#}", e);
                summary.failed_files += 1;
            }
        }
    }

    log::info!(
        "Done processing {} files: {} roads written, {} skipped, {} files failed",
        summary.files,
        summary.roads_written,
        summary.roads_skipped,
        summary.failed_files
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opendrive::{Geometry, GeometryKind, Lane, LaneSection, LaneWidth};
    use approx::assert_abs_diff_eq;

    fn lane(id: i32, width: f64) -> Lane {
        Lane {
            id,
            lane_type: "driving".to_string(),
            widths: vec![LaneWidth {
                s_offset: 0.0,
                a: width,
                b: 0.0,
                c: 0.0,
                d: 0.0,
                length: None,
            }],
            ..Lane::default()
        }
    }

    fn road(geometries: usize) -> Road {
        Road {
            id: "r1".to_string(),
            length: geometries as f64 * 10.0,
            plan_view: (0..geometries)
                .map(|i| Geometry {
                    s: i as f64 * 10.0,
                    x: i as f64 * 10.0,
                    y: (i as f64).sin(),
                    hdg: 0.0,
                    length: 10.0,
                    kind: GeometryKind::Line,
                })
                .collect(),
            lane_sections: vec![LaneSection {
                s: 0.0,
                left: vec![lane(1, 4.0)],
                right: vec![lane(-1, 4.0)],
                ..LaneSection::default()
            }],
            ..Road::default()
        }
    }

    #[test]
    fn test_road_spline() {
        let config = ConverterConfig {
            samples_per_segment: 4,
            ..ConverterConfig::default()
        };
        let fitted = road_spline(&road(6), &config).unwrap();
        assert_eq!(fitted.control_points.len(), 6);
        assert_eq!(fitted.spline.len(), 3 * 4);
        // Symmetric lanes put the centerline on the reference line.
        assert_abs_diff_eq!(fitted.control_points[2].y, 2.0_f64.sin(), epsilon = 1e-12);
        assert!(fitted.spline.iter().all(|p| p.width == 4.0));
    }

    #[test]
    fn test_road_with_three_geometries_is_insufficient() {
        let err = road_spline(&road(3), &ConverterConfig::default()).unwrap_err();
        assert!(matches!(err, SplineError::InsufficientPoints { found: 3, .. }));
    }

    #[test]
    fn test_stepped_sampling_rescues_short_roads() {
        let config = ConverterConfig {
            sample_step: Some(5.0),
            ..ConverterConfig::default()
        };
        let fitted = road_spline(&road(2), &config).unwrap();
        assert_eq!(fitted.control_points.len(), 5);
    }

    #[test]
    fn test_output_stem() {
        let path = Path::new("maps/3.xodr");
        assert_eq!(output_stem(path, "7", 1), "3");
        assert_eq!(output_stem(path, "7", 2), "3_7");
    }
}
