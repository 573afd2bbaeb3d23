//! Converter configuration loaded from TOML

use crate::spline::{DEFAULT_ALPHA, DEFAULT_NUM_SPLINE_POINTS};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "opendrive2catmull.toml";

/// Batch conversion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Directory scanned for `.xodr` files
    pub input_dir: PathBuf,
    /// Directory receiving one JSON file per road
    pub output_dir: PathBuf,
    /// Directory receiving PNG plots; no plots when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_dir: Option<PathBuf>,
    /// Knot exponent (0.5 = centripetal)
    pub alpha: f64,
    /// Samples per spline segment
    pub samples_per_segment: usize,
    /// Densify each plan-view geometry at this step [m]; geometry starts only when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_step: Option<f64>,
    /// Draw lane edges in plots
    pub lane_edges: bool,
    /// Process at most this many files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_files: Option<usize>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("opendrive"),
            output_dir: PathBuf::from("road_data"),
            plot_dir: None,
            alpha: DEFAULT_ALPHA,
            samples_per_segment: DEFAULT_NUM_SPLINE_POINTS,
            sample_step: None,
            lane_edges: false,
            max_files: None,
        }
    }
}

impl ConverterConfig {
    /// Loads the config from a TOML file. A missing file yields the defaults;
    /// a malformed one is an error.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Malformed config file {}", path.display()))?;
        config.validate()?;
        log::info!("Config loaded from: {}", path.display());
        Ok(config)
    }

    /// Writes the config as TOML
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Config saved to: {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.alpha.is_finite() {
            bail!("alpha must be finite, got {}", self.alpha);
        }
        if self.samples_per_segment == 0 {
            bail!("samples_per_segment must be at least 1");
        }
        if let Some(step) = self.sample_step {
            if !(step.is_finite() && step > 0.0) {
                bail!("sample_step must be positive, got {}", step);
            }
        }
        Ok(())
    }
}
