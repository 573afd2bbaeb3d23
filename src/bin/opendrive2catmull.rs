// Batch conversion of OpenDRIVE roads into Catmull-Rom reference paths
//
// Usage: opendrive2catmull [config.toml]
use opendrive_spline::pipeline::{process_directory, ConverterConfig, DEFAULT_CONFIG_FILE};

use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let result = ConverterConfig::load_from_file(&config_path)
        .and_then(|config| process_directory(&config));

    match result {
        Ok(summary) if summary.failed_files == 0 => ExitCode::SUCCESS,
        Ok(summary) => {
            log::warn!("{} of {} files failed", summary.failed_files, summary.files);
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
