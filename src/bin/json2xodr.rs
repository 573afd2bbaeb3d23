// Campaign JSON road records to one OpenDRIVE file per road
//
// Usage: json2xodr <input.json> <output_dir>
use opendrive_spline::opendrive::convert_json_to_opendrive;

use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <input.json> <output_dir>", args[0]);
        return ExitCode::FAILURE;
    }

    match convert_json_to_opendrive(Path::new(&args[1]), Path::new(&args[2])) {
        Ok(written) => {
            log::info!("Wrote {} OpenDRIVE files to {}", written.len(), args[2]);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
