extern crate greenhouse;

use clap::{ArgAction, Parser};
use greenhouse::output::FileOutput;
use greenhouse::run_project;
use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct GreenhouseArgs {
    /// JSON scenario file
    input_file: String,
    /// directory for the result files, defaults to the scenario's directory
    #[arg(long, short)]
    output_dir: Option<String>,
    /// increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = GreenhouseArgs::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let input_path = Path::new(args.input_file.as_str());
    let input_file_stem = input_path
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("greenhouse");
    let output_dir = match args.output_dir {
        Some(dir) => PathBuf::from(dir),
        None => input_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    let output = FileOutput::new(output_dir, format!("{input_file_stem}__{{}}.csv"));

    let estimate = run_project(BufReader::new(File::open(input_path)?), &output)?;

    println!("=== Summary ({} rows) ===", estimate.rows.len());
    for (quantity, value, unit) in estimate.summary.entries() {
        println!("{quantity} {unit}: {value:.4}");
    }
    let debug = estimate.actuation_debug;
    println!(
        "Actuation: vents {:.3}, fans {:.3}, heater {:.3} effective; ACH {:.3} 1/h; heater {:.1} W",
        debug.vents_effective,
        debug.fans_effective,
        debug.heater_effective,
        debug.air_changes_per_hour,
        debug.heater_thermal_w
    );

    Ok(())
}
