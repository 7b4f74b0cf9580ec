use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::Parser;
use log::info;

use gps_laps::config::{DEFAULT_BASE_THRESHOLD_M, DEFAULT_NMEA_SOURCE};
use gps_laps::fetch::{FeedPolicy, run_feed};
use gps_laps::{LapCounter, TrackerConfig};

/// Count laps of a closed circuit from a GPS receiver's NMEA output.
///
/// The first fix is the start/finish point. One JSON lap status is printed
/// to stdout per GGA fix.
#[derive(Parser, Debug)]
#[command(name = "gps-laps", version)]
struct Args {
    /// NMEA source: a serial device or a recorded log
    #[arg(short, long, default_value = DEFAULT_NMEA_SOURCE)]
    input: PathBuf,

    /// Radius around the start point that re-arms the counter (meters).
    /// The departure radius is 1.2 times this.
    #[arg(short, long, default_value_t = DEFAULT_BASE_THRESHOLD_M)]
    threshold: f64,

    /// Stop on the first invalid fix instead of dropping it
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = TrackerConfig::new(args.threshold)?;
    let policy = if args.strict {
        FeedPolicy::Halt
    } else {
        FeedPolicy::Drop
    };

    info!(
        "Lap band: re-arm inside {:.2}m, count beyond {:.2}m",
        config.inner_threshold(),
        config.outer_threshold()
    );

    info!("Opening {}...", args.input.display());
    let file = File::open(&args.input)?;
    let reader = BufReader::new(file);

    let mut counter = LapCounter::new(config);
    let stdout = io::stdout();
    run_feed(reader, &mut counter, stdout.lock(), policy)?;

    Ok(())
}
