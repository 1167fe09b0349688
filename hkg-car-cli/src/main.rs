//! HKG Car Interface Replay CLI
//!
//! Drives the hkg-car-interface library from a recorded JSON-lines trace of
//! decoded bus snapshots and actuator requests. It adds:
//! - Session configuration from TOML
//! - Cycle-by-cycle output of the messages the car interface would send
//! - Optional schema checks of those messages against a DBC file
//! - A replay summary

use anyhow::{Context, Result};
use clap::Parser;
use hkg_car_interface::CarInterface;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

mod config;
mod replay;
mod report;
mod schema;
mod trace;

use replay::{run_replay, ReplayOptions};
use schema::MessageSchema;

/// HKG Car Interface - replay recorded drives through the car interface
#[derive(Parser, Debug)]
#[command(name = "hkg-car-cli")]
#[command(about = "Replay decoded CAN traces through the HKG car interface", long_about = None)]
#[command(version)]
struct Args {
    /// Path to session configuration file (session.toml)
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Path to JSON-lines trace to replay
    #[arg(short, long, value_name = "FILE")]
    trace: PathBuf,

    /// Output file for emitted messages (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// DBC file to check outgoing messages against
    #[arg(long, value_name = "FILE")]
    dbc: Option<PathBuf>,

    /// Maximum number of cycles to replay (overrides the session file)
    #[arg(long, value_name = "COUNT")]
    max_cycles: Option<u64>,

    /// Include the decoded vehicle state in every output record
    #[arg(long)]
    emit_state: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("HKG Car Interface CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using car interface library v{}", hkg_car_interface::VERSION);

    log::info!("Loading configuration from: {:?}", args.config);
    let app_config = config::load_config(&args.config)?;
    log::debug!("Configuration loaded successfully");

    let options = ReplayOptions {
        emit_state: args.emit_state || app_config.replay.emit_state,
        max_cycles: args.max_cycles.or(app_config.replay.max_cycles),
        start_frame: app_config.replay.start_frame,
    };

    let schema = args
        .dbc
        .as_deref()
        .map(MessageSchema::from_path)
        .transpose()?;

    let mut interface = CarInterface::new(app_config.vehicle)
        .context("Failed to start car interface")?;

    let input = File::open(&args.trace)
        .with_context(|| format!("Failed to open trace file: {:?}", args.trace))?;
    let input = BufReader::new(input);

    let summary = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {:?}", path))?;
            let mut writer = BufWriter::new(file);
            run_replay(&mut interface, input, &mut writer, &options, schema.as_ref())?
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            run_replay(&mut interface, input, &mut writer, &options, schema.as_ref())?
        }
    };

    if !args.quiet {
        eprintln!("{}", summary);
    }
    if summary.schema_violations > 0 {
        log::warn!(
            "{} outgoing signal values do not match the schema",
            summary.schema_violations
        );
    }

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
