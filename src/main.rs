//! Replays a recorded landmark trace through the head tilt tracker.

use anyhow::{Context, Result};
use clap::Parser;
use head_tilt_control::{
    app::{AppConfig, ReplayApp},
    config::{Config, EXAMPLE_CONFIG},
};
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON-lines landmark trace to replay
    #[arg(required_unless_present = "print_config")]
    trace: Option<String>,

    /// Path to configuration file (YAML format)
    #[arg(short = 'C', long)]
    config: Option<String>,

    /// Pitch filter (none, moving_average[:N], median[:N], exponential[:ALPHA])
    #[arg(short, long)]
    filter: Option<String>,

    /// Threshold margin around the neutral pitch
    #[arg(short, long)]
    margin: Option<f64>,

    /// Replay at the recorded frame rate
    #[arg(long)]
    realtime: bool,

    /// Recorded frame rate
    #[arg(long, default_value = "30")]
    fps: f64,

    /// Recalibrate after this many frames
    #[arg(long)]
    recalibrate_after: Option<usize>,

    /// Print an example configuration file and exit
    #[arg(long)]
    print_config: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    if args.print_config {
        print!("{EXAMPLE_CONFIG}");
        return Ok(());
    }

    let mut tracker_config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            Config::from_file(path).with_context(|| format!("loading {path}"))?
        }
        None => Config::default(),
    };
    if let Some(filter) = args.filter {
        tracker_config.filter.pitch_filter = filter;
    }
    if let Some(margin) = args.margin {
        tracker_config.calibration.margin = margin;
    }

    let trace = args.trace.context("a trace file is required")?;
    let config = AppConfig {
        trace: trace.into(),
        tracker: tracker_config,
        realtime: args.realtime,
        fps: args.fps,
        recalibrate_after: args.recalibrate_after,
    };

    let mut app = ReplayApp::new(config)?;
    let summary = app.run()?;

    println!(
        "frames={} skipped={} no_face={} classified={} jumps={} ducks={} calibration={:?}",
        summary.frames,
        summary.skipped,
        summary.no_face,
        summary.classified,
        summary.jumps,
        summary.ducks,
        summary.calibration
    );

    Ok(())
}
