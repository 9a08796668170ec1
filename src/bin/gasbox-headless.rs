//! Headless gasbox driver
//!
//! Runs the simulation for a fixed number of frames on a synthetic clock and
//! logs every pressure readout. Useful for profiling and for checking a config
//! file without a UI.
//!
//! # Usage
//!
//! ```bash
//! gasbox-headless --frames 600 --temperature 450
//! gasbox-headless --config gas.toml --log-level debug
//! ```

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use gasbox::config::SimConfig;
use gasbox::control::GasController;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "gasbox-headless")]
#[command(author, version, about = "Run the 2D gas simulation without a UI", long_about = None)]
struct Cli {
    /// TOML config file; defaults are used for anything it omits
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(short, long, default_value = "600")]
    frames: u64,

    /// Frames per simulated second
    #[arg(long, default_value = "60")]
    fps: u32,

    /// Override the temperature in Kelvin
    #[arg(short, long)]
    temperature: Option<f64>,

    /// Override the particle count
    #[arg(long)]
    count: Option<usize>,

    /// Override the RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Logging verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("gasbox v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(t) = cli.temperature {
        config.temperature_k = t;
    }
    if let Some(n) = cli.count {
        config.particle_count = n;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    config.validate()?;

    let frame_dt = Duration::from_secs_f64(1.0 / f64::from(cli.fps.max(1)));
    let t0 = Instant::now();
    let mut gas = GasController::new(config, t0)?;

    let mut clock = t0;
    for _ in 0..cli.frames {
        clock += frame_dt;
        let frame = gas.frame(clock);
        if let Some(pressure) = frame.pressure {
            let sim = gas.simulation();
            info!(
                tick = sim.ticks(),
                pressure,
                kinetic_energy = sim.kinetic_energy(),
                "pressure readout"
            );
        }
    }

    let sim = gas.simulation();
    info!(
        ticks = sim.ticks(),
        wall_collisions = sim.wall_collisions_total(),
        pair_collisions = sim.pair_collisions_total(),
        elapsed_ms = t0.elapsed().as_millis() as u64,
        "run complete"
    );
    Ok(())
}
