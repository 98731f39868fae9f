//! Headless terrain streaming demo: walks an observer across the infinite
//! height field and reports what the stream did.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use clap::Parser;
use hashbrown::HashMap;
use relief_stream::{PhasedStream, StreamConfig, StreamReport, TerrainStream};
use relief_terrain::{TerrainConfig, TerrainSampler};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(name = "relief", about = "Sliding-window procedural terrain demo")]
struct Args {
    /// World seed; defaults to a clock-derived value.
    #[arg(long)]
    seed: Option<i32>,
    /// TOML config with [grid], [height], [fractal], and [[surface]] tables.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Observer steps to simulate.
    #[arg(long, default_value_t = 600)]
    steps: u32,
    /// World units per step.
    #[arg(long, default_value_t = 1.5)]
    stride: f32,
    /// Walk heading in degrees; 0 heads toward +x, 90 toward -z.
    #[arg(long, default_value_t = 26.0)]
    heading: f32,
    /// Spread each update over four phased ticks instead of one call.
    #[arg(long)]
    paced: bool,
    /// Override the window side from the config.
    #[arg(long)]
    side: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct DemoConfig {
    #[serde(default)]
    grid: StreamConfig,
    #[serde(flatten)]
    terrain: TerrainConfig,
}

fn load_config(path: &Path) -> Result<DemoConfig, Box<dyn Error>> {
    let text = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&text)?)
}

/// Clock-derived seed, kept small enough to read off a log line and type
/// back in for a rerun.
fn clock_seed() -> i32 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    (secs % 10_000) as i32
}

#[derive(Default)]
struct Tally {
    updates: u32,
    full_regens: u32,
    refilled: usize,
    work_us: u64,
}

impl Tally {
    fn absorb(&mut self, report: &StreamReport) {
        self.updates += 1;
        self.refilled += report.refilled;
        if report.full_regen {
            self.full_regens += 1;
        }
        self.work_us += u64::from(report.t_shift_us)
            + u64::from(report.t_fill_us)
            + u64::from(report.t_normals_us);
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = match args.config.as_deref().map(load_config).transpose() {
        Ok(loaded) => loaded.unwrap_or_default(),
        Err(e) => {
            log::error!("config load failed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(side) = args.side {
        cfg.grid.side = side;
    }
    if let Err(e) = cfg.grid.validate() {
        log::error!("bad stream config: {}", e);
        return ExitCode::FAILURE;
    }

    let seed = args.seed.unwrap_or_else(clock_seed);
    let sampler = match TerrainSampler::from_config(&cfg.terrain, seed) {
        Ok(s) => s,
        Err(e) => {
            log::error!("bad terrain config: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let palette = sampler.palette().clone();

    let heading = args.heading.to_radians();
    let dir = (heading.cos(), -heading.sin());
    let mut pos = (0.0f32, 0.0f32);
    let mut tally = Tally::default();

    let stream = TerrainStream::new(&cfg.grid, sampler, pos.0, pos.1);
    let t_walk = Instant::now();
    let stream = if args.paced {
        let mut paced = PhasedStream::new(stream);
        for _ in 0..args.steps {
            pos.0 += dir.0 * args.stride;
            pos.1 += dir.1 * args.stride;
            if let Some(report) = paced.tick(pos.0, pos.1) {
                tally.absorb(&report);
            }
        }
        paced.into_inner()
    } else {
        let mut stream = stream;
        for _ in 0..args.steps {
            pos.0 += dir.0 * args.stride;
            pos.1 += dir.1 * args.stride;
            if let Some(report) = stream.update(pos.0, pos.1) {
                tally.absorb(&report);
            }
        }
        stream
    };
    let walk_ms = t_walk.elapsed().as_millis();

    log::info!(
        "walked {} steps ({:.0} world units) in {} ms: {} updates, {} full regens, {} vertices refilled, {} us of stream work",
        args.steps,
        f64::from(args.steps) * f64::from(args.stride),
        walk_ms,
        tally.updates,
        tally.full_regens,
        tally.refilled,
        tally.work_us
    );

    // Surface census of the final window, in palette order.
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in stream.vertices() {
        *counts
            .entry(palette.classify(v.position.y).name.as_str())
            .or_insert(0) += 1;
    }
    let total = stream.vertices().len();
    for ty in palette.types() {
        let n = counts.get(ty.name.as_str()).copied().unwrap_or(0);
        log::info!(
            "  {:<12} {:>8} vertices ({:>5.1}%)",
            ty.name,
            n,
            n as f64 * 100.0 / total as f64
        );
    }
    ExitCode::SUCCESS
}
