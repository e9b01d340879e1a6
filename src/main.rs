use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use loam_blocks::BlockType;
use loam_geom::Vec3;
use loam_runtime::{
    HeadlessPresenter, ObserverTracker, RaycastHit, StreamingWorld, WorldEvent,
};
use loam_world::WorldGenConfig;

/// Simulated frame length used to advance the observer tracker clock.
const FRAME: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(name = "loam", about = "Stream procedural voxel terrain around a walking observer")]
struct Args {
    /// Worldgen TOML; built-in defaults when omitted
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Frames to simulate
    #[arg(long, default_value_t = 600)]
    ticks: u32,
    /// Observer speed in voxels per frame along +X
    #[arg(long, default_value_t = 0.5)]
    speed: f32,
    /// Overrides `world.draw_radius`
    #[arg(long)]
    draw_radius: Option<i32>,
    /// Overrides `world.seed_offset[0]`
    #[arg(long, allow_hyphen_values = true)]
    seed_x: Option<i32>,
    /// Overrides `world.seed_offset[1]`
    #[arg(long, allow_hyphen_values = true)]
    seed_z: Option<i32>,
    /// Disable domain warping of the terrain field
    #[arg(long)]
    no_warp: bool,
}

fn load_config(args: &Args) -> Result<WorldGenConfig, Box<dyn std::error::Error>> {
    let mut cfg = match &args.config {
        Some(path) => WorldGenConfig::load(path)?,
        None => WorldGenConfig::default(),
    };
    if let Some(r) = args.draw_radius {
        cfg.world.draw_radius = r;
    }
    if let Some(x) = args.seed_x {
        cfg.world.seed_offset[0] = x;
    }
    if let Some(z) = args.seed_z {
        cfg.world.seed_offset[1] = z;
    }
    if args.no_warp {
        cfg.warp.enabled = false;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = load_config(&args)?;
    let mut world = StreamingWorld::new(&cfg, HeadlessPresenter::new())?;
    let events = world.subscribe();
    let mut tracker = ObserverTracker::new(world.dims(), cfg.poll_interval());

    // Ground the observer before the walk starts.
    let spawn_y = world.generator().surface_height_at(0, 0) as f32 + 2.0;
    let mut observer = Vec3::new(0.0, spawn_y, 0.0);
    world.request_streaming_at(observer);
    world.pump_until_idle(usize::MAX);

    let start = Instant::now();
    for frame in 0..args.ticks {
        let now = start + FRAME * frame;
        observer.x += args.speed;
        let (wx, _, wz) = observer.round_to_i32();
        if let Some(h) = world.surface_height_at(wx, wz) {
            observer.y = h as f32 + 2.0;
        }
        if let Some(at) = tracker.poll(now, observer) {
            world.request_streaming_at(at);
        }
        world.tick();
        for event in events.try_iter() {
            match event {
                WorldEvent::WorldReady => log::info!("[main] world ready"),
                WorldEvent::ChunksAppended { created } => {
                    log::debug!("[main] +{} chunks", created.len())
                }
            }
        }
    }
    world.pump_until_idle(usize::MAX);

    // Dig out the voxel under the observer's feet.
    let (wx, _, wz) = observer.round_to_i32();
    if let Some(h) = world.surface_height_at(wx, wz) {
        let hit = RaycastHit::new(
            Vec3::new(wx as f32, h as f32 + 0.5, wz as f32),
            Vec3::UP,
        );
        match world.apply_edit(hit, BlockType::Air) {
            Ok(outcome) => log::info!(
                "[main] dug ({},{},{}), refreshed {} chunk(s)",
                outcome.world.0,
                outcome.world.1,
                outcome.world.2,
                outcome.refreshed.len()
            ),
            Err(err) => log::warn!("[main] edit failed: {err}"),
        }
    }

    let stats = world.stats();
    log::info!(
        "[main] runs: {} done, {} cancelled, {} failed; chunks: {} generated, {} presented, {} evicted",
        stats.runs_completed,
        stats.runs_cancelled,
        stats.runs_failed,
        stats.chunks_generated,
        stats.presented,
        stats.data_evicted
    );
    log::info!(
        "[main] loaded data={} render={} quads={}",
        world.store().data_len(),
        world.store().render_len(),
        world.presenter().total_quads()
    );
    world.shutdown();
    world.teardown();
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("[main] {err}");
            ExitCode::FAILURE
        }
    }
}
