//! Testbed2D - 2D Physics Testbed
//!
//! Headless runner: loads the configured demo, steps it on the simulation
//! thread and logs what a renderer would draw once a second.

use std::process::ExitCode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use testbed_core::{FrameSnapshot, SceneGenerator, Simulation, Vec2};
use testbed_render::project_frame;

use testbed2d::config::AppConfig;
use testbed2d::scene::DemoSession;
use testbed2d::systems::SimulationLoop;

const REPORT_INTERVAL: Duration = Duration::from_secs(1);

fn main() -> ExitCode {
    let loaded = AppConfig::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    // RUST_LOG wins over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.debug.log_level.as_str()),
    )
    .init();
    if let Err(e) = &loaded {
        log::warn!("Failed to load config: {}. Using defaults.", e);
    }
    log::info!("Starting {}", config.window.title);

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let generator = match config.scene.seed {
        Some(seed) => {
            log::info!("Scene generation seeded with {}", seed);
            SceneGenerator::from_seed(seed)
        }
        None => SceneGenerator::from_entropy(),
    }
    .with_max_attempts(config.scene.max_placement_attempts);

    let frames = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&frames);
    let sim_loop = SimulationLoop::spawn(
        Simulation::default(),
        config.simulation.loop_settings(),
        move |_: &Arc<FrameSnapshot>| {
            counter.fetch_add(1, Ordering::Relaxed);
        },
    )?;

    let demo = config.scene.demo;
    let run_for = (config.simulation.run_seconds > 0.0)
        .then(|| Duration::from_secs_f64(config.simulation.run_seconds));
    let mut session = DemoSession::new(config, generator, sim_loop.control())?;
    session.select_demo(demo)?;

    let started = Instant::now();
    let mut last_frames = 0;
    loop {
        thread::sleep(REPORT_INTERVAL);

        if demo.explodes_on_click() {
            let viewport = session.viewport();
            let centre = Vec2::new(viewport.display_width(), viewport.screen_height()) * 0.5;
            session.click(centre);
        }

        let snapshot = sim_loop.snapshots().latest();
        let frame = project_frame(&snapshot, session.viewport());
        let total = frames.load(Ordering::Relaxed);
        log::info!(
            "step {} | {} bodies ({} visible) | {} trail points | {} fps",
            snapshot.step,
            snapshot.body_count(),
            frame.visible_bodies(session.viewport()),
            snapshot.trail_point_count(),
            total - last_frames
        );
        last_frames = total;

        if session.control().is_stopped() {
            break;
        }
        if run_for.is_some_and(|limit| started.elapsed() >= limit) {
            break;
        }
    }

    let simulation = sim_loop.shutdown()?;
    log::info!(
        "Finished after {} steps with {} bodies",
        simulation.step_count(),
        simulation.world().body_count()
    );
    Ok(())
}
