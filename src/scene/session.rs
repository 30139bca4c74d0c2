//! Interactive session state
//!
//! Everything the user interface needs between frames lives here: the active
//! demo, the viewport and a handle to the simulation loop. Input arrives as
//! plain method calls so any front end (or a test) can drive it.

use log::{info, warn};
use testbed_core::{ExplosionParams, SceneGenerationError, SceneGenerator, Vec2};
use testbed_render::{Viewport, ViewportError, SCROLL_ZOOM_IN, SCROLL_ZOOM_OUT};

use super::demos::Demo;
use crate::config::AppConfig;
use crate::systems::{LoopState, SimCommand, SimulationControl, STANDARD_FREQUENCIES};

/// Per-session UI state bound to a running simulation loop
#[derive(Debug)]
pub struct DemoSession {
    config: AppConfig,
    generator: SceneGenerator,
    viewport: Viewport,
    control: SimulationControl,
    active_demo: Option<Demo>,
    explosion: ExplosionParams,
}

impl DemoSession {
    pub fn new(
        config: AppConfig,
        generator: SceneGenerator,
        control: SimulationControl,
    ) -> Result<Self, ViewportError> {
        let viewport = Viewport::new(config.window.width, config.window.height)?;
        Ok(Self {
            config,
            generator,
            viewport,
            control,
            active_demo: None,
            explosion: ExplosionParams::default(),
        })
    }

    /// Use these parameters for explosions set off by clicks
    pub fn with_explosion(mut self, explosion: ExplosionParams) -> Self {
        self.explosion = explosion;
        self
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn control(&self) -> &SimulationControl {
        &self.control
    }

    pub fn active_demo(&self) -> Option<Demo> {
        self.active_demo
    }

    /// Load `demo` and hand it to the loop
    ///
    /// The viewport is reset and moved to the demo's camera. On failure the
    /// running scene is left alone.
    pub fn select_demo(&mut self, demo: Demo) -> Result<(), SceneGenerationError> {
        let scene = demo.load(&mut self.generator, &self.config)?;

        self.viewport.reset();
        self.viewport.set_centre(scene.camera.centre);
        if let Err(e) = self.viewport.set_zoom(scene.camera.zoom) {
            warn!("Demo '{}' has a bad camera: {}", demo, e);
        }

        if !self.control.send(SimCommand::Replace(Box::new(scene.simulation))) {
            warn!("Simulation loop has exited; '{}' was not loaded", demo);
        }
        self.active_demo = Some(demo);
        info!("Selected demo '{}'", demo);
        Ok(())
    }

    pub fn toggle_pause(&self) -> LoopState {
        self.control.toggle_pause()
    }

    /// One scroll wheel step
    pub fn scroll(&mut self, zoom_in: bool) {
        let factor = if zoom_in { SCROLL_ZOOM_IN } else { SCROLL_ZOOM_OUT };
        if let Err(e) = self.viewport.zoom_by(factor) {
            warn!("Ignoring scroll: {}", e);
        }
    }

    /// Drag the scene by `screen_delta` pixels
    pub fn drag(&mut self, screen_delta: Vec2) {
        self.viewport.pan(screen_delta);
    }

    /// Click at a screen position
    ///
    /// Sets off a particle explosion at the clicked world point when the
    /// active demo supports it. Returns whether one was queued.
    pub fn click(&mut self, screen_point: Vec2) -> bool {
        match self.active_demo {
            Some(demo) if demo.explodes_on_click() => {
                let epicentre = self.viewport.screen_to_world(screen_point);
                self.control
                    .send(SimCommand::ParticleExplosion(self.explosion.at(epicentre)))
            }
            _ => false,
        }
    }

    pub fn set_frequency(&self, hz: f64) {
        self.control.set_frequency(hz);
    }

    /// Move to the next standard frequency, wrapping back to the slowest
    pub fn cycle_frequency(&self) -> f64 {
        let current = self.control.frequency();
        let next = STANDARD_FREQUENCIES
            .iter()
            .copied()
            .find(|&hz| hz > current)
            .unwrap_or(STANDARD_FREQUENCIES[0]);
        self.control.set_frequency(next);
        next
    }

    /// Empty the running scene and put the camera back at the origin
    pub fn clear(&mut self) {
        self.viewport.reset();
        self.control.send(SimCommand::Clear);
        self.active_demo = None;
    }
}
