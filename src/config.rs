//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`TB2D_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::Path;
use std::time::Duration;

use testbed_core::{TrailSettings, Vec2, DEFAULT_MAX_ATTEMPTS};

use crate::scene::Demo;
use crate::systems::LoopSettings;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Display configuration
    #[serde(default)]
    pub window: WindowConfig,
    /// Simulation loop configuration
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Physics configuration
    #[serde(default)]
    pub physics: PhysicsConfig,
    /// Particle trail configuration
    #[serde(default)]
    pub trails: TrailConfig,
    /// Scene selection and generation
    #[serde(default)]
    pub scene: SceneConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`TB2D_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        // Load user config (optional)
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // TB2D_SIMULATION__FREQUENCY_HZ=120 -> simulation.frequency_hz = 120
        figment = figment.merge(Env::prefixed("TB2D_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Display width in pixels
    pub width: u32,
    /// Display height in pixels
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Testbed2D - Physics Testbed".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// Simulation loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Steps per second (30, 60, 90 or 120 in the menus; 0 freezes time)
    pub frequency_hz: f64,
    /// Minimum milliseconds between frames (0 = unthrottled)
    pub frame_interval_ms: u64,
    /// Start with the loop paused
    pub start_paused: bool,
    /// Seconds to run before exiting (0 = until stopped)
    pub run_seconds: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 60.0,
            frame_interval_ms: 16,
            start_paused: false,
            run_seconds: 10.0,
        }
    }
}

impl SimulationConfig {
    /// Frame throttle, if any
    pub fn frame_interval(&self) -> Option<Duration> {
        (self.frame_interval_ms > 0).then(|| Duration::from_millis(self.frame_interval_ms))
    }

    /// Settings for spawning the simulation loop
    pub fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            frequency: self.frequency_hz,
            frame_interval: self.frame_interval(),
            start_paused: self.start_paused,
        }
    }
}

/// Physics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Vertical gravity (negative = downward)
    pub gravity: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self { gravity: -9.81 }
    }
}

impl PhysicsConfig {
    /// Convert to the physics engine's config type
    pub fn to_physics_config(&self) -> testbed_core::PhysicsConfig {
        testbed_core::PhysicsConfig::new(Vec2::new(0.0, self.gravity))
    }
}

/// Particle trail configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailConfig {
    /// Points kept per particle trail
    pub particle_trail_points: usize,
    /// Steps skipped between particle trail samples
    pub particle_skip_interval: u32,
}

impl Default for TrailConfig {
    fn default() -> Self {
        let settings = TrailSettings::default();
        Self {
            particle_trail_points: settings.points,
            particle_skip_interval: settings.skip_interval,
        }
    }
}

impl TrailConfig {
    pub fn to_trail_settings(&self) -> TrailSettings {
        TrailSettings {
            points: self.particle_trail_points,
            skip_interval: self.particle_skip_interval,
        }
    }
}

/// Scene selection and generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Demo loaded at startup
    pub demo: Demo,
    /// Seed for random scene generation (unset = seeded from the OS)
    pub seed: Option<u64>,
    /// Placement attempts allowed per random population
    pub max_placement_attempts: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            demo: Demo::MixedShapes,
            seed: None,
            max_placement_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.physics.gravity, -9.81);
        assert_eq!(config.simulation.frequency_hz, 60.0);
        assert_eq!(config.trails.particle_trail_points, 1000);
        assert_eq!(config.scene.demo, Demo::MixedShapes);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("title"));
        assert!(toml.contains("gravity"));
        assert!(toml.contains("demo = \"mixed_shapes\""));
    }

    #[test]
    fn test_partial_sections_fall_back_to_defaults() {
        let config: AppConfig = toml::from_str("[simulation]\nfrequency_hz = 120.0\nframe_interval_ms = 0\nstart_paused = true\nrun_seconds = 0.0\n").unwrap();
        assert_eq!(config.simulation.frequency_hz, 120.0);
        assert_eq!(config.simulation.frame_interval(), None);
        assert_eq!(config.window.height, 720);
    }

    #[test]
    fn test_conversions() {
        let config = AppConfig::default();
        assert_eq!(config.physics.to_physics_config().gravity, Vec2::new(0.0, -9.81));
        assert_eq!(config.trails.to_trail_settings(), TrailSettings::default());

        let settings = config.simulation.loop_settings();
        assert_eq!(settings.frequency, 60.0);
        assert_eq!(settings.frame_interval, Some(Duration::from_millis(16)));
        assert!(!settings.start_paused);
    }
}
