//! Core types for the 2D physics testbed
//!
//! This crate ties the dynamics world to the harness around it:
//!
//! - [`Trail`] - Bounded history of a body's positions
//! - [`LifecycleTracker`] - Trails and particle groups with lifespan culling
//! - [`SceneGenerator`] - Random and parametric scene population
//! - [`Simulation`] - World plus tracker, stepped in a fixed order
//! - [`FrameSnapshot`] - Immutable copy of a simulation frame for rendering

mod lifecycle;
mod scene_generator;
mod simulation;
mod snapshot;
mod trail;

pub use lifecycle::{LifecycleTracker, ParticleGroup, TrailSettings};
pub use scene_generator::{
    scale_friction, set_ice, set_static, SceneGenerationError, SceneGenerator,
    DEFAULT_MAX_ATTEMPTS,
};
pub use simulation::{ExplosionParams, Simulation, StepReport};
pub use snapshot::{BodySnapshot, FrameSnapshot, JointSnapshot};
pub use trail::Trail;

// Re-export the types callers need to drive a simulation
pub use testbed_math::Vec2;
pub use testbed_physics::{BodyDesc, BodyKey, PhysicsConfig, PhysicsWorld, Shape, ShapeKind};
