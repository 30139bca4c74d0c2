//! 2D physics world for the testbed
//!
//! This crate provides the dynamics side the harness drives:
//! - Collision shapes (circles and convex polygons) with bounding boxes
//! - Rigid bodies stored under generational keys
//! - Gravity, drag and spring joints with explicit integration
//! - Particle explosions
//!
//! Contact detection and resolution are left to a full solver.

pub mod body;
pub mod explosion;
pub mod joint;
pub mod material;
pub mod shapes;
pub mod world;

// Re-export commonly used types
pub use body::{BodyDesc, BodyFlags, BodyKey, RigidBody2D};
pub use explosion::ParticleExplosion;
pub use joint::JointToPoint;
pub use material::PhysicsMaterial;
pub use shapes::{Aabb, Shape, ShapeKind};
pub use world::{PhysicsConfig, PhysicsWorld};
