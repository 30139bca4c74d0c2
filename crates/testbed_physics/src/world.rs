//! Physics world and simulation
//!
//! This world integrates bodies under gravity, drag and joint tension.
//! Contact generation and resolution belong to the full solver and are not
//! performed here.

use crate::body::{BodyDesc, BodyKey, RigidBody2D};
use crate::joint::JointToPoint;
use testbed_math::Vec2;
use slotmap::SlotMap;

/// Configuration for the physics simulation
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsConfig {
    /// Gravity acceleration (negative y = down)
    pub gravity: Vec2,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.81),
        }
    }
}

impl PhysicsConfig {
    /// Create a new physics config with the given gravity vector
    pub fn new(gravity: Vec2) -> Self {
        Self { gravity }
    }
}

/// The physics world containing all rigid bodies and joints
#[derive(Clone, Debug)]
pub struct PhysicsWorld {
    /// All rigid bodies in the world (using generational keys)
    bodies: SlotMap<BodyKey, RigidBody2D>,
    /// Spring joints anchored to fixed points
    joints: Vec<JointToPoint>,
    /// Physics configuration
    pub config: PhysicsConfig,
}

impl PhysicsWorld {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            joints: Vec::new(),
            config,
        }
    }

    /// Add a body described by `desc` and return its key
    pub fn add_body(&mut self, desc: BodyDesc) -> BodyKey {
        self.bodies.insert(RigidBody2D::from_desc(desc))
    }

    /// Remove a body from the world and return it
    ///
    /// Joints attached to the body are dropped with it. Returns `None` if the
    /// key no longer refers to a body.
    pub fn remove_body(&mut self, key: BodyKey) -> Option<RigidBody2D> {
        let removed = self.bodies.remove(key)?;
        self.joints.retain(|joint| joint.body != key);
        Some(removed)
    }

    /// Check whether a key still refers to a body
    pub fn contains_body(&self, key: BodyKey) -> bool {
        self.bodies.contains_key(key)
    }

    /// Get an immutable reference to a body by key
    pub fn get_body(&self, key: BodyKey) -> Option<&RigidBody2D> {
        self.bodies.get(key)
    }

    /// Get a mutable reference to a body by key
    pub fn get_body_mut(&mut self, key: BodyKey) -> Option<&mut RigidBody2D> {
        self.bodies.get_mut(key)
    }

    /// Current position of a body, if it still exists
    pub fn body_position(&self, key: BodyKey) -> Option<Vec2> {
        self.bodies.get(key).map(|body| body.position)
    }

    /// Get the number of bodies in the world
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Iterate over all body keys
    pub fn body_keys(&self) -> impl Iterator<Item = BodyKey> + '_ {
        self.bodies.keys()
    }

    /// Iterate over all bodies with their keys
    pub fn bodies(&self) -> impl Iterator<Item = (BodyKey, &RigidBody2D)> + '_ {
        self.bodies.iter()
    }

    /// Iterate mutably over all bodies
    pub fn bodies_mut(&mut self) -> impl Iterator<Item = &mut RigidBody2D> + '_ {
        self.bodies.values_mut()
    }

    /// Add a joint
    pub fn add_joint(&mut self, joint: JointToPoint) {
        self.joints.push(joint);
    }

    /// All joints in the world
    pub fn joints(&self) -> &[JointToPoint] {
        &self.joints
    }

    /// Remove every body and joint
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.joints.clear();
    }

    /// Step the physics simulation forward by dt seconds
    ///
    /// This performs:
    /// 1. Drag and gravity on non-static bodies
    /// 2. Joint tension impulses
    /// 3. Integration of velocity into position and orientation
    pub fn step(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }

        // Phase 1: Drag and gravity
        let gravity = self.config.gravity;
        for body in self.bodies.values_mut() {
            if body.is_static() {
                continue;
            }
            let speed = body.velocity.length();
            if body.linear_damping > 0.0 && speed > 0.0 {
                let drag = body.velocity.normalized() * (-speed * speed * body.linear_damping);
                body.velocity += drag * (body.inv_mass() * dt);
            }
            if body.affected_by_gravity() {
                body.velocity += gravity * dt;
            }
        }

        // Phase 2: Joints
        for joint in &self.joints {
            if let Some(body) = self.bodies.get_mut(joint.body) {
                if !body.is_static() {
                    joint.apply_tension(body);
                }
            }
        }

        // Phase 3: Integrate
        for body in self.bodies.values_mut() {
            if body.is_static() {
                continue;
            }
            body.position += body.velocity * dt;
            if body.angular_velocity != 0.0 {
                let orientation = body.orientation() + body.angular_velocity * dt;
                body.set_orientation(orientation);
            }
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Shape;

    #[test]
    fn test_physics_config_default() {
        let config = PhysicsConfig::default();
        assert_eq!(config.gravity, Vec2::new(0.0, -9.81));
    }

    #[test]
    fn test_world_add_remove_body() {
        let mut world = PhysicsWorld::new();
        assert_eq!(world.body_count(), 0);

        let key = world.add_body(BodyDesc::new(Shape::circle(1.0), Vec2::ZERO));
        assert_eq!(world.body_count(), 1);
        assert!(world.contains_body(key));

        assert!(world.remove_body(key).is_some());
        assert_eq!(world.body_count(), 0);
        assert!(world.remove_body(key).is_none());
        assert!(world.body_position(key).is_none());
    }

    #[test]
    fn test_stale_key_does_not_alias_new_body() {
        let mut world = PhysicsWorld::new();
        let old = world.add_body(BodyDesc::new(Shape::circle(1.0), Vec2::ZERO));
        world.remove_body(old);
        let new = world.add_body(BodyDesc::new(Shape::circle(1.0), Vec2::new(5.0, 5.0)));

        assert_ne!(old, new);
        assert!(world.get_body(old).is_none());
    }

    #[test]
    fn test_gravity_integration() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::new(Vec2::new(0.0, -10.0)));
        let key = world.add_body(BodyDesc::new(Shape::circle(1.0), Vec2::new(0.0, 100.0)));

        world.step(0.1);

        let body = world.get_body(key).unwrap();
        assert!((body.velocity.y + 1.0).abs() < 1e-9);
        assert!((body.position.y - 99.9).abs() < 1e-9);
    }

    #[test]
    fn test_static_bodies_do_not_move() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(
            BodyDesc::new(Shape::rectangle(10.0, 1.0), Vec2::new(0.0, 5.0)).with_density(0.0),
        );

        for _ in 0..10 {
            world.step(1.0 / 60.0);
        }

        assert_eq!(world.body_position(key), Some(Vec2::new(0.0, 5.0)));
    }

    #[test]
    fn test_zero_dt_is_a_no_op() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(BodyDesc::new(Shape::circle(1.0), Vec2::ZERO));
        world.step(0.0);
        assert_eq!(world.body_position(key), Some(Vec2::ZERO));
        assert_eq!(world.get_body(key).unwrap().velocity, Vec2::ZERO);
    }

    #[test]
    fn test_gravity_flag_respected() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(
            BodyDesc::new(Shape::circle(1.0), Vec2::ZERO)
                .with_flags(crate::body::BodyFlags::PARTICLE)
                .with_velocity(Vec2::new(1.0, 0.0)),
        );
        world.step(1.0);
        assert_eq!(world.body_position(key), Some(Vec2::new(1.0, 0.0)));
    }

    #[test]
    fn test_linear_damping_slows_body() {
        let mut world = PhysicsWorld::with_config(PhysicsConfig::new(Vec2::ZERO));
        let key = world.add_body(
            BodyDesc::new(Shape::rectangle(0.5, 0.5), Vec2::ZERO)
                .with_velocity(Vec2::new(10.0, 0.0))
                .with_linear_damping(0.01),
        );
        world.step(0.1);
        let v = world.get_body(key).unwrap().velocity.x;
        assert!(v < 10.0 && v > 0.0);
    }

    #[test]
    fn test_removing_body_drops_its_joints() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(BodyDesc::new(Shape::circle(1.0), Vec2::new(0.0, -10.0)));
        world.add_joint(JointToPoint::new(key, Vec2::ZERO, 5.0, 1.0, 0.0));
        assert_eq!(world.joints().len(), 1);

        world.remove_body(key);
        assert!(world.joints().is_empty());
    }

    #[test]
    fn test_clear() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(BodyDesc::new(Shape::circle(1.0), Vec2::ZERO));
        world.add_joint(JointToPoint::new(key, Vec2::Y, 1.0, 1.0, 0.0));

        world.clear();
        assert_eq!(world.body_count(), 0);
        assert!(world.joints().is_empty());
    }

    #[test]
    fn test_joint_holds_pendulum_near_anchor() {
        let mut world = PhysicsWorld::new();
        let key = world.add_body(BodyDesc::new(Shape::circle(1.0), Vec2::new(0.0, -10.0)));
        world.add_joint(JointToPoint::new(key, Vec2::ZERO, 10.0, 50.0, 1.0));

        for _ in 0..600 {
            world.step(1.0 / 60.0);
        }

        let distance = world.body_position(key).unwrap().length();
        assert!(distance < 15.0, "Pendulum drifted to {}", distance);
    }
}
