//! The simulation step
//!
//! [`Simulation`] owns the physics world and the lifecycle tracker so that a
//! single owner performs every mutation. One step always runs in this order:
//!
//! 1. Step the dynamics world by `dt`
//! 2. Resample trails from the new positions
//! 3. Age trails and collect expired particles
//! 4. Remove the collected bodies from the world

use crate::lifecycle::{LifecycleTracker, TrailSettings};
use crate::snapshot::{BodySnapshot, FrameSnapshot, JointSnapshot};
use log::debug;
use testbed_math::Vec2;
use testbed_physics::{ParticleExplosion, PhysicsWorld};

/// Parameters for spawning a particle explosion
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExplosionParams {
    pub epicentre: Vec2,
    /// Number of particles in the ring
    pub particles: usize,
    /// Particle radius
    pub size: f64,
    pub density: f64,
    /// Distance of the ring from the epicentre
    pub distance: f64,
    /// Velocity per unit of distance from the epicentre
    pub blast_power: f64,
    /// Seconds the particles live (0.0 = forever)
    pub life_span: f64,
}

impl Default for ExplosionParams {
    fn default() -> Self {
        Self {
            epicentre: Vec2::ZERO,
            particles: 100,
            size: 1.0,
            density: 10.0,
            distance: 10.0,
            blast_power: 20.0,
            life_span: 2.0,
        }
    }
}

impl ExplosionParams {
    /// Same explosion centred somewhere else
    pub fn at(mut self, epicentre: Vec2) -> Self {
        self.epicentre = epicentre;
        self
    }
}

/// Outcome of a single step
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepReport {
    pub dt: f64,
    /// Bodies removed because their trails expired
    pub removed: usize,
}

/// A physics world together with the trails and particles tracked in it
#[derive(Clone, Debug, Default)]
pub struct Simulation {
    world: PhysicsWorld,
    tracker: LifecycleTracker,
    steps: u64,
    last_dt: f64,
}

impl Simulation {
    pub fn new(world: PhysicsWorld) -> Self {
        Self::with_tracker(world, LifecycleTracker::new())
    }

    pub fn with_tracker(world: PhysicsWorld, tracker: LifecycleTracker) -> Self {
        Self {
            world,
            tracker,
            steps: 0,
            last_dt: 0.0,
        }
    }

    /// Empty simulation whose explosions use the given particle trails
    pub fn with_particle_trails(world: PhysicsWorld, settings: TrailSettings) -> Self {
        Self::with_tracker(world, LifecycleTracker::with_particle_trails(settings))
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    pub fn tracker(&self) -> &LifecycleTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut LifecycleTracker {
        &mut self.tracker
    }

    /// Number of steps taken so far
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Advance everything by one fixed step
    pub fn step(&mut self, dt: f64) -> StepReport {
        self.world.step(dt);
        self.tracker.sample_trails(&self.world);
        let removed = self.tracker.cull_expired(&mut self.world, dt);

        self.steps += 1;
        self.last_dt = dt;
        StepReport { dt, removed }
    }

    /// Spawn a ring of particles, fling them outwards and track them as a group
    pub fn explode(&mut self, params: ExplosionParams) -> ParticleExplosion {
        let explosion = ParticleExplosion::spawn(
            &mut self.world,
            params.epicentre,
            params.particles,
            params.size,
            params.density,
            params.distance,
        );
        explosion.apply_blast_impulse(&mut self.world, params.blast_power);
        self.tracker.add_particle_group(&explosion, params.life_span);
        debug!(
            "Explosion of {} particles at ({}, {})",
            params.particles, params.epicentre.x, params.epicentre.y
        );
        explosion
    }

    /// Remove every body, joint, trail and particle group
    pub fn clear(&mut self) {
        self.world.clear();
        self.tracker.clear();
    }

    /// Copy the current state for rendering
    pub fn snapshot(&self) -> FrameSnapshot {
        let bodies = self
            .world
            .bodies()
            .map(|(key, body)| BodySnapshot {
                key,
                position: body.position,
                orientation: body.orientation(),
                shape: body.shape().clone(),
                aabb: body.aabb(),
                is_static: body.is_static(),
                is_particle: body.is_particle(),
            })
            .collect();

        let trails = self
            .tracker
            .trails()
            .iter()
            .map(|trail| trail.points().to_vec())
            .collect();

        let joints = self
            .world
            .joints()
            .iter()
            .filter_map(|joint| {
                let body = self.world.get_body(joint.body)?;
                Some(JointSnapshot {
                    anchor: joint.anchor,
                    attachment: joint.attachment_point(body),
                })
            })
            .collect();

        FrameSnapshot {
            step: self.steps,
            dt: self.last_dt,
            bodies,
            trails,
            joints,
        }
    }
}
