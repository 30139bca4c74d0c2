//! Trail and particle lifecycle tracking
//!
//! The tracker samples every trail once per simulation step and removes
//! expired trails together with their bodies. Bodies that belong to a
//! particle group are only ever removed as a whole group.

use std::collections::HashSet;

use crate::trail::Trail;
use log::debug;
use testbed_physics::{BodyKey, ParticleExplosion, PhysicsWorld};

/// Trail shape used for explosion particles
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailSettings {
    /// Number of points each particle trail keeps
    pub points: usize,
    /// Steps skipped between samples
    pub skip_interval: u32,
}

impl Default for TrailSettings {
    fn default() -> Self {
        Self {
            points: 1000,
            skip_interval: 1,
        }
    }
}

/// Bodies removed from the world as one unit
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleGroup {
    bodies: Vec<BodyKey>,
}

impl ParticleGroup {
    pub fn new(bodies: Vec<BodyKey>) -> Self {
        Self { bodies }
    }

    pub fn bodies(&self) -> &[BodyKey] {
        &self.bodies
    }

    pub fn contains(&self, key: BodyKey) -> bool {
        self.bodies.contains(&key)
    }
}

/// Owns trails and particle groups for the bodies of one world
#[derive(Clone, Debug, Default)]
pub struct LifecycleTracker {
    trails: Vec<Trail>,
    groups: Vec<ParticleGroup>,
    particle_trails: TrailSettings,
}

impl LifecycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tracker whose particle groups use the given trail settings
    pub fn with_particle_trails(settings: TrailSettings) -> Self {
        Self {
            particle_trails: settings,
            ..Self::default()
        }
    }

    pub fn particle_trail_settings(&self) -> TrailSettings {
        self.particle_trails
    }

    /// Track a trail
    pub fn add_trail(&mut self, trail: Trail) {
        self.trails.push(trail);
    }

    /// Track an explosion's particles as one group, each with its own trail
    pub fn add_particle_group(&mut self, explosion: &ParticleExplosion, life_span: f64) {
        let settings = self.particle_trails;
        for &key in explosion.particles() {
            self.trails
                .push(Trail::new(settings.points, settings.skip_interval, key, life_span));
        }
        self.groups
            .push(ParticleGroup::new(explosion.particles().to_vec()));
    }

    pub fn trails(&self) -> &[Trail] {
        &self.trails
    }

    pub fn groups(&self) -> &[ParticleGroup] {
        &self.groups
    }

    /// Drop all trails and groups without touching the world
    pub fn clear(&mut self) {
        self.trails.clear();
        self.groups.clear();
    }

    /// Sample and then cull; equivalent to [`Self::sample_trails`] followed
    /// by [`Self::cull_expired`]
    pub fn update(&mut self, world: &mut PhysicsWorld, dt: f64) -> usize {
        self.sample_trails(world);
        self.cull_expired(world, dt)
    }

    /// Let every trail record the current position of its body
    pub fn sample_trails(&mut self, world: &PhysicsWorld) {
        for trail in &mut self.trails {
            trail.update(world);
        }
    }

    /// Age all trails by `dt` and remove the expired ones with their bodies
    ///
    /// Returns the number of bodies removed from the world.
    pub fn cull_expired(&mut self, world: &mut PhysicsWorld, dt: f64) -> usize {
        let mut expired = Vec::new();
        self.trails.retain_mut(|trail| {
            if trail.check_lifespan(dt) {
                expired.push(trail.body());
                false
            } else {
                true
            }
        });
        if expired.is_empty() {
            return 0;
        }

        let mut doomed: HashSet<BodyKey> = expired.iter().copied().collect();
        let mut groups_removed = 0;
        self.groups.retain(|group| {
            if expired.iter().any(|&key| group.contains(key)) {
                doomed.extend(group.bodies().iter().copied());
                groups_removed += 1;
                false
            } else {
                true
            }
        });

        // A group member's trail goes with its group even if it has not expired
        self.trails.retain(|trail| !doomed.contains(&trail.body()));

        let mut removed = 0;
        for key in doomed {
            if world.remove_body(key).is_some() {
                removed += 1;
            } else {
                debug!("Body {:?} already gone from the world", key);
            }
        }

        debug!(
            "Culled {} expired trails, {} particle groups, {} bodies",
            expired.len(),
            groups_removed,
            removed
        );
        removed
    }
}
