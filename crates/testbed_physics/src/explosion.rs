//! Particle explosions
//!
//! An explosion spawns a ring of small frictionless circles around an
//! epicentre and can fling them outwards. The bodies belong to the world;
//! the explosion only remembers their keys.

use crate::body::{BodyDesc, BodyFlags, BodyKey};
use crate::material::PhysicsMaterial;
use crate::shapes::Shape;
use crate::world::PhysicsWorld;
use testbed_math::{Mat2, Vec2};

/// A ring of particle bodies created around an epicentre
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleExplosion {
    epicentre: Vec2,
    particles: Vec<BodyKey>,
}

impl ParticleExplosion {
    /// Create `count` particles of radius `size` spaced evenly on a circle of
    /// `distance` around `epicentre`
    pub fn spawn(
        world: &mut PhysicsWorld,
        epicentre: Vec2,
        count: usize,
        size: f64,
        density: f64,
        distance: f64,
    ) -> Self {
        let separation = if count > 0 {
            std::f64::consts::TAU / count as f64
        } else {
            0.0
        };
        let rotate = Mat2::rotation(separation);
        let mut offset = Vec2::new(0.0, distance);

        let material = PhysicsMaterial::PARTICLE.with_density(density);
        let particles = (0..count)
            .map(|_| {
                let desc = BodyDesc::new(Shape::circle(size), epicentre + offset)
                    .with_material(material)
                    .with_flags(BodyFlags::PARTICLE);
                offset = rotate.mul_vec(offset);
                world.add_body(desc)
            })
            .collect();

        Self { epicentre, particles }
    }

    /// Epicentre of the explosion
    pub fn epicentre(&self) -> Vec2 {
        self.epicentre
    }

    /// Keys of the particle bodies
    pub fn particles(&self) -> &[BodyKey] {
        &self.particles
    }

    /// Set every particle's velocity to its offset from the epicentre scaled by `power`
    pub fn apply_blast_impulse(&self, world: &mut PhysicsWorld, power: f64) {
        for key in &self.particles {
            if let Some(body) = world.get_body_mut(*key) {
                body.velocity = (body.position - self.epicentre) * power;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_ring() {
        let mut world = PhysicsWorld::new();
        let explosion = ParticleExplosion::spawn(&mut world, Vec2::new(10.0, 10.0), 8, 0.5, 10.0, 2.0);

        assert_eq!(explosion.particles().len(), 8);
        assert_eq!(world.body_count(), 8);
        for key in explosion.particles() {
            let body = world.get_body(*key).unwrap();
            assert!((body.position.distance(explosion.epicentre()) - 2.0).abs() < 1e-9);
            assert!(body.is_particle());
            assert!(!body.affected_by_gravity());
            assert_eq!(body.material().restitution, 1.0);
        }
    }

    #[test]
    fn test_blast_impulse_points_outwards() {
        let mut world = PhysicsWorld::new();
        let explosion = ParticleExplosion::spawn(&mut world, Vec2::ZERO, 4, 0.5, 10.0, 1.0);
        explosion.apply_blast_impulse(&mut world, 3.0);

        for key in explosion.particles() {
            let body = world.get_body(*key).unwrap();
            assert!(body.velocity.dot(body.position) > 0.0);
            assert!((body.velocity.length() - 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_explosion() {
        let mut world = PhysicsWorld::new();
        let explosion = ParticleExplosion::spawn(&mut world, Vec2::ZERO, 0, 0.5, 10.0, 1.0);
        assert!(explosion.particles().is_empty());
        assert_eq!(world.body_count(), 0);
    }
}
