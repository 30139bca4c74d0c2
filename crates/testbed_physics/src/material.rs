//! Physical material properties of a body

/// Physical material properties
///
/// A density of zero marks a body as static: it gets zero mass and the
/// integrator leaves it where it is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsMaterial {
    /// Mass per unit area (0.0 = static)
    pub density: f64,
    /// Restitution/bounciness (0.0 = no bounce, 1.0 = perfect bounce)
    pub restitution: f64,
    /// Friction resisting the start of sliding
    pub static_friction: f64,
    /// Friction while sliding
    pub dynamic_friction: f64,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            density: 1.0,
            restitution: 0.8,
            static_friction: 0.5,
            dynamic_friction: 0.2,
        }
    }
}

impl PhysicsMaterial {
    /// Immovable scenery
    pub const STATIC: Self = Self {
        density: 0.0,
        restitution: 0.8,
        static_friction: 0.5,
        dynamic_friction: 0.2,
    };

    /// Frictionless surface
    pub const ICE: Self = Self {
        density: 1.0,
        restitution: 0.8,
        static_friction: 0.0,
        dynamic_friction: 0.0,
    };

    /// Light, barely bouncing blocks that stack without jitter
    pub const PILLAR: Self = Self {
        density: 0.2,
        restitution: 0.2,
        static_friction: 0.5,
        dynamic_friction: 0.2,
    };

    /// Perfectly elastic, frictionless explosion debris
    pub const PARTICLE: Self = Self {
        density: 1.0,
        restitution: 1.0,
        static_friction: 0.0,
        dynamic_friction: 0.0,
    };

    /// Create a new material
    ///
    /// Negative densities are treated as static; restitution is clamped
    /// to [0.0, 1.0] and frictions to be non-negative.
    pub fn new(density: f64, restitution: f64, static_friction: f64, dynamic_friction: f64) -> Self {
        Self {
            density: density.max(0.0),
            restitution: restitution.clamp(0.0, 1.0),
            static_friction: static_friction.max(0.0),
            dynamic_friction: dynamic_friction.max(0.0),
        }
    }

    /// Copy of this material with a different density
    pub fn with_density(mut self, density: f64) -> Self {
        self.density = density.max(0.0);
        self
    }

    /// Whether a body made of this material is static
    pub fn is_static(&self) -> bool {
        self.density <= 0.0
    }

    /// Scale both friction coefficients by a ratio
    pub fn scaled_friction(mut self, ratio: f64) -> Self {
        self.static_friction = (self.static_friction * ratio).max(0.0);
        self.dynamic_friction = (self.dynamic_friction * ratio).max(0.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_material() {
        let material = PhysicsMaterial::default();
        assert_eq!(material.density, 1.0);
        assert_eq!(material.restitution, 0.8);
        assert_eq!(material.static_friction, 0.5);
        assert_eq!(material.dynamic_friction, 0.2);
        assert!(!material.is_static());
    }

    #[test]
    fn test_new_clamps_values() {
        let material = PhysicsMaterial::new(-1.0, 1.5, -0.5, 0.3);
        assert_eq!(material.density, 0.0);
        assert_eq!(material.restitution, 1.0);
        assert_eq!(material.static_friction, 0.0);
        assert_eq!(material.dynamic_friction, 0.3);
        assert!(material.is_static());
    }

    #[test]
    fn test_preset_constants() {
        assert!(PhysicsMaterial::STATIC.is_static());
        assert_eq!(PhysicsMaterial::ICE.static_friction, 0.0);
        assert_eq!(PhysicsMaterial::PILLAR.restitution, 0.2);
        assert_eq!(PhysicsMaterial::PILLAR.density, 0.2);
        assert_eq!(PhysicsMaterial::PARTICLE.restitution, 1.0);
    }

    #[test]
    fn test_scaled_friction() {
        let scaled = PhysicsMaterial::default().scaled_friction(0.5);
        assert_eq!(scaled.static_friction, 0.25);
        assert_eq!(scaled.dynamic_friction, 0.1);
        assert_eq!(scaled.restitution, 0.8);
    }
}
