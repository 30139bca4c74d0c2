//! Rigid body types for 2D physics simulation

use bitflags::bitflags;
use crate::material::PhysicsMaterial;
use crate::shapes::{Aabb, Shape, ShapeKind};
use testbed_math::Vec2;
use slotmap::new_key_type;

// Define generational key type for rigid bodies
new_key_type! {
    /// Key to a rigid body in the physics world
    ///
    /// Uses generational indexing so a key held by a trail or particle group
    /// never aliases a different body after its own body has been removed.
    pub struct BodyKey;
}

bitflags! {
    /// Behaviour switches for a body
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct BodyFlags: u32 {
        /// Gravity accelerates this body
        const AFFECTED_BY_GRAVITY = 1 << 0;
        /// Explosion debris; particles never collide with each other
        const PARTICLE = 1 << 1;
    }
}

impl Default for BodyFlags {
    fn default() -> Self {
        BodyFlags::AFFECTED_BY_GRAVITY
    }
}

/// Descriptor for a body to be inserted into the world
///
/// # Example
/// ```
/// use testbed_physics::{BodyDesc, Shape};
/// use testbed_math::Vec2;
///
/// let desc = BodyDesc::new(Shape::rectangle(10.0, 10.0), Vec2::new(0.0, 50.0))
///     .with_density(0.0)
///     .with_orientation(0.5);
/// assert!(desc.material.is_static());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BodyDesc {
    pub shape: Shape,
    pub position: Vec2,
    /// Orientation in radians
    pub orientation: f64,
    pub velocity: Vec2,
    pub material: PhysicsMaterial,
    pub flags: BodyFlags,
    /// Quadratic drag coefficient
    pub linear_damping: f64,
}

impl BodyDesc {
    /// Create a descriptor with default material at the given position
    pub fn new(shape: Shape, position: Vec2) -> Self {
        Self {
            shape,
            position,
            orientation: 0.0,
            velocity: Vec2::ZERO,
            material: PhysicsMaterial::default(),
            flags: BodyFlags::default(),
            linear_damping: 0.0,
        }
    }

    /// Set the orientation in radians
    pub fn with_orientation(mut self, radians: f64) -> Self {
        self.orientation = radians;
        self
    }

    /// Set the initial velocity
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Replace the whole material
    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    /// Set the density (0.0 = static)
    pub fn with_density(mut self, density: f64) -> Self {
        self.material = self.material.with_density(density);
        self
    }

    /// Set the restitution (clamped to [0.0, 1.0])
    pub fn with_restitution(mut self, restitution: f64) -> Self {
        self.material.restitution = restitution.clamp(0.0, 1.0);
        self
    }

    /// Set both friction coefficients
    pub fn with_friction(mut self, static_friction: f64, dynamic_friction: f64) -> Self {
        self.material.static_friction = static_friction.max(0.0);
        self.material.dynamic_friction = dynamic_friction.max(0.0);
        self
    }

    /// Replace the behaviour flags
    pub fn with_flags(mut self, flags: BodyFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set the quadratic drag coefficient
    pub fn with_linear_damping(mut self, damping: f64) -> Self {
        self.linear_damping = damping.max(0.0);
        self
    }

    /// Bounding box this body would have in world space
    pub fn aabb(&self) -> Aabb {
        self.shape.local_aabb(self.orientation).translated(self.position)
    }
}

/// A 2D rigid body owned by the physics world
#[derive(Clone, Debug)]
pub struct RigidBody2D {
    /// Position in world coordinates
    pub position: Vec2,
    /// Velocity (units per second)
    pub velocity: Vec2,
    /// Angular velocity (radians per second)
    pub angular_velocity: f64,
    /// Quadratic drag coefficient
    pub linear_damping: f64,
    /// Behaviour flags
    pub flags: BodyFlags,
    shape: Shape,
    orientation: f64,
    material: PhysicsMaterial,
    mass: f64,
    inv_mass: f64,
    inertia: f64,
    inv_inertia: f64,
    /// Cached local bounding box for the current orientation
    local_aabb: Aabb,
}

impl RigidBody2D {
    /// Create a body from a descriptor
    pub fn from_desc(desc: BodyDesc) -> Self {
        let local_aabb = desc.shape.local_aabb(desc.orientation);
        let mut body = Self {
            position: desc.position,
            velocity: desc.velocity,
            angular_velocity: 0.0,
            linear_damping: desc.linear_damping,
            flags: desc.flags,
            shape: desc.shape,
            orientation: desc.orientation,
            material: desc.material,
            mass: 0.0,
            inv_mass: 0.0,
            inertia: 0.0,
            inv_inertia: 0.0,
            local_aabb,
        };
        body.recompute_mass();
        body
    }

    /// The body's shape in local space
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Shape-kind query
    pub fn shape_kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    /// Orientation in radians
    pub fn orientation(&self) -> f64 {
        self.orientation
    }

    /// Material parameters
    pub fn material(&self) -> &PhysicsMaterial {
        &self.material
    }

    /// Mass (0.0 for static bodies)
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Inverse mass (0.0 for static bodies)
    pub fn inv_mass(&self) -> f64 {
        self.inv_mass
    }

    /// Inverse moment of inertia (0.0 for static bodies)
    pub fn inv_inertia(&self) -> f64 {
        self.inv_inertia
    }

    /// Moment of inertia
    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Whether the body is static (zero density)
    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    /// Whether the body is explosion debris
    pub fn is_particle(&self) -> bool {
        self.flags.contains(BodyFlags::PARTICLE)
    }

    /// Whether gravity applies to this body
    pub fn affected_by_gravity(&self) -> bool {
        self.flags.contains(BodyFlags::AFFECTED_BY_GRAVITY)
    }

    /// Bounding box in world space
    pub fn aabb(&self) -> Aabb {
        self.local_aabb.translated(self.position)
    }

    /// Set the density; zero or negative makes the body static
    pub fn set_density(&mut self, density: f64) {
        self.material = self.material.with_density(density);
        self.recompute_mass();
        if self.is_static() {
            self.velocity = Vec2::ZERO;
            self.angular_velocity = 0.0;
        }
    }

    /// Set the restitution (clamped to [0.0, 1.0])
    pub fn set_restitution(&mut self, restitution: f64) {
        self.material.restitution = restitution.clamp(0.0, 1.0);
    }

    /// Set the static friction coefficient
    pub fn set_static_friction(&mut self, friction: f64) {
        self.material.static_friction = friction.max(0.0);
    }

    /// Set the dynamic friction coefficient
    pub fn set_dynamic_friction(&mut self, friction: f64) {
        self.material.dynamic_friction = friction.max(0.0);
    }

    /// Set the orientation and refresh the cached bounding box
    pub fn set_orientation(&mut self, radians: f64) {
        self.orientation = radians;
        self.local_aabb = self.shape.local_aabb(radians);
    }

    /// Apply an impulse at a point relative to the centre of mass
    pub fn apply_impulse(&mut self, impulse: Vec2, contact: Vec2) {
        self.velocity += impulse * self.inv_mass;
        self.angular_velocity += self.inv_inertia * contact.cross(impulse);
    }

    /// Polygon vertices in world space (empty for circles)
    pub fn world_vertices(&self) -> Vec<Vec2> {
        self.shape.world_vertices(self.position, self.orientation)
    }

    fn recompute_mass(&mut self) {
        let density = self.material.density;
        if density > 0.0 {
            self.mass = self.shape.area() * density;
            self.inertia = self.shape.inertia(density);
        } else {
            self.mass = 0.0;
            self.inertia = 0.0;
        }
        self.inv_mass = if self.mass != 0.0 { 1.0 / self.mass } else { 0.0 };
        self.inv_inertia = if self.inertia != 0.0 { 1.0 / self.inertia } else { 0.0 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desc_defaults() {
        let desc = BodyDesc::new(Shape::circle(1.0), Vec2::new(1.0, 2.0));
        assert_eq!(desc.orientation, 0.0);
        assert_eq!(desc.velocity, Vec2::ZERO);
        assert_eq!(desc.material, PhysicsMaterial::default());
        assert!(desc.flags.contains(BodyFlags::AFFECTED_BY_GRAVITY));
        assert!(!desc.flags.contains(BodyFlags::PARTICLE));
    }

    #[test]
    fn test_desc_builder_methods() {
        let desc = BodyDesc::new(Shape::circle(1.0), Vec2::ZERO)
            .with_orientation(1.0)
            .with_velocity(Vec2::new(3.0, 0.0))
            .with_density(2.0)
            .with_restitution(1.5)
            .with_friction(0.0, 0.0)
            .with_flags(BodyFlags::PARTICLE)
            .with_linear_damping(0.1);

        assert_eq!(desc.orientation, 1.0);
        assert_eq!(desc.velocity, Vec2::new(3.0, 0.0));
        assert_eq!(desc.material.density, 2.0);
        assert_eq!(desc.material.restitution, 1.0);
        assert_eq!(desc.material.static_friction, 0.0);
        assert_eq!(desc.flags, BodyFlags::PARTICLE);
        assert_eq!(desc.linear_damping, 0.1);
    }

    #[test]
    fn test_mass_from_density() {
        let body = RigidBody2D::from_desc(
            BodyDesc::new(Shape::rectangle(1.0, 2.0), Vec2::ZERO).with_density(3.0),
        );
        // Area 2 * 4 = 8, density 3
        assert!((body.mass() - 24.0).abs() < 1e-9);
        assert!((body.inv_mass() - 1.0 / 24.0).abs() < 1e-12);
        assert!(body.inertia() > 0.0);
        assert!(!body.is_static());
    }

    #[test]
    fn test_zero_density_is_static() {
        let mut body = RigidBody2D::from_desc(
            BodyDesc::new(Shape::circle(2.0), Vec2::ZERO).with_velocity(Vec2::X),
        );
        assert!(!body.is_static());

        body.set_density(0.0);
        assert!(body.is_static());
        assert_eq!(body.mass(), 0.0);
        assert_eq!(body.inv_inertia(), 0.0);
        assert_eq!(body.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_set_orientation_updates_aabb() {
        let mut body = RigidBody2D::from_desc(
            BodyDesc::new(Shape::rectangle(10.0, 1.0), Vec2::new(5.0, 5.0)),
        );
        assert!((body.aabb().max.x - 15.0).abs() < 1e-9);

        body.set_orientation(std::f64::consts::FRAC_PI_2);
        assert!((body.aabb().max.x - 6.0).abs() < 1e-9);
        assert!((body.aabb().max.y - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_material_setters() {
        let mut body = RigidBody2D::from_desc(BodyDesc::new(Shape::circle(1.0), Vec2::ZERO));
        body.set_restitution(-1.0);
        body.set_static_friction(0.7);
        body.set_dynamic_friction(0.6);
        assert_eq!(body.material().restitution, 0.0);
        assert_eq!(body.material().static_friction, 0.7);
        assert_eq!(body.material().dynamic_friction, 0.6);
    }

    #[test]
    fn test_apply_impulse() {
        let mut body = RigidBody2D::from_desc(
            BodyDesc::new(Shape::rectangle(0.5, 0.5), Vec2::ZERO).with_density(1.0),
        );
        // Mass 1 → velocity change equals impulse
        body.apply_impulse(Vec2::new(2.0, 0.0), Vec2::ZERO);
        assert!((body.velocity.x - 2.0).abs() < 1e-9);
        assert_eq!(body.angular_velocity, 0.0);

        body.apply_impulse(Vec2::new(0.0, 1.0), Vec2::new(0.5, 0.0));
        assert!(body.angular_velocity > 0.0);
    }

    #[test]
    fn test_shape_kind_query() {
        let body = RigidBody2D::from_desc(BodyDesc::new(Shape::regular_polygon(3.0, 5), Vec2::ZERO));
        assert_eq!(body.shape_kind(), ShapeKind::Polygon);
        assert_eq!(body.world_vertices().len(), 5);
    }
}
