//! Immutable frame snapshots
//!
//! The simulation thread copies everything a renderer needs into a
//! [`FrameSnapshot`] after each step. Readers never touch the live world.

use testbed_math::Vec2;
use testbed_physics::{Aabb, BodyKey, Shape};

/// One body as it was at the end of a step
#[derive(Clone, Debug, PartialEq)]
pub struct BodySnapshot {
    pub key: BodyKey,
    pub position: Vec2,
    pub orientation: f64,
    pub shape: Shape,
    pub aabb: Aabb,
    pub is_static: bool,
    pub is_particle: bool,
}

impl BodySnapshot {
    /// Polygon vertices in world space (empty for circles)
    pub fn world_vertices(&self) -> Vec<Vec2> {
        self.shape.world_vertices(self.position, self.orientation)
    }
}

/// A joint reduced to the segment it draws
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointSnapshot {
    pub anchor: Vec2,
    pub attachment: Vec2,
}

/// Everything drawn for one frame
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameSnapshot {
    /// Number of steps taken when the snapshot was made
    pub step: u64,
    /// Timestep of the most recent step
    pub dt: f64,
    pub bodies: Vec<BodySnapshot>,
    /// Trail points, oldest first
    pub trails: Vec<Vec<Vec2>>,
    pub joints: Vec<JointSnapshot>,
}

impl FrameSnapshot {
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Total number of trail points across all trails
    pub fn trail_point_count(&self) -> usize {
        self.trails.iter().map(Vec::len).sum()
    }

    /// Snapshot of a single body, if it was present
    pub fn body(&self, key: BodyKey) -> Option<&BodySnapshot> {
        self.bodies.iter().find(|body| body.key == key)
    }
}
