//! Projection of frame snapshots into screen space
//!
//! A drawing backend only has to stroke what [`project_frame`] returns: every
//! coordinate in a [`ScreenFrame`] is already in pixels.

use crate::viewport::Viewport;
use testbed_core::{BodySnapshot, FrameSnapshot};
use testbed_math::Vec2;
use testbed_physics::Shape;

/// Shape outline in screen space
#[derive(Clone, Debug, PartialEq)]
pub enum ScreenShape {
    Circle {
        centre: Vec2,
        radius: f64,
        /// End of the line from the centre that shows the orientation
        marker: Vec2,
    },
    Polygon { points: Vec<Vec2> },
}

/// Axis-aligned rectangle in screen space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenRect {
    pub top_left: Vec2,
    pub size: Vec2,
}

impl ScreenRect {
    /// Whether any part of the rectangle lies within `width` x `height`
    pub fn intersects_screen(&self, width: f64, height: f64) -> bool {
        let bottom_right = self.top_left + self.size;
        bottom_right.x >= 0.0 && bottom_right.y >= 0.0 && self.top_left.x <= width && self.top_left.y <= height
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScreenBody {
    pub shape: ScreenShape,
    pub bounds: ScreenRect,
    pub is_static: bool,
    pub is_particle: bool,
}

/// Everything to draw for one frame, in pixels
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScreenFrame {
    pub step: u64,
    pub bodies: Vec<ScreenBody>,
    pub trails: Vec<Vec<Vec2>>,
    /// Joint segments from anchor to attachment point
    pub joints: Vec<(Vec2, Vec2)>,
}

impl ScreenFrame {
    /// Number of bodies at least partly inside the viewport's display
    pub fn visible_bodies(&self, viewport: &Viewport) -> usize {
        let (width, height) = (viewport.display_width(), viewport.screen_height());
        self.bodies
            .iter()
            .filter(|body| body.bounds.intersects_screen(width, height))
            .count()
    }
}

/// Project a whole snapshot through the viewport
pub fn project_frame(snapshot: &FrameSnapshot, viewport: &Viewport) -> ScreenFrame {
    ScreenFrame {
        step: snapshot.step,
        bodies: snapshot
            .bodies
            .iter()
            .map(|body| project_body(body, viewport))
            .collect(),
        trails: snapshot
            .trails
            .iter()
            .map(|trail| trail.iter().map(|&p| viewport.world_to_screen(p)).collect())
            .collect(),
        joints: snapshot
            .joints
            .iter()
            .map(|joint| {
                (
                    viewport.world_to_screen(joint.anchor),
                    viewport.world_to_screen(joint.attachment),
                )
            })
            .collect(),
    }
}

fn project_body(body: &BodySnapshot, viewport: &Viewport) -> ScreenBody {
    let shape = match &body.shape {
        Shape::Circle { radius } => {
            let direction = Vec2::new(body.orientation.cos(), body.orientation.sin());
            ScreenShape::Circle {
                centre: viewport.world_to_screen(body.position),
                radius: viewport.scale_length(*radius),
                marker: viewport.world_to_screen(body.position + direction * *radius),
            }
        }
        Shape::Polygon { .. } => ScreenShape::Polygon {
            points: body
                .world_vertices()
                .into_iter()
                .map(|p| viewport.world_to_screen(p))
                .collect(),
        },
    };

    // World max y is the top of the screen rectangle
    let top_left = viewport.world_to_screen(Vec2::new(body.aabb.min.x, body.aabb.max.y));
    let bottom_right = viewport.world_to_screen(Vec2::new(body.aabb.max.x, body.aabb.min.y));

    ScreenBody {
        shape,
        bounds: ScreenRect {
            top_left,
            size: bottom_right - top_left,
        },
        is_static: body.is_static,
        is_particle: body.is_particle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use testbed_core::{BodyDesc, PhysicsWorld, Simulation, Trail};
    use testbed_physics::JointToPoint;

    fn snapshot() -> FrameSnapshot {
        let mut world = PhysicsWorld::new();
        let ball = world.add_body(BodyDesc::new(Shape::circle(10.0), Vec2::ZERO));
        world.add_body(BodyDesc::new(Shape::rectangle(20.0, 10.0), Vec2::new(5000.0, 0.0)));
        world.add_joint(JointToPoint::new(ball, Vec2::new(0.0, 100.0), 100.0, 1.0, 0.0));
        let mut sim = Simulation::new(world);
        sim.tracker_mut().add_trail(Trail::new(8, 0, ball, 0.0));
        sim.step(0.0);
        sim.snapshot()
    }

    #[test]
    fn test_circle_projection() {
        let viewport = Viewport::new(800, 400).unwrap();
        let frame = project_frame(&snapshot(), &viewport);

        match &frame.bodies[0].shape {
            ScreenShape::Circle { centre, radius, marker } => {
                assert_relative_eq!(centre.x, 400.0, epsilon = 1e-9);
                assert_relative_eq!(centre.y, 200.0, epsilon = 1e-9);
                assert_relative_eq!(*radius, viewport.scale_length(10.0), epsilon = 1e-12);
                assert!(marker.x > centre.x);
            }
            other => panic!("Expected a circle, got {:?}", other),
        }
        let bounds = frame.bodies[0].bounds;
        assert_relative_eq!(bounds.size.x, 2.0 * viewport.scale_length(10.0), epsilon = 1e-9);
        assert!(bounds.size.y > 0.0);
    }

    #[test]
    fn test_polygons_trails_and_joints() {
        let viewport = Viewport::new(800, 400).unwrap();
        let frame = project_frame(&snapshot(), &viewport);

        match &frame.bodies[1].shape {
            ScreenShape::Polygon { points } => assert_eq!(points.len(), 4),
            other => panic!("Expected a polygon, got {:?}", other),
        }
        assert_eq!(frame.trails.len(), 1);
        assert_eq!(frame.trails[0].len(), 1);
        assert_eq!(frame.joints.len(), 1);
        // Anchor is above the ball, so higher up the screen
        assert!(frame.joints[0].0.y < frame.joints[0].1.y);
    }

    #[test]
    fn test_visible_bodies() {
        let viewport = Viewport::new(800, 400).unwrap();
        let frame = project_frame(&snapshot(), &viewport);
        assert_eq!(frame.bodies.len(), 2);
        assert_eq!(frame.visible_bodies(&viewport), 1);
    }
}
