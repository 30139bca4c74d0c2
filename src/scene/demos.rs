//! Named demo scenes
//!
//! Each demo builds a fresh [`Simulation`] and says where the camera should
//! look. Loading never touches a running loop; the caller hands the result
//! over as a whole.

use std::fmt;

use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};
use testbed_core::{
    scale_friction, set_ice, BodyDesc, PhysicsWorld, SceneGenerationError, SceneGenerator,
    Shape, Simulation, Vec2,
};
use testbed_physics::{JointToPoint, PhysicsMaterial};

use crate::config::AppConfig;

/// How many times the raycast box is regenerated before giving up
const RAYCAST_BOX_RETRIES: usize = 16;

/// Per-body parameter steps for the side-by-side comparison demos
const GRADIENT: [f64; 6] = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];

/// Drag coefficient of the most damped ball in the drag demo
const MAX_DRAG: f64 = 2.0;

/// Where the viewport looks when a demo starts
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraSetup {
    pub centre: Vec2,
    pub zoom: f64,
}

impl CameraSetup {
    pub fn new(centre: Vec2, zoom: f64) -> Self {
        Self { centre, zoom }
    }
}

/// A loaded demo ready to be handed to the simulation loop
#[derive(Debug)]
pub struct DemoScene {
    pub demo: Demo,
    pub camera: CameraSetup,
    pub simulation: Simulation,
}

/// Demos selectable from the testbed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Demo {
    /// Random circles and polygons dropped into a container
    MixedShapes,
    /// A wall of boxes with heavy boxes on top
    StackedObjects,
    /// A row of pendulums with one raised to swing in
    NewtonsCradle,
    /// Shelves and stacks to blow up with particle explosions
    ParticleExplosion,
    /// A frozen box of random obstacles around the origin
    Raycast,
    /// A five floor tower on the ground
    Tower,
    /// A ten tier pyramid on the ground
    Pyramid,
    /// A perfectly elastic ball above a platform
    BouncyBall,
    /// A heavy ball on a slack joint swung into a wall of boxes
    WreckingBall,
    /// Boxes on identical ramps with increasing friction
    Friction,
    /// Frictionless balls with increasing restitution
    Restitution,
    /// Balls with increasing drag falling side by side
    Drag,
}

impl Demo {
    pub const ALL: [Demo; 12] = [
        Demo::MixedShapes,
        Demo::StackedObjects,
        Demo::NewtonsCradle,
        Demo::ParticleExplosion,
        Demo::Raycast,
        Demo::Tower,
        Demo::Pyramid,
        Demo::BouncyBall,
        Demo::WreckingBall,
        Demo::Friction,
        Demo::Restitution,
        Demo::Drag,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Demo::MixedShapes => "Mixed Shapes",
            Demo::StackedObjects => "Stacked Objects",
            Demo::NewtonsCradle => "Newtons Cradle",
            Demo::ParticleExplosion => "Particle Explosions",
            Demo::Raycast => "Raycast",
            Demo::Tower => "Tower",
            Demo::Pyramid => "Pyramid",
            Demo::BouncyBall => "Bouncy Ball",
            Demo::WreckingBall => "Wrecking Ball",
            Demo::Friction => "Friction",
            Demo::Restitution => "Restitution",
            Demo::Drag => "Drag",
        }
    }

    /// Whether a click in this demo sets off a particle explosion
    pub fn explodes_on_click(&self) -> bool {
        matches!(self, Demo::ParticleExplosion)
    }

    /// Build this demo's scene
    pub fn load<R: Rng>(
        &self,
        generator: &mut SceneGenerator<R>,
        config: &AppConfig,
    ) -> Result<DemoScene, SceneGenerationError> {
        let mut world = PhysicsWorld::with_config(config.physics.to_physics_config());

        let camera = match self {
            Demo::MixedShapes => {
                add_static(&mut world, Shape::rectangle(15.0, 100.0), Vec2::new(-300.0, 0.0));
                add_static(&mut world, Shape::rectangle(15.0, 100.0), Vec2::new(300.0, 0.0));
                add_static(&mut world, Shape::rectangle(315.0, 15.0), Vec2::new(0.0, -115.0));
                generator.populate_random(
                    &mut world,
                    Vec2::new(-280.0, -100.0),
                    Vec2::new(280.0, 800.0),
                    30,
                    80,
                )?;
                CameraSetup::new(Vec2::new(0.0, 200.0), 2.2)
            }
            Demo::StackedObjects => {
                let block = Shape::rectangle(10.0, 10.0);
                for x in 0..15 {
                    for y in 0..20 {
                        let position = Vec2::new(-140.0 + x as f64 * 20.0, -100.0 + y as f64 * 20.0);
                        world.add_body(BodyDesc::new(block.clone(), position));
                    }
                }
                for x in 0..15 {
                    let position = Vec2::new(-140.0 + x as f64 * 20.0, 400.0);
                    world.add_body(BodyDesc::new(block.clone(), position).with_density(10.0));
                }
                add_static(&mut world, Shape::rectangle(150.0, 10.0), Vec2::new(0.0, -120.0));
                CameraSetup::new(Vec2::new(0.0, 150.0), 1.8)
            }
            Demo::NewtonsCradle => {
                build_cradle(&mut world);
                CameraSetup::new(Vec2::ZERO, 2.0)
            }
            Demo::ParticleExplosion => {
                generator.build_explosion_range(&mut world);
                CameraSetup::new(Vec2::new(0.0, 300.0), 2.0)
            }
            Demo::Raycast => {
                build_raycast_box(generator, &mut world, RAYCAST_BOX_RETRIES)?;
                CameraSetup::new(Vec2::new(-100.0, -20.0), 3.3)
            }
            Demo::Tower => {
                add_ground(&mut world);
                generator.build_tower(&mut world, 5, 0.0, -40.0);
                scale_friction(&mut world, 0.4);
                CameraSetup::new(Vec2::new(0.0, 100.0), 1.3)
            }
            Demo::Pyramid => {
                add_ground(&mut world);
                generator.build_pyramid(&mut world, 10, 1500.0, -40.0);
                CameraSetup::new(Vec2::new(1850.0, 300.0), 2.0)
            }
            Demo::BouncyBall => {
                world.add_body(BodyDesc::new(Shape::circle(20.0), Vec2::new(0.0, 200.0)).with_restitution(1.0));
                add_static(&mut world, Shape::rectangle(600.0, 20.0), Vec2::new(0.0, -300.0));
                CameraSetup::new(Vec2::ZERO, 2.0)
            }
            Demo::WreckingBall => {
                build_wrecking_ball(&mut world);
                CameraSetup::new(Vec2::new(0.0, 100.0), 1.7)
            }
            Demo::Friction => {
                build_friction_ramps(&mut world);
                CameraSetup::new(Vec2::ZERO, 2.0)
            }
            Demo::Restitution => {
                for (i, restitution) in GRADIENT.iter().enumerate() {
                    let position = Vec2::new(-250.0 + i as f64 * 100.0, 200.0);
                    world.add_body(BodyDesc::new(Shape::circle(15.0), position).with_restitution(*restitution));
                }
                add_static(&mut world, Shape::rectangle(350.0, 10.0), Vec2::new(0.0, -100.0));
                // Spin from friction would muddy the bounce heights
                set_ice(&mut world);
                CameraSetup::new(Vec2::new(0.0, 50.0), 1.5)
            }
            Demo::Drag => {
                for (i, gradient) in GRADIENT.iter().enumerate() {
                    let position = Vec2::new(-250.0 + i as f64 * 100.0, 300.0);
                    world.add_body(
                        BodyDesc::new(Shape::circle(15.0), position).with_linear_damping(gradient * MAX_DRAG),
                    );
                }
                add_static(&mut world, Shape::rectangle(350.0, 10.0), Vec2::new(0.0, -100.0));
                CameraSetup::new(Vec2::new(0.0, 100.0), 1.5)
            }
        };

        info!("Loaded demo '{}' with {} bodies", self.name(), world.body_count());
        Ok(DemoScene {
            demo: *self,
            camera,
            simulation: Simulation::with_particle_trails(world, config.trails.to_trail_settings()),
        })
    }
}

impl fmt::Display for Demo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn add_static(world: &mut PhysicsWorld, shape: Shape, position: Vec2) {
    world.add_body(BodyDesc::new(shape, position).with_material(PhysicsMaterial::STATIC));
}

fn add_ground(world: &mut PhysicsWorld) {
    add_static(world, Shape::rectangle(10000.0, 2000.0), Vec2::new(0.0, -2040.0));
}

fn build_cradle(world: &mut PhysicsWorld) {
    let radius = 40.0;
    let spacing = radius * 2.0;
    let count = 8;
    let spread = (count - 1) as f64 * spacing / 2.0;
    let min_x = -spread + radius;

    let ball = PhysicsMaterial::new(1.0, 1.0, 0.0, 0.0);
    let hang = |world: &mut PhysicsWorld, anchor_x: f64, position: Vec2| {
        let key = world.add_body(BodyDesc::new(Shape::circle(radius), position).with_material(ball));
        world.add_joint(
            JointToPoint::new(key, Vec2::new(anchor_x, 200.0), 300.0, 2000.0, 100.0).with_slack(true),
        );
    };

    for i in 0..count {
        let x = min_x + i as f64 * spacing;
        hang(world, x, Vec2::new(x, -100.0));
    }
    let raised_anchor = min_x - spacing;
    hang(world, raised_anchor, Vec2::new(raised_anchor - 300.0, 200.0));
}

fn build_wrecking_ball(world: &mut PhysicsWorld) {
    let block = Shape::rectangle(10.0, 10.0);
    for x in 0..10 {
        for y in 0..10 {
            let position = Vec2::new(110.0 + x as f64 * 20.0, y as f64 * 20.0);
            world.add_body(BodyDesc::new(block.clone(), position));
        }
    }
    add_static(world, Shape::rectangle(100.0, 10.0), Vec2::new(200.0, -20.0));

    let radius = 40.0;
    let ball = world.add_body(BodyDesc::new(Shape::circle(radius), Vec2::new(-250.0, 320.0)).with_density(2.0));
    // Hooked at the top of the ball
    world.add_joint(
        JointToPoint::new(ball, Vec2::new(0.0, 320.0), 250.0, 200.0, 100.0)
            .with_slack(true)
            .with_offset(Vec2::new(0.0, radius)),
    );
}

/// Four identical ramps, each with a box that grips harder than the last
fn build_friction_ramps(world: &mut PhysicsWorld) {
    let slope = 0.35;
    let frictions = [0.2, 0.5, 1.0];
    add_static(world, Shape::rectangle(700.0, 10.0), Vec2::new(0.0, -150.0));

    for lane in 0..4 {
        let x = -450.0 + lane as f64 * 300.0;
        world.add_body(
            BodyDesc::new(Shape::rectangle(120.0, 5.0), Vec2::new(x, 0.0))
                .with_orientation(slope)
                .with_material(PhysicsMaterial::STATIC),
        );

        let block = BodyDesc::new(Shape::rectangle(10.0, 10.0), Vec2::new(x + 80.0, 50.0)).with_orientation(slope);
        let block = match lane {
            0 => block.with_material(PhysicsMaterial::ICE),
            n => {
                let friction = frictions[n - 1];
                block.with_friction(friction, friction * 0.8)
            }
        };
        world.add_body(block);
    }
}

/// Regenerate the frozen box until no obstacle covers the origin
fn build_raycast_box<R: Rng>(
    generator: &mut SceneGenerator<R>,
    world: &mut PhysicsWorld,
    retries: usize,
) -> Result<(), SceneGenerationError> {
    let mut last_error = None;
    for _ in 0..retries {
        world.clear();
        match generator.populate_box(world) {
            Ok(()) => {
                if !world.bodies().any(|(_, body)| body.aabb().contains(Vec2::ZERO)) {
                    return Ok(());
                }
            }
            Err(e) => last_error = Some(e),
        }
    }
    Err(last_error.unwrap_or(SceneGenerationError::RetriesExhausted { retries }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(demo: Demo) -> DemoScene {
        let mut generator = SceneGenerator::from_seed(5);
        demo.load(&mut generator, &AppConfig::default()).unwrap()
    }

    #[test]
    fn test_every_demo_loads() {
        for demo in Demo::ALL {
            let scene = load(demo);
            assert_eq!(scene.demo, demo);
            assert!(scene.simulation.world().body_count() > 0, "{} is empty", demo);
            assert!(scene.camera.zoom > 0.0);
        }
    }

    #[test]
    fn test_stacked_objects_layout() {
        let scene = load(Demo::StackedObjects);
        assert_eq!(scene.simulation.world().body_count(), 15 * 20 + 15 + 1);
        assert_eq!(scene.camera, CameraSetup::new(Vec2::new(0.0, 150.0), 1.8));
    }

    #[test]
    fn test_newtons_cradle_joints() {
        let scene = load(Demo::NewtonsCradle);
        assert_eq!(scene.simulation.world().body_count(), 9);
        assert_eq!(scene.simulation.world().joints().len(), 9);
    }

    #[test]
    fn test_raycast_box_is_frozen_and_clear_at_origin() {
        let scene = load(Demo::Raycast);
        let world = scene.simulation.world();
        assert_eq!(world.body_count(), 34);
        assert!(world.bodies().all(|(_, body)| body.is_static()));
        assert!(!world.bodies().any(|(_, body)| body.aabb().contains(Vec2::ZERO)));
    }

    #[test]
    fn test_gravity_comes_from_config() {
        let mut config = AppConfig::default();
        config.physics.gravity = -20.0;
        let scene = Demo::Tower
            .load(&mut SceneGenerator::from_seed(0), &config)
            .unwrap();
        assert_eq!(scene.simulation.world().config.gravity, Vec2::new(0.0, -20.0));
        assert_eq!(scene.simulation.world().body_count(), 16);
    }

    /// Dynamic bodies ordered left to right
    fn dynamic_bodies(simulation: &Simulation) -> Vec<&testbed_physics::RigidBody2D> {
        let mut bodies: Vec<_> = simulation
            .world()
            .bodies()
            .map(|(_, body)| body)
            .filter(|body| !body.is_static())
            .collect();
        bodies.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));
        bodies
    }

    #[test]
    fn test_bouncy_ball() {
        let scene = load(Demo::BouncyBall);
        let balls = dynamic_bodies(&scene.simulation);
        assert_eq!(scene.simulation.world().body_count(), 2);
        assert_eq!(balls.len(), 1);
        assert_eq!(balls[0].material().restitution, 1.0);
        assert_eq!(balls[0].position, Vec2::new(0.0, 200.0));
    }

    #[test]
    fn test_wrecking_ball_hangs_from_its_top() {
        let scene = load(Demo::WreckingBall);
        let world = scene.simulation.world();
        assert_eq!(world.body_count(), 10 * 10 + 2);
        assert_eq!(world.joints().len(), 1);

        let joint = &world.joints()[0];
        assert!(joint.can_go_slack);
        let ball = world.get_body(joint.body).unwrap();
        assert_eq!(ball.material().density, 2.0);
        assert_eq!(joint.attachment_point(ball), Vec2::new(-250.0, 360.0));
    }

    #[test]
    fn test_friction_ramps_grip_harder_left_to_right() {
        let scene = load(Demo::Friction);
        let boxes = dynamic_bodies(&scene.simulation);
        assert_eq!(scene.simulation.world().body_count(), 9);
        assert_eq!(boxes.len(), 4);
        assert_eq!(*boxes[0].material(), PhysicsMaterial::ICE);
        for pair in boxes.windows(2) {
            assert!(pair[0].material().static_friction < pair[1].material().static_friction);
        }
    }

    #[test]
    fn test_restitution_balls_are_frictionless() {
        let scene = load(Demo::Restitution);
        let balls = dynamic_bodies(&scene.simulation);
        assert_eq!(balls.len(), GRADIENT.len());
        for (ball, restitution) in balls.iter().zip(GRADIENT) {
            assert_eq!(ball.material().restitution, restitution);
        }
        assert!(scene.simulation.world().bodies().all(|(_, body)| {
            body.material().static_friction == 0.0 && body.material().dynamic_friction == 0.0
        }));
    }

    #[test]
    fn test_drag_slows_the_fall() {
        let mut scene = load(Demo::Drag);
        for _ in 0..120 {
            scene.simulation.step(1.0 / 60.0);
        }
        let balls = dynamic_bodies(&scene.simulation);
        assert_eq!(balls.len(), GRADIENT.len());
        assert_eq!(balls[0].linear_damping, 0.0);
        // Heavier drag leaves a ball higher up
        for pair in balls.windows(2) {
            assert!(pair[0].position.y < pair[1].position.y);
        }
    }

    #[test]
    fn test_raycast_box_reports_exhausted_retries() {
        let mut world = PhysicsWorld::new();
        let result = build_raycast_box(&mut SceneGenerator::from_seed(1), &mut world, 0);
        assert_eq!(result, Err(SceneGenerationError::RetriesExhausted { retries: 0 }));
    }

    #[test]
    fn test_only_explosion_demo_explodes() {
        assert!(Demo::ParticleExplosion.explodes_on_click());
        assert!(!Demo::MixedShapes.explodes_on_click());
    }
}
