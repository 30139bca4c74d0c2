//! Procedural scene population
//!
//! Random placement rejects any candidate whose bounding box touches an
//! existing body, so accepted bodies never start out overlapping. The
//! parametric builders (pyramids, towers, shelves) are fully deterministic.

use std::fmt;

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use testbed_math::Vec2;
use testbed_physics::{BodyDesc, BodyKey, PhysicsMaterial, PhysicsWorld, Shape};

/// Smallest radius a random body can have
const MIN_RADIUS: u32 = 5;
/// Exclusive upper bound of a random body's orientation in radians
const MAX_ROTATION: f64 = 7.0;
const MIN_SIDES: u32 = 3;
const MAX_SIDES: u32 = 10;

/// Half-height of a pyramid or tower pillar
const PILLAR_HALF_HEIGHT: f64 = 30.0;
/// Half-width of a pillar (and half-height of a lintel)
const PILLAR_HALF_WIDTH: f64 = 5.0;

/// Quarter turn as used by the wall builders
const QUARTER_TURN: f64 = 1.5708;

/// Default cap on placement attempts for one `populate_random` call
pub const DEFAULT_MAX_ATTEMPTS: usize = 100_000;

/// Error raised when a scene cannot be populated as requested
#[derive(Clone, Debug, PartialEq)]
pub enum SceneGenerationError {
    /// The attempt budget ran out before every body was placed
    PlacementExhausted {
        placed: usize,
        requested: usize,
        attempts: usize,
    },
    /// The maximum radius is below the minimum random radius
    InvalidRadius { max_radius: u32, min_radius: u32 },
    /// The lower bound is not strictly below the upper bound
    InvalidRegion { lower: Vec2, upper: Vec2 },
    /// Every regenerated scene broke a layout constraint
    RetriesExhausted { retries: usize },
}

impl fmt::Display for SceneGenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneGenerationError::PlacementExhausted {
                placed,
                requested,
                attempts,
            } => write!(
                f,
                "placed {} of {} bodies before running out of attempts ({})",
                placed, requested, attempts
            ),
            SceneGenerationError::InvalidRadius {
                max_radius,
                min_radius,
            } => write!(
                f,
                "maximum radius {} is smaller than the minimum radius {}",
                max_radius, min_radius
            ),
            SceneGenerationError::InvalidRegion { lower, upper } => write!(
                f,
                "invalid region: lower ({}, {}) is not below upper ({}, {})",
                lower.x, lower.y, upper.x, upper.y
            ),
            SceneGenerationError::RetriesExhausted { retries } => {
                write!(f, "no acceptable scene after {} regenerations", retries)
            }
        }
    }
}

impl std::error::Error for SceneGenerationError {}

/// Populates physics worlds with random and structured bodies
pub struct SceneGenerator<R = StdRng> {
    rng: R,
    max_attempts: usize,
}

impl SceneGenerator<StdRng> {
    /// Generator with a reproducible random sequence
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Generator seeded from the operating system
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> SceneGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Cap the number of candidates tried per `populate_random` call
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Place `count` random circles and polygons inside `[lower, upper]`
    ///
    /// Each candidate gets an integer radius in `[5, max_radius]`, a centre at
    /// least one radius inside the region and an orientation in `[0, 7)`.
    /// Candidates overlapping an existing body are rejected and only accepted
    /// bodies count towards `count`. Bodies placed before an error stay in
    /// the world.
    pub fn populate_random(
        &mut self,
        world: &mut PhysicsWorld,
        lower: Vec2,
        upper: Vec2,
        count: usize,
        max_radius: u32,
    ) -> Result<(), SceneGenerationError> {
        if max_radius < MIN_RADIUS {
            return Err(SceneGenerationError::InvalidRadius {
                max_radius,
                min_radius: MIN_RADIUS,
            });
        }
        if !(lower.x < upper.x && lower.y < upper.y) {
            return Err(SceneGenerationError::InvalidRegion { lower, upper });
        }

        let mut placed = 0;
        let mut attempts = 0;
        while placed < count {
            if attempts >= self.max_attempts {
                warn!(
                    "Gave up populating after {} attempts ({}/{} placed)",
                    attempts, placed, count
                );
                return Err(SceneGenerationError::PlacementExhausted {
                    placed,
                    requested: count,
                    attempts,
                });
            }
            attempts += 1;

            let Some(candidate) = self.random_body(lower, upper, max_radius) else {
                continue;
            };
            let aabb = candidate.aabb();
            if world.bodies().any(|(_, body)| body.aabb().overlaps(&aabb)) {
                continue;
            }
            world.add_body(candidate);
            placed += 1;
        }

        debug!("Placed {} random bodies in {} attempts", placed, attempts);
        Ok(())
    }

    /// Draw one candidate body, or `None` if its radius cannot fit the region
    fn random_body(&mut self, lower: Vec2, upper: Vec2, max_radius: u32) -> Option<BodyDesc> {
        let circle = self.rng.gen_bool(0.5);
        let radius = self.rng.gen_range(MIN_RADIUS..=max_radius) as f64;

        let (min_x, max_x) = (lower.x + radius, upper.x - radius);
        let (min_y, max_y) = (lower.y + radius, upper.y - radius);
        if min_x > max_x || min_y > max_y {
            return None;
        }
        let position = Vec2::new(
            self.rng.gen_range(min_x..=max_x),
            self.rng.gen_range(min_y..=max_y),
        );
        let orientation = self.rng.gen_range(0.0..MAX_ROTATION);

        let shape = if circle {
            Shape::circle(radius)
        } else {
            Shape::regular_polygon(radius, self.rng.gen_range(MIN_SIDES..=MAX_SIDES))
        };
        Some(BodyDesc::new(shape, position).with_orientation(orientation))
    }

    /// Build a closed box of static walls, fill it with random bodies and
    /// freeze everything in the world
    pub fn populate_box(&mut self, world: &mut PhysicsWorld) -> Result<(), SceneGenerationError> {
        add_static(world, Shape::rectangle(900.0, 20.0), Vec2::new(-20.0, 500.0), 0.0);
        add_static(world, Shape::rectangle(500.0, 20.0), Vec2::new(900.0, 20.0), QUARTER_TURN);
        add_static(world, Shape::rectangle(900.0, 20.0), Vec2::new(20.0, -500.0), 0.0);
        add_static(world, Shape::rectangle(500.0, 20.0), Vec2::new(-900.0, -20.0), QUARTER_TURN);

        self.populate_random(world, Vec2::new(-880.0, -480.0), Vec2::new(880.0, 480.0), 30, 100)?;
        set_static(world);
        Ok(())
    }
}

impl<R> fmt::Debug for SceneGenerator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneGenerator")
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

// Deterministic builders. These need no randomness so they are available on
// any generator.
impl<R> SceneGenerator<R> {
    /// Stack `tiers` rows of pillars and lintels starting at `(x, y)`
    ///
    /// Produces `tiers * (tiers + 2)` bodies.
    pub fn build_pyramid(&self, world: &mut PhysicsWorld, tiers: u32, x: f64, y: f64) -> Vec<BodyKey> {
        let lintel_span = PILLAR_HALF_HEIGHT * 2.0;
        let mut keys = Vec::new();
        let mut x = x + PILLAR_HALF_WIDTH;
        let mut y = y;

        for tier in 0..tiers {
            x += PILLAR_HALF_HEIGHT;
            keys.push(add_pillar(world, upright(), Vec2::new(x, y + PILLAR_HALF_HEIGHT)));

            for i in 0..(tiers - tier) {
                let i = i as f64;
                keys.push(add_pillar(
                    world,
                    upright(),
                    Vec2::new(x + lintel_span + lintel_span * i, y + PILLAR_HALF_HEIGHT),
                ));
                keys.push(add_pillar(
                    world,
                    lintel(),
                    Vec2::new(
                        x + PILLAR_HALF_HEIGHT + i * lintel_span,
                        y + lintel_span + PILLAR_HALF_WIDTH,
                    ),
                ));
            }
            y += lintel_span + PILLAR_HALF_WIDTH * 2.0;
        }
        keys
    }

    /// Stack `floors` two-pillar frames capped by a lintel
    ///
    /// Produces `3 * floors` bodies.
    pub fn build_tower(&self, world: &mut PhysicsWorld, floors: u32, x: f64, y: f64) -> Vec<BodyKey> {
        let pillar_height = PILLAR_HALF_HEIGHT * 2.0;
        let pillar_width = PILLAR_HALF_WIDTH * 2.0;
        let column = Shape::rectangle(PILLAR_HALF_WIDTH, PILLAR_HALF_HEIGHT);
        let mut keys = Vec::new();
        let x = x + PILLAR_HALF_WIDTH;
        let mut y = y;

        for _ in 0..floors {
            keys.push(add_pillar(world, column.clone(), Vec2::new(x, y + PILLAR_HALF_HEIGHT)));
            keys.push(add_pillar(
                world,
                column.clone(),
                Vec2::new(x + pillar_height - pillar_width, y + PILLAR_HALF_HEIGHT),
            ));
            keys.push(add_pillar(
                world,
                lintel(),
                Vec2::new(
                    x + PILLAR_HALF_HEIGHT - PILLAR_HALF_WIDTH,
                    y + pillar_height + PILLAR_HALF_WIDTH,
                ),
            ));
            y += pillar_height + PILLAR_HALF_WIDTH * 2.0;
        }
        keys
    }

    /// A static shelf at `(x, y)` with four boxes stacked on it
    pub fn build_shelf(&self, world: &mut PhysicsWorld, x: f64, y: f64) -> Vec<BodyKey> {
        let mut keys = vec![add_static(world, Shape::rectangle(100.0, 10.0), Vec2::new(x, y), 0.0)];
        for i in 0..4 {
            let position = Vec2::new(x, y + 30.0 + i as f64 * 40.0);
            keys.push(world.add_body(BodyDesc::new(Shape::rectangle(10.0, 20.0), position)));
        }
        keys
    }

    /// Shelves, a floor, a deflector and stacks of boxes for explosion demos
    pub fn build_explosion_range(&self, world: &mut PhysicsWorld) {
        self.build_shelf(world, 50.0, 300.0);
        self.build_shelf(world, 450.0, 400.0);

        add_static(world, Shape::rectangle(20000.0, 2000.0), Vec2::new(0.0, -2000.0), 0.0);
        add_static(world, Shape::rectangle(40.0, 5.0), Vec2::new(-100.0, 330.0), 0.785398);

        // Covered stack
        add_static(world, Shape::rectangle(120.0, 10.0), Vec2::new(450.0, 210.0), 0.0);
        add_static(world, Shape::rectangle(100.0, 10.0), Vec2::new(340.0, 100.0), QUARTER_TURN);
        add_static(world, Shape::rectangle(100.0, 10.0), Vec2::new(560.0, 100.0), QUARTER_TURN);
        for i in 0..4 {
            let position = Vec2::new(450.0, 20.0 + i as f64 * 40.0);
            world.add_body(BodyDesc::new(Shape::rectangle(20.0, 20.0), position));
        }

        // Open stacks
        for k in 0..2 {
            for i in 0..5 {
                let position = Vec2::new(-600.0 + k as f64 * 200.0, 20.0 + i as f64 * 40.0);
                world.add_body(BodyDesc::new(Shape::rectangle(20.0, 20.0), position));
            }
        }
    }
}

/// Make every body in the world static
pub fn set_static(world: &mut PhysicsWorld) {
    for body in world.bodies_mut() {
        body.set_density(0.0);
    }
}

/// Remove all friction from the world
pub fn set_ice(world: &mut PhysicsWorld) {
    for body in world.bodies_mut() {
        body.set_static_friction(0.0);
        body.set_dynamic_friction(0.0);
    }
}

/// Scale every body's friction by `ratio`
pub fn scale_friction(world: &mut PhysicsWorld, ratio: f64) {
    for body in world.bodies_mut() {
        let scaled = body.material().scaled_friction(ratio);
        body.set_static_friction(scaled.static_friction);
        body.set_dynamic_friction(scaled.dynamic_friction);
    }
}

fn upright() -> Shape {
    Shape::rectangle(PILLAR_HALF_WIDTH + 2.0, PILLAR_HALF_HEIGHT)
}

fn lintel() -> Shape {
    Shape::rectangle(PILLAR_HALF_HEIGHT, PILLAR_HALF_WIDTH)
}

fn add_pillar(world: &mut PhysicsWorld, shape: Shape, position: Vec2) -> BodyKey {
    world.add_body(BodyDesc::new(shape, position).with_material(PhysicsMaterial::PILLAR))
}

fn add_static(world: &mut PhysicsWorld, shape: Shape, position: Vec2, orientation: f64) -> BodyKey {
    world.add_body(
        BodyDesc::new(shape, position)
            .with_orientation(orientation)
            .with_material(PhysicsMaterial::STATIC),
    )
}
