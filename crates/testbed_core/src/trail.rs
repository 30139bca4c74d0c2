//! Motion trails
//!
//! A trail records a body's position every few simulation steps into a
//! fixed-capacity buffer. Once the buffer is full the oldest point is shifted
//! out, so the points always read oldest to newest.

use testbed_math::Vec2;
use testbed_physics::{BodyKey, PhysicsWorld};

/// Bounded history of a body's past positions
#[derive(Clone, Debug, PartialEq)]
pub struct Trail {
    points: Vec<Vec2>,
    capacity: usize,
    skip_interval: u32,
    counter: u32,
    /// Seconds before the trail expires (0.0 = never)
    life_span: f64,
    time_active: f64,
    body: BodyKey,
}

impl Trail {
    /// Create a trail of `capacity` points for `body`
    ///
    /// A point is recorded on the first step and then once every
    /// `skip_interval + 1` steps.
    pub fn new(capacity: usize, skip_interval: u32, body: BodyKey, life_span: f64) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
            capacity,
            skip_interval,
            counter: skip_interval,
            life_span: life_span.max(0.0),
            time_active: 0.0,
            body,
        }
    }

    /// The body this trail samples (not owned)
    pub fn body(&self) -> BodyKey {
        self.body
    }

    /// Recorded points, oldest first
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Maximum number of points kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn skip_interval(&self) -> u32 {
        self.skip_interval
    }

    pub fn life_span(&self) -> f64 {
        self.life_span
    }

    /// Simulated seconds accumulated against the lifespan
    pub fn time_active(&self) -> f64 {
        self.time_active
    }

    /// Whether the buffer holds `capacity` points
    pub fn is_full(&self) -> bool {
        self.points.len() >= self.capacity
    }

    /// Advance the step counter and record the body's position when due
    ///
    /// Nothing is recorded if the body is no longer in the world.
    pub fn update(&mut self, world: &PhysicsWorld) {
        if self.counter < self.skip_interval {
            self.counter += 1;
            return;
        }
        self.counter = 0;

        if let Some(position) = world.body_position(self.body) {
            self.record(position);
        }
    }

    /// Push a point, shifting out the oldest one when full
    pub fn record(&mut self, point: Vec2) {
        if self.capacity == 0 {
            return;
        }
        if self.is_full() {
            self.points.remove(0);
        }
        self.points.push(point);
    }

    /// Accumulate `dt` and report whether the trail has expired
    ///
    /// A trail with a lifespan of zero never expires and does not accumulate
    /// time. Otherwise it expires once the accumulated time strictly exceeds
    /// its lifespan.
    pub fn check_lifespan(&mut self, dt: f64) -> bool {
        if self.life_span == 0.0 {
            return false;
        }
        self.time_active += dt;
        self.time_active > self.life_span
    }
}
