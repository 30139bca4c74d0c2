//! Collision shapes for 2D bodies
//!
//! Shapes are stored in body-local space (centred on the body position).
//! Anything that depends on the shape kind goes through a `match` on
//! [`Shape`], including bounding boxes, mass properties and outlines.

use testbed_math::{Mat2, Vec2};

/// The kind of a shape, without its geometry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Circle,
    Polygon,
}

/// A body-local collision shape
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Circle centred on the body position
    Circle { radius: f64 },
    /// Convex polygon with counter-clockwise vertices around the body position
    Polygon { vertices: Vec<Vec2> },
}

impl Shape {
    /// Create a circle of the given radius
    pub fn circle(radius: f64) -> Self {
        Shape::Circle { radius }
    }

    /// Create an axis-aligned box from half-extents
    pub fn rectangle(half_width: f64, half_height: f64) -> Self {
        Shape::Polygon {
            vertices: vec![
                Vec2::new(-half_width, -half_height),
                Vec2::new(half_width, -half_height),
                Vec2::new(half_width, half_height),
                Vec2::new(-half_width, half_height),
            ],
        }
    }

    /// Create a regular polygon whose vertices lie on a circle of `radius`
    ///
    /// Fewer than three sides is treated as a triangle.
    pub fn regular_polygon(radius: f64, sides: u32) -> Self {
        let sides = sides.max(3);
        let step = std::f64::consts::TAU / sides as f64;
        let vertices = (0..sides)
            .map(|i| {
                let angle = step * (i as f64 + 0.75);
                Vec2::new(radius * angle.cos(), radius * angle.sin())
            })
            .collect();
        Shape::Polygon { vertices }
    }

    /// The kind of this shape
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle { .. } => ShapeKind::Circle,
            Shape::Polygon { .. } => ShapeKind::Polygon,
        }
    }

    /// Area of the shape
    pub fn area(&self) -> f64 {
        match self {
            Shape::Circle { radius } => std::f64::consts::PI * radius * radius,
            Shape::Polygon { vertices } => {
                let mut twice_area = 0.0;
                for (i, a) in vertices.iter().enumerate() {
                    let b = vertices[(i + 1) % vertices.len()];
                    twice_area += a.cross(b);
                }
                (twice_area * 0.5).abs()
            }
        }
    }

    /// Moment of inertia about the body position for a given density
    pub fn inertia(&self, density: f64) -> f64 {
        match self {
            Shape::Circle { radius } => {
                let mass = self.area() * density;
                mass * radius * radius
            }
            Shape::Polygon { vertices } => {
                let mut inertia = 0.0;
                for (i, a) in vertices.iter().enumerate() {
                    let b = vertices[(i + 1) % vertices.len()];
                    let cross = a.cross(b);
                    let intx2 = a.x * a.x + b.x * a.x + b.x * b.x;
                    let inty2 = a.y * a.y + b.y * a.y + b.y * b.y;
                    inertia += (0.25 / 3.0) * cross * (intx2 + inty2);
                }
                (inertia * density).abs()
            }
        }
    }

    /// Bounding box in body-local space for the given orientation
    pub fn local_aabb(&self, orientation: f64) -> Aabb {
        match self {
            Shape::Circle { radius } => {
                Aabb::from_center_half_extents(Vec2::ZERO, Vec2::new(*radius, *radius))
            }
            Shape::Polygon { vertices } => {
                let rotation = Mat2::rotation(orientation);
                let mut points = vertices.iter().map(|v| rotation.mul_vec(*v));
                let first = points.next().unwrap_or(Vec2::ZERO);
                let (min, max) = points.fold((first, first), |(min, max), p| {
                    (min.min_components(p), max.max_components(p))
                });
                Aabb::new(min, max)
            }
        }
    }

    /// Polygon vertices in world space (empty for circles)
    pub fn world_vertices(&self, position: Vec2, orientation: f64) -> Vec<Vec2> {
        match self {
            Shape::Circle { .. } => Vec::new(),
            Shape::Polygon { vertices } => {
                let rotation = Mat2::rotation(orientation);
                vertices
                    .iter()
                    .map(|v| position + rotation.mul_vec(*v))
                    .collect()
            }
        }
    }
}

/// A 2D axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec2,
    /// Maximum corner
    pub max: Vec2,
}

impl Aabb {
    /// Create a new AABB from min and max corners
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a position with given half-extents
    pub fn from_center_half_extents(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Get the full size in each dimension
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Translate the AABB by a delta
    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Check if a point is inside or on the AABB
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Check whether two boxes overlap
    ///
    /// Boxes that only touch along an edge count as overlapping.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}
