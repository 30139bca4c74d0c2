//! Spring joints anchoring a body to a fixed point

use crate::body::{BodyKey, RigidBody2D};
use testbed_math::{Mat2, Vec2};

/// A damped spring between a point on a body and a fixed world point
#[derive(Clone, Debug, PartialEq)]
pub struct JointToPoint {
    /// Body the joint pulls on
    pub body: BodyKey,
    /// Fixed world-space anchor
    pub anchor: Vec2,
    /// Rest length of the spring
    pub natural_length: f64,
    /// Hooke's law constant
    pub spring_constant: f64,
    /// Damping applied to the rate of extension
    pub damping: f64,
    /// A slack joint exerts no force while shorter than its rest length
    pub can_go_slack: bool,
    /// Attachment point in body-local space
    pub offset: Vec2,
}

impl JointToPoint {
    /// Create a joint attached to the body's centre
    pub fn new(body: BodyKey, anchor: Vec2, natural_length: f64, spring_constant: f64, damping: f64) -> Self {
        Self {
            body,
            anchor,
            natural_length,
            spring_constant,
            damping,
            can_go_slack: false,
            offset: Vec2::ZERO,
        }
    }

    /// Allow the joint to go slack when compressed
    pub fn with_slack(mut self, can_go_slack: bool) -> Self {
        self.can_go_slack = can_go_slack;
        self
    }

    /// Attach at a body-local offset instead of the centre
    pub fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }

    /// World-space attachment point on the body
    pub fn attachment_point(&self, body: &RigidBody2D) -> Vec2 {
        body.position + Mat2::rotation(body.orientation()).mul_vec(self.offset)
    }

    /// Spring tension for the body's current state
    pub fn tension(&self, body: &RigidBody2D) -> f64 {
        let attachment = self.attachment_point(body);
        let distance = attachment.distance(self.anchor);
        if distance < self.natural_length && self.can_go_slack {
            return 0.0;
        }
        let hooke = (distance - self.natural_length) * self.spring_constant;
        hooke + self.damping * self.rate_of_extension(body, attachment)
    }

    /// Apply the spring impulse to the body
    pub fn apply_tension(&self, body: &mut RigidBody2D) {
        let attachment = self.attachment_point(body);
        let tension = self.tension(body);
        let direction = (self.anchor - attachment).normalized();
        body.apply_impulse(direction * tension, attachment - body.position);
    }

    fn rate_of_extension(&self, body: &RigidBody2D, attachment: Vec2) -> f64 {
        let direction = (self.anchor - attachment).normalized();
        let arm = attachment - body.position;
        let relative_velocity = -body.velocity - arm.cross_scalar(body.angular_velocity);
        relative_velocity.dot(direction)
    }
}
