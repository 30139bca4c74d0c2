//! 2D Mathematics Library
//!
//! This crate provides the small set of 2D types shared by the testbed crates.
//!
//! ## Core Types
//!
//! - [`Vec2`] - 2D vector with x, y components (world and screen space)
//! - [`Mat2`] - 2x2 rotation matrix built from an orientation angle

mod vec2;
pub mod mat2;

pub use vec2::Vec2;
pub use mat2::Mat2;
