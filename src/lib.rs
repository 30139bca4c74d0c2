//! Testbed2D - 2D Physics Testbed
//!
//! Library half of the testbed: configuration, the demo scenes and the
//! background simulation loop. The binary wires them together.

pub mod config;
pub mod scene;
pub mod systems;
