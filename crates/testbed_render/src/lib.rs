//! Screen-space side of the testbed
//!
//! ## Key Components
//!
//! - [`viewport::Viewport`] - Camera mapping between world and screen space
//! - [`projection::project_frame`] - Converts a frame snapshot into pixels
//!
//! Drawing itself is left to whichever surface the frame is handed to.

pub mod projection;
pub mod viewport;

pub use projection::{project_frame, ScreenBody, ScreenFrame, ScreenRect, ScreenShape};
pub use viewport::{Viewport, ViewportError, SCROLL_ZOOM_IN, SCROLL_ZOOM_OUT, VIEW_HALF_HEIGHT};
