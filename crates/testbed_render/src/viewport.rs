//! World/screen mapping
//!
//! The visible world region is a box centred on the viewport centre with
//! half-extents `(aspect_ratio * 200, 200)` scaled by the zoom. Screen space
//! has its origin in the top-left corner with y pointing down, and the screen
//! height is always derived as `display_width / aspect_ratio`.
//!
//! Bounds are recomputed on every call so a change of centre or zoom can
//! never leave a stale mapping behind.

use std::fmt;

use log::debug;
use testbed_math::Vec2;
use testbed_physics::Aabb;

/// Half-height of the visible world region at zoom 1
pub const VIEW_HALF_HEIGHT: f64 = 200.0;

/// Zoom multiplier for one scroll step towards the scene
pub const SCROLL_ZOOM_IN: f64 = 0.9;
/// Zoom multiplier for one scroll step away from the scene
pub const SCROLL_ZOOM_OUT: f64 = 1.1;

/// Error produced by invalid viewport parameters
#[derive(Clone, Debug, PartialEq)]
pub enum ViewportError {
    /// Zoom must be finite and strictly positive
    InvalidZoom(f64),
    /// Display dimensions must be non-zero
    InvalidDimensions { width: u32, height: u32 },
    /// Zoom factors must be finite and strictly positive
    InvalidZoomFactor(f64),
}

impl fmt::Display for ViewportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewportError::InvalidZoom(z) => write!(f, "invalid zoom {}: must be > 0", z),
            ViewportError::InvalidDimensions { width, height } => {
                write!(f, "invalid display dimensions {}x{}", width, height)
            }
            ViewportError::InvalidZoomFactor(k) => {
                write!(f, "invalid zoom factor {}: must be > 0", k)
            }
        }
    }
}

impl std::error::Error for ViewportError {}

/// 2D camera mapping world coordinates to screen pixels
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    centre: Vec2,
    zoom: f64,
    width: u32,
    height: u32,
    aspect_ratio: f64,
    display_width: f64,
}

impl Viewport {
    /// Create a viewport for a display of `width` x `height` pixels
    ///
    /// The aspect ratio is fixed here for the lifetime of the viewport.
    pub fn new(width: u32, height: u32) -> Result<Self, ViewportError> {
        if width == 0 || height == 0 {
            return Err(ViewportError::InvalidDimensions { width, height });
        }
        Ok(Self {
            centre: Vec2::ZERO,
            zoom: 1.0,
            width,
            height,
            aspect_ratio: width as f64 / height as f64,
            display_width: width as f64,
        })
    }

    pub fn centre(&self) -> Vec2 {
        self.centre
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    /// Display dimensions given at construction
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Width of the surface currently drawn to
    pub fn display_width(&self) -> f64 {
        self.display_width
    }

    /// Height of the surface implied by the display width and aspect ratio
    pub fn screen_height(&self) -> f64 {
        self.display_width / self.aspect_ratio
    }

    pub fn set_centre(&mut self, centre: Vec2) {
        self.centre = centre;
    }

    /// Set the zoom; values that are not finite and positive are rejected
    pub fn set_zoom(&mut self, zoom: f64) -> Result<(), ViewportError> {
        if !(zoom.is_finite() && zoom > 0.0) {
            return Err(ViewportError::InvalidZoom(zoom));
        }
        self.zoom = zoom;
        Ok(())
    }

    /// Multiply the zoom by `factor`
    pub fn zoom_by(&mut self, factor: f64) -> Result<(), ViewportError> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(ViewportError::InvalidZoomFactor(factor));
        }
        self.set_zoom(self.zoom * factor)
    }

    /// Move the centre so the scene follows a drag of `screen_delta` pixels
    pub fn pan(&mut self, screen_delta: Vec2) {
        let bounds = self.bounds();
        let size = bounds.size();
        let world_delta = Vec2::new(
            screen_delta.x / self.display_width * size.x,
            -screen_delta.y / self.screen_height() * size.y,
        );
        self.centre -= world_delta;
    }

    /// Change the width of the surface drawn to; the aspect ratio is kept
    pub fn resize(&mut self, display_width: u32) {
        if display_width > 0 {
            self.display_width = display_width as f64;
            debug!("Viewport display width set to {} px", display_width);
        }
    }

    /// Centre back at the origin with zoom 1
    pub fn reset(&mut self) {
        self.centre = Vec2::ZERO;
        self.zoom = 1.0;
    }

    /// Visible world region for the current centre and zoom
    pub fn bounds(&self) -> Aabb {
        let extents = Vec2::new(self.aspect_ratio * VIEW_HALF_HEIGHT, VIEW_HALF_HEIGHT) * self.zoom;
        Aabb::new(self.centre - extents, self.centre + extents)
    }

    /// Map a world point to screen pixels
    pub fn world_to_screen(&self, p: Vec2) -> Vec2 {
        let Aabb { min: lower, max: upper } = self.bounds();
        let bx = (p.x - lower.x) / (upper.x - lower.x);
        let by = (p.y - lower.y) / (upper.y - lower.y);
        Vec2::new(bx * self.display_width, (1.0 - by) * self.screen_height())
    }

    /// Map screen pixels back to a world point
    pub fn screen_to_world(&self, p: Vec2) -> Vec2 {
        let Aabb { min: lower, max: upper } = self.bounds();
        let tx = p.x / self.display_width;
        let screen_height = self.screen_height();
        let ty = (screen_height - p.y) / screen_height;
        Vec2::new(
            (1.0 - tx) * lower.x + tx * upper.x,
            (1.0 - ty) * lower.y + ty * upper.y,
        )
    }

    /// Map a world length (such as a radius) to a screen length
    pub fn scale_length(&self, world_length: f64) -> f64 {
        let visible_width = 2.0 * self.aspect_ratio * VIEW_HALF_HEIGHT * self.zoom;
        world_length / visible_width * self.display_width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn viewport() -> Viewport {
        Viewport::new(1600, 900).unwrap()
    }

    #[test]
    fn test_invalid_dimensions() {
        assert_eq!(
            Viewport::new(0, 900),
            Err(ViewportError::InvalidDimensions { width: 0, height: 900 })
        );
        assert!(Viewport::new(800, 0).is_err());
    }

    #[test]
    fn test_centre_maps_to_middle_of_screen() {
        let mut vp = viewport();
        vp.set_centre(Vec2::new(30.0, -40.0));
        let s = vp.world_to_screen(Vec2::new(30.0, -40.0));
        assert_relative_eq!(s.x, 800.0, epsilon = 1e-9);
        assert_relative_eq!(s.y, 450.0, epsilon = 1e-9);
    }

    #[test]
    fn test_y_axis_is_flipped() {
        let vp = viewport();
        let top = vp.world_to_screen(Vec2::new(0.0, 200.0));
        let bottom = vp.world_to_screen(Vec2::new(0.0, -200.0));
        assert_relative_eq!(top.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(bottom.y, 900.0, epsilon = 1e-9);
    }

    #[test]
    fn test_round_trip() {
        let mut vp = viewport();
        let points = [
            Vec2::ZERO,
            Vec2::new(123.5, -77.25),
            Vec2::new(-5000.0, 3000.0),
            Vec2::new(1e-3, 1e3),
        ];
        for &(centre, zoom) in &[
            (Vec2::ZERO, 1.0),
            (Vec2::new(-100.0, -20.0), 3.3),
            (Vec2::new(1500.0, 300.0), 0.05),
        ] {
            vp.set_centre(centre);
            vp.set_zoom(zoom).unwrap();
            for &p in &points {
                let back = vp.screen_to_world(vp.world_to_screen(p));
                assert_relative_eq!(back.x, p.x, epsilon = 1e-6, max_relative = 1e-9);
                assert_relative_eq!(back.y, p.y, epsilon = 1e-6, max_relative = 1e-9);
            }
        }
    }

    #[test]
    fn test_set_zoom_contract() {
        let mut vp = viewport();
        assert_eq!(vp.set_zoom(0.0), Err(ViewportError::InvalidZoom(0.0)));
        assert_eq!(vp.set_zoom(-2.0), Err(ViewportError::InvalidZoom(-2.0)));
        assert!(vp.set_zoom(f64::NAN).is_err());
        assert_eq!(vp.zoom(), 1.0);

        let before = vp.scale_length(10.0);
        vp.set_zoom(2.0).unwrap();
        assert_eq!(vp.zoom(), 2.0);
        assert_relative_eq!(vp.scale_length(10.0), before / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_scale_length_ignores_centre() {
        let mut vp = viewport();
        let length = vp.scale_length(50.0);
        vp.set_centre(Vec2::new(999.0, -999.0));
        assert_eq!(vp.scale_length(50.0), length);
        // 1600 px across 2 * (16/9) * 200 world units
        assert_relative_eq!(length, 50.0 / (3200.0 / 9.0 * 2.0) * 1600.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zoom_by() {
        let mut vp = viewport();
        vp.zoom_by(SCROLL_ZOOM_OUT).unwrap();
        vp.zoom_by(SCROLL_ZOOM_IN).unwrap();
        assert_relative_eq!(vp.zoom(), 0.99, epsilon = 1e-12);
        assert_eq!(vp.zoom_by(0.0), Err(ViewportError::InvalidZoomFactor(0.0)));
    }

    #[test]
    fn test_pan_follows_drag() {
        let mut vp = viewport();
        let grabbed = vp.screen_to_world(Vec2::new(400.0, 300.0));
        vp.pan(Vec2::new(100.0, -50.0));
        let under_cursor = vp.screen_to_world(Vec2::new(500.0, 250.0));
        assert_relative_eq!(under_cursor.x, grabbed.x, epsilon = 1e-9);
        assert_relative_eq!(under_cursor.y, grabbed.y, epsilon = 1e-9);
    }

    #[test]
    fn test_resize_keeps_aspect_ratio() {
        let mut vp = viewport();
        vp.resize(800);
        assert_eq!(vp.display_width(), 800.0);
        assert_relative_eq!(vp.screen_height(), 450.0, epsilon = 1e-9);
        assert_eq!(vp.dimensions(), (1600, 900));
        let s = vp.world_to_screen(Vec2::ZERO);
        assert_relative_eq!(s.x, 400.0, epsilon = 1e-9);
    }

    #[test]
    fn test_reset() {
        let mut vp = viewport();
        vp.set_centre(Vec2::new(1.0, 2.0));
        vp.set_zoom(4.0).unwrap();
        vp.reset();
        assert_eq!(vp.centre(), Vec2::ZERO);
        assert_eq!(vp.zoom(), 1.0);
    }
}
