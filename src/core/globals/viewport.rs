//=========================================================================
// Viewport
//=========================================================================
//
// Logical design resolution and the letterbox fit against a surface.
//
//=========================================================================

//=== External Dependencies ===============================================

use kurbo::Size;

//=== Viewport ============================================================

/// Fixed logical resolution that scene layouts are authored against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    width: u32,
    height: u32,
}

impl Viewport {
    pub const DEFAULT_WIDTH: u32 = 1360;
    pub const DEFAULT_HEIGHT: u32 = 640;

    /// Creates a viewport.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0 && height > 0, "Viewport dimensions must be positive");
        Self { width, height }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    /// Largest uniform scale at which the viewport fits inside `surface`.
    pub fn fit_scale(&self, surface: Size) -> f64 {
        let size = self.size();
        (surface.width / size.width).min(surface.height / size.height)
    }

    /// Pixel size of the scaled viewport, rounded up.
    pub fn scaled_size(&self, scale: f64) -> Size {
        let size = self.size();
        Size::new((size.width * scale).ceil(), (size.height * scale).ceil())
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WIDTH, Self::DEFAULT_HEIGHT)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_design_resolution() {
        let viewport = Viewport::default();
        assert_eq!((viewport.width(), viewport.height()), (1360, 640));
    }

    #[test]
    fn fit_scale_uses_tighter_axis() {
        let viewport = Viewport::default();
        assert_eq!(viewport.fit_scale(Size::new(2720.0, 640.0)), 1.0, "Height bound");
        assert_eq!(viewport.fit_scale(Size::new(680.0, 1280.0)), 0.5, "Width bound");
    }

    #[test]
    fn scaled_size_rounds_up() {
        let viewport = Viewport::new(3, 3);
        assert_eq!(viewport.scaled_size(0.5), Size::new(2.0, 2.0));
    }

    #[test]
    #[should_panic(expected = "Viewport dimensions must be positive")]
    fn zero_dimension_panics() {
        Viewport::new(0, 640);
    }
}
